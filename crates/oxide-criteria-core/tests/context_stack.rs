//! Tests for context stack bookkeeping across nested builders.

mod common;

use std::rc::Rc;

use common::*;
use oxide_criteria_core::{
    field, ContextStack, CriteriaContext, CriteriaError, Dialect, Select, StatementKind,
};

// ============================================================================
// Raw stack operations
// ============================================================================

#[test]
fn test_push_peek_pop_in_order() {
    let stack = ContextStack::new();
    let outer = Rc::new(CriteriaContext::new(StatementKind::SimpleSelect, None));
    let inner = Rc::new(CriteriaContext::new(
        StatementKind::SubQuery,
        Some(Rc::clone(&outer)),
    ));

    stack.push(Rc::clone(&outer)).unwrap();
    stack.push(Rc::clone(&inner)).unwrap();
    assert_eq!(stack.depth(), 2);
    assert_eq!(stack.peek().map(|c| c.id()), Some(inner.id()));

    let popped = stack.pop(&inner).unwrap();
    assert_eq!(popped.id(), inner.id());
    stack.pop(&outer).unwrap();
    assert!(stack.is_empty());
}

#[test]
fn test_pop_of_non_top_context_fails_and_keeps_stack() {
    let stack = ContextStack::new();
    let outer = Rc::new(CriteriaContext::new(StatementKind::SimpleSelect, None));
    let inner = Rc::new(CriteriaContext::new(StatementKind::SubQuery, None));
    stack.push(Rc::clone(&outer)).unwrap();
    stack.push(Rc::clone(&inner)).unwrap();

    let err = stack.pop(&outer).unwrap_err();
    assert!(matches!(err, CriteriaError::Context(_)));
    assert_eq!(stack.depth(), 2);
}

#[test]
fn test_pop_of_empty_stack_fails() {
    let stack = ContextStack::new();
    let ctx = CriteriaContext::new(StatementKind::SimpleSelect, None);
    assert!(matches!(stack.pop(&ctx), Err(CriteriaError::Context(_))));
}

#[test]
fn test_pushing_the_same_context_twice_fails() {
    let stack = ContextStack::new();
    let ctx = Rc::new(CriteriaContext::new(StatementKind::SimpleSelect, None));
    stack.push(Rc::clone(&ctx)).unwrap();
    assert!(matches!(
        stack.push(Rc::clone(&ctx)),
        Err(CriteriaError::Context(_))
    ));
    assert_eq!(stack.depth(), 1);
}

#[test]
fn test_raise_and_unwind_drops_context_and_everything_above() {
    let stack = ContextStack::new();
    let a = Rc::new(CriteriaContext::new(StatementKind::SimpleSelect, None));
    let b = Rc::new(CriteriaContext::new(StatementKind::SubQuery, None));
    let c = Rc::new(CriteriaContext::new(StatementKind::SubQuery, None));
    for ctx in [&a, &b, &c] {
        stack.push(Rc::clone(ctx)).unwrap();
    }

    let err = stack.raise_and_unwind(&b, CriteriaError::UnknownAlias("x".into()));
    assert_eq!(err, CriteriaError::UnknownAlias("x".into()));
    assert_eq!(stack.depth(), 1);
    assert!(stack.contains(&a));
    assert!(!stack.contains(&b));
    assert!(!stack.contains(&c));
}

#[test]
fn test_raise_and_unwind_of_foreign_context_leaves_stack_alone() {
    let stack = ContextStack::new();
    let a = Rc::new(CriteriaContext::new(StatementKind::SimpleSelect, None));
    stack.push(Rc::clone(&a)).unwrap();
    let stranger = CriteriaContext::new(StatementKind::SubQuery, None);

    let _ = stack.raise_and_unwind(&stranger, CriteriaError::InvalidArgument("boom".into()));
    assert_eq!(stack.depth(), 1);
}

#[test]
fn test_clones_share_frames() {
    let stack = ContextStack::new();
    let clone = stack.clone();
    assert!(stack.same_stack(&clone));
    assert!(!stack.same_stack(&ContextStack::new()));

    clone
        .push(Rc::new(CriteriaContext::new(StatementKind::SimpleSelect, None)))
        .unwrap();
    assert_eq!(stack.depth(), 1);
}

// ============================================================================
// Builders on a shared stack
// ============================================================================

#[test]
fn test_builder_pushes_on_open_and_pops_on_prepare() {
    let users = users();
    let stack = ContextStack::new();
    let builder = Select::on_stack(&stack, Dialect::MySQL80)
        .select([field("u", "id")])
        .unwrap();
    assert_eq!(stack.depth(), 1);

    let builder = builder.from(&users, "u").unwrap();
    assert!(builder.stack().same_stack(&stack));
    assert_eq!(builder.context().source_count(), 1);

    let context = Rc::clone(builder.context());
    builder.build().unwrap();
    assert!(stack.is_empty());
    assert!(context.is_cleared());
    assert_eq!(context.source_count(), 0);
}

#[test]
fn test_sub_query_nests_inside_its_parent() {
    let users = users();
    let orders = orders();
    let stack = ContextStack::new();
    let outer = Select::on_stack(&stack, Dialect::MySQL80)
        .select([field("u", "id")])
        .unwrap()
        .from(&users, "u")
        .unwrap();

    let inner = outer
        .scope()
        .sub_query()
        .select([field("o", "user_id")])
        .unwrap();
    assert_eq!(stack.depth(), 2);
    assert_eq!(
        inner.context().outer().map(|c| c.id()),
        Some(outer.context().id())
    );

    let inner = inner.from(&orders, "o").unwrap().build().unwrap();
    assert_eq!(stack.depth(), 1);

    outer
        .where_(field("u", "id").in_query(inner))
        .unwrap()
        .build()
        .unwrap();
    assert!(stack.is_empty());
}

#[test]
fn test_dropping_an_unfinished_builder_unwinds_its_context() {
    let users = users();
    let stack = ContextStack::new();
    {
        let _builder = Select::on_stack(&stack, Dialect::MySQL80)
            .select([field("u", "id")])
            .unwrap()
            .from(&users, "u")
            .unwrap();
        assert_eq!(stack.depth(), 1);
    }
    assert!(stack.is_empty());
}

#[test]
fn test_failed_sub_query_unwinds_only_itself() {
    let users = users();
    let orders = orders();
    let stack = ContextStack::new();
    let outer = Select::on_stack(&stack, Dialect::MySQL80)
        .select([field("u", "id")])
        .unwrap()
        .from(&users, "u")
        .unwrap();

    let err = outer
        .scope()
        .sub_query()
        .select([field("o", "id")])
        .unwrap()
        .from(&orders, "o")
        .unwrap()
        .where_(field("nope", "id").eq(1))
        .unwrap_err();
    assert_eq!(err, CriteriaError::UnknownAlias("nope".into()));
    assert_eq!(stack.depth(), 1);

    // The parent is still usable.
    outer.where_(field("u", "active").eq(true)).unwrap().build().unwrap();
    assert!(stack.is_empty());
}

#[test]
fn test_parent_cannot_finish_while_a_sub_query_is_open() {
    let users = users();
    let orders = orders();
    let stack = ContextStack::new();
    let mut outer = Select::on_stack(&stack, Dialect::MySQL80)
        .select([field("u", "id")])
        .unwrap()
        .from(&users, "u")
        .unwrap();
    let pending = outer
        .scope()
        .sub_query()
        .select([field("o", "id")])
        .unwrap()
        .from(&orders, "o")
        .unwrap();

    let err = outer.prepare().unwrap_err();
    assert!(matches!(err, CriteriaError::Context(_)));
    // The failure aborts the parent and unwinds everything above it.
    assert!(stack.is_empty());
    drop(pending);
    assert!(stack.is_empty());
}
