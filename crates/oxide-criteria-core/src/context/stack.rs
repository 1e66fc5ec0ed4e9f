//! The stack of statements under construction.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, trace, warn};

use super::CriteriaContext;
use crate::error::{CriteriaError, Result};
use crate::stmt::StatementKind;

/// The contexts of the statements currently being built, innermost last.
///
/// Clones share one stack: a top-level builder creates a stack and every
/// sub-statement started from its scope pushes onto the same one. The stack
/// is neither `Send` nor `Sync`; building statements on several threads
/// requires one stack per thread.
#[derive(Debug, Clone, Default)]
pub struct ContextStack {
    frames: Rc<RefCell<Vec<Rc<CriteriaContext>>>>,
}

impl ContextStack {
    /// Creates an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of open contexts.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.borrow().len()
    }

    /// Returns true when no statement is under construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.borrow().is_empty()
    }

    /// Returns the innermost open context.
    #[must_use]
    pub fn peek(&self) -> Option<Rc<CriteriaContext>> {
        self.frames.borrow().last().cloned()
    }

    /// Returns whether `context` is open on this stack.
    #[must_use]
    pub fn contains(&self, context: &CriteriaContext) -> bool {
        self.position(context).is_some()
    }

    /// Returns whether both handles share one stack.
    #[must_use]
    pub fn same_stack(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.frames, &other.frames)
    }

    fn position(&self, context: &CriteriaContext) -> Option<usize> {
        self.frames
            .borrow()
            .iter()
            .position(|frame| frame.id() == context.id())
    }

    /// Makes `context` the innermost context.
    ///
    /// # Errors
    ///
    /// Returns [`CriteriaError::Context`] if the context is already open.
    pub fn push(&self, context: Rc<CriteriaContext>) -> Result<()> {
        if self.contains(&context) {
            return Err(CriteriaError::Context(format!(
                "{} context #{} is pushed twice",
                context.kind(),
                context.id()
            )));
        }
        trace!(kind = %context.kind(), id = context.id(), depth = self.depth(), "push context");
        self.frames.borrow_mut().push(context);
        Ok(())
    }

    /// Opens a fresh context for a statement of `kind`.
    pub(crate) fn open(
        &self,
        kind: StatementKind,
        outer: Option<Rc<CriteriaContext>>,
    ) -> Rc<CriteriaContext> {
        let context = Rc::new(CriteriaContext::new(kind, outer));
        trace!(kind = %kind, id = context.id(), depth = self.depth(), "push context");
        self.frames.borrow_mut().push(Rc::clone(&context));
        context
    }

    /// Removes `context`, which must be the innermost context.
    ///
    /// # Errors
    ///
    /// Returns [`CriteriaError::Context`] if the stack is empty or another
    /// context is on top, e.g. a sub-statement that was never finished.
    pub fn pop(&self, context: &CriteriaContext) -> Result<Rc<CriteriaContext>> {
        let mut frames = self.frames.borrow_mut();
        match frames.last() {
            Some(top) if top.id() == context.id() => {}
            Some(top) => {
                return Err(CriteriaError::Context(format!(
                    "cannot finish {} context #{} while {} context #{} is open",
                    context.kind(),
                    context.id(),
                    top.kind(),
                    top.id()
                )));
            }
            None => {
                return Err(CriteriaError::Context(format!(
                    "cannot finish {} context #{}: the stack is empty",
                    context.kind(),
                    context.id()
                )));
            }
        }
        let popped = frames.pop();
        drop(frames);
        trace!(kind = %context.kind(), id = context.id(), depth = self.depth(), "pop context");
        popped.ok_or_else(|| CriteriaError::Context(String::from("stack emptied during pop")))
    }

    /// Drops `context` and every context opened after it, then hands `error`
    /// back for propagation.
    ///
    /// Leaves the stack at the depth it had before `context` was opened. A
    /// context that is no longer on the stack leaves it untouched.
    #[must_use]
    pub fn raise_and_unwind(&self, context: &CriteriaContext, error: CriteriaError) -> CriteriaError {
        match self.position(context) {
            Some(depth) => {
                let dropped = self.frames.borrow_mut().split_off(depth);
                warn!(
                    kind = %context.kind(),
                    id = context.id(),
                    depth,
                    dropped = dropped.len(),
                    error = %error,
                    "statement construction failed, unwinding context stack"
                );
            }
            None => {
                debug!(
                    kind = %context.kind(),
                    id = context.id(),
                    error = %error,
                    "statement construction failed outside the stack"
                );
            }
        }
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop_peek() {
        let stack = ContextStack::new();
        assert!(stack.is_empty());
        let outer = stack.open(StatementKind::SimpleSelect, None);
        let inner = stack.open(StatementKind::SubQuery, Some(Rc::clone(&outer)));
        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.peek().map(|c| c.id()), Some(inner.id()));

        stack.pop(&inner).unwrap();
        stack.pop(&outer).unwrap();
        assert!(stack.is_empty());
    }

    #[test]
    fn test_double_push_fails() {
        let stack = ContextStack::new();
        let ctx = stack.open(StatementKind::SimpleSelect, None);
        let err = stack.push(Rc::clone(&ctx)).unwrap_err();
        assert!(matches!(err, CriteriaError::Context(_)));
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn test_out_of_order_pop_fails() {
        let stack = ContextStack::new();
        let outer = stack.open(StatementKind::SimpleSelect, None);
        let _inner = stack.open(StatementKind::SubQuery, Some(Rc::clone(&outer)));
        let err = stack.pop(&outer).unwrap_err();
        assert!(matches!(err, CriteriaError::Context(_)));
        assert_eq!(stack.depth(), 2);
    }

    #[test]
    fn test_pop_on_empty_stack_fails() {
        let stack = ContextStack::new();
        let ctx = CriteriaContext::new(StatementKind::SimpleSelect, None);
        assert!(matches!(stack.pop(&ctx), Err(CriteriaError::Context(_))));
    }

    #[test]
    fn test_raise_and_unwind_truncates() {
        let stack = ContextStack::new();
        let base = stack.open(StatementKind::SimpleSelect, None);
        let failing = stack.open(StatementKind::SubQuery, Some(Rc::clone(&base)));
        let _nested = stack.open(StatementKind::ScalarSubQuery, Some(Rc::clone(&failing)));

        let err = stack.raise_and_unwind(&failing, CriteriaError::UnknownAlias("x".into()));
        assert_eq!(err, CriteriaError::UnknownAlias("x".into()));
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.peek().map(|c| c.id()), Some(base.id()));

        // Unwinding a context that is gone is a no-op.
        let _ = stack.raise_and_unwind(&failing, CriteriaError::UnknownAlias("x".into()));
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn test_clones_share_frames() {
        let stack = ContextStack::new();
        let other = stack.clone();
        let _ctx = stack.open(StatementKind::SimpleSelect, None);
        assert_eq!(other.depth(), 1);
        assert!(stack.same_stack(&other));
        assert!(!stack.same_stack(&ContextStack::new()));
    }
}
