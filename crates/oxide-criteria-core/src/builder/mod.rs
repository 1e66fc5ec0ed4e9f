//! Typestate statement builders.
//!
//! Each entry point opens a context on a fresh [`ContextStack`] and returns
//! a builder in its initial phase. Clause methods consume the builder and
//! return it in the next phase, so clause order is checked at compile time,
//! while alias resolution, dialect support and argument checks happen at
//! run time and abort the statement on failure.
//!
//! # Example
//!
//! ```rust
//! use oxide_criteria_core::{field, param, Dialect, Select, SqlType, TableMeta};
//!
//! let users = TableMeta::builder("users")
//!     .field("id", SqlType::BigInt)
//!     .field("name", SqlType::VarChar)
//!     .build();
//!
//! let stmt = Select::new(Dialect::MySQL80)
//!     .select([field("u", "id"), field("u", "name")])?
//!     .from(&users, "u")?
//!     .where_(field("u", "id").eq(param(7_i64)))?
//!     .prepare()?;
//! assert!(!stmt.is_lateral());
//! # Ok::<(), oxide_criteria_core::CriteriaError>(())
//! ```

mod compose;
mod delete;
mod draft;
mod joins;
mod kind;
mod phase;
mod query;
mod scope;
mod state;
mod statement;
mod update;
mod values;

pub use compose::{bracket, union, Compatible, Operand, SetOpBuilder};
pub use joins::DynamicJoins;
pub use kind::{
    AnyKind, BuilderKind, Family, FromCapable, IndexHintCapable, JoinCapable, MultiDeleteKind,
    MultiUpdateKind, OrderCapable, QueryKind, ScalarKind, SelectKind, SingleDeleteKind,
    SingleUpdateKind, SubQueryKind, UpdateKind, ValuesKind,
};
pub use phase::{
    AssignPhase, Assigned, Composed, Filterable, Filtered, Groupable, Grouped, Having,
    HavingPhase, HintPhase, Initial, JoinPhase, Joined, Limitable, Limited, Lockable, Locked,
    Locking, Orderable, Ordered, PendingOn, Preparable, RowPhase, Rows, Selected, Sources,
    Windowable, Windowed,
};
pub use scope::Scope;
pub use statement::StatementBuilder;
pub use values::ValuesBuilder;

use crate::context::ContextStack;
use crate::dialect::Dialect;

/// A top-level SELECT under construction.
pub type SelectBuilder<Ph = Initial, C = ()> = StatementBuilder<SelectKind, Ph, C>;
/// A sub-query under construction.
pub type SubQueryBuilder<Ph = Initial, C = ()> = StatementBuilder<SubQueryKind, Ph, C>;
/// A scalar sub-query under construction.
pub type ScalarSubQueryBuilder<Ph = Initial, C = ()> = StatementBuilder<ScalarKind, Ph, C>;
/// A single-table DELETE under construction.
pub type SingleDeleteBuilder<Ph = Initial, C = ()> = StatementBuilder<SingleDeleteKind, Ph, C>;
/// A multi-table DELETE under construction.
pub type MultiDeleteBuilder<Ph = Initial, C = ()> = StatementBuilder<MultiDeleteKind, Ph, C>;
/// A single-table UPDATE under construction.
pub type SingleUpdateBuilder<Ph = Initial, C = ()> = StatementBuilder<SingleUpdateKind, Ph, C>;
/// A multi-table UPDATE under construction.
pub type MultiUpdateBuilder<Ph = Initial, C = ()> = StatementBuilder<MultiUpdateKind, Ph, C>;

/// Entry point for top-level SELECT statements.
#[derive(Debug, Clone, Copy)]
pub struct Select;

impl Select {
    /// Begins a SELECT on its own context stack.
    #[allow(clippy::new_ret_no_self)]
    #[must_use]
    pub fn new(dialect: Dialect) -> SelectBuilder {
        Self::with_criteria(dialect, ())
    }

    /// Begins a SELECT carrying a criteria value, readable from every
    /// phase through [`StatementBuilder::criteria`] and from the `if_*`
    /// clause callbacks.
    #[must_use]
    pub fn with_criteria<C>(dialect: Dialect, criteria: C) -> SelectBuilder<Initial, C> {
        StatementBuilder::open(ContextStack::new(), None, dialect, criteria)
    }

    /// Begins a SELECT on an existing stack, for callers that inspect the
    /// stack while building.
    #[must_use]
    pub fn on_stack(stack: &ContextStack, dialect: Dialect) -> SelectBuilder {
        StatementBuilder::open(stack.clone(), None, dialect, ())
    }
}

/// Entry point for top-level VALUES statements.
#[derive(Debug, Clone, Copy)]
pub struct Values;

impl Values {
    /// Begins a VALUES statement.
    #[allow(clippy::new_ret_no_self)]
    #[must_use]
    pub fn new(dialect: Dialect) -> ValuesBuilder<Initial> {
        Self::with_criteria(dialect, ())
    }

    /// Begins a VALUES statement carrying a criteria value.
    #[must_use]
    pub fn with_criteria<C>(dialect: Dialect, criteria: C) -> ValuesBuilder<Initial, C> {
        ValuesBuilder::open(ContextStack::new(), None, dialect, criteria)
    }
}

/// Entry point for DELETE statements.
#[derive(Debug, Clone, Copy)]
pub struct Delete;

impl Delete {
    /// Begins `DELETE FROM t ...`.
    #[must_use]
    pub fn single(dialect: Dialect) -> SingleDeleteBuilder {
        Self::single_with(dialect, ())
    }

    /// Begins `DELETE a, b FROM ...`.
    #[must_use]
    pub fn multi(dialect: Dialect) -> MultiDeleteBuilder {
        Self::multi_with(dialect, ())
    }

    /// Single-table form carrying a criteria value.
    #[must_use]
    pub fn single_with<C>(dialect: Dialect, criteria: C) -> SingleDeleteBuilder<Initial, C> {
        StatementBuilder::open(ContextStack::new(), None, dialect, criteria)
    }

    /// Multi-table form carrying a criteria value.
    #[must_use]
    pub fn multi_with<C>(dialect: Dialect, criteria: C) -> MultiDeleteBuilder<Initial, C> {
        StatementBuilder::open(ContextStack::new(), None, dialect, criteria)
    }
}

/// Entry point for UPDATE statements.
#[derive(Debug, Clone, Copy)]
pub struct Update;

impl Update {
    /// Begins `UPDATE t AS a SET ...`.
    #[must_use]
    pub fn single(dialect: Dialect) -> SingleUpdateBuilder {
        Self::single_with(dialect, ())
    }

    /// Begins `UPDATE a JOIN b ... SET ...`.
    #[must_use]
    pub fn multi(dialect: Dialect) -> MultiUpdateBuilder {
        Self::multi_with(dialect, ())
    }

    /// Single-table form carrying a criteria value.
    #[must_use]
    pub fn single_with<C>(dialect: Dialect, criteria: C) -> SingleUpdateBuilder<Initial, C> {
        StatementBuilder::open(ContextStack::new(), None, dialect, criteria)
    }

    /// Multi-table form carrying a criteria value.
    #[must_use]
    pub fn multi_with<C>(dialect: Dialect, criteria: C) -> MultiUpdateBuilder<Initial, C> {
        StatementBuilder::open(ContextStack::new(), None, dialect, criteria)
    }
}
