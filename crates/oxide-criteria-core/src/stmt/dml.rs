//! DELETE and UPDATE statement nodes.

use super::clause::{Assignment, OrderItem, TableBlock, WithClause};
use super::StatementKind;
use crate::dialect::Dialect;
use crate::expr::Expr;

/// A prepared single- or multi-table DELETE.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    pub(crate) kind: StatementKind,
    pub(crate) dialect: Dialect,
    pub(crate) with: WithClause,
    pub(crate) targets: Box<[String]>,
    pub(crate) sources: Box<[TableBlock]>,
    pub(crate) where_clause: Box<[Expr]>,
    pub(crate) order_by: Box<[OrderItem]>,
    pub(crate) row_count: Option<u64>,
}

impl DeleteStatement {
    /// Returns [`StatementKind::SingleDelete`] or [`StatementKind::MultiDelete`].
    #[must_use]
    pub const fn kind(&self) -> StatementKind {
        self.kind
    }

    /// Returns the dialect.
    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Returns the WITH clause.
    #[must_use]
    pub const fn with(&self) -> &WithClause {
        &self.with
    }

    /// Returns the aliases rows are deleted from. Empty for single-table
    /// deletes.
    #[must_use]
    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    /// Returns the table sources.
    #[must_use]
    pub fn sources(&self) -> &[TableBlock] {
        &self.sources
    }

    /// Returns the WHERE predicates.
    #[must_use]
    pub fn where_clause(&self) -> &[Expr] {
        &self.where_clause
    }

    /// Returns the ORDER BY list.
    #[must_use]
    pub fn order_by(&self) -> &[OrderItem] {
        &self.order_by
    }

    /// Returns the LIMIT row count.
    #[must_use]
    pub const fn row_count(&self) -> Option<u64> {
        self.row_count
    }
}

/// A prepared single- or multi-table UPDATE.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    pub(crate) kind: StatementKind,
    pub(crate) dialect: Dialect,
    pub(crate) with: WithClause,
    pub(crate) sources: Box<[TableBlock]>,
    pub(crate) assignments: Box<[Assignment]>,
    pub(crate) where_clause: Box<[Expr]>,
    pub(crate) order_by: Box<[OrderItem]>,
    pub(crate) row_count: Option<u64>,
}

impl UpdateStatement {
    /// Returns [`StatementKind::SingleUpdate`] or [`StatementKind::MultiUpdate`].
    #[must_use]
    pub const fn kind(&self) -> StatementKind {
        self.kind
    }

    /// Returns the dialect.
    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Returns the WITH clause.
    #[must_use]
    pub const fn with(&self) -> &WithClause {
        &self.with
    }

    /// Returns the table sources.
    #[must_use]
    pub fn sources(&self) -> &[TableBlock] {
        &self.sources
    }

    /// Returns the SET list.
    #[must_use]
    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    /// Returns the WHERE predicates.
    #[must_use]
    pub fn where_clause(&self) -> &[Expr] {
        &self.where_clause
    }

    /// Returns the ORDER BY list.
    #[must_use]
    pub fn order_by(&self) -> &[OrderItem] {
        &self.order_by
    }

    /// Returns the LIMIT row count.
    #[must_use]
    pub const fn row_count(&self) -> Option<u64> {
        self.row_count
    }
}
