//! Row-producing statement nodes.

use super::clause::{Selection, TableBlock, Tail, Window, WithClause};
use super::{RowSet, RowSetKind, UnionType};
use crate::dialect::Dialect;
use crate::expr::Expr;

/// A prepared SELECT of any family.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    pub(crate) kind: RowSetKind,
    pub(crate) dialect: Dialect,
    pub(crate) lateral: bool,
    pub(crate) with: WithClause,
    pub(crate) distinct: bool,
    pub(crate) selections: Box<[Selection]>,
    pub(crate) sources: Box<[TableBlock]>,
    pub(crate) where_clause: Box<[Expr]>,
    pub(crate) group_by: Box<[Expr]>,
    pub(crate) group_rollup: bool,
    pub(crate) having: Box<[Expr]>,
    pub(crate) windows: Box<[Window]>,
    pub(crate) tail: Tail,
}

impl SelectQuery {
    /// Returns the family.
    #[must_use]
    pub const fn kind(&self) -> RowSetKind {
        self.kind
    }

    /// Returns the dialect.
    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Returns whether this is a LATERAL sub-query.
    #[must_use]
    pub const fn is_lateral(&self) -> bool {
        self.lateral
    }

    /// Returns the WITH clause.
    #[must_use]
    pub const fn with(&self) -> &WithClause {
        &self.with
    }

    /// Returns whether DISTINCT applies.
    #[must_use]
    pub const fn is_distinct(&self) -> bool {
        self.distinct
    }

    /// Returns the SELECT list.
    #[must_use]
    pub fn selections(&self) -> &[Selection] {
        &self.selections
    }

    /// Returns the FROM list, leading source first.
    #[must_use]
    pub fn sources(&self) -> &[TableBlock] {
        &self.sources
    }

    /// Returns the WHERE predicates, joined with AND.
    #[must_use]
    pub fn where_clause(&self) -> &[Expr] {
        &self.where_clause
    }

    /// Returns the GROUP BY list.
    #[must_use]
    pub fn group_by(&self) -> &[Expr] {
        &self.group_by
    }

    /// Returns whether `WITH ROLLUP` follows GROUP BY.
    #[must_use]
    pub const fn group_rollup(&self) -> bool {
        self.group_rollup
    }

    /// Returns the HAVING predicates, joined with AND.
    #[must_use]
    pub fn having(&self) -> &[Expr] {
        &self.having
    }

    /// Returns the WINDOW definitions.
    #[must_use]
    pub fn windows(&self) -> &[Window] {
        &self.windows
    }

    /// Returns ORDER BY, LIMIT and the locking clause.
    #[must_use]
    pub const fn tail(&self) -> &Tail {
        &self.tail
    }
}

/// A prepared `VALUES ROW(...), ...` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ValuesQuery {
    pub(crate) dialect: Dialect,
    pub(crate) rows: Box<[Box<[Expr]>]>,
    pub(crate) tail: Tail,
}

impl ValuesQuery {
    /// Returns the dialect.
    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Returns the rows.
    #[must_use]
    pub fn rows(&self) -> &[Box<[Expr]>] {
        &self.rows
    }

    /// Returns the number of columns per row.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.rows.first().map_or(0, |row| row.len())
    }

    /// Returns ORDER BY and LIMIT.
    #[must_use]
    pub const fn tail(&self) -> &Tail {
        &self.tail
    }
}

/// A parenthesized row set with its own trailing clauses.
#[derive(Debug, Clone, PartialEq)]
pub struct BracketQuery {
    pub(crate) kind: RowSetKind,
    pub(crate) dialect: Dialect,
    pub(crate) lateral: bool,
    pub(crate) inner: RowSet,
    pub(crate) tail: Tail,
}

impl BracketQuery {
    /// Returns the family, inherited from the inner row set.
    #[must_use]
    pub const fn kind(&self) -> RowSetKind {
        self.kind
    }

    /// Returns the dialect.
    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Returns whether the inner row set is lateral.
    #[must_use]
    pub const fn is_lateral(&self) -> bool {
        self.lateral
    }

    /// Returns the bracketed row set.
    #[must_use]
    pub const fn inner(&self) -> &RowSet {
        &self.inner
    }

    /// Returns the clauses applied to the bracketed result.
    #[must_use]
    pub const fn tail(&self) -> &Tail {
        &self.tail
    }
}

/// `left <operator> right`, with clauses applied to the whole result.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionQuery {
    pub(crate) kind: RowSetKind,
    pub(crate) dialect: Dialect,
    pub(crate) lateral: bool,
    pub(crate) left: RowSet,
    pub(crate) operator: UnionType,
    pub(crate) right: RowSet,
    pub(crate) tail: Tail,
}

impl UnionQuery {
    /// Returns the family, inherited from the left operand.
    #[must_use]
    pub const fn kind(&self) -> RowSetKind {
        self.kind
    }

    /// Returns the dialect.
    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Returns whether either operand is lateral.
    #[must_use]
    pub const fn is_lateral(&self) -> bool {
        self.lateral
    }

    /// Returns the left operand.
    #[must_use]
    pub const fn left(&self) -> &RowSet {
        &self.left
    }

    /// Returns the set operator.
    #[must_use]
    pub const fn operator(&self) -> UnionType {
        self.operator
    }

    /// Returns the right operand.
    #[must_use]
    pub const fn right(&self) -> &RowSet {
        &self.right
    }

    /// Returns the clauses applied to the whole result.
    #[must_use]
    pub const fn tail(&self) -> &Tail {
        &self.tail
    }
}
