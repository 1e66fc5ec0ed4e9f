//! Prepared statement trees.
//!
//! Everything in this module is produced by a builder's `prepare` call or by
//! the composer, and is immutable from then on. Nodes are reference counted
//! so a prepared statement can be embedded in several parents, composed, and
//! shared across threads for rendering.

mod clause;
mod dml;
mod query;

use std::fmt;
use std::sync::Arc;

use crate::dialect::Dialect;
use crate::error::{CriteriaError, Result};

pub use clause::{
    cte, Assignment, Cte, CteName, IndexHint, IndexHintKind, IndexHintPurpose, JoinKind,
    LockClause, LockMode, LockWait, OrderDirection, OrderItem, Selection, TableBlock, TableItem,
    Tail, Window, WindowSpec, WithClause,
};
pub use dml::{DeleteStatement, UpdateStatement};
pub use query::{BracketQuery, SelectQuery, UnionQuery, ValuesQuery};

/// Statement kinds, including the composites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    /// Top-level SELECT.
    SimpleSelect,
    /// Sub-query used as a derived table, IN/EXISTS operand or CTE body.
    SubQuery,
    /// Sub-query yielding a single value.
    ScalarSubQuery,
    /// `VALUES ROW(...)` statement.
    Values,
    /// Single-table DELETE.
    SingleDelete,
    /// Multi-table DELETE.
    MultiDelete,
    /// Single-table UPDATE.
    SingleUpdate,
    /// Multi-table UPDATE.
    MultiUpdate,
    /// Parenthesized statement.
    Bracket,
    /// Set operation.
    Union,
}

impl StatementKind {
    /// Returns true for DELETE and UPDATE kinds.
    #[must_use]
    pub const fn is_dml(self) -> bool {
        matches!(
            self,
            Self::SingleDelete | Self::MultiDelete | Self::SingleUpdate | Self::MultiUpdate
        )
    }

    /// Returns the row-set family, for kinds that produce rows.
    #[must_use]
    pub const fn row_set_kind(self) -> Option<RowSetKind> {
        match self {
            Self::SimpleSelect => Some(RowSetKind::Select),
            Self::SubQuery => Some(RowSetKind::SubQuery),
            Self::ScalarSubQuery => Some(RowSetKind::ScalarSubQuery),
            Self::Values => Some(RowSetKind::Values),
            _ => None,
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SimpleSelect => "simple select",
            Self::SubQuery => "sub-query",
            Self::ScalarSubQuery => "scalar sub-query",
            Self::Values => "values",
            Self::SingleDelete => "single-table delete",
            Self::MultiDelete => "multi-table delete",
            Self::SingleUpdate => "single-table update",
            Self::MultiUpdate => "multi-table update",
            Self::Bracket => "bracket",
            Self::Union => "union",
        };
        f.write_str(name)
    }
}

/// The family a row-producing statement belongs to.
///
/// Bracketing and set operations keep the family of their left operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowSetKind {
    /// Top-level SELECT.
    Select,
    /// Sub-query.
    SubQuery,
    /// Scalar sub-query.
    ScalarSubQuery,
    /// VALUES statement.
    Values,
}

impl RowSetKind {
    /// Returns the plain statement kind of this family.
    #[must_use]
    pub const fn statement_kind(self) -> StatementKind {
        match self {
            Self::Select => StatementKind::SimpleSelect,
            Self::SubQuery => StatementKind::SubQuery,
            Self::ScalarSubQuery => StatementKind::ScalarSubQuery,
            Self::Values => StatementKind::Values,
        }
    }
}

/// Set operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnionType {
    /// UNION.
    Union,
    /// UNION ALL.
    UnionAll,
    /// UNION DISTINCT.
    UnionDistinct,
    /// INTERSECT.
    Intersect,
    /// INTERSECT ALL.
    IntersectAll,
    /// INTERSECT DISTINCT.
    IntersectDistinct,
    /// EXCEPT.
    Except,
    /// EXCEPT ALL.
    ExceptAll,
    /// EXCEPT DISTINCT.
    ExceptDistinct,
}

impl UnionType {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Union => "UNION",
            Self::UnionAll => "UNION ALL",
            Self::UnionDistinct => "UNION DISTINCT",
            Self::Intersect => "INTERSECT",
            Self::IntersectAll => "INTERSECT ALL",
            Self::IntersectDistinct => "INTERSECT DISTINCT",
            Self::Except => "EXCEPT",
            Self::ExceptAll => "EXCEPT ALL",
            Self::ExceptDistinct => "EXCEPT DISTINCT",
        }
    }
}

impl fmt::Display for UnionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A prepared row-producing statement.
#[derive(Debug, Clone, PartialEq)]
pub enum RowSet {
    /// SELECT of any family.
    Select(Arc<SelectQuery>),
    /// VALUES statement.
    Values(Arc<ValuesQuery>),
    /// Parenthesized row set.
    Bracket(Arc<BracketQuery>),
    /// Set operation.
    Union(Arc<UnionQuery>),
}

impl RowSet {
    /// Returns the family.
    #[must_use]
    pub fn kind(&self) -> RowSetKind {
        match self {
            Self::Select(q) => q.kind(),
            Self::Values(_) => RowSetKind::Values,
            Self::Bracket(q) => q.kind(),
            Self::Union(q) => q.kind(),
        }
    }

    /// Returns the node kind: a plain kind for SELECT and VALUES, otherwise
    /// [`StatementKind::Bracket`] or [`StatementKind::Union`].
    #[must_use]
    pub fn statement_kind(&self) -> StatementKind {
        match self {
            Self::Select(q) => q.kind().statement_kind(),
            Self::Values(_) => StatementKind::Values,
            Self::Bracket(_) => StatementKind::Bracket,
            Self::Union(_) => StatementKind::Union,
        }
    }

    /// Returns the dialect the row set was built for.
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        match self {
            Self::Select(q) => q.dialect(),
            Self::Values(q) => q.dialect(),
            Self::Bracket(q) => q.dialect(),
            Self::Union(q) => q.dialect(),
        }
    }

    /// Returns whether the row set may reference sibling FROM sources.
    #[must_use]
    pub fn is_lateral(&self) -> bool {
        match self {
            Self::Select(q) => q.is_lateral(),
            Self::Values(_) => false,
            Self::Bracket(q) => q.is_lateral(),
            Self::Union(q) => q.is_lateral(),
        }
    }

    /// Returns the trailing ORDER BY / LIMIT / lock clauses.
    #[must_use]
    pub fn tail(&self) -> &Tail {
        match self {
            Self::Select(q) => q.tail(),
            Self::Values(q) => q.tail(),
            Self::Bracket(q) => q.tail(),
            Self::Union(q) => q.tail(),
        }
    }

    /// Returns the column names the row set exposes, or `None` when a
    /// column is unnamed or comes from a `*` selection.
    #[must_use]
    pub fn output_names(&self) -> Option<Vec<String>> {
        match self {
            Self::Select(q) => q
                .selections()
                .iter()
                .map(|s| s.output_name().map(String::from))
                .collect(),
            Self::Values(q) => Some((0..q.arity()).map(|i| format!("column_{i}")).collect()),
            Self::Bracket(q) => q.inner().output_names(),
            Self::Union(q) => q.left().output_names(),
        }
    }

    /// Returns the number of columns, or `None` when a `*` selection hides it.
    #[must_use]
    pub fn arity(&self) -> Option<usize> {
        match self {
            Self::Select(q) => {
                let star = q
                    .selections()
                    .iter()
                    .any(|s| matches!(s, Selection::All | Selection::AllOf(_)));
                (!star).then_some(q.selections().len())
            }
            Self::Values(q) => Some(q.arity()),
            Self::Bracket(q) => q.inner().arity(),
            Self::Union(q) => q.left().arity(),
        }
    }
}

macro_rules! prepared_handle {
    ($(#[$meta:meta])* $name:ident => $kind:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name(RowSet);

        impl $name {
            pub(crate) const fn new(row_set: RowSet) -> Self {
                Self(row_set)
            }

            /// Returns the underlying row set.
            #[must_use]
            pub const fn row_set(&self) -> &RowSet {
                &self.0
            }

            /// Unwraps the underlying row set.
            #[must_use]
            pub fn into_row_set(self) -> RowSet {
                self.0
            }

            /// Returns the dialect the statement was built for.
            #[must_use]
            pub fn dialect(&self) -> Dialect {
                self.0.dialect()
            }

            /// Returns whether the statement may reference sibling FROM sources.
            #[must_use]
            pub fn is_lateral(&self) -> bool {
                self.0.is_lateral()
            }

            /// Returns the statement as handed to a renderer.
            #[must_use]
            pub fn to_statement(&self) -> Statement {
                Statement::Query(self.0.clone())
            }
        }

        impl From<$name> for RowSet {
            fn from(handle: $name) -> Self {
                handle.0
            }
        }

        impl From<$name> for Statement {
            fn from(handle: $name) -> Self {
                Self::Query(handle.0)
            }
        }

        impl TryFrom<RowSet> for $name {
            type Error = CriteriaError;

            fn try_from(row_set: RowSet) -> Result<Self> {
                if row_set.kind() == RowSetKind::$kind {
                    Ok(Self(row_set))
                } else {
                    Err(CriteriaError::OperandKindMismatch {
                        left: RowSetKind::$kind.statement_kind(),
                        right: row_set.kind().statement_kind(),
                    })
                }
            }
        }
    };
}

prepared_handle!(
    /// A prepared top-level SELECT, possibly bracketed or composed.
    SelectStmt => Select
);
prepared_handle!(
    /// A prepared sub-query.
    SubQueryStmt => SubQuery
);
prepared_handle!(
    /// A prepared scalar sub-query.
    ScalarSubQueryStmt => ScalarSubQuery
);
prepared_handle!(
    /// A prepared VALUES statement.
    ValuesStmt => Values
);

/// A prepared DELETE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStmt(Arc<DeleteStatement>);

impl DeleteStmt {
    pub(crate) fn new(statement: DeleteStatement) -> Self {
        Self(Arc::new(statement))
    }

    /// Returns the statement tree.
    #[must_use]
    pub fn statement(&self) -> &DeleteStatement {
        &self.0
    }

    /// Returns the statement as handed to a renderer.
    #[must_use]
    pub fn to_statement(&self) -> Statement {
        Statement::Delete(Arc::clone(&self.0))
    }
}

impl From<DeleteStmt> for Statement {
    fn from(handle: DeleteStmt) -> Self {
        Self::Delete(handle.0)
    }
}

/// A prepared UPDATE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStmt(Arc<UpdateStatement>);

impl UpdateStmt {
    pub(crate) fn new(statement: UpdateStatement) -> Self {
        Self(Arc::new(statement))
    }

    /// Returns the statement tree.
    #[must_use]
    pub fn statement(&self) -> &UpdateStatement {
        &self.0
    }

    /// Returns the statement as handed to a renderer.
    #[must_use]
    pub fn to_statement(&self) -> Statement {
        Statement::Update(Arc::clone(&self.0))
    }
}

impl From<UpdateStmt> for Statement {
    fn from(handle: UpdateStmt) -> Self {
        Self::Update(handle.0)
    }
}

/// Any prepared statement, as handed to a renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// A row-producing statement.
    Query(RowSet),
    /// A DELETE statement.
    Delete(Arc<DeleteStatement>),
    /// An UPDATE statement.
    Update(Arc<UpdateStatement>),
}

impl Statement {
    /// Returns the node kind.
    #[must_use]
    pub fn kind(&self) -> StatementKind {
        match self {
            Self::Query(q) => q.statement_kind(),
            Self::Delete(d) => d.kind(),
            Self::Update(u) => u.kind(),
        }
    }

    /// Returns the dialect the statement was built for.
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        match self {
            Self::Query(q) => q.dialect(),
            Self::Delete(d) => d.dialect(),
            Self::Update(u) => u.dialect(),
        }
    }
}

impl From<RowSet> for Statement {
    fn from(row_set: RowSet) -> Self {
        Self::Query(row_set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_kind_display() {
        assert_eq!(StatementKind::SimpleSelect.to_string(), "simple select");
        assert_eq!(StatementKind::SubQuery.to_string(), "sub-query");
        assert_eq!(StatementKind::MultiUpdate.to_string(), "multi-table update");
        assert!(StatementKind::SingleDelete.is_dml());
        assert!(!StatementKind::Union.is_dml());
    }

    #[test]
    fn test_row_set_kind_mapping() {
        assert_eq!(
            StatementKind::ScalarSubQuery.row_set_kind(),
            Some(RowSetKind::ScalarSubQuery)
        );
        assert_eq!(StatementKind::Bracket.row_set_kind(), None);
        assert_eq!(
            RowSetKind::Values.statement_kind(),
            StatementKind::Values
        );
    }

    #[test]
    fn test_union_type_as_str() {
        assert_eq!(UnionType::UnionAll.as_str(), "UNION ALL");
        assert_eq!(UnionType::ExceptDistinct.to_string(), "EXCEPT DISTINCT");
    }
}
