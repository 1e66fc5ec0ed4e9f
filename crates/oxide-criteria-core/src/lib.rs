//! # oxide-criteria-core
//!
//! Dialect-aware SQL statement assembly.
//!
//! This crate provides:
//! - Typestate builders for SELECT, sub-queries, scalar sub-queries, VALUES,
//!   and single- or multi-table DELETE and UPDATE
//! - A context stack that scopes table aliases and CTE names to the
//!   statement being built and unwinds cleanly when construction fails
//! - A composer for brackets and set operations over prepared statements
//! - A [`DialectPolicy`] per MySQL version and a [`DialectRenderer`]
//!   boundary that validates and prints the finished tree
//!
//! ## Building a statement
//!
//! Clauses must be written in SQL order; writing them out of order does not
//! compile:
//!
//! ```rust
//! use oxide_criteria_core::{field, Dialect, GenericRenderer, DialectRenderer, Select, SqlType, TableMeta};
//!
//! let users = TableMeta::builder("users")
//!     .field("id", SqlType::BigInt)
//!     .field("active", SqlType::Boolean)
//!     .build();
//!
//! let stmt = Select::new(Dialect::MySQL80)
//!     .select([field("u", "id")])?
//!     .from(&users, "u")?
//!     .where_(field("u", "active").eq(true))?
//!     .order_by([field("u", "id").desc()])?
//!     .limit(10)?
//!     .build()?;
//!
//! let (sql, params) = GenericRenderer::new(Dialect::MySQL80).render(&stmt.to_statement())?;
//! assert_eq!(
//!     sql,
//!     r#"SELECT "u"."id" FROM "users" AS "u" WHERE "u"."active" = ? ORDER BY "u"."id" DESC LIMIT 10"#
//! );
//! assert_eq!(params.len(), 1);
//!
//! // This would NOT compile:
//! // Select::new(Dialect::MySQL80).select([field("u", "id")])?.limit(1);
//! # Ok::<(), oxide_criteria_core::CriteriaError>(())
//! ```
//!
//! ## Composing
//!
//! ```rust
//! use oxide_criteria_core::{field, Dialect, Select, SqlType, TableMeta};
//!
//! let t = TableMeta::builder("t").field("id", SqlType::Int).build();
//! let first = Select::new(Dialect::MySQL80)
//!     .select([field("a", "id")])?
//!     .from(&t, "a")?
//!     .build()?;
//! let second = Select::new(Dialect::MySQL80)
//!     .select([field("b", "id")])?
//!     .from(&t, "b")?
//!     .build()?;
//!
//! let all = first.union_all(&second)?.limit(5)?.build()?;
//! assert_eq!(all.row_set().tail().row_count(), Some(5));
//! # Ok::<(), oxide_criteria_core::CriteriaError>(())
//! ```

pub mod builder;
pub mod context;
pub mod dialect;
pub mod error;
pub mod expr;
pub mod meta;
pub mod render;
pub mod stmt;
pub mod value;

pub use builder::{bracket, union, Delete, Operand, Scope, Select, StatementBuilder, Update, Values};
pub use context::{ContextStack, CriteriaContext};
pub use dialect::{Database, Dialect, DialectPolicy, RollupPlacement};
pub use error::{CriteriaError, Result};
pub use expr::{col, count_star, exists, field, func, literal, not_exists, param, Expr, IntoExpr};
pub use meta::{FieldMeta, SqlType, TableMeta};
pub use render::{DialectRenderer, GenericRenderer, LiteralMode};
pub use stmt::{
    cte, CteName, DeleteStmt, LockMode, RowSet, RowSetKind, ScalarSubQueryStmt, SelectStmt,
    Statement, StatementKind, SubQueryStmt, UnionType, UpdateStmt, ValuesStmt, WindowSpec,
};
pub use value::{SqlValue, ToSqlValue};
