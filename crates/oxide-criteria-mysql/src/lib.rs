//! # oxide-criteria-mysql
//!
//! MySQL rendering for `oxide-criteria-core` statements.
//!
//! # How MySQL 5.7 and 8.0 differ
//!
//! - **[WITH]**, **[WINDOW]**, **[LATERAL]** derived tables and the
//!   **[VALUES] statement** exist in 8.0 only.
//! - **INTERSECT** and **EXCEPT** were added in 8.0.31; 5.7 knows only
//!   UNION.
//! - **[Locking reads]**: `FOR SHARE`, `OF tbl` and `NOWAIT` / `SKIP
//!   LOCKED` are 8.0 additions; 5.7 has `FOR UPDATE` and `LOCK IN SHARE
//!   MODE`.
//! - **[ROLLUP]**: 8.0 allows ORDER BY together with `GROUP BY ... WITH
//!   ROLLUP`.
//! - **[DELETE]**: 8.0 accepts an alias on a single-table DELETE.
//!
//! The [`MySqlRenderer`] validates every statement against its configured
//! version before printing it, so a tree using an 8.0 construct is rejected
//! by a 5.7 renderer instead of producing SQL the server refuses.
//!
//! [WITH]: https://dev.mysql.com/doc/refman/8.0/en/with.html
//! [WINDOW]: https://dev.mysql.com/doc/refman/8.0/en/window-functions-named-windows.html
//! [LATERAL]: https://dev.mysql.com/doc/refman/8.0/en/lateral-derived-tables.html
//! [VALUES]: https://dev.mysql.com/doc/refman/8.0/en/values.html
//! [Locking reads]: https://dev.mysql.com/doc/refman/8.0/en/innodb-locking-reads.html
//! [ROLLUP]: https://dev.mysql.com/doc/refman/8.0/en/group-by-modifiers.html
//! [DELETE]: https://dev.mysql.com/doc/refman/8.0/en/delete.html
//!
//! ## Example
//!
//! ```rust
//! use oxide_criteria_core::{field, Dialect, Select, SqlType, SqlValue, TableMeta};
//! use oxide_criteria_mysql::MySqlRenderer;
//!
//! let users = TableMeta::builder("users")
//!     .field("id", SqlType::BigInt)
//!     .field("name", SqlType::VarChar)
//!     .build();
//!
//! let stmt = Select::new(Dialect::MySQL57)
//!     .select([field("u", "name")])?
//!     .from(&users, "u")?
//!     .where_(field("u", "id").eq(42_i64))?
//!     .limit(1)?
//!     .build()?;
//!
//! let (sql, params) = MySqlRenderer::new(Dialect::MySQL57).to_sql(stmt)?;
//! assert_eq!(sql, "SELECT `u`.`name` FROM `users` AS `u` WHERE `u`.`id` = ? LIMIT 1");
//! assert_eq!(params, vec![SqlValue::Int(42)]);
//! # Ok::<(), oxide_criteria_mysql::MySqlError>(())
//! ```

mod config;
mod error;
mod keywords;
mod renderer;

pub use config::MySqlConfig;
pub use error::{MySqlError, Result};
pub use renderer::MySqlRenderer;
