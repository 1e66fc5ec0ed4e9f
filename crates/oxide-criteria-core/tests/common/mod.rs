//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use oxide_criteria_core::{
    Dialect, DialectRenderer, GenericRenderer, SqlType, SqlValue, Statement, TableMeta,
};

/// `users(id, name, email?, active)`
pub fn users() -> TableMeta {
    TableMeta::builder("users")
        .field("id", SqlType::BigInt)
        .field("name", SqlType::VarChar)
        .nullable_field("email", SqlType::VarChar)
        .field("active", SqlType::Boolean)
        .build()
}

/// `orders(id, user_id, total, status)`
pub fn orders() -> TableMeta {
    TableMeta::builder("orders")
        .field("id", SqlType::BigInt)
        .field("user_id", SqlType::BigInt)
        .field("total", SqlType::Decimal)
        .field("status", SqlType::VarChar)
        .build()
}

/// `archive.users(id)`
pub fn archived_users() -> TableMeta {
    TableMeta::builder("users")
        .schema("archive")
        .field("id", SqlType::BigInt)
        .build()
}

/// A one-column table named `t`.
pub fn t() -> TableMeta {
    TableMeta::builder("t").field("id", SqlType::Int).build()
}

/// Renders with the ANSI-quoting generic renderer for MySQL 8.0.
pub fn render(statement: impl Into<Statement>) -> (String, Vec<SqlValue>) {
    render_for(Dialect::MySQL80, statement)
}

/// Renders with the generic renderer for `dialect`.
pub fn render_for(dialect: Dialect, statement: impl Into<Statement>) -> (String, Vec<SqlValue>) {
    GenericRenderer::new(dialect)
        .render(&statement.into())
        .expect("statement renders")
}

/// Renders and returns the SQL text only.
pub fn sql(statement: impl Into<Statement>) -> String {
    render(statement).0
}
