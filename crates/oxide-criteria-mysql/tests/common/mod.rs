//! Shared fixtures for the MySQL rendering tests.

#![allow(dead_code)]

use oxide_criteria_core::{Dialect, SqlType, SqlValue, Statement, TableMeta};
use oxide_criteria_mysql::MySqlRenderer;

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

/// A table whose name and columns are MySQL reserved words.
pub fn order_table() -> TableMeta {
    TableMeta::builder("order")
        .field("key", SqlType::Int)
        .field("select", SqlType::VarChar)
        .build()
}

pub fn mysql57(statement: impl Into<Statement>) -> (String, Vec<SqlValue>) {
    MySqlRenderer::new(Dialect::MySQL57)
        .to_sql(statement)
        .expect("statement renders for MySQL 5.7")
}

pub fn mysql80(statement: impl Into<Statement>) -> (String, Vec<SqlValue>) {
    MySqlRenderer::new(Dialect::MySQL80)
        .to_sql(statement)
        .expect("statement renders for MySQL 8.0")
}
