//! Turning prepared statements into SQL text.
//!
//! A [`DialectRenderer`] owns every spelling decision: identifier quoting,
//! string escaping, literal formatting, the LIMIT form and the locking
//! clause. The clause layout itself is shared by all renderers. Rendering
//! always validates the statement against the renderer's dialect first, so
//! a tree built for MySQL 8.0 is never printed as MySQL 5.7.

mod generic;
mod validate;
mod writer;

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dialect::Dialect;
use crate::error::{CriteriaError, Result};
use crate::meta::SqlType;
use crate::stmt::{LockClause, LockMode, Statement, StatementKind};
use crate::value::SqlValue;

pub use generic::GenericRenderer;

use writer::SqlWriter;

/// How values of [`Expr::Param`](crate::expr::Expr::Param) are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiteralMode {
    /// Emit a placeholder and return the value as a bind parameter.
    #[default]
    Parameterize,
    /// Write the value into the SQL text.
    Inline,
}

/// Returns whether `name` can be written without quotes when the dialect
/// does not reserve it: an ASCII letter or underscore followed by ASCII
/// letters, digits or underscores.
#[must_use]
pub fn is_simple_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_decimal_literal(text: &str) -> bool {
    let digits = text.strip_prefix(['-', '+']).unwrap_or(text);
    let (int, frac) = digits.split_once('.').unwrap_or((digits, ""));
    !(int.is_empty() && frac.is_empty())
        && int.chars().all(|c| c.is_ascii_digit())
        && frac.chars().all(|c| c.is_ascii_digit())
}

/// The boundary between statement trees and SQL text.
///
/// Implementations override the spelling hooks; [`render`](Self::render)
/// and the clause layout come for free.
pub trait DialectRenderer: fmt::Debug + Send + Sync {
    /// Returns the dialect this renderer writes.
    fn dialect(&self) -> Dialect;

    /// Returns the dialect new statements of `kind` should be built for
    /// when they are meant for this renderer.
    fn default_dialect(&self, kind: StatementKind) -> Dialect {
        let _ = kind;
        self.dialect()
    }

    /// Returns the identifier quote character.
    fn identifier_quote(&self) -> char {
        '"'
    }

    /// Returns whether every identifier is quoted.
    fn quote_all_identifiers(&self) -> bool {
        true
    }

    /// Returns whether `name` is a reserved word that must be quoted.
    fn is_reserved(&self, name: &str) -> bool {
        let _ = name;
        false
    }

    /// Appends `name` as an identifier, quoting it when required and
    /// doubling embedded quote characters.
    fn identifier(&self, name: &str, out: &mut String) {
        if !self.quote_all_identifiers() && is_simple_identifier(name) && !self.is_reserved(name) {
            out.push_str(name);
            return;
        }
        let quote = self.identifier_quote();
        out.push(quote);
        for c in name.chars() {
            if c == quote {
                out.push(quote);
            }
            out.push(c);
        }
        out.push(quote);
    }

    /// Returns how bind parameters are written.
    fn literal_mode(&self) -> LiteralMode {
        LiteralMode::Parameterize
    }

    /// Appends the placeholder of the `index`-th parameter, counted from 1.
    fn placeholder(&self, index: usize, out: &mut String) {
        let _ = index;
        out.push('?');
    }

    /// Appends the body of a string literal, without the enclosing quotes.
    fn escape_string(&self, value: &str, out: &mut String) {
        for c in value.chars() {
            if c == '\'' {
                out.push('\'');
            }
            out.push(c);
        }
    }

    /// Appends `value` as an inline literal.
    ///
    /// `sql_type` is the type of the field the value is compared with or
    /// assigned to, when known; numbers bound for string-like fields are
    /// quoted so that the comparison stays a string comparison.
    ///
    /// # Errors
    ///
    /// Fails with [`CriteriaError::InvalidArgument`] for a non-finite float
    /// or a malformed decimal.
    fn append_literal(
        &self,
        sql_type: Option<SqlType>,
        value: &SqlValue,
        out: &mut String,
    ) -> Result<()> {
        let quoted = sql_type.is_some_and(SqlType::is_string_like);
        let number = |text: String, out: &mut String| {
            if quoted {
                out.push('\'');
                out.push_str(&text);
                out.push('\'');
            } else {
                out.push_str(&text);
            }
        };
        match value {
            SqlValue::Null => out.push_str("NULL"),
            SqlValue::Bool(true) => out.push_str("TRUE"),
            SqlValue::Bool(false) => out.push_str("FALSE"),
            SqlValue::Int(v) => number(v.to_string(), out),
            SqlValue::UInt(v) => number(v.to_string(), out),
            SqlValue::Float(v) => {
                if !v.is_finite() {
                    return Err(CriteriaError::invalid(format!(
                        "float literal {v} has no SQL form"
                    )));
                }
                number(v.to_string(), out);
            }
            SqlValue::Decimal(text) => {
                if !is_decimal_literal(text) {
                    return Err(CriteriaError::invalid(format!(
                        "'{text}' is not a decimal literal"
                    )));
                }
                number(text.clone(), out);
            }
            SqlValue::Text(text) => {
                out.push('\'');
                self.escape_string(text, out);
                out.push('\'');
            }
            SqlValue::Blob(bytes) => {
                out.push_str("X'");
                for byte in bytes {
                    out.push_str(&format!("{byte:02X}"));
                }
                out.push('\'');
            }
        }
        Ok(())
    }

    /// Appends the LIMIT clause, with a leading space, when a row count is
    /// set.
    fn append_limit(&self, row_count: Option<u64>, offset: Option<u64>, out: &mut String) {
        if let Some(row_count) = row_count {
            out.push_str(" LIMIT ");
            out.push_str(&row_count.to_string());
            if let Some(offset) = offset {
                out.push_str(" OFFSET ");
                out.push_str(&offset.to_string());
            }
        }
    }

    /// Appends the locking clause, with a leading space.
    fn append_lock(&self, lock: &LockClause, out: &mut String) {
        let mode = match lock.mode {
            LockMode::None => return,
            LockMode::ForUpdate => " FOR UPDATE",
            LockMode::ForShare => " FOR SHARE",
            LockMode::LockInShareMode => " LOCK IN SHARE MODE",
        };
        out.push_str(mode);
        for (i, alias) in lock.of.iter().enumerate() {
            out.push_str(if i == 0 { " OF " } else { ", " });
            self.identifier(alias, out);
        }
        if let Some(wait) = lock.wait {
            out.push(' ');
            out.push_str(wait.as_str());
        }
    }

    /// Checks that every node of `statement` was built for this renderer's
    /// dialect and uses only constructs its policy allows.
    ///
    /// # Errors
    ///
    /// Fails with [`CriteriaError::Dialect`] or
    /// [`CriteriaError::UnsupportedOperator`].
    fn validate(&self, statement: &Statement) -> Result<()> {
        validate::validate(self.dialect(), statement)
    }

    /// Validates and renders `statement`, returning the SQL text and the
    /// bind parameters in placeholder order.
    ///
    /// # Errors
    ///
    /// Fails as [`validate`](Self::validate) does, or with
    /// [`CriteriaError::InvalidArgument`] for a value that cannot be
    /// written inline.
    fn render(&self, statement: &Statement) -> Result<(String, Vec<SqlValue>)> {
        self.validate(statement)?;
        let mut writer = SqlWriter::new(self);
        writer.statement(statement)?;
        let (sql, params) = writer.finish();
        debug!(
            kind = %statement.kind(),
            dialect = %self.dialect(),
            params = params.len(),
            "rendered statement"
        );
        Ok((sql, params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_identifier() {
        assert!(is_simple_identifier("users"));
        assert!(is_simple_identifier("_tmp1"));
        assert!(!is_simple_identifier("1abc"));
        assert!(!is_simple_identifier("first name"));
        assert!(!is_simple_identifier(""));
    }

    #[test]
    fn test_decimal_literal() {
        assert!(is_decimal_literal("12.50"));
        assert!(is_decimal_literal("-3"));
        assert!(is_decimal_literal(".5"));
        assert!(!is_decimal_literal("."));
        assert!(!is_decimal_literal("1e5"));
        assert!(!is_decimal_literal("1; DROP TABLE t"));
    }

    #[test]
    fn test_default_literals() {
        let renderer = GenericRenderer::new(Dialect::MySQL80);
        let mut out = String::new();
        renderer
            .append_literal(None, &SqlValue::Text(String::from("it's")), &mut out)
            .unwrap();
        assert_eq!(out, "'it''s'");

        out.clear();
        renderer
            .append_literal(Some(SqlType::VarChar), &SqlValue::Int(42), &mut out)
            .unwrap();
        assert_eq!(out, "'42'");

        out.clear();
        renderer
            .append_literal(None, &SqlValue::Blob(vec![0xde, 0xad]), &mut out)
            .unwrap();
        assert_eq!(out, "X'DEAD'");

        assert!(renderer
            .append_literal(None, &SqlValue::Float(f64::NAN), &mut out)
            .is_err());
    }

    #[test]
    fn test_default_identifier_quoting() {
        let renderer = GenericRenderer::new(Dialect::MySQL80);
        let mut out = String::new();
        renderer.identifier("odd\"name", &mut out);
        assert_eq!(out, "\"odd\"\"name\"");
    }

    #[test]
    fn test_literal_mode_serde() {
        let mode: LiteralMode = serde_json::from_str("\"inline\"").unwrap();
        assert_eq!(mode, LiteralMode::Inline);
        assert_eq!(LiteralMode::default(), LiteralMode::Parameterize);
    }
}
