//! MySQL renderer.

use oxide_criteria_core::{Dialect, DialectRenderer, LiteralMode, SqlValue, Statement};
use tracing::debug;

use crate::config::MySqlConfig;
use crate::error::Result;
use crate::keywords;

/// Renders statements for MySQL 5.7 or 8.0.
///
/// Identifiers are quoted with backticks, strings use MySQL's backslash
/// escapes and LIMIT takes the `LIMIT offset, count` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MySqlRenderer {
    config: MySqlConfig,
}

impl MySqlRenderer {
    /// Creates a renderer with default settings for `dialect`.
    #[must_use]
    pub fn new(dialect: Dialect) -> Self {
        Self::with_config(MySqlConfig::for_dialect(dialect))
    }

    /// Creates a renderer from explicit settings.
    #[must_use]
    pub fn with_config(config: MySqlConfig) -> Self {
        debug!(
            dialect = %config.dialect,
            literal_mode = ?config.literal_mode,
            quote_all_identifiers = config.quote_all_identifiers,
            "configured MySQL renderer"
        );
        Self { config }
    }

    /// Creates a renderer from a JSON configuration.
    ///
    /// # Errors
    ///
    /// As [`MySqlConfig::from_json_str`].
    pub fn from_json_str(json: &str) -> Result<Self> {
        MySqlConfig::from_json_str(json).map(Self::with_config)
    }

    /// Returns the settings.
    #[must_use]
    pub const fn config(&self) -> &MySqlConfig {
        &self.config
    }

    /// Renders any prepared statement handle.
    ///
    /// # Errors
    ///
    /// Returns [`MySqlError::Criteria`](crate::MySqlError::Criteria) when
    /// the statement does not validate for this renderer's dialect or holds
    /// a value with no literal form.
    pub fn to_sql(&self, statement: impl Into<Statement>) -> Result<(String, Vec<SqlValue>)> {
        Ok(self.render(&statement.into())?)
    }
}

impl Default for MySqlRenderer {
    fn default() -> Self {
        Self::with_config(MySqlConfig::default())
    }
}

impl DialectRenderer for MySqlRenderer {
    fn dialect(&self) -> Dialect {
        self.config.dialect
    }

    fn identifier_quote(&self) -> char {
        '`'
    }

    fn quote_all_identifiers(&self) -> bool {
        self.config.quote_all_identifiers
    }

    fn is_reserved(&self, name: &str) -> bool {
        keywords::is_reserved(name)
    }

    fn literal_mode(&self) -> LiteralMode {
        self.config.literal_mode
    }

    fn escape_string(&self, value: &str, out: &mut String) {
        for c in value.chars() {
            match c {
                '\\' => out.push_str("\\\\"),
                '\'' => out.push_str("\\'"),
                '\0' => out.push_str("\\0"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\u{1a}' => out.push_str("\\Z"),
                c => out.push(c),
            }
        }
    }

    fn append_limit(&self, row_count: Option<u64>, offset: Option<u64>, out: &mut String) {
        let Some(row_count) = row_count else {
            return;
        };
        out.push_str(" LIMIT ");
        if let Some(offset) = offset {
            out.push_str(&offset.to_string());
            out.push_str(", ");
        }
        out.push_str(&row_count.to_string());
    }
}
