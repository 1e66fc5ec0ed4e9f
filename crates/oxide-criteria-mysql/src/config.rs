//! Renderer configuration.

use oxide_criteria_core::{Dialect, LiteralMode};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Settings of a [`MySqlRenderer`](crate::MySqlRenderer).
///
/// Every field is optional in JSON; missing fields take their defaults:
///
/// ```rust
/// use oxide_criteria_core::{Dialect, LiteralMode};
/// use oxide_criteria_mysql::MySqlConfig;
///
/// let config = MySqlConfig::from_json_str(r#"{"dialect": "mysql57"}"#)?;
/// assert_eq!(config.dialect, Dialect::MySQL57);
/// assert_eq!(config.literal_mode, LiteralMode::Parameterize);
/// assert!(config.quote_all_identifiers);
/// # Ok::<(), oxide_criteria_mysql::MySqlError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MySqlConfig {
    /// Server version statements are validated against.
    pub dialect: Dialect,
    /// Whether values become bind parameters or inline literals.
    pub literal_mode: LiteralMode,
    /// Quote every identifier, or only reserved and unusual ones.
    pub quote_all_identifiers: bool,
}

impl Default for MySqlConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::MySQL80,
            literal_mode: LiteralMode::Parameterize,
            quote_all_identifiers: true,
        }
    }
}

impl MySqlConfig {
    /// Default settings for `dialect`.
    #[must_use]
    pub fn for_dialect(dialect: Dialect) -> Self {
        Self {
            dialect,
            ..Self::default()
        }
    }

    /// Parses a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`MySqlError::Config`](crate::MySqlError::Config) for
    /// malformed JSON, an unknown dialect or an unknown field.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MySqlError;

    #[test]
    fn test_empty_json_gives_defaults() {
        assert_eq!(MySqlConfig::from_json_str("{}").unwrap(), MySqlConfig::default());
    }

    #[test]
    fn test_full_json() {
        let config = MySqlConfig::from_json_str(
            r#"{"dialect": "mysql57", "literal_mode": "inline", "quote_all_identifiers": false}"#,
        )
        .unwrap();
        assert_eq!(
            config,
            MySqlConfig {
                dialect: Dialect::MySQL57,
                literal_mode: LiteralMode::Inline,
                quote_all_identifiers: false,
            }
        );
    }

    #[test]
    fn test_rejects_unknown_dialect_and_fields() {
        assert!(matches!(
            MySqlConfig::from_json_str(r#"{"dialect": "mysql56"}"#),
            Err(MySqlError::Config(_))
        ));
        assert!(matches!(
            MySqlConfig::from_json_str(r#"{"quote": true}"#),
            Err(MySqlError::Config(_))
        ));
    }

    #[test]
    fn test_serialize_round_trip() {
        let config = MySqlConfig::for_dialect(Dialect::MySQL57);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(MySqlConfig::from_json_str(&json).unwrap(), config);
    }
}
