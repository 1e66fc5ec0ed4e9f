//! SQL dialect identity and policy.
//!
//! A [`Dialect`] names a database version. The builders never branch on it
//! directly: they ask its [`DialectPolicy`] whether a construct is legal.

mod mysql;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CriteriaError, Result};
use crate::stmt::{LockMode, LockWait, UnionType};

pub use mysql::{MySql57Policy, MySql80Policy};

/// Database family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Database {
    /// MySQL.
    MySQL,
}

/// A supported database version.
///
/// Ordered by release, so `Dialect::MySQL57 < Dialect::MySQL80`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// MySQL 5.7.
    MySQL57,
    /// MySQL 8.0.
    #[default]
    MySQL80,
}

impl Dialect {
    /// Returns the database family.
    #[must_use]
    pub const fn database(self) -> Database {
        match self {
            Self::MySQL57 | Self::MySQL80 => Database::MySQL,
        }
    }

    /// Returns `(major, minor)`.
    #[must_use]
    pub const fn version(self) -> (u8, u8) {
        match self {
            Self::MySQL57 => (5, 7),
            Self::MySQL80 => (8, 0),
        }
    }

    /// Returns the policy object governing this dialect.
    #[must_use]
    pub fn policy(self) -> &'static dyn DialectPolicy {
        match self {
            Self::MySQL57 => &MySql57Policy,
            Self::MySQL80 => &MySql80Policy,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (major, minor) = self.version();
        match self.database() {
            Database::MySQL => write!(f, "MySQL {major}.{minor}"),
        }
    }
}

/// Where `WITH ROLLUP` may be attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollupPlacement {
    /// Only after a non-empty GROUP BY list.
    GroupByOnly,
    /// After GROUP BY, or after ORDER BY when an ORDER BY list is present.
    GroupByOrOrderBy,
}

/// Per-dialect legality rules consulted by the builders, the composer and
/// the validator.
///
/// The defaults describe the most restrictive dialect; implementations
/// opt in to what their version supports.
pub trait DialectPolicy: fmt::Debug + Send + Sync {
    /// Returns the dialect this policy governs.
    fn dialect(&self) -> Dialect;

    /// Returns whether the set operator is supported.
    fn supports_set_operator(&self, operator: UnionType) -> bool {
        matches!(
            operator,
            UnionType::Union | UnionType::UnionAll | UnionType::UnionDistinct
        )
    }

    /// Returns where `WITH ROLLUP` may be attached.
    fn rollup_placement(&self) -> RollupPlacement {
        RollupPlacement::GroupByOnly
    }

    /// Returns whether ORDER BY may follow `GROUP BY ... WITH ROLLUP`.
    fn supports_order_by_after_rollup(&self) -> bool {
        false
    }

    /// Returns whether a WITH clause is supported on queries.
    fn supports_with(&self) -> bool {
        false
    }

    /// Returns whether a WITH clause is supported on DELETE and UPDATE.
    fn supports_dml_with(&self) -> bool {
        false
    }

    /// Returns whether the WINDOW clause is supported.
    fn supports_window(&self) -> bool {
        false
    }

    /// Returns whether the `VALUES ROW(...)` statement is supported.
    fn supports_values_statement(&self) -> bool {
        false
    }

    /// Returns whether a VALUES statement may be the right operand of a
    /// set operation whose left operand is a query.
    fn supports_values_operand(&self) -> bool {
        false
    }

    /// Returns whether LATERAL derived tables are supported.
    fn supports_lateral(&self) -> bool {
        false
    }

    /// Returns whether the lock mode is supported.
    fn supports_lock_mode(&self, mode: LockMode) -> bool {
        !matches!(mode, LockMode::ForShare)
    }

    /// Returns whether `OF table, ...` may restrict a lock.
    fn supports_lock_of(&self) -> bool {
        false
    }

    /// Returns whether the wait option is supported.
    fn supports_lock_wait(&self, wait: LockWait) -> bool {
        let _ = wait;
        false
    }

    /// Returns whether a single-table DELETE may alias its table.
    fn supports_single_delete_alias(&self) -> bool {
        false
    }

    /// Fails with a dialect error unless `supported` holds.
    ///
    /// # Errors
    ///
    /// Returns [`CriteriaError::Dialect`] naming `construct`.
    fn require(&self, supported: bool, construct: &str) -> Result<()> {
        if supported {
            Ok(())
        } else {
            Err(CriteriaError::unsupported(self.dialect(), construct))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_order_and_display() {
        assert!(Dialect::MySQL57 < Dialect::MySQL80);
        assert_eq!(Dialect::MySQL57.to_string(), "MySQL 5.7");
        assert_eq!(Dialect::MySQL80.version(), (8, 0));
        assert_eq!(Dialect::default(), Dialect::MySQL80);
    }

    #[test]
    fn test_policy_lookup() {
        assert_eq!(Dialect::MySQL57.policy().dialect(), Dialect::MySQL57);
        assert_eq!(Dialect::MySQL80.policy().dialect(), Dialect::MySQL80);
    }

    #[test]
    fn test_require() {
        let policy = Dialect::MySQL57.policy();
        assert!(policy.require(true, "anything").is_ok());
        assert_eq!(
            policy.require(policy.supports_window(), "WINDOW clause"),
            Err(CriteriaError::Dialect {
                dialect: Dialect::MySQL57,
                construct: String::from("WINDOW clause"),
            })
        );
    }

    #[test]
    fn test_dialect_serde() {
        let json = serde_json::to_string(&Dialect::MySQL57).unwrap();
        assert_eq!(json, "\"mysql57\"");
        let back: Dialect = serde_json::from_str("\"mysql80\"").unwrap();
        assert_eq!(back, Dialect::MySQL80);
    }
}
