//! Error types for statement construction.

use crate::dialect::Dialect;
use crate::stmt::{StatementKind, UnionType};

/// Errors raised while a statement is being assembled or rendered.
///
/// Every variant is a caller-logic error: none of them is transient and
/// none is retried. Raising one during construction unwinds the context
/// stack back to the depth it had before the failing statement began.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CriteriaError {
    /// The context stack push/pop discipline was violated.
    #[error("context stack violation: {0}")]
    Context(String),

    /// A table alias was registered twice in one statement.
    #[error("table alias '{0}' is already registered in this statement")]
    DuplicateAlias(String),

    /// A table alias is unknown to the current and all outer statements.
    #[error("unknown table alias '{0}'")]
    UnknownAlias(String),

    /// The referenced table source does not declare the field.
    #[error("table source '{alias}' has no field '{field}'")]
    UnknownField {
        /// Table alias.
        alias: String,
        /// Field name.
        field: String,
    },

    /// A common table expression name was declared twice.
    #[error("common table expression '{0}' is declared twice")]
    DuplicateCteName(String),

    /// No enclosing WITH clause declares the common table expression.
    #[error("unknown common table expression '{0}'")]
    UnknownCte(String),

    /// A join was left without its ON predicate.
    #[error("join of '{0}' is missing its ON clause")]
    MissingOnClause(String),

    /// An argument is out of range or a required list is empty.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A required argument was absent.
    #[error("{0} must be present")]
    NullArgument(&'static str),

    /// An operand handed to the composer was never prepared.
    #[error("{0} operand is not prepared")]
    NotPrepared(StatementKind),

    /// The operands of a set operation belong to incompatible kinds.
    #[error("cannot combine {left} with {right}")]
    OperandKindMismatch {
        /// Kind of the left operand.
        left: StatementKind,
        /// Kind of the right operand.
        right: StatementKind,
    },

    /// The dialect does not know the set operator.
    #[error("{dialect} does not support set operator {operator}")]
    UnsupportedOperator {
        /// Target dialect.
        dialect: Dialect,
        /// Rejected operator.
        operator: UnionType,
    },

    /// A mutation was attempted after the statement was prepared.
    #[error("{0} statement is already prepared")]
    AlreadyPrepared(StatementKind),

    /// The construct is not supported by the dialect.
    #[error("{dialect} does not support {construct}")]
    Dialect {
        /// Target dialect.
        dialect: Dialect,
        /// Description of the rejected construct.
        construct: String,
    },
}

impl CriteriaError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub(crate) fn unsupported(dialect: Dialect, construct: impl Into<String>) -> Self {
        Self::Dialect {
            dialect,
            construct: construct.into(),
        }
    }
}

/// Result type for statement construction.
pub type Result<T> = std::result::Result<T, CriteriaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CriteriaError::OperandKindMismatch {
            left: StatementKind::SimpleSelect,
            right: StatementKind::SubQuery,
        };
        assert_eq!(err.to_string(), "cannot combine simple select with sub-query");

        let err = CriteriaError::unsupported(Dialect::MySQL57, "WINDOW clause");
        assert_eq!(err.to_string(), "MySQL 5.7 does not support WINDOW clause");
    }
}
