//! MySQL version policies.

use super::{Dialect, DialectPolicy, RollupPlacement};
use crate::stmt::{LockMode, LockWait, UnionType};

/// MySQL 5.7: no WITH, WINDOW, VALUES, LATERAL, `FOR SHARE` or lock options.
#[derive(Debug, Default, Clone, Copy)]
pub struct MySql57Policy;

impl DialectPolicy for MySql57Policy {
    fn dialect(&self) -> Dialect {
        Dialect::MySQL57
    }
}

/// MySQL 8.0 (8.0.31 feature level for INTERSECT and EXCEPT).
#[derive(Debug, Default, Clone, Copy)]
pub struct MySql80Policy;

impl DialectPolicy for MySql80Policy {
    fn dialect(&self) -> Dialect {
        Dialect::MySQL80
    }

    fn supports_set_operator(&self, operator: UnionType) -> bool {
        let _ = operator;
        true
    }

    fn rollup_placement(&self) -> RollupPlacement {
        RollupPlacement::GroupByOrOrderBy
    }

    fn supports_order_by_after_rollup(&self) -> bool {
        true
    }

    fn supports_with(&self) -> bool {
        true
    }

    fn supports_dml_with(&self) -> bool {
        true
    }

    fn supports_window(&self) -> bool {
        true
    }

    fn supports_values_statement(&self) -> bool {
        true
    }

    fn supports_values_operand(&self) -> bool {
        true
    }

    fn supports_lateral(&self) -> bool {
        true
    }

    fn supports_lock_mode(&self, mode: LockMode) -> bool {
        let _ = mode;
        true
    }

    fn supports_lock_of(&self) -> bool {
        true
    }

    fn supports_lock_wait(&self, wait: LockWait) -> bool {
        let _ = wait;
        true
    }

    fn supports_single_delete_alias(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mysql57_policy() {
        let policy = MySql57Policy;
        assert!(policy.supports_set_operator(UnionType::UnionAll));
        assert!(!policy.supports_set_operator(UnionType::Intersect));
        assert!(!policy.supports_set_operator(UnionType::ExceptAll));
        assert_eq!(policy.rollup_placement(), RollupPlacement::GroupByOnly);
        assert!(policy.supports_lock_mode(LockMode::LockInShareMode));
        assert!(!policy.supports_lock_mode(LockMode::ForShare));
        assert!(!policy.supports_lock_wait(LockWait::SkipLocked));
        assert!(!policy.supports_with());
    }

    #[test]
    fn test_mysql80_policy() {
        let policy = MySql80Policy;
        assert!(policy.supports_set_operator(UnionType::Except));
        assert_eq!(policy.rollup_placement(), RollupPlacement::GroupByOrOrderBy);
        assert!(policy.supports_lock_mode(LockMode::ForShare));
        assert!(policy.supports_lock_of());
        assert!(policy.supports_values_operand());
    }
}
