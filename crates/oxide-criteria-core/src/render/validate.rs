//! Dialect validation of prepared statements.
//!
//! The builders already consult the policy while a statement is built; this
//! walk repeats the checks for the renderer's dialect, which may differ from
//! the one the statement was built for, and reaches every nested statement:
//! derived tables, CTE bodies, operands and sub-queries inside expressions.

use crate::dialect::{Dialect, DialectPolicy, RollupPlacement};
use crate::error::{CriteriaError, Result};
use crate::expr::Expr;
use crate::stmt::{
    DeleteStatement, LockMode, OrderItem, RowSet, RowSetKind, SelectQuery, Selection, Statement,
    StatementKind, TableBlock, TableItem, Tail, UpdateStatement, WithClause,
};

pub(crate) fn validate(dialect: Dialect, statement: &Statement) -> Result<()> {
    let validator = Validator {
        dialect,
        policy: dialect.policy(),
    };
    match statement {
        Statement::Query(row_set) => validator.row_set(row_set),
        Statement::Delete(delete) => validator.delete(delete),
        Statement::Update(update) => validator.update(update),
    }
}

struct Validator {
    dialect: Dialect,
    policy: &'static dyn DialectPolicy,
}

impl Validator {
    fn require(&self, supported: bool, construct: &str) -> Result<()> {
        self.policy.require(supported, construct)
    }

    fn built_for(&self, found: Dialect) -> Result<()> {
        if found == self.dialect {
            Ok(())
        } else {
            Err(CriteriaError::unsupported(
                self.dialect,
                format!("a statement built for {found}"),
            ))
        }
    }

    fn with(&self, with: &WithClause, dml: bool) -> Result<()> {
        if with.is_empty() {
            return Ok(());
        }
        if dml {
            self.require(self.policy.supports_dml_with(), "WITH on DELETE or UPDATE")?;
        } else {
            self.require(self.policy.supports_with(), "WITH clause")?;
        }
        for cte in &with.ctes {
            self.row_set(&cte.query)?;
        }
        Ok(())
    }

    fn row_set(&self, row_set: &RowSet) -> Result<()> {
        self.built_for(row_set.dialect())?;
        match row_set {
            RowSet::Select(q) => self.select(q)?,
            RowSet::Values(q) => {
                self.require(self.policy.supports_values_statement(), "VALUES statement")?;
                for row in q.rows() {
                    self.exprs(row)?;
                }
            }
            RowSet::Bracket(q) => self.row_set(q.inner())?,
            RowSet::Union(q) => {
                if !self.policy.supports_set_operator(q.operator()) {
                    return Err(CriteriaError::UnsupportedOperator {
                        dialect: self.dialect,
                        operator: q.operator(),
                    });
                }
                if q.right().kind() == RowSetKind::Values && q.left().kind() != RowSetKind::Values
                {
                    self.require(
                        self.policy.supports_values_operand(),
                        "VALUES as a set operation operand",
                    )?;
                }
                self.row_set(q.left())?;
                self.row_set(q.right())?;
            }
        }
        self.tail(row_set.tail())
    }

    fn select(&self, q: &SelectQuery) -> Result<()> {
        self.with(q.with(), false)?;
        for selection in q.selections() {
            if let Selection::Expr { expr, .. } = selection {
                self.expr(expr)?;
            }
        }
        self.sources(q.sources())?;
        self.exprs(q.where_clause())?;
        self.exprs(q.group_by())?;
        self.exprs(q.having())?;
        if q.group_rollup() && !q.tail().order_by().is_empty() {
            self.require(
                self.policy.supports_order_by_after_rollup(),
                "ORDER BY with GROUP BY ... WITH ROLLUP",
            )?;
        }
        if !q.windows().is_empty() {
            self.require(self.policy.supports_window(), "WINDOW clause")?;
            for window in q.windows() {
                self.exprs(&window.partition_by)?;
                self.order_items(&window.order_by)?;
            }
        }
        Ok(())
    }

    fn tail(&self, tail: &Tail) -> Result<()> {
        self.order_items(tail.order_by())?;
        if tail.order_rollup() {
            self.require(
                self.policy.rollup_placement() == RollupPlacement::GroupByOrOrderBy,
                "ORDER BY ... WITH ROLLUP",
            )?;
        }
        let lock = tail.lock();
        if lock.mode != LockMode::None {
            self.require(self.policy.supports_lock_mode(lock.mode), "this locking clause")?;
        }
        if !lock.of.is_empty() {
            self.require(self.policy.supports_lock_of(), "lock OF list")?;
        }
        if let Some(wait) = lock.wait {
            self.require(self.policy.supports_lock_wait(wait), wait.as_str())?;
        }
        Ok(())
    }

    fn sources(&self, sources: &[TableBlock]) -> Result<()> {
        for block in sources {
            if let TableItem::Derived(query) = &block.item {
                if query.is_lateral() {
                    self.require(self.policy.supports_lateral(), "LATERAL derived table")?;
                }
                self.row_set(query.row_set())?;
            }
            self.exprs(&block.on)?;
        }
        Ok(())
    }

    fn delete(&self, d: &DeleteStatement) -> Result<()> {
        self.built_for(d.dialect())?;
        self.with(d.with(), true)?;
        if d.kind() == StatementKind::SingleDelete {
            if let Some(TableBlock {
                item: TableItem::Table(table),
                alias,
                ..
            }) = d.sources().first()
            {
                if alias != table.name() {
                    self.require(
                        self.policy.supports_single_delete_alias(),
                        "alias on single-table DELETE",
                    )?;
                }
            }
        }
        self.sources(d.sources())?;
        self.exprs(d.where_clause())?;
        self.order_items(d.order_by())
    }

    fn update(&self, u: &UpdateStatement) -> Result<()> {
        self.built_for(u.dialect())?;
        self.with(u.with(), true)?;
        self.sources(u.sources())?;
        for assignment in u.assignments() {
            self.expr(&assignment.value)?;
        }
        self.exprs(u.where_clause())?;
        self.order_items(u.order_by())
    }

    fn order_items(&self, items: &[OrderItem]) -> Result<()> {
        items.iter().try_for_each(|item| self.expr(&item.expr))
    }

    fn exprs(&self, exprs: &[Expr]) -> Result<()> {
        exprs.iter().try_for_each(|e| self.expr(e))
    }

    fn expr(&self, expr: &Expr) -> Result<()> {
        match expr {
            Expr::Binary { left, right, .. } => {
                self.expr(left)?;
                self.expr(right)
            }
            Expr::Unary { operand: e, .. }
            | Expr::IsNull { expr: e, .. }
            | Expr::Paren(e) => self.expr(e),
            Expr::InList { expr, list, .. } => {
                self.expr(expr)?;
                self.exprs(list)
            }
            Expr::InQuery { expr, query, .. } => {
                self.expr(expr)?;
                self.row_set(query.row_set())
            }
            Expr::Between {
                expr, low, high, ..
            } => {
                self.expr(expr)?;
                self.expr(low)?;
                self.expr(high)
            }
            Expr::Exists { query, .. } => self.row_set(query.row_set()),
            Expr::Scalar(query) => self.row_set(query.row_set()),
            Expr::Function(call) => self.exprs(&call.args),
            Expr::Field { .. }
            | Expr::Column(_)
            | Expr::Param { .. }
            | Expr::Literal { .. }
            | Expr::Wildcard => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Select;
    use crate::expr::field;
    use crate::meta::{SqlType, TableMeta};

    fn users() -> TableMeta {
        TableMeta::builder("users")
            .field("id", SqlType::BigInt)
            .build()
    }

    #[test]
    fn test_rejects_other_dialect() {
        let stmt = Select::new(Dialect::MySQL80)
            .select([field("u", "id")])
            .unwrap()
            .from(&users(), "u")
            .unwrap()
            .build()
            .unwrap();
        assert!(validate(Dialect::MySQL80, &stmt.to_statement()).is_ok());
        assert!(matches!(
            validate(Dialect::MySQL57, &stmt.to_statement()),
            Err(CriteriaError::Dialect { dialect: Dialect::MySQL57, .. })
        ));
    }

    #[test]
    fn test_rejects_lock_options_on_57() {
        let stmt = Select::new(Dialect::MySQL80)
            .select([field("u", "id")])
            .unwrap()
            .from(&users(), "u")
            .unwrap()
            .for_update()
            .unwrap()
            .skip_locked()
            .unwrap()
            .build()
            .unwrap();
        let validator = Validator {
            dialect: Dialect::MySQL57,
            policy: Dialect::MySQL57.policy(),
        };
        assert!(validator.tail(stmt.row_set().tail()).is_err());
    }
}
