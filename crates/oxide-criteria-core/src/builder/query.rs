//! SELECT-family clauses: select list, GROUP BY, HAVING, WINDOW, OFFSET and
//! locking.

use std::collections::HashSet;
use std::sync::Arc;

use super::kind::QueryKind;
use super::phase::{
    Groupable, Grouped, Having, HavingPhase, Initial, Limited, Lockable, Locked, Locking, Ordered,
    Selected, Windowable, Windowed,
};
use super::StatementBuilder;
use crate::dialect::RollupPlacement;
use crate::error::{CriteriaError, Result};
use crate::expr::Expr;
use crate::stmt::{
    LockMode, LockWait, RowSet, RowSetKind, SelectQuery, Selection, Window, WindowSpec,
};

impl<K: QueryKind, C> StatementBuilder<K, Initial, C> {
    fn add_selections(&mut self, distinct: bool, items: Vec<Selection>) -> Result<()> {
        if items.is_empty() {
            return Err(CriteriaError::invalid("SELECT list must not be empty"));
        }
        self.draft.distinct = distinct;
        self.draft.selections = items;
        Ok(())
    }

    /// Writes the SELECT list.
    ///
    /// Field references are resolved at `prepare`, once the FROM list is
    /// known.
    ///
    /// # Errors
    ///
    /// Fails with [`CriteriaError::InvalidArgument`] for an empty list.
    pub fn select<I>(self, items: I) -> Result<StatementBuilder<K, Selected, C>>
    where
        I: IntoIterator,
        I::Item: Into<Selection>,
    {
        self.step(|b| b.add_selections(false, items.into_iter().map(Into::into).collect()))
    }

    /// Writes a `SELECT DISTINCT` list.
    ///
    /// # Errors
    ///
    /// As [`select`](Self::select).
    pub fn select_distinct<I>(self, items: I) -> Result<StatementBuilder<K, Selected, C>>
    where
        I: IntoIterator,
        I::Item: Into<Selection>,
    {
        self.step(|b| b.add_selections(true, items.into_iter().map(Into::into).collect()))
    }
}

impl<K: QueryKind, Ph: Groupable, C> StatementBuilder<K, Ph, C> {
    /// Writes the GROUP BY list.
    ///
    /// # Errors
    ///
    /// Fails with [`CriteriaError::InvalidArgument`] for an empty list, or
    /// when an expression references an unknown alias or field.
    pub fn group_by(
        self,
        exprs: impl IntoIterator<Item = Expr>,
    ) -> Result<StatementBuilder<K, Grouped, C>> {
        self.step(|b| {
            let context = b.state.context();
            for mut expr in exprs {
                context.resolve_expr(&mut expr)?;
                b.draft.group_by.push(expr);
            }
            if b.draft.group_by.is_empty() {
                return Err(CriteriaError::invalid("GROUP BY list must not be empty"));
            }
            Ok(())
        })
    }
}

impl<K: QueryKind, C> StatementBuilder<K, Grouped, C> {
    /// Appends `WITH ROLLUP` to the GROUP BY list.
    ///
    /// # Errors
    ///
    /// Fails with [`CriteriaError::InvalidArgument`] when the rollup is
    /// already present.
    pub fn with_rollup(self) -> Result<Self> {
        self.step(|b| {
            if b.draft.group_rollup {
                return Err(CriteriaError::invalid("GROUP BY already has WITH ROLLUP"));
            }
            b.draft.group_rollup = true;
            Ok(())
        })
    }
}

impl<K: QueryKind, C> StatementBuilder<K, Ordered, C> {
    /// Appends `WITH ROLLUP` to the ORDER BY list, where the dialect places
    /// rollups there.
    ///
    /// # Errors
    ///
    /// Fails with [`CriteriaError::Dialect`] on dialects that only roll up
    /// GROUP BY, and with [`CriteriaError::InvalidArgument`] when a rollup is
    /// already present.
    pub fn with_rollup(self) -> Result<Self> {
        self.step(|b| {
            let policy = b.state.policy();
            policy.require(
                policy.rollup_placement() == RollupPlacement::GroupByOrOrderBy,
                "WITH ROLLUP after ORDER BY",
            )?;
            if b.draft.group_rollup || b.draft.tail.order_rollup {
                return Err(CriteriaError::invalid("statement already has WITH ROLLUP"));
            }
            b.draft.tail.order_rollup = true;
            Ok(())
        })
    }
}

impl<K: QueryKind, Ph: HavingPhase, C> StatementBuilder<K, Ph, C> {
    /// Adds a HAVING predicate; repeated calls are joined with AND.
    ///
    /// # Errors
    ///
    /// Fails when the predicate references an unknown alias or field.
    pub fn having(self, mut predicate: Expr) -> Result<StatementBuilder<K, Having, C>> {
        self.step(|b| {
            b.state.context().resolve_expr(&mut predicate)?;
            b.draft.having.push(predicate);
            Ok(())
        })
    }
}

impl<K: QueryKind, Ph: Windowable, C> StatementBuilder<K, Ph, C> {
    /// Defines a named window.
    ///
    /// # Errors
    ///
    /// Fails with [`CriteriaError::Dialect`] where WINDOW is unsupported,
    /// and with [`CriteriaError::InvalidArgument`] for a duplicate name or a
    /// reference to a window not defined before.
    pub fn window(self, name: &str, spec: WindowSpec) -> Result<StatementBuilder<K, Windowed, C>> {
        self.step(|b| {
            b.state.require(b.state.policy().supports_window(), "WINDOW clause")?;
            let known = |n: &str| b.draft.windows.iter().any(|w| w.name == n);
            if name.is_empty() || known(name) {
                return Err(CriteriaError::invalid(format!(
                    "window name '{name}' is empty or already defined"
                )));
            }
            if let Some(reference) = spec.reference.as_deref() {
                if !known(reference) {
                    return Err(CriteriaError::invalid(format!(
                        "window '{name}' refers to undefined window '{reference}'"
                    )));
                }
            }
            let context = b.state.context();
            let mut partition_by = spec.partition_by;
            for expr in &mut partition_by {
                context.resolve_expr(expr)?;
            }
            let mut order_by = spec.order_by;
            for item in &mut order_by {
                context.resolve_expr(&mut item.expr)?;
            }
            b.draft.windows.push(Window {
                name: String::from(name),
                reference: spec.reference,
                partition_by: partition_by.into_boxed_slice(),
                order_by: order_by.into_boxed_slice(),
            });
            Ok(())
        })
    }
}

impl<K: QueryKind, C> StatementBuilder<K, Limited, C> {
    /// Skips rows before the limited range.
    ///
    /// # Errors
    ///
    /// Fails with [`CriteriaError::InvalidArgument`] for a negative offset.
    pub fn offset(self, offset: i64) -> Result<Self> {
        self.step(|b| b.draft.tail.set_offset(offset))
    }
}

impl<K: QueryKind, Ph: Lockable, C> StatementBuilder<K, Ph, C> {
    /// Adds `FOR UPDATE`.
    ///
    /// # Errors
    ///
    /// Fails only once the statement is prepared or aborted.
    pub fn for_update(self) -> Result<StatementBuilder<K, Locking, C>> {
        self.lock(LockMode::ForUpdate)
    }

    /// Adds `FOR SHARE`.
    ///
    /// # Errors
    ///
    /// Fails with [`CriteriaError::Dialect`] where `FOR SHARE` is
    /// unsupported.
    pub fn for_share(self) -> Result<StatementBuilder<K, Locking, C>> {
        self.lock(LockMode::ForShare)
    }

    /// Adds the legacy `LOCK IN SHARE MODE`, which takes no options.
    ///
    /// # Errors
    ///
    /// Fails only once the statement is prepared or aborted.
    pub fn lock_in_share_mode(self) -> Result<StatementBuilder<K, Locked, C>> {
        self.step(|b| {
            let policy = b.state.policy();
            b.draft.tail.set_lock(policy, LockMode::LockInShareMode)
        })
    }

    /// Adds a lock chosen at run time.
    ///
    /// # Errors
    ///
    /// Fails with [`CriteriaError::InvalidArgument`] for [`LockMode::None`]
    /// and with [`CriteriaError::Dialect`] for an unsupported mode.
    pub fn lock(self, mode: LockMode) -> Result<StatementBuilder<K, Locking, C>> {
        self.step(|b| {
            let policy = b.state.policy();
            b.draft.tail.set_lock(policy, mode)
        })
    }
}

impl<K: QueryKind, C> StatementBuilder<K, Locking, C> {
    /// Restricts the lock to the given aliases of this statement.
    ///
    /// # Errors
    ///
    /// Fails with [`CriteriaError::InvalidArgument`] after the legacy
    /// share mode, [`CriteriaError::Dialect`] where `OF` is unsupported and
    /// [`CriteriaError::UnknownAlias`] for an alias not registered here.
    pub fn of(self, aliases: &[&str]) -> Result<Self> {
        self.step(|b| {
            let policy = b.state.policy();
            b.draft.tail.add_lock_of(policy, b.state.context(), aliases)
        })
    }

    /// Adds `NOWAIT`.
    ///
    /// # Errors
    ///
    /// Fails with [`CriteriaError::InvalidArgument`] after the legacy share
    /// mode and with [`CriteriaError::Dialect`] where unsupported.
    pub fn nowait(self) -> Result<StatementBuilder<K, Locked, C>> {
        self.step(|b| {
            let policy = b.state.policy();
            b.draft.tail.set_lock_wait(policy, LockWait::NoWait)
        })
    }

    /// Adds `SKIP LOCKED`.
    ///
    /// # Errors
    ///
    /// As [`nowait`](Self::nowait).
    pub fn skip_locked(self) -> Result<StatementBuilder<K, Locked, C>> {
        self.step(|b| {
            let policy = b.state.policy();
            b.draft.tail.set_lock_wait(policy, LockWait::SkipLocked)
        })
    }
}

impl<K: QueryKind, Ph, C> StatementBuilder<K, Ph, C> {
    fn resolve_selections(&mut self) -> Result<()> {
        let context = self.state.context();
        let mut names = HashSet::new();
        for selection in &mut self.draft.selections {
            match selection {
                Selection::Expr { expr, alias } => {
                    context.resolve_expr(expr)?;
                    if let Some(alias) = alias {
                        if !names.insert(alias.clone()) {
                            return Err(CriteriaError::invalid(format!(
                                "selection alias '{alias}' is used twice"
                            )));
                        }
                    }
                }
                Selection::AllOf(alias) => {
                    if context.lookup(alias).is_none() {
                        return Err(CriteriaError::UnknownAlias(alias.clone()));
                    }
                }
                Selection::All => {}
            }
        }
        Ok(())
    }

    pub(crate) fn assemble_query(&mut self) -> Result<RowSet> {
        if self.draft.sources.is_empty() {
            return Err(CriteriaError::invalid(format!(
                "{} requires at least one table source",
                K::KIND
            )));
        }
        self.resolve_selections()?;
        if K::ROW_SET == RowSetKind::ScalarSubQuery {
            let single = matches!(self.draft.selections.as_slice(), [Selection::Expr { .. }]);
            if !single {
                return Err(CriteriaError::invalid(
                    "scalar sub-query must select exactly one expression",
                ));
            }
        }

        self.state.finish()?;
        let mut draft = std::mem::take(&mut self.draft);
        let with = draft.take_with();
        let sources = draft.take_sources();
        let query = SelectQuery {
            kind: K::ROW_SET,
            dialect: self.state.dialect(),
            lateral: self.lateral,
            with,
            distinct: draft.distinct,
            selections: draft.selections.into_boxed_slice(),
            sources,
            where_clause: draft.where_clause.into_boxed_slice(),
            group_by: draft.group_by.into_boxed_slice(),
            group_rollup: draft.group_rollup,
            having: draft.having.into_boxed_slice(),
            windows: draft.windows.into_boxed_slice(),
            tail: draft.tail.freeze(),
        };
        let row_set = RowSet::Select(Arc::new(query));
        self.output = Some(row_set.clone());
        Ok(row_set)
    }
}
