//! DELETE clauses.

use std::collections::HashSet;

use super::kind::{MultiDeleteKind, SingleDeleteKind};
use super::phase::{Initial, Joined, Selected};
use super::StatementBuilder;
use crate::error::{CriteriaError, Result};
use crate::meta::TableMeta;
use crate::stmt::{DeleteStatement, DeleteStmt, TableItem};

impl<C> StatementBuilder<SingleDeleteKind, Initial, C> {
    /// Writes `DELETE FROM table`.
    ///
    /// # Errors
    ///
    /// Fails only once the statement is prepared or aborted.
    pub fn delete_from(self, table: &TableMeta) -> Result<StatementBuilder<SingleDeleteKind, Joined, C>> {
        let alias = String::from(table.name());
        self.delete_from_as(table, &alias)
    }

    /// Writes `DELETE FROM table AS alias`.
    ///
    /// # Errors
    ///
    /// Fails with [`CriteriaError::Dialect`] where a single-table DELETE
    /// cannot alias its table.
    pub fn delete_from_as(
        self,
        table: &TableMeta,
        alias: &str,
    ) -> Result<StatementBuilder<SingleDeleteKind, Joined, C>> {
        self.step(|b| {
            if alias != table.name() {
                let policy = b.state.policy();
                policy.require(
                    policy.supports_single_delete_alias(),
                    "alias on single-table DELETE",
                )?;
            }
            b.draft.add_source(
                b.state.context(),
                b.state.dialect(),
                None,
                TableItem::Table(table.clone()),
                alias,
            )
        })
    }
}

impl<C> StatementBuilder<MultiDeleteKind, Initial, C> {
    /// Names the aliases whose rows are deleted; the FROM list follows.
    ///
    /// # Errors
    ///
    /// Fails with [`CriteriaError::InvalidArgument`] for an empty or
    /// repeating list.
    pub fn delete(self, targets: &[&str]) -> Result<StatementBuilder<MultiDeleteKind, Selected, C>> {
        self.step(|b| {
            if targets.is_empty() {
                return Err(CriteriaError::invalid("DELETE target list must not be empty"));
            }
            let mut seen = HashSet::new();
            for target in targets {
                if !seen.insert(*target) {
                    return Err(CriteriaError::invalid(format!(
                        "DELETE target '{target}' is listed twice"
                    )));
                }
            }
            b.draft.targets = targets.iter().map(|t| String::from(*t)).collect();
            Ok(())
        })
    }
}

impl<K: super::BuilderKind, Ph, C> StatementBuilder<K, Ph, C> {
    pub(crate) fn assemble_delete(&mut self) -> Result<DeleteStmt> {
        let context = self.state.context();
        for target in &self.draft.targets {
            let source = context
                .lookup(target)
                .ok_or_else(|| CriteriaError::UnknownAlias(target.clone()))?;
            if source.table().is_none() {
                return Err(CriteriaError::invalid(format!(
                    "DELETE target '{target}' is not a base table"
                )));
            }
        }
        if self.draft.sources.is_empty() {
            return Err(CriteriaError::invalid("DELETE requires a table source"));
        }

        self.state.finish()?;
        let mut draft = std::mem::take(&mut self.draft);
        let with = draft.take_with();
        let sources = draft.take_sources();
        Ok(DeleteStmt::new(DeleteStatement {
            kind: K::KIND,
            dialect: self.state.dialect(),
            with,
            targets: draft.targets.into_boxed_slice(),
            sources,
            where_clause: draft.where_clause.into_boxed_slice(),
            order_by: draft.tail.order_by.into_boxed_slice(),
            row_count: draft.tail.row_count,
        }))
    }
}
