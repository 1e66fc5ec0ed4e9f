//! UPDATE clauses.

use super::kind::{MultiUpdateKind, SingleUpdateKind, UpdateKind};
use super::phase::{AssignPhase, Assigned, Initial, Selected, Sources};
use super::StatementBuilder;
use crate::context::SourceRef;
use crate::error::{CriteriaError, Result};
use crate::expr::{Expr, IntoExpr};
use crate::meta::{SqlType, TableMeta};
use crate::stmt::{Assignment, TableItem, UpdateStatement, UpdateStmt};

impl<C> StatementBuilder<SingleUpdateKind, Initial, C> {
    /// Writes `UPDATE table AS alias`; SET follows.
    ///
    /// # Errors
    ///
    /// Fails with [`CriteriaError::InvalidArgument`] for an empty alias.
    pub fn update(
        self,
        table: &TableMeta,
        alias: &str,
    ) -> Result<StatementBuilder<SingleUpdateKind, Selected, C>> {
        self.step(|b| {
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

impl<C> StatementBuilder<MultiUpdateKind, Initial, C> {
    /// Writes the first table of a multi-table UPDATE; joins or SET follow.
    ///
    /// # Errors
    ///
    /// As [`StatementBuilder::from`].
    pub fn update(
        self,
        item: impl Into<TableItem>,
        alias: &str,
    ) -> Result<StatementBuilder<MultiUpdateKind, Sources, C>> {
        let item = item.into();
        self.step(|b| {
            b.draft
                .add_source(b.state.context(), b.state.dialect(), None, item, alias)
        })
    }
}

fn type_value(value: &mut Expr, ty: SqlType) {
    if let Expr::Param { sql_type, .. } | Expr::Literal { sql_type, .. } = value {
        if sql_type.is_none() {
            *sql_type = Some(ty);
        }
    }
}

impl<K: UpdateKind, Ph: AssignPhase, C> StatementBuilder<K, Ph, C> {
    /// Adds `field = value` to the SET list.
    ///
    /// The field must belong to a base table of this statement.
    ///
    /// # Errors
    ///
    /// Fails with [`CriteriaError::InvalidArgument`] when `field` is not a
    /// qualified field of a base table, [`CriteriaError::UnknownAlias`] or
    /// [`CriteriaError::UnknownField`] when it does not resolve, and with
    /// the resolution errors of `value`.
    pub fn set(self, field: Expr, value: impl IntoExpr) -> Result<StatementBuilder<K, Assigned, C>> {
        let mut value = value.into_expr();
        self.step(|b| {
            let context = b.state.context();
            let Expr::Field { alias, name } = &field else {
                return Err(CriteriaError::invalid(
                    "SET target must be a qualified field reference",
                ));
            };
            let table = match context.lookup(alias) {
                Some(SourceRef::Table(table)) => table,
                Some(_) => {
                    return Err(CriteriaError::invalid(format!(
                        "SET target '{alias}' is not a base table"
                    )))
                }
                None => return Err(CriteriaError::UnknownAlias(alias.clone())),
            };
            let meta = table.field(name).ok_or_else(|| CriteriaError::UnknownField {
                alias: alias.clone(),
                field: name.clone(),
            })?;
            context.resolve_expr(&mut value)?;
            type_value(&mut value, meta.sql_type());
            b.draft.assignments.push(Assignment { field, value });
            Ok(())
        })
    }
}

impl<K: super::BuilderKind, Ph, C> StatementBuilder<K, Ph, C> {
    pub(crate) fn assemble_update(&mut self) -> Result<UpdateStmt> {
        if self.draft.assignments.is_empty() {
            return Err(CriteriaError::invalid("UPDATE requires at least one assignment"));
        }
        self.state.finish()?;
        let mut draft = std::mem::take(&mut self.draft);
        let with = draft.take_with();
        let sources = draft.take_sources();
        Ok(UpdateStmt::new(UpdateStatement {
            kind: K::KIND,
            dialect: self.state.dialect(),
            with,
            sources,
            assignments: draft.assignments.into_boxed_slice(),
            where_clause: draft.where_clause.into_boxed_slice(),
            order_by: draft.tail.order_by.into_boxed_slice(),
            row_count: draft.tail.row_count,
        }))
    }
}
