//! Mutable clause lists accumulated while a statement is built.
//!
//! Drafts never leave the builder: `prepare` moves them out once and turns
//! every list into a boxed slice.

use crate::context::{CriteriaContext, SourceRef};
use crate::dialect::{Dialect, DialectPolicy};
use crate::error::{CriteriaError, Result};
use crate::expr::Expr;
use crate::stmt::{
    Assignment, Cte, IndexHint, IndexHintKind, IndexHintPurpose, JoinKind, LockClause, LockMode,
    LockWait, OrderItem, Selection, TableBlock, TableItem, Tail, Window, WithClause,
};

/// Fails unless `found` is the dialect the enclosing statement targets.
pub(crate) fn ensure_dialect(expected: Dialect, found: Dialect) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(CriteriaError::unsupported(
            expected,
            format!("embedding a statement built for {found}"),
        ))
    }
}

/// Describes `item` for registration in `context`.
pub(crate) fn source_ref(
    context: &CriteriaContext,
    dialect: Dialect,
    item: &TableItem,
) -> Result<SourceRef> {
    match item {
        TableItem::Table(table) => Ok(SourceRef::Table(table.clone())),
        TableItem::Derived(query) => {
            ensure_dialect(dialect, query.dialect())?;
            Ok(SourceRef::Derived {
                fields: query.row_set().output_names(),
                lateral: query.is_lateral(),
            })
        }
        TableItem::Cte(name) => Ok(SourceRef::Cte {
            name: name.clone(),
            fields: context.resolve_cte(name)?,
        }),
    }
}

#[derive(Debug)]
pub(crate) struct SourceDraft {
    pub(crate) join: Option<JoinKind>,
    pub(crate) item: TableItem,
    pub(crate) alias: String,
    pub(crate) on: Vec<Expr>,
    pub(crate) partitions: Vec<String>,
    pub(crate) index_hints: Vec<IndexHint>,
}

impl SourceDraft {
    fn freeze(self) -> TableBlock {
        TableBlock {
            join: self.join,
            item: self.item,
            alias: self.alias,
            on: self.on.into_boxed_slice(),
            partitions: self.partitions.into_boxed_slice(),
            index_hints: self.index_hints.into_boxed_slice(),
        }
    }

    fn base_table(&self, clause: &str) -> Result<()> {
        match self.item {
            TableItem::Table(_) => Ok(()),
            TableItem::Derived(_) | TableItem::Cte(_) => Err(CriteriaError::invalid(format!(
                "{clause} applies to base tables only, '{}' is not one",
                self.alias
            ))),
        }
    }
}

/// ORDER BY, LIMIT and locking.
#[derive(Debug, Default)]
pub(crate) struct TailDraft {
    pub(crate) order_by: Vec<OrderItem>,
    pub(crate) order_rollup: bool,
    pub(crate) row_count: Option<u64>,
    pub(crate) offset: Option<u64>,
    pub(crate) lock: LockMode,
    pub(crate) lock_of: Vec<String>,
    pub(crate) lock_wait: Option<LockWait>,
}

fn non_negative(value: i64, clause: &str) -> Result<u64> {
    u64::try_from(value)
        .map_err(|_| CriteriaError::invalid(format!("{clause} must not be negative, got {value}")))
}

impl TailDraft {
    pub(crate) fn add_order(&mut self, items: Vec<OrderItem>) -> Result<()> {
        if items.is_empty() {
            return Err(CriteriaError::invalid("ORDER BY list must not be empty"));
        }
        self.order_by.extend(items);
        Ok(())
    }

    pub(crate) fn set_limit(&mut self, row_count: i64) -> Result<()> {
        self.row_count = Some(non_negative(row_count, "LIMIT row count")?);
        Ok(())
    }

    pub(crate) fn set_offset(&mut self, offset: i64) -> Result<()> {
        self.offset = Some(non_negative(offset, "OFFSET")?);
        Ok(())
    }

    pub(crate) fn set_lock(&mut self, policy: &dyn DialectPolicy, mode: LockMode) -> Result<()> {
        if mode == LockMode::None {
            return Err(CriteriaError::invalid("lock mode must not be None"));
        }
        let construct = match mode {
            LockMode::ForShare => "FOR SHARE",
            LockMode::LockInShareMode => "LOCK IN SHARE MODE",
            LockMode::ForUpdate | LockMode::None => "FOR UPDATE",
        };
        policy.require(policy.supports_lock_mode(mode), construct)?;
        self.lock = mode;
        Ok(())
    }

    fn ensure_lock_options(&self, option: &str) -> Result<()> {
        if self.lock.accepts_options() {
            Ok(())
        } else {
            Err(CriteriaError::invalid(format!(
                "{option} requires FOR UPDATE or FOR SHARE"
            )))
        }
    }

    pub(crate) fn add_lock_of(
        &mut self,
        policy: &dyn DialectPolicy,
        context: &CriteriaContext,
        aliases: &[&str],
    ) -> Result<()> {
        self.ensure_lock_options("OF")?;
        policy.require(policy.supports_lock_of(), "lock OF list")?;
        if aliases.is_empty() {
            return Err(CriteriaError::invalid("lock OF list must not be empty"));
        }
        for alias in aliases {
            if context.lookup(alias).is_none() {
                return Err(CriteriaError::UnknownAlias(String::from(*alias)));
            }
        }
        self.lock_of
            .extend(aliases.iter().map(|alias| String::from(*alias)));
        Ok(())
    }

    pub(crate) fn set_lock_wait(&mut self, policy: &dyn DialectPolicy, wait: LockWait) -> Result<()> {
        self.ensure_lock_options(wait.as_str())?;
        policy.require(policy.supports_lock_wait(wait), wait.as_str())?;
        self.lock_wait = Some(wait);
        Ok(())
    }

    pub(crate) fn freeze(self) -> Tail {
        Tail {
            order_by: self.order_by.into_boxed_slice(),
            order_rollup: self.order_rollup,
            row_count: self.row_count,
            offset: self.offset,
            lock: LockClause {
                mode: self.lock,
                of: self.lock_of.into_boxed_slice(),
                wait: self.lock_wait,
            },
        }
    }
}

/// Every clause list a statement of any kind can carry.
#[derive(Debug, Default)]
pub(crate) struct Draft {
    pub(crate) recursive: bool,
    pub(crate) ctes: Vec<Cte>,
    pub(crate) distinct: bool,
    pub(crate) selections: Vec<Selection>,
    pub(crate) targets: Vec<String>,
    pub(crate) sources: Vec<SourceDraft>,
    pub(crate) assignments: Vec<Assignment>,
    pub(crate) where_clause: Vec<Expr>,
    pub(crate) group_by: Vec<Expr>,
    pub(crate) group_rollup: bool,
    pub(crate) having: Vec<Expr>,
    pub(crate) windows: Vec<Window>,
    pub(crate) tail: TailDraft,
}

impl Draft {
    /// Registers `item` under `alias` and appends it to the FROM list.
    pub(crate) fn add_source(
        &mut self,
        context: &CriteriaContext,
        dialect: Dialect,
        join: Option<JoinKind>,
        item: TableItem,
        alias: &str,
    ) -> Result<()> {
        if alias.is_empty() {
            return Err(CriteriaError::invalid("table alias must not be empty"));
        }
        let source = source_ref(context, dialect, &item)?;
        context.on_add_table_source(alias, source)?;
        self.sources.push(SourceDraft {
            join,
            item,
            alias: String::from(alias),
            on: vec![],
            partitions: vec![],
            index_hints: vec![],
        });
        Ok(())
    }

    fn last_source(&mut self) -> Result<&mut SourceDraft> {
        self.sources
            .last_mut()
            .ok_or_else(|| CriteriaError::invalid("no table source to attach the clause to"))
    }

    /// Appends an ON predicate to the last join.
    pub(crate) fn add_on(&mut self, context: &CriteriaContext, mut predicate: Expr) -> Result<()> {
        context.resolve_expr(&mut predicate)?;
        let source = self.last_source()?;
        match source.join {
            Some(join) if join.requires_on() => {
                source.on.push(predicate);
                Ok(())
            }
            _ => Err(CriteriaError::invalid(format!(
                "'{}' is not joined with a join type that takes ON",
                source.alias
            ))),
        }
    }

    pub(crate) fn add_partitions(&mut self, partitions: &[&str]) -> Result<()> {
        if partitions.is_empty() {
            return Err(CriteriaError::invalid("PARTITION list must not be empty"));
        }
        let source = self.last_source()?;
        source.base_table("PARTITION")?;
        source
            .partitions
            .extend(partitions.iter().map(|p| String::from(*p)));
        Ok(())
    }

    pub(crate) fn add_index_hint(
        &mut self,
        kind: IndexHintKind,
        purpose: Option<IndexHintPurpose>,
        indexes: &[&str],
    ) -> Result<()> {
        let source = self.last_source()?;
        source.base_table(kind.as_str())?;
        if indexes.is_empty() && kind != IndexHintKind::Use {
            return Err(CriteriaError::invalid(format!(
                "{} needs at least one index",
                kind.as_str()
            )));
        }
        source.index_hints.push(IndexHint {
            kind,
            purpose,
            indexes: indexes.iter().map(|i| String::from(*i)).collect(),
        });
        Ok(())
    }

    pub(crate) fn add_where(&mut self, context: &CriteriaContext, mut predicate: Expr) -> Result<()> {
        context.resolve_expr(&mut predicate)?;
        self.where_clause.push(predicate);
        Ok(())
    }

    pub(crate) fn add_order(&mut self, context: &CriteriaContext, items: Vec<OrderItem>) -> Result<()> {
        let mut items = items;
        for item in &mut items {
            context.resolve_expr(&mut item.expr)?;
        }
        self.tail.add_order(items)
    }

    pub(crate) fn take_sources(&mut self) -> Box<[TableBlock]> {
        std::mem::take(&mut self.sources)
            .into_iter()
            .map(SourceDraft::freeze)
            .collect()
    }

    pub(crate) fn take_with(&mut self) -> WithClause {
        WithClause {
            recursive: self.recursive,
            ctes: std::mem::take(&mut self.ctes).into_boxed_slice(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::field;
    use crate::meta::{SqlType, TableMeta};
    use crate::stmt::StatementKind;

    fn users() -> TableMeta {
        TableMeta::builder("users")
            .field("id", SqlType::BigInt)
            .build()
    }

    #[test]
    fn test_limit_rejects_negative() {
        let mut tail = TailDraft::default();
        assert!(tail.set_limit(0).is_ok());
        assert_eq!(tail.row_count, Some(0));
        assert!(matches!(
            tail.set_limit(-1),
            Err(CriteriaError::InvalidArgument(_))
        ));
        assert!(matches!(
            tail.set_offset(-5),
            Err(CriteriaError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_lock_options_need_modern_lock() {
        let policy = Dialect::MySQL80.policy();
        let mut tail = TailDraft::default();
        tail.set_lock(policy, LockMode::LockInShareMode).unwrap();
        assert!(matches!(
            tail.set_lock_wait(policy, LockWait::NoWait),
            Err(CriteriaError::InvalidArgument(_))
        ));
        tail.set_lock(policy, LockMode::ForUpdate).unwrap();
        tail.set_lock_wait(policy, LockWait::SkipLocked).unwrap();
        assert_eq!(tail.freeze().lock().wait, Some(LockWait::SkipLocked));
    }

    #[test]
    fn test_partition_on_derived_source_fails() {
        let context = CriteriaContext::new(StatementKind::SimpleSelect, None);
        let mut draft = Draft::default();
        draft
            .add_source(
                &context,
                Dialect::MySQL80,
                None,
                TableItem::Table(users()),
                "u",
            )
            .unwrap();
        draft.add_partitions(&["p0"]).unwrap();
        assert!(draft.add_on(&context, field("u", "id").eq(1)).is_err());
        assert_eq!(draft.take_sources()[0].partitions.len(), 1);
    }
}
