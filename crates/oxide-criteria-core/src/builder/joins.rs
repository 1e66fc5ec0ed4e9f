//! Joins decided at run time.

use super::draft::Draft;
use crate::context::CriteriaContext;
use crate::dialect::Dialect;
use crate::error::{CriteriaError, Result};
use crate::expr::Expr;
use crate::stmt::{JoinKind, TableItem};

/// Records joins whose number or shape depends on run-time data.
///
/// Handed out by [`StatementBuilder::joins`](super::StatementBuilder::joins).
/// The typed builder makes ON mandatory through its phases; here the
/// recorder tracks the pending join instead and fails with
/// [`CriteriaError::MissingOnClause`] when a join that needs ON is followed
/// by another join, or by the end of the closure, without one.
///
/// ```
/// use oxide_criteria_core::{field, Dialect, Select, SqlType, TableMeta};
///
/// let users = TableMeta::builder("users").field("id", SqlType::BigInt).build();
/// let orders = TableMeta::builder("orders")
///     .field("id", SqlType::BigInt)
///     .field("user_id", SqlType::BigInt)
///     .build();
///
/// let with_orders = true;
/// let query = Select::with_criteria(Dialect::MySQL80, with_orders)
///     .select([field("u", "id")])?
///     .from(&users, "u")?
///     .joins(|with_orders, j| {
///         if *with_orders {
///             j.left_join(&orders, "o")?
///                 .on(field("o", "user_id").eq(field("u", "id")))?;
///         }
///         Ok(())
///     })?
///     .build()?;
/// # let _ = query;
/// # Ok::<(), oxide_criteria_core::CriteriaError>(())
/// ```
#[derive(Debug)]
pub struct DynamicJoins<'a> {
    draft: &'a mut Draft,
    context: &'a CriteriaContext,
    dialect: Dialect,
    pending: Option<String>,
}

impl<'a> DynamicJoins<'a> {
    pub(crate) fn new(draft: &'a mut Draft, context: &'a CriteriaContext, dialect: Dialect) -> Self {
        Self {
            draft,
            context,
            dialect,
            pending: None,
        }
    }

    fn settle(&self) -> Result<()> {
        match &self.pending {
            Some(alias) => Err(CriteriaError::MissingOnClause(alias.clone())),
            None => Ok(()),
        }
    }

    fn add(&mut self, join: JoinKind, item: TableItem, alias: &str) -> Result<&mut Self> {
        self.settle()?;
        self.draft
            .add_source(self.context, self.dialect, Some(join), item, alias)?;
        if join.requires_on() {
            self.pending = Some(String::from(alias));
        }
        Ok(self)
    }

    /// Adds an inner join.
    ///
    /// # Errors
    ///
    /// Fails with [`CriteriaError::MissingOnClause`] while an earlier join
    /// still lacks its ON predicate, and with the registration errors of
    /// [`StatementBuilder::from`](super::StatementBuilder::from).
    pub fn join(&mut self, item: impl Into<TableItem>, alias: &str) -> Result<&mut Self> {
        self.add(JoinKind::Inner, item.into(), alias)
    }

    /// Adds a left outer join.
    ///
    /// # Errors
    ///
    /// As [`join`](Self::join).
    pub fn left_join(&mut self, item: impl Into<TableItem>, alias: &str) -> Result<&mut Self> {
        self.add(JoinKind::Left, item.into(), alias)
    }

    /// Adds a right outer join.
    ///
    /// # Errors
    ///
    /// As [`join`](Self::join).
    pub fn right_join(&mut self, item: impl Into<TableItem>, alias: &str) -> Result<&mut Self> {
        self.add(JoinKind::Right, item.into(), alias)
    }

    /// Adds a `STRAIGHT_JOIN`.
    ///
    /// # Errors
    ///
    /// As [`join`](Self::join).
    pub fn straight_join(&mut self, item: impl Into<TableItem>, alias: &str) -> Result<&mut Self> {
        self.add(JoinKind::Straight, item.into(), alias)
    }

    /// Adds a cross join.
    ///
    /// # Errors
    ///
    /// As [`join`](Self::join).
    pub fn cross_join(&mut self, item: impl Into<TableItem>, alias: &str) -> Result<&mut Self> {
        self.add(JoinKind::Cross, item.into(), alias)
    }

    /// Adds a natural join.
    ///
    /// # Errors
    ///
    /// As [`join`](Self::join).
    pub fn natural_join(&mut self, item: impl Into<TableItem>, alias: &str) -> Result<&mut Self> {
        self.add(JoinKind::Natural, item.into(), alias)
    }

    /// Gives the pending join its ON predicate.
    ///
    /// # Errors
    ///
    /// Fails with [`CriteriaError::InvalidArgument`] when no join is
    /// pending, or when the predicate does not resolve.
    pub fn on(&mut self, predicate: Expr) -> Result<&mut Self> {
        if self.pending.is_none() {
            return Err(CriteriaError::invalid("ON without a pending join"));
        }
        self.draft.add_on(self.context, predicate)?;
        self.pending = None;
        Ok(self)
    }

    /// Restricts the last joined table to the named partitions.
    ///
    /// # Errors
    ///
    /// Fails with [`CriteriaError::InvalidArgument`] for an empty list or a
    /// source that is not a base table.
    pub fn partition(&mut self, partitions: &[&str]) -> Result<&mut Self> {
        self.draft.add_partitions(partitions)?;
        Ok(self)
    }

    pub(crate) fn finish(self) -> Result<()> {
        self.settle()
    }
}
