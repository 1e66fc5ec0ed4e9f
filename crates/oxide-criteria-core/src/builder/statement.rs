//! The builder shared by every statement kind.

use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use super::draft::{ensure_dialect, Draft};
use super::joins::DynamicJoins;
use super::kind::{BuilderKind, FromCapable, IndexHintCapable, JoinCapable, OrderCapable};
use super::phase::{
    Filterable, Filtered, HintPhase, Initial, JoinPhase, Joined, Limitable, Limited, Orderable,
    Ordered, PendingOn, Preparable, Selected,
};
use super::scope::Scope;
use super::state::StatementState;
use crate::context::{ContextStack, CriteriaContext};
use crate::dialect::Dialect;
use crate::error::{CriteriaError, Result};
use crate::expr::Expr;
use crate::stmt::{
    Cte, CteName, IndexHintKind, IndexHintPurpose, JoinKind, OrderItem, RowSet, TableItem,
};

/// A statement under construction.
///
/// `K` is the statement kind and decides which clauses exist at all, `Ph`
/// is the phase reached so far and decides which clauses may come next,
/// and `C` is the caller's criteria value, readable at every phase.
///
/// Every clause method consumes the builder and hands it back in its next
/// phase. A failing clause aborts the statement: its context, and the
/// context of every sub-statement still open above it, are popped before
/// the error is returned.
///
/// The builder holds its context stack by `Rc` and is therefore neither
/// `Send` nor `Sync`; the prepared statement it produces is both.
pub struct StatementBuilder<K, Ph, C = ()> {
    pub(crate) state: StatementState<C>,
    pub(crate) draft: Draft,
    pub(crate) output: Option<RowSet>,
    pub(crate) lateral: bool,
    _marker: PhantomData<fn() -> (K, Ph)>,
}

impl<K, Ph, C: fmt::Debug> fmt::Debug for StatementBuilder<K, Ph, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatementBuilder")
            .field("kind", &self.state.kind())
            .field("dialect", &self.state.dialect())
            .field("criteria", self.state.criteria())
            .field("prepared", &self.state.is_prepared())
            .finish_non_exhaustive()
    }
}

impl<K: BuilderKind, C> StatementBuilder<K, Initial, C> {
    pub(crate) fn open(
        stack: ContextStack,
        outer: Option<Rc<CriteriaContext>>,
        dialect: Dialect,
        criteria: C,
    ) -> Self {
        Self {
            state: StatementState::open(stack, outer, dialect, K::KIND, criteria),
            draft: Draft::default(),
            output: None,
            lateral: false,
            _marker: PhantomData,
        }
    }

    /// Adds a common table expression.
    ///
    /// `body` receives a [`Scope`] to build the CTE's statement in; the CTE
    /// name is not visible inside it. Declared columns, if any, must match
    /// the body's column count.
    ///
    /// # Errors
    ///
    /// Fails with [`CriteriaError::Dialect`] when the dialect has no WITH
    /// clause for this kind, [`CriteriaError::DuplicateCteName`] when the
    /// name is already declared, or whatever `body` fails with.
    pub fn with<R, F>(self, name: impl Into<CteName>, body: F) -> Result<Self>
    where
        R: Into<RowSet>,
        F: FnOnce(Scope<'_>) -> Result<R>,
    {
        let name = name.into();
        self.step(|b| b.add_cte(name, false, body))
    }

    /// Adds a common table expression and marks the WITH clause
    /// `RECURSIVE`.
    ///
    /// The name is declared before `body` runs, so the body may select
    /// from `cte(name)`.
    ///
    /// # Errors
    ///
    /// As [`with`](Self::with).
    pub fn with_recursive<R, F>(self, name: impl Into<CteName>, body: F) -> Result<Self>
    where
        R: Into<RowSet>,
        F: FnOnce(Scope<'_>) -> Result<R>,
    {
        let name = name.into();
        self.step(|b| b.add_cte(name, true, body))
    }
}

impl<K: BuilderKind, Ph, C> StatementBuilder<K, Ph, C> {
    fn add_cte<R, F>(&mut self, name: CteName, recursive: bool, body: F) -> Result<()>
    where
        R: Into<RowSet>,
        F: FnOnce(Scope<'_>) -> Result<R>,
    {
        let policy = self.state.policy();
        let supported = if K::KIND.is_dml() {
            policy.supports_dml_with()
        } else {
            policy.supports_with()
        };
        self.state.require(supported, "WITH clause")?;
        if name.name.is_empty() {
            return Err(CriteriaError::invalid("CTE name must not be empty"));
        }

        let declared = (!name.columns.is_empty()).then(|| name.columns.clone());
        let context = Rc::clone(self.state.context());
        if recursive {
            context.declare_cte(&name.name, declared.clone())?;
            context.set_recursive();
        }

        let query: RowSet = body(self.scope())?.into();
        ensure_dialect(self.state.dialect(), query.dialect())?;
        if let (Some(columns), Some(arity)) = (&declared, query.arity()) {
            if columns.len() != arity {
                return Err(CriteriaError::invalid(format!(
                    "CTE '{}' declares {} columns but its query yields {arity}",
                    name.name,
                    columns.len()
                )));
            }
        }

        let fields = declared.or_else(|| query.output_names());
        if recursive {
            context.define_cte_fields(&name.name, fields);
        } else {
            context.declare_cte(&name.name, fields)?;
        }
        self.draft.recursive |= recursive;
        self.draft.ctes.push(Cte {
            name: name.name,
            columns: name.columns.into_boxed_slice(),
            query,
        });
        Ok(())
    }
}

impl<K, Ph, C> StatementBuilder<K, Ph, C> {
    fn into_phase<Next>(self) -> StatementBuilder<K, Next, C> {
        StatementBuilder {
            state: self.state,
            draft: self.draft,
            output: self.output,
            lateral: self.lateral,
            _marker: PhantomData,
        }
    }

    /// Runs one clause and moves to phase `Next`.
    ///
    /// A clause error aborts the statement.
    pub(crate) fn step<Next>(
        mut self,
        clause: impl FnOnce(&mut Self) -> Result<()>,
    ) -> Result<StatementBuilder<K, Next, C>> {
        self.state.ensure_mutable()?;
        match clause(&mut self) {
            Ok(()) => Ok(self.into_phase()),
            Err(err) => Err(self.state.fail(err)),
        }
    }

    /// Returns the criteria value supplied at the entry point.
    #[must_use]
    pub const fn criteria(&self) -> &C {
        self.state.criteria()
    }

    /// Returns the target dialect.
    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.state.dialect()
    }

    /// Returns a scope for building sub-statements of this statement.
    #[must_use]
    pub fn scope(&self) -> Scope<'_> {
        Scope::new(self.state.stack(), self.state.context(), self.state.dialect())
    }

    /// Returns this statement's criteria context.
    #[must_use]
    pub const fn context(&self) -> &Rc<CriteriaContext> {
        self.state.context()
    }

    /// Returns the context stack the statement was opened on.
    #[must_use]
    pub const fn stack(&self) -> &ContextStack {
        self.state.stack()
    }

    /// Returns whether `prepare` has succeeded.
    #[must_use]
    pub fn is_prepared(&self) -> bool {
        self.state.is_prepared()
    }
}

impl<K: FromCapable, C> StatementBuilder<K, Selected, C> {
    /// Adds the first table source.
    ///
    /// # Errors
    ///
    /// Fails with [`CriteriaError::DuplicateAlias`], with
    /// [`CriteriaError::UnknownCte`] for an undeclared CTE, or with
    /// [`CriteriaError::Dialect`] for a derived table built for another
    /// dialect.
    pub fn from(
        self,
        item: impl Into<TableItem>,
        alias: &str,
    ) -> Result<StatementBuilder<K, Joined, C>> {
        let item = item.into();
        self.step(|b| {
            b.draft
                .add_source(b.state.context(), b.state.dialect(), None, item, alias)
        })
    }
}

impl<K: JoinCapable, Ph: JoinPhase, C> StatementBuilder<K, Ph, C> {
    fn add_join<Next>(
        self,
        join: JoinKind,
        item: TableItem,
        alias: &str,
    ) -> Result<StatementBuilder<K, Next, C>> {
        self.step(|b| {
            b.draft
                .add_source(b.state.context(), b.state.dialect(), Some(join), item, alias)
        })
    }

    /// Adds an inner join; its ON predicate must follow.
    ///
    /// # Errors
    ///
    /// As [`from`](StatementBuilder::from).
    pub fn join(
        self,
        item: impl Into<TableItem>,
        alias: &str,
    ) -> Result<StatementBuilder<K, PendingOn<Ph>, C>> {
        self.add_join(JoinKind::Inner, item.into(), alias)
    }

    /// Adds a left outer join; its ON predicate must follow.
    ///
    /// # Errors
    ///
    /// As [`from`](StatementBuilder::from).
    pub fn left_join(
        self,
        item: impl Into<TableItem>,
        alias: &str,
    ) -> Result<StatementBuilder<K, PendingOn<Ph>, C>> {
        self.add_join(JoinKind::Left, item.into(), alias)
    }

    /// Adds a right outer join; its ON predicate must follow.
    ///
    /// # Errors
    ///
    /// As [`from`](StatementBuilder::from).
    pub fn right_join(
        self,
        item: impl Into<TableItem>,
        alias: &str,
    ) -> Result<StatementBuilder<K, PendingOn<Ph>, C>> {
        self.add_join(JoinKind::Right, item.into(), alias)
    }

    /// Adds a `STRAIGHT_JOIN`; its ON predicate must follow.
    ///
    /// # Errors
    ///
    /// As [`from`](StatementBuilder::from).
    pub fn straight_join(
        self,
        item: impl Into<TableItem>,
        alias: &str,
    ) -> Result<StatementBuilder<K, PendingOn<Ph>, C>> {
        self.add_join(JoinKind::Straight, item.into(), alias)
    }

    /// Adds a cross join.
    ///
    /// # Errors
    ///
    /// As [`from`](StatementBuilder::from).
    pub fn cross_join(self, item: impl Into<TableItem>, alias: &str) -> Result<Self> {
        self.add_join(JoinKind::Cross, item.into(), alias)
    }

    /// Adds a natural join.
    ///
    /// # Errors
    ///
    /// As [`from`](StatementBuilder::from).
    pub fn natural_join(self, item: impl Into<TableItem>, alias: &str) -> Result<Self> {
        self.add_join(JoinKind::Natural, item.into(), alias)
    }

    /// Adds a natural left join.
    ///
    /// # Errors
    ///
    /// As [`from`](StatementBuilder::from).
    pub fn natural_left_join(self, item: impl Into<TableItem>, alias: &str) -> Result<Self> {
        self.add_join(JoinKind::NaturalLeft, item.into(), alias)
    }

    /// Adds a natural right join.
    ///
    /// # Errors
    ///
    /// As [`from`](StatementBuilder::from).
    pub fn natural_right_join(self, item: impl Into<TableItem>, alias: &str) -> Result<Self> {
        self.add_join(JoinKind::NaturalRight, item.into(), alias)
    }

    /// Adds joins decided at run time.
    ///
    /// The closure receives the criteria value and a [`DynamicJoins`]
    /// recorder. Since the recorder cannot enforce ON by type, a join left
    /// without it fails with [`CriteriaError::MissingOnClause`].
    ///
    /// # Errors
    ///
    /// Whatever the closure or the recorder fails with.
    pub fn joins<F>(self, build: F) -> Result<Self>
    where
        F: FnOnce(&C, &mut DynamicJoins<'_>) -> Result<()>,
    {
        self.step(|b| {
            let mut joins =
                DynamicJoins::new(&mut b.draft, b.state.context(), b.state.dialect());
            build(b.state.criteria(), &mut joins)?;
            joins.finish()
        })
    }
}

impl<K: JoinCapable, P: JoinPhase, C> StatementBuilder<K, PendingOn<P>, C> {
    /// Gives the pending join its ON predicate.
    ///
    /// # Errors
    ///
    /// Fails when the predicate references an unknown alias or field.
    pub fn on(self, predicate: Expr) -> Result<StatementBuilder<K, P, C>> {
        self.step(|b| b.draft.add_on(b.state.context(), predicate))
    }
}

impl<K: BuilderKind, Ph: HintPhase, C> StatementBuilder<K, Ph, C> {
    /// Restricts the last table source to the named partitions.
    ///
    /// # Errors
    ///
    /// Fails with [`CriteriaError::InvalidArgument`] for an empty list or a
    /// source that is not a base table.
    pub fn partition(self, partitions: &[&str]) -> Result<Self> {
        self.step(|b| b.draft.add_partitions(partitions))
    }
}

impl<K: IndexHintCapable, Ph: HintPhase, C> StatementBuilder<K, Ph, C> {
    fn hint(
        self,
        kind: IndexHintKind,
        purpose: Option<IndexHintPurpose>,
        indexes: &[&str],
    ) -> Result<Self> {
        self.step(|b| b.draft.add_index_hint(kind, purpose, indexes))
    }

    /// Adds `USE INDEX (...)` to the last table source.
    ///
    /// # Errors
    ///
    /// Fails with [`CriteriaError::InvalidArgument`] when the source is not
    /// a base table.
    pub fn use_index(self, indexes: &[&str]) -> Result<Self> {
        self.hint(IndexHintKind::Use, None, indexes)
    }

    /// Adds `USE INDEX FOR ... (...)` to the last table source.
    ///
    /// # Errors
    ///
    /// As [`use_index`](Self::use_index).
    pub fn use_index_for(self, purpose: IndexHintPurpose, indexes: &[&str]) -> Result<Self> {
        self.hint(IndexHintKind::Use, Some(purpose), indexes)
    }

    /// Adds `IGNORE INDEX (...)` to the last table source.
    ///
    /// # Errors
    ///
    /// Fails with [`CriteriaError::InvalidArgument`] for an empty list or a
    /// source that is not a base table.
    pub fn ignore_index(self, indexes: &[&str]) -> Result<Self> {
        self.hint(IndexHintKind::Ignore, None, indexes)
    }

    /// Adds `IGNORE INDEX FOR ... (...)` to the last table source.
    ///
    /// # Errors
    ///
    /// As [`ignore_index`](Self::ignore_index).
    pub fn ignore_index_for(self, purpose: IndexHintPurpose, indexes: &[&str]) -> Result<Self> {
        self.hint(IndexHintKind::Ignore, Some(purpose), indexes)
    }

    /// Adds `FORCE INDEX (...)` to the last table source.
    ///
    /// # Errors
    ///
    /// As [`ignore_index`](Self::ignore_index).
    pub fn force_index(self, indexes: &[&str]) -> Result<Self> {
        self.hint(IndexHintKind::Force, None, indexes)
    }

    /// Adds `FORCE INDEX FOR ... (...)` to the last table source.
    ///
    /// # Errors
    ///
    /// As [`ignore_index`](Self::ignore_index).
    pub fn force_index_for(self, purpose: IndexHintPurpose, indexes: &[&str]) -> Result<Self> {
        self.hint(IndexHintKind::Force, Some(purpose), indexes)
    }
}

impl<K: BuilderKind, Ph: Filterable, C> StatementBuilder<K, Ph, C> {
    /// Adds a WHERE predicate.
    ///
    /// # Errors
    ///
    /// Fails when the predicate references an unknown alias or field.
    pub fn where_(self, predicate: Expr) -> Result<StatementBuilder<K, Filtered, C>> {
        self.step(|b| b.draft.add_where(b.state.context(), predicate))
    }

    /// Adds every predicate; an empty list adds no WHERE clause.
    ///
    /// # Errors
    ///
    /// As [`where_`](Self::where_).
    pub fn where_all(
        self,
        predicates: impl IntoIterator<Item = Expr>,
    ) -> Result<StatementBuilder<K, Filtered, C>> {
        self.step(|b| {
            predicates
                .into_iter()
                .try_for_each(|p| b.draft.add_where(b.state.context(), p))
        })
    }

    /// Adds the predicate `build` derives from the criteria value, if any.
    ///
    /// # Errors
    ///
    /// As [`where_`](Self::where_).
    pub fn if_where<F>(self, build: F) -> Result<StatementBuilder<K, Filtered, C>>
    where
        F: FnOnce(&C) -> Option<Expr>,
    {
        self.step(|b| match build(b.state.criteria()) {
            Some(predicate) => b.draft.add_where(b.state.context(), predicate),
            None => Ok(()),
        })
    }
}

impl<K: BuilderKind, C> StatementBuilder<K, Filtered, C> {
    /// Appends a predicate to the WHERE clause.
    ///
    /// # Errors
    ///
    /// As [`where_`](Self::where_).
    pub fn and(self, predicate: Expr) -> Result<Self> {
        self.step(|b| b.draft.add_where(b.state.context(), predicate))
    }

    /// Appends a predicate that must be present.
    ///
    /// # Errors
    ///
    /// Fails with [`CriteriaError::NullArgument`] for `None`.
    pub fn and_opt(self, predicate: Option<Expr>) -> Result<Self> {
        self.step(|b| {
            let predicate = predicate.ok_or(CriteriaError::NullArgument("predicate"))?;
            b.draft.add_where(b.state.context(), predicate)
        })
    }

    /// Appends the predicate `build` derives from the criteria value, if
    /// any.
    ///
    /// # Errors
    ///
    /// As [`where_`](Self::where_).
    pub fn if_and<F>(self, build: F) -> Result<Self>
    where
        F: FnOnce(&C) -> Option<Expr>,
    {
        self.step(|b| match build(b.state.criteria()) {
            Some(predicate) => b.draft.add_where(b.state.context(), predicate),
            None => Ok(()),
        })
    }
}

impl<K: OrderCapable, Ph: Orderable, C> StatementBuilder<K, Ph, C> {
    fn add_order(&mut self, items: Vec<OrderItem>) -> Result<()> {
        if self.draft.group_rollup {
            let policy = self.state.policy();
            policy.require(
                policy.supports_order_by_after_rollup(),
                "ORDER BY together with GROUP BY ... WITH ROLLUP",
            )?;
        }
        self.draft.add_order(self.state.context(), items)
    }

    /// Adds ORDER BY items.
    ///
    /// # Errors
    ///
    /// Fails with [`CriteriaError::InvalidArgument`] for an empty list, or
    /// with [`CriteriaError::Dialect`] after a GROUP BY rollup on dialects
    /// that forbid the combination.
    pub fn order_by<I>(self, items: I) -> Result<StatementBuilder<K, Ordered, C>>
    where
        I: IntoIterator,
        I::Item: Into<OrderItem>,
    {
        self.step(|b| b.add_order(items.into_iter().map(Into::into).collect()))
    }

    /// Adds the ORDER BY items `build` derives from the criteria value, if
    /// any.
    ///
    /// # Errors
    ///
    /// As [`order_by`](Self::order_by).
    pub fn if_order_by<I, F>(self, build: F) -> Result<StatementBuilder<K, Ordered, C>>
    where
        F: FnOnce(&C) -> Option<I>,
        I: IntoIterator,
        I::Item: Into<OrderItem>,
    {
        self.step(|b| match build(b.state.criteria()) {
            Some(items) => b.add_order(items.into_iter().map(Into::into).collect()),
            None => Ok(()),
        })
    }
}

impl<K: OrderCapable, Ph: Limitable, C> StatementBuilder<K, Ph, C> {
    /// Limits the row count. `limit(0)` is legal.
    ///
    /// # Errors
    ///
    /// Fails with [`CriteriaError::InvalidArgument`] for a negative count.
    pub fn limit(self, row_count: i64) -> Result<StatementBuilder<K, Limited, C>> {
        self.step(|b| b.draft.tail.set_limit(row_count))
    }

    /// Limits the row count to what `build` derives from the criteria
    /// value, if anything.
    ///
    /// # Errors
    ///
    /// As [`limit`](Self::limit).
    pub fn if_limit<F>(self, build: F) -> Result<StatementBuilder<K, Limited, C>>
    where
        F: FnOnce(&C) -> Option<i64>,
    {
        self.step(|b| match build(b.state.criteria()) {
            Some(row_count) => b.draft.tail.set_limit(row_count),
            None => Ok(()),
        })
    }
}

impl<K: BuilderKind, Ph: Preparable, C> StatementBuilder<K, Ph, C> {
    /// Finishes the statement: validates it, pops its context and returns
    /// the immutable prepared statement.
    ///
    /// The builder stays usable as a composer operand; every further clause
    /// fails with [`CriteriaError::AlreadyPrepared`].
    ///
    /// # Errors
    ///
    /// Fails with [`CriteriaError::AlreadyPrepared`] on a second call, with
    /// [`CriteriaError::Context`] when a sub-statement opened on this
    /// statement's stack is still unfinished, and with the kind's own
    /// validation errors.
    pub fn prepare(&mut self) -> Result<K::Prepared> {
        self.state.ensure_mutable()?;
        K::assemble(self).map_err(|err| self.state.fail(err))
    }

    /// Consuming form of [`prepare`](Self::prepare).
    ///
    /// # Errors
    ///
    /// As [`prepare`](Self::prepare).
    pub fn build(mut self) -> Result<K::Prepared> {
        self.prepare()
    }
}
