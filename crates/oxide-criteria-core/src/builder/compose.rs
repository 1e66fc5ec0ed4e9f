//! Bracketing and set operations over prepared row sets.
//!
//! A composite is built from prepared operands only and re-enters the
//! clause phases at ORDER BY: it can be ordered, limited and locked as a
//! whole, then prepared into a row set that can again be embedded, composed
//! or rendered. Chains are left-deep and kept in construction order.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::debug;

use super::draft::{ensure_dialect, TailDraft};
use super::kind::{AnyKind, Family, QueryKind, ScalarKind, SelectKind, SubQueryKind, ValuesKind};
use super::phase::{
    Composed, Limitable, Limited, Lockable, Locked, Locking, Orderable, Ordered, Preparable,
};
use super::state::StatementState;
use super::values::ValuesBuilder;
use super::StatementBuilder;
use crate::context::ContextStack;
use crate::dialect::Dialect;
use crate::error::{CriteriaError, Result};
use crate::expr::Expr;
use crate::stmt::{
    BracketQuery, LockMode, LockWait, OrderItem, RowSet, RowSetKind, ScalarSubQueryStmt,
    SelectStmt, StatementKind, SubQueryStmt, UnionQuery, UnionType, ValuesStmt,
};

/// Something that may be handed to the composer.
///
/// Implemented by every prepared handle and by the builders themselves, so
/// that passing a builder whose `prepare` has not run yet is reported as
/// [`CriteriaError::NotPrepared`] instead of being impossible to express.
pub trait Operand {
    /// Returns the kind reported when the operand is not prepared.
    fn operand_kind(&self) -> StatementKind;

    /// Returns the prepared row set, if any.
    fn prepared_row_set(&self) -> Option<RowSet>;
}

impl Operand for RowSet {
    fn operand_kind(&self) -> StatementKind {
        self.statement_kind()
    }

    fn prepared_row_set(&self) -> Option<RowSet> {
        Some(self.clone())
    }
}

impl<K: QueryKind, Ph, C> Operand for StatementBuilder<K, Ph, C> {
    fn operand_kind(&self) -> StatementKind {
        K::KIND
    }

    fn prepared_row_set(&self) -> Option<RowSet> {
        self.output.clone()
    }
}

impl<Ph, C> Operand for ValuesBuilder<Ph, C> {
    fn operand_kind(&self) -> StatementKind {
        StatementKind::Values
    }

    fn prepared_row_set(&self) -> Option<RowSet> {
        self.output.clone()
    }
}

impl<F, Ph> Operand for SetOpBuilder<F, Ph> {
    fn operand_kind(&self) -> StatementKind {
        self.state.kind()
    }

    fn prepared_row_set(&self) -> Option<RowSet> {
        self.output.clone()
    }
}

#[derive(Debug)]
enum Composite {
    Bracket(RowSet),
    Union {
        left: RowSet,
        operator: UnionType,
        right: RowSet,
    },
}

/// A bracket or set operation awaiting its trailing clauses.
///
/// `F` is the family of the result: a typed family when composed through a
/// handle's methods, [`AnyKind`] when composed through [`union`] or
/// [`bracket`].
pub struct SetOpBuilder<F, Ph> {
    state: StatementState<()>,
    node: Option<Composite>,
    kind: RowSetKind,
    lateral: bool,
    columns: Option<Vec<String>>,
    tail: TailDraft,
    output: Option<RowSet>,
    _marker: PhantomData<fn() -> (F, Ph)>,
}

impl<F, Ph> fmt::Debug for SetOpBuilder<F, Ph> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetOpBuilder")
            .field("kind", &self.state.kind())
            .field("family", &self.kind)
            .field("dialect", &self.state.dialect())
            .field("node", &self.node)
            .field("prepared", &self.state.is_prepared())
            .finish_non_exhaustive()
    }
}

impl<F> SetOpBuilder<F, Composed> {
    fn open(row_set: &RowSet, statement: StatementKind, lateral: bool, node: Composite) -> Self {
        // The composite names no table sources, so its context lives on a
        // stack of its own and never touches the operands' stacks.
        Self {
            state: StatementState::open(
                ContextStack::new(),
                None,
                row_set.dialect(),
                statement,
                (),
            ),
            node: Some(node),
            kind: row_set.kind(),
            lateral,
            columns: row_set.output_names(),
            tail: TailDraft::default(),
            output: None,
            _marker: PhantomData,
        }
    }
}

impl<F, Ph> SetOpBuilder<F, Ph> {
    fn step<Next>(
        mut self,
        clause: impl FnOnce(&mut Self) -> Result<()>,
    ) -> Result<SetOpBuilder<F, Next>> {
        self.state.ensure_mutable()?;
        if let Err(err) = clause(&mut self) {
            return Err(self.state.fail(err));
        }
        Ok(SetOpBuilder {
            state: self.state,
            node: self.node,
            kind: self.kind,
            lateral: self.lateral,
            columns: self.columns,
            tail: self.tail,
            output: self.output,
            _marker: PhantomData,
        })
    }

    /// Returns the family of the result.
    #[must_use]
    pub const fn kind(&self) -> RowSetKind {
        self.kind
    }

    /// Returns the dialect, taken from the left operand.
    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.state.dialect()
    }

    /// Returns whether either operand is lateral.
    #[must_use]
    pub const fn is_lateral(&self) -> bool {
        self.lateral
    }

    /// Returns whether `prepare` has succeeded.
    #[must_use]
    pub fn is_prepared(&self) -> bool {
        self.state.is_prepared()
    }
}

impl<F, Ph: Orderable> SetOpBuilder<F, Ph> {
    /// Orders the whole result by output column names.
    ///
    /// # Errors
    ///
    /// Fails with [`CriteriaError::UnknownAlias`] for a qualified field and
    /// with [`CriteriaError::InvalidArgument`] for an empty list, an
    /// expression, or a name the result does not expose.
    pub fn order_by<I>(self, items: I) -> Result<SetOpBuilder<F, Ordered>>
    where
        I: IntoIterator,
        I::Item: Into<OrderItem>,
    {
        self.step(|b| {
            let mut items: Vec<OrderItem> = items.into_iter().map(Into::into).collect();
            let context = b.state.context();
            for item in &mut items {
                context.resolve_expr(&mut item.expr)?;
                let Expr::Column(name) = &item.expr else {
                    return Err(CriteriaError::invalid(
                        "a set operation can only be ordered by output column names",
                    ));
                };
                if let Some(columns) = &b.columns {
                    if !columns.contains(name) {
                        return Err(CriteriaError::invalid(format!(
                            "'{name}' is not an output column of the set operation"
                        )));
                    }
                }
            }
            b.tail.add_order(items)
        })
    }
}

impl<F, Ph: Limitable> SetOpBuilder<F, Ph> {
    /// Limits the row count of the whole result.
    ///
    /// # Errors
    ///
    /// Fails with [`CriteriaError::InvalidArgument`] for a negative count.
    pub fn limit(self, row_count: i64) -> Result<SetOpBuilder<F, Limited>> {
        self.step(|b| b.tail.set_limit(row_count))
    }
}

impl<F> SetOpBuilder<F, Limited> {
    /// Skips rows before the limited range.
    ///
    /// # Errors
    ///
    /// Fails with [`CriteriaError::InvalidArgument`] for a negative offset.
    pub fn offset(self, offset: i64) -> Result<Self> {
        self.step(|b| b.tail.set_offset(offset))
    }
}

impl<F, Ph: Lockable> SetOpBuilder<F, Ph> {
    /// Adds a lock to the whole result.
    ///
    /// # Errors
    ///
    /// Fails with [`CriteriaError::InvalidArgument`] for [`LockMode::None`]
    /// and with [`CriteriaError::Dialect`] for an unsupported mode.
    pub fn lock(self, mode: LockMode) -> Result<SetOpBuilder<F, Locking>> {
        self.step(|b| {
            let policy = b.state.policy();
            b.tail.set_lock(policy, mode)
        })
    }

    /// Adds `FOR UPDATE`.
    ///
    /// # Errors
    ///
    /// As [`lock`](Self::lock).
    pub fn for_update(self) -> Result<SetOpBuilder<F, Locking>> {
        self.lock(LockMode::ForUpdate)
    }

    /// Adds `FOR SHARE`.
    ///
    /// # Errors
    ///
    /// As [`lock`](Self::lock).
    pub fn for_share(self) -> Result<SetOpBuilder<F, Locking>> {
        self.lock(LockMode::ForShare)
    }

    /// Adds `LOCK IN SHARE MODE`.
    ///
    /// # Errors
    ///
    /// As [`lock`](Self::lock).
    pub fn lock_in_share_mode(self) -> Result<SetOpBuilder<F, Locked>> {
        self.step(|b| {
            let policy = b.state.policy();
            b.tail.set_lock(policy, LockMode::LockInShareMode)
        })
    }
}

impl<F> SetOpBuilder<F, Locking> {
    /// Adds `NOWAIT`.
    ///
    /// # Errors
    ///
    /// Fails with [`CriteriaError::InvalidArgument`] after the legacy share
    /// mode and with [`CriteriaError::Dialect`] where unsupported.
    pub fn nowait(self) -> Result<SetOpBuilder<F, Locked>> {
        self.step(|b| {
            let policy = b.state.policy();
            b.tail.set_lock_wait(policy, LockWait::NoWait)
        })
    }

    /// Adds `SKIP LOCKED`.
    ///
    /// # Errors
    ///
    /// As [`nowait`](Self::nowait).
    pub fn skip_locked(self) -> Result<SetOpBuilder<F, Locked>> {
        self.step(|b| {
            let policy = b.state.policy();
            b.tail.set_lock_wait(policy, LockWait::SkipLocked)
        })
    }
}

impl<F: Family, Ph: Preparable> SetOpBuilder<F, Ph> {
    fn assemble(&mut self) -> Result<F::Output> {
        self.state.finish()?;
        let node = self
            .node
            .take()
            .ok_or_else(|| CriteriaError::Context(String::from("composite has no operands")))?;
        let tail = std::mem::take(&mut self.tail).freeze();
        let dialect = self.state.dialect();
        let row_set = match node {
            Composite::Bracket(inner) => RowSet::Bracket(Arc::new(BracketQuery {
                kind: self.kind,
                dialect,
                lateral: self.lateral,
                inner,
                tail,
            })),
            Composite::Union {
                left,
                operator,
                right,
            } => RowSet::Union(Arc::new(UnionQuery {
                kind: self.kind,
                dialect,
                lateral: self.lateral,
                left,
                operator,
                right,
                tail,
            })),
        };
        self.output = Some(row_set.clone());
        Ok(F::wrap(row_set))
    }

    /// Finishes the composite.
    ///
    /// # Errors
    ///
    /// Fails with [`CriteriaError::AlreadyPrepared`] on a second call.
    pub fn prepare(&mut self) -> Result<F::Output> {
        self.state.ensure_mutable()?;
        self.assemble().map_err(|err| self.state.fail(err))
    }

    /// Consuming form of [`prepare`](Self::prepare).
    ///
    /// # Errors
    ///
    /// As [`prepare`](Self::prepare).
    pub fn build(mut self) -> Result<F::Output> {
        self.prepare()
    }
}

fn prepared<T: Operand + ?Sized>(operand: &T) -> Result<RowSet> {
    operand
        .prepared_row_set()
        .ok_or_else(|| CriteriaError::NotPrepared(operand.operand_kind()))
}

fn ensure_untailed(row_set: &RowSet, side: &str) -> Result<()> {
    if matches!(row_set, RowSet::Bracket(_)) || row_set.tail().is_empty() {
        Ok(())
    } else {
        Err(CriteriaError::invalid(format!(
            "{side} operand carries ORDER BY, LIMIT or a lock and must be bracketed"
        )))
    }
}

/// A WITH clause may only open the whole chain, so a right operand carrying
/// one goes in parentheses.
fn ensure_no_inner_with(right: &RowSet) -> Result<()> {
    match right {
        RowSet::Select(q) if !q.with().is_empty() => Err(CriteriaError::invalid(
            "right operand carries a WITH clause and must be bracketed",
        )),
        _ => Ok(()),
    }
}

fn open_union<F, L, R>(left: &L, operator: UnionType, right: &R) -> Result<SetOpBuilder<F, Composed>>
where
    L: Operand + ?Sized,
    R: Operand + ?Sized,
{
    let left = prepared(left)?;
    let dialect = left.dialect();
    let policy = dialect.policy();
    if !policy.supports_set_operator(operator) {
        return Err(CriteriaError::UnsupportedOperator { dialect, operator });
    }
    let right = prepared(right)?;

    let (left_kind, right_kind) = (left.kind(), right.kind());
    if left_kind != right_kind && right_kind != RowSetKind::Values {
        return Err(CriteriaError::OperandKindMismatch {
            left: left_kind.statement_kind(),
            right: right_kind.statement_kind(),
        });
    }
    ensure_dialect(dialect, right.dialect())?;
    if left_kind != right_kind {
        policy.require(
            policy.supports_values_operand(),
            "VALUES as a set operation operand",
        )?;
    }
    if let (Some(l), Some(r)) = (left.arity(), right.arity()) {
        if l != r {
            return Err(CriteriaError::invalid(format!(
                "set operation operands have {l} and {r} columns"
            )));
        }
    }
    ensure_untailed(&left, "left")?;
    ensure_untailed(&right, "right")?;
    ensure_no_inner_with(&right)?;

    let lateral = left.is_lateral() || right.is_lateral();
    debug!(
        kind = ?left_kind,
        %operator,
        %dialect,
        lateral,
        "composed set operation"
    );
    Ok(SetOpBuilder::open(
        &left,
        StatementKind::Union,
        lateral,
        Composite::Union {
            left: left.clone(),
            operator,
            right,
        },
    ))
}

fn open_bracket<F, T: Operand + ?Sized>(operand: &T) -> Result<SetOpBuilder<F, Composed>> {
    let inner = prepared(operand)?;
    debug!(kind = ?inner.kind(), dialect = %inner.dialect(), "composed bracket");
    Ok(SetOpBuilder::open(
        &inner,
        StatementKind::Bracket,
        inner.is_lateral(),
        Composite::Bracket(inner.clone()),
    ))
}

/// Combines two operands with a set operator, checking at run time that
/// both are prepared, that the dialect knows the operator and that the
/// operand kinds, dialects and column counts agree.
///
/// # Errors
///
/// Fails, in this order, with [`CriteriaError::NotPrepared`] for the left
/// operand, [`CriteriaError::UnsupportedOperator`],
/// [`CriteriaError::NotPrepared`] for the right operand,
/// [`CriteriaError::OperandKindMismatch`], [`CriteriaError::Dialect`] and
/// [`CriteriaError::InvalidArgument`]. The last covers mismatched column
/// counts and unbracketed operands carrying a tail, or a right operand
/// carrying a WITH clause.
pub fn union<L, R>(left: &L, operator: UnionType, right: &R) -> Result<SetOpBuilder<AnyKind, Composed>>
where
    L: Operand + ?Sized,
    R: Operand + ?Sized,
{
    open_union(left, operator, right)
}

/// Parenthesizes an operand, keeping its family and lateral flag.
///
/// # Errors
///
/// Fails with [`CriteriaError::NotPrepared`] before touching anything when
/// the operand is not prepared.
pub fn bracket<T: Operand + ?Sized>(operand: &T) -> Result<SetOpBuilder<AnyKind, Composed>> {
    open_bracket(operand)
}

mod sealed {
    pub trait Sealed {}
}

/// Right operands accepted by the typed set operations of `L`.
pub trait Compatible<L>: Operand + sealed::Sealed {}

impl sealed::Sealed for SelectStmt {}
impl sealed::Sealed for SubQueryStmt {}
impl sealed::Sealed for ScalarSubQueryStmt {}
impl sealed::Sealed for ValuesStmt {}

impl Compatible<SelectStmt> for SelectStmt {}
impl Compatible<SelectStmt> for ValuesStmt {}
impl Compatible<SubQueryStmt> for SubQueryStmt {}
impl Compatible<SubQueryStmt> for ValuesStmt {}
impl Compatible<ScalarSubQueryStmt> for ScalarSubQueryStmt {}
impl Compatible<ScalarSubQueryStmt> for ValuesStmt {}
impl Compatible<ValuesStmt> for ValuesStmt {}

macro_rules! composable {
    ($handle:ident, $family:ty) => {
        impl Operand for $handle {
            fn operand_kind(&self) -> StatementKind {
                self.row_set().statement_kind()
            }

            fn prepared_row_set(&self) -> Option<RowSet> {
                Some(self.row_set().clone())
            }
        }

        impl $handle {
            /// Combines this statement with `right`.
            ///
            /// # Errors
            ///
            /// Fails with [`CriteriaError::UnsupportedOperator`],
            /// [`CriteriaError::Dialect`] or
            /// [`CriteriaError::InvalidArgument`] as [`union`] does; kinds
            /// always agree.
            pub fn set_op<R: Compatible<Self>>(
                &self,
                operator: UnionType,
                right: &R,
            ) -> Result<SetOpBuilder<$family, Composed>> {
                open_union(self, operator, right)
            }

            /// `self UNION right`.
            ///
            /// # Errors
            ///
            /// As [`set_op`](Self::set_op).
            pub fn union<R: Compatible<Self>>(&self, right: &R) -> Result<SetOpBuilder<$family, Composed>> {
                self.set_op(UnionType::Union, right)
            }

            /// `self UNION ALL right`.
            ///
            /// # Errors
            ///
            /// As [`set_op`](Self::set_op).
            pub fn union_all<R: Compatible<Self>>(&self, right: &R) -> Result<SetOpBuilder<$family, Composed>> {
                self.set_op(UnionType::UnionAll, right)
            }

            /// `self UNION DISTINCT right`.
            ///
            /// # Errors
            ///
            /// As [`set_op`](Self::set_op).
            pub fn union_distinct<R: Compatible<Self>>(&self, right: &R) -> Result<SetOpBuilder<$family, Composed>> {
                self.set_op(UnionType::UnionDistinct, right)
            }

            /// `self INTERSECT right`.
            ///
            /// # Errors
            ///
            /// As [`set_op`](Self::set_op).
            pub fn intersect<R: Compatible<Self>>(&self, right: &R) -> Result<SetOpBuilder<$family, Composed>> {
                self.set_op(UnionType::Intersect, right)
            }

            /// `self INTERSECT ALL right`.
            ///
            /// # Errors
            ///
            /// As [`set_op`](Self::set_op).
            pub fn intersect_all<R: Compatible<Self>>(&self, right: &R) -> Result<SetOpBuilder<$family, Composed>> {
                self.set_op(UnionType::IntersectAll, right)
            }

            /// `self INTERSECT DISTINCT right`.
            ///
            /// # Errors
            ///
            /// As [`set_op`](Self::set_op).
            pub fn intersect_distinct<R: Compatible<Self>>(&self, right: &R) -> Result<SetOpBuilder<$family, Composed>> {
                self.set_op(UnionType::IntersectDistinct, right)
            }

            /// `self EXCEPT right`.
            ///
            /// # Errors
            ///
            /// As [`set_op`](Self::set_op).
            pub fn except<R: Compatible<Self>>(&self, right: &R) -> Result<SetOpBuilder<$family, Composed>> {
                self.set_op(UnionType::Except, right)
            }

            /// `self EXCEPT ALL right`.
            ///
            /// # Errors
            ///
            /// As [`set_op`](Self::set_op).
            pub fn except_all<R: Compatible<Self>>(&self, right: &R) -> Result<SetOpBuilder<$family, Composed>> {
                self.set_op(UnionType::ExceptAll, right)
            }

            /// `self EXCEPT DISTINCT right`.
            ///
            /// # Errors
            ///
            /// As [`set_op`](Self::set_op).
            pub fn except_distinct<R: Compatible<Self>>(&self, right: &R) -> Result<SetOpBuilder<$family, Composed>> {
                self.set_op(UnionType::ExceptDistinct, right)
            }

            /// Parenthesizes this statement.
            ///
            /// # Errors
            ///
            /// Fails only once the composite is prepared.
            pub fn bracket(&self) -> Result<SetOpBuilder<$family, Composed>> {
                open_bracket(self)
            }
        }
    };
}

composable!(SelectStmt, SelectKind);
composable!(SubQueryStmt, SubQueryKind);
composable!(ScalarSubQueryStmt, ScalarKind);
composable!(ValuesStmt, ValuesKind);
