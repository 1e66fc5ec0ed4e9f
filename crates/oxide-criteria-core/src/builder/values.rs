//! The `VALUES ROW(...)` statement.

use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::Arc;

use super::draft::TailDraft;
use super::phase::{Initial, Limitable, Limited, Orderable, Ordered, Preparable, RowPhase, Rows};
use super::state::StatementState;
use crate::context::{ContextStack, CriteriaContext};
use crate::dialect::Dialect;
use crate::error::{CriteriaError, Result};
use crate::expr::{Expr, IntoExpr};
use crate::stmt::{OrderItem, RowSet, StatementKind, ValuesQuery, ValuesStmt};

/// Builds a VALUES statement: rows of equal arity, then an optional ORDER
/// BY over `column_0`, `column_1`, ... and LIMIT.
pub struct ValuesBuilder<Ph, C = ()> {
    pub(crate) state: StatementState<C>,
    rows: Vec<Box<[Expr]>>,
    tail: TailDraft,
    pub(crate) output: Option<RowSet>,
    _marker: PhantomData<fn() -> Ph>,
}

impl<Ph, C: fmt::Debug> fmt::Debug for ValuesBuilder<Ph, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValuesBuilder")
            .field("dialect", &self.state.dialect())
            .field("criteria", self.state.criteria())
            .field("rows", &self.rows.len())
            .field("prepared", &self.state.is_prepared())
            .finish_non_exhaustive()
    }
}

impl<C> ValuesBuilder<Initial, C> {
    pub(crate) fn open(
        stack: ContextStack,
        outer: Option<Rc<CriteriaContext>>,
        dialect: Dialect,
        criteria: C,
    ) -> Self {
        Self {
            state: StatementState::open(stack, outer, dialect, StatementKind::Values, criteria),
            rows: vec![],
            tail: TailDraft::default(),
            output: None,
            _marker: PhantomData,
        }
    }
}

impl<Ph, C> ValuesBuilder<Ph, C> {
    fn step<Next>(
        mut self,
        clause: impl FnOnce(&mut Self) -> Result<()>,
    ) -> Result<ValuesBuilder<Next, C>> {
        self.state.ensure_mutable()?;
        if let Err(err) = clause(&mut self) {
            return Err(self.state.fail(err));
        }
        Ok(ValuesBuilder {
            state: self.state,
            rows: self.rows,
            tail: self.tail,
            output: self.output,
            _marker: PhantomData,
        })
    }

    fn arity(&self) -> usize {
        self.rows.first().map_or(0, |row| row.len())
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

    /// Returns whether `prepare` has succeeded.
    #[must_use]
    pub fn is_prepared(&self) -> bool {
        self.state.is_prepared()
    }
}

impl<Ph: RowPhase, C> ValuesBuilder<Ph, C> {
    /// Appends `ROW(...)`.
    ///
    /// # Errors
    ///
    /// Fails with [`CriteriaError::InvalidArgument`] for an empty row or
    /// one whose arity differs from the first row's.
    pub fn row<I>(self, values: I) -> Result<ValuesBuilder<Rows, C>>
    where
        I: IntoIterator,
        I::Item: IntoExpr,
    {
        self.step(|b| {
            let context = b.state.context();
            let mut row = Vec::new();
            for value in values {
                let mut expr = value.into_expr();
                context.resolve_expr(&mut expr)?;
                row.push(expr);
            }
            if row.is_empty() {
                return Err(CriteriaError::invalid("VALUES row must not be empty"));
            }
            if !b.rows.is_empty() && row.len() != b.arity() {
                return Err(CriteriaError::invalid(format!(
                    "VALUES row has {} columns, expected {}",
                    row.len(),
                    b.arity()
                )));
            }
            b.rows.push(row.into_boxed_slice());
            Ok(())
        })
    }
}

impl<Ph: Orderable, C> ValuesBuilder<Ph, C> {
    /// Orders the rows by their generated column names.
    ///
    /// # Errors
    ///
    /// Fails with [`CriteriaError::InvalidArgument`] for an empty list or
    /// an item that is not a `column_N` reference within the row arity.
    pub fn order_by<I>(self, items: I) -> Result<ValuesBuilder<Ordered, C>>
    where
        I: IntoIterator,
        I::Item: Into<OrderItem>,
    {
        self.step(|b| {
            let arity = b.arity();
            let items: Vec<OrderItem> = items.into_iter().map(Into::into).collect();
            for item in &items {
                let valid = match &item.expr {
                    Expr::Column(name) => name
                        .strip_prefix("column_")
                        .and_then(|n| n.parse::<usize>().ok())
                        .is_some_and(|n| n < arity),
                    _ => false,
                };
                if !valid {
                    return Err(CriteriaError::invalid(
                        "VALUES can only be ordered by column_N references",
                    ));
                }
            }
            b.tail.add_order(items)
        })
    }
}

impl<Ph: Limitable, C> ValuesBuilder<Ph, C> {
    /// Limits the row count.
    ///
    /// # Errors
    ///
    /// Fails with [`CriteriaError::InvalidArgument`] for a negative count.
    pub fn limit(self, row_count: i64) -> Result<ValuesBuilder<Limited, C>> {
        self.step(|b| b.tail.set_limit(row_count))
    }
}

impl<Ph: Preparable, C> ValuesBuilder<Ph, C> {
    fn assemble(&mut self) -> Result<ValuesStmt> {
        let policy = self.state.policy();
        policy.require(policy.supports_values_statement(), "VALUES statement")?;
        self.state.finish()?;
        let query = ValuesQuery {
            dialect: self.state.dialect(),
            rows: std::mem::take(&mut self.rows).into_boxed_slice(),
            tail: std::mem::take(&mut self.tail).freeze(),
        };
        let row_set = RowSet::Values(Arc::new(query));
        self.output = Some(row_set.clone());
        Ok(ValuesStmt::new(row_set))
    }

    /// Finishes the statement.
    ///
    /// # Errors
    ///
    /// Fails with [`CriteriaError::Dialect`] where VALUES statements are
    /// unsupported and with [`CriteriaError::AlreadyPrepared`] on a second
    /// call.
    pub fn prepare(&mut self) -> Result<ValuesStmt> {
        self.state.ensure_mutable()?;
        self.assemble().map_err(|err| self.state.fail(err))
    }

    /// Consuming form of [`prepare`](Self::prepare).
    ///
    /// # Errors
    ///
    /// As [`prepare`](Self::prepare).
    pub fn build(mut self) -> Result<ValuesStmt> {
        self.prepare()
    }
}
