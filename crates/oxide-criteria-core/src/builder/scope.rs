//! Entry points for sub-statements.

use std::rc::Rc;

use super::kind::{ScalarKind, SubQueryKind};
use super::phase::Initial;
use super::values::ValuesBuilder;
use super::StatementBuilder;
use crate::context::{ContextStack, CriteriaContext};
use crate::dialect::Dialect;
use crate::error::Result;

/// Opens sub-statements nested in an enclosing statement.
///
/// A sub-statement shares the enclosing statement's context stack and
/// resolves aliases it does not register itself through the enclosing
/// context, so a correlated sub-query may refer to `u.id` of its parent.
/// It must be prepared (or dropped) before its parent is.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    stack: &'a ContextStack,
    outer: &'a Rc<CriteriaContext>,
    dialect: Dialect,
}

impl<'a> Scope<'a> {
    pub(crate) const fn new(
        stack: &'a ContextStack,
        outer: &'a Rc<CriteriaContext>,
        dialect: Dialect,
    ) -> Self {
        Self {
            stack,
            outer,
            dialect,
        }
    }

    /// Returns the dialect sub-statements are built for.
    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn open<K: super::BuilderKind, C>(&self, criteria: C) -> StatementBuilder<K, Initial, C> {
        StatementBuilder::open(
            self.stack.clone(),
            Some(Rc::clone(self.outer)),
            self.dialect,
            criteria,
        )
    }

    /// Begins a sub-query.
    #[must_use]
    pub fn sub_query(&self) -> StatementBuilder<SubQueryKind, Initial> {
        self.open(())
    }

    /// Begins a sub-query carrying its own criteria value.
    #[must_use]
    pub fn sub_query_with<C>(&self, criteria: C) -> StatementBuilder<SubQueryKind, Initial, C> {
        self.open(criteria)
    }

    /// Begins a LATERAL sub-query, which may refer to the sources joined
    /// before it in the enclosing FROM list.
    ///
    /// # Errors
    ///
    /// Fails with [`CriteriaError::Dialect`](crate::CriteriaError::Dialect)
    /// where LATERAL is unsupported; no context is opened then.
    pub fn lateral_sub_query(&self) -> Result<StatementBuilder<SubQueryKind, Initial>> {
        let policy = self.dialect.policy();
        policy.require(policy.supports_lateral(), "LATERAL derived table")?;
        let mut builder = self.open(());
        builder.lateral = true;
        Ok(builder)
    }

    /// Begins a scalar sub-query.
    #[must_use]
    pub fn scalar_sub_query(&self) -> StatementBuilder<ScalarKind, Initial> {
        self.open(())
    }

    /// Begins a VALUES statement.
    #[must_use]
    pub fn values(&self) -> ValuesBuilder<Initial> {
        ValuesBuilder::open(
            self.stack.clone(),
            Some(Rc::clone(self.outer)),
            self.dialect,
            (),
        )
    }
}
