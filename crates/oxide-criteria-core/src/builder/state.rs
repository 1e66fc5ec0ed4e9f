//! Lifecycle state shared by every builder.

use std::rc::Rc;

use tracing::debug;

use crate::context::{ContextStack, CriteriaContext};
use crate::dialect::{Dialect, DialectPolicy};
use crate::error::{CriteriaError, Result};
use crate::stmt::StatementKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Building,
    Prepared,
    Aborted,
}

/// Pops the statement's context if the builder is dropped unfinished.
#[derive(Debug)]
struct ContextGuard {
    stack: ContextStack,
    context: Rc<CriteriaContext>,
    armed: bool,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        if self.armed && self.stack.contains(&self.context) {
            let err = CriteriaError::Context(format!(
                "{} builder dropped before prepare",
                self.context.kind()
            ));
            let _ = self.stack.raise_and_unwind(&self.context, err);
        }
    }
}

/// Dialect, criteria value and context of one statement under
/// construction.
#[derive(Debug)]
pub(crate) struct StatementState<C> {
    dialect: Dialect,
    kind: StatementKind,
    criteria: C,
    guard: ContextGuard,
    status: Status,
}

impl<C> StatementState<C> {
    /// Opens a context for a new statement on `stack`.
    pub(crate) fn open(
        stack: ContextStack,
        outer: Option<Rc<CriteriaContext>>,
        dialect: Dialect,
        kind: StatementKind,
        criteria: C,
    ) -> Self {
        let context = stack.open(kind, outer);
        Self {
            dialect,
            kind,
            criteria,
            guard: ContextGuard {
                stack,
                context,
                armed: true,
            },
            status: Status::Building,
        }
    }

    pub(crate) const fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub(crate) const fn kind(&self) -> StatementKind {
        self.kind
    }

    pub(crate) const fn criteria(&self) -> &C {
        &self.criteria
    }

    pub(crate) fn policy(&self) -> &'static dyn DialectPolicy {
        self.dialect.policy()
    }

    pub(crate) const fn context(&self) -> &Rc<CriteriaContext> {
        &self.guard.context
    }

    pub(crate) const fn stack(&self) -> &ContextStack {
        &self.guard.stack
    }

    pub(crate) fn is_prepared(&self) -> bool {
        self.status == Status::Prepared
    }

    /// Fails unless the statement is still being built.
    pub(crate) fn ensure_mutable(&self) -> Result<()> {
        match self.status {
            Status::Building => Ok(()),
            Status::Prepared => Err(CriteriaError::AlreadyPrepared(self.kind)),
            Status::Aborted => Err(CriteriaError::Context(format!(
                "{} construction was aborted by an earlier error",
                self.kind
            ))),
        }
    }

    /// Fails with a dialect error unless `supported` holds.
    pub(crate) fn require(&self, supported: bool, construct: &str) -> Result<()> {
        self.policy().require(supported, construct)
    }

    /// Aborts construction: unwinds the stack to the depth it had before
    /// this statement began and hands `error` back.
    ///
    /// A prepared statement is left as it is.
    pub(crate) fn fail(&mut self, error: CriteriaError) -> CriteriaError {
        if self.status == Status::Building {
            self.status = Status::Aborted;
            self.guard.armed = false;
            return self.guard.stack.raise_and_unwind(&self.guard.context, error);
        }
        error
    }

    /// Pops the context, releases its registries and marks the statement
    /// prepared.
    pub(crate) fn finish(&mut self) -> Result<()> {
        self.ensure_mutable()?;
        self.guard.stack.pop(&self.guard.context)?;
        self.guard.armed = false;
        self.guard.context.clear();
        self.status = Status::Prepared;
        debug!(
            kind = %self.kind,
            dialect = %self.dialect,
            depth = self.guard.stack.depth(),
            "statement prepared"
        );
        Ok(())
    }
}
