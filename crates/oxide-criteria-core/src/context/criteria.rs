//! Per-statement alias and CTE scope.

use std::cell::{Cell, RefCell};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{CriteriaError, Result};
use crate::expr::Expr;
use crate::meta::{SqlType, TableMeta};
use crate::stmt::StatementKind;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// What an alias refers to.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceRef {
    /// A base table.
    Table(TableMeta),
    /// A derived table.
    Derived {
        /// Exposed column names; `None` when unknown.
        fields: Option<Vec<String>>,
        /// Whether the derived table is LATERAL.
        lateral: bool,
    },
    /// A common table expression.
    Cte {
        /// CTE name.
        name: String,
        /// Exposed column names; `None` when unknown.
        fields: Option<Vec<String>>,
    },
}

impl SourceRef {
    /// Returns the table handle of a base-table source.
    #[must_use]
    pub const fn table(&self) -> Option<&TableMeta> {
        match self {
            Self::Table(table) => Some(table),
            Self::Derived { .. } | Self::Cte { .. } => None,
        }
    }

    fn field_type(&self, alias: &str, field: &str) -> Result<Option<SqlType>> {
        let unknown = || CriteriaError::UnknownField {
            alias: String::from(alias),
            field: String::from(field),
        };
        match self {
            Self::Table(table) => table
                .field(field)
                .map(|meta| Some(meta.sql_type()))
                .ok_or_else(unknown),
            Self::Derived { fields, .. } | Self::Cte { fields, .. } => match fields {
                Some(names) if !names.iter().any(|n| n == field) => Err(unknown()),
                _ => Ok(None),
            },
        }
    }
}

/// The scope of one statement under construction.
///
/// Owns the statement's alias registry and declared CTE names, and links to
/// the context of the enclosing statement so that a sub-statement can refer
/// to the aliases of its parents.
#[derive(Debug)]
pub struct CriteriaContext {
    id: u64,
    kind: StatementKind,
    outer: Option<Rc<CriteriaContext>>,
    sources: RefCell<HashMap<String, SourceRef>>,
    ctes: RefCell<HashMap<String, Option<Vec<String>>>>,
    recursive: Cell<bool>,
    cleared: Cell<bool>,
}

impl CriteriaContext {
    /// Creates a context for a statement of `kind` nested in `outer`.
    #[must_use]
    pub fn new(kind: StatementKind, outer: Option<Rc<Self>>) -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            kind,
            outer,
            sources: RefCell::default(),
            ctes: RefCell::default(),
            recursive: Cell::new(false),
            cleared: Cell::new(false),
        }
    }

    /// Returns the process-unique identity of this context.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Returns the kind of statement this context belongs to.
    #[must_use]
    pub const fn kind(&self) -> StatementKind {
        self.kind
    }

    /// Returns the enclosing statement's context.
    #[must_use]
    pub const fn outer(&self) -> Option<&Rc<Self>> {
        self.outer.as_ref()
    }

    /// Registers `alias` in this context.
    ///
    /// Shadowing an alias of an enclosing statement is allowed.
    ///
    /// # Errors
    ///
    /// Returns [`CriteriaError::DuplicateAlias`] if this context already
    /// holds `alias`; the registry is left unchanged.
    pub fn on_add_table_source(&self, alias: &str, source: SourceRef) -> Result<()> {
        match self.sources.borrow_mut().entry(String::from(alias)) {
            Entry::Occupied(_) => Err(CriteriaError::DuplicateAlias(String::from(alias))),
            Entry::Vacant(slot) => {
                slot.insert(source);
                Ok(())
            }
        }
    }

    /// Looks up `alias` in this context only.
    #[must_use]
    pub fn lookup(&self, alias: &str) -> Option<SourceRef> {
        self.sources.borrow().get(alias).cloned()
    }

    /// Looks up `alias` here, then in each enclosing context.
    ///
    /// # Errors
    ///
    /// Returns [`CriteriaError::UnknownAlias`] if no context holds `alias`.
    pub fn resolve(&self, alias: &str) -> Result<SourceRef> {
        let mut scope = Some(self);
        while let Some(ctx) = scope {
            if let Some(source) = ctx.lookup(alias) {
                return Ok(source);
            }
            scope = ctx.outer.as_deref();
        }
        Err(CriteriaError::UnknownAlias(String::from(alias)))
    }

    /// Resolves `alias.field` and returns the field's type when the source
    /// is a base table.
    ///
    /// # Errors
    ///
    /// Returns [`CriteriaError::UnknownAlias`] or
    /// [`CriteriaError::UnknownField`].
    pub fn resolve_field(&self, alias: &str, field: &str) -> Result<Option<SqlType>> {
        self.resolve(alias)?.field_type(alias, field)
    }

    /// Returns the number of aliases registered in this context.
    #[must_use]
    pub fn source_count(&self) -> usize {
        self.sources.borrow().len()
    }

    /// Returns the aliases registered in this context, sorted.
    #[must_use]
    pub fn aliases(&self) -> Vec<String> {
        let mut aliases: Vec<String> = self.sources.borrow().keys().cloned().collect();
        aliases.sort();
        aliases
    }

    /// Declares a CTE name in this context.
    ///
    /// # Errors
    ///
    /// Returns [`CriteriaError::DuplicateCteName`] if this context already
    /// declares `name`.
    pub fn declare_cte(&self, name: &str, fields: Option<Vec<String>>) -> Result<()> {
        match self.ctes.borrow_mut().entry(String::from(name)) {
            Entry::Occupied(_) => Err(CriteriaError::DuplicateCteName(String::from(name))),
            Entry::Vacant(slot) => {
                slot.insert(fields);
                Ok(())
            }
        }
    }

    /// Records the columns of a CTE declared before its body was known.
    pub(crate) fn define_cte_fields(&self, name: &str, fields: Option<Vec<String>>) {
        if let Some(slot) = self.ctes.borrow_mut().get_mut(name) {
            if slot.is_none() {
                *slot = fields;
            }
        }
    }

    /// Finds the columns of the CTE `name` declared here or in an enclosing
    /// context.
    ///
    /// # Errors
    ///
    /// Returns [`CriteriaError::UnknownCte`] if no context declares `name`.
    pub fn resolve_cte(&self, name: &str) -> Result<Option<Vec<String>>> {
        let mut scope = Some(self);
        while let Some(ctx) = scope {
            if let Some(fields) = ctx.ctes.borrow().get(name) {
                return Ok(fields.clone());
            }
            scope = ctx.outer.as_deref();
        }
        Err(CriteriaError::UnknownCte(String::from(name)))
    }

    /// Marks the WITH clause of this statement as recursive.
    pub fn set_recursive(&self) {
        self.recursive.set(true);
    }

    /// Returns whether the WITH clause of this statement is recursive.
    #[must_use]
    pub fn is_recursive(&self) -> bool {
        self.recursive.get()
    }

    /// Releases the alias and CTE registries once the statement is prepared.
    ///
    /// Returns false if the context was already cleared.
    pub fn clear(&self) -> bool {
        if self.cleared.replace(true) {
            return false;
        }
        self.sources.borrow_mut().clear();
        self.ctes.borrow_mut().clear();
        true
    }

    /// Returns whether [`clear`](Self::clear) has run.
    #[must_use]
    pub fn is_cleared(&self) -> bool {
        self.cleared.get()
    }

    /// Resolves every qualified field reference in `expr` and types the
    /// values compared against a base-table field.
    ///
    /// Returns the type of `expr` itself when it is such a field.
    ///
    /// # Errors
    ///
    /// Returns [`CriteriaError::UnknownAlias`] or
    /// [`CriteriaError::UnknownField`] for unresolvable references and
    /// [`CriteriaError::InvalidArgument`] for an empty IN list.
    pub fn resolve_expr(&self, expr: &mut Expr) -> Result<Option<SqlType>> {
        match expr {
            Expr::Field { alias, name } => self.resolve_field(alias, name),
            Expr::Paren(inner) => self.resolve_expr(inner),
            Expr::Binary { left, op, right } => {
                let left_type = self.resolve_expr(left)?;
                let right_type = self.resolve_expr(right)?;
                if op.is_comparison() {
                    annotate(right, left_type);
                    annotate(left, right_type);
                }
                Ok(None)
            }
            Expr::Unary { operand, .. } => {
                self.resolve_expr(operand)?;
                Ok(None)
            }
            Expr::IsNull { expr, .. } | Expr::InQuery { expr, .. } => {
                self.resolve_expr(expr)?;
                Ok(None)
            }
            Expr::InList { expr, list, .. } => {
                if list.is_empty() {
                    return Err(CriteriaError::invalid("IN list must not be empty"));
                }
                let ty = self.resolve_expr(expr)?;
                for item in list {
                    self.resolve_expr(item)?;
                    annotate(item, ty);
                }
                Ok(None)
            }
            Expr::Between {
                expr, low, high, ..
            } => {
                let ty = self.resolve_expr(expr)?;
                self.resolve_expr(low)?;
                self.resolve_expr(high)?;
                annotate(low, ty);
                annotate(high, ty);
                Ok(None)
            }
            Expr::Function(call) => {
                for arg in &mut call.args {
                    self.resolve_expr(arg)?;
                }
                Ok(None)
            }
            Expr::Column(_)
            | Expr::Param { .. }
            | Expr::Literal { .. }
            | Expr::Exists { .. }
            | Expr::Scalar(_)
            | Expr::Wildcard => Ok(None),
        }
    }
}

fn annotate(expr: &mut Expr, ty: Option<SqlType>) {
    if let Expr::Param { sql_type, .. } | Expr::Literal { sql_type, .. } = expr {
        if sql_type.is_none() {
            *sql_type = ty;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{field, literal};
    use crate::value::SqlValue;

    fn users() -> TableMeta {
        TableMeta::builder("users")
            .field("id", SqlType::BigInt)
            .field("name", SqlType::VarChar)
            .build()
    }

    #[test]
    fn test_duplicate_alias_is_atomic() {
        let ctx = CriteriaContext::new(StatementKind::SimpleSelect, None);
        let table = users();
        ctx.on_add_table_source("u", SourceRef::Table(table.clone()))
            .unwrap();
        let err = ctx
            .on_add_table_source(
                "u",
                SourceRef::Derived {
                    fields: None,
                    lateral: false,
                },
            )
            .unwrap_err();
        assert_eq!(err, CriteriaError::DuplicateAlias("u".into()));
        assert_eq!(ctx.source_count(), 1);
        assert_eq!(ctx.lookup("u"), Some(SourceRef::Table(table)));
    }

    #[test]
    fn test_resolve_walks_outer_contexts() {
        let outer = Rc::new(CriteriaContext::new(StatementKind::SimpleSelect, None));
        outer
            .on_add_table_source("u", SourceRef::Table(users()))
            .unwrap();
        let inner = CriteriaContext::new(StatementKind::SubQuery, Some(Rc::clone(&outer)));

        assert!(inner.resolve("u").is_ok());
        assert!(inner.lookup("u").is_none());
        assert_eq!(
            inner.resolve("x"),
            Err(CriteriaError::UnknownAlias("x".into()))
        );
        // Shadowing an outer alias is legal.
        inner
            .on_add_table_source(
                "u",
                SourceRef::Derived {
                    fields: Some(vec!["n".into()]),
                    lateral: false,
                },
            )
            .unwrap();
        assert!(matches!(inner.resolve("u"), Ok(SourceRef::Derived { .. })));
    }

    #[test]
    fn test_resolve_field() {
        let ctx = CriteriaContext::new(StatementKind::SimpleSelect, None);
        ctx.on_add_table_source("u", SourceRef::Table(users()))
            .unwrap();
        ctx.on_add_table_source(
            "d",
            SourceRef::Derived {
                fields: Some(vec!["total".into()]),
                lateral: false,
            },
        )
        .unwrap();
        assert_eq!(ctx.resolve_field("u", "id"), Ok(Some(SqlType::BigInt)));
        assert_eq!(ctx.resolve_field("d", "total"), Ok(None));
        assert!(matches!(
            ctx.resolve_field("u", "missing"),
            Err(CriteriaError::UnknownField { .. })
        ));
        assert!(matches!(
            ctx.resolve_field("d", "missing"),
            Err(CriteriaError::UnknownField { .. })
        ));
    }

    #[test]
    fn test_cte_scope() {
        let outer = Rc::new(CriteriaContext::new(StatementKind::SimpleSelect, None));
        outer.declare_cte("recent", None).unwrap();
        assert_eq!(
            outer.declare_cte("recent", None),
            Err(CriteriaError::DuplicateCteName("recent".into()))
        );
        outer.define_cte_fields("recent", Some(vec!["id".into()]));

        let inner = CriteriaContext::new(StatementKind::SubQuery, Some(outer));
        assert_eq!(inner.resolve_cte("recent"), Ok(Some(vec!["id".into()])));
        assert_eq!(
            inner.resolve_cte("other"),
            Err(CriteriaError::UnknownCte("other".into()))
        );
    }

    #[test]
    fn test_clear_runs_once() {
        let ctx = CriteriaContext::new(StatementKind::SimpleSelect, None);
        ctx.on_add_table_source("u", SourceRef::Table(users()))
            .unwrap();
        assert!(ctx.clear());
        assert!(ctx.is_cleared());
        assert_eq!(ctx.source_count(), 0);
        assert!(!ctx.clear());
    }

    #[test]
    fn test_resolve_expr_types_params() {
        let ctx = CriteriaContext::new(StatementKind::SimpleSelect, None);
        ctx.on_add_table_source("u", SourceRef::Table(users()))
            .unwrap();
        let mut expr = field("u", "name").eq(literal("bob"));
        ctx.resolve_expr(&mut expr).unwrap();
        let Expr::Binary { right, .. } = expr else {
            panic!("expected binary");
        };
        assert_eq!(
            *right,
            Expr::Literal {
                value: SqlValue::Text("bob".into()),
                sql_type: Some(SqlType::VarChar),
            }
        );
    }

    #[test]
    fn test_resolve_expr_errors() {
        let ctx = CriteriaContext::new(StatementKind::SimpleSelect, None);
        ctx.on_add_table_source("u", SourceRef::Table(users()))
            .unwrap();
        let mut unknown = field("v", "id").eq(1);
        assert_eq!(
            ctx.resolve_expr(&mut unknown),
            Err(CriteriaError::UnknownAlias("v".into()))
        );
        let mut empty = field("u", "id").in_list(Vec::<i32>::new());
        assert!(matches!(
            ctx.resolve_expr(&mut empty),
            Err(CriteriaError::InvalidArgument(_))
        ));
    }
}
