//! Clause-level building blocks shared by every statement kind.

use super::{RowSet, SubQueryStmt};
use crate::expr::Expr;
use crate::meta::TableMeta;

/// Order direction for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    /// Ascending order.
    Asc,
    /// Descending order.
    Desc,
}

impl OrderDirection {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// An ORDER BY entry. Without a direction the database default applies.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    /// The expression to order by.
    pub expr: Expr,
    /// The direction, if spelled out.
    pub direction: Option<OrderDirection>,
}

impl From<Expr> for OrderItem {
    fn from(expr: Expr) -> Self {
        Self {
            expr,
            direction: None,
        }
    }
}

/// An entry of the SELECT list.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// An expression with an optional alias.
    Expr {
        /// The selected expression.
        expr: Expr,
        /// The alias.
        alias: Option<String>,
    },
    /// `*`.
    All,
    /// `alias.*`.
    AllOf(String),
}

impl Selection {
    /// Creates `alias.*`.
    #[must_use]
    pub fn all_of(alias: &str) -> Self {
        Self::AllOf(String::from(alias))
    }

    /// Returns the name this entry exposes to an enclosing statement.
    #[must_use]
    pub fn output_name(&self) -> Option<&str> {
        match self {
            Self::Expr {
                alias: Some(alias), ..
            } => Some(alias),
            Self::Expr { expr, alias: None } => expr.output_name(),
            Self::All | Self::AllOf(_) => None,
        }
    }
}

impl From<Expr> for Selection {
    fn from(expr: Expr) -> Self {
        Self::Expr { expr, alias: None }
    }
}

/// Join type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// INNER JOIN.
    Inner,
    /// LEFT JOIN.
    Left,
    /// RIGHT JOIN.
    Right,
    /// STRAIGHT_JOIN.
    Straight,
    /// CROSS JOIN.
    Cross,
    /// NATURAL JOIN.
    Natural,
    /// NATURAL LEFT JOIN.
    NaturalLeft,
    /// NATURAL RIGHT JOIN.
    NaturalRight,
}

impl JoinKind {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Inner => "JOIN",
            Self::Left => "LEFT JOIN",
            Self::Right => "RIGHT JOIN",
            Self::Straight => "STRAIGHT_JOIN",
            Self::Cross => "CROSS JOIN",
            Self::Natural => "NATURAL JOIN",
            Self::NaturalLeft => "NATURAL LEFT JOIN",
            Self::NaturalRight => "NATURAL RIGHT JOIN",
        }
    }

    /// Returns whether the join must be followed by an ON predicate.
    #[must_use]
    pub const fn requires_on(&self) -> bool {
        matches!(self, Self::Inner | Self::Left | Self::Right | Self::Straight)
    }
}

/// Something that can appear in FROM or JOIN.
#[derive(Debug, Clone, PartialEq)]
pub enum TableItem {
    /// A base table.
    Table(TableMeta),
    /// A derived table.
    Derived(SubQueryStmt),
    /// A common table expression declared by an enclosing WITH clause.
    Cte(String),
}

impl From<TableMeta> for TableItem {
    fn from(table: TableMeta) -> Self {
        Self::Table(table)
    }
}

impl From<&TableMeta> for TableItem {
    fn from(table: &TableMeta) -> Self {
        Self::Table(table.clone())
    }
}

impl From<SubQueryStmt> for TableItem {
    fn from(query: SubQueryStmt) -> Self {
        Self::Derived(query)
    }
}

/// Refers to a common table expression by name.
#[must_use]
pub fn cte(name: &str) -> TableItem {
    TableItem::Cte(String::from(name))
}

/// Index hint verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexHintKind {
    /// USE INDEX.
    Use,
    /// IGNORE INDEX.
    Ignore,
    /// FORCE INDEX.
    Force,
}

impl IndexHintKind {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Use => "USE INDEX",
            Self::Ignore => "IGNORE INDEX",
            Self::Force => "FORCE INDEX",
        }
    }
}

/// Index hint scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexHintPurpose {
    /// FOR JOIN.
    Join,
    /// FOR ORDER BY.
    OrderBy,
    /// FOR GROUP BY.
    GroupBy,
}

impl IndexHintPurpose {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Join => "FOR JOIN",
            Self::OrderBy => "FOR ORDER BY",
            Self::GroupBy => "FOR GROUP BY",
        }
    }
}

/// An index hint attached to a base table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexHint {
    /// Hint verb.
    pub kind: IndexHintKind,
    /// Optional scope.
    pub purpose: Option<IndexHintPurpose>,
    /// Index names.
    pub indexes: Box<[String]>,
}

/// One entry of a FROM list: the first source or a join.
#[derive(Debug, Clone, PartialEq)]
pub struct TableBlock {
    /// `None` for the leading source.
    pub join: Option<JoinKind>,
    /// The source.
    pub item: TableItem,
    /// The alias the source is registered under.
    pub alias: String,
    /// ON predicates, joined with AND.
    pub on: Box<[Expr]>,
    /// PARTITION names.
    pub partitions: Box<[String]>,
    /// Index hints.
    pub index_hints: Box<[IndexHint]>,
}

impl TableBlock {
    /// Returns true for a LATERAL derived table.
    #[must_use]
    pub fn is_lateral(&self) -> bool {
        matches!(&self.item, TableItem::Derived(query) if query.is_lateral())
    }
}

/// Row lock mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockMode {
    /// No locking clause.
    #[default]
    None,
    /// FOR UPDATE.
    ForUpdate,
    /// FOR SHARE.
    ForShare,
    /// LOCK IN SHARE MODE.
    LockInShareMode,
}

impl LockMode {
    /// Returns whether the mode accepts `OF` lists and wait options.
    #[must_use]
    pub const fn accepts_options(&self) -> bool {
        matches!(self, Self::ForUpdate | Self::ForShare)
    }
}

/// Lock wait option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockWait {
    /// NOWAIT.
    NoWait,
    /// SKIP LOCKED.
    SkipLocked,
}

impl LockWait {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NoWait => "NOWAIT",
            Self::SkipLocked => "SKIP LOCKED",
        }
    }
}

/// The locking clause of a query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LockClause {
    /// Lock mode.
    pub mode: LockMode,
    /// Aliases listed after `OF`.
    pub of: Box<[String]>,
    /// Wait option.
    pub wait: Option<LockWait>,
}

/// Name and optional column list of a common table expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CteName {
    pub(crate) name: String,
    pub(crate) columns: Vec<String>,
}

impl CteName {
    /// Creates a CTE name without a column list.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: String::from(name),
            columns: vec![],
        }
    }

    /// Adds a column list.
    #[must_use]
    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| String::from(*c)).collect();
        self
    }
}

impl From<&str> for CteName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A common table expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Cte {
    /// CTE name.
    pub name: String,
    /// Column list, empty when omitted.
    pub columns: Box<[String]>,
    /// Body.
    pub query: RowSet,
}

/// The WITH clause of a statement.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WithClause {
    /// Whether `RECURSIVE` applies to the whole clause.
    pub recursive: bool,
    /// CTEs in declaration order.
    pub ctes: Box<[Cte]>,
}

impl WithClause {
    /// Returns true when no CTE is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ctes.is_empty()
    }
}

/// A window specification, used by the WINDOW clause.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WindowSpec {
    pub(crate) reference: Option<String>,
    pub(crate) partition_by: Vec<Expr>,
    pub(crate) order_by: Vec<OrderItem>,
}

impl WindowSpec {
    /// Creates an empty specification.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a specification refining an earlier named window.
    #[must_use]
    pub fn based_on(window: &str) -> Self {
        Self {
            reference: Some(String::from(window)),
            ..Self::default()
        }
    }

    /// Adds PARTITION BY expressions.
    #[must_use]
    pub fn partition_by(mut self, exprs: Vec<Expr>) -> Self {
        self.partition_by.extend(exprs);
        self
    }

    /// Adds ORDER BY entries.
    #[must_use]
    pub fn order_by<I: Into<OrderItem>>(mut self, items: Vec<I>) -> Self {
        self.order_by.extend(items.into_iter().map(Into::into));
        self
    }
}

/// A named window of the WINDOW clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    /// Window name.
    pub name: String,
    /// Earlier window this one refines.
    pub reference: Option<String>,
    /// PARTITION BY expressions.
    pub partition_by: Box<[Expr]>,
    /// ORDER BY entries.
    pub order_by: Box<[OrderItem]>,
}

/// `field = value` in an UPDATE.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// Target field.
    pub field: Expr,
    /// New value.
    pub value: Expr,
}

/// The trailing ORDER BY / LIMIT / lock clauses of a row set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tail {
    pub(crate) order_by: Box<[OrderItem]>,
    pub(crate) order_rollup: bool,
    pub(crate) row_count: Option<u64>,
    pub(crate) offset: Option<u64>,
    pub(crate) lock: LockClause,
}

impl Tail {
    /// ORDER BY entries.
    #[must_use]
    pub fn order_by(&self) -> &[OrderItem] {
        &self.order_by
    }

    /// Whether `WITH ROLLUP` follows the ORDER BY list.
    #[must_use]
    pub const fn order_rollup(&self) -> bool {
        self.order_rollup
    }

    /// LIMIT row count; `None` when no LIMIT was given.
    #[must_use]
    pub const fn row_count(&self) -> Option<u64> {
        self.row_count
    }

    /// OFFSET; `None` when unset.
    #[must_use]
    pub const fn offset(&self) -> Option<u64> {
        self.offset
    }

    /// Locking clause.
    #[must_use]
    pub const fn lock(&self) -> &LockClause {
        &self.lock
    }

    /// Returns true when no ORDER BY, LIMIT or lock is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order_by.is_empty() && self.row_count.is_none() && self.lock.mode == LockMode::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{col, field};

    #[test]
    fn test_join_kind() {
        assert_eq!(JoinKind::Inner.as_str(), "JOIN");
        assert!(JoinKind::Left.requires_on());
        assert!(JoinKind::Straight.requires_on());
        assert!(!JoinKind::Cross.requires_on());
        assert!(!JoinKind::NaturalLeft.requires_on());
    }

    #[test]
    fn test_selection_output_name() {
        assert_eq!(Selection::from(field("a", "id")).output_name(), Some("id"));
        assert_eq!(field("a", "id").as_("uid").output_name(), Some("uid"));
        assert_eq!(Selection::all_of("a").output_name(), None);
        assert_eq!(Selection::All.output_name(), None);
    }

    #[test]
    fn test_lock_mode_options() {
        assert!(LockMode::ForUpdate.accepts_options());
        assert!(LockMode::ForShare.accepts_options());
        assert!(!LockMode::LockInShareMode.accepts_options());
        assert!(!LockMode::None.accepts_options());
    }

    #[test]
    fn test_window_spec() {
        let spec = WindowSpec::based_on("w")
            .partition_by(vec![field("a", "dept")])
            .order_by(vec![col("salary").desc()]);
        assert_eq!(spec.reference.as_deref(), Some("w"));
        assert_eq!(spec.partition_by.len(), 1);
        assert_eq!(spec.order_by.len(), 1);
    }

    #[test]
    fn test_empty_tail() {
        assert!(Tail::default().is_empty());
    }
}
