//! Expression tree for selections, predicates and orderings.
//!
//! Expressions are plain values; nothing is checked while they are built.
//! Aliases are resolved when an expression is handed to a statement builder,
//! against the builder's criteria context and its outer contexts.

use crate::meta::SqlType;
use crate::stmt::{OrderDirection, OrderItem, ScalarSubQueryStmt, Selection, SubQueryStmt};
use crate::value::{SqlValue, ToSqlValue};

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Comparison
    Eq,
    NullSafeEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Logical
    And,
    Or,

    // String
    Like,
    NotLike,

    // Bitwise
    BitAnd,
    BitOr,
}

impl BinaryOp {
    /// Returns the SQL representation of the operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Eq => "=",
            Self::NullSafeEq => "<=>",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
            Self::BitAnd => "&",
            Self::BitOr => "|",
        }
    }

    /// Returns true for operators comparing two values of the same type.
    #[must_use]
    pub const fn is_comparison(&self) -> bool {
        matches!(
            self,
            Self::Eq
                | Self::NullSafeEq
                | Self::NotEq
                | Self::Lt
                | Self::LtEq
                | Self::Gt
                | Self::GtEq
                | Self::Like
                | Self::NotLike
        )
    }

    /// Returns the precedence of the operator (higher = binds tighter).
    #[must_use]
    pub const fn precedence(&self) -> u8 {
        match self {
            Self::Or => 1,
            Self::And => 2,
            Self::Eq
            | Self::NullSafeEq
            | Self::NotEq
            | Self::Lt
            | Self::LtEq
            | Self::Gt
            | Self::GtEq
            | Self::Like
            | Self::NotLike => 3,
            Self::BitOr => 4,
            Self::BitAnd => 5,
            Self::Add | Self::Sub => 6,
            Self::Mul | Self::Div | Self::Mod => 7,
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Negation (-)
    Neg,
    /// Logical NOT
    Not,
    /// Bitwise NOT (~)
    BitNot,
}

impl UnaryOp {
    /// Returns the SQL representation of the operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::Not => "NOT",
            Self::BitNot => "~",
        }
    }
}

/// A function call expression.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    /// The function name.
    pub name: String,
    /// The arguments.
    pub args: Vec<Expr>,
    /// Whether DISTINCT was specified.
    pub distinct: bool,
}

/// An SQL expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A field of a table source, qualified by the source's alias.
    Field {
        /// Table source alias.
        alias: String,
        /// Field name.
        name: String,
    },

    /// An unqualified name: a selection alias or a column of a lone source.
    Column(String),

    /// A bind parameter.
    Param {
        /// Bound value.
        value: SqlValue,
        /// Type of the field the value is compared with, once resolved.
        sql_type: Option<SqlType>,
    },

    /// A literal rendered inline.
    Literal {
        /// Literal value.
        value: SqlValue,
        /// Type of the field the value is compared with, once resolved.
        sql_type: Option<SqlType>,
    },

    /// A binary expression.
    Binary {
        /// Left operand.
        left: Box<Expr>,
        /// Operator.
        op: BinaryOp,
        /// Right operand.
        right: Box<Expr>,
    },

    /// A unary expression.
    Unary {
        /// Operator.
        op: UnaryOp,
        /// Operand.
        operand: Box<Expr>,
    },

    /// IS NULL expression.
    IsNull {
        /// The expression to check.
        expr: Box<Expr>,
        /// Whether this is IS NOT NULL.
        negated: bool,
    },

    /// IN expression over a value list.
    InList {
        /// The expression to check.
        expr: Box<Expr>,
        /// The candidate values.
        list: Vec<Expr>,
        /// Whether this is NOT IN.
        negated: bool,
    },

    /// IN expression over a sub-query.
    InQuery {
        /// The expression to check.
        expr: Box<Expr>,
        /// The sub-query.
        query: SubQueryStmt,
        /// Whether this is NOT IN.
        negated: bool,
    },

    /// BETWEEN expression.
    Between {
        /// The expression to check.
        expr: Box<Expr>,
        /// Lower bound.
        low: Box<Expr>,
        /// Upper bound.
        high: Box<Expr>,
        /// Whether this is NOT BETWEEN.
        negated: bool,
    },

    /// EXISTS expression.
    Exists {
        /// The sub-query.
        query: SubQueryStmt,
        /// Whether this is NOT EXISTS.
        negated: bool,
    },

    /// A function call.
    Function(FunctionCall),

    /// A scalar sub-query used as a value.
    Scalar(ScalarSubQueryStmt),

    /// Parenthesized expression.
    Paren(Box<Expr>),

    /// `*` as a function argument, e.g. `COUNT(*)`.
    Wildcard,
}

/// Conversion into an expression operand.
///
/// Plain values become bind parameters.
pub trait IntoExpr {
    /// Converts `self` into an expression.
    fn into_expr(self) -> Expr;
}

impl IntoExpr for Expr {
    fn into_expr(self) -> Expr {
        self
    }
}

impl<T: ToSqlValue> IntoExpr for T {
    fn into_expr(self) -> Expr {
        Expr::Param {
            value: self.to_sql_value(),
            sql_type: None,
        }
    }
}

impl IntoExpr for ScalarSubQueryStmt {
    fn into_expr(self) -> Expr {
        Expr::Scalar(self)
    }
}

/// Creates a reference to `alias.name`.
#[must_use]
pub fn field(alias: &str, name: &str) -> Expr {
    Expr::Field {
        alias: String::from(alias),
        name: String::from(name),
    }
}

/// Creates an unqualified column or selection-alias reference.
#[must_use]
pub fn col(name: &str) -> Expr {
    Expr::Column(String::from(name))
}

/// Creates a bind parameter.
#[must_use]
pub fn param<T: ToSqlValue>(value: T) -> Expr {
    value.into_expr()
}

/// Creates an inline literal.
#[must_use]
pub fn literal<T: ToSqlValue>(value: T) -> Expr {
    Expr::Literal {
        value: value.to_sql_value(),
        sql_type: None,
    }
}

/// Creates a function call.
#[must_use]
pub fn func(name: &str, args: Vec<Expr>) -> Expr {
    Expr::Function(FunctionCall {
        name: String::from(name),
        args,
        distinct: false,
    })
}

/// Creates `COUNT(*)`.
#[must_use]
pub fn count_star() -> Expr {
    func("COUNT", vec![Expr::Wildcard])
}

/// Creates `EXISTS (sub-query)`.
#[must_use]
pub const fn exists(query: SubQueryStmt) -> Expr {
    Expr::Exists {
        query,
        negated: false,
    }
}

/// Creates `NOT EXISTS (sub-query)`.
#[must_use]
pub const fn not_exists(query: SubQueryStmt) -> Expr {
    Expr::Exists {
        query,
        negated: true,
    }
}

impl Expr {
    fn binary(self, op: BinaryOp, right: impl IntoExpr) -> Self {
        Self::Binary {
            left: Box::new(self),
            op,
            right: Box::new(right.into_expr()),
        }
    }

    /// Creates an equality expression.
    #[must_use]
    pub fn eq(self, right: impl IntoExpr) -> Self {
        self.binary(BinaryOp::Eq, right)
    }

    /// Creates a NULL-safe equality expression (`<=>`).
    #[must_use]
    pub fn null_safe_eq(self, right: impl IntoExpr) -> Self {
        self.binary(BinaryOp::NullSafeEq, right)
    }

    /// Creates an inequality expression.
    #[must_use]
    pub fn not_eq(self, right: impl IntoExpr) -> Self {
        self.binary(BinaryOp::NotEq, right)
    }

    /// Creates a less-than expression.
    #[must_use]
    pub fn lt(self, right: impl IntoExpr) -> Self {
        self.binary(BinaryOp::Lt, right)
    }

    /// Creates a less-than-or-equal expression.
    #[must_use]
    pub fn lt_eq(self, right: impl IntoExpr) -> Self {
        self.binary(BinaryOp::LtEq, right)
    }

    /// Creates a greater-than expression.
    #[must_use]
    pub fn gt(self, right: impl IntoExpr) -> Self {
        self.binary(BinaryOp::Gt, right)
    }

    /// Creates a greater-than-or-equal expression.
    #[must_use]
    pub fn gt_eq(self, right: impl IntoExpr) -> Self {
        self.binary(BinaryOp::GtEq, right)
    }

    /// Creates an addition.
    #[must_use]
    pub fn plus(self, right: impl IntoExpr) -> Self {
        self.binary(BinaryOp::Add, right)
    }

    /// Creates a subtraction.
    #[must_use]
    pub fn minus(self, right: impl IntoExpr) -> Self {
        self.binary(BinaryOp::Sub, right)
    }

    /// Creates a LIKE expression.
    #[must_use]
    pub fn like(self, pattern: impl IntoExpr) -> Self {
        self.binary(BinaryOp::Like, pattern)
    }

    /// Creates a NOT LIKE expression.
    #[must_use]
    pub fn not_like(self, pattern: impl IntoExpr) -> Self {
        self.binary(BinaryOp::NotLike, pattern)
    }

    /// Creates an AND expression.
    #[must_use]
    pub fn and(self, right: Self) -> Self {
        self.binary(BinaryOp::And, right)
    }

    /// Creates an OR expression.
    #[must_use]
    pub fn or(self, right: Self) -> Self {
        self.binary(BinaryOp::Or, right)
    }

    /// Negates the expression with NOT.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::Unary {
            op: UnaryOp::Not,
            operand: Box::new(self),
        }
    }

    /// Wraps the expression in parentheses.
    #[must_use]
    pub fn paren(self) -> Self {
        Self::Paren(Box::new(self))
    }

    /// Creates an IS NULL expression.
    #[must_use]
    pub fn is_null(self) -> Self {
        Self::IsNull {
            expr: Box::new(self),
            negated: false,
        }
    }

    /// Creates an IS NOT NULL expression.
    #[must_use]
    pub fn is_not_null(self) -> Self {
        Self::IsNull {
            expr: Box::new(self),
            negated: true,
        }
    }

    /// Creates a BETWEEN expression.
    #[must_use]
    pub fn between(self, low: impl IntoExpr, high: impl IntoExpr) -> Self {
        Self::Between {
            expr: Box::new(self),
            low: Box::new(low.into_expr()),
            high: Box::new(high.into_expr()),
            negated: false,
        }
    }

    /// Creates a NOT BETWEEN expression.
    #[must_use]
    pub fn not_between(self, low: impl IntoExpr, high: impl IntoExpr) -> Self {
        Self::Between {
            expr: Box::new(self),
            low: Box::new(low.into_expr()),
            high: Box::new(high.into_expr()),
            negated: true,
        }
    }

    /// Creates an IN expression over values.
    #[must_use]
    pub fn in_list<T: IntoExpr>(self, values: Vec<T>) -> Self {
        Self::InList {
            expr: Box::new(self),
            list: values.into_iter().map(IntoExpr::into_expr).collect(),
            negated: false,
        }
    }

    /// Creates a NOT IN expression over values.
    #[must_use]
    pub fn not_in_list<T: IntoExpr>(self, values: Vec<T>) -> Self {
        Self::InList {
            expr: Box::new(self),
            list: values.into_iter().map(IntoExpr::into_expr).collect(),
            negated: true,
        }
    }

    /// Creates an IN expression over a sub-query.
    #[must_use]
    pub fn in_query(self, query: SubQueryStmt) -> Self {
        Self::InQuery {
            expr: Box::new(self),
            query,
            negated: false,
        }
    }

    /// Creates a NOT IN expression over a sub-query.
    #[must_use]
    pub fn not_in_query(self, query: SubQueryStmt) -> Self {
        Self::InQuery {
            expr: Box::new(self),
            query,
            negated: true,
        }
    }

    /// Names the expression in a SELECT list.
    #[must_use]
    pub fn as_(self, alias: &str) -> Selection {
        Selection::Expr {
            expr: self,
            alias: Some(String::from(alias)),
        }
    }

    /// Orders ascending.
    #[must_use]
    pub const fn asc(self) -> OrderItem {
        OrderItem {
            expr: self,
            direction: Some(OrderDirection::Asc),
        }
    }

    /// Orders descending.
    #[must_use]
    pub const fn desc(self) -> OrderItem {
        OrderItem {
            expr: self,
            direction: Some(OrderDirection::Desc),
        }
    }

    /// Returns the name this expression exposes when selected without an
    /// alias.
    #[must_use]
    pub fn output_name(&self) -> Option<&str> {
        match self {
            Self::Field { name, .. } | Self::Column(name) => Some(name),
            _ => None,
        }
    }
}
