//! Clause layout shared by every renderer.

use super::{DialectRenderer, LiteralMode};
use crate::error::Result;
use crate::expr::{BinaryOp, Expr, UnaryOp};
use crate::meta::SqlType;
use crate::stmt::{
    BracketQuery, DeleteStatement, OrderItem, RowSet, SelectQuery, Selection, Statement,
    StatementKind, TableBlock, TableItem, Tail, UnionQuery, UnionType, UpdateStatement,
    ValuesQuery, Window, WithClause,
};
use crate::value::SqlValue;

// Precedence levels, doubled from `BinaryOp::precedence` so that NOT can
// sit between AND and the comparisons.
const NOT: u8 = 5;
const COMPARISON: u8 = 6;
const PREFIX: u8 = 16;
const ATOM: u8 = 20;

fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Binary { op, .. } => op.precedence() * 2,
        Expr::Unary { op: UnaryOp::Not, .. } => NOT,
        Expr::Unary { .. } => PREFIX,
        Expr::IsNull { .. } | Expr::InList { .. } | Expr::InQuery { .. } | Expr::Between { .. } => {
            COMPARISON
        }
        _ => ATOM,
    }
}

const fn is_associative(op: BinaryOp) -> bool {
    matches!(
        op,
        BinaryOp::And
            | BinaryOp::Or
            | BinaryOp::Add
            | BinaryOp::Mul
            | BinaryOp::BitAnd
            | BinaryOp::BitOr
    )
}

const fn is_intersect(op: UnionType) -> bool {
    matches!(
        op,
        UnionType::Intersect | UnionType::IntersectAll | UnionType::IntersectDistinct
    )
}

/// Accumulates SQL text and bind parameters for one statement.
pub(crate) struct SqlWriter<'r, R: ?Sized> {
    renderer: &'r R,
    out: String,
    params: Vec<SqlValue>,
}

impl<'r, R: DialectRenderer + ?Sized> SqlWriter<'r, R> {
    pub(crate) fn new(renderer: &'r R) -> Self {
        Self {
            renderer,
            out: String::with_capacity(128),
            params: vec![],
        }
    }

    pub(crate) fn finish(self) -> (String, Vec<SqlValue>) {
        (self.out, self.params)
    }

    fn push(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn ident(&mut self, name: &str) {
        self.renderer.identifier(name, &mut self.out);
    }

    fn list<T>(
        &mut self,
        items: &[T],
        separator: &str,
        mut each: impl FnMut(&mut Self, &T) -> Result<()>,
    ) -> Result<()> {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.push(separator);
            }
            each(self, item)?;
        }
        Ok(())
    }

    fn idents(&mut self, names: &[String]) {
        for (i, name) in names.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.ident(name);
        }
    }

    pub(crate) fn statement(&mut self, statement: &Statement) -> Result<()> {
        match statement {
            Statement::Query(row_set) => self.row_set(row_set),
            Statement::Delete(delete) => self.delete(delete),
            Statement::Update(update) => self.update(update),
        }
    }

    fn row_set(&mut self, row_set: &RowSet) -> Result<()> {
        match row_set {
            RowSet::Select(q) => self.select(q),
            RowSet::Values(q) => self.values(q),
            RowSet::Bracket(q) => self.bracket(q),
            RowSet::Union(q) => self.union(q),
        }
    }

    fn parenthesized(&mut self, row_set: &RowSet) -> Result<()> {
        self.push("(");
        self.row_set(row_set)?;
        self.push(")");
        Ok(())
    }

    fn with(&mut self, with: &WithClause) -> Result<()> {
        if with.is_empty() {
            return Ok(());
        }
        self.push(if with.recursive { "WITH RECURSIVE " } else { "WITH " });
        self.list(&with.ctes, ", ", |w, cte| {
            w.ident(&cte.name);
            if !cte.columns.is_empty() {
                w.push(" (");
                w.idents(&cte.columns);
                w.push(")");
            }
            w.push(" AS ");
            w.parenthesized(&cte.query)
        })?;
        self.push(" ");
        Ok(())
    }

    fn select(&mut self, q: &SelectQuery) -> Result<()> {
        self.with(&q.with)?;
        self.push(if q.distinct { "SELECT DISTINCT " } else { "SELECT " });
        self.list(&q.selections, ", ", Self::selection)?;
        self.push(" FROM ");
        self.sources(&q.sources)?;
        self.predicates(" WHERE ", &q.where_clause)?;
        if !q.group_by.is_empty() {
            self.push(" GROUP BY ");
            self.list(&q.group_by, ", ", |w, e| w.expr(e))?;
            if q.group_rollup {
                self.push(" WITH ROLLUP");
            }
        }
        self.predicates(" HAVING ", &q.having)?;
        if !q.windows.is_empty() {
            self.push(" WINDOW ");
            self.list(&q.windows, ", ", Self::window)?;
        }
        self.tail(&q.tail)
    }

    fn selection(&mut self, selection: &Selection) -> Result<()> {
        match selection {
            Selection::Expr { expr, alias } => {
                self.expr(expr)?;
                if let Some(alias) = alias {
                    self.push(" AS ");
                    self.ident(alias);
                }
            }
            Selection::All => self.push("*"),
            Selection::AllOf(alias) => {
                self.ident(alias);
                self.push(".*");
            }
        }
        Ok(())
    }

    fn window(&mut self, window: &Window) -> Result<()> {
        self.ident(&window.name);
        self.push(" AS (");
        let mut gap = false;
        if let Some(reference) = &window.reference {
            self.ident(reference);
            gap = true;
        }
        if !window.partition_by.is_empty() {
            self.push(if gap { " PARTITION BY " } else { "PARTITION BY " });
            self.list(&window.partition_by, ", ", |w, e| w.expr(e))?;
            gap = true;
        }
        if !window.order_by.is_empty() {
            self.push(if gap { " ORDER BY " } else { "ORDER BY " });
            self.list(&window.order_by, ", ", Self::order_item)?;
        }
        self.push(")");
        Ok(())
    }

    fn order_item(&mut self, item: &OrderItem) -> Result<()> {
        self.expr(&item.expr)?;
        if let Some(direction) = item.direction {
            self.push(" ");
            self.push(direction.as_str());
        }
        Ok(())
    }

    fn order_by(&mut self, items: &[OrderItem]) -> Result<()> {
        if !items.is_empty() {
            self.push(" ORDER BY ");
            self.list(items, ", ", Self::order_item)?;
        }
        Ok(())
    }

    fn tail(&mut self, tail: &Tail) -> Result<()> {
        self.order_by(&tail.order_by)?;
        if tail.order_rollup {
            self.push(" WITH ROLLUP");
        }
        self.renderer
            .append_limit(tail.row_count, tail.offset, &mut self.out);
        self.renderer.append_lock(&tail.lock, &mut self.out);
        Ok(())
    }

    fn predicates(&mut self, keyword: &str, predicates: &[Expr]) -> Result<()> {
        if predicates.is_empty() {
            return Ok(());
        }
        self.push(keyword);
        self.conjunction(predicates)
    }

    fn conjunction(&mut self, predicates: &[Expr]) -> Result<()> {
        let min = if predicates.len() > 1 {
            BinaryOp::And.precedence() * 2
        } else {
            0
        };
        self.list(predicates, " AND ", |w, e| w.operand(e, min))
    }

    fn sources(&mut self, sources: &[TableBlock]) -> Result<()> {
        for block in sources {
            if let Some(join) = block.join {
                self.push(" ");
                self.push(join.as_str());
                self.push(" ");
            }
            self.table_block(block)?;
            if !block.on.is_empty() {
                self.push(" ON ");
                self.conjunction(&block.on)?;
            }
        }
        Ok(())
    }

    fn table_block(&mut self, block: &TableBlock) -> Result<()> {
        match &block.item {
            TableItem::Table(table) => {
                if let Some(schema) = table.schema() {
                    self.ident(schema);
                    self.push(".");
                }
                self.ident(table.name());
                self.partitions(&block.partitions);
                if block.alias != table.name() {
                    self.push(" AS ");
                    self.ident(&block.alias);
                }
            }
            TableItem::Derived(query) => {
                if query.is_lateral() {
                    self.push("LATERAL ");
                }
                self.parenthesized(query.row_set())?;
                self.push(" AS ");
                self.ident(&block.alias);
            }
            TableItem::Cte(name) => {
                self.ident(name);
                if &block.alias != name {
                    self.push(" AS ");
                    self.ident(&block.alias);
                }
            }
        }
        for hint in &block.index_hints {
            self.push(" ");
            self.push(hint.kind.as_str());
            if let Some(purpose) = hint.purpose {
                self.push(" ");
                self.push(purpose.as_str());
            }
            self.push(" (");
            self.idents(&hint.indexes);
            self.push(")");
        }
        Ok(())
    }

    fn partitions(&mut self, partitions: &[String]) {
        if !partitions.is_empty() {
            self.push(" PARTITION (");
            self.idents(partitions);
            self.push(")");
        }
    }

    fn values(&mut self, q: &ValuesQuery) -> Result<()> {
        self.push("VALUES ");
        self.list(&q.rows, ", ", |w, row| {
            w.push("ROW(");
            w.list(row, ", ", |w, e| w.expr(e))?;
            w.push(")");
            Ok(())
        })?;
        self.tail(&q.tail)
    }

    fn bracket(&mut self, q: &BracketQuery) -> Result<()> {
        self.parenthesized(&q.inner)?;
        self.tail(&q.tail)
    }

    fn union(&mut self, q: &UnionQuery) -> Result<()> {
        // Chains are left-deep; only a left UNION or EXCEPT under an
        // INTERSECT needs parentheses, since INTERSECT binds tighter.
        // A bracket with its own tail is wrapped once more so the tail stays
        // bound to it.
        match &q.left {
            RowSet::Union(left) if is_intersect(q.operator) && !is_intersect(left.operator) => {
                self.parenthesized(&q.left)?;
            }
            RowSet::Bracket(b) if !b.tail.is_empty() => self.parenthesized(&q.left)?,
            left => self.row_set(left)?,
        }
        self.push(" ");
        self.push(q.operator.as_str());
        self.push(" ");
        match &q.right {
            RowSet::Union(_) => self.parenthesized(&q.right)?,
            RowSet::Bracket(b) if !b.tail.is_empty() => self.parenthesized(&q.right)?,
            right => self.row_set(right)?,
        }
        self.tail(&q.tail)
    }

    fn delete(&mut self, d: &DeleteStatement) -> Result<()> {
        self.with(&d.with)?;
        if d.kind == StatementKind::MultiDelete {
            self.push("DELETE ");
            self.idents(&d.targets);
            self.push(" FROM ");
            self.sources(&d.sources)?;
        } else if let Some(block) = d.sources.first() {
            // Single-table form: alias precedes PARTITION here.
            self.push("DELETE FROM ");
            if let TableItem::Table(table) = &block.item {
                if let Some(schema) = table.schema() {
                    self.ident(schema);
                    self.push(".");
                }
                self.ident(table.name());
                if block.alias != table.name() {
                    self.push(" AS ");
                    self.ident(&block.alias);
                }
            }
            self.partitions(&block.partitions);
        }
        self.predicates(" WHERE ", &d.where_clause)?;
        self.order_by(&d.order_by)?;
        self.renderer.append_limit(d.row_count, None, &mut self.out);
        Ok(())
    }

    fn update(&mut self, u: &UpdateStatement) -> Result<()> {
        self.with(&u.with)?;
        self.push("UPDATE ");
        self.sources(&u.sources)?;
        self.push(" SET ");
        self.list(&u.assignments, ", ", |w, a| {
            w.expr(&a.field)?;
            w.push(" = ");
            w.operand(&a.value, BinaryOp::Eq.precedence() * 2 + 1)
        })?;
        self.predicates(" WHERE ", &u.where_clause)?;
        self.order_by(&u.order_by)?;
        self.renderer.append_limit(u.row_count, None, &mut self.out);
        Ok(())
    }

    fn value(&mut self, value: &SqlValue, sql_type: Option<SqlType>, inline: bool) -> Result<()> {
        if inline || self.renderer.literal_mode() == LiteralMode::Inline {
            return self.renderer.append_literal(sql_type, value, &mut self.out);
        }
        self.params.push(value.clone());
        self.renderer.placeholder(self.params.len(), &mut self.out);
        Ok(())
    }

    /// Writes `expr`, parenthesized when it binds looser than `min`.
    fn operand(&mut self, expr: &Expr, min: u8) -> Result<()> {
        if precedence(expr) < min {
            self.push("(");
            self.expr(expr)?;
            self.push(")");
            Ok(())
        } else {
            self.expr(expr)
        }
    }

    fn expr(&mut self, expr: &Expr) -> Result<()> {
        match expr {
            Expr::Field { alias, name } => {
                self.ident(alias);
                self.push(".");
                self.ident(name);
            }
            Expr::Column(name) => self.ident(name),
            Expr::Param { value, sql_type } => self.value(value, *sql_type, false)?,
            Expr::Literal { value, sql_type } => self.value(value, *sql_type, true)?,
            Expr::Binary { left, op, right } => {
                let level = op.precedence() * 2;
                self.operand(left, level)?;
                self.push(" ");
                self.push(op.as_str());
                self.push(" ");
                let same_op = matches!(&**right, Expr::Binary { op: r, .. } if r == op);
                let right_min = if is_associative(*op) && same_op {
                    level
                } else {
                    level + 1
                };
                self.operand(right, right_min)?;
            }
            Expr::Unary { op, operand } => {
                self.push(op.as_str());
                if *op == UnaryOp::Not {
                    self.push(" ");
                    let min = if matches!(**operand, Expr::Binary { .. }) {
                        ATOM
                    } else {
                        COMPARISON
                    };
                    self.operand(operand, min)?;
                } else {
                    self.operand(operand, PREFIX)?;
                }
            }
            Expr::IsNull { expr, negated } => {
                self.operand(expr, COMPARISON + 1)?;
                self.push(if *negated { " IS NOT NULL" } else { " IS NULL" });
            }
            Expr::InList {
                expr,
                list,
                negated,
            } => {
                self.operand(expr, COMPARISON + 1)?;
                self.push(if *negated { " NOT IN (" } else { " IN (" });
                self.list(list, ", ", |w, e| w.expr(e))?;
                self.push(")");
            }
            Expr::InQuery {
                expr,
                query,
                negated,
            } => {
                self.operand(expr, COMPARISON + 1)?;
                self.push(if *negated { " NOT IN " } else { " IN " });
                self.parenthesized(query.row_set())?;
            }
            Expr::Between {
                expr,
                low,
                high,
                negated,
            } => {
                self.operand(expr, COMPARISON + 1)?;
                self.push(if *negated { " NOT BETWEEN " } else { " BETWEEN " });
                self.operand(low, COMPARISON + 1)?;
                self.push(" AND ");
                self.operand(high, COMPARISON + 1)?;
            }
            Expr::Exists { query, negated } => {
                self.push(if *negated { "NOT EXISTS " } else { "EXISTS " });
                self.parenthesized(query.row_set())?;
            }
            Expr::Function(call) => {
                self.push(&call.name);
                self.push(if call.distinct { "(DISTINCT " } else { "(" });
                self.list(&call.args, ", ", |w, e| w.expr(e))?;
                self.push(")");
            }
            Expr::Scalar(query) => self.parenthesized(query.row_set())?,
            Expr::Paren(inner) => {
                self.push("(");
                self.expr(inner)?;
                self.push(")");
            }
            Expr::Wildcard => self.push("*"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;
    use crate::expr::{col, field, literal};
    use crate::render::GenericRenderer;

    fn render(expr: &Expr) -> (String, Vec<SqlValue>) {
        let renderer = GenericRenderer::new(Dialect::MySQL80);
        let mut writer = SqlWriter::new(&renderer);
        writer.expr(expr).unwrap();
        writer.finish()
    }

    #[test]
    fn test_or_inside_and_is_parenthesized() {
        let expr = field("a", "x").eq(1).or(field("a", "y").eq(2)).and(col("z").is_null());
        let (sql, params) = render(&expr);
        assert_eq!(sql, r#"("a"."x" = ? OR "a"."y" = ?) AND "z" IS NULL"#);
        assert_eq!(params, vec![SqlValue::Int(1), SqlValue::Int(2)]);
    }

    #[test]
    fn test_not_wraps_comparison() {
        let (sql, _) = render(&field("a", "x").eq(literal(1)).not());
        assert_eq!(sql, r#"NOT ("a"."x" = 1)"#);
    }

    #[test]
    fn test_right_nested_subtraction() {
        let expr = col("a").minus(col("b").minus(col("c")));
        let (sql, _) = render(&expr);
        assert_eq!(sql, r#""a" - ("b" - "c")"#);
    }
}
