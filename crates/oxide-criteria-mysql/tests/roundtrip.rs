//! Checks that rendered SQL is accepted by an independent MySQL parser.

mod common;

use common::*;
use oxide_criteria_core::stmt::Selection;
use oxide_criteria_core::{
    col, count_star, cte, exists, field, func, CteName, Delete, Dialect, LiteralMode, Select,
    Statement, Update,
};
use oxide_criteria_mysql::{MySqlConfig, MySqlRenderer};
use sqlparser::dialect::MySqlDialect;
use sqlparser::parser::Parser;

fn assert_parses(statement: impl Into<Statement>) {
    let (sql, _) = MySqlRenderer::new(Dialect::MySQL80)
        .to_sql(statement)
        .expect("statement renders");
    let parsed = Parser::parse_sql(&MySqlDialect {}, &sql)
        .unwrap_or_else(|e| panic!("rendered SQL does not parse: {e}\n{sql}"));
    assert_eq!(parsed.len(), 1, "expected one statement in {sql}");
}

#[test]
fn test_select_with_joins_and_predicates_parses() {
    let users = users();
    let orders = orders();
    let stmt = Select::new(Dialect::MySQL80)
        .select_distinct([
            field("u", "name").into(),
            func("SUM", vec![field("o", "total")]).as_("spent"),
        ])
        .unwrap()
        .from(&users, "u")
        .unwrap()
        .left_join(&orders, "o")
        .unwrap()
        .on(field("o", "user_id").eq(field("u", "id")))
        .unwrap()
        .where_(field("u", "name").like("a%").or(field("u", "email").is_null()))
        .unwrap()
        .and(field("o", "total").between(10, 20))
        .unwrap()
        .and(field("o", "status").in_list(vec!["paid", "sent"]))
        .unwrap()
        .group_by([field("u", "name")])
        .unwrap()
        .having(count_star().gt(1))
        .unwrap()
        .order_by([col("spent").desc()])
        .unwrap()
        .limit(10)
        .unwrap()
        .offset(5)
        .unwrap()
        .build()
        .unwrap();
    assert_parses(stmt);
}

#[test]
fn test_sub_queries_parse() {
    let users = users();
    let orders = orders();
    let outer = Select::new(Dialect::MySQL80)
        .select([field("u", "id")])
        .unwrap()
        .from(&users, "u")
        .unwrap();
    let has_orders = outer
        .scope()
        .sub_query()
        .select([field("o", "id")])
        .unwrap()
        .from(&orders, "o")
        .unwrap()
        .where_(field("o", "user_id").eq(field("u", "id")))
        .unwrap()
        .build()
        .unwrap();
    let paid = outer
        .scope()
        .sub_query()
        .select([field("p", "user_id")])
        .unwrap()
        .from(&orders, "p")
        .unwrap()
        .where_(field("p", "status").eq("paid"))
        .unwrap()
        .build()
        .unwrap();
    let stmt = outer
        .where_(exists(has_orders))
        .unwrap()
        .and(field("u", "id").not_in_query(paid))
        .unwrap()
        .for_update()
        .unwrap()
        .build()
        .unwrap();
    assert_parses(stmt);
}

#[test]
fn test_recursive_cte_with_union_parses() {
    let users = users();
    let stmt = Select::new(Dialect::MySQL80)
        .with_recursive(CteName::new("n").columns(&["x"]), |s| {
            let anchor = s
                .sub_query()
                .select([field("u", "id")])?
                .from(&users, "u")?
                .build()?;
            let step = s
                .sub_query()
                .select([field("n", "x").plus(1)])?
                .from(cte("n"), "n")?
                .where_(field("n", "x").lt(10))?
                .build()?;
            anchor.union_all(&step)?.build()
        })
        .unwrap()
        .select([Selection::All])
        .unwrap()
        .from(cte("n"), "n")
        .unwrap()
        .build()
        .unwrap();
    assert_parses(stmt);
}

#[test]
fn test_set_operations_parse() {
    let users = users();
    let orders = orders();
    let a = Select::new(Dialect::MySQL80)
        .select([field("u", "id")])
        .unwrap()
        .from(&users, "u")
        .unwrap()
        .build()
        .unwrap();
    let b = Select::new(Dialect::MySQL80)
        .select([field("o", "user_id")])
        .unwrap()
        .from(&orders, "o")
        .unwrap()
        .build()
        .unwrap();
    let union = a
        .union(&b)
        .unwrap()
        .order_by([col("id")])
        .unwrap()
        .limit(3)
        .unwrap()
        .build()
        .unwrap();
    assert_parses(union);
    assert_parses(a.except(&b).unwrap().build().unwrap());
}

#[test]
fn test_set_operations_with_cte_operands_parse() {
    let users = users();
    let with_c = Select::new(Dialect::MySQL80)
        .with("c", |s| {
            s.sub_query()
                .select([field("x", "id")])?
                .from(&users, "x")?
                .build()
        })
        .unwrap()
        .select([field("c", "id")])
        .unwrap()
        .from(cte("c"), "c")
        .unwrap()
        .build()
        .unwrap();
    let plain = Select::new(Dialect::MySQL80)
        .select([field("u", "id")])
        .unwrap()
        .from(&users, "u")
        .unwrap()
        .build()
        .unwrap();

    assert_parses(with_c.union(&plain).unwrap().build().unwrap());

    assert!(plain.union(&with_c).is_err());
    let wrapped = with_c.bracket().unwrap().build().unwrap();
    assert_parses(plain.union(&wrapped).unwrap().build().unwrap());
}

#[test]
fn test_dml_parses() {
    let users = users();
    let orders = orders();
    let delete = Delete::single(Dialect::MySQL80)
        .delete_from(&users)
        .unwrap()
        .where_(field("users", "active").eq(false))
        .unwrap()
        .build()
        .unwrap();
    assert_parses(delete);

    let delete = Delete::multi(Dialect::MySQL80)
        .delete(&["o"])
        .unwrap()
        .from(&orders, "o")
        .unwrap()
        .join(&users, "u")
        .unwrap()
        .on(field("u", "id").eq(field("o", "user_id")))
        .unwrap()
        .where_(field("u", "active").eq(false))
        .unwrap()
        .build()
        .unwrap();
    assert_parses(delete);

    let update = Update::multi(Dialect::MySQL80)
        .update(&orders, "o")
        .unwrap()
        .join(&users, "u")
        .unwrap()
        .on(field("u", "id").eq(field("o", "user_id")))
        .unwrap()
        .set(field("o", "status"), "void")
        .unwrap()
        .where_(field("u", "active").eq(false))
        .unwrap()
        .build()
        .unwrap();
    assert_parses(update);
}

#[test]
fn test_inline_literals_parse() {
    let users = users();
    let stmt = Select::new(Dialect::MySQL80)
        .select([field("u", "id")])
        .unwrap()
        .from(&users, "u")
        .unwrap()
        .where_(field("u", "name").eq("it's a \\ test"))
        .unwrap()
        .build()
        .unwrap();
    let renderer = MySqlRenderer::with_config(MySqlConfig {
        literal_mode: LiteralMode::Inline,
        ..MySqlConfig::default()
    });
    let (sql, params) = renderer.to_sql(stmt).unwrap();
    assert!(params.is_empty());
    assert!(Parser::parse_sql(&MySqlDialect {}, &sql).is_ok(), "{sql}");
}
