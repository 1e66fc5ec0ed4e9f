//! Tests for MySQL rendering of set operations and brackets.

mod common;

use common::*;
use oxide_criteria_core::{
    col, field, CriteriaError, Dialect, Select, SelectStmt, TableMeta, UnionType, Values,
};
use oxide_criteria_mysql::{MySqlError, MySqlRenderer};

fn ids(dialect: Dialect, table: &TableMeta, alias: &str) -> SelectStmt {
    Select::new(dialect)
        .select([field(alias, "id")])
        .unwrap()
        .from(table, alias)
        .unwrap()
        .build()
        .unwrap()
}

#[test]
fn test_union_all_with_order_and_paged_limit() {
    let users = users();
    let orders = orders();
    let a = ids(Dialect::MySQL57, &users, "u");
    let b = ids(Dialect::MySQL57, &orders, "o");
    let stmt = a
        .union_all(&b)
        .unwrap()
        .order_by([col("id")])
        .unwrap()
        .limit(10)
        .unwrap()
        .offset(30)
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(
        mysql57(stmt).0,
        "SELECT `u`.`id` FROM `users` AS `u` UNION ALL SELECT `o`.`id` FROM `orders` AS `o` ORDER BY `id` LIMIT 30, 10"
    );
}

#[test]
fn test_bracketed_operand_with_limit() {
    let users = users();
    let orders = orders();
    let newest = Select::new(Dialect::MySQL57)
        .select([field("u", "id")])
        .unwrap()
        .from(&users, "u")
        .unwrap()
        .order_by([field("u", "id").desc()])
        .unwrap()
        .limit(3)
        .unwrap()
        .build()
        .unwrap();
    let newest = newest.bracket().unwrap().build().unwrap();
    let rest = ids(Dialect::MySQL57, &orders, "o");

    let stmt = newest.union(&rest).unwrap().build().unwrap();
    assert_eq!(
        mysql57(stmt).0,
        "(SELECT `u`.`id` FROM `users` AS `u` ORDER BY `u`.`id` DESC LIMIT 3) UNION SELECT `o`.`id` FROM `orders` AS `o`"
    );
}

#[test]
fn test_intersect_and_except_on_mysql80() {
    let users = users();
    let orders = orders();
    let a = ids(Dialect::MySQL80, &users, "u");
    let b = ids(Dialect::MySQL80, &orders, "o");

    let both = a.intersect(&b).unwrap().build().unwrap();
    assert_eq!(
        mysql80(both).0,
        "SELECT `u`.`id` FROM `users` AS `u` INTERSECT SELECT `o`.`id` FROM `orders` AS `o`"
    );

    let only = a.except_all(&b).unwrap().build().unwrap();
    assert_eq!(
        mysql80(only).0,
        "SELECT `u`.`id` FROM `users` AS `u` EXCEPT ALL SELECT `o`.`id` FROM `orders` AS `o`"
    );
}

#[test]
fn test_mysql57_builders_reject_intersect() {
    let users = users();
    let a = ids(Dialect::MySQL57, &users, "a");
    let b = ids(Dialect::MySQL57, &users, "b");
    assert!(matches!(
        a.intersect(&b),
        Err(CriteriaError::UnsupportedOperator {
            dialect: Dialect::MySQL57,
            operator: UnionType::Intersect,
        })
    ));
}

#[test]
fn test_mysql57_renderer_rejects_an_mysql80_union() {
    let users = users();
    let a = ids(Dialect::MySQL80, &users, "a");
    let b = ids(Dialect::MySQL80, &users, "b");
    let stmt = a.except(&b).unwrap().build().unwrap();
    assert!(matches!(
        MySqlRenderer::new(Dialect::MySQL57).to_sql(stmt),
        Err(MySqlError::Criteria(CriteriaError::Dialect { .. }))
    ));
}

#[test]
fn test_values_operand_on_mysql80() {
    let users = users();
    let a = ids(Dialect::MySQL80, &users, "u");
    let extra = Values::new(Dialect::MySQL80)
        .row([0])
        .unwrap()
        .build()
        .unwrap();
    let (sql, params) = mysql80(a.union_all(&extra).unwrap().build().unwrap());
    assert_eq!(
        sql,
        "SELECT `u`.`id` FROM `users` AS `u` UNION ALL VALUES ROW(?)"
    );
    assert_eq!(params.len(), 1);
}
