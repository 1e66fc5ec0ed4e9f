//! Tests for MySQL DELETE and UPDATE rendering.

mod common;

use common::*;
use oxide_criteria_core::{cte, field, CriteriaError, Delete, Dialect, SqlValue, Update};
use oxide_criteria_mysql::{MySqlError, MySqlRenderer};

#[test]
fn test_single_delete_with_order_and_limit() {
    let users = users();
    let stmt = Delete::single(Dialect::MySQL57)
        .delete_from(&users)
        .unwrap()
        .where_(field("users", "active").eq(false))
        .unwrap()
        .order_by([field("users", "id")])
        .unwrap()
        .limit(500)
        .unwrap()
        .build()
        .unwrap();
    let (sql, params) = mysql57(stmt);
    assert_eq!(
        sql,
        "DELETE FROM `users` WHERE `users`.`active` = ? ORDER BY `users`.`id` LIMIT 500"
    );
    assert_eq!(params, vec![SqlValue::Bool(false)]);
}

#[test]
fn test_aliased_single_delete_on_mysql80() {
    let users = users();
    let stmt = Delete::single(Dialect::MySQL80)
        .delete_from_as(&users, "u")
        .unwrap()
        .where_(field("u", "email").is_null())
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(
        mysql80(stmt).0,
        "DELETE FROM `users` AS `u` WHERE `u`.`email` IS NULL"
    );
}

#[test]
fn test_multi_delete_lists_targets_before_from() {
    let users = users();
    let orders = orders();
    let stmt = Delete::multi(Dialect::MySQL80)
        .delete(&["o", "u"])
        .unwrap()
        .from(&orders, "o")
        .unwrap()
        .left_join(&users, "u")
        .unwrap()
        .on(field("u", "id").eq(field("o", "user_id")))
        .unwrap()
        .where_(field("o", "status").eq("void"))
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(
        mysql80(stmt).0,
        "DELETE `o`, `u` FROM `orders` AS `o` LEFT JOIN `users` AS `u` ON `u`.`id` = `o`.`user_id` WHERE `o`.`status` = ?"
    );
}

#[test]
fn test_single_update_with_limit() {
    let users = users();
    let stmt = Update::single(Dialect::MySQL57)
        .update(&users, "u")
        .unwrap()
        .set(field("u", "active"), false)
        .unwrap()
        .where_(field("u", "email").is_null())
        .unwrap()
        .order_by([field("u", "id")])
        .unwrap()
        .limit(10)
        .unwrap()
        .build()
        .unwrap();
    let (sql, params) = mysql57(stmt);
    assert_eq!(
        sql,
        "UPDATE `users` AS `u` SET `u`.`active` = ? WHERE `u`.`email` IS NULL ORDER BY `u`.`id` LIMIT 10"
    );
    assert_eq!(params, vec![SqlValue::Bool(false)]);
}

#[test]
fn test_update_set_from_another_column() {
    let users = users();
    let orders = orders();
    let stmt = Update::multi(Dialect::MySQL57)
        .update(&orders, "o")
        .unwrap()
        .join(&users, "u")
        .unwrap()
        .on(field("u", "id").eq(field("o", "user_id")))
        .unwrap()
        .set(field("o", "status"), field("u", "name"))
        .unwrap()
        .build()
        .unwrap();
    let (sql, params) = mysql57(stmt);
    assert_eq!(
        sql,
        "UPDATE `orders` AS `o` JOIN `users` AS `u` ON `u`.`id` = `o`.`user_id` SET `o`.`status` = `u`.`name`"
    );
    assert!(params.is_empty());
}

#[test]
fn test_update_joined_with_a_cte_on_mysql80() {
    let users = users();
    let orders = orders();
    let stmt = Update::multi(Dialect::MySQL80)
        .with("paid", |s| {
            s.sub_query()
                .select([field("o", "user_id")])?
                .from(&orders, "o")?
                .where_(field("o", "status").eq("paid"))?
                .build()
        })
        .unwrap()
        .update(&users, "u")
        .unwrap()
        .join(cte("paid"), "p")
        .unwrap()
        .on(field("p", "user_id").eq(field("u", "id")))
        .unwrap()
        .set(field("u", "active"), true)
        .unwrap()
        .build()
        .unwrap();
    let (sql, params) = mysql80(stmt);
    assert_eq!(
        sql,
        "WITH `paid` AS (SELECT `o`.`user_id` FROM `orders` AS `o` WHERE `o`.`status` = ?) UPDATE `users` AS `u` JOIN `paid` AS `p` ON `p`.`user_id` = `u`.`id` SET `u`.`active` = ?"
    );
    assert_eq!(
        params,
        vec![SqlValue::Text("paid".into()), SqlValue::Bool(true)]
    );
}

#[test]
fn test_mysql57_renderer_rejects_mysql80_delete() {
    let users = users();
    let stmt = Delete::single(Dialect::MySQL80)
        .delete_from_as(&users, "u")
        .unwrap()
        .build()
        .unwrap();
    assert!(matches!(
        MySqlRenderer::new(Dialect::MySQL57).to_sql(stmt),
        Err(MySqlError::Criteria(CriteriaError::Dialect { .. }))
    ));
}
