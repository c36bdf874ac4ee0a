use pretty_assertions::assert_eq;
use test_case::test_case;

use super::super::executor::{Engine, QueryResult};
use super::super::ErrorCode;
use crate::catalog::Value;

/// Run statements that must all succeed
fn setup(engine: &mut Engine, sql: &str) {
    engine
        .execute(sql)
        .unwrap_or_else(|err| panic!("setup failed for {}: {}", sql, err));
}

fn error_code(engine: &mut Engine, sql: &str) -> u16 {
    engine
        .execute(sql)
        .expect_err(&format!("expected {} to fail", sql))
        .code()
        .value()
}

fn select(engine: &mut Engine, sql: &str) -> Vec<Vec<Value>> {
    match engine.execute(sql).unwrap().pop() {
        Some(QueryResult::Rows { rows, .. }) => rows,
        other => panic!("expected rows, got {:?}", other),
    }
}

fn engine_with_table() -> Engine {
    let mut engine = Engine::new();
    setup(&mut engine, "CREATE DATABASE db1");
    setup(&mut engine, "USE db1");
    setup(&mut engine, "CREATE TABLE t(a varchar, b varchar)");
    engine
}

#[test]
fn test_insert_then_select_in_order() {
    let mut engine = engine_with_table();
    setup(&mut engine, "INSERT INTO t(a,b) VALUES('1', 'v1'),('2','v2')");

    assert_eq!(
        select(&mut engine, "SELECT * FROM t"),
        vec![
            vec![Value::from("1"), Value::from("v1")],
            vec![Value::from("2"), Value::from("v2")],
        ]
    );
}

#[test]
fn test_select_reports_columns() {
    let mut engine = engine_with_table();
    let results = engine.execute("SELECT * FROM db1.t").unwrap();

    assert_eq!(
        results,
        vec![QueryResult::Rows {
            columns: vec!["a".to_string(), "b".to_string()],
            rows: vec![],
        }]
    );
}

#[test]
fn test_insert_column_list_is_reordered() {
    let mut engine = engine_with_table();
    setup(&mut engine, "INSERT INTO t(b) VALUES('only_b')");
    setup(&mut engine, "INSERT INTO t(b, a) VALUES('second', 'first')");

    assert_eq!(
        select(&mut engine, "SELECT * FROM t"),
        vec![
            vec![Value::Null, Value::from("only_b")],
            vec![Value::from("first"), Value::from("second")],
        ]
    );
}

#[test_case("INSERT INTO t VALUES('1')" ; "too few values")]
#[test_case("INSERT INTO t VALUES('1', '2', '3')" ; "too many values")]
#[test_case("INSERT INTO t(a, c) VALUES('1', '2')" ; "unknown column")]
#[test_case("INSERT INTO t(a, a) VALUES('1', '2')" ; "repeated column")]
fn test_insert_schema_mismatch(sql: &str) {
    let mut engine = engine_with_table();

    assert_eq!(error_code(&mut engine, sql), ErrorCode::SCHEMA_MISMATCH.value());
    assert!(select(&mut engine, "SELECT * FROM t").is_empty());
}

#[test]
fn test_truncate_then_insert() {
    let mut engine = engine_with_table();
    setup(&mut engine, "INSERT INTO t VALUES('1', 'v1'),('2','v2')");
    setup(&mut engine, "TRUNCATE TABLE t");
    assert!(select(&mut engine, "SELECT * FROM t").is_empty());

    setup(&mut engine, "INSERT INTO t VALUES('3', 'v3')");
    assert_eq!(select(&mut engine, "SELECT * FROM t").len(), 1);
}

#[test]
fn test_truncate_dropped_table_is_unknown_table() {
    let mut engine = engine_with_table();
    setup(&mut engine, "DROP TABLE t");

    assert_eq!(error_code(&mut engine, "TRUNCATE TABLE t"), 25);
    assert_eq!(error_code(&mut engine, "TRUNCATE TABLE db1.t"), 25);
}

#[test_case("TRUNCATE TABLE db1.t" ; "truncate")]
#[test_case("SELECT * FROM db1.t" ; "select")]
#[test_case("INSERT INTO db1.t VALUES('1', 'v1')" ; "insert")]
#[test_case("DROP TABLE db1.t" ; "drop table")]
#[test_case("CREATE TABLE db1.t2(a int)" ; "create table")]
#[test_case("TRUNCATE TABLE t" ; "unqualified through dropped selection")]
fn test_dropped_database_is_unknown_database(sql: &str) {
    let mut engine = engine_with_table();
    setup(&mut engine, "DROP DATABASE db1");

    assert_eq!(error_code(&mut engine, sql), 3);
}

#[test]
fn test_truncate_never_creates() {
    let mut engine = Engine::new();

    assert_eq!(error_code(&mut engine, "TRUNCATE TABLE nowhere.t"), 3);
    assert!(engine.catalog().list_databases().is_empty());
}

#[test]
fn test_unqualified_without_database() {
    let mut engine = Engine::new();

    assert_eq!(error_code(&mut engine, "CREATE TABLE t(a int)"), 3);
    assert_eq!(error_code(&mut engine, "SHOW TABLES"), 3);
}

#[test]
fn test_create_twice() {
    let mut engine = engine_with_table();

    assert_eq!(error_code(&mut engine, "CREATE DATABASE db1"), 2301);
    assert_eq!(error_code(&mut engine, "CREATE TABLE t(a varchar)"), 2302);
    setup(&mut engine, "CREATE DATABASE IF NOT EXISTS db1");
    setup(&mut engine, "CREATE TABLE IF NOT EXISTS t(a varchar, b varchar)");

    assert_eq!(
        select(&mut engine, "SHOW TABLES"),
        vec![vec![Value::from("t")]]
    );
}

#[test]
fn test_drop_if_exists_variants() {
    let mut engine = engine_with_table();

    setup(&mut engine, "DROP TABLE IF EXISTS missing");
    setup(&mut engine, "DROP DATABASE IF EXISTS missing");
    assert_eq!(error_code(&mut engine, "DROP TABLE missing"), 25);
    assert_eq!(error_code(&mut engine, "DROP DATABASE missing"), 3);
}

#[test]
fn test_use_unknown_database() {
    let mut engine = Engine::new();
    assert_eq!(error_code(&mut engine, "USE nope"), 3);
    assert_eq!(engine.session().current_database(), None);
}

#[test]
fn test_syntax_and_unsupported_codes() {
    let mut engine = engine_with_table();

    assert_eq!(error_code(&mut engine, "CREATE TABEL t(a int)"), 5);
    assert_eq!(error_code(&mut engine, "UPDATE t SET a = '1'"), 2);
}

#[test]
fn test_default_database_is_selected() {
    let mut engine = Engine::new().with_default_database("default").unwrap();
    setup(&mut engine, "CREATE TABLE t(a int)");

    assert_eq!(
        select(&mut engine, "SHOW DATABASES"),
        vec![vec![Value::from("default")]]
    );
    assert!(engine.catalog().table("default", "t").is_ok());
}

#[test]
fn test_failure_stops_multi_statement_batch() {
    let mut engine = engine_with_table();

    let err = engine
        .execute("INSERT INTO t VALUES('1', 'v1'); TRUNCATE TABLE missing; INSERT INTO t VALUES('2', 'v2')")
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::UNKNOWN_TABLE);
    assert_eq!(select(&mut engine, "SELECT * FROM t").len(), 1);
}

#[test_case("SELECT * FROM t LIMIT 1" ; "limit")]
#[test_case("SELECT * FROM t ORDER BY a" ; "order by")]
#[test_case("SELECT DISTINCT * FROM t" ; "distinct")]
fn test_shaped_select_is_rejected(sql: &str) {
    let mut engine = engine_with_table();
    setup(&mut engine, "INSERT INTO t VALUES('1', 'v1'),('2','v2')");

    assert_eq!(error_code(&mut engine, sql), ErrorCode::UNIMPLEMENTED.value());
}

#[test]
fn test_show_tables_from_other_database() {
    let mut engine = engine_with_table();
    setup(&mut engine, "CREATE DATABASE db2");
    setup(&mut engine, "CREATE TABLE db2.u(a int)");
    setup(&mut engine, "CREATE TABLE db2.v(a int)");

    assert_eq!(
        select(&mut engine, "SHOW TABLES FROM db2"),
        vec![vec![Value::from("u")], vec![Value::from("v")]]
    );
    assert_eq!(
        select(&mut engine, "SHOW TABLES"),
        vec![vec![Value::from("t")]]
    );
    assert_eq!(error_code(&mut engine, "SHOW TABLES FROM missing"), 3);
    assert_eq!(error_code(&mut engine, "SHOW TABLES LIKE 't%'"), 2);
}
