use lattice::prelude::*;

use crate::common::{SqliteExecutor, list_sql, world};

fn film_args() -> ListArgs {
    ListArgs::default()
        .filter(Filter::leaf("Title", FilterOp::Like, "war"))
        .sort(Sort::desc("Year"))
}

#[test]
fn sqlite_list() {
    let sql = list_sql(&world(), Dialect::SQLite, "film", &film_args());
    assert!(sql.starts_with(r#"SELECT "a0"."id" AS "Id", "a0"."title" AS "Title""#), "{sql}");
    assert!(
        sql.contains(r#"FROM "film" AS "a0" WHERE "a0"."title" LIKE ? ORDER BY "a0"."release_year" DESC, "a0"."id" ASC LIMIT ? OFFSET ?) AS "a0""#),
        "{sql}"
    );
}

#[test]
fn postgres_list() {
    let sql = list_sql(&world(), Dialect::PostgreSQL, "film", &film_args());
    assert!(sql.contains(r#"WHERE "a0"."title" ILIKE $1"#), "{sql}");
    assert!(sql.contains("LIMIT $2 OFFSET $3"), "{sql}");
}

#[test]
fn mysql_list() {
    let sql = list_sql(&world(), Dialect::MySQL, "film", &film_args());
    assert!(sql.contains("FROM `film` AS `a0` WHERE `a0`.`title` LIKE ?"), "{sql}");
    assert!(sql.contains("ORDER BY `a0`.`release_year` DESC, `a0`.`id` ASC LIMIT ? OFFSET ?"), "{sql}");
}

#[test]
fn mssql_list() {
    let sql = list_sql(&world(), Dialect::MSSQL, "film", &film_args());
    assert!(sql.contains(r#"WHERE "a0"."title" LIKE @p1"#), "{sql}");
    assert!(sql.contains("OFFSET @p2 ROWS FETCH NEXT @p3 ROWS ONLY"), "{sql}");
}

#[test]
fn nested_rows_per_dialect() {
    let schema = world();
    let args = ListArgs::default();
    let country = |dialect| list_sql(&schema, dialect, "country", &args);

    let sqlite = country(Dialect::SQLite);
    assert!(sqlite.contains("json_group_array("), "{sqlite}");
    assert!(!sqlite.contains("LATERAL"), "{sqlite}");

    let mysql = country(Dialect::MySQL);
    assert!(mysql.contains("LEFT OUTER JOIN LATERAL"), "{mysql}");
    assert!(mysql.contains("JSON_ARRAYAGG("), "{mysql}");

    let mssql = country(Dialect::MSSQL);
    assert!(mssql.contains(" OUTER APPLY ("), "{mssql}");
    assert!(mssql.contains("JSON_OBJECT('Id': "), "{mssql}");
}

#[test]
fn count_statement_shares_the_conditions() {
    let schema = world();
    let args = film_args();
    let composed = Composer::new(&schema, Dialect::PostgreSQL)
        .compose_list("film", None, &args)
        .unwrap();
    assert_eq!(
        composed.count.sql(),
        r#"SELECT COUNT(*) AS "count" FROM "film" AS "a0" WHERE "a0"."title" ILIKE $1"#
    );
    assert_eq!(composed.count.bind([]).unwrap(), [Value::from("%war%")]);
}

#[test]
fn nested_arrays_are_ordered_inside_the_aggregate() {
    let schema = world();
    let args = ListArgs::default();
    let country = |dialect| list_sql(&schema, dialect, "country", &args);

    let postgres = country(Dialect::PostgreSQL);
    assert!(
        postgres.contains(r#" ORDER BY "a1"."id" ASC), '[]'::json)"#),
        "{postgres}"
    );

    let mssql = country(Dialect::MSSQL);
    assert!(mssql.contains(r#" ORDER BY "a1"."id" ASC), JSON_ARRAY())"#), "{mssql}");

    let mysql = country(Dialect::MySQL);
    assert!(
        mysql.contains(
            "OVER (ORDER BY `a1`.`id` ASC ROWS BETWEEN UNBOUNDED PRECEDING AND UNBOUNDED FOLLOWING)"
        ),
        "{mysql}"
    );
    assert!(mysql.contains("LIMIT 1), JSON_ARRAY()) AS `v`"), "{mysql}");
}

fn events() -> Schema {
    Schema::new().with_model(
        Model::new("event", "Event", "event")
            .column(Column::new("event_id", "Id", "id", LogicalType::Id).primary_key())
            .column(Column::new("event_at", "At", "at", LogicalType::DateTime)),
    )
}

#[test]
fn sqlite_converts_fixed_offsets_in_sql() {
    let conn = ::rusqlite::Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE event (id INTEGER PRIMARY KEY, at TEXT);
         INSERT INTO event (id, at) VALUES (1, '2024-03-01 10:00:00');",
    )
    .unwrap();
    let mut config = LatticeConfig::for_dialect(Dialect::SQLite);
    config.db_timezone = "+05:30".into();
    let service = DataService::new(events(), config, SqliteExecutor::new(conn));

    let page = service.list("event", None, ListArgs::default()).unwrap();
    assert_eq!(page.list[0]["At"], "2024-03-01 04:30:00+00:00");
}

#[test]
fn sqlite_rejects_named_timezones() {
    let schema = events();
    let args = ListArgs::default();
    let err = Composer::new(&schema, Dialect::SQLite)
        .db_timezone("Asia/Kolkata")
        .compose_list("event", None, &args)
        .err()
        .unwrap();
    assert!(matches!(err, LatticeError::UnsupportedTimezone { .. }), "{err}");

    let postgres = Composer::new(&schema, Dialect::PostgreSQL)
        .db_timezone("Asia/Kolkata")
        .compose_list("event", None, &args)
        .unwrap();
    assert!(
        postgres.list.sql().contains("AT TIME ZONE 'Asia/Kolkata'"),
        "{}",
        postgres.list.sql()
    );
}
