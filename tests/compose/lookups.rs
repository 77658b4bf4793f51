use lattice::prelude::*;

use crate::common::{SqliteExecutor, column_expr, cyclic, world};

fn service() -> DataService<SqliteExecutor> {
    DataService::new(
        world(),
        LatticeConfig::for_dialect(Dialect::SQLite),
        SqliteExecutor::seeded(),
    )
}

fn names(rows: &[Row], column: &str) -> Vec<String> {
    rows.iter()
        .map(|row| row[column].as_str().unwrap_or_default().to_string())
        .collect()
}

#[test]
fn three_hop_lookup_reaches_the_country() {
    let page = service().list("customer", None, ListArgs::default()).unwrap();
    assert_eq!(names(&page.list, "Name"), ["Anna", "Jon"]);
    assert_eq!(names(&page.list, "Country"), ["Switzerland", "Iceland"]);
}

#[test]
fn three_hop_lookup_nests_one_subquery_per_hop() {
    let expr = column_expr(&world(), Dialect::SQLite, "customer", "Country");
    assert_eq!(
        expr.sql(),
        concat!(
            r#"(SELECT (SELECT (SELECT "a3"."name" FROM "country" AS "a3" WHERE "a3"."id" = "a2"."country_id")"#,
            r#" FROM "city" AS "a2" WHERE "a2"."id" = "a1"."city_id")"#,
            r#" FROM "address" AS "a1" WHERE "a1"."id" = "a0"."address_id")"#,
        )
    );
}

#[test]
fn lookups_filter_through_every_hop() {
    let args = ListArgs::default().filter(Filter::leaf("Country", FilterOp::Eq, "Iceland"));
    let page = service().list("customer", None, args).unwrap();
    assert_eq!(names(&page.list, "Name"), ["Jon"]);
    assert_eq!(page.page_info.total_rows, 1);

    let args = ListArgs::default().filter(Filter::leaf("Country", FilterOp::Neq, "Iceland"));
    let page = service().list("customer", None, args).unwrap();
    assert_eq!(names(&page.list, "Name"), ["Anna"]);
}

#[test]
fn lookups_sort_by_the_looked_up_value() {
    let args = ListArgs::default().sort(Sort::asc("Country"));
    let page = service().list("customer", None, args).unwrap();
    assert_eq!(names(&page.list, "Name"), ["Jon", "Anna"]);
}

#[test]
fn many_valued_lookup_collects_an_array() {
    let page = service().list("country", None, ListArgs::default()).unwrap();

    let mut swiss: Vec<&str> = page.list[0]["City Names"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|v| v.as_str())
        .collect();
    swiss.sort_unstable();
    assert_eq!(swiss, ["Basel", "Bern", "Geneva", "Lausanne", "Zurich"]);
    assert_eq!(page.list[1]["City Names"], serde_json::json!(["Reykjavik"]));
    assert_eq!(page.list[2]["City Names"], serde_json::json!([]));
}

#[test]
fn many_valued_lookup_matches_any_element() {
    let args = ListArgs::default().filter(Filter::leaf("City Names", FilterOp::Like, "vik"));
    let page = service().list("country", None, args).unwrap();
    assert_eq!(names(&page.list, "Name"), ["Iceland"]);

    let args = ListArgs::default().filter(Filter::leaf("City Names", FilterOp::Blank, Value::Null));
    let page = service().list("country", None, args).unwrap();
    assert_eq!(names(&page.list, "Name"), ["Atlantis"]);
}

#[test]
fn lookup_cycles_fail_composition() {
    let schema = cyclic();
    let err = Composer::new(&schema, Dialect::SQLite)
        .compose_list("a", None, &ListArgs::default())
        .unwrap_err();
    let LatticeError::LookupCycle { path } = err else {
        panic!("expected a lookup cycle, got {err}");
    };
    assert_eq!(path.first(), path.last());
    assert!(path.len() > 2, "{path:?}");
}

#[test]
fn lookup_cycles_fail_filter_verification() {
    let schema = cyclic();
    let args = ListArgs::default()
        .fields(["Id"])
        .filter(Filter::leaf("B Lookup", FilterOp::Eq, 1));
    let err = Composer::new(&schema, Dialect::SQLite)
        .compose_list("a", None, &args)
        .unwrap_err();
    assert!(
        matches!(err, LatticeError::LookupCycle { .. } | LatticeError::UnsupportedFilterOperation { .. }),
        "{err}"
    );
}
