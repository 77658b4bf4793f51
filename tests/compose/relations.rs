use lattice::compose::Fields;
use lattice::prelude::*;
use serde_json::json;

use crate::common::{SqliteExecutor, world};

fn service() -> DataService<SqliteExecutor> {
    DataService::new(
        world(),
        LatticeConfig::for_dialect(Dialect::SQLite),
        SqliteExecutor::seeded(),
    )
}

fn ids(rows: &serde_json::Value) -> Vec<i64> {
    rows.as_array()
        .expect("nested rows are an array")
        .iter()
        .map(|row| row["Id"].as_i64().unwrap())
        .collect()
}

#[test]
fn has_many_nests_primary_key_and_value() {
    let page = service().list("country", None, ListArgs::default()).unwrap();
    assert_eq!(page.page_info.total_rows, 3);

    let swiss = &page.list[0];
    assert_eq!(swiss["Name"], "Switzerland");
    assert_eq!(
        swiss["Cities"],
        json!([
            { "Id": 1, "Name": "Bern" },
            { "Id": 2, "Name": "Zurich" },
            { "Id": 3, "Name": "Geneva" },
            { "Id": 4, "Name": "Basel" },
            { "Id": 5, "Name": "Lausanne" }
        ])
    );
    assert_eq!(swiss["City Count"], 5);
    assert_eq!(swiss["Population"], 1_070_000);
}

#[test]
fn empty_relations_are_empty_not_null() {
    let page = service().list("country", None, ListArgs::default()).unwrap();
    let atlantis = &page.list[2];
    assert_eq!(atlantis["Name"], "Atlantis");
    assert_eq!(atlantis["Cities"], json!([]));
    assert_eq!(atlantis["City Count"], 0);
    assert_eq!(atlantis["Population"], serde_json::Value::Null);
}

#[test]
fn missing_belongs_to_is_null() {
    let page = service()
        .list("city", None, ListArgs::default().limit(10))
        .unwrap();
    assert_eq!(page.list.len(), 7);

    let bern = &page.list[0];
    assert_eq!(bern["Country"], json!({ "Id": 1, "Name": "Switzerland" }));

    let nowhere = page
        .list
        .iter()
        .find(|row| row["Name"] == "Nowhere")
        .expect("city without a country is listed");
    assert!(nowhere["Country"].is_null());
    assert!(nowhere["Country Name"].is_null());
}

#[test]
fn nested_pages_are_disjoint_and_gapless() {
    let service = service();
    let page_of = |offset: u64| {
        let args = ListArgs::default()
            .filter(Filter::leaf("Name", FilterOp::Eq, "Switzerland"))
            .nested("Cities", NestedArgs::new().limit(2).offset(offset));
        let page = service.list("country", None, args).unwrap();
        assert_eq!(page.list.len(), 1);
        ids(&page.list[0]["Cities"])
    };

    let pages = [page_of(0), page_of(2), page_of(4)];
    assert_eq!(pages, [vec![1, 2], vec![3, 4], vec![5]]);
    assert!(page_of(6).is_empty());
}

#[test]
fn nested_rows_take_filters_and_sorts() {
    let args = ListArgs::default()
        .filter(Filter::leaf("Name", FilterOp::Eq, "Switzerland"))
        .nested(
            "Cities",
            NestedArgs::new()
                .filter(Filter::leaf("Population", FilterOp::Gt, 170_000))
                .sort(Sort::desc("Population")),
        );
    let page = service().list("country", None, args).unwrap();
    assert_eq!(ids(&page.list[0]["Cities"]), [2, 3, 4]);
}

#[test]
fn nested_limit_defaults_to_config() {
    let mut config = LatticeConfig::for_dialect(Dialect::SQLite);
    config.nested.limit = 3;
    let service = DataService::new(world(), config, SqliteExecutor::seeded());
    let page = service.list("country", None, ListArgs::default()).unwrap();
    assert_eq!(ids(&page.list[0]["Cities"]), [1, 2, 3]);
    // links count every related row, not the nested page
    assert_eq!(page.list[0]["City Count"], 5);
}

#[test]
fn many_to_many_goes_through_the_junction() {
    let page = service()
        .list(
            "actor",
            None,
            ListArgs::default().nested("Films", NestedArgs::new().fields(Fields::All)),
        )
        .unwrap();

    let penelope = &page.list[0];
    assert_eq!(penelope["Name"], "Penelope");
    assert_eq!(ids(&penelope["Films"]), [1, 2]);
    assert_eq!(penelope["Films"][0]["Title"], "Academy Dinosaur");
    assert_eq!(penelope["Films"][0]["Year"], 2006);
    assert!(penelope["Films"][1]["Rating"].is_null());

    let nick = &page.list[1];
    assert_eq!(ids(&nick["Films"]), [1]);
}

#[test]
fn nested_field_selection() {
    let args = ListArgs::default()
        .fields(["Name", "Cities"])
        .nested("Cities", NestedArgs::new().fields(Fields::only(["Population"])).limit(1));
    let page = service().list("country", None, args).unwrap();

    let swiss = &page.list[0];
    assert_eq!(swiss["Cities"], json!([{ "Id": 1, "Population": 133000 }]));
    assert!(swiss.get("City Count").is_none());
}

#[test]
fn read_by_primary_key() {
    let service = service();
    let city = service
        .read("city", None, &[Value::Integer(6)])
        .unwrap()
        .expect("Reykjavik exists");
    assert_eq!(city["Name"], "Reykjavik");
    assert_eq!(city["Country"], json!({ "Id": 2, "Name": "Iceland" }));
    assert_eq!(city["Country Name"], "Iceland");

    assert!(service.read("city", None, &[Value::Integer(99)]).unwrap().is_none());
}

#[test]
fn postgres_nests_through_lateral_joins() {
    let schema = world();
    let composed = Composer::new(&schema, Dialect::PostgreSQL)
        .compose_list("country", None, &ListArgs::default())
        .unwrap();
    let sql = composed.list.sql();

    assert!(sql.contains("LEFT OUTER JOIN LATERAL (SELECT COALESCE(json_agg("), "{sql}");
    assert!(sql.contains("json_build_object('Id', "), "{sql}");
    assert!(sql.contains(" ON true"), "{sql}");
    assert_eq!(
        composed.list.placeholder_names().collect::<Vec<_>>(),
        ["__limit", "__offset"]
    );
}
