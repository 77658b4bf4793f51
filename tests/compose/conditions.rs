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

fn ids(page: &PagedResponse) -> Vec<i64> {
    page.list
        .iter()
        .map(|row| row["Id"].as_i64().unwrap())
        .collect()
}

#[test]
fn view_filter_and_request_filter_are_combined() {
    let args = ListArgs::default().filter(Filter::leaf("Name", FilterOp::Like, "e"));
    let page = service().list("city", Some("big_cities"), args).unwrap();
    assert_eq!(ids(&page), [3, 4]);
    assert_eq!(page.page_info.total_rows, 2);
}

#[test]
fn request_sorts_replace_view_sorts() {
    let args = ListArgs::default().sort(Sort::asc("Name"));
    let page = service().list("city", Some("big_cities"), args).unwrap();
    assert_eq!(ids(&page), [4, 3, 2]);
}

#[test]
fn where_is_anded_with_filter() {
    let args = ListArgs {
        r#where: Some(Filter::leaf("Population", FilterOp::Lt, 150_000)),
        ..ListArgs::default().filter(Filter::leaf("Country Id", FilterOp::Eq, 1))
    };
    let page = service().list("city", None, args).unwrap();
    assert_eq!(ids(&page), [1, 5]);
}

#[test]
fn groups_keep_their_logic() {
    let args = ListArgs::default().filter(Filter::or([
        Filter::leaf("Name", FilterOp::Eq, "Bern"),
        Filter::and([
            Filter::leaf("Population", FilterOp::Gt, 400_000),
            Filter::leaf("Name", FilterOp::NotBlank, Value::Null),
        ]),
    ]));
    let page = service().list("city", None, args).unwrap();
    assert_eq!(ids(&page), [1, 2]);
}

#[test]
fn request_arguments_deserialize() {
    let args: ListArgs = serde_json::from_value(json!({
        "filter": {
            "logical": "and",
            "children": [
                { "column": "Population", "op": "gte", "value": 130000 },
                { "column": "Name", "op": "nlike", "value": "a" }
            ]
        },
        "sorts": [{ "column": "Population", "direction": "desc" }],
        "limit": 2
    }))
    .unwrap();

    let page = service().list("city", None, args).unwrap();
    // Geneva, Basel, Lausanne and Reykjavik contain an "a"
    assert_eq!(ids(&page), [2, 1]);
    assert_eq!(page.page_info.total_rows, 2);
    assert!(page.page_info.is_first_page);
    assert!(page.page_info.is_last_page);

    let envelope = serde_json::to_value(&page).unwrap();
    assert_eq!(envelope["pageInfo"]["count"], 2);
    assert_eq!(envelope["pageInfo"]["limit"], 2);
    assert_eq!(envelope["pageInfo"]["offset"], 0);
}

#[test]
fn rating_filters_count_unrated_as_zero() {
    let service = service();
    let rated = |op, k: i64| {
        let args = ListArgs::default().filter(Filter::leaf("Rating", op, k));
        ids(&service.list("film", None, args).unwrap())
    };

    assert_eq!(rated(FilterOp::Lt, 4), [1, 2]);
    assert_eq!(rated(FilterOp::Gte, 4), [3]);
    assert_eq!(rated(FilterOp::Eq, 0), [2]);
    assert_eq!(rated(FilterOp::Gte, 0), [1, 2, 3]);
}

#[test]
fn verification_collects_every_problem() {
    let service = service();
    let args = ListArgs::default().filter(Filter::and([
        Filter::leaf("Nope", FilterOp::Eq, 1),
        Filter::leaf("Population", FilterOp::Like, "x"),
        Filter::leaf("Name", FilterOp::Eq, "Bern"),
    ]));

    let err = service.list("city", None, args).unwrap_err();
    let LatticeError::FilterVerification(errors) = &err else {
        panic!("expected aggregated errors, got {err}");
    };
    assert_eq!(errors.len(), 2);
    assert!(matches!(errors[0], LatticeError::UnknownColumn(_)));
    assert!(matches!(
        errors[1],
        LatticeError::UnsupportedFilterOperation { op: "like", .. }
    ));
    assert!(err.is_validation());
    assert_eq!(service.compositions(), 0);
}

#[test]
fn single_problem_is_returned_as_is() {
    let args = ListArgs::default().filter(Filter::leaf("Population", FilterOp::Eq, "many"));
    let err = service().list("city", None, args).unwrap_err();
    assert!(
        matches!(err, LatticeError::InvalidValueForField { ref field, .. } if field == "Population"),
        "{err}"
    );
}

#[test]
fn view_filters_are_verified_too() {
    let schema = world().with_view(
        View::new("broken", "city")
            .filter(Filter::leaf("Population", FilterOp::Checked, Value::Null)),
    );
    let args = ListArgs::default();
    let err = Composer::new(&schema, Dialect::SQLite)
        .compose_list("city", Some("broken"), &args)
        .unwrap_err();
    assert!(matches!(err, LatticeError::UnsupportedFilterOperation { .. }), "{err}");
}

#[test]
fn unknown_views_are_rejected() {
    let service = service();
    for (model, view) in [("city", "nope"), ("country", "big_cities")] {
        let err = service.list(model, Some(view), ListArgs::default()).unwrap_err();
        assert!(matches!(err, LatticeError::UnknownView(ref id) if id == view), "{err}");
    }
}
