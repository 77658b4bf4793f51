use lattice::cache::{CacheKey, StatementKind};
use lattice::prelude::*;

use crate::common::{SqliteExecutor, world};

fn service_with(config: LatticeConfig) -> DataService<SqliteExecutor> {
    DataService::new(world(), config, SqliteExecutor::seeded())
}

fn service() -> DataService<SqliteExecutor> {
    service_with(LatticeConfig::for_dialect(Dialect::SQLite))
}

#[test]
fn page_bounds_reuse_the_cached_statement() {
    let service = service();

    for offset in 0..3 {
        let page = service
            .list("country", None, ListArgs::default().limit(1).offset(offset))
            .unwrap();
        assert_eq!(page.list.len(), 1);
        assert_eq!(page.list[0]["Id"], offset + 1);
        assert_eq!(page.page_info.page, offset + 1);
    }

    assert_eq!(service.compositions(), 1);
    assert_eq!(service.cache().len(), 2);
    assert!(
        service
            .cache()
            .get(&CacheKey::new("country", None, StatementKind::Count))
            .is_some()
    );
}

#[test]
fn ad_hoc_filters_always_recompose() {
    let service = service();
    let args = || ListArgs::default().filter(Filter::leaf("Name", FilterOp::Like, "land"));

    let first = service.list("country", None, args()).unwrap();
    let second = service.list("country", None, args()).unwrap();
    assert_eq!(first.list, second.list);
    assert_eq!(first.page_info.total_rows, 2);

    assert_eq!(service.compositions(), 2);
    assert!(service.cache().is_empty());
}

#[test]
fn views_are_cached_apart_from_the_model() {
    let service = service();

    let all = service.list("city", None, ListArgs::default()).unwrap();
    let big = service.list("city", Some("big_cities"), ListArgs::default()).unwrap();
    service.list("city", Some("big_cities"), ListArgs::default()).unwrap();

    assert_eq!(all.page_info.total_rows, 7);
    assert_eq!(big.page_info.total_rows, 3);
    assert_eq!(service.compositions(), 2);
    assert_eq!(service.cache().len(), 4);

    let names: Vec<_> = big.list.iter().map(|row| row["Name"].clone()).collect();
    assert_eq!(names, ["Zurich", "Geneva", "Basel"]);
    assert_eq!(big.list[0].len(), 3, "view shows Id, Name and Population");
}

#[test]
fn reads_are_cached_by_model() {
    let service = service();
    for id in 1..=3 {
        assert!(service.read("film", None, &[Value::Integer(id)]).unwrap().is_some());
    }
    assert_eq!(service.compositions(), 1);
}

#[test]
fn invalidation_forces_recomposition() {
    let service = service();
    service.list("country", None, ListArgs::default()).unwrap();
    service.list("city", None, ListArgs::default()).unwrap();

    assert_eq!(service.cache().invalidate_model("country"), 2);
    service.list("country", None, ListArgs::default()).unwrap();
    service.list("city", None, ListArgs::default()).unwrap();
    assert_eq!(service.compositions(), 3);
}

#[test]
fn disabled_cache_composes_every_request() {
    let mut config = LatticeConfig::for_dialect(Dialect::SQLite);
    config.cache.enabled = false;
    let service = service_with(config);

    service.list("country", None, ListArgs::default()).unwrap();
    service.list("country", None, ListArgs::default()).unwrap();
    assert_eq!(service.compositions(), 2);
    assert!(service.cache().is_empty());
}

#[test]
fn prepared_list_binds_page_bounds() {
    let service = service();
    let bound = service
        .prepare_list("country", None, ListArgs::default().limit(5000).offset(10))
        .unwrap();

    assert!(bound.sql.contains("LIMIT ? OFFSET ?"), "{}", bound.sql);
    // clamped to pagination.max_limit
    assert_eq!(bound.params, [Value::Integer(1000), Value::Integer(10)]);
}
