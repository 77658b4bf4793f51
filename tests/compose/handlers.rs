use lattice::handler::{FieldHandler, resolve};
use lattice::prelude::*;

use crate::common::list_sql;

fn field(logical_type: LogicalType) -> Column {
    Column::new("c", "Field", "field", logical_type)
}

fn handler(logical_type: LogicalType) -> &'static dyn FieldHandler {
    resolve(logical_type, Dialect::SQLite).expect("handler registered")
}

fn parse(logical_type: LogicalType, input: impl Into<Value>) -> lattice::Result<Value> {
    handler(logical_type).parse_user_input(input.into(), &field(logical_type))
}

#[test]
fn numeric_input_parsing_is_idempotent() {
    let cases: Vec<(LogicalType, Value)> = vec![
        (LogicalType::Number, "42".into()),
        (LogicalType::Number, 7.0.into()),
        (LogicalType::Decimal, "3.25".into()),
        (LogicalType::Currency, "$1,234.50".into()),
        (LogicalType::Percent, "33%".into()),
        (LogicalType::Rating, 4.into()),
        (LogicalType::Rating, 0.into()),
        (LogicalType::Duration, "00:02:33.000".into()),
        (LogicalType::Duration, 90.into()),
        (LogicalType::Year, "1999".into()),
    ];

    for dialect in Dialect::ALL {
        for (logical_type, input) in &cases {
            let handler = resolve(*logical_type, dialect).unwrap();
            let column = field(*logical_type);
            let once = handler.parse_user_input(input.clone(), &column).unwrap();
            let twice = handler.parse_user_input(once.clone(), &column).unwrap();
            assert_eq!(once, twice, "{logical_type} on {dialect} with {input:?}");
        }
    }
}

#[test]
fn number_rejects_fractions() {
    assert_eq!(parse(LogicalType::Number, "42").unwrap(), Value::Integer(42));
    assert_eq!(parse(LogicalType::Number, "").unwrap(), Value::Null);
    assert!(matches!(
        parse(LogicalType::Number, 7.5),
        Err(LatticeError::InvalidValueForField { .. })
    ));
}

#[test]
fn year_is_four_digits() {
    assert_eq!(parse(LogicalType::Year, "1999").unwrap(), Value::Integer(1999));
    for input in ["999", "10000"] {
        let err = parse(LogicalType::Year, input).unwrap_err();
        assert!(
            matches!(err, LatticeError::InvalidValueForField { ref field, .. } if field == "Field"),
            "{input}: {err}"
        );
    }
}

#[test]
fn duration_reads_clock_text_as_seconds() {
    assert_eq!(
        parse(LogicalType::Duration, "00:02:33.000").unwrap(),
        Value::Integer(153)
    );
    assert_eq!(parse(LogicalType::Duration, 90).unwrap(), Value::Integer(90));
    assert!(parse(LogicalType::Duration, -5).is_err());
    assert!(parse(LogicalType::Duration, "-00:01:00").is_err());
}

#[test]
fn rating_is_bounded() {
    assert_eq!(parse(LogicalType::Rating, 5).unwrap(), Value::Integer(5));
    assert_eq!(parse(LogicalType::Rating, 0).unwrap(), Value::Null);
    assert!(parse(LogicalType::Rating, 6).is_err());
}

fn rated() -> Schema {
    Schema::new().with_model(
        Model::new("m", "M", "m")
            .column(Column::new("id", "Id", "id", LogicalType::Id).primary_key())
            .column(Column::new("r", "Rating", "rating", LogicalType::Rating)),
    )
}

fn rating_sql(op: FilterOp, k: i64) -> String {
    let args = ListArgs::default().filter(Filter::leaf("Rating", op, k));
    list_sql(&rated(), Dialect::SQLite, "m", &args)
}

#[test]
fn rating_filters_treat_null_as_zero() {
    let or_null = |op: &str| format!(r#"("a0"."rating" {op} ? OR "a0"."rating" IS NULL)"#);

    assert!(rating_sql(FilterOp::Lt, 3).contains(&or_null("<")));
    assert!(rating_sql(FilterOp::Lte, 0).contains(&or_null("<=")));
    assert!(rating_sql(FilterOp::Lte, 2).contains(&or_null("<=")));
    assert!(rating_sql(FilterOp::Gte, 0).contains(&or_null(">=")));
    assert!(rating_sql(FilterOp::Eq, 0).contains(&or_null("=")));
}

#[test]
fn rating_filters_above_zero_exclude_null() {
    for (op, k) in [(FilterOp::Gt, 2), (FilterOp::Gte, 1), (FilterOp::Eq, 3), (FilterOp::Lt, 0)] {
        let sql = rating_sql(op, k);
        assert!(!sql.contains("IS NULL"), "{op:?} {k}: {sql}");
    }
}

#[test]
fn rating_rejects_out_of_range_filter_values() {
    let args = ListArgs::default().filter(Filter::leaf("Rating", FilterOp::Gt, 9));
    let schema = rated();
    let err = Composer::new(&schema, Dialect::SQLite)
        .compose_list("m", None, &args)
        .unwrap_err();
    assert!(err.is_validation(), "{err}");
}
