//! Date and datetime columns.
//!
//! Input is normalized to UTC before it is bound. Datetimes stored without
//! zone information are converted from the database timezone inside the SQL,
//! so filters and projections both compare UTC values.

use chrono::{DateTime as ChronoDateTime, NaiveDate, NaiveDateTime, Utc};

use super::TypeFamily;
use crate::{
    compose::ComposeCx,
    dialect::DialectAdapter,
    error::{LatticeError, Result},
    filter::FilterOp,
    schema::Column,
    sql::SQL,
    value::Value,
};

const TEMPORAL_OPS: &[FilterOp] = &[
    FilterOp::Eq,
    FilterOp::Neq,
    FilterOp::Gt,
    FilterOp::Lt,
    FilterOp::Gte,
    FilterOp::Lte,
    FilterOp::Blank,
    FilterOp::NotBlank,
    FilterOp::Is,
    FilterOp::IsNot,
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Interpret a datetime string as UTC. Strings without an offset are
/// already UTC; date-only strings are midnight UTC.
fn parse_utc(text: &str) -> Option<ChronoDateTime<Utc>> {
    if let Ok(dt) = ChronoDateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = ChronoDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = ChronoDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f%z") {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn text_input<'v>(value: &'v Value, column: &Column) -> Result<Option<&'v str>> {
    match value {
        Value::Null => Ok(None),
        Value::Text(text) if text.trim().is_empty() => Ok(None),
        Value::Text(text) => Ok(Some(text.trim())),
        other => Err(LatticeError::invalid_value(
            &column.title,
            format!("{other} is not a date"),
        )),
    }
}

/// Date columns, stored as `YYYY-MM-DD`
pub struct Date;

impl TypeFamily for Date {
    const NAME: &'static str = "date";
    const OPS: &'static [FilterOp] = TEMPORAL_OPS;

    fn parse_input(value: Value, column: &Column, _adapter: &dyn DialectAdapter) -> Result<Value> {
        let Some(text) = text_input(&value, column)? else {
            return Ok(Value::Null);
        };
        let date = NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .ok()
            .or_else(|| parse_utc(text).map(|dt| dt.date_naive()))
            .ok_or_else(|| {
                LatticeError::invalid_value(&column.title, format!("'{text}' is not a date"))
            })?;
        Ok(Value::Text(date.format("%Y-%m-%d").to_string()))
    }
}

/// Datetime columns.
///
/// Input is normalized to UTC. Columns stored without zone information are
/// converted from the database timezone to UTC inside the SQL, so filters
/// compare UTC with UTC.
pub struct DateTime;

impl TypeFamily for DateTime {
    const NAME: &'static str = "datetime";
    const OPS: &'static [FilterOp] = TEMPORAL_OPS;

    fn parse_input(value: Value, column: &Column, adapter: &dyn DialectAdapter) -> Result<Value> {
        let Some(text) = text_input(&value, column)? else {
            return Ok(Value::Null);
        };
        let utc = parse_utc(text).ok_or_else(|| {
            LatticeError::invalid_value(&column.title, format!("'{text}' is not a datetime"))
        })?;
        Ok(Value::Text(
            utc.format(adapter.datetime_literal_format()).to_string(),
        ))
    }

    fn select_expr(column: &Column, alias: &str, cx: &ComposeCx<'_>) -> SQL {
        let expr = SQL::qualified(alias, &column.column_name);
        if column.meta.is_dt_with_tz {
            expr
        } else {
            cx.adapter.datetime_to_utc(expr, cx.db_timezone)
        }
    }

    /// Executors hand back naive strings; present them with an explicit
    /// UTC offset.
    fn parse_db_value(value: serde_json::Value, _column: &Column) -> serde_json::Value {
        match value.as_str().and_then(parse_utc) {
            Some(utc) => serde_json::Value::String(utc.format("%Y-%m-%d %H:%M:%S%:z").to_string()),
            None => value,
        }
    }
}
