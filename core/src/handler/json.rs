//! JSON columns.
//!
//! Native JSON comparison differs enough between backends that PostgreSQL and
//! MySQL get families of their own. SQLite and SQL Server store JSON as text
//! and share [`Json`].

use super::{TypeFamily, compare, decode_json_text};
use crate::{
    dialect::DialectAdapter,
    error::{LatticeError, Result},
    filter::FilterOp,
    schema::Column,
    sql::SQL,
    value::Value,
};

const JSON_OPS: &[FilterOp] = &[
    FilterOp::Eq,
    FilterOp::Neq,
    FilterOp::Like,
    FilterOp::NotLike,
    FilterOp::Blank,
    FilterOp::NotBlank,
];

/// Normalize any JSON-ish input to compact JSON text.
fn parse_json(value: Value, column: &Column) -> Result<Value> {
    let json = match value {
        Value::Null => return Ok(Value::Null),
        Value::Text(text) if text.trim().is_empty() => return Ok(Value::Null),
        Value::Text(text) => serde_json::from_str::<serde_json::Value>(&text).map_err(|err| {
            LatticeError::invalid_value(&column.title, format!("invalid JSON: {err}"))
        })?,
        other => other.to_json(),
    };
    Ok(Value::Text(json.to_string()))
}

/// Like-style operators compare the textual form of the document
fn text_match(expr: &SQL, op: FilterOp, value: &Value, adapter: &dyn DialectAdapter) -> SQL {
    compare::comparison(adapter.json_text(expr.clone()), op, value.clone(), false, adapter)
}

/// JSON stored as text (SQLite, SQL Server)
pub struct Json;

impl TypeFamily for Json {
    const NAME: &'static str = "json";
    const OPS: &'static [FilterOp] = JSON_OPS;
    const TEXTUAL: bool = true;

    fn parse_input(value: Value, column: &Column, _adapter: &dyn DialectAdapter) -> Result<Value> {
        parse_json(value, column)
    }

    fn parse_db_value(value: serde_json::Value, _column: &Column) -> serde_json::Value {
        decode_json_text(value)
    }
}

/// PostgreSQL `json`/`jsonb` columns compare as `jsonb`, so key order and
/// whitespace do not matter.
pub struct JsonPg;

impl TypeFamily for JsonPg {
    const NAME: &'static str = "json";
    const OPS: &'static [FilterOp] = JSON_OPS;

    fn parse_input(value: Value, column: &Column, _adapter: &dyn DialectAdapter) -> Result<Value> {
        parse_json(value, column)
    }

    fn filter_override(
        expr: &SQL,
        op: FilterOp,
        value: &Value,
        adapter: &dyn DialectAdapter,
    ) -> Option<SQL> {
        let document = || expr.clone().parens().push_raw("::jsonb");
        match op {
            FilterOp::Eq | FilterOp::Neq if value.is_null() => None,
            FilterOp::Eq => Some(
                document()
                    .push_raw(" = ")
                    .append(SQL::param(value.clone()))
                    .push_raw("::jsonb"),
            ),
            FilterOp::Neq => Some(
                document()
                    .push_raw(" <> ")
                    .append(SQL::param(value.clone()))
                    .push_raw("::jsonb OR ")
                    .append(compare::is_null(expr.clone()))
                    .parens(),
            ),
            FilterOp::Like | FilterOp::NotLike => Some(text_match(expr, op, value, adapter)),
            _ => None,
        }
    }

    fn parse_db_value(value: serde_json::Value, _column: &Column) -> serde_json::Value {
        decode_json_text(value)
    }
}

/// MySQL native `JSON` columns
pub struct JsonMySql;

impl TypeFamily for JsonMySql {
    const NAME: &'static str = "json";
    const OPS: &'static [FilterOp] = JSON_OPS;

    fn parse_input(value: Value, column: &Column, _adapter: &dyn DialectAdapter) -> Result<Value> {
        parse_json(value, column)
    }

    fn filter_override(
        expr: &SQL,
        op: FilterOp,
        value: &Value,
        adapter: &dyn DialectAdapter,
    ) -> Option<SQL> {
        let cast = || {
            SQL::raw("CAST(")
                .append(SQL::param(value.clone()))
                .push_raw(" AS JSON)")
        };
        match op {
            FilterOp::Eq | FilterOp::Neq if value.is_null() => None,
            FilterOp::Eq => Some(expr.clone().push_raw(" = ").append(cast())),
            FilterOp::Neq => Some(
                expr.clone()
                    .push_raw(" <> ")
                    .append(cast())
                    .push_raw(" OR ")
                    .append(compare::is_null(expr.clone()))
                    .parens(),
            ),
            FilterOp::Like | FilterOp::NotLike => Some(text_match(expr, op, value, adapter)),
            _ => None,
        }
    }

    fn parse_db_value(value: serde_json::Value, _column: &Column) -> serde_json::Value {
        decode_json_text(value)
    }
}
