use super::{TypeFamily, coerce_with, compare};
use crate::{
    dialect::DialectAdapter,
    error::{LatticeError, Result},
    filter::FilterOp,
    schema::Column,
    sql::SQL,
    value::Value,
};

/// Fallback for key columns and types without special semantics
pub struct Generic;

impl TypeFamily for Generic {
    const NAME: &'static str = "generic";
    const OPS: &'static [FilterOp] = &[
        FilterOp::Eq,
        FilterOp::Neq,
        FilterOp::Like,
        FilterOp::NotLike,
        FilterOp::Blank,
        FilterOp::NotBlank,
        FilterOp::Is,
        FilterOp::IsNot,
        FilterOp::Gt,
        FilterOp::Lt,
        FilterOp::Gte,
        FilterOp::Lte,
        FilterOp::In,
    ];

    fn parse_input(value: Value, column: &Column, _adapter: &dyn DialectAdapter) -> Result<Value> {
        match value {
            Value::List(_) | Value::Json(_) => Err(LatticeError::invalid_value(
                &column.title,
                "expected a scalar value",
            )),
            other => Ok(other),
        }
    }
}

pub(crate) const TEXT_OPS: &[FilterOp] = &[
    FilterOp::Eq,
    FilterOp::Neq,
    FilterOp::Like,
    FilterOp::NotLike,
    FilterOp::Blank,
    FilterOp::NotBlank,
    FilterOp::Is,
    FilterOp::IsNot,
    FilterOp::In,
];

/// Text, long text, email, phone, URL and single-select columns
pub struct Text;

impl TypeFamily for Text {
    const NAME: &'static str = "text";
    const OPS: &'static [FilterOp] = TEXT_OPS;
    const TEXTUAL: bool = true;

    fn parse_input(value: Value, column: &Column, _adapter: &dyn DialectAdapter) -> Result<Value> {
        match value {
            Value::Null | Value::Text(_) => Ok(value),
            Value::Integer(_) | Value::Real(_) | Value::Bool(_) => Ok(Value::Text(value.to_string())),
            Value::Json(serde_json::Value::String(s)) => Ok(Value::Text(s)),
            _ => Err(LatticeError::invalid_value(&column.title, "expected text")),
        }
    }
}

/// Multi-select columns store their options comma-separated.
pub struct MultiSelect;

impl TypeFamily for MultiSelect {
    const NAME: &'static str = "multi-select";
    const OPS: &'static [FilterOp] = TEXT_OPS;
    const TEXTUAL: bool = true;

    fn parse_input(value: Value, column: &Column, _adapter: &dyn DialectAdapter) -> Result<Value> {
        let options: Vec<String> = match value {
            Value::Null => return Ok(Value::Null),
            Value::Text(text) => text.split(',').map(|s| s.trim().to_string()).collect(),
            Value::List(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Text(text) => Ok(text.trim().to_string()),
                    other => Err(LatticeError::invalid_value(
                        &column.title,
                        format!("option {other} is not text"),
                    )),
                })
                .collect::<Result<_>>()?,
            other => {
                return Err(LatticeError::invalid_value(
                    &column.title,
                    format!("{other} is not a list of options"),
                ));
            }
        };

        let options: Vec<String> = options.into_iter().filter(|o| !o.is_empty()).collect();
        if options.is_empty() {
            return Ok(Value::Null);
        }
        Ok(Value::Text(options.join(",")))
    }

    fn coerce_filter_value(
        op: FilterOp,
        value: &Value,
        column: &Column,
        adapter: &dyn DialectAdapter,
    ) -> Result<Value> {
        match op {
            // `in` matches rows holding any of the options
            FilterOp::In => coerce_with(op, value, column, |v| Text::parse_input(v, column, adapter)),
            _ => coerce_with(op, value, column, |v| Self::parse_input(v, column, adapter)),
        }
    }

    fn filter_override(
        expr: &SQL,
        op: FilterOp,
        value: &Value,
        adapter: &dyn DialectAdapter,
    ) -> Option<SQL> {
        let FilterOp::In = op else { return None };
        let Value::List(options) = value else { return None };
        if options.is_empty() {
            return None;
        }

        // ',a,b,' LIKE '%,a,%'
        let padded = adapter
            .concat(vec![SQL::raw("','"), expr.clone(), SQL::raw("','")])
            .parens();
        let any = options.iter().filter_map(Value::as_str).map(|option| {
            adapter.like(padded.clone(), SQL::param(format!("%,{option},%")), false)
        });
        Some(SQL::join(any, " OR ").parens())
    }
}

/// Boolean columns
pub struct Checkbox;

impl TypeFamily for Checkbox {
    const NAME: &'static str = "checkbox";
    const OPS: &'static [FilterOp] = &[
        FilterOp::Eq,
        FilterOp::Neq,
        FilterOp::Checked,
        FilterOp::NotChecked,
        FilterOp::Blank,
        FilterOp::NotBlank,
    ];

    fn parse_input(value: Value, column: &Column, _adapter: &dyn DialectAdapter) -> Result<Value> {
        let checked = match &value {
            Value::Null => return Ok(Value::Null),
            Value::Bool(b) => *b,
            Value::Integer(i) => *i != 0,
            Value::Real(f) => *f != 0.0,
            Value::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
                "" => return Ok(Value::Null),
                "true" | "1" | "yes" | "checked" => true,
                "false" | "0" | "no" | "unchecked" => false,
                _ => {
                    return Err(LatticeError::invalid_value(
                        &column.title,
                        format!("'{text}' is not a boolean"),
                    ));
                }
            },
            other => {
                return Err(LatticeError::invalid_value(
                    &column.title,
                    format!("{other} is not a boolean"),
                ));
            }
        };
        Ok(Value::Bool(checked))
    }

    /// `eq false` also matches unset rows
    fn filter_override(
        expr: &SQL,
        op: FilterOp,
        value: &Value,
        adapter: &dyn DialectAdapter,
    ) -> Option<SQL> {
        let condition = |op| compare::comparison(expr.clone(), op, Value::Null, false, adapter);
        match (op, value) {
            (FilterOp::Eq, Value::Bool(true)) | (FilterOp::Neq, Value::Bool(false)) => {
                Some(condition(FilterOp::Checked))
            }
            (FilterOp::Eq, Value::Bool(false)) | (FilterOp::Neq, Value::Bool(true)) => {
                Some(condition(FilterOp::NotChecked))
            }
            _ => None,
        }
    }

    /// Integer 0/1 from backends without a boolean type
    fn parse_db_value(value: serde_json::Value, _column: &Column) -> serde_json::Value {
        match value {
            serde_json::Value::Number(n) => serde_json::Value::Bool(n.as_f64() != Some(0.0)),
            serde_json::Value::String(s) => match s.as_str() {
                "1" | "true" | "t" => serde_json::Value::Bool(true),
                "0" | "false" | "f" => serde_json::Value::Bool(false),
                _ => serde_json::Value::String(s),
            },
            other => other,
        }
    }
}
