//! The numeric family.
//!
//! `Decimal` is the root; `Number`, `Currency`, `Percent`, `Rating`,
//! `Duration` and `Year` each delegate to it (directly or through `Number`)
//! and add one rule of their own. The family is dialect-independent.

use super::{TypeFamily, coerce_with, compare};
use crate::{
    dialect::DialectAdapter,
    error::{LatticeError, Result},
    filter::FilterOp,
    schema::{Column, DurationFormat},
    sql::SQL,
    value::Value,
};

pub(crate) const NUMERIC_OPS: &[FilterOp] = &[
    FilterOp::Eq,
    FilterOp::Neq,
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

/// Generic numeric coercion: numbers and numeric strings become reals, the
/// empty string becomes NULL, everything else is rejected.
pub(crate) fn decimal_root(value: Value, column: &Column) -> Result<Value> {
    let number = match value {
        Value::Null => return Ok(Value::Null),
        Value::Integer(i) => i as f64,
        Value::Real(f) => f,
        Value::Text(ref text) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(Value::Null);
            }
            text.parse::<f64>().map_err(|_| {
                LatticeError::invalid_value(&column.title, format!("'{text}' is not a number"))
            })?
        }
        Value::Json(serde_json::Value::Number(ref n)) => n.as_f64().unwrap_or(f64::NAN),
        other => {
            return Err(LatticeError::invalid_value(
                &column.title,
                format!("{other} is not a number"),
            ));
        }
    };

    if !number.is_finite() {
        return Err(LatticeError::invalid_value(&column.title, "not a finite number"));
    }
    Ok(Value::Real(number))
}

/// Decimal root plus an integer-only check.
pub(crate) fn number_root(value: Value, column: &Column) -> Result<Value> {
    if let Value::Integer(i) = value {
        return Ok(Value::Integer(i));
    }
    if let Some(i) = value.as_str().and_then(|s| s.trim().parse::<i64>().ok()) {
        return Ok(Value::Integer(i));
    }

    // integers beyond 2^53 cannot round-trip through f64
    const MAX_SAFE: f64 = 9_007_199_254_740_991.0;
    match decimal_root(value, column)? {
        Value::Real(f) if f.fract() == 0.0 && f.abs() <= MAX_SAFE => Ok(Value::Integer(f as i64)),
        Value::Real(f) => Err(LatticeError::invalid_value(
            &column.title,
            format!("{f} is not an integer"),
        )),
        other => Ok(other),
    }
}

fn round_to(value: f64, digits: u32) -> f64 {
    let factor = 10f64.powi(digits as i32);
    (value * factor).round() / factor
}

/// Decimal columns, rounded to the configured precision
pub struct Decimal;

impl TypeFamily for Decimal {
    const NAME: &'static str = "decimal";
    const OPS: &'static [FilterOp] = NUMERIC_OPS;

    fn parse_input(value: Value, column: &Column, _adapter: &dyn DialectAdapter) -> Result<Value> {
        match (decimal_root(value, column)?, column.meta.precision) {
            (Value::Real(f), Some(precision)) => Ok(Value::Real(round_to(f, precision))),
            (other, _) => Ok(other),
        }
    }
}

/// Integer columns
pub struct Number;

impl TypeFamily for Number {
    const NAME: &'static str = "number";
    const OPS: &'static [FilterOp] = NUMERIC_OPS;

    fn parse_input(value: Value, column: &Column, _adapter: &dyn DialectAdapter) -> Result<Value> {
        number_root(value, column)
    }
}

/// Currency columns accept locale-formatted amounts such as `"$1,234.50"`
/// or `"1.234,50 €"`.
pub struct Currency;

impl TypeFamily for Currency {
    const NAME: &'static str = "currency";
    const OPS: &'static [FilterOp] = NUMERIC_OPS;

    fn parse_input(value: Value, column: &Column, _adapter: &dyn DialectAdapter) -> Result<Value> {
        let Some(text) = value.as_str() else {
            return decimal_root(value, column);
        };
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        let locale = column.meta.currency_locale.as_deref().unwrap_or("en-US");
        parse_currency(text, locale)
            .map(Value::Real)
            .ok_or_else(|| {
                LatticeError::invalid_value(
                    &column.title,
                    format!("'{text}' is not a valid amount for locale {locale}"),
                )
            })
    }
}

/// `(group separators, decimal separator)` used by a locale
fn separators(locale: &str) -> (&'static [char], char) {
    const SPACES: &[char] = &[' ', '\u{a0}', '\u{202f}'];
    let language = locale.split(['-', '_']).next().unwrap_or(locale);

    if locale.eq_ignore_ascii_case("de-CH") || locale.eq_ignore_ascii_case("it-CH") {
        return (&['\'', '\u{2019}', ' ', '\u{a0}', '\u{202f}'], '.');
    }
    match language {
        "de" | "es" | "it" | "pt" | "nl" | "id" | "da" | "tr" => {
            (&['.', ' ', '\u{a0}', '\u{202f}'], ',')
        }
        "fr" | "ru" | "sv" | "nb" | "no" | "pl" | "cs" | "fi" | "uk" => (SPACES, ','),
        _ => (&[',', ' ', '\u{a0}', '\u{202f}'], '.'),
    }
}

fn parse_currency(text: &str, locale: &str) -> Option<f64> {
    let mut text = text.trim();
    let mut negative = false;

    if let Some(inner) = text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        negative = true;
        text = inner.trim();
    }
    if let Some(rest) = text.strip_prefix('-') {
        negative = !negative;
        text = rest;
    }
    // currency symbols and codes around the amount
    text = text.trim_start_matches(|c: char| !c.is_ascii_digit() && c != '-');
    if let Some(rest) = text.strip_prefix('-') {
        negative = !negative;
        text = rest;
    }
    text = text.trim_end_matches(|c: char| !c.is_ascii_digit());

    let (groups, decimal) = separators(locale);
    let mut normalized = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_ascii_digit() {
            normalized.push(ch);
        } else if ch == decimal {
            normalized.push('.');
        } else if !groups.contains(&ch) {
            return None;
        }
    }
    if normalized.is_empty() {
        return None;
    }

    let amount: f64 = normalized.parse().ok()?;
    Some(if negative { -amount } else { amount })
}

/// Percent columns accept an optional trailing `%`
pub struct Percent;

impl TypeFamily for Percent {
    const NAME: &'static str = "percent";
    const OPS: &'static [FilterOp] = NUMERIC_OPS;

    fn parse_input(value: Value, column: &Column, _adapter: &dyn DialectAdapter) -> Result<Value> {
        match value {
            Value::Text(text) => {
                let trimmed = text.trim();
                let stripped = trimmed.strip_suffix('%').unwrap_or(trimmed);
                decimal_root(Value::Text(stripped.to_string()), column)
            }
            other => decimal_root(other, column),
        }
    }
}

/// Rating columns: integers in `0..=max`, where 0 is stored as NULL.
pub struct Rating;

impl Rating {
    fn bounded(value: Value, column: &Column) -> Result<Value> {
        let max = i64::from(column.meta.max);
        match number_root(value, column)? {
            Value::Integer(i) if !(0..=max).contains(&i) => Err(LatticeError::invalid_value(
                &column.title,
                format!("rating {i} is outside 0..={max}"),
            )),
            other => Ok(other),
        }
    }

    /// `(expr <op> ? OR expr IS NULL)`
    fn or_null(expr: &SQL, op: &'static str, value: &Value) -> SQL {
        compare::binary(expr.clone(), op, value.clone())
            .push_raw(" OR ")
            .append(compare::is_null(expr.clone()))
            .parens()
    }
}

impl TypeFamily for Rating {
    const NAME: &'static str = "rating";
    const OPS: &'static [FilterOp] = NUMERIC_OPS;

    fn parse_input(value: Value, column: &Column, _adapter: &dyn DialectAdapter) -> Result<Value> {
        match Self::bounded(value, column)? {
            Value::Integer(0) => Ok(Value::Null),
            other => Ok(other),
        }
    }

    /// Filter values keep 0 so the override below can see it
    fn coerce_filter_value(
        op: FilterOp,
        value: &Value,
        column: &Column,
        _adapter: &dyn DialectAdapter,
    ) -> Result<Value> {
        coerce_with(op, value, column, |v| Self::bounded(v, column))
    }

    /// Unrated rows (NULL) count as 0.
    fn filter_override(
        expr: &SQL,
        op: FilterOp,
        value: &Value,
        _adapter: &dyn DialectAdapter,
    ) -> Option<SQL> {
        let k = value.as_f64();
        match (op, k) {
            (FilterOp::Lt, Some(k)) if k > 0.0 => Some(Self::or_null(expr, " < ", value)),
            (FilterOp::Lte, Some(k)) if k >= 0.0 => Some(Self::or_null(expr, " <= ", value)),
            (FilterOp::Gte, Some(k)) if k <= 0.0 => Some(Self::or_null(expr, " >= ", value)),
            (FilterOp::Eq, Some(k)) if k == 0.0 => Some(Self::or_null(expr, " = ", value)),
            (FilterOp::Neq, Some(k)) if k == 0.0 => Some(
                compare::binary(expr.clone(), " <> ", value.clone())
                    .push_raw(" AND ")
                    .append(compare::is_not_null(expr.clone()))
                    .parens(),
            ),
            (FilterOp::Blank, _) => Some(Self::or_null(expr, " = ", &Value::Integer(0))),
            (FilterOp::NotBlank, _) => Some(
                compare::binary(expr.clone(), " <> ", Value::Integer(0))
                    .push_raw(" AND ")
                    .append(compare::is_not_null(expr.clone()))
                    .parens(),
            ),
            _ => None,
        }
    }
}

/// Duration columns store seconds.
pub struct Duration;

impl Duration {
    /// `"h:mm:ss.sss"` style strings to seconds. Two-part input is `h:mm` for
    /// the `h:mm` format and `m:ss` otherwise.
    fn parse_clock(text: &str, format: DurationFormat) -> Option<f64> {
        let parts: Vec<&str> = text.split(':').map(str::trim).collect();
        let whole = |s: &str| s.parse::<u64>().ok().map(|n| n as f64);
        let seconds = |s: &str| s.parse::<f64>().ok().filter(|f| *f >= 0.0);

        match parts.as_slice() {
            [h, m] if format == DurationFormat::HourMinute => {
                Some(whole(h)? * 3600.0 + whole(m)? * 60.0)
            }
            [m, s] => Some(whole(m)? * 60.0 + seconds(s)?),
            [h, m, s] => Some(whole(h)? * 3600.0 + whole(m)? * 60.0 + seconds(s)?),
            _ => None,
        }
    }
}

impl TypeFamily for Duration {
    const NAME: &'static str = "duration";
    const OPS: &'static [FilterOp] = NUMERIC_OPS;

    fn parse_input(value: Value, column: &Column, _adapter: &dyn DialectAdapter) -> Result<Value> {
        let format = column.meta.duration_format;
        let clock = value
            .as_str()
            .filter(|text| text.contains(':'))
            .map(|text| text.trim().trim_start_matches('+').to_string());

        let seconds = match clock {
            Some(text) => {
                if text.starts_with('-') {
                    return Err(LatticeError::invalid_value(
                        &column.title,
                        "duration cannot be negative",
                    ));
                }
                Self::parse_clock(&text, format).ok_or_else(|| {
                    LatticeError::invalid_value(
                        &column.title,
                        format!("'{text}' is not a duration"),
                    )
                })?
            }
            None => match decimal_root(value, column)? {
                Value::Real(f) => f,
                other => return Ok(other),
            },
        };

        if seconds < 0.0 {
            return Err(LatticeError::invalid_value(
                &column.title,
                "duration cannot be negative",
            ));
        }

        let rounded = round_to(seconds, format.precision());
        if format.precision() == 0 {
            number_root(Value::Real(rounded), column)
        } else {
            decimal_root(Value::Real(rounded), column)
        }
    }
}

/// Year columns: integers in `1000..=9999`
pub struct Year;

impl TypeFamily for Year {
    const NAME: &'static str = "year";
    const OPS: &'static [FilterOp] = NUMERIC_OPS;

    fn parse_input(value: Value, column: &Column, _adapter: &dyn DialectAdapter) -> Result<Value> {
        match number_root(value, column)? {
            Value::Integer(year) if !(1000..=9999).contains(&year) => Err(
                LatticeError::invalid_value(&column.title, format!("{year} is not a valid year")),
            ),
            other => Ok(other),
        }
    }
}
