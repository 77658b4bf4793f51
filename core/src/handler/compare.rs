//! Comparison SQL shared by every handler.

use crate::{dialect::DialectAdapter, filter::FilterOp, sql::SQL, value::Value};

/// Render `expr <op> value`.
///
/// `value` has already been coerced by the handler. `textual` makes blank
/// checks treat the empty string like NULL.
pub(crate) fn comparison(
    expr: SQL,
    op: FilterOp,
    value: Value,
    textual: bool,
    adapter: &dyn DialectAdapter,
) -> SQL {
    match op {
        FilterOp::Eq if value.is_null() => is_null(expr),
        FilterOp::Eq => binary(expr, " = ", value),
        FilterOp::Neq if value.is_null() => is_not_null(expr),
        // rows without a value differ from any value
        FilterOp::Neq => binary(expr.clone(), " <> ", value)
            .push_raw(" OR ")
            .append(is_null(expr))
            .parens(),
        FilterOp::Gt => binary(expr, " > ", value),
        FilterOp::Lt => binary(expr, " < ", value),
        FilterOp::Gte => binary(expr, " >= ", value),
        FilterOp::Lte => binary(expr, " <= ", value),
        FilterOp::Like => match value.as_str() {
            Some(text) => adapter.like(expr, SQL::param(contains_pattern(text)), false),
            None => blank(expr, textual),
        },
        FilterOp::NotLike => match value.as_str() {
            Some(text) => adapter
                .like(expr.clone(), SQL::param(contains_pattern(text)), true)
                .push_raw(" OR ")
                .append(is_null(expr))
                .parens(),
            None => not_blank(expr, textual),
        },
        FilterOp::Blank => blank(expr, textual),
        FilterOp::NotBlank => not_blank(expr, textual),
        FilterOp::Is => is(expr, value.as_str().unwrap_or("null"), textual),
        FilterOp::IsNot => {
            SQL::raw("NOT ").append(is(expr, value.as_str().unwrap_or("null"), textual).parens())
        }
        FilterOp::In => match value {
            Value::List(items) if items.is_empty() => SQL::raw("1 = 0"),
            Value::List(items) => expr.push_raw(" IN ").append(SQL::param_list(items).parens()),
            other => binary(expr, " = ", other),
        },
        FilterOp::Checked => expr.push_raw(" = ").push_raw(adapter.true_literal()),
        FilterOp::NotChecked => expr
            .clone()
            .push_raw(" <> ")
            .push_raw(adapter.true_literal())
            .push_raw(" OR ")
            .append(is_null(expr))
            .parens(),
    }
}

pub(crate) fn binary(expr: SQL, op: &'static str, value: Value) -> SQL {
    expr.push_raw(op).append(SQL::param(value))
}

pub(crate) fn is_null(expr: SQL) -> SQL {
    expr.push_raw(" IS NULL")
}

pub(crate) fn is_not_null(expr: SQL) -> SQL {
    expr.push_raw(" IS NOT NULL")
}

pub(crate) fn blank(expr: SQL, textual: bool) -> SQL {
    if textual {
        is_null(expr.clone())
            .push_raw(" OR ")
            .append(expr)
            .push_raw(" = ''")
            .parens()
    } else {
        is_null(expr)
    }
}

pub(crate) fn not_blank(expr: SQL, textual: bool) -> SQL {
    if textual {
        is_not_null(expr.clone())
            .push_raw(" AND ")
            .append(expr)
            .push_raw(" <> ''")
            .parens()
    } else {
        is_not_null(expr)
    }
}

fn is(expr: SQL, sub: &str, textual: bool) -> SQL {
    match sub {
        "notnull" => is_not_null(expr),
        "empty" if textual => expr.push_raw(" = ''"),
        "notempty" if textual => expr.push_raw(" <> ''"),
        "notempty" => is_not_null(expr),
        "blank" => blank(expr, textual),
        "notblank" => not_blank(expr, textual),
        _ => is_null(expr),
    }
}

/// Substring match; wildcards inside `text` keep their LIKE meaning
fn contains_pattern(text: &str) -> String {
    format!("%{text}%")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{Postgres, Sqlite};
    use crate::prepared::prepare_render;

    fn render(sql: SQL) -> String {
        prepare_render(sql, &Sqlite).sql().to_string()
    }

    #[test]
    fn neq_includes_null_rows() {
        let sql = comparison(SQL::qualified("a0", "n"), FilterOp::Neq, Value::Integer(3), false, &Sqlite);
        assert_eq!(render(sql), r#"("a0"."n" <> ? OR "a0"."n" IS NULL)"#);
    }

    #[test]
    fn empty_in_matches_nothing() {
        let sql = comparison(SQL::qualified("a0", "n"), FilterOp::In, Value::List(vec![]), false, &Sqlite);
        assert_eq!(render(sql), "1 = 0");
    }

    #[test]
    fn textual_blank_matches_empty_string() {
        let sql = comparison(SQL::qualified("a0", "t"), FilterOp::Blank, Value::Null, true, &Sqlite);
        assert_eq!(render(sql), r#"("a0"."t" IS NULL OR "a0"."t" = '')"#);
    }

    #[test]
    fn postgres_like_is_case_insensitive() {
        let sql = comparison(
            SQL::qualified("a0", "t"),
            FilterOp::Like,
            Value::Text("ab".into()),
            true,
            &Postgres,
        );
        let prepared = prepare_render(sql, &Postgres);
        assert_eq!(prepared.sql(), r#""a0"."t" ILIKE $1"#);
        assert_eq!(prepared.params[0].value, Some(Value::Text("%ab%".into())));
    }
}
