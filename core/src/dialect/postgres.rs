use lattice_types::Dialect;

use super::{DialectAdapter, json_pairs, ordered_argument};
use crate::sql::SQL;

/// PostgreSQL: numbered placeholders, `json` functions, lateral joins.
#[derive(Debug, Clone, Copy, Default)]
pub struct Postgres;

impl DialectAdapter for Postgres {
    fn dialect(&self) -> Dialect {
        Dialect::PostgreSQL
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${index}")
    }

    fn true_literal(&self) -> &'static str {
        "true"
    }

    fn json_object(&self, pairs: Vec<(String, SQL)>) -> SQL {
        SQL::func("json_build_object", json_pairs(pairs, ", "))
    }

    fn json_array_agg(&self, expr: SQL, order: Vec<SQL>) -> SQL {
        SQL::func(
            "COALESCE",
            SQL::func("json_agg", ordered_argument(expr, order))
                .push_raw(", ")
                .append(self.empty_json_array()),
        )
    }

    fn empty_json_array(&self) -> SQL {
        SQL::raw("'[]'::json")
    }

    fn lateral_join(&self, subquery: SQL, alias: &str) -> Option<SQL> {
        Some(
            SQL::raw(" LEFT OUTER JOIN LATERAL ")
                .append(subquery.parens())
                .alias(alias.to_string())
                .push_raw(" ON true"),
        )
    }

    fn expand_json_array(&self, source: SQL, alias: &str) -> SQL {
        SQL::raw(", ")
            .append(SQL::func("json_array_elements", source))
            .alias(alias.to_string())
            .push_raw("(")
            .append(SQL::ident("value"))
            .push_raw(")")
    }

    fn datetime_to_utc(&self, expr: SQL, timezone: &str) -> SQL {
        expr.parens()
            .push_raw(" AT TIME ZONE ")
            .append(SQL::literal(timezone.to_string()))
            .parens()
            .push_raw(" AT TIME ZONE 'UTC'")
    }

    fn like(&self, expr: SQL, pattern: SQL, negate: bool) -> SQL {
        let op = if negate { " NOT ILIKE " } else { " ILIKE " };
        expr.push_raw(op).append(pattern)
    }

    fn concat(&self, parts: Vec<SQL>) -> SQL {
        SQL::join(parts, " || ")
    }

    fn json_text(&self, expr: SQL) -> SQL {
        expr.parens().push_raw("::text")
    }
}
