use lattice_types::Dialect;

use super::{DialectAdapter, json_pairs};
use crate::sql::SQL;

/// MySQL 8: `?` placeholders, backtick identifiers, lateral derived tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySql;

impl DialectAdapter for MySql {
    fn dialect(&self) -> Dialect {
        Dialect::MySQL
    }

    fn write_ident(&self, out: &mut String, ident: &str) {
        out.push('`');
        for ch in ident.chars() {
            if ch == '`' {
                out.push('`');
            }
            out.push(ch);
        }
        out.push('`');
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn json_object(&self, pairs: Vec<(String, SQL)>) -> SQL {
        SQL::func("JSON_OBJECT", json_pairs(pairs, ", "))
    }

    /// `JSON_ARRAYAGG` takes no ORDER BY; ordered arrays use it as a window
    /// function over the whole partition instead.
    fn json_array_agg(&self, expr: SQL, order: Vec<SQL>) -> SQL {
        let aggregate = SQL::func("JSON_ARRAYAGG", expr);
        if order.is_empty() {
            return SQL::func(
                "COALESCE",
                aggregate.push_raw(", ").append(self.empty_json_array()),
            );
        }
        aggregate
            .push_raw(" OVER (ORDER BY ")
            .append(SQL::join(order, ", "))
            .push_raw(" ROWS BETWEEN UNBOUNDED PRECEDING AND UNBOUNDED FOLLOWING)")
    }

    fn windowed_array_agg(&self) -> bool {
        true
    }

    fn lateral_join(&self, subquery: SQL, alias: &str) -> Option<SQL> {
        Some(
            SQL::raw(" LEFT OUTER JOIN LATERAL ")
                .append(subquery.parens())
                .alias(alias.to_string())
                .push_raw(" ON TRUE"),
        )
    }

    fn expand_json_array(&self, source: SQL, alias: &str) -> SQL {
        SQL::raw(", JSON_TABLE(")
            .append(source)
            .push_raw(", '$[*]' COLUMNS (")
            .append(SQL::ident("value"))
            .push_raw(" JSON PATH '$'))")
            .alias(alias.to_string())
    }

    fn datetime_to_utc(&self, expr: SQL, timezone: &str) -> SQL {
        SQL::func(
            "CONVERT_TZ",
            expr.push_raw(", ")
                .append(SQL::literal(timezone.to_string()))
                .push_raw(", '+00:00'"),
        )
    }

    fn datetime_literal_format(&self) -> &'static str {
        "%Y-%m-%d %H:%M:%S"
    }

    fn json_text(&self, expr: SQL) -> SQL {
        SQL::func("JSON_UNQUOTE", expr)
    }
}
