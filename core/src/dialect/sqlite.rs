use lattice_types::Dialect;

use super::{DialectAdapter, is_utc, json_pairs, offset_minutes};
use crate::sql::SQL;

/// SQLite: `?` placeholders, JSON1 functions, no lateral joins.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sqlite;

impl DialectAdapter for Sqlite {
    fn dialect(&self) -> Dialect {
        Dialect::SQLite
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn json_object(&self, pairs: Vec<(String, SQL)>) -> SQL {
        SQL::func("json_object", json_pairs(pairs, ", "))
    }

    fn json_array_agg(&self, expr: SQL, _order: Vec<SQL>) -> SQL {
        // json_group_array already yields '[]' over zero rows, and consumes
        // them in the order of its source
        SQL::func("json_group_array", expr)
    }

    fn empty_json_array(&self) -> SQL {
        SQL::raw("json_array()")
    }

    fn embed_json(&self, expr: SQL) -> SQL {
        SQL::func("json", expr)
    }

    fn lateral_join(&self, _subquery: SQL, _alias: &str) -> Option<SQL> {
        None
    }

    fn expand_json_array(&self, source: SQL, alias: &str) -> SQL {
        SQL::raw(", ")
            .append(SQL::func("json_each", source))
            .alias(alias.to_string())
    }

    fn json_element(&self, alias: &str) -> SQL {
        // json_each hands back objects and arrays as text
        SQL::raw("CASE WHEN ")
            .append(SQL::qualified(alias, "type"))
            .push_raw(" IN ('object', 'array') THEN json(")
            .append(SQL::qualified(alias, "value"))
            .push_raw(") ELSE ")
            .append(SQL::qualified(alias, "value"))
            .push_raw(" END")
    }

    fn datetime_to_utc(&self, expr: SQL, timezone: &str) -> SQL {
        if is_utc(timezone) {
            return SQL::func("datetime", expr);
        }
        match offset_minutes(timezone) {
            Some(minutes) => SQL::func(
                "datetime",
                expr.push_raw(", ")
                    .append(SQL::literal(format!("{:+} minutes", -minutes))),
            ),
            // rejected by supports_timezone before composition
            None => SQL::func("datetime", expr),
        }
    }

    /// SQLite has no zone database: UTC and fixed offsets only.
    fn supports_timezone(&self, timezone: &str) -> bool {
        is_utc(timezone) || offset_minutes(timezone).is_some()
    }

    fn datetime_literal_format(&self) -> &'static str {
        "%Y-%m-%d %H:%M:%S"
    }

    fn concat(&self, parts: Vec<SQL>) -> SQL {
        SQL::join(parts, " || ")
    }
}
