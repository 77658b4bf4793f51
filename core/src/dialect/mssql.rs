use lattice_types::Dialect;

use super::{DialectAdapter, json_pairs, ordered_argument};
use crate::sql::SQL;

/// SQL Server 2022+: `@pN` placeholders, `OUTER APPLY`, `OFFSET .. FETCH`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MsSql;

impl DialectAdapter for MsSql {
    fn dialect(&self) -> Dialect {
        Dialect::MSSQL
    }

    fn placeholder(&self, index: usize) -> String {
        format!("@p{index}")
    }

    fn json_object(&self, pairs: Vec<(String, SQL)>) -> SQL {
        SQL::func("JSON_OBJECT", json_pairs(pairs, ": "))
    }

    fn json_array_agg(&self, expr: SQL, order: Vec<SQL>) -> SQL {
        SQL::func(
            "COALESCE",
            SQL::func("JSON_ARRAYAGG", ordered_argument(expr, order))
                .push_raw(", ")
                .append(self.empty_json_array()),
        )
    }

    fn embed_json(&self, expr: SQL) -> SQL {
        SQL::func("JSON_QUERY", expr)
    }

    fn lateral_join(&self, subquery: SQL, alias: &str) -> Option<SQL> {
        Some(
            SQL::raw(" OUTER APPLY ")
                .append(subquery.parens())
                .alias(alias.to_string()),
        )
    }

    fn expand_json_array(&self, source: SQL, alias: &str) -> SQL {
        SQL::raw(" CROSS APPLY ")
            .append(SQL::func("OPENJSON", source))
            .alias(alias.to_string())
    }

    fn json_element(&self, alias: &str) -> SQL {
        // OPENJSON types 4 and 5 are arrays and objects
        SQL::raw("CASE WHEN ")
            .append(SQL::qualified(alias, "type"))
            .push_raw(" IN (4, 5) THEN JSON_QUERY(")
            .append(SQL::qualified(alias, "value"))
            .push_raw(") ELSE ")
            .append(SQL::qualified(alias, "value"))
            .push_raw(" END")
    }

    /// OFFSET/FETCH requires an ORDER BY; the composer always emits one.
    fn limit_offset(&self, limit: SQL, offset: Option<SQL>) -> SQL {
        SQL::raw(" OFFSET ")
            .append(offset.unwrap_or_else(|| SQL::raw("0")))
            .push_raw(" ROWS FETCH NEXT ")
            .append(limit)
            .push_raw(" ROWS ONLY")
    }

    fn requires_order_for_paging(&self) -> bool {
        true
    }

    fn datetime_to_utc(&self, expr: SQL, timezone: &str) -> SQL {
        expr.parens()
            .push_raw(" AT TIME ZONE ")
            .append(SQL::literal(timezone.to_string()))
            .parens()
            .push_raw(" AT TIME ZONE 'UTC'")
    }

    fn concat(&self, parts: Vec<SQL>) -> SQL {
        SQL::func("CONCAT", SQL::join(parts, ", "))
    }
}
