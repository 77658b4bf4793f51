//! Dialect adapters.
//!
//! Every dialect-specific SQL fragment the composer and the type handlers need
//! lives behind [`DialectAdapter`]. Handlers that share semantics across
//! dialects share one implementation and only swap the adapter.

mod mssql;
mod mysql;
mod postgres;
mod sqlite;

pub use mssql::MsSql;
pub use mysql::MySql;
pub use postgres::Postgres;
pub use sqlite::Sqlite;

use core::fmt;
use lattice_types::Dialect;

use crate::sql::SQL;

/// SQL syntax that differs between database backends.
///
/// Implementations are zero-sized and stateless. Methods take and return
/// [`SQL`] fragments so parameters survive until the statement is rendered.
pub trait DialectAdapter: Send + Sync + fmt::Debug {
    /// The dialect this adapter renders for
    fn dialect(&self) -> Dialect;

    /// Write a quoted identifier
    ///
    /// - SQLite/PostgreSQL/SQL Server: `"name"`
    /// - MySQL: `` `name` ``
    fn write_ident(&self, out: &mut String, ident: &str) {
        out.push('"');
        for ch in ident.chars() {
            if ch == '"' {
                out.push('"');
            }
            out.push(ch);
        }
        out.push('"');
    }

    /// Write a string literal with embedded quotes doubled
    fn write_literal(&self, out: &mut String, text: &str) {
        out.push('\'');
        for ch in text.chars() {
            if ch == '\'' {
                out.push('\'');
            }
            out.push(ch);
        }
        out.push('\'');
    }

    /// Generate a parameter placeholder for the given index (1-based)
    ///
    /// - SQLite/MySQL: `?`
    /// - PostgreSQL: `$1`, `$2`, ...
    /// - SQL Server: `@p1`, `@p2`, ...
    fn placeholder(&self, index: usize) -> String;

    /// Literal for boolean true in comparisons
    fn true_literal(&self) -> &'static str {
        "1"
    }

    /// Build a JSON object from `(key, value)` pairs
    ///
    /// - SQLite: `json_object('k', v)`
    /// - PostgreSQL: `json_build_object('k', v)`
    /// - MySQL: `JSON_OBJECT('k', v)`
    /// - SQL Server: `JSON_OBJECT('k': v)`
    fn json_object(&self, pairs: Vec<(String, SQL)>) -> SQL;

    /// Aggregate rows into a JSON array, yielding an empty array for no rows.
    ///
    /// `order` holds ORDER BY terms fixing the element order; empty leaves
    /// the order to the backend.
    fn json_array_agg(&self, expr: SQL, order: Vec<SQL>) -> SQL;

    /// Whether an ordered [`json_array_agg`](Self::json_array_agg) is a
    /// window aggregate. The array is then repeated on every source row: the
    /// enclosing query must keep one row and supply the empty array itself.
    fn windowed_array_agg(&self) -> bool {
        false
    }

    /// The empty JSON array
    fn empty_json_array(&self) -> SQL {
        SQL::raw("JSON_ARRAY()")
    }

    /// Mark a JSON value coming out of a subquery so an enclosing JSON
    /// constructor nests it instead of quoting it as a string.
    fn embed_json(&self, expr: SQL) -> SQL {
        expr
    }

    /// Attach a correlated subquery as a lateral join exposing its columns
    /// under `alias`. `None` when the dialect has no lateral joins; the
    /// subquery is then inlined as a scalar subquery in the select list.
    fn lateral_join(&self, subquery: SQL, alias: &str) -> Option<SQL>;

    /// A FROM-clause continuation that expands the JSON array `source` into
    /// one row per element under `alias`.
    ///
    /// - SQLite: `, json_each(src) AS e`
    /// - PostgreSQL: `, json_array_elements(src) AS e(value)`
    /// - MySQL: `, JSON_TABLE(src, '$[*]' COLUMNS (value JSON PATH '$')) AS e`
    /// - SQL Server: ` CROSS APPLY OPENJSON(src) AS e`
    fn expand_json_array(&self, source: SQL, alias: &str) -> SQL;

    /// The element value of a row produced by [`expand_json_array`](Self::expand_json_array)
    fn json_element(&self, alias: &str) -> SQL {
        SQL::qualified(alias, "value")
    }

    /// Generate the LIMIT/OFFSET clause, with a leading space
    fn limit_offset(&self, limit: SQL, offset: Option<SQL>) -> SQL {
        let sql = SQL::raw(" LIMIT ").append(limit);
        match offset {
            Some(offset) => sql.push_raw(" OFFSET ").append(offset),
            None => sql,
        }
    }

    /// Whether paging needs an ORDER BY to be valid SQL
    fn requires_order_for_paging(&self) -> bool {
        false
    }

    /// Convert a timestamp stored without zone information from the database
    /// timezone to UTC.
    fn datetime_to_utc(&self, expr: SQL, timezone: &str) -> SQL;

    /// Whether [`datetime_to_utc`](Self::datetime_to_utc) can convert from
    /// `timezone` inside the SQL
    fn supports_timezone(&self, _timezone: &str) -> bool {
        true
    }

    /// `chrono` format of datetime literals compared against
    /// [`datetime_to_utc`](Self::datetime_to_utc) expressions.
    fn datetime_literal_format(&self) -> &'static str {
        "%Y-%m-%d %H:%M:%S%:z"
    }

    /// Pattern match, case-insensitive where the dialect allows it
    fn like(&self, expr: SQL, pattern: SQL, negate: bool) -> SQL {
        let op = if negate { " NOT LIKE " } else { " LIKE " };
        expr.push_raw(op).append(pattern)
    }

    /// Concatenate string expressions
    fn concat(&self, parts: Vec<SQL>) -> SQL {
        SQL::func("CONCAT", SQL::join(parts, ", "))
    }

    /// Textual form of a JSON value, for comparisons
    fn json_text(&self, expr: SQL) -> SQL {
        expr
    }
}

static SQLITE: Sqlite = Sqlite;
static POSTGRES: Postgres = Postgres;
static MYSQL: MySql = MySql;
static MSSQL: MsSql = MsSql;

/// The adapter for a dialect
pub fn adapter(dialect: Dialect) -> &'static dyn DialectAdapter {
    match dialect {
        Dialect::SQLite => &SQLITE,
        Dialect::PostgreSQL => &POSTGRES,
        Dialect::MySQL => &MYSQL,
        Dialect::MSSQL => &MSSQL,
    }
}

/// `expr ORDER BY terms`, the argument of an ordered aggregate
pub(crate) fn ordered_argument(expr: SQL, order: Vec<SQL>) -> SQL {
    if order.is_empty() {
        return expr;
    }
    expr.push_raw(" ORDER BY ").append(SQL::join(order, ", "))
}

/// `'key', value, 'key', value` for the comma-separated JSON constructors
pub(crate) fn json_pairs(pairs: Vec<(String, SQL)>, separator: &'static str) -> SQL {
    SQL::join(
        pairs
            .into_iter()
            .map(|(key, value)| SQL::literal(key).push_raw(separator).append(value)),
        ", ",
    )
}

/// Parse a `+HH:MM` / `-HH:MM` offset into minutes east of UTC
pub(crate) fn offset_minutes(timezone: &str) -> Option<i32> {
    let (sign, rest) = match timezone.as_bytes().first()? {
        b'+' => (1, &timezone[1..]),
        b'-' => (-1, &timezone[1..]),
        _ => return None,
    };
    let (hours, minutes) = rest.split_once(':').unwrap_or((rest, "0"));
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    Some(sign * (hours * 60 + minutes))
}

pub(crate) fn is_utc(timezone: &str) -> bool {
    matches!(timezone, "UTC" | "utc" | "Etc/UTC" | "Z" | "+00:00" | "GMT")
}
