//! Unified database dialect enum
//!
//! Single source of truth for dialect identification. Everything that renders
//! SQL text keys off this enum.

/// SQL dialect for database-specific behavior
///
/// Each dialect has different placeholder syntax, JSON functions, timezone
/// handling and lateral-join support.
///
/// # Examples
///
/// ```
/// use lattice_types::Dialect;
///
/// let dialect = Dialect::PostgreSQL;
/// assert!(dialect.uses_numbered_placeholders());
///
/// let sqlite = Dialect::SQLite;
/// assert!(!sqlite.uses_numbered_placeholders());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Dialect {
    /// SQLite - uses `?` positional placeholders
    #[default]
    SQLite,

    /// PostgreSQL - uses `$1, $2, ...` numbered placeholders
    PostgreSQL,

    /// MySQL - uses `?` positional placeholders
    MySQL,

    /// Microsoft SQL Server - uses `@p1, @p2, ...` numbered placeholders
    MSSQL,
}

impl Dialect {
    /// All supported dialects, in [`Dialect::index`] order.
    pub const ALL: [Dialect; 4] = [
        Dialect::SQLite,
        Dialect::PostgreSQL,
        Dialect::MySQL,
        Dialect::MSSQL,
    ];

    /// Returns `true` if this dialect uses numbered placeholders (`$1`, `@p1`)
    #[inline]
    #[must_use]
    pub const fn uses_numbered_placeholders(&self) -> bool {
        matches!(self, Dialect::PostgreSQL | Dialect::MSSQL)
    }

    /// Stable position of this dialect in per-dialect lookup tables.
    #[inline]
    #[must_use]
    pub const fn index(&self) -> usize {
        match self {
            Dialect::SQLite => 0,
            Dialect::PostgreSQL => 1,
            Dialect::MySQL => 2,
            Dialect::MSSQL => 3,
        }
    }

    /// Parse a dialect from a string (case-insensitive)
    ///
    /// Supports various common aliases:
    /// - SQLite: `"sqlite"`, `"sqlite3"`
    /// - PostgreSQL: `"postgresql"`, `"postgres"`, `"pg"`
    /// - MySQL: `"mysql"`, `"mysql2"`
    /// - SQL Server: `"mssql"`, `"sqlserver"`
    ///
    /// # Examples
    ///
    /// ```
    /// use lattice_types::Dialect;
    ///
    /// assert_eq!(Dialect::parse("sqlite"), Some(Dialect::SQLite));
    /// assert_eq!(Dialect::parse("pg"), Some(Dialect::PostgreSQL));
    /// assert_eq!(Dialect::parse("mssql"), Some(Dialect::MSSQL));
    /// assert_eq!(Dialect::parse("unknown"), None);
    /// ```
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("sqlite") || s.eq_ignore_ascii_case("sqlite3") {
            Some(Dialect::SQLite)
        } else if s.eq_ignore_ascii_case("postgresql")
            || s.eq_ignore_ascii_case("postgres")
            || s.eq_ignore_ascii_case("pg")
        {
            Some(Dialect::PostgreSQL)
        } else if s.eq_ignore_ascii_case("mysql") || s.eq_ignore_ascii_case("mysql2") {
            Some(Dialect::MySQL)
        } else if s.eq_ignore_ascii_case("mssql") || s.eq_ignore_ascii_case("sqlserver") {
            Some(Dialect::MSSQL)
        } else {
            None
        }
    }

    /// Get the dialect name as a lowercase string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Dialect::SQLite => "sqlite",
            Dialect::PostgreSQL => "postgresql",
            Dialect::MySQL => "mysql",
            Dialect::MSSQL => "mssql",
        }
    }
}

impl core::fmt::Display for Dialect {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for Dialect {
    type Err = DialectParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dialect::parse(s).ok_or(DialectParseError)
    }
}

/// Error returned when parsing an unknown dialect string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialectParseError;

impl core::fmt::Display for DialectParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("unknown dialect")
    }
}

impl std::error::Error for DialectParseError {}
