//! Logical column types
//!
//! A logical type describes what a column *means* (currency, rating, a link to
//! another table) independently of how the backing database stores it.

/// The abstract type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LogicalType {
    Id,
    ForeignKey,
    SingleLineText,
    LongText,
    Email,
    PhoneNumber,
    Url,
    SingleSelect,
    MultiSelect,
    Checkbox,
    Number,
    Decimal,
    Currency,
    Percent,
    Rating,
    Duration,
    Year,
    Date,
    DateTime,
    CreatedTime,
    LastModifiedTime,
    Json,
    LinkToAnotherRecord,
    Links,
    Lookup,
    Rollup,
    Formula,
    Barcode,
    QrCode,
    Attachment,
    Geometry,
}

impl LogicalType {
    /// Every logical type, in declaration order.
    pub const ALL: [LogicalType; 31] = [
        LogicalType::Id,
        LogicalType::ForeignKey,
        LogicalType::SingleLineText,
        LogicalType::LongText,
        LogicalType::Email,
        LogicalType::PhoneNumber,
        LogicalType::Url,
        LogicalType::SingleSelect,
        LogicalType::MultiSelect,
        LogicalType::Checkbox,
        LogicalType::Number,
        LogicalType::Decimal,
        LogicalType::Currency,
        LogicalType::Percent,
        LogicalType::Rating,
        LogicalType::Duration,
        LogicalType::Year,
        LogicalType::Date,
        LogicalType::DateTime,
        LogicalType::CreatedTime,
        LogicalType::LastModifiedTime,
        LogicalType::Json,
        LogicalType::LinkToAnotherRecord,
        LogicalType::Links,
        LogicalType::Lookup,
        LogicalType::Rollup,
        LogicalType::Formula,
        LogicalType::Barcode,
        LogicalType::QrCode,
        LogicalType::Attachment,
        LogicalType::Geometry,
    ];

    /// Types whose values are numbers sharing the decimal root semantics.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(
            self,
            LogicalType::Number
                | LogicalType::Decimal
                | LogicalType::Currency
                | LogicalType::Percent
                | LogicalType::Rating
                | LogicalType::Duration
                | LogicalType::Year
        )
    }

    /// Types that have no physical column of their own; their value is
    /// computed while composing the query.
    #[must_use]
    pub const fn is_virtual(&self) -> bool {
        matches!(
            self,
            LogicalType::LinkToAnotherRecord
                | LogicalType::Links
                | LogicalType::Lookup
                | LogicalType::Rollup
                | LogicalType::Formula
                | LogicalType::Barcode
                | LogicalType::QrCode
        )
    }

    /// Types that carry relation options (a link to another model).
    #[must_use]
    pub const fn is_relation(&self) -> bool {
        matches!(self, LogicalType::LinkToAnotherRecord | LogicalType::Links)
    }

    /// Types whose stored/rendered value is a JSON document.
    #[must_use]
    pub const fn is_json(&self) -> bool {
        matches!(self, LogicalType::Json | LogicalType::LinkToAnotherRecord)
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            LogicalType::Id => "ID",
            LogicalType::ForeignKey => "ForeignKey",
            LogicalType::SingleLineText => "SingleLineText",
            LogicalType::LongText => "LongText",
            LogicalType::Email => "Email",
            LogicalType::PhoneNumber => "PhoneNumber",
            LogicalType::Url => "URL",
            LogicalType::SingleSelect => "SingleSelect",
            LogicalType::MultiSelect => "MultiSelect",
            LogicalType::Checkbox => "Checkbox",
            LogicalType::Number => "Number",
            LogicalType::Decimal => "Decimal",
            LogicalType::Currency => "Currency",
            LogicalType::Percent => "Percent",
            LogicalType::Rating => "Rating",
            LogicalType::Duration => "Duration",
            LogicalType::Year => "Year",
            LogicalType::Date => "Date",
            LogicalType::DateTime => "DateTime",
            LogicalType::CreatedTime => "CreatedTime",
            LogicalType::LastModifiedTime => "LastModifiedTime",
            LogicalType::Json => "JSON",
            LogicalType::LinkToAnotherRecord => "LinkToAnotherRecord",
            LogicalType::Links => "Links",
            LogicalType::Lookup => "Lookup",
            LogicalType::Rollup => "Rollup",
            LogicalType::Formula => "Formula",
            LogicalType::Barcode => "Barcode",
            LogicalType::QrCode => "QrCode",
            LogicalType::Attachment => "Attachment",
            LogicalType::Geometry => "Geometry",
        }
    }

    /// Parse a logical type from its display name (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|ty| ty.as_str().eq_ignore_ascii_case(s))
    }
}

impl core::fmt::Display for LogicalType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for LogicalType {
    type Err = LogicalTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LogicalType::parse(s).ok_or(LogicalTypeParseError)
    }
}

/// Error returned when parsing an unknown logical type name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogicalTypeParseError;

impl core::fmt::Display for LogicalTypeParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("unknown logical type")
    }
}

impl std::error::Error for LogicalTypeParseError {}
