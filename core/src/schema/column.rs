use lattice_types::LogicalType;
use serde::Deserialize;

use super::{FormulaOptions, LookupOptions, RelationOptions, RollupOptions};

/// A column of a [`Model`](super::Model).
///
/// Columns are immutable once the schema is built. Virtual columns (lookup,
/// rollup, formula, relations) carry their definition in [`ColumnOptions`].
#[derive(Debug, Clone, Deserialize)]
pub struct Column {
    pub id: String,
    pub title: String,
    /// Physical column name; empty for virtual columns
    #[serde(default)]
    pub column_name: String,
    pub logical_type: LogicalType,
    #[serde(default)]
    pub is_primary_key: bool,
    #[serde(default)]
    pub is_primary_value: bool,
    #[serde(default)]
    pub meta: ColumnMeta,
    #[serde(default)]
    pub options: ColumnOptions,
    /// Owning model, filled in when the model is added to a schema
    #[serde(skip)]
    pub model_id: String,
}

impl Column {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        column_name: impl Into<String>,
        logical_type: LogicalType,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            column_name: column_name.into(),
            logical_type,
            is_primary_key: false,
            is_primary_value: false,
            meta: ColumnMeta::default(),
            options: ColumnOptions::None,
            model_id: String::new(),
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    pub fn primary_value(mut self) -> Self {
        self.is_primary_value = true;
        self
    }

    pub fn with_meta(mut self, meta: ColumnMeta) -> Self {
        self.meta = meta;
        self
    }

    pub fn with_options(mut self, options: impl Into<ColumnOptions>) -> Self {
        self.options = options.into();
        self
    }

    /// Whether the column has no physical storage
    pub fn is_virtual(&self) -> bool {
        self.logical_type.is_virtual()
    }
}

/// Per-type column options that do not change the query shape.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ColumnMeta {
    /// BCP 47 locale used to read currency strings (`en-US`, `de-DE`, ...)
    pub currency_locale: Option<String>,
    /// ISO 4217 currency code
    pub currency_code: Option<String>,
    /// Highest rating value
    pub max: u32,
    pub duration_format: DurationFormat,
    /// Decimal places
    pub precision: Option<u32>,
    /// Whether the stored datetime already carries zone information
    pub is_dt_with_tz: bool,
}

impl Default for ColumnMeta {
    fn default() -> Self {
        Self {
            currency_locale: None,
            currency_code: None,
            max: 5,
            duration_format: DurationFormat::default(),
            precision: None,
            is_dt_with_tz: false,
        }
    }
}

/// Display format of a duration column; fixes how many fractional second
/// digits are kept and how two-part input is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum DurationFormat {
    #[serde(rename = "h:mm")]
    HourMinute,
    #[default]
    #[serde(rename = "h:mm:ss")]
    HourMinuteSecond,
    #[serde(rename = "h:mm:ss.s")]
    Tenths,
    #[serde(rename = "h:mm:ss.ss")]
    Hundredths,
    #[serde(rename = "h:mm:ss.sss")]
    Thousandths,
}

impl DurationFormat {
    /// Digits kept after the decimal point
    pub const fn precision(self) -> u32 {
        match self {
            Self::HourMinute | Self::HourMinuteSecond => 0,
            Self::Tenths => 1,
            Self::Hundredths => 2,
            Self::Thousandths => 3,
        }
    }
}

/// Type-specific definition of a column.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnOptions {
    #[default]
    None,
    Relation(RelationOptions),
    Lookup(LookupOptions),
    Rollup(RollupOptions),
    Formula(FormulaOptions),
    /// Barcode and QR code columns render the value of another column
    Barcode { value_column: String },
}

impl From<RelationOptions> for ColumnOptions {
    fn from(options: RelationOptions) -> Self {
        ColumnOptions::Relation(options)
    }
}

impl From<LookupOptions> for ColumnOptions {
    fn from(options: LookupOptions) -> Self {
        ColumnOptions::Lookup(options)
    }
}

impl From<RollupOptions> for ColumnOptions {
    fn from(options: RollupOptions) -> Self {
        ColumnOptions::Rollup(options)
    }
}

impl From<FormulaOptions> for ColumnOptions {
    fn from(options: FormulaOptions) -> Self {
        ColumnOptions::Formula(options)
    }
}
