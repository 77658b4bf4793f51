use lattice_types::{Dialect, LogicalType};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LatticeError {
    /// No handler is registered for the (type, dialect) pair. A deployment
    /// defect, never a data problem.
    #[error("no handler registered for {logical_type} on {dialect}")]
    UnregisteredHandler {
        logical_type: LogicalType,
        dialect: Dialect,
    },

    /// A caller supplied value cannot be stored in the column
    #[error("invalid value for field '{field}': {reason}")]
    InvalidValueForField { field: String, reason: String },

    /// The filter operator is not supported for the column's type
    #[error("filter operation '{op}' is not supported for field '{field}' of type {logical_type}")]
    UnsupportedFilterOperation {
        op: &'static str,
        field: String,
        logical_type: LogicalType,
    },

    /// Several filters failed verification
    #[error("invalid filters: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join(", "))]
    FilterVerification(Vec<LatticeError>),

    /// A lookup chain revisits a column already on the resolution path
    #[error("lookup cycle detected: {}", .path.join(" -> "))]
    LookupCycle { path: Vec<String> },

    /// The dialect cannot convert datetimes from the configured timezone
    #[error("timezone '{timezone}' is not supported on {dialect}")]
    UnsupportedTimezone { timezone: String, dialect: Dialect },

    /// A view id could not be found in the schema
    #[error("unknown view '{0}'")]
    UnknownView(String),

    /// A column id could not be found in the model or schema
    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    /// A model id could not be found in the schema
    #[error("unknown model '{0}'")]
    UnknownModel(String),

    /// A virtual column is missing the options it needs to be composed
    #[error("column '{field}' has no {expected} options")]
    MissingColumnOptions {
        field: String,
        expected: &'static str,
    },

    /// Relation metadata is inconsistent (missing join columns, wrong model)
    #[error("invalid relation on column '{field}': {reason}")]
    InvalidRelation { field: String, reason: String },

    /// The formula could not be translated to SQL
    #[error("invalid formula on column '{field}': {reason}")]
    InvalidFormula { field: String, reason: String },

    /// A named placeholder had no value at bind time
    #[error("missing binding for placeholder '{0}'")]
    MissingBinding(String),

    /// Error raised by the caller's executor; passed through untouched
    #[error("execution error: {0}")]
    Execution(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Error mapping result rows
    #[error("mapping error: {0}")]
    Mapping(String),
}

impl LatticeError {
    /// Validation errors are the caller's fault; everything else is a
    /// configuration or composition fault.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            LatticeError::InvalidValueForField { .. }
                | LatticeError::UnsupportedFilterOperation { .. }
                | LatticeError::FilterVerification(_)
        )
    }

    pub(crate) fn invalid_value(field: &str, reason: impl Into<String>) -> Self {
        LatticeError::InvalidValueForField {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_relation(field: &str, reason: impl Into<String>) -> Self {
        LatticeError::InvalidRelation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for composition and execution
pub type Result<T> = std::result::Result<T, LatticeError>;
