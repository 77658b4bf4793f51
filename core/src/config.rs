//! Configuration types for lattice.toml

use lattice_types::Dialect;
use serde::{Deserialize, Serialize};

use crate::dialect::adapter;

/// Page bounds applied to list requests
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct PaginationConfig {
    /// Limit used when the request does not name one
    pub default_limit: u64,
    pub max_limit: u64,
    pub min_limit: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: 25,
            max_limit: 1000,
            min_limit: 1,
        }
    }
}

/// Defaults for the rows of relation columns
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct NestedConfig {
    /// Rows per has-many / many-to-many relation when the request sets none
    pub limit: u64,
}

impl Default for NestedConfig {
    fn default() -> Self {
        Self { limit: 25 }
    }
}

/// Prepared-query cache settings
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Main configuration struct for lattice.toml
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct LatticeConfig {
    /// Database dialect (sqlite, postgresql, mysql, mssql)
    pub dialect: Dialect,
    /// Timezone of datetime columns stored without zone information
    #[serde(default = "default_db_timezone")]
    pub db_timezone: String,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub nested: NestedConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

fn default_db_timezone() -> String {
    "UTC".to_string()
}

impl Default for LatticeConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            db_timezone: default_db_timezone(),
            pagination: PaginationConfig::default(),
            nested: NestedConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl LatticeConfig {
    /// Defaults for a dialect
    pub fn for_dialect(dialect: Dialect) -> Self {
        Self {
            dialect,
            ..Self::default()
        }
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::parse(&contents)
    }

    /// Parse configuration from a TOML string
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the page bounds and that the dialect can convert from
    /// `db_timezone`. [`parse`](Self::parse) runs this; configurations built
    /// in code should call it too.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !adapter(self.dialect).supports_timezone(&self.db_timezone) {
            return Err(ConfigError::Invalid(format!(
                "db_timezone '{}' is not supported on {}; use UTC or a fixed offset such as +05:30",
                self.db_timezone, self.dialect
            )));
        }
        let page = &self.pagination;
        if page.min_limit == 0 || page.min_limit > page.max_limit {
            return Err(ConfigError::Invalid(format!(
                "pagination bounds {}..={} are empty",
                page.min_limit, page.max_limit
            )));
        }
        if !(page.min_limit..=page.max_limit).contains(&page.default_limit) {
            return Err(ConfigError::Invalid(format!(
                "default_limit {} is outside {}..={}",
                page.default_limit, page.min_limit, page.max_limit
            )));
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
