//! # Lattice
//!
//! Type-directed relational query composition. Given model metadata, a view
//! and request arguments, lattice composes one SQL statement that returns
//! each row with its relations, lookups, rollups and formulas inlined as
//! JSON, for SQLite, PostgreSQL, MySQL and SQL Server.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use lattice::prelude::*;
//!
//! let schema = Schema::new().with_model(
//!     Model::new("film", "Film", "films")
//!         .column(Column::new("id", "Id", "id", LogicalType::Id).primary_key())
//!         .column(Column::new("title", "Title", "title", LogicalType::SingleLineText)),
//! );
//!
//! let args = ListArgs::default()
//!     .filter(Filter::leaf("Title", FilterOp::Like, "war"))
//!     .limit(10);
//! let composed = Composer::new(&schema, Dialect::PostgreSQL).compose_list("film", None, &args)?;
//! println!("{}", composed.list.sql());
//! ```
//!
//! ## Dialect Support
//!
//! | Database   | Nested rows                  | JSON functions                    |
//! |------------|------------------------------|-----------------------------------|
//! | SQLite     | correlated subqueries        | `json_object`, `json_group_array` |
//! | PostgreSQL | `LEFT JOIN LATERAL`          | `json_build_object`, `json_agg`   |
//! | MySQL      | `LEFT JOIN LATERAL`          | `JSON_OBJECT`, `JSON_ARRAYAGG`    |
//! | SQL Server | `OUTER APPLY`                | `JSON_OBJECT`, `JSON_ARRAYAGG`    |

// =============================================================================
// Root-level exports
// =============================================================================

/// Result type for lattice operations
pub use lattice_core::error::Result;

/// Database dialect and logical column type enums
pub use lattice_types::{Dialect, LogicalType};

/// Error types
pub mod error {
    pub use lattice_core::error::LatticeError;
}

/// Model, column and view metadata.
pub use lattice_core::schema;

/// Filter and sort trees.
pub use lattice_core::filter;

/// Per-type column handlers and their registry.
pub mod handler {
    pub use lattice_core::handler::*;
    pub use lattice_core::registry::resolve;
}

/// Dialect adapters.
pub use lattice_core::dialect;

/// Statement composition.
pub use lattice_core::compose;

/// Prepared-query cache.
pub use lattice_core::cache;

/// Request execution through a caller-supplied executor.
pub use lattice_core::service;

/// Configuration loaded from TOML.
pub use lattice_core::config;

// =============================================================================
// Core module - SQL building blocks
// =============================================================================

/// SQL fragments, parameters and rendering.
pub mod core {
    /// Core SQL types for building queries
    pub use lattice_core::{Param, ParamBind, Placeholder, SQL, SQLChunk, Value};

    /// Prepared statement support
    pub use lattice_core::prepared::{PreparedStatement, prepare_render};

    /// Table aliases of composed statements
    pub use lattice_core::alias::{AliasGenerator, ROOT_ALIAS};

    /// Filter trees to SQL
    pub use lattice_core::condition::{build_filter, build_sorts, verify_filters};

    #[doc(hidden)]
    pub use lattice_core::{
        lattice_trace_cache, lattice_trace_compose, lattice_trace_fault, lattice_trace_reject,
    };
}

// =============================================================================
// Prelude
// =============================================================================

/// Everything needed to describe a schema and run requests.
pub mod prelude {
    pub use crate::{Dialect, LogicalType, Result, error::LatticeError};

    pub use lattice_core::{
        DataService, Executor, PagedResponse, Row, Value,
        compose::{Composer, Fields, FormulaTranslator, ListArgs, NestedArgs},
        config::LatticeConfig,
        filter::{Filter, FilterCondition, FilterOp, LogicalOp, Sort, SortDirection},
        schema::{
            Column, ColumnMeta, ColumnOptions, FormulaOptions, JunctionOptions, LookupOptions,
            Model, RelationOptions, RollupFunction, RollupOptions, Schema, View,
        },
    };
}
