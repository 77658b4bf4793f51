//! Shared type definitions for lattice
//!
//! This crate provides the small, dependency-free vocabulary used across the
//! lattice crates:
//!
//! - [`Dialect`] - Database dialect enum (SQLite, PostgreSQL, MySQL, SQL Server)
//! - [`LogicalType`] - The abstract column type, independent of physical storage
//!
//! # Features
//!
//! - `serde` - Enable serde serialization/deserialization

mod dialect;
mod logical;

pub use dialect::{Dialect, DialectParseError};
pub use logical::{LogicalType, LogicalTypeParseError};

/// Prelude module for commonly used types
pub mod prelude {
    pub use crate::{Dialect, LogicalType};
}
