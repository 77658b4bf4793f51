pub mod alias;
pub mod builder;
pub mod cache;
pub mod compose;
pub mod condition;
pub mod config;
pub mod dialect;
pub mod error;
pub mod filter;
pub mod handler;
pub mod param;
pub mod placeholder;
pub mod prepared;
pub mod registry;
pub mod schema;
pub mod service;
pub mod sql;
pub mod tracing;
pub mod value;

// Re-export key types and traits
pub use compose::{ComposedList, Composer, ListArgs, NestedArgs};
pub use config::LatticeConfig;
pub use error::{LatticeError, Result};
pub use filter::{Filter, FilterCondition, FilterOp, Sort, SortDirection};
pub use handler::FieldHandler;
pub use param::{Param, ParamBind};
pub use placeholder::Placeholder;
pub use prepared::{PreparedStatement, prepare_render};
pub use service::{DataService, Executor, PagedResponse, Row};
pub use sql::{SQL, SQLChunk};
pub use value::Value;

pub use lattice_types::{Dialect, LogicalType};
