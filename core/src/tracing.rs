//! Tracing utilities for composition and cache observability.
//!
//! Enable the `tracing` feature to emit spans and events via the `tracing` crate.
//! These macros no-op when the feature is disabled, avoiding `#[cfg]` boilerplate
//! at every call site.

/// Emit a debug-level event after a statement has been composed.
///
/// ```ignore
/// lattice_trace_compose!(model.title, dialect, sql.len(), params.len());
/// ```
#[macro_export]
macro_rules! lattice_trace_compose {
    ($model:expr, $dialect:expr, $sql_len:expr, $param_count:expr) => {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            model = %$model,
            dialect = %$dialect,
            sql_len = $sql_len,
            params = $param_count,
            "lattice.compose"
        );
    };
}

/// Emit a trace-level event for prepared-query cache activity.
///
/// ```ignore
/// lattice_trace_cache!("hit", &key);
/// ```
#[macro_export]
macro_rules! lattice_trace_cache {
    ($event:literal, $key:expr) => {
        #[cfg(feature = "tracing")]
        tracing::trace!(event = $event, key = %$key, "lattice.cache");
    };
}

/// Emit a debug-level event when a request is rejected by validation.
///
/// Validation failures are the caller's fault, so they never log above debug.
#[macro_export]
macro_rules! lattice_trace_reject {
    ($err:expr) => {
        #[cfg(feature = "tracing")]
        tracing::debug!(error = %$err, "lattice.reject");
    };
}

/// Emit a warn-level event for composition faults (bad metadata, cycles).
#[macro_export]
macro_rules! lattice_trace_fault {
    ($err:expr) => {
        #[cfg(feature = "tracing")]
        tracing::warn!(error = %$err, "lattice.fault");
    };
}
