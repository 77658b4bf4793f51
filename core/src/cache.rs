//! Prepared-query cache.
//!
//! Composed statements only depend on the schema, the view and the request
//! shape, never on the page bounds or key values, which stay named
//! placeholders. A statement composed once can therefore be replayed for
//! every page of the same list.

use std::{
    fmt,
    sync::{Arc, PoisonError, RwLock},
};

use hashbrown::HashMap;

use crate::prepared::PreparedStatement;

/// Which statement of a request an entry holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    List,
    Count,
    Read,
}

impl StatementKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Count => "count",
            Self::Read => "read",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub model_id: String,
    pub view_id: Option<String>,
    pub kind: StatementKind,
}

impl CacheKey {
    pub fn new(model_id: &str, view_id: Option<&str>, kind: StatementKind) -> Self {
        Self {
            model_id: model_id.to_string(),
            view_id: view_id.map(str::to_string),
            kind,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.model_id,
            self.view_id.as_deref().unwrap_or("-"),
            self.kind.as_str()
        )
    }
}

/// Thread-safe map of composed statements.
///
/// Concurrent misses for the same key may both compose; the last insert
/// wins, and both statements are equivalent.
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: RwLock<HashMap<CacheKey, Arc<PreparedStatement>>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<PreparedStatement>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let hit = entries.get(key).cloned();
        if hit.is_some() {
            crate::lattice_trace_cache!("hit", key);
        } else {
            crate::lattice_trace_cache!("miss", key);
        }
        hit
    }

    pub fn insert(&self, key: CacheKey, statement: PreparedStatement) -> Arc<PreparedStatement> {
        let statement = Arc::new(statement);
        crate::lattice_trace_cache!("insert", key);
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, Arc::clone(&statement));
        statement
    }

    /// Drop every statement of one model, after its metadata changed
    pub fn invalidate_model(&self, model_id: &str) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|key, _| key.model_id != model_id);
        let removed = before - entries.len();
        crate::lattice_trace_cache!("invalidate", model_id);
        removed
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
