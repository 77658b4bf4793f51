use serde::Deserialize;

use crate::filter::{Filter, Sort};

/// A saved view over a model: visible columns plus its own filters and sorts.
///
/// View filters and sorts are part of the cached statement shape.
#[derive(Debug, Clone, Deserialize)]
pub struct View {
    pub id: String,
    pub model_id: String,
    /// Column ids or titles; empty shows every column
    #[serde(default)]
    pub visible_columns: Vec<String>,
    #[serde(default)]
    pub filter: Option<Filter>,
    #[serde(default)]
    pub sorts: Vec<Sort>,
}

impl View {
    pub fn new(id: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            model_id: model_id.into(),
            visible_columns: Vec::new(),
            filter: None,
            sorts: Vec::new(),
        }
    }

    pub fn show(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.visible_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn sort(mut self, sort: Sort) -> Self {
        self.sorts.push(sort);
        self
    }
}
