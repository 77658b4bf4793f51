use hashbrown::HashMap;
use serde::{Deserialize, Deserializer};

use crate::{
    config::PaginationConfig,
    filter::{Filter, Sort},
};

/// Per-request arguments of a list query.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListArgs {
    /// Column ids or titles to return; `None` returns the view's columns
    pub fields: Option<Vec<String>>,
    pub filter: Option<Filter>,
    /// Additional filter tree, ANDed with `filter`
    #[serde(rename = "where")]
    pub r#where: Option<Filter>,
    pub sorts: Vec<Sort>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    /// Arguments for relation columns, keyed by column title or id
    pub nested: HashMap<String, NestedArgs>,
}

impl ListArgs {
    /// Clamp the page bounds to the configured range.
    pub fn normalize(&mut self, config: &PaginationConfig) {
        let limit = self.limit.unwrap_or(config.default_limit);
        // max wins over an inverted range
        self.limit = Some(limit.max(config.min_limit).min(config.max_limit));
        self.offset = Some(self.offset.unwrap_or(0));
    }

    /// Whether the composed statement depends only on model and view.
    ///
    /// Page bounds are bound per request, so they do not change the shape.
    pub fn is_cacheable(&self) -> bool {
        self.fields.is_none()
            && self.filter.is_none()
            && self.r#where.is_none()
            && self.sorts.is_empty()
            && self.nested.is_empty()
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
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

    pub fn fields(mut self, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn nested(mut self, column: impl Into<String>, args: NestedArgs) -> Self {
        self.nested.insert(column.into(), args);
        self
    }
}

/// Arguments for the rows of one relation column.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NestedArgs {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub filter: Option<Filter>,
    pub sorts: Vec<Sort>,
    pub fields: Fields,
    /// Arguments for relation columns of the related model
    pub nested: HashMap<String, NestedArgs>,
}

impl NestedArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
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

    pub fn fields(mut self, fields: Fields) -> Self {
        self.fields = fields;
        self
    }

    pub fn nested(mut self, column: impl Into<String>, args: NestedArgs) -> Self {
        self.nested.insert(column.into(), args);
        self
    }
}

/// Column selection of nested rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Fields {
    /// Primary key and primary value
    #[default]
    Default,
    /// Every column (`*`)
    All,
    /// Named columns, by id or title
    Only(Vec<String>),
}

impl Fields {
    pub fn only(columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Fields::Only(columns.into_iter().map(Into::into).collect())
    }
}

impl<'de> Deserialize<'de> for Fields {
    /// Accepts `"*"`, a comma-separated string or a list of names
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            List(Vec<String>),
        }

        let names = match Raw::deserialize(deserializer)? {
            Raw::Text(text) if text.trim() == "*" => return Ok(Fields::All),
            Raw::Text(text) => text.split(',').map(|s| s.trim().to_string()).collect(),
            Raw::List(list) if list.iter().any(|s| s == "*") => return Ok(Fields::All),
            Raw::List(list) => list,
        };
        let names: Vec<String> = names.into_iter().filter(|s| !s.is_empty()).collect();
        if names.is_empty() {
            Ok(Fields::Default)
        } else {
            Ok(Fields::Only(names))
        }
    }
}
