use serde::Deserialize;

use super::Column;

/// A table with ordered, title-unique columns.
#[derive(Debug, Clone, Deserialize)]
pub struct Model {
    pub id: String,
    pub title: String,
    pub table_name: String,
    #[serde(default)]
    pub schema_name: Option<String>,
    pub columns: Vec<Column>,
}

impl Model {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        table_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            table_name: table_name.into(),
            schema_name: None,
            columns: Vec::new(),
        }
    }

    pub fn in_schema(mut self, schema_name: impl Into<String>) -> Self {
        self.schema_name = Some(schema_name.into());
        self
    }

    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Find a column by id
    pub fn column_by_id(&self, id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }

    /// Find a column by id, falling back to its title
    pub fn find_column(&self, key: &str) -> Option<&Column> {
        self.column_by_id(key)
            .or_else(|| self.columns.iter().find(|c| c.title == key))
    }

    pub fn primary_keys(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.is_primary_key)
    }

    /// The first primary key column
    pub fn primary_key(&self) -> Option<&Column> {
        self.primary_keys().next()
    }

    /// The display column; defaults to the first non-key physical column
    pub fn primary_value(&self) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.is_primary_value)
            .or_else(|| {
                self.columns
                    .iter()
                    .find(|c| !c.is_primary_key && !c.is_virtual())
            })
    }
}
