//! Schema arena.
//!
//! Models, columns and views are addressed by stable string ids. Relation and
//! lookup resolution are plain id lookups against the arena.

mod column;
mod model;
mod relation;
mod view;

pub use column::*;
pub use model::*;
pub use relation::*;
pub use view::*;

use hashbrown::HashMap;
use serde::Deserialize;

use crate::error::{LatticeError, Result};

/// Lookup column definition: a relation column of the owning model plus the
/// column to read in the related model.
#[derive(Debug, Clone, Deserialize)]
pub struct LookupOptions {
    pub relation_column: String,
    pub lookup_column: String,
}

impl LookupOptions {
    pub fn new(relation_column: impl Into<String>, lookup_column: impl Into<String>) -> Self {
        Self {
            relation_column: relation_column.into(),
            lookup_column: lookup_column.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RollupFunction {
    Count,
    Sum,
    Avg,
    Min,
    Max,
    CountDistinct,
    SumDistinct,
    AvgDistinct,
}

impl RollupFunction {
    /// SQL aggregate name and whether it applies to distinct values
    pub const fn aggregate(self) -> (&'static str, bool) {
        match self {
            Self::Count => ("COUNT", false),
            Self::Sum => ("SUM", false),
            Self::Avg => ("AVG", false),
            Self::Min => ("MIN", false),
            Self::Max => ("MAX", false),
            Self::CountDistinct => ("COUNT", true),
            Self::SumDistinct => ("SUM", true),
            Self::AvgDistinct => ("AVG", true),
        }
    }
}

/// Rollup column definition: aggregate a column of the related rows.
#[derive(Debug, Clone, Deserialize)]
pub struct RollupOptions {
    pub relation_column: String,
    pub rollup_column: String,
    pub function: RollupFunction,
}

impl RollupOptions {
    pub fn new(
        relation_column: impl Into<String>,
        rollup_column: impl Into<String>,
        function: RollupFunction,
    ) -> Self {
        Self {
            relation_column: relation_column.into(),
            rollup_column: rollup_column.into(),
            function,
        }
    }
}

/// Formula column definition.
#[derive(Debug, Clone, Deserialize)]
pub struct FormulaOptions {
    pub formula: String,
    /// Set by the metadata layer when the formula failed to parse; errored
    /// formulas are left out of the projection.
    #[serde(default)]
    pub error: Option<String>,
}

impl FormulaOptions {
    pub fn new(formula: impl Into<String>) -> Self {
        Self {
            formula: formula.into(),
            error: None,
        }
    }
}

impl Column {
    pub fn lookup_options(&self) -> Result<&LookupOptions> {
        match &self.options {
            ColumnOptions::Lookup(options) => Ok(options),
            _ => Err(self.missing_options("lookup")),
        }
    }

    pub fn rollup_options(&self) -> Result<&RollupOptions> {
        match &self.options {
            ColumnOptions::Rollup(options) => Ok(options),
            _ => Err(self.missing_options("rollup")),
        }
    }

    pub fn formula_options(&self) -> Result<&FormulaOptions> {
        match &self.options {
            ColumnOptions::Formula(options) => Ok(options),
            _ => Err(self.missing_options("formula")),
        }
    }

    fn missing_options(&self, expected: &'static str) -> LatticeError {
        LatticeError::MissingColumnOptions {
            field: self.title.clone(),
            expected,
        }
    }
}

/// Resolved models and views of one base.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    models: HashMap<String, Model>,
    views: HashMap<String, View>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a model, stamping each column with the owning model id
    pub fn add_model(&mut self, mut model: Model) -> &mut Self {
        for column in &mut model.columns {
            column.model_id = model.id.clone();
        }
        self.models.insert(model.id.clone(), model);
        self
    }

    pub fn add_view(&mut self, view: View) -> &mut Self {
        self.views.insert(view.id.clone(), view);
        self
    }

    pub fn with_model(mut self, model: Model) -> Self {
        self.add_model(model);
        self
    }

    pub fn with_view(mut self, view: View) -> Self {
        self.add_view(view);
        self
    }

    pub fn model(&self, id: &str) -> Result<&Model> {
        self.models
            .get(id)
            .ok_or_else(|| LatticeError::UnknownModel(id.to_string()))
    }

    pub fn view(&self, id: &str) -> Option<&View> {
        self.views.get(id)
    }

    /// The model that owns `column`
    pub fn owner(&self, column: &Column) -> Result<&Model> {
        self.model(&column.model_id)
    }

    /// Resolve a column id (or title) within a model
    pub fn column<'s>(&'s self, model: &'s Model, key: &str) -> Result<&'s Column> {
        model
            .find_column(key)
            .ok_or_else(|| LatticeError::UnknownColumn(key.to_string()))
    }
}
