use serde::Deserialize;

use super::{Column, Model, Schema};
use crate::error::{LatticeError, Result};

/// Cardinality of a relation column, seen from the model that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// One parent row, many related child rows
    HasMany,
    /// Many child rows pointing at one related parent row
    BelongsTo,
    /// Rows on both sides linked through a junction model
    ManyToMany,
}

/// Stored definition of a relation column.
///
/// Column ids follow the foreign key direction:
/// - `HasMany`: `child_column` lives in the related model, `parent_column` in
///   the owning model.
/// - `BelongsTo`: `child_column` lives in the owning model, `parent_column` in
///   the related model.
/// - `ManyToMany`: `child_column` lives in the owning model, `parent_column`
///   in the related model, and the junction holds a column referencing each.
#[derive(Debug, Clone, Deserialize)]
pub struct RelationOptions {
    pub kind: RelationKind,
    pub related_model: String,
    pub child_column: String,
    pub parent_column: String,
    #[serde(default)]
    pub junction: Option<JunctionOptions>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JunctionOptions {
    pub model: String,
    /// Junction column referencing the owning model's `child_column`
    pub child_column: String,
    /// Junction column referencing the related model's `parent_column`
    pub parent_column: String,
}

impl RelationOptions {
    pub fn has_many(
        related_model: impl Into<String>,
        child_column: impl Into<String>,
        parent_column: impl Into<String>,
    ) -> Self {
        Self {
            kind: RelationKind::HasMany,
            related_model: related_model.into(),
            child_column: child_column.into(),
            parent_column: parent_column.into(),
            junction: None,
        }
    }

    pub fn belongs_to(
        related_model: impl Into<String>,
        child_column: impl Into<String>,
        parent_column: impl Into<String>,
    ) -> Self {
        Self {
            kind: RelationKind::BelongsTo,
            ..Self::has_many(related_model, child_column, parent_column)
        }
    }

    pub fn many_to_many(
        related_model: impl Into<String>,
        child_column: impl Into<String>,
        parent_column: impl Into<String>,
        junction: JunctionOptions,
    ) -> Self {
        Self {
            kind: RelationKind::ManyToMany,
            junction: Some(junction),
            ..Self::has_many(related_model, child_column, parent_column)
        }
    }
}

/// A relation with every model and join column resolved.
#[derive(Debug, Clone, Copy)]
pub enum Relation<'s> {
    HasMany {
        related: &'s Model,
        /// Foreign key in the related model
        child: &'s Column,
        /// Referenced key in the owning model
        parent: &'s Column,
    },
    BelongsTo {
        related: &'s Model,
        /// Foreign key in the owning model
        child: &'s Column,
        /// Referenced key in the related model
        parent: &'s Column,
    },
    ManyToMany {
        related: &'s Model,
        /// Key in the owning model
        child: &'s Column,
        /// Key in the related model
        parent: &'s Column,
        junction: &'s Model,
        junction_child: &'s Column,
        junction_parent: &'s Column,
    },
}

impl<'s> Relation<'s> {
    /// Resolve a relation column's options against the schema.
    pub fn resolve(schema: &'s Schema, column: &'s Column) -> Result<Self> {
        let options = column.relation_options()?;
        let owner = schema.model(&column.model_id)?;
        let related = schema.model(&options.related_model)?;

        let find = |model: &'s Model, id: &str| {
            model.column_by_id(id).ok_or_else(|| {
                LatticeError::invalid_relation(
                    &column.title,
                    format!("column '{id}' not found in '{}'", model.title),
                )
            })
        };

        Ok(match options.kind {
            RelationKind::HasMany => Relation::HasMany {
                related,
                child: find(related, &options.child_column)?,
                parent: find(owner, &options.parent_column)?,
            },
            RelationKind::BelongsTo => Relation::BelongsTo {
                related,
                child: find(owner, &options.child_column)?,
                parent: find(related, &options.parent_column)?,
            },
            RelationKind::ManyToMany => {
                let junction_options = options.junction.as_ref().ok_or_else(|| {
                    LatticeError::invalid_relation(&column.title, "many-to-many without junction")
                })?;
                let junction = schema.model(&junction_options.model)?;
                Relation::ManyToMany {
                    related,
                    child: find(owner, &options.child_column)?,
                    parent: find(related, &options.parent_column)?,
                    junction,
                    junction_child: find(junction, &junction_options.child_column)?,
                    junction_parent: find(junction, &junction_options.parent_column)?,
                }
            }
        })
    }

    pub fn related(&self) -> &'s Model {
        match self {
            Relation::HasMany { related, .. }
            | Relation::BelongsTo { related, .. }
            | Relation::ManyToMany { related, .. } => *related,
        }
    }

    /// Whether the relation can yield more than one related row
    pub fn is_many(&self) -> bool {
        !matches!(self, Relation::BelongsTo { .. })
    }
}

impl Column {
    pub fn relation_options(&self) -> Result<&RelationOptions> {
        match &self.options {
            super::ColumnOptions::Relation(options) => Ok(options),
            _ => Err(LatticeError::MissingColumnOptions {
                field: self.title.clone(),
                expected: "relation",
            }),
        }
    }
}
