//! Lookup chains.
//!
//! A lookup column reads one column of the rows linked through a relation
//! column of its own model. The target may itself be a lookup, so values are
//! resolved recursively; the chain is checked for cycles before any SQL is
//! built.

use lattice_types::LogicalType;

use super::{
    ComposeCx,
    relation::{array_select, related_source},
};
use crate::{
    builder::SelectQuery,
    error::{LatticeError, Result},
    filter::SortDirection,
    schema::{Column, Model, Relation, Schema},
    sql::SQL,
};

/// One resolved step of a lookup chain.
pub(crate) struct LookupStep<'s> {
    /// Relation column in the lookup's own model
    pub relation_column: &'s Column,
    /// Column read in the related model
    pub target: &'s Column,
}

/// Resolve the relation column and target of one lookup column.
pub(crate) fn step<'s>(schema: &'s Schema, column: &'s Column) -> Result<LookupStep<'s>> {
    let options = column.lookup_options()?;
    let owner = schema.owner(column)?;
    let relation_column = schema.column(owner, &options.relation_column)?;
    let related_id = &relation_column.relation_options()?.related_model;
    let related: &Model = schema.model(related_id)?;
    let target = schema.column(related, &options.lookup_column)?;
    Ok(LookupStep {
        relation_column,
        target,
    })
}

/// Walk the chain starting at `column` and fail with
/// [`LatticeError::LookupCycle`] if it revisits a column.
///
/// Returns the terminal (non-lookup) column.
pub(crate) fn check_chain<'s>(schema: &'s Schema, column: &'s Column) -> Result<&'s Column> {
    let mut visited = vec![(column.model_id.as_str(), column.id.as_str())];
    let mut path = vec![column.title.clone()];
    let mut current = column;

    while current.logical_type == LogicalType::Lookup {
        let target = step(schema, current)?.target;
        path.push(target.title.clone());
        let key = (target.model_id.as_str(), target.id.as_str());
        if visited.contains(&key) {
            return Err(LatticeError::LookupCycle { path });
        }
        visited.push(key);
        current = target;
    }
    Ok(current)
}

/// Value of a lookup column for the row at `outer_alias`.
pub(crate) struct LookupValue {
    pub expr: SQL,
    /// More than one value per row: `expr` is a JSON array
    pub many: bool,
    /// `expr` is JSON
    pub json: bool,
}

/// Compose the value of a lookup column as a scalar subquery.
///
/// One-valued chains yield the target value; a many-valued hop aggregates
/// into a JSON array in primary key order of the linked rows, flattening
/// targets that are already arrays so the result stays one level deep.
pub(crate) fn lookup_value<'s>(
    column: &'s Column,
    outer_alias: &str,
    cx: &mut ComposeCx<'s>,
) -> Result<LookupValue> {
    check_chain(cx.schema, column)?;
    cx.derive(column, |cx| compose_lookup(column, outer_alias, cx))
}

fn compose_lookup<'s>(
    column: &'s Column,
    outer_alias: &str,
    cx: &mut ComposeCx<'s>,
) -> Result<LookupValue> {
    let LookupStep {
        relation_column,
        target,
    } = step(cx.schema, column)?;
    let relation = cx.relation(relation_column)?;
    let source = related_source(&relation, outer_alias, cx);
    let inner = target_value(target, &source.alias, cx)?;
    let adapter = cx.adapter;

    if !relation.is_many() {
        let query = with_joins(source.query(), inner.join).column(inner.value.expr);
        return Ok(LookupValue {
            expr: query.to_sql(adapter).parens(),
            many: inner.value.many,
            json: inner.value.json,
        });
    }

    // aggregate over a derived table; some backends reject subqueries
    // inside aggregate arguments
    let values = cx.next_alias();
    let mut rows = with_joins(source.query(), inner.join).column(inner.value.expr.alias("v"));
    let mut order = Vec::new();
    for (index, key) in relation.related().primary_keys().enumerate() {
        let name = format!("k{index}");
        rows = rows.column(SQL::qualified(&source.alias, &key.column_name).alias(name.clone()));
        order.push(SQL::qualified(&values, &name).push_raw(SortDirection::Asc.as_sql()));
    }
    let rows = rows.to_sql(adapter).parens().alias(values.to_string());
    let value = SQL::qualified(&values, "v");

    let expr = if inner.value.many {
        let element = cx.next_alias();
        let from = SelectQuery::from(rows.append(adapter.expand_json_array(value, &element)));
        array_select(from, adapter.json_element(&element), order, adapter)
    } else {
        let value = if inner.value.json { adapter.embed_json(value) } else { value };
        array_select(SelectQuery::from(rows), value, order, adapter)
    };

    Ok(LookupValue {
        expr: expr.parens(),
        many: true,
        json: true,
    })
}

struct TargetValue {
    value: LookupValue,
    join: Option<SQL>,
}

fn with_joins(query: SelectQuery, join: Option<SQL>) -> SelectQuery {
    match join {
        Some(join) => query.join(join),
        None => query,
    }
}

/// Value of the lookup target on the related row at `alias`.
fn target_value<'s>(target: &'s Column, alias: &str, cx: &mut ComposeCx<'s>) -> Result<TargetValue> {
    if target.logical_type == LogicalType::Lookup {
        return Ok(TargetValue {
            value: lookup_value(target, alias, cx)?,
            join: None,
        });
    }

    let many = match target.logical_type {
        LogicalType::LinkToAnotherRecord => cx.relation(target)?.is_many(),
        _ => false,
    };
    let handler = cx.handler(target)?;
    Ok(match handler.select(target, alias, cx)? {
        Some(projection) => TargetValue {
            value: LookupValue {
                expr: projection.expr,
                many,
                json: projection.json,
            },
            join: projection.join,
        },
        None => TargetValue {
            value: LookupValue {
                expr: SQL::raw("NULL"),
                many: false,
                json: false,
            },
            join: None,
        },
    })
}

/// Whether a lookup column can yield more than one value per row
pub(crate) fn is_many<'s>(schema: &'s Schema, column: &'s Column) -> Result<bool> {
    check_chain(schema, column)?;
    let mut current = column;
    loop {
        let LookupStep {
            relation_column,
            target,
        } = step(schema, current)?;
        if Relation::resolve(schema, relation_column)?.is_many() {
            return Ok(true);
        }
        match target.logical_type {
            LogicalType::Lookup => current = target,
            LogicalType::LinkToAnotherRecord => {
                return Ok(Relation::resolve(schema, target)?.is_many());
            }
            _ => return Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prepared::prepare_render;
    use crate::schema::{LookupOptions, RelationOptions};
    use lattice_types::Dialect;

    fn chain(cyclic: bool) -> Schema {
        let back = if cyclic { "a_lookup" } else { "a_name" };
        Schema::new()
            .with_model(
                Model::new("a", "A", "a")
                    .column(Column::new("a_id", "Id", "id", LogicalType::Id).primary_key())
                    .column(Column::new("a_name", "Name", "name", LogicalType::SingleLineText))
                    .column(Column::new("a_b", "B Id", "b_id", LogicalType::ForeignKey))
                    .column(
                        Column::new("a_rel", "B", "", LogicalType::LinkToAnotherRecord)
                            .with_options(RelationOptions::belongs_to("b", "a_b", "b_id")),
                    )
                    .column(
                        Column::new("a_lookup", "B Lookup", "", LogicalType::Lookup)
                            .with_options(LookupOptions::new("a_rel", "b_lookup")),
                    ),
            )
            .with_model(
                Model::new("b", "B", "b")
                    .column(Column::new("b_id", "Id", "id", LogicalType::Id).primary_key())
                    .column(Column::new("b_a", "A Id", "a_id", LogicalType::ForeignKey))
                    .column(
                        Column::new("b_rel", "A", "", LogicalType::LinkToAnotherRecord)
                            .with_options(RelationOptions::belongs_to("a", "b_a", "a_id")),
                    )
                    .column(
                        Column::new("b_lookup", "A Lookup", "", LogicalType::Lookup)
                            .with_options(LookupOptions::new("b_rel", back)),
                    ),
            )
    }

    #[test]
    fn detects_cycles_with_the_visited_path() {
        let schema = chain(true);
        let column = schema.model("a").unwrap().column_by_id("a_lookup").unwrap();
        let err = check_chain(&schema, column).err().unwrap();
        let LatticeError::LookupCycle { path } = err else {
            panic!("expected a cycle, got {err}");
        };
        assert_eq!(path, ["B Lookup", "A Lookup", "B Lookup"]);
    }

    #[test]
    fn resolves_the_terminal_column() {
        let schema = chain(false);
        let column = schema.model("a").unwrap().column_by_id("a_lookup").unwrap();
        assert_eq!(check_chain(&schema, column).unwrap().id, "a_name");
        assert!(!is_many(&schema, column).unwrap());
    }

    #[test]
    fn belongs_to_chain_is_a_nested_scalar() {
        let schema = chain(false);
        let column = schema.model("a").unwrap().column_by_id("a_lookup").unwrap();
        let mut cx = ComposeCx::new(&schema, Dialect::SQLite);
        let value = lookup_value(column, "a0", &mut cx).unwrap();
        assert!(!value.many);
        assert_eq!(
            prepare_render(value.expr, cx.adapter).sql(),
            r#"(SELECT (SELECT "a2"."name" FROM "a" AS "a2" WHERE "a2"."id" = "a1"."a_id") FROM "b" AS "a1" WHERE "a1"."id" = "a0"."b_id")"#
        );
    }
}
