//! Filter and sort trees to SQL.
//!
//! Groups render as parenthesized AND/OR scopes in the order given, so the
//! structure of the tree survives into the statement. Leaves dispatch to the
//! handler of their column.

use lattice_types::Dialect;

use crate::{
    compose::ComposeCx,
    error::{LatticeError, Result},
    filter::{Filter, FilterCondition, Sort, SortDirection},
    registry,
    schema::{Model, Schema},
    sql::SQL,
};

/// Render a filter tree over the row at `alias`.
///
/// Empty groups render as an empty fragment, which query builders skip.
pub fn build_filter<'s>(
    filter: &Filter,
    model: &'s Model,
    alias: &str,
    cx: &mut ComposeCx<'s>,
) -> Result<SQL> {
    match filter {
        Filter::Leaf(condition) => build_condition(condition, model, alias, cx),
        Filter::Group { logical, children } => {
            let mut parts = Vec::with_capacity(children.len());
            for child in children {
                let part = build_filter(child, model, alias, cx)?;
                if !part.is_empty() {
                    parts.push(part);
                }
            }
            if parts.is_empty() {
                return Ok(SQL::empty());
            }
            Ok(SQL::join(parts, logical.separator()).parens())
        }
    }
}

fn build_condition<'s>(
    condition: &FilterCondition,
    model: &'s Model,
    alias: &str,
    cx: &mut ComposeCx<'s>,
) -> Result<SQL> {
    let column = cx.schema.column(model, &condition.column)?;
    let handler = cx.handler(column)?;
    handler.verify_filter(condition.op, column, cx.schema)?;
    handler.filter(condition, column, alias, cx)
}

/// ORDER BY terms for `sorts`, in order.
pub fn build_sorts<'s>(
    sorts: &[Sort],
    model: &'s Model,
    alias: &str,
    cx: &mut ComposeCx<'s>,
) -> Result<Vec<SQL>> {
    sorts
        .iter()
        .map(|sort| {
            let column = cx.schema.column(model, &sort.column)?;
            cx.handler(column)?.sort(sort.direction, column, alias, cx)
        })
        .collect()
}

/// Sort terms followed by the primary key, so pages are stable.
pub fn order_terms<'s>(
    sorts: &[Sort],
    model: &'s Model,
    alias: &str,
    cx: &mut ComposeCx<'s>,
) -> Result<Vec<SQL>> {
    let mut terms = build_sorts(sorts, model, alias, cx)?;
    for key in model.primary_keys() {
        let sorted = sorts
            .iter()
            .any(|sort| sort.column == key.id || sort.column == key.title);
        if !sorted {
            terms.push(
                SQL::qualified(alias, &key.column_name).push_raw(SortDirection::Asc.as_sql()),
            );
        }
    }
    Ok(terms)
}

/// Check every leaf of `filters` against its column's handler.
///
/// All problems are collected before failing: one error is returned as is,
/// several as [`LatticeError::FilterVerification`].
pub fn verify_filters<'f>(
    filters: impl IntoIterator<Item = &'f Filter>,
    model: &Model,
    schema: &Schema,
    dialect: Dialect,
) -> Result<()> {
    let mut errors = Vec::new();
    for filter in filters {
        collect_errors(filter, model, schema, dialect, &mut errors);
    }

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(LatticeError::FilterVerification(errors)),
    }
}

fn collect_errors(
    filter: &Filter,
    model: &Model,
    schema: &Schema,
    dialect: Dialect,
    errors: &mut Vec<LatticeError>,
) {
    match filter {
        Filter::Group { children, .. } => {
            for child in children {
                collect_errors(child, model, schema, dialect, errors);
            }
        }
        Filter::Leaf(condition) => {
            if let Err(err) = verify_condition(condition, model, schema, dialect) {
                errors.push(err);
            }
        }
    }
}

fn verify_condition(
    condition: &FilterCondition,
    model: &Model,
    schema: &Schema,
    dialect: Dialect,
) -> Result<()> {
    let column = schema.column(model, &condition.column)?;
    let handler = registry::resolve(column.logical_type, dialect)?;
    handler.verify_filter(condition.op, column, schema)?;
    handler.coerce_filter_value(condition.op, &condition.value, column, schema)?;
    Ok(())
}
