use lattice_types::LogicalType;

use super::{ComposeCx, Fields};
use crate::{
    builder::Projection,
    error::Result,
    schema::{Column, Model},
    sql::SQL,
};

/// Columns of one row: every primary key once, first, then the allowed
/// non-key columns in model order.
pub(crate) fn extract_columns<'s>(
    model: &'s Model,
    allowed: impl Fn(&Column) -> bool,
) -> Vec<&'s Column> {
    model
        .primary_keys()
        .chain(
            model
                .columns
                .iter()
                .filter(|column| !column.is_primary_key && allowed(column)),
        )
        .collect()
}

/// Columns of a nested row.
///
/// `*` leaves out relation columns that the request does not name, so two
/// models linking each other do not expand forever.
pub(crate) fn nested_columns<'s>(
    model: &'s Model,
    fields: &Fields,
    cx: &ComposeCx<'s>,
) -> Vec<&'s Column> {
    match fields {
        Fields::Default => {
            let primary_value = model.primary_value().map(|c| c.id.as_str());
            extract_columns(model, |column| Some(column.id.as_str()) == primary_value)
        }
        Fields::All => extract_columns(model, |column| {
            column.logical_type != LogicalType::LinkToAnotherRecord
                || cx.nested_args(column).is_some()
        }),
        Fields::Only(names) => extract_columns(model, |column| {
            names
                .iter()
                .any(|name| *name == column.id || *name == column.title)
        }),
    }
}

/// Project `columns` of the row at `alias`.
///
/// Returns the projections and the lateral joins they need in the FROM
/// clause, in column order.
pub(crate) fn compose_row<'s>(
    alias: &str,
    columns: &[&'s Column],
    cx: &mut ComposeCx<'s>,
) -> Result<(Vec<Projection>, Vec<SQL>)> {
    let mut projections = Vec::with_capacity(columns.len());
    let mut joins = Vec::new();

    for &column in columns {
        let handler = cx.handler(column)?;
        let Some(mut projection) = handler.select(column, alias, cx)? else {
            continue;
        };
        if let Some(join) = projection.join.take() {
            joins.push(join);
        }
        projections.push(projection);
    }

    Ok((projections, joins))
}
