//! Correlated access to related rows.
//!
//! Every relation-shaped column (relations, lookups, rollups, link counts)
//! reads the related rows through [`related_source`]: a FROM clause over the
//! related model plus the condition tying it to the outer row.

use compact_str::CompactString;

use super::{ComposeCx, columns};
use crate::{
    builder::{Projection, SelectQuery, table},
    condition::{build_filter, order_terms},
    dialect::DialectAdapter,
    error::Result,
    schema::{Column, Relation},
    sql::SQL,
};

/// Related rows of one outer row.
pub(crate) struct RelatedSource {
    /// FROM clause, without the keyword
    pub from: SQL,
    /// Alias of the related model's table
    pub alias: CompactString,
    /// Condition correlating the related rows with the outer row
    pub correlation: SQL,
}

impl RelatedSource {
    /// `SELECT ... FROM <source> WHERE <correlation>`
    pub fn query(&self) -> SelectQuery {
        SelectQuery::from(self.from.clone()).filter(self.correlation.clone())
    }
}

fn equals(left: SQL, right: SQL) -> SQL {
    left.push_raw(" = ").append(right)
}

/// FROM clause and correlation for the rows related to the row at
/// `outer_alias`.
pub(crate) fn related_source<'s>(
    relation: &Relation<'s>,
    outer_alias: &str,
    cx: &mut ComposeCx<'s>,
) -> RelatedSource {
    let alias = cx.next_alias();
    let related = table(relation.related()).alias(alias.to_string());

    match *relation {
        Relation::HasMany { child, parent, .. } => RelatedSource {
            correlation: equals(
                SQL::qualified(&alias, &child.column_name),
                SQL::qualified(outer_alias, &parent.column_name),
            ),
            from: related,
            alias,
        },
        Relation::BelongsTo { child, parent, .. } => RelatedSource {
            correlation: equals(
                SQL::qualified(&alias, &parent.column_name),
                SQL::qualified(outer_alias, &child.column_name),
            ),
            from: related,
            alias,
        },
        Relation::ManyToMany {
            child,
            parent,
            junction,
            junction_child,
            junction_parent,
            ..
        } => {
            let link = cx.next_alias();
            let from = related
                .push_raw(" INNER JOIN ")
                .append(table(junction).alias(link.to_string()))
                .push_raw(" ON ")
                .append(equals(
                    SQL::qualified(&link, &junction_parent.column_name),
                    SQL::qualified(&alias, &parent.column_name),
                ));
            RelatedSource {
                correlation: equals(
                    SQL::qualified(&link, &junction_child.column_name),
                    SQL::qualified(outer_alias, &child.column_name),
                ),
                from,
                alias,
            }
        }
    }
}

/// `(SELECT COUNT(*) FROM <related> WHERE <correlation>)`
pub(crate) fn count_related<'s>(
    relation: &Relation<'s>,
    outer_alias: &str,
    cx: &mut ComposeCx<'s>,
) -> SQL {
    let source = related_source(relation, outer_alias, cx);
    source
        .query()
        .column(SQL::raw("COUNT(*)"))
        .to_sql(cx.adapter)
        .parens()
}

/// `[NOT] EXISTS (SELECT 1 FROM <related> WHERE <correlation> AND <condition>)`
///
/// `condition` receives the related table alias.
pub(crate) fn exists_related<'s>(
    relation: &Relation<'s>,
    outer_alias: &str,
    negate: bool,
    cx: &mut ComposeCx<'s>,
    condition: impl FnOnce(&str, &mut ComposeCx<'s>) -> Result<SQL>,
) -> Result<SQL> {
    let source = related_source(relation, outer_alias, cx);
    let condition = condition(&source.alias, cx)?;
    let subquery = source
        .query()
        .filter(condition)
        .column(SQL::raw("1"))
        .to_sql(cx.adapter)
        .parens();
    let keyword = if negate { "NOT EXISTS " } else { "EXISTS " };
    Ok(SQL::raw(keyword).append(subquery))
}

/// The related row's display value; the link count for many-valued
/// relations.
pub(crate) fn related_scalar<'s>(
    relation: &Relation<'s>,
    outer_alias: &str,
    cx: &mut ComposeCx<'s>,
) -> Result<SQL> {
    if relation.is_many() {
        return Ok(count_related(relation, outer_alias, cx));
    }
    let Some(display) = relation.related().primary_value() else {
        return Ok(count_related(relation, outer_alias, cx));
    };
    let source = related_source(relation, outer_alias, cx);
    let value = cx.handler(display)?.expr(display, &source.alias, cx)?;
    Ok(source.query().column(value).to_sql(cx.adapter).parens())
}

/// `SELECT <array of element> AS "v" FROM ...` over `query`, the elements in
/// `order`.
pub(crate) fn array_select(
    query: SelectQuery,
    element: SQL,
    order: Vec<SQL>,
    adapter: &dyn DialectAdapter,
) -> SQL {
    let windowed = !order.is_empty() && adapter.windowed_array_agg();
    let query = query.column(adapter.json_array_agg(element, order).alias("v"));
    if !windowed {
        return query.to_sql(adapter);
    }
    let first = query.limit(SQL::number(1)).to_sql(adapter).parens();
    SQL::raw("SELECT ")
        .append(SQL::func(
            "COALESCE",
            first.push_raw(", ").append(adapter.empty_json_array()),
        ))
        .alias("v")
}

/// Nested rows of a relation column, as JSON.
///
/// Belongs-to yields one object or NULL; has-many and many-to-many yield an
/// array, empty when nothing is linked. The rows are paged and filtered by
/// the nested arguments of the column, then projected with the same routine
/// as root rows. Arrays keep the order of the page.
pub(crate) fn select_relation<'s>(
    column: &'s Column,
    outer_alias: &str,
    cx: &mut ComposeCx<'s>,
) -> Result<Projection> {
    let relation = cx.relation(column)?;
    let related = relation.related();
    let nested = cx.nested_args(column);
    let adapter = cx.adapter;
    let source = related_source(&relation, outer_alias, cx);
    let alias = source.alias.clone();

    let mut rows = source
        .query()
        .column(SQL::ident(alias.to_string()).push_raw(".*"));
    if let Some(filter) = nested.and_then(|n| n.filter.as_ref()) {
        rows = rows.filter(build_filter(filter, related, &alias, cx)?);
    }
    let sorts = nested.map(|n| n.sorts.as_slice()).unwrap_or_default();
    rows = rows.order_by(order_terms(sorts, related, &alias, cx)?);

    if relation.is_many() {
        let limit = nested.and_then(|n| n.limit).unwrap_or(cx.nested_limit);
        rows = rows.limit(SQL::number(limit));
        if let Some(offset) = nested.and_then(|n| n.offset).filter(|o| *o > 0) {
            rows = rows.offset(SQL::number(offset));
        }
    } else {
        rows = rows.limit(SQL::number(1));
    }

    let fields = nested.map(|n| n.fields.clone()).unwrap_or_default();
    let (projections, joins) = cx.with_scope(nested.map(|n| &n.nested), |cx| {
        let columns = columns::nested_columns(related, &fields, cx);
        columns::compose_row(&alias, &columns, cx)
    })?;

    let object = adapter.json_object(
        projections
            .into_iter()
            .map(|p| {
                let value = if p.json { adapter.embed_json(p.expr) } else { p.expr };
                (p.title, value)
            })
            .collect(),
    );

    let outer = joins.into_iter().fold(
        SelectQuery::from(rows.to_sql(adapter).parens().alias(alias.to_string())),
        SelectQuery::join,
    );
    let subquery = if relation.is_many() {
        // the derived table's order does not carry over into every aggregate
        let order = order_terms(sorts, related, &alias, cx)?;
        array_select(outer, object, order, adapter)
    } else {
        outer.column(object.alias("v")).to_sql(adapter)
    };

    let lateral = cx.next_alias();
    Ok(match adapter.lateral_join(subquery.clone(), &lateral) {
        Some(join) => {
            Projection::json(column.title.clone(), SQL::qualified(&lateral, "v")).with_join(join)
        }
        None => Projection::json(column.title.clone(), subquery.parens()),
    })
}
