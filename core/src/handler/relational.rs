//! Link-to-another-record columns.
//!
//! Relations have no storage of their own. Selecting one nests the related
//! rows as JSON; filtering one becomes an `EXISTS` test against the related
//! model's display column.

use lattice_types::Dialect;

use super::{FieldHandler, decode_json_text, map_record, unsupported};
use crate::{
    builder::Projection,
    compose::{ComposeCx, relation},
    error::Result,
    filter::{FilterCondition, FilterOp},
    registry,
    schema::{Column, Relation, Schema},
    sql::SQL,
    value::Value,
};

const RELATION_OPS: &[FilterOp] = &[
    FilterOp::Eq,
    FilterOp::Neq,
    FilterOp::Like,
    FilterOp::NotLike,
    FilterOp::Blank,
    FilterOp::NotBlank,
    FilterOp::Is,
    FilterOp::IsNot,
    FilterOp::Gt,
    FilterOp::Lt,
    FilterOp::Gte,
    FilterOp::Lte,
    FilterOp::In,
];

pub struct RelationHandler {
    dialect: Dialect,
}

impl RelationHandler {
    pub const fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    /// Display column of the related model, with its handler
    fn display<'s>(
        &self,
        op: FilterOp,
        column: &'s Column,
        schema: &'s Schema,
    ) -> Result<(&'s Column, &'static dyn FieldHandler)> {
        let related = Relation::resolve(schema, column)?.related();
        let display = related
            .primary_value()
            .ok_or_else(|| unsupported(op, column))?;
        Ok((display, registry::resolve(display.logical_type, self.dialect)?))
    }
}

impl FieldHandler for RelationHandler {
    fn name(&self) -> &'static str {
        "relation"
    }

    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn supported_ops(&self) -> &'static [FilterOp] {
        RELATION_OPS
    }

    fn verify_filter(&self, op: FilterOp, column: &Column, schema: &Schema) -> Result<()> {
        if !RELATION_OPS.contains(&op) {
            return Err(unsupported(op, column));
        }
        if matches!(op, FilterOp::Blank | FilterOp::NotBlank) {
            return Relation::resolve(schema, column).map(|_| ());
        }
        let (display, handler) = self.display(op, column, schema)?;
        handler.verify_filter(op, display, schema)
    }

    fn coerce_filter_value(
        &self,
        op: FilterOp,
        value: &Value,
        column: &Column,
        schema: &Schema,
    ) -> Result<Value> {
        if op.is_unary() {
            return Ok(Value::Null);
        }
        let (display, handler) = self.display(op, column, schema)?;
        handler.coerce_filter_value(op, value, display, schema)
    }

    fn expr<'s>(&self, column: &'s Column, alias: &str, cx: &mut ComposeCx<'s>) -> Result<SQL> {
        let relation = cx.relation(column)?;
        relation::related_scalar(&relation, alias, cx)
    }

    fn select<'s>(
        &self,
        column: &'s Column,
        alias: &str,
        cx: &mut ComposeCx<'s>,
    ) -> Result<Option<Projection>> {
        relation::select_relation(column, alias, cx).map(Some)
    }

    fn filter<'s>(
        &self,
        condition: &FilterCondition,
        column: &'s Column,
        alias: &str,
        cx: &mut ComposeCx<'s>,
    ) -> Result<SQL> {
        let relation = cx.relation(column)?;
        match condition.op {
            FilterOp::Blank => {
                return relation::exists_related(&relation, alias, true, cx, |_, _| {
                    Ok(SQL::empty())
                });
            }
            FilterOp::NotBlank => {
                return relation::exists_related(&relation, alias, false, cx, |_, _| {
                    Ok(SQL::empty())
                });
            }
            _ => {}
        }

        let (display, handler) = self.display(condition.op, column, cx.schema)?;
        // negative operators hold when no linked row matches the positive one
        let (op, negate) = match condition.op.negated() {
            Some(positive) => (positive, true),
            None => (condition.op, false),
        };
        let positive = FilterCondition {
            column: display.id.clone(),
            op,
            value: condition.value.clone(),
        };
        relation::exists_related(&relation, alias, negate, cx, |related, cx| {
            handler.filter(&positive, display, related, cx)
        })
    }

    fn parse_user_input(&self, value: Value, _column: &Column) -> Result<Value> {
        Ok(value)
    }

    fn parse_db_value(
        &self,
        value: serde_json::Value,
        column: &Column,
        schema: &Schema,
    ) -> serde_json::Value {
        let value = decode_json_text(value);
        let Ok(related) = Relation::resolve(schema, column).map(|r| r.related()) else {
            return value;
        };
        let mut record = |item: serde_json::Value| match item {
            serde_json::Value::Object(mut map) => {
                map_record(related, &mut map, schema, self.dialect);
                serde_json::Value::Object(map)
            }
            other => other,
        };
        match value {
            serde_json::Value::Array(items) => items.into_iter().map(&mut record).collect(),
            other => record(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prepared::prepare_render;
    use crate::schema::{Model, RelationOptions};
    use lattice_types::LogicalType;

    fn schema() -> Schema {
        Schema::new()
            .with_model(
                Model::new("c", "Country", "countries")
                    .column(Column::new("c_id", "Id", "id", LogicalType::Id).primary_key())
                    .column(
                        Column::new("c_name", "Name", "name", LogicalType::SingleLineText)
                            .primary_value(),
                    )
                    .column(
                        Column::new("c_cities", "Cities", "", LogicalType::LinkToAnotherRecord)
                            .with_options(RelationOptions::has_many("city", "city_country", "c_id")),
                    ),
            )
            .with_model(
                Model::new("city", "City", "cities")
                    .column(Column::new("city_id", "Id", "id", LogicalType::Id).primary_key())
                    .column(
                        Column::new("city_name", "Name", "name", LogicalType::SingleLineText)
                            .primary_value(),
                    )
                    .column(Column::new(
                        "city_country",
                        "Country Id",
                        "country_id",
                        LogicalType::ForeignKey,
                    )),
            )
    }

    fn render(op: FilterOp, value: impl Into<Value>) -> String {
        let schema = schema();
        let column = schema.model("c").unwrap().column_by_id("c_cities").unwrap();
        let mut cx = ComposeCx::new(&schema, Dialect::SQLite);
        let condition = FilterCondition {
            column: column.id.clone(),
            op,
            value: value.into(),
        };
        let sql = RelationHandler::new(Dialect::SQLite)
            .filter(&condition, column, "a0", &mut cx)
            .unwrap();
        prepare_render(sql, cx.adapter).sql().to_string()
    }

    #[test]
    fn blank_means_nothing_linked() {
        assert_eq!(
            render(FilterOp::Blank, Value::Null),
            r#"NOT EXISTS (SELECT 1 FROM "cities" AS "a1" WHERE "a1"."country_id" = "a0"."id")"#
        );
    }

    #[test]
    fn negative_ops_reject_any_matching_row() {
        assert_eq!(
            render(FilterOp::NotLike, "ber"),
            r#"NOT EXISTS (SELECT 1 FROM "cities" AS "a1" WHERE "a1"."country_id" = "a0"."id" AND "a1"."name" LIKE ?)"#
        );
        assert!(render(FilterOp::Eq, "Bern").starts_with("EXISTS (SELECT 1"));
    }

    #[test]
    fn verification_follows_the_display_column() {
        let schema = schema();
        let column = schema.model("c").unwrap().column_by_id("c_cities").unwrap();
        let handler = RelationHandler::new(Dialect::SQLite);
        assert!(handler.verify_filter(FilterOp::Like, column, &schema).is_ok());
        assert!(handler.verify_filter(FilterOp::Gt, column, &schema).is_err());
        assert!(handler.verify_filter(FilterOp::Checked, column, &schema).is_err());
    }

    #[test]
    fn nested_rows_are_decoded() {
        let schema = schema();
        let column = schema.model("c").unwrap().column_by_id("c_cities").unwrap();
        let value = RelationHandler::new(Dialect::SQLite).parse_db_value(
            serde_json::json!(r#"[{"Id":1,"Name":"Bern"}]"#),
            column,
            &schema,
        );
        assert_eq!(value, serde_json::json!([{"Id": 1, "Name": "Bern"}]));
    }
}
