//! Virtual columns whose value is derived from other columns: lookups,
//! rollups, link counts, formulas and barcodes.
//!
//! None of them can be written. Filters compare the derived expression,
//! except lookups, which test the linked rows with `EXISTS`.

use lattice_types::{Dialect, LogicalType};

use super::{
    FieldHandler, Generic, TypeFamily, coerce_with, compare, decode_json_text,
    numeric::{NUMERIC_OPS, decimal_root, number_root},
    read_only, unsupported,
};
use crate::{
    builder::Projection,
    compose::{ComposeCx, lookup, relation},
    dialect::adapter,
    error::{LatticeError, Result},
    filter::{FilterCondition, FilterOp, SortDirection},
    registry,
    schema::{Column, ColumnOptions, Schema},
    sql::SQL,
    value::Value,
};

const LOOKUP_OPS: &[FilterOp] = &[
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
    FilterOp::Checked,
    FilterOp::NotChecked,
];

/// Compare a derived numeric expression
fn numeric_filter(
    expr: SQL,
    condition: &FilterCondition,
    column: &Column,
    parse: impl Fn(Value) -> Result<Value>,
    dialect: Dialect,
) -> Result<SQL> {
    if !NUMERIC_OPS.contains(&condition.op) {
        return Err(unsupported(condition.op, column));
    }
    let value = coerce_with(condition.op, &condition.value, column, parse)?;
    Ok(compare::comparison(expr, condition.op, value, false, adapter(dialect)))
}

/// Some backends return aggregates as decimal strings
fn numeric_db_value(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::String(text) => match text.parse::<f64>() {
            Ok(number) if number.fract() == 0.0 && number.abs() < i64::MAX as f64 => {
                serde_json::Value::from(number as i64)
            }
            Ok(number) => serde_json::Value::from(number),
            Err(_) => serde_json::Value::String(text),
        },
        other => other,
    }
}

pub struct LookupHandler {
    dialect: Dialect,
}

impl LookupHandler {
    pub const fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    /// Terminal column of the chain and its handler
    fn terminal<'s>(
        &self,
        column: &'s Column,
        schema: &'s Schema,
    ) -> Result<(&'s Column, &'static dyn FieldHandler)> {
        let terminal = lookup::check_chain(schema, column)?;
        Ok((terminal, registry::resolve(terminal.logical_type, self.dialect)?))
    }
}

impl FieldHandler for LookupHandler {
    fn name(&self) -> &'static str {
        "lookup"
    }

    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn supported_ops(&self) -> &'static [FilterOp] {
        LOOKUP_OPS
    }

    fn verify_filter(&self, op: FilterOp, column: &Column, schema: &Schema) -> Result<()> {
        let (terminal, handler) = self.terminal(column, schema)?;
        handler
            .verify_filter(op, terminal, schema)
            .map_err(|_| unsupported(op, column))
    }

    fn coerce_filter_value(
        &self,
        op: FilterOp,
        value: &Value,
        column: &Column,
        schema: &Schema,
    ) -> Result<Value> {
        let (terminal, handler) = self.terminal(column, schema)?;
        handler.coerce_filter_value(op, value, terminal, schema)
    }

    fn expr<'s>(&self, column: &'s Column, alias: &str, cx: &mut ComposeCx<'s>) -> Result<SQL> {
        Ok(lookup::lookup_value(column, alias, cx)?.expr)
    }

    fn select<'s>(
        &self,
        column: &'s Column,
        alias: &str,
        cx: &mut ComposeCx<'s>,
    ) -> Result<Option<Projection>> {
        let value = lookup::lookup_value(column, alias, cx)?;
        let title = column.title.clone();
        Ok(Some(if value.json {
            Projection::json(title, value.expr)
        } else {
            Projection::new(title, value.expr)
        }))
    }

    /// `EXISTS` over the first hop, with the condition applied to the
    /// target column (itself a lookup for longer chains).
    fn filter<'s>(
        &self,
        condition: &FilterCondition,
        column: &'s Column,
        alias: &str,
        cx: &mut ComposeCx<'s>,
    ) -> Result<SQL> {
        lookup::check_chain(cx.schema, column)?;
        let lookup::LookupStep {
            relation_column,
            target,
        } = lookup::step(cx.schema, column)?;
        let relation = cx.relation(relation_column)?;
        let handler = cx.handler(target)?;

        let (op, negate) = match condition.op.negated() {
            Some(positive) => (positive, true),
            None => (condition.op, false),
        };
        let positive = FilterCondition {
            column: target.id.clone(),
            op,
            value: condition.value.clone(),
        };
        relation::exists_related(&relation, alias, negate, cx, |related, cx| {
            handler.filter(&positive, target, related, cx)
        })
    }

    fn sort<'s>(
        &self,
        direction: SortDirection,
        column: &'s Column,
        alias: &str,
        cx: &mut ComposeCx<'s>,
    ) -> Result<SQL> {
        let expr = if lookup::is_many(cx.schema, column)? {
            // arrays have no useful order; many-valued lookups sort by
            // how many rows they link
            let relation_column = lookup::step(cx.schema, column)?.relation_column;
            let relation = cx.relation(relation_column)?;
            relation::count_related(&relation, alias, cx)
        } else {
            self.expr(column, alias, cx)?
        };
        Ok(expr.push_raw(direction.as_sql()))
    }

    fn parse_user_input(&self, _value: Value, column: &Column) -> Result<Value> {
        Err(read_only(column))
    }

    fn parse_db_value(
        &self,
        value: serde_json::Value,
        column: &Column,
        schema: &Schema,
    ) -> serde_json::Value {
        if lookup::is_many(schema, column).unwrap_or(false) {
            return decode_json_text(value);
        }
        match self.terminal(column, schema) {
            Ok((terminal, handler)) => handler.parse_db_value(value, terminal, schema),
            Err(_) => value,
        }
    }
}

/// Number of linked rows
pub struct LinksHandler {
    dialect: Dialect,
}

impl LinksHandler {
    pub const fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }
}

impl FieldHandler for LinksHandler {
    fn name(&self) -> &'static str {
        "links"
    }

    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn supported_ops(&self) -> &'static [FilterOp] {
        NUMERIC_OPS
    }

    fn coerce_filter_value(
        &self,
        op: FilterOp,
        value: &Value,
        column: &Column,
        _schema: &Schema,
    ) -> Result<Value> {
        coerce_with(op, value, column, |v| number_root(v, column))
    }

    fn expr<'s>(&self, column: &'s Column, alias: &str, cx: &mut ComposeCx<'s>) -> Result<SQL> {
        let relation = cx.relation(column)?;
        Ok(relation::count_related(&relation, alias, cx))
    }

    fn filter<'s>(
        &self,
        condition: &FilterCondition,
        column: &'s Column,
        alias: &str,
        cx: &mut ComposeCx<'s>,
    ) -> Result<SQL> {
        let expr = self.expr(column, alias, cx)?;
        numeric_filter(expr, condition, column, |v| number_root(v, column), self.dialect)
    }

    fn parse_user_input(&self, _value: Value, column: &Column) -> Result<Value> {
        Err(read_only(column))
    }

    fn parse_db_value(
        &self,
        value: serde_json::Value,
        _column: &Column,
        _schema: &Schema,
    ) -> serde_json::Value {
        numeric_db_value(value)
    }
}

/// Aggregate of one column over the linked rows
pub struct RollupHandler {
    dialect: Dialect,
}

impl RollupHandler {
    pub const fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }
}

impl FieldHandler for RollupHandler {
    fn name(&self) -> &'static str {
        "rollup"
    }

    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn supported_ops(&self) -> &'static [FilterOp] {
        NUMERIC_OPS
    }

    fn coerce_filter_value(
        &self,
        op: FilterOp,
        value: &Value,
        column: &Column,
        _schema: &Schema,
    ) -> Result<Value> {
        coerce_with(op, value, column, |v| decimal_root(v, column))
    }

    /// `(SELECT FUNC([DISTINCT] target) FROM <related> WHERE <correlation>)`
    fn expr<'s>(&self, column: &'s Column, alias: &str, cx: &mut ComposeCx<'s>) -> Result<SQL> {
        let options = column.rollup_options()?;
        let owner = cx.schema.owner(column)?;
        let relation_column = cx.schema.column(owner, &options.relation_column)?;
        let relation = cx.relation(relation_column)?;
        let target = cx.schema.column(relation.related(), &options.rollup_column)?;

        cx.derive(column, |cx| {
            let source = relation::related_source(&relation, alias, cx);
            let value = cx.handler(target)?.expr(target, &source.alias, cx)?;
            let (function, distinct) = options.function.aggregate();
            let argument = if distinct {
                SQL::raw("DISTINCT ").append(value)
            } else {
                value
            };
            Ok(source
                .query()
                .column(SQL::func(function, argument))
                .to_sql(cx.adapter)
                .parens())
        })
    }

    fn filter<'s>(
        &self,
        condition: &FilterCondition,
        column: &'s Column,
        alias: &str,
        cx: &mut ComposeCx<'s>,
    ) -> Result<SQL> {
        let expr = self.expr(column, alias, cx)?;
        numeric_filter(expr, condition, column, |v| decimal_root(v, column), self.dialect)
    }

    fn parse_user_input(&self, _value: Value, column: &Column) -> Result<Value> {
        Err(read_only(column))
    }

    fn parse_db_value(
        &self,
        value: serde_json::Value,
        _column: &Column,
        _schema: &Schema,
    ) -> serde_json::Value {
        numeric_db_value(value)
    }
}

/// Formula columns, translated by the composer's formula translator
pub struct FormulaHandler {
    dialect: Dialect,
}

impl FormulaHandler {
    pub const fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }
}

impl FieldHandler for FormulaHandler {
    fn name(&self) -> &'static str {
        "formula"
    }

    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn supported_ops(&self) -> &'static [FilterOp] {
        Generic::OPS
    }

    fn coerce_filter_value(
        &self,
        op: FilterOp,
        value: &Value,
        column: &Column,
        _schema: &Schema,
    ) -> Result<Value> {
        Generic::coerce_filter_value(op, value, column, adapter(self.dialect))
    }

    fn expr<'s>(&self, column: &'s Column, alias: &str, cx: &mut ComposeCx<'s>) -> Result<SQL> {
        cx.formula_expr(column, alias)
    }

    /// Formulas the schema marks as broken are left out of the row.
    fn select<'s>(
        &self,
        column: &'s Column,
        alias: &str,
        cx: &mut ComposeCx<'s>,
    ) -> Result<Option<Projection>> {
        if column.formula_options()?.error.is_some() {
            return Ok(None);
        }
        let expr = self.expr(column, alias, cx)?;
        Ok(Some(Projection::new(column.title.clone(), expr)))
    }

    fn filter<'s>(
        &self,
        condition: &FilterCondition,
        column: &'s Column,
        alias: &str,
        cx: &mut ComposeCx<'s>,
    ) -> Result<SQL> {
        if !Generic::OPS.contains(&condition.op) {
            return Err(unsupported(condition.op, column));
        }
        if let Some(reason) = &column.formula_options()?.error {
            return Err(LatticeError::InvalidFormula {
                field: column.title.clone(),
                reason: reason.clone(),
            });
        }
        let value =
            Generic::coerce_filter_value(condition.op, &condition.value, column, cx.adapter)?;
        let expr = self.expr(column, alias, cx)?;
        Ok(compare::comparison(expr, condition.op, value, true, cx.adapter))
    }

    fn parse_user_input(&self, _value: Value, column: &Column) -> Result<Value> {
        Err(read_only(column))
    }
}

/// Barcode and QR code columns show the value of another column.
pub struct BarcodeHandler {
    dialect: Dialect,
}

impl BarcodeHandler {
    pub const fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    fn source<'s>(
        &self,
        column: &'s Column,
        schema: &'s Schema,
    ) -> Result<(&'s Column, &'static dyn FieldHandler)> {
        let ColumnOptions::Barcode { value_column } = &column.options else {
            return Err(LatticeError::MissingColumnOptions {
                field: column.title.clone(),
                expected: "barcode",
            });
        };
        let source = schema.column(schema.owner(column)?, value_column)?;
        let shown = match source.logical_type {
            LogicalType::Lookup => lookup::check_chain(schema, source)?,
            _ => source,
        };
        if matches!(shown.logical_type, LogicalType::Barcode | LogicalType::QrCode) {
            return Err(LatticeError::invalid_value(
                &column.title,
                "a barcode cannot render another barcode",
            ));
        }
        Ok((source, registry::resolve(source.logical_type, self.dialect)?))
    }
}

impl FieldHandler for BarcodeHandler {
    fn name(&self) -> &'static str {
        "barcode"
    }

    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn supported_ops(&self) -> &'static [FilterOp] {
        Generic::OPS
    }

    fn verify_filter(&self, op: FilterOp, column: &Column, schema: &Schema) -> Result<()> {
        let (source, handler) = self.source(column, schema)?;
        handler.verify_filter(op, source, schema)
    }

    fn coerce_filter_value(
        &self,
        op: FilterOp,
        value: &Value,
        column: &Column,
        schema: &Schema,
    ) -> Result<Value> {
        let (source, handler) = self.source(column, schema)?;
        handler.coerce_filter_value(op, value, source, schema)
    }

    fn expr<'s>(&self, column: &'s Column, alias: &str, cx: &mut ComposeCx<'s>) -> Result<SQL> {
        let (source, handler) = self.source(column, cx.schema)?;
        cx.derive(column, |cx| handler.expr(source, alias, cx))
    }

    fn select<'s>(
        &self,
        column: &'s Column,
        alias: &str,
        cx: &mut ComposeCx<'s>,
    ) -> Result<Option<Projection>> {
        let (source, handler) = self.source(column, cx.schema)?;
        let projection = cx.derive(column, |cx| handler.select(source, alias, cx))?;
        Ok(projection.map(|mut projection| {
            projection.title = column.title.clone();
            projection
        }))
    }

    fn filter<'s>(
        &self,
        condition: &FilterCondition,
        column: &'s Column,
        alias: &str,
        cx: &mut ComposeCx<'s>,
    ) -> Result<SQL> {
        let (source, handler) = self.source(column, cx.schema)?;
        cx.derive(column, |cx| handler.filter(condition, source, alias, cx))
    }

    fn sort<'s>(
        &self,
        direction: SortDirection,
        column: &'s Column,
        alias: &str,
        cx: &mut ComposeCx<'s>,
    ) -> Result<SQL> {
        let (source, handler) = self.source(column, cx.schema)?;
        cx.derive(column, |cx| handler.sort(direction, source, alias, cx))
    }

    fn parse_user_input(&self, _value: Value, column: &Column) -> Result<Value> {
        Err(read_only(column))
    }

    fn parse_db_value(
        &self,
        value: serde_json::Value,
        column: &Column,
        schema: &Schema,
    ) -> serde_json::Value {
        match self.source(column, schema) {
            Ok((source, handler)) => handler.parse_db_value(value, source, schema),
            Err(_) => value,
        }
    }
}
