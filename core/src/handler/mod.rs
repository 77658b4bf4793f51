//! Per-type column handlers.
//!
//! A [`FieldHandler`] knows how one logical column type selects, filters,
//! sorts and parses values on one dialect. Scalar types are built from a
//! [`TypeFamily`] and a [`DialectAdapter`] as [`TypedHandler<F, D>`]: the
//! family overrides only the narrow piece of behavior that differs, and the
//! adapter supplies every dialect-specific fragment.

pub(crate) mod compare;
mod computed;
mod json;
mod numeric;
mod relational;
mod temporal;
mod text;

pub use computed::{BarcodeHandler, FormulaHandler, LinksHandler, LookupHandler, RollupHandler};
pub use json::{Json, JsonMySql, JsonPg};
pub use numeric::{Currency, Decimal, Duration, Number, Percent, Rating, Year};
pub use relational::RelationHandler;
pub use temporal::{Date, DateTime};
pub use text::{Checkbox, Generic, MultiSelect, Text};

use core::marker::PhantomData;
use lattice_types::Dialect;

use crate::{
    builder::Projection,
    compose::ComposeCx,
    dialect::DialectAdapter,
    error::{LatticeError, Result},
    filter::{FilterCondition, FilterOp, SortDirection},
    registry,
    schema::{Column, Model, Schema},
    sql::SQL,
    value::Value,
};

/// Dialect-aware behavior of one logical column type.
pub trait FieldHandler: Send + Sync {
    /// Handler name, for diagnostics
    fn name(&self) -> &'static str;

    fn dialect(&self) -> Dialect;

    /// Filter operators the type supports
    fn supported_ops(&self) -> &'static [FilterOp];

    /// Fail with [`LatticeError::UnsupportedFilterOperation`] unless `op`
    /// applies to the column.
    fn verify_filter(&self, op: FilterOp, column: &Column, _schema: &Schema) -> Result<()> {
        if self.supported_ops().contains(&op) {
            Ok(())
        } else {
            Err(unsupported(op, column))
        }
    }

    /// Convert a filter value to the form compared in SQL.
    fn coerce_filter_value(
        &self,
        op: FilterOp,
        value: &Value,
        column: &Column,
        schema: &Schema,
    ) -> Result<Value>;

    /// The scalar value expression of the column at `alias`.
    fn expr<'s>(&self, column: &'s Column, alias: &str, cx: &mut ComposeCx<'s>) -> Result<SQL>;

    /// Projection of the column; `None` leaves it out of the row.
    fn select<'s>(
        &self,
        column: &'s Column,
        alias: &str,
        cx: &mut ComposeCx<'s>,
    ) -> Result<Option<Projection>> {
        let expr = self.expr(column, alias, cx)?;
        Ok(Some(Projection::new(column.title.clone(), expr)))
    }

    /// Condition for one filter leaf on this column.
    fn filter<'s>(
        &self,
        condition: &FilterCondition,
        column: &'s Column,
        alias: &str,
        cx: &mut ComposeCx<'s>,
    ) -> Result<SQL>;

    /// ORDER BY term for the column.
    fn sort<'s>(
        &self,
        direction: SortDirection,
        column: &'s Column,
        alias: &str,
        cx: &mut ComposeCx<'s>,
    ) -> Result<SQL> {
        Ok(self.expr(column, alias, cx)?.push_raw(direction.as_sql()))
    }

    /// Validate and convert a caller-supplied value to its storage form.
    fn parse_user_input(&self, value: Value, column: &Column) -> Result<Value>;

    /// Post-process a value read back from the executor.
    fn parse_db_value(
        &self,
        value: serde_json::Value,
        _column: &Column,
        _schema: &Schema,
    ) -> serde_json::Value {
        value
    }
}

/// The narrow override points of a scalar column type.
///
/// Families form an inheritance chain by delegation: `Number` calls the
/// decimal root and adds an integer check, `Year` calls `Number` and adds
/// bounds, and so on.
pub trait TypeFamily: Send + Sync + 'static {
    const NAME: &'static str;

    /// Supported filter operators
    const OPS: &'static [FilterOp];

    /// Whether an empty string counts as blank
    const TEXTUAL: bool = false;

    fn parse_input(value: Value, column: &Column, adapter: &dyn DialectAdapter) -> Result<Value>;

    fn coerce_filter_value(
        op: FilterOp,
        value: &Value,
        column: &Column,
        adapter: &dyn DialectAdapter,
    ) -> Result<Value> {
        coerce_with(op, value, column, |v| Self::parse_input(v, column, adapter))
    }

    /// Replace the generic comparison for some operator/value pairs
    fn filter_override(
        _expr: &SQL,
        _op: FilterOp,
        _value: &Value,
        _adapter: &dyn DialectAdapter,
    ) -> Option<SQL> {
        None
    }

    fn select_expr(column: &Column, alias: &str, _cx: &ComposeCx<'_>) -> SQL {
        SQL::qualified(alias, &column.column_name)
    }

    fn parse_db_value(value: serde_json::Value, _column: &Column) -> serde_json::Value {
        value
    }
}

/// A scalar handler: type family `F` rendered through dialect adapter `D`.
pub struct TypedHandler<F, D> {
    adapter: D,
    _family: PhantomData<fn() -> F>,
}

impl<F, D> TypedHandler<F, D> {
    pub const fn new(adapter: D) -> Self {
        Self {
            adapter,
            _family: PhantomData,
        }
    }
}

impl<F: TypeFamily, D: DialectAdapter> FieldHandler for TypedHandler<F, D> {
    fn name(&self) -> &'static str {
        F::NAME
    }

    fn dialect(&self) -> Dialect {
        self.adapter.dialect()
    }

    fn supported_ops(&self) -> &'static [FilterOp] {
        F::OPS
    }

    fn coerce_filter_value(
        &self,
        op: FilterOp,
        value: &Value,
        column: &Column,
        _schema: &Schema,
    ) -> Result<Value> {
        F::coerce_filter_value(op, value, column, &self.adapter)
    }

    fn expr<'s>(&self, column: &'s Column, alias: &str, cx: &mut ComposeCx<'s>) -> Result<SQL> {
        Ok(F::select_expr(column, alias, cx))
    }

    fn filter<'s>(
        &self,
        condition: &FilterCondition,
        column: &'s Column,
        alias: &str,
        cx: &mut ComposeCx<'s>,
    ) -> Result<SQL> {
        if !F::OPS.contains(&condition.op) {
            return Err(unsupported(condition.op, column));
        }
        let value = F::coerce_filter_value(condition.op, &condition.value, column, &self.adapter)?;
        let expr = F::select_expr(column, alias, cx);

        if let Some(sql) = F::filter_override(&expr, condition.op, &value, &self.adapter) {
            return Ok(sql);
        }
        Ok(compare::comparison(
            expr,
            condition.op,
            value,
            F::TEXTUAL,
            &self.adapter,
        ))
    }

    fn parse_user_input(&self, value: Value, column: &Column) -> Result<Value> {
        F::parse_input(value, column, &self.adapter)
    }

    fn parse_db_value(
        &self,
        value: serde_json::Value,
        column: &Column,
        _schema: &Schema,
    ) -> serde_json::Value {
        F::parse_db_value(value, column)
    }
}

pub(crate) fn unsupported(op: FilterOp, column: &Column) -> LatticeError {
    LatticeError::UnsupportedFilterOperation {
        op: op.as_str(),
        field: column.title.clone(),
        logical_type: column.logical_type,
    }
}

/// Sub-operations accepted by `is` / `isnot`
const IS_SUB_OPS: &[&str] = &["null", "notnull", "empty", "notempty", "blank", "notblank"];

/// Shared filter value coercion: unary operators drop their value, `is`
/// takes a sub-operation, `in` takes a list, `like` takes text and every
/// other operator parses the value like user input.
pub(crate) fn coerce_with(
    op: FilterOp,
    value: &Value,
    column: &Column,
    parse: impl Fn(Value) -> Result<Value>,
) -> Result<Value> {
    match op {
        op if op.is_unary() => Ok(Value::Null),
        FilterOp::Is | FilterOp::IsNot => match value.as_str() {
            Some(sub) if IS_SUB_OPS.contains(&sub) => Ok(Value::Text(sub.to_string())),
            _ => Err(LatticeError::invalid_value(
                &column.title,
                format!("'{value}' is not one of {}", IS_SUB_OPS.join(", ")),
            )),
        },
        FilterOp::In => {
            let items = match value {
                Value::List(items) => items.clone(),
                Value::Null => Vec::new(),
                other => vec![other.clone()],
            };
            items
                .into_iter()
                .filter(|item| !item.is_null())
                .map(&parse)
                .collect::<Result<Vec<_>>>()
                .map(Value::List)
        }
        FilterOp::Like | FilterOp::NotLike => match value {
            Value::Null => Ok(Value::Null),
            Value::Text(text) => Ok(Value::Text(text.clone())),
            Value::Integer(_) | Value::Real(_) | Value::Bool(_) => Ok(Value::Text(value.to_string())),
            _ => Err(LatticeError::invalid_value(&column.title, "expected text")),
        },
        _ => parse(value.clone()),
    }
}

/// Executors hand JSON back as text on most backends
pub(crate) fn decode_json_text(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::String(text) => match serde_json::from_str(&text) {
            Ok(json) => json,
            Err(_) => serde_json::Value::String(text),
        },
        other => other,
    }
}

/// Apply each column's `parse_db_value` to the matching keys of a record.
pub(crate) fn map_record(
    model: &Model,
    record: &mut serde_json::Map<String, serde_json::Value>,
    schema: &Schema,
    dialect: Dialect,
) {
    for column in &model.columns {
        let Some(slot) = record.get_mut(&column.title) else {
            continue;
        };
        if let Ok(handler) = registry::resolve(column.logical_type, dialect) {
            let value = core::mem::take(slot);
            *slot = handler.parse_db_value(value, column, schema);
        }
    }
}

/// Failure for writes to columns whose value is computed
pub(crate) fn read_only(column: &Column) -> LatticeError {
    LatticeError::invalid_value(
        &column.title,
        format!("{} columns are computed and cannot be written", column.logical_type),
    )
}
