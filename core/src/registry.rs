//! Column type registry.
//!
//! Maps a `(LogicalType, Dialect)` pair to its handler. The table is an
//! exhaustive match over [`LogicalType`], each arm yielding one static handler
//! per dialect in [`Dialect::index`] order, so a new logical type does not
//! compile until its handlers are decided.

use lattice_types::{Dialect, LogicalType};

use crate::{
    dialect::{MsSql, MySql, Postgres, Sqlite},
    error::{LatticeError, Result},
    handler::{
        BarcodeHandler, Checkbox, Currency, Date, DateTime, Decimal, Duration, FieldHandler,
        FormulaHandler, Generic, Json, JsonMySql, JsonPg, LinksHandler, LookupHandler,
        MultiSelect, Number, Percent, Rating, RelationHandler, RollupHandler, Text,
        TypedHandler, Year,
    },
};

type Handlers = [&'static dyn FieldHandler; 4];

/// One `TypedHandler` per dialect for a scalar type family
macro_rules! per_dialect {
    ($family:ty) => {{
        static HANDLERS: Handlers = [
            &TypedHandler::<$family, Sqlite>::new(Sqlite),
            &TypedHandler::<$family, Postgres>::new(Postgres),
            &TypedHandler::<$family, MySql>::new(MySql),
            &TypedHandler::<$family, MsSql>::new(MsSql),
        ];
        &HANDLERS
    }};
}

/// One instance per dialect for a composed-column handler
macro_rules! per_dialect_of {
    ($handler:ident) => {{
        static HANDLERS: Handlers = [
            &$handler::new(Dialect::SQLite),
            &$handler::new(Dialect::PostgreSQL),
            &$handler::new(Dialect::MySQL),
            &$handler::new(Dialect::MSSQL),
        ];
        &HANDLERS
    }};
}

static JSON: Handlers = [
    &TypedHandler::<Json, Sqlite>::new(Sqlite),
    &TypedHandler::<JsonPg, Postgres>::new(Postgres),
    &TypedHandler::<JsonMySql, MySql>::new(MySql),
    &TypedHandler::<Json, MsSql>::new(MsSql),
];

/// The handler for `logical_type` on `dialect`.
///
/// Fails with [`LatticeError::UnregisteredHandler`] for types that have no
/// handler; that is a deployment defect and aborts the request.
pub fn resolve(logical_type: LogicalType, dialect: Dialect) -> Result<&'static dyn FieldHandler> {
    let handlers: &'static Handlers = match logical_type {
        LogicalType::Id | LogicalType::ForeignKey => per_dialect!(Generic),
        LogicalType::SingleLineText
        | LogicalType::LongText
        | LogicalType::Email
        | LogicalType::PhoneNumber
        | LogicalType::Url
        | LogicalType::SingleSelect => per_dialect!(Text),
        LogicalType::MultiSelect => per_dialect!(MultiSelect),
        LogicalType::Checkbox => per_dialect!(Checkbox),
        LogicalType::Number => per_dialect!(Number),
        LogicalType::Decimal => per_dialect!(Decimal),
        LogicalType::Currency => per_dialect!(Currency),
        LogicalType::Percent => per_dialect!(Percent),
        LogicalType::Rating => per_dialect!(Rating),
        LogicalType::Duration => per_dialect!(Duration),
        LogicalType::Year => per_dialect!(Year),
        LogicalType::Date => per_dialect!(Date),
        LogicalType::DateTime | LogicalType::CreatedTime | LogicalType::LastModifiedTime => {
            per_dialect!(DateTime)
        }
        LogicalType::Json => &JSON,
        LogicalType::LinkToAnotherRecord => per_dialect_of!(RelationHandler),
        LogicalType::Links => per_dialect_of!(LinksHandler),
        LogicalType::Lookup => per_dialect_of!(LookupHandler),
        LogicalType::Rollup => per_dialect_of!(RollupHandler),
        LogicalType::Formula => per_dialect_of!(FormulaHandler),
        LogicalType::Barcode | LogicalType::QrCode => per_dialect_of!(BarcodeHandler),
        LogicalType::Attachment | LogicalType::Geometry => {
            return Err(LatticeError::UnregisteredHandler {
                logical_type,
                dialect,
            });
        }
    };
    Ok(handlers[dialect.index()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        compose::ComposeCx,
        filter::{FilterCondition, FilterOp},
        prepared::prepare_render,
        schema::{Column, Model, Schema},
        value::Value,
    };

    #[test]
    fn every_handler_matches_its_dialect() {
        for ty in LogicalType::ALL {
            for dialect in Dialect::ALL {
                match resolve(ty, dialect) {
                    Ok(handler) => assert_eq!(handler.dialect(), dialect, "{ty} on {dialect}"),
                    Err(LatticeError::UnregisteredHandler { .. }) => {
                        assert!(matches!(ty, LogicalType::Attachment | LogicalType::Geometry));
                    }
                    Err(other) => panic!("unexpected error {other}"),
                }
            }
        }
    }

    #[test]
    fn json_varies_by_dialect_and_numbers_do_not() {
        let names: Vec<_> = Dialect::ALL
            .iter()
            .map(|d| resolve(LogicalType::Number, *d).unwrap().name())
            .collect();
        assert!(names.iter().all(|n| *n == "number"));

        let pg = resolve(LogicalType::Json, Dialect::PostgreSQL).unwrap();
        let sqlite = resolve(LogicalType::Json, Dialect::SQLite).unwrap();
        assert_eq!(pg.name(), sqlite.name());

        let pg = json_equality(Dialect::PostgreSQL);
        assert!(pg.contains("::jsonb"), "{pg}");
        let sqlite = json_equality(Dialect::SQLite);
        assert!(!sqlite.contains("::jsonb"), "{sqlite}");
    }

    /// `Data = {"a":1}` through the registered JSON handler
    fn json_equality(dialect: Dialect) -> String {
        let schema = Schema::new().with_model(
            Model::new("t", "T", "t")
                .column(Column::new("t_id", "Id", "id", LogicalType::Id).primary_key())
                .column(Column::new("t_data", "Data", "data", LogicalType::Json)),
        );
        let column = schema.model("t").unwrap().column_by_id("t_data").unwrap();
        let condition = FilterCondition {
            column: column.id.clone(),
            op: FilterOp::Eq,
            value: Value::from(r#"{"a":1}"#),
        };
        let mut cx = ComposeCx::new(&schema, dialect);
        let sql = resolve(LogicalType::Json, dialect)
            .unwrap()
            .filter(&condition, column, "a0", &mut cx)
            .unwrap();
        prepare_render(sql, cx.adapter).sql().to_string()
    }

    #[test]
    fn attachments_are_unregistered() {
        let err = resolve(LogicalType::Attachment, Dialect::MySQL).err().unwrap();
        assert_eq!(err.to_string(), "no handler registered for Attachment on mysql");
    }
}
