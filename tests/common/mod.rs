pub mod rusqlite;
pub mod schema;

pub use self::rusqlite::{SqliteExecutor, setup_db};
pub use schema::{cyclic, world};

use lattice::core::{PreparedStatement, prepare_render};
use lattice::prelude::*;

/// Render the list statement of a request.
pub fn list_sql(schema: &Schema, dialect: Dialect, model: &str, args: &ListArgs) -> String {
    Composer::new(schema, dialect)
        .compose_list(model, None, args)
        .expect("list should compose")
        .list
        .sql()
        .to_string()
}

/// Render one column's value expression for the root row.
pub fn column_expr(schema: &Schema, dialect: Dialect, model: &str, column: &str) -> PreparedStatement {
    let column = schema
        .model(model)
        .expect("model exists")
        .find_column(column)
        .expect("column exists");
    let mut cx = lattice::compose::ComposeCx::new(schema, dialect);
    let handler = cx.handler(column).expect("handler registered");
    let expr = handler.expr(column, "a0", &mut cx).expect("expression composes");
    prepare_render(expr, cx.adapter)
}
