//! Relational query composition.
//!
//! A [`Composer`] turns a model, its view and the request arguments into one
//! statement that returns each row with relation, lookup, rollup and formula
//! columns inlined. Every nested row goes through the same routine as the
//! root row ([`columns::compose_row`]), so nesting depth is bounded only by
//! the metadata and the request.

mod args;
mod columns;
mod formula;
pub(crate) mod lookup;
pub(crate) mod relation;

pub use args::{Fields, ListArgs, NestedArgs};
pub use formula::{FormulaTranslator, TemplateTranslator};

use compact_str::CompactString;
use hashbrown::HashMap;
use lattice_types::Dialect;

use crate::{
    alias::{AliasGenerator, ROOT_ALIAS},
    builder::{SelectQuery, table},
    condition::{build_filter, order_terms, verify_filters},
    dialect::{DialectAdapter, adapter},
    error::{LatticeError, Result},
    filter::{Filter, Sort},
    handler::FieldHandler,
    prepared::{PreparedStatement, prepare_render},
    registry,
    schema::{Column, Model, Relation, Schema, View},
    sql::SQL,
};
use columns::{compose_row, extract_columns};

/// Named placeholder of the page size
pub const LIMIT_PLACEHOLDER: &str = "__limit";
/// Named placeholder of the page start
pub const OFFSET_PLACEHOLDER: &str = "__offset";

/// Named placeholder of the `index`th primary key value of a read
pub fn pk_placeholder(index: usize) -> String {
    format!("pk_{index}")
}

/// State of one composition.
///
/// Created per request and dropped with it; aliases, resolved relations and
/// the formula recursion path never leak between statements.
pub struct ComposeCx<'s> {
    pub schema: &'s Schema,
    pub dialect: Dialect,
    pub adapter: &'static dyn DialectAdapter,
    /// Timezone of datetimes stored without zone information
    pub db_timezone: &'s str,
    /// Rows per many-valued relation when the request sets none
    pub nested_limit: u64,
    aliases: AliasGenerator,
    formulas: &'s dyn FormulaTranslator,
    relations: HashMap<(&'s str, &'s str), Relation<'s>>,
    scope: Option<&'s HashMap<String, NestedArgs>>,
    formula_path: Vec<&'s str>,
    derived_path: Vec<&'s Column>,
}

impl<'s> ComposeCx<'s> {
    pub fn new(schema: &'s Schema, dialect: Dialect) -> Self {
        Self {
            schema,
            dialect,
            adapter: adapter(dialect),
            db_timezone: "UTC",
            nested_limit: 25,
            aliases: AliasGenerator::new(),
            formulas: &TemplateTranslator,
            relations: HashMap::new(),
            scope: None,
            formula_path: Vec::new(),
            derived_path: Vec::new(),
        }
    }

    /// The next unused table alias
    pub fn next_alias(&mut self) -> CompactString {
        self.aliases.next_alias()
    }

    /// Resolve a relation column, once per composition
    pub fn relation(&mut self, column: &'s Column) -> Result<Relation<'s>> {
        let key = (column.model_id.as_str(), column.id.as_str());
        if let Some(relation) = self.relations.get(&key) {
            return Ok(*relation);
        }
        let relation = Relation::resolve(self.schema, column)?;
        self.relations.insert(key, relation);
        Ok(relation)
    }

    pub fn handler(&self, column: &Column) -> Result<&'static dyn FieldHandler> {
        registry::resolve(column.logical_type, self.dialect)
    }

    /// Request arguments for a relation column at the current nesting level
    pub fn nested_args(&self, column: &Column) -> Option<&'s NestedArgs> {
        let scope = self.scope?;
        scope.get(&column.title).or_else(|| scope.get(&column.id))
    }

    /// Run `f` with the nested arguments of one relation level in scope
    pub(crate) fn with_scope<T>(
        &mut self,
        scope: Option<&'s HashMap<String, NestedArgs>>,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let saved = core::mem::replace(&mut self.scope, scope);
        let result = f(self);
        self.scope = saved;
        result
    }

    /// Compose the value of a lookup, rollup or barcode column.
    ///
    /// Fails with [`LatticeError::LookupCycle`] when `column` is already being
    /// composed further up, whichever derived types the cycle passes through.
    pub(crate) fn derive<T>(
        &mut self,
        column: &'s Column,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let start = self
            .derived_path
            .iter()
            .position(|c| c.model_id == column.model_id && c.id == column.id);
        if let Some(start) = start {
            let mut path: Vec<String> = self.derived_path[start..]
                .iter()
                .map(|c| c.title.clone())
                .collect();
            path.push(column.title.clone());
            return Err(LatticeError::LookupCycle { path });
        }
        self.derived_path.push(column);
        let result = f(self);
        self.derived_path.pop();
        result
    }

    /// Translate a formula column, failing if it refers back to itself
    pub(crate) fn formula_expr(&mut self, column: &'s Column, alias: &str) -> Result<SQL> {
        if self.formula_path.contains(&column.id.as_str()) {
            return Err(LatticeError::InvalidFormula {
                field: column.title.clone(),
                reason: "formula refers to itself".to_string(),
            });
        }
        self.formula_path.push(&column.id);
        let translator = self.formulas;
        let result = translator.translate(column, alias, self);
        self.formula_path.pop();
        result
    }
}

/// The list and count statements of one list request.
#[derive(Debug, Clone)]
pub struct ComposedList {
    /// Row statement with `__limit` / `__offset` placeholders
    pub list: PreparedStatement,
    /// `COUNT(*)` over the same conditions
    pub count: PreparedStatement,
}

/// Composes statements against one schema and dialect.
#[derive(Clone, Copy)]
pub struct Composer<'s> {
    schema: &'s Schema,
    dialect: Dialect,
    db_timezone: &'s str,
    nested_limit: u64,
    formulas: &'s dyn FormulaTranslator,
}

impl<'s> Composer<'s> {
    pub fn new(schema: &'s Schema, dialect: Dialect) -> Self {
        Self {
            schema,
            dialect,
            db_timezone: "UTC",
            nested_limit: 25,
            formulas: &TemplateTranslator,
        }
    }

    pub fn db_timezone(mut self, timezone: &'s str) -> Self {
        self.db_timezone = timezone;
        self
    }

    pub fn nested_limit(mut self, limit: u64) -> Self {
        self.nested_limit = limit;
        self
    }

    pub fn formulas(mut self, formulas: &'s dyn FormulaTranslator) -> Self {
        self.formulas = formulas;
        self
    }

    fn context(&self) -> Result<ComposeCx<'s>> {
        let mut cx = ComposeCx::new(self.schema, self.dialect);
        if !cx.adapter.supports_timezone(self.db_timezone) {
            return Err(LatticeError::UnsupportedTimezone {
                timezone: self.db_timezone.to_string(),
                dialect: self.dialect,
            });
        }
        cx.db_timezone = self.db_timezone;
        cx.nested_limit = self.nested_limit;
        cx.formulas = self.formulas;
        Ok(cx)
    }

    fn view(&self, model: &Model, view_id: Option<&str>) -> Result<Option<&'s View>> {
        let Some(id) = view_id else {
            return Ok(None);
        };
        let view = self
            .schema
            .view(id)
            .ok_or_else(|| LatticeError::UnknownView(id.to_string()))?;
        if view.model_id != model.id {
            return Err(LatticeError::UnknownView(id.to_string()));
        }
        Ok(Some(view))
    }

    /// Compose the list and count statements of a list request.
    ///
    /// Filters are verified before any SQL is produced. The list statement
    /// pages the root rows in a derived table and attaches nested values
    /// outside it, so relation subqueries only run for the returned page.
    pub fn compose_list(
        &self,
        model_id: &str,
        view_id: Option<&str>,
        args: &'s ListArgs,
    ) -> Result<ComposedList> {
        let model = self.schema.model(model_id)?;
        let view = self.view(model, view_id)?;

        let filters: Vec<&Filter> = [
            view.and_then(|v| v.filter.as_ref()),
            args.filter.as_ref(),
            args.r#where.as_ref(),
        ]
        .into_iter()
        .flatten()
        .collect();

        if let Err(err) = verify_filters(filters.iter().copied(), model, self.schema, self.dialect)
        {
            crate::lattice_trace_reject!(err);
            return Err(err);
        }

        let mut cx = self.context()?;
        let adapter = cx.adapter;

        let columns = extract_columns(model, |column| {
            visible(view, column) && requested(args.fields.as_deref(), column)
        });

        let (projections, joins) = cx.with_scope(Some(&args.nested), |cx| {
            compose_row(ROOT_ALIAS, &columns, cx)
        })?;

        let mut conditions = Vec::with_capacity(filters.len());
        for filter in &filters {
            conditions.push(build_filter(filter, model, ROOT_ALIAS, &mut cx)?);
        }

        let sorts: &[Sort] = match (args.sorts.is_empty(), view) {
            (true, Some(view)) => &view.sorts,
            _ => &args.sorts,
        };
        let order = order_terms(sorts, model, ROOT_ALIAS, &mut cx)?;

        let page = conditions
            .iter()
            .cloned()
            .fold(root_source(model), SelectQuery::filter)
            .column(SQL::ident(ROOT_ALIAS).push_raw(".*"))
            .order_by(order.clone())
            .limit(SQL::placeholder(LIMIT_PLACEHOLDER))
            .offset(SQL::placeholder(OFFSET_PLACEHOLDER));

        let mut list = SelectQuery::from(page.to_sql(adapter).parens().alias(ROOT_ALIAS))
            .order_by(order);
        for projection in projections {
            list = list.column(projection.aliased());
        }
        for join in joins {
            list = list.join(join);
        }

        let count = conditions
            .into_iter()
            .fold(root_source(model), SelectQuery::filter)
            .column(SQL::raw("COUNT(*)").alias("count"));

        let list = prepare_render(list.to_sql(adapter), adapter);
        let count = prepare_render(count.to_sql(adapter), adapter);
        crate::lattice_trace_compose!(model.title, self.dialect, list.sql.len(), list.params.len());

        Ok(ComposedList { list, count })
    }

    /// Compose the single-row statement of a read by primary key.
    ///
    /// Key values are named placeholders `pk_0`, `pk_1`, ... in primary key
    /// column order.
    pub fn compose_read(&self, model_id: &str, view_id: Option<&str>) -> Result<PreparedStatement> {
        let model = self.schema.model(model_id)?;
        let view = self.view(model, view_id)?;

        let mut cx = self.context()?;
        let adapter = cx.adapter;

        let columns = extract_columns(model, |column| visible(view, column));
        let (projections, joins) = compose_row(ROOT_ALIAS, &columns, &mut cx)?;

        let keys: Vec<&Column> = model.primary_keys().collect();
        if keys.is_empty() {
            return Err(LatticeError::UnknownColumn(format!(
                "primary key of '{}'",
                model.title
            )));
        }

        let mut query = root_source(model);
        for projection in projections {
            query = query.column(projection.aliased());
        }
        for join in joins {
            query = query.join(join);
        }
        for (index, key) in keys.into_iter().enumerate() {
            query = query.filter(
                SQL::qualified(ROOT_ALIAS, &key.column_name)
                    .push_raw(" = ")
                    .append(SQL::placeholder(&pk_placeholder(index))),
            );
        }

        let read = prepare_render(query.to_sql(adapter), adapter);
        crate::lattice_trace_compose!(model.title, self.dialect, read.sql.len(), read.params.len());
        Ok(read)
    }
}

fn root_source(model: &Model) -> SelectQuery {
    SelectQuery::from(table(model).alias(ROOT_ALIAS))
}

/// Whether the view shows the column; no view or no list shows everything
fn visible(view: Option<&View>, column: &Column) -> bool {
    match view {
        Some(view) if !view.visible_columns.is_empty() => view
            .visible_columns
            .iter()
            .any(|key| *key == column.id || *key == column.title),
        _ => true,
    }
}

fn requested(fields: Option<&[String]>, column: &Column) -> bool {
    match fields {
        Some(fields) => fields
            .iter()
            .any(|key| *key == column.id || *key == column.title),
        None => true,
    }
}
