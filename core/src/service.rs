//! List and read requests end to end: compose (or replay from the cache),
//! bind, execute through the caller's [`Executor`], and post-process rows.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use compact_str::CompactString;
use serde::Serialize;

use crate::{
    cache::{CacheKey, QueryCache, StatementKind},
    compose::{
        Composer, FormulaTranslator, LIMIT_PLACEHOLDER, ListArgs, OFFSET_PLACEHOLDER,
        TemplateTranslator, pk_placeholder,
    },
    config::LatticeConfig,
    error::{LatticeError, Result},
    handler::map_record,
    param::ParamBind,
    prepared::PreparedStatement,
    schema::Schema,
    value::Value,
};

/// One result row, keyed by column title
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Runs final statements against the database.
///
/// Implementations receive dialect SQL text and its parameters in
/// placeholder order, and return each row as a JSON object keyed by the
/// column aliases of the statement.
pub trait Executor {
    type Error: std::error::Error + Send + Sync + 'static;

    fn query(&self, sql: &str, params: &[Value]) -> core::result::Result<Vec<Row>, Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Rows matching the request's filters, across all pages
    pub count: u64,
    pub limit: u64,
    pub offset: u64,
    /// Same as `count`
    pub total_rows: u64,
    /// 1-based page number
    pub page: u64,
    pub page_size: u64,
    pub is_first_page: bool,
    pub is_last_page: bool,
}

impl PageInfo {
    pub fn new(total_rows: u64, limit: u64, offset: u64) -> Self {
        let page_size = limit.max(1);
        Self {
            count: total_rows,
            limit,
            offset,
            total_rows,
            page: offset / page_size + 1,
            page_size,
            is_first_page: offset == 0,
            is_last_page: offset.saturating_add(page_size) >= total_rows,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResponse {
    pub list: Vec<Row>,
    pub page_info: PageInfo,
}

/// A statement with every parameter resolved, ready for any driver.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundStatement {
    pub sql: CompactString,
    pub params: Vec<Value>,
}

/// Serves list and read requests for one schema and database.
pub struct DataService<E> {
    schema: Schema,
    config: LatticeConfig,
    cache: QueryCache,
    executor: E,
    formulas: Box<dyn FormulaTranslator>,
    compositions: AtomicUsize,
}

impl<E: Executor> DataService<E> {
    pub fn new(schema: Schema, config: LatticeConfig, executor: E) -> Self {
        Self {
            schema,
            config,
            cache: QueryCache::new(),
            executor,
            formulas: Box::new(TemplateTranslator),
            compositions: AtomicUsize::new(0),
        }
    }

    pub fn with_formulas(mut self, formulas: impl FormulaTranslator + 'static) -> Self {
        self.formulas = Box::new(formulas);
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn config(&self) -> &LatticeConfig {
        &self.config
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// How many times a statement was composed rather than replayed
    pub fn compositions(&self) -> usize {
        self.compositions.load(Ordering::Relaxed)
    }

    fn composer(&self) -> Composer<'_> {
        Composer::new(&self.schema, self.config.dialect)
            .db_timezone(&self.config.db_timezone)
            .nested_limit(self.config.nested.limit)
            .formulas(self.formulas.as_ref())
    }

    fn cache_enabled(&self) -> bool {
        self.config.cache.enabled
    }

    /// List and count statements, from the cache when the request shape
    /// allows it.
    fn list_statements(
        &self,
        model_id: &str,
        view_id: Option<&str>,
        args: &ListArgs,
    ) -> Result<(Arc<PreparedStatement>, Arc<PreparedStatement>)> {
        let cacheable = self.cache_enabled() && args.is_cacheable();
        let list_key = CacheKey::new(model_id, view_id, StatementKind::List);
        let count_key = CacheKey::new(model_id, view_id, StatementKind::Count);

        if cacheable {
            if let (Some(list), Some(count)) =
                (self.cache.get(&list_key), self.cache.get(&count_key))
            {
                return Ok((list, count));
            }
        }

        let composed = self
            .composer()
            .compose_list(model_id, view_id, args)
            .inspect_err(log_fault)?;
        self.compositions.fetch_add(1, Ordering::Relaxed);

        if cacheable {
            let list = self.cache.insert(list_key, composed.list);
            let count = self.cache.insert(count_key, composed.count);
            Ok((list, count))
        } else {
            Ok((Arc::new(composed.list), Arc::new(composed.count)))
        }
    }

    fn read_statement(&self, model_id: &str, view_id: Option<&str>) -> Result<Arc<PreparedStatement>> {
        let key = CacheKey::new(model_id, view_id, StatementKind::Read);
        if self.cache_enabled() {
            if let Some(read) = self.cache.get(&key) {
                return Ok(read);
            }
        }

        let read = self
            .composer()
            .compose_read(model_id, view_id)
            .inspect_err(log_fault)?;
        self.compositions.fetch_add(1, Ordering::Relaxed);

        Ok(if self.cache_enabled() {
            self.cache.insert(key, read)
        } else {
            Arc::new(read)
        })
    }

    /// The list statement with its page bounds bound, without executing it.
    pub fn prepare_list(
        &self,
        model_id: &str,
        view_id: Option<&str>,
        mut args: ListArgs,
    ) -> Result<BoundStatement> {
        args.normalize(&self.config.pagination);
        let (list, _) = self.list_statements(model_id, view_id, &args)?;
        Ok(BoundStatement {
            sql: list.sql.clone(),
            params: list.bind(page_binds(&args))?,
        })
    }

    /// Run a list request and return one page with its pagination envelope.
    pub fn list(
        &self,
        model_id: &str,
        view_id: Option<&str>,
        mut args: ListArgs,
    ) -> Result<PagedResponse> {
        args.normalize(&self.config.pagination);
        let (list, count) = self.list_statements(model_id, view_id, &args)?;

        let rows = self.execute(&list, page_binds(&args))?;
        let counted = self.execute(&count, [])?;
        let total_rows = counted
            .first()
            .and_then(|row| row.get("count"))
            .and_then(count_value)
            .ok_or_else(|| LatticeError::Mapping("count statement returned no count".into()))?;

        let model = self.schema.model(model_id)?;
        let list = rows
            .into_iter()
            .map(|mut row| {
                map_record(model, &mut row, &self.schema, self.config.dialect);
                row
            })
            .collect();

        Ok(PagedResponse {
            list,
            page_info: PageInfo::new(
                total_rows,
                args.limit.unwrap_or(self.config.pagination.default_limit),
                args.offset.unwrap_or(0),
            ),
        })
    }

    /// Read one row by primary key values, in primary key column order.
    pub fn read(&self, model_id: &str, view_id: Option<&str>, keys: &[Value]) -> Result<Option<Row>> {
        let read = self.read_statement(model_id, view_id)?;
        let names: Vec<String> = (0..keys.len()).map(pk_placeholder).collect();
        let binds = names
            .iter()
            .zip(keys)
            .map(|(name, key)| ParamBind::new(name, key.clone()));

        let mut rows = self.execute(&read, binds)?;
        if rows.is_empty() {
            return Ok(None);
        }
        let mut row = rows.swap_remove(0);
        let model = self.schema.model(model_id)?;
        map_record(model, &mut row, &self.schema, self.config.dialect);
        Ok(Some(row))
    }

    fn execute<'a>(
        &self,
        statement: &PreparedStatement,
        binds: impl IntoIterator<Item = ParamBind<'a>>,
    ) -> Result<Vec<Row>> {
        let params = statement.bind(binds)?;
        self.executor
            .query(statement.sql(), &params)
            .map_err(|err| LatticeError::Execution(Box::new(err)))
    }
}

fn page_binds(args: &ListArgs) -> [ParamBind<'static>; 2] {
    let clamp = |n: Option<u64>| Value::Integer(i64::try_from(n.unwrap_or(0)).unwrap_or(i64::MAX));
    [
        ParamBind::new(LIMIT_PLACEHOLDER, clamp(args.limit)),
        ParamBind::new(OFFSET_PLACEHOLDER, clamp(args.offset)),
    ]
}

/// Drivers return `COUNT(*)` as a number or, for wide integers, as text
fn count_value(value: &serde_json::Value) -> Option<u64> {
    match value {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Rejections are traced where they are detected
fn log_fault(err: &LatticeError) {
    if !err.is_validation() {
        crate::lattice_trace_fault!(err);
    }
}
