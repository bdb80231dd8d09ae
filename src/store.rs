//! Record store seam. The hosted datastore speaks PostgREST; jobs only see the
//! `RecordStore` trait so they can run against `MemoryStore` in tests.

use serde_json::Value;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("http {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid response json: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{0}")]
    Config(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Eq(String, String),
    Neq(String, String),
    Like(String, String),
    In(String, Vec<String>),
    IsNull(String),
    NotNull(String),
    Or(Vec<Filter>),
}

impl Filter {
    fn column_op(&self) -> (String, String) {
        match self {
            Filter::Eq(col, v) => (col.clone(), format!("eq.{}", urlencoding::encode(v))),
            Filter::Neq(col, v) => (col.clone(), format!("neq.{}", urlencoding::encode(v))),
            Filter::Like(col, p) => (col.clone(), format!("like.{}", urlencoding::encode(p))),
            Filter::In(col, values) => {
                let joined = values
                    .iter()
                    .map(|v| urlencoding::encode(v).into_owned())
                    .collect::<Vec<_>>()
                    .join(",");
                (col.clone(), format!("in.({joined})"))
            }
            Filter::IsNull(col) => (col.clone(), "is.null".to_string()),
            Filter::NotNull(col) => (col.clone(), "not.is.null".to_string()),
            Filter::Or(inner) => {
                let joined = inner
                    .iter()
                    .map(|f| {
                        let (col, op) = f.column_op();
                        format!("{col}.{op}")
                    })
                    .collect::<Vec<_>>()
                    .join(",");
                ("or".to_string(), format!("({joined})"))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub descending: bool,
}

/// PostgREST-style row query: projection, filters, order and paging window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub select: Option<String>,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(mut self, columns: &str) -> Self {
        self.select = Some(columns.to_string());
        self
    }

    pub fn eq(mut self, column: &str, value: &str) -> Self {
        self.filters
            .push(Filter::Eq(column.to_string(), value.to_string()));
        self
    }

    pub fn neq(mut self, column: &str, value: &str) -> Self {
        self.filters
            .push(Filter::Neq(column.to_string(), value.to_string()));
        self
    }

    /// `*` is the wildcard, as in PostgREST.
    pub fn like(mut self, column: &str, pattern: &str) -> Self {
        self.filters
            .push(Filter::Like(column.to_string(), pattern.to_string()));
        self
    }

    pub fn in_list<S: AsRef<str>>(mut self, column: &str, values: &[S]) -> Self {
        self.filters.push(Filter::In(
            column.to_string(),
            values.iter().map(|v| v.as_ref().to_string()).collect(),
        ));
        self
    }

    pub fn is_null(mut self, column: &str) -> Self {
        self.filters.push(Filter::IsNull(column.to_string()));
        self
    }

    pub fn not_null(mut self, column: &str) -> Self {
        self.filters.push(Filter::NotNull(column.to_string()));
        self
    }

    pub fn or(mut self, any_of: Vec<Filter>) -> Self {
        self.filters.push(Filter::Or(any_of));
        self
    }

    pub fn order_asc(mut self, column: &str) -> Self {
        self.order = Some(Order {
            column: column.to_string(),
            descending: false,
        });
        self
    }

    pub fn order_desc(mut self, column: &str) -> Self {
        self.order = Some(Order {
            column: column.to_string(),
            descending: true,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn to_query_string(&self) -> String {
        let mut parts = Vec::new();
        if let Some(select) = self.select.as_deref() {
            parts.push(format!("select={select}"));
        }
        for filter in &self.filters {
            let (col, op) = filter.column_op();
            parts.push(format!("{col}={op}"));
        }
        if let Some(order) = self.order.as_ref() {
            let dir = if order.descending { "desc" } else { "asc" };
            parts.push(format!("order={}.{dir}", order.column));
        }
        if let Some(offset) = self.offset {
            parts.push(format!("offset={offset}"));
        }
        if let Some(limit) = self.limit {
            parts.push(format!("limit={limit}"));
        }
        parts.join("&")
    }
}

pub trait RecordStore {
    fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, StoreError>;

    /// Exact number of rows matching the query's filters.
    fn count(&self, table: &str, query: &Query) -> Result<u64, StoreError>;

    fn patch(&self, table: &str, query: &Query, body: &Value) -> Result<(), StoreError>;

    /// Returns the inserted row as the store echoes it, or `Null`.
    fn insert(&self, table: &str, body: &Value) -> Result<Value, StoreError>;
}

/// Reads every matching row, `page_size` at a time, until an empty or short page.
pub fn fetch_all(
    store: &dyn RecordStore,
    table: &str,
    query: &Query,
    page_size: usize,
) -> Result<Vec<Value>, StoreError> {
    let page_size = page_size.max(1);
    let mut rows = Vec::new();
    let mut offset = 0usize;
    loop {
        let page_query = query.clone().offset(offset).limit(page_size);
        let batch = store.select(table, &page_query)?;
        let fetched = batch.len();
        rows.extend(batch);
        if fetched < page_size {
            break;
        }
        offset += page_size;
    }
    Ok(rows)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub updated: usize,
    pub failed: usize,
}

/// Patches rows by id with `id=in.(...)`, `batch_size` ids per request. A failed
/// batch is logged and counted; later batches still run.
pub fn patch_ids_in_batches(
    store: &dyn RecordStore,
    table: &str,
    ids: &[String],
    batch_size: usize,
    body: &Value,
) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();
    for chunk in ids.chunks(batch_size.max(1)) {
        let query = Query::new().in_list("id", chunk);
        match store.patch(table, &query, body) {
            Ok(()) => outcome.updated += chunk.len(),
            Err(err) => {
                warn!("batch update of {} {table} rows failed: {err}", chunk.len());
                outcome.failed += chunk.len();
            }
        }
    }
    outcome
}

/// Total from a `Content-Range` header such as `0-24/3573` or `*/0`.
pub fn parse_content_range_total(raw: &str) -> Option<u64> {
    let (_, total) = raw.trim().rsplit_once('/')?;
    total.trim().parse::<u64>().ok()
}

/// Row id as text; the store hands out both numeric and uuid ids.
pub fn row_id(row: &Value) -> Option<String> {
    id_field(row, "id")
}

/// String or numeric column as text, for id and foreign-key columns.
pub fn id_field(row: &Value, key: &str) -> Option<String> {
    match row.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn str_field<'a>(row: &'a Value, key: &str) -> Option<&'a str> {
    row.get(key).and_then(Value::as_str)
}

pub fn bool_field(row: &Value, key: &str) -> bool {
    row.get(key).and_then(Value::as_bool).unwrap_or(false)
}
