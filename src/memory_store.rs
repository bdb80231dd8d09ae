use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::store::{Filter, Order, Query, RecordStore, StoreError};

/// In-process `RecordStore` over JSON rows. Understands the same filter subset
/// `Query` can express, so jobs behave the same as against the hosted store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RefCell<HashMap<String, Vec<Value>>>,
    next_id: Cell<u64>,
    fail_writes: Cell<bool>,
    patch_calls: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(self, table: &str, rows: Vec<Value>) -> Self {
        self.tables.borrow_mut().insert(table.to_string(), rows);
        self
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .borrow()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    /// Makes every patch and insert fail with a 500, for error-path tests.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    pub fn patch_calls(&self) -> usize {
        self.patch_calls.get()
    }

    fn write_guard(&self) -> Result<(), StoreError> {
        if self.fail_writes.get() {
            return Err(StoreError::Status {
                status: 500,
                body: "simulated write failure".to_string(),
            });
        }
        Ok(())
    }
}

impl RecordStore for MemoryStore {
    fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, StoreError> {
        let tables = self.tables.borrow();
        let Some(rows) = tables.get(table) else {
            return Ok(Vec::new());
        };
        let mut matched = rows
            .iter()
            .filter(|row| query.filters.iter().all(|f| matches_filter(row, f)))
            .cloned()
            .collect::<Vec<_>>();
        if let Some(order) = query.order.as_ref() {
            sort_rows(&mut matched, order);
        }
        let offset = query.offset.unwrap_or(0);
        let limit = query.limit.unwrap_or(usize::MAX);
        Ok(matched
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|row| project(row, query.select.as_deref()))
            .collect())
    }

    fn count(&self, table: &str, query: &Query) -> Result<u64, StoreError> {
        let tables = self.tables.borrow();
        let Some(rows) = tables.get(table) else {
            return Ok(0);
        };
        Ok(rows
            .iter()
            .filter(|row| query.filters.iter().all(|f| matches_filter(row, f)))
            .count() as u64)
    }

    fn patch(&self, table: &str, query: &Query, body: &Value) -> Result<(), StoreError> {
        self.patch_calls.set(self.patch_calls.get() + 1);
        self.write_guard()?;
        let Some(changes) = body.as_object() else {
            return Err(StoreError::Status {
                status: 400,
                body: "patch body must be an object".to_string(),
            });
        };
        let mut tables = self.tables.borrow_mut();
        let Some(rows) = tables.get_mut(table) else {
            return Ok(());
        };
        for row in rows
            .iter_mut()
            .filter(|row| query.filters.iter().all(|f| matches_filter(row, f)))
        {
            if let Some(obj) = row.as_object_mut() {
                for (key, value) in changes {
                    obj.insert(key.clone(), value.clone());
                }
            }
        }
        Ok(())
    }

    fn insert(&self, table: &str, body: &Value) -> Result<Value, StoreError> {
        self.write_guard()?;
        let mut row = body.clone();
        if let Some(obj) = row.as_object_mut()
            && !obj.contains_key("id")
        {
            let id = self.next_id.get() + 1;
            self.next_id.set(id);
            obj.insert("id".to_string(), Value::from(id));
        }
        self.tables
            .borrow_mut()
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        Ok(row)
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

fn field_text(row: &Value, column: &str) -> Option<String> {
    row.get(column).and_then(value_text)
}

fn matches_filter(row: &Value, filter: &Filter) -> bool {
    match filter {
        Filter::Eq(col, v) => field_text(row, col).is_some_and(|t| &t == v),
        Filter::Neq(col, v) => field_text(row, col).is_some_and(|t| &t != v),
        Filter::Like(col, pattern) => field_text(row, col).is_some_and(|t| glob_match(pattern, &t)),
        Filter::In(col, values) => field_text(row, col).is_some_and(|t| values.contains(&t)),
        Filter::IsNull(col) => field_text(row, col).is_none(),
        Filter::NotNull(col) => field_text(row, col).is_some(),
        Filter::Or(any_of) => any_of.iter().any(|f| matches_filter(row, f)),
    }
}

/// `*` matches any run of characters; everything else is literal.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let parts = pattern.split('*').collect::<Vec<_>>();
    if parts.len() == 1 {
        return pattern == text;
    }
    let mut rest = text;
    let first = parts[0];
    let Some(after_first) = rest.strip_prefix(first) else {
        return false;
    };
    rest = after_first;
    let last = parts[parts.len() - 1];
    for part in &parts[1..parts.len() - 1] {
        let Some(pos) = rest.find(part) else {
            return false;
        };
        rest = &rest[pos + part.len()..];
    }
    rest.ends_with(last)
}

fn sort_rows(rows: &mut [Value], order: &Order) {
    rows.sort_by(|a, b| {
        let ord = compare_field(a.get(&order.column), b.get(&order.column));
        if order.descending { ord.reverse() } else { ord }
    });
}

fn compare_field(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => value_text(a).cmp(&value_text(b)),
        },
    }
}

fn project(row: Value, select: Option<&str>) -> Value {
    let Some(select) = select.map(str::trim).filter(|s| !s.is_empty() && *s != "*") else {
        return row;
    };
    let Value::Object(obj) = row else {
        return row;
    };
    let mut out = Map::new();
    for column in select.split(',').map(str::trim) {
        if let Some(value) = obj.get(column) {
            out.insert(column.to_string(), value.clone());
        }
    }
    Value::Object(out)
}
