//! In-memory [`TableStore`] used by the integration tests (and by nothing
//! else — the daemon always talks to a remote store). Supports simulating a
//! partially-migrated schema and recording every write attempt so tests can
//! assert the single-retry contract.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use chrono::Utc;
use serde_json::Value;

use super::{Filter, Order, Row, StoreError, TableStore};

#[derive(Default)]
struct Table {
    rows: Vec<Row>,
    next_id: i64,
}

#[derive(Default)]
struct Inner {
    tables: HashMap<String, Table>,
    missing_columns: HashMap<String, HashSet<String>>,
    missing_tables: HashSet<String>,
    fail_all: Option<String>,
    attempts: Vec<String>,
}

#[derive(Default)]
pub struct MemStore {
    inner: Mutex<Inner>,
    label: String,
}

impl MemStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::default(),
            label: "memory".to_string(),
        }
    }

    pub fn with_label(label: &str) -> Self {
        Self {
            inner: Mutex::default(),
            label: label.to_string(),
        }
    }

    /// Simulate a remote schema that lacks `column` on `table`: any write
    /// whose payload carries it fails with `MissingColumn`.
    pub fn mark_column_missing(&self, table: &str, column: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .missing_columns
            .entry(table.to_string())
            .or_default()
            .insert(column.to_string());
    }

    /// Simulate an unprovisioned table: every operation on it fails.
    pub fn mark_table_missing(&self, table: &str) {
        self.inner
            .lock()
            .unwrap()
            .missing_tables
            .insert(table.to_string());
    }

    /// Fail every call with a connectivity-style error.
    pub fn fail_all(&self, message: &str) {
        self.inner.lock().unwrap().fail_all = Some(message.to_string());
    }

    /// One line per write attempt: `<op> <table> [sorted,payload,keys]`.
    pub fn attempts(&self) -> Vec<String> {
        self.inner.lock().unwrap().attempts.clone()
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        let inner = self.inner.lock().unwrap();
        inner
            .tables
            .get(table)
            .map(|t| t.rows.iter().cloned().map(Value::Object).collect())
            .unwrap_or_default()
    }

    pub fn seed(&self, table: &str, rows: Vec<Row>) {
        let mut inner = self.inner.lock().unwrap();
        let t = inner.tables.entry(table.to_string()).or_default();
        for mut row in rows {
            t.next_id += 1;
            row.entry("id".to_string())
                .or_insert_with(|| Value::from(t.next_id));
            t.rows.push(row);
        }
    }
}

fn values_eq(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn matches(row: &Row, filters: &[Filter]) -> bool {
    filters.iter().all(|f| {
        row.get(&f.column)
            .map(|v| values_eq(v, &f.value))
            .unwrap_or(false)
    })
}

fn sort_rows(rows: &mut [Row], order: &Order) {
    rows.sort_by(|a, b| {
        let av = a.get(&order.column).cloned().unwrap_or(Value::Null);
        let bv = b.get(&order.column).cloned().unwrap_or(Value::Null);
        let cmp = match (av.as_f64(), bv.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal),
            _ => av
                .as_str()
                .unwrap_or_default()
                .cmp(bv.as_str().unwrap_or_default()),
        };
        if order.ascending {
            cmp
        } else {
            cmp.reverse()
        }
    });
}

impl Inner {
    fn guard(&self, table: &str) -> Result<(), StoreError> {
        if let Some(msg) = &self.fail_all {
            return Err(StoreError::Transport(msg.clone()));
        }
        if self.missing_tables.contains(table) {
            return Err(StoreError::MissingTable {
                table: table.to_string(),
            });
        }
        Ok(())
    }

    fn guard_columns(&self, table: &str, payload: &Row) -> Result<(), StoreError> {
        if let Some(missing) = self.missing_columns.get(table) {
            for key in payload.keys() {
                if missing.contains(key) {
                    return Err(StoreError::MissingColumn {
                        table: table.to_string(),
                        column: key.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    fn log_write(&mut self, op: &str, table: &str, payload: &Row) {
        let mut keys: Vec<&str> = payload.keys().map(String::as_str).collect();
        keys.sort_unstable();
        self.attempts.push(format!("{op} {table} [{}]", keys.join(",")));
    }

    fn complete(table: &mut Table, row: &mut Row) {
        table.next_id += 1;
        row.entry("id".to_string())
            .or_insert_with(|| Value::from(table.next_id));
        let now = Utc::now().to_rfc3339();
        row.entry("created_at".to_string())
            .or_insert_with(|| Value::from(now.clone()));
        row.entry("updated_at".to_string())
            .or_insert_with(|| Value::from(now));
    }
}

impl TableStore for MemStore {
    fn select(
        &self,
        table: &str,
        filters: &[Filter],
        order: Option<&Order>,
    ) -> Result<Vec<Value>, StoreError> {
        let inner = self.inner.lock().unwrap();
        inner.guard(table)?;
        let mut rows: Vec<Row> = inner
            .tables
            .get(table)
            .map(|t| t.rows.iter().filter(|r| matches(r, filters)).cloned().collect())
            .unwrap_or_default();
        if let Some(o) = order {
            sort_rows(&mut rows, o);
        }
        Ok(rows.into_iter().map(Value::Object).collect())
    }

    fn select_one(&self, table: &str, filters: &[Filter]) -> Result<Option<Value>, StoreError> {
        Ok(self.select(table, filters, None)?.into_iter().next())
    }

    fn insert(&self, table: &str, row: &Row) -> Result<Value, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.log_write("insert", table, row);
        inner.guard(table)?;
        inner.guard_columns(table, row)?;
        let t = inner.tables.entry(table.to_string()).or_default();
        let mut stored = row.clone();
        Inner::complete(t, &mut stored);
        t.rows.push(stored.clone());
        Ok(Value::Object(stored))
    }

    fn update(&self, table: &str, filters: &[Filter], patch: &Row) -> Result<Value, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.log_write("update", table, patch);
        inner.guard(table)?;
        inner.guard_columns(table, patch)?;
        let t = inner.tables.entry(table.to_string()).or_default();
        let mut first = None;
        for row in t.rows.iter_mut().filter(|r| matches(r, filters)) {
            for (k, v) in patch {
                row.insert(k.clone(), v.clone());
            }
            if first.is_none() {
                first = Some(row.clone());
            }
        }
        first.map(Value::Object).ok_or(StoreError::NotFound)
    }

    fn upsert(
        &self,
        table: &str,
        rows: &[Row],
        on_conflict: &[&str],
    ) -> Result<Vec<Value>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.guard(table)?;
        for row in rows {
            inner.log_write("upsert", table, row);
            inner.guard_columns(table, row)?;
        }
        let t = inner.tables.entry(table.to_string()).or_default();
        let mut out = Vec::new();
        for row in rows {
            let key_filters: Vec<Filter> = on_conflict
                .iter()
                .filter_map(|c| {
                    row.get(*c)
                        .map(|v| Filter::eq(c, v.clone()))
                })
                .collect();
            let existing = t
                .rows
                .iter_mut()
                .find(|r| !key_filters.is_empty() && matches(r, &key_filters));
            match existing {
                Some(r) => {
                    for (k, v) in row {
                        r.insert(k.clone(), v.clone());
                    }
                    out.push(Value::Object(r.clone()));
                }
                None => {
                    let mut stored = row.clone();
                    Inner::complete(t, &mut stored);
                    t.rows.push(stored.clone());
                    out.push(Value::Object(stored));
                }
            }
        }
        Ok(out)
    }

    fn delete(&self, table: &str, filters: &[Filter]) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.guard(table)?;
        let t = inner.tables.entry(table.to_string()).or_default();
        let before = t.rows.len();
        t.rows.retain(|r| !matches(r, filters));
        Ok((before - t.rows.len()) as u64)
    }

    fn search(
        &self,
        table: &str,
        columns: &[&str],
        needle: &str,
        order: Option<&Order>,
    ) -> Result<Vec<Value>, StoreError> {
        let needle = needle.to_lowercase();
        let inner = self.inner.lock().unwrap();
        inner.guard(table)?;
        let mut rows: Vec<Row> = inner
            .tables
            .get(table)
            .map(|t| {
                t.rows
                    .iter()
                    .filter(|r| {
                        columns.iter().any(|c| {
                            r.get(*c)
                                .and_then(Value::as_str)
                                .map(|v| v.to_lowercase().contains(&needle))
                                .unwrap_or(false)
                        })
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        if let Some(o) = order {
            sort_rows(&mut rows, o);
        }
        Ok(rows.into_iter().map(Value::Object).collect())
    }

    fn label(&self) -> &str {
        &self.label
    }
}
