//! Process-local table store with the same observable semantics as the hosted
//! one: generated ids, `created_at` stamping, equality filters, ordering, and
//! embedded (optionally inner-joined) employee rows, and the unique keys on
//! payroll `(employee_id, month, year)` and attendance `(employee_id, date)`.
//!
//! Besides backing `memory://` runs, it records how often each table was read
//! and can inject latency or failures, which the cache tests rely on.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{Embed, Filter, Gateway, GatewayError, SelectQuery, Table};

#[derive(Default)]
pub struct InMemoryGateway {
    tables: Mutex<HashMap<Table, Vec<Value>>>,
    objects: Mutex<HashMap<String, Vec<u8>>>,
    selects: Mutex<HashMap<Table, usize>>,
    writes: Mutex<HashMap<Table, usize>>,
    failing_selects: Mutex<HashMap<Table, usize>>,
    latency: Mutex<Option<Duration>>,
    last_stamp: Mutex<Option<DateTime<Utc>>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call sleeps this long before touching the tables.
    pub fn set_latency(&self, latency: Duration) {
        *lock(&self.latency) = Some(latency);
    }

    /// The next `count` selects against `table` fail with a 503.
    pub fn fail_next_selects(&self, table: Table, count: usize) {
        *lock(&self.failing_selects).entry(table).or_default() += count;
    }

    pub fn select_count(&self, table: Table) -> usize {
        lock(&self.selects).get(&table).copied().unwrap_or(0)
    }

    pub fn write_count(&self, table: Table) -> usize {
        lock(&self.writes).get(&table).copied().unwrap_or(0)
    }

    pub fn rows(&self, table: Table) -> Vec<Value> {
        lock(&self.tables).get(&table).cloned().unwrap_or_default()
    }

    pub fn object(&self, bucket: &str, path: &str) -> Option<Vec<u8>> {
        lock(&self.objects).get(&object_key(bucket, path)).cloned()
    }

    /// Stores rows directly, bypassing counters and latency.
    pub fn seed(&self, table: Table, rows: Vec<Value>) -> Result<Vec<Value>, GatewayError> {
        let stored = rows
            .into_iter()
            .map(|row| self.stamp(row))
            .collect::<Result<Vec<_>, _>>()?;
        lock(&self.tables)
            .entry(table)
            .or_default()
            .extend(stored.iter().cloned());
        Ok(stored)
    }

    /// Strictly increasing timestamps so `created_at` ordering is total.
    fn next_stamp(&self) -> String {
        let mut last = lock(&self.last_stamp);
        let mut now = Utc::now();
        if let Some(prev) = *last {
            if now <= prev {
                now = prev + chrono::Duration::microseconds(1);
            }
        }
        *last = Some(now);
        now.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    fn stamp(&self, row: Value) -> Result<Value, GatewayError> {
        let Value::Object(mut obj) = row else {
            return Err(GatewayError::Api {
                status: 400,
                message: "rows must be JSON objects".into(),
            });
        };
        if !obj.contains_key("id") {
            obj.insert("id".into(), Value::String(Uuid::new_v4().to_string()));
        }
        if !obj.contains_key("created_at") {
            obj.insert("created_at".into(), Value::String(self.next_stamp()));
        }
        Ok(Value::Object(obj))
    }

    async fn delay(&self) {
        let latency = *lock(&self.latency);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn bump(counter: &Mutex<HashMap<Table, usize>>, table: Table) {
        *lock(counter).entry(table).or_default() += 1;
    }

    fn take_failure(&self, table: Table) -> bool {
        let mut failing = lock(&self.failing_selects);
        match failing.get_mut(&table) {
            Some(n) if *n > 0 => {
                *n -= 1;
                true
            }
            _ => false,
        }
    }

    fn embed_row(&self, tables: &HashMap<Table, Vec<Value>>, row: Value, embed: &Embed) -> Option<Value> {
        let Value::Object(mut obj) = row else {
            return Some(row);
        };
        let related = obj
            .get(embed.foreign_key)
            .and_then(|fk| {
                tables
                    .get(&embed.table)?
                    .iter()
                    .find(|candidate| candidate.get("id") == Some(fk))
            })
            .map(|found| {
                let picked: Map<String, Value> = embed
                    .columns
                    .iter()
                    .map(|c| (c.to_string(), found.get(*c).cloned().unwrap_or(Value::Null)))
                    .collect();
                Value::Object(picked)
            });

        match related {
            None if embed.inner => None,
            related => {
                obj.insert(embed.table.to_string(), related.unwrap_or(Value::Null));
                Some(Value::Object(obj))
            }
        }
    }
}

/// Columns no two rows of `table` may share.
fn unique_key(table: Table) -> Option<&'static [&'static str]> {
    match table {
        Table::Payroll => Some(&["employee_id", "month", "year"]),
        Table::Attendance => Some(&["employee_id", "date"]),
        _ => None,
    }
}

fn check_unique(existing: &[Value], incoming: &[Value], columns: &[&str]) -> Result<(), GatewayError> {
    let key_of = |row: &Value| -> Vec<String> {
        columns
            .iter()
            .map(|c| row.get(*c).map(render).unwrap_or_default())
            .collect()
    };
    let mut seen: HashSet<Vec<String>> = existing.iter().map(key_of).collect();
    for row in incoming {
        let key = key_of(row);
        if !seen.insert(key.clone()) {
            return Err(GatewayError::Conflict(format!(
                "duplicate key ({}) = ({})",
                columns.join(", "),
                key.join(", ")
            )));
        }
    }
    Ok(())
}

fn object_key(bucket: &str, path: &str) -> String {
    format!("{bucket}/{path}")
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".into(),
        other => other.to_string(),
    }
}

fn matches(row: &Value, filters: &[Filter]) -> bool {
    filters.iter().all(|f| {
        let cell = row.get(&f.column).unwrap_or(&Value::Null);
        match (cell, f.value.parse::<f64>()) {
            (Value::Number(n), Ok(wanted)) => n.as_f64() == Some(wanted),
            _ => render(cell) == f.value,
        }
    })
}

fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (x, y) => render(x).cmp(&render(y)),
    }
}

#[async_trait]
impl Gateway for InMemoryGateway {
    async fn select(&self, table: Table, query: &SelectQuery) -> Result<Vec<Value>, GatewayError> {
        self.delay().await;
        Self::bump(&self.selects, table);
        if self.take_failure(table) {
            return Err(GatewayError::Api {
                status: 503,
                message: format!("{table} temporarily unavailable"),
            });
        }

        let tables = lock(&self.tables);
        let mut rows: Vec<Value> = tables
            .get(&table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| matches(row, &query.filters))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = query.order {
            let null = Value::Null;
            rows.sort_by(|a, b| {
                let ord = compare(
                    a.get(order.column).unwrap_or(&null),
                    b.get(order.column).unwrap_or(&null),
                );
                if order.ascending { ord } else { ord.reverse() }
            });
        }

        if let Some(embed) = &query.embed {
            rows = rows
                .into_iter()
                .filter_map(|row| self.embed_row(&tables, row, embed))
                .collect();
        }
        Ok(rows)
    }

    async fn insert(&self, table: Table, rows: Vec<Value>) -> Result<Vec<Value>, GatewayError> {
        self.delay().await;
        Self::bump(&self.writes, table);
        // stamp everything first so a bad row leaves the table untouched
        let stored = rows
            .into_iter()
            .map(|row| self.stamp(row))
            .collect::<Result<Vec<_>, _>>()?;
        let mut tables = lock(&self.tables);
        let rows = tables.entry(table).or_default();
        if let Some(columns) = unique_key(table) {
            check_unique(rows, &stored, columns)?;
        }
        rows.extend(stored.iter().cloned());
        Ok(stored)
    }

    async fn update(
        &self,
        table: Table,
        filters: &[Filter],
        patch: Value,
    ) -> Result<Vec<Value>, GatewayError> {
        self.delay().await;
        Self::bump(&self.writes, table);
        let Value::Object(patch) = patch else {
            return Err(GatewayError::Api {
                status: 400,
                message: "update payload must be a JSON object".into(),
            });
        };

        let mut tables = lock(&self.tables);
        let mut updated = Vec::new();
        for row in tables.entry(table).or_default().iter_mut() {
            if !matches(row, filters) {
                continue;
            }
            if let Value::Object(obj) = row {
                for (k, v) in &patch {
                    obj.insert(k.clone(), v.clone());
                }
            }
            updated.push(row.clone());
        }
        Ok(updated)
    }

    async fn delete(&self, table: Table, filters: &[Filter]) -> Result<Vec<Value>, GatewayError> {
        self.delay().await;
        Self::bump(&self.writes, table);
        let mut tables = lock(&self.tables);
        let rows = tables.entry(table).or_default();
        let (removed, kept): (Vec<Value>, Vec<Value>) =
            rows.drain(..).partition(|row| matches(row, filters));
        *rows = kept;
        Ok(removed)
    }

    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), GatewayError> {
        self.delay().await;
        let mut objects = lock(&self.objects);
        let key = object_key(bucket, path);
        if objects.contains_key(&key) {
            return Err(GatewayError::Storage(format!("object `{key}` already exists")));
        }
        objects.insert(key, bytes);
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("memory://{bucket}/{path}")
    }
}
