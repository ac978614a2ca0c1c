//! In-memory records base for tests.
//!
//! Implements just enough of the formula dialect to serve the queries the
//! application actually issues: `{Field} = "value"` (double- or
//! single-quoted, or a bare number) and `FIND("needle", {Field})`.
//! `FIND` matches substrings against the field rendered as a comma-joined
//! string, which reproduces the production filter's contains semantics,
//! false positives on substring ids included.
//!
//! The production base renders linked-record fields through their primary
//! display values; this double renders the stored ids verbatim, so tests
//! seed records whose ids coincide with their display ids.

#![allow(dead_code)] // Seeding and fault-injection helpers are test-only

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use parking_lot::RwLock;

use super::{
    Fields, Record, RecordUpdate, RecordsBase, RecordsError, RecordsResult, SelectOptions,
    SortDirection,
};

#[derive(Default)]
struct Table {
    records: Vec<Record>,
    autonumber: i64,
}

#[derive(Default)]
pub struct MemoryBase {
    tables: RwLock<HashMap<String, Table>>,
    next_record: RwLock<u64>,
    fail_next_create: AtomicBool,
}

impl MemoryBase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record under a caller-chosen id, bypassing create-side
    /// bookkeeping. Test fixtures only.
    pub fn seed(&self, table: &str, id: &str, fields: Fields) {
        let mut tables = self.tables.write();
        let table = tables.entry(table.to_string()).or_default();
        table.records.push(Record {
            id: id.to_string(),
            fields,
            created_time: Some(Utc::now()),
        });
    }

    /// Make the next `create` call fail, for exercising the documented
    /// cross-store partial-failure behavior.
    pub fn fail_next_create(&self) {
        self.fail_next_create.store(true, Ordering::SeqCst);
    }

    fn fresh_record_id(&self) -> String {
        let mut next = self.next_record.write();
        *next += 1;
        format!("rec{:06}", *next)
    }
}

fn matches(record: &Record, formula: &str) -> RecordsResult<bool> {
    let formula = formula.trim();

    if let Some(inner) = formula
        .strip_prefix("FIND(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        let (needle, field) = inner
            .split_once(',')
            .ok_or_else(|| RecordsError::Filter(formula.to_string()))?;
        let needle = unquote(needle.trim())
            .ok_or_else(|| RecordsError::Filter(formula.to_string()))?;
        let field = unbrace(field.trim())
            .ok_or_else(|| RecordsError::Filter(formula.to_string()))?;
        return Ok(record.display(field).contains(needle));
    }

    if let Some((left, right)) = formula.split_once('=') {
        let field = unbrace(left.trim())
            .ok_or_else(|| RecordsError::Filter(formula.to_string()))?;
        let right = right.trim();
        let expected = unquote(right).unwrap_or(right);
        return Ok(record.display(field) == expected);
    }

    Err(RecordsError::Filter(formula.to_string()))
}

fn unquote(s: &str) -> Option<&str> {
    let stripped = s
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .or_else(|| s.strip_prefix('\'').and_then(|rest| rest.strip_suffix('\'')));
    stripped
}

fn unbrace(s: &str) -> Option<&str> {
    s.strip_prefix('{').and_then(|rest| rest.strip_suffix('}'))
}

/// Sort keys compare numerically when both parse as integers, otherwise
/// as text (timestamps in RFC 3339 order correctly either way).
fn compare_keys(a: &str, b: &str) -> std::cmp::Ordering {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}

#[async_trait]
impl RecordsBase for MemoryBase {
    async fn select(&self, table: &str, options: SelectOptions) -> RecordsResult<Vec<Record>> {
        let tables = self.tables.read();
        let records = tables.get(table).map(|t| t.records.as_slice()).unwrap_or(&[]);

        let mut matched = Vec::new();
        for record in records {
            let keep = match &options.filter_by_formula {
                Some(formula) => matches(record, formula)?,
                None => true,
            };
            if keep {
                matched.push(record.clone());
            }
        }

        for sort in options.sort.iter().rev() {
            matched.sort_by(|a, b| {
                let ordering = compare_keys(&a.display(&sort.field), &b.display(&sort.field));
                match sort.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });
        }

        if let Some(max) = options.max_records {
            matched.truncate(max);
        }
        Ok(matched)
    }

    async fn find(&self, table: &str, record_id: &str) -> RecordsResult<Record> {
        let tables = self.tables.read();
        tables
            .get(table)
            .and_then(|t| t.records.iter().find(|r| r.id == record_id))
            .cloned()
            .ok_or_else(|| RecordsError::RecordNotFound(record_id.to_string()))
    }

    async fn create(&self, table: &str, records: Vec<Fields>) -> RecordsResult<Vec<Record>> {
        if self.fail_next_create.swap(false, Ordering::SeqCst) {
            return Err(RecordsError::Api {
                status: 503,
                message: "injected create failure".to_string(),
            });
        }

        let mut created = Vec::with_capacity(records.len());
        for fields in records {
            let id = self.fresh_record_id();
            let mut tables = self.tables.write();
            let table = tables.entry(table.to_string()).or_default();

            // The production base computes an autonumber ID and a creation
            // timestamp; register/upload flows read both back.
            let mut fields = fields;
            if !fields.contains_key("ID") {
                table.autonumber += 1;
                fields.insert("ID".to_string(), serde_json::json!(table.autonumber));
            }
            let now = Utc::now();
            if !fields.contains_key("Дата создания") {
                fields.insert(
                    "Дата создания".to_string(),
                    serde_json::json!(now.to_rfc3339_opts(SecondsFormat::Millis, true)),
                );
            }

            let record = Record {
                id,
                fields,
                created_time: Some(now),
            };
            table.records.push(record.clone());
            created.push(record);
        }
        Ok(created)
    }

    async fn update(&self, table: &str, updates: Vec<RecordUpdate>) -> RecordsResult<Vec<Record>> {
        let mut tables = self.tables.write();
        let table = tables
            .get_mut(table)
            .ok_or_else(|| RecordsError::RecordNotFound(table.to_string()))?;

        let mut updated = Vec::with_capacity(updates.len());
        for RecordUpdate { id, fields } in updates {
            let record = table
                .records
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or_else(|| RecordsError::RecordNotFound(id.clone()))?;
            for (key, value) in fields {
                record.fields.insert(key, value);
            }
            updated.push(record.clone());
        }
        Ok(updated)
    }

    async fn destroy(&self, table: &str, record_ids: &[String]) -> RecordsResult<()> {
        let mut tables = self.tables.write();
        let table = tables
            .get_mut(table)
            .ok_or_else(|| RecordsError::RecordNotFound(record_ids.join(",")))?;

        for id in record_ids {
            let index = table
                .records
                .iter()
                .position(|r| &r.id == id)
                .ok_or_else(|| RecordsError::RecordNotFound(id.clone()))?;
            table.records.remove(index);
        }
        Ok(())
    }
}
