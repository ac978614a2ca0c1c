//! Records-base client abstraction.
//!
//! The external base is a spreadsheet-style database: named tables of
//! records with named fields, queried with formula filters. This module
//! defines the client contract plus two implementations:
//! - REST (the production Airtable-compatible HTTP API)
//! - in-memory (test double with a minimal formula evaluator)

mod memory;
mod rest;

pub use memory::MemoryBase;
pub use rest::{RestBase, RestBaseConfig};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Named fields of one record, as loose JSON values.
pub type Fields = serde_json::Map<String, serde_json::Value>;

#[derive(Error, Debug)]
pub enum RecordsError {
    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Base API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unsupported filter formula: {0}")]
    Filter(String),
}

pub type RecordsResult<T> = Result<T, RecordsError>;

/// One raw record as returned by the base.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Record {
    pub id: String,
    pub fields: Fields,
    #[serde(rename = "createdTime", default)]
    pub created_time: Option<DateTime<Utc>>,
}

impl Record {
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|v| v.as_str())
    }

    pub fn i64_field(&self, name: &str) -> Option<i64> {
        self.fields.get(name).and_then(|v| v.as_i64())
    }

    /// A list-valued field (linked records, multi-selects) as strings.
    /// Missing fields and non-arrays read as empty.
    pub fn list_field(&self, name: &str) -> Vec<String> {
        match self.fields.get(name) {
            Some(serde_json::Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// First entry of a list-valued field, if any.
    pub fn first_link(&self, name: &str) -> Option<String> {
        self.list_field(name).into_iter().next()
    }

    /// The field rendered the way the base renders it inside a formula:
    /// scalars as their text, lists joined with a comma.
    pub fn display(&self, name: &str) -> String {
        match self.fields.get(name) {
            None => String::new(),
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Array(items)) => items
                .iter()
                .map(|v| match v {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
            Some(other) => other.to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Clone, Debug)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

/// First-page query options; the application never paginates further.
#[derive(Clone, Debug, Default)]
pub struct SelectOptions {
    pub filter_by_formula: Option<String>,
    pub sort: Vec<SortSpec>,
    pub max_records: Option<usize>,
}

impl SelectOptions {
    pub fn filter(formula: impl Into<String>) -> Self {
        Self {
            filter_by_formula: Some(formula.into()),
            ..Self::default()
        }
    }

    pub fn sorted_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort.push(SortSpec {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn max(mut self, n: usize) -> Self {
        self.max_records = Some(n);
        self
    }
}

/// Fields to write into an existing record.
#[derive(Clone, Debug, Serialize)]
pub struct RecordUpdate {
    pub id: String,
    pub fields: Fields,
}

/// Table-scoped CRUD over the external base.
#[async_trait]
pub trait RecordsBase: Send + Sync {
    /// First page of records matching the options.
    async fn select(&self, table: &str, options: SelectOptions) -> RecordsResult<Vec<Record>>;

    /// One record by store-level id.
    async fn find(&self, table: &str, record_id: &str) -> RecordsResult<Record>;

    /// Create records; returns them with computed fields filled in.
    async fn create(&self, table: &str, records: Vec<Fields>) -> RecordsResult<Vec<Record>>;

    /// Merge the given fields into existing records.
    async fn update(&self, table: &str, updates: Vec<RecordUpdate>) -> RecordsResult<Vec<Record>>;

    /// Delete records by id. Unknown ids are an error.
    async fn destroy(&self, table: &str, record_ids: &[String]) -> RecordsResult<()>;
}
