//! REST client for the production records base.
//!
//! Speaks the Airtable-compatible dialect: bearer-key auth, table-scoped
//! endpoints under `/{base_id}/{table}`, `filterByFormula` query filters,
//! `{"records": [...]}` envelopes.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use super::{
    Fields, Record, RecordUpdate, RecordsBase, RecordsError, RecordsResult, SelectOptions,
    SortDirection,
};

#[derive(Clone, Debug)]
pub struct RestBaseConfig {
    /// API root, e.g. `https://api.airtable.com/v0`.
    pub api_url: String,
    pub api_key: String,
    pub base_id: String,
    pub timeout_secs: u64,
}

impl RestBaseConfig {
    pub fn new(api_url: String, api_key: String, base_id: String) -> Self {
        Self {
            api_url,
            api_key,
            base_id,
            timeout_secs: 30,
        }
    }
}

pub struct RestBase {
    client: Client,
    config: RestBaseConfig,
}

#[derive(Deserialize)]
struct RecordsEnvelope {
    records: Vec<Record>,
}

#[derive(Serialize)]
struct CreateEnvelope {
    records: Vec<CreateRecord>,
    typecast: bool,
}

#[derive(Serialize)]
struct CreateRecord {
    fields: Fields,
}

#[derive(Serialize)]
struct UpdateEnvelope {
    records: Vec<RecordUpdate>,
    typecast: bool,
}

impl RestBase {
    pub fn new(config: RestBaseConfig) -> RecordsResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    fn table_url(&self, table: &str) -> String {
        format!(
            "{}/{}/{}",
            self.config.api_url.trim_end_matches('/'),
            self.config.base_id,
            urlencode(table)
        )
    }

    fn record_url(&self, table: &str, record_id: &str) -> String {
        format!("{}/{}", self.table_url(table), record_id)
    }

    async fn check(resp: reqwest::Response) -> RecordsResult<reqwest::Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message = resp.text().await.unwrap_or_default();
        Err(RecordsError::Api {
            status: status.as_u16(),
            message: extract_api_message(&message),
        })
    }
}

/// Flatten the base's error envelope (`{"error": {"type", "message"}}` or
/// `{"error": "..."}`); fall back to the raw body.
fn extract_api_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        match &value["error"] {
            serde_json::Value::String(s) => return s.clone(),
            err @ serde_json::Value::Object(_) => {
                if let Some(msg) = err["message"].as_str() {
                    return msg.to_string();
                }
            }
            _ => {}
        }
    }
    body.to_string()
}

/// Query parameters for a select, in the dialect's bracketed-array form.
fn select_params(options: &SelectOptions) -> Vec<(String, String)> {
    let mut params = Vec::new();
    if let Some(formula) = &options.filter_by_formula {
        params.push(("filterByFormula".to_string(), formula.clone()));
    }
    if let Some(max) = options.max_records {
        params.push(("maxRecords".to_string(), max.to_string()));
    }
    for (i, sort) in options.sort.iter().enumerate() {
        params.push((format!("sort[{i}][field]"), sort.field.clone()));
        let direction = match sort.direction {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        };
        params.push((format!("sort[{i}][direction]"), direction.to_string()));
    }
    params
}

fn urlencode(s: &str) -> String {
    // Table names contain non-ASCII words and spaces; nothing else needs
    // escaping in this dialect.
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

#[async_trait]
impl RecordsBase for RestBase {
    async fn select(&self, table: &str, options: SelectOptions) -> RecordsResult<Vec<Record>> {
        let resp = self
            .client
            .get(self.table_url(table))
            .bearer_auth(&self.config.api_key)
            .query(&select_params(&options))
            .send()
            .await?;
        let envelope: RecordsEnvelope = Self::check(resp).await?.json().await?;
        Ok(envelope.records)
    }

    async fn find(&self, table: &str, record_id: &str) -> RecordsResult<Record> {
        let resp = self
            .client
            .get(self.record_url(table, record_id))
            .bearer_auth(&self.config.api_key)
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(RecordsError::RecordNotFound(record_id.to_string()));
        }
        Ok(Self::check(resp).await?.json().await?)
    }

    async fn create(&self, table: &str, records: Vec<Fields>) -> RecordsResult<Vec<Record>> {
        let payload = CreateEnvelope {
            records: records
                .into_iter()
                .map(|fields| CreateRecord { fields })
                .collect(),
            typecast: true,
        };
        let resp = self
            .client
            .post(self.table_url(table))
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await?;
        let envelope: RecordsEnvelope = Self::check(resp).await?.json().await?;
        Ok(envelope.records)
    }

    async fn update(&self, table: &str, updates: Vec<RecordUpdate>) -> RecordsResult<Vec<Record>> {
        let payload = UpdateEnvelope {
            records: updates,
            typecast: true,
        };
        let resp = self
            .client
            .patch(self.table_url(table))
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await?;
        let envelope: RecordsEnvelope = Self::check(resp).await?.json().await?;
        Ok(envelope.records)
    }

    async fn destroy(&self, table: &str, record_ids: &[String]) -> RecordsResult<()> {
        let params: Vec<(&str, &str)> = record_ids
            .iter()
            .map(|id| ("records[]", id.as_str()))
            .collect();
        let resp = self
            .client
            .delete(self.table_url(table))
            .bearer_auth(&self.config.api_key)
            .query(&params)
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(RecordsError::RecordNotFound(record_ids.join(",")));
        }
        Self::check(resp).await?;
        Ok(())
    }
}
