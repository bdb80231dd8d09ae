use anyhow::Result;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::CONTENT_RANGE;
use serde_json::Value;
use tracing::debug;

use crate::config::StoreConfig;
use crate::http_client::http_client;
use crate::store::{Query, RecordStore, StoreError, parse_content_range_total};

/// `RecordStore` over the hosted PostgREST endpoint (`/rest/v1/<table>`).
pub struct RestStore {
    config: StoreConfig,
    client: Client,
}

impl RestStore {
    pub fn new(config: StoreConfig) -> Result<Self> {
        Ok(Self {
            config,
            client: http_client()?.clone(),
        })
    }

    pub fn from_env() -> Result<Self> {
        let config = StoreConfig::from_env()?;
        Self::new(config)
    }

    fn url(&self, table: &str, query: &Query) -> String {
        let base = self.config.rest_url(table);
        let qs = query.to_query_string();
        if qs.is_empty() { base } else { format!("{base}?{qs}") }
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("apikey", &self.config.service_key)
            .bearer_auth(&self.config.service_key)
    }
}

fn check_status(resp: Response) -> Result<Response, StoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().unwrap_or_default();
    Err(StoreError::Status {
        status: status.as_u16(),
        body,
    })
}

impl RecordStore for RestStore {
    fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, StoreError> {
        let url = self.url(table, query);
        debug!("GET {url}");
        let resp = check_status(self.authed(self.client.get(&url)).send()?)?;
        let body = resp.text()?;
        let trimmed = body.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str::<Vec<Value>>(trimmed)?)
    }

    fn count(&self, table: &str, query: &Query) -> Result<u64, StoreError> {
        let url = self.url(table, query);
        debug!("HEAD {url}");
        let resp = check_status(
            self.authed(self.client.head(&url))
                .header("Prefer", "count=exact")
                .send()?,
        )?;
        Ok(resp
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range_total)
            .unwrap_or(0))
    }

    fn patch(&self, table: &str, query: &Query, body: &Value) -> Result<(), StoreError> {
        let url = self.url(table, query);
        debug!("PATCH {url}");
        check_status(
            self.authed(self.client.patch(&url))
                .header("Prefer", "return=minimal")
                .json(body)
                .send()?,
        )?;
        Ok(())
    }

    fn insert(&self, table: &str, body: &Value) -> Result<Value, StoreError> {
        let url = self.config.rest_url(table);
        debug!("POST {url}");
        let resp = check_status(
            self.authed(self.client.post(&url))
                .header("Prefer", "return=representation")
                .json(body)
                .send()?,
        )?;
        let text = resp.text()?;
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(Value::Null);
        }
        let parsed: Value = serde_json::from_str(trimmed)?;
        Ok(match parsed {
            Value::Array(mut rows) if !rows.is_empty() => rows.swap_remove(0),
            Value::Array(_) => Value::Null,
            other => other,
        })
    }
}
