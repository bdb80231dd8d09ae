use std::env;
use std::time::Duration;

use crate::store::StoreError;

pub const URL_ENV: &str = "SUPABASE_URL";
pub const KEY_ENV: &str = "SUPABASE_SERVICE_KEY";

const DEFAULT_PAGE_SIZE: usize = 1000;
const DEFAULT_PATCH_BATCH: usize = 100;

/// Loads `.env.local` then `.env` from the working directory. Variables that are
/// already set win; missing files are ignored.
pub fn load_env() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub base_url: String,
    pub service_key: String,
}

impl StoreConfig {
    pub fn new(base_url: &str, service_key: &str) -> Self {
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            service_key: service_key.trim().to_string(),
        }
    }

    pub fn from_env() -> Result<Self, StoreError> {
        let service_key = non_empty_env(KEY_ENV)
            .ok_or_else(|| StoreError::Config(format!("{KEY_ENV} not set in environment")))?;
        let base_url = non_empty_env(URL_ENV)
            .ok_or_else(|| StoreError::Config(format!("{URL_ENV} not set in environment")))?;
        Ok(Self::new(&base_url, &service_key))
    }

    pub fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }
}

pub fn page_size() -> usize {
    usize_env("PIPELINE_PAGE_SIZE")
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, 10_000)
}

pub fn patch_batch_size() -> usize {
    usize_env("PIPELINE_PATCH_BATCH")
        .unwrap_or(DEFAULT_PATCH_BATCH)
        .clamp(1, 1000)
}

pub fn request_delay(default_ms: u64) -> Duration {
    let ms = env::var("PIPELINE_REQUEST_DELAY_MS")
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default_ms);
    Duration::from_millis(ms)
}

fn usize_env(key: &str) -> Option<usize> {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|v| *v > 0)
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
