use std::collections::BTreeSet;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde_json::json;
use tracing::{info, warn};

use crate::club_country::ClubCountryResolver;
use crate::config;
use crate::store::{Query, RecordStore, fetch_all, patch_ids_in_batches, row_id, str_field};

const TABLE: &str = "career_entries";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixCountriesOptions {
    pub page_size: usize,
    pub batch_size: usize,
}

impl Default for FixCountriesOptions {
    fn default() -> Self {
        Self {
            page_size: 1000,
            batch_size: 100,
        }
    }
}

impl FixCountriesOptions {
    pub fn from_env() -> Self {
        Self {
            page_size: config::page_size(),
            batch_size: config::patch_batch_size(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountryGroup {
    pub code: String,
    pub flag: String,
    pub entries: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixCountriesSummary {
    pub fetched: usize,
    pub updated: usize,
    pub failed: usize,
    pub groups: Vec<CountryGroup>,
    /// Distinct club names nothing matched, sorted.
    pub unmatched: Vec<String>,
}

/// Fills `country_code`/`country_flag` on career entries that have an empty
/// code. Entries are grouped by resolved country and patched by id batch.
pub fn run(
    store: &dyn RecordStore,
    resolver: &ClubCountryResolver,
    opts: FixCountriesOptions,
) -> Result<FixCountriesSummary> {
    info!("Fetching career entries with missing country codes...");
    let query = Query::new()
        .select("id,club")
        .eq("country_code", "")
        .order_asc("id");
    let rows = fetch_all(store, TABLE, &query, opts.page_size)
        .context("failed fetching career entries")?;
    info!("Found {} entries with missing country codes", rows.len());

    let mut by_country: IndexMap<(String, String), Vec<String>> = IndexMap::new();
    let mut unmatched = BTreeSet::new();
    for row in &rows {
        let Some(id) = row_id(row) else {
            warn!("career entry without id skipped");
            continue;
        };
        let club = str_field(row, "club").unwrap_or_default();
        let resolution = resolver.resolve(club);
        if resolution.is_resolved() {
            by_country
                .entry((resolution.code, resolution.flag))
                .or_default()
                .push(id);
        } else {
            unmatched.insert(club.to_string());
        }
    }

    let mut summary = FixCountriesSummary {
        fetched: rows.len(),
        ..FixCountriesSummary::default()
    };
    for ((code, flag), ids) in by_country {
        info!("Updating {} entries with country {code} {flag}...", ids.len());
        let body = json!({ "country_code": code, "country_flag": flag });
        let outcome = patch_ids_in_batches(store, TABLE, &ids, opts.batch_size, &body);
        summary.updated += outcome.updated;
        summary.failed += outcome.failed;
        summary.groups.push(CountryGroup {
            code,
            flag,
            entries: ids.len(),
        });
    }
    summary.unmatched = unmatched.into_iter().collect();
    Ok(summary)
}
