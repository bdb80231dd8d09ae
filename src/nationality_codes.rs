//! Corrective passes over `players.nationality_code`.
//!
//! Nationality codes are plain ISO 3166-1 here, so flags come from regional
//! indicators rather than the football flag table (SC is Seychelles).

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde_json::json;
use tracing::{info, warn};

use crate::flags::{WHITE_FLAG, regional_indicator_flag};
use crate::nationality::code_for_nationality_name;
use crate::store::{Filter, Query, RecordStore, row_id, str_field};

const TABLE: &str = "players";
const NIGERIA: &str = "Nigeria";
const NIGERIA_CODE: &str = "NG";
const NIGER_CODE: &str = "NE";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NationalityCount {
    pub nationality: String,
    pub players: usize,
    /// Code the fix table maps this nationality to, if any.
    pub code: Option<&'static str>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MissingCodesSummary {
    pub fetched: usize,
    pub updated: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Most common nationality first.
    pub breakdown: Vec<NationalityCount>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NigerFixSummary {
    pub fetched: usize,
    pub updated: usize,
    pub failed: usize,
    pub names: Vec<String>,
}

pub fn nationality_flag(code: &str) -> String {
    regional_indicator_flag(code).unwrap_or_else(|| WHITE_FLAG.to_string())
}

/// Players with a nationality name but no code: patch code and flag where the
/// name is a known long form, skip the rest.
pub fn fix_missing_codes(store: &dyn RecordStore) -> Result<MissingCodesSummary> {
    let query = Query::new()
        .select("id,name,nationality,nationality_code,nationality_flag")
        .or(vec![
            Filter::IsNull("nationality_code".to_string()),
            Filter::Eq("nationality_code".to_string(), String::new()),
        ])
        .not_null("nationality");
    let players = store
        .select(TABLE, &query)
        .context("failed fetching players with missing codes")?;
    info!("Found {} players with missing nationality codes", players.len());

    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for player in &players {
        let nationality = str_field(player, "nationality").unwrap_or("Unknown");
        *counts.entry(nationality.to_string()).or_default() += 1;
    }
    let mut breakdown = counts
        .into_iter()
        .map(|(nationality, players)| NationalityCount {
            code: code_for_nationality_name(&nationality),
            nationality,
            players,
        })
        .collect::<Vec<_>>();
    breakdown.sort_by(|a, b| b.players.cmp(&a.players));

    let mut summary = MissingCodesSummary {
        fetched: players.len(),
        breakdown,
        ..MissingCodesSummary::default()
    };
    for player in &players {
        let name = str_field(player, "name").unwrap_or_default();
        let nationality = str_field(player, "nationality").unwrap_or_default();
        let Some(code) = code_for_nationality_name(nationality) else {
            summary.skipped += 1;
            if !nationality.is_empty() {
                warn!("No mapping for: {name} ({nationality})");
            }
            continue;
        };
        let Some(id) = row_id(player) else {
            summary.failed += 1;
            continue;
        };
        let flag = nationality_flag(code);
        let body = json!({ "nationality_code": code, "nationality_flag": flag });
        match store.patch(TABLE, &Query::new().eq("id", &id), &body) {
            Ok(()) => {
                summary.updated += 1;
                info!("Fixed: {name} -> {flag} {nationality} ({code})");
            }
            Err(err) => {
                summary.failed += 1;
                warn!("Failed to update {name}: {err}");
            }
        }
    }
    Ok(summary)
}

/// Players coded `NE` were Nigerians mis-resolved to Niger; recode them.
pub fn fix_niger_codes(store: &dyn RecordStore) -> Result<NigerFixSummary> {
    let query = Query::new()
        .select("id,name,nationality,nationality_code")
        .eq("nationality_code", NIGER_CODE);
    let players = store
        .select(TABLE, &query)
        .context("failed fetching players coded NE")?;
    info!("Found {} players with NE (Niger) code", players.len());

    let flag = nationality_flag(NIGERIA_CODE);
    let body = json!({
        "nationality": NIGERIA,
        "nationality_code": NIGERIA_CODE,
        "nationality_flag": flag,
    });
    let mut summary = NigerFixSummary {
        fetched: players.len(),
        ..NigerFixSummary::default()
    };
    for player in &players {
        let name = str_field(player, "name").unwrap_or_default().to_string();
        let Some(id) = row_id(player) else {
            summary.failed += 1;
            continue;
        };
        match store.patch(TABLE, &Query::new().eq("id", &id), &body) {
            Ok(()) => {
                summary.updated += 1;
                info!("Fixed: {name} -> {flag} {NIGERIA} ({NIGERIA_CODE})");
                summary.names.push(name);
            }
            Err(err) => {
                summary.failed += 1;
                warn!("Error updating {name}: {err}");
            }
        }
    }
    Ok(summary)
}
