use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::json;
use tracing::{info, warn};

use crate::flags::{FlagTable, WHITE_FLAG};
use crate::nationality::country_for_qid;
use crate::store::{Query, RecordStore, row_id, str_field};
use crate::wiki::{Citizenship, CitizenshipSource};

const TABLE: &str = "players";
pub const TARGET_COVERAGE_PCT: f64 = 80.0;
const PROGRESS_EVERY: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOptions {
    pub dry_run: bool,
    pub limit: Option<usize>,
    pub delay: Duration,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            limit: None,
            delay: Duration::from_millis(300),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Coverage {
    pub total: u64,
    pub with_nationality: u64,
}

impl Coverage {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.with_nationality as f64 / self.total as f64 * 100.0
    }

    /// Players needed for the 80% target, truncated like the dashboards show it.
    pub fn target(&self) -> u64 {
        (self.total as f64 * TARGET_COVERAGE_PCT / 100.0) as u64
    }

    pub fn reached_target(&self) -> bool {
        self.percent() >= TARGET_COVERAGE_PCT
    }

    pub fn missing_to_target(&self) -> u64 {
        self.target().saturating_sub(self.with_nationality)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nationality {
    pub name: String,
    pub code: String,
    pub flag: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateSummary {
    pub before: Coverage,
    pub after: Coverage,
    pub candidates: usize,
    pub updated: usize,
    /// Dry-run hits that would have been written.
    pub would_update: usize,
    pub failed: usize,
}

pub fn coverage(store: &dyn RecordStore) -> Result<Coverage> {
    let total = store
        .count(TABLE, &Query::new().select("id"))
        .context("failed counting players")?;
    let with_nationality = store
        .count(TABLE, &Query::new().select("id").not_null("nationality"))
        .context("failed counting players with nationality")?;
    Ok(Coverage {
        total,
        with_nationality,
    })
}

/// Known country QIDs map to the football table's name and code; anything else
/// keeps the Wikidata label with no code.
pub fn nationality_from_citizenship(citizenship: &Citizenship, flags: &FlagTable) -> Nationality {
    match country_for_qid(&citizenship.country_qid) {
        Some(country) => Nationality {
            name: country.name.to_string(),
            code: country.code.to_string(),
            flag: flags.flag_or_white(country.code).to_string(),
        },
        None => Nationality {
            name: citizenship.label.clone(),
            code: String::new(),
            flag: WHITE_FLAG.to_string(),
        },
    }
}

/// QID lookup first; the name search only counts when it lands on a known country.
pub fn lookup_nationality(
    source: &dyn CitizenshipSource,
    flags: &FlagTable,
    wikidata_id: Option<&str>,
    name: &str,
) -> Option<Nationality> {
    if let Some(qid) = wikidata_id.filter(|q| !q.trim().is_empty()) {
        match source.by_qid(qid) {
            Ok(Some(citizenship)) => {
                let found = nationality_from_citizenship(&citizenship, flags);
                if !found.name.is_empty() {
                    return Some(found);
                }
            }
            Ok(None) => {}
            Err(err) => warn!("Wikidata query failed for {qid}: {err:#}"),
        }
    }

    match source.by_name(name) {
        Ok(Some(citizenship)) => {
            country_for_qid(&citizenship.country_qid).map(|country| Nationality {
                name: country.name.to_string(),
                code: country.code.to_string(),
                flag: flags.flag_or_white(country.code).to_string(),
            })
        }
        Ok(None) => None,
        Err(err) => {
            warn!("Wikidata name search failed for {name}: {err:#}");
            None
        }
    }
}

/// Backfills nationality for players that have none, reporting coverage
/// against the 80% target before and after.
pub fn run(
    store: &dyn RecordStore,
    source: &dyn CitizenshipSource,
    flags: &FlagTable,
    opts: &UpdateOptions,
) -> Result<UpdateSummary> {
    let before = coverage(store)?;
    info!(
        "Current coverage: {}/{} ({:.1}%)",
        before.with_nationality,
        before.total,
        before.percent()
    );
    info!("Target (80%): {} players", before.target());

    let mut query = Query::new()
        .select("id,name,wikidata_id,nationality")
        .is_null("nationality");
    if let Some(limit) = opts.limit {
        query = query.limit(limit);
    }
    let players = store
        .select(TABLE, &query)
        .context("failed fetching players without nationality")?;
    info!("Found {} players without nationality", players.len());

    let mut summary = UpdateSummary {
        before,
        after: before,
        candidates: players.len(),
        ..UpdateSummary::default()
    };
    if players.is_empty() {
        info!("All players already have nationality data");
        return Ok(summary);
    }

    for (idx, player) in players.iter().enumerate() {
        if idx % PROGRESS_EVERY == 0 {
            info!(
                "Progress: {idx}/{} (updated: {}, failed: {})",
                players.len(),
                summary.updated,
                summary.failed
            );
        }
        if idx > 0 && !opts.delay.is_zero() {
            thread::sleep(opts.delay);
        }

        let name = str_field(player, "name").unwrap_or_default();
        let Some(found) = lookup_nationality(source, flags, str_field(player, "wikidata_id"), name)
        else {
            warn!("No nationality found for: {name}");
            summary.failed += 1;
            continue;
        };

        if opts.dry_run {
            info!(
                "Would update: {name} -> {} {} ({})",
                found.flag, found.name, found.code
            );
            summary.would_update += 1;
            continue;
        }

        let Some(id) = row_id(player) else {
            summary.failed += 1;
            continue;
        };
        let body = json!({
            "nationality": found.name,
            "nationality_code": found.code,
            "nationality_flag": found.flag,
        });
        match store.patch(TABLE, &Query::new().eq("id", &id), &body) {
            Ok(()) => {
                summary.updated += 1;
                info!("Updated: {name} -> {} {}", found.flag, found.name);
            }
            Err(err) => {
                summary.failed += 1;
                warn!("Failed to update {name}: {err}");
            }
        }
    }

    summary.after = coverage(store)?;
    Ok(summary)
}
