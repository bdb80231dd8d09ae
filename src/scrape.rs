use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::career::{
    CareerEntry, PlayerRecord, career_length_ok, compute_difficulty, compute_reveal_order,
    generate_aliases,
};
use crate::club_country::ClubCountryResolver;
use crate::store::RecordStore;
use crate::wiki::{LeaguePlayer, PlayerSource};
use crate::wikitext::parse_career;

pub const DEFAULT_OUTPUT: &str = "players_data.json";
pub const DEFAULT_PREVIEW_TITLE: &str = "Zinédine_Zidane";
const PROGRESS_EVERY: usize = 100;
const UPLOAD_PROGRESS_EVERY: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeOptions {
    pub limit_per_league: usize,
    pub delay: Duration,
    pub output: PathBuf,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            limit_per_league: 200,
            delay: Duration::from_millis(500),
            output: PathBuf::from(DEFAULT_OUTPUT),
        }
    }
}

impl ScrapeOptions {
    /// Small run written to JSON only.
    pub fn dry() -> Self {
        Self {
            limit_per_league: 30,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeSummary {
    pub listed: usize,
    pub enriched: usize,
    pub missing_wikitext: usize,
    pub rejected_length: usize,
    pub uploaded: usize,
    pub saved_to: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct SavedEntry<'a> {
    years: &'a str,
    club: &'a str,
    country_flag: &'a str,
    matches: u32,
    goals: u32,
    sort_order: u32,
}

#[derive(Debug, Serialize)]
struct SavedPlayer<'a> {
    name: &'a str,
    aliases: &'a [String],
    difficulty: u8,
    career: Vec<SavedEntry<'a>>,
}

/// Career from wikitext in reveal order, or `None` when it is too short or
/// too long for a question.
pub fn build_record(
    player: &LeaguePlayer,
    wikitext: &str,
    resolver: &ClubCountryResolver,
) -> Option<PlayerRecord> {
    let career = parse_career(wikitext, resolver);
    if !career_length_ok(&career) {
        return None;
    }
    let career = compute_reveal_order(career);
    Some(PlayerRecord {
        name: player.name.clone(),
        aliases: generate_aliases(&player.name),
        wikipedia_title: player.wikipedia_title.clone(),
        wikidata_id: player.qid.clone(),
        difficulty: compute_difficulty(&career),
        career,
    })
}

/// League players -> wikitext -> careers, then upload to `store` or save JSON
/// when there is no store.
pub fn run(
    source: &dyn PlayerSource,
    store: Option<&dyn RecordStore>,
    resolver: &ClubCountryResolver,
    opts: &ScrapeOptions,
) -> Result<ScrapeSummary> {
    info!("Starting scrape");
    let listed = source
        .league_players(opts.limit_per_league)
        .context("failed listing league players")?;

    let mut summary = ScrapeSummary {
        listed: listed.len(),
        ..ScrapeSummary::default()
    };
    let mut enriched = Vec::new();
    for (idx, player) in listed.iter().enumerate() {
        if idx % PROGRESS_EVERY == 0 {
            info!("Progress: {idx}/{}", listed.len());
        }
        if idx > 0 && !opts.delay.is_zero() {
            thread::sleep(opts.delay);
        }
        let wikitext = match source.wikitext(&player.wikipedia_title) {
            Ok(Some(text)) => text,
            Ok(None) => {
                summary.missing_wikitext += 1;
                continue;
            }
            Err(err) => {
                warn!("Wikipedia fetch failed for {}: {err:#}", player.wikipedia_title);
                summary.missing_wikitext += 1;
                continue;
            }
        };
        match build_record(player, &wikitext, resolver) {
            Some(record) => enriched.push(record),
            None => summary.rejected_length += 1,
        }
    }
    summary.enriched = enriched.len();
    info!("Enriched {} players", enriched.len());

    match store {
        Some(store) => summary.uploaded = upload(store, &enriched),
        None => {
            save_json(&enriched, &opts.output)?;
            summary.saved_to = Some(opts.output.clone());
        }
    }
    Ok(summary)
}

fn player_row(player: &PlayerRecord) -> Value {
    json!({
        "name": player.name,
        "aliases": player.aliases,
        "wikipedia_title": player.wikipedia_title,
        "wikidata_id": player.wikidata_id,
        "difficulty": player.difficulty,
        "career_club_count": player.career.len(),
    })
}

fn career_row(player_id: &Value, entry: &CareerEntry) -> Value {
    json!({
        "player_id": player_id,
        "sort_order": entry.sort_order,
        "chronological_order": entry.chronological_order,
        "years": entry.years,
        "club": entry.club,
        "country_code": entry.country_code,
        "country_flag": entry.country_flag,
        "matches": entry.matches,
        "goals": entry.goals,
    })
}

/// Inserts each player, then its career entries against the returned id.
/// Players the store does not echo an id for are skipped.
pub fn upload(store: &dyn RecordStore, players: &[PlayerRecord]) -> usize {
    let mut uploaded = 0usize;
    for player in players {
        let inserted = match store.insert("players", &player_row(player)) {
            Ok(row) => row,
            Err(err) => {
                warn!("Insert failed for {}: {err}", player.name);
                continue;
            }
        };
        let Some(player_id) = inserted
            .get("id")
            .filter(|id| id.is_string() || id.is_number())
        else {
            continue;
        };
        for entry in &player.career {
            if let Err(err) = store.insert("career_entries", &career_row(player_id, entry)) {
                warn!("Career entry insert failed for {}: {err}", player.name);
            }
        }
        uploaded += 1;
        if uploaded % UPLOAD_PROGRESS_EVERY == 0 {
            info!("Uploaded: {uploaded}/{}", players.len());
        }
    }
    info!("Uploaded {uploaded} players");
    uploaded
}

pub fn players_json(players: &[PlayerRecord]) -> Result<String> {
    let saved = players
        .iter()
        .map(|p| SavedPlayer {
            name: &p.name,
            aliases: &p.aliases,
            difficulty: p.difficulty,
            career: p
                .career
                .iter()
                .map(|e| SavedEntry {
                    years: &e.years,
                    club: &e.club,
                    country_flag: &e.country_flag,
                    matches: e.matches,
                    goals: e.goals,
                    sort_order: e.sort_order,
                })
                .collect(),
        })
        .collect::<Vec<_>>();
    serde_json::to_string_pretty(&saved).context("failed encoding players json")
}

pub fn save_json(players: &[PlayerRecord], path: &Path) -> Result<()> {
    let raw = players_json(players)?;
    fs::write(path, raw).with_context(|| format!("failed writing {}", path.display()))?;
    info!("Saved {} players to {}", players.len(), path.display());
    Ok(())
}

/// One page's career in reveal order, without the length filter.
pub fn preview(
    source: &dyn PlayerSource,
    resolver: &ClubCountryResolver,
    title: &str,
) -> Result<Option<Vec<CareerEntry>>> {
    let Some(wikitext) = source.wikitext(title)? else {
        return Ok(None);
    };
    Ok(Some(compute_reveal_order(parse_career(&wikitext, resolver))))
}

pub fn preview_line(entry: &CareerEntry) -> String {
    format!(
        "  {}. {} {:<25} {:<12} {}({})",
        entry.sort_order, entry.country_flag, entry.club, entry.years, entry.matches, entry.goals
    )
}
