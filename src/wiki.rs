use std::collections::HashSet;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::header::ACCEPT;
use serde_json::Value;
use tracing::{info, warn};

use crate::http_client::http_client;

const WIKIDATA_SPARQL_URL: &str = "https://query.wikidata.org/sparql";
const WIKIPEDIA_API_URL: &str = "https://en.wikipedia.org/w/api.php";
const SPARQL_JSON: &str = "application/sparql-results+json";

pub const LEAGUES: &[(&str, &str)] = &[
    ("Q13394", "Ligue 1"),
    ("Q82595", "Bundesliga"),
    ("Q15804", "Serie A"),
    ("Q324867", "La Liga"),
    ("Q9448", "Premier League"),
];

const LEAGUE_PAUSE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaguePlayer {
    pub qid: String,
    pub name: String,
    pub wikipedia_title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Citizenship {
    pub country_qid: String,
    pub label: String,
}

/// Where the scraper gets players and their biography wikitext.
pub trait PlayerSource {
    fn league_players(&self, limit_per_league: usize) -> Result<Vec<LeaguePlayer>>;
    fn wikitext(&self, title: &str) -> Result<Option<String>>;
}

/// Country-of-citizenship lookups for the nationality backfill.
pub trait CitizenshipSource {
    fn by_qid(&self, qid: &str) -> Result<Option<Citizenship>>;
    fn by_name(&self, name: &str) -> Result<Option<Citizenship>>;
}

/// Live Wikidata + Wikipedia access over the shared blocking client.
#[derive(Debug, Clone, Default)]
pub struct WikiClient;

impl WikiClient {
    pub fn new() -> Self {
        Self
    }
}

impl PlayerSource for WikiClient {
    fn league_players(&self, limit_per_league: usize) -> Result<Vec<LeaguePlayer>> {
        fetch_all_league_players(limit_per_league)
    }

    fn wikitext(&self, title: &str) -> Result<Option<String>> {
        fetch_wikitext(title)
    }
}

impl CitizenshipSource for WikiClient {
    fn by_qid(&self, qid: &str) -> Result<Option<Citizenship>> {
        fetch_citizenship(qid)
    }

    fn by_name(&self, name: &str) -> Result<Option<Citizenship>> {
        fetch_citizenship_by_name(name)
    }
}

pub fn league_name(qid: &str) -> &str {
    LEAGUES
        .iter()
        .find(|(id, _)| *id == qid)
        .map(|(_, name)| *name)
        .unwrap_or(qid)
}

pub fn league_players_query(league_qid: &str, limit: usize) -> String {
    format!(
        r#"SELECT DISTINCT ?player ?playerLabel ?article WHERE {{
  ?player wdt:P106 wd:Q937857 .
  ?player wdt:P118 wd:{league_qid} .
  ?article schema:about ?player ;
           schema:isPartOf <https://en.wikipedia.org/> .
  SERVICE wikibase:label {{ bd:serviceParam wikibase:language "en". }}
}}
LIMIT {limit}"#
    )
}

pub fn citizenship_query(player_qid: &str) -> String {
    format!(
        r#"SELECT ?country ?countryLabel WHERE {{
  wd:{player_qid} wdt:P27 ?country .
  SERVICE wikibase:label {{ bd:serviceParam wikibase:language "en". }}
}}
LIMIT 1"#
    )
}

pub fn citizenship_by_name_query(player_name: &str) -> String {
    let name = sparql_escape(player_name);
    format!(
        r#"SELECT ?player ?country ?countryLabel WHERE {{
  ?player wdt:P106 wd:Q937857 .
  ?player rdfs:label "{name}"@en .
  ?player wdt:P27 ?country .
  SERVICE wikibase:label {{ bd:serviceParam wikibase:language "en". }}
}}
LIMIT 1"#
    )
}

fn sparql_escape(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('"', "\\\"")
}

fn run_sparql(query: &str) -> Result<String> {
    let client = http_client()?;
    let url = format!("{WIKIDATA_SPARQL_URL}?query={}", urlencoding::encode(query));
    let resp = client
        .get(&url)
        .header(ACCEPT, SPARQL_JSON)
        .send()
        .context("wikidata request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading wikidata body")?;
    if !status.is_success() {
        return Err(anyhow!("wikidata http {status}: {body}"));
    }
    Ok(body)
}

pub fn fetch_league_players(league_qid: &str, limit: usize) -> Result<Vec<LeaguePlayer>> {
    let body = run_sparql(&league_players_query(league_qid, limit))?;
    let players = parse_league_players_json(&body)?;
    info!(
        "Wikidata: found {} players for {}",
        players.len(),
        league_name(league_qid)
    );
    Ok(players)
}

/// Players across all configured leagues, first sighting wins per QID. A league
/// that fails is logged and skipped.
pub fn fetch_all_league_players(limit_per_league: usize) -> Result<Vec<LeaguePlayer>> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for (idx, (qid, name)) in LEAGUES.iter().enumerate() {
        if idx > 0 {
            thread::sleep(LEAGUE_PAUSE);
        }
        info!("Fetching {name} players...");
        match fetch_league_players(qid, limit_per_league) {
            Ok(players) => {
                for player in players {
                    if seen.insert(player.qid.clone()) {
                        out.push(player);
                    }
                }
            }
            Err(err) => warn!("Wikidata query failed for {name}: {err:#}"),
        }
    }
    info!("Total unique players: {}", out.len());
    Ok(out)
}

pub fn fetch_wikitext(title: &str) -> Result<Option<String>> {
    let client = http_client()?;
    let url = format!(
        "{WIKIPEDIA_API_URL}?action=query&titles={}&prop=revisions&rvprop=content&format=json&formatversion=2",
        urlencoding::encode(title)
    );
    let resp = client
        .get(&url)
        .send()
        .with_context(|| format!("wikipedia request failed for {title}"))?;
    let status = resp.status();
    let body = resp.text().context("failed reading wikipedia body")?;
    if !status.is_success() {
        return Err(anyhow!("wikipedia http {status} for {title}"));
    }
    parse_wikitext_json(&body)
}

pub fn fetch_citizenship(player_qid: &str) -> Result<Option<Citizenship>> {
    if player_qid.trim().is_empty() {
        return Ok(None);
    }
    let body = run_sparql(&citizenship_query(player_qid))?;
    parse_citizenship_json(&body)
}

pub fn fetch_citizenship_by_name(player_name: &str) -> Result<Option<Citizenship>> {
    let body = run_sparql(&citizenship_by_name_query(player_name))?;
    parse_citizenship_json(&body)
}

fn bindings(root: &Value) -> &[Value] {
    root.get("results")
        .and_then(|r| r.get("bindings"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn binding_value<'a>(binding: &'a Value, key: &str) -> Option<&'a str> {
    binding
        .get(key)
        .and_then(|v| v.get("value"))
        .and_then(Value::as_str)
}

fn last_path_segment(uri: &str) -> &str {
    uri.rsplit('/').next().unwrap_or(uri)
}

pub fn parse_league_players_json(raw: &str) -> Result<Vec<LeaguePlayer>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let root: Value = serde_json::from_str(trimmed).context("invalid sparql json")?;
    let mut out = Vec::new();
    for binding in bindings(&root) {
        let Some(player_uri) = binding_value(binding, "player") else {
            continue;
        };
        let name = binding_value(binding, "playerLabel").unwrap_or_default();
        let article = binding_value(binding, "article").unwrap_or_default();
        let title = article
            .split_once("/wiki/")
            .map(|(_, t)| t)
            .unwrap_or_default();
        if name.is_empty() || title.is_empty() {
            continue;
        }
        out.push(LeaguePlayer {
            qid: last_path_segment(player_uri).to_string(),
            name: name.to_string(),
            wikipedia_title: title.to_string(),
        });
    }
    Ok(out)
}

/// Content of the latest revision from a `formatversion=2` query response.
pub fn parse_wikitext_json(raw: &str) -> Result<Option<String>> {
    let root: Value = serde_json::from_str(raw.trim()).context("invalid wikipedia json")?;
    let content = root
        .get("query")
        .and_then(|q| q.get("pages"))
        .and_then(Value::as_array)
        .and_then(|pages| pages.first())
        .and_then(|page| page.get("revisions"))
        .and_then(Value::as_array)
        .and_then(|revs| revs.first())
        .and_then(|rev| rev.get("content"))
        .and_then(Value::as_str);
    Ok(content.map(str::to_string))
}

pub fn parse_citizenship_json(raw: &str) -> Result<Option<Citizenship>> {
    let root: Value = serde_json::from_str(raw.trim()).context("invalid sparql json")?;
    let Some(first) = bindings(&root).first() else {
        return Ok(None);
    };
    let Some(country_uri) = binding_value(first, "country") else {
        return Ok(None);
    };
    Ok(Some(Citizenship {
        country_qid: last_path_segment(country_uri).to_string(),
        label: binding_value(first, "countryLabel")
            .unwrap_or_default()
            .to_string(),
    }))
}
