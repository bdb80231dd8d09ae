use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde_json::{Value, json};

use career_quiz_pipeline::clean_fields;
use career_quiz_pipeline::club_country::ClubCountryResolver;
use career_quiz_pipeline::fix_countries::{self, FixCountriesOptions};
use career_quiz_pipeline::flags::{FlagTable, WHITE_FLAG};
use career_quiz_pipeline::memory_store::MemoryStore;
use career_quiz_pipeline::nationality_codes;
use career_quiz_pipeline::scrape::{self, ScrapeOptions};
use career_quiz_pipeline::store::RecordStore;
use career_quiz_pipeline::update_nationalities::{self, UpdateOptions};
use career_quiz_pipeline::wiki::{Citizenship, CitizenshipSource, LeaguePlayer, PlayerSource};

const FRANCE_FLAG: &str = "\u{1F1EB}\u{1F1F7}";
const SEYCHELLES_FLAG: &str = "\u{1F1F8}\u{1F1E8}";
const NIGERIA_FLAG: &str = "\u{1F1F3}\u{1F1EC}";

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn row_by_id(store: &MemoryStore, table: &str, id: u64) -> Value {
    store
        .rows(table)
        .into_iter()
        .find(|row| row["id"] == json!(id))
        .expect("row should exist")
}

fn career_entries() -> MemoryStore {
    MemoryStore::new().with_table(
        "career_entries",
        vec![
            json!({"id": 1, "club": "Manchester United", "country_code": ""}),
            json!({"id": 2, "club": "Xyzzy Qwerty", "country_code": ""}),
            json!({"id": 3, "club": "Juventus U19", "country_code": ""}),
            json!({"id": 4, "club": "Arsenal", "country_code": "EN"}),
            json!({"id": 5, "club": "Xyzzy Qwerty", "country_code": ""}),
            json!({"id": 6, "club": "Manchester United", "country_code": ""}),
        ],
    )
}

#[test]
fn fix_countries_groups_and_patches_resolved_clubs() {
    let store = career_entries();
    let resolver = ClubCountryResolver::builtin();
    let opts = FixCountriesOptions {
        page_size: 2,
        batch_size: 1,
    };
    let summary = fix_countries::run(&store, &resolver, opts).expect("run should succeed");

    assert_eq!(summary.fetched, 5);
    assert_eq!(summary.updated, 3);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.unmatched, vec!["Xyzzy Qwerty".to_string()]);
    assert_eq!(summary.groups.len(), 2);
    assert_eq!(summary.groups[0].code, "EN");
    assert_eq!(summary.groups[0].entries, 2);
    assert_eq!(summary.groups[1].code, "IT");
    // One id per batch.
    assert_eq!(store.patch_calls(), 3);

    let man_utd = row_by_id(&store, "career_entries", 6);
    assert_eq!(man_utd["country_code"], "EN");
    assert_eq!(
        man_utd["country_flag"],
        FlagTable::builtin().flag_or_empty("EN")
    );
    assert_eq!(row_by_id(&store, "career_entries", 3)["country_code"], "IT");
    assert_eq!(row_by_id(&store, "career_entries", 2)["country_code"], "");
}

#[test]
fn fix_countries_counts_failed_batches() {
    let store = career_entries();
    store.set_fail_writes(true);
    let summary = fix_countries::run(
        &store,
        &ClubCountryResolver::builtin(),
        FixCountriesOptions::default(),
    )
    .expect("a failed batch does not abort the run");
    assert_eq!(summary.updated, 0);
    assert_eq!(summary.failed, 3);
    assert_eq!(row_by_id(&store, "career_entries", 1)["country_code"], "");
}

fn polluted_entries() -> MemoryStore {
    MemoryStore::new().with_table(
        "career_entries",
        vec![
            json!({"id": 1, "club": "Arsenal | caps3 = 13 | goals3 = 0", "years": "2001–2004"}),
            json!({"id": 2, "club": "Ajax", "years": "1998–2001 |clubs8 = TSV 1860 Munich"}),
            json!({"id": 3, "club": "1. FC Köln", "years": "2010–2012"}),
            json!({"id": 4, "club": "1. Schalke 04", "years": "2012–"}),
        ],
    )
}

#[test]
fn clean_club_names_strips_pipe_suffix() {
    let store = polluted_entries();
    let summary = clean_fields::clean_club_names(&store).expect("run should succeed");
    assert_eq!(summary.fetched, 1);
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.errors, 0);
    assert_eq!(summary.examples[0].after, "Arsenal");
    assert_eq!(row_by_id(&store, "career_entries", 1)["club"], "Arsenal");
    assert_eq!(row_by_id(&store, "career_entries", 2)["club"], "Ajax");
}

#[test]
fn clean_years_strips_pipe_suffix() {
    let store = polluted_entries();
    let summary = clean_fields::clean_years(&store).expect("run should succeed");
    assert_eq!(summary.updated, 1);
    assert_eq!(row_by_id(&store, "career_entries", 2)["years"], "1998–2001");
}

#[test]
fn remove_list_prefix_rewrites_numbered_clubs() {
    let store = polluted_entries();
    let summary = clean_fields::remove_list_prefix(&store).expect("run should succeed");
    assert_eq!(summary.fetched, 2);
    assert_eq!(summary.updated, 2);
    assert_eq!(row_by_id(&store, "career_entries", 3)["club"], "FC Köln");
    assert_eq!(row_by_id(&store, "career_entries", 4)["club"], "Schalke 04");
}

#[test]
fn clean_fields_counts_write_errors() {
    let store = polluted_entries();
    store.set_fail_writes(true);
    let summary = clean_fields::remove_list_prefix(&store).expect("run should succeed");
    assert_eq!(summary.updated, 0);
    assert_eq!(summary.errors, 2);
    assert!(summary.examples.is_empty());
}

#[test]
fn fix_missing_codes_uses_known_long_names() {
    let store = MemoryStore::new().with_table(
        "players",
        vec![
            json!({"id": 1, "name": "A", "nationality": "Kingdom of Denmark", "nationality_code": null}),
            json!({"id": 2, "name": "B", "nationality": "Seychelles", "nationality_code": ""}),
            json!({"id": 3, "name": "C", "nationality": "Atlantis", "nationality_code": null}),
            json!({"id": 4, "name": "D", "nationality": "France", "nationality_code": "FR"}),
            json!({"id": 5, "name": "E", "nationality": null, "nationality_code": null}),
            json!({"id": 6, "name": "F", "nationality": "Kingdom of Denmark"}),
        ],
    );
    let summary = nationality_codes::fix_missing_codes(&store).expect("run should succeed");

    assert_eq!(summary.fetched, 4);
    assert_eq!(summary.updated, 3);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.breakdown[0].nationality, "Kingdom of Denmark");
    assert_eq!(summary.breakdown[0].players, 2);
    assert_eq!(summary.breakdown[0].code, Some("DK"));
    assert!(
        summary
            .breakdown
            .iter()
            .any(|row| row.nationality == "Atlantis" && row.code.is_none())
    );

    let seychelles = row_by_id(&store, "players", 2);
    assert_eq!(seychelles["nationality_code"], "SC");
    assert_eq!(seychelles["nationality_flag"], SEYCHELLES_FLAG);
    assert_eq!(row_by_id(&store, "players", 6)["nationality_code"], "DK");
    assert_eq!(row_by_id(&store, "players", 3)["nationality_code"], Value::Null);
}

#[test]
fn fix_niger_codes_recodes_to_nigeria() {
    let store = MemoryStore::new().with_table(
        "players",
        vec![
            json!({"id": 1, "name": "Victor Osimhen", "nationality": "Niger", "nationality_code": "NE"}),
            json!({"id": 2, "name": "Kylian Mbappé", "nationality": "France", "nationality_code": "FR"}),
        ],
    );
    let summary = nationality_codes::fix_niger_codes(&store).expect("run should succeed");
    assert_eq!(summary.fetched, 1);
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.names, vec!["Victor Osimhen".to_string()]);

    let fixed = row_by_id(&store, "players", 1);
    assert_eq!(fixed["nationality"], "Nigeria");
    assert_eq!(fixed["nationality_code"], "NG");
    assert_eq!(fixed["nationality_flag"], NIGERIA_FLAG);
    assert_eq!(row_by_id(&store, "players", 2)["nationality_code"], "FR");
}

#[derive(Default)]
struct FakeWikidata {
    by_qid: HashMap<String, Citizenship>,
    by_name: HashMap<String, Citizenship>,
}

fn citizenship(qid: &str, label: &str) -> Citizenship {
    Citizenship {
        country_qid: qid.to_string(),
        label: label.to_string(),
    }
}

impl CitizenshipSource for FakeWikidata {
    fn by_qid(&self, qid: &str) -> Result<Option<Citizenship>> {
        Ok(self.by_qid.get(qid).cloned())
    }

    fn by_name(&self, name: &str) -> Result<Option<Citizenship>> {
        Ok(self.by_name.get(name).cloned())
    }
}

fn nationality_fixture() -> (MemoryStore, FakeWikidata) {
    let store = MemoryStore::new().with_table(
        "players",
        vec![
            json!({"id": 1, "name": "Zinedine Zidane", "wikidata_id": "Q1835", "nationality": null}),
            json!({"id": 2, "name": "Lost Player", "wikidata_id": "", "nationality": null}),
            json!({"id": 3, "name": "Unknown Country", "wikidata_id": "Q7", "nationality": null}),
            json!({"id": 4, "name": "Has It", "wikidata_id": "Q8", "nationality": "France"}),
            json!({"id": 5, "name": "Name Only", "wikidata_id": null, "nationality": null}),
        ],
    );
    let mut source = FakeWikidata::default();
    source
        .by_qid
        .insert("Q1835".to_string(), citizenship("Q142", "France"));
    source
        .by_qid
        .insert("Q7".to_string(), citizenship("Q99999", "Atlantis"));
    source
        .by_name
        .insert("Name Only".to_string(), citizenship("Q21", "England"));
    (store, source)
}

fn no_delay() -> UpdateOptions {
    UpdateOptions {
        delay: Duration::ZERO,
        ..UpdateOptions::default()
    }
}

#[test]
fn update_nationalities_backfills_and_reports_coverage() {
    let (store, source) = nationality_fixture();
    let flags = FlagTable::builtin();
    let summary =
        update_nationalities::run(&store, &source, &flags, &no_delay()).expect("run should succeed");

    assert_eq!(summary.before.total, 5);
    assert_eq!(summary.before.with_nationality, 1);
    assert!((summary.before.percent() - 20.0).abs() < 1e-9);
    assert_eq!(summary.before.target(), 4);
    assert_eq!(summary.candidates, 4);
    assert_eq!(summary.updated, 3);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.after.with_nationality, 4);
    assert!(summary.after.reached_target());
    assert_eq!(summary.after.missing_to_target(), 0);

    let zidane = row_by_id(&store, "players", 1);
    assert_eq!(zidane["nationality"], "France");
    assert_eq!(zidane["nationality_code"], "FR");
    assert_eq!(zidane["nationality_flag"], FRANCE_FLAG);

    let unknown = row_by_id(&store, "players", 3);
    assert_eq!(unknown["nationality"], "Atlantis");
    assert_eq!(unknown["nationality_code"], "");
    assert_eq!(unknown["nationality_flag"], WHITE_FLAG);

    let by_name = row_by_id(&store, "players", 5);
    assert_eq!(by_name["nationality_code"], "EN");
    assert_eq!(by_name["nationality_flag"], flags.flag_or_white("EN"));

    assert_eq!(row_by_id(&store, "players", 2)["nationality"], Value::Null);
}

#[test]
fn update_nationalities_dry_run_writes_nothing() {
    let (store, source) = nationality_fixture();
    let opts = UpdateOptions {
        dry_run: true,
        limit: Some(20),
        ..no_delay()
    };
    let summary = update_nationalities::run(&store, &source, &FlagTable::builtin(), &opts)
        .expect("run should succeed");
    assert_eq!(summary.would_update, 3);
    assert_eq!(summary.updated, 0);
    assert_eq!(store.patch_calls(), 0);
    assert_eq!(summary.after, summary.before);
}

#[test]
fn update_nationalities_honours_limit() {
    let (store, source) = nationality_fixture();
    let opts = UpdateOptions {
        limit: Some(2),
        ..no_delay()
    };
    let summary = update_nationalities::run(&store, &source, &FlagTable::builtin(), &opts)
        .expect("run should succeed");
    assert_eq!(summary.candidates, 2);
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.failed, 1);
}

struct FakeWiki {
    players: Vec<LeaguePlayer>,
    pages: HashMap<String, String>,
}

impl PlayerSource for FakeWiki {
    fn league_players(&self, _limit_per_league: usize) -> Result<Vec<LeaguePlayer>> {
        Ok(self.players.clone())
    }

    fn wikitext(&self, title: &str) -> Result<Option<String>> {
        Ok(self.pages.get(title).cloned())
    }
}

fn league_player(qid: &str, name: &str) -> LeaguePlayer {
    LeaguePlayer {
        qid: qid.to_string(),
        name: name.to_string(),
        wikipedia_title: name.replace(' ', "_"),
    }
}

fn fake_wiki() -> FakeWiki {
    let mut pages = HashMap::new();
    pages.insert(
        "Zinedine_Zidane".to_string(),
        read_fixture("zidane_infobox.wikitext"),
    );
    pages.insert(
        "Test_Journeyman".to_string(),
        read_fixture("journeyman_infobox.wikitext"),
    );
    pages.insert(
        "One_Club_Man".to_string(),
        "{{Infobox football biography\n| years1 = 1990–2005\n| clubs1 = Lazio\n| caps1 = 400\n}}"
            .to_string(),
    );
    FakeWiki {
        players: vec![
            league_player("Q1835", "Zinedine Zidane"),
            league_player("Q2", "Test Journeyman"),
            league_player("Q3", "Ghost Player"),
            league_player("Q4", "One Club Man"),
        ],
        pages,
    }
}

fn quick_scrape(output: PathBuf) -> ScrapeOptions {
    ScrapeOptions {
        delay: Duration::ZERO,
        output,
        ..ScrapeOptions::default()
    }
}

#[test]
fn scrape_uploads_players_and_career_entries() {
    let store = MemoryStore::new();
    let resolver = ClubCountryResolver::builtin();
    let opts = quick_scrape(PathBuf::from("unused.json"));
    let summary = scrape::run(
        &fake_wiki(),
        Some(&store as &dyn RecordStore),
        &resolver,
        &opts,
    )
    .expect("run should succeed");

    assert_eq!(summary.listed, 4);
    assert_eq!(summary.enriched, 2);
    assert_eq!(summary.missing_wikitext, 1);
    assert_eq!(summary.rejected_length, 1);
    assert_eq!(summary.uploaded, 2);
    assert!(summary.saved_to.is_none());

    let players = store.rows("players");
    assert_eq!(players.len(), 2);
    let zidane = &players[0];
    assert_eq!(zidane["name"], "Zinedine Zidane");
    assert_eq!(zidane["wikidata_id"], "Q1835");
    assert_eq!(zidane["difficulty"], 1);
    assert_eq!(zidane["career_club_count"], 4);
    assert_eq!(zidane["aliases"], json!(["zidane", "zinedine zidane"]));

    let entries = store.rows("career_entries");
    assert_eq!(entries.len(), 7);
    let zidane_entries = entries
        .iter()
        .filter(|e| e["player_id"] == zidane["id"])
        .collect::<Vec<_>>();
    assert_eq!(zidane_entries.len(), 4);
    let real = zidane_entries
        .iter()
        .find(|e| e["club"] == "Real Madrid")
        .expect("Real Madrid row");
    assert_eq!(real["sort_order"], 4);
    assert_eq!(real["chronological_order"], 4);
    assert_eq!(real["country_code"], "ES");
}

#[test]
fn scrape_without_store_saves_json() {
    let path = std::env::temp_dir().join(format!(
        "career_quiz_scrape_{}.json",
        std::process::id()
    ));
    let summary = scrape::run(
        &fake_wiki(),
        None,
        &ClubCountryResolver::builtin(),
        &quick_scrape(path.clone()),
    )
    .expect("run should succeed");
    assert_eq!(summary.saved_to.as_deref(), Some(path.as_path()));

    let raw = fs::read_to_string(&path).expect("json file written");
    let _ = fs::remove_file(&path);
    let saved: Value = serde_json::from_str(&raw).expect("valid json");
    let players = saved.as_array().expect("array of players");
    assert_eq!(players.len(), 2);
    assert_eq!(players[0]["name"], "Zinedine Zidane");
    let career = players[0]["career"].as_array().expect("career array");
    assert_eq!(career.len(), 4);
    assert_eq!(career[0]["club"], "Cannes");
    assert_eq!(career[0]["sort_order"], 1);
    assert!(career[0].get("country_code").is_none());
}

#[test]
fn scrape_skips_players_the_store_rejects() {
    let store = MemoryStore::new();
    store.set_fail_writes(true);
    let summary = scrape::run(
        &fake_wiki(),
        Some(&store as &dyn RecordStore),
        &ClubCountryResolver::builtin(),
        &quick_scrape(PathBuf::from("unused.json")),
    )
    .expect("insert failures are logged, not fatal");
    assert_eq!(summary.enriched, 2);
    assert_eq!(summary.uploaded, 0);
    assert!(store.rows("players").is_empty());
}

#[test]
fn preview_returns_reveal_order() {
    let career = scrape::preview(
        &fake_wiki(),
        &ClubCountryResolver::builtin(),
        "Zinedine_Zidane",
    )
    .expect("preview should succeed")
    .expect("page exists");
    assert_eq!(career[0].club, "Cannes");
    let line = scrape::preview_line(&career[0]);
    assert!(line.starts_with("  1. "));
    assert!(line.contains("61(6)"));

    let missing = scrape::preview(&fake_wiki(), &ClubCountryResolver::builtin(), "Nobody")
        .expect("preview should succeed");
    assert!(missing.is_none());
}
