use std::fs;
use std::path::PathBuf;

use career_quiz_pipeline::career::{compute_difficulty, compute_reveal_order};
use career_quiz_pipeline::cleanup::strip_pipe_suffix;
use career_quiz_pipeline::club_country::ClubCountryResolver;
use career_quiz_pipeline::wiki::{
    parse_citizenship_json, parse_league_players_json, parse_wikitext_json,
};
use career_quiz_pipeline::wikitext::{extract_field, parse_career};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_infobox_career_rows() {
    let resolver = ClubCountryResolver::builtin();
    let career = parse_career(&read_fixture("zidane_infobox.wikitext"), &resolver);
    assert_eq!(career.len(), 4);

    let clubs = career.iter().map(|e| e.club.as_str()).collect::<Vec<_>>();
    assert_eq!(clubs, vec!["Cannes", "Bordeaux", "Juventus", "Real Madrid"]);
    let codes = career.iter().map(|e| e.country_code.as_str()).collect::<Vec<_>>();
    assert_eq!(codes, vec!["FR", "FR", "IT", "ES"]);
    assert_eq!(career[0].years, "1989–1992");
    assert_eq!(career[0].matches, 61);
    assert_eq!(career[0].goals, 6);
    assert_eq!(career[3].matches, 155);
    assert_eq!(career[3].goals, 37);
    assert!(!career[2].country_flag.is_empty());

    let chrono = career.iter().map(|e| e.chronological_order).collect::<Vec<_>>();
    assert_eq!(chrono, vec![1, 2, 3, 4]);
}

#[test]
fn youth_and_national_rows_are_not_career_rows() {
    let raw = read_fixture("zidane_infobox.wikitext");
    assert_eq!(extract_field(&raw, "years1").as_deref(), Some("1989–1992"));
    assert_eq!(extract_field(&raw, "caps1").as_deref(), Some("61"));
    assert_eq!(extract_field(&raw, "clubs5"), None);
}

#[test]
fn zidane_reveal_order_and_difficulty() {
    let resolver = ClubCountryResolver::builtin();
    let career = parse_career(&read_fixture("zidane_infobox.wikitext"), &resolver);
    assert_eq!(compute_difficulty(&career), 1);

    let ordered = compute_reveal_order(career);
    let clubs = ordered.iter().map(|e| e.club.as_str()).collect::<Vec<_>>();
    assert_eq!(clubs, vec!["Cannes", "Bordeaux", "Juventus", "Real Madrid"]);
    let sort = ordered.iter().map(|e| e.sort_order).collect::<Vec<_>>();
    assert_eq!(sort, vec![1, 2, 3, 4]);
}

#[test]
fn messy_infobox_rows() {
    let resolver = ClubCountryResolver::builtin();
    let career = parse_career(&read_fixture("journeyman_infobox.wikitext"), &resolver);
    // clubs3 is only a flag template and cleans down to nothing.
    assert_eq!(career.len(), 3);

    // Single-line rows bleed the following fields into the value.
    assert_eq!(career[0].club, "Stoke City | caps1 = 80 | goals1 = 4");
    assert_eq!(strip_pipe_suffix(&career[0].club), "Stoke City");
    assert!(career[0].years.starts_with("2005–2008 |"));
    assert_eq!(strip_pipe_suffix(&career[0].years), "2005–2008");
    assert_eq!(career[0].matches, 80);
    assert_eq!(career[0].goals, 4);

    assert_eq!(career[1].club, "Hull City");
    assert_eq!(career[1].country_code, "EN");

    assert_eq!(career[2].club, "Lazio");
    assert_eq!(career[2].years, "2011–");
    assert_eq!(career[2].matches, 30);
    assert_eq!(career[2].goals, 0);
    assert_eq!(career[2].chronological_order, 4);
}

#[test]
fn parses_league_players_fixture() {
    let players = parse_league_players_json(&read_fixture("sparql_league_players.json"))
        .expect("fixture should parse");
    assert_eq!(players.len(), 2);
    assert_eq!(players[0].qid, "Q1835");
    assert_eq!(players[0].name, "Zinedine Zidane");
    assert_eq!(players[0].wikipedia_title, "Zinedine_Zidane");
    assert_eq!(players[1].qid, "Q11571");
}

#[test]
fn league_players_null_is_empty() {
    assert!(parse_league_players_json("null").unwrap().is_empty());
    assert!(parse_league_players_json("").unwrap().is_empty());
}

#[test]
fn parses_wikipedia_revision_fixture() {
    let content = parse_wikitext_json(&read_fixture("wikipedia_zidane.json"))
        .expect("fixture should parse")
        .expect("page has content");
    assert_eq!(content, read_fixture("zidane_infobox.wikitext"));
}

#[test]
fn missing_wikipedia_page_has_no_content() {
    let content = parse_wikitext_json(&read_fixture("wikipedia_missing.json"))
        .expect("fixture should parse");
    assert!(content.is_none());
}

#[test]
fn parses_citizenship_fixture() {
    let found = parse_citizenship_json(&read_fixture("sparql_citizenship.json"))
        .expect("fixture should parse")
        .expect("one binding");
    assert_eq!(found.country_qid, "Q142");
    assert_eq!(found.label, "France");

    let none = parse_citizenship_json(&read_fixture("sparql_empty.json")).expect("should parse");
    assert!(none.is_none());
}

#[test]
fn invalid_json_is_an_error() {
    assert!(parse_citizenship_json("{not json").is_err());
    assert!(parse_wikitext_json("<html>").is_err());
}
