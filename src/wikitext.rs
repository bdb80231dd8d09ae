use once_cell::sync::Lazy;
use regex::Regex;

use crate::career::CareerEntry;
use crate::club_country::ClubCountryResolver;

// Infoboxes number their career rows years1/clubs1/caps1/goals1 onwards.
const MAX_CAREER_ROWS: usize = 29;
const MAX_CAPS_OR_GOALS: u32 = 2000;

static LOAN_ARROW: Lazy<Regex> = Lazy::new(|| Regex::new(r"→\s*").expect("valid regex"));
static PIPED_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[([^\]|]*)\|([^\]]*)\]\]").expect("valid regex"));
static PLAIN_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\[([^\]]*)\]\]").expect("valid regex"));
static CLUB_NOISE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<[^>]+>|\{\{[^}]*\}\}|'''?|\(loan\)").expect("valid regex")
});
static YEARS_MARKUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[([^\]]*)\]\]|\{\{[^}]*\}\}").expect("valid regex"));
static DASHES: Lazy<Regex> = Lazy::new(|| Regex::new(r"[–—]").expect("valid regex"));
static FIRST_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").expect("valid regex"));

/// Value of `| name = ...` in an infobox, up to the next field or the end of
/// the template. `None` when the field is absent or never terminated.
pub fn extract_field(wikitext: &str, name: &str) -> Option<String> {
    let pattern = format!(
        r"(?s)\|\s*{}\s*=\s*(.*?)(?:\n\s*\||\n\s*\}}\}})",
        regex::escape(name)
    );
    let re = Regex::new(&pattern).ok()?;
    let caps = re.captures(wikitext)?;
    Some(caps.get(1)?.as_str().trim().to_string())
}

pub fn clean_club_name(raw: &str) -> String {
    let out = LOAN_ARROW.replace_all(raw, "");
    let out = PIPED_LINK.replace_all(&out, "${2}");
    let out = PLAIN_LINK.replace_all(&out, "${1}");
    let out = CLUB_NOISE.replace_all(&out, "");
    out.trim().to_string()
}

pub fn clean_years(raw: &str) -> String {
    let out = YEARS_MARKUP.replace_all(raw, "${1}");
    let out = DASHES.replace_all(&out, "–");
    out.trim().to_string()
}

/// First run of digits, capped; 0 when there is none.
pub fn parse_int(raw: Option<&str>) -> u32 {
    let Some(raw) = raw else {
        return 0;
    };
    let Some(m) = FIRST_NUMBER.find(raw) else {
        return 0;
    };
    m.as_str()
        .parse::<u64>()
        .map(|v| v.min(u64::from(MAX_CAPS_OR_GOALS)) as u32)
        .unwrap_or(MAX_CAPS_OR_GOALS)
}

/// Senior career rows from a football biography infobox. Stops at the first
/// missing `clubsN`; rows whose club cleans down to nothing are skipped.
pub fn parse_career(wikitext: &str, resolver: &ClubCountryResolver) -> Vec<CareerEntry> {
    let mut entries = Vec::new();
    for i in 1..=MAX_CAREER_ROWS {
        let Some(clubs) = extract_field(wikitext, &format!("clubs{i}")) else {
            break;
        };
        let club = clean_club_name(&clubs);
        if club.is_empty() {
            continue;
        }
        let years = extract_field(wikitext, &format!("years{i}"));
        let caps = extract_field(wikitext, &format!("caps{i}"));
        let goals = extract_field(wikitext, &format!("goals{i}"));

        let resolution = resolver.resolve(&club);
        entries.push(CareerEntry {
            years: years.as_deref().map(clean_years).unwrap_or_default(),
            club,
            country_code: resolution.code,
            country_flag: resolution.flag,
            matches: parse_int(caps.as_deref()),
            goals: parse_int(goals.as_deref()),
            chronological_order: i as u32,
            sort_order: 0,
        });
    }
    entries
}
