use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

pub const MIN_CAREER_ENTRIES: usize = 2;
pub const MAX_CAREER_ENTRIES: usize = 15;

const TOP_CLUBS: &[&str] = &[
    "Real Madrid",
    "Barcelona",
    "Manchester United",
    "Liverpool",
    "Chelsea",
    "Arsenal",
    "Bayern Munich",
    "Juventus",
    "AC Milan",
    "Inter Milan",
    "Paris Saint-Germain",
];

// Fame ranks drive the reveal order: the most famous club is revealed last.
const FAME_RANKS: &[(&str, u32)] = &[
    ("Real Madrid", 10),
    ("Barcelona", 10),
    ("Manchester United", 9),
    ("Liverpool", 9),
    ("Bayern Munich", 9),
    ("Juventus", 9),
    ("Chelsea", 8),
    ("AC Milan", 8),
    ("Inter Milan", 8),
    ("Arsenal", 8),
    ("Paris Saint-Germain", 8),
    ("Manchester City", 8),
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareerEntry {
    pub years: String,
    pub club: String,
    pub country_code: String,
    pub country_flag: String,
    pub matches: u32,
    pub goals: u32,
    pub chronological_order: u32,
    pub sort_order: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub name: String,
    pub aliases: Vec<String>,
    pub wikipedia_title: String,
    pub wikidata_id: String,
    pub difficulty: u8,
    pub career: Vec<CareerEntry>,
}

pub fn career_length_ok(career: &[CareerEntry]) -> bool {
    (MIN_CAREER_ENTRIES..=MAX_CAREER_ENTRIES).contains(&career.len())
}

/// Accepted spellings for answer matching: full name, surname, first + last
/// for longer names, and ASCII-folded forms of each. Sorted, no duplicates.
pub fn generate_aliases(name: &str) -> Vec<String> {
    let lower = name.to_lowercase();
    let parts = name.split_whitespace().collect::<Vec<_>>();

    let mut aliases = vec![lower];
    if parts.len() > 1 {
        aliases.push(parts[parts.len() - 1].to_lowercase());
    }
    if parts.len() > 2 {
        aliases.push(format!("{} {}", parts[0], parts[parts.len() - 1]).to_lowercase());
    }

    let mut out = BTreeSet::new();
    for alias in aliases {
        let folded = ascii_fold(&alias);
        if folded != alias {
            out.insert(folded);
        }
        out.insert(alias);
    }
    out.into_iter().collect()
}

/// Decomposes and drops every non-ASCII code point ("Zinédine" -> "Zinedine").
pub fn ascii_fold(text: &str) -> String {
    text.nfd().filter(char::is_ascii).collect()
}

fn mentions(club: &str, known: &str) -> bool {
    club.to_lowercase().contains(&known.to_lowercase())
}

/// 1 (household name) to 5 (obscure) from appearances and top-club spells.
pub fn compute_difficulty(career: &[CareerEntry]) -> u8 {
    let total_apps = career.iter().map(|e| u64::from(e.matches)).sum::<u64>();
    let top_count = career
        .iter()
        .filter(|e| TOP_CLUBS.iter().any(|tc| mentions(&e.club, tc)))
        .count();

    if total_apps > 400 && top_count >= 2 {
        1
    } else if total_apps > 250 && top_count >= 1 {
        2
    } else if total_apps > 150 {
        3
    } else if total_apps > 80 {
        4
    } else {
        5
    }
}

fn fame(entry: &CareerEntry) -> f64 {
    let rank = FAME_RANKS
        .iter()
        .filter(|(club, _)| mentions(&entry.club, club))
        .map(|(_, rank)| *rank)
        .max()
        .unwrap_or(0);
    f64::from(rank) + f64::from(entry.matches) / 100.0
}

/// Least famous spell first. Assigns `sort_order` 1..=n; ties keep career order.
pub fn compute_reveal_order(mut career: Vec<CareerEntry>) -> Vec<CareerEntry> {
    career.sort_by(|a, b| fame(a).partial_cmp(&fame(b)).unwrap_or(Ordering::Equal));
    for (idx, entry) in career.iter_mut().enumerate() {
        entry.sort_order = idx as u32 + 1;
    }
    career
}
