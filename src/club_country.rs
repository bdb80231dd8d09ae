//! Heuristic mapping from free-text club names to the country a club plays in.
//!
//! Resolution runs in two phases. An exact key hit wins outright; otherwise the
//! table is scanned in definition order and the first variant that contains, or
//! is contained in, the query (case-insensitively) decides. The scan order is
//! part of the contract: codes already written to the store were produced by
//! this order, so reordering the table can change historical answers.

use anyhow::{Result, anyhow};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use tracing::error;

use crate::flags::FlagTable;

const BUILTIN_TSV: &str = include_str!("../data/club_countries.tsv");

static BUILTIN_CLUBS: Lazy<ClubTable> = Lazy::new(|| match ClubTable::parse_tsv(BUILTIN_TSV) {
    Ok(table) => table,
    Err(err) => {
        error!("bundled club table is invalid, every club will be unmatched: {err:#}");
        ClubTable::default()
    }
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClubTable {
    entries: IndexMap<String, String>,
}

impl ClubTable {
    pub fn builtin() -> Self {
        BUILTIN_CLUBS.clone()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut table = Self::default();
        for (name, code) in pairs {
            table.insert(name, code);
        }
        table
    }

    /// `name<TAB>code` per line. Blank lines and `#` comments are skipped.
    pub fn parse_tsv(raw: &str) -> Result<Self> {
        let mut table = Self::default();
        for (idx, line) in raw.lines().enumerate() {
            let trimmed = line.trim_end_matches('\r');
            if trimmed.trim().is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let Some((name, code)) = trimmed.split_once('\t') else {
                return Err(anyhow!("line {}: expected name<TAB>code", idx + 1));
            };
            let code = code.trim();
            if name.is_empty() || code.is_empty() {
                return Err(anyhow!("line {}: empty club name or country code", idx + 1));
            }
            table.insert(name, code);
        }
        Ok(table)
    }

    /// A repeated name keeps its original position and takes the new code.
    pub fn insert(&mut self, name: impl Into<String>, code: impl Into<String>) {
        self.entries.insert(name.into(), code.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub code: String,
    pub flag: String,
}

impl Resolution {
    pub fn unresolved() -> Self {
        Self::default()
    }

    pub fn is_resolved(&self) -> bool {
        !self.code.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ClubCountryResolver {
    clubs: ClubTable,
    // Lowercased keys in table order, built once so the partial scan does not
    // re-lowercase every entry per query.
    lowered: Vec<(String, usize)>,
    flags: FlagTable,
}

impl ClubCountryResolver {
    pub fn new(clubs: ClubTable, flags: FlagTable) -> Self {
        let lowered = clubs
            .entries
            .keys()
            .enumerate()
            .map(|(idx, name)| (name.to_lowercase(), idx))
            .collect();
        Self {
            clubs,
            lowered,
            flags,
        }
    }

    pub fn builtin() -> Self {
        Self::new(ClubTable::builtin(), FlagTable::builtin())
    }

    pub fn clubs(&self) -> &ClubTable {
        &self.clubs
    }

    pub fn flags(&self) -> &FlagTable {
        &self.flags
    }

    pub fn resolve(&self, club_name: &str) -> Resolution {
        match self.resolve_code(club_name) {
            Some(code) => Resolution {
                code: code.to_string(),
                flag: self.flags.flag_or_empty(code).to_string(),
            },
            None => Resolution::unresolved(),
        }
    }

    pub fn resolve_code(&self, club_name: &str) -> Option<&str> {
        // An empty needle is a substring of every key. Whitespace is not
        // special: " " still matches the first key containing a space.
        if club_name.is_empty() {
            return None;
        }
        if let Some(code) = self.clubs.get(club_name) {
            return Some(code);
        }

        let query = club_name.to_lowercase();
        self.lowered
            .iter()
            .find(|(known, _)| query.contains(known.as_str()) || known.contains(query.as_str()))
            .and_then(|(_, idx)| self.clubs.entries.get_index(*idx))
            .map(|(_, code)| code.as_str())
    }

    /// Codes the club table can produce that have no glyph in the flag table.
    pub fn codes_without_flag(&self) -> Vec<&str> {
        let mut missing = Vec::new();
        for (_, code) in self.clubs.iter() {
            if !self.flags.contains(code) && !missing.contains(&code) {
                missing.push(code);
            }
        }
        missing
    }
}
