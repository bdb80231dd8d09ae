use std::collections::HashMap;
use std::fmt::{self, Write as _};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::store::{Query, RecordStore, fetch_all, id_field, str_field};

static FOUR_DIGIT_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(19\d{2}|20\d{2})\b").expect("valid regex"));

const UNKNOWN_CODE: &str = "Unknown";
const LISTED_NATIONALITIES: usize = 30;
const CROSS_TAB_NATIONALITIES: usize = 10;
const BAR_UNIT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Period {
    Pre1980,
    Eighties,
    Nineties,
    Noughties,
    Tens,
    Twenties,
    Unknown,
}

impl Period {
    pub const ALL: [Period; 7] = [
        Period::Pre1980,
        Period::Eighties,
        Period::Nineties,
        Period::Noughties,
        Period::Tens,
        Period::Twenties,
        Period::Unknown,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Period::Pre1980 => "Pre-1980",
            Period::Eighties => "1980s",
            Period::Nineties => "1990s",
            Period::Noughties => "2000s",
            Period::Tens => "2010s",
            Period::Twenties => "2020s",
            Period::Unknown => "Unknown",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

pub fn period_for_year(year: Option<u16>) -> Period {
    match year {
        None => Period::Unknown,
        Some(y) if y < 1980 => Period::Pre1980,
        Some(y) if y < 1990 => Period::Eighties,
        Some(y) if y < 2000 => Period::Nineties,
        Some(y) if y < 2010 => Period::Noughties,
        Some(y) if y < 2020 => Period::Tens,
        Some(_) => Period::Twenties,
    }
}

/// Earliest and latest 19xx/20xx year mentioned, e.g. `"2010–2015"`.
pub fn extract_year_range(years: &str) -> Option<(u16, u16)> {
    let found = FOUR_DIGIT_YEAR
        .find_iter(years)
        .filter_map(|m| m.as_str().parse::<u16>().ok())
        .collect::<Vec<_>>();
    let start = found.iter().copied().min()?;
    let end = found.iter().copied().max()?;
    Some((start, end))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NationalityRow {
    pub code: String,
    pub flag: String,
    pub players: usize,
    /// Players per period, indexed like `Period::ALL`.
    pub by_period: [usize; 7],
}

impl NationalityRow {
    /// Players with a known debut period.
    pub fn dated_total(&self) -> usize {
        self.by_period[..Period::Unknown.index()].iter().sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistributionReport {
    pub total_players: usize,
    pub total_entries: usize,
    /// Most players first; ties keep first-seen order.
    pub nationalities: Vec<NationalityRow>,
    pub by_period: [usize; 7],
}

impl DistributionReport {
    pub fn missing_nationality(&self) -> usize {
        self.nationalities
            .iter()
            .find(|row| row.code == UNKNOWN_CODE)
            .map(|row| row.players)
            .unwrap_or(0)
    }

    pub fn with_nationality(&self) -> usize {
        self.total_players - self.missing_nationality()
    }
}

pub fn analyze(store: &dyn RecordStore, page_size: usize) -> Result<DistributionReport> {
    let players = fetch_all(
        store,
        "players",
        &Query::new().select("id,name,nationality,nationality_code,nationality_flag"),
        page_size,
    )
    .context("failed fetching players")?;
    let entries = fetch_all(
        store,
        "career_entries",
        &Query::new().select("player_id,years"),
        page_size,
    )
    .context("failed fetching career entries")?;
    Ok(build_report(&players, &entries))
}

pub fn build_report(
    players: &[serde_json::Value],
    entries: &[serde_json::Value],
) -> DistributionReport {
    let mut debut_year: HashMap<String, u16> = HashMap::new();
    for entry in entries {
        let Some(player_id) = id_field(entry, "player_id") else {
            continue;
        };
        let Some((start, _)) = str_field(entry, "years").and_then(extract_year_range) else {
            continue;
        };
        debut_year
            .entry(player_id)
            .and_modify(|y| *y = (*y).min(start))
            .or_insert(start);
    }

    let mut rows: IndexMap<String, NationalityRow> = IndexMap::new();
    let mut by_period = [0usize; 7];
    for player in players {
        let raw_code = str_field(player, "nationality_code").filter(|c| !c.is_empty());
        let code = raw_code.unwrap_or(UNKNOWN_CODE);
        let period = period_for_year(
            id_field(player, "id").and_then(|id| debut_year.get(&id).copied()),
        );

        let row = rows.entry(code.to_string()).or_insert_with(|| NationalityRow {
            code: code.to_string(),
            ..NationalityRow::default()
        });
        if row.flag.is_empty() && raw_code.is_some() {
            row.flag = str_field(player, "nationality_flag")
                .unwrap_or_default()
                .to_string();
        }
        row.players += 1;
        row.by_period[period.index()] += 1;
        by_period[period.index()] += 1;
    }

    let mut nationalities = rows.into_values().collect::<Vec<_>>();
    nationalities.sort_by(|a, b| b.players.cmp(&a.players));

    DistributionReport {
        total_players: players.len(),
        total_entries: entries.len(),
        nationalities,
        by_period,
    }
}

pub fn render(report: &DistributionReport) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_report(&mut out, report);
    out
}

fn write_report(out: &mut String, report: &DistributionReport) -> fmt::Result {
    let rule = "=".repeat(60);

    writeln!(out, "{rule}")?;
    writeln!(out, "PLAYERS BY NATIONALITY (Top {LISTED_NATIONALITIES})")?;
    writeln!(out, "{rule}")?;
    for row in report.nationalities.iter().take(LISTED_NATIONALITIES) {
        writeln!(out, "  {} {:4} : {:4} players", row.flag, row.code, row.players)?;
    }
    if report.nationalities.len() > LISTED_NATIONALITIES {
        let rest = &report.nationalities[LISTED_NATIONALITIES..];
        let players = rest.iter().map(|r| r.players).sum::<usize>();
        writeln!(
            out,
            "  ... and {} more countries with {players} players",
            rest.len()
        )?;
    }

    writeln!(out)?;
    writeln!(out, "{rule}")?;
    writeln!(out, "PLAYERS BY PERIOD")?;
    writeln!(out, "{rule}")?;
    for period in Period::ALL {
        let count = report.by_period[period.index()];
        let bar = "█".repeat(count / BAR_UNIT);
        writeln!(out, "  {:10} : {count:4} players  {bar}", period.label())?;
    }

    writeln!(out)?;
    writeln!(out, "{rule}")?;
    writeln!(out, "TOP {CROSS_TAB_NATIONALITIES} NATIONALITIES BY PERIOD")?;
    writeln!(out, "{rule}")?;
    let dated = &Period::ALL[..Period::Unknown.index()];
    let mut header = format!("{:8}", "Country");
    for period in dated {
        write!(header, " {:>8}", period.label())?;
    }
    write!(header, " {:>8}", "Total")?;
    writeln!(out, "{header}")?;
    writeln!(out, "{}", "-".repeat(header.chars().count()))?;
    for row in report.nationalities.iter().take(CROSS_TAB_NATIONALITIES) {
        let mut line = format!("{} {:5}", row.flag, row.code);
        for period in dated {
            write!(line, " {:>8}", row.by_period[period.index()])?;
        }
        write!(line, " {:>8}", row.dated_total())?;
        writeln!(out, "{line}")?;
    }

    writeln!(out)?;
    writeln!(out, "{rule}")?;
    writeln!(out, "SUMMARY")?;
    writeln!(out, "{rule}")?;
    writeln!(out, "  Total players: {}", report.total_players)?;
    writeln!(out, "  Total nationalities: {}", report.nationalities.len())?;
    writeln!(
        out,
        "  Players with nationality code: {}",
        report.with_nationality()
    )?;
    writeln!(
        out,
        "  Players missing nationality: {}",
        report.missing_nationality()
    )?;
    Ok(())
}
