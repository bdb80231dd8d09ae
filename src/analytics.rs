//! Usage report over `parties`, `party_members` and `scores`.

use std::collections::{HashMap, HashSet};
use std::fmt::{self, Write as _};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration as ChronoDuration, NaiveDateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::{Query, RecordStore, bool_field, fetch_all, id_field, str_field};

pub const SQL_VIEWS: &str = include_str!("../data/analytics_views.sql");

const TEST_NICKNAMES: &[&str] = &["test", "t", "r", "", "asdf", "aaa", "xxx"];
const DAILY_WINDOW_DAYS: i64 = 14;
const TOP_PLAYERS: usize = 10;
const RENDERED_DUPLICATES: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStats {
    pub date: String,
    pub new_parties: usize,
    pub new_members: usize,
    pub unique_nicknames: usize,
    pub games_played: usize,
    pub correct_answers: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopPlayer {
    pub nickname: String,
    pub games: usize,
    pub correct: usize,
    pub accuracy: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub generated_at: String,

    pub total_parties: usize,
    pub total_members: usize,
    pub total_games: usize,
    pub total_correct: usize,

    pub unique_nicknames: usize,
    pub unique_players: usize,
    pub estimated_real_users: usize,

    pub solo_parties: usize,
    pub multi_player_parties: usize,
    pub users_in_multi_player: usize,

    pub avg_games_per_player: f64,
    pub correct_rate: f64,

    pub daily_stats: Vec<DailyStats>,
    pub top_players: Vec<TopPlayer>,
    /// Normalised nickname -> member rows using it, only when more than one.
    /// First-seen order.
    pub duplicate_nicknames: IndexMap<String, usize>,
}

/// Reads every party, member and score and builds the report as of `now`.
pub fn generate(
    store: &dyn RecordStore,
    page_size: usize,
    now: DateTime<Utc>,
) -> Result<AnalyticsReport> {
    let parties = fetch_all(
        store,
        "parties",
        &Query::new().order_asc("created_at"),
        page_size,
    )
    .context("failed fetching parties")?;
    let members = fetch_all(
        store,
        "party_members",
        &Query::new().order_asc("joined_at"),
        page_size,
    )
    .context("failed fetching party members")?;
    let scores = fetch_all(
        store,
        "scores",
        &Query::new().order_asc("answered_at"),
        page_size,
    )
    .context("failed fetching scores")?;
    Ok(build_report(&parties, &members, &scores, now))
}

fn normalized_nickname(member: &Value) -> Option<String> {
    str_field(member, "nickname")
        .filter(|n| !n.is_empty())
        .map(|n| n.trim().to_lowercase())
}

fn day_of<'a>(row: &'a Value, key: &str) -> Option<&'a str> {
    str_field(row, key).and_then(|ts| ts.get(..10))
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

pub fn build_report(
    parties: &[Value],
    members: &[Value],
    scores: &[Value],
    now: DateTime<Utc>,
) -> AnalyticsReport {
    let total_games = scores.len();
    let total_correct = scores.iter().filter(|s| bool_field(s, "is_correct")).count();

    let nicknames = members.iter().filter_map(normalized_nickname).collect::<Vec<_>>();
    let mut nickname_counts: IndexMap<String, usize> = IndexMap::new();
    for nick in &nicknames {
        *nickname_counts.entry(nick.clone()).or_default() += 1;
    }
    let estimated_real_users = nickname_counts
        .keys()
        .filter(|n| !TEST_NICKNAMES.contains(&n.as_str()))
        .count();
    let unique_players = scores
        .iter()
        .filter_map(|s| id_field(s, "member_id"))
        .collect::<HashSet<_>>()
        .len();

    let mut members_per_party: HashMap<String, usize> = HashMap::new();
    for member in members {
        if let Some(party_id) = id_field(member, "party_id") {
            *members_per_party.entry(party_id).or_default() += 1;
        }
    }
    let party_size = |party: &Value| {
        id_field(party, "id")
            .and_then(|id| members_per_party.get(&id).copied())
            .unwrap_or(0)
    };
    let solo_parties = parties.iter().filter(|p| party_size(*p) == 1).count();
    let multi_player_parties = parties.iter().filter(|p| party_size(*p) > 1).count();
    let users_in_multi_player: usize = members_per_party.values().filter(|c| **c > 1).sum();

    let avg_games = if unique_players > 0 {
        total_games as f64 / unique_players as f64
    } else {
        0.0
    };

    AnalyticsReport {
        generated_at: now.to_rfc3339(),
        total_parties: parties.len(),
        total_members: members.len(),
        total_games,
        total_correct,
        unique_nicknames: nickname_counts.len(),
        unique_players,
        estimated_real_users,
        solo_parties,
        multi_player_parties,
        users_in_multi_player,
        avg_games_per_player: round_to(avg_games, 2),
        correct_rate: round_to(percent(total_correct, total_games), 1),
        daily_stats: daily_stats(parties, members, scores, now),
        top_players: top_players(members, scores),
        duplicate_nicknames: nickname_counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .collect(),
    }
}

/// One row per day for the last 14 days, oldest first, today included.
fn daily_stats(
    parties: &[Value],
    members: &[Value],
    scores: &[Value],
    now: DateTime<Utc>,
) -> Vec<DailyStats> {
    (0..DAILY_WINDOW_DAYS)
        .rev()
        .map(|days_ago| {
            let date = (now - ChronoDuration::days(days_ago))
                .format("%Y-%m-%d")
                .to_string();
            let on_day = |row: &&Value, key: &str| day_of(row, key) == Some(date.as_str());
            let day_members = members
                .iter()
                .filter(|m| on_day(m, "joined_at"))
                .collect::<Vec<_>>();
            let day_scores = scores
                .iter()
                .filter(|s| on_day(s, "answered_at"))
                .collect::<Vec<_>>();
            DailyStats {
                new_parties: parties.iter().filter(|p| on_day(p, "created_at")).count(),
                new_members: day_members.len(),
                unique_nicknames: day_members
                    .iter()
                    .filter_map(|m| normalized_nickname(m))
                    .collect::<HashSet<_>>()
                    .len(),
                games_played: day_scores.len(),
                correct_answers: day_scores
                    .iter()
                    .filter(|s| bool_field(s, "is_correct"))
                    .count(),
                date,
            }
        })
        .collect()
}

/// Most games first; ties keep the order players first appear in `scores`.
fn top_players(members: &[Value], scores: &[Value]) -> Vec<TopPlayer> {
    let mut per_member: IndexMap<String, (usize, usize)> = IndexMap::new();
    for score in scores {
        let Some(member_id) = id_field(score, "member_id") else {
            continue;
        };
        let slot = per_member.entry(member_id).or_default();
        slot.0 += 1;
        if bool_field(score, "is_correct") {
            slot.1 += 1;
        }
    }
    let mut ranked = per_member.into_iter().collect::<Vec<_>>();
    ranked.sort_by(|a, b| b.1.0.cmp(&a.1.0));

    ranked
        .into_iter()
        .take(TOP_PLAYERS)
        .map(|(member_id, (games, correct))| {
            let nickname = members
                .iter()
                .find(|m| id_field(m, "id").as_deref() == Some(member_id.as_str()))
                .and_then(|m| str_field(m, "nickname"))
                .unwrap_or("Unknown")
                .to_string();
            TopPlayer {
                nickname,
                games,
                correct,
                accuracy: round_to(percent(correct, games), 1),
            }
        })
        .collect()
}

pub fn render(report: &AnalyticsReport) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_report(&mut out, report);
    out
}

fn write_report(out: &mut String, report: &AnalyticsReport) -> fmt::Result {
    let rule = "=".repeat(70);
    let generated = report.generated_at.get(..19).unwrap_or(&report.generated_at);

    writeln!(out, "{rule}")?;
    writeln!(out, "CAREER QUIZ - ANALYTICS REPORT")?;
    writeln!(out, "   Generated: {generated}")?;
    writeln!(out, "{rule}")?;
    writeln!(out)?;
    writeln!(out, "KEY METRICS")?;
    writeln!(out, "  Estimated real users:     {:>5}", report.estimated_real_users)?;
    writeln!(out, "  Total games played:       {:>5}", report.total_games)?;
    writeln!(out, "  Correct answer rate:      {:>5.1}%", report.correct_rate)?;
    writeln!(out)?;

    writeln!(out, "{rule}")?;
    writeln!(out, "DETAILED METRICS")?;
    writeln!(out, "{rule}")?;
    writeln!(out, "Raw counts:")?;
    writeln!(out, "  Parties created:          {:>5}", report.total_parties)?;
    writeln!(out, "  Member entries:           {:>5}", report.total_members)?;
    writeln!(out, "  Games played:             {:>5}", report.total_games)?;
    writeln!(out, "  Correct answers:          {:>5}", report.total_correct)?;
    writeln!(out)?;
    writeln!(out, "User analysis:")?;
    writeln!(out, "  Unique nicknames:         {:>5}", report.unique_nicknames)?;
    writeln!(out, "  Active players:           {:>5}", report.unique_players)?;
    writeln!(out, "  Estimated real users:     {:>5}", report.estimated_real_users)?;
    writeln!(out)?;
    writeln!(out, "Party breakdown:")?;
    writeln!(out, "  Solo parties:             {:>5}", report.solo_parties)?;
    writeln!(out, "  Multi-player parties:     {:>5}", report.multi_player_parties)?;
    writeln!(out, "  Users in multi-player:    {:>5}", report.users_in_multi_player)?;
    writeln!(out)?;
    writeln!(out, "Engagement:")?;
    writeln!(out, "  Avg games per player:     {:>5.1}", report.avg_games_per_player)?;
    writeln!(out, "  Correct rate:             {:>5.1}%", report.correct_rate)?;
    writeln!(out)?;

    writeln!(out, "{rule}")?;
    writeln!(out, "DAILY STATS (last {DAILY_WINDOW_DAYS} days)")?;
    writeln!(out, "{rule}")?;
    writeln!(
        out,
        "{:<12} {:>8} {:>8} {:>8} {:>8} {:>8}",
        "Date", "Parties", "Members", "Unique", "Games", "Correct"
    )?;
    writeln!(out, "{}", "-".repeat(60))?;
    for day in report
        .daily_stats
        .iter()
        .filter(|d| d.new_parties > 0 || d.games_played > 0)
    {
        writeln!(
            out,
            "{:<12} {:>8} {:>8} {:>8} {:>8} {:>8}",
            day.date,
            day.new_parties,
            day.new_members,
            day.unique_nicknames,
            day.games_played,
            day.correct_answers
        )?;
    }
    writeln!(out)?;

    writeln!(out, "{rule}")?;
    writeln!(out, "TOP PLAYERS")?;
    writeln!(out, "{rule}")?;
    writeln!(
        out,
        "{:<6} {:<20} {:>8} {:>8} {:>10}",
        "Rank", "Nickname", "Games", "Correct", "Accuracy"
    )?;
    writeln!(out, "{}", "-".repeat(60))?;
    for (idx, player) in report.top_players.iter().enumerate() {
        writeln!(
            out,
            "{:<6} {:<20} {:>8} {:>8} {:>9.1}%",
            idx + 1,
            player.nickname,
            player.games,
            player.correct,
            player.accuracy
        )?;
    }

    if !report.duplicate_nicknames.is_empty() {
        let mut dupes = report.duplicate_nicknames.iter().collect::<Vec<_>>();
        dupes.sort_by(|a, b| b.1.cmp(a.1));
        writeln!(out)?;
        writeln!(out, "{rule}")?;
        writeln!(out, "DUPLICATE INDICATORS")?;
        writeln!(out, "{rule}")?;
        for (nickname, count) in dupes.into_iter().take(RENDERED_DUPLICATES) {
            writeln!(out, "  '{nickname}': {count} occurrences")?;
        }
    }
    Ok(())
}

pub fn report_filename(local_now: NaiveDateTime) -> String {
    format!("analytics_report_{}.json", local_now.format("%Y%m%d_%H%M%S"))
}

pub fn save_report(report: &AnalyticsReport, path: &Path) -> Result<()> {
    let raw = serde_json::to_string_pretty(report).context("failed encoding report")?;
    fs::write(path, raw).with_context(|| format!("failed writing {}", path.display()))?;
    Ok(())
}
