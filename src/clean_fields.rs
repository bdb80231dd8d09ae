use anyhow::{Context, Result};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::cleanup::{strip_list_prefix, strip_pipe_suffix};
use crate::store::{Query, RecordStore, row_id, str_field};

const TABLE: &str = "career_entries";
const FETCH_LIMIT: usize = 1000;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldFix {
    pub id: String,
    pub before: String,
    pub after: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanSummary {
    pub column: String,
    pub fetched: usize,
    pub updated: usize,
    pub errors: usize,
    /// The first successful fixes, for the run log.
    pub examples: Vec<FieldFix>,
}

/// Club names with infobox fields glued on after a `|`.
pub fn clean_club_names(store: &dyn RecordStore) -> Result<CleanSummary> {
    rewrite_column(store, "club", "*|*", 10, |club| {
        let cleaned = strip_pipe_suffix(club);
        (cleaned != club).then_some(cleaned)
    })
}

/// Year ranges with the next row's fields glued on after a `|`.
pub fn clean_years(store: &dyn RecordStore) -> Result<CleanSummary> {
    rewrite_column(store, "years", "*|*", 15, |years| {
        let cleaned = strip_pipe_suffix(years);
        (cleaned != years).then_some(cleaned)
    })
}

/// Club names still carrying a numbered-list `"1. "` prefix.
pub fn remove_list_prefix(store: &dyn RecordStore) -> Result<CleanSummary> {
    rewrite_column(store, "club", "1. *", 15, |club| {
        strip_list_prefix(club).map(str::to_string)
    })
}

/// Fetches up to 1000 rows whose `column` matches `pattern` and patches each
/// one `rewrite` changes. A failed patch is counted and the run continues.
fn rewrite_column<F>(
    store: &dyn RecordStore,
    column: &str,
    pattern: &str,
    max_examples: usize,
    rewrite: F,
) -> Result<CleanSummary>
where
    F: Fn(&str) -> Option<String>,
{
    let query = Query::new()
        .select(&format!("id,{column}"))
        .like(column, pattern)
        .limit(FETCH_LIMIT);
    let rows = store
        .select(TABLE, &query)
        .with_context(|| format!("failed fetching career entries by {column}"))?;
    info!("Found {} entries matching {column} like '{pattern}'", rows.len());

    let mut summary = CleanSummary {
        column: column.to_string(),
        fetched: rows.len(),
        ..CleanSummary::default()
    };
    for row in &rows {
        let Some(id) = row_id(row) else {
            continue;
        };
        let before = str_field(row, column).unwrap_or_default();
        let Some(after) = rewrite(before) else {
            continue;
        };
        let target = Query::new().eq("id", &id);
        let mut body = Map::new();
        body.insert(column.to_string(), Value::from(after.as_str()));
        match store.patch(TABLE, &target, &Value::Object(body)) {
            Ok(()) => {
                summary.updated += 1;
                if summary.examples.len() < max_examples {
                    summary.examples.push(FieldFix {
                        id,
                        before: before.to_string(),
                        after,
                    });
                }
            }
            Err(err) => {
                summary.errors += 1;
                warn!("Error updating {id}: {err}");
            }
        }
    }
    Ok(summary)
}
