/// Text before the first `|`, trimmed. Infobox rows that were split badly leave
/// the following fields glued on (`"Arsenal | caps3 = 13"`).
pub fn strip_pipe_suffix(value: &str) -> String {
    value.split('|').next().unwrap_or_default().trim().to_string()
}

/// Club names scraped from numbered lists carry a `"1. "` prefix.
pub fn strip_list_prefix(value: &str) -> Option<&str> {
    value.strip_prefix("1. ")
}
