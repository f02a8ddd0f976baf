use chrono::{DateTime, Utc};

/// Elapsed time as `HH:MM:SS`; hours are not wrapped at a day.
pub(super) fn format_uptime(started_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let total_seconds = (now - started_at).num_seconds().max(0);
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// First and last characters of a block hash.
pub(super) fn short_hash(hash: &str) -> String {
    if hash.len() <= 16 || !hash.is_ascii() {
        return hash.to_string();
    }
    format!("{}...{}", &hash[..8], &hash[hash.len() - 8..])
}
