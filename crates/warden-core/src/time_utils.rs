use chrono::{DateTime, SecondsFormat, Utc};

/// Returns the current Unix timestamp in milliseconds.
pub fn current_unix_timestamp_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
        .try_into()
        .unwrap_or(u64::MAX)
}

/// Returns the current Unix timestamp in seconds.
pub fn current_unix_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Returns the current UTC instant as an ISO-8601 / RFC 3339 string.
///
/// Used by the runtime health side channel, which external probes parse.
pub fn utc_now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Formats a UTC instant as a `HH:MM:SS` wall clock for log-entry rendering.
pub fn render_clock(instant: DateTime<Utc>) -> String {
    instant.format("%H:%M:%S").to_string()
}
