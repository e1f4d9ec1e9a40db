pub mod config;
pub mod data;
pub mod record;
pub mod reminder;
pub mod stats;

use chrono::DateTime;

/// Parse a user-supplied point in time: epoch milliseconds or RFC 3339.
pub fn parse_when(value: &str) -> Result<i64, Box<dyn std::error::Error>> {
    if let Ok(ms) = value.parse::<i64>() {
        return Ok(ms);
    }
    let parsed = DateTime::parse_from_rfc3339(value)
        .map_err(|_| format!("not a time (epoch ms or RFC 3339): {value}"))?;
    Ok(parsed.timestamp_millis())
}
