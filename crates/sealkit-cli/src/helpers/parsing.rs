//! Parsing helpers for durations and client addresses.

use std::net::IpAddr;

use chrono::Duration;

/// Parse a duration string (e.g., "2h", "30m").
pub fn parse_duration(value: &str) -> anyhow::Result<Duration> {
    let (num_str, unit) = match value.char_indices().last() {
        Some((idx, unit)) if idx > 0 => (&value[..idx], unit),
        _ => {
            return Err(anyhow::anyhow!(
                "Invalid duration: {} (expected <number><unit>)",
                value
            ))
        }
    };

    let amount: i64 = num_str
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid duration number: {}", value))?;
    if amount <= 0 {
        return Err(anyhow::anyhow!("Duration must be positive: {}", value));
    }

    let duration = match unit {
        'd' => Duration::try_days(amount),
        'h' => Duration::try_hours(amount),
        'm' => Duration::try_minutes(amount),
        's' => Duration::try_seconds(amount),
        _ => {
            return Err(anyhow::anyhow!(
                "Invalid duration unit: {} (use d/h/m/s)",
                unit
            ))
        }
    };
    duration.ok_or_else(|| anyhow::anyhow!("Duration out of range: {}", value))
}

pub fn parse_ip(value: &str) -> anyhow::Result<IpAddr> {
    value
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid IP address: {}", value))
}
