//! Arrival countdown formatting.
//!
//! The feed reports the time until the next bus as a raw count of seconds.
//! Sensors display it as "{m}분{s}초", or "{n}초" under a minute.

use tracing::error;

/// Unit label for a countdown expressed in seconds.
pub const SECONDS_UNIT: &str = "초";

/// Unit label for whole minutes.
pub const MINUTES_UNIT: &str = "분";

/// Error returned when an arrival value is not an integer number of seconds.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid arrival seconds {raw:?}: {reason}")]
pub struct InvalidArrival {
    raw: String,
    reason: String,
}

/// Parse a raw arrival value into seconds.
pub fn parse_arrival_seconds(raw: &str) -> Result<i64, InvalidArrival> {
    raw.trim().parse::<i64>().map_err(|e| InvalidArrival {
        raw: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Render a raw seconds value as a countdown.
///
/// Values that don't parse are logged and returned unchanged.
///
/// # Examples
///
/// ```
/// use ulsan_bus::domain::format_arrival;
///
/// assert_eq!(format_arrival("42"), "42초");
/// assert_eq!(format_arrival("125"), "2분5초");
/// assert_eq!(format_arrival("soon"), "soon");
/// ```
pub fn format_arrival(raw: &str) -> String {
    match parse_arrival_seconds(raw) {
        Ok(secs) => format_seconds(secs),
        Err(e) => {
            error!(error = %e, "failed to format arrival time");
            raw.to_string()
        }
    }
}

fn format_seconds(secs: i64) -> String {
    if secs < 60 {
        format!("{secs}{SECONDS_UNIT}")
    } else {
        format!(
            "{}{MINUTES_UNIT}{}{SECONDS_UNIT}",
            secs.div_euclid(60),
            secs.rem_euclid(60)
        )
    }
}
