//! Live-update windows.
//!
//! Outside its live window a sensor shows a placeholder instead of stale
//! arrival data. Two flavours exist: the station-wide active hours used by the
//! feed client, and optional "HH:MM" windows configured per station for the
//! sensors.

use chrono::{NaiveTime, Timelike};
use serde::Deserialize;

/// Default first hour (exclusive) of the feed's active hours.
pub const DEFAULT_START_HOUR: u32 = 5;

/// Default last hour (exclusive) of the feed's active hours.
/// 24 means "through the end of the day".
pub const DEFAULT_END_HOUR: u32 = 24;

/// Whether `now` falls strictly inside the active hours.
///
/// Both bounds are exclusive: with the defaults (5, 24) the feed is live from
/// 06:00 through 23:59, and not live during the 05:xx hour.
///
/// # Examples
///
/// ```
/// use chrono::NaiveTime;
/// use ulsan_bus::domain::is_live;
///
/// let t = |h| NaiveTime::from_hms_opt(h, 30, 0).unwrap();
/// assert!(!is_live(&t(5), 5, 24));
/// assert!(is_live(&t(6), 5, 24));
/// assert!(is_live(&t(23), 5, 24));
/// assert!(!is_live(&t(0), 5, 24));
/// ```
pub fn is_live(now: &impl Timelike, start_hour: u32, end_hour: u32) -> bool {
    start_hour < now.hour() && now.hour() < end_hour
}

/// Error returned when a configured window has an unparseable time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid active window time {value:?}: expected HH:MM")]
pub struct InvalidWindow {
    value: String,
}

/// Window as written in the configuration file.
#[derive(Debug, Clone, Deserialize)]
struct RawWindow {
    start_time: String,
    end_time: String,
}

/// A configured time-of-day window during which sensors are live.
///
/// Both ends are inclusive. A window whose start is after its end wraps past
/// midnight (e.g. 22:00–02:00).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawWindow")]
pub struct ActiveWindow {
    start: NaiveTime,
    end: NaiveTime,
}

impl ActiveWindow {
    /// Create a window from its bounds.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Parse a window from two "HH:MM" strings.
    pub fn parse(start: &str, end: &str) -> Result<Self, InvalidWindow> {
        Ok(Self {
            start: parse_hhmm(start)?,
            end: parse_hhmm(end)?,
        })
    }

    /// Whether `time` falls inside this window.
    pub fn contains(&self, time: NaiveTime) -> bool {
        if self.start <= self.end {
            self.start <= time && time <= self.end
        } else {
            time >= self.start || time <= self.end
        }
    }
}

impl TryFrom<RawWindow> for ActiveWindow {
    type Error = InvalidWindow;

    fn try_from(raw: RawWindow) -> Result<Self, Self::Error> {
        Self::parse(&raw.start_time, &raw.end_time)
    }
}

fn parse_hhmm(s: &str) -> Result<NaiveTime, InvalidWindow> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M").map_err(|_| InvalidWindow {
        value: s.to_string(),
    })
}

/// Whether `time` is inside any of `windows`.
///
/// No configured windows means always live.
pub fn live_within(windows: &[ActiveWindow], time: NaiveTime) -> bool {
    windows.is_empty() || windows.iter().any(|w| w.contains(time))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn default_hours_boundaries() {
        assert!(!is_live(&hm(0, 0), DEFAULT_START_HOUR, DEFAULT_END_HOUR));
        assert!(!is_live(&hm(5, 0), DEFAULT_START_HOUR, DEFAULT_END_HOUR));
        assert!(!is_live(&hm(5, 59), DEFAULT_START_HOUR, DEFAULT_END_HOUR));
        assert!(is_live(&hm(6, 0), DEFAULT_START_HOUR, DEFAULT_END_HOUR));
        assert!(is_live(&hm(23, 59), DEFAULT_START_HOUR, DEFAULT_END_HOUR));
    }

    #[test]
    fn narrow_hours() {
        // Nothing is strictly between 7 and 8
        assert!(!is_live(&hm(7, 30), 7, 8));
        assert!(is_live(&hm(8, 0), 7, 9));
    }

    #[test]
    fn window_contains_inclusive_bounds() {
        let w = ActiveWindow::parse("07:00", "09:30").unwrap();
        assert!(w.contains(hm(7, 0)));
        assert!(w.contains(hm(8, 15)));
        assert!(w.contains(hm(9, 30)));
        assert!(!w.contains(hm(6, 59)));
        assert!(!w.contains(hm(9, 31)));
    }

    #[test]
    fn window_wraps_midnight() {
        let w = ActiveWindow::parse("22:00", "02:00").unwrap();
        assert!(w.contains(hm(23, 0)));
        assert!(w.contains(hm(0, 30)));
        assert!(w.contains(hm(2, 0)));
        assert!(!w.contains(hm(12, 0)));
    }

    #[test]
    fn empty_windows_are_always_live() {
        assert!(live_within(&[], hm(3, 0)));
    }

    #[test]
    fn any_window_matches() {
        let windows = [
            ActiveWindow::parse("07:00", "09:00").unwrap(),
            ActiveWindow::parse("17:00", "19:00").unwrap(),
        ];
        assert!(live_within(&windows, hm(8, 0)));
        assert!(live_within(&windows, hm(18, 0)));
        assert!(!live_within(&windows, hm(12, 0)));
    }

    #[test]
    fn reject_bad_times() {
        assert!(ActiveWindow::parse("7am", "09:00").is_err());
        assert!(ActiveWindow::parse("07:00", "25:00").is_err());

        let err = ActiveWindow::parse("07:00", "nope").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid active window time \"nope\": expected HH:MM"
        );
    }

    #[test]
    fn deserialize_from_config_shape() {
        let w: ActiveWindow =
            serde_json::from_str(r#"{"start_time": "06:30", "end_time": "10:00"}"#).unwrap();
        assert_eq!(w, ActiveWindow::new(hm(6, 30), hm(10, 0)));

        let bad = serde_json::from_str::<ActiveWindow>(
            r#"{"start_time": "6h", "end_time": "10:00"}"#,
        );
        assert!(bad.is_err());
    }
}
