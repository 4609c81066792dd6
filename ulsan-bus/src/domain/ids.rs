//! Station and route identifier types.

use std::borrow::Borrow;
use std::fmt;

use serde::Deserialize;

/// Error returned when parsing an empty or malformed identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} id: {reason}")]
pub struct InvalidId {
    kind: &'static str,
    reason: &'static str,
}

fn validate(kind: &'static str, s: &str) -> Result<String, InvalidId> {
    let trimmed = s.trim();

    if trimmed.is_empty() {
        return Err(InvalidId {
            kind,
            reason: "must not be empty",
        });
    }

    if trimmed.chars().any(char::is_whitespace) {
        return Err(InvalidId {
            kind,
            reason: "must not contain whitespace",
        });
    }

    Ok(trimmed.to_string())
}

/// A bus station identifier, as assigned by the Ulsan ITS API (`stopid`).
///
/// Opaque to this crate: the only guarantee is that it is non-empty and
/// contains no whitespace, so it can be embedded in URLs and entity ids.
///
/// # Examples
///
/// ```
/// use ulsan_bus::domain::StationId;
///
/// let id = StationId::parse("196040234").unwrap();
/// assert_eq!(id.as_str(), "196040234");
///
/// assert!(StationId::parse("").is_err());
/// assert!(StationId::parse("19 60").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub struct StationId(String);

impl StationId {
    /// Parse a station id, trimming surrounding whitespace.
    pub fn parse(s: &str) -> Result<Self, InvalidId> {
        validate("station", s).map(Self)
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for StationId {
    type Error = InvalidId;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl fmt::Debug for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationId({})", self.0)
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A bus route identifier (`ROUTEID`), scoped to the station it was reported at.
///
/// Route ids come from the feed and may appear or disappear between fetches.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteId(String);

impl RouteId {
    /// Parse a route id, trimming surrounding whitespace.
    pub fn parse(s: &str) -> Result<Self, InvalidId> {
        validate("route", s).map(Self)
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for RouteId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RouteId({})", self.0)
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_ids() {
        assert!(StationId::parse("1234").is_ok());
        assert!(StationId::parse("196040234").is_ok());
        assert!(RouteId::parse("5001").is_ok());
        assert!(RouteId::parse("19610101A").is_ok());
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let id = StationId::parse("  1234\n").unwrap();
        assert_eq!(id.as_str(), "1234");
    }

    #[test]
    fn reject_empty() {
        assert!(StationId::parse("").is_err());
        assert!(StationId::parse("   ").is_err());
        assert!(RouteId::parse("").is_err());
    }

    #[test]
    fn reject_inner_whitespace() {
        assert!(StationId::parse("12 34").is_err());
        assert!(RouteId::parse("50\t01").is_err());
    }

    #[test]
    fn error_display() {
        let err = StationId::parse("").unwrap_err();
        assert_eq!(err.to_string(), "invalid station id: must not be empty");

        let err = RouteId::parse("a b").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid route id: must not contain whitespace"
        );
    }

    #[test]
    fn display_and_debug() {
        let id = RouteId::parse("5001").unwrap();
        assert_eq!(format!("{id}"), "5001");
        assert_eq!(format!("{id:?}"), "RouteId(5001)");

        let id = StationId::parse("1234").unwrap();
        assert_eq!(format!("{id:?}"), "StationId(1234)");
    }

    #[test]
    fn station_id_deserializes_validated() {
        let id: StationId = serde_json::from_str("\"1234\"").unwrap();
        assert_eq!(id.as_str(), "1234");

        assert!(serde_json::from_str::<StationId>("\"\"").is_err());
    }

    #[test]
    fn route_id_borrows_as_str() {
        use std::collections::BTreeMap;

        let mut map = BTreeMap::new();
        map.insert(RouteId::parse("5001").unwrap(), 1);
        assert_eq!(map.get("5001"), Some(&1));
    }
}
