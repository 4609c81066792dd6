//! Cached result of a station feed fetch.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde_json::Value;

use crate::domain::RouteId;

use super::error::FeedError;

/// Format used for every "Sync Date" attribute.
pub const SYNC_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render an optional sync timestamp for attribute export.
pub fn sync_date_value(at: Option<NaiveDateTime>) -> Value {
    at.map_or(Value::Null, |t| Value::String(t.format(SYNC_DATE_FORMAT).to_string()))
}

/// One route's arrival information at a station.
///
/// Built wholesale from a feed row; a new fetch replaces it, never patches it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRecord {
    pub route_id: RouteId,
    /// Route number shown to passengers.
    pub route_label: String,
    /// Raw seconds-until-arrival, as sent by the feed.
    pub next_arrival_seconds: Option<String>,
    /// Stop the bus was last reported at.
    pub last_stop_label: Option<String>,
    pub prev_stop_count: Option<String>,
    pub vehicle_no: Option<String>,
    pub synced_at: NaiveDateTime,
    pub is_live: bool,
}

impl RouteRecord {
    /// Present fields keyed by their raw property name, in table order.
    pub fn fields(&self) -> Vec<(&'static str, Value)> {
        let mut fields = vec![
            ("busRouteId", Value::from(self.route_id.as_str())),
            ("rtNm", Value::from(self.route_label.as_str())),
        ];

        let optional = [
            ("present", &self.last_stop_label),
            ("arrivalTime", &self.next_arrival_seconds),
            ("prevStopCnt", &self.prev_stop_count),
            ("vehicleNo", &self.vehicle_no),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                fields.push((key, Value::from(value.as_str())));
            }
        }

        fields.push(("syncDate", sync_date_value(Some(self.synced_at))));
        fields.push(("isUpdate", Value::Bool(self.is_live)));
        fields
    }
}

/// Routes reported at a station, keyed and ordered by route id.
pub type RouteMap = BTreeMap<RouteId, RouteRecord>;

/// Why the last refresh failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedFailure {
    pub code: String,
    pub message: String,
}

impl From<&FeedError> for FeedFailure {
    fn from(err: &FeedError) -> Self {
        let message = match err {
            FeedError::Upstream { message, .. } => message.clone(),
            other => other.to_string(),
        };

        Self {
            code: err.code(),
            message,
        }
    }
}

/// Everything known about a station after the latest refresh.
///
/// Snapshots are immutable and shared behind an `Arc`; the client replaces
/// the whole value on every effective refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationSnapshot {
    pub routes: Arc<RouteMap>,
    pub synced_at: Option<NaiveDateTime>,
    /// Whether the feed was inside its active hours at the last refresh.
    pub is_live: bool,
    pub failure: Option<FeedFailure>,
}

impl StationSnapshot {
    /// The snapshot a client starts with, before any fetch.
    pub fn empty() -> Self {
        Self {
            routes: Arc::new(RouteMap::new()),
            synced_at: None,
            is_live: true,
            failure: None,
        }
    }

    /// A snapshot from a successful fetch.
    pub fn fetched(routes: RouteMap, synced_at: NaiveDateTime, is_live: bool) -> Self {
        Self {
            routes: Arc::new(routes),
            synced_at: Some(synced_at),
            is_live,
            failure: None,
        }
    }

    /// The snapshot following a failed fetch: same routes, new failure.
    pub fn failed(&self, synced_at: NaiveDateTime, is_live: bool, failure: FeedFailure) -> Self {
        Self {
            routes: Arc::clone(&self.routes),
            synced_at: Some(synced_at),
            is_live,
            failure: Some(failure),
        }
    }

    /// Whether the last refresh failed.
    pub fn is_error(&self) -> bool {
        self.failure.is_some()
    }

    /// Look up one route.
    pub fn route(&self, route_id: &RouteId) -> Option<&RouteRecord> {
        self.routes.get(route_id)
    }
}

impl Default for StationSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}
