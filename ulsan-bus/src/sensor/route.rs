//! Per-route countdown sensor.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::clock::Clock;
use crate::domain::{ActiveWindow, RouteId, SECONDS_UNIT, StationId, format_arrival, live_within};
use crate::feed::{RouteRecord, StationFeedClient, sync_date_value};
use crate::throttle::Throttle;

use super::properties::{
    ATTR_IS_UPDATE, ATTR_SYNC_DATE, ICON_BUS, ICON_BUS_READY, PLACEHOLDER, property_label,
};
use super::{Attributes, EntityView};

/// Minimum time between two refreshes of a route sensor.
///
/// Refreshing a route sensor only reads the client's cached snapshot.
pub const MIN_TIME_BETWEEN_BUS_SENSOR_UPDATES: Duration = Duration::from_secs(10);

#[derive(Debug, Default)]
struct RouteState {
    data: Option<RouteRecord>,
    synced_at: Option<NaiveDateTime>,
    is_live: Option<bool>,
}

impl RouteState {
    fn is_live(&self) -> bool {
        self.is_live.unwrap_or(false)
    }

    fn display_state(&self) -> String {
        if !self.is_live() {
            return PLACEHOLDER.to_string();
        }

        self.data
            .as_ref()
            .and_then(|d| d.next_arrival_seconds.as_deref())
            .map_or_else(|| PLACEHOLDER.to_string(), format_arrival)
    }

    fn unit(&self) -> &'static str {
        if self.is_live() { SECONDS_UNIT } else { "" }
    }

    fn icon(&self) -> &'static str {
        if self.is_live() { ICON_BUS } else { ICON_BUS_READY }
    }

    fn attributes(&self) -> Attributes {
        let mut attrs = Attributes::new();

        if let Some(data) = &self.data {
            for (key, value) in data.fields() {
                attrs.insert(property_label(key).to_string(), value);
            }
        }

        // The sensor's own sync metadata replaces the record's
        attrs.insert(ATTR_SYNC_DATE.to_string(), sync_date_value(self.synced_at));
        attrs.insert(
            ATTR_IS_UPDATE.to_string(),
            self.is_live.map_or(Value::Null, Value::Bool),
        );
        attrs
    }
}

/// Countdown for one bus route at one station.
///
/// Reads the station client's cached snapshot; never fetches by itself.
pub struct RouteSensor {
    entity_prefix: String,
    station_id: StationId,
    station_name: String,
    route_id: RouteId,
    route_label: String,
    windows: Vec<ActiveWindow>,
    client: Arc<StationFeedClient>,
    clock: Arc<dyn Clock>,
    throttle: Throttle,
    state: RwLock<RouteState>,
}

impl RouteSensor {
    /// Create a sensor for a route found at discovery time.
    pub fn new(
        entity_prefix: impl Into<String>,
        station_name: impl Into<String>,
        windows: Vec<ActiveWindow>,
        discovered: &RouteRecord,
        client: Arc<StationFeedClient>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            entity_prefix: entity_prefix.into(),
            station_id: client.station_id().clone(),
            station_name: station_name.into(),
            route_id: discovered.route_id.clone(),
            route_label: discovered.route_label.clone(),
            windows,
            client,
            clock,
            throttle: Throttle::new(MIN_TIME_BETWEEN_BUS_SENSOR_UPDATES),
            state: RwLock::new(RouteState::default()),
        }
    }

    /// Entity id, e.g. `sensor.ulsan_bus_196040234_196000104`.
    pub fn entity_id(&self) -> String {
        format!(
            "sensor.{}_{}_{}",
            self.entity_prefix, self.station_id, self.route_id
        )
    }

    /// Display name, e.g. `삼호교 104`.
    pub fn name(&self) -> String {
        let station = if self.station_name.trim().is_empty() {
            format!("St.{}", self.station_id)
        } else {
            self.station_name.clone()
        };
        format!("{} {}", station, self.route_label)
    }

    /// Re-read this route from the cached snapshot, at most once per
    /// throttle window.
    pub async fn refresh(&self) {
        if !self.throttle.try_acquire(self.clock.monotonic_now()).await {
            return;
        }

        let now = self.clock.local_now();
        let snapshot = self.client.snapshot().await;

        let mut state = self.state.write().await;
        state.synced_at = Some(now);
        state.is_live = Some(live_within(&self.windows, now.time()));
        state.data = snapshot.route(&self.route_id).cloned();
    }

    /// Current presentation of the route.
    pub async fn view(&self) -> EntityView {
        let state = self.state.read().await;

        EntityView {
            entity_id: self.entity_id(),
            name: self.name(),
            state: state.display_state(),
            unit_of_measurement: Some(state.unit().to_string()),
            icon: state.icon().to_string(),
            attributes: state.attributes(),
        }
    }
}
