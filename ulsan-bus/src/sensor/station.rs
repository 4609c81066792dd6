//! Station-level sensor.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use crate::clock::Clock;
use crate::domain::{ActiveWindow, StationId, format_arrival, live_within};
use crate::feed::{RouteMap, StationFeedClient, StationSnapshot, sync_date_value};
use crate::throttle::Throttle;

use super::properties::{
    ATTR_API_ERROR_CODE, ATTR_API_ERROR_MSG, ATTR_IS_UPDATE, ATTR_SYNC_DATE, ERROR_STATE,
    ICON_EYE_OFF, ICON_SIGN_CAUTION, ICON_STATION, PLACEHOLDER,
};
use super::{Attributes, EntityView};

/// Minimum time between two refreshes of a station sensor.
///
/// Shorter than the feed client's window, so some station refreshes are
/// absorbed by the client's own throttle.
pub const MIN_TIME_BETWEEN_STATION_SENSOR_UPDATES: Duration = Duration::from_secs(90);

#[derive(Debug, Default)]
struct StationState {
    snapshot: Arc<StationSnapshot>,
    synced_at: Option<NaiveDateTime>,
    is_live: Option<bool>,
}

impl StationState {
    fn is_live(&self) -> bool {
        self.is_live.unwrap_or(false)
    }

    fn display_state(&self) -> String {
        if self.snapshot.is_error() {
            return ERROR_STATE.to_string();
        }

        if !self.is_live() || !self.snapshot.is_live {
            return PLACEHOLDER.to_string();
        }

        self.snapshot.routes.len().to_string()
    }

    fn icon(&self) -> &'static str {
        if self.snapshot.is_error() {
            ICON_SIGN_CAUTION
        } else if !self.is_live() || !self.snapshot.is_live {
            ICON_EYE_OFF
        } else {
            ICON_STATION
        }
    }

    fn attributes(&self) -> Attributes {
        let mut attrs = Attributes::new();

        if let Some(failure) = &self.snapshot.failure {
            attrs.insert(ATTR_API_ERROR_CODE.to_string(), Value::from(failure.code.as_str()));
            attrs.insert(
                ATTR_API_ERROR_MSG.to_string(),
                Value::from(failure.message.as_str()),
            );
        }

        for record in self.snapshot.routes.values() {
            let label = if record.route_label.is_empty() {
                record.route_id.as_str()
            } else {
                record.route_label.as_str()
            };
            let key = format!(
                "{} [{}]",
                label,
                record.last_stop_label.as_deref().unwrap_or(PLACEHOLDER)
            );
            let arrival = record
                .next_arrival_seconds
                .as_deref()
                .map_or_else(|| PLACEHOLDER.to_string(), format_arrival);
            attrs.insert(key, Value::from(arrival));
        }

        attrs.insert(ATTR_SYNC_DATE.to_string(), sync_date_value(self.synced_at));
        attrs.insert(
            ATTR_IS_UPDATE.to_string(),
            self.is_live.map_or(Value::Null, Value::Bool),
        );
        attrs
    }
}

/// A station's overall state.
///
/// Drives the station's [`StationFeedClient`] and mirrors its freshness and
/// error state. Also the source of the route list used at discovery.
pub struct StationAggregate {
    entity_prefix: String,
    station_id: StationId,
    display_name: String,
    windows: Vec<ActiveWindow>,
    client: Arc<StationFeedClient>,
    clock: Arc<dyn Clock>,
    throttle: Throttle,
    state: RwLock<StationState>,
}

impl StationAggregate {
    /// Create a station sensor over a shared client.
    pub fn new(
        entity_prefix: impl Into<String>,
        display_name: impl Into<String>,
        windows: Vec<ActiveWindow>,
        client: Arc<StationFeedClient>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            entity_prefix: entity_prefix.into(),
            station_id: client.station_id().clone(),
            display_name: display_name.into(),
            windows,
            client,
            clock,
            throttle: Throttle::new(MIN_TIME_BETWEEN_STATION_SENSOR_UPDATES),
            state: RwLock::new(StationState::default()),
        }
    }

    /// Entity id, e.g. `sensor.ulsan_bus_s196040234`.
    pub fn entity_id(&self) -> String {
        format!("sensor.{}_s{}", self.entity_prefix, self.station_id)
    }

    /// Display name, e.g. `삼호교(196040234)`.
    pub fn name(&self) -> String {
        if self.display_name.trim().is_empty() {
            format!("St.{}", self.station_id)
        } else {
            format!("{}({})", self.display_name, self.station_id)
        }
    }

    /// Refresh the station, at most once per throttle window.
    pub async fn refresh(&self) {
        if !self.throttle.try_acquire(self.clock.monotonic_now()).await {
            debug!(station = %self.station_id, "station refresh throttled");
            return;
        }

        let snapshot = self.client.refresh().await;
        let now = self.clock.local_now();

        let mut state = self.state.write().await;
        state.snapshot = snapshot;
        state.synced_at = Some(now);
        state.is_live = Some(live_within(&self.windows, now.time()));
    }

    /// Routes reported at the last refresh.
    pub async fn routes(&self) -> Arc<RouteMap> {
        let state = self.state.read().await;
        Arc::clone(&state.snapshot.routes)
    }

    /// Current presentation of the station.
    pub async fn view(&self) -> EntityView {
        let state = self.state.read().await;

        EntityView {
            entity_id: self.entity_id(),
            name: self.name(),
            state: state.display_state(),
            unit_of_measurement: None,
            icon: state.icon().to_string(),
            attributes: state.attributes(),
        }
    }
}
