//! Sensors built on top of the station feed clients.
//!
//! Each station gets one [`StationAggregate`] and one [`RouteSensor`] per route
//! found at discovery. All of them share the station's feed client and refresh
//! on their own throttle:
//! - route sensors every 10 s (in-memory read)
//! - station sensors every 90 s (drives the client)
//! - the client itself every 120 s (network)

mod properties;
mod route;
mod station;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

pub use properties::*;
pub use route::{MIN_TIME_BETWEEN_BUS_SENSOR_UPDATES, RouteSensor};
pub use station::{MIN_TIME_BETWEEN_STATION_SENSOR_UPDATES, StationAggregate};

/// Exported attributes, keyed by label.
pub type Attributes = BTreeMap<String, Value>;

/// What a sensor currently shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityView {
    pub entity_id: String,
    pub name: String,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_of_measurement: Option<String>,
    pub icon: String,
    pub attributes: Attributes,
}

/// Any sensor produced by the platform.
#[derive(Clone)]
pub enum Entity {
    Station(Arc<StationAggregate>),
    Route(Arc<RouteSensor>),
}

impl Entity {
    pub fn entity_id(&self) -> String {
        match self {
            Entity::Station(s) => s.entity_id(),
            Entity::Route(r) => r.entity_id(),
        }
    }

    /// Refresh the sensor (subject to its own throttle).
    pub async fn refresh(&self) {
        match self {
            Entity::Station(s) => s.refresh().await,
            Entity::Route(r) => r.refresh().await,
        }
    }

    pub async fn view(&self) -> EntityView {
        match self {
            Entity::Station(s) => s.view().await,
            Entity::Route(r) => r.view().await,
        }
    }
}
