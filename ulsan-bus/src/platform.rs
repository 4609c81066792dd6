//! Platform bootstrap and the periodic scheduler.
//!
//! Bootstrap builds, for every configured station:
//! 1. one [`StationFeedClient`]
//! 2. one [`StationAggregate`] over it, refreshed once so its routes are known
//! 3. one [`RouteSensor`] per route found in that first snapshot
//!
//! The entity set is fixed after bootstrap. Routes that show up later are not
//! added, and routes that vanish keep their sensor (showing a placeholder).

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::config::{BusConfig, StationConfig};
use crate::feed::{FeedError, StationFeedClient};
use crate::sensor::{Entity, EntityView, RouteSensor, StationAggregate};

/// All entities produced from one configuration.
pub struct Platform {
    entities: Vec<Entity>,
}

impl Platform {
    /// Build clients and sensors for every configured station.
    ///
    /// Stations are discovered concurrently. A station whose first fetch
    /// fails still gets its aggregate sensor, just no route sensors.
    pub async fn setup(config: &BusConfig, clock: Arc<dyn Clock>) -> Result<Self, FeedError> {
        let stations = config
            .stations
            .iter()
            .map(|station| discover_station(config, station, Arc::clone(&clock)));

        let mut entities = Vec::new();
        for result in join_all(stations).await {
            entities.extend(result?);
        }

        info!(count = entities.len(), "platform ready");
        Ok(Self { entities })
    }

    /// Entities in bootstrap order: each station followed by its routes.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn find(&self, entity_id: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.entity_id() == entity_id)
    }

    /// Views of every entity, in bootstrap order.
    pub async fn views(&self) -> Vec<EntityView> {
        join_all(self.entities.iter().map(|e| e.view())).await
    }

    /// Offer every entity a refresh.
    ///
    /// Station aggregates go first so route sensors read the newest snapshot.
    /// Each entity's own throttle decides whether anything happens.
    pub async fn refresh_all(&self) {
        let (stations, routes): (Vec<_>, Vec<_>) = self
            .entities
            .iter()
            .partition(|e| matches!(e, Entity::Station(_)));

        join_all(stations.into_iter().map(|e| e.refresh())).await;
        join_all(routes.into_iter().map(|e| e.refresh())).await;
    }

    /// Spawn a background task that calls [`Platform::refresh_all`] every
    /// `interval`, starting one interval from now.
    pub fn spawn_scheduler(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // First tick is immediate, skip it
            loop {
                ticker.tick().await;
                debug!("scheduled refresh");
                self.refresh_all().await;
            }
        })
    }
}

async fn discover_station(
    config: &BusConfig,
    station: &StationConfig,
    clock: Arc<dyn Clock>,
) -> Result<Vec<Entity>, FeedError> {
    let client = Arc::new(StationFeedClient::new(
        config.feed_config(station),
        Arc::clone(&clock),
    )?);

    let aggregate = Arc::new(StationAggregate::new(
        config.entity_prefix.clone(),
        station.name.clone(),
        station.update_time.clone(),
        Arc::clone(&client),
        Arc::clone(&clock),
    ));
    aggregate.refresh().await;

    let snapshot = client.snapshot().await;
    if let Some(failure) = &snapshot.failure {
        warn!(
            station = %station.station_id,
            code = %failure.code,
            "route discovery failed: {}",
            failure.message
        );
    }

    let routes = aggregate.routes().await;
    let sensors: Vec<_> = routes
        .values()
        .map(|record| {
            Arc::new(RouteSensor::new(
                config.entity_prefix.clone(),
                station.name.clone(),
                station.update_time.clone(),
                record,
                Arc::clone(&client),
                Arc::clone(&clock),
            ))
        })
        .collect();

    join_all(sensors.iter().map(|sensor| sensor.refresh())).await;

    info!(
        station = %station.station_id,
        routes = sensors.len(),
        "discovered station"
    );

    let mut entities = Vec::with_capacity(sensors.len() + 1);
    entities.push(Entity::Station(aggregate));
    entities.extend(sensors.into_iter().map(Entity::Route));
    Ok(entities)
}
