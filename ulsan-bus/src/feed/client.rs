//! Ulsan ITS bus arrival HTTP client.
//!
//! One client per station. It owns the station's only snapshot and is the
//! only thing in the process that talks to the upstream API for that station.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::domain::{DEFAULT_END_HOUR, DEFAULT_START_HOUR, StationId, is_live};
use crate::throttle::Throttle;

use super::convert::{convert_rows, excerpt, parse_arrivals};
use super::error::FeedError;
use super::snapshot::{FeedFailure, RouteMap, StationSnapshot};

/// Default endpoint for bus arrival information.
pub const DEFAULT_BASE_URL: &str = "http://openapi.its.ulsan.kr/UlsanAPI/getBusArrivalInfo.xo";

/// Minimum time between two upstream fetches for the same station.
pub const MIN_TIME_BETWEEN_API_UPDATES: Duration = Duration::from_secs(120);

/// Rows requested per page. One page covers every route at a stop.
const NUM_OF_ROWS: u32 = 100;

/// Configuration for a station feed client.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Open-data service key, sent as given (it is usually pre-encoded)
    pub api_key: String,
    /// Station to poll
    pub station_id: StationId,
    /// Endpoint URL (defaults to production)
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// First hour of the active hours (exclusive)
    pub start_hour: u32,
    /// Last hour of the active hours (exclusive)
    pub end_hour: u32,
    /// Throttle window for upstream fetches
    pub min_interval: Duration,
}

impl FeedConfig {
    /// Create a new config for one station.
    pub fn new(api_key: impl Into<String>, station_id: StationId) -> Self {
        Self {
            api_key: api_key.into(),
            station_id,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            start_hour: DEFAULT_START_HOUR,
            end_hour: DEFAULT_END_HOUR,
            min_interval: MIN_TIME_BETWEEN_API_UPDATES,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the active hours.
    pub fn with_active_hours(mut self, start_hour: u32, end_hour: u32) -> Self {
        self.start_hour = start_hour;
        self.end_hour = end_hour;
        self
    }
}

/// Throttled, caching client for one station's arrival feed.
///
/// Readers get the current [`StationSnapshot`] as an `Arc`; a refresh swaps in
/// a whole new snapshot, so nobody ever sees a half-updated route map.
pub struct StationFeedClient {
    http: reqwest::Client,
    config: FeedConfig,
    clock: Arc<dyn Clock>,
    throttle: Throttle,
    snapshot: RwLock<Arc<StationSnapshot>>,
}

impl StationFeedClient {
    /// Create a new client with the given configuration.
    pub fn new(config: FeedConfig, clock: Arc<dyn Clock>) -> Result<Self, FeedError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            throttle: Throttle::new(config.min_interval),
            config,
            clock,
            snapshot: RwLock::new(Arc::new(StationSnapshot::empty())),
        })
    }

    /// The station this client polls.
    pub fn station_id(&self) -> &StationId {
        &self.config.station_id
    }

    /// The current snapshot. Never touches the network.
    pub async fn snapshot(&self) -> Arc<StationSnapshot> {
        let guard = self.snapshot.read().await;
        Arc::clone(&*guard)
    }

    /// Refresh the snapshot from the API.
    ///
    /// Inside the throttle window this is a no-op returning the current
    /// snapshot. Otherwise exactly one request is made. On failure the
    /// previous routes are kept and the failure is recorded; errors never
    /// escape this method.
    pub async fn refresh(&self) -> Arc<StationSnapshot> {
        if !self.throttle.try_acquire(self.clock.monotonic_now()).await {
            debug!(station = %self.config.station_id, "feed refresh throttled");
            return self.snapshot().await;
        }

        let now = self.clock.local_now();
        let live = is_live(&now, self.config.start_hour, self.config.end_hour);
        let result = self.fetch_routes(now, live).await;

        let mut slot = self.snapshot.write().await;
        let next = match result {
            Ok(routes) => {
                info!(
                    station = %self.config.station_id,
                    routes = routes.len(),
                    "refreshed bus arrivals"
                );
                StationSnapshot::fetched(routes, now, live)
            }
            Err(e) => {
                warn!(
                    station = %self.config.station_id,
                    code = %e.code(),
                    error = %e,
                    "failed to refresh bus arrivals"
                );
                if let Some(body) = e.body_excerpt() {
                    debug!(station = %self.config.station_id, body, "unparsed response body");
                }
                slot.failed(now, live, FeedFailure::from(&e))
            }
        };

        *slot = Arc::new(next);
        Arc::clone(&*slot)
    }

    /// The request URL for this station.
    pub fn request_url(&self) -> String {
        format!(
            "{}?stopid={}&pageNo=1&numOfRows={}&type=json&serviceKey={}",
            self.config.base_url, self.config.station_id, NUM_OF_ROWS, self.config.api_key
        )
    }

    async fn fetch_routes(
        &self,
        now: chrono::NaiveDateTime,
        live: bool,
    ) -> Result<RouteMap, FeedError> {
        let response = self.http.get(self.request_url()).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::Status {
                status: status.as_u16(),
                message: excerpt(&body),
            });
        }

        let body = response.text().await?;
        let rows = parse_arrivals(&body)?;

        Ok(convert_rows(rows, now, live))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::{NaiveDate, NaiveDateTime};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FEED_PATH: &str = "/UlsanAPI/getBusArrivalInfo.xo";

    const ONE_ROUTE: &str = "<tableInfo><list>\
        <row><ROUTEID>5001</ROUTEID><ROUTENM>BusA</ROUTENM>\
        <PRESENTSTOPNM>StopX</PRESENTSTOPNM><ARRIVALTIME>125</ARRIVALTIME></row>\
        </list></tableInfo>";

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    async fn setup() -> (MockServer, Arc<ManualClock>, StationFeedClient) {
        let server = MockServer::start().await;
        let clock = Arc::new(ManualClock::new(noon()));
        let config = FeedConfig::new("test-key", StationId::parse("1234").unwrap())
            .with_base_url(format!("{}{FEED_PATH}", server.uri()))
            .with_timeout(5);
        let client = StationFeedClient::new(config, clock.clone()).unwrap();
        (server, clock, client)
    }

    async fn request_count(server: &MockServer) -> usize {
        server.received_requests().await.unwrap().len()
    }

    #[test]
    fn config_defaults() {
        let config = FeedConfig::new("key", StationId::parse("1234").unwrap());
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.start_hour, 5);
        assert_eq!(config.end_hour, 24);
        assert_eq!(config.min_interval, Duration::from_secs(120));
    }

    #[test]
    fn request_url_template() {
        let config = FeedConfig::new("abc%2B", StationId::parse("1234").unwrap())
            .with_base_url("http://localhost/feed");
        let client = StationFeedClient::new(config, Arc::new(ManualClock::new(noon()))).unwrap();

        assert_eq!(
            client.request_url(),
            "http://localhost/feed?stopid=1234&pageNo=1&numOfRows=100&type=json&serviceKey=abc%2B"
        );
    }

    #[tokio::test]
    async fn successful_refresh_replaces_snapshot() {
        let (server, _clock, client) = setup().await;

        Mock::given(method("GET"))
            .and(path(FEED_PATH))
            .and(query_param("stopid", "1234"))
            .and(query_param("pageNo", "1"))
            .and(query_param("numOfRows", "100"))
            .and(query_param("type", "json"))
            .and(query_param("serviceKey", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_string(ONE_ROUTE))
            .mount(&server)
            .await;

        let snap = client.refresh().await;

        assert!(!snap.is_error());
        assert!(snap.is_live);
        assert_eq!(snap.synced_at, Some(noon()));
        assert_eq!(snap.routes.len(), 1);
        assert_eq!(snap.routes.get("5001").unwrap().route_label, "BusA");
        assert_eq!(*client.snapshot().await, *snap);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_routes() {
        let (server, clock, client) = setup().await;

        Mock::given(method("GET"))
            .and(path(FEED_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string(ONE_ROUTE))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(FEED_PATH))
            .respond_with(ResponseTemplate::new(500).set_body_string("down"))
            .mount(&server)
            .await;

        let before = client.refresh().await;
        clock.advance(MIN_TIME_BETWEEN_API_UPDATES);
        let after = client.refresh().await;

        assert!(after.is_error());
        assert!(Arc::ptr_eq(&before.routes, &after.routes));
        let failure = after.failure.as_ref().unwrap();
        assert_eq!(failure.code, "500");
        assert_eq!(failure.message, "API error 500: down");
    }

    #[tokio::test]
    async fn error_clears_after_recovery() {
        let (server, clock, client) = setup().await;

        Mock::given(method("GET"))
            .and(path(FEED_PATH))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(FEED_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string(ONE_ROUTE))
            .mount(&server)
            .await;

        assert!(client.refresh().await.is_error());
        clock.advance(MIN_TIME_BETWEEN_API_UPDATES);
        let snap = client.refresh().await;

        assert!(!snap.is_error());
        assert_eq!(snap.routes.len(), 1);
    }

    #[tokio::test]
    async fn refreshes_are_throttled() {
        let (server, clock, client) = setup().await;

        Mock::given(method("GET"))
            .and(path(FEED_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string(ONE_ROUTE))
            .mount(&server)
            .await;

        client.refresh().await;
        clock.advance(Duration::from_secs(60));
        client.refresh().await;
        assert_eq!(request_count(&server).await, 1);

        clock.advance(Duration::from_secs(60));
        client.refresh().await;
        assert_eq!(request_count(&server).await, 2);
    }

    #[tokio::test]
    async fn concurrent_refreshes_fetch_once() {
        let (server, _clock, client) = setup().await;

        Mock::given(method("GET"))
            .and(path(FEED_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string(ONE_ROUTE))
            .mount(&server)
            .await;

        let client = Arc::new(client);
        let calls = (0..4).map(|_| {
            let client = client.clone();
            async move { client.refresh().await }
        });
        futures::future::join_all(calls).await;

        assert_eq!(request_count(&server).await, 1);
    }

    #[tokio::test]
    async fn gateway_error_is_recorded() {
        let (server, _clock, client) = setup().await;

        let body = "<OpenAPI_ServiceResponse><cmmMsgHeader>\
            <errMsg>SERVICE ERROR</errMsg>\
            <returnAuthMsg>SERVICE_KEY_IS_NOT_REGISTERED_ERROR</returnAuthMsg>\
            <returnReasonCode>30</returnReasonCode>\
            </cmmMsgHeader></OpenAPI_ServiceResponse>";
        Mock::given(method("GET"))
            .and(path(FEED_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let snap = client.refresh().await;
        let failure = snap.failure.as_ref().unwrap();

        assert_eq!(failure.code, "30");
        assert_eq!(failure.message, "SERVICE_KEY_IS_NOT_REGISTERED_ERROR");
        assert!(snap.routes.is_empty());
    }

    #[tokio::test]
    async fn outside_active_hours_is_not_live() {
        let (server, clock, client) = setup().await;
        clock.set_local(noon() - chrono::Duration::hours(9));

        Mock::given(method("GET"))
            .and(path(FEED_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string(ONE_ROUTE))
            .mount(&server)
            .await;

        let snap = client.refresh().await;

        assert!(!snap.is_live);
        assert!(!snap.routes.get("5001").unwrap().is_live);
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_failure() {
        let clock = Arc::new(ManualClock::new(noon()));
        let config = FeedConfig::new("key", StationId::parse("1234").unwrap())
            .with_base_url("http://127.0.0.1:9/feed")
            .with_timeout(2);
        let client = StationFeedClient::new(config, clock).unwrap();

        let snap = client.refresh().await;

        assert!(snap.is_error());
        assert_eq!(snap.failure.as_ref().unwrap().code, "HTTP");
    }

    #[tokio::test]
    async fn error_page_is_truncated() {
        let (server, _clock, client) = setup().await;
        let page = format!("<html><body>{}</body></html>", "x".repeat(5000));
        Mock::given(method("GET"))
            .and(path(FEED_PATH))
            .respond_with(ResponseTemplate::new(502).set_body_string(page.clone()))
            .mount(&server)
            .await;

        let snap = client.refresh().await;

        let failure = snap.failure.as_ref().unwrap();
        assert_eq!(failure.code, "502");
        let expected: String = page.chars().take(500).collect();
        assert_eq!(failure.message, format!("API error 502: {expected}"));
    }
}
