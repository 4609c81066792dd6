//! Conversion from feed DTOs to route records.

use chrono::NaiveDateTime;
use tracing::{debug, warn};

use crate::domain::{RouteId, parse_arrival_seconds};

use super::error::FeedError;
use super::snapshot::{RouteMap, RouteRecord};
use super::types::{ArrivalResponse, ArrivalRow};

/// How much of a bad body to keep for diagnostics.
pub(super) const BODY_EXCERPT_CHARS: usize = 500;

/// Parse a response body into its arrival rows.
///
/// A gateway error envelope becomes [`FeedError::Upstream`]. A document with
/// no `list` element at all is a parse error; an empty list is not.
pub fn parse_arrivals(body: &str) -> Result<Vec<ArrivalRow>, FeedError> {
    let response: ArrivalResponse =
        quick_xml::de::from_str(body).map_err(|e| FeedError::Parse {
            message: e.to_string(),
            body: Some(excerpt(body)),
        })?;

    if let Some(header) = response.header {
        let code = header
            .return_reason_code
            .unwrap_or_else(|| "UNKNOWN".to_string());
        let message = header
            .return_auth_msg
            .or(header.err_msg)
            .unwrap_or_default();
        return Err(FeedError::Upstream { code, message });
    }

    let list = response.list.ok_or_else(|| FeedError::Parse {
        message: "missing tableInfo.list".to_string(),
        body: Some(excerpt(body)),
    })?;

    Ok(list.row)
}

/// The first [`BODY_EXCERPT_CHARS`] characters of a response body.
pub(super) fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}

/// Build the route map for one fetch.
///
/// Rows without a usable route id are skipped. When a route is listed more
/// than once (several buses of the same route on their way) the bus arriving
/// soonest is kept. Rows with no usable arrival time lose to any that have one;
/// ties keep the earlier row.
pub fn convert_rows(rows: Vec<ArrivalRow>, synced_at: NaiveDateTime, is_live: bool) -> RouteMap {
    let mut routes = RouteMap::new();

    for row in rows {
        let route_id = match RouteId::parse(&row.route_id) {
            Ok(id) => id,
            Err(e) => {
                warn!(route_name = %row.route_name, error = %e, "skipping arrival row");
                continue;
            }
        };

        let record = RouteRecord {
            route_id: route_id.clone(),
            route_label: row.route_name,
            next_arrival_seconds: non_empty(row.arrival_time),
            last_stop_label: non_empty(row.present_stop_name),
            prev_stop_count: non_empty(row.prev_stop_count),
            vehicle_no: non_empty(row.vehicle_no),
            synced_at,
            is_live,
        };

        if let Some(existing) = routes.get(&route_id) {
            if arrival_rank(existing) <= arrival_rank(&record) {
                debug!(%route_id, "ignoring later bus on the same route");
                continue;
            }
            debug!(%route_id, "replacing with sooner bus on the same route");
        }
        routes.insert(route_id, record);
    }

    routes
}

/// Sort key for buses on the same route: known arrivals first, soonest first.
fn arrival_rank(record: &RouteRecord) -> (bool, i64) {
    match record
        .next_arrival_seconds
        .as_deref()
        .map(parse_arrival_seconds)
    {
        Some(Ok(secs)) => (false, secs),
        _ => (true, 0),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
