//! Ulsan ITS bus arrival feed.
//!
//! This module fetches `getBusArrivalInfo.xo` for one station at a time and
//! keeps the parsed result as an immutable [`StationSnapshot`].
//!
//! Key characteristics of the feed:
//! - The body is XML (`tableInfo.list.row`) regardless of the `type` parameter
//! - Arrival times are raw seconds, as strings
//! - Route ids are assigned by the feed and come and go between fetches

mod client;
mod convert;
mod error;
mod snapshot;
mod types;

pub use client::{DEFAULT_BASE_URL, FeedConfig, MIN_TIME_BETWEEN_API_UPDATES, StationFeedClient};
pub use convert::{convert_rows, parse_arrivals};
pub use error::FeedError;
pub use snapshot::{
    FeedFailure, RouteMap, RouteRecord, SYNC_DATE_FORMAT, StationSnapshot, sync_date_value,
};
pub use types::{ArrivalResponse, ArrivalRow, RowList, ServiceHeader};
