//! Domain types for the bus arrival poller.
//!
//! Identifiers are validated at construction. The live-window policy and
//! the arrival formatter are pure functions so they can be tested by
//! injecting the time or the raw value.

mod arrival;
mod ids;
mod window;

pub use arrival::{
    InvalidArrival, MINUTES_UNIT, SECONDS_UNIT, format_arrival, parse_arrival_seconds,
};
pub use ids::{InvalidId, RouteId, StationId};
pub use window::{
    ActiveWindow, DEFAULT_END_HOUR, DEFAULT_START_HOUR, InvalidWindow, is_live, live_within,
};
