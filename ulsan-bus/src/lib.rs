//! Ulsan bus arrival poller.
//!
//! Polls the Ulsan ITS bus arrival feed for a set of stations and exposes one
//! sensor per station plus one per bus route, each refreshed on its own
//! throttle and served as JSON.

pub mod clock;
pub mod config;
pub mod domain;
pub mod feed;
pub mod platform;
pub mod sensor;
pub mod throttle;
pub mod web;
