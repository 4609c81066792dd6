//! Web layer for the bus arrival platform.
//!
//! Exposes the current view of every sensor as JSON.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
