//! Data transfer objects for web responses.

use serde::Serialize;

use crate::sensor::EntityView;

/// Response listing every entity.
#[derive(Debug, Serialize)]
pub struct EntityListResponse {
    pub entities: Vec<EntityView>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}
