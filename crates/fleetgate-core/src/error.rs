//! Error types for the Fleetgate system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FleetError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Authorization denied: {reason}")]
    AuthorizationDenied { reason: String },

    #[error("Invalid state: {reason}")]
    InvalidState { reason: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type FleetResult<T> = Result<T, FleetError>;
