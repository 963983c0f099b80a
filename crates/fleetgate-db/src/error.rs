//! Database-specific error types and conversions.

use fleetgate_core::error::FleetError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Corrupted record: {0}")]
    Corrupted(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl From<DbError> for FleetError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => FleetError::NotFound { entity, id },
            other => FleetError::Database(other.to_string()),
        }
    }
}
