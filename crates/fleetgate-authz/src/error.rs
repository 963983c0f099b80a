//! Escalation-guard error types.

use fleetgate_core::error::FleetError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GuardError {
    #[error("assigning roles that carry SUPER_ADMIN requires the SUPER_ADMIN permission")]
    ElevatedRoleAssignment,

    #[error("role '{role}' belongs to a different tenant")]
    CrossTenantRole { role: String },

    #[error("role '{role}' is inactive")]
    InactiveRole { role: String },

    #[error("permission {code} is inactive")]
    InactivePermission { code: String },

    #[error("actor may not grant permission {code}")]
    NotGrantable { code: String },
}

impl From<GuardError> for FleetError {
    fn from(err: GuardError) -> Self {
        match err {
            GuardError::ElevatedRoleAssignment
            | GuardError::CrossTenantRole { .. }
            | GuardError::NotGrantable { .. } => FleetError::AuthorizationDenied {
                reason: err.to_string(),
            },
            GuardError::InactiveRole { .. } | GuardError::InactivePermission { .. } => {
                FleetError::InvalidState {
                    reason: err.to_string(),
                }
            }
        }
    }
}
