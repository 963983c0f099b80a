//! Role domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{FleetError, FleetResult};

/// The boundary a role is defined within.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleScope {
    Global,
    Tenant,
    Fleet,
    Regional,
}

impl RoleScope {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Global => "Global",
            Self::Tenant => "Tenant",
            Self::Fleet => "Fleet",
            Self::Regional => "Regional",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Global" => Some(Self::Global),
            "Tenant" => Some(Self::Tenant),
            "Fleet" => Some(Self::Fleet),
            "Regional" => Some(Self::Regional),
            _ => None,
        }
    }
}

/// A named bundle of permissions assignable to users.
///
/// Invariant: `Tenant`-scoped roles carry a tenant id, `Global`-scoped
/// roles do not. See [`validate_scope_pairing`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub id: Uuid,
    /// `None` for global roles.
    pub tenant_id: Option<Uuid>,
    pub name: String,
    pub description: String,
    pub scope: RoleScope,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_by: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRole {
    pub tenant_id: Option<Uuid>,
    pub name: String,
    pub description: String,
    pub scope: RoleScope,
    pub created_by: Option<Uuid>,
}

impl CreateRole {
    pub fn validate(&self) -> FleetResult<()> {
        validate_scope_pairing(self.scope, self.tenant_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateRole {
    pub name: Option<String>,
    pub description: Option<String>,
    pub active: Option<bool>,
    pub modified_by: Option<Uuid>,
}

/// A Tenant-scoped role must name its tenant; a Global role must not.
pub fn validate_scope_pairing(scope: RoleScope, tenant_id: Option<Uuid>) -> FleetResult<()> {
    match (scope, tenant_id) {
        (RoleScope::Tenant, None) => Err(FleetError::Validation {
            message: "tenant-scoped roles require a tenant id".into(),
        }),
        (RoleScope::Global, Some(_)) => Err(FleetError::Validation {
            message: "global roles must not carry a tenant id".into(),
        }),
        _ => Ok(()),
    }
}
