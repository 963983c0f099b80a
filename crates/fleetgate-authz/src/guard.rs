//! Privilege-escalation guard.
//!
//! Pure checks over already-loaded role grants, consulted by the
//! assignment flows before any mutation. The rule set: nobody hands
//! out SUPER_ADMIN (directly or via a role that carries it) without
//! already holding it, and role assignment stays within the actor's
//! own tenant unless the actor is a SUPER_ADMIN holder.

use fleetgate_core::repository::RoleGrant;
use uuid::Uuid;

use crate::error::GuardError;

/// Whether any role in the set carries the SUPER_ADMIN permission.
///
/// Deliberately ignores `active` flags: a role that could confer
/// SUPER_ADMIN after reactivation is treated as elevated now.
pub fn carries_super_admin(grants: &[RoleGrant]) -> bool {
    grants
        .iter()
        .flat_map(|g| g.permissions.iter())
        .any(|p| p.code.is_super_admin())
}

/// Validate a proposed role assignment against the escalation rules.
pub fn check_role_assignment(
    grants: &[RoleGrant],
    actor_tenant: Option<Uuid>,
    actor_is_super_admin: bool,
) -> Result<(), GuardError> {
    if actor_is_super_admin {
        return Ok(());
    }

    if carries_super_admin(grants) {
        return Err(GuardError::ElevatedRoleAssignment);
    }

    for grant in grants {
        if grant.role.tenant_id != actor_tenant {
            return Err(GuardError::CrossTenantRole {
                role: grant.role.name.clone(),
            });
        }
    }

    Ok(())
}
