//! Effective-permission-set resolution.
//!
//! The effective set is recomputed from the directory on every check;
//! nothing is cached, so a role or permission edit is visible to the
//! very next check issued after the write commits.

use std::collections::HashSet;

use fleetgate_core::models::permission::PermissionCode;
use fleetgate_core::repository::UserGrants;

/// The union of permission codes reachable from a user's active role
/// memberships. Derived, never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectivePermissions(HashSet<PermissionCode>);

impl EffectivePermissions {
    pub fn contains(&self, code: PermissionCode) -> bool {
        self.0.contains(&code)
    }

    /// Whether the administrative bypass sentinel is present.
    pub fn is_super_admin(&self) -> bool {
        self.contains(PermissionCode::SuperAdmin)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = PermissionCode> + '_ {
        self.0.iter().copied()
    }

    pub fn into_codes(self) -> HashSet<PermissionCode> {
        self.0
    }
}

impl FromIterator<PermissionCode> for EffectivePermissions {
    fn from_iter<I: IntoIterator<Item = PermissionCode>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Compute the effective permission set from a loaded grants graph.
///
/// Inactive users resolve to the empty set, as do inactive roles and
/// inactive permissions within an otherwise active graph. Duplicates
/// across roles collapse naturally.
pub fn effective_permissions(grants: &UserGrants) -> EffectivePermissions {
    if !grants.user.active {
        return EffectivePermissions::default();
    }

    grants
        .roles
        .iter()
        .filter(|g| g.role.active)
        .flat_map(|g| g.permissions.iter())
        .filter(|p| p.active)
        .map(|p| p.code)
        .collect()
}
