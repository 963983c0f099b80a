//! Scope validation for scope-requiring permissions.

use fleetgate_core::models::permission::Permission;
use fleetgate_core::models::user::User;
use uuid::Uuid;

/// Decides whether a scope-requiring permission held by a user covers
/// a requested scope id.
///
/// This is the extension point for hierarchical scoping (fleet within
/// tenant, region spanning fleets). Implementations refine the match
/// rule only; the engine has already handled global users and
/// scope-exempt permissions before consulting the resolver.
pub trait ScopeResolver: Send + Sync {
    fn scope_matches(&self, user: &User, permission: &Permission, scope_id: Uuid) -> bool;
}

/// Default scope rule: a grant covers exactly the caller's own tenant.
#[derive(Debug, Clone, Copy, Default)]
pub struct TenantScope;

impl ScopeResolver for TenantScope {
    fn scope_matches(&self, user: &User, _permission: &Permission, scope_id: Uuid) -> bool {
        user.tenant_id == Some(scope_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetgate_core::models::permission::{PermissionCategory, PermissionCode};

    fn user_in_tenant(tenant_id: Option<Uuid>) -> User {
        let now = chrono::Utc::now();
        User {
            id: Uuid::new_v4(),
            tenant_id,
            username: "bob".into(),
            email: None,
            first_name: "Bob".into(),
            last_name: "Dispatch".into(),
            active: true,
            created_at: now,
            updated_at: now,
            created_by: None,
            modified_by: None,
        }
    }

    fn scoped_permission() -> Permission {
        Permission {
            id: Uuid::new_v4(),
            code: PermissionCode::ViewLocationLive,
            name: "Live Location Tracking".into(),
            description: String::new(),
            category: PermissionCategory::LocationTracking,
            active: true,
            requires_scope: true,
            created_at: chrono::Utc::now(),
            created_by: None,
        }
    }

    #[test]
    fn own_tenant_matches() {
        let tenant = Uuid::new_v4();
        let user = user_in_tenant(Some(tenant));
        assert!(TenantScope.scope_matches(&user, &scoped_permission(), tenant));
    }

    #[test]
    fn foreign_tenant_does_not_match() {
        let user = user_in_tenant(Some(Uuid::new_v4()));
        assert!(!TenantScope.scope_matches(&user, &scoped_permission(), Uuid::new_v4()));
    }

    #[test]
    fn tenantless_user_matches_nothing_at_this_layer() {
        // Global users never reach the resolver in practice (the engine
        // exempts them first); the base rule alone does not match them.
        let user = user_in_tenant(None);
        assert!(!TenantScope.scope_matches(&user, &scoped_permission(), Uuid::new_v4()));
    }
}
