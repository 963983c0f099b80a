//! Authorization decision engine.
//!
//! Every public operation is a pure function of current directory
//! data: the engine holds no mutable state and caches nothing, so a
//! revoked role is invisible to the very next check. All decisions
//! fail closed: a user, role, or permission the directory cannot
//! produce yields `Ok(false)`, never an error. Only infrastructure
//! faults (store unreachable) surface as `Err`; callers must treat
//! those as denial too.

use std::collections::HashSet;

use fleetgate_core::error::FleetResult;
use fleetgate_core::models::permission::PermissionCode;
use fleetgate_core::models::user::User;
use fleetgate_core::repository::{DirectoryStore, UserGrants};
use tracing::debug;
use uuid::Uuid;

use crate::resolver::{EffectivePermissions, effective_permissions};
use crate::scope::{ScopeResolver, TenantScope};

/// The authorization decision engine.
///
/// Generic over the directory store so the engine has no dependency on
/// the database crate, and over the scope resolver so deployments can
/// plug in hierarchical scoping without touching the decision logic.
pub struct AuthzEngine<D: DirectoryStore, S: ScopeResolver = TenantScope> {
    directory: D,
    scope: S,
}

impl<D: DirectoryStore> AuthzEngine<D> {
    /// Engine with the default tenant-equality scope rule.
    pub fn new(directory: D) -> Self {
        Self {
            directory,
            scope: TenantScope,
        }
    }
}

impl<D: DirectoryStore, S: ScopeResolver> AuthzEngine<D, S> {
    pub fn with_scope_resolver(directory: D, scope: S) -> Self {
        Self { directory, scope }
    }

    /// Check whether a user holds a permission, optionally validated
    /// against a scope id.
    ///
    /// Decision order: load the grants graph (missing or inactive user
    /// denies), SUPER_ADMIN bypass, code membership, then scope
    /// validation when a scope id is supplied.
    pub async fn has_permission(
        &self,
        user_id: Uuid,
        code: PermissionCode,
        scope_id: Option<Uuid>,
    ) -> FleetResult<bool> {
        debug!(%user_id, code = %code, ?scope_id, "checking permission");

        let Some(grants) = self.directory.find_user_with_grants(user_id).await? else {
            debug!(%user_id, "user not found, denying");
            return Ok(false);
        };

        let permissions = effective_permissions(&grants);

        if permissions.is_super_admin() {
            debug!(%user_id, "SUPER_ADMIN present, granting");
            return Ok(true);
        }

        if !permissions.contains(code) {
            debug!(%user_id, code = %code, "permission not held, denying");
            return Ok(false);
        }

        match scope_id {
            Some(scope) => self.validate_scope(&grants.user, code, scope).await,
            None => Ok(true),
        }
    }

    /// OR-check: does the user hold at least one of `codes`?
    ///
    /// The grants graph is loaded once; the first code that is both
    /// held and scope-valid short-circuits. An empty `codes` set is
    /// never satisfied.
    pub async fn has_any_permission(
        &self,
        user_id: Uuid,
        codes: &HashSet<PermissionCode>,
        scope_id: Option<Uuid>,
    ) -> FleetResult<bool> {
        if codes.is_empty() {
            return Ok(false);
        }

        let Some(grants) = self.directory.find_user_with_grants(user_id).await? else {
            return Ok(false);
        };

        let permissions = effective_permissions(&grants);

        if permissions.is_super_admin() {
            return Ok(true);
        }

        for &code in codes {
            if !permissions.contains(code) {
                continue;
            }
            match scope_id {
                None => return Ok(true),
                Some(scope) => {
                    if self.validate_scope(&grants.user, code, scope).await? {
                        return Ok(true);
                    }
                }
            }
        }

        Ok(false)
    }

    /// AND-check: does the user hold every code in `codes`?
    ///
    /// An empty set is vacuously satisfied.
    pub async fn has_all_permissions(
        &self,
        user_id: Uuid,
        codes: &HashSet<PermissionCode>,
        scope_id: Option<Uuid>,
    ) -> FleetResult<bool> {
        for &code in codes {
            if !self.has_permission(user_id, code, scope_id).await? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// The user's full effective permission set. Missing and inactive
    /// users resolve to the empty set.
    pub async fn get_all_user_permissions(
        &self,
        user_id: Uuid,
    ) -> FleetResult<EffectivePermissions> {
        let Some(grants) = self.directory.find_user_with_grants(user_id).await? else {
            return Ok(EffectivePermissions::default());
        };
        Ok(effective_permissions(&grants))
    }

    /// May this user act on the given tenant?
    ///
    /// SUPER_ADMIN holders may act on every tenant; everyone else only
    /// on their own. NOTE: global users (`tenant_id` = None) do NOT
    /// pass this check even though scope validation exempts them. The
    /// two answer different questions ("may I act on this tenant" vs
    /// "does my grant cover this scope"); the asymmetry is kept
    /// pending product review.
    pub async fn can_access_tenant(&self, user_id: Uuid, tenant_id: Uuid) -> FleetResult<bool> {
        debug!(%user_id, %tenant_id, "checking tenant access");

        let Some(grants) = self.directory.find_user_with_grants(user_id).await? else {
            return Ok(false);
        };
        if !grants.user.active {
            return Ok(false);
        }

        if effective_permissions(&grants).is_super_admin() {
            return Ok(true);
        }

        Ok(grants.user.tenant_id == Some(tenant_id))
    }

    /// May the grantor hand out `code`?
    ///
    /// SUPER_ADMIN holders may grant anything. Everyone else may only
    /// pass on permissions they themselves hold within the target
    /// tenant, and SUPER_ADMIN itself is never grantable through that
    /// generic path.
    pub async fn can_grant_permission(
        &self,
        grantor_id: Uuid,
        code: PermissionCode,
        target_tenant_id: Option<Uuid>,
    ) -> FleetResult<bool> {
        debug!(%grantor_id, code = %code, ?target_tenant_id, "checking grant authority");

        if self
            .has_permission(grantor_id, PermissionCode::SuperAdmin, None)
            .await?
        {
            return Ok(true);
        }

        if !self
            .has_permission(grantor_id, code, target_tenant_id)
            .await?
        {
            debug!(%grantor_id, code = %code, "grantor does not hold the permission, denying");
            return Ok(false);
        }

        // Holding SUPER_ADMIN as a plain code is not enough to grant it;
        // only the bypass branch above can authorize that.
        if code.is_super_admin() {
            return self
                .has_permission(grantor_id, PermissionCode::SuperAdmin, None)
                .await;
        }

        Ok(true)
    }

    /// May the manager administer the target user?
    ///
    /// SUPER_ADMIN is evaluated before the self-management block, so a
    /// SUPER_ADMIN holder may manage any account including their own.
    /// Everyone else needs USER_UPDATE, a target other than
    /// themselves, and a shared non-null tenant.
    pub async fn can_manage_user(
        &self,
        manager_id: Uuid,
        target_user_id: Uuid,
    ) -> FleetResult<bool> {
        debug!(%manager_id, %target_user_id, "checking user management authority");

        if self
            .has_permission(manager_id, PermissionCode::SuperAdmin, None)
            .await?
        {
            return Ok(true);
        }

        if manager_id == target_user_id {
            return Ok(false);
        }

        if !self
            .has_permission(manager_id, PermissionCode::UserUpdate, None)
            .await?
        {
            return Ok(false);
        }

        let Some(manager) = self.directory.find_user_with_grants(manager_id).await? else {
            return Ok(false);
        };
        let Some(target) = self.directory.find_user_with_grants(target_user_id).await? else {
            return Ok(false);
        };

        match (manager.user.tenant_id, target.user.tenant_id) {
            (Some(m), Some(t)) => Ok(m == t),
            _ => Ok(false),
        }
    }

    /// Validate a held, scope-requiring permission against a scope id.
    ///
    /// Global users pass unconditionally. A permission record that is
    /// missing or scope-exempt passes (best-effort lookup). Otherwise
    /// the scope resolver decides; the default rule is tenant equality.
    pub(crate) async fn validate_scope(
        &self,
        user: &User,
        code: PermissionCode,
        scope_id: Uuid,
    ) -> FleetResult<bool> {
        if user.tenant_id.is_none() {
            debug!(user_id = %user.id, "global user, scope validation passes");
            return Ok(true);
        }

        let Some(permission) = self.directory.find_permission_by_code(code).await? else {
            debug!(code = %code, "no permission record, treating as scope-exempt");
            return Ok(true);
        };

        if !permission.requires_scope {
            return Ok(true);
        }

        let matched = self.scope.scope_matches(user, &permission, scope_id);
        if !matched {
            debug!(
                user_id = %user.id,
                code = %code,
                %scope_id,
                "scope validation failed"
            );
        }
        Ok(matched)
    }

    /// Accessor for composing services in this crate.
    pub(crate) fn directory(&self) -> &D {
        &self.directory
    }
}

/// Grants graph helper shared with the admin service: the actor's
/// tenant and whether the set bypasses checks entirely.
pub(crate) fn actor_context(grants: &UserGrants) -> (Option<Uuid>, bool) {
    let permissions = effective_permissions(grants);
    (grants.user.tenant_id, permissions.is_super_admin())
}
