//! Administrative assignment flows with inline escalation guarding.
//!
//! Every mutation validates eagerly and fully before touching the
//! store; a batch that fails any check performs no partial grants.

use std::collections::HashSet;

use fleetgate_core::error::{FleetError, FleetResult};
use fleetgate_core::models::permission::{CreatePermission, Permission, PermissionCode, UpdatePermission};
use fleetgate_core::repository::{
    DirectoryStore, PermissionRepository, RoleRepository, UserRepository,
};
use tracing::info;
use uuid::Uuid;

use crate::engine::{AuthzEngine, actor_context};
use crate::error::GuardError;
use crate::guard;
use crate::scope::{ScopeResolver, TenantScope};

/// Role/permission administration guarded by the decision engine.
pub struct AccessAdminService<D, U, R, P, S = TenantScope>
where
    D: DirectoryStore,
    U: UserRepository,
    R: RoleRepository,
    P: PermissionRepository,
    S: ScopeResolver,
{
    engine: AuthzEngine<D, S>,
    users: U,
    roles: R,
    permissions: P,
}

impl<D, U, R, P, S> AccessAdminService<D, U, R, P, S>
where
    D: DirectoryStore,
    U: UserRepository,
    R: RoleRepository,
    P: PermissionRepository,
    S: ScopeResolver,
{
    pub fn new(engine: AuthzEngine<D, S>, users: U, roles: R, permissions: P) -> Self {
        Self {
            engine,
            users,
            roles,
            permissions,
        }
    }

    pub fn engine(&self) -> &AuthzEngine<D, S> {
        &self.engine
    }

    /// Assign a set of roles to a user.
    ///
    /// The actor needs ROLE_ASSIGN within the target user's tenant.
    /// Unknown role ids are a domain error, inactive roles an invalid
    /// state, and the escalation guard rejects SUPER_ADMIN-carrying or
    /// cross-tenant roles for non-SUPER_ADMIN actors.
    pub async fn assign_roles(
        &self,
        actor_id: Uuid,
        user_id: Uuid,
        role_ids: &[Uuid],
    ) -> FleetResult<()> {
        let target = self.users.get_by_id(user_id).await?;

        if !self
            .engine
            .has_permission(actor_id, PermissionCode::RoleAssign, target.tenant_id)
            .await?
        {
            return Err(FleetError::AuthorizationDenied {
                reason: "insufficient permissions to assign roles".into(),
            });
        }

        let mut grants = Vec::with_capacity(role_ids.len());
        for &role_id in role_ids {
            grants.push(self.roles.get_with_permissions(role_id).await?);
        }
        for grant in &grants {
            if !grant.role.active {
                return Err(GuardError::InactiveRole {
                    role: grant.role.name.clone(),
                }
                .into());
            }
        }

        let actor = self
            .engine
            .directory()
            .find_user_with_grants(actor_id)
            .await?
            .ok_or_else(|| FleetError::AuthorizationDenied {
                reason: "unknown actor".into(),
            })?;
        let (actor_tenant, actor_is_super) = actor_context(&actor);

        guard::check_role_assignment(&grants, actor_tenant, actor_is_super)?;

        for grant in &grants {
            self.roles.assign_to_user(user_id, grant.role.id).await?;
        }

        info!(
            %actor_id,
            %user_id,
            roles = grants.len(),
            "roles assigned"
        );
        Ok(())
    }

    /// Remove a role assignment. Same ROLE_ASSIGN gate as assignment.
    pub async fn unassign_role(
        &self,
        actor_id: Uuid,
        user_id: Uuid,
        role_id: Uuid,
    ) -> FleetResult<()> {
        let target = self.users.get_by_id(user_id).await?;

        if !self
            .engine
            .has_permission(actor_id, PermissionCode::RoleAssign, target.tenant_id)
            .await?
        {
            return Err(FleetError::AuthorizationDenied {
                reason: "insufficient permissions to assign roles".into(),
            });
        }

        self.roles.unassign_from_user(user_id, role_id).await?;
        info!(%actor_id, %user_id, %role_id, "role unassigned");
        Ok(())
    }

    /// Attach permissions to a role.
    ///
    /// Already-attached ids are skipped; every permission newly
    /// attached requires grant authority over its code within the
    /// role's tenant.
    pub async fn grant_permissions_to_role(
        &self,
        actor_id: Uuid,
        role_id: Uuid,
        permission_ids: &[Uuid],
    ) -> FleetResult<()> {
        let existing = self.roles.get_with_permissions(role_id).await?;
        let attached: HashSet<Uuid> = existing.permissions.iter().map(|p| p.id).collect();

        let mut to_attach = Vec::new();
        for &permission_id in permission_ids {
            if attached.contains(&permission_id) {
                continue;
            }
            let permission = self.permissions.get_by_id(permission_id).await?;
            if !permission.active {
                return Err(GuardError::InactivePermission {
                    code: permission.code.to_string(),
                }
                .into());
            }
            if !self
                .engine
                .can_grant_permission(actor_id, permission.code, existing.role.tenant_id)
                .await?
            {
                return Err(GuardError::NotGrantable {
                    code: permission.code.to_string(),
                }
                .into());
            }
            to_attach.push(permission);
        }

        for permission in &to_attach {
            self.permissions
                .grant_to_role(role_id, permission.id)
                .await?;
        }

        info!(
            %actor_id,
            %role_id,
            granted = to_attach.len(),
            "permissions granted to role"
        );
        Ok(())
    }

    /// Detach a permission from a role. Gated on ROLE_UPDATE within
    /// the role's tenant; revocation needs no grant authority.
    pub async fn revoke_permission_from_role(
        &self,
        actor_id: Uuid,
        role_id: Uuid,
        permission_id: Uuid,
    ) -> FleetResult<()> {
        let role = self.roles.get_by_id(role_id).await?;

        if !self
            .engine
            .has_permission(actor_id, PermissionCode::RoleUpdate, role.tenant_id)
            .await?
        {
            return Err(FleetError::AuthorizationDenied {
                reason: "insufficient permissions to update role".into(),
            });
        }

        self.permissions
            .revoke_from_role(role_id, permission_id)
            .await?;
        info!(%actor_id, %role_id, %permission_id, "permission revoked from role");
        Ok(())
    }

    /// Create a permission record. The actor needs grant authority
    /// over the new code.
    pub async fn create_permission(
        &self,
        actor_id: Uuid,
        input: CreatePermission,
    ) -> FleetResult<Permission> {
        if !self
            .engine
            .can_grant_permission(actor_id, input.code, None)
            .await?
        {
            return Err(GuardError::NotGrantable {
                code: input.code.to_string(),
            }
            .into());
        }

        if self.permissions.find_by_code(input.code).await?.is_some() {
            return Err(FleetError::AlreadyExists {
                entity: format!("permission {}", input.code),
            });
        }

        let permission = self.permissions.create(input).await?;
        info!(%actor_id, code = %permission.code, "permission created");
        Ok(permission)
    }

    /// Update a permission record. Gated on grant authority over the
    /// existing code.
    pub async fn update_permission(
        &self,
        actor_id: Uuid,
        permission_id: Uuid,
        input: UpdatePermission,
    ) -> FleetResult<Permission> {
        let existing = self.permissions.get_by_id(permission_id).await?;

        if !self
            .engine
            .can_grant_permission(actor_id, existing.code, None)
            .await?
        {
            return Err(GuardError::NotGrantable {
                code: existing.code.to_string(),
            }
            .into());
        }

        let updated = self.permissions.update(permission_id, input).await?;
        info!(%actor_id, code = %updated.code, "permission updated");
        Ok(updated)
    }

    /// Deactivate a permission record. Gated on grant authority over
    /// the existing code.
    pub async fn delete_permission(&self, actor_id: Uuid, permission_id: Uuid) -> FleetResult<()> {
        let existing = self.permissions.get_by_id(permission_id).await?;

        if !self
            .engine
            .can_grant_permission(actor_id, existing.code, None)
            .await?
        {
            return Err(GuardError::NotGrantable {
                code: existing.code.to_string(),
            }
            .into());
        }

        self.permissions.delete(permission_id).await?;
        info!(%actor_id, code = %existing.code, "permission deactivated");
        Ok(())
    }
}
