//! Integration tests for the guarded administrative assignment flows.

use fleetgate_authz::{AccessAdminService, AuthzEngine};
use fleetgate_core::catalog;
use fleetgate_core::error::FleetError;
use fleetgate_core::models::permission::{CreatePermission, Permission, PermissionCode};
use fleetgate_core::models::role::{CreateRole, Role, RoleScope};
use fleetgate_core::models::user::{CreateUser, User};
use fleetgate_core::repository::{PermissionRepository, RoleRepository, UserRepository};
use fleetgate_db::repository::{
    SurrealDirectoryStore, SurrealPermissionRepository, SurrealRoleRepository,
    SurrealUserRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

type AdminService = AccessAdminService<
    SurrealDirectoryStore<Db>,
    SurrealUserRepository<Db>,
    SurrealRoleRepository<Db>,
    SurrealPermissionRepository<Db>,
>;

struct Fixture {
    users: SurrealUserRepository<Db>,
    roles: SurrealRoleRepository<Db>,
    permissions: SurrealPermissionRepository<Db>,
    admin: AdminService,
    tenant_a: Uuid,
    tenant_b: Uuid,
}

async fn setup() -> Fixture {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    fleetgate_db::run_migrations(&db).await.unwrap();

    let users = SurrealUserRepository::new(db.clone());
    let roles = SurrealRoleRepository::new(db.clone());
    let permissions = SurrealPermissionRepository::new(db.clone());
    let engine = AuthzEngine::new(SurrealDirectoryStore::new(db.clone()));
    let admin = AccessAdminService::new(engine, users.clone(), roles.clone(), permissions.clone());

    Fixture {
        users,
        roles,
        permissions,
        admin,
        tenant_a: Uuid::new_v4(),
        tenant_b: Uuid::new_v4(),
    }
}

impl Fixture {
    async fn user(&self, username: &str, tenant_id: Option<Uuid>) -> User {
        self.users
            .create(CreateUser {
                tenant_id,
                username: username.into(),
                email: None,
                first_name: "Test".into(),
                last_name: "User".into(),
                created_by: None,
            })
            .await
            .unwrap()
    }

    async fn role(&self, name: &str, tenant_id: Option<Uuid>) -> Role {
        self.roles
            .create(CreateRole {
                tenant_id,
                name: name.into(),
                description: String::new(),
                scope: if tenant_id.is_some() {
                    RoleScope::Tenant
                } else {
                    RoleScope::Global
                },
                created_by: None,
            })
            .await
            .unwrap()
    }

    async fn permission(&self, code: PermissionCode, requires_scope: bool) -> Permission {
        let def = catalog::definition_for(code).unwrap();
        self.permissions
            .create(CreatePermission {
                code,
                name: def.name.into(),
                description: def.description.into(),
                category: def.category,
                requires_scope,
                created_by: None,
            })
            .await
            .unwrap()
    }

    /// An actor in `tenant_a` holding the given codes through one role.
    async fn actor_with(&self, username: &str, codes: &[PermissionCode]) -> User {
        let actor = self.user(username, Some(self.tenant_a)).await;
        let role = self
            .role(&format!("{username}-role"), Some(self.tenant_a))
            .await;
        for &code in codes {
            let permission = self.permission(code, true).await;
            self.permissions
                .grant_to_role(role.id, permission.id)
                .await
                .unwrap();
        }
        self.roles
            .assign_to_user(actor.id, role.id)
            .await
            .unwrap();
        actor
    }

    /// An actor holding the SUPER_ADMIN sentinel through a global role.
    async fn super_admin(&self) -> User {
        let actor = self.user("root", None).await;
        let role = self.role("SUPER_ADMIN", None).await;
        let sentinel = match self
            .permissions
            .find_by_code(PermissionCode::SuperAdmin)
            .await
            .unwrap()
        {
            Some(existing) => existing,
            None => self.permission(PermissionCode::SuperAdmin, false).await,
        };
        self.permissions
            .grant_to_role(role.id, sentinel.id)
            .await
            .unwrap();
        self.roles
            .assign_to_user(actor.id, role.id)
            .await
            .unwrap();
        actor
    }
}

// ---------------------------------------------------------------------------
// assign_roles
// ---------------------------------------------------------------------------

#[tokio::test]
async fn assign_roles_happy_path() {
    let fx = setup().await;
    let actor = fx
        .actor_with("tenant-admin", &[PermissionCode::RoleAssign])
        .await;
    let target = fx.user("driver", Some(fx.tenant_a)).await;

    let viewer = fx.role("VIEWER", Some(fx.tenant_a)).await;
    let read = fx.permission(PermissionCode::VehicleRead, true).await;
    fx.permissions
        .grant_to_role(viewer.id, read.id)
        .await
        .unwrap();

    fx.admin
        .assign_roles(actor.id, target.id, &[viewer.id])
        .await
        .unwrap();

    assert!(
        fx.admin
            .engine()
            .has_permission(target.id, PermissionCode::VehicleRead, Some(fx.tenant_a))
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn assign_roles_unknown_role_is_not_found() {
    let fx = setup().await;
    let actor = fx
        .actor_with("tenant-admin", &[PermissionCode::RoleAssign])
        .await;
    let target = fx.user("driver", Some(fx.tenant_a)).await;

    let err = fx
        .admin
        .assign_roles(actor.id, target.id, &[Uuid::new_v4()])
        .await
        .unwrap_err();
    assert!(matches!(err, FleetError::NotFound { .. }), "got {err:?}");
}

#[tokio::test]
async fn assign_roles_unknown_target_is_not_found() {
    let fx = setup().await;
    let actor = fx
        .actor_with("tenant-admin", &[PermissionCode::RoleAssign])
        .await;

    let err = fx
        .admin
        .assign_roles(actor.id, Uuid::new_v4(), &[])
        .await
        .unwrap_err();
    assert!(matches!(err, FleetError::NotFound { .. }), "got {err:?}");
}

#[tokio::test]
async fn assign_roles_rejects_inactive_roles() {
    let fx = setup().await;
    let actor = fx
        .actor_with("tenant-admin", &[PermissionCode::RoleAssign])
        .await;
    let target = fx.user("driver", Some(fx.tenant_a)).await;

    let retired = fx.role("Retired", Some(fx.tenant_a)).await;
    fx.roles.delete(retired.id).await.unwrap();

    let err = fx
        .admin
        .assign_roles(actor.id, target.id, &[retired.id])
        .await
        .unwrap_err();
    assert!(
        matches!(err, FleetError::InvalidState { .. }),
        "got {err:?}"
    );
}

#[tokio::test]
async fn assigning_an_elevated_role_requires_super_admin() {
    let fx = setup().await;
    let actor = fx
        .actor_with("tenant-admin", &[PermissionCode::RoleAssign])
        .await;
    let target = fx.user("driver", Some(fx.tenant_a)).await;

    let elevated = fx.role("Elevated", Some(fx.tenant_a)).await;
    let sentinel = fx.permission(PermissionCode::SuperAdmin, false).await;
    fx.permissions
        .grant_to_role(elevated.id, sentinel.id)
        .await
        .unwrap();

    let err = fx
        .admin
        .assign_roles(actor.id, target.id, &[elevated.id])
        .await
        .unwrap_err();
    assert!(
        matches!(err, FleetError::AuthorizationDenied { .. }),
        "got {err:?}"
    );

    // A SUPER_ADMIN actor passes the same assignment.
    let root = fx.super_admin().await;
    fx.admin
        .assign_roles(root.id, target.id, &[elevated.id])
        .await
        .unwrap();
}

#[tokio::test]
async fn cross_tenant_role_assignment_requires_super_admin() {
    let fx = setup().await;
    let actor = fx
        .actor_with("tenant-admin", &[PermissionCode::RoleAssign])
        .await;
    let target = fx.user("driver", Some(fx.tenant_a)).await;

    let foreign = fx.role("Foreign", Some(fx.tenant_b)).await;

    let err = fx
        .admin
        .assign_roles(actor.id, target.id, &[foreign.id])
        .await
        .unwrap_err();
    assert!(
        matches!(err, FleetError::AuthorizationDenied { .. }),
        "got {err:?}"
    );

    let root = fx.super_admin().await;
    fx.admin
        .assign_roles(root.id, target.id, &[foreign.id])
        .await
        .unwrap();
}

#[tokio::test]
async fn assign_roles_requires_role_assign_permission() {
    let fx = setup().await;
    let actor = fx.user("powerless", Some(fx.tenant_a)).await;
    let target = fx.user("driver", Some(fx.tenant_a)).await;
    let viewer = fx.role("VIEWER", Some(fx.tenant_a)).await;

    let err = fx
        .admin
        .assign_roles(actor.id, target.id, &[viewer.id])
        .await
        .unwrap_err();
    assert!(
        matches!(err, FleetError::AuthorizationDenied { .. }),
        "got {err:?}"
    );
}

#[tokio::test]
async fn unassign_role_removes_the_grant_path() {
    let fx = setup().await;
    let actor = fx
        .actor_with("tenant-admin", &[PermissionCode::RoleAssign])
        .await;
    let target = fx.user("driver", Some(fx.tenant_a)).await;
    let viewer = fx.role("VIEWER", Some(fx.tenant_a)).await;
    let read = fx.permission(PermissionCode::VehicleRead, true).await;
    fx.permissions
        .grant_to_role(viewer.id, read.id)
        .await
        .unwrap();

    fx.admin
        .assign_roles(actor.id, target.id, &[viewer.id])
        .await
        .unwrap();
    fx.admin
        .unassign_role(actor.id, target.id, viewer.id)
        .await
        .unwrap();

    assert!(
        !fx.admin
            .engine()
            .has_permission(target.id, PermissionCode::VehicleRead, None)
            .await
            .unwrap()
    );
}

// ---------------------------------------------------------------------------
// grant_permissions_to_role
// ---------------------------------------------------------------------------

#[tokio::test]
async fn holders_can_grant_their_permissions_within_tenant() {
    let fx = setup().await;
    let actor = fx
        .actor_with(
            "alert-admin",
            &[PermissionCode::AlertManage, PermissionCode::RoleAssign],
        )
        .await;
    let role = fx.role("Alerting", Some(fx.tenant_a)).await;
    let manage = fx
        .permissions
        .find_by_code(PermissionCode::AlertManage)
        .await
        .unwrap()
        .unwrap();

    fx.admin
        .grant_permissions_to_role(actor.id, role.id, &[manage.id])
        .await
        .unwrap();

    let grant = fx.roles.get_with_permissions(role.id).await.unwrap();
    assert_eq!(grant.permissions.len(), 1);
    assert_eq!(grant.permissions[0].code, PermissionCode::AlertManage);
}

#[tokio::test]
async fn granting_an_unheld_permission_is_denied() {
    let fx = setup().await;
    let actor = fx
        .actor_with("limited", &[PermissionCode::RoleAssign])
        .await;
    let role = fx.role("Alerting", Some(fx.tenant_a)).await;
    let manage = fx.permission(PermissionCode::AlertManage, true).await;

    let err = fx
        .admin
        .grant_permissions_to_role(actor.id, role.id, &[manage.id])
        .await
        .unwrap_err();
    assert!(
        matches!(err, FleetError::AuthorizationDenied { .. }),
        "got {err:?}"
    );
}

#[tokio::test]
async fn granting_an_unknown_permission_is_not_found() {
    let fx = setup().await;
    let root = fx.super_admin().await;
    let role = fx.role("Alerting", Some(fx.tenant_a)).await;

    let err = fx
        .admin
        .grant_permissions_to_role(root.id, role.id, &[Uuid::new_v4()])
        .await
        .unwrap_err();
    assert!(matches!(err, FleetError::NotFound { .. }), "got {err:?}");
}

#[tokio::test]
async fn granting_an_inactive_permission_is_invalid_state() {
    let fx = setup().await;
    let root = fx.super_admin().await;
    let role = fx.role("Alerting", Some(fx.tenant_a)).await;
    let manage = fx.permission(PermissionCode::AlertManage, true).await;
    fx.permissions.delete(manage.id).await.unwrap();

    let err = fx
        .admin
        .grant_permissions_to_role(root.id, role.id, &[manage.id])
        .await
        .unwrap_err();
    assert!(
        matches!(err, FleetError::InvalidState { .. }),
        "got {err:?}"
    );
}

#[tokio::test]
async fn regranting_an_attached_permission_is_a_no_op() {
    let fx = setup().await;
    let root = fx.super_admin().await;
    let role = fx.role("Alerting", Some(fx.tenant_a)).await;
    let manage = fx.permission(PermissionCode::AlertManage, true).await;

    fx.admin
        .grant_permissions_to_role(root.id, role.id, &[manage.id])
        .await
        .unwrap();
    fx.admin
        .grant_permissions_to_role(root.id, role.id, &[manage.id])
        .await
        .unwrap();

    let grant = fx.roles.get_with_permissions(role.id).await.unwrap();
    assert_eq!(grant.permissions.len(), 1);
}

#[tokio::test]
async fn revoking_requires_role_update() {
    let fx = setup().await;
    let root = fx.super_admin().await;
    let role = fx.role("Alerting", Some(fx.tenant_a)).await;
    let manage = fx.permission(PermissionCode::AlertManage, true).await;
    fx.admin
        .grant_permissions_to_role(root.id, role.id, &[manage.id])
        .await
        .unwrap();

    let bystander = fx.user("bystander", Some(fx.tenant_a)).await;
    let err = fx
        .admin
        .revoke_permission_from_role(bystander.id, role.id, manage.id)
        .await
        .unwrap_err();
    assert!(
        matches!(err, FleetError::AuthorizationDenied { .. }),
        "got {err:?}"
    );

    let editor = fx
        .actor_with("role-editor", &[PermissionCode::RoleUpdate])
        .await;
    fx.admin
        .revoke_permission_from_role(editor.id, role.id, manage.id)
        .await
        .unwrap();

    let grant = fx.roles.get_with_permissions(role.id).await.unwrap();
    assert!(grant.permissions.is_empty());
}

// ---------------------------------------------------------------------------
// Permission record administration
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_permission_requires_grant_authority() {
    let fx = setup().await;
    let bystander = fx.user("bystander", Some(fx.tenant_a)).await;

    let def = catalog::definition_for(PermissionCode::GeofenceManage).unwrap();
    let input = CreatePermission {
        code: def.code,
        name: def.name.into(),
        description: def.description.into(),
        category: def.category,
        requires_scope: def.requires_scope,
        created_by: None,
    };

    let err = fx
        .admin
        .create_permission(bystander.id, input.clone())
        .await
        .unwrap_err();
    assert!(
        matches!(err, FleetError::AuthorizationDenied { .. }),
        "got {err:?}"
    );

    let root = fx.super_admin().await;
    let created = fx.admin.create_permission(root.id, input).await.unwrap();
    assert_eq!(created.code, PermissionCode::GeofenceManage);
}

#[tokio::test]
async fn duplicate_permission_codes_are_rejected() {
    let fx = setup().await;
    let root = fx.super_admin().await;
    fx.permission(PermissionCode::GeofenceManage, true).await;

    let def = catalog::definition_for(PermissionCode::GeofenceManage).unwrap();
    let err = fx
        .admin
        .create_permission(
            root.id,
            CreatePermission {
                code: def.code,
                name: def.name.into(),
                description: def.description.into(),
                category: def.category,
                requires_scope: def.requires_scope,
                created_by: None,
            },
        )
        .await
        .unwrap_err();
    assert!(
        matches!(err, FleetError::AlreadyExists { .. }),
        "got {err:?}"
    );
}

#[tokio::test]
async fn deleting_a_permission_deactivates_it_everywhere() {
    let fx = setup().await;
    let root = fx.super_admin().await;
    let holder = fx
        .actor_with("dispatcher", &[PermissionCode::AlertRead])
        .await;

    assert!(
        fx.admin
            .engine()
            .has_permission(holder.id, PermissionCode::AlertRead, Some(fx.tenant_a))
            .await
            .unwrap()
    );

    let alert = fx
        .permissions
        .find_by_code(PermissionCode::AlertRead)
        .await
        .unwrap()
        .unwrap();
    fx.admin.delete_permission(root.id, alert.id).await.unwrap();

    assert!(
        !fx.admin
            .engine()
            .has_permission(holder.id, PermissionCode::AlertRead, Some(fx.tenant_a))
            .await
            .unwrap()
    );
}
