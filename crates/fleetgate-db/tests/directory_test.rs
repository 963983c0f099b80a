//! Integration tests for the repositories and the directory store
//! using in-memory SurrealDB.

use fleetgate_core::catalog;
use fleetgate_core::error::FleetError;
use fleetgate_core::models::permission::{CreatePermission, Permission, PermissionCode};
use fleetgate_core::models::role::{CreateRole, Role, RoleScope, UpdateRole};
use fleetgate_core::models::user::{CreateUser, UpdateUser, User};
use fleetgate_core::repository::{
    DirectoryStore, Pagination, PermissionRepository, RoleRepository, UserRepository,
};
use fleetgate_db::repository::{
    SurrealDirectoryStore, SurrealPermissionRepository, SurrealRoleRepository,
    SurrealUserRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    fleetgate_db::run_migrations(&db).await.unwrap();
    db
}

async fn make_user(db: &Surreal<Db>, username: &str, tenant_id: Option<Uuid>) -> User {
    SurrealUserRepository::new(db.clone())
        .create(CreateUser {
            tenant_id,
            username: username.into(),
            email: Some(format!("{username}@example.com")),
            first_name: "Test".into(),
            last_name: "User".into(),
            created_by: None,
        })
        .await
        .unwrap()
}

async fn make_role(db: &Surreal<Db>, name: &str, tenant_id: Option<Uuid>) -> Role {
    SurrealRoleRepository::new(db.clone())
        .create(CreateRole {
            tenant_id,
            name: name.into(),
            description: "test role".into(),
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

async fn make_permission(db: &Surreal<Db>, code: PermissionCode) -> Permission {
    let def = catalog::definition_for(code).unwrap();
    SurrealPermissionRepository::new(db.clone())
        .create(CreatePermission {
            code,
            name: def.name.into(),
            description: def.description.into(),
            category: def.category,
            requires_scope: def.requires_scope,
            created_by: None,
        })
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// Migrations
// ---------------------------------------------------------------------------

#[tokio::test]
async fn migrations_are_idempotent() {
    let db = setup().await;
    fleetgate_db::run_migrations(&db).await.unwrap();
    fleetgate_db::run_migrations(&db).await.unwrap();
}

// ---------------------------------------------------------------------------
// User repository
// ---------------------------------------------------------------------------

#[tokio::test]
async fn user_crud_round_trip() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db.clone());
    let tenant = Uuid::new_v4();

    let user = make_user(&db, "alice", Some(tenant)).await;
    assert_eq!(user.username, "alice");
    assert_eq!(user.tenant_id, Some(tenant));
    assert!(user.active);

    let fetched = repo.get_by_id(user.id).await.unwrap();
    assert_eq!(fetched.id, user.id);

    let by_name = repo.get_by_username("alice").await.unwrap();
    assert_eq!(by_name.id, user.id);

    let updated = repo
        .update(
            user.id,
            UpdateUser {
                email: Some("new@example.com".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.email.as_deref(), Some("new@example.com"));
    assert_eq!(updated.username, "alice");
}

#[tokio::test]
async fn user_delete_is_soft() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db.clone());
    let user = make_user(&db, "alice", Some(Uuid::new_v4())).await;

    repo.delete(user.id).await.unwrap();

    let fetched = repo.get_by_id(user.id).await.unwrap();
    assert!(!fetched.active, "soft-deleted user must remain fetchable");
}

#[tokio::test]
async fn user_list_filters_by_tenant() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db.clone());
    let tenant_a = Uuid::new_v4();
    let tenant_b = Uuid::new_v4();

    make_user(&db, "a1", Some(tenant_a)).await;
    make_user(&db, "a2", Some(tenant_a)).await;
    make_user(&db, "b1", Some(tenant_b)).await;
    make_user(&db, "global", None).await;

    let page = repo
        .list(Some(tenant_a), Pagination::default())
        .await
        .unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.items.len(), 2);

    let all = repo.list(None, Pagination::default()).await.unwrap();
    assert_eq!(all.total, 4);
}

#[tokio::test]
async fn missing_user_is_not_found() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db.clone());

    let err = repo.get_by_id(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, FleetError::NotFound { .. }));
}

// ---------------------------------------------------------------------------
// Role repository
// ---------------------------------------------------------------------------

#[tokio::test]
async fn role_crud_round_trip() {
    let db = setup().await;
    let repo = SurrealRoleRepository::new(db.clone());
    let tenant = Uuid::new_v4();

    let role = make_role(&db, "DISPATCHER", Some(tenant)).await;
    assert_eq!(role.scope, RoleScope::Tenant);
    assert!(role.active);

    let fetched = repo.get_by_id(role.id).await.unwrap();
    assert_eq!(fetched.name, "DISPATCHER");

    let found = repo.find_by_name("DISPATCHER").await.unwrap();
    assert_eq!(found.unwrap().id, role.id);
    assert!(repo.find_by_name("NOBODY").await.unwrap().is_none());

    let updated = repo
        .update(
            role.id,
            UpdateRole {
                description: Some("dispatch desk".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.description, "dispatch desk");

    repo.delete(role.id).await.unwrap();
    let deleted = repo.get_by_id(role.id).await.unwrap();
    assert!(!deleted.active);
}

#[tokio::test]
async fn role_creation_enforces_scope_pairing() {
    let db = setup().await;
    let repo = SurrealRoleRepository::new(db.clone());

    let err = repo
        .create(CreateRole {
            tenant_id: None,
            name: "BROKEN".into(),
            description: String::new(),
            scope: RoleScope::Tenant,
            created_by: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, FleetError::Validation { .. }));

    let err = repo
        .create(CreateRole {
            tenant_id: Some(Uuid::new_v4()),
            name: "BROKEN".into(),
            description: String::new(),
            scope: RoleScope::Global,
            created_by: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, FleetError::Validation { .. }));
}

#[tokio::test]
async fn role_assignment_edges() {
    let db = setup().await;
    let repo = SurrealRoleRepository::new(db.clone());
    let tenant = Uuid::new_v4();
    let user = make_user(&db, "alice", Some(tenant)).await;
    let dispatcher = make_role(&db, "DISPATCHER", Some(tenant)).await;
    let viewer = make_role(&db, "VIEWER", Some(tenant)).await;

    repo.assign_to_user(user.id, dispatcher.id).await.unwrap();
    repo.assign_to_user(user.id, viewer.id).await.unwrap();

    let mut names: Vec<String> = repo
        .get_user_roles(user.id)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect();
    names.sort();
    assert_eq!(names, vec!["DISPATCHER", "VIEWER"]);

    repo.unassign_from_user(user.id, viewer.id).await.unwrap();
    let names: Vec<String> = repo
        .get_user_roles(user.id)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(names, vec!["DISPATCHER"]);
}

#[tokio::test]
async fn role_with_permissions_aggregate() {
    let db = setup().await;
    let roles = SurrealRoleRepository::new(db.clone());
    let permissions = SurrealPermissionRepository::new(db.clone());
    let tenant = Uuid::new_v4();

    let role = make_role(&db, "DISPATCHER", Some(tenant)).await;
    let live = make_permission(&db, PermissionCode::ViewLocationLive).await;
    let alerts = make_permission(&db, PermissionCode::AlertRead).await;
    permissions.grant_to_role(role.id, live.id).await.unwrap();
    permissions.grant_to_role(role.id, alerts.id).await.unwrap();

    let grant = roles.get_with_permissions(role.id).await.unwrap();
    assert_eq!(grant.role.id, role.id);
    assert_eq!(grant.permissions.len(), 2);

    let err = roles.get_with_permissions(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, FleetError::NotFound { .. }));
}

// ---------------------------------------------------------------------------
// Permission repository
// ---------------------------------------------------------------------------

#[tokio::test]
async fn permission_crud_round_trip() {
    let db = setup().await;
    let repo = SurrealPermissionRepository::new(db.clone());

    let created = make_permission(&db, PermissionCode::DeviceRegister).await;
    assert_eq!(created.code, PermissionCode::DeviceRegister);
    assert!(created.active);
    assert!(created.requires_scope);

    let fetched = repo.get_by_id(created.id).await.unwrap();
    assert_eq!(fetched.code, PermissionCode::DeviceRegister);

    let by_code = repo
        .find_by_code(PermissionCode::DeviceRegister)
        .await
        .unwrap();
    assert_eq!(by_code.unwrap().id, created.id);
    assert!(
        repo.find_by_code(PermissionCode::BackupRestore)
            .await
            .unwrap()
            .is_none()
    );

    repo.delete(created.id).await.unwrap();
    let deleted = repo.get_by_id(created.id).await.unwrap();
    assert!(!deleted.active);
}

#[tokio::test]
async fn grant_and_revoke_edges() {
    let db = setup().await;
    let repo = SurrealPermissionRepository::new(db.clone());
    let role = make_role(&db, "INSTALLER", Some(Uuid::new_v4())).await;
    let register = make_permission(&db, PermissionCode::DeviceRegister).await;
    let activate = make_permission(&db, PermissionCode::DeviceActivate).await;

    repo.grant_to_role(role.id, register.id).await.unwrap();
    repo.grant_to_role(role.id, activate.id).await.unwrap();

    let granted = repo.get_role_permissions(role.id).await.unwrap();
    assert_eq!(granted.len(), 2);

    repo.revoke_from_role(role.id, register.id).await.unwrap();
    let granted = repo.get_role_permissions(role.id).await.unwrap();
    assert_eq!(granted.len(), 1);
    assert_eq!(granted[0].code, PermissionCode::DeviceActivate);
}

// ---------------------------------------------------------------------------
// Directory store
// ---------------------------------------------------------------------------

#[tokio::test]
async fn user_grants_graph_is_assembled_in_one_fetch() {
    let db = setup().await;
    let roles = SurrealRoleRepository::new(db.clone());
    let permissions = SurrealPermissionRepository::new(db.clone());
    let directory = SurrealDirectoryStore::new(db.clone());
    let tenant = Uuid::new_v4();

    let user = make_user(&db, "alice", Some(tenant)).await;
    let dispatcher = make_role(&db, "DISPATCHER", Some(tenant)).await;
    let viewer = make_role(&db, "VIEWER", Some(tenant)).await;
    let live = make_permission(&db, PermissionCode::ViewLocationLive).await;
    let alerts = make_permission(&db, PermissionCode::AlertRead).await;

    permissions
        .grant_to_role(dispatcher.id, live.id)
        .await
        .unwrap();
    permissions
        .grant_to_role(dispatcher.id, alerts.id)
        .await
        .unwrap();
    // The same permission granted through a second role.
    permissions.grant_to_role(viewer.id, alerts.id).await.unwrap();
    roles.assign_to_user(user.id, dispatcher.id).await.unwrap();
    roles.assign_to_user(user.id, viewer.id).await.unwrap();

    let grants = directory
        .find_user_with_grants(user.id)
        .await
        .unwrap()
        .expect("user must resolve");

    assert_eq!(grants.user.id, user.id);
    assert_eq!(grants.roles.len(), 2);

    let dispatcher_grant = grants
        .roles
        .iter()
        .find(|g| g.role.name == "DISPATCHER")
        .unwrap();
    assert_eq!(dispatcher_grant.permissions.len(), 2);

    let viewer_grant = grants
        .roles
        .iter()
        .find(|g| g.role.name == "VIEWER")
        .unwrap();
    assert_eq!(viewer_grant.permissions.len(), 1);
    assert_eq!(viewer_grant.permissions[0].code, PermissionCode::AlertRead);
}

#[tokio::test]
async fn missing_user_resolves_to_none() {
    let db = setup().await;
    let directory = SurrealDirectoryStore::new(db.clone());

    let grants = directory
        .find_user_with_grants(Uuid::new_v4())
        .await
        .unwrap();
    assert!(grants.is_none());
}

#[tokio::test]
async fn user_without_roles_resolves_to_an_empty_graph() {
    let db = setup().await;
    let directory = SurrealDirectoryStore::new(db.clone());
    let user = make_user(&db, "loner", None).await;

    let grants = directory
        .find_user_with_grants(user.id)
        .await
        .unwrap()
        .unwrap();
    assert!(grants.roles.is_empty());
}

#[tokio::test]
async fn permission_lookup_by_code() {
    let db = setup().await;
    let directory = SurrealDirectoryStore::new(db.clone());

    let created = make_permission(&db, PermissionCode::GeofenceManage).await;
    let found = directory
        .find_permission_by_code(PermissionCode::GeofenceManage)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, created.id);
    assert!(found.requires_scope);

    assert!(
        directory
            .find_permission_by_code(PermissionCode::BackupRestore)
            .await
            .unwrap()
            .is_none()
    );
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

#[tokio::test]
async fn seeding_creates_the_full_catalog_once() {
    let db = setup().await;
    let tenant = Uuid::new_v4();
    let roles = SurrealRoleRepository::new(db.clone());
    let permissions = SurrealPermissionRepository::new(db.clone());

    fleetgate_db::seed_builtin_catalog(&db, tenant).await.unwrap();

    let page = permissions
        .list(Pagination {
            offset: 0,
            limit: 200,
        })
        .await
        .unwrap();
    assert_eq!(page.total as usize, PermissionCode::ALL.len());

    let super_admin = roles
        .find_by_name("SUPER_ADMIN")
        .await
        .unwrap()
        .expect("SUPER_ADMIN must be seeded");
    assert_eq!(super_admin.scope, RoleScope::Global);
    assert_eq!(super_admin.tenant_id, None);

    let grant = roles.get_with_permissions(super_admin.id).await.unwrap();
    assert_eq!(grant.permissions.len(), PermissionCode::ALL.len());

    let viewer = roles.find_by_name("VIEWER").await.unwrap().unwrap();
    assert_eq!(viewer.tenant_id, Some(tenant));
    let viewer_grant = roles.get_with_permissions(viewer.id).await.unwrap();
    assert_eq!(viewer_grant.permissions.len(), 5);

    // Re-running must not duplicate anything.
    fleetgate_db::seed_builtin_catalog(&db, tenant).await.unwrap();
    let page = permissions
        .list(Pagination {
            offset: 0,
            limit: 200,
        })
        .await
        .unwrap();
    assert_eq!(page.total as usize, PermissionCode::ALL.len());
    let grant = roles.get_with_permissions(super_admin.id).await.unwrap();
    assert_eq!(grant.permissions.len(), PermissionCode::ALL.len());
}
