//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. The directory store is the
//! engine's read-only view; the administrative repositories own the
//! mutations. Deletes are soft: records are deactivated, never
//! removed, so authorization history stays reconstructible.

use uuid::Uuid;

use crate::error::FleetResult;
use crate::models::{
    permission::{CreatePermission, Permission, PermissionCode, UpdatePermission},
    role::{CreateRole, Role, UpdateRole},
    user::{CreateUser, UpdateUser, User},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

/// A role together with the permissions granted to it.
#[derive(Debug, Clone)]
pub struct RoleGrant {
    pub role: Role,
    pub permissions: Vec<Permission>,
}

/// The fully loaded authorization graph for one user: the user record
/// plus every assigned role with its granted permissions, fetched in a
/// single round trip. Active-flag filtering is the resolver's job; the
/// aggregate carries the raw graph.
#[derive(Debug, Clone)]
pub struct UserGrants {
    pub user: User,
    pub roles: Vec<RoleGrant>,
}

// ---------------------------------------------------------------------------
// Directory store — the decision engine's read path
// ---------------------------------------------------------------------------

/// Read-only directory queries consumed by the authorization engine.
pub trait DirectoryStore: Send + Sync {
    /// Load a user with all roles and permissions in one logical fetch.
    /// Returns `None` when no such user exists.
    fn find_user_with_grants(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = FleetResult<Option<UserGrants>>> + Send;

    /// Look up a permission record by code. Best-effort: a missing
    /// record is `None`, not an error.
    fn find_permission_by_code(
        &self,
        code: PermissionCode,
    ) -> impl Future<Output = FleetResult<Option<Permission>>> + Send;
}

// ---------------------------------------------------------------------------
// Administrative repositories
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = FleetResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = FleetResult<User>> + Send;
    fn get_by_username(&self, username: &str) -> impl Future<Output = FleetResult<User>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = FleetResult<User>> + Send;
    /// Soft-delete: sets `active` to false.
    fn delete(&self, id: Uuid) -> impl Future<Output = FleetResult<()>> + Send;
    fn list(
        &self,
        tenant_id: Option<Uuid>,
        pagination: Pagination,
    ) -> impl Future<Output = FleetResult<PaginatedResult<User>>> + Send;
}

pub trait RoleRepository: Send + Sync {
    fn create(&self, input: CreateRole) -> impl Future<Output = FleetResult<Role>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = FleetResult<Role>> + Send;
    fn find_by_name(&self, name: &str) -> impl Future<Output = FleetResult<Option<Role>>> + Send;
    /// Load a role together with its granted permissions.
    fn get_with_permissions(
        &self,
        id: Uuid,
    ) -> impl Future<Output = FleetResult<RoleGrant>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateRole,
    ) -> impl Future<Output = FleetResult<Role>> + Send;
    /// Soft-delete: sets `active` to false. Assignment edges stay in
    /// place; inactive roles contribute nothing at resolution time.
    fn delete(&self, id: Uuid) -> impl Future<Output = FleetResult<()>> + Send;
    fn list(
        &self,
        tenant_id: Option<Uuid>,
        pagination: Pagination,
    ) -> impl Future<Output = FleetResult<PaginatedResult<Role>>> + Send;

    /// Assign a role to a user (creates an `has_role` edge).
    fn assign_to_user(
        &self,
        user_id: Uuid,
        role_id: Uuid,
    ) -> impl Future<Output = FleetResult<()>> + Send;

    /// Remove a role assignment from a user.
    fn unassign_from_user(
        &self,
        user_id: Uuid,
        role_id: Uuid,
    ) -> impl Future<Output = FleetResult<()>> + Send;

    /// Get all roles assigned to a user.
    fn get_user_roles(&self, user_id: Uuid) -> impl Future<Output = FleetResult<Vec<Role>>> + Send;
}

pub trait PermissionRepository: Send + Sync {
    fn create(
        &self,
        input: CreatePermission,
    ) -> impl Future<Output = FleetResult<Permission>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = FleetResult<Permission>> + Send;
    fn find_by_code(
        &self,
        code: PermissionCode,
    ) -> impl Future<Output = FleetResult<Option<Permission>>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdatePermission,
    ) -> impl Future<Output = FleetResult<Permission>> + Send;
    /// Soft-delete: sets `active` to false.
    fn delete(&self, id: Uuid) -> impl Future<Output = FleetResult<()>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = FleetResult<PaginatedResult<Permission>>> + Send;

    /// Grant a permission to a role (creates a `grants` edge).
    fn grant_to_role(
        &self,
        role_id: Uuid,
        permission_id: Uuid,
    ) -> impl Future<Output = FleetResult<()>> + Send;

    /// Revoke a permission from a role.
    fn revoke_from_role(
        &self,
        role_id: Uuid,
        permission_id: Uuid,
    ) -> impl Future<Output = FleetResult<()>> + Send;

    /// Get all permissions granted to a role.
    fn get_role_permissions(
        &self,
        role_id: Uuid,
    ) -> impl Future<Output = FleetResult<Vec<Permission>>> + Send;
}
