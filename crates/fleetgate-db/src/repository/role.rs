//! SurrealDB implementation of [`RoleRepository`].

use chrono::{DateTime, Utc};
use fleetgate_core::error::FleetResult;
use fleetgate_core::models::role::{CreateRole, Role, RoleScope, UpdateRole};
use fleetgate_core::repository::{
    PaginatedResult, Pagination, RoleGrant, RoleRepository,
};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::permission::PermissionRowWithId;

#[derive(Debug, SurrealValue)]
struct RoleRow {
    tenant_id: Option<String>,
    name: String,
    description: String,
    scope: String,
    active: bool,
    created_by: Option<String>,
    modified_by: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
pub(crate) struct RoleRowWithId {
    pub(crate) record_id: String,
    tenant_id: Option<String>,
    name: String,
    description: String,
    scope: String,
    active: bool,
    created_by: Option<String>,
    modified_by: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_uuid(field: &str, s: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(s).map_err(|e| DbError::Corrupted(format!("invalid {field} UUID: {e}")))
}

fn parse_opt_uuid(field: &str, s: Option<String>) -> Result<Option<Uuid>, DbError> {
    s.map(|v| parse_uuid(field, &v)).transpose()
}

fn parse_scope(s: &str) -> Result<RoleScope, DbError> {
    RoleScope::parse(s).ok_or_else(|| DbError::Corrupted(format!("unknown role scope '{s}'")))
}

impl RoleRow {
    fn into_role(self, id: Uuid) -> Result<Role, DbError> {
        Ok(Role {
            id,
            tenant_id: parse_opt_uuid("tenant", self.tenant_id)?,
            name: self.name,
            description: self.description,
            scope: parse_scope(&self.scope)?,
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
            created_by: parse_opt_uuid("created_by", self.created_by)?,
            modified_by: parse_opt_uuid("modified_by", self.modified_by)?,
        })
    }
}

impl RoleRowWithId {
    pub(crate) fn try_into_role(self) -> Result<Role, DbError> {
        let id = parse_uuid("record", &self.record_id)?;
        Ok(Role {
            id,
            tenant_id: parse_opt_uuid("tenant", self.tenant_id)?,
            name: self.name,
            description: self.description,
            scope: parse_scope(&self.scope)?,
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
            created_by: parse_opt_uuid("created_by", self.created_by)?,
            modified_by: parse_opt_uuid("modified_by", self.modified_by)?,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Role repository.
#[derive(Clone)]
pub struct SurrealRoleRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealRoleRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> RoleRepository for SurrealRoleRepository<C> {
    async fn create(&self, input: CreateRole) -> FleetResult<Role> {
        input.validate()?;

        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('role', $id) SET \
                 tenant_id = $tenant_id, name = $name, \
                 description = $description, scope = $scope, \
                 active = true, created_by = $created_by",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", input.tenant_id.map(|t| t.to_string())))
            .bind(("name", input.name))
            .bind(("description", input.description))
            .bind(("scope", input.scope.as_str()))
            .bind(("created_by", input.created_by.map(|u| u.to_string())))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "role".into(),
            id: id_str,
        })?;

        Ok(row.into_role(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> FleetResult<Role> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('role', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "role".into(),
            id: id_str,
        })?;

        Ok(row.into_role(id)?)
    }

    async fn find_by_name(&self, name: &str) -> FleetResult<Option<Role>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM role \
                 WHERE name = $name",
            )
            .bind(("name", name.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRowWithId> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_role()?)),
            None => Ok(None),
        }
    }

    async fn get_with_permissions(&self, id: Uuid) -> FleetResult<RoleGrant> {
        let id_str = id.to_string();

        // Role record plus its granted permissions, one round trip.
        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('role', $id); \
                 SELECT meta::id(id) AS record_id, * FROM permission \
                 WHERE id IN (\
                     SELECT VALUE out FROM grants \
                     WHERE in = type::record('role', $id)\
                 );",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let role_rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        let role_row = role_rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::NotFound {
                entity: "role".into(),
                id: id_str,
            })?;
        let role = role_row.into_role(id)?;

        let permission_rows: Vec<PermissionRowWithId> = result.take(1).map_err(DbError::from)?;
        let permissions = permission_rows
            .into_iter()
            .map(|row| row.try_into_permission())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(RoleGrant { role, permissions })
    }

    async fn update(&self, id: Uuid, input: UpdateRole) -> FleetResult<Role> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.active.is_some() {
            sets.push("active = $active");
        }
        if input.modified_by.is_some() {
            sets.push("modified_by = $modified_by");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('role', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }
        if let Some(active) = input.active {
            builder = builder.bind(("active", active));
        }
        if let Some(modified_by) = input.modified_by {
            builder = builder.bind(("modified_by", modified_by.to_string()));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "role".into(),
            id: id_str,
        })?;

        Ok(row.into_role(id)?)
    }

    async fn delete(&self, id: Uuid) -> FleetResult<()> {
        // Soft-delete; assignment and grant edges stay in place so the
        // role can be reactivated with its grants intact.
        self.db
            .query(
                "UPDATE type::record('role', $id) SET \
                 active = false, updated_at = time::now()",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list(
        &self,
        tenant_id: Option<Uuid>,
        pagination: Pagination,
    ) -> FleetResult<PaginatedResult<Role>> {
        let tenant_id_str = tenant_id.map(|t| t.to_string());

        let (count_query, page_query) = if tenant_id_str.is_some() {
            (
                "SELECT count() AS total FROM role \
                 WHERE tenant_id = $tenant_id GROUP ALL",
                "SELECT meta::id(id) AS record_id, * FROM role \
                 WHERE tenant_id = $tenant_id \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
        } else {
            (
                "SELECT count() AS total FROM role GROUP ALL",
                "SELECT meta::id(id) AS record_id, * FROM role \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
        };

        let mut count_result = self
            .db
            .query(count_query)
            .bind(("tenant_id", tenant_id_str.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(page_query)
            .bind(("tenant_id", tenant_id_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_role())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn assign_to_user(&self, user_id: Uuid, role_id: Uuid) -> FleetResult<()> {
        let user_id_str = user_id.to_string();
        let role_id_str = role_id.to_string();

        let query = format!("RELATE user:`{user_id_str}` -> has_role -> role:`{role_id_str}`;");

        self.db.query(query).await.map_err(DbError::from)?;

        Ok(())
    }

    async fn unassign_from_user(&self, user_id: Uuid, role_id: Uuid) -> FleetResult<()> {
        self.db
            .query(
                "DELETE has_role WHERE \
                 in = type::record('user', $user_id) AND \
                 out = type::record('role', $role_id)",
            )
            .bind(("user_id", user_id.to_string()))
            .bind(("role_id", role_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn get_user_roles(&self, user_id: Uuid) -> FleetResult<Vec<Role>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM role \
                 WHERE id IN (\
                     SELECT VALUE out FROM has_role \
                     WHERE in = type::record('user', $user_id)\
                 )",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRowWithId> = result.take(0).map_err(DbError::from)?;

        let roles = rows
            .into_iter()
            .map(|row| row.try_into_role())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(roles)
    }
}
