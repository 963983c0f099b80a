//! SurrealDB implementation of [`PermissionRepository`].

use chrono::{DateTime, Utc};
use fleetgate_core::error::FleetResult;
use fleetgate_core::models::permission::{
    CreatePermission, Permission, PermissionCategory, PermissionCode, UpdatePermission,
};
use fleetgate_core::repository::{PaginatedResult, Pagination, PermissionRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct PermissionRow {
    code: String,
    name: String,
    description: String,
    category: String,
    active: bool,
    requires_scope: bool,
    created_by: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
pub(crate) struct PermissionRowWithId {
    pub(crate) record_id: String,
    pub(crate) code: String,
    name: String,
    description: String,
    category: String,
    active: bool,
    requires_scope: bool,
    created_by: Option<String>,
    created_at: DateTime<Utc>,
}

fn parse_uuid(field: &str, s: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(s).map_err(|e| DbError::Corrupted(format!("invalid {field} UUID: {e}")))
}

fn parse_code(s: &str) -> Result<PermissionCode, DbError> {
    PermissionCode::parse(s)
        .ok_or_else(|| DbError::Corrupted(format!("unknown permission code '{s}'")))
}

fn parse_category(s: &str) -> Result<PermissionCategory, DbError> {
    PermissionCategory::parse(s)
        .ok_or_else(|| DbError::Corrupted(format!("unknown permission category '{s}'")))
}

impl PermissionRow {
    fn into_permission(self, id: Uuid) -> Result<Permission, DbError> {
        Ok(Permission {
            id,
            code: parse_code(&self.code)?,
            name: self.name,
            description: self.description,
            category: parse_category(&self.category)?,
            active: self.active,
            requires_scope: self.requires_scope,
            created_at: self.created_at,
            created_by: self
                .created_by
                .map(|v| parse_uuid("created_by", &v))
                .transpose()?,
        })
    }
}

impl PermissionRowWithId {
    pub(crate) fn try_into_permission(self) -> Result<Permission, DbError> {
        let id = parse_uuid("record", &self.record_id)?;
        Ok(Permission {
            id,
            code: parse_code(&self.code)?,
            name: self.name,
            description: self.description,
            category: parse_category(&self.category)?,
            active: self.active,
            requires_scope: self.requires_scope,
            created_at: self.created_at,
            created_by: self
                .created_by
                .map(|v| parse_uuid("created_by", &v))
                .transpose()?,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Permission repository.
#[derive(Clone)]
pub struct SurrealPermissionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPermissionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> PermissionRepository for SurrealPermissionRepository<C> {
    async fn create(&self, input: CreatePermission) -> FleetResult<Permission> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('permission', $id) SET \
                 code = $code, name = $name, \
                 description = $description, category = $category, \
                 active = true, requires_scope = $requires_scope, \
                 created_by = $created_by",
            )
            .bind(("id", id_str.clone()))
            .bind(("code", input.code.as_str()))
            .bind(("name", input.name))
            .bind(("description", input.description))
            .bind(("category", input.category.as_str()))
            .bind(("requires_scope", input.requires_scope))
            .bind(("created_by", input.created_by.map(|u| u.to_string())))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<PermissionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "permission".into(),
            id: id_str,
        })?;

        Ok(row.into_permission(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> FleetResult<Permission> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('permission', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PermissionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "permission".into(),
            id: id_str,
        })?;

        Ok(row.into_permission(id)?)
    }

    async fn find_by_code(&self, code: PermissionCode) -> FleetResult<Option<Permission>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM permission \
                 WHERE code = $code",
            )
            .bind(("code", code.as_str()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PermissionRowWithId> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_permission()?)),
            None => Ok(None),
        }
    }

    async fn update(&self, id: Uuid, input: UpdatePermission) -> FleetResult<Permission> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        // The permission table carries no updated_at, so an all-None
        // input has nothing to set.
        if input.name.is_none()
            && input.description.is_none()
            && input.active.is_none()
            && input.requires_scope.is_none()
        {
            return self.get_by_id(id).await;
        }
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.active.is_some() {
            sets.push("active = $active");
        }
        if input.requires_scope.is_some() {
            sets.push("requires_scope = $requires_scope");
        }

        let query = format!(
            "UPDATE type::record('permission', $id) SET {}",
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
        if let Some(requires_scope) = input.requires_scope {
            builder = builder.bind(("requires_scope", requires_scope));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<PermissionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "permission".into(),
            id: id_str,
        })?;

        Ok(row.into_permission(id)?)
    }

    async fn delete(&self, id: Uuid) -> FleetResult<()> {
        // Soft-delete; grant edges stay in place and inactive
        // permissions contribute nothing at resolution time.
        self.db
            .query(
                "UPDATE type::record('permission', $id) SET \
                 active = false",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list(&self, pagination: Pagination) -> FleetResult<PaginatedResult<Permission>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM permission GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM permission \
                 ORDER BY code ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PermissionRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_permission())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn grant_to_role(&self, role_id: Uuid, permission_id: Uuid) -> FleetResult<()> {
        let role_id_str = role_id.to_string();
        let perm_id_str = permission_id.to_string();

        let query = format!("RELATE role:`{role_id_str}` -> grants -> permission:`{perm_id_str}`;");

        self.db.query(query).await.map_err(DbError::from)?;

        Ok(())
    }

    async fn revoke_from_role(&self, role_id: Uuid, permission_id: Uuid) -> FleetResult<()> {
        self.db
            .query(
                "DELETE grants WHERE \
                 in = type::record('role', $role_id) AND \
                 out = type::record('permission', $perm_id)",
            )
            .bind(("role_id", role_id.to_string()))
            .bind(("perm_id", permission_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn get_role_permissions(&self, role_id: Uuid) -> FleetResult<Vec<Permission>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM permission \
                 WHERE id IN (\
                     SELECT VALUE out FROM grants \
                     WHERE in = type::record('role', $role_id)\
                 )",
            )
            .bind(("role_id", role_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PermissionRowWithId> = result.take(0).map_err(DbError::from)?;

        let permissions = rows
            .into_iter()
            .map(|row| row.try_into_permission())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(permissions)
    }
}
