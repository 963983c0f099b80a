//! SurrealDB implementation of [`DirectoryStore`] — the authorization
//! engine's read path.
//!
//! `find_user_with_grants` is the single logical fetch the engine
//! depends on: user record, assigned roles, grant edges, and granted
//! permissions travel in one multi-statement query (one round trip)
//! and are assembled into a [`UserGrants`] aggregate in memory. No
//! per-role or per-permission follow-up queries are ever issued.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use fleetgate_core::error::FleetResult;
use fleetgate_core::models::permission::{Permission, PermissionCode};
use fleetgate_core::models::user::User;
use fleetgate_core::repository::{DirectoryStore, RoleGrant, UserGrants};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::warn;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::permission::PermissionRowWithId;
use crate::repository::role::RoleRowWithId;

#[derive(Debug, SurrealValue)]
struct UserRow {
    tenant_id: Option<String>,
    username: String,
    email: Option<String>,
    first_name: String,
    last_name: String,
    active: bool,
    created_by: Option<String>,
    modified_by: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// One `grants` edge, role record id to permission record id.
#[derive(Debug, SurrealValue)]
struct GrantEdgeRow {
    role_id: String,
    permission_id: String,
}

fn parse_uuid(field: &str, s: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(s).map_err(|e| DbError::Corrupted(format!("invalid {field} UUID: {e}")))
}

fn parse_opt_uuid(field: &str, s: Option<String>) -> Result<Option<Uuid>, DbError> {
    s.map(|v| parse_uuid(field, &v)).transpose()
}

impl UserRow {
    fn into_user(self, id: Uuid) -> Result<User, DbError> {
        Ok(User {
            id,
            tenant_id: parse_opt_uuid("tenant", self.tenant_id)?,
            username: self.username,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
            created_by: parse_opt_uuid("created_by", self.created_by)?,
            modified_by: parse_opt_uuid("modified_by", self.modified_by)?,
        })
    }
}

const USER_GRANTS_QUERY: &str = "\
SELECT * FROM type::record('user', $user_id); \
SELECT meta::id(id) AS record_id, * FROM role \
WHERE id IN (\
    SELECT VALUE out FROM has_role \
    WHERE in = type::record('user', $user_id)\
); \
SELECT meta::id(in) AS role_id, meta::id(out) AS permission_id \
FROM grants \
WHERE in IN (\
    SELECT VALUE out FROM has_role \
    WHERE in = type::record('user', $user_id)\
); \
SELECT meta::id(id) AS record_id, * FROM permission \
WHERE id IN (\
    SELECT VALUE out FROM grants \
    WHERE in IN (\
        SELECT VALUE out FROM has_role \
        WHERE in = type::record('user', $user_id)\
    )\
);";

/// SurrealDB implementation of the directory store.
#[derive(Clone)]
pub struct SurrealDirectoryStore<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealDirectoryStore<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> DirectoryStore for SurrealDirectoryStore<C> {
    async fn find_user_with_grants(&self, user_id: Uuid) -> FleetResult<Option<UserGrants>> {
        let mut result = self
            .db
            .query(USER_GRANTS_QUERY)
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let user_rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let Some(user_row) = user_rows.into_iter().next() else {
            return Ok(None);
        };
        let user = user_row.into_user(user_id)?;

        let role_rows: Vec<RoleRowWithId> = result.take(1).map_err(DbError::from)?;
        let edge_rows: Vec<GrantEdgeRow> = result.take(2).map_err(DbError::from)?;
        let permission_rows: Vec<PermissionRowWithId> = result.take(3).map_err(DbError::from)?;

        // Index permissions by record id, dropping rows whose code the
        // platform does not know (fail closed: an unknown code can
        // never grant anything).
        let mut permissions_by_id: HashMap<String, Permission> = HashMap::new();
        for row in permission_rows {
            if PermissionCode::parse(&row.code).is_none() {
                warn!(code = %row.code, "dropping permission with unknown code");
                continue;
            }
            let record_id = row.record_id.clone();
            permissions_by_id.insert(record_id, row.try_into_permission()?);
        }

        let mut edges_by_role: HashMap<String, Vec<String>> = HashMap::new();
        for edge in edge_rows {
            edges_by_role
                .entry(edge.role_id)
                .or_default()
                .push(edge.permission_id);
        }

        let mut roles = Vec::with_capacity(role_rows.len());
        for row in role_rows {
            let record_id = row.record_id.clone();
            let role = row.try_into_role()?;
            let permissions = edges_by_role
                .remove(&record_id)
                .unwrap_or_default()
                .into_iter()
                .filter_map(|pid| permissions_by_id.get(&pid).cloned())
                .collect();
            roles.push(RoleGrant { role, permissions });
        }

        Ok(Some(UserGrants { user, roles }))
    }

    async fn find_permission_by_code(
        &self,
        code: PermissionCode,
    ) -> FleetResult<Option<Permission>> {
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
}
