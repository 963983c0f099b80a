//! Idempotent seeding of the built-in permission catalog and role
//! hierarchy.
//!
//! Permissions already present (by code) and roles already present
//! (by name) are left untouched, so re-running at every startup is
//! safe.

use std::collections::HashMap;

use fleetgate_core::catalog;
use fleetgate_core::error::FleetResult;
use fleetgate_core::models::permission::{CreatePermission, PermissionCode};
use fleetgate_core::models::role::{CreateRole, RoleScope};
use fleetgate_core::repository::{PermissionRepository, RoleRepository};
use surrealdb::{Connection, Surreal};
use tracing::{debug, info};
use uuid::Uuid;

use crate::repository::{SurrealPermissionRepository, SurrealRoleRepository};

/// Seed the built-in catalog into the directory.
///
/// Tenant-scoped built-in roles are created under `default_tenant_id`;
/// the SUPER_ADMIN role is global and carries every permission.
pub async fn seed_builtin_catalog<C: Connection>(
    db: &Surreal<C>,
    default_tenant_id: Uuid,
) -> FleetResult<()> {
    let permissions = SurrealPermissionRepository::new(db.clone());
    let roles = SurrealRoleRepository::new(db.clone());

    let mut ids_by_code: HashMap<PermissionCode, Uuid> = HashMap::new();
    let mut created = 0usize;

    for def in catalog::BUILTIN_PERMISSIONS {
        let permission = match permissions.find_by_code(def.code).await? {
            Some(existing) => {
                debug!(code = %def.code, "permission already seeded, skipping");
                existing
            }
            None => {
                created += 1;
                permissions
                    .create(CreatePermission {
                        code: def.code,
                        name: def.name.into(),
                        description: def.description.into(),
                        category: def.category,
                        requires_scope: def.requires_scope,
                        created_by: None,
                    })
                    .await?
            }
        };
        ids_by_code.insert(def.code, permission.id);
    }

    for builtin in catalog::BUILTIN_ROLES {
        if roles.find_by_name(builtin.name).await?.is_some() {
            debug!(role = builtin.name, "role already seeded, skipping");
            continue;
        }

        let role = roles
            .create(CreateRole {
                tenant_id: match builtin.scope {
                    RoleScope::Global => None,
                    _ => Some(default_tenant_id),
                },
                name: builtin.name.into(),
                description: builtin.description.into(),
                scope: builtin.scope,
                created_by: None,
            })
            .await?;

        for code in builtin.permissions {
            permissions
                .grant_to_role(role.id, ids_by_code[code])
                .await?;
        }
    }

    info!(
        permissions_created = created,
        "built-in catalog seeded"
    );
    Ok(())
}
