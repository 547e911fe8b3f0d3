//! Roles, permissions, and the role store seam

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::types::{RoleName, TenantId};

/// Wildcard action: a `{resource}:manage` permission grants every action on
/// that resource.
pub const MANAGE_ACTION: &str = "manage";

/// One resource:action grant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub resource: String,
    pub action: String,
}

impl Permission {
    pub fn new(resource: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            action: action.into(),
        }
    }
}

/// Tenant-scoped role with its permission grants.
///
/// Roles are administered externally and read-only to this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub tenant_id: TenantId,
    pub name: RoleName,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

impl Role {
    pub fn new(tenant_id: impl Into<TenantId>, name: impl Into<RoleName>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            name: name.into(),
            permissions: Vec::new(),
        }
    }

    /// Add a permission grant
    pub fn with_permission(
        mut self,
        resource: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        self.permissions.push(Permission::new(resource, action));
        self
    }
}

/// Role store seam.
///
/// The store is the system of record for roles and their permissions; this
/// crate only ever reads from it.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Fetch a role with its permissions. `Ok(None)` when the tenant has no
    /// role by that name.
    async fn find_role(&self, tenant_id: &str, name: &str) -> Result<Option<Role>>;
}

/// In-memory role store for tests and embedded deployments
#[derive(Default)]
pub struct InMemoryRoleStore {
    roles: Arc<RwLock<HashMap<(TenantId, RoleName), Role>>>,
}

impl InMemoryRoleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a role
    pub async fn put(&self, role: Role) {
        let mut roles = self.roles.write().await;
        roles.insert((role.tenant_id.clone(), role.name.clone()), role);
    }
}

#[async_trait]
impl RoleStore for InMemoryRoleStore {
    async fn find_role(&self, tenant_id: &str, name: &str) -> Result<Option<Role>> {
        let roles = self.roles.read().await;
        Ok(roles
            .get(&(tenant_id.to_string(), name.to_string()))
            .cloned())
    }
}
