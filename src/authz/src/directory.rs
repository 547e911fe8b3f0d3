//! Tenant directory seam

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::types::TenantId;

/// Directory record for one tenant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: TenantId,
    pub name: String,
    pub is_active: bool,
}

impl Tenant {
    /// Create an active tenant
    pub fn new(id: impl Into<TenantId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_active: true,
        }
    }

    /// Mark the tenant as deactivated
    pub fn deactivated(mut self) -> Self {
        self.is_active = false;
        self
    }
}

/// Tenant directory seam
#[async_trait]
pub trait TenantDirectory: Send + Sync {
    /// Look up a tenant by id. `Ok(None)` when the id names no tenant.
    async fn find_tenant(&self, id: &str) -> Result<Option<Tenant>>;
}

/// In-memory tenant directory for tests and embedded deployments
#[derive(Default)]
pub struct InMemoryTenantDirectory {
    tenants: Arc<RwLock<HashMap<TenantId, Tenant>>>,
}

impl InMemoryTenantDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a tenant record
    pub async fn put(&self, tenant: Tenant) {
        let mut tenants = self.tenants.write().await;
        tenants.insert(tenant.id.clone(), tenant);
    }
}

#[async_trait]
impl TenantDirectory for InMemoryTenantDirectory {
    async fn find_tenant(&self, id: &str) -> Result<Option<Tenant>> {
        let tenants = self.tenants.read().await;
        Ok(tenants.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lookup_and_deactivation() {
        let directory = InMemoryTenantDirectory::new();
        directory.put(Tenant::new("acme", "Acme Corp")).await;
        directory
            .put(Tenant::new("globex", "Globex").deactivated())
            .await;

        assert!(directory.find_tenant("acme").await.unwrap().unwrap().is_active);
        assert!(!directory
            .find_tenant("globex")
            .await
            .unwrap()
            .unwrap()
            .is_active);
        assert!(directory.find_tenant("initech").await.unwrap().is_none());
    }
}
