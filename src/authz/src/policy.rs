//! Policy definition and storage

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::condition::ConditionNode;
use crate::error::Result;
use crate::types::{PolicyId, TenantId};

/// Policy effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PolicyEffect {
    /// Allow the action
    Allow,
    /// Deny the action
    Deny,
}

/// One attribute-based policy rule.
///
/// Policies are tenant-scoped, administered externally, and read-only to this
/// crate. `conditions == None` matches unconditionally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    /// Unique policy identifier
    pub id: PolicyId,

    /// Policy name, used in decision reasons
    pub name: String,

    /// Resource the policy applies to
    pub resource: String,

    /// Action the policy applies to
    pub action: String,

    /// Allow or deny on match
    pub effect: PolicyEffect,

    /// Higher priority policies are evaluated first
    #[serde(default)]
    pub priority: i32,

    /// Inactive policies never match, regardless of priority
    #[serde(default = "default_active")]
    pub is_active: bool,

    /// Condition tree; absent means "match always"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<ConditionNode>,
}

fn default_active() -> bool {
    true
}

impl Policy {
    fn new(
        id: impl Into<PolicyId>,
        name: impl Into<String>,
        resource: impl Into<String>,
        action: impl Into<String>,
        effect: PolicyEffect,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            resource: resource.into(),
            action: action.into(),
            effect,
            priority: 0,
            is_active: true,
            conditions: None,
        }
    }

    /// Unconditional ALLOW policy at priority 0
    pub fn allow(
        id: impl Into<PolicyId>,
        name: impl Into<String>,
        resource: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self::new(id, name, resource, action, PolicyEffect::Allow)
    }

    /// Unconditional DENY policy at priority 0
    pub fn deny(
        id: impl Into<PolicyId>,
        name: impl Into<String>,
        resource: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self::new(id, name, resource, action, PolicyEffect::Deny)
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_conditions(mut self, conditions: ConditionNode) -> Self {
        self.conditions = Some(conditions);
        self
    }

    pub fn deactivated(mut self) -> Self {
        self.is_active = false;
        self
    }
}

/// Policy store seam.
///
/// Implementations should pre-filter to active policies; the evaluator still
/// re-checks `is_active` defensively.
#[async_trait]
pub trait PolicyStore: Send + Sync {
    /// Fetch the policies governing one tenant + resource + action
    async fn find_policies(
        &self,
        tenant_id: &str,
        resource: &str,
        action: &str,
    ) -> Result<Vec<Policy>>;
}

/// In-memory policy store for tests and embedded deployments
#[derive(Default)]
pub struct InMemoryPolicyStore {
    policies: Arc<RwLock<HashMap<TenantId, Vec<Policy>>>>,
}

impl InMemoryPolicyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a policy for a tenant
    pub async fn put(&self, tenant_id: impl Into<TenantId>, policy: Policy) {
        let mut policies = self.policies.write().await;
        policies.entry(tenant_id.into()).or_default().push(policy);
    }
}

#[async_trait]
impl PolicyStore for InMemoryPolicyStore {
    async fn find_policies(
        &self,
        tenant_id: &str,
        resource: &str,
        action: &str,
    ) -> Result<Vec<Policy>> {
        let policies = self.policies.read().await;
        Ok(policies
            .get(tenant_id)
            .map(|tenant_policies| {
                tenant_policies
                    .iter()
                    .filter(|p| p.is_active && p.resource == resource && p.action == action)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn policy_deserializes_from_wire_format() {
        let policy: Policy = serde_json::from_value(json!({
            "id": "pol-1",
            "name": "owners can edit",
            "resource": "document",
            "action": "update",
            "effect": "ALLOW",
            "priority": 10,
            "isActive": true,
            "conditions": {
                "attribute": "context.userId",
                "operator": "eq",
                "value": "instance.createdById"
            }
        }))
        .unwrap();

        assert_eq!(policy.effect, PolicyEffect::Allow);
        assert_eq!(policy.priority, 10);
        assert!(policy.conditions.is_some());
    }

    #[test]
    fn priority_and_active_flag_default() {
        let policy: Policy = serde_json::from_value(json!({
            "id": "pol-2",
            "name": "deny all",
            "resource": "document",
            "action": "delete",
            "effect": "DENY"
        }))
        .unwrap();

        assert_eq!(policy.priority, 0);
        assert!(policy.is_active);
        assert!(policy.conditions.is_none());
    }

    #[tokio::test]
    async fn store_scopes_by_tenant_and_filters_inactive() {
        let store = InMemoryPolicyStore::new();
        store
            .put("acme", Policy::allow("p-1", "read open", "invoice", "read"))
            .await;
        store
            .put(
                "acme",
                Policy::deny("p-2", "stale", "invoice", "read").deactivated(),
            )
            .await;
        store
            .put("globex", Policy::allow("p-3", "other tenant", "invoice", "read"))
            .await;

        let found = store.find_policies("acme", "invoice", "read").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "p-1");
    }
}
