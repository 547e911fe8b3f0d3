//! Core authorization types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use tessera_tenancy::TenantId;

/// Unique policy identifier
pub type PolicyId = String;

/// Role name, unique within a tenant
pub type RoleName = String;

/// Authenticated principal as handed over by upstream authentication
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    /// User identifier
    pub user_id: String,

    /// Tenant the principal belongs to
    pub tenant_id: TenantId,

    /// Names of the roles assigned to the principal within its tenant
    #[serde(default)]
    pub roles: Vec<RoleName>,

    /// Primary role, if one is designated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_role: Option<RoleName>,
}

impl Principal {
    /// Create a principal with no roles
    pub fn new(user_id: impl Into<String>, tenant_id: impl Into<TenantId>) -> Self {
        Self {
            user_id: user_id.into(),
            tenant_id: tenant_id.into(),
            roles: Vec::new(),
            primary_role: None,
        }
    }

    /// Add a role name
    pub fn with_role(mut self, role: impl Into<RoleName>) -> Self {
        self.roles.push(role.into());
        self
    }

    /// Designate the primary role
    pub fn with_primary_role(mut self, role: impl Into<RoleName>) -> Self {
        self.primary_role = Some(role.into());
        self
    }
}

/// Caller attributes visible to policy conditions under the `context.`
/// namespace.
///
/// Only the declared fields and the caller-supplied `extra` attributes are
/// reachable from the condition language; there is no reflective traversal
/// into arbitrary structures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyContext {
    /// Acting user id
    pub user_id: String,

    /// Active tenant id
    pub tenant_id: TenantId,

    /// Role names held by the acting user
    #[serde(default)]
    pub user_roles: Vec<String>,

    /// Primary role, if designated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_role: Option<String>,

    /// Additional caller-declared attributes
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PolicyContext {
    pub fn new(user_id: impl Into<String>, tenant_id: impl Into<TenantId>) -> Self {
        Self {
            user_id: user_id.into(),
            tenant_id: tenant_id.into(),
            user_roles: Vec::new(),
            primary_role: None,
            extra: Map::new(),
        }
    }

    /// Build the evaluation context for an authenticated principal
    pub fn from_principal(principal: &Principal) -> Self {
        Self {
            user_id: principal.user_id.clone(),
            tenant_id: principal.tenant_id.clone(),
            user_roles: principal.roles.clone(),
            primary_role: principal.primary_role.clone(),
            extra: Map::new(),
        }
    }

    /// Add a caller-declared attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// Attributes of the entity an operation acts on, visible to policy
/// conditions under the `instance.` / `entity.` namespaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityContext {
    /// Entity identifier, when the operation targets an existing record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Tenant owning the entity
    pub tenant_id: TenantId,

    /// User who created the entity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by_id: Option<String>,

    /// Additional caller-declared attributes
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EntityContext {
    pub fn new(tenant_id: impl Into<TenantId>) -> Self {
        Self {
            id: None,
            tenant_id: tenant_id.into(),
            created_by_id: None,
            extra: Map::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_created_by(mut self, user_id: impl Into<String>) -> Self {
        self.created_by_id = Some(user_id.into());
        self
    }

    /// Add a caller-declared attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// Outcome of a policy evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    /// Whether the operation is allowed
    pub allowed: bool,

    /// Name of the policy that decided, if any matched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_policy: Option<String>,

    /// Human-readable reason for a denial
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl EvaluationResult {
    /// Allowed by the named policy
    pub fn allow(policy: impl Into<String>) -> Self {
        Self {
            allowed: true,
            matched_policy: Some(policy.into()),
            reason: None,
        }
    }

    /// Denied by the named policy
    pub fn deny(policy: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            matched_policy: Some(policy.into()),
            reason: Some(reason.into()),
        }
    }

    /// Default deny: no policy matched
    pub fn no_match() -> Self {
        Self {
            allowed: false,
            matched_policy: None,
            reason: Some("No matching policy found".to_string()),
        }
    }
}

/// Permission requirement attached to a route registration.
///
/// Routes that declare no requirement opt out of RBAC/ABAC entirely; that is
/// an explicit upstream decision, not a gap in this pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRequirement {
    pub resource: String,
    pub action: String,
}

impl RouteRequirement {
    pub fn new(resource: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            action: action.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn principal_builder() {
        let principal = Principal::new("u-1", "acme")
            .with_role("member")
            .with_role("billing")
            .with_primary_role("member");

        assert_eq!(principal.roles, vec!["member", "billing"]);
        assert_eq!(principal.primary_role.as_deref(), Some("member"));
    }

    #[test]
    fn policy_context_from_principal_carries_roles() {
        let principal = Principal::new("u-1", "acme").with_role("member");
        let context = PolicyContext::from_principal(&principal)
            .with_attribute("department", json!("finance"));

        assert_eq!(context.user_id, "u-1");
        assert_eq!(context.user_roles, vec!["member"]);
        assert_eq!(context.extra["department"], "finance");
    }

    #[test]
    fn evaluation_result_constructors() {
        let allow = EvaluationResult::allow("owners can edit");
        assert!(allow.allowed);
        assert_eq!(allow.matched_policy.as_deref(), Some("owners can edit"));
        assert!(allow.reason.is_none());

        let no_match = EvaluationResult::no_match();
        assert!(!no_match.allowed);
        assert_eq!(no_match.reason.as_deref(), Some("No matching policy found"));
    }

    #[test]
    fn contexts_serialize_in_wire_casing() {
        let entity = EntityContext::new("acme")
            .with_id("rec-1")
            .with_created_by("u-1");
        let wire = serde_json::to_value(&entity).unwrap();

        assert_eq!(
            wire,
            json!({ "id": "rec-1", "tenantId": "acme", "createdById": "u-1" })
        );
    }
}
