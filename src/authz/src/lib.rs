//! # Tessera Authorization
//!
//! Request-scoped multi-tenant authorization pipeline: tenant resolution,
//! role-based permission checks (RBAC) with a TTL permission cache, and
//! attribute-based policy evaluation (ABAC) over a small JSON condition
//! language, with default-deny, priority-ordered decisions.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use tessera_authz::{
//!     AuthorizationPipeline, InMemoryPolicyStore, InMemoryRoleStore,
//!     InMemoryTenantDirectory, OperationRequest, PermissionResolver, Principal,
//!     Role, RouteRequirement, Tenant,
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), tessera_authz::AuthzError> {
//! let tenants = Arc::new(InMemoryTenantDirectory::new());
//! tenants.put(Tenant::new("acme", "Acme Corp")).await;
//!
//! let roles = Arc::new(InMemoryRoleStore::new());
//! roles
//!     .put(Role::new("acme", "member").with_permission("invoice", "read"))
//!     .await;
//!
//! let pipeline = AuthorizationPipeline::new(
//!     tenants,
//!     Arc::new(PermissionResolver::new(roles)),
//!     Arc::new(InMemoryPolicyStore::new()),
//! );
//!
//! let request = OperationRequest::new()
//!     .with_header_tenant("acme")
//!     .with_principal(Principal::new("u-1", "acme").with_role("member"))
//!     .with_requirement(RouteRequirement::new("invoice", "read"));
//!
//! let invoices = pipeline.run(request, || async { vec!["inv-1"] }).await?;
//! assert_eq!(invoices, vec!["inv-1"]);
//! # Ok(())
//! # }
//! ```

pub mod condition;
pub mod directory;
pub mod error;
pub mod evaluator;
pub mod pipeline;
pub mod policy;
pub mod resolver;
pub mod role;
pub mod types;

pub use condition::{ConditionNode, Operator};
pub use directory::{InMemoryTenantDirectory, Tenant, TenantDirectory};
pub use error::{AuthzError, Result};
pub use evaluator::{any_allows, evaluate};
pub use pipeline::{AuthorizationPipeline, OperationRequest, TenantHints};
pub use policy::{InMemoryPolicyStore, Policy, PolicyEffect, PolicyStore};
pub use resolver::{CacheConfig, CacheStats, PermissionResolver};
pub use role::{InMemoryRoleStore, Permission, Role, RoleStore, MANAGE_ACTION};
pub use types::{
    EntityContext, EvaluationResult, PolicyContext, PolicyId, Principal, RoleName,
    RouteRequirement, TenantId,
};

// The tenancy contract downstream repositories program against.
pub use tessera_tenancy::{
    current_tenant_id, current_tenant_id_opt, validate_ownership, with_tenant, with_tenant_data,
    TenantOwned, TenantScope,
};
