//! Request-scoped authorization orchestration.
//!
//! One inbound operation flows through: tenant resolution → scope entry →
//! RBAC check → ABAC check → handler. The handler executes inside the tenant
//! scope, so every downstream repository call sees the active tenant id
//! through the tenancy guard functions.

use serde_json::{Map, Value};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

use tessera_tenancy::{current_tenant_id, TenantScope};

use crate::directory::TenantDirectory;
use crate::error::{AuthzError, Result};
use crate::evaluator;
use crate::policy::PolicyStore;
use crate::resolver::PermissionResolver;
use crate::types::{EntityContext, PolicyContext, Principal, RouteRequirement, TenantId};

/// Tenant identification sources carried by one inbound operation.
///
/// Precedence: explicit tenant header > subdomain > query parameter > the
/// authenticated principal's tenant.
#[derive(Debug, Clone, Default)]
pub struct TenantHints {
    pub header: Option<String>,
    pub subdomain: Option<String>,
    pub query_param: Option<String>,
}

/// One inbound operation as seen by the authorization pipeline.
///
/// Routing, token verification, and principal authentication happen
/// upstream; this type carries their results.
#[derive(Debug, Clone, Default)]
pub struct OperationRequest {
    /// Tenant identification sources, in precedence order
    pub hints: TenantHints,

    /// Principal handed over by upstream authentication, if any
    pub principal: Option<Principal>,

    /// Declared permission requirement; `None` means the route opted out of
    /// RBAC/ABAC
    pub requirement: Option<RouteRequirement>,

    /// Attributes of the entity the operation acts on, for policy conditions
    pub entity: Option<EntityContext>,

    /// Extra caller attributes exposed to conditions under `context.`
    pub context_attributes: Map<String, Value>,
}

impl OperationRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.hints.header = Some(tenant_id.into());
        self
    }

    pub fn with_subdomain(mut self, subdomain: impl Into<String>) -> Self {
        self.hints.subdomain = Some(subdomain.into());
        self
    }

    pub fn with_query_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.hints.query_param = Some(tenant_id.into());
        self
    }

    pub fn with_principal(mut self, principal: Principal) -> Self {
        self.principal = Some(principal);
        self
    }

    pub fn with_requirement(mut self, requirement: RouteRequirement) -> Self {
        self.requirement = Some(requirement);
        self
    }

    pub fn with_entity(mut self, entity: EntityContext) -> Self {
        self.entity = Some(entity);
        self
    }

    pub fn with_context_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.context_attributes.insert(key.into(), value);
        self
    }
}

/// Orchestrates tenant resolution, RBAC, and ABAC for one request.
pub struct AuthorizationPipeline {
    tenants: Arc<dyn TenantDirectory>,
    permissions: Arc<PermissionResolver>,
    policies: Arc<dyn PolicyStore>,
}

impl AuthorizationPipeline {
    pub fn new(
        tenants: Arc<dyn TenantDirectory>,
        permissions: Arc<PermissionResolver>,
        policies: Arc<dyn PolicyStore>,
    ) -> Self {
        Self {
            tenants,
            permissions,
            policies,
        }
    }

    /// Run `handler` inside the request's tenant scope after enforcing the
    /// declared requirement.
    ///
    /// The scope covers the handler's full dynamic extent; authorization
    /// failures reject the request before the handler ever runs.
    pub async fn run<F, Fut, T>(&self, request: OperationRequest, handler: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let tenant_id = self.resolve_tenant(&request).await?;

        TenantScope::run(tenant_id, async move {
            self.enforce(&request).await?;
            Ok(handler().await)
        })
        .await
    }

    /// Resolve the tenant id from ordered sources and verify it names an
    /// active tenant.
    async fn resolve_tenant(&self, request: &OperationRequest) -> Result<TenantId> {
        let candidate = request
            .hints
            .header
            .as_deref()
            .or(request.hints.subdomain.as_deref())
            .or(request.hints.query_param.as_deref())
            .or_else(|| request.principal.as_ref().map(|p| p.tenant_id.as_str()));

        let Some(candidate) = candidate else {
            warn!("request carries no tenant identification source");
            return Err(AuthzError::UnresolvedTenant);
        };

        let tenant = self
            .tenants
            .find_tenant(candidate)
            .await?
            .ok_or(AuthzError::UnresolvedTenant)?;

        if !tenant.is_active {
            info!("rejecting request for inactive tenant '{}'", tenant.id);
            return Err(AuthzError::InactiveTenant(tenant.id));
        }

        Ok(tenant.id)
    }

    /// RBAC then ABAC, inside the tenant scope.
    async fn enforce(&self, request: &OperationRequest) -> Result<()> {
        let Some(requirement) = &request.requirement else {
            // Routes without a declared requirement are an explicit upstream
            // opt-out of this pipeline.
            debug!("route declares no permission requirement, skipping checks");
            return Ok(());
        };

        let principal = request
            .principal
            .as_ref()
            .ok_or(AuthzError::Unauthenticated)?;

        let allowed = self
            .permissions
            .check_permission(principal, &requirement.resource, &requirement.action)
            .await?;
        if !allowed {
            info!(
                "rbac rejected user '{}' for {}:{}",
                principal.user_id, requirement.resource, requirement.action
            );
            return Err(AuthzError::PermissionDenied);
        }

        let tenant_id = current_tenant_id()?;
        let policies = self
            .policies
            .find_policies(&tenant_id, &requirement.resource, &requirement.action)
            .await?;
        if policies.is_empty() {
            return Ok(());
        }

        let context = self.build_policy_context(principal, request);
        let entity = request
            .entity
            .clone()
            .unwrap_or_else(|| EntityContext::new(tenant_id.clone()));

        let result = evaluator::evaluate(&policies, &context, &entity);
        if !result.allowed {
            info!(
                "abac rejected user '{}': {}",
                principal.user_id,
                result.reason.as_deref().unwrap_or("no reason"),
            );
            return Err(AuthzError::PolicyDenied {
                policy: result.matched_policy,
                reason: result
                    .reason
                    .unwrap_or_else(|| "No matching policy found".to_string()),
            });
        }

        Ok(())
    }

    fn build_policy_context(
        &self,
        principal: &Principal,
        request: &OperationRequest,
    ) -> PolicyContext {
        let mut context = PolicyContext::from_principal(principal);
        for (key, value) in &request.context_attributes {
            context.extra.insert(key.clone(), value.clone());
        }
        context
    }
}
