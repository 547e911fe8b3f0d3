//! Error taxonomy for the authorization pipeline.
//!
//! Authorization failures are terminal for the request; infrastructure
//! failures propagate to a generic internal error and are never converted
//! into an allow or deny decision.

use thiserror::Error;

use tessera_tenancy::TenancyError;

/// Result type for authorization operations
pub type Result<T> = std::result::Result<T, AuthzError>;

/// Authorization pipeline errors
#[derive(Debug, Error)]
pub enum AuthzError {
    /// Tenant scoping violation (missing context, cross-tenant record)
    #[error(transparent)]
    Tenancy(#[from] TenancyError),

    /// No tenant id could be resolved from any source, or the id names no
    /// known tenant
    #[error("could not resolve an active tenant for this request")]
    UnresolvedTenant,

    /// The resolved tenant exists but is deactivated
    #[error("tenant '{0}' is inactive")]
    InactiveTenant(String),

    /// The route requires a permission but no principal was authenticated
    #[error("no authenticated principal")]
    Unauthenticated,

    /// RBAC rejection. The message deliberately does not echo the
    /// resource:action pair to untrusted clients.
    #[error("permission denied")]
    PermissionDenied,

    /// ABAC rejection. The matched policy name is carried for logs; callers
    /// decide whether to disclose it.
    #[error("denied by policy")]
    PolicyDenied {
        policy: Option<String>,
        reason: String,
    },

    /// A role, policy, or tenant store could not be reached
    #[error("authorization store unavailable: {0}")]
    StoreUnavailable(String),
}

impl AuthzError {
    /// Whether this error should reject the request as a client error.
    ///
    /// Everything else (store failures, missing tenant context) maps to a
    /// generic internal error upstream, never to a security decision.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::UnresolvedTenant
                | Self::InactiveTenant(_)
                | Self::Unauthenticated
                | Self::PermissionDenied
                | Self::PolicyDenied { .. }
        )
    }
}
