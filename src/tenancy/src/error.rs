//! Error types for tenant scoping and guarded access

use thiserror::Error;

/// Result type for tenancy operations
pub type Result<T> = std::result::Result<T, TenancyError>;

/// Tenant isolation errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TenancyError {
    /// No tenant scope has been entered for the current task. This is a
    /// programming defect, not a recoverable request error.
    #[error("no tenant scope entered for the current task")]
    MissingTenantContext,

    /// A record from another tenant reached a tenant-scoped code path
    #[error("record belongs to tenant '{found}', active tenant is '{expected}'")]
    CrossTenantAccess { expected: String, found: String },

    /// Guarded queries and payloads must be JSON objects (or null)
    #[error("guarded query must be a JSON object, got {0}")]
    InvalidQueryShape(&'static str),
}
