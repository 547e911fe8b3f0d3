//! Ambient tenant scope for one logical request.
//!
//! The active tenant id rides on a tokio task-local: it is visible to
//! everything a request executes, across `.await` suspension points and
//! thread hops, and is invisible to every other task no matter how finely
//! their execution interleaves. Nested scopes shadow the outer value and
//! restore it exactly when the inner scope ends.

use std::future::Future;

use crate::error::{Result, TenancyError};

/// Tenant identifier
pub type TenantId = String;

tokio::task_local! {
    static ACTIVE_TENANT: TenantId;
}

/// Entry point for tenant-scoped execution.
///
/// A scope owns no external resources; cancelling the wrapped work simply
/// tears the scope down.
pub struct TenantScope;

impl TenantScope {
    /// Run `fut` with `tenant_id` as the active tenant for its full dynamic
    /// extent, including everything it awaits.
    pub async fn run<F>(tenant_id: impl Into<TenantId>, fut: F) -> F::Output
    where
        F: Future,
    {
        ACTIVE_TENANT.scope(tenant_id.into(), fut).await
    }

    /// Synchronous variant of [`TenantScope::run`] for call chains with no
    /// suspension points.
    pub fn run_sync<F, T>(tenant_id: impl Into<TenantId>, f: F) -> T
    where
        F: FnOnce() -> T,
    {
        ACTIVE_TENANT.sync_scope(tenant_id.into(), f)
    }
}

/// The active tenant id.
///
/// Fails with [`TenancyError::MissingTenantContext`] when no scope encloses
/// the caller. That is a fail-fast programming defect; request handling code
/// always runs inside a scope entered by the authorization pipeline.
pub fn current_tenant_id() -> Result<TenantId> {
    ACTIVE_TENANT
        .try_with(|id| id.clone())
        .map_err(|_| TenancyError::MissingTenantContext)
}

/// Non-failing variant of [`current_tenant_id`] for code paths that may
/// legitimately run before a tenant is known.
pub fn current_tenant_id_opt() -> Option<TenantId> {
    ACTIVE_TENANT.try_with(|id| id.clone()).ok()
}
