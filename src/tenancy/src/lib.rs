//! # Tessera Tenancy
//!
//! Request-scoped tenant context propagation and guarded data access for the
//! Tessera platform.
//!
//! Every inbound operation runs inside a [`TenantScope`]; everything it calls,
//! transitively and across `.await` points, reads the active tenant id through
//! [`current_tenant_id`] without manual parameter threading. The guard
//! functions ([`with_tenant`], [`with_tenant_data`], [`validate_ownership`])
//! are the contract every tenant-scoped repository must use.
//!
//! ## Example
//!
//! ```
//! use serde_json::json;
//! use tessera_tenancy::{with_tenant, TenantScope};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), tessera_tenancy::TenancyError> {
//! let filter = TenantScope::run("acme", async {
//!     with_tenant(json!({ "status": "open" }))
//! })
//! .await?;
//!
//! assert_eq!(filter["tenant_id"], "acme");
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod guard;
pub mod scope;

pub use error::{Result, TenancyError};
pub use guard::{validate_ownership, with_tenant, with_tenant_data, TenantOwned, TENANT_FIELD};
pub use scope::{current_tenant_id, current_tenant_id_opt, TenantId, TenantScope};
