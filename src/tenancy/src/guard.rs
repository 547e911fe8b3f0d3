//! Tenant-guarded data access.
//!
//! The three functions here are the only sanctioned way repository code
//! touches tenant-scoped storage: [`with_tenant`] for read filters,
//! [`with_tenant_data`] for create payloads, [`validate_ownership`] for
//! records fetched by id. They are the last line of defense against
//! cross-tenant leakage and must be applied to every read-by-id and every
//! write.

use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{Result, TenancyError};
use crate::scope::current_tenant_id;

/// Field injected into every guarded query and payload
pub const TENANT_FIELD: &str = "tenant_id";

/// A record that carries the tenant it belongs to
pub trait TenantOwned {
    fn tenant_id(&self) -> &str;
}

/// Merge the active tenant id into a query filter.
///
/// A caller-supplied tenant id in the filter is overwritten, never trusted.
pub fn with_tenant(filter: Value) -> Result<Value> {
    merge_tenant(filter)
}

/// Merge the active tenant id into a create payload.
pub fn with_tenant_data(payload: Value) -> Result<Value> {
    merge_tenant(payload)
}

/// Reject a record that belongs to a tenant other than the active one.
pub fn validate_ownership<R: TenantOwned + ?Sized>(record: &R) -> Result<()> {
    let expected = current_tenant_id()?;
    let found = record.tenant_id();

    if found != expected {
        warn!(
            "cross-tenant access rejected: record belongs to '{}', active tenant is '{}'",
            found, expected
        );
        return Err(TenancyError::CrossTenantAccess {
            expected,
            found: found.to_string(),
        });
    }

    Ok(())
}

fn merge_tenant(value: Value) -> Result<Value> {
    let tenant_id = current_tenant_id()?;

    let mut map = match value {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => return Err(TenancyError::InvalidQueryShape(json_type_name(&other))),
    };

    map.insert(TENANT_FIELD.to_string(), Value::String(tenant_id));
    Ok(Value::Object(map))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
