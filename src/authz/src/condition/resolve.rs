//! Attribute and cross-reference resolution for condition leaves.
//!
//! Resolution is restricted to the contexts' declared fields plus the
//! caller-supplied extra attributes. Dotted paths only descend into values
//! the caller explicitly placed in a context; there is no reflective
//! traversal of internal state.

use serde_json::Value;

use crate::types::{EntityContext, PolicyContext};

const CONTEXT_PREFIX: &str = "context.";
const INSTANCE_PREFIX: &str = "instance.";
const ENTITY_PREFIX: &str = "entity.";

/// Resolve a namespaced dotted path against the evaluation contexts.
///
/// Returns `None` when the namespace prefix is unrecognized. A recognized
/// namespace with an unknown path resolves to JSON null, so `eq` against a
/// literal null can still match.
pub(super) fn resolve_attribute(
    path: &str,
    context: &PolicyContext,
    entity: &EntityContext,
) -> Option<Value> {
    if let Some(rest) = path.strip_prefix(CONTEXT_PREFIX) {
        Some(resolve_context_path(context, rest))
    } else if let Some(rest) = path
        .strip_prefix(INSTANCE_PREFIX)
        .or_else(|| path.strip_prefix(ENTITY_PREFIX))
    {
        Some(resolve_entity_path(entity, rest))
    } else {
        None
    }
}

/// Resolve a comparison value: a string bearing a namespace prefix is a
/// cross-reference into the contexts, anything else is a literal.
pub(super) fn resolve_value(
    value: &Value,
    context: &PolicyContext,
    entity: &EntityContext,
) -> Value {
    if let Value::String(raw) = value {
        if let Some(resolved) = resolve_attribute(raw, context, entity) {
            return resolved;
        }
    }
    value.clone()
}

fn resolve_context_path(context: &PolicyContext, path: &str) -> Value {
    let mut segments = path.split('.');
    let head = segments.next().unwrap_or_default();

    let root = match head {
        "userId" => Value::String(context.user_id.clone()),
        "tenantId" => Value::String(context.tenant_id.clone()),
        "userRoles" => Value::Array(
            context
                .user_roles
                .iter()
                .cloned()
                .map(Value::String)
                .collect(),
        ),
        "primaryRole" => context
            .primary_role
            .clone()
            .map(Value::String)
            .unwrap_or(Value::Null),
        other => context.extra.get(other).cloned().unwrap_or(Value::Null),
    };

    walk(root, segments)
}

fn resolve_entity_path(entity: &EntityContext, path: &str) -> Value {
    let mut segments = path.split('.');
    let head = segments.next().unwrap_or_default();

    let root = match head {
        "id" => entity.id.clone().map(Value::String).unwrap_or(Value::Null),
        "tenantId" => Value::String(entity.tenant_id.clone()),
        "createdById" => entity
            .created_by_id
            .clone()
            .map(Value::String)
            .unwrap_or(Value::Null),
        other => entity.extra.get(other).cloned().unwrap_or(Value::Null),
    };

    walk(root, segments)
}

/// Walk remaining dotted segments through JSON objects; any other shape ends
/// the walk at null.
fn walk<'a>(mut current: Value, segments: impl Iterator<Item = &'a str>) -> Value {
    for segment in segments {
        current = match current {
            Value::Object(mut map) => map.remove(segment).unwrap_or(Value::Null),
            _ => return Value::Null,
        };
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn declared_fields_resolve() {
        let context = PolicyContext::new("u-1", "acme");
        let entity = EntityContext::new("acme").with_created_by("u-9");

        assert_eq!(
            resolve_attribute("context.userId", &context, &entity),
            Some(json!("u-1"))
        );
        assert_eq!(
            resolve_attribute("entity.createdById", &context, &entity),
            Some(json!("u-9"))
        );
        assert_eq!(resolve_attribute("request.userId", &context, &entity), None);
    }

    #[test]
    fn dotted_paths_descend_into_extra_attributes() {
        let context = PolicyContext::new("u-1", "acme")
            .with_attribute("project", json!({ "id": "p-7", "labels": { "env": "prod" } }));
        let entity = EntityContext::new("acme");

        assert_eq!(
            resolve_attribute("context.project.labels.env", &context, &entity),
            Some(json!("prod"))
        );
        // Descending through a non-object ends at null.
        assert_eq!(
            resolve_attribute("context.userId.nested", &context, &entity),
            Some(Value::Null)
        );
    }

    #[test]
    fn unknown_paths_resolve_to_null() {
        let context = PolicyContext::new("u-1", "acme");
        let entity = EntityContext::new("acme");

        assert_eq!(
            resolve_attribute("context.missing", &context, &entity),
            Some(Value::Null)
        );
        assert_eq!(
            resolve_attribute("entity.id", &context, &entity),
            Some(Value::Null)
        );
    }

    #[test]
    fn values_without_prefix_are_literals() {
        let context = PolicyContext::new("u-1", "acme");
        let entity = EntityContext::new("acme");

        assert_eq!(
            resolve_value(&json!("plain string"), &context, &entity),
            json!("plain string")
        );
        assert_eq!(resolve_value(&json!(42), &context, &entity), json!(42));
        assert_eq!(
            resolve_value(&json!("context.userId"), &context, &entity),
            json!("u-1")
        );
    }
}
