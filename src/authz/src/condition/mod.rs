//! The persisted policy condition language.
//!
//! Conditions are stored as JSON and interpreted at evaluation time:
//!
//! ```text
//! { "all": [Condition...] }
//! { "any": [Condition...] }
//! { "attribute": "context.userId", "operator": "eq", "value": "instance.createdById" }
//! null
//! ```
//!
//! Attributes resolve through a namespace prefix: `context.` into the policy
//! context, `instance.` or `entity.` (aliases) into the entity context. A
//! string value carrying one of the same prefixes is a cross-reference and
//! resolves identically; anything else is a literal.

mod ops;
mod resolve;

use serde::de::{Deserializer, Error as _};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::types::{EntityContext, PolicyContext};

/// One node of a policy condition tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionNode {
    /// Every child must match. An empty list is vacuously true, which is
    /// load-bearing for "match always" composite policies.
    All { all: Vec<ConditionNode> },

    /// At least one child must match. An empty list matches nothing.
    Any { any: Vec<ConditionNode> },

    /// A single attribute comparison
    Leaf {
        attribute: String,
        operator: Operator,
        value: Value,
    },
}

impl ConditionNode {
    /// Whether this node matches the given contexts.
    ///
    /// Every failure mode short of a real match evaluates to `false`: an
    /// unrecognized attribute namespace, an operator this build does not
    /// know, a type mismatch.
    pub fn matches(&self, context: &PolicyContext, entity: &EntityContext) -> bool {
        match self {
            Self::All { all } => all.iter().all(|child| child.matches(context, entity)),
            Self::Any { any } => any.iter().any(|child| child.matches(context, entity)),
            Self::Leaf {
                attribute,
                operator,
                value,
            } => {
                let Some(lhs) = resolve::resolve_attribute(attribute, context, entity) else {
                    debug!("condition attribute '{}' has no recognized namespace", attribute);
                    return false;
                };
                let rhs = resolve::resolve_value(value, context, entity);
                ops::apply(*operator, &lhs, &rhs)
            }
        }
    }
}

/// Comparison operator of a condition leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Neq,
    In,
    Nin,
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
    StartsWith,
    EndsWith,
    /// Any operator string this build does not know; always evaluates false
    Unknown,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::In => "in",
            Self::Nin => "nin",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Contains => "contains",
            Self::StartsWith => "startsWith",
            Self::EndsWith => "endsWith",
            Self::Unknown => "unknown",
        }
    }
}

impl From<&str> for Operator {
    fn from(raw: &str) -> Self {
        match raw {
            "eq" => Self::Eq,
            "neq" => Self::Neq,
            "in" => Self::In,
            "nin" => Self::Nin,
            "gt" => Self::Gt,
            "gte" => Self::Gte,
            "lt" => Self::Lt,
            "lte" => Self::Lte,
            "contains" => Self::Contains,
            "startsWith" => Self::StartsWith,
            "endsWith" => Self::EndsWith,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Operator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Operator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw.is_empty() {
            return Err(D::Error::custom("operator must be a non-empty string"));
        }
        Ok(Operator::from(raw.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn context() -> PolicyContext {
        PolicyContext::new("u-1", "acme")
            .with_attribute("department", json!("finance"))
            .with_attribute("clearance", json!(3))
    }

    fn entity() -> EntityContext {
        EntityContext::new("acme")
            .with_id("rec-1")
            .with_created_by("u-1")
            .with_attribute("status", json!("draft"))
    }

    #[test]
    fn grammar_deserializes_all_shapes() {
        let node: ConditionNode = serde_json::from_value(json!({
            "all": [
                { "attribute": "context.userId", "operator": "eq", "value": "instance.createdById" },
                { "any": [
                    { "attribute": "context.primaryRole", "operator": "in", "value": ["admin", "owner"] }
                ] }
            ]
        }))
        .unwrap();

        let ConditionNode::All { all } = &node else {
            panic!("expected an all node");
        };
        assert_eq!(all.len(), 2);
        assert!(matches!(all[0], ConditionNode::Leaf { .. }));
        assert!(matches!(all[1], ConditionNode::Any { .. }));
    }

    #[test]
    fn unknown_operator_deserializes_and_never_matches() {
        let node: ConditionNode = serde_json::from_value(json!({
            "attribute": "context.userId",
            "operator": "fuzzyMatch",
            "value": "u-1"
        }))
        .unwrap();

        let ConditionNode::Leaf { operator, .. } = &node else {
            panic!("expected a leaf");
        };
        assert_eq!(*operator, Operator::Unknown);
        assert!(!node.matches(&context(), &entity()));
    }

    #[test]
    fn empty_all_matches_and_empty_any_does_not() {
        let all: ConditionNode = serde_json::from_value(json!({ "all": [] })).unwrap();
        let any: ConditionNode = serde_json::from_value(json!({ "any": [] })).unwrap();

        assert!(all.matches(&context(), &entity()));
        assert!(!any.matches(&context(), &entity()));
    }

    #[test]
    fn cross_reference_compares_context_to_entity() {
        let node: ConditionNode = serde_json::from_value(json!({
            "attribute": "context.userId",
            "operator": "eq",
            "value": "instance.createdById"
        }))
        .unwrap();

        assert!(node.matches(&context(), &entity()));

        let other_entity = EntityContext::new("acme").with_created_by("u-2");
        assert!(!node.matches(&context(), &other_entity));
    }

    #[test]
    fn instance_and_entity_prefixes_are_aliases() {
        for prefix in ["instance", "entity"] {
            let node: ConditionNode = serde_json::from_value(json!({
                "attribute": format!("{prefix}.status"),
                "operator": "eq",
                "value": "draft"
            }))
            .unwrap();
            assert!(node.matches(&context(), &entity()), "prefix {prefix}");
        }
    }

    #[test]
    fn unprefixed_attribute_never_matches() {
        let node: ConditionNode = serde_json::from_value(json!({
            "attribute": "userId",
            "operator": "eq",
            "value": "u-1"
        }))
        .unwrap();

        assert!(!node.matches(&context(), &entity()));
    }

    #[test]
    fn extra_attributes_resolve_through_their_namespace() {
        let node: ConditionNode = serde_json::from_value(json!({
            "all": [
                { "attribute": "context.department", "operator": "eq", "value": "finance" },
                { "attribute": "context.clearance", "operator": "gte", "value": 2 }
            ]
        }))
        .unwrap();

        assert!(node.matches(&context(), &entity()));
    }

    #[test]
    fn role_membership_checks() {
        let mut context = PolicyContext::new("u-1", "acme");
        context.user_roles = vec!["member".to_string(), "billing".to_string()];
        context.primary_role = Some("member".to_string());

        // `contains` is a string operator; an array attribute is a type
        // mismatch and evaluates false.
        let node: ConditionNode = serde_json::from_value(json!({
            "attribute": "context.userRoles",
            "operator": "contains",
            "value": "member"
        }))
        .unwrap();
        assert!(!node.matches(&context, &entity()));

        // Membership goes the other way: the attribute against a sequence.
        let node: ConditionNode = serde_json::from_value(json!({
            "attribute": "context.primaryRole",
            "operator": "in",
            "value": ["member", "admin"]
        }))
        .unwrap();
        assert!(node.matches(&context, &entity()));
    }

    #[test]
    fn condition_round_trips_through_wire_format() {
        let wire = json!({
            "any": [
                { "attribute": "context.userId", "operator": "eq", "value": "instance.createdById" },
                { "attribute": "entity.status", "operator": "neq", "value": "archived" }
            ]
        });

        let node: ConditionNode = serde_json::from_value(wire.clone()).unwrap();
        assert_eq!(serde_json::to_value(&node).unwrap(), wire);
    }
}
