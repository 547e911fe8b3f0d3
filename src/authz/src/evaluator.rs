//! Attribute-based policy evaluation.
//!
//! Pure functions over policies and evaluation contexts: no shared state, no
//! suspension points. The default is deny; only an explicit ALLOW match
//! grants access.

use tracing::debug;

use crate::policy::{Policy, PolicyEffect};
use crate::types::{EntityContext, EvaluationResult, PolicyContext};

/// Evaluate policies in priority order with default deny.
///
/// Inactive policies are filtered out defensively even when the store
/// already did so. Remaining policies are sorted by priority descending with
/// a stable sort, so equal priorities keep their input order — the
/// deterministic tie-break this crate guarantees. The first policy whose
/// conditions match decides the outcome; absent conditions match
/// unconditionally.
pub fn evaluate(
    policies: &[Policy],
    context: &PolicyContext,
    entity: &EntityContext,
) -> EvaluationResult {
    let mut active: Vec<&Policy> = policies.iter().filter(|p| p.is_active).collect();
    active.sort_by(|a, b| b.priority.cmp(&a.priority));

    for policy in active {
        if !condition_matches(policy, context, entity) {
            continue;
        }

        debug!(
            "policy '{}' matched with effect {:?} at priority {}",
            policy.name, policy.effect, policy.priority
        );

        return match policy.effect {
            PolicyEffect::Allow => EvaluationResult::allow(policy.name.clone()),
            PolicyEffect::Deny => EvaluationResult::deny(
                policy.name.clone(),
                format!("Denied by policy: {}", policy.name),
            ),
        };
    }

    debug!("no policy matched, denying by default");
    EvaluationResult::no_match()
}

/// Whether any active ALLOW policy's conditions match.
///
/// This is a deliberately different algorithm from [`evaluate`]: it ignores
/// priority and DENY policies entirely. The two are not interchangeable — a
/// request `evaluate` denies through a high-priority DENY policy can still
/// satisfy `any_allows`. Which endpoints may rely on which semantics is a
/// calling-convention decision owned by the service boundary, not this crate.
pub fn any_allows(policies: &[Policy], context: &PolicyContext, entity: &EntityContext) -> bool {
    policies
        .iter()
        .filter(|p| p.is_active && p.effect == PolicyEffect::Allow)
        .any(|p| condition_matches(p, context, entity))
}

fn condition_matches(policy: &Policy, context: &PolicyContext, entity: &EntityContext) -> bool {
    policy
        .conditions
        .as_ref()
        .map_or(true, |node| node.matches(context, entity))
}
