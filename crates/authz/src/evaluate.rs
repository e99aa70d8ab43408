//! The single-resource policy evaluator.
//!
//! [`decide`] is the one call every controller makes before a
//! single-resource read or mutation:
//!
//! - No IO
//! - No panics
//! - No business logic (pure policy check)
//!
//! It returns a [`Decision`] value rather than an error so callers must
//! branch on Deny explicitly; access is never "protected" by accidental
//! error propagation.

use serde::{Deserialize, Serialize};

use crate::{
    policy::{Action, PolicyTable},
    principal::Principal,
    resource::{ResourceDescriptor, ResourceKind},
    roles::Role,
};

/// Allow/Deny tag, used standalone by the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Allow,
    Deny,
}

/// Why a request was denied. Variants are distinguishable so callers and
/// tests can assert on the failing clause, not just on "denied".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// No rule exists for this `(role, kind, action)` triple. Fail closed;
    /// usually a missing configuration entry, so callers log it louder.
    NoMatchingPolicy,

    /// The rule requires same-tenant access and the tenants differ.
    TenantMismatch,

    /// The rule requires ownership and none of the resource's owner refs
    /// are linked to the principal.
    OwnershipFailure,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::NoMatchingPolicy => "no matching policy",
            DenyReason::TenantMismatch => "tenant mismatch",
            DenyReason::OwnershipFailure => "ownership failure",
        }
    }
}

impl core::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The result of a policy evaluation. Never defaults to Allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "reason")]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allow(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn outcome(&self) -> Outcome {
        match self {
            Decision::Allow => Outcome::Allow,
            Decision::Deny(_) => Outcome::Deny,
        }
    }

    pub fn reason(&self) -> Option<DenyReason> {
        match self {
            Decision::Allow => None,
            Decision::Deny(reason) => Some(*reason),
        }
    }
}

/// Whether this principal skips the per-resource ownership check.
///
/// `super_admin` bypasses scoping entirely; admin and principal roles are
/// exempt only while holding the kind's `manage_*` permission.
pub(crate) fn ownership_exempt(principal: &Principal, kind: ResourceKind) -> bool {
    match principal.role() {
        Role::SuperAdmin => true,
        Role::Admin | Role::Principal => {
            principal.has_permission(&kind.manage_permission())
        }
        _ => false,
    }
}

/// Decide whether `principal` may perform `action` on the resource.
///
/// Evaluation order matches the rule's clauses: rule lookup (absent ⇒ deny),
/// then tenant check, then ownership check. The first failing clause names
/// the deny reason.
pub fn decide(
    table: &PolicyTable,
    principal: &Principal,
    action: Action,
    resource: &ResourceDescriptor,
) -> Decision {
    let Some(rule) = table.rule(principal.role(), resource.kind(), action) else {
        return Decision::Deny(DenyReason::NoMatchingPolicy);
    };

    if rule.requires_same_tenant && !principal.role().is_super_admin() {
        // Principal construction guarantees a tenant for these roles, but a
        // missing tenant still denies rather than panics.
        if principal.tenant_id() != Some(resource.tenant_id()) {
            return Decision::Deny(DenyReason::TenantMismatch);
        }
    }

    if rule.requires_ownership && !ownership_exempt(principal, resource.kind()) {
        if resource.owner_refs().is_disjoint(principal.linked_entity_ids()) {
            return Decision::Deny(DenyReason::OwnershipFailure);
        }
    }

    Decision::Allow
}
