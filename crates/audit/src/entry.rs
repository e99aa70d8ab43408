use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use campus_authz::{Action, Outcome, ResourceKind};
use campus_core::{PrincipalId, ResourceId, TenantId};

/// One audited access decision.
///
/// Entries are facts: immutable, append-only, never updated or deleted by
/// the application layer. `seq` is assigned at decision time, so entries for
/// one principal's sequential actions sort in decision order regardless of
/// when the sink's storage commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Strictly increasing, stamped when the decision was made.
    pub seq: u64,

    pub principal_id: PrincipalId,

    /// Tenant the resource belongs to (`None` only for cross-tenant
    /// super-admin collection access, which carries no single tenant).
    pub tenant_id: Option<TenantId>,

    pub action: Action,
    pub resource_kind: ResourceKind,

    /// `None` for collection-scope records.
    pub resource_id: Option<ResourceId>,

    pub outcome: Outcome,

    /// Deny reason text, for review tooling. `None` on Allow.
    pub reason: Option<String>,

    pub recorded_at: DateTime<Utc>,
}
