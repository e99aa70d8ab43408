//! Decision recording at the controller boundary.
//!
//! Controllers call [`AccessRecorder::decide_recorded`] on every mutation
//! path (and on any read they choose to audit), and
//! [`AccessRecorder::scope_recorded`] when computing a collection scope.
//! Plain reads that need no trail can keep calling [`campus_authz::decide`]
//! directly.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

use campus_authz::{
    Action, Decision, DenyReason, Outcome, Principal, PolicyTable, ResourceDescriptor,
    ResourceFilter, ResourceKind, decide, scope_for,
};

use crate::{entry::AuditEntry, sink::AuditSink};

/// Combines the pure evaluator with the audit sink and stamps each entry
/// with a strictly increasing sequence number at decision time — entry order
/// reflects decision order even when the sink commits out of order.
#[derive(Debug)]
pub struct AccessRecorder<S> {
    sink: S,
    seq: AtomicU64,
}

impl<S: AuditSink> AccessRecorder<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            seq: AtomicU64::new(0),
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn next_seq(&self) -> u64 {
        // Uniqueness and per-thread monotonicity are all ordering needs;
        // a principal's sequential actions run on one request path.
        self.seq.fetch_add(1, Ordering::Relaxed)
    }

    fn write(&self, entry: AuditEntry) {
        if let Err(error) = self.sink.record(entry) {
            // Degraded mode: the business operation proceeds, operations
            // gets alerted through the error log.
            tracing::error!(%error, "audit write failed; continuing without trail");
        }
    }

    /// Decide and append exactly one entry, whatever the outcome.
    pub fn decide_recorded(
        &self,
        table: &PolicyTable,
        principal: &Principal,
        action: Action,
        resource: &ResourceDescriptor,
    ) -> Decision {
        let decision = decide(table, principal, action, resource);
        let seq = self.next_seq();

        if decision.reason() == Some(DenyReason::NoMatchingPolicy) {
            // Louder than an ordinary deny: this is a missing config entry.
            tracing::warn!(
                role = %principal.role(),
                kind = %resource.kind(),
                action = %action,
                "denied with no matching policy rule"
            );
        }

        self.write(AuditEntry {
            seq,
            principal_id: principal.id(),
            tenant_id: Some(resource.tenant_id()),
            action,
            resource_kind: resource.kind(),
            resource_id: Some(resource.id()),
            outcome: decision.outcome(),
            reason: decision.reason().map(|r| r.as_str().to_string()),
            recorded_at: Utc::now(),
        });

        decision
    }

    /// Compute a collection scope; super-admin access is recorded because
    /// the tenant bypass must always leave a trail.
    pub fn scope_recorded(
        &self,
        table: &PolicyTable,
        principal: &Principal,
        kind: ResourceKind,
    ) -> ResourceFilter {
        let filter = scope_for(table, principal, kind);

        if principal.role().is_super_admin() {
            let seq = self.next_seq();
            self.write(AuditEntry {
                seq,
                principal_id: principal.id(),
                tenant_id: principal.tenant_id(),
                action: Action::Read,
                resource_kind: kind,
                resource_id: None,
                outcome: Outcome::Allow,
                reason: None,
                recorded_at: Utc::now(),
            });
        }

        filter
    }
}
