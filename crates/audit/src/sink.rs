//! Audit sink contract and the built-in sinks.

use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::entry::AuditEntry;

#[derive(Debug, Error)]
pub enum AuditError {
    /// The sink could not accept the entry (storage down, lock poisoned).
    #[error("audit sink unavailable: {0}")]
    Unavailable(String),
}

/// Append-only, best-effort-durable audit sink.
///
/// A failed write must not roll back the mutation it describes; the
/// recorder surfaces failures to the operational log instead.
pub trait AuditSink: Send + Sync {
    fn record(&self, entry: AuditEntry) -> Result<(), AuditError>;
}

impl<S> AuditSink for Arc<S>
where
    S: AuditSink + ?Sized,
{
    fn record(&self, entry: AuditEntry) -> Result<(), AuditError> {
        (**self).record(entry)
    }
}

/// In-memory sink for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryAuditSink {
    entries: Mutex<Vec<AuditEntry>>,
}

impl InMemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&self, entry: AuditEntry) -> Result<(), AuditError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| AuditError::Unavailable("entry log lock poisoned".into()))?;
        entries.push(entry);
        Ok(())
    }
}

/// Sink that emits entries as structured `tracing` events.
///
/// Deployments without a dedicated audit store still get a reviewable
/// operational stream this way.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl TracingAuditSink {
    pub fn new() -> Self {
        Self
    }
}

impl AuditSink for TracingAuditSink {
    fn record(&self, entry: AuditEntry) -> Result<(), AuditError> {
        tracing::info!(
            target: "campus_audit",
            seq = entry.seq,
            principal_id = %entry.principal_id,
            tenant_id = ?entry.tenant_id,
            action = %entry.action,
            resource_kind = %entry.resource_kind,
            resource_id = ?entry.resource_id,
            outcome = ?entry.outcome,
            reason = ?entry.reason,
            "access decision"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_authz::{Action, Outcome, ResourceKind};
    use campus_core::{PrincipalId, ResourceId, TenantId};
    use chrono::Utc;

    fn entry(seq: u64) -> AuditEntry {
        AuditEntry {
            seq,
            principal_id: PrincipalId::new(),
            tenant_id: Some(TenantId::new()),
            action: Action::Update,
            resource_kind: ResourceKind::Fee,
            resource_id: Some(ResourceId::new()),
            outcome: Outcome::Allow,
            reason: None,
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn in_memory_sink_appends_in_order() {
        let sink = InMemoryAuditSink::new();
        sink.record(entry(0)).unwrap();
        sink.record(entry(1)).unwrap();

        let entries = sink.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].seq, 0);
        assert_eq!(entries[1].seq, 1);
    }

    #[test]
    fn sink_works_through_arc() {
        let sink = Arc::new(InMemoryAuditSink::new());
        sink.record(entry(0)).unwrap();
        assert_eq!(sink.len(), 1);
    }
}
