//! `campus-audit` — append-only audit trail for access decisions.
//!
//! Every state-changing decision (Allow *and* Deny) produces exactly one
//! [`AuditEntry`], sequence-stamped at decision time. Losing an audit write
//! is a degraded-mode condition, never a failure of the guarded operation.

pub mod entry;
pub mod recorder;
pub mod sink;

pub use entry::AuditEntry;
pub use recorder::AccessRecorder;
pub use sink::{AuditError, AuditSink, InMemoryAuditSink, TracingAuditSink};
