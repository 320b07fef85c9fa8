pub mod interceptor;
pub mod sink;

pub use interceptor::{AdminAudit, AuditRejection, AuditScope};
pub use sink::{AuditEntry, AuditPhase, AuditSink, MemoryAuditSink, TracingAuditSink};
