use std::sync::Mutex;

use chrono::{DateTime, Utc};
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditPhase {
    Request,
    Response,
    Error,
}

/// One admin-operation log record. Logged, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub route: String,
    pub user_id: i64,
    pub phase: AuditPhase,
    // request body / response body / error message, depending on `phase`
    pub summary: String,
}

/// Where audit records go. Called synchronously on the request task; no retry.
pub trait AuditSink: Send + Sync {
    fn record(&self, entry: &AuditEntry);
}

/// Default sink: structured `tracing` events on the `admin_audit` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, entry: &AuditEntry) {
        let timestamp = entry.timestamp.to_rfc3339();
        match entry.phase {
            AuditPhase::Request => info!(
                target: "admin_audit",
                %timestamp,
                route = %entry.route,
                user_id = entry.user_id,
                request_body = %entry.summary,
                "admin api request"
            ),
            AuditPhase::Response => info!(
                target: "admin_audit",
                %timestamp,
                route = %entry.route,
                user_id = entry.user_id,
                response_body = %entry.summary,
                "admin api response"
            ),
            AuditPhase::Error => error!(
                target: "admin_audit",
                %timestamp,
                route = %entry.route,
                user_id = entry.user_id,
                error = %entry.summary,
                "admin api error"
            ),
        }
    }
}

/// Keeps every record in memory. Useful for tests and local inspection.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, entry: &AuditEntry) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry.clone());
        }
    }
}
