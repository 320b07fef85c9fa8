//! Admin operation audit wrapper.
//!
//! `AdminAudit::run` re-checks the caller's role independently of the route-level
//! check in the auth middleware, records request / response / error through the
//! configured `AuditSink`, and hands the wrapped operation's result or error back
//! untouched.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::warn;

use crate::services::audit::sink::{AuditEntry, AuditPhase, AuditSink};
use crate::services::auth::identity::{Identity, UserRole};

const UNSERIALIZABLE: &str = "<unserializable>";

/// Capability requirement composed onto an audited route at registration time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditScope {
    pattern: &'static str,
    required_role: UserRole,
}

impl AuditScope {
    pub fn admin(pattern: &'static str) -> Self {
        Self {
            pattern,
            required_role: UserRole::Admin,
        }
    }

    pub fn pattern(&self) -> &'static str {
        self.pattern
    }

    pub fn required_role(&self) -> UserRole {
        self.required_role
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuditRejection {
    #[error("admin privileges required")]
    Forbidden,
}

#[derive(Clone)]
pub struct AdminAudit {
    sink: Arc<dyn AuditSink>,
}

impl std::fmt::Debug for AdminAudit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminAudit").finish_non_exhaustive()
    }
}

impl AdminAudit {
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }

    /// Run `op` under audit.
    ///
    /// - `identity` must be present and hold `scope.required_role()`, otherwise
    ///   `AuditRejection::Forbidden` is returned and `op` never runs.
    /// - Summaries that fail to serialize are logged and replaced; they never
    ///   change what is returned.
    pub async fn run<I, O, E, F, Fut>(
        &self,
        scope: &AuditScope,
        route: &str,
        identity: Option<&Identity>,
        input: &I,
        op: F,
    ) -> Result<O, E>
    where
        I: Serialize + ?Sized,
        O: Serialize,
        E: Display + From<AuditRejection>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<O, E>>,
    {
        let caller = match identity {
            Some(id) if id.role() == scope.required_role() => id,
            other => {
                warn!(
                    target: "admin_audit",
                    route,
                    pattern = scope.pattern(),
                    user_id = other.map(Identity::user_id),
                    "admin api call rejected: insufficient role"
                );
                return Err(AuditRejection::Forbidden.into());
            }
        };

        self.emit(route, caller, AuditPhase::Request, summarize(input));

        match op().await {
            Ok(out) => {
                self.emit(route, caller, AuditPhase::Response, summarize(&out));
                Ok(out)
            }
            Err(err) => {
                self.emit(route, caller, AuditPhase::Error, err.to_string());
                Err(err)
            }
        }
    }

    fn emit(&self, route: &str, caller: &Identity, phase: AuditPhase, summary: String) {
        self.sink.record(&AuditEntry {
            timestamp: Utc::now(),
            route: route.to_string(),
            user_id: caller.user_id(),
            phase,
            summary,
        });
    }
}

fn summarize<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        warn!(target: "admin_audit", error = %e, "failed to serialize audit summary");
        UNSERIALIZABLE.to_string()
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::services::audit::sink::MemoryAuditSink;

    #[derive(Debug, PartialEq, thiserror::Error)]
    enum OpError {
        #[error("comment {0} does not exist")]
        Gone(i64),
        #[error("rejected")]
        Rejected,
    }

    impl From<AuditRejection> for OpError {
        fn from(_: AuditRejection) -> Self {
            OpError::Rejected
        }
    }

    fn setup() -> (AdminAudit, Arc<MemoryAuditSink>) {
        let sink = Arc::new(MemoryAuditSink::new());
        (AdminAudit::new(sink.clone()), sink)
    }

    fn admin() -> Identity {
        Identity::new(7, "admin@test.com", UserRole::Admin)
    }

    const ROUTE: &str = "/api/v1/admin/users/3/role";

    #[tokio::test]
    async fn success_records_request_then_response() {
        let (audit, sink) = setup();
        let scope = AuditScope::admin("/admin/users/{user_id}/role");

        let out: Result<serde_json::Value, OpError> = audit
            .run(&scope, ROUTE, Some(&admin()), &serde_json::json!({"role": "ADMIN"}), || async {
                Ok(serde_json::json!({"id": 3, "role": "ADMIN"}))
            })
            .await;
        assert_eq!(out, Ok(serde_json::json!({"id": 3, "role": "ADMIN"})));

        let entries = sink.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].phase, AuditPhase::Request);
        assert_eq!(entries[0].summary, r#"{"role":"ADMIN"}"#);
        assert_eq!(entries[1].phase, AuditPhase::Response);
        assert_eq!(entries[1].summary, r#"{"id":3,"role":"ADMIN"}"#);
        for entry in &entries {
            assert_eq!(entry.user_id, 7);
            assert_eq!(entry.route, ROUTE);
        }
    }

    #[tokio::test]
    async fn failure_records_request_then_error_and_returns_original_error() {
        let (audit, sink) = setup();
        let scope = AuditScope::admin("/admin/comments/{id}");

        let out: Result<(), OpError> = audit
            .run(&scope, ROUTE, Some(&admin()), &5i64, || async { Err(OpError::Gone(5)) })
            .await;
        assert_eq!(out, Err(OpError::Gone(5)));

        let entries = sink.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].phase, AuditPhase::Request);
        assert_eq!(entries[1].phase, AuditPhase::Error);
        assert_eq!(entries[1].summary, "comment 5 does not exist");
    }

    #[tokio::test]
    async fn non_admin_or_missing_identity_is_forbidden_without_running_op() {
        let (audit, sink) = setup();
        let scope = AuditScope::admin("/admin/users/{user_id}");
        let user = Identity::new(2, "user@test.com", UserRole::User);

        for identity in [Some(&user), None] {
            let ran = AtomicBool::new(false);
            let out: Result<(), OpError> = audit
                .run(&scope, ROUTE, identity, &(), || async {
                    ran.store(true, Ordering::SeqCst);
                    Ok(())
                })
                .await;
            assert_eq!(out, Err(OpError::Rejected));
            assert!(!ran.load(Ordering::SeqCst));
        }
        assert!(sink.entries().is_empty());
    }

    #[tokio::test]
    async fn unserializable_summaries_do_not_mask_the_result() {
        let (audit, sink) = setup();
        let scope = AuditScope::admin("/admin/stats");

        // serde_json refuses non-string map keys.
        let mut weird = HashMap::new();
        weird.insert((1, 2), "x");

        let out: Result<HashMap<(i32, i32), &str>, OpError> = audit
            .run(&scope, ROUTE, Some(&admin()), &weird, || async { Ok(weird.clone()) })
            .await;
        assert_eq!(out.unwrap().get(&(1, 2)), Some(&"x"));

        let entries = sink.entries();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.summary == UNSERIALIZABLE));
    }
}
