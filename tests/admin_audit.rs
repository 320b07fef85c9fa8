mod common;

use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    body::Body,
    extract::Path,
    http::{Method, Request, StatusCode},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use todo_gate::api::v1::extractors::RequestContext;
use todo_gate::api::v1::registry::{RouteDecl, RouteRegistry};
use todo_gate::repos::InMemoryUserRepo;
use todo_gate::services::audit::{AuditPhase, MemoryAuditSink};
use todo_gate::services::auth::{Identity, UserRole};

use common::{error_code, test_app};

fn summary(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap()
}

#[tokio::test]
async fn successful_admin_call_records_request_and_response() {
    let app = test_app();
    let target = app.seed_user("target@b.com", UserRole::User).await;
    let admin = app.bearer(7, "root@b.com", UserRole::Admin);
    let uri = format!("/api/v1/admin/users/{target}/role");

    let (status, body) = app
        .send(Method::PATCH, &uri, Some(&admin), Some(json!({"role": "admin"})))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], target);
    assert_eq!(body["role"], "ADMIN");

    let entries = app.audit.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].phase, AuditPhase::Request);
    assert_eq!(
        summary(&entries[0].summary),
        json!({"params": {"user_id": target.to_string()}, "body": {"role": "admin"}})
    );
    assert_eq!(entries[1].phase, AuditPhase::Response);
    assert_eq!(
        summary(&entries[1].summary),
        json!({"id": target, "email": "target@b.com", "role": "ADMIN"})
    );
    for entry in &entries {
        assert_eq!(entry.user_id, 7);
        assert_eq!(entry.route, uri);
    }
}

#[tokio::test]
async fn failing_admin_call_records_request_and_error_and_keeps_the_error() {
    let app = test_app();
    let admin = app.bearer(7, "root@b.com", UserRole::Admin);

    let (status, body) = app
        .send(Method::DELETE, "/api/v1/admin/users/999", Some(&admin), None)
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "NOT_FOUND");

    let entries = app.audit.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].phase, AuditPhase::Request);
    assert_eq!(
        summary(&entries[0].summary),
        json!({"params": {"user_id": "999"}, "body": null})
    );
    assert_eq!(entries[1].phase, AuditPhase::Error);
    assert_eq!(entries[1].summary, "user not found.");
}

#[tokio::test]
async fn delete_removes_the_user() {
    let app = test_app();
    let target = app.seed_user("target@b.com", UserRole::User).await;
    let admin = app.bearer(7, "root@b.com", UserRole::Admin);

    let (status, body) = app
        .send(
            Method::DELETE,
            &format!("/api/v1/admin/users/{target}"),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, _) = app
        .send(Method::GET, &format!("/api/v1/users/{target}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let phases: Vec<_> = app.audit.entries().iter().map(|e| e.phase).collect();
    assert_eq!(phases, [AuditPhase::Request, AuditPhase::Response]);
}

#[tokio::test]
async fn identity_headers_cannot_escalate_a_user() {
    let app = test_app();
    let target = app.seed_user("target@b.com", UserRole::User).await;
    let user = app.bearer(3, "plain@b.com", UserRole::User);

    let req = Request::builder()
        .method(Method::DELETE)
        .uri(format!("/api/v1/admin/users/{target}"))
        .header("authorization", user)
        .header("User-Role", "ADMIN")
        .header("User-Id", "7")
        .body(Body::empty())
        .unwrap();

    let res = app.router.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert!(app.audit.entries().is_empty());
}

#[tokio::test]
async fn invalid_role_is_audited_as_an_error() {
    let app = test_app();
    let target = app.seed_user("target@b.com", UserRole::User).await;
    let admin = app.bearer(7, "root@b.com", UserRole::Admin);

    let (status, body) = app
        .send(
            Method::PATCH,
            &format!("/api/v1/admin/users/{target}/role"),
            Some(&admin),
            Some(json!({"role": "superuser"})),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "INVALID_ROLE");

    let entries = app.audit.entries();
    let phases: Vec<_> = entries.iter().map(|e| e.phase).collect();
    assert_eq!(phases, [AuditPhase::Request, AuditPhase::Error]);
    assert_eq!(entries[1].summary, "unknown user role: superuser");
}

// A handler with no audit code of its own, on an audited admin route.
async fn remove_comment(Path(id): Path<i64>) -> Json<Value> {
    Json(json!({"deleted": id}))
}

// The access filter is left out; the caller's context is injected directly.
fn comment_admin(caller: Identity) -> (Router, Arc<MemoryAuditSink>) {
    let audit = Arc::new(MemoryAuditSink::new());
    let state = common::state(
        common::codec(),
        Arc::new(InMemoryUserRepo::new()),
        audit.clone(),
    );

    let router = RouteRegistry::new(state.routes.clone(), state.audit.clone())
        .register(
            RouteDecl::delete("/admin/comments/{id}").audited(),
            remove_comment,
        )
        .unwrap()
        .into_router()
        .layer(Extension(RequestContext::authenticated(caller)))
        .with_state(state);
    (router, audit)
}

fn delete_comment(id: i64) -> Request<Body> {
    Request::builder()
        .method(Method::DELETE)
        .uri(format!("/admin/comments/{id}"))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn audited_plain_handler_is_recorded_for_admins() {
    let (router, audit) = comment_admin(Identity::new(7, "root@b.com", UserRole::Admin));

    let res = router.oneshot(delete_comment(5)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let entries = audit.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].phase, AuditPhase::Request);
    assert_eq!(
        summary(&entries[0].summary),
        json!({"params": {"id": "5"}, "body": null})
    );
    assert_eq!(entries[1].phase, AuditPhase::Response);
    assert_eq!(summary(&entries[1].summary), json!({"deleted": 5}));
    assert_eq!(entries[0].route, "/admin/comments/5");
    assert_eq!(entries[0].user_id, 7);
}

#[tokio::test]
async fn audited_plain_handler_rechecks_the_role() {
    let (router, audit) = comment_admin(Identity::new(3, "plain@b.com", UserRole::User));

    let res = router.oneshot(delete_comment(5)).await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert!(audit.entries().is_empty());
}
