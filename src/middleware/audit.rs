//! Admin audit wrapper, composed onto audited routes by `RouteRegistry`.
//!
//! Per request:
//! - read the verified identity from `RequestContext` (never from headers)
//! - buffer the request body and summarize path params + body as the input
//! - `AdminAudit::run` re-checks the role, records request / response / error
//! - the handler's response is returned as-is, success or failure
//!
//! Handlers behind this layer contain no audit code.

use std::collections::BTreeMap;
use std::fmt;

use axum::{
    body::{Body, Bytes, to_bytes},
    extract::{FromRequestParts, OriginalUri, RawPathParams, Request, State},
    http::{HeaderMap, response},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::MethodRouter,
};
use serde::{Serialize, Serializer};
use serde_json::Value;
use tracing::warn;

use crate::api::v1::extractors::RequestContext;
use crate::error::AppError;
use crate::services::audit::{AdminAudit, AuditRejection, AuditScope};
use crate::services::auth::Identity;
use crate::state::AppState;

const USER_ID_HEADER: &str = "user-id";
const USER_ROLE_HEADER: &str = "user-role";

#[derive(Clone)]
struct AuditBinding {
    audit: AdminAudit,
    scope: AuditScope,
}

/// Wrap `route` so every call goes through `audit` under `scope`.
pub fn wrap(
    route: MethodRouter<AppState>,
    audit: AdminAudit,
    scope: AuditScope,
) -> MethodRouter<AppState> {
    route.layer(middleware::from_fn_with_state(
        AuditBinding { audit, scope },
        audit_middleware,
    ))
}

#[derive(Debug, Serialize)]
struct AuditedInput {
    params: BTreeMap<String, String>,
    body: Value,
}

/// A successful response, buffered so its body can be summarized.
struct Captured {
    head: response::Parts,
    body: Bytes,
}

impl Serialize for Captured {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        summarize_body(&self.body).serialize(serializer)
    }
}

impl IntoResponse for Captured {
    fn into_response(self) -> Response {
        Response::from_parts(self.head, Body::from(self.body))
    }
}

/// A failed call: the response goes back to the client untouched, `message`
/// goes to the audit record.
struct Failure {
    response: Response,
    message: String,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<AuditRejection> for Failure {
    fn from(rejection: AuditRejection) -> Self {
        Self {
            message: rejection.to_string(),
            response: AppError::from(rejection).into_response(),
        }
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        self.response
    }
}

async fn audit_middleware(
    State(binding): State<AuditBinding>,
    req: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = req.into_parts();

    let route = parts
        .extensions
        .get::<OriginalUri>()
        .map(|uri| uri.path().to_string())
        .unwrap_or_else(|| parts.uri.path().to_string());
    let identity = parts
        .extensions
        .get::<RequestContext>()
        .and_then(RequestContext::identity)
        .cloned();

    if let Some(identity) = &identity {
        flag_header_divergence(&parts.headers, identity, &route);
    }

    let params = match RawPathParams::from_request_parts(&mut parts, &()).await {
        Ok(raw) => raw
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        Err(_) => BTreeMap::new(),
    };

    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(target: "admin_audit", route = %route, error = %err, "failed to read audited request body");
            return AppError::bad_request("UNREADABLE_BODY", "request body could not be read")
                .into_response();
        }
    };

    let input = AuditedInput {
        params,
        body: summarize_body(&bytes),
    };
    let req = Request::from_parts(parts, Body::from(bytes));

    let outcome = binding
        .audit
        .run(
            &binding.scope,
            &route,
            identity.as_ref(),
            &input,
            || async move { capture(next.run(req).await).await },
        )
        .await;

    match outcome {
        Ok(captured) => captured.into_response(),
        Err(failure) => failure.into_response(),
    }
}

async fn capture(res: Response) -> Result<Captured, Failure> {
    let (head, body) = res.into_parts();
    let body = match to_bytes(body, usize::MAX).await {
        Ok(body) => body,
        Err(err) => {
            return Err(Failure {
                message: format!("response body could not be read: {err}"),
                response: AppError::Internal.into_response(),
            });
        }
    };

    if head.status.is_client_error() || head.status.is_server_error() {
        let message = error_message(&body).unwrap_or_else(|| head.status.to_string());
        return Err(Failure {
            message,
            response: Response::from_parts(head, Body::from(body)),
        });
    }

    Ok(Captured { head, body })
}

// JSON bodies are kept as JSON, anything else as (lossy) text.
fn summarize_body(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

// `{"error": {"message": ..}}`, as rendered by `AppError`.
fn error_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    value["error"]["message"].as_str().map(str::to_string)
}

// Legacy clients send User-Id / User-Role. They are never trusted; a mismatch with
// the verified identity is only reported.
fn flag_header_divergence(headers: &HeaderMap, identity: &Identity, route: &str) -> bool {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    let id_diverges = header(USER_ID_HEADER)
        .is_some_and(|v| v.trim().parse::<i64>().ok() != Some(identity.user_id()));
    let role_diverges = header(USER_ROLE_HEADER)
        .is_some_and(|v| !v.trim().eq_ignore_ascii_case(identity.role().as_str()));

    if id_diverges || role_diverges {
        warn!(
            target: "admin_audit",
            route,
            user_id = identity.user_id(),
            header_user_id = header(USER_ID_HEADER),
            header_user_role = header(USER_ROLE_HEADER),
            "identity headers diverge from verified token; headers ignored"
        );
    }
    id_diverges || role_diverges
}
