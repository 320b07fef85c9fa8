//! bearer token 検証 → RequestContext を extensions に入れる
//!
//! Per request:
//! - classify the route (Public / Protected / AdminOnly)
//! - Public: forward with an anonymous context, no token needed
//! - otherwise: `Authorization: Bearer <token>` → `TokenCodec::verify`
//!   → role gate for AdminOnly → bind the identity and forward
//!
//! Every rejection short-circuits with a fixed status/code (see `AppError`);
//! the downstream handler never runs.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};
use tracing::warn;

use crate::api::v1::extractors::RequestContext;
use crate::error::AppError;
use crate::middleware::auth::route_policy::RouteClass;
use crate::state::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// `/api/v1/*` に認証を掛けるための middleware を適用する。
///
/// 例：
/// ```ignore
/// let v1 = api::v1::router(&state)?;
/// let v1 = middleware::auth::access::apply(v1, state.clone());
/// app = app.nest("/api/v1", v1);
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let class = state.routes.classify(req.method(), req.uri().path());

    if class == RouteClass::Public {
        req.extensions_mut().insert(RequestContext::anonymous());
        return Ok(next.run(req).await);
    }

    let token = bearer_token(req.headers())?;

    let identity = match state.codec.verify(token) {
        Ok(identity) => identity,
        Err(err) => {
            warn!(
                error = ?err,
                path = %req.uri().path(),
                "access token verification failed"
            );
            return Err(err.into());
        }
    };

    if class == RouteClass::AdminOnly && !identity.is_admin() {
        warn!(
            user_id = identity.user_id(),
            path = %req.uri().path(),
            "admin route rejected: insufficient role"
        );
        return Err(AppError::Forbidden);
    }

    // middleware → extractor への受け渡し
    req.extensions_mut()
        .insert(RequestContext::authenticated(identity));

    Ok(next.run(req).await)
}

/// Exactly `Bearer <token>` with a single space. Absent header, non-UTF-8 value,
/// another scheme, an empty token or whitespace inside the token are all `MissingToken`.
fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix(BEARER_PREFIX))
        .ok_or(AppError::MissingToken)?;

    if token.is_empty() || token.contains(|c: char| c.is_ascii_whitespace()) {
        return Err(AppError::MissingToken);
    }
    Ok(token)
}
