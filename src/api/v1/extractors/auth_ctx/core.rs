use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tracing::error;

use crate::error::AppError;
use crate::services::auth::identity::Identity;

use super::RequestContext;

/// Handler で、認証済み Identity を受け取るための extractor
/// middleware が RequestContext を request.extensions() に insert 済みである前提
/// 見つからない場合は MissingContext (500) を返す（middleware 未設定・public route での誤用）
#[derive(Debug, Clone)]
pub struct CurrentIdentity(pub Identity);

impl<S> FromRequestParts<S> for CurrentIdentity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .and_then(RequestContext::identity)
            .cloned()
            .map(CurrentIdentity)
            .ok_or_else(|| {
                error!(path = %parts.uri.path(), "no verified identity bound to request");
                AppError::MissingContext
            })
    }
}
