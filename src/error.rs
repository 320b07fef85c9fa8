/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error body)
 * - token / repo / issue error を統一的に変換
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::repos::error::RepoError;
use crate::services::audit::AuditRejection;
use crate::services::auth::token_codec::{IssueError, TokenError};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{code}: {message}")]
    BadRequest { code: &'static str, message: String },
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error("not found: {resource}")]
    NotFound { resource: &'static str },
    #[error("conflict: {0}")]
    Conflict(&'static str),

    // Authentication pipeline. Status/message pairs are fixed.
    #[error("JWT token is required.")]
    MissingToken,
    #[error("Malformed JWT token.")]
    MalformedToken,
    #[error("Unsupported JWT token.")]
    UnsupportedToken,
    #[error("Invalid JWT signature.")]
    InvalidSignature,
    #[error("Expired JWT token.")]
    ExpiredToken,
    #[error("Admin privileges required.")]
    Forbidden,
    #[error("Authenticated identity is missing from the request context.")]
    MissingContext,

    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. }
            | AppError::MissingToken
            | AppError::MalformedToken
            | AppError::UnsupportedToken => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) | AppError::InvalidSignature | AppError::ExpiredToken => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::MissingContext | AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::BadRequest { code, .. } => *code,
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::NotFound { .. } => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::MissingToken => "MISSING_TOKEN",
            AppError::MalformedToken => "MALFORMED_TOKEN",
            AppError::UnsupportedToken => "UNSUPPORTED_TOKEN",
            AppError::InvalidSignature => "INVALID_SIGNATURE",
            AppError::ExpiredToken => "EXPIRED_TOKEN",
            AppError::Forbidden => "FORBIDDEN",
            AppError::MissingContext => "MISSING_CONTEXT",
            AppError::Internal => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let message = match &self {
            AppError::BadRequest { message, .. } => message.clone(),
            AppError::NotFound { resource } => format!("{resource} not found."),
            other => other.to_string(),
        };

        let body = ErrorResponse {
            error: ErrorBody { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Malformed => AppError::MalformedToken,
            TokenError::Unsupported => AppError::UnsupportedToken,
            TokenError::InvalidSignature => AppError::InvalidSignature,
            TokenError::Expired => AppError::ExpiredToken,
        }
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Conflict(what) => AppError::Conflict(what),
        }
    }
}

impl From<AuditRejection> for AppError {
    fn from(e: AuditRejection) -> Self {
        match e {
            AuditRejection::Forbidden => AppError::Forbidden,
        }
    }
}

impl From<IssueError> for AppError {
    fn from(_: IssueError) -> Self {
        // Signing failures indicate server-side config / programming errors
        AppError::Internal
    }
}
