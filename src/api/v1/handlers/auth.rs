/*
 * Responsibility
 * - POST /auth/signup, POST /auth/signin (Public)
 * - DTO validation → AccountService → "Bearer <jwt>" を返す
 */
use axum::{Json, extract::State, http::StatusCode};

use crate::{
    api::v1::dto::auth::{SigninRequest, SignupRequest, TokenResponse},
    error::AppError,
    state::AppState,
};

pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), AppError> {
    let role = req.validate()?;

    let issued = state
        .accounts
        .signup(req.email.trim(), &req.password, role)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(TokenResponse {
            bearer_token: issued.bearer_token,
        }),
    ))
}

pub async fn signin(
    State(state): State<AppState>,
    Json(req): Json<SigninRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    req.validate()?;

    let issued = state
        .accounts
        .signin(req.email.trim(), &req.password)
        .await?;

    Ok(Json(TokenResponse {
        bearer_token: issued.bearer_token,
    }))
}
