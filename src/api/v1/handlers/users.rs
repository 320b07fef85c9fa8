/*
 * Responsibility
 * - /users 系 handler (Protected)
 * - 呼び出し元は CurrentIdentity で受け取る。header の自己申告は使わない
 */
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    api::v1::{
        dto::users::{ChangePasswordRequest, UserResponse},
        extractors::CurrentIdentity,
    },
    error::AppError,
    state::AppState,
};

pub async fn me(CurrentIdentity(identity): CurrentIdentity) -> Json<UserResponse> {
    Json(UserResponse::from(&identity))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserResponse>, AppError> {
    let row = state.users.get(user_id).await?;
    Ok(Json(row.into()))
}

pub async fn change_password(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<StatusCode, AppError> {
    req.validate()?;

    state
        .users
        .change_password(&identity, &req.old_password, &req.new_password)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
