/*
 * Responsibility
 * - /admin 系 handler (AdminOnly)
 * - audit は RouteRegistry が登録時に包むので、ここには audit の処理は書かない
 */
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::info;

use crate::{
    api::v1::{
        dto::users::{ChangeRoleRequest, UserResponse},
        extractors::CurrentIdentity,
    },
    error::AppError,
    state::AppState,
};

pub async fn change_role(
    State(state): State<AppState>,
    CurrentIdentity(admin): CurrentIdentity,
    Path(user_id): Path<i64>,
    Json(req): Json<ChangeRoleRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let role = req.validate()?;
    let updated = state.users.change_role(user_id, role).await?;

    info!(admin_id = admin.user_id(), user_id, role = %role, "role changed by admin");
    Ok(Json(UserResponse::from(updated)))
}

pub async fn delete_user(
    State(state): State<AppState>,
    CurrentIdentity(admin): CurrentIdentity,
    Path(user_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.users.delete(user_id).await?;

    info!(admin_id = admin.user_id(), user_id, "user deleted by admin");
    Ok(StatusCode::NO_CONTENT)
}
