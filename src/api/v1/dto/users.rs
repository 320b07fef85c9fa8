/*
 * Responsibility
 * - Users / admin 操作の request/response DTO
 * - validation (形式チェック) 用の validate()
 */
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::repos::UserRecord;
use crate::services::auth::{Identity, UserRole};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub role: UserRole,
}

impl From<UserRecord> for UserResponse {
    fn from(row: UserRecord) -> Self {
        Self {
            id: row.id,
            email: row.email,
            role: row.role,
        }
    }
}

impl From<&Identity> for UserResponse {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.user_id(),
            email: identity.email().to_string(),
            role: identity.role(),
        }
    }
}

// Not Serialize: passwords stay out of logs.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

impl ChangePasswordRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.old_password.is_empty() || self.new_password.is_empty() {
            return Err(AppError::bad_request(
                "VALIDATION_FAILED",
                "oldPassword and newPassword are required",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    pub role: String,
}

impl ChangeRoleRequest {
    pub fn validate(&self) -> Result<UserRole, AppError> {
        self.role
            .trim()
            .parse::<UserRole>()
            .map_err(|e| AppError::bad_request("INVALID_ROLE", e.to_string()))
    }
}
