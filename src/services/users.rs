/*
 * Responsibility
 * - users 系の業務操作 (lookup / password 変更 / admin による role 変更・削除)
 * - 認可済み Identity を受け取る側。token や header は見ない
 */
use std::sync::Arc;

use tracing::info;

use crate::error::AppError;
use crate::repos::{UserRecord, UserRepo};
use crate::services::auth::identity::{Identity, UserRole};
use crate::services::auth::password::{hash_password, verify_password};

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepo>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepo>) -> Self {
        Self { users }
    }

    pub async fn get(&self, user_id: i64) -> Result<UserRecord, AppError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::not_found("user"))
    }

    pub async fn change_password(
        &self,
        caller: &Identity,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        let row = self.get(caller.user_id()).await?;

        if !verify_password(old_password, &row.password_hash) {
            return Err(AppError::bad_request(
                "PASSWORD_MISMATCH",
                "current password does not match",
            ));
        }
        if old_password == new_password {
            return Err(AppError::bad_request(
                "PASSWORD_UNCHANGED",
                "new password must differ from the current one",
            ));
        }

        self.users
            .update_password(row.id, hash_password(new_password))
            .await?
            .ok_or(AppError::not_found("user"))?;
        Ok(())
    }

    pub async fn change_role(&self, user_id: i64, role: UserRole) -> Result<UserRecord, AppError> {
        let row = self
            .users
            .update_role(user_id, role)
            .await?
            .ok_or(AppError::not_found("user"))?;

        info!(user_id, role = %role, "user role changed");
        Ok(row)
    }

    pub async fn delete(&self, user_id: i64) -> Result<(), AppError> {
        if self.users.delete(user_id).await? {
            Ok(())
        } else {
            Err(AppError::not_found("user"))
        }
    }
}
