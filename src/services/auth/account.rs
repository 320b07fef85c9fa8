use std::sync::Arc;

use tracing::{info, warn};

use crate::error::AppError;
use crate::repos::{NewUser, UserRepo};
use crate::services::auth::identity::{Identity, UserRole};
use crate::services::auth::password::{hash_password, verify_password};
use crate::services::auth::token_codec::TokenCodec;

const BEARER_PREFIX: &str = "Bearer ";

/// Token handed back by signup/signin, already carrying the `Bearer ` prefix
/// so clients can send it verbatim in `Authorization`.
#[derive(Clone, Debug)]
pub struct IssuedToken {
    pub bearer_token: String,
    pub identity: Identity,
}

/// Orchestrates user lookup/creation and token issuance.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepo>,
    codec: Arc<TokenCodec>,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserRepo>, codec: Arc<TokenCodec>) -> Self {
        Self { users, codec }
    }

    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> Result<IssuedToken, AppError> {
        let row = self
            .users
            .insert(NewUser {
                email: email.to_string(),
                password_hash: hash_password(password),
                role,
            })
            .await?;

        info!(user_id = row.id, role = %row.role, "user signed up");
        self.issue(row.identity())
    }

    pub async fn signin(&self, email: &str, password: &str) -> Result<IssuedToken, AppError> {
        let row = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AppError::Unauthorized("invalid email or password"))?;

        if !verify_password(password, &row.password_hash) {
            warn!(user_id = row.id, "signin rejected: password mismatch");
            return Err(AppError::Unauthorized("invalid email or password"));
        }

        self.issue(row.identity())
    }

    fn issue(&self, identity: Identity) -> Result<IssuedToken, AppError> {
        let token = self.codec.issue(&identity)?;
        Ok(IssuedToken {
            bearer_token: format!("{BEARER_PREFIX}{token}"),
            identity,
        })
    }
}
