/*
 * Responsibility
 * - signup / signin の request/response DTO
 * - 形式チェック用の validate()
 */
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::services::auth::UserRole;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub user_role: String,
}

impl SignupRequest {
    pub fn validate(&self) -> Result<UserRole, AppError> {
        validate_credentials(&self.email, &self.password)?;
        self.user_role
            .trim()
            .parse::<UserRole>()
            .map_err(|e| AppError::bad_request("INVALID_ROLE", e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

impl SigninRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_credentials(&self.email, &self.password)
    }
}

fn validate_credentials(email: &str, password: &str) -> Result<(), AppError> {
    if email.trim().is_empty() || !email.contains('@') {
        return Err(AppError::bad_request(
            "VALIDATION_FAILED",
            "email must be a valid address",
        ));
    }
    if password.is_empty() {
        return Err(AppError::bad_request(
            "VALIDATION_FAILED",
            "password is required",
        ));
    }
    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub bearer_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup(email: &str, password: &str, role: &str) -> SignupRequest {
        SignupRequest {
            email: email.into(),
            password: password.into(),
            user_role: role.into(),
        }
    }

    #[test]
    fn signup_role_is_case_insensitive() {
        assert_eq!(signup("a@b.com", "pw", "admin").validate().unwrap(), UserRole::Admin);
        assert_eq!(signup("a@b.com", "pw", " User ").validate().unwrap(), UserRole::User);
    }

    #[test]
    fn signup_rejects_unknown_role_and_bad_credentials() {
        for req in [
            signup("a@b.com", "pw", "root"),
            signup("not-an-email", "pw", "USER"),
            signup("a@b.com", "", "USER"),
        ] {
            let err = req.validate().unwrap_err();
            assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn signup_body_uses_camel_case() {
        let req: SignupRequest = serde_json::from_str(
            r#"{"email":"a@b.com","password":"pw","userRole":"ADMIN"}"#,
        )
        .unwrap();
        assert_eq!(req.user_role, "ADMIN");

        let body = serde_json::to_string(&TokenResponse {
            bearer_token: "Bearer x".into(),
        })
        .unwrap();
        assert_eq!(body, r#"{"bearerToken":"Bearer x"}"#);
    }
}
