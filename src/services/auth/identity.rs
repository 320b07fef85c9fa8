/*
 * Responsibility
 * - 認証済み主体 (Identity) と Role の定義
 * - token claims / RequestContext / user store のすべてがこの型を共有する
 */
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown user role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for UserRole {
    type Err = UnknownRole;

    // Case-insensitive: signup bodies send "user" / "admin" as often as the canonical form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("USER") {
            Ok(Self::User)
        } else if s.eq_ignore_ascii_case("ADMIN") {
            Ok(Self::Admin)
        } else {
            Err(UnknownRole(s.to_string()))
        }
    }
}

/// A verified principal.
///
/// Built either by `TokenCodec::verify` (from signed claims) or by the account
/// service right after a successful signup/signin. Fields are private so an
/// `Identity` cannot be edited after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    user_id: i64,
    email: String,
    role: UserRole,
}

impl Identity {
    pub fn new(user_id: i64, email: impl Into<String>, role: UserRole) -> Self {
        Self {
            user_id,
            email: email.into(),
            role,
        }
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn role(&self) -> UserRole {
        self.role
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}
