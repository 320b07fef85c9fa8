//! Bearer token issue / verify (HS256 JWT).
//!
//! `issue_at` / `verify_at` take the clock reading explicitly; `issue` / `verify`
//! read the wall clock. There is no leeway: a token is expired as soon as
//! `now >= exp`.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::services::auth::identity::{Identity, UserRole};
use crate::services::auth::signing_key::SigningKey;

const TOKEN_TYP: &str = "JWT";
const TOKEN_ALG: &str = "HS256";

/// Why a presented token was refused. Exactly one kind per failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
    #[error("token algorithm or type is not supported")]
    Unsupported,
}

#[derive(Debug, thiserror::Error)]
pub enum IssueError {
    #[error("token ttl must be positive (got {0}s)")]
    InvalidTtl(i64),
    #[error("failed to sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// Claims carried by every token this codec issues.
#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
    // userId, as a decimal string (JWT `sub` is a string)
    sub: String,
    email: String,
    role: String,
    iat: i64,
    exp: i64,
}

// Only the fields needed to decide `Unsupported` before touching the signature.
#[derive(Debug, Deserialize)]
struct RawHeader {
    alg: String,
    #[serde(default)]
    typ: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExpiryPeek {
    #[serde(default)]
    exp: Option<i64>,
}

#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("TokenCodec")
            .field("ttl_seconds", &self.ttl.num_seconds())
            .finish()
    }
}

impl TokenCodec {
    /// `ttl` is the default lifetime used by `issue` / `issue_at`.
    pub fn new(key: &SigningKey, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked by `verify_at` against the caller's clock (strict, no leeway).
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(key.as_bytes()),
            decoding_key: DecodingKey::from_secret(key.as_bytes()),
            validation,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, identity: &Identity) -> Result<String, IssueError> {
        self.issue_at(identity, self.ttl, Utc::now())
    }

    pub fn issue_at(
        &self,
        identity: &Identity,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, IssueError> {
        if ttl <= Duration::zero() {
            return Err(IssueError::InvalidTtl(ttl.num_seconds()));
        }

        let issued_at = now.timestamp();
        let claims = TokenClaims {
            sub: identity.user_id().to_string(),
            email: identity.email().to_string(),
            role: identity.role().as_str().to_string(),
            iat: issued_at,
            exp: issued_at + ttl.num_seconds(),
        };

        let mut header = Header::new(Algorithm::HS256);
        header.typ = Some(TOKEN_TYP.to_string());
        jsonwebtoken::encode(&header, &claims, &self.encoding_key).map_err(|e| {
            error!(error = %e, "failed to sign token");
            IssueError::Signing(e)
        })
    }

    pub fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Structure → algorithm/type → expiry → signature → claims.
    ///
    /// Expiry is read before the signature is checked: a token past `exp` is
    /// `Expired` whether or not its signature holds. Nothing else from the
    /// payload is used until the signature has been verified.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, TokenError> {
        let (payload, signature) = check_structure(token)?;

        if let Some(exp) = peek_expiry(payload)?
            && now.timestamp() >= exp
        {
            return Err(TokenError::Expired);
        }

        // Header and payload are well-formed from here on, so a signature that
        // is not even base64url is a bad signature, not a malformed token.
        if URL_SAFE_NO_PAD.decode(signature).is_err() {
            return Err(TokenError::InvalidSignature);
        }

        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| classify(e.kind()))?;
        let claims = data.claims;

        let user_id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| TokenError::Malformed)?;
        let role = claims
            .role
            .parse::<UserRole>()
            .map_err(|_| TokenError::Malformed)?;

        Ok(Identity::new(user_id, claims.email, role))
    }
}

/// Returns the (still undecoded) payload segment.
// Returns the payload and signature segments.
fn check_structure(token: &str) -> Result<(&str, &str), TokenError> {
    let mut segments = token.split('.');
    let (Some(header), Some(payload), Some(signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(TokenError::Malformed);
    };

    let raw = URL_SAFE_NO_PAD
        .decode(header)
        .map_err(|_| TokenError::Malformed)?;
    let header: RawHeader = serde_json::from_slice(&raw).map_err(|_| TokenError::Malformed)?;

    if header.alg != TOKEN_ALG {
        return Err(TokenError::Unsupported);
    }
    if let Some(typ) = header.typ.as_deref()
        && !typ.eq_ignore_ascii_case(TOKEN_TYP)
    {
        return Err(TokenError::Unsupported);
    }

    Ok((payload, signature))
}

// A missing `exp` is left for the signed-claims check to reject.
fn peek_expiry(payload: &str) -> Result<Option<i64>, TokenError> {
    let raw = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| TokenError::Malformed)?;
    let peek: ExpiryPeek = serde_json::from_slice(&raw).map_err(|_| TokenError::Malformed)?;
    Ok(peek.exp)
}

fn classify(kind: &ErrorKind) -> TokenError {
    match kind {
        ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => TokenError::Unsupported,
        _ => TokenError::Malformed,
    }
}
