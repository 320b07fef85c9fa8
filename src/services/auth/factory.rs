/// Factory: build the process-wide `TokenCodec` from application `Config`.
use std::sync::Arc;

use chrono::Duration;
use tracing::warn;

use crate::config::Config;
use crate::services::auth::signing_key::{SigningKey, SigningKeyError};
use crate::services::auth::token_codec::TokenCodec;

#[derive(Debug, thiserror::Error)]
pub enum CodecBuildError {
    #[error(transparent)]
    Key(#[from] SigningKeyError),
    #[error("access token ttl out of range: {0}s")]
    InvalidTtl(i64),
}

pub fn build_token_codec(config: &Config) -> Result<Arc<TokenCodec>, CodecBuildError> {
    let ttl = Duration::try_seconds(config.access_token_ttl_seconds)
        .filter(|ttl| *ttl > Duration::zero())
        .ok_or(CodecBuildError::InvalidTtl(config.access_token_ttl_seconds))?;

    let key = match config.jwt_secret_key.as_deref() {
        Some(encoded) => SigningKey::from_base64(encoded)?,
        None => {
            // Config::from_env refuses this in production.
            warn!("JWT_SECRET_KEY is not set; generated an ephemeral signing key");
            SigningKey::generate()?
        }
    };

    Ok(Arc::new(TokenCodec::new(&key, ttl)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppEnv;

    fn config(ttl: i64) -> Config {
        Config {
            addr: "127.0.0.1:3000".parse().unwrap(),
            app_env: AppEnv::Development,
            cors_allowed_origins: vec![],
            jwt_secret_key: None,
            access_token_ttl_seconds: ttl,
            http_body_limit_bytes: 1024,
            http_timeout_seconds: 30,
        }
    }

    #[test]
    fn codec_uses_the_configured_ttl() {
        let codec = build_token_codec(&config(900)).unwrap();
        assert_eq!(codec.ttl(), Duration::minutes(15));
    }

    #[test]
    fn out_of_range_ttl_is_an_error() {
        for ttl in [i64::MAX, i64::MIN, 0, -1] {
            assert!(
                matches!(
                    build_token_codec(&config(ttl)),
                    Err(CodecBuildError::InvalidTtl(t)) if t == ttl
                ),
                "{ttl} was accepted"
            );
        }
    }
}
