use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// Minimum HMAC-SHA256 key length (bytes).
pub const MIN_KEY_LEN: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum SigningKeyError {
    #[error("signing key is not valid base64")]
    InvalidBase64(#[from] base64::DecodeError),
    #[error("signing key must be at least {MIN_KEY_LEN} bytes (got {0})")]
    TooShort(usize),
    #[error("os rng unavailable: {0}")]
    Rng(String),
}

/// Process-wide HMAC secret.
///
/// Built once at startup and handed to `TokenCodec`; never mutated afterwards.
#[derive(Clone)]
pub struct SigningKey {
    bytes: Vec<u8>,
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("SigningKey")
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl SigningKey {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, SigningKeyError> {
        if bytes.len() < MIN_KEY_LEN {
            return Err(SigningKeyError::TooShort(bytes.len()));
        }
        Ok(Self { bytes })
    }

    /// `encoded` is standard base64 (padding allowed), as stored in `JWT_SECRET_KEY`.
    pub fn from_base64(encoded: &str) -> Result<Self, SigningKeyError> {
        let bytes = STANDARD.decode(encoded.trim())?;
        Self::from_bytes(bytes)
    }

    /// Random key for development runs without a configured secret.
    /// Tokens do not survive a restart.
    pub fn generate() -> Result<Self, SigningKeyError> {
        let mut bytes = vec![0u8; 64];
        getrandom::fill(&mut bytes).map_err(|e| SigningKeyError::Rng(e.to_string()))?;
        Self::from_bytes(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}
