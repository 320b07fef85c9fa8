use base64::Engine as _;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use sha2::{Digest, Sha256};
use uuid::Uuid;

// Stored form: "<salt>$<base64(sha256(salt || password))>"
pub fn hash_password(password: &str) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    format!("{}${}", salt, digest(&salt, password))
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    match stored.split_once('$') {
        Some((salt, expected)) => digest(salt, password) == expected,
        None => false,
    }
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    STANDARD_NO_PAD.encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_only_the_original_password() {
        let stored = hash_password("Aa123456");
        assert!(verify_password("Aa123456", &stored));
        assert!(!verify_password("Aa1234567", &stored));
        assert!(!verify_password("Aa123456", "no-separator"));
    }

    #[test]
    fn salts_each_hash() {
        assert_ne!(hash_password("same"), hash_password("same"));
    }
}
