use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

/// Hash a plaintext password with argon2id and a per-password random salt.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "password hashing failed");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

/// Check a plaintext candidate against a stored PHC-format hash. A wrong
/// password is Ok(false); a hash that does not parse is an error.
pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "stored password hash is not valid PHC");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_hash_accepts_the_original_password() {
        let hash = hash_password("tr0ca-estoque-2024").unwrap();
        assert!(verify_password("tr0ca-estoque-2024", &hash).unwrap());
    }

    #[test]
    fn near_miss_password_is_rejected() {
        let hash = hash_password("tr0ca-estoque-2024").unwrap();
        assert!(!verify_password("tr0ca-estoque-2025", &hash).unwrap());
    }

    #[test]
    fn equal_passwords_still_get_distinct_hashes() {
        let first = hash_password("repetida").unwrap();
        let second = hash_password("repetida").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn garbage_in_the_hash_column_is_an_error_not_a_mismatch() {
        assert!(verify_password("whatever", "plaintext-leftover").is_err());
    }
}
