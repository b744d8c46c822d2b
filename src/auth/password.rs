use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

/// Argon2id digest in PHC string form, salted with fresh OS randomness.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|digest| digest.to_string())
        .map_err(|e| {
            error!(error = %e, "password hashing failed");
            anyhow::anyhow!("hash password: {e}")
        })
}

/// `Ok(false)` on mismatch; `Err` only when the stored digest is unreadable.
pub fn verify_password(plain: &str, stored: &str) -> anyhow::Result<bool> {
    let digest = PasswordHash::new(stored).map_err(|e| {
        error!(error = %e, "stored password digest is malformed");
        anyhow::anyhow!("parse password digest: {e}")
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &digest)
        .is_ok())
}

/// Runs [`hash_password`] on the blocking pool.
pub async fn hash_password_blocking(plain: String) -> anyhow::Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&plain)).await?
}

/// Runs [`verify_password`] on the blocking pool.
pub async fn verify_password_blocking(plain: String, stored: String) -> anyhow::Result<bool> {
    tokio::task::spawn_blocking(move || verify_password(&plain, &stored)).await?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_digest_is_argon2id_and_hides_the_password() {
        let digest = hash_password("pw123").unwrap();
        assert!(digest.starts_with("$argon2id$"));
        assert!(!digest.contains("pw123"));
    }

    #[test]
    fn signup_password_verifies_and_others_do_not() {
        let digest = hash_password("pw123").unwrap();
        assert!(verify_password("pw123", &digest).unwrap());
        assert!(!verify_password("wrong", &digest).unwrap());
        assert!(!verify_password("", &digest).unwrap());
    }

    #[test]
    fn same_password_gets_a_fresh_salt_each_time() {
        let first = hash_password("old-pw").unwrap();
        let second = hash_password("old-pw").unwrap();
        assert_ne!(first, second);
        assert!(verify_password("old-pw", &first).unwrap());
        assert!(verify_password("old-pw", &second).unwrap());
    }

    #[test]
    fn unreadable_stored_digest_is_an_error_not_a_mismatch() {
        assert!(verify_password("pw123", "").is_err());
        assert!(verify_password("pw123", "plaintext-pw123").is_err());
    }

    #[tokio::test]
    async fn reset_replaces_which_password_verifies() {
        let old = hash_password_blocking("old-pw".into()).await.unwrap();
        let new = hash_password_blocking("new-pw".into()).await.unwrap();

        assert!(verify_password_blocking("new-pw".into(), new.clone()).await.unwrap());
        assert!(!verify_password_blocking("old-pw".into(), new).await.unwrap());
        assert!(verify_password_blocking("old-pw".into(), old).await.unwrap());
    }
}
