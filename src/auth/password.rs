use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

/// Salted argon2id hash in PHC string form, stored in `usuarios.password`.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("argon2 hash failed: {e}"))?
        .to_string();
    Ok(hash)
}

/// `Ok(false)` on mismatch (login answers 401); `Err` only when the stored
/// column is not a PHC string (login answers 500).
pub fn verify_password(plain: &str, stored: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(stored).map_err(|e| {
        error!(error = %e, "stored password is not a PHC string");
        anyhow::anyhow!("unreadable password hash: {e}")
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_hash_never_contains_the_password() {
        let hash = hash_password("Firulais#2024").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("Firulais"));
        assert!(verify_password("Firulais#2024", &hash).unwrap());
    }

    #[test]
    fn owners_sharing_a_password_get_distinct_hashes() {
        let ana = hash_password("perrito123").unwrap();
        let beto = hash_password("perrito123").unwrap();
        assert_ne!(ana, beto);
        assert!(verify_password("perrito123", &ana).unwrap());
        assert!(verify_password("perrito123", &beto).unwrap());
    }

    #[test]
    fn non_ascii_passwords_verify_exactly() {
        let hash = hash_password("contraseña-ñandú").unwrap();
        assert!(verify_password("contraseña-ñandú", &hash).unwrap());
        assert!(!verify_password("contrasena-nandu", &hash).unwrap());
    }

    #[test]
    fn wrong_password_is_a_mismatch_not_an_error() {
        let hash = hash_password("michi").unwrap();
        assert!(!verify_password("Michi", &hash).unwrap());
        assert!(!verify_password("", &hash).unwrap());
    }

    #[test]
    fn plaintext_column_is_an_error() {
        assert!(verify_password("secret1", "secret1").is_err());
    }
}
