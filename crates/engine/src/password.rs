//! Password hashing (argon2, PHC string format).

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::{EngineError, ResultEngine};

pub fn hash_password(password: &str) -> ResultEngine<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| EngineError::Password(format!("hashing failed: {err}")))
}

/// Returns `Ok(false)` on a wrong password, `Err` only if `hashed` is not a
/// valid PHC string.
pub fn check_password(password: &str, hashed: &str) -> ResultEngine<bool> {
    let parsed = PasswordHash::new(hashed)
        .map_err(|err| EngineError::Password(format!("invalid hash format: {err}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_check() {
        let hashed = hash_password("secret123").unwrap();
        assert_ne!(hashed, "secret123");
        assert!(check_password("secret123", &hashed).unwrap());
        assert!(!check_password("wrong", &hashed).unwrap());
    }

    #[test]
    fn same_password_gets_different_salts() {
        let a = hash_password("secret123").unwrap();
        let b = hash_password("secret123").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(matches!(
            check_password("secret123", "not-a-phc-string"),
            Err(EngineError::Password(_))
        ));
    }
}
