//! Argon2id credentials in PHC string form.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{Error as HashError, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use leavedesk_application::PasswordHasher as PasswordHasherPort;
use leavedesk_core::{AppError, AppResult};

/// Hashes with 19 MiB of memory, two passes and one lane.
///
/// Verification reads the cost from the stored hash, so raising these
/// values does not lock out existing users.
#[derive(Debug, Clone)]
pub struct Argon2PasswordHasher {
    params: Params,
}

impl Argon2PasswordHasher {
    /// Creates the hasher with the cost parameters above.
    #[must_use]
    pub fn new() -> Self {
        let params = Params::new(19 * 1024, 2, 1, None).unwrap_or_default();
        Self { params }
    }

    fn engine(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for Argon2PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasherPort for Argon2PasswordHasher {
    fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .engine()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|error| AppError::Internal(format!("password hashing failed: {error}")))?;

        Ok(hash.to_string())
    }

    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        let stored = PasswordHash::new(hash)
            .map_err(|error| AppError::Internal(format!("unreadable password hash: {error}")))?;

        match self.engine().verify_password(password.as_bytes(), &stored) {
            Ok(()) => Ok(true),
            Err(HashError::Password) => Ok(false),
            Err(error) => Err(AppError::Internal(format!(
                "password check failed: {error}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use leavedesk_application::PasswordHasher as PasswordHasherPort;

    use super::Argon2PasswordHasher;

    #[test]
    fn same_password_hashes_differently_but_verifies() {
        let hasher = Argon2PasswordHasher::new();
        let hash = |password: &str| {
            hasher
                .hash_password(password)
                .unwrap_or_else(|error| panic!("hashing failed: {error}"))
        };

        let first = hash("fortnight in Lisbon");
        let second = hash("fortnight in Lisbon");

        assert_ne!(first, second);
        assert!(first.starts_with("$argon2id$v=19$m=19456,t=2,p=1$"));
        assert!(matches!(hasher.verify_password("fortnight in Lisbon", &second), Ok(true)));
        assert!(matches!(hasher.verify_password("fortnight in Porto", &second), Ok(false)));
    }

    #[test]
    fn garbage_hash_is_an_error_not_a_mismatch() {
        let hasher = Argon2PasswordHasher::new();
        assert!(hasher.verify_password("anything", "plaintext-password").is_err());
    }
}
