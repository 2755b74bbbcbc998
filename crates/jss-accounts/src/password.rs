use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};

use crate::error::{AccountError, AccountResult};

const SALT_BYTES: usize = 16;

/// Argon2id cost parameters.
///
/// Defaults follow the OWASP minimum for Argon2id (19 MiB, 2 passes, 1 lane).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashingParams {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashingParams {
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl HashingParams {
    /// The cheapest parameters argon2 accepts. For tests only.
    pub fn insecure_fast() -> Self {
        Self {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        }
    }
}

/// Salted, slow one-way password hashing (Argon2id, PHC string output).
#[derive(Clone)]
pub struct PasswordHashing {
    argon2: Argon2<'static>,
}

impl PasswordHashing {
    pub fn new(params: &HashingParams) -> AccountResult<Self> {
        let params = Params::new(params.memory_kib, params.iterations, params.parallelism, None)
            .map_err(|e| AccountError::Hashing(format!("invalid Argon2 parameters: {e}")))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a password with a fresh random salt.
    pub fn hash(&self, password: &str) -> AccountResult<String> {
        let mut salt = [0u8; SALT_BYTES];
        rand::Rng::fill(&mut rand::thread_rng(), &mut salt);
        let salt = SaltString::encode_b64(&salt)
            .map_err(|e| AccountError::Hashing(format!("salt encoding failed: {e}")))?;
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AccountError::Hashing(format!("Argon2 hashing failed: {e}")))?;
        Ok(hash.to_string())
    }

    /// Check a password against a stored PHC string.
    ///
    /// The cost parameters embedded in `stored` are used, so hashes made
    /// under older settings keep verifying.
    pub fn verify(&self, password: &str, stored: &str) -> AccountResult<bool> {
        let parsed = PasswordHash::new(stored)
            .map_err(|e| AccountError::Hashing(format!("unreadable password hash: {e}")))?;
        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

impl std::fmt::Debug for PasswordHashing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHashing")
            .field("algorithm", &"argon2id")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hashing() -> PasswordHashing {
        PasswordHashing::new(&HashingParams::insecure_fast()).unwrap()
    }

    #[test]
    fn hash_then_verify() {
        let h = hashing();
        let stored = h.hash("secret1").unwrap();
        assert!(stored.starts_with("$argon2id$"));
        assert!(h.verify("secret1", &stored).unwrap());
        assert!(!h.verify("secret2", &stored).unwrap());
    }

    #[test]
    fn salts_differ() {
        let h = hashing();
        assert_ne!(h.hash("same").unwrap(), h.hash("same").unwrap());
    }

    #[test]
    fn verifies_hashes_made_with_other_params() {
        let stored = hashing().hash("pw123456").unwrap();
        let stronger = PasswordHashing::new(&HashingParams {
            memory_kib: 64,
            iterations: 2,
            parallelism: 1,
        })
        .unwrap();
        assert!(stronger.verify("pw123456", &stored).unwrap());
    }

    #[test]
    fn bad_params_are_rejected() {
        let err = PasswordHashing::new(&HashingParams {
            memory_kib: 1,
            iterations: 0,
            parallelism: 0,
        })
        .unwrap_err();
        assert!(matches!(err, AccountError::Hashing(_)));
    }

    #[test]
    fn garbage_hash_is_an_error() {
        assert!(hashing().verify("x", "not-a-phc-string").is_err());
    }
}
