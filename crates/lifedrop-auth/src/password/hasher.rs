//! Peppered Argon2id key derivation and constant-time verification.

use argon2::password_hash::rand_core::{OsRng, RngCore};
use argon2::{Algorithm, Argon2, Params, Version};

use lifedrop_core::config::password::PasswordConfig;
use lifedrop_core::error::AppError;
use lifedrop_core::result::AppResult;

use crate::random::constant_time_eq;

use super::encoding::EncodedHash;

const MIN_PEPPER_LEN: usize = 32;
const MIN_MEMORY_KIB: u32 = 12 * 1024;
const MIN_ITERATIONS: u32 = 1;
const MIN_PARALLELISM: u32 = 1;
const MIN_SALT_LEN: u32 = 16;
const MIN_KEY_LEN: u32 = 16;

/// Derives and verifies irreversible credential hashes.
///
/// Every secret is concatenated with the server-wide pepper before key
/// derivation. Construction validates the configured cost parameters
/// once; a hasher that would produce weak hashes can never be built.
#[derive(Clone)]
pub struct CredentialHasher {
    pepper: String,
    memory_kib: u32,
    iterations: u32,
    parallelism: u32,
    salt_length: u32,
    key_length: u32,
}

impl std::fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialHasher")
            .field("memory_kib", &self.memory_kib)
            .field("iterations", &self.iterations)
            .field("parallelism", &self.parallelism)
            .field("salt_length", &self.salt_length)
            .field("key_length", &self.key_length)
            .finish()
    }
}

impl CredentialHasher {
    /// Creates a hasher from configuration, rejecting weak parameters.
    pub fn new(config: &PasswordConfig) -> AppResult<Self> {
        if config.pepper.len() < MIN_PEPPER_LEN {
            return Err(AppError::configuration(format!(
                "pepper too short, minimum {MIN_PEPPER_LEN} characters"
            )));
        }
        if config.memory_kib < MIN_MEMORY_KIB {
            return Err(AppError::configuration(format!(
                "memory cost too low, minimum {MIN_MEMORY_KIB} KiB"
            )));
        }
        if config.iterations < MIN_ITERATIONS {
            return Err(AppError::configuration(format!(
                "iterations must be at least {MIN_ITERATIONS}"
            )));
        }
        if config.parallelism < MIN_PARALLELISM {
            return Err(AppError::configuration(format!(
                "parallelism must be at least {MIN_PARALLELISM}"
            )));
        }
        if config.salt_length < MIN_SALT_LEN {
            return Err(AppError::configuration(format!(
                "salt too short, minimum {MIN_SALT_LEN} bytes"
            )));
        }
        if config.key_length < MIN_KEY_LEN {
            return Err(AppError::configuration(format!(
                "key too short, minimum {MIN_KEY_LEN} bytes"
            )));
        }

        Ok(Self {
            pepper: config.pepper.clone(),
            memory_kib: config.memory_kib,
            iterations: config.iterations,
            parallelism: config.parallelism,
            salt_length: config.salt_length,
            key_length: config.key_length,
        })
    }

    /// Hashes a secret with a fresh random salt.
    ///
    /// Returns the canonical encoded hash string embedding the salt and
    /// the cost parameters used.
    pub fn hash(&self, secret: &[u8]) -> AppResult<String> {
        let mut salt = vec![0u8; self.salt_length as usize];
        OsRng.fill_bytes(&mut salt);

        let key = self.derive(
            secret,
            &salt,
            self.memory_kib,
            self.iterations,
            self.parallelism,
            self.key_length,
        )?;

        Ok(EncodedHash {
            memory_kib: self.memory_kib,
            iterations: self.iterations,
            parallelism: self.parallelism,
            salt,
            key,
        }
        .encode())
    }

    /// Verifies a secret against a stored encoded hash.
    ///
    /// Re-derives with the salt and cost parameters embedded in the hash
    /// and compares the derived keys without early exit. A legitimate
    /// mismatch returns `Ok(false)`; only structurally invalid input is
    /// an error.
    pub fn verify(&self, secret: &[u8], encoded: &str) -> AppResult<bool> {
        let stored = EncodedHash::parse(encoded)?;

        let key_length = u32::try_from(stored.key.len())
            .map_err(|_| AppError::validation("derived key length overflow"))?;

        let derived = self.derive(
            secret,
            &stored.salt,
            stored.memory_kib,
            stored.iterations,
            stored.parallelism,
            key_length,
        )?;

        Ok(constant_time_eq(&stored.key, &derived))
    }

    /// Runs Argon2id over the peppered secret.
    fn derive(
        &self,
        secret: &[u8],
        salt: &[u8],
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
        key_length: u32,
    ) -> AppResult<Vec<u8>> {
        if secret.is_empty() {
            return Err(AppError::validation("secret must not be empty"));
        }

        let mut peppered = Vec::with_capacity(secret.len() + self.pepper.len());
        peppered.extend_from_slice(secret);
        peppered.extend_from_slice(self.pepper.as_bytes());

        let params = Params::new(memory_kib, iterations, parallelism, Some(key_length as usize))
            .map_err(|e| AppError::validation(format!("invalid Argon2 parameters: {e}")))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut key = vec![0u8; key_length as usize];
        argon2
            .hash_password_into(&peppered, salt, &mut key)
            .map_err(|e| AppError::internal(format!("key derivation failed: {e}")))?;

        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> PasswordConfig {
        PasswordConfig {
            pepper: "0123456789abcdef0123456789abcdef".to_string(),
            memory_kib: MIN_MEMORY_KIB,
            iterations: 1,
            parallelism: 1,
            salt_length: 16,
            key_length: 32,
        }
    }

    #[test]
    fn test_hash_verify_round_trip() {
        let hasher = CredentialHasher::new(&test_config()).unwrap();
        let encoded = hasher.hash(b"correct horse battery staple").unwrap();

        assert!(hasher.verify(b"correct horse battery staple", &encoded).unwrap());
        assert!(!hasher.verify(b"incorrect horse", &encoded).unwrap());
    }

    #[test]
    fn test_same_secret_different_salt() {
        let hasher = CredentialHasher::new(&test_config()).unwrap();
        let a = hasher.hash(b"secret-password-1").unwrap();
        let b = hasher.hash(b"secret-password-1").unwrap();
        assert_ne!(a, b);
        assert!(hasher.verify(b"secret-password-1", &a).unwrap());
        assert!(hasher.verify(b"secret-password-1", &b).unwrap());
    }

    #[test]
    fn test_verify_honors_embedded_parameters() {
        let hasher = CredentialHasher::new(&test_config()).unwrap();
        let encoded = hasher.hash(b"stable-secret").unwrap();

        // A hasher configured with different current costs still verifies
        // hashes produced under the old parameters.
        let mut raised = test_config();
        raised.iterations = 2;
        let newer = CredentialHasher::new(&raised).unwrap();
        assert!(newer.verify(b"stable-secret", &encoded).unwrap());
    }

    #[test]
    fn test_empty_secret_rejected() {
        let hasher = CredentialHasher::new(&test_config()).unwrap();
        assert!(hasher.hash(b"").is_err());
    }

    #[test]
    fn test_malformed_hash_is_error_not_false() {
        let hasher = CredentialHasher::new(&test_config()).unwrap();
        assert!(hasher.verify(b"anything", "not-a-hash").is_err());
        assert!(hasher.verify(b"anything", "").is_err());
    }

    #[test]
    fn test_weak_configuration_rejected() {
        let mut short_pepper = test_config();
        short_pepper.pepper = "too-short".to_string();
        assert!(CredentialHasher::new(&short_pepper).is_err());

        let mut low_memory = test_config();
        low_memory.memory_kib = 1024;
        assert!(CredentialHasher::new(&low_memory).is_err());

        let mut zero_iterations = test_config();
        zero_iterations.iterations = 0;
        assert!(CredentialHasher::new(&zero_iterations).is_err());

        let mut zero_parallelism = test_config();
        zero_parallelism.parallelism = 0;
        assert!(CredentialHasher::new(&zero_parallelism).is_err());

        let mut short_salt = test_config();
        short_salt.salt_length = 8;
        assert!(CredentialHasher::new(&short_salt).is_err());

        let mut short_key = test_config();
        short_key.key_length = 8;
        assert!(CredentialHasher::new(&short_key).is_err());
    }

    #[test]
    fn test_encoded_shape() {
        let hasher = CredentialHasher::new(&test_config()).unwrap();
        let encoded = hasher.hash(b"shape-check").unwrap();
        assert!(encoded.starts_with("argon2id$v=19$m=12288,t=1,p=1$"));
        assert_eq!(encoded.split('$').count(), 5);
    }
}
