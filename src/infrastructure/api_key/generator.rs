//! API key generation
//!
//! Generates cryptographically secure opaque key strings.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::RngCore;

const DEFAULT_KEY_LENGTH: usize = 64;

/// Generator for opaque random API keys
///
/// Keys are stored as plain column values; collision probability at the
/// default length is treated as negligible and not checked.
#[derive(Debug, Clone)]
pub struct ApiKeyGenerator {
    /// Character length of generated keys
    key_length: usize,
}

impl ApiKeyGenerator {
    pub fn new(key_length: usize) -> Self {
        Self { key_length }
    }

    pub fn key_length(&self) -> usize {
        self.key_length
    }

    /// Generate one opaque random key
    pub fn generate(&self) -> String {
        // Base64 yields 4 characters per 3 bytes; generate enough entropy
        // to cover the configured length, then trim.
        let byte_len = self.key_length.div_ceil(4) * 3;
        let mut random_bytes = vec![0u8; byte_len];
        rand::thread_rng().fill_bytes(&mut random_bytes);

        let mut encoded = URL_SAFE_NO_PAD.encode(&random_bytes);
        encoded.truncate(self.key_length);
        encoded
    }
}

impl Default for ApiKeyGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_LENGTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_default_length() {
        let generator = ApiKeyGenerator::default();
        assert_eq!(generator.generate().len(), 64);
    }

    #[test]
    fn test_generate_custom_length() {
        let generator = ApiKeyGenerator::new(22);
        assert_eq!(generator.generate().len(), 22);
    }

    #[test]
    fn test_key_uniqueness() {
        let generator = ApiKeyGenerator::default();
        let key1 = generator.generate();
        let key2 = generator.generate();

        assert_ne!(key1, key2);
    }

    #[test]
    fn test_key_charset_is_url_safe() {
        let generator = ApiKeyGenerator::default();
        let key = generator.generate();

        assert!(key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
