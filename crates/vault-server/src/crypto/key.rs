//! [`EncryptionKey`]: the process-wide secret key, validated once at startup.

use aes_gcm::aead::{rand_core::RngCore, OsRng};
use base64::{engine::general_purpose::STANDARD, Engine as _};

use super::cipher::CipherError;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Fixed-size key buffer holding exactly [`KEY_LEN`] bytes.
///
/// When this type is dropped, the memory is overwritten with zeroes to
/// minimise the window during which plaintext key material lives in RAM.
pub struct EncryptionKey(Box<[u8; KEY_LEN]>);

impl EncryptionKey {
    /// Decode and validate a base64-encoded key, as read from `ENCRYPTION_KEY`.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::Configuration`] if the value is absent, empty,
    /// not valid base64, or does not decode to exactly [`KEY_LEN`] bytes.
    pub fn from_base64(encoded: Option<&str>) -> Result<Self, CipherError> {
        let encoded = match encoded.map(str::trim) {
            Some(s) if !s.is_empty() => s,
            _ => return Err(CipherError::Configuration("ENCRYPTION_KEY is not set")),
        };
        let mut decoded = STANDARD
            .decode(encoded)
            .map_err(|_| CipherError::Configuration("ENCRYPTION_KEY is not valid base64"))?;
        let key = Self::from_bytes(&decoded);
        decoded.iter_mut().for_each(|b| *b = 0);
        key
    }

    /// Build a key from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::Configuration`] if `bytes` is not [`KEY_LEN`] long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CipherError> {
        if bytes.len() != KEY_LEN {
            return Err(CipherError::Configuration(
                "ENCRYPTION_KEY must decode to 32 bytes (44 chars in base64)",
            ));
        }
        let mut buf = Box::new([0u8; KEY_LEN]);
        buf.copy_from_slice(bytes);
        Ok(Self(buf))
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl Drop for EncryptionKey {
    fn drop(&mut self) {
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material — not even in debug builds.
        f.write_str("EncryptionKey([REDACTED])")
    }
}

/// Generate a fresh random key, base64-encoded, suitable for `ENCRYPTION_KEY`.
pub fn generate_key() -> String {
    let mut key = [0u8; KEY_LEN];
    OsRng.fill_bytes(&mut key);
    let encoded = STANDARD.encode(key);
    key.iter_mut().for_each(|b| *b = 0);
    encoded
}
