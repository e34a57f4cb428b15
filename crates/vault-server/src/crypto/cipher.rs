//! AES-256-GCM sealing and opening of a single secret string.
//!
//! **IV length:** a 128-bit IV is used rather than the usual 96 bits. GCM
//! derives the initial counter block from such an IV through GHASH, which is
//! what previously stored rows were written with.
//!
//! **Never reuse an IV under the same key.** GCM nonce reuse is catastrophic —
//! it breaks both confidentiality and authentication. Every call to
//! [`SecretCipher::seal`] draws a fresh IV from the OS CSPRNG.

use std::sync::Arc;

use aes_gcm::{
    aead::{consts::U16, rand_core::RngCore, AeadInPlace, KeyInit, OsRng},
    aes::Aes256,
    AesGcm, Nonce, Tag,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

use super::key::EncryptionKey;

/// Byte length of the per-seal IV (16 bytes = 128 bits).
pub const NONCE_LEN: usize = 16;

/// Byte length of the GCM authentication tag.
pub const TAG_LEN: usize = 16;

type Aes256Gcm16 = AesGcm<Aes256, U16>;

/// Errors produced by the cipher layer.
#[derive(Debug, Error)]
pub enum CipherError {
    /// The key is absent or is not [`super::KEY_LEN`] bytes after decoding.
    #[error("encryption key misconfigured: {0}")]
    Configuration(&'static str),

    /// Tag verification failed: ciphertext, IV or tag was altered, or the
    /// secret was sealed under a different key.
    #[error("authentication failed")]
    Authentication,

    /// A sealed field is not valid base64, has the wrong decoded length, or
    /// the recovered plaintext is not UTF-8.
    #[error("malformed sealed secret: {0}")]
    MalformedInput(&'static str),
}

/// The three stored parts of an encrypted secret, each base64 text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedSecret {
    pub ciphertext: String,
    pub iv: String,
    pub auth_tag: String,
}

/// Seals and opens secrets under the process-wide [`EncryptionKey`].
///
/// Cheap to clone; the expanded key schedule is shared behind an `Arc`.
#[derive(Clone)]
pub struct SecretCipher {
    aead: Arc<Aes256Gcm16>,
}

impl SecretCipher {
    /// Create a cipher from a validated key.
    pub fn new(key: &EncryptionKey) -> Self {
        Self {
            aead: Arc::new(Aes256Gcm16::new(key.as_bytes().into())),
        }
    }

    /// Encrypt `plaintext` under a fresh random IV.
    ///
    /// Defined for every string, including the empty one.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::MalformedInput`] only if the plaintext exceeds
    /// the GCM length limit (64 GiB), which the HTTP layer cannot deliver.
    pub fn seal(&self, plaintext: &str) -> Result<SealedSecret, CipherError> {
        let mut iv = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut iv);

        let mut buffer = plaintext.as_bytes().to_vec();
        let tag = self
            .aead
            .encrypt_in_place_detached(Nonce::<U16>::from_slice(&iv), b"", &mut buffer)
            .map_err(|_| CipherError::MalformedInput("plaintext too long"))?;

        Ok(SealedSecret {
            ciphertext: STANDARD.encode(&buffer),
            iv: STANDARD.encode(iv),
            auth_tag: STANDARD.encode(tag),
        })
    }

    /// Verify and decrypt a [`SealedSecret`].
    ///
    /// The tag is checked before any plaintext is produced; on failure nothing
    /// is returned.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::MalformedInput`] if a field is not base64, the IV
    /// or tag has the wrong length, or the plaintext is not UTF-8.
    /// Returns [`CipherError::Authentication`] if tag verification fails.
    pub fn open(&self, sealed: &SealedSecret) -> Result<String, CipherError> {
        let iv = decode_field(&sealed.iv, "iv is not valid base64")?;
        if iv.len() != NONCE_LEN {
            return Err(CipherError::MalformedInput("iv must decode to 16 bytes"));
        }
        let tag = decode_field(&sealed.auth_tag, "auth tag is not valid base64")?;
        if tag.len() != TAG_LEN {
            return Err(CipherError::MalformedInput("auth tag must decode to 16 bytes"));
        }
        let mut buffer = decode_field(&sealed.ciphertext, "ciphertext is not valid base64")?;

        self.aead
            .decrypt_in_place_detached(
                Nonce::<U16>::from_slice(&iv),
                b"",
                &mut buffer,
                Tag::<U16>::from_slice(&tag),
            )
            .map_err(|_| CipherError::Authentication)?;

        String::from_utf8(buffer)
            .map_err(|_| CipherError::MalformedInput("plaintext is not valid UTF-8"))
    }
}

impl std::fmt::Debug for SecretCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretCipher([REDACTED])")
    }
}

fn decode_field(value: &str, err: &'static str) -> Result<Vec<u8>, CipherError> {
    STANDARD
        .decode(value)
        .map_err(|_| CipherError::MalformedInput(err))
}
