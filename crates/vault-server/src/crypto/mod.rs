//! AES-256-GCM sealing of per-item secrets.
//!
//! This module is intentionally free of HTTP and storage dependencies.
//! It provides the seal/open pair used by the item service and the key type
//! loaded once at startup.
//!
//! # Sealed format
//!
//! A secret is stored as three independent base64 (standard, padded) strings:
//!
//! ```text
//! ciphertext  AES-256-GCM output, same length as the UTF-8 plaintext
//! iv          16 random bytes, fresh per seal
//! auth_tag    16-byte GCM tag
//! ```
//!
//! The 16-byte IV matches the layout already present in stored records, so
//! existing rows remain readable.

pub mod cipher;
pub mod key;

pub use cipher::{CipherError, SealedSecret, SecretCipher};
pub use key::{generate_key, EncryptionKey, KEY_LEN};
