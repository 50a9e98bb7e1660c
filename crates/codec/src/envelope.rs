//! Passphrase-based authenticated encryption of the private payload.
//!
//! # Wire format
//!
//! ```text
//! v1.<salt>.<iv>.<ciphertext>
//! ```
//!
//! Each segment is URL-safe base64 without padding:
//! - `salt`: 16 random bytes fed to PBKDF2-HMAC-SHA256 (100,000 iterations, 32-byte key)
//! - `iv`: 12 random bytes used as the AES-256-GCM nonce
//! - `ciphertext`: AES-256-GCM output of the UTF-8 JSON plaintext, 16-byte tag appended
//!
//! A failed tag check is reported as [`CodecError::AuthenticationFailed`] whatever the cause,
//! so callers cannot tell a wrong passphrase from tampered data.

use crate::constants::{IV_LEN, KEY_LEN, PAYLOAD_VERSION, PBKDF2_ITERATIONS, SALT_LEN};
use crate::{CodecError, CodecResult};
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use anamnese_types::Passphrase;
use base64::{engine::general_purpose, Engine as _};
use rand::RngCore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::Sha256;
use std::sync::Arc;

/// Source of cryptographically secure random bytes.
pub trait RandomSource: Send + Sync + std::fmt::Debug {
    fn fill(&self, buf: &mut [u8]) -> CodecResult<()>;
}

/// Operating-system randomness.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn fill(&self, buf: &mut [u8]) -> CodecResult<()> {
        rand::rngs::OsRng
            .try_fill_bytes(buf)
            .map_err(|e| CodecError::Randomness(e.to_string()))
    }
}

/// Authenticated cipher with a 256-bit key and 96-bit nonce.
pub trait AeadCipher: Send + Sync + std::fmt::Debug {
    fn seal(&self, key: &[u8; KEY_LEN], iv: &[u8; IV_LEN], plaintext: &[u8]) -> CodecResult<Vec<u8>>;

    /// Must fail with [`CodecError::AuthenticationFailed`] when the tag does not verify.
    fn open(&self, key: &[u8; KEY_LEN], iv: &[u8; IV_LEN], ciphertext: &[u8])
        -> CodecResult<Vec<u8>>;
}

/// AES-256-GCM with a 128-bit tag.
#[derive(Debug, Default, Clone, Copy)]
pub struct Aes256GcmCipher;

impl AeadCipher for Aes256GcmCipher {
    fn seal(&self, key: &[u8; KEY_LEN], iv: &[u8; IV_LEN], plaintext: &[u8]) -> CodecResult<Vec<u8>> {
        let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| CodecError::Encryption)?;
        cipher
            .encrypt(Nonce::from_slice(iv), plaintext)
            .map_err(|_| CodecError::Encryption)
    }

    fn open(
        &self,
        key: &[u8; KEY_LEN],
        iv: &[u8; IV_LEN],
        ciphertext: &[u8],
    ) -> CodecResult<Vec<u8>> {
        let cipher =
            Aes256Gcm::new_from_slice(key).map_err(|_| CodecError::AuthenticationFailed)?;
        cipher
            .decrypt(Nonce::from_slice(iv), ciphertext)
            .map_err(|_| CodecError::AuthenticationFailed)
    }
}

/// Derives the 256-bit payload key with PBKDF2-HMAC-SHA256.
pub fn derive_key(passphrase: &Passphrase, salt: &[u8]) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(
        passphrase.expose().as_bytes(),
        salt,
        PBKDF2_ITERATIONS,
        &mut key,
    );
    key
}

/// Encrypts and decrypts `v1` payloads.
#[derive(Debug, Clone)]
pub struct EnvelopeCrypto {
    random: Arc<dyn RandomSource>,
    cipher: Arc<dyn AeadCipher>,
}

impl Default for EnvelopeCrypto {
    fn default() -> Self {
        Self::new(Arc::new(OsRandom), Arc::new(Aes256GcmCipher))
    }
}

impl EnvelopeCrypto {
    pub fn new(random: Arc<dyn RandomSource>, cipher: Arc<dyn AeadCipher>) -> Self {
        Self { random, cipher }
    }

    /// Serialises `value` to JSON and seals it under `passphrase`.
    pub fn encrypt<T: Serialize>(&self, value: &T, passphrase: &Passphrase) -> CodecResult<String> {
        let mut salt = [0u8; SALT_LEN];
        let mut iv = [0u8; IV_LEN];
        self.random.fill(&mut salt)?;
        self.random.fill(&mut iv)?;

        let key = derive_key(passphrase, &salt);
        let plaintext = serde_json::to_vec(value).map_err(CodecError::Serialization)?;
        let ciphertext = self.cipher.seal(&key, &iv, &plaintext)?;

        let engine = &general_purpose::URL_SAFE_NO_PAD;
        Ok(format!(
            "{PAYLOAD_VERSION}.{}.{}.{}",
            engine.encode(salt),
            engine.encode(iv),
            engine.encode(ciphertext)
        ))
    }

    /// Opens a payload produced by [`EnvelopeCrypto::encrypt`] and parses its JSON.
    pub fn decrypt<T: DeserializeOwned>(
        &self,
        payload: &str,
        passphrase: &Passphrase,
    ) -> CodecResult<T> {
        let parts: Vec<&str> = payload.split('.').collect();
        if parts.len() != 4 || parts[0] != PAYLOAD_VERSION {
            return Err(CodecError::MalformedPayload(
                "expected v1.<salt>.<iv>.<ciphertext>",
            ));
        }

        let engine = &general_purpose::URL_SAFE_NO_PAD;
        let salt = engine
            .decode(parts[1])
            .map_err(|_| CodecError::MalformedPayload("salt is not base64url"))?;
        let iv = engine
            .decode(parts[2])
            .map_err(|_| CodecError::MalformedPayload("iv is not base64url"))?;
        let ciphertext = engine
            .decode(parts[3])
            .map_err(|_| CodecError::MalformedPayload("ciphertext is not base64url"))?;

        if salt.len() != SALT_LEN {
            return Err(CodecError::MalformedPayload("salt must be 16 bytes"));
        }
        let iv: [u8; IV_LEN] = iv
            .try_into()
            .map_err(|_| CodecError::MalformedPayload("iv must be 12 bytes"))?;

        let key = derive_key(passphrase, &salt);
        let plaintext = self.cipher.open(&key, &iv, &ciphertext)?;
        serde_json::from_slice(&plaintext).map_err(CodecError::Deserialization)
    }
}
