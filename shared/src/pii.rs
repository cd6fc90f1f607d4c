//! Encrypted PII value type
//!
//! Customer and employee names/emails are stored encrypted at rest. This
//! module keeps PII as an encapsulated value type with explicit
//! `encrypt`/`decrypt` and a `normalized_hash` accessor — decryption happens
//! only at response assembly, never implicitly inside business logic, so a
//! transition engine or settlement engine never has to think about it.
//!
//! Format: `base64(nonce_12bytes || ciphertext || tag_16bytes)`, matching the
//! envelope-encryption scheme used for sensitive tenant data elsewhere in
//! this stack.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use base64::Engine;
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;

/// The sentinel prefix for a synthetic anonymous contact email.
pub const ANON_EMAIL_PREFIX: &str = "anon+";
const ANON_EMAIL_SUFFIX: &str = "@local";

/// Master encryption key (32 bytes for AES-256-GCM).
#[derive(Clone)]
pub struct PiiKey {
    key: [u8; KEY_LEN],
}

impl Drop for PiiKey {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

impl PiiKey {
    /// Load the key from a base64-encoded 32-byte secret (e.g. the
    /// `PII_MASTER_KEY` environment variable).
    pub fn from_base64(b64: &str) -> Result<Self, &'static str> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(b64.trim())
            .map_err(|_| "invalid base64")?;
        if bytes.len() != KEY_LEN {
            return Err("master key must be 32 bytes");
        }
        let mut key = [0u8; KEY_LEN];
        key.copy_from_slice(&bytes);
        Ok(Self { key })
    }

    /// Generate a fresh random key — used in tests and first-run bootstrap.
    pub fn generate() -> Self {
        let mut key = [0u8; KEY_LEN];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut key);
        Self { key }
    }

    fn encrypt(&self, plaintext: &str) -> String {
        let cipher = Aes256Gcm::new_from_slice(&self.key).expect("key length validated at load");
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);
        let ciphertext = cipher
            .encrypt(nonce, plaintext.as_bytes())
            .expect("AES-GCM encryption is infallible for valid keys");
        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&ciphertext);
        base64::engine::general_purpose::STANDARD.encode(out)
    }

    fn decrypt(&self, encoded: &str) -> Result<String, &'static str> {
        let data = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|_| "invalid base64")?;
        if data.len() < NONCE_LEN {
            return Err("ciphertext too short");
        }
        let (nonce_bytes, ciphertext) = data.split_at(NONCE_LEN);
        let cipher = Aes256Gcm::new_from_slice(&self.key).map_err(|_| "invalid key")?;
        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| "decryption failed")?;
        String::from_utf8(plaintext).map_err(|_| "ciphertext was not valid utf-8")
    }
}

/// An encrypted PII field plus a hash of the normalized plaintext, which
/// allows lookup (e.g. "find customer by email") without ever decrypting.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EncryptedField {
    ciphertext: String,
    /// SHA-256 of the lowercased, trimmed plaintext, hex-encoded.
    hash: String,
}

impl EncryptedField {
    pub fn encrypt(key: &PiiKey, plaintext: &str) -> Self {
        Self {
            ciphertext: key.encrypt(plaintext),
            hash: normalized_hash(plaintext),
        }
    }

    /// Reassemble a field from its stored columns — used by repositories
    /// reading rows back, which never hold the key and so cannot re-encrypt.
    pub fn from_parts(ciphertext: String, hash: String) -> Self {
        Self { ciphertext, hash }
    }

    pub fn decrypt(&self, key: &PiiKey) -> Result<String, &'static str> {
        key.decrypt(&self.ciphertext)
    }

    /// The stored ciphertext, as persisted.
    pub fn ciphertext(&self) -> &str {
        &self.ciphertext
    }

    /// The normalized hash, usable as a lookup key without decryption.
    pub fn normalized_hash(&self) -> &str {
        &self.hash
    }
}

/// Hash of the normalized (lowercased, trimmed) plaintext, hex-encoded.
pub fn normalized_hash(plaintext: &str) -> String {
    let normalized = plaintext.trim().to_lowercase();
    let digest = Sha256::digest(normalized.as_bytes());
    hex::encode(digest)
}

/// Generate a synthetic anonymous contact email of the form `anon+<token>@local`.
pub fn synthetic_anon_email() -> String {
    format!("{ANON_EMAIL_PREFIX}{}{ANON_EMAIL_SUFFIX}", crate::util::snowflake_id())
}

/// True iff `email` matches the synthetic anonymous sentinel pattern —
/// downstream consumers deciding whether to "mail the ticket" must treat
/// such addresses as absent.
pub fn is_synthetic_anon_email(email: &str) -> bool {
    email.starts_with(ANON_EMAIL_PREFIX) && email.ends_with(ANON_EMAIL_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encrypts_and_decrypts_round_trip() {
        let key = PiiKey::generate();
        let field = EncryptedField::encrypt(&key, "Jane Doe <jane@example.com>");
        assert_eq!(field.decrypt(&key).unwrap(), "Jane Doe <jane@example.com>");
    }

    #[test]
    fn normalized_hash_is_case_and_whitespace_insensitive() {
        let a = normalized_hash("  Jane@Example.com ");
        let b = normalized_hash("jane@example.com");
        assert_eq!(a, b);
    }

    #[test]
    fn decrypt_fails_with_wrong_key() {
        let key = PiiKey::generate();
        let other = PiiKey::generate();
        let field = EncryptedField::encrypt(&key, "secret");
        assert!(field.decrypt(&other).is_err());
    }

    #[test]
    fn recognizes_synthetic_anon_email() {
        let anon = synthetic_anon_email();
        assert!(is_synthetic_anon_email(&anon));
        assert!(!is_synthetic_anon_email("real@example.com"));
    }
}
