//! # AEAD Vote Tokens
//!
//! Stateless vote authorization: `"<entryId>:<userId>"` sealed with
//! AES-256-GCM under a key derived from a configured passphrase, a fresh
//! random nonce prepended per token, the whole thing hex-encoded for URL
//! embedding. Decoding fails closed: any malformed, truncated, or
//! tampered token comes back as `None`, indistinguishable to callers
//! from a missing token.

use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::Aes256Gcm;
use once_cell::sync::Lazy;
use rand::RngCore;
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};

use domains::{AppError, Result, VoteClaim, VoteTokens};

const NONCE_LEN: usize = 12;

/// Post-decrypt shape check; anything but two decimal ids is rejected.
static CLAIM_SHAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+:\d+$").expect("claim regex"));

/// AES-256-GCM implementation of the [`VoteTokens`] port.
///
/// The passphrase is injected at construction; rotating it invalidates
/// every outstanding token, which is fine for page-scoped credentials.
pub struct AeadVoteTokens {
    cipher: Aes256Gcm,
}

impl AeadVoteTokens {
    pub fn new(passphrase: &SecretString) -> Self {
        // One-way derivation: the 32-byte digest is exactly an AES-256 key.
        let key: [u8; 32] = Sha256::digest(passphrase.expose_secret().as_bytes()).into();
        Self {
            cipher: Aes256Gcm::new(GenericArray::from_slice(&key)),
        }
    }
}

impl VoteTokens for AeadVoteTokens {
    fn encode(&self, entry_id: i64, user_id: i64) -> Result<String> {
        let claim = format!("{entry_id}:{user_id}");

        let mut nonce = [0u8; NONCE_LEN];
        rand::rng().fill_bytes(&mut nonce);

        let sealed = self
            .cipher
            .encrypt(GenericArray::from_slice(&nonce), claim.as_bytes())
            .map_err(|_| AppError::Internal("vote token encryption failed".to_string()))?;

        let mut wire = nonce.to_vec();
        wire.extend_from_slice(&sealed);
        Ok(hex::encode(wire))
    }

    fn decode(&self, token: &str) -> Option<VoteClaim> {
        let wire = hex::decode(token).ok()?;
        if wire.len() <= NONCE_LEN {
            return None;
        }
        let (nonce, sealed) = wire.split_at(NONCE_LEN);

        let plaintext = self
            .cipher
            .decrypt(GenericArray::from_slice(nonce), sealed)
            .ok()?;
        let claim = String::from_utf8(plaintext).ok()?;

        if !CLAIM_SHAPE.is_match(&claim) {
            tracing::debug!("vote token plaintext failed shape check");
            return None;
        }
        let (entry, user) = claim.split_once(':')?;
        Some(VoteClaim {
            entry_id: entry.parse().ok()?,
            user_id: user.parse().ok()?,
        })
    }
}
