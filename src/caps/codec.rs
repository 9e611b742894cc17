//! Token codec: seals a [`CapabilityPayload`] into an opaque, URL-safe string.
//!
//! # Wire format
//!
//! ```text
//! base64url_nopad( version:u8 | key_id:u8 | nonce:[u8; 12] | ciphertext | tag:[u8; 16] )
//! ```
//!
//! The plaintext is the payload's canonical JSON. Sealing uses
//! ChaCha20-Poly1305 with the two header bytes as associated data, so the
//! version and key id are covered by the tag even though they travel in the
//! clear. The nonce is drawn from the OS RNG on every call; identical
//! payloads produce different tokens.

use super::keys::{KeyMaterial, TokenKey};
use super::payload::CapabilityPayload;
use crate::error::TokenError;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
use ring::aead::{Aad, CHACHA20_POLY1305, LessSafeKey, NONCE_LEN, Nonce, UnboundKey};
use std::fmt;
use std::sync::Arc;

/// Current token format version.
pub const TOKEN_VERSION: u8 = 1;

const HEADER_LEN: usize = 2;
const TAG_LEN: usize = 16;
const MIN_SEALED_LEN: usize = HEADER_LEN + NONCE_LEN + TAG_LEN;

/// An opaque recipient token.
///
/// Only the codec looks inside; everyone else stores and forwards it as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncryptedToken(String);

impl EncryptedToken {
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for EncryptedToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for EncryptedToken {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for EncryptedToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EncryptedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn cipher_for(key: &TokenKey) -> Result<LessSafeKey, ring::error::Unspecified> {
    UnboundKey::new(&CHACHA20_POLY1305, key.bytes()).map(LessSafeKey::new)
}

/// Seal `payload` under the active key of `keys`.
pub fn encode(payload: &CapabilityPayload, keys: &KeyMaterial) -> Result<EncryptedToken, TokenError> {
    let key = keys.active_key();
    let header = [TOKEN_VERSION, key.id()];

    let mut in_out = serde_json::to_vec(payload).map_err(|_| TokenError::EncodingFailure)?;

    let mut nonce = [0u8; NONCE_LEN];
    rand::rngs::OsRng
        .try_fill_bytes(&mut nonce)
        .map_err(|_| TokenError::EncodingFailure)?;

    let cipher = cipher_for(key).map_err(|_| TokenError::EncodingFailure)?;
    cipher
        .seal_in_place_append_tag(
            Nonce::assume_unique_for_key(nonce),
            Aad::from(header),
            &mut in_out,
        )
        .map_err(|_| TokenError::EncodingFailure)?;

    let mut sealed = Vec::with_capacity(HEADER_LEN + NONCE_LEN + in_out.len());
    sealed.extend_from_slice(&header);
    sealed.extend_from_slice(&nonce);
    sealed.extend_from_slice(&in_out);

    Ok(EncryptedToken(URL_SAFE_NO_PAD.encode(sealed)))
}

/// Open a token produced by [`encode`] under any key held by `keys`.
///
/// Every failure is reported as [`TokenError::TamperedOrInvalidToken`].
pub fn decode(token: &EncryptedToken, keys: &KeyMaterial) -> Result<CapabilityPayload, TokenError> {
    let mut sealed = URL_SAFE_NO_PAD
        .decode(token.as_str())
        .map_err(|_| TokenError::TamperedOrInvalidToken)?;
    if sealed.len() < MIN_SEALED_LEN {
        return Err(TokenError::TamperedOrInvalidToken);
    }

    let (header, rest) = sealed.split_at_mut(HEADER_LEN);
    let header = [header[0], header[1]];
    let [version, key_id] = header;
    if version != TOKEN_VERSION {
        return Err(TokenError::TamperedOrInvalidToken);
    }
    let key = keys
        .key(key_id)
        .ok_or(TokenError::TamperedOrInvalidToken)?;

    let (nonce, ciphertext) = rest.split_at_mut(NONCE_LEN);
    let nonce = Nonce::try_assume_unique_for_key(nonce)
        .map_err(|_| TokenError::TamperedOrInvalidToken)?;

    let cipher = cipher_for(key).map_err(|_| TokenError::TamperedOrInvalidToken)?;
    let plaintext = cipher
        .open_in_place(nonce, Aad::from(header), ciphertext)
        .map_err(|_| TokenError::TamperedOrInvalidToken)?;

    serde_json::from_slice(plaintext).map_err(|_| TokenError::TamperedOrInvalidToken)
}

/// A codec bound to one set of key material.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    keys: Arc<KeyMaterial>,
}

impl TokenCodec {
    #[inline]
    pub fn new(keys: Arc<KeyMaterial>) -> Self {
        Self { keys }
    }

    pub fn encode(&self, payload: &CapabilityPayload) -> Result<EncryptedToken, TokenError> {
        encode(payload, &self.keys)
    }

    pub fn decode(&self, token: &EncryptedToken) -> Result<CapabilityPayload, TokenError> {
        decode(token, &self.keys)
    }

    #[inline]
    pub fn keys(&self) -> &KeyMaterial {
        &self.keys
    }
}
