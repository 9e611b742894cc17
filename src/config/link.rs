//! Recipient link configuration: base URL and token keys.

use serde::Deserialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::defaults::default_key_id;
use crate::caps::{KeyMaterial, TokenKey};
use crate::error::KeyError;

/// A secret read from configuration, zeroized when dropped.
#[derive(Clone, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print actual content
        f.debug_struct("SecretString")
            .field("len", &self.0.len())
            .finish()
    }
}

/// One token key.
#[derive(Debug, Clone, Deserialize)]
pub struct KeyBlock {
    /// Id written into every token sealed with this key (default: 1).
    #[serde(default = "default_key_id")]
    pub id: u8,
    /// Secret the key is derived from. At least 16 characters.
    pub secret: SecretString,
}

impl KeyBlock {
    fn derive(&self) -> TokenKey {
        TokenKey::derive(self.id, self.secret.expose())
    }
}

/// `[link]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct LinkConfig {
    /// Public base URL, ending in `/` (e.g., "https://delivery.example.com/").
    pub base_url: String,
    /// Active key: seals every new token.
    pub key: KeyBlock,
    /// Keys from before a rotation, kept so old links still open.
    #[serde(default)]
    pub retired_keys: Vec<KeyBlock>,
}

impl LinkConfig {
    /// Derive the runtime key material.
    pub fn key_material(&self) -> Result<KeyMaterial, KeyError> {
        self.retired_keys
            .iter()
            .try_fold(KeyMaterial::new(self.key.derive(), self.base_url.clone())?, |keys, block| {
                keys.with_retired(block.derive())
            })
    }
}
