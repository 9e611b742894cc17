//! Key material for sealing recipient tokens.
//!
//! Configured secrets are never used as cipher keys directly. Each one is run
//! through HMAC-SHA256 with a fixed label to produce a 32-byte key, so a
//! secret of any length maps onto a uniformly sized key.
//!
//! # Rotation
//!
//! [`KeyMaterial`] holds exactly one active key, used for every new token,
//! plus any number of retired keys that are only consulted while decoding.
//! Tokens name their key by a one-byte id, so removing a retired key
//! invalidates every link minted under it.

use crate::error::KeyError;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

type HmacSha256 = Hmac<Sha256>;

/// Length in bytes of a derived token key.
pub const KEY_LEN: usize = 32;

/// Shortest secret accepted by [`is_weak_secret`].
pub const MIN_SECRET_LEN: usize = 16;

/// Domain-separation label mixed into every derived key.
const KEY_DERIVATION_LABEL: &[u8] = b"recipient-link token key v1";

/// A derived token key and the id it is published under.
///
/// Wiped on drop. `Debug` shows the id only.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct TokenKey {
    id: u8,
    bytes: [u8; KEY_LEN],
}

impl TokenKey {
    /// Derive a token key from a configured secret.
    ///
    /// Never fails: HMAC accepts keys of any size. Weak secrets are the
    /// concern of configuration validation, see [`is_weak_secret`].
    pub fn derive(id: u8, secret: &str) -> Self {
        let mut mac =
            HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
        mac.update(KEY_DERIVATION_LABEL);
        let digest = mac.finalize().into_bytes();

        let mut bytes = [0u8; KEY_LEN];
        bytes.copy_from_slice(&digest);
        Self { id, bytes }
    }

    #[inline]
    pub fn id(&self) -> u8 {
        self.id
    }

    #[inline]
    pub(crate) fn bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl fmt::Debug for TokenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenKey").field("id", &self.id).finish()
    }
}

/// Everything needed to mint and open recipient links.
///
/// Built once at startup and shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct KeyMaterial {
    active: TokenKey,
    retired: Vec<TokenKey>,
    base_url: String,
}

impl KeyMaterial {
    /// Create key material with a single active key.
    ///
    /// `base_url` must be an absolute http(s) URL ending in `/`, without a
    /// query or fragment; the recipient path is appended to it verbatim.
    pub fn new(active: TokenKey, base_url: impl Into<String>) -> Result<Self, KeyError> {
        let base_url = base_url.into();
        if let Err(reason) = check_base_url(&base_url) {
            return Err(KeyError::InvalidBaseUrl {
                url: base_url,
                reason,
            });
        }
        Ok(Self {
            active,
            retired: Vec::new(),
            base_url,
        })
    }

    /// Add a decode-only key kept from before a rotation.
    pub fn with_retired(mut self, key: TokenKey) -> Result<Self, KeyError> {
        if self.key(key.id()).is_some() {
            return Err(KeyError::DuplicateKeyId(key.id()));
        }
        self.retired.push(key);
        Ok(self)
    }

    /// The key every new token is sealed with.
    #[inline]
    pub fn active_key(&self) -> &TokenKey {
        &self.active
    }

    /// Look up a key by id, active key first.
    pub fn key(&self, id: u8) -> Option<&TokenKey> {
        std::iter::once(&self.active)
            .chain(self.retired.iter())
            .find(|k| k.id() == id)
    }

    /// Ids of the retired keys, in configuration order.
    pub fn retired_ids(&self) -> impl Iterator<Item = u8> + '_ {
        self.retired.iter().map(TokenKey::id)
    }

    #[inline]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Check that `base_url` can have a relative path appended to it.
///
/// Returns a human-readable reason on failure.
pub fn check_base_url(base_url: &str) -> Result<(), String> {
    let parsed = url::Url::parse(base_url).map_err(|e| e.to_string())?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err("scheme must be http or https".to_string());
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err("missing host".to_string());
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err("must not carry a query or fragment".to_string());
    }
    if !base_url.ends_with('/') {
        return Err("must end with '/'".to_string());
    }
    Ok(())
}

/// Check if a secret is too weak to seal tokens with.
///
/// Returns `true` for short secrets and for obvious placeholders that should
/// have been replaced before deployment.
pub fn is_weak_secret(secret: &str) -> bool {
    let lower = secret.to_ascii_lowercase();
    secret.chars().count() < MIN_SECRET_LEN
        || lower.contains("changeme")
        || lower.contains("default")
        || lower.contains("placeholder")
        || secret.chars().all(|c| Some(c) == secret.chars().next())
}
