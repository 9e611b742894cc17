//! Recipient link construction and parsing.
//!
//! A link is `<base_url>recipient/?key=<token>`. The token is already
//! base64url, but it is still passed through form encoding so the link stays
//! valid if the token alphabet ever changes.

use super::codec::{self, EncryptedToken, TokenCodec};
use super::keys::KeyMaterial;
use super::payload::CapabilityPayload;
use crate::error::{LinkError, TokenError};
use std::sync::Arc;
use url::Url;
use url::form_urlencoded;

/// Path of the recipient page, relative to the base URL.
pub const RECIPIENT_PATH: &str = "recipient/";

/// Query parameter carrying the token.
pub const TOKEN_PARAM: &str = "key";

/// Everything a recipient link for `keys` starts with.
pub fn recipient_prefix(keys: &KeyMaterial) -> String {
    format!("{}{}", keys.base_url(), RECIPIENT_PATH)
}

/// Seal `payload` and wrap the token in a recipient URL.
pub fn build_recipient_url(
    payload: &CapabilityPayload,
    keys: &KeyMaterial,
) -> Result<String, TokenError> {
    let token = codec::encode(payload, keys)?;
    let encoded: String = form_urlencoded::byte_serialize(token.as_str().as_bytes()).collect();
    Ok(format!("{}?{}={}", recipient_prefix(keys), TOKEN_PARAM, encoded))
}

/// Pull the (URL-decoded) token out of a recipient URL.
///
/// Does not check where the URL points; see [`open_recipient_url`].
pub fn extract_token(url: &str) -> Result<EncryptedToken, LinkError> {
    let parsed = Url::parse(url).map_err(|e| LinkError::InvalidUrl(e.to_string()))?;
    token_param(&parsed)
}

fn token_param(url: &Url) -> Result<EncryptedToken, LinkError> {
    url.query_pairs()
        .find(|(name, _)| name == TOKEN_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
        .map(EncryptedToken::from)
        .ok_or(LinkError::MissingToken)
}

/// Check that `url` is one of our recipient links, then decode its token.
///
/// The parsed URL must share the base URL's origin and land exactly on the
/// recipient path once dot segments are resolved.
pub fn open_recipient_url(url: &str, keys: &KeyMaterial) -> Result<CapabilityPayload, LinkError> {
    let parsed = Url::parse(url).map_err(|e| LinkError::InvalidUrl(e.to_string()))?;
    let expected = Url::parse(&recipient_prefix(keys))
        .map_err(|e| LinkError::InvalidUrl(e.to_string()))?;
    if parsed.origin() != expected.origin() || parsed.path() != expected.path() {
        return Err(LinkError::ForeignUrl);
    }
    let token = token_param(&parsed)?;
    Ok(codec::decode(&token, keys)?)
}

/// Builds and opens recipient links for one set of key material.
#[derive(Debug, Clone)]
pub struct CapabilityLinkBuilder {
    codec: TokenCodec,
}

impl CapabilityLinkBuilder {
    pub fn new(keys: Arc<KeyMaterial>) -> Self {
        Self {
            codec: TokenCodec::new(keys),
        }
    }

    /// Build a fresh recipient URL. Every call re-encrypts.
    pub fn build(&self, payload: &CapabilityPayload) -> Result<String, TokenError> {
        build_recipient_url(payload, self.codec.keys())
    }

    pub fn open(&self, url: &str) -> Result<CapabilityPayload, LinkError> {
        open_recipient_url(url, self.codec.keys())
    }

    #[inline]
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }
}
