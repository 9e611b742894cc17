//! Unified error handling for recipient-link.
//!
//! Every error enum carries a static `error_code()` so callers can label logs
//! without rendering the message. Validation outcomes (age window, form
//! fields) are values, not errors, and live next to their validators.

use thiserror::Error;

// ============================================================================
// Token Errors (codec)
// ============================================================================

/// Errors produced by the token codec.
///
/// Decode-side failures collapse into a single kind so that a caller probing
/// with forged tokens learns nothing about which check rejected them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// The payload could not be serialized or sealed. Unreachable for a
    /// well-typed payload; treat as a defect.
    #[error("failed to encode capability payload")]
    EncodingFailure,

    /// The token is malformed, truncated, tampered with, or was sealed under
    /// a key this process does not hold.
    #[error("capability token is invalid or has been tampered with")]
    TamperedOrInvalidToken,
}

impl TokenError {
    /// Get a static error code string for log labelling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EncodingFailure => "encoding_failure",
            Self::TamperedOrInvalidToken => "tampered_or_invalid_token",
        }
    }
}

// ============================================================================
// Payload Errors (construction)
// ============================================================================

/// Errors raised while constructing a capability payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("order id must be a positive integer")]
    NonPositiveOrderId,

    #[error("not an Ethereum wallet address: {0:?}")]
    InvalidWalletAddress(String),
}

impl PayloadError {
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositiveOrderId => "non_positive_order_id",
            Self::InvalidWalletAddress(_) => "invalid_wallet_address",
        }
    }
}

// ============================================================================
// Link Errors (URL handling)
// ============================================================================

/// Errors raised while turning a recipient URL back into a payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    #[error("invalid recipient url: {0}")]
    InvalidUrl(String),

    /// The URL does not point at this deployment's recipient page.
    #[error("url is not a recipient link for this deployment")]
    ForeignUrl,

    #[error("recipient url has no token parameter")]
    MissingToken,

    #[error(transparent)]
    Token(#[from] TokenError),
}

impl LinkError {
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidUrl(_) => "invalid_url",
            Self::ForeignUrl => "foreign_url",
            Self::MissingToken => "missing_token",
            Self::Token(e) => e.error_code(),
        }
    }
}

// ============================================================================
// Key Errors (key material construction)
// ============================================================================

/// Errors raised while building [`KeyMaterial`](crate::caps::KeyMaterial).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("key id {0} is configured more than once")]
    DuplicateKeyId(u8),

    #[error("invalid base url {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl KeyError {
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateKeyId(_) => "duplicate_key_id",
            Self::InvalidBaseUrl { .. } => "invalid_base_url",
        }
    }
}
