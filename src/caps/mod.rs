//! Recipient capability links.
//!
//! A recipient of a delivery often has no account. Instead of a session, they
//! receive a link whose token *is* the authorization: it names one order and
//! one wallet, sealed so that only this deployment can read or forge it.
//!
//! # Architecture
//!
//! 1. **[`KeyMaterial`]** - active and retired token keys plus the public base
//!    URL. Built once from configuration, then shared read-only.
//!
//! 2. **[`TokenCodec`]** - seals a [`CapabilityPayload`] into an
//!    [`EncryptedToken`] with ChaCha20-Poly1305 and opens it again.
//!
//! 3. **[`CapabilityLinkBuilder`]** - wraps tokens in
//!    `<base_url>recipient/?key=<token>` URLs and parses them back.
//!
//! # Security Properties
//!
//! - Tokens are authenticated: any flipped byte or truncation is rejected
//! - All decode failures share one error kind, so forgers get no oracle
//! - The key id travels in an authenticated header for rotation
//! - Key bytes are wiped on drop and never printed
//!
//! # Usage
//!
//! ```ignore
//! let keys = Arc::new(KeyMaterial::new(TokenKey::derive(1, &secret), base_url)?);
//! let links = CapabilityLinkBuilder::new(keys);
//!
//! let url = links.build(&CapabilityPayload::new(order_id, wallet)?)?;
//! // ... later, when the recipient opens it:
//! let payload = links.open(&url)?;
//! ```

mod codec;
mod keys;
mod link;
mod payload;

pub use codec::{EncryptedToken, TOKEN_VERSION, TokenCodec, decode, encode};
pub use keys::{KEY_LEN, KeyMaterial, MIN_SECRET_LEN, TokenKey, check_base_url, is_weak_secret};
pub use link::{
    CapabilityLinkBuilder, RECIPIENT_PATH, TOKEN_PARAM, build_recipient_url, extract_token,
    open_recipient_url, recipient_prefix,
};
pub use payload::{CapabilityPayload, WalletAddress};
