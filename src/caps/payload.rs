//! The capability payload sealed inside every recipient token.
//!
//! The JSON form is fixed: `{"orderId":7,"walletAddress":"0x..."}`. Decoding
//! is strict (integer order id, well-formed address, no extra keys) so a
//! plaintext that merely looks similar is never accepted.

use crate::error::PayloadError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;
use std::sync::OnceLock;

static WALLET_ADDRESS: OnceLock<Regex> = OnceLock::new();

fn wallet_address_regex() -> &'static Regex {
    WALLET_ADDRESS.get_or_init(|| Regex::new("^0x[0-9a-fA-F]{40}$").expect("valid regex"))
}

/// An Ethereum wallet address: `0x` followed by 40 hex digits.
///
/// Case is preserved as given; EIP-55 checksums are not verified.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Parse a wallet address, rejecting anything that is not `0x` + 40 hex digits.
    pub fn parse(s: &str) -> Result<Self, PayloadError> {
        if wallet_address_regex().is_match(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(PayloadError::InvalidWalletAddress(s.to_string()))
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for WalletAddress {
    type Error = PayloadError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if wallet_address_regex().is_match(&value) {
            Ok(Self(value))
        } else {
            Err(PayloadError::InvalidWalletAddress(value))
        }
    }
}

impl From<WalletAddress> for String {
    fn from(value: WalletAddress) -> Self {
        value.0
    }
}

impl FromStr for WalletAddress {
    type Err = PayloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for WalletAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a recipient link grants access to: one order, for one wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CapabilityPayload {
    order_id: NonZeroU64,
    wallet_address: WalletAddress,
}

impl CapabilityPayload {
    /// Build a payload. Fails if `order_id` is zero.
    pub fn new(order_id: u64, wallet_address: WalletAddress) -> Result<Self, PayloadError> {
        let order_id = NonZeroU64::new(order_id).ok_or(PayloadError::NonPositiveOrderId)?;
        Ok(Self {
            order_id,
            wallet_address,
        })
    }

    #[inline]
    pub fn order_id(&self) -> u64 {
        self.order_id.get()
    }

    #[inline]
    pub fn wallet_address(&self) -> &WalletAddress {
        &self.wallet_address
    }
}
