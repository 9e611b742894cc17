//! Recipient link service - issues and redeems links with an audit trail.
//!
//! The codec and link builder are pure and silent. This is the layer that
//! logs: every issuance and every redemption attempt is recorded with the
//! order id and key id. Wallet addresses and tokens are never logged.

use crate::caps::{CapabilityLinkBuilder, CapabilityPayload, EncryptedToken, KeyMaterial};
use crate::error::{LinkError, TokenError};
use crate::telemetry::spans;
use std::sync::Arc;
use tracing::{debug, error};

/// Issues recipient links and redeems them.
#[derive(Debug, Clone)]
pub struct RecipientLinkService {
    links: CapabilityLinkBuilder,
}

impl RecipientLinkService {
    pub fn new(keys: Arc<KeyMaterial>) -> Self {
        Self {
            links: CapabilityLinkBuilder::new(keys),
        }
    }

    fn keys(&self) -> &KeyMaterial {
        self.links.codec().keys()
    }

    /// Issue a fresh recipient link for `payload`.
    pub fn issue(&self, payload: &CapabilityPayload) -> Result<String, TokenError> {
        let _span = spans::issue(payload.order_id()).entered();
        match self.links.build(payload) {
            Ok(url) => {
                debug!(
                    order_id = payload.order_id(),
                    key_id = self.keys().active_key().id(),
                    "Recipient link issued"
                );
                Ok(url)
            }
            Err(e) => {
                error!(
                    order_id = payload.order_id(),
                    error_code = e.error_code(),
                    "Failed to issue recipient link"
                );
                Err(e)
            }
        }
    }

    /// Redeem a full recipient URL.
    pub fn redeem(&self, url: &str) -> Result<CapabilityPayload, LinkError> {
        let _span = spans::redeem().entered();
        let result = self.links.open(url);
        self.log_redemption(&result);
        result
    }

    /// Redeem a bare token, already extracted from its URL.
    pub fn redeem_token(&self, token: &EncryptedToken) -> Result<CapabilityPayload, LinkError> {
        let _span = spans::redeem().entered();
        let result = self.links.codec().decode(token).map_err(LinkError::from);
        self.log_redemption(&result);
        result
    }

    fn log_redemption(&self, result: &Result<CapabilityPayload, LinkError>) {
        match result {
            Ok(payload) => debug!(order_id = payload.order_id(), "Recipient link redeemed"),
            Err(e) => debug!(error_code = e.error_code(), "Recipient link rejected"),
        }
    }
}
