//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use crate::caps::{check_base_url, is_weak_secret};
use std::collections::HashSet;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("link.base_url is required")]
    MissingBaseUrl,
    #[error("link.base_url {url:?} is invalid: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("secret for key id {0} is empty, a placeholder, or shorter than 16 characters")]
    WeakSecret(u8),
    #[error("key id {0} is configured more than once")]
    DuplicateKeyId(u8),
}

impl ValidationError {
    /// Whether the `RECIPIENT_LINK_ALLOW_INSECURE_KEY` override may waive this error.
    pub fn is_waivable(&self) -> bool {
        matches!(self, Self::WeakSecret(_))
    }
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let link = &config.link;

    if link.base_url.is_empty() {
        errors.push(ValidationError::MissingBaseUrl);
    } else if let Err(reason) = check_base_url(&link.base_url) {
        errors.push(ValidationError::InvalidBaseUrl {
            url: link.base_url.clone(),
            reason,
        });
    }

    let mut seen = HashSet::new();
    for block in std::iter::once(&link.key).chain(link.retired_keys.iter()) {
        if !seen.insert(block.id) {
            errors.push(ValidationError::DuplicateKeyId(block.id));
        }
        if is_weak_secret(block.secret.expose()) {
            errors.push(ValidationError::WeakSecret(block.id));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
