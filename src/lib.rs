//! recipient-link - capability links for order deliveries, and registration
//! eligibility checks.
//!
//! A recipient link is an unguessable URL that carries an order id and a
//! wallet address inside an authenticated, encrypted token. Holding the link
//! is the authorization: there is no server-side lookup table.
//!
//! - [`caps`]: key material, token codec, and link construction
//! - [`eligibility`]: the 10 to 100 year age window
//! - [`registration`]: field-level validation of registration forms
//! - [`service`]: issuing and redeeming links with an audit trail
//! - [`config`]: TOML configuration and startup validation

pub mod caps;
pub mod config;
pub mod eligibility;
pub mod error;
pub mod registration;
pub mod service;
pub mod telemetry;

pub use caps::{CapabilityLinkBuilder, CapabilityPayload, EncryptedToken, KeyMaterial, TokenCodec};
pub use eligibility::EligibilityWindowValidator;
pub use error::{KeyError, LinkError, PayloadError, TokenError};
pub use registration::RegistrationValidator;
pub use service::RecipientLinkService;
