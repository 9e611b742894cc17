//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Top-level config struct and file loading (Config, ConfigError)
//! - [`link`]: Recipient link keys and base URL (LinkConfig, KeyBlock)
//! - [`logging`]: Log level and format (LoggingConfig)
//! - [`validation`]: Startup checks that collect every problem at once

mod defaults;
mod link;
mod logging;
mod types;
pub mod validation;

pub use link::{KeyBlock, LinkConfig, SecretString};
pub use logging::{LogFormat, LoggingConfig};
pub use types::{Config, ConfigError};
pub use validation::{ValidationError, validate};
