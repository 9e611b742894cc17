//! Tracing setup and span constructors.

use crate::config::{LogFormat, LoggingConfig};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured level. Logs go to stderr; stdout is
/// reserved for command output. Must be called at most once.
pub fn init(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .init(),
    }
}

/// Standardized span constructors for link observability.
pub mod spans {
    use tracing::{Span, info_span};

    /// Create a span for issuing a recipient link.
    pub fn issue(order_id: u64) -> Span {
        info_span!("issue", order_id = order_id)
    }

    /// Create a span for redeeming a recipient link.
    pub fn redeem() -> Span {
        info_span!("redeem")
    }
}
