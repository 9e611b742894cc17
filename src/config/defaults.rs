//! Default value functions for configuration.

// =============================================================================
// Link Defaults
// =============================================================================

pub fn default_key_id() -> u8 {
    1
}

// =============================================================================
// Logging Defaults
// =============================================================================

pub fn default_log_level() -> String {
    "info".to_string()
}
