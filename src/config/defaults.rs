//! Default value functions for configuration.

/// Returns `true` (for serde defaults).
pub fn default_true() -> bool {
    true
}

pub fn default_command_prefix() -> String {
    "!".to_string()
}

pub fn default_port() -> u16 {
    6667
}

/// Seconds between a dropped connection and the next attempt.
pub fn default_reconnect_delay_secs() -> u64 {
    30
}

/// Seconds between registration and auto-joining channels.
pub fn default_join_delay_secs() -> u64 {
    3
}
