//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use std::collections::HashSet;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("no [[clients]] configured")]
    NoClients,
    #[error("clients[{0}].name is required")]
    MissingClientName(usize),
    #[error("client name '{0}' is used more than once")]
    DuplicateClientName(String),
    #[error("client '{0}': user.nickname is required")]
    EmptyNickname(String),
    #[error("client '{0}': command_prefix must not be empty")]
    EmptyCommandPrefix(String),
    #[error("client '{0}': connection.host is required")]
    EmptyHost(String),
    #[error("client '{0}': connection.port must not be 0")]
    InvalidPort(String),
    #[error("client '{0}': channel entry with an empty name")]
    EmptyChannelName(String),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    if config.clients.is_empty() {
        errors.push(ValidationError::NoClients);
    }

    for (i, client) in config.clients.iter().enumerate() {
        let name = &client.name;
        if name.is_empty() {
            errors.push(ValidationError::MissingClientName(i));
        } else if !seen.insert(name.as_str()) {
            errors.push(ValidationError::DuplicateClientName(name.clone()));
        }

        if client.user.nickname.is_empty() {
            errors.push(ValidationError::EmptyNickname(name.clone()));
        }
        if client.command_prefix.is_empty() {
            errors.push(ValidationError::EmptyCommandPrefix(name.clone()));
        }
        if client.connection.host.is_empty() {
            errors.push(ValidationError::EmptyHost(name.clone()));
        }
        if client.connection.port == 0 {
            errors.push(ValidationError::InvalidPort(name.clone()));
        }
        if client.channels.iter().any(|c| c.name().is_empty()) {
            errors.push(ValidationError::EmptyChannelName(name.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
