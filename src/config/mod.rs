//! Configuration loading and validation.
//!
//! - [`types`]: top-level [`Config`] and loading
//! - [`client`]: per-network [`ClientOptions`] and access lists
//! - [`defaults`]: serde default values
//! - [`validation`]: startup checks

mod client;
mod defaults;
mod types;
mod validation;

pub use client::{AclLists, ChannelConfig, ChannelOption, ClientOptions, ConnectionConfig, UserConfig};
pub use types::{Config, ConfigError};
pub use validation::{ValidationError, validate};
