//! slircbot - Straylight IRC bot core.
//!
//! Persistent connections to any number of networks, a registration and
//! capability handshake per connection, and an access-controlled pipeline
//! of command, regex, event and filter handlers.
//!
//! Inbound: socket → [`network::Connection`] → [`client::Client`] →
//! [`manager::ClientManager`] → [`dispatch::Dispatcher`] → handler.
//! Outbound: handler → filter chain → client → connection → socket.

pub mod bot;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod manager;
pub mod network;
pub mod plugins;
pub mod telemetry;

pub use bot::Bot;
pub use client::{ChatMessage, Client, ClientEvent};
pub use config::{ClientOptions, Config};
pub use dispatch::{DispatchOutcome, Dispatcher, HandlerContext, Registry};
pub use error::{HandlerError, HandlerResult, RegistryError, TransportError};
pub use manager::{ClientManager, ManagerEvent};

pub use slircbot_proto as proto;
