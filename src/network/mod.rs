//! Transport layer: one connection per configured network.
//!
//! - [`connection`]: connect/reconnect state machine and line framing
//! - [`stream`]: plain or TLS byte stream
//! - [`tls`]: rustls client setup

mod connection;
mod stream;
mod tls;

pub use connection::{Connection, ConnectionEvent, ConnectionState};
pub use stream::IrcStream;
