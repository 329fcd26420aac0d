//! Integration test common infrastructure.
//!
//! A scripted IRC server on a loopback listener, and helpers for building
//! bot clients pointed at it and waiting on their events.

pub mod bot;
pub mod server;

#[allow(unused_imports)]
pub use bot::{options_for, wait_for, wait_for_tagged};
#[allow(unused_imports)]
pub use server::{MockServer, ServerConn};
