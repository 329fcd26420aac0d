use async_trait::async_trait;
use slircbot_proto::Message;
use tracing::info;

use crate::dispatch::{EventHandler, HandlerContext};
use crate::error::HandlerResult;

/// Events too frequent or too boring to log: keepalive, MOTD, welcome and
/// LUSERS numerics.
pub const NOISE_EVENTS: &[&str] = &[
    "PING", "PONG", "372", "375", "376", "001", "002", "003", "004", "005", "251", "252", "253",
    "254", "255", "265", "266",
];

/// Logs every non-noise protocol event.
pub struct EventLogger;

impl EventLogger {
    pub fn is_noise(event: &Message) -> bool {
        NOISE_EVENTS.iter().any(|n| event.is(n))
    }
}

#[async_trait]
impl EventHandler for EventLogger {
    async fn handle(&self, ctx: HandlerContext, event: Message) -> HandlerResult {
        if Self::is_noise(&event) {
            return Ok(());
        }
        info!(
            target: "slircbot::eventlog",
            client = %ctx.options().name,
            command = %event.command,
            source = ?event.nick(),
            params = ?event.params,
            "event"
        );
        Ok(())
    }
}
