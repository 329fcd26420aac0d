//! Housekeeping handlers: help, invites, nick collisions.

use async_trait::async_trait;
use slircbot_proto::{ChannelExt, Message};
use tracing::info;

use crate::client::ChatMessage;
use crate::dispatch::{CommandHandler, EventHandler, HandlerContext};
use crate::error::{HandlerError, HandlerResult};

/// Lists the registered commands to the sender, privately.
pub struct HelpCommand;

#[async_trait]
impl CommandHandler for HelpCommand {
    async fn handle(&self, ctx: HandlerContext, msg: ChatMessage, _input: String) -> HandlerResult {
        if msg.nick.is_empty() {
            return Err(HandlerError::InvalidInput("help request without a sender".into()));
        }
        let commands = ctx.command_names().join(", ");
        ctx.send_message(&msg.nick, &format!("Available commands: {commands}"));
        Ok(())
    }
}

/// Joins any channel the bot is invited to.
pub struct InviteHandler;

#[async_trait]
impl EventHandler for InviteHandler {
    async fn handle(&self, ctx: HandlerContext, event: Message) -> HandlerResult {
        let Some(channel) = event.param(1).filter(|c| c.is_channel_name()) else {
            return Err(HandlerError::InvalidInput("INVITE without a channel".into()));
        };
        info!(client = %ctx.options().name, channel, by = ?event.nick(), "Invited");
        ctx.send_raw(&format!("JOIN {channel}"));
        Ok(())
    }
}

/// On `433` (nickname in use) retries with an underscore appended to the
/// nick the server rejected.
pub struct NickInUseHandler;

#[async_trait]
impl EventHandler for NickInUseHandler {
    async fn handle(&self, ctx: HandlerContext, event: Message) -> HandlerResult {
        let rejected = event
            .param(1)
            .unwrap_or(ctx.options().user.nickname.as_str());
        ctx.send_raw(&format!("NICK {rejected}_"));
        Ok(())
    }
}
