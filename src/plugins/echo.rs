use async_trait::async_trait;

use crate::client::ChatMessage;
use crate::dispatch::{CommandHandler, HandlerContext};
use crate::error::HandlerResult;

/// `!echo <text>` replies `<nick>: <text>`.
pub struct EchoCommand;

#[async_trait]
impl CommandHandler for EchoCommand {
    async fn handle(&self, ctx: HandlerContext, msg: ChatMessage, input: String) -> HandlerResult {
        ctx.respond(&format!("{}: {}", msg.nick, input));
        Ok(())
    }
}
