//! What a handler can do.

use slircbot_proto::Message;
use std::sync::Arc;
use tracing::debug;

use super::handler::FilterContext;
use super::registry::Registry;
use crate::client::Client;
use crate::config::ClientOptions;

/// Handed to every handler invocation. Every send goes through the filter
/// chain current at the time of sending.
#[derive(Clone)]
pub struct HandlerContext {
    client: Client,
    registry: Arc<Registry>,
    reply_target: Option<String>,
}

impl HandlerContext {
    pub(crate) fn new(client: Client, registry: Arc<Registry>, reply_target: Option<String>) -> Self {
        Self {
            client,
            registry,
            reply_target,
        }
    }

    /// The client's configuration.
    pub fn options(&self) -> &ClientOptions {
        self.client.options()
    }

    /// Where [`respond`](Self::respond) sends, if anywhere.
    pub fn reply_target(&self) -> Option<&str> {
        self.reply_target.as_deref()
    }

    /// Names of every registered command, sorted.
    pub fn command_names(&self) -> Vec<String> {
        let table = self.registry.snapshot();
        table.command_names().into_iter().map(str::to_owned).collect()
    }

    /// `PRIVMSG <target> :<text>`. Returns whether a line was written.
    pub fn send_message(&self, target: &str, text: &str) -> bool {
        self.send(Message::privmsg(target, text))
    }

    /// Reply where the triggering message came from: the channel, or the
    /// sender of a private message.
    pub fn respond(&self, text: &str) -> bool {
        match &self.reply_target {
            Some(target) => self.send_message(target, text),
            None => false,
        }
    }

    /// Send a raw protocol line. Lines that do not parse are dropped.
    pub fn send_raw(&self, line: &str) -> bool {
        match Message::parse(line) {
            Some(msg) => self.send(msg),
            None => {
                debug!(client = %self.client.name(), line = %line, "Dropping unparseable raw line");
                false
            }
        }
    }

    fn send(&self, msg: Message) -> bool {
        let table = self.registry.snapshot();
        let ctx = FilterContext {
            options: self.client.options(),
        };
        match table.apply_filters(msg, &ctx) {
            Some(msg) => self.client.write(&msg),
            None => false,
        }
    }
}
