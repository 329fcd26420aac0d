//! Routing of inbound traffic to handlers.

use futures_util::FutureExt;
use slircbot_proto::{ChannelExt, Message};
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{Instrument, debug, error, warn};

use super::acl;
use super::context::HandlerContext;
use super::registry::{HandlerTable, Registry};
use crate::client::{ChatMessage, Client, ClientEvent};
use crate::error::HandlerResult;
use crate::telemetry::{HandlerTimer, spans};

/// What one dispatch did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Nothing routable.
    Ignored,
    /// A command was invoked.
    Command { name: String, input: String },
    /// A command resolved but its access list rejected it.
    Denied { name: String },
    /// The token matched several commands; a disambiguation reply was sent.
    Ambiguous { candidates: Vec<String> },
    /// Regex handlers invoked (possibly none).
    Regex { handlers: Vec<String> },
    /// Event handlers invoked (possibly none).
    Events { handlers: Vec<String> },
}

enum Resolution {
    None,
    One(String),
    Many(Vec<String>),
}

/// Consumes client events and runs the matching handlers.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<Registry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Route one client event. Only chat messages and protocol events are
    /// routed; everything else is [`DispatchOutcome::Ignored`].
    pub fn dispatch(&self, client: &Client, event: ClientEvent) -> DispatchOutcome {
        match event {
            ClientEvent::Message(chat) => self.dispatch_message(client, chat),
            ClientEvent::Event(msg) => self.dispatch_event(client, msg),
            _ => DispatchOutcome::Ignored,
        }
    }

    /// Invoke every event handler registered for `event.command` or `*`.
    pub fn dispatch_event(&self, client: &Client, event: Message) -> DispatchOutcome {
        let table = self.registry.snapshot();
        let options = client.options();
        let channel = event.param(0).filter(|p| p.is_channel_name());
        let reply_target = event.response_target().map(str::to_owned);

        let mut handlers = Vec::new();
        for record in table.events() {
            if !record.matches(&event.command) || !acl::is_allowed(options, &record.name, channel) {
                continue;
            }
            let ctx = self.context(client, reply_target.clone());
            let handler = record.handler.clone();
            let msg = event.clone();
            spawn_handler("event", &record.name, client.name(), channel, async move {
                handler.handle(ctx, msg).await
            });
            handlers.push(record.name.clone());
        }
        DispatchOutcome::Events { handlers }
    }

    /// Route a chat message: a prefixed command first, regex handlers if no
    /// command resolves.
    pub fn dispatch_message(&self, client: &Client, msg: ChatMessage) -> DispatchOutcome {
        let table = self.registry.snapshot();
        let options = client.options();

        if let Some(rest) = msg.text.strip_prefix(options.command_prefix.as_str()) {
            let token = rest.split(char::is_whitespace).next().unwrap_or_default();
            if !token.is_empty() {
                let input = strip_separator(&rest[token.len()..]).to_string();
                match resolve(&table, token) {
                    Resolution::One(name) => {
                        return self.run_command(client, &table, &name, msg, input);
                    }
                    Resolution::Many(candidates) => {
                        debug!(client = %client.name(), token, ?candidates, "Ambiguous command");
                        let ctx = self.context(client, Some(msg.reply_target().to_string()));
                        let reply = candidates.join(", ");
                        spawn_handler(
                            "disambiguation",
                            token,
                            client.name(),
                            msg.channel(),
                            async move {
                                ctx.respond(&reply);
                                Ok(())
                            },
                        );
                        return DispatchOutcome::Ambiguous { candidates };
                    }
                    Resolution::None => {}
                }
            }
        }

        self.run_regexes(client, &table, msg)
    }

    fn run_command(
        &self,
        client: &Client,
        table: &HandlerTable,
        name: &str,
        msg: ChatMessage,
        input: String,
    ) -> DispatchOutcome {
        let Some(record) = table.command(name) else {
            return DispatchOutcome::Ignored;
        };
        let channel = msg.channel().map(str::to_owned);
        if !acl::is_allowed(client.options(), &record.name, channel.as_deref()) {
            debug!(client = %client.name(), command = %record.name, "Command denied");
            return DispatchOutcome::Denied {
                name: record.name.clone(),
            };
        }

        let ctx = self.context(client, Some(msg.reply_target().to_string()));
        let handler = record.handler.clone();
        let arg = input.clone();
        spawn_handler("command", &record.name, client.name(), channel.as_deref(), async move {
            handler.handle(ctx, msg, arg).await
        });
        DispatchOutcome::Command {
            name: record.name.clone(),
            input,
        }
    }

    fn run_regexes(&self, client: &Client, table: &HandlerTable, msg: ChatMessage) -> DispatchOutcome {
        let channel = msg.channel().map(str::to_owned);
        let mut handlers = Vec::new();
        for record in table.regexes() {
            let Some(caps) = record.regex.captures(&msg.text) else {
                continue;
            };
            if !acl::is_allowed(client.options(), &record.name, channel.as_deref()) {
                continue;
            }
            let captures: Vec<Option<String>> = caps
                .iter()
                .map(|m| m.map(|m| m.as_str().to_string()))
                .collect();
            let ctx = self.context(client, Some(msg.reply_target().to_string()));
            let handler = record.handler.clone();
            let chat = msg.clone();
            spawn_handler("regex", &record.name, client.name(), channel.as_deref(), async move {
                handler.handle(ctx, chat, captures).await
            });
            handlers.push(record.name.clone());
        }
        DispatchOutcome::Regex { handlers }
    }

    fn context(&self, client: &Client, reply_target: Option<String>) -> HandlerContext {
        HandlerContext::new(client.clone(), self.registry.clone(), reply_target)
    }
}

/// Drop the single whitespace character separating a token from its input.
fn strip_separator(after: &str) -> &str {
    match after.chars().next() {
        Some(c) if c.is_whitespace() => &after[c.len_utf8()..],
        _ => after,
    }
}

/// Exact name or alias first, then unique prefix.
fn resolve(table: &HandlerTable, token: &str) -> Resolution {
    if table.command(token).is_some() {
        return Resolution::One(token.to_string());
    }
    let found = table.commands_with_prefix(token);
    match found.as_slice() {
        [] => Resolution::None,
        [one] => Resolution::One(one.name.clone()),
        many => Resolution::Many(many.iter().map(|r| r.name.clone()).collect()),
    }
}

/// Run a handler in its own task. Errors and panics are logged and go no
/// further.
fn spawn_handler<F>(kind: &'static str, name: &str, client: &str, target: Option<&str>, fut: F)
where
    F: Future<Output = HandlerResult> + Send + 'static,
{
    let span = spans::handler(kind, name, client, target);
    let name = name.to_string();
    tokio::spawn(
        async move {
            let _timer = HandlerTimer::new(kind, name);
            match AssertUnwindSafe(fut).catch_unwind().await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(error = %e, code = e.error_code(), "Handler failed"),
                Err(panic) => error!(panic = %panic_message(&*panic), "Handler panicked"),
            }
        }
        .instrument(span),
    );
}

pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
