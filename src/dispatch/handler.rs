//! Handler traits and closure adapters.
//!
//! Command, regex and event handlers are async and run in their own task.
//! Filters are synchronous: they sit on the outbound path and must not
//! block a send.

use async_trait::async_trait;
use slircbot_proto::Message;
use std::future::Future;

use super::HandlerContext;
use crate::client::ChatMessage;
use crate::config::ClientOptions;
use crate::error::HandlerResult;

/// Handles `<prefix><name> <input>` chat commands.
#[async_trait]
pub trait CommandHandler: Send + Sync + 'static {
    /// `input` is the text after the command token and one space.
    async fn handle(&self, ctx: HandlerContext, msg: ChatMessage, input: String) -> HandlerResult;
}

/// Handles chat lines matching a pattern.
#[async_trait]
pub trait RegexHandler: Send + Sync + 'static {
    /// `captures[0]` is the whole match; unmatched groups are `None`.
    async fn handle(
        &self,
        ctx: HandlerContext,
        msg: ChatMessage,
        captures: Vec<Option<String>>,
    ) -> HandlerResult;
}

/// Handles non-chat protocol messages.
#[async_trait]
pub trait EventHandler: Send + Sync + 'static {
    async fn handle(&self, ctx: HandlerContext, event: Message) -> HandlerResult;
}

/// What a filter can see besides the message.
pub struct FilterContext<'a> {
    pub options: &'a ClientOptions,
}

/// Outbound message filter.
pub trait Filter: Send + Sync + 'static {
    /// Return the message to send (possibly changed), or `None` to veto it.
    fn filter(&self, msg: Message, ctx: &FilterContext<'_>) -> Option<Message>;
}

// ============================================================================
// Closure adapters
// ============================================================================

pub struct CommandFn<F>(F);

/// Use an async closure as a [`CommandHandler`].
pub fn command_fn<F, Fut>(f: F) -> CommandFn<F>
where
    F: Fn(HandlerContext, ChatMessage, String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    CommandFn(f)
}

#[async_trait]
impl<F, Fut> CommandHandler for CommandFn<F>
where
    F: Fn(HandlerContext, ChatMessage, String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    async fn handle(&self, ctx: HandlerContext, msg: ChatMessage, input: String) -> HandlerResult {
        (self.0)(ctx, msg, input).await
    }
}

pub struct RegexFn<F>(F);

/// Use an async closure as a [`RegexHandler`].
pub fn regex_fn<F, Fut>(f: F) -> RegexFn<F>
where
    F: Fn(HandlerContext, ChatMessage, Vec<Option<String>>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    RegexFn(f)
}

#[async_trait]
impl<F, Fut> RegexHandler for RegexFn<F>
where
    F: Fn(HandlerContext, ChatMessage, Vec<Option<String>>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    async fn handle(
        &self,
        ctx: HandlerContext,
        msg: ChatMessage,
        captures: Vec<Option<String>>,
    ) -> HandlerResult {
        (self.0)(ctx, msg, captures).await
    }
}

pub struct EventFn<F>(F);

/// Use an async closure as an [`EventHandler`].
pub fn event_fn<F, Fut>(f: F) -> EventFn<F>
where
    F: Fn(HandlerContext, Message) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    EventFn(f)
}

#[async_trait]
impl<F, Fut> EventHandler for EventFn<F>
where
    F: Fn(HandlerContext, Message) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    async fn handle(&self, ctx: HandlerContext, event: Message) -> HandlerResult {
        (self.0)(ctx, event).await
    }
}

pub struct FilterFn<F>(F);

/// Use a closure as a [`Filter`].
pub fn filter_fn<F>(f: F) -> FilterFn<F>
where
    F: Fn(Message, &FilterContext<'_>) -> Option<Message> + Send + Sync + 'static,
{
    FilterFn(f)
}

impl<F> Filter for FilterFn<F>
where
    F: Fn(Message, &FilterContext<'_>) -> Option<Message> + Send + Sync + 'static,
{
    fn filter(&self, msg: Message, ctx: &FilterContext<'_>) -> Option<Message> {
        (self.0)(msg, ctx)
    }
}
