//! Events a client reports to its owner.

use slircbot_proto::{ChannelExt, Message};
use std::time::Duration;

use crate::error::SharedTransportError;

/// A `PRIVMSG` split into the parts handlers care about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// The full parsed line.
    pub message: Message,
    /// Sender nickname; empty if the line had no prefix.
    pub nick: String,
    /// First parameter: a channel, or our own nick for private messages.
    pub target: String,
    /// Message text.
    pub text: String,
}

impl ChatMessage {
    /// Classify `msg` as chat. Needs a `PRIVMSG` with target and text.
    pub fn from_message(msg: &Message) -> Option<Self> {
        if !msg.is("PRIVMSG") || msg.params.len() < 2 {
            return None;
        }
        Some(Self {
            nick: msg.nick().unwrap_or_default().to_owned(),
            target: msg.params[0].clone(),
            text: msg.params[1].clone(),
            message: msg.clone(),
        })
    }

    /// The channel, if this was sent to one.
    pub fn channel(&self) -> Option<&str> {
        self.target.is_channel_name().then_some(self.target.as_str())
    }

    /// Where a reply goes: the channel, or the sender for private messages.
    pub fn reply_target(&self) -> &str {
        self.channel().unwrap_or(&self.nick)
    }
}

/// Everything a [`Client`](super::Client) reports.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// The transport is up; registration is about to be sent.
    Connected,
    /// Registration lines were sent.
    Registered,
    /// One inbound line.
    Raw(String),
    /// One outbound line, as sent.
    Sent(String),
    /// Any parsed inbound message that is not chat.
    Event(Message),
    /// A chat message.
    Message(ChatMessage),
    /// The transport closed.
    Closed,
    /// A transport error.
    Error(SharedTransportError),
    /// A reconnect is scheduled.
    Reconnecting(Duration),
    /// Stopped on request.
    Disconnected,
}

impl ClientEvent {
    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Registered => "registered",
            Self::Raw(_) => "raw",
            Self::Sent(_) => "sent",
            Self::Event(_) => "event",
            Self::Message(_) => "message",
            Self::Closed => "closed",
            Self::Error(_) => "error",
            Self::Reconnecting(_) => "reconnecting",
            Self::Disconnected => "disconnected",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_chat() {
        let msg = Message::parse(":dan!d@h PRIVMSG #chan :!echo hello").unwrap();
        let chat = ChatMessage::from_message(&msg).unwrap();
        assert_eq!(chat.nick, "dan");
        assert_eq!(chat.channel(), Some("#chan"));
        assert_eq!(chat.text, "!echo hello");
        assert_eq!(chat.reply_target(), "#chan");
    }

    #[test]
    fn private_chat_replies_to_sender() {
        let msg = Message::parse(":dan!d@h PRIVMSG slircbot :hi").unwrap();
        let chat = ChatMessage::from_message(&msg).unwrap();
        assert_eq!(chat.channel(), None);
        assert_eq!(chat.reply_target(), "dan");
    }

    #[test]
    fn short_privmsg_is_not_chat() {
        let msg = Message::parse(":dan!d@h PRIVMSG #chan").unwrap();
        assert!(ChatMessage::from_message(&msg).is_none());
        let msg = Message::parse(":dan!d@h NOTICE #chan :hi").unwrap();
        assert!(ChatMessage::from_message(&msg).is_none());
    }
}
