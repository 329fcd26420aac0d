//! # slircbot-proto
//!
//! The wire layer of slircbot: parsing and serializing single IRC protocol
//! lines, plus a tokio codec that frames a byte stream into lines.
//!
//! ## Quick Start
//!
//! ```rust
//! use slircbot_proto::Message;
//!
//! let msg = Message::parse(":nick!user@host PRIVMSG #channel :hello there").unwrap();
//! assert_eq!(msg.command, "PRIVMSG");
//! assert_eq!(msg.nick(), Some("nick"));
//! assert_eq!(msg.params, vec!["#channel", "hello there"]);
//!
//! let reply = Message::privmsg("#channel", "hi back");
//! assert_eq!(reply.to_string(), "PRIVMSG #channel :hi back");
//! ```
//!
//! Lines that do not match the grammar are not an error at this layer:
//! [`Message::parse`] returns `None` and the caller drops them.

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod casemap;
pub mod chan;
pub mod error;
#[cfg(feature = "tokio")]
pub mod line;
pub mod message;
pub mod prefix;

pub use self::casemap::{irc_eq, irc_lower_char, irc_to_lower};
pub use self::chan::ChannelExt;
pub use self::error::{MessageParseError, ProtocolError};
#[cfg(feature = "tokio")]
pub use self::line::LineCodec;
pub use self::message::{Message, Tag};
pub use self::prefix::Prefix;

/// Default maximum accepted line length in bytes, tags included.
///
/// RFC 1459 caps the non-tag part at 512 bytes; IRCv3 allows up to 8191
/// bytes of tags on top of that.
pub const MAX_IRC_LINE_LEN: usize = 8191 + 512;
