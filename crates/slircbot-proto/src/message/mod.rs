//! IRC message type, parser and serializer.

mod nom_parser;
mod parse;
mod serialize;
/// IRCv3 tag escaping.
pub mod tags;
mod types;

pub use self::types::{Message, Tag};
