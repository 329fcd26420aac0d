//! `Message` parsing on top of the nom grammar.

use std::borrow::Cow;
use std::str::FromStr;

use crate::error::ProtocolError;
use crate::prefix::Prefix;

use super::nom_parser::ParsedMessage;
use super::tags::unescape_tag_value;
use super::types::{Message, Tag};

/// Tag keys seen on nearly every line from IRCv3 and Twitch servers are
/// borrowed instead of allocated.
#[inline]
fn intern_tag_key(key: &str) -> Cow<'static, str> {
    match key {
        "time" => Cow::Borrowed("time"),
        "msgid" => Cow::Borrowed("msgid"),
        "account" => Cow::Borrowed("account"),
        "batch" => Cow::Borrowed("batch"),
        "badges" => Cow::Borrowed("badges"),
        "color" => Cow::Borrowed("color"),
        "display-name" => Cow::Borrowed("display-name"),
        "user-id" => Cow::Borrowed("user-id"),
        _ => Cow::Owned(key.to_owned()),
    }
}

fn parse_tags_string(tags: &str) -> Vec<Tag> {
    tags.split(';')
        .filter(|s| !s.is_empty())
        .map(|tag| match tag.split_once('=') {
            Some((key, value)) => Tag(intern_tag_key(key), Some(unescape_tag_value(value))),
            None => Tag(intern_tag_key(tag), None),
        })
        .collect()
}

impl Message {
    /// Parse one protocol line. A trailing CR/LF is ignored.
    ///
    /// Returns `None` for anything that does not match the grammar; use
    /// [`str::parse`] to learn why.
    pub fn parse(line: &str) -> Option<Message> {
        line.parse().ok()
    }
}

impl FromStr for Message {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Message, Self::Err> {
        let line = s.trim_end_matches(['\r', '\n']);
        let parsed = ParsedMessage::parse(line).map_err(|cause| ProtocolError::InvalidMessage {
            string: s.to_owned(),
            cause,
        })?;

        Ok(Message {
            tags: parsed.tags.map(parse_tags_string),
            prefix: parsed.prefix.map(Prefix::new_from_str),
            command: parsed.command.to_owned(),
            params: parsed.params.iter().map(|p| (*p).to_owned()).collect(),
            raw: Some(line.to_owned()),
        })
    }
}
