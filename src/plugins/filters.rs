//! Outbound content filters.

use slircbot_proto::Message;

use crate::dispatch::{Filter, FilterContext};

/// Payloads the bot must never repeat: DCC exploits and known spam.
pub const SPAM_WORDS: &[&str] = &[
    "DCC SEND",
    "1nj3ct",
    "thewrestlinggame",
    "startkeylogger",
    "hybux",
    "\\0",
    "\\x01",
    "!coz",
    "!tell /x",
];

/// Vetoes outbound `PRIVMSG`s containing any of [`SPAM_WORDS`].
pub struct SpamFilter;

impl Filter for SpamFilter {
    fn filter(&self, msg: Message, _ctx: &FilterContext<'_>) -> Option<Message> {
        if !msg.is("PRIVMSG") {
            return Some(msg);
        }
        let Some(text) = msg.param(1) else {
            return Some(msg);
        };
        if SPAM_WORDS.iter().any(|w| text.contains(w)) {
            return None;
        }
        Some(msg)
    }
}

/// Vetoes outbound messages that carry a prefix whose nick contains `bot`,
/// so relayed bot output is never echoed back out.
pub struct BotFilter;

impl Filter for BotFilter {
    fn filter(&self, msg: Message, _ctx: &FilterContext<'_>) -> Option<Message> {
        if msg.nick().is_some_and(|n| n.to_ascii_lowercase().contains("bot")) {
            return None;
        }
        Some(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientOptions;

    fn run(msg: Message) -> Option<Message> {
        let options = ClientOptions::new("t", "localhost", 6667, "bot");
        SpamFilter.filter(msg, &FilterContext { options: &options })
    }

    #[test]
    fn spam_is_vetoed() {
        assert!(run(Message::privmsg("#c", "try DCC SEND exploit")).is_none());
        assert!(run(Message::privmsg("#c", "visit hybux now")).is_none());
    }

    #[test]
    fn clean_messages_pass() {
        let msg = Message::privmsg("#c", "hello there");
        assert_eq!(run(msg.clone()), Some(msg));
    }

    #[test]
    fn other_commands_pass() {
        let msg = Message::join("#hybux");
        assert_eq!(run(msg.clone()), Some(msg));
    }

    #[test]
    fn bot_prefixed_messages_are_vetoed() {
        let options = ClientOptions::new("t", "localhost", 6667, "bot");
        let ctx = FilterContext { options: &options };
        let relayed = Message::privmsg("#c", "hi").with_prefix("otherbot!b@h");
        assert!(BotFilter.filter(relayed, &ctx).is_none());
        let plain = Message::privmsg("#c", "hi");
        assert!(BotFilter.filter(plain, &ctx).is_some());
    }
}
