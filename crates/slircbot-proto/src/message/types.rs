use std::borrow::Cow;

use crate::chan::ChannelExt;
use crate::prefix::Prefix;

/// An owned IRC message.
///
/// The command is kept as its wire token; slircbot only interprets a handful
/// of commands and treats everything else as an opaque event.
///
/// # Example
///
/// ```
/// use slircbot_proto::Message;
///
/// let msg = Message::parse(":nick!user@host PRIVMSG #channel :Hello!").unwrap();
/// assert_eq!(msg.hostname(), Some("host"));
///
/// let msg = Message::privmsg("#channel", "Hello!");
/// assert_eq!(msg.to_string(), "PRIVMSG #channel Hello!");
/// ```
#[derive(Clone, Debug)]
pub struct Message {
    /// IRCv3 message tags (e.g. `time`, `msgid`).
    pub tags: Option<Vec<Tag>>,
    /// Message source (e.g. `nick!user@host`).
    pub prefix: Option<Prefix>,
    /// Command word or three-digit numeric.
    pub command: String,
    /// Parameters, trailing parameter included as the last entry.
    pub params: Vec<String>,
    /// The line this message was parsed from. Not part of equality.
    pub raw: Option<String>,
}

/// An IRCv3 tag: key and optional value. A `None` value is a presence-only
/// tag (`@key`).
#[derive(Clone, PartialEq, Eq, Debug, Hash, PartialOrd, Ord)]
pub struct Tag(pub Cow<'static, str>, pub Option<String>);

impl Tag {
    /// Build a tag from owned or static parts.
    pub fn new(key: impl Into<Cow<'static, str>>, value: Option<String>) -> Self {
        Tag(key.into(), value)
    }
}

impl Message {
    /// Build a message from a command and its parameters.
    pub fn new<C, I, P>(command: C, params: I) -> Self
    where
        C: Into<String>,
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Message {
            tags: None,
            prefix: None,
            command: command.into(),
            params: params.into_iter().map(Into::into).collect(),
            raw: None,
        }
    }

    fn from_parts(command: &str, params: Vec<String>) -> Self {
        Message {
            tags: None,
            prefix: None,
            command: command.to_owned(),
            params,
            raw: None,
        }
    }

    /// Attach a prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<Prefix>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Attach a tag list.
    #[must_use]
    pub fn with_tags(mut self, tags: Vec<Tag>) -> Self {
        self.tags = Some(tags);
        self
    }

    /// The sender's nickname. For a server-originated message this is the
    /// server name.
    pub fn nick(&self) -> Option<&str> {
        match self.prefix.as_ref()? {
            Prefix::ServerName(name) => Some(name),
            p => p.nick(),
        }
    }

    /// The sender's ident (username).
    pub fn ident(&self) -> Option<&str> {
        self.prefix.as_ref()?.ident()
    }

    /// The sender's hostname.
    pub fn hostname(&self) -> Option<&str> {
        self.prefix.as_ref()?.host()
    }

    /// Look up a tag value by key. Presence-only tags yield `None`.
    pub fn tag_value(&self, key: &str) -> Option<&str> {
        self.tags
            .as_ref()?
            .iter()
            .find(|Tag(k, _)| k.as_ref() == key)
            .and_then(|Tag(_, v)| v.as_deref())
    }

    /// True if the tag is present, with or without a value.
    pub fn has_tag(&self, key: &str) -> bool {
        self.tags
            .as_ref()
            .is_some_and(|tags| tags.iter().any(|Tag(k, _)| k.as_ref() == key))
    }

    /// Case-insensitive command comparison.
    pub fn is(&self, command: &str) -> bool {
        self.command.eq_ignore_ascii_case(command)
    }

    /// Parameter `i`, if present.
    pub fn param(&self, i: usize) -> Option<&str> {
        self.params.get(i).map(String::as_str)
    }

    /// Where a reply to this message should go: the channel for channel
    /// traffic, otherwise the sender.
    pub fn response_target(&self) -> Option<&str> {
        match self.param(0) {
            Some(target) if target.is_channel_name() => Some(target),
            _ => self.nick(),
        }
    }

    /// `PRIVMSG <target> :<text>`
    #[must_use]
    pub fn privmsg(target: impl Into<String>, text: impl Into<String>) -> Self {
        Message::from_parts("PRIVMSG", vec![target.into(), text.into()])
    }

    /// `NOTICE <target> :<text>`
    #[must_use]
    pub fn notice(target: impl Into<String>, text: impl Into<String>) -> Self {
        Message::from_parts("NOTICE", vec![target.into(), text.into()])
    }

    /// `JOIN <channel>`
    #[must_use]
    pub fn join(channel: impl Into<String>) -> Self {
        Message::from_parts("JOIN", vec![channel.into()])
    }

    /// `PART <channel> [:<reason>]`
    #[must_use]
    pub fn part(channel: impl Into<String>, reason: Option<&str>) -> Self {
        let mut params: Vec<String> = vec![channel.into()];
        params.extend(reason.map(str::to_owned));
        Message::from_parts("PART", params)
    }

    /// `NICK <nickname>`
    #[must_use]
    pub fn change_nick(nickname: impl Into<String>) -> Self {
        Message::from_parts("NICK", vec![nickname.into()])
    }

    /// `USER <username> 0 * :<realname>`
    #[must_use]
    pub fn user(username: impl Into<String>, realname: impl Into<String>) -> Self {
        Message::from_parts(
            "USER",
            vec![username.into(), "0".into(), "*".into(), realname.into()],
        )
    }

    /// `PASS <password>`
    #[must_use]
    pub fn pass(password: impl Into<String>) -> Self {
        Message::from_parts("PASS", vec![password.into()])
    }

    /// `PING <token>`
    #[must_use]
    pub fn ping(token: impl Into<String>) -> Self {
        Message::from_parts("PING", vec![token.into()])
    }

    /// `PONG` echoing the parameters of a `PING`.
    #[must_use]
    pub fn pong<I, P>(params: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Message::new("PONG", params)
    }

    /// `CAP <subcommand> [args...]`
    #[must_use]
    pub fn cap<I, P>(subcommand: &str, args: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        let mut params: Vec<String> = vec![subcommand.to_owned()];
        params.extend(args.into_iter().map(Into::into));
        Message::from_parts("CAP", params)
    }
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        fn sorted(tags: &Option<Vec<Tag>>) -> Vec<&Tag> {
            let mut v: Vec<&Tag> = tags.iter().flatten().collect();
            v.sort();
            v
        }

        self.prefix == other.prefix
            && self.command == other.command
            && self.params == other.params
            && sorted(&self.tags) == sorted(&other.tags)
    }
}

impl Eq for Message {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_on_user_prefix() {
        let msg = Message::privmsg("#chan", "hi").with_prefix("dan!~d@example.com");
        assert_eq!(msg.nick(), Some("dan"));
        assert_eq!(msg.ident(), Some("~d"));
        assert_eq!(msg.hostname(), Some("example.com"));
        assert_eq!(msg.response_target(), Some("#chan"));
    }

    #[test]
    fn server_prefix_nick_falls_back_to_server_name() {
        let msg = Message::new("NOTICE", ["*", "Looking up your hostname"])
            .with_prefix("irc.example.net");
        assert_eq!(msg.nick(), Some("irc.example.net"));
        assert_eq!(msg.ident(), None);
    }

    #[test]
    fn private_message_responds_to_sender() {
        let msg = Message::privmsg("slircbot", "hi").with_prefix("dan!d@h");
        assert_eq!(msg.response_target(), Some("dan"));
    }

    #[test]
    fn equality_ignores_raw_and_tag_order() {
        let a = Message::privmsg("#a", "x").with_tags(vec![
            Tag::new("a", Some("1".into())),
            Tag::new("b", None),
        ]);
        let mut b = Message::privmsg("#a", "x").with_tags(vec![
            Tag::new("b", None),
            Tag::new("a", Some("1".into())),
        ]);
        b.raw = Some("@b;a=1 PRIVMSG #a x".into());
        assert_eq!(a, b);
        assert_ne!(a, Message::privmsg("#a", "y"));
    }

    #[test]
    fn tags_lookup() {
        let msg = Message::ping("x").with_tags(vec![
            Tag::new("time", Some("2024-01-01T00:00:00Z".into())),
            Tag::new("+flag", None),
        ]);
        assert_eq!(msg.tag_value("time"), Some("2024-01-01T00:00:00Z"));
        assert_eq!(msg.tag_value("+flag"), None);
        assert!(msg.has_tag("+flag"));
        assert!(!msg.has_tag("msgid"));
    }

    #[test]
    fn part_with_and_without_reason() {
        assert_eq!(Message::part("#a", None).params, vec!["#a"]);
        assert_eq!(Message::part("#a", Some("bye")).params, vec!["#a", "bye"]);
    }
}
