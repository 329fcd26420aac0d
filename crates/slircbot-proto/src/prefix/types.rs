//! IRC message prefix types.
//!
//! A prefix names the origin of a message: either a server or a user in
//! `nick!ident@host` form, where `!ident` and `@host` are both optional.

use std::str::FromStr;

/// IRC message prefix.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub enum Prefix {
    /// Server name (e.g. `irc.libera.chat`).
    ServerName(String),
    /// User prefix: (nickname, ident, hostname). Missing parts are empty.
    Nickname(String, String, String),
}

impl Prefix {
    /// Split a raw prefix into its parts.
    ///
    /// Never fails. A name part containing a dot with no `!` or `@` after it
    /// is taken to be a server name.
    pub fn new_from_str(s: &str) -> Self {
        #[derive(Copy, Clone, Eq, PartialEq)]
        enum Part {
            Name,
            Ident,
            Host,
        }

        let mut name = String::new();
        let mut ident = String::new();
        let mut host = String::new();
        let mut part = Part::Name;
        let mut is_server = false;

        for c in s.chars() {
            match c {
                '!' if part == Part::Name => {
                    is_server = false;
                    part = Part::Ident;
                }
                '@' if part != Part::Host => {
                    is_server = false;
                    part = Part::Host;
                }
                _ => {
                    if c == '.' && part == Part::Name {
                        is_server = true;
                    }
                    match part {
                        Part::Name => &mut name,
                        Part::Ident => &mut ident,
                        Part::Host => &mut host,
                    }
                    .push(c);
                }
            }
        }

        if is_server {
            Prefix::ServerName(name)
        } else {
            Prefix::Nickname(name, ident, host)
        }
    }

    /// Build a user prefix from its three parts.
    pub fn new(nick: impl Into<String>, ident: impl Into<String>, host: impl Into<String>) -> Self {
        Prefix::Nickname(nick.into(), ident.into(), host.into())
    }

    /// The nickname, for user prefixes.
    pub fn nick(&self) -> Option<&str> {
        match self {
            Prefix::Nickname(nick, _, _) if !nick.is_empty() => Some(nick),
            _ => None,
        }
    }

    /// The ident (username), for user prefixes that carry one.
    pub fn ident(&self) -> Option<&str> {
        match self {
            Prefix::Nickname(_, ident, _) if !ident.is_empty() => Some(ident),
            _ => None,
        }
    }

    /// The hostname: the server name itself, or the `@host` part of a user.
    pub fn host(&self) -> Option<&str> {
        match self {
            Prefix::ServerName(name) => Some(name),
            Prefix::Nickname(_, _, host) if !host.is_empty() => Some(host),
            _ => None,
        }
    }
}

impl FromStr for Prefix {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Prefix::new_from_str(s))
    }
}

impl From<&str> for Prefix {
    fn from(s: &str) -> Self {
        Prefix::new_from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_user_mask() {
        let p = Prefix::new_from_str("dan!~d@example.com");
        assert_eq!(p, Prefix::new("dan", "~d", "example.com"));
        assert_eq!(p.nick(), Some("dan"));
        assert_eq!(p.ident(), Some("~d"));
        assert_eq!(p.host(), Some("example.com"));
    }

    #[test]
    fn bare_nick() {
        let p = Prefix::new_from_str("dan");
        assert_eq!(p.nick(), Some("dan"));
        assert_eq!(p.ident(), None);
        assert_eq!(p.host(), None);
    }

    #[test]
    fn nick_and_host_without_ident() {
        let p = Prefix::new_from_str("dan@host.example");
        assert_eq!(p, Prefix::new("dan", "", "host.example"));
    }

    #[test]
    fn dotted_name_is_a_server() {
        let p = Prefix::new_from_str("irc.example.net");
        assert_eq!(p, Prefix::ServerName("irc.example.net".into()));
        assert_eq!(p.nick(), None);
        assert_eq!(p.host(), Some("irc.example.net"));
    }

    #[test]
    fn display_round_trips() {
        for raw in ["dan!~d@example.com", "dan@host", "dan!d", "dan", "irc.example.net"] {
            assert_eq!(Prefix::new_from_str(raw).to_string(), raw);
        }
    }
}
