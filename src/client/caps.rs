//! IRCv3 capability negotiation.
//!
//! The client asks for `CAP LS 302` during registration, requests the
//! intersection of what the server offers with [`SUPPORTED_CAPS`], and ends
//! negotiation on `ACK` or `NAK`. Nothing here waits on the server: each
//! inbound `CAP` line yields at most one line to send back.

use slircbot_proto::Message;

/// Capabilities the client requests when offered.
pub const SUPPORTED_CAPS: &[&str] = &[
    "twitch.tv/tags",
    "twitch.tv/commands",
    "twitch.tv/membership",
    "message-tags",
    "account-tag",
    "server-time",
    "batch",
    "account-notify",
    "away-notify",
    "multi-prefix",
];

/// Negotiation state for one connection.
#[derive(Debug, Default)]
pub struct CapNegotiation {
    offered: Vec<String>,
    enabled: Vec<String>,
    finished: bool,
}

/// `sasl=PLAIN,EXTERNAL` names the `sasl` capability.
fn cap_name(token: &str) -> &str {
    token.split_once('=').map_or(token, |(name, _)| name)
}

fn is_supported(token: &str) -> bool {
    SUPPORTED_CAPS.contains(&cap_name(token))
}

impl CapNegotiation {
    /// Forget everything; called when a new transport comes up.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Capabilities the server acknowledged.
    pub fn enabled(&self) -> &[String] {
        &self.enabled
    }

    /// True once `CAP END` has been sent.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Handle one inbound `CAP` message, returning the raw line to send in
    /// reply, if any.
    pub fn handle(&mut self, msg: &Message) -> Option<String> {
        // CAP <target> <subcommand> [*] :<caps>
        let subcommand = msg.param(1)?.to_ascii_uppercase();
        let caps = msg.params.last().map(String::as_str).unwrap_or_default();
        let continued = msg.params.len() >= 4 && msg.param(2) == Some("*");

        match subcommand.as_str() {
            "LS" if !self.finished => {
                self.offered
                    .extend(caps.split_whitespace().map(str::to_owned));
                if continued {
                    return None;
                }

                let wanted: Vec<&str> = self
                    .offered
                    .iter()
                    .map(|c| cap_name(c))
                    .filter(|c| is_supported(c))
                    .collect();
                if wanted.is_empty() {
                    Some(self.end())
                } else {
                    Some(Message::cap("REQ", [wanted.join(" ")]).to_trailing_string())
                }
            }
            "ACK" => {
                for cap in caps.split_whitespace() {
                    match cap.strip_prefix('-') {
                        Some(removed) => self.enabled.retain(|c| c != removed),
                        None => self.enabled.push(cap_name(cap).to_owned()),
                    }
                }
                (!self.finished).then(|| self.end())
            }
            "NAK" => (!self.finished).then(|| self.end()),
            "DEL" => {
                for cap in caps.split_whitespace() {
                    self.enabled.retain(|c| c != cap_name(cap));
                }
                None
            }
            _ => None,
        }
    }

    fn end(&mut self) -> String {
        self.finished = true;
        "CAP END".to_string()
    }
}
