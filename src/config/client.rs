//! Per-network client configuration.

use serde::Deserialize;
use std::time::Duration;

use super::defaults::{
    default_command_prefix, default_join_delay_secs, default_port, default_reconnect_delay_secs,
    default_true,
};

/// One configured network identity. Each becomes one [`Client`](crate::client::Client).
#[derive(Debug, Clone, Deserialize)]
pub struct ClientOptions {
    /// Unique name, used to tag events (e.g. "libera").
    pub name: String,
    /// Leading text marking a chat line as a command (e.g. "!").
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,
    /// Server password sent as `PASS`.
    #[serde(default)]
    pub password: Option<String>,
    /// Settle delay between registration and channel joins.
    #[serde(default = "default_join_delay_secs")]
    pub join_delay_secs: u64,
    /// Channels joined after registration, in order.
    #[serde(default)]
    pub channels: Vec<ChannelOption>,
    /// Identity presented to the server.
    pub user: UserConfig,
    /// Where and how to connect.
    pub connection: ConnectionConfig,
    /// Global handler access list for this client.
    #[serde(default)]
    pub plugins: Option<AclLists>,
}

impl ClientOptions {
    /// Options with defaults for everything but the essentials.
    pub fn new(
        name: impl Into<String>,
        host: impl Into<String>,
        port: u16,
        nickname: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            command_prefix: default_command_prefix(),
            password: None,
            join_delay_secs: default_join_delay_secs(),
            channels: Vec::new(),
            user: UserConfig {
                nickname: nickname.into(),
                username: None,
                realname: None,
            },
            connection: ConnectionConfig {
                host: host.into(),
                port,
                tls: false,
                verify_cert: true,
                auto_reconnect: true,
                reconnect_delay_secs: default_reconnect_delay_secs(),
            },
            plugins: None,
        }
    }

    /// Settle delay as a [`Duration`].
    pub fn join_delay(&self) -> Duration {
        Duration::from_secs(self.join_delay_secs)
    }

    /// The per-channel access list for `channel`, if one is configured.
    pub fn channel_acl(&self, channel: &str) -> Option<&AclLists> {
        self.channels
            .iter()
            .find(|c| slircbot_proto::irc_eq(c.name(), channel))
            .and_then(ChannelOption::acl)
    }
}

/// Nickname and optional user/real names.
#[derive(Debug, Clone, Deserialize)]
pub struct UserConfig {
    pub nickname: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub realname: Option<String>,
}

impl UserConfig {
    /// Username, defaulting to the nickname.
    pub fn username(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.nickname)
    }

    /// Real name, defaulting to the nickname.
    pub fn realname(&self) -> &str {
        self.realname.as_deref().unwrap_or(&self.nickname)
    }
}

/// Connection target and reconnect policy.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub tls: bool,
    /// Verify the server certificate against native roots. Disable only for
    /// self-signed networks.
    #[serde(default = "default_true")]
    pub verify_cert: bool,
    #[serde(default = "default_true")]
    pub auto_reconnect: bool,
    #[serde(default = "default_reconnect_delay_secs")]
    pub reconnect_delay_secs: u64,
}

impl ConnectionConfig {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }
}

/// Allow/deny lists of handler names.
///
/// `whitelist`/`blacklist` are accepted as aliases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AclLists {
    #[serde(default, alias = "whitelist")]
    pub allow: Vec<String>,
    #[serde(default, alias = "blacklist")]
    pub deny: Vec<String>,
}

impl AclLists {
    /// Only the listed handlers may run.
    pub fn allow<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allow: names.into_iter().map(Into::into).collect(),
            deny: Vec::new(),
        }
    }

    /// Every handler but the listed ones may run.
    pub fn deny<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allow: Vec::new(),
            deny: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.allow.is_empty() && self.deny.is_empty()
    }
}

/// An auto-join entry: a bare channel name, or a name with its own access
/// list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ChannelOption {
    Name(String),
    Configured(ChannelConfig),
}

/// A channel with a per-channel access list.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelConfig {
    pub name: String,
    #[serde(flatten)]
    pub acl: AclLists,
}

impl ChannelOption {
    pub fn name(&self) -> &str {
        match self {
            ChannelOption::Name(name) => name,
            ChannelOption::Configured(cfg) => &cfg.name,
        }
    }

    pub fn acl(&self) -> Option<&AclLists> {
        match self {
            ChannelOption::Name(_) => None,
            ChannelOption::Configured(cfg) => Some(&cfg.acl),
        }
    }
}

impl From<&str> for ChannelOption {
    fn from(name: &str) -> Self {
        ChannelOption::Name(name.to_string())
    }
}
