//! Access control for handler names.
//!
//! Two scopes, checked in order: the client-wide `plugins` list, then the
//! list of the channel the message arrived on. Within a scope a non-empty
//! allow list wins over the deny list. No list means allowed.

use crate::config::{AclLists, ClientOptions};

/// May handler `name` run for a message on `channel`?
pub fn is_allowed(options: &ClientOptions, name: &str, channel: Option<&str>) -> bool {
    if let Some(global) = &options.plugins
        && !scope_allows(global, name)
    {
        return false;
    }

    match channel.and_then(|ch| options.channel_acl(ch)) {
        Some(acl) => scope_allows(acl, name),
        None => true,
    }
}

fn scope_allows(acl: &AclLists, name: &str) -> bool {
    if !acl.allow.is_empty() {
        return acl.allow.iter().any(|n| n == name);
    }
    !acl.deny.iter().any(|n| n == name)
}
