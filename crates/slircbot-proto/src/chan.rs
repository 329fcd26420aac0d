//! Channel name detection.

/// Extension trait for telling channel targets apart from nick targets.
pub trait ChannelExt {
    /// True if this looks like a channel name: a `#`, `&`, `+` or `!` sigil
    /// followed by characters that are legal in a channel name.
    fn is_channel_name(&self) -> bool;
}

impl ChannelExt for str {
    fn is_channel_name(&self) -> bool {
        let mut chars = self.chars();
        if !matches!(chars.next(), Some('#' | '&' | '+' | '!')) {
            return false;
        }
        self.chars().count() <= 50
            && chars.all(|c| c != ' ' && c != ',' && c != '\x07' && !c.is_control())
    }
}

impl ChannelExt for String {
    fn is_channel_name(&self) -> bool {
        self.as_str().is_channel_name()
    }
}
