//! `Message` serialization.
//!
//! `Display` yields the line without its CRLF terminator; the codec adds it.

use std::fmt::{self, Display, Formatter};

use super::tags::escape_tag_value;
use super::types::Message;

/// True if `param` must be sent in trailing (`:`-prefixed) form.
///
/// An empty last parameter is not marked, so it does not survive a round
/// trip; servers never require one.
pub(crate) fn needs_trailing(param: &str) -> bool {
    param.contains(' ') || param.starts_with(':')
}

impl Message {
    fn write_line(&self, f: &mut dyn fmt::Write, force_trailing: bool) -> fmt::Result {
        if let Some(tags) = self.tags.as_ref().filter(|t| !t.is_empty()) {
            f.write_char('@')?;
            for (i, tag) in tags.iter().enumerate() {
                if i > 0 {
                    f.write_char(';')?;
                }
                f.write_str(&tag.0)?;
                if let Some(value) = &tag.1 {
                    f.write_char('=')?;
                    escape_tag_value(f, value)?;
                }
            }
            f.write_char(' ')?;
        }

        if let Some(prefix) = &self.prefix {
            write!(f, ":{prefix} ")?;
        }

        f.write_str(&self.command)?;

        if let Some((last, middle)) = self.params.split_last() {
            for param in middle {
                write!(f, " {param}")?;
            }
            if force_trailing || needs_trailing(last) {
                write!(f, " :{last}")?;
            } else {
                write!(f, " {last}")?;
            }
        }

        Ok(())
    }

    /// Serialize with the last parameter always in trailing form.
    ///
    /// Used for lines whose conventional wire shape carries a trailing
    /// parameter even without spaces, such as `USER` and `PONG`.
    pub fn to_trailing_string(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_line(&mut out, true);
        out
    }
}

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.write_line(f, false)
    }
}
