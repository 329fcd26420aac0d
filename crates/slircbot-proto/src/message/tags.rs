//! IRCv3 message tag value escaping.
//!
//! | raw  | escaped |
//! |------|---------|
//! | `;`  | `\:`    |
//! | ` `  | `\s`    |
//! | `\`  | `\\`    |
//! | CR   | `\r`    |
//! | LF   | `\n`    |

use std::fmt::{self, Write};

/// Write `value` to `f` with IRCv3 escaping applied.
pub fn escape_tag_value(f: &mut dyn Write, value: &str) -> fmt::Result {
    for c in value.chars() {
        match c {
            ';' => f.write_str("\\:")?,
            ' ' => f.write_str("\\s")?,
            '\\' => f.write_str("\\\\")?,
            '\r' => f.write_str("\\r")?,
            '\n' => f.write_str("\\n")?,
            c => f.write_char(c)?,
        }
    }
    Ok(())
}

/// Reverse [`escape_tag_value`].
///
/// Unknown escapes drop the backslash; a lone trailing backslash is dropped.
pub fn unescape_tag_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(':') => out.push(';'),
            Some('s') => out.push(' '),
            Some('r') => out.push('\r'),
            Some('n') => out.push('\n'),
            Some(other) => out.push(other),
            None => break,
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn escaped(value: &str) -> String {
        let mut s = String::new();
        escape_tag_value(&mut s, value).unwrap();
        s
    }

    #[test]
    fn escapes_every_special() {
        assert_eq!(escaped("a;b c\\d\re\nf"), "a\\:b\\sc\\\\d\\re\\nf");
        assert_eq!(escaped("plain"), "plain");
    }

    #[test]
    fn unescapes_every_special() {
        assert_eq!(unescape_tag_value("a\\:b\\sc\\\\d\\re\\nf"), "a;b c\\d\re\nf");
    }

    #[test]
    fn lenient_unescape() {
        assert_eq!(unescape_tag_value("test\\"), "test");
        assert_eq!(unescape_tag_value("a\\xb"), "axb");
    }

    #[test]
    fn escape_then_unescape_is_identity() {
        for v in ["", "with space", "semi;colon", "back\\slash", "cr\rlf\n", "; \\ \n \r"] {
            assert_eq!(unescape_tag_value(&escaped(v)), v);
        }
    }
}
