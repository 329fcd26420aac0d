//! nom grammar for a single IRC line.
//!
//! ```text
//! [@tags SPACE] [:prefix SPACE] command [params] [SPACE :trailing]
//! ```
//!
//! The parser borrows from its input; [`Message`](super::Message) owns the
//! result.

use nom::{
    bytes::complete::{take_until, take_while1},
    character::complete::{char, space0},
    combinator::opt,
    sequence::preceded,
    IResult,
};
use smallvec::SmallVec;

use crate::error::MessageParseError;

fn parse_tags(input: &str) -> IResult<&str, &str> {
    preceded(char('@'), take_until(" "))(input)
}

fn parse_prefix(input: &str) -> IResult<&str, &str> {
    preceded(char(':'), take_while1(|c| c != ' '))(input)
}

fn parse_command_token(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric())(input)
}

fn is_valid_command(cmd: &str) -> bool {
    cmd.chars().all(|c| c.is_ascii_alphabetic())
        || (cmd.len() == 3 && cmd.bytes().all(|b| b.is_ascii_digit()))
}

/// Split the parameter section. Runs of spaces count as one separator; a
/// parameter starting with `:` swallows the rest of the line. Stops at a CR
/// or LF, leaving it in the returned remainder.
fn parse_params(input: &str) -> (&str, SmallVec<[&str; 15]>) {
    let mut params: SmallVec<[&str; 15]> = SmallVec::new();
    let mut rest = input;

    while rest.starts_with(' ') {
        rest = rest.trim_start_matches(' ');
        if rest.is_empty() {
            break;
        }

        if let Some(trailing) = rest.strip_prefix(':') {
            let end = trailing.find(['\r', '\n']).unwrap_or(trailing.len());
            params.push(&trailing[..end]);
            rest = &trailing[end..];
            break;
        }

        let end = rest.find([' ', '\r', '\n']).unwrap_or(rest.len());
        params.push(&rest[..end]);
        rest = &rest[end..];
    }

    (rest, params)
}

/// A line split into borrowed parts.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParsedMessage<'a> {
    /// Tag block without the leading `@`.
    pub tags: Option<&'a str>,
    /// Prefix without the leading `:`.
    pub prefix: Option<&'a str>,
    pub command: &'a str,
    pub params: SmallVec<[&'a str; 15]>,
}

impl<'a> ParsedMessage<'a> {
    /// Parse one line. The line terminator must already be stripped; a CR or
    /// LF left inside the line is rejected.
    pub fn parse(input: &'a str) -> Result<Self, MessageParseError> {
        if input.trim_matches(' ').is_empty() {
            return Err(MessageParseError::EmptyMessage);
        }

        let position = |rest: &str| input.len() - rest.len();
        let context = |rest: &str, what: &str| MessageParseError::ParseContext {
            position: position(rest),
            context: what.to_owned(),
        };

        let (rest, tags) = opt(parse_tags)(input).map_err(|_| context(input, "tags"))?;
        let (rest, _) = space0::<_, nom::error::Error<&str>>(rest)
            .map_err(|_| context(rest, "space"))?;

        let (rest, prefix) = opt(parse_prefix)(rest).map_err(|_| context(rest, "prefix"))?;
        let (rest, _) = space0::<_, nom::error::Error<&str>>(rest)
            .map_err(|_| context(rest, "space"))?;

        let (rest, command) = parse_command_token(rest).map_err(|_| context(rest, "command"))?;
        if !is_valid_command(command) {
            return Err(MessageParseError::InvalidCommand(command.to_owned()));
        }

        let (rest, params) = parse_params(rest);
        if !rest.is_empty() {
            return Err(MessageParseError::TrailingInput(position(rest)));
        }

        Ok(ParsedMessage {
            tags,
            prefix,
            command,
            params,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_command() {
        let msg = ParsedMessage::parse("PING").unwrap();
        assert_eq!(msg.command, "PING");
        assert!(msg.tags.is_none());
        assert!(msg.prefix.is_none());
        assert!(msg.params.is_empty());
    }

    #[test]
    fn all_sections() {
        let msg =
            ParsedMessage::parse("@time=2023-01-01T00:00:00Z :nick!u@h PRIVMSG #ch :Hi there")
                .unwrap();
        assert_eq!(msg.tags, Some("time=2023-01-01T00:00:00Z"));
        assert_eq!(msg.prefix, Some("nick!u@h"));
        assert_eq!(msg.command, "PRIVMSG");
        assert_eq!(msg.params.as_slice(), &["#ch", "Hi there"]);
    }

    #[test]
    fn many_middle_params() {
        let msg = ParsedMessage::parse("USER guest 0 * :Real Name").unwrap();
        assert_eq!(msg.params.as_slice(), &["guest", "0", "*", "Real Name"]);
    }

    #[test]
    fn no_fifteen_param_limit() {
        let line = format!("CMD {}", (0..20).map(|i| i.to_string()).collect::<Vec<_>>().join(" "));
        assert_eq!(ParsedMessage::parse(&line).unwrap().params.len(), 20);
    }

    #[test]
    fn consecutive_spaces_collapse() {
        let msg = ParsedMessage::parse("MODE  #ch   +o  nick").unwrap();
        assert_eq!(msg.params.as_slice(), &["#ch", "+o", "nick"]);
    }

    #[test]
    fn empty_and_colon_only_trailing() {
        let msg = ParsedMessage::parse("PRIVMSG #ch :").unwrap();
        assert_eq!(msg.params.as_slice(), &["#ch", ""]);
        let msg = ParsedMessage::parse("PRIVMSG #ch ::)").unwrap();
        assert_eq!(msg.params.as_slice(), &["#ch", ":)"]);
    }

    #[test]
    fn numeric_commands() {
        assert_eq!(ParsedMessage::parse(":srv 001 me :Welcome").unwrap().command, "001");
        assert_eq!(
            ParsedMessage::parse("12 foo"),
            Err(MessageParseError::InvalidCommand("12".into()))
        );
        assert_eq!(
            ParsedMessage::parse("A1B foo"),
            Err(MessageParseError::InvalidCommand("A1B".into()))
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(ParsedMessage::parse(""), Err(MessageParseError::EmptyMessage));
        assert_eq!(ParsedMessage::parse("   "), Err(MessageParseError::EmptyMessage));
        assert!(ParsedMessage::parse(":onlyprefix").is_err());
        assert!(ParsedMessage::parse("@tags-without-command").is_err());
        assert!(ParsedMessage::parse("PRIVMSG#ch").is_err());
        assert!(ParsedMessage::parse("!!!").is_err());
    }
}
