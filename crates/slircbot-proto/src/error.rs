//! Error types for the IRC line codec.
//!
//! A line that fails to parse is not fatal anywhere in slircbot; these types
//! exist so the framing layer and `FromStr` callers can say why.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Errors raised while framing or decoding a byte stream.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// An outgoing line exceeded the configured maximum length.
    #[error("line too long: {actual} bytes (limit: {limit})")]
    LineTooLong {
        /// Actual line length.
        actual: usize,
        /// Maximum allowed length.
        limit: usize,
    },

    /// The line did not match the message grammar.
    #[error("invalid message: {string}")]
    InvalidMessage {
        /// The offending line.
        string: String,
        /// Why it was rejected.
        #[source]
        cause: MessageParseError,
    },
}

/// Reasons a single line does not match the message grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum MessageParseError {
    /// The line was empty after stripping the terminator.
    #[error("empty message")]
    EmptyMessage,

    /// The command token was neither letters-only nor exactly three digits.
    #[error("invalid command: {0:?}")]
    InvalidCommand(String),

    /// Input was left over after the last parameter.
    #[error("unexpected trailing input at position {0}")]
    TrailingInput(usize),

    /// The grammar did not match at the given position.
    #[error("parsing failed at position {position}: {context}")]
    ParseContext {
        /// Byte offset where parsing failed.
        position: usize,
        /// What the parser was looking for.
        context: String,
    },
}
