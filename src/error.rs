//! Address Resolution Errors
//!
//! Every failure the address engine can produce. Resolution is deterministic,
//! so callers record these against the reference that caused them and move on.

use thiserror::Error;

/// Failure while tokenizing or evaluating an address
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// A character that does not start any address token
    #[error("invalid address syntax near '{ch}' at offset {offset}")]
    InvalidAddress { ch: char, offset: usize },

    /// A digit run that does not fit in a count
    #[error("invalid number in address: {literal}")]
    ParseError { literal: String },

    /// Stepping ran past either end of the buffer
    #[error("address out of range")]
    AddressOutOfRange,

    /// The regular expression failed to compile
    #[error("invalid pattern /{pattern}/: {message}")]
    InvalidPattern { pattern: String, message: String },

    /// No match anywhere in the buffer, wraparound included
    #[error("no match for /{pattern}/")]
    NoMatch { pattern: String },

    /// Backward regular-expression search was requested
    #[error("reverse search not implemented")]
    UnsupportedDirection,
}
