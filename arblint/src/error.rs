//! Structural parse errors for the arblint crate.
//!
//! These cover the two recoverable message-level conditions (unbalanced
//! escape quotes, unbalanced curly brackets) and document-level JSON syntax
//! errors. None of them abort a document parse: the walker converts each into
//! a located error literal and keeps going.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(
        "Unbalanced escape quotes. To escape a single quote ', prefix it with another single quote."
    )]
    UnbalancedQuotes,

    #[error("Unbalanced curly bracket found. Try escaping the bracket using a single quote '.")]
    UnbalancedBrackets,

    #[error("Invalid JSON syntax at offset {offset}: {message}")]
    Syntax { offset: usize, message: String },
}

impl Error {
    /// Creates a new JSON syntax error at the given document offset.
    pub fn syntax(offset: usize, message: impl Into<String>) -> Self {
        Error::Syntax {
            offset,
            message: message.into(),
        }
    }
}
