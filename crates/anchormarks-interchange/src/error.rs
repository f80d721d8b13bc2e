//! Interchange error types

use thiserror::Error;

/// The only way an import can fail: the input is not text. Malformed markup
/// is never an error.
#[derive(Error, Debug)]
pub enum InterchangeError {
    #[error("Input is not UTF-8 text: {0}")]
    NotText(#[from] std::str::Utf8Error),
}
