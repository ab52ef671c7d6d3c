use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParserError {
    #[error("Cannot convert {token:?} into {target}")]
    NumericConversion { token: String, target: &'static str },

    #[error("Expected at least one element in sub-array {token:?}")]
    EmptyArray { token: String },

    #[error("No text between {left:?} and {right:?}")]
    DelimiterNotFound { left: String, right: String },

    /// The scene-export directory itself could not be enumerated.
    #[error("Failed to enumerate directory {path}")]
    DirectoryError { path: String, source: std::io::Error },

    /// Represents all other cases of `std::io::Error`.
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    #[error(transparent)]
    UTF16ConversationError(#[from] std::string::FromUtf16Error),
}

pub mod common;
pub mod discovery;
pub mod scene;
pub mod source;
