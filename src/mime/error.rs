//! Error types for reading and writing mail messages.

use thiserror::Error;

/// Error type for message structure problems.
#[derive(Debug, Error)]
pub enum MessageError {
    /// The input contained no bytes at all.
    #[error("Input message is empty")]
    Empty,

    /// No header field could be read from the input.
    #[error("Input is not a mail message: no header fields found")]
    Unparsable,

    /// A multipart message declares no boundary.
    #[error("Multipart message has no boundary parameter")]
    MissingBoundary,

    /// A multipart body has no delimiter line for its boundary.
    #[error("Multipart body contains no '--{boundary}' delimiter")]
    NoParts {
        /// Boundary declared in Content-Type
        boundary: String,
    },

    /// The message has no inline text part to convert.
    #[error("Message has no inline text part to convert")]
    NoTextBody,

    /// The top-level multipart type cannot be rewritten safely.
    #[error("Cannot convert a {0} message")]
    UnsupportedStructure(String),

    /// Writing the generated parts failed.
    #[error("Failed to write the alternative container: {0}")]
    Write(#[from] std::io::Error),
}
