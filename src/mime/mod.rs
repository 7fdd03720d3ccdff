//! Mail message handling.
//!
//! Reads a message with `mail-parser`, picks the body to convert and writes
//! the `multipart/alternative` result with `mail-builder`. Attachments of a
//! `multipart/mixed` message are carried over byte for byte.

mod assemble;
mod error;
mod message;

pub use assemble::assemble;
pub use error::MessageError;
pub use message::{Layout, LineEnding, Message};
