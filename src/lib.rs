//! multimark: lightweight-markup emails to multipart/alternative
//!
//! A library for turning an email whose body is written in a lightweight
//! markup language (Markdown, AsciiDoc, ...) into a `multipart/alternative`
//! email with a plain-text part and a rendered HTML part, keeping every
//! attachment intact.

pub mod config;
pub mod convert;
pub mod mime;
