//! Parsed mail messages.

use std::fmt;

use mail_parser::{MessageParser, MessagePart, MessagePartId, MimeHeaders, PartType};

use super::MessageError;

const ROOT: MessagePartId = 0;

/// Line ending convention of a message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineEnding {
    /// `\n`
    #[default]
    Lf,
    /// `\r\n`
    CrLf,
}

impl LineEnding {
    /// Detects the convention from the first line break in `raw`.
    #[must_use]
    pub fn detect(raw: &[u8]) -> Self {
        match raw.iter().position(|&b| b == b'\n') {
            Some(index) if index > 0 && raw[index - 1] == b'\r' => Self::CrLf,
            _ => Self::Lf,
        }
    }

    /// The line ending as a string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }

    /// The line ending as bytes.
    #[must_use]
    pub const fn as_bytes(self) -> &'static [u8] {
        self.as_str().as_bytes()
    }
}

impl fmt::Display for LineEnding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the converted body replaces the original one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    /// The whole message body becomes the alternative container.
    ///
    /// Used for single-part messages and for `multipart/alternative` or
    /// `multipart/related` messages, whose old renditions are dropped.
    Replace,
    /// A `multipart/mixed` message: the part holding the body is replaced by
    /// the alternative container and every other top-level part is kept.
    Mixed {
        /// Boundary of the outer container, reused as is
        boundary: String,
        /// Top-level parts kept after the alternative container
        attachments: Vec<MessagePartId>,
    },
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replace => f.write_str("body replaced"),
            Self::Mixed { attachments, .. } => {
                write!(f, "multipart/mixed, {} part(s) kept", attachments.len())
            }
        }
    }
}

/// A parsed mail message and the body picked for conversion.
#[derive(Debug)]
pub struct Message<'x> {
    parsed: mail_parser::Message<'x>,
    layout: Layout,
    primary: MessagePartId,
    line_ending: LineEnding,
}

impl<'x> Message<'x> {
    /// Parses a message and picks the body to convert.
    ///
    /// The body is the first inline `text/*` part, looking inside nested
    /// `multipart/alternative` and `multipart/related` containers and
    /// preferring `text/plain` over `text/html` there.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or has no header fields, if a
    /// multipart message cannot be framed or is neither `mixed`,
    /// `alternative` nor `related`, or if there is no text body.
    pub fn parse(raw: &'x [u8]) -> Result<Self, MessageError> {
        if raw.is_empty() {
            return Err(MessageError::Empty);
        }

        let parsed = MessageParser::new()
            .parse(raw)
            .ok_or(MessageError::Unparsable)?;
        let (layout, primary) = classify(&parsed)?;

        if let Some(part) = parsed.part(primary) {
            if part.is_encoding_problem && part.raw_body_offset() < part.raw_end_offset() {
                tracing::warn!("Body part {primary} is not cleanly encoded, converting it as read");
            }
        }

        tracing::debug!(
            "Parsed message with {} header fields and {} parts ({layout})",
            parsed.root_part().headers.len(),
            parsed.parts.len()
        );

        Ok(Self {
            parsed,
            layout,
            primary,
            line_ending: LineEnding::detect(raw),
        })
    }

    /// The message exactly as read.
    #[must_use]
    pub fn raw(&self) -> &[u8] {
        self.parsed.raw_message()
    }

    /// How the body is replaced.
    #[must_use]
    pub const fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Line ending used by the input.
    #[must_use]
    pub const fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// The decoded body: the conversion source.
    #[must_use]
    pub fn source_text(&self) -> &str {
        self.parsed
            .part(self.primary)
            .and_then(|part| part.text_contents())
            .unwrap_or_default()
    }

    /// Content type of the body part, `text/plain` if undeclared.
    #[must_use]
    pub fn source_type(&self) -> String {
        self.parsed
            .part(self.primary)
            .and_then(|part| part.content_type())
            .map_or_else(
                || "text/plain".to_string(),
                |ct| format!("{}/{}", ct.ctype(), ct.subtype().unwrap_or("plain")),
            )
    }

    /// The top-level header block, including the empty line that ends it.
    #[must_use]
    pub fn header_block(&self) -> &[u8] {
        &self.raw()[..self.parsed.root_part().raw_body_offset()]
    }

    /// Top-level header fields as `(name, raw line)` pairs, in order.
    ///
    /// Each raw line keeps its folding and line ending.
    pub fn header_fields(&self) -> impl Iterator<Item = (&str, &[u8])> {
        let raw = self.raw();
        self.parsed
            .root_part()
            .headers
            .iter()
            .map(move |header| (header.name(), &raw[header.offset_field..header.offset_end]))
    }

    /// Raw bytes of every kept part, headers included, in original order.
    pub fn attachments(&self) -> impl Iterator<Item = &[u8]> {
        let ids: &[MessagePartId] = match &self.layout {
            Layout::Replace => &[],
            Layout::Mixed { attachments, .. } => attachments,
        };
        let raw = self.raw();
        ids.iter()
            .filter_map(|&id| self.parsed.part(id))
            .map(move |part| &raw[part.raw_header_offset()..part.raw_end_offset()])
    }
}

fn classify(parsed: &mail_parser::Message<'_>) -> Result<(Layout, MessagePartId), MessageError> {
    let root = parsed.root_part();
    let Some(content_type) = root
        .content_type()
        .filter(|ct| ct.ctype().eq_ignore_ascii_case("multipart"))
    else {
        return if root.is_text() {
            Ok((Layout::Replace, ROOT))
        } else {
            Err(MessageError::NoTextBody)
        };
    };

    let subtype = content_type.subtype().unwrap_or_default().to_ascii_lowercase();
    if !matches!(subtype.as_str(), "mixed" | "alternative" | "related") {
        return Err(MessageError::UnsupportedStructure(format!("multipart/{subtype}")));
    }

    let boundary = content_type
        .attribute("boundary")
        .ok_or(MessageError::MissingBoundary)?;
    let children = root.sub_parts().ok_or_else(|| MessageError::NoParts {
        boundary: boundary.to_string(),
    })?;

    if subtype != "mixed" {
        let primary = body_within(parsed, ROOT).ok_or(MessageError::NoTextBody)?;
        return Ok((Layout::Replace, primary));
    }

    let (position, primary) = children
        .iter()
        .enumerate()
        .find_map(|(position, &child)| body_within(parsed, child).map(|id| (position, id)))
        .ok_or(MessageError::NoTextBody)?;
    let attachments = children
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != position)
        .map(|(_, &id)| id)
        .collect();

    Ok((
        Layout::Mixed {
            boundary: boundary.to_string(),
            attachments,
        },
        primary,
    ))
}

/// The body inside part `id`: a text leaf itself, or the best text leaf of
/// an alternative/related container.
fn body_within(parsed: &mail_parser::Message<'_>, id: MessagePartId) -> Option<MessagePartId> {
    let mut leaves = Vec::new();
    collect_text(parsed, id, &mut leaves);

    leaves
        .iter()
        .copied()
        .find(|&leaf| parsed.part(leaf).is_some_and(|part| !part.is_text_html()))
        .or_else(|| leaves.first().copied())
}

fn collect_text(parsed: &mail_parser::Message<'_>, id: MessagePartId, leaves: &mut Vec<MessagePartId>) {
    let Some(part) = parsed.part(id) else {
        return;
    };
    if id != ROOT && is_attachment(part) {
        return;
    }

    match &part.body {
        PartType::Text(_) | PartType::Html(_) => leaves.push(id),
        PartType::Multipart(children) if is_container(part) => {
            for &child in children {
                collect_text(parsed, child, leaves);
            }
        }
        _ => {}
    }
}

fn is_attachment(part: &MessagePart<'_>) -> bool {
    part.content_disposition()
        .is_some_and(|disposition| disposition.is_attachment())
}

/// Containers whose parts are renditions of one body rather than attachments.
fn is_container(part: &MessagePart<'_>) -> bool {
    part.content_type()
        .and_then(|content_type| content_type.subtype())
        .is_some_and(|subtype| {
            subtype.eq_ignore_ascii_case("alternative") || subtype.eq_ignore_ascii_case("related")
        })
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
