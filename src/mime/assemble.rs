//! Builds the `multipart/alternative` output message.

use mail_builder::encoders::base64::base64_encode_mime;
use mail_builder::headers::content_type::ContentType;
use mail_builder::mime::MimePart;

use super::MessageError;
use super::message::{Layout, LineEnding, Message};

const BOUNDARY_PREFIX: &str = "=_multimark_";
const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0100_0000_01b3;

/// Header fields dropped from a replaced message; the alternative container
/// declares its own.
const REPLACED_FIELDS: [&str; 2] = ["Content-Type", "Content-Transfer-Encoding"];

/// Builds the output message from the input and its two renditions.
///
/// With [`Layout::Replace`] the message body becomes the alternative
/// container; the header fields stay byte for byte except for the content
/// declaration, and `MIME-Version` is added when missing. With
/// [`Layout::Mixed`] the header block and outer boundary are kept verbatim;
/// the alternative container becomes the first part and every kept part
/// follows unchanged, in order.
///
/// The plain part always precedes the HTML part. The output uses the
/// input's line ending.
///
/// # Errors
///
/// Returns [`MessageError::Write`] if the generated parts cannot be
/// serialized.
pub fn assemble(message: &Message<'_>, plain: &str, html: &str) -> Result<Vec<u8>, MessageError> {
    match message.layout() {
        Layout::Replace => assemble_replaced(message, plain, html),
        Layout::Mixed { boundary, .. } => assemble_mixed(message, boundary, plain, html),
    }
}

fn assemble_replaced(message: &Message<'_>, plain: &str, html: &str) -> Result<Vec<u8>, MessageError> {
    let eol = message.line_ending();
    let mut out = Vec::new();
    let mut has_version = false;

    for (name, raw) in message.header_fields() {
        if REPLACED_FIELDS.iter().any(|field| field.eq_ignore_ascii_case(name)) {
            continue;
        }
        has_version |= name.eq_ignore_ascii_case("MIME-Version");
        out.extend_from_slice(raw);
    }
    if !has_version {
        out.extend_from_slice(b"MIME-Version: 1.0");
        out.extend_from_slice(eol.as_bytes());
    }

    out.extend_from_slice(&alternative(plain, html, eol, None)?);
    Ok(out)
}

fn assemble_mixed(
    message: &Message<'_>,
    outer: &str,
    plain: &str,
    html: &str,
) -> Result<Vec<u8>, MessageError> {
    let eol = message.line_ending();
    let mut out = message.header_block().to_vec();

    write_delimiter(&mut out, outer, eol);
    out.extend_from_slice(&alternative(plain, html, eol, Some(outer))?);

    let mut kept = 0;
    for part in message.attachments() {
        write_delimiter(&mut out, outer, eol);
        out.extend_from_slice(part);
        out.extend_from_slice(eol.as_bytes());
        kept += 1;
    }
    tracing::debug!("Kept {kept} part(s) after the alternative container");

    out.extend_from_slice(b"--");
    out.extend_from_slice(outer.as_bytes());
    out.extend_from_slice(b"--");
    out.extend_from_slice(eol.as_bytes());
    Ok(out)
}

/// Serializes the alternative container, from its `Content-Type` field to
/// the line ending after its closing delimiter.
///
/// Both bodies are sent as base64 when either mentions the `enclosing`
/// delimiter, so the container can never end the outer one early.
fn alternative(
    plain: &str,
    html: &str,
    eol: LineEnding,
    enclosing: Option<&str>,
) -> Result<Vec<u8>, MessageError> {
    let plain = with_line_ending(plain, eol);
    let html = with_line_ending(html, eol);

    let base64 = enclosing.is_some_and(|outer| {
        let delimiter = format!("--{outer}");
        plain.contains(&delimiter) || html.contains(&delimiter)
    });
    let boundary = boundary_for(&[&plain, &html]);

    let container = MimePart::new(
        ContentType::new("multipart/alternative").attribute("boundary", boundary),
        vec![
            text_part("text/plain", plain, base64)?,
            text_part("text/html", html, base64)?,
        ],
    );

    let mut out = Vec::new();
    container.write_part(&mut out)?;

    Ok(match eol {
        LineEnding::CrLf => out,
        LineEnding::Lf => crlf_to_lf(&out),
    })
}

fn text_part(content_type: &'static str, body: String, base64: bool) -> Result<MimePart<'static>, MessageError> {
    let content_type = ContentType::new(content_type).attribute("charset", "utf-8");
    if !base64 {
        return Ok(MimePart::new(content_type, body));
    }

    let mut encoded = Vec::new();
    base64_encode_mime(body.as_bytes(), &mut encoded, false)?;
    let encoded = String::from_utf8_lossy(&encoded).into_owned();
    Ok(MimePart::new(content_type, encoded).transfer_encoding("base64"))
}

fn write_delimiter(out: &mut Vec<u8>, boundary: &str, eol: LineEnding) {
    out.extend_from_slice(b"--");
    out.extend_from_slice(boundary.as_bytes());
    out.extend_from_slice(eol.as_bytes());
}

fn with_line_ending(text: &str, eol: LineEnding) -> String {
    let text = text.replace("\r\n", "\n");
    match eol {
        LineEnding::Lf => text,
        LineEnding::CrLf => text.replace('\n', "\r\n"),
    }
}

fn crlf_to_lf(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut iter = bytes.iter().peekable();
    while let Some(&byte) = iter.next() {
        if byte == b'\r' && iter.peek() == Some(&&b'\n') {
            continue;
        }
        out.push(byte);
    }
    out
}

/// Derives a boundary from the enclosed bodies.
///
/// The same bodies always yield the same boundary. `=_` never occurs in
/// quoted-printable or base64 output, and a numeric prefix is added until
/// the boundary occurs in neither body.
fn boundary_for(bodies: &[&str]) -> String {
    let hash = bodies
        .iter()
        .flat_map(|body| body.bytes())
        .fold(FNV_OFFSET, |hash, byte| {
            (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
        });

    let base = format!("{BOUNDARY_PREFIX}{hash:016x}");
    let mut candidate = base.clone();
    let mut attempt = 0u32;
    while bodies.iter().any(|body| body.contains(&candidate)) {
        attempt += 1;
        candidate = format!("{attempt}{base}");
    }
    candidate
}

#[cfg(test)]
#[path = "assemble_tests.rs"]
mod tests;
