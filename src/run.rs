//! Application execution logic.
//!
//! One run reads the input message, converts its body, assembles the
//! `multipart/alternative` result and writes it out. Nothing is written
//! unless every earlier step succeeded.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use multimark::config::{ConfigError, Settings, defaults, expand_path};
use multimark::convert::{ConversionError, Converter, ProcessRenderer, Renderer};
use multimark::mime::{self, Message, MessageError};

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// An input or output path could not be expanded.
    #[error("{0}")]
    Path(#[source] ConfigError),

    /// Failed to read the input message.
    #[error("Failed to read input {}: {source}", describe(path))]
    Input {
        /// Input path, `-` for stdin
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The input message could not be parsed or decoded.
    #[error("Invalid input message: {0}")]
    Message(#[from] MessageError),

    /// An external renderer failed.
    #[error("Conversion failed: {0}")]
    Conversion(#[from] ConversionError),

    /// Failed to write the output message.
    #[error("Failed to write output {}: {source}", describe(path))]
    Output {
        /// Output path, `-` for stdout
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

fn describe(path: &Path) -> String {
    if is_stdio(path) {
        "(standard stream)".to_string()
    } else {
        format!("'{}'", path.display())
    }
}

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == defaults::STDIO
}

/// Converts one raw message into the assembled output message.
///
/// # Errors
///
/// Returns an error if the message cannot be parsed or decoded, or if a
/// renderer fails.
pub async fn transform<R: Renderer>(
    raw: &[u8],
    settings: &Settings,
    converter: &Converter<R>,
) -> Result<Vec<u8>, RunError> {
    let message = Message::parse(raw)?;
    let source = message.source_text();
    tracing::debug!(
        "Converting {} bytes of {} from a {} part ({})",
        source.len(),
        settings.in_format(),
        message.source_type(),
        message.layout()
    );

    let bodies = converter.render_both(source, settings).await?;
    Ok(mime::assemble(&message, &bodies.plain, &bodies.html)?)
}

/// Executes one run with the external renderers.
///
/// # Errors
///
/// See [`execute_with`].
///
/// # Coverage Note
///
/// This function is excluded from coverage because it needs the real
/// renderer binaries.
#[cfg(not(tarpaulin_include))]
pub async fn execute(settings: Settings) -> Result<(), RunError> {
    let converter = Converter::new(ProcessRenderer::new());
    execute_with(&settings, &converter).await
}

/// Executes one run: read, transform, write.
///
/// # Errors
///
/// Returns an error if a path cannot be expanded, the input cannot be read,
/// the conversion fails, or the output cannot be written. The output is
/// left untouched on every error before the write.
pub async fn execute_with<R: Renderer>(
    settings: &Settings,
    converter: &Converter<R>,
) -> Result<(), RunError> {
    let input = expand_path(settings.infile()).map_err(RunError::Path)?;
    let output = expand_path(settings.outfile()).map_err(RunError::Path)?;

    let raw = read_input(&input).await?;
    tracing::debug!("Read {} bytes from {}", raw.len(), describe(&input));

    let message = transform(&raw, settings, converter).await?;

    write_output(&output, &message).await?;
    tracing::info!("Wrote {} bytes to {}", message.len(), describe(&output));

    Ok(())
}

async fn read_input(path: &Path) -> Result<Vec<u8>, RunError> {
    let to_error = |source: std::io::Error| RunError::Input {
        path: path.to_path_buf(),
        source,
    };

    if is_stdio(path) {
        let mut raw = Vec::new();
        tokio::io::stdin()
            .read_to_end(&mut raw)
            .await
            .map_err(to_error)?;
        Ok(raw)
    } else {
        tokio::fs::read(path).await.map_err(to_error)
    }
}

async fn write_output(path: &Path, message: &[u8]) -> Result<(), RunError> {
    let to_error = |source: std::io::Error| RunError::Output {
        path: path.to_path_buf(),
        source,
    };

    if is_stdio(path) {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(message).await.map_err(to_error)?;
        stdout.flush().await.map_err(to_error)
    } else {
        tokio::fs::write(path, message).await.map_err(to_error)
    }
}
