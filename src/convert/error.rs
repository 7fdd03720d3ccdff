//! Error types for document conversion.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

use super::Tool;

/// Error type for external renderer invocations.
///
/// Every variant is fatal: the pipeline never retries and never produces a
/// partial message.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// The renderer program could not be started.
    #[error("Failed to launch {tool} ('{}'): {source}", program.display())]
    Launch {
        /// Which renderer
        tool: Tool,
        /// Program that was resolved for it
        program: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Piping data to or from the renderer failed.
    #[error("I/O error while running {tool}: {source}")]
    Io {
        /// Which renderer
        tool: Tool,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The renderer exited unsuccessfully.
    #[error("{tool} failed ({status}): {stderr}")]
    Failed {
        /// Which renderer
        tool: Tool,
        /// Exit code or signal description
        status: String,
        /// Captured standard error
        stderr: String,
    },

    /// The renderer produced output that is not UTF-8.
    #[error("{tool} produced invalid UTF-8 output: {source}")]
    InvalidOutput {
        /// Which renderer
        tool: Tool,
        /// Decoding error
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// The asciidoctor options could not be prepared.
    #[error("Invalid renderer options: {0}")]
    Options(#[from] ConfigError),
}

impl ConversionError {
    /// Creates a `Failed` error from an exit status and captured stderr.
    #[must_use]
    pub fn failed(tool: Tool, status: std::process::ExitStatus, stderr: &[u8]) -> Self {
        let status = status
            .code()
            .map_or_else(|| "terminated by signal".to_string(), |code| format!("exit code {code}"));

        Self::Failed {
            tool,
            status,
            stderr: String::from_utf8_lossy(stderr).trim().to_string(),
        }
    }

    /// The renderer involved, if any.
    #[must_use]
    pub const fn tool(&self) -> Option<Tool> {
        match self {
            Self::Launch { tool, .. }
            | Self::Io { tool, .. }
            | Self::Failed { tool, .. }
            | Self::InvalidOutput { tool, .. } => Some(*tool),
            Self::Options(_) => None,
        }
    }

    /// A suggestion for the user, if the failure has an obvious remedy.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        let tool = self.tool()?;
        match self {
            Self::Launch { .. } => Some(format!(
                "Make sure '{tool}' is installed and on your PATH."
            )),
            Self::Failed { .. } => Some(format!(
                "Run with --verbose to see the {tool} command line."
            )),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn launch_error(tool: Tool) -> ConversionError {
        ConversionError::Launch {
            tool,
            program: PathBuf::from(tool.default_program()),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        }
    }

    #[test]
    fn tool_is_reported_for_renderer_errors() {
        assert_eq!(launch_error(Tool::Pandoc).tool(), Some(Tool::Pandoc));

        let failed = ConversionError::Failed {
            tool: Tool::Asciidoctor,
            status: "exit code 1".to_string(),
            stderr: String::new(),
        };
        assert_eq!(failed.tool(), Some(Tool::Asciidoctor));
    }

    #[test]
    fn options_error_has_no_tool_or_hint() {
        let error = ConversionError::Options(ConfigError::InvalidOption {
            name: "attribute".to_string(),
            reason: "must be a table".to_string(),
        });
        assert_eq!(error.tool(), None);
        assert_eq!(error.hint(), None);
    }

    #[test]
    fn launch_hint_names_the_program() {
        let hint = launch_error(Tool::Asciidoctor).hint().unwrap();
        assert_eq!(hint, "Make sure 'asciidoctor' is installed and on your PATH.");
    }

    #[test]
    fn failure_hint_suggests_verbose() {
        let failed = ConversionError::Failed {
            tool: Tool::Pandoc,
            status: "exit code 64".to_string(),
            stderr: "unknown reader".to_string(),
        };
        assert_eq!(
            failed.hint().as_deref(),
            Some("Run with --verbose to see the pandoc command line.")
        );
    }
}
