//! External renderer abstraction and the process-backed implementation.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::ConversionError;

/// An external document renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    /// The asciidoctor processor (AsciiDoc to HTML or DocBook).
    Asciidoctor,
    /// The pandoc universal converter.
    Pandoc,
}

impl Tool {
    /// Program name used when no other path is configured.
    #[must_use]
    pub const fn default_program(self) -> &'static str {
        match self {
            Self::Asciidoctor => "asciidoctor",
            Self::Pandoc => "pandoc",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.default_program())
    }
}

/// One request to a renderer: which tool, with which arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// The renderer to run.
    pub tool: Tool,
    /// Arguments, not including the program itself.
    pub args: Vec<String>,
}

impl Invocation {
    /// `asciidoctor [options] -b <backend> -o - -`
    #[must_use]
    pub fn asciidoctor(options: Vec<String>, backend: &str) -> Self {
        let mut args = options;
        args.extend(["-b", backend, "-o", "-", "-"].map(String::from));
        Self {
            tool: Tool::Asciidoctor,
            args,
        }
    }

    /// `pandoc -f <from> -t <to>`
    #[must_use]
    pub fn pandoc(from: &str, to: &str) -> Self {
        Self {
            tool: Tool::Pandoc,
            args: ["-f", from, "-t", to].map(String::from).to_vec(),
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tool)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Bytes-in, bytes-out document renderer.
///
/// The full input is handed over at once and the full output comes back
/// once the renderer is done. Tests substitute a fake implementation.
pub trait Renderer: Send + Sync {
    /// Runs one invocation over `input`.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError`] if the renderer cannot be started, exits
    /// unsuccessfully, or the pipes fail.
    fn render(
        &self,
        invocation: &Invocation,
        input: &[u8],
    ) -> impl std::future::Future<Output = Result<Vec<u8>, ConversionError>> + Send;
}

/// Resolves each [`Tool`] to the program that runs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    asciidoctor: PathBuf,
    pandoc: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            asciidoctor: PathBuf::from(Tool::Asciidoctor.default_program()),
            pandoc: PathBuf::from(Tool::Pandoc.default_program()),
        }
    }
}

impl ToolPaths {
    /// Overrides the program for one tool.
    #[must_use]
    pub fn with(mut self, tool: Tool, program: impl Into<PathBuf>) -> Self {
        match tool {
            Tool::Asciidoctor => self.asciidoctor = program.into(),
            Tool::Pandoc => self.pandoc = program.into(),
        }
        self
    }

    /// Returns the program for a tool.
    #[must_use]
    pub fn program(&self, tool: Tool) -> &Path {
        match tool {
            Tool::Asciidoctor => &self.asciidoctor,
            Tool::Pandoc => &self.pandoc,
        }
    }
}

/// Production renderer that runs the tools as child processes.
///
/// Each call spawns the program, writes the whole input to its stdin while
/// collecting stdout and stderr, and waits for it to exit. There is no
/// timeout: a renderer that hangs blocks the run.
#[derive(Debug, Clone, Default)]
pub struct ProcessRenderer {
    paths: ToolPaths,
}

impl ProcessRenderer {
    /// Creates a renderer using the default program names.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a renderer with custom program paths.
    #[must_use]
    pub const fn with_paths(paths: ToolPaths) -> Self {
        Self { paths }
    }
}

impl Renderer for ProcessRenderer {
    async fn render(&self, invocation: &Invocation, input: &[u8]) -> Result<Vec<u8>, ConversionError> {
        let tool = invocation.tool;
        let program = self.paths.program(tool);
        tracing::debug!("Running {invocation} ({} bytes in)", input.len());

        let mut child = Command::new(program)
            .args(&invocation.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ConversionError::Launch {
                tool,
                program: program.to_path_buf(),
                source,
            })?;

        let mut stdin = child.stdin.take().ok_or_else(|| ConversionError::Io {
            tool,
            source: std::io::Error::other("stdin was not captured"),
        })?;

        // Feed stdin concurrently so a renderer that writes before it has
        // read everything cannot deadlock on a full pipe.
        let feed = async move {
            stdin.write_all(input).await?;
            stdin.shutdown().await
        };
        let (fed, output) = tokio::join!(feed, child.wait_with_output());

        let output = output.map_err(|source| ConversionError::Io { tool, source })?;
        if !output.status.success() {
            return Err(ConversionError::failed(tool, output.status, &output.stderr));
        }
        fed.map_err(|source| ConversionError::Io { tool, source })?;

        tracing::debug!("{tool} finished ({} bytes out)", output.stdout.len());
        Ok(output.stdout)
    }
}
