//! Default values for configuration options.
//!
//! Centralized constants to avoid magic strings scattered across the codebase.

/// Path value meaning standard input / standard output.
pub const STDIO: &str = "-";

/// Default input and output format (CommonMark-flavored Markdown).
pub const FORMAT: &str = "commonmark";

/// Attach files referenced from the body by default.
pub const ATTACH_FILE_REFERENCES: bool = true;

/// Do not turn inline code into attachments by default.
pub const ATTACH_INLINE_CODE: bool = false;

/// Config file name looked up during discovery.
pub const CONFIG_FILE_NAME: &str = "multimarkmakerrc.toml";

/// Per-user config subdirectory under the platform config dir.
pub const CONFIG_SUBDIR: &str = "multi-mark-maker";

/// Environment variable naming a directory that holds the config file.
pub const CONFIG_DIR_ENV: &str = "MULTI_MARK_CONFIG_DIR";

/// XDG config home environment variable.
pub const XDG_CONFIG_HOME_ENV: &str = "XDG_CONFIG_HOME";

/// Default output path for `multimark init`.
pub const INIT_OUTPUT: &str = "multimarkmakerrc.toml";
