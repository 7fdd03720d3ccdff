//! Tests for settings loading.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use super::error::ConfigError;
use super::loader::{expand_path, load_with, write_default_config};
use super::merge::SourceValues;
use super::registry::SettingKey;
use super::toml::{ConfigLocator, TomlConfig};

fn config_dir_with(content: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("multimarkmakerrc.toml"), content).unwrap();
    dir
}

fn path_string(path: &Path) -> String {
    path.display().to_string()
}

mod discovery {
    use super::*;

    #[test]
    fn no_config_yields_defaults() {
        let settings = load_with(&SourceValues::new(), &ConfigLocator::default()).unwrap();

        assert_eq!(settings.in_format(), "commonmark");
        assert_eq!(settings.config_file(), "");
    }

    #[test]
    fn discovered_file_is_read_and_recorded() {
        let dir = config_dir_with("out-format = \"plain\"");
        let locator = ConfigLocator::default().with_config_dir(dir.path());

        let settings = load_with(&SourceValues::new(), &locator).unwrap();

        assert_eq!(settings.out_format(), "plain");
        assert_eq!(
            settings.config_file(),
            path_string(&dir.path().join("multimarkmakerrc.toml"))
        );
    }

    #[test]
    fn empty_config_file_disables_discovery() {
        let dir = config_dir_with("out-format = \"plain\"");
        let locator = ConfigLocator::default().with_config_dir(dir.path());
        let cli = SourceValues::new().with(SettingKey::ConfigFile, "");

        let settings = load_with(&cli, &locator).unwrap();

        assert_eq!(settings.out_format(), "commonmark");
        assert_eq!(settings.config_file(), "");
    }

    #[test]
    fn explicit_file_beats_discovery() {
        let discovered = config_dir_with("out-format = \"plain\"");
        let explicit = config_dir_with("out-format = \"rst\"");
        let explicit_path = explicit.path().join("multimarkmakerrc.toml");
        let locator = ConfigLocator::default().with_config_dir(discovered.path());
        let cli = SourceValues::new().with(SettingKey::ConfigFile, path_string(&explicit_path));

        let settings = load_with(&cli, &locator).unwrap();

        assert_eq!(settings.out_format(), "rst");
        assert_eq!(settings.config_file(), path_string(&explicit_path));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let cli = SourceValues::new().with(
            SettingKey::ConfigFile,
            path_string(&dir.path().join("absent.toml")),
        );

        let result = load_with(&cli, &ConfigLocator::default());

        assert!(matches!(result, Err(ConfigError::FileRead { .. })));
    }
}

mod precedence {
    use super::*;

    #[test]
    fn cli_beats_file() {
        let dir = config_dir_with("in-format = \"markdown\"\nattach-inline-code = true");
        let locator = ConfigLocator::default().with_config_dir(dir.path());
        let cli = SourceValues::new().with(SettingKey::InFormat, "asciidoctor");

        let settings = load_with(&cli, &locator).unwrap();

        assert_eq!(settings.in_format(), "asciidoctor");
        assert!(settings.attach_inline_code());
    }

    #[test]
    fn file_type_error_surfaces() {
        let dir = config_dir_with("infile = 3");
        let locator = ConfigLocator::default().with_config_dir(dir.path());

        let result = load_with(&SourceValues::new(), &locator);

        assert!(matches!(result, Err(ConfigError::TypeMismatch { .. })));
    }
}

mod option_string {
    use super::*;

    #[test]
    fn well_formed_string_is_kept_raw() {
        let cli = SourceValues::new().with(
            SettingKey::AsciidoctorOptionsString,
            "--attribute 'toc=left'",
        );

        let settings = load_with(&cli, &ConfigLocator::default()).unwrap();

        assert_eq!(
            settings.asciidoctor_options_string(),
            "--attribute 'toc=left'"
        );
    }

    #[test]
    fn unterminated_quote_is_rejected_at_load() {
        let cli = SourceValues::new().with(
            SettingKey::AsciidoctorOptionsString,
            "--attribute 'toc=left",
        );

        let result = load_with(&cli, &ConfigLocator::default());

        assert!(matches!(
            result,
            Err(ConfigError::InvalidOptionString { .. })
        ));
    }
}

mod paths {
    use super::*;

    #[test]
    fn stdio_is_unchanged() {
        assert_eq!(expand_path("-").unwrap(), PathBuf::from("-"));
    }

    #[test]
    fn plain_path_is_unchanged() {
        assert_eq!(
            expand_path("/tmp/mail.eml").unwrap(),
            PathBuf::from("/tmp/mail.eml")
        );
    }

    #[test]
    fn tilde_expands_to_home() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        assert_eq!(expand_path("~/mail.eml").unwrap(), home.join("mail.eml"));
    }

    #[test]
    fn unset_variable_is_an_error() {
        let result = expand_path("$MULTIMARK_TEST_SURELY_UNSET_VARIABLE/x");
        assert!(matches!(result, Err(ConfigError::PathExpansion { .. })));
    }
}

mod init {
    use super::*;

    #[test]
    fn written_template_loads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("multimarkmakerrc.toml");

        write_default_config(&path).unwrap();

        assert!(TomlConfig::load(&path).is_ok());
    }

    #[test]
    fn unwritable_path_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("multimarkmakerrc.toml");

        let result = write_default_config(&path);

        assert!(matches!(result, Err(ConfigError::FileWrite { .. })));
    }
}
