use pamconf_engine::{ColumnWidths, FileManager, Writer, WriterOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// The literal `"auto"` in `columns = "auto"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoColumns {
    Auto,
}

/// Pretty column widths: measured per file, or fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Columns {
    Auto(AutoColumns),
    Fixed(ColumnWidths),
}

impl Default for Columns {
    fn default() -> Self {
        Columns::Auto(AutoColumns::Auto)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterSettings {
    pub max_line_length: usize,
    pub continuation_indent: usize,
    pub pretty: bool,
    pub columns: Columns,
}

impl Default for WriterSettings {
    fn default() -> Self {
        let options = WriterOptions::default();
        Self {
            max_line_length: options.max_line_length,
            continuation_indent: options.continuation_indent,
            pretty: options.pretty,
            columns: Columns::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub pam_d_dir: PathBuf,
    pub pam_conf_path: PathBuf,
    pub writer: WriterSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pam_d_dir: PathBuf::from("/etc/pam.d"),
            pam_conf_path: PathBuf::from("/etc/pam.conf"),
            writer: WriterSettings::default(),
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the loaded paths
        config.pam_d_dir = Self::expand_path(&config.pam_d_dir).unwrap_or(config.pam_d_dir);
        config.pam_conf_path =
            Self::expand_path(&config.pam_conf_path).unwrap_or(config.pam_conf_path);

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/pamconf");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Writer options from `[writer]`. Auto columns are measured from each
    /// configuration as it is written.
    pub fn writer(&self) -> Writer {
        let settings = &self.writer;
        let columns = match settings.columns {
            Columns::Fixed(widths) => Some(widths),
            Columns::Auto(_) => None,
        };
        Writer::with_options(WriterOptions {
            max_line_length: settings.max_line_length,
            continuation_indent: settings.continuation_indent,
            pretty: settings.pretty,
            columns,
        })
    }

    pub fn file_manager(&self) -> FileManager {
        FileManager::with_writer(self.writer())
    }

    /// Path of a per-service file inside the configured `pam.d` directory.
    pub fn service_path(&self, service: &str) -> PathBuf {
        self.pam_d_dir.join(service)
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(e) => {
                log::warn!("Failed to expand {path_str}: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pamconf_engine::{Format, Parser};
    use pretty_assertions::assert_eq;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        // Should not contain tilde anymore
        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/pamconf/config.toml"));
    }

    #[test]
    fn test_defaults_when_table_is_empty() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.pam_d_dir, PathBuf::from("/etc/pam.d"));
        assert_eq!(config.writer.max_line_length, 100);
        assert_eq!(config.writer.columns, Columns::Auto(AutoColumns::Auto));
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let original = Config {
            pam_d_dir: PathBuf::from("/tmp/pam.d"),
            pam_conf_path: PathBuf::from("/tmp/pam.conf"),
            writer: WriterSettings {
                max_line_length: 80,
                continuation_indent: 2,
                pretty: true,
                columns: Columns::Fixed(ColumnWidths {
                    category: 10,
                    control: 14,
                    module: 24,
                }),
            },
        };

        let toml_str = toml::to_string(&original).unwrap();
        let deserialized: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(deserialized, original);
    }

    #[test]
    fn test_columns_accept_auto_or_table() {
        let auto: Config = toml::from_str("[writer]\ncolumns = \"auto\"\n").unwrap();
        assert_eq!(auto.writer.columns, Columns::Auto(AutoColumns::Auto));

        let fixed: Config = toml::from_str(
            "[writer.columns]\ncategory = 9\ncontrol = 13\nmodule = 21\n",
        )
        .unwrap();
        assert_eq!(
            fixed.writer.columns,
            Columns::Fixed(ColumnWidths {
                category: 9,
                control: 13,
                module: 21,
            })
        );
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let path = PathBuf::from("~/test/pam.d");
        let expanded = Config::expand_path(&path).unwrap();

        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().contains("test/pam.d"));
    }

    #[test]
    fn test_expand_path_with_env_var() {
        unsafe {
            env::set_var("PAMCONF_TEST_ROOT", "/test/env/path");
        }

        let path = PathBuf::from("$PAMCONF_TEST_ROOT/pam.d");
        let expanded = Config::expand_path(&path);

        assert_eq!(expanded, Some(PathBuf::from("/test/env/path/pam.d")));

        unsafe {
            env::remove_var("PAMCONF_TEST_ROOT");
        }
    }

    #[test]
    fn test_expand_path_with_unset_var() {
        let path = PathBuf::from("$PAMCONF_SURELY_UNSET_VARIABLE/pam.d");
        assert_eq!(Config::expand_path(&path), None);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = Config::load_from_path(&non_existent_config).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_load_invalid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "pam_d_dir = [").unwrap();

        let result = Config::load_from_path(&config_file);

        assert!(matches!(result, Err(ConfigError::ConfigParseError { .. })));
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested/config.toml");
        let test_config = Config {
            pam_d_dir: PathBuf::from("/srv/pam.d"),
            ..Config::default()
        };

        test_config.save_to_path(&config_file).unwrap();
        let loaded_config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded_config, test_config);
    }

    #[test]
    fn test_writer_uses_settings() {
        let config: Config =
            toml::from_str("[writer]\nmax_line_length = 60\npretty = true\n").unwrap();

        let writer = config.writer();

        assert_eq!(writer.options().max_line_length, 60);
        assert_eq!(writer.options().continuation_indent, 4);
        assert!(writer.options().pretty);
        assert_eq!(writer.options().columns, None);
    }

    #[test]
    fn test_writer_keeps_fixed_columns() {
        let config: Config = toml::from_str(
            "[writer.columns]\ncategory = 9\ncontrol = 13\nmodule = 21\n",
        )
        .unwrap();

        assert_eq!(
            config.writer().options().columns,
            Some(ColumnWidths {
                category: 9,
                control: 13,
                module: 21,
            })
        );
    }

    #[test]
    fn test_writer_measures_auto_columns() {
        let settings: Config = toml::from_str("[writer]\npretty = true\n").unwrap();
        let pam = Parser::new()
            .parse_str(
                "auth required pam_unix.so nullok\nsession optional pam_systemd.so\n",
                Format::PerService,
            )
            .unwrap();

        let output = settings.writer().write_string(&pam);

        assert_eq!(
            output,
            "auth     required  pam_unix.so     nullok\n\nsession  optional  pam_systemd.so\n"
        );
    }

    #[test]
    fn test_file_manager_saves_with_settings() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Config {
            pam_d_dir: temp_dir.path().join("pam.d"),
            ..Config::default()
        };
        let path = settings.service_path("login");
        let pam = Parser::new()
            .parse_str("auth required pam_unix.so\n", Format::PerService)
            .unwrap();

        let manager = settings.file_manager();
        manager.save(&pam, &path).unwrap();

        let loaded = manager.load(&path).unwrap();
        assert_eq!(
            loaded.rules().next().unwrap().service.as_deref(),
            Some("login")
        );
    }

    #[test]
    fn test_file_manager_measures_auto_columns_on_save() {
        let temp_dir = TempDir::new().unwrap();
        let settings: Config = toml::from_str("[writer]\npretty = true\n").unwrap();
        let path = temp_dir.path().join("pam.d/sshd");
        let pam = Parser::new()
            .parse_str(
                "auth required pam_unix.so nullok\nsession optional pam_systemd.so\n",
                Format::PerService,
            )
            .unwrap();

        settings.file_manager().save(&pam, &path).unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "auth     required  pam_unix.so     nullok\n\nsession  optional  pam_systemd.so\n"
        );
    }
}
