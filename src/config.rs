use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

pub const DEFAULT_REPORT_DAYS: u32 = 7;
pub const MAX_REPORT_DAYS: u32 = 36_500;

const ENV_DATA_FILE: &str = "SFMS_DATA_FILE";
const ENV_REPORT_DAYS: &str = "SFMS_REPORT_DAYS";

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Path to the JSON data file
    pub data_file: ConfigValue<PathBuf>,
    /// Days covered by a report when no start date is given
    pub report_days: ConfigValue<u32>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    data_file: Option<PathBuf>,
    report_days: Option<u32>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        Self::load_with(config_path, |key| std::env::var(key).ok())
    }

    pub(crate) fn load_with(
        config_path: Option<PathBuf>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut data_file = ConfigValue::new(Self::default_data_file(), ConfigSource::Default);
        let mut report_days = ConfigValue::new(DEFAULT_REPORT_DAYS, ConfigSource::Default);
        let mut config_file = None;

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            if let Some(file) = file_config.data_file {
                data_file = ConfigValue::new(resolve_relative(&path, file), ConfigSource::File);
            }
            if let Some(days) = file_config.report_days {
                report_days =
                    ConfigValue::new(check_report_days(days, "report_days")?, ConfigSource::File);
            }
            config_file = Some(path);
        }

        if let Some(file) = env(ENV_DATA_FILE).filter(|v| !v.is_empty()) {
            data_file = ConfigValue::new(PathBuf::from(file), ConfigSource::Environment);
        }
        if let Some(days) = env(ENV_REPORT_DAYS) {
            let parsed = days
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(ENV_REPORT_DAYS.to_string(), days.clone()))?;
            report_days = ConfigValue::new(
                check_report_days(parsed, ENV_REPORT_DAYS)?,
                ConfigSource::Environment,
            );
        }

        Ok(Self {
            data_file,
            report_days,
            config_file,
        })
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/sfms/
    /// - macOS: ~/Library/Application Support/sfms/
    /// - Windows: %APPDATA%/sfms/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sfms")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/sfms/
    /// - macOS: ~/Library/Application Support/sfms/
    /// - Windows: %APPDATA%/sfms/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sfms")
    }

    pub fn default_data_file() -> PathBuf {
        Self::default_data_dir().join("fitness_data.json")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

/// Relative paths in a config file are relative to the file itself.
fn resolve_relative(config_path: &Path, value: PathBuf) -> PathBuf {
    if value.is_relative() {
        config_path
            .parent()
            .map(|p| p.join(&value))
            .unwrap_or(value)
    } else {
        value
    }
}

fn check_report_days(days: u32, key: &str) -> Result<u32, ConfigError> {
    if days == 0 || days > MAX_REPORT_DAYS {
        return Err(ConfigError::InvalidValue(key.to_string(), days.to_string()));
    }
    Ok(days)
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    InvalidValue(String, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::InvalidValue(key, value) => {
                write!(
                    f,
                    "Invalid value '{}' for {}: expected a number of days from 1 to {}",
                    value, key, MAX_REPORT_DAYS
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ReadError(_, e) => Some(e),
            ConfigError::ParseError(_, e) => Some(e),
            ConfigError::InvalidValue(_, _) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::tempdir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_default_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nonexistent.yaml");

        let config = Config::load_with(Some(config_path), no_env).unwrap();
        assert!(config
            .data_file
            .value
            .to_string_lossy()
            .contains("fitness_data.json"));
        assert_eq!(config.data_file.source, ConfigSource::Default);
        assert_eq!(config.report_days.value, DEFAULT_REPORT_DAYS);
        assert_eq!(config.report_days.source, ConfigSource::Default);
        assert!(config.config_file.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "data_file: /custom/path/fitness.json").unwrap();
        writeln!(file, "report_days: 30").unwrap();

        let config = Config::load_with(Some(config_path.clone()), no_env).unwrap();
        assert_eq!(
            config.data_file.value,
            PathBuf::from("/custom/path/fitness.json")
        );
        assert_eq!(config.data_file.source, ConfigSource::File);
        assert_eq!(config.report_days.value, 30);
        assert_eq!(config.report_days.source, ConfigSource::File);
        assert_eq!(config.config_file, Some(config_path));
    }

    #[test]
    fn test_relative_data_file_resolves_against_config_dir() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "data_file: data/fitness.json\n").unwrap();

        let config = Config::load_with(Some(config_path), no_env).unwrap();
        assert_eq!(
            config.data_file.value,
            temp_dir.path().join("data/fitness.json")
        );
    }

    #[test]
    fn test_env_var_overrides_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "data_file: fromfile.json\nreport_days: 30\n").unwrap();

        let env: HashMap<&str, &str> = [
            ("SFMS_DATA_FILE", "/from/env.json"),
            ("SFMS_REPORT_DAYS", "14"),
        ]
        .into_iter()
        .collect();
        let config = Config::load_with(Some(config_path), |key| {
            env.get(key).map(|v| v.to_string())
        })
        .unwrap();

        assert_eq!(config.data_file.value, PathBuf::from("/from/env.json"));
        assert_eq!(config.data_file.source, ConfigSource::Environment);
        assert_eq!(config.report_days.value, 14);
        assert_eq!(config.report_days.source, ConfigSource::Environment);
    }

    #[test]
    fn test_invalid_report_days() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("missing.yaml");

        let err = Config::load_with(Some(config_path.clone()), |key| {
            (key == "SFMS_REPORT_DAYS").then(|| "soon".to_string())
        })
        .unwrap_err();
        assert!(err.to_string().contains("SFMS_REPORT_DAYS"));

        let err = Config::load_with(Some(config_path), |key| {
            (key == "SFMS_REPORT_DAYS").then(|| "0".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_, _)));
    }

    #[test]
    fn test_oversized_report_days() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let err = Config::load_with(Some(config_path.clone()), |key| {
            (key == "SFMS_REPORT_DAYS").then(|| "4000000000".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_, _)));
        assert!(err.to_string().contains("from 1 to 36500"));

        std::fs::write(&config_path, "report_days: 4000000000\n").unwrap();
        let err = Config::load_with(Some(config_path.clone()), no_env).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref key, _) if key == "report_days"));

        std::fs::write(&config_path, format!("report_days: {}\n", MAX_REPORT_DAYS)).unwrap();
        let config = Config::load_with(Some(config_path), no_env).unwrap();
        assert_eq!(config.report_days.value, MAX_REPORT_DAYS);
    }

    #[test]
    fn test_invalid_yaml_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "invalid: yaml: content: [").unwrap();

        let result = Config::load_with(Some(config_path), no_env);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_partial_file_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "report_days: 14").unwrap();
        // data_file not specified

        let config = Config::load_with(Some(config_path), no_env).unwrap();
        assert_eq!(config.data_file.source, ConfigSource::Default);
        assert_eq!(config.report_days.value, 14);
        assert_eq!(config.report_days.source, ConfigSource::File);
    }
}
