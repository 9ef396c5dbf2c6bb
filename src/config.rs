use crate::error::{Result, TapeSieveError};
use crate::sheet::ColumnRef;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub source: SourceConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    /// Folder scanned when the user types the input keyword instead of a
    /// path.
    pub input_folder: PathBuf,
    /// Column letters to extract, positionally (name, return date,
    /// description, ...).
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    pub directory: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub directory: PathBuf,
    pub enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            input_folder: PathBuf::from("Input"),
            columns: vec!["A".to_string(), "B".to_string(), "D".to_string()],
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("Output"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("Logs"),
            enabled: true,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(TapeSieveError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| TapeSieveError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| TapeSieveError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["tapesieve.toml", ".tapesieve.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref columns) = cli_args.columns {
            self.source.columns = columns
                .split(',')
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Some(ref input_dir) = cli_args.input_dir {
            self.source.input_folder = input_dir.clone();
        }

        if let Some(ref output_dir) = cli_args.output_dir {
            self.output.directory = output_dir.clone();
        }

        if let Some(logging_enabled) = cli_args.logging_enabled {
            self.logging.enabled = logging_enabled;
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| TapeSieveError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| TapeSieveError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.source.columns.len() < 3 {
            return Err(TapeSieveError::Config {
                message: format!(
                    "At least 3 column letters must be configured (name, return date, description); got {}",
                    self.source.columns.len()
                ),
            });
        }

        for column in &self.source.columns {
            ColumnRef::parse(column)?;
        }

        if self.source.input_folder.as_os_str().is_empty() {
            return Err(TapeSieveError::Config {
                message: "The input folder must not be empty".to_string(),
            });
        }

        if self.output.directory.as_os_str().is_empty() {
            return Err(TapeSieveError::Config {
                message: "The output directory must not be empty".to_string(),
            });
        }

        if self.logging.enabled && self.logging.directory.as_os_str().is_empty() {
            return Err(TapeSieveError::Config {
                message: "The log directory must not be empty while logging is enabled"
                    .to_string(),
            });
        }

        Ok(())
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub columns: Option<String>,
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub logging_enabled: Option<bool>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_columns(mut self, columns: Option<String>) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_input_dir(mut self, input_dir: Option<PathBuf>) -> Self {
        self.input_dir = input_dir;
        self
    }

    pub fn with_output_dir(mut self, output_dir: Option<PathBuf>) -> Self {
        self.output_dir = output_dir;
        self
    }

    pub fn with_logging_enabled(mut self, enabled: Option<bool>) -> Self {
        self.logging_enabled = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.source.columns, vec!["A", "B", "D"]);
        assert_eq!(config.source.input_folder, PathBuf::from("Input"));
        assert_eq!(config.output.directory, PathBuf::from("Output"));
        assert!(config.logging.enabled);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.source.columns = vec!["A".to_string(), "B".to_string()];
        assert!(config.validate().is_err());

        config.source.columns = vec!["A".to_string(), "B".to_string(), "3".to_string()];
        assert!(matches!(
            config.validate(),
            Err(TapeSieveError::InvalidColumn { .. })
        ));
    }

    #[test]
    fn test_config_file_operations() {
        let config = Config::default();
        let temp_file = NamedTempFile::new().unwrap();

        config.save_to_file(temp_file.path()).unwrap();

        let loaded_config = Config::load_from_file(temp_file.path()).unwrap();
        assert_eq!(config.source.columns, loaded_config.source.columns);
        assert_eq!(config.output.directory, loaded_config.output.directory);
    }

    #[test]
    fn test_missing_config_file() {
        let result = Config::load_from_file("no/such/config.toml");
        assert!(matches!(result, Err(TapeSieveError::Config { .. })));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = Config::default();

        let overrides = CliOverrides::new()
            .with_columns(Some("a, c ,e".to_string()))
            .with_output_dir(Some(PathBuf::from("Elsewhere")))
            .with_logging_enabled(Some(false));

        config.merge_with_cli_args(&overrides);

        assert_eq!(config.source.columns, vec!["A", "C", "E"]);
        assert_eq!(config.output.directory, PathBuf::from("Elsewhere"));
        assert!(!config.logging.enabled);
    }

    #[test]
    fn test_sample_config_generation() {
        let sample = Config::create_sample_config();
        assert!(!sample.is_empty());
        assert!(sample.contains("[source]"));
        assert!(sample.contains("[output]"));
        assert!(sample.contains("[logging]"));
    }
}
