use std::path::{Path, PathBuf};

use serde::Deserialize;

/// File name searched for when discovering a project configuration.
pub const CONFIG_FILE_NAME: &str = "Monty.toml";

/// Default number of characters shown for a token value in debug dumps.
pub const DEFAULT_DISPLAY_WIDTH: usize = 254;

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// The parsed Monty.toml configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MontyConfig {
    pub output: OutputConfig,
    pub log: LogConfig,
    /// The file this configuration was loaded from, if any.
    pub source: Option<PathBuf>,
}

/// How token dumps are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `Token(type='...', value='...', line=N, column=N)` per line.
    #[default]
    Debug,
    /// One JSON object per line.
    Json,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default = "default_display_width")]
    pub display_width: usize,
    #[serde(default)]
    pub skip_comments: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            display_width: DEFAULT_DISPLAY_WIDTH,
            skip_comments: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_display_width() -> usize {
    DEFAULT_DISPLAY_WIDTH
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Raw TOML structure for deserialization.
#[derive(Deserialize)]
struct RawConfig {
    #[serde(default)]
    output: OutputConfig,
    #[serde(default)]
    log: LogConfig,
}

/// Errors that can occur when loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read Monty.toml: {0}")]
    Read(#[from] std::io::Error),
    #[error("invalid Monty.toml: {0}")]
    Parse(String),
    #[error("invalid Monty.toml: [output] display_width must be at least 1")]
    InvalidWidth,
    #[error("invalid Monty.toml: [log] unknown level '{0}' (expected one of error, warn, info, debug, trace)")]
    InvalidLogLevel(String),
}

/// Walk up from `start_dir` looking for `Monty.toml`.
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Load and validate a configuration file.
pub fn load_config(path: &Path) -> Result<MontyConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut config = parse_config(&content)?;
    config.source = Some(path.to_path_buf());
    Ok(config)
}

/// Parse and validate configuration text.
pub fn parse_config(content: &str) -> Result<MontyConfig, ConfigError> {
    let raw: RawConfig =
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

    if raw.output.display_width == 0 {
        return Err(ConfigError::InvalidWidth);
    }
    validate_log_level(&raw.log.level)?;

    Ok(MontyConfig {
        output: raw.output,
        log: raw.log,
        source: None,
    })
}

/// Check that `level` names a known log level.
fn validate_log_level(level: &str) -> Result<(), ConfigError> {
    if LOG_LEVELS.contains(&level) {
        Ok(())
    } else {
        Err(ConfigError::InvalidLogLevel(level.to_string()))
    }
}

/// Find and load the configuration governing `start_dir`.
///
/// A missing file is not an error: defaults are returned instead.
pub fn find_and_load_config(start_dir: &Path) -> Result<MontyConfig, ConfigError> {
    match find_config(start_dir) {
        Some(path) => load_config(&path),
        None => Ok(MontyConfig::default()),
    }
}
