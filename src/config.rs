use crate::events::StreamOrder;
use crate::layout::{
    DEFAULT_BLOCK_WIDTH, DEFAULT_WINDOW_START_HOUR, DEFAULT_X_OFFSET, DEFAULT_Y_OFFSET,
    GridLayout,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use time::Time;

pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub app: AppSection,
    pub logging: LoggingSection,
    pub source: SourceSection,
    pub image: ImageSection,
    #[serde(default)]
    pub layout: Option<LayoutSection>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSection {
    pub name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSection {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceSection {
    /// Event log to read
    pub path: PathBuf,
    /// Channel selector, empty or absent selects every record
    #[serde(default)]
    pub query: Option<String>,
    /// Delivery order of the log (default: ascending)
    #[serde(default)]
    pub order: StreamOrder,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ImageSection {
    pub input: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LayoutSection {
    pub window_start_hour: Option<u8>,
    pub x_offset: Option<u32>,
    pub y_offset: Option<u32>,
    pub block_width: Option<u32>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("configuration is incomplete: {0} is empty")]
    Incomplete(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Everything one run of the pipeline needs, resolved from [`Config`].
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub query: Option<String>,
    pub order: StreamOrder,
    pub input_image: PathBuf,
    pub output_image: PathBuf,
    pub layout: GridLayout,
}

pub fn load_default() -> Result<Config, ConfigError> {
    load_from_path(DEFAULT_CONFIG_PATH)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.source.path.as_os_str().is_empty() {
            return Err(ConfigError::Incomplete("source.path"));
        }
        if self.image.input.as_os_str().is_empty() {
            return Err(ConfigError::Incomplete("image.input"));
        }
        if self.image.output.as_os_str().is_empty() {
            return Err(ConfigError::Incomplete("image.output"));
        }
        self.layout()?;
        Ok(())
    }

    /// Returns the channel selector, or None when every record is wanted.
    pub fn query(&self) -> Option<&str> {
        self.source
            .query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }

    pub fn log_level(&self) -> tracing::Level {
        self.logging.level.parse().unwrap_or(tracing::Level::INFO)
    }

    /// Builds the grid layout, falling back to the built-in geometry for
    /// every key left out of `[layout]`.
    pub fn layout(&self) -> Result<GridLayout, ConfigError> {
        let section = self.layout.clone().unwrap_or_default();
        let hour = section
            .window_start_hour
            .unwrap_or(DEFAULT_WINDOW_START_HOUR);
        let window_start = Time::from_hms(hour, 0, 0)
            .map_err(|e| ConfigError::Invalid(format!("layout.window_start_hour: {e}")))?;
        let block_width = section.block_width.unwrap_or(DEFAULT_BLOCK_WIDTH);
        if block_width == 0 {
            return Err(ConfigError::Invalid(
                "layout.block_width must be positive".to_string(),
            ));
        }
        let layout = GridLayout::new(
            window_start,
            section.x_offset.unwrap_or(DEFAULT_X_OFFSET),
            section.y_offset.unwrap_or(DEFAULT_Y_OFFSET),
            block_width,
        );
        if layout.required_size().is_none() {
            return Err(ConfigError::Invalid(
                "layout offsets and block_width overflow pixel coordinates".to_string(),
            ));
        }
        Ok(layout)
    }

    pub fn run_settings(&self) -> Result<RunSettings, ConfigError> {
        Ok(RunSettings {
            query: self.query().map(str::to_string),
            order: self.source.order,
            input_image: self.image.input.clone(),
            output_image: self.image.output.clone(),
            layout: self.layout()?,
        })
    }
}
