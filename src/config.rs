//! Run configuration.
//!
//! Every section and field is optional in the TOML file; missing values
//! fall back to the defaults below.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::format::VideoFormat;
use crate::lut::DEFAULT_THRESHOLD;

/// Filter parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Threshold `c`: output is set where `clip - clip2 <= -c`.
    pub c: i32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            c: DEFAULT_THRESHOLD,
        }
    }
}

/// Synthetic source clips fed to the filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Frame width in pixels.
    pub width: usize,
    /// Frame height in pixels.
    pub height: usize,
    /// Number of frames per clip.
    pub frames: usize,
    /// Format name, e.g. `gray8` or `yuv420p16`.
    pub format: String,
    /// Noise seed of `clip`; `clip2` uses `seed + 1`.
    pub seed: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            frames: 10,
            format: "gray8".to_string(),
            seed: 0,
        }
    }
}

impl SourceConfig {
    /// Parsed video format.
    pub fn video_format(&self) -> Result<VideoFormat, ConfigError> {
        self.format
            .parse()
            .map_err(|_| ConfigError::UnknownFormat(self.format.clone()))
    }
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Print Prometheus metrics after the render.
    pub metrics: bool,
    /// Render frames on the thread pool.
    pub parallel: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            metrics: false,
            parallel: true,
        }
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Width or height is zero.
    #[error("invalid frame dimensions")]
    InvalidDimensions,
    /// Zero frames requested.
    #[error("frame count must be at least 1")]
    InvalidFrameCount,
    /// Format name not recognized.
    #[error("unknown video format: {0}")]
    UnknownFormat(String),
    /// The file could not be read.
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    /// The file is not valid TOML for this layout.
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// `[filter]` section.
    #[serde(default)]
    pub filter: FilterConfig,
    /// `[source]` section.
    #[serde(default)]
    pub source: SourceConfig,
    /// `[output]` section.
    #[serde(default)]
    pub output: OutputConfig,
}

impl FileConfig {
    /// Loads and validates configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration parameters.
    ///
    /// Format support is left to the filter so its own error is reported.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.width == 0 || self.source.height == 0 {
            return Err(ConfigError::InvalidDimensions);
        }
        if self.source.frames == 0 {
            return Err(ConfigError::InvalidFrameCount);
        }
        self.source.video_format()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = FileConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.filter.c, 3);
        assert_eq!((config.source.width, config.source.height), (640, 480));
        assert_eq!(config.source.frames, 10);
        assert_eq!(config.source.video_format().unwrap(), VideoFormat::GRAY8);
        assert!(!config.output.metrics);
        assert!(config.output.parallel);
    }

    #[test]
    fn test_partial_sections() {
        let config = FileConfig::from_toml(
            r#"
            [filter]
            c = -2

            [source]
            format = "yuv420p16"
            seed = 42
            "#,
        )
        .unwrap();
        assert_eq!(config.filter.c, -2);
        assert_eq!(config.source.video_format().unwrap(), VideoFormat::YUV420P16);
        assert_eq!(config.source.seed, 42);
        assert_eq!(config.source.width, 640);
        assert!(config.output.parallel);
    }

    #[test]
    fn test_zero_dimensions_invalid() {
        let mut config = FileConfig::default();
        config.source.width = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidDimensions));
    }

    #[test]
    fn test_zero_frames_invalid() {
        let mut config = FileConfig::default();
        config.source.frames = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidFrameCount));
    }

    #[test]
    fn test_unknown_format_invalid() {
        let result = FileConfig::from_toml("[source]\nformat = \"gray12\"\n");
        assert_eq!(result.unwrap_err(), ConfigError::UnknownFormat("gray12".to_string()));
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            FileConfig::from_toml("[filter\nc = 1"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            FileConfig::from_file("/nonexistent/abrz.toml"),
            Err(ConfigError::FileReadError(_))
        ));
    }
}
