/// Error types surfaced by loading and construction
use std::path::PathBuf;

use thiserror::Error;

/// Failure to turn a geometry file into a mesh. Fatal to the load.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed geometry at line {line}: {message}")]
    Format { line: usize, message: String },
}

impl LoadError {
    pub(crate) fn format(line: usize, message: impl Into<String>) -> Self {
        Self::Format {
            line,
            message: message.into(),
        }
    }
}

/// Failure to produce a texture. Callers fall back to a solid placeholder.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("failed to decode texture {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("texture {path} has an unsupported number of channels: {channels}")]
    UnsupportedChannels { path: PathBuf, channels: u8 },
}

/// Failure to read the scene configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
