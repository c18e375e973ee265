//! Error types shared across rankcast crates.

use std::path::PathBuf;

/// Top-level error type for rankcast operations.
#[derive(Debug, thiserror::Error)]
pub enum RankcastError {
    #[error("Data source unavailable: {message}")]
    DataSourceUnavailable { message: String },

    #[error("Asset load error ({}): {message}", path.display())]
    AssetLoad { path: PathBuf, message: String },

    #[error("No backgrounds available")]
    NoBackgroundsAvailable,

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Avatar fetch error for '{name}': {message}")]
    AvatarFetch { name: String, message: String },

    #[error("Stream launch error: {message}")]
    StreamLaunch { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using RankcastError.
pub type RankcastResult<T> = Result<T, RankcastError>;

impl RankcastError {
    pub fn data_source(msg: impl Into<String>) -> Self {
        Self::DataSourceUnavailable {
            message: msg.into(),
        }
    }

    pub fn asset_load(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::AssetLoad {
            path: path.into(),
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn avatar_fetch(name: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::AvatarFetch {
            name: name.into(),
            message: msg.into(),
        }
    }

    pub fn stream_launch(msg: impl Into<String>) -> Self {
        Self::StreamLaunch {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Whether a refresh tick that hit this error can simply be skipped and
    /// retried on the next interval.
    ///
    /// Everything else (asset loading, stream launch, configuration) only
    /// happens at startup and aborts the process.
    pub fn is_tick_recoverable(&self) -> bool {
        matches!(
            self,
            Self::DataSourceUnavailable { .. }
                | Self::NoBackgroundsAvailable
                | Self::Render { .. }
                | Self::AvatarFetch { .. }
        )
    }
}
