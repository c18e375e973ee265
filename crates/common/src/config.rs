//! Application configuration.
//!
//! The on-disk format is JSON. Every section carries defaults so a minimal
//! file only needs the store credentials and the stream token:
//!
//! ```json
//! {
//!   "redis": { "address": "localhost:6379", "password": "", "key": "xp" },
//!   "twitch": { "rtmp_token": "live_..." }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{RankcastError, RankcastResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Ranking store connection.
    #[serde(alias = "redis")]
    pub store: StoreConfig,

    /// Outbound stream settings.
    #[serde(alias = "twitch")]
    pub stream: StreamConfig,

    /// Still image rendering.
    pub render: RenderConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Ranking store connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// `host:port`, or a full `redis://` URL.
    pub address: String,

    /// Password; empty means no AUTH.
    pub password: String,

    /// Sorted-set key holding the scores.
    pub key: String,

    /// Logical database index.
    pub db: u32,

    /// Upper bound for one complete fetch, name lookups included.
    pub timeout_secs: u64,

    /// Read standings from a JSON file instead of Redis.
    pub fixture: Option<PathBuf>,
}

/// Encoder and ingest settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Stream key appended to the ingest URL.
    pub rtmp_token: String,

    /// Ingest application URL, without the stream key.
    pub ingest_url: String,

    /// Encoder binary.
    pub ffmpeg_path: PathBuf,

    /// Rate at which the still image is re-read.
    pub input_fps: u32,

    /// Output frame rate.
    pub output_fps: u32,

    /// Keyframe interval (GOP size) in frames.
    pub keyframe_interval: u32,

    pub output_width: u32,
    pub output_height: u32,

    /// x264 preset.
    pub preset: String,

    /// Relaunch the encoder after it exits.
    pub restart_on_exit: bool,

    /// First restart delay; doubles per consecutive crash.
    pub restart_initial_secs: u64,

    /// Restart delay cap.
    pub restart_max_secs: u64,

    /// Grace period between SIGTERM and a forced kill on shutdown.
    pub stop_timeout_secs: u64,
}

/// Still image rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Canonical still image, read continuously by the encoder.
    pub output_path: PathBuf,

    /// Directory of background images, cycled in file-name order.
    pub background_dir: PathBuf,

    /// TrueType font used for every text element.
    pub font_path: PathBuf,

    pub width: u32,
    pub height: u32,

    /// Number of ranked rows.
    pub top_n: usize,

    pub refresh_interval_secs: u64,

    /// Avatar service base URL.
    pub avatar_host: String,

    /// Avatar edge length in pixels, on the reference canvas.
    pub avatar_size: u32,

    pub avatar_timeout_secs: u64,

    pub title: String,
    pub subtitle: String,
    pub footer: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "rankcast=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            address: "localhost:6379".to_string(),
            password: String::new(),
            key: "leaderboard".to_string(),
            db: 0,
            timeout_secs: 5,
            fixture: None,
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            rtmp_token: String::new(),
            ingest_url: "rtmp://live-cdg.twitch.tv/app".to_string(),
            ffmpeg_path: PathBuf::from("ffmpeg"),
            input_fps: 2,
            output_fps: 2,
            keyframe_interval: 4,
            output_width: 1280,
            output_height: 720,
            preset: "veryslow".to_string(),
            restart_on_exit: true,
            restart_initial_secs: 1,
            restart_max_secs: 60,
            stop_timeout_secs: 5,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("leaderboard.png"),
            background_dir: PathBuf::from("bg"),
            font_path: PathBuf::from("font.ttf"),
            width: 1920,
            height: 1080,
            top_n: 3,
            refresh_interval_secs: 20,
            avatar_host: "https://minotar.net".to_string(),
            avatar_size: 32,
            avatar_timeout_secs: 5,
            title: "Veckans topplista".to_string(),
            subtitle: "Återställs varje söndag".to_string(),
            footer: "Vill du vara med och tävla? Anslut till minarty.fun!".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load config from an explicit path.
    ///
    /// Unlike [`AppConfig::load`], a missing or malformed file is an error.
    pub fn load_from(path: &Path) -> RankcastResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RankcastError::config(format!("Failed to read {}: {e}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            RankcastError::config(format!("Failed to parse {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to an explicit path.
    pub fn save_to(&self, path: &Path) -> RankcastResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> RankcastResult<()> {
        let render = &self.render;
        if render.width == 0 || render.height == 0 {
            return Err(RankcastError::config("render width/height must be non-zero"));
        }
        if render.top_n == 0 {
            return Err(RankcastError::config("render.top_n must be at least 1"));
        }
        if render.refresh_interval_secs == 0 {
            return Err(RankcastError::config(
                "render.refresh_interval_secs must be non-zero",
            ));
        }
        if self.store.timeout_secs == 0 {
            return Err(RankcastError::config("store.timeout_secs must be non-zero"));
        }

        let stream = &self.stream;
        if stream.input_fps == 0 || stream.output_fps == 0 {
            return Err(RankcastError::config("stream frame rates must be non-zero"));
        }
        if stream.output_width % 2 != 0 || stream.output_height % 2 != 0 {
            // yuv420p needs even dimensions
            return Err(RankcastError::config(
                "stream output width/height must be even",
            ));
        }
        if !is_rtmp_url(&stream.ingest_url) {
            return Err(RankcastError::config(format!(
                "stream.ingest_url must start with rtmp:// or rtmps:// (got '{}')",
                stream.ingest_url
            )));
        }
        Ok(())
    }
}

/// Whether `url` uses an RTMP scheme the encoder can push to.
pub fn is_rtmp_url(url: &str) -> bool {
    url.starts_with("rtmp://") || url.starts_with("rtmps://")
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("rankcast").join("config.json")
}
