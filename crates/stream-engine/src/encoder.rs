//! Encoder command contract.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use rankcast_common::config::{is_rtmp_url, StreamConfig};
use rankcast_common::error::{RankcastError, RankcastResult};

/// Everything needed to build the encoder command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderConfig {
    pub ffmpeg_path: PathBuf,
    pub ingest_url: String,
    pub rtmp_token: String,
    pub input_fps: u32,
    pub output_fps: u32,
    pub keyframe_interval: u32,
    pub output_width: u32,
    pub output_height: u32,
    pub preset: String,
}

impl From<&StreamConfig> for EncoderConfig {
    fn from(config: &StreamConfig) -> Self {
        Self {
            ffmpeg_path: config.ffmpeg_path.clone(),
            ingest_url: config.ingest_url.clone(),
            rtmp_token: config.rtmp_token.clone(),
            input_fps: config.input_fps,
            output_fps: config.output_fps,
            keyframe_interval: config.keyframe_interval,
            output_width: config.output_width,
            output_height: config.output_height,
            preset: config.preset.clone(),
        }
    }
}

impl EncoderConfig {
    /// Reject settings the encoder cannot run with.
    pub fn validate(&self) -> RankcastResult<()> {
        if self.rtmp_token.trim().is_empty() {
            return Err(RankcastError::stream_launch("stream token is empty"));
        }
        if self.rtmp_token.chars().any(|c| c.is_whitespace() || c == '/') {
            return Err(RankcastError::stream_launch(
                "stream token must not contain whitespace or '/'",
            ));
        }
        if !is_rtmp_url(&self.ingest_url) {
            return Err(RankcastError::stream_launch(format!(
                "ingest URL must start with rtmp:// or rtmps:// (got '{}')",
                self.ingest_url
            )));
        }
        if self.input_fps == 0 || self.output_fps == 0 {
            return Err(RankcastError::stream_launch("frame rates must be non-zero"));
        }
        if self.output_width == 0
            || self.output_height == 0
            || self.output_width % 2 != 0
            || self.output_height % 2 != 0
        {
            // yuv420p needs even dimensions
            return Err(RankcastError::stream_launch(format!(
                "output size {}x{} must be non-zero and even",
                self.output_width, self.output_height
            )));
        }
        Ok(())
    }

    /// Full RTMP destination, including the stream token.
    pub fn destination(&self) -> String {
        format!("{}/{}", self.ingest_url.trim_end_matches('/'), self.rtmp_token)
    }

    /// Destination with the token masked, for logs.
    pub fn redacted_destination(&self) -> String {
        format!("{}/****", self.ingest_url.trim_end_matches('/'))
    }

    /// Encoder arguments for looping `input` (relative to the working
    /// directory) into the RTMP destination.
    pub fn args(&self, input: &Path) -> Vec<String> {
        let mut args: Vec<String> = vec!["-nostdin".into(), "-nostats".into(), "-hide_banner".into()];

        // Input: one still image, re-read on every loop at the input rate.
        args.extend([
            "-framerate".to_string(),
            self.input_fps.to_string(),
            "-re".to_string(),
            "-loop".to_string(),
            "1".to_string(),
            "-i".to_string(),
            input.to_string_lossy().into_owned(),
        ]);

        args.extend([
            "-f".to_string(),
            "flv".to_string(),
            "-vcodec".to_string(),
            "libx264".to_string(),
            "-pix_fmt".to_string(),
            "yuv420p".to_string(),
            "-preset".to_string(),
            self.preset.clone(),
            "-r".to_string(),
            self.output_fps.to_string(),
            "-g".to_string(),
            self.keyframe_interval.to_string(),
            "-s".to_string(),
            format!("{}x{}", self.output_width, self.output_height),
            self.destination(),
        ]);
        args
    }

    /// The argument list with the destination token masked.
    pub fn redacted_args(&self, input: &Path) -> Vec<String> {
        let destination = self.destination();
        self.args(input)
            .into_iter()
            .map(|a| {
                if a == destination {
                    self.redacted_destination()
                } else {
                    a
                }
            })
            .collect()
    }
}

/// Whether `binary` can be executed (a path, or a name found on `PATH`).
pub fn command_exists(binary: &Path) -> bool {
    Command::new(binary)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}
