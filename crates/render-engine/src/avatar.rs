//! Avatar image capability.
//!
//! Avatars are decoration: the compositor calls the source, logs failures and
//! keeps going.

use std::time::Duration;

use image::RgbaImage;
use reqwest::Url;

use rankcast_common::error::{RankcastError, RankcastResult};

/// Fetches a player's avatar by display name.
#[async_trait::async_trait]
pub trait AvatarSource: Send + Sync {
    async fn fetch(&self, name: &str, size: u32) -> RankcastResult<RgbaImage>;
}

/// Avatar service reachable over HTTP at `{host}/avatar/{name}/{size}.png`.
pub struct HttpAvatarSource {
    client: reqwest::Client,
    host: Url,
}

impl HttpAvatarSource {
    pub fn new(host: &str, timeout: Duration) -> RankcastResult<Self> {
        let host = Url::parse(host)
            .map_err(|e| RankcastError::config(format!("invalid avatar host '{host}': {e}")))?;
        if host.cannot_be_a_base() {
            return Err(RankcastError::config(format!(
                "avatar host '{host}' cannot carry a path"
            )));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("rankcast/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RankcastError::config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, host })
    }

    /// Avatar URL for `name`; the name is percent-encoded as one path segment.
    pub fn avatar_url(&self, name: &str, size: u32) -> Url {
        let mut url = self.host.clone();
        let file = format!("{size}.png");
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["avatar", name, file.as_str()]);
        }
        url
    }
}

#[async_trait::async_trait]
impl AvatarSource for HttpAvatarSource {
    async fn fetch(&self, name: &str, size: u32) -> RankcastResult<RgbaImage> {
        let url = self.avatar_url(name, size);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RankcastError::avatar_fetch(name, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RankcastError::avatar_fetch(name, format!("HTTP {status}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| RankcastError::avatar_fetch(name, e.to_string()))?;
        let image = image::load_from_memory(&bytes)
            .map_err(|e| RankcastError::avatar_fetch(name, format!("decode: {e}")))?;
        Ok(image.to_rgba8())
    }
}

/// A source that never has an avatar. Used when rendering offline.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAvatars;

#[async_trait::async_trait]
impl AvatarSource for NoAvatars {
    async fn fetch(&self, name: &str, _size: u32) -> RankcastResult<RgbaImage> {
        Err(RankcastError::avatar_fetch(name, "avatars disabled"))
    }
}
