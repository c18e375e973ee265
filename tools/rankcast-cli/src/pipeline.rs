//! Wiring from configuration to pipeline components.

use std::sync::Arc;
use std::time::Duration;

use rankcast_common::config::{AppConfig, RenderConfig, StoreConfig};
use rankcast_common::error::RankcastResult;
use rankcast_ranking::{MemoryRankingStore, RankingFetcher, RankingStore, RedisRankingStore};
use rankcast_render_engine::{
    load_font, AvatarSource, BackgroundRotator, Compositor, CompositorSettings, HttpAvatarSource,
};
use rankcast_scheduler::RefreshScheduler;

/// The render side of the application.
pub struct Pipeline {
    pub fetcher: RankingFetcher,
    pub rotator: Arc<BackgroundRotator>,
    pub compositor: Arc<Compositor>,
}

impl Pipeline {
    /// Load every startup asset. Any failure here is fatal.
    pub fn build(config: &AppConfig) -> RankcastResult<Self> {
        let fetcher = build_fetcher(&config.store)?;
        let rotator = Arc::new(BackgroundRotator::initialize(&config.render.background_dir)?);
        let compositor = Arc::new(build_compositor(&config.render)?);
        Ok(Self {
            fetcher,
            rotator,
            compositor,
        })
    }

    pub fn into_scheduler(self, render: &RenderConfig) -> RefreshScheduler {
        RefreshScheduler::new(
            self.fetcher,
            self.rotator,
            self.compositor,
            Duration::from_secs(render.refresh_interval_secs),
            render.top_n,
        )
    }
}

/// A fixture file when configured, Redis otherwise.
pub fn build_store(config: &StoreConfig) -> RankcastResult<Arc<dyn RankingStore>> {
    let store: Arc<dyn RankingStore> = match &config.fixture {
        Some(path) => Arc::new(MemoryRankingStore::from_json_file(path)?),
        None => Arc::new(RedisRankingStore::new(config)?),
    };
    tracing::info!(store = %store.describe(), "Ranking store configured");
    Ok(store)
}

pub fn build_fetcher(config: &StoreConfig) -> RankcastResult<RankingFetcher> {
    Ok(RankingFetcher::new(
        build_store(config)?,
        Duration::from_secs(config.timeout_secs),
    ))
}

pub fn build_compositor(config: &RenderConfig) -> RankcastResult<Compositor> {
    let font = load_font(&config.font_path)?;
    let avatars: Arc<dyn AvatarSource> = Arc::new(HttpAvatarSource::new(
        &config.avatar_host,
        Duration::from_secs(config.avatar_timeout_secs),
    )?);
    Ok(Compositor::new(CompositorSettings::from(config), font, avatars))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rankcast_common::error::RankcastError;

    #[test]
    fn test_fixture_store_is_preferred() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = dir.path().join("standings.json");
        std::fs::write(&fixture, r#"{"scores":[],"names":{}}"#).unwrap();

        let store = build_store(&StoreConfig {
            fixture: Some(fixture),
            ..StoreConfig::default()
        })
        .unwrap();
        assert!(store.describe().starts_with("memory"));
    }

    #[test]
    fn test_redis_store_by_default() {
        let store = build_store(&StoreConfig::default()).unwrap();
        assert!(store.describe().starts_with("redis localhost:6379"));
    }

    #[test]
    fn test_missing_font_aborts_startup() {
        let dir = tempfile::tempdir().unwrap();
        let config = RenderConfig {
            font_path: dir.path().join("font.ttf"),
            ..RenderConfig::default()
        };
        let err = build_compositor(&config).err().unwrap();
        assert!(matches!(err, RankcastError::AssetLoad { .. }));
        assert!(!err.is_tick_recoverable());
    }
}
