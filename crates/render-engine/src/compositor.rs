//! Image compositor: standings + background -> still image on disk.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use ab_glyph::FontArc;
use image::RgbaImage;
use tokio::task::JoinSet;

use rankcast_common::config::RenderConfig;
use rankcast_common::error::{RankcastError, RankcastResult};
use rankcast_leaderboard_model::Standings;

use crate::avatar::AvatarSource;
use crate::background::Background;
use crate::export::write_png_atomic;
use crate::layout::Layout;
use crate::raster::Rasterizer;
use crate::scene::{build_scene, Captions, Scene};

/// Fixed parameters of every render.
#[derive(Debug, Clone)]
pub struct CompositorSettings {
    pub width: u32,
    pub height: u32,

    /// Size requested from the avatar service.
    pub avatar_size: u32,

    /// Canonical still-image path.
    pub output_path: PathBuf,

    pub captions: Captions,
}

impl From<&RenderConfig> for CompositorSettings {
    fn from(config: &RenderConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            avatar_size: config.avatar_size,
            output_path: config.output_path.clone(),
            captions: Captions {
                title: config.title.clone(),
                subtitle: config.subtitle.clone(),
                footer: config.footer.clone(),
            },
        }
    }
}

/// Outcome of one render.
#[derive(Debug, Clone)]
pub struct RenderReport {
    pub output_path: PathBuf,
    pub background: String,
    pub rows: usize,
    pub avatars_drawn: usize,
    pub avatars_skipped: usize,
    pub elapsed: Duration,
}

/// Draws the leaderboard and publishes it.
pub struct Compositor {
    settings: CompositorSettings,
    rasterizer: Rasterizer,
    avatars: Arc<dyn AvatarSource>,
}

impl Compositor {
    pub fn new(settings: CompositorSettings, font: FontArc, avatars: Arc<dyn AvatarSource>) -> Self {
        Self {
            settings,
            rasterizer: Rasterizer::new(font),
            avatars,
        }
    }

    /// Build the display list for `standings` without drawing it.
    pub fn scene(&self, standings: &Standings) -> Scene {
        let layout = Layout::new(self.settings.width, self.settings.height, standings.len());
        build_scene(&layout, standings, &self.settings.captions)
    }

    /// Draw the leaderboard into memory.
    pub async fn compose(
        &self,
        standings: &Standings,
        background: &Background,
    ) -> RankcastResult<Composed> {
        let scene = self.scene(standings);
        let wanted: Vec<String> = scene.avatar_names().map(str::to_string).collect();
        let avatars = self.fetch_avatars(&wanted).await;
        let drawn = wanted.iter().filter(|n| avatars.contains_key(*n)).count();

        let rasterizer = self.rasterizer.clone();
        let background = background.clone();
        let image = tokio::task::spawn_blocking(move || {
            rasterizer.rasterize(&scene, &background, &avatars)
        })
        .await
        .map_err(|e| RankcastError::render(format!("raster task failed: {e}")))??;

        Ok(Composed {
            image,
            avatars_drawn: drawn,
            avatars_skipped: wanted.len() - drawn,
        })
    }

    /// Draw the leaderboard and atomically replace the still image.
    ///
    /// On error the previous still image is left as it was.
    pub async fn render(
        &self,
        standings: &Standings,
        background: &Background,
    ) -> RankcastResult<RenderReport> {
        let path = self.settings.output_path.clone();
        self.render_to(standings, background, &path).await
    }

    /// Like [`render`](Self::render) but writes to `path`.
    pub async fn render_to(
        &self,
        standings: &Standings,
        background: &Background,
        path: &Path,
    ) -> RankcastResult<RenderReport> {
        let started = Instant::now();
        let composed = self.compose(standings, background).await?;

        let target = path.to_path_buf();
        let image = composed.image;
        tokio::task::spawn_blocking(move || write_png_atomic(&target, &image))
            .await
            .map_err(|e| RankcastError::render(format!("export task failed: {e}")))??;

        let report = RenderReport {
            output_path: path.to_path_buf(),
            background: background.name.clone(),
            rows: standings.len(),
            avatars_drawn: composed.avatars_drawn,
            avatars_skipped: composed.avatars_skipped,
            elapsed: started.elapsed(),
        };
        tracing::info!(
            path = %report.output_path.display(),
            background = %report.background,
            rows = report.rows,
            avatars = report.avatars_drawn,
            skipped = report.avatars_skipped,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Rendered leaderboard"
        );
        Ok(report)
    }

    /// Fetch every distinct avatar concurrently. Failures are logged and
    /// leave the name out of the map.
    async fn fetch_avatars(&self, names: &[String]) -> HashMap<String, RgbaImage> {
        let mut tasks = JoinSet::new();
        let mut seen = std::collections::HashSet::new();
        for name in names {
            if !seen.insert(name.clone()) {
                continue;
            }
            let source = Arc::clone(&self.avatars);
            let name = name.clone();
            let size = self.settings.avatar_size;
            tasks.spawn(async move {
                let result = source.fetch(&name, size).await;
                (name, result)
            });
        }

        let mut avatars = HashMap::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((name, Ok(image))) => {
                    avatars.insert(name, image);
                }
                Ok((name, Err(e))) => {
                    tracing::warn!(name = %name, error = %e, "Skipping avatar");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Avatar task failed");
                }
            }
        }
        avatars
    }
}

/// An in-memory render.
#[derive(Debug, Clone)]
pub struct Composed {
    pub image: RgbaImage,
    pub avatars_drawn: usize,
    pub avatars_skipped: usize,
}
