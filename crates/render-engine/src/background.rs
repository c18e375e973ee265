//! Background rotation.
//!
//! Backgrounds are decoded once at startup and handed out round-robin, one
//! per render.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use image::RgbaImage;

use rankcast_common::error::{RankcastError, RankcastResult};

/// A decoded background image.
#[derive(Debug, Clone)]
pub struct Background {
    /// File name it was loaded from.
    pub name: String,

    /// Decoded pixels, shared between renders.
    pub image: Arc<RgbaImage>,
}

impl Background {
    pub fn new(name: impl Into<String>, image: RgbaImage) -> Self {
        Self {
            name: name.into(),
            image: Arc::new(image),
        }
    }

    /// Load and decode a single background file.
    pub fn load(path: &Path) -> RankcastResult<Self> {
        let image = image::open(path)
            .map_err(|e| RankcastError::asset_load(path, e.to_string()))?
            .to_rgba8();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, image))
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Fixed cycle of backgrounds with a shared cursor.
#[derive(Debug)]
pub struct BackgroundRotator {
    backgrounds: Vec<Background>,
    cursor: AtomicUsize,
}

impl BackgroundRotator {
    /// Load every regular, non-hidden file in `dir`, in file-name order.
    ///
    /// Fails if the directory cannot be read or any file fails to decode.
    /// An empty directory is accepted; `next()` then reports
    /// `NoBackgroundsAvailable`.
    pub fn initialize(dir: &Path) -> RankcastResult<Self> {
        let files = list_background_files(dir)?;
        let mut backgrounds = Vec::with_capacity(files.len());
        for path in &files {
            let background = Background::load(path)?;
            tracing::debug!(
                name = %background.name,
                width = background.image.width(),
                height = background.image.height(),
                "Loaded background"
            );
            backgrounds.push(background);
        }

        if backgrounds.is_empty() {
            tracing::warn!(dir = %dir.display(), "Background directory is empty");
        } else {
            tracing::info!(
                dir = %dir.display(),
                count = backgrounds.len(),
                "Loaded backgrounds"
            );
        }

        Ok(Self::from_backgrounds(backgrounds))
    }

    pub fn from_backgrounds(backgrounds: Vec<Background>) -> Self {
        Self {
            backgrounds,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Return the background under the cursor and advance it.
    pub fn next(&self) -> RankcastResult<Background> {
        let len = self.backgrounds.len();
        if len == 0 {
            return Err(RankcastError::NoBackgroundsAvailable);
        }
        let index = self
            .cursor
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| Some((c + 1) % len))
            .unwrap_or_else(|c| c);
        Ok(self.backgrounds[index % len].clone())
    }

    /// Index the next call to `next()` will return.
    pub fn cursor(&self) -> usize {
        self.cursor.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.backgrounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backgrounds.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.backgrounds.iter().map(|b| b.name.as_str())
    }
}

fn list_background_files(dir: &Path) -> RankcastResult<Vec<PathBuf>> {
    let entries =
        std::fs::read_dir(dir).map_err(|e| RankcastError::asset_load(dir, e.to_string()))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| RankcastError::asset_load(dir, e.to_string()))?;
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        if is_file && !hidden {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}
