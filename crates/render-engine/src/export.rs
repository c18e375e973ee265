//! Still-image publication.
//!
//! The encoder reads the still image continuously, so it is never written in
//! place: the PNG goes to a hidden temporary file in the same directory and is
//! renamed over the target.

use std::io::{Cursor, Write};
use std::path::Path;

use image::{DynamicImage, ImageFormat, RgbaImage};

use rankcast_common::error::{RankcastError, RankcastResult};

/// Encode `image` as PNG (alpha dropped).
pub fn encode_png(image: &RgbaImage) -> RankcastResult<Vec<u8>> {
    let rgb = DynamicImage::ImageRgba8(image.clone()).into_rgb8();
    let mut buf = Cursor::new(Vec::new());
    rgb.write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| RankcastError::render(format!("PNG encode failed: {e}")))?;
    Ok(buf.into_inner())
}

/// Atomically replace `path` with `image` encoded as PNG.
///
/// On failure the previous file at `path` is left untouched and no temporary
/// file remains.
pub fn write_png_atomic(path: &Path, image: &RgbaImage) -> RankcastResult<()> {
    let png = encode_png(image)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .map_err(|e| RankcastError::render(format!("create {}: {e}", dir.display())))?;

    let stem = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "still".to_string());

    let mut tmp = tempfile::Builder::new()
        .prefix(&format!(".{stem}."))
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| RankcastError::render(format!("temp file in {}: {e}", dir.display())))?;

    tmp.write_all(&png)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| RankcastError::render(format!("write {}: {e}", tmp.path().display())))?;

    // Dropping `tmp` on the error path removes the temporary file.
    tmp.persist(path)
        .map_err(|e| RankcastError::render(format!("rename to {}: {}", path.display(), e.error)))?;

    tracing::debug!(path = %path.display(), bytes = png.len(), "Published still image");
    Ok(())
}
