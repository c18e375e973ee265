//! Deterministic rasteriser for [`Scene`]s.

use std::collections::HashMap;
use std::path::Path;

use ab_glyph::{FontArc, PxScale};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;

use rankcast_common::error::{RankcastError, RankcastResult};

use crate::background::Background;
use crate::layout::Bounds;
use crate::scene::{DrawOp, Scene};

/// Load a TrueType/OpenType font from disk.
pub fn load_font(path: &Path) -> RankcastResult<FontArc> {
    let bytes = std::fs::read(path).map_err(|e| RankcastError::asset_load(path, e.to_string()))?;
    FontArc::try_from_vec(bytes).map_err(|e| RankcastError::asset_load(path, e.to_string()))
}

/// Paints scenes onto an RGBA canvas with a single font.
#[derive(Clone)]
pub struct Rasterizer {
    font: FontArc,
}

impl Rasterizer {
    pub fn new(font: FontArc) -> Self {
        Self { font }
    }

    /// Paint `scene` over `background`.
    ///
    /// `avatars` maps display names to decoded avatars; names without an
    /// entry are skipped.
    pub fn rasterize(
        &self,
        scene: &Scene,
        background: &Background,
        avatars: &HashMap<String, RgbaImage>,
    ) -> RankcastResult<RgbaImage> {
        if scene.width == 0 || scene.height == 0 {
            return Err(RankcastError::render("canvas has zero size"));
        }

        let mut canvas = RgbaImage::new(scene.width, scene.height);
        for op in &scene.ops {
            match op {
                DrawOp::Background => paint_background(&mut canvas, background),
                DrawOp::Panel {
                    bounds,
                    radius,
                    color,
                } => fill_rounded_rect(&mut canvas, *bounds, *radius, *color),
                DrawOp::Text {
                    text,
                    center_x,
                    center_y,
                    size,
                    color,
                } => self.draw_centered_text(&mut canvas, text, *center_x, *center_y, *size, *color),
                DrawOp::Avatar { name, bounds } => {
                    if let Some(avatar) = avatars.get(name) {
                        paint_avatar(&mut canvas, avatar, *bounds);
                    }
                }
            }
        }
        Ok(canvas)
    }

    /// Rendered width and height of `text` at `size` px.
    pub fn measure(&self, text: &str, size: f32) -> (u32, u32) {
        text_size(PxScale::from(size), &self.font, text)
    }

    fn draw_centered_text(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        center_x: i32,
        center_y: i32,
        size: f32,
        color: Rgba<u8>,
    ) {
        if text.is_empty() || size <= 0.0 {
            return;
        }
        let (w, h) = self.measure(text, size);
        let x = center_x - (w / 2) as i32;
        let y = center_y - (h / 2) as i32;
        draw_text_mut(canvas, color, x, y, PxScale::from(size), &self.font, text);
    }
}

fn paint_background(canvas: &mut RgbaImage, background: &Background) {
    let (w, h) = canvas.dimensions();
    if background.dimensions() == (w, h) {
        canvas.copy_from_slice(background.image.as_raw());
    } else {
        let stretched = imageops::resize(&*background.image, w, h, FilterType::Triangle);
        *canvas = stretched;
    }
}

fn paint_avatar(canvas: &mut RgbaImage, avatar: &RgbaImage, bounds: Bounds) {
    let x = i64::from(bounds.x);
    let y = i64::from(bounds.y);
    if avatar.dimensions() == (bounds.width, bounds.height) {
        imageops::overlay(canvas, avatar, x, y);
    } else {
        let scaled = imageops::resize(avatar, bounds.width, bounds.height, FilterType::Triangle);
        imageops::overlay(canvas, &scaled, x, y);
    }
}

/// Fill a rectangle with rounded corners.
///
/// The radius is clamped to half the shorter side.
pub fn fill_rounded_rect(canvas: &mut RgbaImage, bounds: Bounds, radius: u32, color: Rgba<u8>) {
    let Bounds {
        x,
        y,
        width: w,
        height: h,
    } = bounds;
    if w == 0 || h == 0 {
        return;
    }
    let r = radius.min(w / 2).min(h / 2);
    if r == 0 {
        draw_filled_rect_mut(canvas, Rect::at(x, y).of_size(w, h), color);
        return;
    }

    // Cross of two rectangles, then a disc in each corner.
    if h > 2 * r {
        draw_filled_rect_mut(canvas, Rect::at(x, y + r as i32).of_size(w, h - 2 * r), color);
    }
    if w > 2 * r {
        draw_filled_rect_mut(canvas, Rect::at(x + r as i32, y).of_size(w - 2 * r, h), color);
    }

    let r = r as i32;
    let left = x + r;
    let right = x + w as i32 - 1 - r;
    let top = y + r;
    let bottom = y + h as i32 - 1 - r;
    for center in [(left, top), (right, top), (left, bottom), (right, bottom)] {
        draw_filled_circle_mut(canvas, center, r, color);
    }
}
