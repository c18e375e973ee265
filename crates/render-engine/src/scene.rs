//! Display list for one leaderboard frame.
//!
//! Building the scene is pure: the same standings and captions always give
//! the same ops, in painting order.

use image::Rgba;

use rankcast_leaderboard_model::Standings;

use crate::layout::{self, Bounds, Layout};

/// Static strings drawn around the rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captions {
    pub title: String,
    pub subtitle: String,
    pub footer: String,
}

/// One painting operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Background stretched over the whole canvas.
    Background,

    /// Filled rounded rectangle.
    Panel {
        bounds: Bounds,
        radius: u32,
        color: Rgba<u8>,
    },

    /// A single line of text centred on a point.
    Text {
        text: String,
        center_x: i32,
        center_y: i32,
        size: f32,
        color: Rgba<u8>,
    },

    /// Avatar for a display name, drawn only if it could be fetched.
    Avatar { name: String, bounds: Bounds },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: u32,
    pub height: u32,
    pub ops: Vec<DrawOp>,
}

impl Scene {
    /// Display names that need an avatar, in row order.
    pub fn avatar_names(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Avatar { name, .. } => Some(name.as_str()),
            _ => None,
        })
    }
}

/// Lay out header, one row per entry, and the footer.
pub fn build_scene(layout: &Layout, standings: &Standings, captions: &Captions) -> Scene {
    let mut ops = vec![DrawOp::Background];

    ops.push(DrawOp::Panel {
        bounds: layout.header(),
        radius: layout.header_radius(),
        color: layout::HEADER_COLOR,
    });
    let (x, y, size) = layout.title_anchor();
    ops.push(text(&captions.title, x, y, size, layout::LIGHT_TEXT));
    let (x, y, size) = layout.subtitle_anchor();
    ops.push(text(&captions.subtitle, x, y, size, layout::LIGHT_TEXT));

    for entry in standings {
        let row = layout.row(entry.rank);
        ops.push(DrawOp::Panel {
            bounds: row,
            radius: layout.row_radius(),
            color: layout::row_color(entry.rank),
        });
        if !entry.display_name.is_empty() {
            ops.push(DrawOp::Avatar {
                name: entry.display_name.clone(),
                bounds: layout.avatar(entry.rank),
            });
        }
        let (cx, cy) = row.center();
        ops.push(text(
            &entry.label(),
            cx,
            cy,
            layout.row_text_size(),
            layout::DARK_TEXT,
        ));
    }

    let footer = layout.footer();
    ops.push(DrawOp::Panel {
        bounds: footer,
        radius: layout.footer_radius(),
        color: layout::FOOTER_COLOR,
    });
    let (cx, cy) = footer.center();
    ops.push(text(
        &captions.footer,
        cx,
        cy,
        layout.footer_text_size(),
        layout::LIGHT_TEXT,
    ));

    Scene {
        width: layout.width,
        height: layout.height,
        ops,
    }
}

fn text(text: &str, center_x: i32, center_y: i32, size: f32, color: Rgba<u8>) -> DrawOp {
    DrawOp::Text {
        text: text.to_string(),
        center_x,
        center_y,
        size,
        color,
    }
}
