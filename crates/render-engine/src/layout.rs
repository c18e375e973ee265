//! Fixed leaderboard layout.
//!
//! All geometry is defined on a 1920x1080 reference canvas and scaled per
//! axis to the configured canvas size. Font sizes follow the vertical scale.

use image::Rgba;

pub const REFERENCE_WIDTH: u32 = 1920;
pub const REFERENCE_HEIGHT: u32 = 1080;

const HEADER_Y: f32 = 100.0;
const HEADER_WIDTH: f32 = 750.0;
const HEADER_HEIGHT: f32 = 120.0;
const HEADER_RADIUS: f32 = 20.0;
const TITLE_SIZE: f32 = 48.0;
const SUBTITLE_SIZE: f32 = 14.0;
// Text centres, relative to the header top.
const TITLE_OFFSET: f32 = 50.0;
const SUBTITLE_OFFSET: f32 = 92.0;

const ROW_TOP: f32 = 300.0;
const ROW_STEP: f32 = 100.0;
const ROW_WIDTH: f32 = 0.3 * REFERENCE_WIDTH as f32;
const ROW_HEIGHT: f32 = 64.0;
const ROW_RADIUS: f32 = 20.0;
const ROW_TEXT_SIZE: f32 = 36.0;
const AVATAR_INSET_X: f32 = 20.0;
const AVATAR_INSET_Y: f32 = 16.0;
const AVATAR_SIZE: f32 = 32.0;

const FOOTER_WIDTH: f32 = 650.0;
const FOOTER_HEIGHT: f32 = 50.0;
const FOOTER_RADIUS: f32 = 5.0;
const FOOTER_TEXT_SIZE: f32 = 24.0;

pub const HEADER_COLOR: Rgba<u8> = Rgba([0x1e, 0x3a, 0x8a, 0xff]);
pub const FOOTER_COLOR: Rgba<u8> = Rgba([0x3b, 0x82, 0xf6, 0xff]);
pub const LIGHT_TEXT: Rgba<u8> = Rgba([0xff, 0xff, 0xff, 0xff]);
pub const DARK_TEXT: Rgba<u8> = Rgba([0x00, 0x00, 0x00, 0xff]);

/// Gold, silver, bronze.
pub const PODIUM_COLORS: [Rgba<u8>; 3] = [
    Rgba([0xff, 0xd7, 0x00, 0xff]),
    Rgba([0xdb, 0xdb, 0xdb, 0xff]),
    Rgba([0xcd, 0x7f, 0x32, 0xff]),
];

/// Row colour past the podium.
pub const DEFAULT_ROW_COLOR: Rgba<u8> = Rgba([0x9c, 0xa3, 0xaf, 0xff]);

/// Row fill colour for a zero-based rank.
pub fn row_color(rank: usize) -> Rgba<u8> {
    PODIUM_COLORS.get(rank).copied().unwrap_or(DEFAULT_ROW_COLOR)
}

/// An axis-aligned pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Bounds {
    pub fn center(&self) -> (i32, i32) {
        (
            self.x + (self.width / 2) as i32,
            self.y + (self.height / 2) as i32,
        )
    }

    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

/// Layout resolved for one canvas size and row count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub width: u32,
    pub height: u32,
    pub rows: usize,
    scale_x: f32,
    scale_y: f32,
}

impl Layout {
    pub fn new(width: u32, height: u32, rows: usize) -> Self {
        Self {
            width,
            height,
            rows,
            scale_x: width as f32 / REFERENCE_WIDTH as f32,
            scale_y: height as f32 / REFERENCE_HEIGHT as f32,
        }
    }

    pub fn reference(rows: usize) -> Self {
        Self::new(REFERENCE_WIDTH, REFERENCE_HEIGHT, rows)
    }

    /// A horizontally centred box at reference `y`.
    fn centered(&self, y: f32, width: f32, height: f32) -> Bounds {
        let w = (width * self.scale_x).round().max(1.0) as u32;
        let h = (height * self.scale_y).round().max(1.0) as u32;
        Bounds {
            x: (self.width as i32 - w as i32) / 2,
            y: (y * self.scale_y).round() as i32,
            width: w,
            height: h,
        }
    }

    fn radius(&self, r: f32) -> u32 {
        (r * self.scale_x.min(self.scale_y)).round() as u32
    }

    fn font(&self, size: f32) -> f32 {
        size * self.scale_y
    }

    fn center_x(&self) -> i32 {
        self.width as i32 / 2
    }

    pub fn header(&self) -> Bounds {
        self.centered(HEADER_Y, HEADER_WIDTH, HEADER_HEIGHT)
    }

    pub fn header_radius(&self) -> u32 {
        self.radius(HEADER_RADIUS)
    }

    /// Centre point and font size of the title line.
    pub fn title_anchor(&self) -> (i32, i32, f32) {
        let y = ((HEADER_Y + TITLE_OFFSET) * self.scale_y).round() as i32;
        (self.center_x(), y, self.font(TITLE_SIZE))
    }

    /// Centre point and font size of the subtitle line.
    pub fn subtitle_anchor(&self) -> (i32, i32, f32) {
        let y = ((HEADER_Y + SUBTITLE_OFFSET) * self.scale_y).round() as i32;
        (self.center_x(), y, self.font(SUBTITLE_SIZE))
    }

    pub fn row(&self, rank: usize) -> Bounds {
        self.centered(ROW_TOP + rank as f32 * ROW_STEP, ROW_WIDTH, ROW_HEIGHT)
    }

    pub fn row_radius(&self) -> u32 {
        self.radius(ROW_RADIUS)
    }

    pub fn row_text_size(&self) -> f32 {
        self.font(ROW_TEXT_SIZE)
    }

    /// Avatar square inside the row for `rank`.
    pub fn avatar(&self, rank: usize) -> Bounds {
        let row = self.row(rank);
        let size = (AVATAR_SIZE * self.scale_y).round().max(1.0) as u32;
        Bounds {
            x: row.x + (AVATAR_INSET_X * self.scale_x).round() as i32,
            y: row.y + (AVATAR_INSET_Y * self.scale_y).round() as i32,
            width: size,
            height: size,
        }
    }

    /// Footer, one row step below the last row.
    pub fn footer(&self) -> Bounds {
        let top = ROW_TOP + self.rows as f32 * ROW_STEP;
        self.centered(top, FOOTER_WIDTH, FOOTER_HEIGHT)
    }

    pub fn footer_radius(&self) -> u32 {
        self.radius(FOOTER_RADIUS)
    }

    pub fn footer_text_size(&self) -> f32 {
        self.font(FOOTER_TEXT_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_geometry() {
        let layout = Layout::reference(3);
        assert_eq!(
            layout.header(),
            Bounds {
                x: 585,
                y: 100,
                width: 750,
                height: 120,
            }
        );
        assert_eq!(
            layout.row(0),
            Bounds {
                x: 672,
                y: 300,
                width: 576,
                height: 64,
            }
        );
        assert_eq!(layout.row(2).y, 500);
        assert_eq!(
            layout.avatar(1),
            Bounds {
                x: 692,
                y: 416,
                width: 32,
                height: 32,
            }
        );
        assert_eq!(
            layout.footer(),
            Bounds {
                x: 635,
                y: 600,
                width: 650,
                height: 50,
            }
        );
        assert_eq!(layout.row_text_size(), 36.0);
    }

    #[test]
    fn test_half_size_canvas_scales_everything() {
        let layout = Layout::new(960, 540, 3);
        let row = layout.row(0);
        assert_eq!((row.x, row.y, row.width, row.height), (336, 150, 288, 32));
        assert_eq!(layout.row_text_size(), 18.0);
        assert_eq!(layout.row_radius(), 10);
    }

    #[test]
    fn test_footer_follows_row_count() {
        assert_eq!(Layout::reference(5).footer().y, 800);
    }

    #[test]
    fn test_row_colors() {
        assert_eq!(row_color(0), Rgba([0xff, 0xd7, 0x00, 0xff]));
        assert_eq!(row_color(2), Rgba([0xcd, 0x7f, 0x32, 0xff]));
        assert_eq!(row_color(3), DEFAULT_ROW_COLOR);
    }

    #[test]
    fn test_bounds_contains() {
        let b = Bounds {
            x: 10,
            y: 10,
            width: 5,
            height: 5,
        };
        assert!(b.contains(10, 14));
        assert!(!b.contains(15, 10));
        assert_eq!(b.center(), (12, 12));
    }
}
