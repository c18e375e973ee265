//! Rankcast Render Engine
//!
//! Turns ranked standings into the still image the encoder streams.
//!
//! # Pipeline Architecture
//!
//! ```text
//! Standings ──┐
//!             ├── build_scene()      header, N rows, footer (pure)
//! Captions ───┘         │
//!                       ├── AvatarSource   best-effort, per display name
//!                       │
//! Background ───────────┤
//!  (rotator.next())     ▼
//!                  Rasterizer        spawn_blocking
//!                       │
//!                       ▼
//!                 write_png_atomic   temp file + rename
//!                       │
//!                       ▼
//!                leaderboard.png
//! ```

pub mod avatar;
pub mod background;
pub mod compositor;
pub mod export;
pub mod layout;
pub mod raster;
pub mod scene;

pub use avatar::{AvatarSource, HttpAvatarSource, NoAvatars};
pub use background::{Background, BackgroundRotator};
pub use compositor::{Composed, Compositor, CompositorSettings, RenderReport};
pub use export::write_png_atomic;
pub use layout::Layout;
pub use raster::{load_font, Rasterizer};
pub use scene::{build_scene, Captions, DrawOp, Scene};
