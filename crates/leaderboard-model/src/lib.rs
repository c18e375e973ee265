//! Rankcast Leaderboard Model
//!
//! Defines the data contracts shared by the fetcher and the renderer:
//! - **Entries:** one ranked row (rank, identity, display name, score)
//! - **Standings:** the ordered set of exactly N entries handed to the renderer
//! - **Ranking:** the stable descending sort, truncation and padding rule
//!
//! The renderer never sees fewer than N rows: missing places are filled with
//! placeholder entries at the fetch boundary.

pub mod entry;
pub mod standings;

pub use entry::*;
pub use standings::*;
