//! Rankcast Ranking
//!
//! Reads player scores and display names from a ranking store and turns
//! them into [`Standings`](rankcast_leaderboard_model::Standings) of a fixed
//! length.
//!
//! # Data Flow
//!
//! ```text
//! RankingStore::scores()        (identity, score) pairs, store order
//!        │
//!        ▼
//! rank_members()                stable sort desc, keep top N
//!        │
//!        ▼
//! RankingStore::display_name()  per identity, failures -> ""
//!        │
//!        ▼
//! Standings::from_ranked()      pad to N with placeholder rows
//! ```
//!
//! The whole pipeline runs under one timeout; an unreachable or slow store
//! fails the fetch with `DataSourceUnavailable` and changes nothing else.

pub mod fetcher;
pub mod memory;
pub mod redis_store;
pub mod store;

pub use fetcher::RankingFetcher;
pub use memory::MemoryRankingStore;
pub use redis_store::RedisRankingStore;
pub use store::RankingStore;
