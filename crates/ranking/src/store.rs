//! The ranking store seam.

use rankcast_common::error::RankcastResult;
use rankcast_leaderboard_model::ScoredMember;

/// A sorted-set plus key/value service holding scores and display names.
#[async_trait::async_trait]
pub trait RankingStore: Send + Sync {
    /// Every member with its score, in the store's native order.
    ///
    /// The order matters: it is the tie-break among equal scores.
    async fn scores(&self) -> RankcastResult<Vec<ScoredMember>>;

    /// Display name stored under `identity`, if any.
    async fn display_name(&self, identity: &str) -> RankcastResult<Option<String>>;

    /// Backend description for logs.
    fn describe(&self) -> String;
}
