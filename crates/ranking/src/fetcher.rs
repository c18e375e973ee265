//! Top-N standings fetcher.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use rankcast_common::error::{RankcastError, RankcastResult};
use rankcast_leaderboard_model::{rank_members, Standings};

use crate::store::RankingStore;

/// Produces fixed-length standings from a ranking store.
#[derive(Clone)]
pub struct RankingFetcher {
    store: Arc<dyn RankingStore>,
    timeout: Duration,
}

impl RankingFetcher {
    pub fn new(store: Arc<dyn RankingStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    pub fn store(&self) -> &Arc<dyn RankingStore> {
        &self.store
    }

    /// Fetch the top `n` players, padded with placeholder rows.
    ///
    /// Fails with `DataSourceUnavailable` when the score query fails or does
    /// not answer within the timeout. Name lookups share what is left of the
    /// timeout; a lookup that fails, finds nothing, or runs out of time
    /// leaves that row's display name empty.
    pub async fn fetch_top(&self, n: usize) -> RankcastResult<Standings> {
        let deadline = Instant::now() + self.timeout;

        let members = match tokio::time::timeout_at(deadline, self.store.scores()).await {
            Ok(Ok(members)) => members,
            Ok(Err(e @ RankcastError::DataSourceUnavailable { .. })) => return Err(e),
            Ok(Err(other)) => return Err(RankcastError::data_source(other.to_string())),
            Err(_) => {
                return Err(RankcastError::data_source(format!(
                    "{} did not answer within {:?}",
                    self.store.describe(),
                    self.timeout
                )))
            }
        };
        let total = members.len();
        let ranked = rank_members(members, n);

        let mut named = Vec::with_capacity(ranked.len());
        for member in ranked {
            let name = self.resolve_name(&member.identity, deadline).await;
            named.push((member, name));
        }

        let standings = Standings::from_ranked(named, n);
        tracing::debug!(
            members = total,
            ranked = standings.ranked_count(),
            rows = standings.len(),
            "Fetched standings"
        );
        Ok(standings)
    }

    async fn resolve_name(&self, identity: &str, deadline: Instant) -> String {
        match tokio::time::timeout_at(deadline, self.store.display_name(identity)).await {
            Ok(Ok(Some(name))) => name,
            Ok(Ok(None)) => {
                tracing::warn!(identity, "No display name stored");
                String::new()
            }
            Ok(Err(e)) => {
                tracing::warn!(identity, error = %e, "Display name lookup failed");
                String::new()
            }
            Err(_) => {
                tracing::warn!(
                    identity,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Display name lookup timed out"
                );
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryRankingStore;

    fn fetcher(store: MemoryRankingStore) -> RankingFetcher {
        RankingFetcher::new(Arc::new(store), Duration::from_secs(2))
    }

    #[tokio::test]
    async fn test_missing_name_is_empty() {
        let f = fetcher(MemoryRankingStore::new().with_member("p1", 10.0, None));
        let standings = f.fetch_top(1).await.unwrap();
        assert_eq!(standings.entries()[0].display_name, "");
        assert_eq!(standings.entries()[0].identity, "p1");
    }

    #[tokio::test]
    async fn test_failed_name_lookup_does_not_fail_fetch() {
        let f = fetcher(
            MemoryRankingStore::new()
                .with_member("p1", 10.0, Some("Alice"))
                .with_member("p2", 20.0, Some("Bob"))
                .with_failing_name("p2"),
        );
        let standings = f.fetch_top(3).await.unwrap();
        let names: Vec<&str> = standings
            .iter()
            .map(|e| e.display_name.as_str())
            .collect();
        assert_eq!(names, vec!["", "Alice", "Ingen"]);
    }

    #[tokio::test]
    async fn test_zero_rows() {
        let f = fetcher(MemoryRankingStore::new().with_member("p1", 10.0, None));
        assert!(f.fetch_top(0).await.unwrap().is_empty());
    }
}
