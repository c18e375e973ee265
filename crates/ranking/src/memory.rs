//! In-process ranking store.
//!
//! Backs offline rendering from a JSON fixture file and stands in for Redis
//! in tests. Members keep insertion order, which is the tie-break order.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use rankcast_common::error::{RankcastError, RankcastResult};
use rankcast_leaderboard_model::ScoredMember;

use crate::store::RankingStore;

/// On-disk fixture layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreFixture {
    #[serde(default)]
    pub scores: Vec<ScoredMember>,

    #[serde(default)]
    pub names: HashMap<String, String>,
}

#[derive(Debug, Default)]
struct MemoryState {
    members: Vec<ScoredMember>,
    names: HashMap<String, String>,
    failing_names: HashSet<String>,
}

/// A ranking store held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryRankingStore {
    state: RwLock<MemoryState>,
    unreachable: AtomicBool,
    latency: Option<Duration>,
    score_queries: AtomicU64,
}

impl MemoryRankingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a fixture.
    pub fn from_fixture(fixture: StoreFixture) -> Self {
        Self {
            state: RwLock::new(MemoryState {
                members: fixture.scores,
                names: fixture.names,
                failing_names: HashSet::new(),
            }),
            ..Self::default()
        }
    }

    /// Load a fixture file (`{"scores": [...], "names": {...}}`).
    pub fn from_json_file(path: &Path) -> RankcastResult<Self> {
        if !path.exists() {
            return Err(RankcastError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let fixture: StoreFixture = serde_json::from_str(&content)?;
        Ok(Self::from_fixture(fixture))
    }

    /// Append a member (and optionally its name).
    pub fn with_member(self, identity: &str, score: f64, name: Option<&str>) -> Self {
        self.insert(identity, score, name);
        self
    }

    /// Make name lookups for `identity` fail.
    pub fn with_failing_name(self, identity: &str) -> Self {
        self.write_state()
            .failing_names
            .insert(identity.to_string());
        self
    }

    /// Delay every query by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Append a member through a shared reference.
    pub fn insert(&self, identity: &str, score: f64, name: Option<&str>) {
        let mut state = self.write_state();
        state.members.push(ScoredMember::new(identity, score));
        if let Some(name) = name {
            state.names.insert(identity.to_string(), name.to_string());
        }
    }

    /// Simulate the store going down or coming back.
    pub fn set_reachable(&self, reachable: bool) {
        self.unreachable.store(!reachable, Ordering::SeqCst);
    }

    /// Number of `scores()` calls served or refused so far.
    pub fn score_queries(&self) -> u64 {
        self.score_queries.load(Ordering::SeqCst)
    }

    async fn simulate_network(&self) -> RankcastResult<()> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(RankcastError::data_source("memory store marked unreachable"));
        }
        Ok(())
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, MemoryState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, MemoryState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait::async_trait]
impl RankingStore for MemoryRankingStore {
    async fn scores(&self) -> RankcastResult<Vec<ScoredMember>> {
        self.score_queries.fetch_add(1, Ordering::SeqCst);
        self.simulate_network().await?;
        Ok(self.read_state().members.clone())
    }

    async fn display_name(&self, identity: &str) -> RankcastResult<Option<String>> {
        self.simulate_network().await?;
        let state = self.read_state();
        if state.failing_names.contains(identity) {
            return Err(RankcastError::data_source(format!(
                "name lookup for '{identity}' refused"
            )));
        }
        Ok(state.names.get(identity).cloned())
    }

    fn describe(&self) -> String {
        format!("memory ({} members)", self.read_state().members.len())
    }
}
