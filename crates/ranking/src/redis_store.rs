//! Redis-backed ranking store.
//!
//! Scores live in one sorted set; display names are plain string keys named
//! after the member identity.

use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tokio::sync::Mutex;

use rankcast_common::config::StoreConfig;
use rankcast_common::error::{RankcastError, RankcastResult};
use rankcast_leaderboard_model::ScoredMember;

use crate::store::RankingStore;

/// Ranking store reading a Redis sorted set.
pub struct RedisRankingStore {
    client: redis::Client,
    key: String,
    address: String,
    connection: Mutex<Option<MultiplexedConnection>>,
}

impl RedisRankingStore {
    /// Create a store from configuration. No connection is opened yet.
    pub fn new(config: &StoreConfig) -> RankcastResult<Self> {
        let url = connection_url(config);
        let client = redis::Client::open(url.as_str()).map_err(|e| {
            RankcastError::config(format!("invalid store address '{}': {e}", config.address))
        })?;

        Ok(Self {
            client,
            key: config.key.clone(),
            address: config.address.clone(),
            connection: Mutex::new(None),
        })
    }

    /// Sorted-set key holding the scores.
    pub fn key(&self) -> &str {
        &self.key
    }

    async fn connection(&self) -> RankcastResult<MultiplexedConnection> {
        let mut guard = self.connection.lock().await;
        if let Some(conn) = guard.as_ref() {
            return Ok(conn.clone());
        }

        let conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| {
                RankcastError::data_source(format!("connect to {}: {e}", self.address))
            })?;
        tracing::debug!(address = %self.address, "Connected to ranking store");
        *guard = Some(conn.clone());
        Ok(conn)
    }

    /// Drop the cached connection so the next query reconnects.
    async fn invalidate(&self) {
        self.connection.lock().await.take();
    }

    async fn query_failed(&self, what: &str, err: redis::RedisError) -> RankcastError {
        if err.is_io_error() || err.is_connection_dropped() || err.is_timeout() {
            self.invalidate().await;
        }
        RankcastError::data_source(format!("{what}: {err}"))
    }
}

#[async_trait::async_trait]
impl RankingStore for RedisRankingStore {
    async fn scores(&self) -> RankcastResult<Vec<ScoredMember>> {
        let mut conn = self.connection().await?;
        // ZRANGE returns ascending score, ties in lexical member order.
        let pairs = match conn
            .zrange_withscores::<_, Vec<(String, f64)>>(&self.key, 0, -1)
            .await
        {
            Ok(pairs) => pairs,
            Err(e) => {
                return Err(self
                    .query_failed(&format!("ZRANGE {}", self.key), e)
                    .await)
            }
        };

        Ok(pairs
            .into_iter()
            .map(|(identity, score)| ScoredMember::new(identity, score))
            .collect())
    }

    async fn display_name(&self, identity: &str) -> RankcastResult<Option<String>> {
        let mut conn = self.connection().await?;
        match conn.get::<_, Option<String>>(identity).await {
            Ok(name) => Ok(name),
            Err(e) => Err(self.query_failed(&format!("GET {identity}"), e).await),
        }
    }

    fn describe(&self) -> String {
        format!("redis {} (key '{}')", self.address, self.key)
    }
}

/// Build a `redis://` URL from the configured address, password and db.
///
/// An address that already carries a scheme is used unchanged.
fn connection_url(config: &StoreConfig) -> String {
    let address = config.address.trim();
    if address.starts_with("redis://")
        || address.starts_with("rediss://")
        || address.starts_with("redis+unix://")
        || address.starts_with("unix://")
    {
        return address.to_string();
    }

    let auth = if config.password.is_empty() {
        String::new()
    } else {
        format!(":{}@", encode_userinfo(&config.password))
    };
    format!("redis://{auth}{address}/{}", config.db)
}

/// Percent-encode everything outside the RFC 3986 unreserved set.
fn encode_userinfo(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~') {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}
