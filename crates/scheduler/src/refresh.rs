//! Refresh loop.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use rankcast_common::error::RankcastResult;
use rankcast_common::shutdown::Shutdown;
use rankcast_leaderboard_model::Standings;
use rankcast_ranking::RankingFetcher;
use rankcast_render_engine::{BackgroundRotator, Compositor, RenderReport};

/// Result of one successful refresh.
#[derive(Debug, Clone)]
pub struct TickReport {
    pub tick: u64,
    pub standings: Standings,
    pub render: RenderReport,
    pub elapsed: Duration,
}

/// Success and failure counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickCounts {
    pub succeeded: u64,
    pub failed: u64,
}

impl TickCounts {
    pub fn total(&self) -> u64 {
        self.succeeded + self.failed
    }
}

#[derive(Debug, Default)]
struct TickStats {
    succeeded: AtomicU64,
    failed: AtomicU64,
}

impl TickStats {
    fn snapshot(&self) -> TickCounts {
        TickCounts {
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Periodic fetch + render.
pub struct RefreshScheduler {
    fetcher: RankingFetcher,
    rotator: Arc<BackgroundRotator>,
    compositor: Arc<Compositor>,
    interval: Duration,
    top_n: usize,
    stats: Arc<TickStats>,
    ticks: AtomicU64,
}

impl RefreshScheduler {
    pub fn new(
        fetcher: RankingFetcher,
        rotator: Arc<BackgroundRotator>,
        compositor: Arc<Compositor>,
        interval: Duration,
        top_n: usize,
    ) -> Self {
        Self {
            fetcher,
            rotator,
            compositor,
            interval,
            top_n,
            stats: Arc::new(TickStats::default()),
            ticks: AtomicU64::new(0),
        }
    }

    pub fn counts(&self) -> TickCounts {
        self.stats.snapshot()
    }

    /// One refresh: fetch standings, take the next background, render.
    ///
    /// Nothing is consumed or written unless the fetch succeeds; a failed
    /// fetch leaves both the rotation cursor and the still image untouched.
    pub async fn tick(&self) -> RankcastResult<TickReport> {
        let tick = self.ticks.fetch_add(1, Ordering::Relaxed) + 1;
        let started = Instant::now();

        let standings = self.fetcher.fetch_top(self.top_n).await?;
        let background = self.rotator.next()?;
        let render = self.compositor.render(&standings, &background).await?;

        Ok(TickReport {
            tick,
            standings,
            render,
            elapsed: started.elapsed(),
        })
    }

    /// Run a tick and account for it. Errors are logged, never returned.
    async fn run_tick(&self) -> Option<TickReport> {
        match self.tick().await {
            Ok(report) => {
                self.stats.succeeded.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(
                    tick = report.tick,
                    ranked = report.standings.ranked_count(),
                    elapsed_ms = report.elapsed.as_millis() as u64,
                    "Refresh tick complete"
                );
                Some(report)
            }
            Err(e) => {
                self.stats.failed.fetch_add(1, Ordering::Relaxed);
                let counts = self.stats.snapshot();
                if e.is_tick_recoverable() {
                    tracing::warn!(
                        error = %e,
                        failed = counts.failed,
                        "Refresh tick skipped; keeping previous image"
                    );
                } else {
                    tracing::error!(
                        error = %e,
                        failed = counts.failed,
                        "Refresh tick failed; keeping previous image"
                    );
                }
                None
            }
        }
    }

    /// Refresh once now, then every interval until `shutdown`.
    ///
    /// The immediate refresh completes before this returns, so the still
    /// image exists (if the first tick succeeded) before anyone reads it.
    /// Late ticks are skipped rather than bunched up.
    pub async fn start(self, shutdown: Shutdown) -> RefreshTask {
        let first = self.run_tick().await;
        let stats = Arc::clone(&self.stats);
        let interval = self.interval;

        tracing::info!(
            interval_secs = interval.as_secs_f64(),
            first_tick_ok = first.is_some(),
            "Refresh scheduler started"
        );

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = shutdown.wait() => break,
                }
                tokio::select! {
                    _ = self.run_tick() => {}
                    _ = shutdown.wait() => break,
                }
            }

            let counts = self.stats.snapshot();
            tracing::info!(
                succeeded = counts.succeeded,
                failed = counts.failed,
                "Refresh scheduler stopped"
            );
        });

        RefreshTask {
            first,
            stats,
            handle,
        }
    }
}

/// Handle to a running refresh loop.
pub struct RefreshTask {
    first: Option<TickReport>,
    stats: Arc<TickStats>,
    handle: JoinHandle<()>,
}

impl RefreshTask {
    /// Report of the immediate startup tick, if it succeeded.
    pub fn first_tick(&self) -> Option<&TickReport> {
        self.first.as_ref()
    }

    pub fn counts(&self) -> TickCounts {
        self.stats.snapshot()
    }

    /// Wait for the loop to exit after shutdown has been triggered.
    pub async fn join(self) -> TickCounts {
        if let Err(e) = self.handle.await {
            tracing::error!(error = %e, "Refresh task panicked");
        }
        self.stats.snapshot()
    }
}
