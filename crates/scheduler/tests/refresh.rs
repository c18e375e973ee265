use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use image::{Rgba, RgbaImage};

use rankcast_common::error::RankcastError;
use rankcast_common::shutdown::Shutdown;
use rankcast_ranking::{MemoryRankingStore, RankingFetcher};
use rankcast_render_engine::{
    load_font, Background, BackgroundRotator, Captions, Compositor, CompositorSettings,
    NoAvatars,
};
use rankcast_scheduler::RefreshScheduler;

struct Fixture {
    _dir: tempfile::TempDir,
    output: PathBuf,
    store: Arc<MemoryRankingStore>,
    rotator: Arc<BackgroundRotator>,
    compositor: Arc<Compositor>,
}

fn fixture(backgrounds: usize) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("leaderboard.png");

    let store = Arc::new(
        MemoryRankingStore::new()
            .with_member("p1", 500.0, Some("Alice"))
            .with_member("p2", 900.0, Some("Bob")),
    );
    let rotator = Arc::new(BackgroundRotator::from_backgrounds(
        (0..backgrounds)
            .map(|i| {
                Background::new(
                    format!("bg{i}.png"),
                    RgbaImage::from_pixel(32, 18, Rgba([i as u8 * 50, 0, 0, 255])),
                )
            })
            .collect(),
    ));

    let font = load_font(
        &Path::new(env!("CARGO_MANIFEST_DIR")).join("../../fixtures/fonts/DejaVuSans.ttf"),
    )
    .unwrap();
    let compositor = Arc::new(Compositor::new(
        CompositorSettings {
            width: 320,
            height: 180,
            avatar_size: 32,
            output_path: output.clone(),
            captions: Captions {
                title: "Title".to_string(),
                subtitle: "Subtitle".to_string(),
                footer: "Footer".to_string(),
            },
        },
        font,
        Arc::new(NoAvatars),
    ));

    Fixture {
        _dir: dir,
        output,
        store,
        rotator,
        compositor,
    }
}

fn scheduler(f: &Fixture, interval: Duration) -> RefreshScheduler {
    RefreshScheduler::new(
        RankingFetcher::new(f.store.clone(), Duration::from_millis(500)),
        f.rotator.clone(),
        f.compositor.clone(),
        interval,
        3,
    )
}

#[tokio::test]
async fn tick_fetches_then_renders() {
    let f = fixture(2);
    let scheduler = scheduler(&f, Duration::from_secs(20));

    let report = scheduler.tick().await.unwrap();
    assert_eq!(report.tick, 1);
    assert_eq!(report.standings.len(), 3);
    assert_eq!(report.standings.entries()[0].display_name, "Bob");
    assert_eq!(report.render.background, "bg0.png");
    assert!(f.output.exists());

    let report = scheduler.tick().await.unwrap();
    assert_eq!(report.render.background, "bg1.png");
}

#[tokio::test]
async fn unreachable_store_leaves_image_and_rotation_untouched() {
    let f = fixture(2);
    let scheduler = scheduler(&f, Duration::from_secs(20));

    scheduler.tick().await.unwrap();
    let before_bytes = std::fs::read(&f.output).unwrap();
    let before_mtime = std::fs::metadata(&f.output).unwrap().modified().unwrap();
    let cursor = f.rotator.cursor();

    f.store.set_reachable(false);
    tokio::time::sleep(Duration::from_millis(20)).await;
    let err = scheduler.tick().await.unwrap_err();
    assert!(matches!(err, RankcastError::DataSourceUnavailable { .. }));

    assert_eq!(
        std::fs::metadata(&f.output).unwrap().modified().unwrap(),
        before_mtime
    );
    assert_eq!(std::fs::read(&f.output).unwrap(), before_bytes);
    assert_eq!(f.rotator.cursor(), cursor);

    // The next tick retries and succeeds once the store is back.
    f.store.set_reachable(true);
    let report = scheduler.tick().await.unwrap();
    assert_eq!(report.render.background, "bg1.png");
}

#[tokio::test]
async fn empty_background_set_skips_the_tick() {
    let f = fixture(0);
    let scheduler = scheduler(&f, Duration::from_secs(20));
    let err = scheduler.tick().await.unwrap_err();
    assert!(matches!(err, RankcastError::NoBackgroundsAvailable));
    assert!(err.is_tick_recoverable());
    assert!(!f.output.exists());
}

#[tokio::test]
async fn start_renders_immediately_then_on_interval() {
    let f = fixture(2);
    let shutdown = Shutdown::new();
    let task = scheduler(&f, Duration::from_millis(50))
        .start(shutdown.clone())
        .await;

    // The immediate tick has completed before start() returns.
    assert!(f.output.exists());
    assert_eq!(
        task.first_tick().map(|r| r.render.background.as_str()),
        Some("bg0.png")
    );

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(task.counts().succeeded >= 3, "counts: {:?}", task.counts());

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(2), task.join())
        .await
        .expect("refresh loop should stop on shutdown");
}

#[tokio::test]
async fn failed_ticks_do_not_stop_the_loop() {
    let f = fixture(1);
    f.store.set_reachable(false);

    let shutdown = Shutdown::new();
    let task = scheduler(&f, Duration::from_millis(40))
        .start(shutdown.clone())
        .await;
    assert!(task.first_tick().is_none());
    assert!(!f.output.exists());

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(task.counts().failed >= 2, "counts: {:?}", task.counts());

    f.store.set_reachable(true);
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(task.counts().succeeded >= 1, "counts: {:?}", task.counts());
    assert!(f.output.exists());

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(2), task.join())
        .await
        .expect("refresh loop should stop on shutdown");
}
