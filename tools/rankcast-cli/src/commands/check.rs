//! Check that everything `run` needs is in place.

use rankcast_common::config::AppConfig;
use rankcast_render_engine::{load_font, BackgroundRotator};
use rankcast_stream_engine::command_exists;

use crate::pipeline::build_fetcher;

pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    println!("rankcast System Check");
    println!("{}", "=".repeat(50));

    let mut failures = 0usize;

    match config.validate() {
        Ok(()) => println!("[OK] Configuration is valid"),
        Err(e) => {
            failures += 1;
            println!("[FAIL] Configuration: {e}");
        }
    }

    // Encoder
    let ffmpeg = &config.stream.ffmpeg_path;
    if command_exists(ffmpeg) {
        println!("[OK] Encoder: {}", ffmpeg.display());
    } else {
        failures += 1;
        println!(
            "[FAIL] Encoder '{}' not found (install ffmpeg or set stream.ffmpeg_path)",
            ffmpeg.display()
        );
    }
    if config.stream.rtmp_token.trim().is_empty() {
        println!("[WARN] stream.rtmp_token is not set; `run` will refuse to start");
    } else {
        println!("[OK] Stream token set for {}", config.stream.ingest_url);
    }

    // Assets
    match load_font(&config.render.font_path) {
        Ok(_) => println!("[OK] Font: {}", config.render.font_path.display()),
        Err(e) => {
            failures += 1;
            println!("[FAIL] {e}");
        }
    }
    match BackgroundRotator::initialize(&config.render.background_dir) {
        Ok(rotator) if rotator.is_empty() => println!(
            "[WARN] No backgrounds in {}; every refresh will be skipped",
            config.render.background_dir.display()
        ),
        Ok(rotator) => {
            println!("[OK] Backgrounds: {}", rotator.len());
            for name in rotator.names() {
                println!("     {name}");
            }
        }
        Err(e) => {
            failures += 1;
            println!("[FAIL] {e}");
        }
    }

    // Ranking store
    match build_fetcher(&config.store) {
        Ok(fetcher) => match fetcher.fetch_top(1).await {
            Ok(standings) => println!(
                "[OK] Ranking store {} ({} ranked)",
                fetcher.store().describe(),
                standings.ranked_count()
            ),
            Err(e) => println!(
                "[WARN] Ranking store {}: {e} (refreshes will be skipped until it is reachable)",
                fetcher.store().describe()
            ),
        },
        Err(e) => {
            failures += 1;
            println!("[FAIL] Ranking store: {e}");
        }
    }

    println!();
    if failures == 0 {
        println!("All required checks passed. rankcast is ready.");
    } else {
        println!("{failures} required check(s) failed. See above for fixes.");
    }

    Ok(())
}
