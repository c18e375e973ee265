//! Render the leaderboard once.

use std::path::PathBuf;

use rankcast_common::config::AppConfig;

use crate::pipeline::Pipeline;

pub async fn run(config: AppConfig, output: Option<PathBuf>) -> anyhow::Result<()> {
    config.validate()?;
    let pipeline = Pipeline::build(&config)?;
    let output = output.unwrap_or_else(|| config.render.output_path.clone());

    let standings = pipeline.fetcher.fetch_top(config.render.top_n).await?;
    let background = pipeline.rotator.next()?;
    let report = pipeline
        .compositor
        .render_to(&standings, &background, &output)
        .await?;

    for entry in &standings {
        println!("  #{} {}", entry.rank + 1, entry.label());
    }
    println!();
    println!("Rendered {}", report.output_path.display());
    println!("  Background: {}", report.background);
    println!(
        "  Avatars: {} drawn, {} skipped",
        report.avatars_drawn, report.avatars_skipped
    );
    println!("  Took: {} ms", report.elapsed.as_millis());
    Ok(())
}
