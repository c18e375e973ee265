//! Print the current standings.

use rankcast_common::config::AppConfig;

use crate::pipeline::build_fetcher;

pub async fn run(config: AppConfig, top: Option<usize>) -> anyhow::Result<()> {
    let n = top.unwrap_or(config.render.top_n);
    let fetcher = build_fetcher(&config.store)?;
    let standings = fetcher.fetch_top(n).await?;
    println!("{}", serde_json::to_string_pretty(&standings)?);
    Ok(())
}
