//! Write a default configuration file.

use std::path::PathBuf;

use rankcast_common::config::{config_file_path, AppConfig};

pub fn run(output: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    let path = output.unwrap_or_else(config_file_path);
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    AppConfig::default().save_to(&path)?;

    println!("Wrote default configuration to {}", path.display());
    println!();
    println!("Next steps:");
    println!("  1. Set stream.rtmp_token to your stream key");
    println!("  2. Point store.address/store.key at the ranking store");
    println!("  3. Put background images in render.background_dir and a font at render.font_path");
    println!("  4. rankcast check");
    Ok(())
}
