//! Refresh the leaderboard image and stream it until stopped.

use rankcast_common::config::AppConfig;
use rankcast_common::shutdown::Shutdown;
use rankcast_stream_engine::{describe_exit, StreamSupervisor};

use crate::pipeline::Pipeline;

pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    config.validate()?;

    let mut supervisor = StreamSupervisor::new(&config.stream, &config.render.output_path);
    // Reject a bad destination before doing any work.
    supervisor.encoder().validate()?;

    let pipeline = Pipeline::build(&config)?;
    println!(
        "Loaded {} background(s) from {}",
        pipeline.rotator.len(),
        config.render.background_dir.display()
    );

    let shutdown = Shutdown::new();
    let refresh = pipeline
        .into_scheduler(&config.render)
        .start(shutdown.clone())
        .await;
    if refresh.first_tick().is_none() {
        println!("First refresh failed; retrying every {}s", config.render.refresh_interval_secs);
    }

    let handle = match supervisor.start() {
        Ok(handle) => handle,
        Err(e) => {
            shutdown.trigger();
            refresh.join().await;
            return Err(e.into());
        }
    };
    println!(
        "Streaming {} to {} (encoder pid {}, started {})",
        config.render.output_path.display(),
        supervisor.encoder().redacted_destination(),
        handle.pid,
        handle.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("Press Ctrl+C to stop...");

    let signals = tokio::spawn(trigger_on_signal(shutdown.clone()));
    let outcome = supervisor.supervise(shutdown.clone()).await;
    let stopped_by_signal = shutdown.is_triggered();

    shutdown.trigger();
    let counts = refresh.join().await;
    signals.abort();
    println!(
        "Stopped after {} refresh(es), {} failed",
        counts.total(),
        counts.failed
    );

    let handle = outcome?;

    if !stopped_by_signal {
        anyhow::bail!(
            "encoder exited ({}) and restarts are disabled",
            handle
                .exit_status
                .map(describe_exit)
                .unwrap_or_else(|| "unknown status".to_string())
        );
    }
    Ok(())
}

/// Trigger `shutdown` on Ctrl+C or SIGTERM.
async fn trigger_on_signal(shutdown: Shutdown) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    tracing::info!("Shutdown requested");
    shutdown.trigger();
}
