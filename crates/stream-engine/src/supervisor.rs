//! Stream supervisor.
//!
//! A small state machine around the encoder process:
//!
//! ```text
//! Stopped ──start()──► Starting ──spawned──► Running
//!    ▲                    ▲                     │ exit
//!    │ stop()             │ backoff elapsed     ▼
//!    └────────────────────┴──────────────── Crashed
//! ```

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStderr, Command};
use tokio::task::JoinHandle;

use rankcast_common::clock::{RestartBackoff, UptimeClock};
use rankcast_common::config::StreamConfig;
use rankcast_common::error::{RankcastError, RankcastResult};
use rankcast_common::shutdown::Shutdown;

use crate::encoder::EncoderConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Stopped,
    Starting,
    Running,
    Crashed,
}

/// The running (or last) encoder process.
#[derive(Debug, Clone)]
pub struct StreamHandle {
    pub pid: u32,
    pub started_at: DateTime<Utc>,

    /// `None` while the process is running.
    pub exit_status: Option<ExitStatus>,

    /// Relaunches since the first `start()`.
    pub restarts: u32,
}

impl StreamHandle {
    pub fn is_running(&self) -> bool {
        self.exit_status.is_none()
    }
}

/// When and how fast to relaunch a crashed encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestartPolicy {
    pub enabled: bool,
    pub initial: Duration,
    pub max: Duration,
}

impl From<&StreamConfig> for RestartPolicy {
    fn from(config: &StreamConfig) -> Self {
        Self {
            enabled: config.restart_on_exit,
            initial: Duration::from_secs(config.restart_initial_secs),
            max: Duration::from_secs(config.restart_max_secs),
        }
    }
}

/// Owns the encoder subprocess for the lifetime of the host.
pub struct StreamSupervisor {
    encoder: EncoderConfig,
    image_path: PathBuf,
    policy: RestartPolicy,
    stop_timeout: Duration,

    state: StreamState,
    child: Option<Child>,
    handle: Option<StreamHandle>,
    clock: Option<UptimeClock>,
    stderr_task: Option<JoinHandle<()>>,
}

enum Wake {
    Exited(std::io::Result<ExitStatus>),
    Shutdown,
}

impl StreamSupervisor {
    pub fn new(config: &StreamConfig, image_path: impl Into<PathBuf>) -> Self {
        Self::with_policy(
            EncoderConfig::from(config),
            image_path,
            RestartPolicy::from(config),
            Duration::from_secs(config.stop_timeout_secs),
        )
    }

    pub fn with_policy(
        encoder: EncoderConfig,
        image_path: impl Into<PathBuf>,
        policy: RestartPolicy,
        stop_timeout: Duration,
    ) -> Self {
        Self {
            encoder,
            image_path: image_path.into(),
            policy,
            stop_timeout,
            state: StreamState::Stopped,
            child: None,
            handle: None,
            clock: None,
            stderr_task: None,
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn handle(&self) -> Option<&StreamHandle> {
        self.handle.as_ref()
    }

    pub fn encoder(&self) -> &EncoderConfig {
        &self.encoder
    }

    /// Launch the encoder.
    ///
    /// Must be called from within a tokio runtime. Fails with `StreamLaunch`
    /// if the destination or image location is invalid or the binary cannot
    /// be spawned.
    pub fn start(&mut self) -> RankcastResult<StreamHandle> {
        if self.child.is_some() {
            return Err(RankcastError::stream_launch("encoder is already running"));
        }
        self.encoder.validate()?;
        self.state = StreamState::Starting;
        match self.spawn() {
            Ok(handle) => Ok(handle),
            Err(e) => {
                self.state = StreamState::Stopped;
                Err(e)
            }
        }
    }

    /// Split the image path into working directory and relative input.
    fn input_location(&self) -> RankcastResult<(PathBuf, PathBuf)> {
        let file_name = self.image_path.file_name().ok_or_else(|| {
            RankcastError::stream_launch(format!(
                "image path '{}' has no file name",
                self.image_path.display()
            ))
        })?;
        let dir = match self.image_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if !dir.is_dir() {
            return Err(RankcastError::stream_launch(format!(
                "image directory '{}' does not exist",
                dir.display()
            )));
        }
        Ok((dir, PathBuf::from(file_name)))
    }

    fn spawn(&mut self) -> RankcastResult<StreamHandle> {
        let (workdir, input) = self.input_location()?;
        let args = self.encoder.args(&input);

        tracing::debug!(
            binary = %self.encoder.ffmpeg_path.display(),
            args = ?self.encoder.redacted_args(&input),
            workdir = %workdir.display(),
            "Launching encoder"
        );

        let mut child = Command::new(&self.encoder.ffmpeg_path)
            .args(&args)
            .current_dir(&workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                RankcastError::stream_launch(format!(
                    "failed to spawn '{}': {e}",
                    self.encoder.ffmpeg_path.display()
                ))
            })?;

        let pid = child
            .id()
            .ok_or_else(|| RankcastError::stream_launch("encoder exited during launch"))?;
        if let Some(stderr) = child.stderr.take() {
            self.stderr_task = Some(drain_stderr(stderr, pid));
        }

        let clock = UptimeClock::start();
        let restarts = self.handle.as_ref().map(|h| h.restarts).unwrap_or(0);
        let handle = StreamHandle {
            pid,
            started_at: clock.started_at(),
            exit_status: None,
            restarts,
        };

        tracing::info!(
            pid,
            destination = %self.encoder.redacted_destination(),
            input = %self.image_path.display(),
            restarts,
            "Encoder started"
        );

        self.child = Some(child);
        self.clock = Some(clock);
        self.handle = Some(handle.clone());
        self.state = StreamState::Running;
        Ok(handle)
    }

    /// Watch the encoder until shutdown.
    ///
    /// Exits are logged; with restarts enabled the encoder is relaunched
    /// after an exponential backoff. Returns the final handle once shutdown
    /// has stopped the process, or when the encoder exits and restarts are
    /// disabled.
    pub async fn supervise(&mut self, shutdown: Shutdown) -> RankcastResult<StreamHandle> {
        let mut backoff = RestartBackoff::new(self.policy.initial, self.policy.max);

        loop {
            let wake = {
                let child = self.child.as_mut().ok_or_else(|| {
                    RankcastError::stream_launch("encoder is not running; call start() first")
                })?;
                tokio::select! {
                    status = child.wait() => Wake::Exited(status),
                    _ = shutdown.wait() => Wake::Shutdown,
                }
            };

            match wake {
                Wake::Shutdown => {
                    self.stop().await?;
                    return self.snapshot();
                }
                Wake::Exited(status) => {
                    let mut uptime = self.record_exit(status);
                    if shutdown.is_triggered() {
                        self.state = StreamState::Stopped;
                        return self.snapshot();
                    }
                    if !self.policy.enabled {
                        return self.snapshot();
                    }

                    // Relaunch, retrying spawn failures on the same schedule.
                    loop {
                        let delay = backoff.next_delay(uptime);
                        tracing::info!(
                            delay_ms = delay.as_millis() as u64,
                            attempt = backoff.attempts(),
                            "Restarting encoder after backoff"
                        );
                        tokio::select! {
                            _ = tokio::time::sleep(delay) => {}
                            _ = shutdown.wait() => {
                                self.state = StreamState::Stopped;
                                return self.snapshot();
                            }
                        }

                        self.state = StreamState::Starting;
                        if let Some(handle) = self.handle.as_mut() {
                            handle.restarts += 1;
                        }
                        match self.spawn() {
                            Ok(_) => break,
                            Err(e) => {
                                tracing::error!(error = %e, "Encoder relaunch failed");
                                self.state = StreamState::Crashed;
                                uptime = Duration::ZERO;
                            }
                        }
                    }
                }
            }
        }
    }

    /// Terminate the encoder: SIGTERM, wait up to the stop timeout, then kill.
    pub async fn stop(&mut self) -> RankcastResult<Option<ExitStatus>> {
        let Some(mut child) = self.child.take() else {
            self.state = StreamState::Stopped;
            return Ok(self.handle.as_ref().and_then(|h| h.exit_status));
        };

        let status = if request_terminate(&child) {
            match tokio::time::timeout(self.stop_timeout, child.wait()).await {
                Ok(Ok(status)) => Some(status),
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, "Failed waiting for encoder");
                    None
                }
                Err(_) => {
                    tracing::warn!(
                        timeout_ms = self.stop_timeout.as_millis() as u64,
                        "Encoder ignored SIGTERM, killing"
                    );
                    force_kill(&mut child).await
                }
            }
        } else {
            force_kill(&mut child).await
        };

        if let Some(handle) = self.handle.as_mut() {
            handle.exit_status = status;
        }
        if let Some(task) = self.stderr_task.take() {
            // stderr closes with the process; don't hang on a stray grandchild.
            let _ = tokio::time::timeout(Duration::from_secs(1), task).await;
        }
        self.clock = None;
        self.state = StreamState::Stopped;
        tracing::info!(
            status = %status.map(describe_exit).unwrap_or_else(|| "unknown".to_string()),
            "Encoder stopped"
        );
        Ok(status)
    }

    /// Record an observed exit and return how long the process ran.
    fn record_exit(&mut self, status: std::io::Result<ExitStatus>) -> Duration {
        self.child = None;
        let uptime = self
            .clock
            .take()
            .map(|c| c.elapsed())
            .unwrap_or_default();
        self.state = StreamState::Crashed;

        match status {
            Ok(status) => {
                if let Some(handle) = self.handle.as_mut() {
                    handle.exit_status = Some(status);
                }
                tracing::warn!(
                    status = %describe_exit(status),
                    uptime_secs = uptime.as_secs_f64(),
                    "Encoder exited"
                );
            }
            Err(e) => {
                tracing::error!(error = %e, "Lost track of encoder process");
            }
        }
        uptime
    }

    fn snapshot(&self) -> RankcastResult<StreamHandle> {
        self.handle
            .clone()
            .ok_or_else(|| RankcastError::stream_launch("encoder was never started"))
    }
}

async fn force_kill(child: &mut Child) -> Option<ExitStatus> {
    if let Err(e) = child.kill().await {
        tracing::warn!(error = %e, "Failed to kill encoder");
    }
    child.try_wait().ok().flatten()
}

#[cfg(unix)]
fn request_terminate(child: &Child) -> bool {
    let Some(pid) = child.id() else {
        return false;
    };
    // SAFETY: kill(2) only takes integers; `pid` belongs to a child we have
    // not reaped yet, so it cannot have been recycled.
    unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) == 0 }
}

#[cfg(not(unix))]
fn request_terminate(_child: &Child) -> bool {
    false
}

/// Human-readable exit status: exit code or terminating signal.
pub fn describe_exit(status: ExitStatus) -> String {
    if let Some(code) = status.code() {
        return format!("exit code {code}");
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return format!("signal {signal}");
        }
    }
    status.to_string()
}

fn drain_stderr(stderr: ChildStderr, pid: u32) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(stderr).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if is_problem_line(line) {
                tracing::warn!(pid, line, "encoder");
            } else {
                tracing::debug!(pid, line, "encoder");
            }
        }
    })
}

fn is_problem_line(line: &str) -> bool {
    let lower = line.to_ascii_lowercase();
    ["error", "failed", "invalid", "warning", "could not", "refused"]
        .iter()
        .any(|needle| lower.contains(needle))
}
