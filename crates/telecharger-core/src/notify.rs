//! Completion notification side effect.
//!
//! Pluggable: the controller calls it after a job is marked completed; it has
//! no effect on controller state.

use std::process::Stdio;

use tokio::process::Command;

use crate::job_db::Job;

pub trait Notifier {
    fn download_finished(&self, job: &Job);
}

/// Does nothing. Used in tests and when notifications are unwanted.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn download_finished(&self, _job: &Job) {}
}

/// Desktop banner on macOS (`terminal-notifier`), spoken message on Linux
/// (`spd-say`). Fire-and-forget; a missing helper is only logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesktopNotifier;

impl DesktopNotifier {
    fn command(job: &Job) -> Option<Command> {
        if cfg!(target_os = "macos") {
            let mut cmd = Command::new("terminal-notifier");
            cmd.args(["-message", "has finished", "-title"])
                .arg(&job.output_name)
                .args(["-sound", "Crystal"]);
            Some(cmd)
        } else if cfg!(target_os = "linux") {
            let mut cmd = Command::new("spd-say");
            cmd.arg(format!("{} has finished", job.output_name));
            Some(cmd)
        } else {
            None
        }
    }
}

impl Notifier for DesktopNotifier {
    fn download_finished(&self, job: &Job) {
        let Some(mut cmd) = Self::command(job) else {
            return;
        };
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        match cmd.spawn() {
            Ok(_) => tracing::debug!(job_id = job.id, "completion notification sent"),
            Err(e) => tracing::debug!(job_id = job.id, "notification helper unavailable: {}", e),
        }
    }
}
