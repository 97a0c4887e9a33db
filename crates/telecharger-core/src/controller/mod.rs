//! Queue controller: single-flight download state machine.
//!
//! The controller owns all state mutation and runs on one task. A spawned
//! pump task drains the downloader's output and reports back over a channel
//! as [`DownloadEvent`]s; the presentation layer feeds [`Intent`]s in and
//! receives [`UiEvent`]s out. The store stays the source of truth: every
//! scheduling decision re-reads the relevant partition, and a failed store
//! write leaves the controller state as it was.

mod cleanup;
mod command;
mod dashboard;
mod events;
mod state;


use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::config::TelechargerConfig;
use crate::error::PersistenceError;
use crate::job_db::{Job, JobId, JobStatus, JobStore, NewJob};
use crate::notify::Notifier;
use crate::process::{ExitOutcome, KillSwitch, ProcessRunner, RunningProcess};
use crate::progress::parse_progress;

pub use cleanup::{remove_partial_artifacts, PARTIAL_SUFFIX};
pub use command::build_download_args;
pub use dashboard::{job_details, job_title, status_marker, Dashboard};
pub use events::{DownloadEvent, Flow, Intent, UiEvent};
pub use state::{ActiveDownload, ControllerState, ExitChoice};

/// How long abort waits for a killed downloader to be reaped before cleanup.
const KILL_GRACE: Duration = Duration::from_secs(5);

/// What the controller needs from the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSettings {
    pub downloader: String,
    pub download_folder: PathBuf,
}

impl ControllerSettings {
    pub fn from_config(cfg: &TelechargerConfig) -> Self {
        Self {
            downloader: cfg.downloader.clone(),
            download_folder: cfg.download_folder.clone(),
        }
    }
}

/// Receiving ends handed to the event loop.
#[derive(Debug)]
pub struct Channels {
    /// Pump output; pass each event back to [`Controller::on_download_event`].
    pub downloads: mpsc::UnboundedReceiver<DownloadEvent>,
    pub ui: mpsc::UnboundedReceiver<UiEvent>,
}

pub struct Controller<S, R, N> {
    store: S,
    runner: R,
    notifier: N,
    settings: ControllerSettings,
    state: ControllerState,
    kill: Option<KillSwitch>,
    events_tx: mpsc::UnboundedSender<DownloadEvent>,
    ui_tx: mpsc::UnboundedSender<UiEvent>,
}

impl<S, R, N> Controller<S, R, N>
where
    S: JobStore,
    R: ProcessRunner,
    N: Notifier,
{
    pub fn new(store: S, runner: R, notifier: N, settings: ControllerSettings) -> (Self, Channels) {
        let (events_tx, downloads) = mpsc::unbounded_channel();
        let (ui_tx, ui) = mpsc::unbounded_channel();
        let controller = Self {
            store,
            runner,
            notifier,
            settings,
            state: ControllerState::Idle,
            kill: None,
            events_tx,
            ui_tx,
        };
        (controller, Channels { downloads, ui })
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Requeue jobs a previous run left `downloading`. Call once before the loop starts.
    pub async fn recover_interrupted(&self) -> Result<u64, PersistenceError> {
        let n = self.store.reset_downloading().await?;
        if n > 0 {
            tracing::info!("requeued {} interrupted download(s)", n);
        }
        Ok(n)
    }

    /// Fresh snapshot of every partition plus the active download.
    pub async fn dashboard(&self) -> Result<Dashboard, PersistenceError> {
        Dashboard::load(&self.store, self.state.active().cloned()).await
    }

    pub async fn handle_intent(&mut self, intent: Intent) -> Flow {
        match intent {
            Intent::Create(job) => {
                self.request_create(&job).await;
                Flow::Continue
            }
            Intent::Download(id) => {
                self.request_download(id).await;
                Flow::Continue
            }
            Intent::Delete(id) => {
                self.request_delete(id).await;
                Flow::Continue
            }
            Intent::Quit => self.request_quit().await,
            Intent::Left => {
                self.move_left();
                Flow::Continue
            }
            Intent::Right => {
                self.move_right();
                Flow::Continue
            }
            Intent::Confirm => self.confirm().await,
        }
    }

    /// Queue a new job. Ignored while the exit dialog is open.
    pub async fn request_create(&mut self, job: &NewJob) -> Option<JobId> {
        if self.state.is_confirming_exit() {
            tracing::debug!("create ignored in state {}", self.state.name());
            return None;
        }
        match self.store.create(job).await {
            Ok(id) => {
                tracing::info!(job_id = id, "queued {}", job.source);
                self.emit(UiEvent::StateChanged);
                Some(id)
            }
            Err(e) => {
                self.report_persistence("create job", &e);
                None
            }
        }
    }

    /// Start `id` if the slot is free and the job is still queued.
    pub async fn request_download(&mut self, id: JobId) {
        if !self.state.is_idle() {
            tracing::debug!(job_id = id, "download ignored in state {}", self.state.name());
            return;
        }
        // A row left `downloading` by a failed status write still holds the slot.
        match self.store.list_by_status(JobStatus::Downloading).await {
            Ok(jobs) if !jobs.is_empty() => {
                tracing::warn!(job_id = id, "download ignored: job {} is still downloading", jobs[0].id);
                self.emit(UiEvent::Message(format!(
                    "job {} is still marked downloading; requeue it before starting another",
                    jobs[0].id
                )));
                return;
            }
            Ok(_) => {}
            Err(e) => {
                self.report_persistence("read downloading jobs", &e);
                return;
            }
        }
        let queued = match self.store.list_by_status(JobStatus::Queued).await {
            Ok(jobs) => jobs,
            Err(e) => {
                self.report_persistence("read queued jobs", &e);
                return;
            }
        };
        let Some(mut job) = queued.into_iter().find(|job| job.id == id) else {
            tracing::debug!(job_id = id, "download ignored: job is not queued");
            return;
        };

        if let Err(e) = self.store.set_status(id, JobStatus::Downloading).await {
            self.report_persistence("mark job downloading", &e);
            return;
        }
        job.status = JobStatus::Downloading;
        self.state = ControllerState::Downloading(ActiveDownload::new(job.clone()));

        let args = build_download_args(&job, &self.settings.download_folder);
        tracing::info!(job_id = id, "starting {} {:?}", self.settings.downloader, args);
        match self.runner.start(&self.settings.downloader, &args) {
            Ok(process) => {
                self.kill = Some(process.kill_switch());
                tokio::spawn(pump(id, process, self.events_tx.clone()));
                self.emit(UiEvent::StateChanged);
            }
            Err(e) => {
                tracing::warn!(job_id = id, "{}", e);
                self.finish(id, ExitOutcome::Failure(e.to_string())).await;
            }
        }
    }

    /// Feed back one message from the pump task.
    pub async fn on_download_event(&mut self, event: DownloadEvent) {
        match event {
            DownloadEvent::Progress { job_id, update } => {
                match self.state.active_mut() {
                    Some(active) if active.job.id == job_id => {
                        active.percent = Some(update.percent);
                    }
                    _ => {
                        tracing::debug!(job_id, "progress for inactive job dropped");
                        return;
                    }
                }
                self.emit(UiEvent::Progress {
                    job_id,
                    percent: update.percent,
                });
            }
            DownloadEvent::Finished { job_id, outcome } => self.finish(job_id, outcome).await,
        }
    }

    /// Delete a queued job. Anything else, including no selection, is ignored.
    pub async fn request_delete(&mut self, id: Option<JobId>) {
        if self.state.is_confirming_exit() {
            return;
        }
        let Some(id) = id else {
            return;
        };
        let queued = match self.store.list_by_status(JobStatus::Queued).await {
            Ok(jobs) => jobs,
            Err(e) => {
                self.report_persistence("read queued jobs", &e);
                return;
            }
        };
        if !queued.iter().any(|job| job.id == id) {
            tracing::debug!(job_id = id, "delete ignored: job is not queued");
            return;
        }
        match self.store.delete(id).await {
            Ok(()) => {
                tracing::info!(job_id = id, "deleted");
                self.emit(UiEvent::StateChanged);
            }
            Err(e) => self.report_persistence("delete job", &e),
        }
    }

    /// Quit at once when nothing is downloading; otherwise open the exit dialog.
    pub async fn request_quit(&mut self) -> Flow {
        if self.state.is_confirming_exit() {
            return Flow::Continue;
        }
        let busy = self.state.active().is_some()
            || match self.store.list_by_status(JobStatus::Downloading).await {
                Ok(jobs) => !jobs.is_empty(),
                Err(e) => {
                    // Cannot prove nothing is running: keep the guard up.
                    self.report_persistence("read downloading jobs", &e);
                    true
                }
            };
        if !busy {
            return Flow::Quit;
        }
        let resume = match std::mem::take(&mut self.state) {
            ControllerState::Downloading(active) => Some(active),
            _ => None,
        };
        self.state = ControllerState::ExitConfirm {
            choice: ExitChoice::AbortAndQuit,
            resume,
        };
        self.emit(UiEvent::StateChanged);
        Flow::Continue
    }

    pub fn move_left(&mut self) {
        self.toggle_choice();
    }

    pub fn move_right(&mut self) {
        self.toggle_choice();
    }

    /// Resolve the exit dialog with its current choice.
    pub async fn confirm(&mut self) -> Flow {
        let choice = match &self.state {
            ControllerState::ExitConfirm { choice, .. } => *choice,
            _ => return Flow::Continue,
        };
        match choice {
            ExitChoice::Resume => {
                self.state = match std::mem::take(&mut self.state) {
                    ControllerState::ExitConfirm {
                        resume: Some(active),
                        ..
                    } => ControllerState::Downloading(active),
                    _ => ControllerState::Idle,
                };
                self.emit(UiEvent::StateChanged);
                Flow::Continue
            }
            ExitChoice::AbortAndQuit => self.abort_and_quit().await,
        }
    }

    fn toggle_choice(&mut self) {
        if let ControllerState::ExitConfirm { choice, .. } = &mut self.state {
            *choice = choice.toggled();
            self.emit(UiEvent::StateChanged);
        }
    }

    async fn abort_and_quit(&mut self) -> Flow {
        match self.store.reset_downloading().await {
            Ok(n) => tracing::info!("abort: requeued {} job(s)", n),
            Err(e) => {
                self.report_persistence("requeue downloading jobs", &e);
                return Flow::Continue;
            }
        }

        if let Some(kill) = self.kill.take() {
            if !kill.kill_and_wait(KILL_GRACE).await {
                tracing::warn!("downloader exit not observed within {:?}", KILL_GRACE);
            }
        }

        match remove_partial_artifacts(&self.settings.download_folder).await {
            Ok(removed) => tracing::info!("abort: removed {} partial file(s)", removed.len()),
            Err(e) => tracing::warn!(
                "could not scan {} for partial files: {}",
                self.settings.download_folder.display(),
                e
            ),
        }

        self.state = ControllerState::Idle;
        Flow::Quit
    }

    /// Record the exit of `job_id` and release the slot.
    async fn finish(&mut self, job_id: JobId, outcome: ExitOutcome) {
        let Some(job) = self
            .state
            .active()
            .filter(|active| active.job.id == job_id)
            .map(|active| active.job.clone())
        else {
            tracing::debug!(job_id, "exit for inactive job dropped");
            return;
        };

        // The process is gone either way, so the slot is released even if
        // the status write below fails.
        self.kill = None;
        self.state = match std::mem::take(&mut self.state) {
            ControllerState::ExitConfirm { choice, .. } => ControllerState::ExitConfirm {
                choice,
                resume: None,
            },
            _ => ControllerState::Idle,
        };

        match outcome {
            ExitOutcome::Success => match self.store.set_status(job_id, JobStatus::Completed).await {
                Ok(()) => {
                    let job = Job {
                        status: JobStatus::Completed,
                        ..job
                    };
                    tracing::info!("job {} completed: {}", job_id, job.output_name);
                    self.notifier.download_finished(&job);
                    self.emit(UiEvent::Completed(job));
                }
                Err(e) => self.report_persistence("mark job completed", &e),
            },
            ExitOutcome::Failure(reason) => match self.store.set_status(job_id, JobStatus::Error).await {
                Ok(()) => {
                    tracing::warn!("job {} failed: {}", job_id, reason);
                    let job = Job {
                        status: JobStatus::Error,
                        ..job
                    };
                    self.emit(UiEvent::Failed { job, reason });
                }
                Err(e) => self.report_persistence("mark job failed", &e),
            },
        }
        self.emit(UiEvent::StateChanged);
    }

    fn report_persistence(&self, action: &str, e: &PersistenceError) {
        tracing::warn!("{} failed: {}", action, e);
        self.emit(UiEvent::Message(format!("{} failed: {}", action, e)));
    }

    fn emit(&self, event: UiEvent) {
        let _ = self.ui_tx.send(event);
    }
}

/// Drain the downloader's tokens into progress events, then report its exit.
///
/// Tokens are drained even if the loop has gone away so the child never
/// blocks on a full pipe.
async fn pump(job_id: JobId, mut process: RunningProcess, events: mpsc::UnboundedSender<DownloadEvent>) {
    while let Some(token) = process.next_token().await {
        if let Some(update) = parse_progress(&token) {
            let _ = events.send(DownloadEvent::Progress { job_id, update });
        }
    }
    let outcome = process.wait().await;
    let _ = events.send(DownloadEvent::Finished { job_id, outcome });
}
