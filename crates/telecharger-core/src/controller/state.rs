//! Controller view states.

use crate::job_db::Job;

/// The job holding the single-flight slot and its last reported progress.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveDownload {
    pub job: Job,
    pub percent: Option<f64>,
}

impl ActiveDownload {
    pub fn new(job: Job) -> Self {
        Self { job, percent: None }
    }
}

/// Binary choice held by the exit-confirmation dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitChoice {
    /// Requeue in-flight jobs, remove partial files, quit.
    AbortAndQuit,
    /// Close the dialog and keep going.
    Resume,
}

impl ExitChoice {
    pub fn toggled(self) -> Self {
        match self {
            ExitChoice::AbortAndQuit => ExitChoice::Resume,
            ExitChoice::Resume => ExitChoice::AbortAndQuit,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControllerState {
    Idle,
    Downloading(ActiveDownload),
    /// Quit was requested while a download was in flight. `resume` is the
    /// state to return to; it becomes `None` if the download ends meanwhile.
    ExitConfirm {
        choice: ExitChoice,
        resume: Option<ActiveDownload>,
    },
}

impl ControllerState {
    pub fn name(&self) -> &'static str {
        match self {
            ControllerState::Idle => "idle",
            ControllerState::Downloading(_) => "downloading",
            ControllerState::ExitConfirm { .. } => "exit-confirm",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, ControllerState::Idle)
    }

    pub fn is_confirming_exit(&self) -> bool {
        matches!(self, ControllerState::ExitConfirm { .. })
    }

    /// The download occupying the slot, including one paused behind the exit dialog.
    pub fn active(&self) -> Option<&ActiveDownload> {
        match self {
            ControllerState::Downloading(active) => Some(active),
            ControllerState::ExitConfirm { resume, .. } => resume.as_ref(),
            ControllerState::Idle => None,
        }
    }

    pub(crate) fn active_mut(&mut self) -> Option<&mut ActiveDownload> {
        match self {
            ControllerState::Downloading(active) => Some(active),
            ControllerState::ExitConfirm { resume, .. } => resume.as_mut(),
            ControllerState::Idle => None,
        }
    }
}

impl Default for ControllerState {
    fn default() -> Self {
        ControllerState::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_choice_toggles_both_ways() {
        assert_eq!(ExitChoice::AbortAndQuit.toggled(), ExitChoice::Resume);
        assert_eq!(ExitChoice::Resume.toggled(), ExitChoice::AbortAndQuit);
    }
}
