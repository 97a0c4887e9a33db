//! In-process runner that replays canned downloader output.
//!
//! Used by the controller tests and by anything that needs the full
//! download lifecycle without a real downloader on `PATH`.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, oneshot};

use crate::error::SpawnError;

use super::runner::{ExitOutcome, KillSwitch, ProcessRunner, RunningProcess};

#[derive(Debug)]
enum Script {
    Run {
        tokens: Vec<String>,
        outcome: ExitOutcome,
    },
    Held {
        tokens: Vec<String>,
        gate: ScriptGate,
    },
    SpawnFailure,
}

/// Keeps a held scripted process running until `finish` is called.
#[derive(Debug, Clone, Default)]
pub struct ScriptGate {
    exit: Arc<Mutex<Option<oneshot::Sender<ExitOutcome>>>>,
}

impl ScriptGate {
    /// Let the held process exit with `outcome`. Later calls are ignored.
    pub fn finish(&self, outcome: ExitOutcome) {
        if let Some(tx) = self.exit.lock().unwrap().take() {
            let _ = tx.send(outcome);
        }
    }
}

/// Runner whose launches follow a queue of scripts, one per `start`.
///
/// Starting with an empty queue behaves like a missing executable.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRunner {
    scripts: Arc<Mutex<VecDeque<Script>>>,
    launches: Arc<Mutex<Vec<(String, Vec<String>)>>>,
    kills: Arc<Mutex<Vec<KillSwitch>>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next launch emits `tokens`, closes its streams, then exits with `outcome`.
    pub fn push_run<I, T>(&self, tokens: I, outcome: ExitOutcome)
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.push(Script::Run {
            tokens: tokens.into_iter().map(Into::into).collect(),
            outcome,
        });
    }

    /// Next launch emits `tokens` and stays alive until the returned gate is finished.
    pub fn push_held<I, T>(&self, tokens: I) -> ScriptGate
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let gate = ScriptGate::default();
        self.push(Script::Held {
            tokens: tokens.into_iter().map(Into::into).collect(),
            gate: gate.clone(),
        });
        gate
    }

    /// Next launch fails as if the executable were missing.
    pub fn push_spawn_failure(&self) {
        self.push(Script::SpawnFailure);
    }

    /// Every `(program, args)` passed to `start`, in order.
    pub fn launches(&self) -> Vec<(String, Vec<String>)> {
        self.launches.lock().unwrap().clone()
    }

    /// True once any launched process has been asked to die.
    pub fn kill_requested(&self) -> bool {
        self.kills.lock().unwrap().iter().any(KillSwitch::is_requested)
    }

    fn push(&self, script: Script) {
        self.scripts.lock().unwrap().push_back(script);
    }
}

impl ProcessRunner for ScriptedRunner {
    fn start(&self, program: &str, args: &[String]) -> Result<RunningProcess, SpawnError> {
        self.launches
            .lock()
            .unwrap()
            .push((program.to_string(), args.to_vec()));

        let script = self.scripts.lock().unwrap().pop_front();
        let (exit_tx, exit_rx) = oneshot::channel();
        let tokens = match script {
            Some(Script::Run { tokens, outcome }) => {
                let _ = exit_tx.send(outcome);
                tokens
            }
            Some(Script::Held { tokens, gate }) => {
                *gate.exit.lock().unwrap() = Some(exit_tx);
                tokens
            }
            Some(Script::SpawnFailure) | None => {
                return Err(SpawnError::new(
                    program,
                    std::io::Error::from(std::io::ErrorKind::NotFound),
                ));
            }
        };

        let (token_tx, token_rx) = mpsc::unbounded_channel();
        for token in tokens {
            let _ = token_tx.send(token);
        }
        drop(token_tx);

        // Nothing to reap: report the exit up front so `kill_and_wait` sees it.
        let (kill, exited_tx) = KillSwitch::pair();
        let _ = exited_tx.send(true);
        self.kills.lock().unwrap().push(kill.clone());
        Ok(RunningProcess::from_parts(token_rx, exit_rx, kill))
    }
}
