//! Process runner contract and the tokio-backed implementation.

use std::process::{ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::sync::{mpsc, oneshot, watch, Notify};
use tokio::task::JoinHandle;

use crate::error::SpawnError;

use super::tokenize::Tokenizer;

const READ_BUF_BYTES: usize = 4096;

/// How the downloader process ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitOutcome {
    Success,
    /// Non-zero exit, signal, I/O error, or launch failure.
    Failure(String),
}

impl ExitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ExitOutcome::Success)
    }

    fn from_status(status: ExitStatus) -> Self {
        if status.success() {
            ExitOutcome::Success
        } else {
            ExitOutcome::Failure(status.to_string())
        }
    }
}

/// Requests termination of a running downloader and reports when it has exited.
#[derive(Debug, Clone)]
pub struct KillSwitch {
    request: Arc<Notify>,
    requested: Arc<AtomicBool>,
    exited: watch::Receiver<bool>,
}

impl KillSwitch {
    /// New switch plus the sender the process owner flips to `true` on exit.
    pub fn pair() -> (Self, watch::Sender<bool>) {
        let (exited_tx, exited) = watch::channel(false);
        let switch = Self {
            request: Arc::new(Notify::new()),
            requested: Arc::new(AtomicBool::new(false)),
            exited,
        };
        (switch, exited_tx)
    }

    /// Ask the owner to kill the process. Safe to call more than once.
    pub fn kill(&self) {
        self.requested.store(true, Ordering::Relaxed);
        self.request.notify_one();
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Relaxed)
    }

    /// Kill, then wait up to `grace` for the process to be reaped.
    /// Returns false if the exit was not observed in time.
    pub async fn kill_and_wait(&self, grace: Duration) -> bool {
        self.kill();
        let mut exited = self.exited.clone();
        let observed = matches!(
            tokio::time::timeout(grace, exited.wait_for(|done| *done)).await,
            Ok(Ok(_))
        );
        observed
    }

    async fn requested(&self) {
        self.request.notified().await;
    }
}

/// Handle to a started downloader.
///
/// Dropping it without draining the tokens leaves the process running detached.
#[derive(Debug)]
pub struct RunningProcess {
    tokens: mpsc::UnboundedReceiver<String>,
    exit: oneshot::Receiver<ExitOutcome>,
    kill: KillSwitch,
}

impl RunningProcess {
    /// Assemble a handle from its channels. The exit outcome must only be sent
    /// after every token sender has been dropped.
    pub fn from_parts(
        tokens: mpsc::UnboundedReceiver<String>,
        exit: oneshot::Receiver<ExitOutcome>,
        kill: KillSwitch,
    ) -> Self {
        Self { tokens, exit, kill }
    }

    /// Next output token; `None` once both streams are closed.
    pub async fn next_token(&mut self) -> Option<String> {
        self.tokens.recv().await
    }

    /// Wait for the process to terminate.
    pub async fn wait(self) -> ExitOutcome {
        self.exit
            .await
            .unwrap_or_else(|_| ExitOutcome::Failure("exit status lost".to_string()))
    }

    pub fn kill_switch(&self) -> KillSwitch {
        self.kill.clone()
    }
}

/// Launches the external downloader.
pub trait ProcessRunner {
    fn start(&self, program: &str, args: &[String]) -> Result<RunningProcess, SpawnError>;
}

/// Runs the downloader as a real child process via `tokio::process`.
///
/// Must be called from within a tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioRunner;

impl ProcessRunner for TokioRunner {
    fn start(&self, program: &str, args: &[String]) -> Result<RunningProcess, SpawnError> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SpawnError::new(program, e))?;
        tracing::debug!(program, pid = ?child.id(), "downloader spawned");

        let (token_tx, token_rx) = mpsc::unbounded_channel();
        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(spawn_token_reader(stdout, token_tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(spawn_token_reader(stderr, token_tx.clone()));
        }
        drop(token_tx);

        let (kill, exited_tx) = KillSwitch::pair();
        let kill_signal = kill.clone();
        let (exit_tx, exit_rx) = oneshot::channel();
        tokio::spawn(async move {
            let waited = tokio::select! {
                status = child.wait() => Some(status),
                _ = kill_signal.requested() => None,
            };
            let status = match waited {
                Some(status) => status,
                None => {
                    if let Err(e) = child.start_kill() {
                        tracing::warn!("failed to kill downloader: {}", e);
                    }
                    child.wait().await
                }
            };
            let _ = exited_tx.send(true);

            // Streams close before the exit is reported.
            for reader in readers {
                let _ = reader.await;
            }
            let outcome = match status {
                Ok(status) => ExitOutcome::from_status(status),
                Err(e) => ExitOutcome::Failure(format!("wait for downloader: {e}")),
            };
            let _ = exit_tx.send(outcome);
        });

        Ok(RunningProcess::from_parts(token_rx, exit_rx, kill))
    }
}

/// Read a stream to EOF, forwarding whitespace-delimited tokens.
/// Keeps draining when the receiver is gone so the child never blocks on a full pipe.
fn spawn_token_reader<R>(mut reader: R, tx: mpsc::UnboundedSender<String>) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut tokenizer = Tokenizer::new();
        let mut buf = [0u8; READ_BUF_BYTES];
        loop {
            match reader.read(&mut buf).await {
                Ok(0) => break,
                Ok(n) => {
                    for token in tokenizer.push(&buf[..n]) {
                        let _ = tx.send(token);
                    }
                }
                Err(e) => {
                    tracing::debug!("downloader output read failed: {}", e);
                    break;
                }
            }
        }
        if let Some(token) = tokenizer.finish() {
            let _ = tx.send(token);
        }
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    async fn drain(mut process: RunningProcess) -> (Vec<String>, ExitOutcome) {
        let mut tokens = Vec::new();
        while let Some(t) = process.next_token().await {
            tokens.push(t);
        }
        (tokens, process.wait().await)
    }

    #[tokio::test]
    async fn tokens_then_success() {
        let process = TokioRunner
            .start("sh", &sh("printf '10%% 55%%\\r100%%\\n'"))
            .unwrap();
        let (tokens, outcome) = drain(process).await;
        assert_eq!(tokens, vec!["10%", "55%", "100%"]);
        assert_eq!(outcome, ExitOutcome::Success);
    }

    #[tokio::test]
    async fn stderr_is_merged_and_nonzero_exit_fails() {
        let process = TokioRunner
            .start("sh", &sh("echo oops >&2; exit 3"))
            .unwrap();
        let (tokens, outcome) = drain(process).await;
        assert_eq!(tokens, vec!["oops"]);
        assert!(!outcome.is_success());
    }

    #[tokio::test]
    async fn missing_executable_is_a_spawn_error() {
        let err = TokioRunner
            .start("telecharger-no-such-downloader", &[])
            .unwrap_err();
        assert_eq!(err.program, "telecharger-no-such-downloader");
    }

    #[tokio::test]
    async fn kill_switch_terminates_child() {
        let process = TokioRunner.start("sh", &sh("exec sleep 30")).unwrap();
        let kill = process.kill_switch();
        assert!(kill.kill_and_wait(Duration::from_secs(5)).await);
        assert!(!process.wait().await.is_success());
    }
}
