//! Launching the external downloader and streaming its output as tokens.
//!
//! `ProcessRunner::start` returns a `RunningProcess`: a lazy sequence of
//! whitespace-delimited tokens drawn from stdout and stderr, an exit outcome
//! reported only after both streams have closed, and a `KillSwitch`.

mod runner;
#[cfg(any(test, feature = "test-support"))]
mod scripted;
mod tokenize;

pub use runner::{ExitOutcome, KillSwitch, ProcessRunner, RunningProcess, TokioRunner};
#[cfg(any(test, feature = "test-support"))]
pub use scripted::{ScriptGate, ScriptedRunner};
pub use tokenize::Tokenizer;
