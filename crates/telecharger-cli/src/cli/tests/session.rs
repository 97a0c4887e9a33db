//! Tests for the interactive session: line parsing, rendering and full runs.

use std::path::Path;

use telecharger_core::controller::{
    ActiveDownload, Controller, ControllerSettings, ControllerState, Dashboard, ExitChoice, Intent,
};
use telecharger_core::job_db::{Job, JobDb, JobStatus, JobStore, NewJob};
use telecharger_core::notify::NoopNotifier;
use telecharger_core::process::{ExitOutcome, ScriptedRunner};

use crate::cli::commands::session::{drive, parse_line, write_dashboard, SessionCommand};

fn intent(line: &str) -> Intent {
    match parse_line(line, false) {
        Ok(Some(SessionCommand::Intent(intent))) => intent,
        other => panic!("expected an intent for {line:?}, got {other:?}"),
    }
}

#[test]
fn parse_start_delete_quit() {
    assert_eq!(intent("start 3"), Intent::Download(3));
    assert_eq!(intent("  s 4 "), Intent::Download(4));
    assert_eq!(intent("d"), Intent::Delete(None));
    assert_eq!(intent("delete 7"), Intent::Delete(Some(7)));
    assert_eq!(intent("q"), Intent::Quit);
    assert_eq!(parse_line("", false), Ok(None));
    assert_eq!(parse_line("ls", false), Ok(Some(SessionCommand::List)));
    assert_eq!(parse_line("show 2", false), Ok(Some(SessionCommand::Show(2))));
}

#[test]
fn parse_rejects_bad_input() {
    assert!(parse_line("start x", false).is_err());
    assert!(parse_line("frobnicate", false).is_err());
    assert!(parse_line("add only-source", false).is_err());
    assert!(parse_line("add a b --audio-format", false).is_err());
}

#[test]
fn parse_add_with_flags_and_extra_args() {
    let job = match intent("add abc123 song --audio-only --audio-format opus --embed-thumbnail -- --foo bar") {
        Intent::Create(job) => job,
        other => panic!("expected Create, got {other:?}"),
    };
    assert_eq!(
        job,
        NewJob {
            source: "abc123".to_string(),
            output_name: "song".to_string(),
            audio_only: true,
            audio_format: "opus".to_string(),
            embed_thumbnail: true,
            extra_args: "--foo bar".to_string(),
        }
    );
}

#[test]
fn parse_in_exit_dialog() {
    let dialog = |line: &str| parse_line(line, true);
    assert_eq!(dialog(""), Ok(Some(SessionCommand::Intent(Intent::Confirm))));
    assert_eq!(dialog("h"), Ok(Some(SessionCommand::Intent(Intent::Left))));
    assert_eq!(dialog("right"), Ok(Some(SessionCommand::Intent(Intent::Right))));
    assert!(dialog("start 1").is_err());
}

fn job(id: i64, name: &str, status: JobStatus) -> Job {
    Job {
        id,
        source: format!("https://example.com/{name}"),
        output_name: name.to_string(),
        audio_only: false,
        audio_format: String::new(),
        embed_thumbnail: false,
        extra_args: String::new(),
        status,
        created_at: 0,
        updated_at: 0,
    }
}

#[test]
fn dashboard_rendering_shows_markers_progress_and_dialog() {
    let active = job(2, "clip", JobStatus::Downloading);
    let dash = Dashboard {
        queued: vec![job(1, "song", JobStatus::Queued)],
        downloading: vec![active.clone()],
        completed: vec![],
        failed: vec![job(3, "bad", JobStatus::Error)],
        active: Some(ActiveDownload {
            job: active.clone(),
            percent: Some(42.5),
        }),
    };
    let state = ControllerState::ExitConfirm {
        choice: ExitChoice::AbortAndQuit,
        resume: dash.active.clone(),
    };
    let mut out = Vec::new();
    write_dashboard(&dash, &state, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(text.contains("Queued (1)\n  [1] song\n"));
    assert!(text.contains("  [2] 📀 clip  42.5%\n"));
    assert!(text.contains("Completed (0)\n"));
    assert!(text.contains("  [3] ❌ bad\n"));
    assert!(text.contains("[Yes, abort]"));
}

fn settings(folder: &Path) -> ControllerSettings {
    ControllerSettings {
        downloader: "yt-dlp".to_string(),
        download_folder: folder.to_path_buf(),
    }
}

#[tokio::test]
async fn session_runs_download_to_completion_after_input_ends() {
    let dir = tempfile::tempdir().unwrap();
    let db = JobDb::open_at(dir.path().join("jobs.db")).await.unwrap();
    let runner = ScriptedRunner::new();
    runner.push_run(["30%", "100%"], ExitOutcome::Success);
    let (mut ctl, channels) =
        Controller::new(db.clone(), runner.clone(), NoopNotifier, settings(dir.path()));

    let input: &[u8] = b"add https://example.com/v song --audio-only\nstart 1\n";
    let mut out = Vec::new();
    drive(&mut ctl, channels, input, &mut out).await.unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Finished: song"));
    assert_eq!(
        db.get_job(1).await.unwrap().map(|j| j.status),
        Some(JobStatus::Completed)
    );
    assert_eq!(runner.launches().len(), 1);
}

#[tokio::test]
async fn session_abort_requeues_and_returns() {
    let dir = tempfile::tempdir().unwrap();
    let db = JobDb::open_at(dir.path().join("jobs.db")).await.unwrap();
    db.add_job(&NewJob {
        source: "abc".to_string(),
        output_name: "abc".to_string(),
        ..NewJob::default()
    })
    .await
    .unwrap();
    let runner = ScriptedRunner::new();
    let _gate = runner.push_held(Vec::<String>::new());
    let (mut ctl, channels) =
        Controller::new(db.clone(), runner.clone(), NoopNotifier, settings(dir.path()));

    let input: &[u8] = b"start 1\nquit\n\n";
    let mut out = Vec::new();
    drive(&mut ctl, channels, input, &mut out).await.unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Quit anyway?"));
    assert_eq!(
        db.list_by_status(JobStatus::Queued).await.unwrap().len(),
        1
    );
    assert!(runner.kill_requested());
}

#[tokio::test]
async fn session_requeues_interrupted_jobs_on_start() {
    let dir = tempfile::tempdir().unwrap();
    let db = JobDb::open_at(dir.path().join("jobs.db")).await.unwrap();
    let id = db
        .add_job(&NewJob {
            source: "abc".to_string(),
            output_name: "abc".to_string(),
            ..NewJob::default()
        })
        .await
        .unwrap();
    db.update_status(id, JobStatus::Downloading).await.unwrap();
    let (mut ctl, channels) =
        Controller::new(db.clone(), ScriptedRunner::new(), NoopNotifier, settings(dir.path()));

    let input: &[u8] = b"q\n";
    let mut out = Vec::new();
    drive(&mut ctl, channels, input, &mut out).await.unwrap();

    assert!(String::from_utf8(out)
        .unwrap()
        .contains("Requeued 1 interrupted download(s)."));
    assert_eq!(
        db.get_job(id).await.unwrap().map(|j| j.status),
        Some(JobStatus::Queued)
    );
}
