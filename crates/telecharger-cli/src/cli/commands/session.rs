//! `telecharger session` – interactive controller loop driven by line commands.
//!
//! One task owns the controller. Each turn waits on whichever comes first:
//! a line from stdin or a message from the download pump.

use std::io::Write;

use anyhow::Result;
use telecharger_core::config::TelechargerConfig;
use telecharger_core::controller::{
    job_details, job_title, Channels, Controller, ControllerSettings, ControllerState, Dashboard,
    ExitChoice, Flow, Intent, UiEvent,
};
use telecharger_core::job_db::{JobDb, JobId, JobStatus, JobStore, NewJob};
use telecharger_core::notify::{DesktopNotifier, Notifier};
use telecharger_core::process::{ProcessRunner, TokioRunner};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

pub(crate) const HELP: &str = "commands: add <source> <output> [flags] [-- args] | start <id> | \
delete [id] | show <id> | list | quit (exit dialog: left/right, empty line confirms)";

const ADD_USAGE: &str =
    "usage: add <source> <output> [--audio-only] [--audio-format F] [--embed-thumbnail] [-- extra args...]";

pub async fn run_session(db: JobDb, cfg: &TelechargerConfig) -> Result<()> {
    let (mut ctl, channels) = Controller::new(
        db,
        TokioRunner,
        DesktopNotifier,
        ControllerSettings::from_config(cfg),
    );
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    drive(&mut ctl, channels, stdin, &mut stdout).await
}

/// One parsed input line.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SessionCommand {
    Intent(Intent),
    Show(JobId),
    List,
    Help,
}

/// Parse a line typed in the session. `Ok(None)` means nothing to do.
pub(crate) fn parse_line(line: &str, confirming_exit: bool) -> Result<Option<SessionCommand>, String> {
    let words: Vec<&str> = line.split_whitespace().collect();

    if confirming_exit {
        return match words.as_slice() {
            [] | ["enter"] => Ok(Some(SessionCommand::Intent(Intent::Confirm))),
            ["left" | "h"] => Ok(Some(SessionCommand::Intent(Intent::Left))),
            ["right" | "l"] => Ok(Some(SessionCommand::Intent(Intent::Right))),
            ["list" | "ls"] => Ok(Some(SessionCommand::List)),
            _ => Err("choose with left/right, confirm with an empty line".to_string()),
        };
    }

    match words.as_slice() {
        [] => Ok(None),
        ["start" | "s", id] => Ok(Some(SessionCommand::Intent(Intent::Download(parse_id(id)?)))),
        ["delete" | "d"] => Ok(Some(SessionCommand::Intent(Intent::Delete(None)))),
        ["delete" | "d", id] => Ok(Some(SessionCommand::Intent(Intent::Delete(Some(
            parse_id(id)?,
        ))))),
        ["show", id] => Ok(Some(SessionCommand::Show(parse_id(id)?))),
        ["add", rest @ ..] => Ok(Some(SessionCommand::Intent(Intent::Create(parse_add(rest)?)))),
        ["list" | "ls"] => Ok(Some(SessionCommand::List)),
        ["help" | "?"] => Ok(Some(SessionCommand::Help)),
        ["quit" | "q"] => Ok(Some(SessionCommand::Intent(Intent::Quit))),
        [cmd, ..] => Err(format!("unknown command `{cmd}`; type `help`")),
    }
}

fn parse_id(s: &str) -> Result<JobId, String> {
    s.parse().map_err(|_| format!("`{s}` is not a job id"))
}

fn parse_add(args: &[&str]) -> Result<NewJob, String> {
    let mut job = NewJob::default();
    let mut positional = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match *arg {
            "--audio-only" => job.audio_only = true,
            "--embed-thumbnail" => job.embed_thumbnail = true,
            "--audio-format" => {
                job.audio_format = iter
                    .next()
                    .ok_or("--audio-format needs a value")?
                    .to_string();
            }
            "--" => {
                job.extra_args = iter.by_ref().copied().collect::<Vec<_>>().join(" ");
            }
            other => positional.push(other),
        }
    }
    match positional.as_slice() {
        [source, output] => {
            job.source = source.to_string();
            job.output_name = output.to_string();
            Ok(job)
        }
        _ => Err(ADD_USAGE.to_string()),
    }
}

/// Run the session until quit, or until input ends and no download is active.
pub(crate) async fn drive<S, R, N, I, W>(
    ctl: &mut Controller<S, R, N>,
    mut channels: Channels,
    input: I,
    out: &mut W,
) -> Result<()>
where
    S: JobStore,
    R: ProcessRunner,
    N: Notifier,
    I: AsyncBufRead + Unpin,
    W: Write,
{
    let recovered = ctl.recover_interrupted().await?;
    if recovered > 0 {
        writeln!(out, "Requeued {recovered} interrupted download(s).")?;
    }
    let mut view = View::default();
    view.render(ctl, out).await?;
    writeln!(out, "Type `help` for commands.")?;

    let mut lines = input.lines();
    let mut input_open = true;
    loop {
        tokio::select! {
            line = lines.next_line(), if input_open => match line? {
                Some(line) => match parse_line(&line, ctl.state().is_confirming_exit()) {
                    Ok(Some(SessionCommand::Intent(intent))) => {
                        if ctl.handle_intent(intent).await == Flow::Quit {
                            view.flush(ctl, &mut channels.ui, out).await?;
                            break;
                        }
                    }
                    Ok(Some(SessionCommand::Show(id))) => view.show(ctl, id, out).await?,
                    Ok(Some(SessionCommand::List)) => view.render(ctl, out).await?,
                    Ok(Some(SessionCommand::Help)) => writeln!(out, "{HELP}")?,
                    Ok(None) => {}
                    Err(msg) => writeln!(out, "{msg}")?,
                },
                None => {
                    input_open = false;
                    if ctl.state().active().is_some() {
                        writeln!(out, "Input closed; waiting for the active download to finish.")?;
                    }
                }
            },
            Some(event) = channels.downloads.recv() => {
                ctl.on_download_event(event).await;
            }
        }
        view.flush(ctl, &mut channels.ui, out).await?;
        if !input_open && ctl.state().active().is_none() {
            break;
        }
    }
    out.flush()?;
    Ok(())
}

/// Turns controller events into terminal output.
#[derive(Debug, Default)]
struct View {
    /// Last whole percent printed per job, to keep progress output readable.
    last_percent: Option<(JobId, i64)>,
}

impl View {
    async fn flush<S, R, N, W>(
        &mut self,
        ctl: &Controller<S, R, N>,
        ui: &mut mpsc::UnboundedReceiver<UiEvent>,
        out: &mut W,
    ) -> Result<()>
    where
        S: JobStore,
        R: ProcessRunner,
        N: Notifier,
        W: Write,
    {
        let mut changed = false;
        while let Ok(event) = ui.try_recv() {
            match event {
                UiEvent::StateChanged => changed = true,
                UiEvent::Progress { job_id, percent } => {
                    let whole = percent.floor() as i64;
                    if self.last_percent != Some((job_id, whole)) {
                        self.last_percent = Some((job_id, whole));
                        writeln!(out, "  [{job_id}] {percent:5.1}%")?;
                    }
                }
                UiEvent::Completed(job) => writeln!(out, "Finished: {}", job.output_name)?,
                UiEvent::Failed { job, reason } => {
                    writeln!(out, "{} failed: {}", job_title(&job), reason)?
                }
                UiEvent::Message(msg) => writeln!(out, "error: {msg}")?,
            }
        }
        if changed {
            self.render(ctl, out).await?;
        }
        Ok(())
    }

    async fn render<S, R, N, W>(&self, ctl: &Controller<S, R, N>, out: &mut W) -> Result<()>
    where
        S: JobStore,
        R: ProcessRunner,
        N: Notifier,
        W: Write,
    {
        match ctl.dashboard().await {
            Ok(dash) => write_dashboard(&dash, ctl.state(), out)?,
            Err(e) => writeln!(out, "error: could not read jobs: {e}")?,
        }
        Ok(())
    }

    async fn show<S, R, N, W>(&self, ctl: &Controller<S, R, N>, id: JobId, out: &mut W) -> Result<()>
    where
        S: JobStore,
        R: ProcessRunner,
        N: Notifier,
        W: Write,
    {
        let dash = match ctl.dashboard().await {
            Ok(dash) => dash,
            Err(e) => {
                writeln!(out, "error: could not read jobs: {e}")?;
                return Ok(());
            }
        };
        let job = JobStatus::ALL
            .iter()
            .flat_map(|status| dash.partition(*status))
            .find(|job| job.id == id);
        match job {
            Some(job) => {
                writeln!(out, "[{}] {}", job.id, job_title(job))?;
                for line in job_details(job) {
                    writeln!(out, "    {line}")?;
                }
            }
            None => writeln!(out, "no job with id {id}")?,
        }
        Ok(())
    }
}

pub(crate) fn write_dashboard<W: Write>(
    dash: &Dashboard,
    state: &ControllerState,
    out: &mut W,
) -> std::io::Result<()> {
    for (heading, status) in [
        ("Queued", JobStatus::Queued),
        ("Downloading", JobStatus::Downloading),
        ("Completed", JobStatus::Completed),
        ("Failed", JobStatus::Error),
    ] {
        let jobs = dash.partition(status);
        writeln!(out, "{heading} ({})", jobs.len())?;
        for job in jobs {
            match dash.percent_for(job) {
                Some(percent) => writeln!(out, "  [{}] {}  {percent:.1}%", job.id, job_title(job))?,
                None => writeln!(out, "  [{}] {}", job.id, job_title(job))?,
            }
        }
    }

    if let ControllerState::ExitConfirm { choice, .. } = state {
        let (abort, resume) = match choice {
            ExitChoice::AbortAndQuit => ("[Yes, abort]", " No "),
            ExitChoice::Resume => (" Yes, abort ", "[No]"),
        };
        writeln!(out, "A download is still running. Quit anyway?")?;
        writeln!(out, "  {abort}  {resume}")?;
    }
    Ok(())
}
