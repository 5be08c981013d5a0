//! Text command surface for driving the timer from a console.

use std::{fmt::Write as _, str::FromStr};

use anyhow::{anyhow, bail, Context, Error, Result};

use crate::{
    timer::{format_time, RunStatus, SegmentStatus, TimerSnapshot},
    AppState,
};

const HISTORY_LIMIT: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCommand {
    /// `None` falls back to the configured default.
    Start(Option<u32>),
    Pause,
    Resume,
    Stop,
    Reset,
    Status,
    History,
    Balance,
    Help,
    Quit,
}

impl FromStr for HostCommand {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        let mut parts = input.split_whitespace();
        let verb = parts
            .next()
            .ok_or_else(|| anyhow!("empty command"))?
            .to_ascii_lowercase();

        let command = match verb.as_str() {
            "start" => {
                let minutes = parts
                    .next()
                    .map(|raw| {
                        raw.parse::<u32>()
                            .with_context(|| format!("invalid minutes '{raw}'"))
                    })
                    .transpose()?;
                HostCommand::Start(minutes)
            }
            "pause" => HostCommand::Pause,
            "resume" => HostCommand::Resume,
            "stop" => HostCommand::Stop,
            "reset" => HostCommand::Reset,
            "status" => HostCommand::Status,
            "history" => HostCommand::History,
            "balance" => HostCommand::Balance,
            "help" | "?" => HostCommand::Help,
            "quit" | "exit" => HostCommand::Quit,
            other => bail!("unknown command '{other}'"),
        };

        if let Some(extra) = parts.next() {
            bail!("unexpected argument '{extra}'");
        }
        Ok(command)
    }
}

pub const HELP: &str = "commands: start [minutes] | pause | resume | stop | reset | status | history | balance | quit";

/// One-line ring: `#` finished, `>` current, `.` pending.
pub fn render_ring(snapshot: &TimerSnapshot) -> String {
    snapshot
        .segments
        .iter()
        .map(|segment| match segment.status {
            SegmentStatus::Completed => '#',
            SegmentStatus::Running => '>',
            SegmentStatus::Idle => '.',
        })
        .collect()
}

pub fn render_status(snapshot: &TimerSnapshot) -> String {
    let status = match snapshot.status {
        RunStatus::Idle => "idle",
        RunStatus::Running => "running",
        RunStatus::Paused => "paused",
        RunStatus::Completed => "completed",
    };

    if snapshot.status == RunStatus::Idle {
        return format!("[{status}] 00:00");
    }

    let current_progress = snapshot
        .segments
        .get(snapshot.current_segment)
        .map(|segment| segment.progress)
        .unwrap_or(0.0);

    format!(
        "[{status}] {} left of {} min  [{}]  segment {}/{} {:.0}%",
        format_time(snapshot.remaining_ms).display,
        snapshot.total_minutes,
        render_ring(snapshot),
        snapshot.current_segment + 1,
        snapshot.segments.len(),
        current_progress
    )
}

pub async fn handle_command(state: &AppState, command: HostCommand) -> Result<String> {
    let timer = &state.timer;
    let output = match command {
        HostCommand::Start(minutes) => {
            let minutes = minutes.unwrap_or_else(|| state.settings.timer().default_minutes);
            let snapshot = timer.start(minutes).await?;
            render_status(&snapshot)
        }
        HostCommand::Pause => {
            if !timer.pause().await {
                return Ok("nothing to pause".into());
            }
            render_status(&timer.get_snapshot().await)
        }
        HostCommand::Resume => {
            if !timer.resume().await {
                return Ok("nothing to resume".into());
            }
            render_status(&timer.get_snapshot().await)
        }
        HostCommand::Stop => {
            timer.stop().await;
            "stopped".into()
        }
        HostCommand::Reset => {
            timer.reset().await;
            "reset".into()
        }
        HostCommand::Status => render_status(&timer.get_snapshot().await),
        HostCommand::History => {
            let sessions = state.db.list_study_sessions(HISTORY_LIMIT).await?;
            if sessions.is_empty() {
                return Ok("no sessions yet".into());
            }
            let mut out = String::new();
            for session in sessions {
                let _ = writeln!(
                    out,
                    "{}  {} min  ({})",
                    session.end_time.format("%Y-%m-%d %H:%M"),
                    session.duration_minutes,
                    session.kind
                );
            }
            let total = state.db.total_focus_minutes().await?;
            let _ = write!(out, "total focus: {total} min");
            out
        }
        HostCommand::Balance => format!("balance: {}", state.db.reward_balance().await?),
        HostCommand::Help => HELP.into(),
        HostCommand::Quit => "bye".into(),
    };
    Ok(output)
}
