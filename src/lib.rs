mod completion;
mod db;
mod host;
mod settings;
pub mod timer;
mod utils;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use log::{info, warn};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    task::JoinHandle,
};

pub use completion::{CompletionRecorder, CompletionReport};
pub use db::{Database, RewardGrant, StudySession};
pub use host::HostCommand;
pub use settings::{SettingsStore, TimerSettings};
pub use utils::logging::init_logging;

use completion::spawn_completion_worker;
use host::{handle_command, render_status, HELP};
use timer::{
    FeedbackSink, LogFeedback, RunStatus, SilentFeedback, SystemClock, TimerController,
    TimerEngine,
};

pub struct AppState {
    pub db: Database,
    pub timer: TimerController,
    pub settings: SettingsStore,
    pub completion_worker: JoinHandle<()>,
}

impl AppState {
    /// Stops the timer driver, then waits for the completion worker to write
    /// out every session already queued. The worker ends once the engine has
    /// dropped the last recorder.
    pub async fn shutdown(self) -> Result<()> {
        self.timer.shutdown().await;
        self.completion_worker
            .await
            .context("completion worker failed to join")
    }
}

fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("RINGFOCUS_DATA_DIR") {
        return PathBuf::from(dir);
    }
    std::env::var("HOME")
        .map(|home| PathBuf::from(home).join(".ringfocus"))
        .unwrap_or_else(|_| PathBuf::from(".ringfocus"))
}

/// Wires settings, storage, the completion worker and the timer.
pub fn build_app(data_dir: PathBuf) -> Result<AppState> {
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("failed to create data dir {}", data_dir.display()))?;

    let settings = SettingsStore::new(data_dir.join("settings.json"))?;
    let timer_settings = settings.timer();

    let db = Database::new(data_dir.join("ringfocus.sqlite3"))?;
    let (recorder, completion_worker) =
        spawn_completion_worker(db.clone(), timer_settings.reward_per_minute, None);

    let feedback: Arc<dyn FeedbackSink> = if timer_settings.haptics_enabled {
        Arc::new(LogFeedback)
    } else {
        Arc::new(SilentFeedback)
    };

    let mut engine = TimerEngine::new(Arc::new(SystemClock), feedback);
    engine.set_completion_listener(Arc::new(recorder));

    Ok(AppState {
        db,
        timer: TimerController::new(engine, timer_settings.tick_interval()),
        settings,
        completion_worker,
    })
}

/// Console host: reads commands from stdin until `quit` or EOF.
pub async fn run() -> Result<()> {
    init_logging();
    info!("RingFocus starting up...");

    let state = build_app(data_dir())?;
    // A run never survives a restart.
    state.timer.reset().await;

    let mut updates = state.timer.subscribe();
    let printer = tokio::spawn(async move {
        let mut last_segment = None;
        while updates.changed().await.is_ok() {
            let snapshot = updates.borrow_and_update().clone();
            let key = (snapshot.status, snapshot.current_segment);
            if last_segment != Some(key) {
                last_segment = Some(key);
                if matches!(snapshot.status, RunStatus::Running | RunStatus::Completed) {
                    println!("{}", render_status(&snapshot));
                }
            }
        }
    });

    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let command = match line.parse::<HostCommand>() {
            Ok(command) => command,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };

        match handle_command(&state, command).await {
            Ok(output) => println!("{output}"),
            Err(err) => {
                warn!("command {:?} failed: {err:#}", command);
                println!("error: {err:#}");
            }
        }

        if command == HostCommand::Quit {
            break;
        }
    }

    printer.abort();
    state.shutdown().await?;
    info!("RingFocus shutting down");
    Ok(())
}
