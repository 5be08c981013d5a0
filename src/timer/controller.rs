use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

use super::{
    engine::{TickOutcome, TimerEngine},
    error::TimerError,
    format::format_time,
    state::{RunStatus, TimerSnapshot},
};

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

const HEARTBEAT_PERIOD: Duration = Duration::from_secs(60);
const DEBUG_HEARTBEAT_PERIOD: Duration = Duration::from_secs(1);

/// Ticks between heartbeat log lines: about once a minute, or once a second
/// in debug mode. Never less than every tick.
fn heartbeat_every_ticks(tick_interval: Duration, debug_mode: bool) -> u32 {
    let period = if debug_mode {
        DEBUG_HEARTBEAT_PERIOD
    } else {
        HEARTBEAT_PERIOD
    };
    let ticks = period.as_millis() / tick_interval.as_millis().max(1);
    u32::try_from(ticks).unwrap_or(u32::MAX).max(1)
}

struct Ticker {
    handle: JoinHandle<()>,
    cancel_token: CancellationToken,
}

/// Shared handle over the engine plus the periodic driver that ticks it.
///
/// Lock order is engine, then ticker. The driver only ever takes the engine
/// lock, and re-checks its cancellation token after acquiring it, so no tick
/// lands once pause/stop/reset has returned.
#[derive(Clone)]
pub struct TimerController {
    engine: Arc<Mutex<TimerEngine>>,
    ticker: Arc<Mutex<Option<Ticker>>>,
    snapshots: Arc<watch::Sender<TimerSnapshot>>,
    tick_interval: Duration,
    heartbeat_every_ticks: u32,
}

impl TimerController {
    pub fn new(engine: TimerEngine, tick_interval: Duration) -> Self {
        let debug_mode = std::env::var("RINGFOCUS_DEBUG")
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let (snapshots, _) = watch::channel(engine.snapshot());

        Self {
            engine: Arc::new(Mutex::new(engine)),
            ticker: Arc::new(Mutex::new(None)),
            snapshots: Arc::new(snapshots),
            tick_interval,
            heartbeat_every_ticks: heartbeat_every_ticks(tick_interval, debug_mode),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.snapshots.subscribe()
    }

    pub async fn get_snapshot(&self) -> TimerSnapshot {
        self.engine.lock().await.snapshot()
    }

    pub async fn status(&self) -> RunStatus {
        self.engine.lock().await.status()
    }

    pub async fn start(&self, minutes: u32) -> Result<TimerSnapshot, TimerError> {
        let mut engine = self.engine.lock().await;
        engine.start(minutes)?;
        // Render segment 0 straight away instead of waiting for the first tick.
        engine.tick();
        self.spawn_ticker().await;
        Ok(self.publish(&engine))
    }

    pub async fn pause(&self) -> bool {
        let mut engine = self.engine.lock().await;
        let changed = engine.pause();
        if changed {
            self.cancel_ticker().await;
            self.publish(&engine);
        }
        changed
    }

    pub async fn resume(&self) -> bool {
        let mut engine = self.engine.lock().await;
        let changed = engine.resume();
        if changed {
            self.spawn_ticker().await;
            self.publish(&engine);
        }
        changed
    }

    pub async fn stop(&self) {
        let mut engine = self.engine.lock().await;
        self.cancel_ticker().await;
        engine.stop();
        self.publish(&engine);
    }

    pub async fn reset(&self) {
        let mut engine = self.engine.lock().await;
        self.cancel_ticker().await;
        engine.reset();
        self.publish(&engine);
    }

    /// Stops the driver and drops the completion listener without touching
    /// the run, e.g. when the host goes away.
    pub async fn shutdown(&self) {
        let mut engine = self.engine.lock().await;
        self.cancel_ticker().await;
        if engine.clear_completion_listener().is_some() {
            log_debug!("completion listener released");
        }
    }

    async fn spawn_ticker(&self) {
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(previous) = ticker_guard.take() {
            previous.cancel_token.cancel();
            previous.handle.abort();
        }

        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(tick_loop(
            self.engine.clone(),
            self.snapshots.clone(),
            cancel_token.clone(),
            self.tick_interval,
            self.heartbeat_every_ticks,
        ));

        *ticker_guard = Some(Ticker {
            handle,
            cancel_token,
        });
    }

    async fn cancel_ticker(&self) {
        if let Some(ticker) = self.ticker.lock().await.take() {
            ticker.cancel_token.cancel();
            ticker.handle.abort();
        }
    }

    fn publish(&self, engine: &TimerEngine) -> TimerSnapshot {
        let snapshot = engine.snapshot();
        self.snapshots.send_replace(snapshot.clone());
        snapshot
    }
}

async fn tick_loop(
    engine: Arc<Mutex<TimerEngine>>,
    snapshots: Arc<watch::Sender<TimerSnapshot>>,
    cancel_token: CancellationToken,
    tick_interval: Duration,
    heartbeat_every: u32,
) {
    let mut interval = time::interval(tick_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut ticks: u32 = 0;

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = cancel_token.cancelled() => {
                log_debug!("tick driver cancelled");
                break;
            }
        }

        let (outcome, snapshot) = {
            let mut guard = engine.lock().await;
            if cancel_token.is_cancelled() {
                break;
            }
            let outcome = guard.tick();
            (outcome, guard.snapshot())
        };

        snapshots.send_replace(snapshot.clone());

        match outcome {
            TickOutcome::Skipped => break,
            TickOutcome::Completed => {
                log_info!("tick driver finished: session complete");
                break;
            }
            TickOutcome::Advanced { .. } => {
                ticks = ticks.wrapping_add(1);
                if heartbeat_every > 0 && ticks % heartbeat_every == 0 {
                    log_info!(
                        "heartbeat: segment {} remaining {}",
                        snapshot.current_segment,
                        format_time(snapshot.remaining_ms).display
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::{
        clock::ManualClock,
        engine::testing::RecordingListener,
        feedback::{testing::RecordingFeedback, FeedbackCue},
        segments::SegmentStatus,
    };

    fn controller() -> (TimerController, ManualClock, RecordingListener, RecordingFeedback) {
        let clock = ManualClock::new(1_000_000);
        let listener = RecordingListener::default();
        let feedback = RecordingFeedback::default();
        let mut engine = TimerEngine::new(Arc::new(clock.clone()), Arc::new(feedback.clone()));
        engine.set_completion_listener(Arc::new(listener.clone()));
        (
            TimerController::new(engine, DEFAULT_TICK_INTERVAL),
            clock,
            listener,
            feedback,
        )
    }

    #[test]
    fn test_heartbeat_cadence() {
        assert_eq!(heartbeat_every_ticks(Duration::from_millis(100), true), 10);
        assert_eq!(heartbeat_every_ticks(Duration::from_millis(100), false), 600);
        assert_eq!(heartbeat_every_ticks(Duration::from_millis(250), true), 4);
        assert_eq!(heartbeat_every_ticks(Duration::from_millis(1000), true), 1);
        assert_eq!(heartbeat_every_ticks(Duration::from_millis(1500), true), 1);
        assert_eq!(heartbeat_every_ticks(Duration::from_millis(1500), false), 40);
        assert_eq!(heartbeat_every_ticks(Duration::from_secs(120), false), 1);
        assert_eq!(heartbeat_every_ticks(Duration::ZERO, true), 1000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_advances_segments() {
        let (controller, clock, _, _) = controller();
        let rx = controller.subscribe();

        let snapshot = controller.start(25).await.unwrap();
        assert_eq!(snapshot.status, RunStatus::Running);
        assert_eq!(snapshot.segments[0].status, SegmentStatus::Running);

        clock.advance(130_000);
        time::sleep(Duration::from_millis(250)).await;

        let latest = rx.borrow().clone();
        assert_eq!(latest.current_segment, 1);
        assert_eq!(latest.segments[0].status, SegmentStatus::Completed);
        assert_eq!(latest.elapsed_ms, 130_000);

        controller.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_completes_once_and_exits() {
        let (controller, clock, listener, feedback) = controller();
        let rx = controller.subscribe();

        controller.start(1).await.unwrap();
        clock.advance(60_000);
        time::sleep(Duration::from_millis(250)).await;

        assert_eq!(rx.borrow().status, RunStatus::Completed);
        assert_eq!(rx.borrow().remaining_ms, 0);
        assert_eq!(listener.sessions().len(), 1);
        assert_eq!(listener.sessions()[0].duration_minutes, 1);

        clock.advance(60_000);
        time::sleep(Duration::from_millis(500)).await;
        assert_eq!(listener.sessions().len(), 1);
        assert_eq!(
            feedback.cues().iter().filter(|c| **c == FeedbackCue::Complete).count(),
            1
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_stops_driver() {
        let (controller, clock, listener, _) = controller();
        let rx = controller.subscribe();

        controller.start(1).await.unwrap();
        clock.advance(10_000);
        time::sleep(Duration::from_millis(150)).await;
        assert!(controller.pause().await);
        assert!(!controller.pause().await);

        clock.advance(120_000);
        time::sleep(Duration::from_millis(500)).await;
        assert_eq!(rx.borrow().status, RunStatus::Paused);
        assert_eq!(controller.get_snapshot().await.elapsed_ms, 10_000);
        assert!(listener.sessions().is_empty());

        assert!(controller.resume().await);
        clock.advance(10_000);
        time::sleep(Duration::from_millis(150)).await;
        assert_eq!(rx.borrow().elapsed_ms, 20_000);

        controller.stop().await;
        assert_eq!(rx.borrow().status, RunStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_never_completes() {
        let (controller, clock, listener, _) = controller();
        controller.start(1).await.unwrap();
        controller.stop().await;

        clock.advance(600_000);
        time::sleep(Duration::from_millis(500)).await;
        assert_eq!(controller.status().await, RunStatus::Idle);
        assert!(listener.sessions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_start_leaves_state() {
        let (controller, _, _, _) = controller();
        assert!(controller.start(0).await.is_err());
        assert_eq!(controller.status().await, RunStatus::Idle);
        controller.shutdown().await;
    }
}
