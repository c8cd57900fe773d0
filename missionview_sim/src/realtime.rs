//! Real-time playback loop.
//!
//! Drives a `PlaybackSession` from any `MissionContext`: the tokio clock for
//! live runs, or the virtual clock in tests. With the `dashboard` feature the
//! frames go to the terminal UI over a crossbeam channel and key presses come
//! back on another; closing the UI drops both channels and ends the loop.

use missionview_core::{Frame, MissionConfig, PlaybackSession};
use missionview_env::{CommandSource, MissionContext};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Completed,
    CommandsClosed,
    SinkClosed,
    Deadline,
}

/// Pacing and stop conditions for a real-time run.
#[derive(Debug, Clone, Copy)]
pub struct RealtimeOptions {
    pub frame_rate_hz: u32,

    /// Stop as soon as the mission clock completes
    pub stop_on_complete: bool,

    /// Hard stop on context time, in seconds
    pub deadline_secs: Option<f64>,
}

impl Default for RealtimeOptions {
    fn default() -> Self {
        Self {
            frame_rate_hz: 30,
            stop_on_complete: true,
            deadline_secs: None,
        }
    }
}

impl RealtimeOptions {
    pub fn frame_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.frame_rate_hz.max(1) as f64)
    }
}

#[derive(Debug, Clone)]
pub struct RealtimeSummary {
    pub frames: u64,
    pub stop: StopReason,
    pub final_frame: Frame,
}

/// Runs the tick loop until a stop condition fires.
///
/// `sink` receives every frame and returns false once its consumer is gone.
pub async fn run_realtime<C, S, F>(
    ctx: &C,
    mission: MissionConfig,
    source: &mut S,
    options: RealtimeOptions,
    mut sink: F,
) -> RealtimeSummary
where
    C: MissionContext,
    S: CommandSource,
    F: FnMut(&Frame) -> bool,
{
    let mut session = PlaybackSession::new(mission);
    let period = options.frame_period();
    let started = ctx.now();
    let mut frames = 0u64;

    info!("⏱ Real-time playback at {} Hz", options.frame_rate_hz.max(1));

    let stop = 'ticks: loop {
        let now = ctx.now().saturating_sub(started);

        loop {
            match source.try_next(now) {
                Ok(Some(command)) => {
                    session.handle(command, now);
                }
                Ok(None) => break,
                Err(e) => {
                    debug!("Command source closed: {}", e);
                    break 'ticks StopReason::CommandsClosed;
                }
            }
        }

        let frame = session.tick(now);
        frames += 1;
        if !sink(frame) {
            break StopReason::SinkClosed;
        }
        if options.stop_on_complete && session.clock().is_complete() {
            break StopReason::Completed;
        }
        if options.deadline_secs.is_some_and(|d| now.as_secs_f64() >= d) {
            break StopReason::Deadline;
        }

        ctx.sleep(period).await;
    };

    info!("Real-time playback stopped ({:?}) after {} frames", stop, frames);
    RealtimeSummary {
        frames,
        stop,
        final_frame: session.frame().clone(),
    }
}

// =============================================================================
// DASHBOARD
// =============================================================================

/// Key presses forwarded from the dashboard thread.
#[cfg(feature = "dashboard")]
pub struct DashboardCommands(pub crossbeam::channel::Receiver<missionview_env::PlaybackCommand>);

#[cfg(feature = "dashboard")]
impl CommandSource for DashboardCommands {
    fn try_next(
        &mut self,
        _now: Duration,
    ) -> Result<Option<missionview_env::PlaybackCommand>, missionview_env::EnvError> {
        use crossbeam::channel::TryRecvError;
        match self.0.try_recv() {
            Ok(command) => Ok(Some(command)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(missionview_env::EnvError::closed("dashboard")),
        }
    }
}

/// Plays `mission` on the tokio clock inside the terminal dashboard.
#[cfg(feature = "dashboard")]
pub async fn run_with_dashboard(mission: MissionConfig, frame_rate_hz: u32) -> anyhow::Result<RealtimeSummary> {
    use anyhow::Context;
    use crossbeam::channel::{self, TrySendError};
    use missionview_core::dashboard::MissionDashboard;
    use missionview_env::TokioContext;

    let (frame_tx, frame_rx) = channel::bounded(64);
    let (cmd_tx, cmd_rx) = channel::unbounded();
    let table = mission.phases.clone();

    let ui = std::thread::spawn(move || MissionDashboard::new(frame_rx, cmd_tx, table).run());

    let ctx = TokioContext::new();
    let mut source = DashboardCommands(cmd_rx);
    let options = RealtimeOptions {
        frame_rate_hz,
        stop_on_complete: false,
        deadline_secs: None,
    };
    let summary = run_realtime(&ctx, mission, &mut source, options, |frame| {
        // A full channel means the UI is behind; drop the frame.
        !matches!(frame_tx.try_send(frame.clone()), Err(TrySendError::Disconnected(_)))
    })
    .await;
    drop(frame_tx);

    ui.join()
        .map_err(|_| anyhow::anyhow!("dashboard thread panicked"))?
        .context("terminal dashboard failed")?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SimContext;
    use crate::script::CommandScript;
    use missionview_env::{EnvError, NoCommands, PlaybackCommand};

    struct ClosesAfter(usize);

    impl CommandSource for ClosesAfter {
        fn try_next(&mut self, _now: Duration) -> Result<Option<PlaybackCommand>, EnvError> {
            if self.0 == 0 {
                return Err(EnvError::closed("test"));
            }
            self.0 -= 1;
            Ok(Some(PlaybackCommand::Play))
        }
    }

    #[tokio::test]
    async fn test_runs_to_completion_on_virtual_clock() {
        let ctx = SimContext::new(1);
        let mut script = CommandScript::play_at_start();
        let summary = run_realtime(&ctx, MissionConfig::default(), &mut script, RealtimeOptions::default(), |_| true).await;

        assert_eq!(summary.stop, StopReason::Completed);
        assert!(summary.final_frame.telemetry.mission_complete);
        assert_eq!(summary.final_frame.elapsed_secs, 54.0);
        assert!(summary.frames >= 54 * 30);
        assert!(ctx.now() >= Duration::from_secs(54));
    }

    #[tokio::test]
    async fn test_stops_when_commands_close() {
        let ctx = SimContext::new(2);
        let mut source = ClosesAfter(1);
        let summary = run_realtime(&ctx, MissionConfig::default(), &mut source, RealtimeOptions::default(), |_| true).await;

        assert_eq!(summary.stop, StopReason::CommandsClosed);
        assert_eq!(summary.frames, 0);
    }

    #[tokio::test]
    async fn test_stops_when_sink_closes() {
        let ctx = SimContext::new(3);
        let mut script = CommandScript::play_at_start();
        let mut remaining = 10;
        let summary = run_realtime(&ctx, MissionConfig::default(), &mut script, RealtimeOptions::default(), |_| {
            remaining -= 1;
            remaining > 0
        })
        .await;

        assert_eq!(summary.stop, StopReason::SinkClosed);
        assert_eq!(summary.frames, 10);
    }

    #[tokio::test]
    async fn test_idle_session_honours_deadline() {
        let ctx = SimContext::new(4);
        let options = RealtimeOptions {
            frame_rate_hz: 10,
            stop_on_complete: true,
            deadline_secs: Some(1.0),
        };
        let summary = run_realtime(&ctx, MissionConfig::default(), &mut NoCommands, options, |_| true).await;

        assert_eq!(summary.stop, StopReason::Deadline);
        assert_eq!(summary.final_frame.elapsed_secs, 0.0);
    }

    #[cfg(feature = "dashboard")]
    #[test]
    fn test_dashboard_commands_report_disconnect() {
        let (tx, rx) = crossbeam::channel::unbounded();
        let mut source = DashboardCommands(rx);
        tx.send(PlaybackCommand::Toggle).expect("open channel");
        assert_eq!(source.try_next(Duration::ZERO).ok().flatten(), Some(PlaybackCommand::Toggle));
        assert!(matches!(source.try_next(Duration::ZERO), Ok(None)));
        drop(tx);
        assert!(matches!(source.try_next(Duration::ZERO), Err(EnvError::ChannelClosed(_))));
    }
}
