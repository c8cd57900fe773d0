//! SimWorld - The playback harness container.

use crate::context::SimContext;
use crate::script::CommandScript;

use missionview_core::validation::PlaybackAudit;
use missionview_core::{AuditReport, Frame, MissionConfig, PlaybackSession, SessionEvent};
use missionview_env::{CommandSource, MissionContext, PlaybackCommand};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for a simulation run.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Master seed for determinism
    pub seed: u64,

    /// Frame rate in Hz when no jitter is configured
    pub frame_rate_hz: u32,

    /// `Some((min_ms, max_ms))` draws each frame interval from the seeded RNG
    pub jitter_ms: Option<(u64, u64)>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            frame_rate_hz: 30,
            jitter_ms: None,
        }
    }
}

/// Result of one world tick.
#[derive(Debug, Clone)]
pub struct TickOutcome {
    /// Virtual time the frame was computed for
    pub now: Duration,
    pub events: Vec<(PlaybackCommand, SessionEvent)>,
    pub frame: Frame,
}

/// The SimWorld - one playback session on a virtual clock.
pub struct SimWorld {
    /// Configuration
    pub config: SimConfig,

    /// Shared simulation context (virtual clock)
    pub context: Arc<SimContext>,

    session: PlaybackSession,
    script: CommandScript,
    audit: PlaybackAudit,

    /// Current tick count
    tick_count: u64,

    /// Virtual time at which the clock first reported completion
    completed_at: Option<Duration>,
}

impl SimWorld {
    /// Creates a new SimWorld with the given configuration.
    pub fn new(config: SimConfig, mission: MissionConfig, script: CommandScript) -> Self {
        let context = SimContext::shared(config.seed);
        let session = PlaybackSession::new(mission);
        let audit = PlaybackAudit::for_session(&session);

        Self {
            config,
            context,
            session,
            script,
            audit,
            tick_count: 0,
            completed_at: None,
        }
    }

    /// Advances the simulation by one frame.
    ///
    /// Commands due at the current virtual time are applied first, then the
    /// frame for that instant is computed and audited, then the clock moves
    /// on by one frame interval.
    pub fn tick(&mut self) -> TickOutcome {
        let now = self.context.now();

        let mut events = Vec::new();
        loop {
            match self.script.try_next(now) {
                Ok(Some(command)) => {
                    let event = self.session.handle(command, now);
                    if matches!(event, SessionEvent::Started | SessionEvent::Reset) {
                        self.audit.begin_segment();
                    }
                    if event == SessionEvent::Reset {
                        self.completed_at = None;
                    }
                    events.push((command, event));
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("Command script failed: {}", e);
                    break;
                }
            }
        }

        let frame = self.session.tick(now).clone();
        self.audit.record(&frame);

        if self.completed_at.is_none() && self.session.clock().is_complete() {
            debug!("Clock complete at virtual {:.3}s", now.as_secs_f64());
            self.completed_at = Some(now);
        }

        self.context.advance_time(self.next_interval());
        self.tick_count += 1;

        TickOutcome { now, events, frame }
    }

    fn next_interval(&self) -> Duration {
        match self.config.jitter_ms {
            Some((min_ms, max_ms)) => self.context.jittered_interval(min_ms, max_ms),
            None => Duration::from_secs_f64(1.0 / self.config.frame_rate_hz.max(1) as f64),
        }
    }

    /// Ticks until virtual time passes `until_secs`. Returns the last outcome.
    pub fn run_until(&mut self, until_secs: f64) -> Option<TickOutcome> {
        let mut last = None;
        while self.time() <= until_secs {
            last = Some(self.tick());
        }
        last
    }

    /// Returns the current simulation time in seconds.
    pub fn time(&self) -> f64 {
        self.context.now().as_secs_f64()
    }

    /// Returns the current tick count.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    pub fn script(&self) -> &CommandScript {
        &self.script
    }

    pub fn completed_at(&self) -> Option<Duration> {
        self.completed_at
    }

    pub fn audit_report(&self) -> AuditReport {
        self.audit.report()
    }
}
