//! The Mission Timeline Animator
//!
//! [`MissionAnimator::update`] maps elapsed time to a complete [`Frame`]. It
//! is pure: telemetry depends on elapsed time alone, and the previous frame
//! is read only for cosmetic continuity (heading and propeller spin).
//!
//! [`PlaybackSession`] wraps the animator with a [`MissionClock`], applies
//! [`PlaybackCommand`]s and keeps the latest frame.

use crate::config::MissionConfig;
use crate::interpolate::{waypoints, FlightPlan, SpatialState};
use crate::scene::{Projection, SceneTransform};
use crate::telemetry::TelemetrySnapshot;
use crate::timeline::{MissionClock, PhaseCursor, PlaybackState};
use missionview_env::PlaybackCommand;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

// =============================================================================
// FRAME
// =============================================================================

/// Complete output of one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub elapsed_secs: f64,
    pub cursor: PhaseCursor,

    /// Fraction of the mission covered, in `[0, 1]`
    pub mission_progress: f64,

    pub current_phase_name: String,
    pub spatial: SpatialState,
    pub telemetry: TelemetrySnapshot,
    pub scene: SceneTransform,
}

impl Frame {
    pub fn mission_progress_percent(&self) -> f64 {
        self.mission_progress * 100.0
    }

    pub fn phase_index(&self) -> usize {
        self.cursor.phase_index
    }
}

// =============================================================================
// ANIMATOR
// =============================================================================

/// Configuration plus the flight plan derived from it.
#[derive(Debug, Clone)]
pub struct MissionAnimator {
    config: MissionConfig,
    plan: FlightPlan,
}

impl MissionAnimator {
    pub fn new(config: MissionConfig) -> Self {
        let plan = FlightPlan::new(config.phases.clone(), config.landing);
        Self { config, plan }
    }

    pub fn config(&self) -> &MissionConfig {
        &self.config
    }

    pub fn plan(&self) -> &FlightPlan {
        &self.plan
    }

    pub fn total_duration(&self) -> f64 {
        self.plan.table().total_duration()
    }

    /// Frame shown before playback and after a reset.
    pub fn initial_frame(&self) -> Frame {
        let table = self.plan.table();
        let first = table.phase(0);
        let base = waypoints::base_station();

        Frame {
            elapsed_secs: 0.0,
            cursor: PhaseCursor::START,
            mission_progress: 0.0,
            current_phase_name: first.map(|p| p.name.clone()).unwrap_or_default(),
            spatial: SpatialState::at_rest(base),
            telemetry: TelemetrySnapshot::initial(),
            scene: SceneTransform::initial(base, first.map(|p| p.tint).unwrap_or_default()),
        }
    }

    /// Compute the frame at `elapsed_secs`.
    ///
    /// Elapsed time is clamped to `[0, total]`, so any reading past the end
    /// yields the final frame. Calling twice with the same arguments returns
    /// equal frames.
    pub fn update(&self, elapsed_secs: f64, previous: Option<&Frame>) -> Frame {
        let table = self.plan.table();
        let resolved = self.plan.sample(elapsed_secs);
        let t = resolved.elapsed_secs;
        let phase = &table.phases()[resolved.cursor.phase_index];

        let progress = table.mission_progress(t);
        let spatial = resolved.sample.spatial;
        let components = resolved.sample.components;

        let telemetry = TelemetrySnapshot {
            altitude: spatial.altitude,
            speed: spatial.speed,
            distance_traveled: spatial.distance_traveled,
            battery_percent: self.config.battery.percent_at(progress),
            status_label: phase.name.clone(),
            surface_distance: spatial.surface_distance,
            landing_locked: spatial.landing_locked,
            mission_complete: spatial.mission_complete,
            motors: [components.motor; 4],
            battery: self.config.battery.reading_at(progress),
            imu: components.imu,
            gnss: components.gnss,
            camera: components.camera,
            lidar: components.lidar,
            processor: components.processor,
        };

        let scene = match previous {
            Some(prev) => SceneTransform::advance(
                &prev.scene,
                &self.config.camera,
                spatial.position,
                t,
                t - prev.elapsed_secs,
                telemetry.lead_motor().rpm,
                phase.tint,
            ),
            None => {
                let mut scene = SceneTransform::initial(spatial.position, phase.tint);
                scene.camera = self.config.camera.pose(&spatial.position, t);
                scene
            }
        };

        Frame {
            elapsed_secs: t,
            cursor: resolved.cursor,
            mission_progress: progress,
            current_phase_name: phase.name.clone(),
            spatial,
            telemetry,
            scene,
        }
    }
}

/// Convenience for one-off evaluation without building a session.
pub fn update(animator: &MissionAnimator, elapsed_secs: f64, previous: Option<&Frame>) -> Frame {
    animator.update(elapsed_secs, previous)
}

// =============================================================================
// PLAYBACK SESSION
// =============================================================================

/// What a command did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEvent {
    /// Playback started from zero
    Started,
    Resumed,
    Paused,
    Reset,
    Resized,
    /// The command had no effect in the current state
    Ignored,
}

/// The single active playback.
pub struct PlaybackSession {
    animator: MissionAnimator,
    clock: MissionClock,
    projection: Projection,
    frame: Frame,
}

impl PlaybackSession {
    pub fn new(config: MissionConfig) -> Self {
        let animator = MissionAnimator::new(config);
        let clock = MissionClock::new(animator.total_duration());
        let frame = animator.initial_frame();

        Self {
            animator,
            clock,
            projection: Projection::default(),
            frame,
        }
    }

    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    /// Apply a command at context time `now`.
    pub fn handle(&mut self, command: PlaybackCommand, now: Duration) -> SessionEvent {
        let before = self.clock.state();

        let event = match command {
            PlaybackCommand::Play => self.play(now),
            PlaybackCommand::Pause => self.pause(now),
            PlaybackCommand::Toggle => {
                if before == PlaybackState::Playing {
                    self.pause(now)
                } else {
                    self.play(now)
                }
            }
            PlaybackCommand::Reset => {
                self.clock.reset();
                self.frame = self.animator.initial_frame();
                info!("🔄 Mission reset");
                SessionEvent::Reset
            }
            PlaybackCommand::Resize { width, height } => {
                if self.projection.resize(width, height) {
                    debug!("Viewport resized to {}x{}", width, height);
                    SessionEvent::Resized
                } else {
                    SessionEvent::Ignored
                }
            }
        };

        debug!("Command {} in {:?} -> {:?}", command, before, event);
        event
    }

    fn play(&mut self, now: Duration) -> SessionEvent {
        if self.clock.is_playing() {
            return SessionEvent::Ignored;
        }
        if self.clock.play(now) {
            self.frame = self.animator.update(0.0, None);
            info!("🚀 Mission started: {} phases, {:.1}s", self.animator.plan().table().len(), self.clock.total_secs());
            SessionEvent::Started
        } else {
            info!("▶ Resumed at {:.2}s", self.clock.elapsed_secs());
            SessionEvent::Resumed
        }
    }

    fn pause(&mut self, now: Duration) -> SessionEvent {
        if !self.clock.is_playing() {
            return SessionEvent::Ignored;
        }
        self.clock.pause(now);
        self.refresh();
        info!("⏸ Paused at {:.2}s", self.clock.elapsed_secs());
        SessionEvent::Paused
    }

    /// Advance the clock to `now` and recompute the frame.
    ///
    /// Only a playing session moves; otherwise the current frame is returned
    /// unchanged.
    pub fn tick(&mut self, now: Duration) -> &Frame {
        if self.clock.is_playing() {
            self.clock.tick(now);
            self.refresh();
        }
        &self.frame
    }

    fn refresh(&mut self) {
        let previous_phase = self.frame.cursor.phase_index;
        let was_complete = self.frame.telemetry.mission_complete;

        let next = self.animator.update(self.clock.elapsed_secs(), Some(&self.frame));

        if next.cursor.phase_index != previous_phase {
            debug!(
                "Phase {} -> {} '{}' at {:.2}s",
                previous_phase, next.cursor.phase_index, next.current_phase_name, next.elapsed_secs
            );
        }
        if next.telemetry.mission_complete && !was_complete {
            info!("✓ Touchdown confirmed at {:.2}s", next.elapsed_secs);
        }
        if self.clock.is_complete() && self.frame.elapsed_secs < self.clock.total_secs() {
            info!(
                "🏁 Mission complete: {:.1}m traveled, battery {:.1}%",
                next.telemetry.distance_traveled, next.telemetry.battery_percent
            );
        }

        self.frame = next;
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn clock(&self) -> &MissionClock {
        &self.clock
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn config(&self) -> &MissionConfig {
        self.animator.config()
    }

    pub fn animator(&self) -> &MissionAnimator {
        &self.animator
    }
}
