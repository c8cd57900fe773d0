//! Rerun visualization for playback runs.
//!
//! Visualization is optional and only available with the `visualization` feature.
//!
//! # What Gets Logged
//!
//! - Drone position, tinted with the current phase color
//! - Chase camera position and its look-at target
//! - Drone trail so far
//! - Altitude, speed and battery as scalar timelines
//! - Phase transitions and session commands as text logs

use crate::world::TickOutcome;
use std::collections::VecDeque;
#[cfg(feature = "visualization")]
use rerun::{Color, Points3D, Position3D, Radius, RecordingStream};

/// Trail points kept for the drone path.
const TRAIL_LEN: usize = 600;

/// Rerun logger for playback visualization.
pub struct RerunLogger {
    #[cfg(feature = "visualization")]
    rec: Option<RecordingStream>,

    /// Whether visualization is enabled
    enabled: bool,

    last_phase: Option<usize>,
    trail: VecDeque<[f32; 3]>,
}

impl RerunLogger {
    /// Creates a new logger with visualization disabled.
    pub fn disabled() -> Self {
        Self {
            #[cfg(feature = "visualization")]
            rec: None,
            enabled: false,
            last_phase: None,
            trail: VecDeque::with_capacity(TRAIL_LEN),
        }
    }

    /// Creates a new logger with visualization enabled.
    #[cfg(feature = "visualization")]
    pub fn new(name: &str) -> Self {
        match rerun::RecordingStreamBuilder::new(name).spawn() {
            Ok(rec) => {
                tracing::info!("Rerun visualization enabled - open Rerun Viewer to follow the sortie");
                Self {
                    rec: Some(rec),
                    enabled: true,
                    ..Self::disabled()
                }
            }
            Err(e) => {
                tracing::warn!("Failed to initialize Rerun: {:?}", e);
                Self::disabled()
            }
        }
    }

    /// Creates a logger - returns disabled if visualization feature not enabled.
    #[cfg(not(feature = "visualization"))]
    pub fn new(_name: &str) -> Self {
        tracing::info!("Rerun visualization not available (compile with --features visualization)");
        Self::disabled()
    }

    /// Returns whether visualization is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Logs one tick: scene entities, scalars and any commands.
    pub fn log_outcome(&mut self, outcome: &TickOutcome) {
        let frame = &outcome.frame;
        let p = frame.scene.drone.position;
        let point = [p.x as f32, p.y as f32, p.z as f32];
        if self.trail.back() != Some(&point) {
            if self.trail.len() == TRAIL_LEN {
                self.trail.pop_front();
            }
            self.trail.push_back(point);
        }

        if self.last_phase != Some(frame.cursor.phase_index) {
            self.last_phase = Some(frame.cursor.phase_index);
            self.log_event(
                "events/phase",
                &format!("phase {} '{}' at {:.2}s", frame.cursor.phase_index, frame.current_phase_name, frame.elapsed_secs),
            );
        }
        for (command, event) in &outcome.events {
            self.log_event("events/session", &format!("{} -> {:?}", command, event));
        }

        if !self.enabled {
            return;
        }
        self.set_time(outcome.now.as_secs_f64());
        self.log_scene(outcome);
        self.log_scalar("telemetry/altitude", frame.telemetry.altitude);
        self.log_scalar("telemetry/speed", frame.telemetry.speed);
        self.log_scalar("telemetry/battery", frame.telemetry.battery_percent);
    }

    /// Sets the virtual time for subsequent logs.
    #[cfg(feature = "visualization")]
    pub fn set_time(&self, seconds: f64) {
        if let Some(ref rec) = self.rec {
            rec.set_time_seconds("sim_time", seconds);
        }
    }

    #[cfg(not(feature = "visualization"))]
    pub fn set_time(&self, _seconds: f64) {}

    #[cfg(feature = "visualization")]
    fn log_scene(&self, outcome: &TickOutcome) {
        let Some(ref rec) = self.rec else { return };
        let scene = &outcome.frame.scene;
        let tint = scene.tint;
        let d = scene.drone.position;
        let c = scene.camera.position;
        let t = scene.camera.target;

        let _ = rec.log(
            "world/drone",
            &Points3D::new([Position3D::new(d.x as f32, d.y as f32, d.z as f32)])
                .with_colors([Color::from_rgb(tint.r, tint.g, tint.b)])
                .with_radii([Radius::new_scene_units(2.0)]),
        );
        let _ = rec.log(
            "world/camera",
            &Points3D::new([
                Position3D::new(c.x as f32, c.y as f32, c.z as f32),
                Position3D::new(t.x as f32, t.y as f32, t.z as f32),
            ])
            .with_colors([Color::from_rgb(200, 200, 200), Color::from_rgb(255, 255, 0)])
            .with_radii([Radius::new_scene_units(1.0)]),
        );
        let _ = rec.log(
            "world/trail",
            &Points3D::new(self.trail.iter().map(|p| Position3D::new(p[0], p[1], p[2])))
                .with_colors([Color::from_rgb(100, 100, 255)])
                .with_radii([Radius::new_scene_units(0.4)]),
        );
    }

    #[cfg(not(feature = "visualization"))]
    fn log_scene(&self, _outcome: &TickOutcome) {}

    /// Logs a text annotation (e.g., a phase change).
    #[cfg(feature = "visualization")]
    pub fn log_event(&self, path: &str, message: &str) {
        if let Some(ref rec) = self.rec {
            let _ = rec.log(path, &rerun::TextLog::new(message));
        }
    }

    #[cfg(not(feature = "visualization"))]
    pub fn log_event(&self, _path: &str, _message: &str) {}

    #[cfg(feature = "visualization")]
    fn log_scalar(&self, path: &str, value: f64) {
        if let Some(ref rec) = self.rec {
            let _ = rec.log(path, &rerun::Scalar::new(value));
        }
    }

    #[cfg(not(feature = "visualization"))]
    fn log_scalar(&self, _path: &str, _value: f64) {}

    pub fn trail_len(&self) -> usize {
        self.trail.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::CommandScript;
    use crate::world::{SimConfig, SimWorld};
    use missionview_core::MissionConfig;

    #[test]
    fn test_disabled_logger() {
        let mut logger = RerunLogger::disabled();
        assert!(!logger.is_enabled());

        // These should be no-ops apart from trail bookkeeping
        let mut world = SimWorld::new(SimConfig::default(), MissionConfig::default(), CommandScript::play_at_start());
        for _ in 0..5 {
            logger.log_outcome(&world.tick());
        }
        logger.set_time(1.0);
        assert_eq!(logger.trail_len(), 5);
    }

    #[test]
    fn test_trail_is_bounded() {
        let mut logger = RerunLogger::disabled();
        let mut world = SimWorld::new(SimConfig::default(), MissionConfig::default(), CommandScript::play_at_start());
        for _ in 0..(TRAIL_LEN + 100) {
            logger.log_outcome(&world.tick());
        }
        assert_eq!(logger.trail_len(), TRAIL_LEN);
    }
}
