//! JSON exporter for offline inspection of a playback.
//!
//! Exports frames as JSON so a run can be plotted or diffed after the fact.

use crate::runner::ScenarioResult;
use crate::world::TickOutcome;

use missionview_core::{AuditReport, TelemetrySnapshot};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// A point in scene space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl From<Vector3<f64>> for Position {
    fn from(v: Vector3<f64>) -> Self {
        Self { x: v.x, y: v.y, z: v.z }
    }
}

/// A single frame of playback data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimFrame {
    /// Virtual time in seconds
    pub time_sec: f64,

    /// Mission elapsed time in seconds
    pub elapsed_sec: f64,

    pub phase_index: usize,
    pub phase_name: String,
    pub phase_progress: f64,
    pub mission_progress: f64,

    pub drone: Position,
    pub drone_yaw_rad: f64,
    pub camera: Position,
    pub camera_target: Position,
    pub propeller_angle_rad: f64,

    pub telemetry: TelemetrySnapshot,

    /// Commands applied before this frame
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub events: Vec<SimEvent>,
}

impl SimFrame {
    pub fn from_outcome(outcome: &TickOutcome) -> Self {
        let frame = &outcome.frame;
        Self {
            time_sec: outcome.now.as_secs_f64(),
            elapsed_sec: frame.elapsed_secs,
            phase_index: frame.cursor.phase_index,
            phase_name: frame.current_phase_name.clone(),
            phase_progress: frame.cursor.local_progress,
            mission_progress: frame.mission_progress,
            drone: frame.scene.drone.position.into(),
            drone_yaw_rad: frame.scene.drone.yaw_rad,
            camera: frame.scene.camera.position.into(),
            camera_target: frame.scene.camera.target.into(),
            propeller_angle_rad: frame.scene.propeller_angle_rad,
            telemetry: frame.telemetry.clone(),
            events: outcome
                .events
                .iter()
                .map(|(command, event)| SimEvent {
                    command: command.to_string(),
                    outcome: format!("{:?}", event).to_lowercase(),
                })
                .collect(),
        }
    }
}

/// A command and what it did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimEvent {
    pub command: String,
    pub outcome: String,
}

/// Complete playback export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimExport {
    /// Scenario name
    pub scenario: String,

    /// Seed used
    pub seed: u64,

    /// Virtual duration in seconds
    pub duration_sec: f64,

    /// Exported frames
    pub frames: Vec<SimFrame>,

    /// Final results
    pub passed: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit: Option<AuditReport>,
}

impl SimExport {
    /// Creates a new export container.
    pub fn new(scenario: &str, seed: u64) -> Self {
        Self {
            scenario: scenario.to_string(),
            seed,
            duration_sec: 0.0,
            frames: Vec::new(),
            passed: false,
            failure_reason: None,
            audit: None,
        }
    }

    /// Adds a frame.
    pub fn add_frame(&mut self, frame: SimFrame) {
        self.duration_sec = frame.time_sec;
        self.frames.push(frame);
    }

    /// Finalizes the export with the scenario verdict.
    pub fn finalize(&mut self, result: &ScenarioResult) {
        self.passed = result.passed;
        self.failure_reason = result.failure_reason.clone();
        self.audit = Some(result.audit.clone());
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ScenarioRunner;
    use crate::scenarios::ScenarioId;

    #[test]
    fn test_export_collects_frames_and_verdict() {
        let mut export = SimExport::new("nominal", 11);
        let result = ScenarioRunner::new(11)
            .with_frame_rate(4)
            .run_observed(ScenarioId::Nominal, |_, outcome| {
                export.add_frame(SimFrame::from_outcome(outcome))
            });
        export.finalize(&result);

        assert!(export.passed);
        assert_eq!(export.frames.len() as u64, result.total_frames);
        assert_eq!(export.frames[0].events[0].command, "play");
        assert_eq!(export.frames[0].events[0].outcome, "started");
        assert!(export.frames[1].events.is_empty());
        assert_eq!(export.duration_sec, export.frames.last().map(|f| f.time_sec).unwrap_or(0.0));
    }

    #[test]
    fn test_export_writes_json() {
        let mut export = SimExport::new("overrun", 3);
        ScenarioRunner::new(3)
            .with_frame_rate(2)
            .run_observed(ScenarioId::Overrun, |_, outcome| {
                export.add_frame(SimFrame::from_outcome(outcome))
            });

        let path = std::env::temp_dir().join(format!("missionview_export_{}.json", std::process::id()));
        export.write_to_file(&path).expect("write export");

        let text = std::fs::read_to_string(&path).expect("read export");
        let parsed: SimExport = serde_json::from_str(&text).expect("parse export");
        assert_eq!(parsed.scenario, "overrun");
        assert_eq!(parsed.frames.len(), export.frames.len());
        assert!(parsed.audit.is_none());
        let _ = std::fs::remove_file(&path);
    }
}
