//! Mission configuration
//!
//! The phase table is the primary configuration surface. Battery curves,
//! camera rig and landing thresholds can be tuned alongside it; every
//! section is optional in the JSON file and falls back to the built-in
//! Mars sortie.
//!
//! ```json
//! {
//!   "phases": [
//!     { "name": "Takeoff", "duration": 3, "tint": "#00ff00", "profile": "ascent" },
//!     { "name": "Final Landing", "duration": 4, "tint": "#00ff00", "profile": "touchdown" }
//!   ],
//!   "landing": { "lock": 0.3, "touchdown": 0.85 }
//! }
//! ```

use crate::interpolate::LandingThresholds;
use crate::phase::{Phase, PhaseTable, PhaseTableError};
use crate::scene::CameraRig;
use crate::telemetry::BatteryModel;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read mission file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse mission file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid phase table: {0}")]
    InvalidPhases(#[from] PhaseTableError),

    #[error("invalid landing thresholds: lock {lock}, touchdown {touchdown} (need 0 <= lock <= touchdown <= 1)")]
    InvalidThresholds { lock: f64, touchdown: f64 },
}

/// Everything that shapes a playback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MissionFile")]
pub struct MissionConfig {
    pub phases: PhaseTable,
    pub battery: BatteryModel,
    pub camera: CameraRig,
    pub landing: LandingThresholds,
}

/// On-disk shape before validation.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct MissionFile {
    phases: Option<Vec<Phase>>,
    battery: BatteryModel,
    camera: CameraRig,
    landing: LandingThresholds,
}

impl TryFrom<MissionFile> for MissionConfig {
    type Error = ConfigError;

    fn try_from(file: MissionFile) -> Result<Self, Self::Error> {
        let phases = match file.phases {
            Some(phases) => PhaseTable::new(phases)?,
            None => PhaseTable::mars_sortie(),
        };

        let LandingThresholds { lock, touchdown } = file.landing;
        let ordered = 0.0 <= lock && lock <= touchdown && touchdown <= 1.0;
        if !ordered {
            return Err(ConfigError::InvalidThresholds { lock, touchdown });
        }

        Ok(Self {
            phases,
            battery: file.battery,
            camera: file.camera,
            landing: file.landing,
        })
    }
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            phases: PhaseTable::mars_sortie(),
            battery: BatteryModel::default(),
            camera: CameraRig::default(),
            landing: LandingThresholds::default(),
        }
    }
}

impl MissionConfig {
    /// Parse and validate a JSON mission document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let file: MissionFile = serde_json::from_str(json)?;
        file.try_into()
    }

    /// Load a mission file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Replace the phase table, validating it.
    pub fn with_phases(mut self, phases: Vec<Phase>) -> Result<Self, ConfigError> {
        self.phases = PhaseTable::new(phases)?;
        Ok(self)
    }

    pub fn with_landing(mut self, landing: LandingThresholds) -> Self {
        self.landing = landing;
        self
    }

    pub fn with_battery(mut self, battery: BatteryModel) -> Self {
        self.battery = battery;
        self
    }

    pub fn with_camera(mut self, camera: CameraRig) -> Self {
        self.camera = camera;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::{PhaseProfile, Rgb};
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_document_is_default() {
        let config = MissionConfig::from_json("{}").unwrap();
        assert_eq!(config, MissionConfig::default());
        assert_relative_eq!(config.phases.total_duration(), 54.0);
    }

    #[test]
    fn test_round_trip() {
        let config = MissionConfig::default().with_landing(LandingThresholds {
            lock: 0.2,
            touchdown: 0.9,
        });
        let json = config.to_json().unwrap();
        let back = MissionConfig::from_json(&json).unwrap();
        assert_eq!(back, config);

        let via_serde: MissionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(via_serde, config);
    }

    #[test]
    fn test_custom_phases() {
        let json = r##"{
            "phases": [
                { "name": "Hop", "duration": 1.5, "tint": "#112233", "profile": "ascent" },
                { "name": "Settle", "duration": 2.5, "tint": "#445566", "profile": "touchdown" }
            ],
            "battery": { "percent": { "start": 100, "rate": 50, "floor": 40 } }
        }"##;
        let config = MissionConfig::from_json(json).unwrap();
        assert_eq!(config.phases.len(), 2);
        assert_relative_eq!(config.phases.total_duration(), 4.0);
        assert_eq!(config.phases.phase(0).map(|p| p.tint), Some(Rgb::from_hex(0x112233)));
        assert_eq!(config.phases.phase(1).map(|p| p.profile), Some(PhaseProfile::Touchdown));
        assert_relative_eq!(config.battery.percent_at(1.0), 50.0);
        // Untouched curves keep their defaults
        assert_relative_eq!(config.battery.reading_at(1.0).health_percent, 75.0);
    }

    #[test]
    fn test_rejects_bad_documents() {
        let empty = r#"{ "phases": [] }"#;
        assert!(matches!(
            MissionConfig::from_json(empty),
            Err(ConfigError::InvalidPhases(PhaseTableError::Empty))
        ));

        let bad_tint = r#"{ "phases": [{ "name": "x", "duration": 1, "tint": "red", "profile": "ascent" }] }"#;
        assert!(matches!(MissionConfig::from_json(bad_tint), Err(ConfigError::Parse(_))));

        let inverted = r#"{ "landing": { "lock": 0.9, "touchdown": 0.5 } }"#;
        assert!(matches!(
            MissionConfig::from_json(inverted),
            Err(ConfigError::InvalidThresholds { .. })
        ));

        let unknown = r#"{ "phasez": [] }"#;
        assert!(matches!(MissionConfig::from_json(unknown), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = MissionConfig::load("/definitely/not/a/mission.json");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
