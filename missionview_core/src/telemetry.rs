//! Synthetic telemetry snapshot and the global battery model
//!
//! A [`TelemetrySnapshot`] is an immutable value. The animator builds a new
//! one every frame; nothing mutates a snapshot in place.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// COMPONENT READINGS
// =============================================================================

/// One motor channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotorReading {
    pub rpm: f64,
    pub temp_c: f64,
    pub current_a: f64,
}

impl MotorReading {
    pub const IDLE: MotorReading = MotorReading {
        rpm: 0.0,
        temp_c: 25.0,
        current_a: 0.0,
    };

    pub const fn new(rpm: f64, temp_c: f64, current_a: f64) -> Self {
        Self { rpm, temp_c, current_a }
    }
}

/// Main battery pack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatteryReading {
    pub voltage_v: f64,
    pub amp_hours: f64,
    pub health_percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImuStatus {
    Calibrated,
    Landed,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImuReading {
    pub roll_pitch_deg: f64,
    pub yaw_deg: f64,
    pub status: ImuStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GnssReading {
    pub locked: bool,
    pub satellites: u32,
    pub accuracy_m: f64,
}

impl GnssReading {
    /// No fix.
    pub const DENIED: GnssReading = GnssReading {
        locked: false,
        satellites: 0,
        accuracy_m: 0.0,
    };
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraReading {
    pub resolution: String,
    pub fps: u32,
    pub recording: bool,
}

impl CameraReading {
    pub fn uhd(recording: bool) -> Self {
        Self {
            resolution: "4K".to_string(),
            fps: 30,
            recording,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LidarStatus {
    Idle,
    Mapping,
    Scanning,
    Recording,
}

/// Ranging sensor (LiDAR).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LidarReading {
    pub points: u64,
    pub range_m: f64,
    pub status: LidarStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProcessorReading {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub temp_c: f64,
}

impl fmt::Display for ImuStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl fmt::Display for LidarStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Every simulated reading valid for one frame.
///
/// Motors are ordered front-left, front-right, back-left, back-right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub altitude: f64,
    pub speed: f64,
    pub distance_traveled: f64,
    pub battery_percent: f64,

    /// "Ready" before playback, otherwise the current phase name
    pub status_label: String,

    pub surface_distance: f64,
    pub landing_locked: bool,
    pub mission_complete: bool,

    pub motors: [MotorReading; 4],
    pub battery: BatteryReading,
    pub imu: ImuReading,
    pub gnss: GnssReading,
    pub camera: CameraReading,
    pub lidar: LidarReading,
    pub processor: ProcessorReading,
}

impl TelemetrySnapshot {
    /// The state shown before playback starts and after a reset.
    pub fn initial() -> Self {
        Self {
            altitude: 0.0,
            speed: 0.0,
            distance_traveled: 0.0,
            battery_percent: 100.0,
            status_label: "Ready".to_string(),
            surface_distance: 0.0,
            landing_locked: false,
            mission_complete: false,
            motors: [MotorReading::IDLE; 4],
            battery: BatteryReading {
                voltage_v: 14.8,
                amp_hours: 5000.0,
                health_percent: 100.0,
            },
            imu: ImuReading {
                roll_pitch_deg: 0.0,
                yaw_deg: 0.0,
                status: ImuStatus::Calibrated,
            },
            gnss: GnssReading::DENIED,
            camera: CameraReading::uhd(false),
            lidar: LidarReading {
                points: 0,
                range_m: 0.0,
                status: LidarStatus::Idle,
            },
            processor: ProcessorReading {
                cpu_percent: 0.0,
                memory_percent: 10.0,
                temp_c: 35.0,
            },
        }
    }

    /// Front-left motor, which drives propeller spin.
    pub fn lead_motor(&self) -> &MotorReading {
        &self.motors[0]
    }
}

impl Default for TelemetrySnapshot {
    fn default() -> Self {
        Self::initial()
    }
}

// =============================================================================
// BATTERY MODEL
// =============================================================================

/// `value(x) = max(floor, start - rate * x)` for `x` in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearDecay {
    pub start: f64,
    pub rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor: Option<f64>,
}

impl LinearDecay {
    pub const fn new(start: f64, rate: f64, floor: Option<f64>) -> Self {
        Self { start, rate, floor }
    }

    pub fn value(&self, progress: f64) -> f64 {
        let x = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) };
        let raw = self.start - self.rate * x;
        match self.floor {
            Some(floor) => raw.max(floor),
            None => raw,
        }
    }
}

/// Battery readings as three independent functions of mission progress.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatteryModel {
    pub percent: LinearDecay,
    pub voltage: LinearDecay,
    pub health: LinearDecay,
    pub amp_hours: f64,
}

impl Default for BatteryModel {
    fn default() -> Self {
        Self {
            // 85% drain over the mission, floored at 8%
            percent: LinearDecay::new(100.0, 85.0, Some(8.0)),
            // 14.8 V minus 2.5 V per unit of drain
            voltage: LinearDecay::new(14.8, 2.125, None),
            health: LinearDecay::new(100.0, 25.0, Some(75.0)),
            amp_hours: 5000.0,
        }
    }
}

impl BatteryModel {
    pub fn percent_at(&self, mission_progress: f64) -> f64 {
        self.percent.value(mission_progress)
    }

    pub fn reading_at(&self, mission_progress: f64) -> BatteryReading {
        BatteryReading {
            voltage_v: self.voltage.value(mission_progress),
            amp_hours: self.amp_hours,
            health_percent: self.health.value(mission_progress),
        }
    }

    /// Lowest percentage the model can report.
    pub fn percent_floor(&self) -> f64 {
        self.percent.floor.unwrap_or_else(|| self.percent.value(1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_initial_literal() {
        let t = TelemetrySnapshot::initial();
        assert_eq!(t.altitude, 0.0);
        assert_eq!(t.battery_percent, 100.0);
        assert_eq!(t.status_label, "Ready");
        assert!(!t.mission_complete);
        assert!(!t.landing_locked);
        assert_eq!(t.motors, [MotorReading::new(0.0, 25.0, 0.0); 4]);
        assert_eq!(t.battery.voltage_v, 14.8);
        assert_eq!(t.imu.status, ImuStatus::Calibrated);
        assert!(!t.gnss.locked);
        assert_eq!(t.camera.resolution, "4K");
        assert_eq!(t.lidar.status, LidarStatus::Idle);
        assert_eq!(t.processor.memory_percent, 10.0);
    }

    #[test]
    fn test_battery_endpoints() {
        let model = BatteryModel::default();
        assert_relative_eq!(model.percent_at(0.0), 100.0);
        assert_relative_eq!(model.percent_at(1.0), 15.0);

        let start = model.reading_at(0.0);
        assert_relative_eq!(start.voltage_v, 14.8);
        assert_relative_eq!(start.health_percent, 100.0);

        let end = model.reading_at(1.0);
        assert_relative_eq!(end.voltage_v, 12.675, epsilon = 1e-9);
        assert_relative_eq!(end.health_percent, 75.0);
        assert_relative_eq!(end.amp_hours, 5000.0);
    }

    #[test]
    fn test_decay_floor_applies() {
        let steep = LinearDecay::new(100.0, 200.0, Some(8.0));
        assert_relative_eq!(steep.value(1.0), 8.0);
        assert_relative_eq!(steep.value(0.25), 50.0);
        assert_relative_eq!(steep.value(7.0), 8.0);
    }

    #[test]
    fn test_snapshot_json_round_trip() {
        let snapshot = TelemetrySnapshot::initial();
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: TelemetrySnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }

    proptest! {
        #[test]
        fn prop_battery_non_increasing(a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
            let model = BatteryModel::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(model.percent_at(hi) <= model.percent_at(lo));
            prop_assert!(model.percent_at(hi) >= 8.0);
            prop_assert!(model.reading_at(hi).health_percent >= 75.0);
            prop_assert!(model.reading_at(hi).voltage_v <= model.reading_at(lo).voltage_v);
        }
    }
}
