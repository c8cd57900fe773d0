//! Presentation panel models
//!
//! Renderer-agnostic view models over a [`Frame`], plus the static fixture
//! data shown by the auxiliary panels (architecture, safety, detections,
//! log). The terminal dashboard renders these; so could anything else.

use crate::animator::Frame;
use crate::phase::{PhaseTable, Rgb};
use crate::telemetry::TelemetrySnapshot;
use crate::timeline::PhaseCursor;
use serde::Serialize;
use std::fmt;

// =============================================================================
// LIVE VIEW MODELS
// =============================================================================

/// Headline landing indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FlightStatus {
    Flight,
    Lock,
    Landed,
}

impl fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FlightStatus::Flight => "FLIGHT",
            FlightStatus::Lock => "LOCK",
            FlightStatus::Landed => "LANDED",
        };
        write!(f, "{}", label)
    }
}

/// `Landed` wins over `Lock`, which wins over `Flight`.
pub fn flight_status(telemetry: &TelemetrySnapshot) -> FlightStatus {
    if telemetry.mission_complete {
        FlightStatus::Landed
    } else if telemetry.landing_locked {
        FlightStatus::Lock
    } else {
        FlightStatus::Flight
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RowState {
    Done,
    Active,
    Pending,
}

/// One line of the phase timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseRow {
    pub index: usize,
    pub name: String,
    pub duration_secs: f64,
    pub tint: Rgb,
    pub state: RowState,
}

pub fn phase_rows(table: &PhaseTable, cursor: &PhaseCursor) -> Vec<PhaseRow> {
    table
        .phases()
        .iter()
        .enumerate()
        .map(|(index, phase)| PhaseRow {
            index,
            name: phase.name.clone(),
            duration_secs: phase.duration_secs,
            tint: phase.tint,
            state: match index.cmp(&cursor.phase_index) {
                std::cmp::Ordering::Less => RowState::Done,
                std::cmp::Ordering::Equal => RowState::Active,
                std::cmp::Ordering::Greater => RowState::Pending,
            },
        })
        .collect()
}

/// A labelled, pre-formatted value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Readout {
    pub label: &'static str,
    pub value: String,
}

impl Readout {
    fn new(label: &'static str, value: String) -> Self {
        Self { label, value }
    }
}

/// Headline readouts in display order.
pub fn readouts(frame: &Frame) -> Vec<Readout> {
    let t = &frame.telemetry;
    vec![
        Readout::new("Altitude", format!("{:.1}m", t.altitude)),
        Readout::new("Speed", format!("{:.1}m/s", t.speed)),
        Readout::new("Battery", format!("{:.0}%", t.battery_percent)),
        Readout::new("Mars Surface", format!("{:.1}m", t.surface_distance)),
        Readout::new("LiDAR", format!("{:.0}K pts", t.lidar.points as f64 / 1000.0)),
        Readout::new("Status", flight_status(t).to_string()),
    ]
}

/// `(position label, rpm, temperature)` for each motor.
pub fn motor_rows(telemetry: &TelemetrySnapshot) -> [(&'static str, String, String); 4] {
    const LABELS: [&str; 4] = ["Front Left", "Front Right", "Back Left", "Back Right"];
    let row = |i: usize| {
        let m = &telemetry.motors[i];
        (LABELS[i], format!("{:.0} RPM", m.rpm), format!("{:.0}°C", m.temp_c))
    };
    [row(0), row(1), row(2), row(3)]
}

/// Mission progress line, e.g. `"42.6% · Transit to Mars"`.
pub fn progress_caption(frame: &Frame) -> String {
    format!("{:.1}% · {}", frame.mission_progress_percent(), frame.current_phase_name)
}

// =============================================================================
// FIXTURES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HealthState {
    Active,
    Normal,
    Warning,
    Critical,
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HealthState::Active => "Active",
            HealthState::Normal => "Normal",
            HealthState::Warning => "Warning",
            HealthState::Critical => "Critical",
        };
        write!(f, "{}", label)
    }
}

/// A block of the autonomy stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Subsystem {
    pub name: &'static str,
    pub state: HealthState,
    pub description: &'static str,
    pub components: &'static [&'static str],
}

pub const SUBSYSTEMS: [Subsystem; 5] = [
    Subsystem {
        name: "Perception",
        state: HealthState::Active,
        description: "Visual odometry, LiDAR, and sensor fusion",
        components: &["VO Camera", "LiDAR", "IMU", "Barometer"],
    },
    Subsystem {
        name: "Navigation (VIO/SLAM)",
        state: HealthState::Active,
        description: "GNSS-denied autonomous navigation",
        components: &["Visual Odometry", "SLAM", "Localization", "Mapping"],
    },
    Subsystem {
        name: "Path Planning",
        state: HealthState::Active,
        description: "Autonomous trajectory generation",
        components: &["Route Planning", "Obstacle Avoidance", "Optimization"],
    },
    Subsystem {
        name: "Flight Control",
        state: HealthState::Active,
        description: "Motor and actuator control",
        components: &["Motor Control", "Attitude Control", "Stabilization"],
    },
    Subsystem {
        name: "Emergency & Fail-safe",
        state: HealthState::Active,
        description: "Safety mechanisms and RTB protocols",
        components: &["RTB Logic", "Watchdog", "Emergency Landing"],
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SafetyParameter {
    pub name: &'static str,
    pub state: HealthState,
    pub value: &'static str,
}

pub const SAFETY_MODE: &str = "Normal";

pub const SAFETY_PARAMETERS: [SafetyParameter; 4] = [
    SafetyParameter { name: "Battery Voltage", state: HealthState::Normal, value: "14.8V" },
    SafetyParameter { name: "Localization Confidence", state: HealthState::Normal, value: "87%" },
    SafetyParameter { name: "Sensor Health", state: HealthState::Normal, value: "All OK" },
    SafetyParameter { name: "Temperature", state: HealthState::Normal, value: "45°C" },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FailsafeEvent {
    pub time: &'static str,
    pub event: &'static str,
    pub action: &'static str,
}

pub const FAILSAFE_LOG: [FailsafeEvent; 3] = [
    FailsafeEvent { time: "14:23:45", event: "Battery low threshold triggered", action: "RTB initiated" },
    FailsafeEvent { time: "14:12:33", event: "Localization spike detected", action: "Automatic recovery" },
    FailsafeEvent { time: "13:54:21", event: "Sensor dropout detected", action: "Fallback mode" },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    Verified,
    Pending,
    Rejected,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Verdict::Verified => "Verified",
            Verdict::Pending => "Pending",
            Verdict::Rejected => "Rejected",
        };
        write!(f, "{}", label)
    }
}

/// A surface feature flagged by the perception stack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureDetection {
    pub id: &'static str,
    pub kind: &'static str,
    pub confidence_percent: u8,
    pub coords: [f64; 3],
    pub verdict: Verdict,
}

pub const FEATURE_DETECTIONS: [FeatureDetection; 4] = [
    FeatureDetection { id: "FT-001", kind: "Rock Formation", confidence_percent: 94, coords: [12.5, -8.3, 2.1], verdict: Verdict::Verified },
    FeatureDetection { id: "FT-002", kind: "Red Oxide", confidence_percent: 87, coords: [-5.2, 3.8, 1.5], verdict: Verdict::Pending },
    FeatureDetection { id: "FT-003", kind: "Reflective Surface", confidence_percent: 91, coords: [0.5, 4.2, 3.2], verdict: Verdict::Verified },
    FeatureDetection { id: "FT-004", kind: "Rock Formation", confidence_percent: 78, coords: [8.1, -12.5, 0.8], verdict: Verdict::Rejected },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub time: &'static str,
    pub category: &'static str,
    pub message: &'static str,
    pub level: LogLevel,
}

pub const TELEMETRY_LOG: [LogEntry; 7] = [
    LogEntry { time: "14:45:32", category: "Navigation", message: "Localization confidence: 87%", level: LogLevel::Info },
    LogEntry { time: "14:45:28", category: "Perception", message: "Feature detection: 4 landmarks identified", level: LogLevel::Info },
    LogEntry { time: "14:45:24", category: "Safety", message: "Battery threshold: 87%", level: LogLevel::Info },
    LogEntry { time: "14:45:20", category: "Navigation", message: "VIO/SLAM consensus achieved", level: LogLevel::Info },
    LogEntry { time: "14:45:16", category: "Perception", message: "LiDAR scan completed", level: LogLevel::Success },
    LogEntry { time: "14:45:12", category: "Safety", message: "All systems nominal", level: LogLevel::Success },
    LogEntry { time: "14:45:08", category: "Navigation", message: "Drift correction applied", level: LogLevel::Warning },
];

/// Local navigation estimate shown on the navigation panel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NavigationFix {
    pub position: [f64; 3],
    pub confidence_percent: u8,
    pub drift_m: f64,
}

pub const NAVIGATION_FIX: NavigationFix = NavigationFix {
    position: [12.5, -8.3, 2.1],
    confidence_percent: 87,
    drift_m: 0.34,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DockingStage {
    Aligning,
    Landing,
    Docked,
}

impl fmt::Display for DockingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DockingStage::Aligning => "Aligning",
            DockingStage::Landing => "Landing",
            DockingStage::Docked => "Docked",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DockingStatus {
    pub stage: DockingStage,
    pub charging: bool,
    pub last_accuracy_cm: f64,
}

pub const DOCKING_STATUS: DockingStatus = DockingStatus {
    stage: DockingStage::Docked,
    charging: true,
    last_accuracy_cm: 4.2,
};

/// Local-frame position formatted as `x, y, z` in metres.
pub fn format_coords(coords: &[f64; 3]) -> String {
    format!("{:.1}, {:.1}, {:.1}", coords[0], coords[1], coords[2])
}

/// Sortie checklist shown on the overview.
pub const SORTIE_STAGES: [(&str, bool); 6] = [
    ("Takeoff", true),
    ("Exploration", true),
    ("Feature Detection", false),
    ("Return-to-Base", false),
    ("Docking", false),
    ("Charging", false),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animator::MissionAnimator;
    use crate::config::MissionConfig;

    #[test]
    fn test_flight_status_priority() {
        let mut t = TelemetrySnapshot::initial();
        assert_eq!(flight_status(&t), FlightStatus::Flight);
        t.landing_locked = true;
        assert_eq!(flight_status(&t), FlightStatus::Lock);
        t.mission_complete = true;
        assert_eq!(flight_status(&t), FlightStatus::Landed);
        assert_eq!(FlightStatus::Landed.to_string(), "LANDED");
    }

    #[test]
    fn test_phase_rows_states() {
        let table = PhaseTable::mars_sortie();
        let cursor = table.resolve(14.0);
        let rows = phase_rows(&table, &cursor);
        assert_eq!(rows.len(), 10);
        assert!(rows[..3].iter().all(|r| r.state == RowState::Done));
        assert_eq!(rows[3].state, RowState::Active);
        assert_eq!(rows[3].name, "Transit to Mars");
        assert!(rows[4..].iter().all(|r| r.state == RowState::Pending));
    }

    #[test]
    fn test_readouts_format() {
        let animator = MissionAnimator::new(MissionConfig::default());
        let frame = animator.update(32.5, None);
        let values: Vec<String> = readouts(&frame).into_iter().map(|r| r.value).collect();
        assert_eq!(values[0], "85.0m");
        assert_eq!(values[1], "30.0m/s");
        assert_eq!(values[4], "120K pts");
        assert_eq!(values[5], "FLIGHT");

        let motors = motor_rows(&frame.telemetry);
        assert_eq!(motors[0], ("Front Left", "6500 RPM".to_string(), "60°C".to_string()));
        assert!(progress_caption(&frame).ends_with("Data Collection"));
    }

    #[test]
    fn test_fixtures() {
        assert_eq!(SUBSYSTEMS.len(), 5);
        assert!(SUBSYSTEMS.iter().all(|s| s.state == HealthState::Active));
        assert_eq!(FEATURE_DETECTIONS.iter().filter(|f| f.verdict == Verdict::Verified).count(), 2);
        assert_eq!(TELEMETRY_LOG.iter().filter(|l| l.level == LogLevel::Warning).count(), 1);
        assert_eq!(SORTIE_STAGES.iter().filter(|(_, done)| *done).count(), 2);
    }

    #[test]
    fn test_fixture_labels() {
        assert_eq!(HealthState::Normal.to_string(), "Normal");
        assert_eq!(Verdict::Rejected.to_string(), "Rejected");
        assert_eq!(DOCKING_STATUS.stage.to_string(), "Docked");
        assert_eq!(format_coords(&NAVIGATION_FIX.position), "12.5, -8.3, 2.1");
    }
}
