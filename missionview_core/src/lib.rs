//! MissionView Core - Deterministic Mission Timeline Animator
//!
//! Maps elapsed mission time to drone pose, camera motion and a synthetic
//! telemetry snapshot across a fixed table of phases:
//! 1. **Phase Table**: validated phases with cached cumulative end times
//! 2. **Mission Clock**: pause/resume-safe elapsed time and cursor resolution
//! 3. **Flight Plan**: per-profile interpolators sampled at phase-local progress
//! 4. **Animator**: pure per-frame update producing immutable frames

pub mod animator;
pub mod config;
pub mod interpolate;
pub mod panels;
pub mod phase;
pub mod scene;
pub mod telemetry;
pub mod timeline;
pub mod validation;

#[cfg(feature = "dashboard")]
pub mod dashboard;

// Re-export key types for convenience
pub use animator::{Frame, MissionAnimator, PlaybackSession, SessionEvent};
pub use config::{ConfigError, MissionConfig};
pub use interpolate::{FlightPlan, LandingThresholds, SpatialState};
pub use phase::{Phase, PhaseProfile, PhaseTable, PhaseTableError, Rgb};
pub use scene::{CameraRig, Projection, SceneTransform};
pub use telemetry::{BatteryModel, TelemetrySnapshot};
pub use timeline::{MissionClock, PhaseCursor, PlaybackState};
pub use validation::{AuditReport, PlaybackAudit};
