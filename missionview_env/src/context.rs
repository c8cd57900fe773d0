//! Core environment context trait for MissionView playback.

use async_trait::async_trait;
use std::time::{Duration, SystemTime};

/// The clock the animator is driven by.
///
/// This trait abstracts the "real world" so that the same playback loop runs
/// against the wall clock in production and against a manually advanced
/// virtual clock in deterministic simulation.
///
/// # Implementations
///
/// - **Production**: `TokioContext` - wraps `std::time::Instant` and `tokio::time`
/// - **Simulation**: `SimContext` (in `missionview_sim`) - virtual nanosecond counter
///
/// # Determinism
///
/// The animator never reads a clock on its own. Every `now()` reading is
/// passed into the session explicitly, so a virtual clock makes an entire
/// playback reproducible.
#[async_trait]
pub trait MissionContext: Send + Sync + 'static {
    /// Returns the current monotonic time since context creation.
    ///
    /// This is the "current timestamp" the mission clock anchors to.
    /// In simulation, this is the virtual clock time.
    fn now(&self) -> Duration;

    /// Returns the wall-clock time, used only for log and export stamps.
    ///
    /// In simulation, this is derived from virtual clock + epoch offset.
    fn system_time(&self) -> SystemTime;

    /// Suspends execution for the given duration.
    ///
    /// In production: wraps `tokio::time::sleep`
    /// In simulation: advances virtual clock
    async fn sleep(&self, duration: Duration);
}
