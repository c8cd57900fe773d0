//! The Mission Clock - elapsed-time accounting and cursor resolution
//!
//! The clock never reads ambient time. Every operation takes `now` from the
//! caller's `MissionContext`, so a playback is a pure function of the clock
//! readings and commands fed into it.

use crate::phase::PhaseTable;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// =============================================================================
// PHASE CURSOR
// =============================================================================

/// Resolved position within the phase table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseCursor {
    pub phase_index: usize,

    /// Fraction of the current phase covered, in `[0, 1]`
    pub local_progress: f64,
}

impl PhaseCursor {
    pub const START: PhaseCursor = PhaseCursor {
        phase_index: 0,
        local_progress: 0.0,
    };
}

impl PhaseTable {
    /// Resolve the phase cursor at `elapsed_secs`.
    ///
    /// Elapsed time is clamped to `[0, total]` first. The scan picks the first
    /// phase whose cumulative end is strictly greater than the elapsed time,
    /// so a boundary instant belongs to the phase that starts there. At or
    /// past the total the cursor is pinned to the last phase at 1.0.
    ///
    /// This is a linear scan over cached end times, O(phases). A binary
    /// search over the same breakpoints would resolve identically.
    pub fn resolve(&self, elapsed_secs: f64) -> PhaseCursor {
        let t = self.clamp_elapsed(elapsed_secs);
        let pinned = PhaseCursor {
            phase_index: self.last_index(),
            local_progress: 1.0,
        };

        if t >= self.total_duration() {
            return pinned;
        }

        for (index, end) in self.ends().iter().enumerate() {
            if *end > t {
                let start = self.cumulative_duration_before(index);
                return PhaseCursor {
                    phase_index: index,
                    local_progress: local_fraction(t, start, end - start),
                };
            }
        }

        pinned
    }
}

/// `(t - start) / duration` clamped to `[0, 1]`; zero duration is already done.
pub(crate) fn local_fraction(t: f64, start: f64, duration: f64) -> f64 {
    if duration <= 0.0 {
        return 1.0;
    }
    ((t - start) / duration).clamp(0.0, 1.0)
}

// =============================================================================
// MISSION CLOCK
// =============================================================================

/// Playback state of a [`MissionClock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    Idle,
    Playing,
    Paused,
    Complete,
}

/// Elapsed-time accumulator for one playback session.
///
/// The anchor is the context-clock reading (seconds) that corresponds to
/// elapsed zero. Resuming re-anchors to `now - elapsed` so elapsed time is
/// monotonic across pause/resume.
#[derive(Debug, Clone, PartialEq)]
pub struct MissionClock {
    anchor_secs: f64,
    elapsed_secs: f64,
    total_secs: f64,
    state: PlaybackState,
}

impl MissionClock {
    /// Create an idle clock for a mission lasting `total_secs`.
    pub fn new(total_secs: f64) -> Self {
        Self {
            anchor_secs: 0.0,
            elapsed_secs: 0.0,
            total_secs: total_secs.max(0.0),
            state: PlaybackState::Idle,
        }
    }

    /// Start playback from zero, or resume a paused clock.
    ///
    /// Returns true when playback restarted from zero.
    pub fn play(&mut self, now: Duration) -> bool {
        match self.state {
            PlaybackState::Playing => false,
            PlaybackState::Paused => {
                self.anchor_secs = now.as_secs_f64() - self.elapsed_secs;
                self.state = PlaybackState::Playing;
                false
            }
            PlaybackState::Idle | PlaybackState::Complete => {
                self.anchor_secs = now.as_secs_f64();
                self.elapsed_secs = 0.0;
                self.state = PlaybackState::Playing;
                true
            }
        }
    }

    /// Freeze elapsed time. No-op unless playing.
    pub fn pause(&mut self, now: Duration) {
        if self.state != PlaybackState::Playing {
            return;
        }
        self.advance(now);
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
    }

    /// Pause when playing, play otherwise. Returns true on a restart from zero.
    pub fn toggle(&mut self, now: Duration) -> bool {
        if self.state == PlaybackState::Playing {
            self.pause(now);
            false
        } else {
            self.play(now)
        }
    }

    /// Back to idle at elapsed zero.
    pub fn reset(&mut self) {
        self.anchor_secs = 0.0;
        self.elapsed_secs = 0.0;
        self.state = PlaybackState::Idle;
    }

    /// Advance to `now` and return the clamped elapsed seconds.
    ///
    /// Only a playing clock moves. Reaching the total flips the state to
    /// `Complete` and pins elapsed at the total.
    pub fn tick(&mut self, now: Duration) -> f64 {
        if self.state == PlaybackState::Playing {
            self.advance(now);
        }
        self.elapsed_secs
    }

    fn advance(&mut self, now: Duration) {
        let measured = now.as_secs_f64() - self.anchor_secs;
        // A context clock that steps backwards must not rewind the mission.
        let elapsed = measured.max(self.elapsed_secs);
        if elapsed >= self.total_secs {
            self.elapsed_secs = self.total_secs;
            self.state = PlaybackState::Complete;
        } else {
            self.elapsed_secs = elapsed.max(0.0);
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed_secs
    }

    pub fn total_secs(&self) -> f64 {
        self.total_secs
    }

    /// Elapsed fraction of the mission, in `[0, 1]`.
    pub fn total_progress(&self) -> f64 {
        if self.total_secs <= 0.0 {
            return 1.0;
        }
        (self.elapsed_secs / self.total_secs).clamp(0.0, 1.0)
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn is_complete(&self) -> bool {
        self.state == PlaybackState::Complete
    }
}
