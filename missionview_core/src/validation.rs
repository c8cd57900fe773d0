//! Validation Module - Playback Audit
//! ===================================
//!
//! Checks a stream of frames against the animator's invariants. The audit
//! is fed every frame a consumer sees, so it catches ordering bugs in the
//! tick loop as well as in the interpolators.
//!
//! Rules, checked within a segment (a reset or restart opens a new one):
//! - elapsed time never decreases and never exceeds the mission total
//! - phase index never decreases
//! - battery percentage never increases and never drops below its floor
//! - LiDAR point count never decreases within a phase
//! - `mission_complete` only in the final phase past the touchdown threshold
//! - `landing_locked` never releases within the final phase
//! - frames at the same elapsed time carry identical telemetry
//!
//! Usage:
//! ```ignore
//! use missionview_core::validation::PlaybackAudit;
//!
//! let mut audit = PlaybackAudit::for_session(&session);
//! audit.record(session.tick(now));
//! let report = audit.report();
//! assert!(report.is_clean());
//! ```

use crate::animator::{Frame, MissionAnimator, PlaybackSession};
use serde::{Deserialize, Serialize};
use std::fmt;

const EPSILON: f64 = 1e-9;

// =============================================================================
// VIOLATIONS
// =============================================================================

/// Which invariant a frame broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditRule {
    ElapsedRewound,
    ElapsedOverrun,
    PhaseRegressed,
    BatteryRecharged,
    BatteryBelowFloor,
    PointsLost,
    PrematureCompletion,
    LockReleased,
    NonDeterministic,
}

impl fmt::Display for AuditRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuditRule::ElapsedRewound => "elapsed time decreased",
            AuditRule::ElapsedOverrun => "elapsed time beyond mission total",
            AuditRule::PhaseRegressed => "phase index decreased",
            AuditRule::BatteryRecharged => "battery percentage increased",
            AuditRule::BatteryBelowFloor => "battery below floor",
            AuditRule::PointsLost => "LiDAR point count decreased",
            AuditRule::PrematureCompletion => "mission complete before touchdown",
            AuditRule::LockReleased => "landing lock released",
            AuditRule::NonDeterministic => "telemetry differs at equal elapsed time",
        };
        write!(f, "{}", name)
    }
}

/// A single rule violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Index of the offending frame across the whole audit
    pub frame: usize,
    pub segment: usize,
    pub elapsed_secs: f64,
    pub rule: AuditRule,
    pub detail: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "frame {} (segment {}, t={:.3}s): {} - {}",
            self.frame, self.segment, self.elapsed_secs, self.rule, self.detail
        )
    }
}

/// Summary of an audit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    pub frames_checked: usize,
    pub segments: usize,
    pub max_phase_reached: usize,
    pub completed: bool,
    pub violations: Vec<Violation>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn first_violation(&self) -> Option<&Violation> {
        self.violations.first()
    }
}

// =============================================================================
// AUDIT
// =============================================================================

/// Streaming invariant checker for playback frames.
#[derive(Debug, Clone)]
pub struct PlaybackAudit {
    total_secs: f64,
    last_phase: usize,
    touchdown_threshold: f64,
    battery_floor: f64,

    previous: Option<Frame>,
    frames_checked: usize,
    segments: usize,
    max_phase_reached: usize,
    completed: bool,
    violations: Vec<Violation>,
}

impl PlaybackAudit {
    pub fn new(animator: &MissionAnimator) -> Self {
        Self {
            total_secs: animator.total_duration(),
            last_phase: animator.plan().table().last_index(),
            touchdown_threshold: animator.config().landing.touchdown,
            battery_floor: animator.config().battery.percent_floor(),
            previous: None,
            frames_checked: 0,
            segments: 0,
            max_phase_reached: 0,
            completed: false,
            violations: Vec::new(),
        }
    }

    pub fn for_session(session: &PlaybackSession) -> Self {
        Self::new(session.animator())
    }

    /// Close the current segment. The next frame is checked against no
    /// predecessor. Empty segments are not counted.
    pub fn begin_segment(&mut self) {
        self.previous = None;
    }

    /// Check one frame against its predecessor in the current segment.
    pub fn record(&mut self, frame: &Frame) {
        let index = self.frames_checked;
        self.frames_checked += 1;
        if self.previous.is_none() {
            self.segments += 1;
        }
        self.max_phase_reached = self.max_phase_reached.max(frame.cursor.phase_index);
        self.completed |= frame.telemetry.mission_complete;

        let mut found: Vec<(AuditRule, String)> = Vec::new();
        let t = &frame.telemetry;

        if frame.elapsed_secs > self.total_secs + EPSILON {
            found.push((
                AuditRule::ElapsedOverrun,
                format!("{:.3}s > {:.3}s", frame.elapsed_secs, self.total_secs),
            ));
        }
        if t.battery_percent < self.battery_floor - EPSILON {
            found.push((
                AuditRule::BatteryBelowFloor,
                format!("{:.3}% < {:.3}%", t.battery_percent, self.battery_floor),
            ));
        }
        let cursor = &frame.cursor;
        if t.mission_complete
            && !(cursor.phase_index == self.last_phase && cursor.local_progress > self.touchdown_threshold)
        {
            found.push((
                AuditRule::PrematureCompletion,
                format!("phase {} at {:.3}", cursor.phase_index, cursor.local_progress),
            ));
        }

        if let Some(prev) = &self.previous {
            let p = &prev.telemetry;

            if frame.elapsed_secs < prev.elapsed_secs {
                found.push((
                    AuditRule::ElapsedRewound,
                    format!("{:.3}s -> {:.3}s", prev.elapsed_secs, frame.elapsed_secs),
                ));
            }
            if frame.cursor.phase_index < prev.cursor.phase_index {
                found.push((
                    AuditRule::PhaseRegressed,
                    format!("{} -> {}", prev.cursor.phase_index, frame.cursor.phase_index),
                ));
            }
            if t.battery_percent > p.battery_percent + EPSILON {
                found.push((
                    AuditRule::BatteryRecharged,
                    format!("{:.3}% -> {:.3}%", p.battery_percent, t.battery_percent),
                ));
            }
            let same_phase = prev.cursor.phase_index == cursor.phase_index;
            if same_phase && t.lidar.points < p.lidar.points {
                found.push((
                    AuditRule::PointsLost,
                    format!("{} -> {}", p.lidar.points, t.lidar.points),
                ));
            }
            if same_phase && cursor.phase_index == self.last_phase && p.landing_locked && !t.landing_locked {
                found.push((AuditRule::LockReleased, format!("at local progress {:.3}", cursor.local_progress)));
            }
            if frame.elapsed_secs == prev.elapsed_secs && t != p {
                found.push((AuditRule::NonDeterministic, format!("at {:.3}s", frame.elapsed_secs)));
            }
        }

        let segment = self.segments;
        self.violations.extend(found.into_iter().map(|(rule, detail)| Violation {
            frame: index,
            segment,
            elapsed_secs: frame.elapsed_secs,
            rule,
            detail,
        }));

        self.previous = Some(frame.clone());
    }

    pub fn report(&self) -> AuditReport {
        AuditReport {
            frames_checked: self.frames_checked,
            segments: self.segments,
            max_phase_reached: self.max_phase_reached,
            completed: self.completed,
            violations: self.violations.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MissionConfig;

    fn animator() -> MissionAnimator {
        MissionAnimator::new(MissionConfig::default())
    }

    #[test]
    fn test_clean_full_playback() {
        let a = animator();
        let mut audit = PlaybackAudit::new(&a);
        let mut prev: Option<Frame> = None;
        for i in 0..=600 {
            let frame = a.update(i as f64 * 0.1, prev.as_ref());
            audit.record(&frame);
            prev = Some(frame);
        }

        let report = audit.report();
        assert!(report.is_clean(), "{:?}", report.first_violation());
        assert_eq!(report.frames_checked, 601);
        assert_eq!(report.segments, 1);
        assert_eq!(report.max_phase_reached, 9);
        assert!(report.completed);
    }

    #[test]
    fn test_detects_rewind_and_regression() {
        let a = animator();
        let mut audit = PlaybackAudit::new(&a);
        audit.record(&a.update(30.0, None));
        audit.record(&a.update(10.0, None));

        let rules: Vec<AuditRule> = audit.report().violations.iter().map(|v| v.rule).collect();
        assert!(rules.contains(&AuditRule::ElapsedRewound));
        assert!(rules.contains(&AuditRule::PhaseRegressed));
        assert!(rules.contains(&AuditRule::BatteryRecharged));
        assert!(!rules.contains(&AuditRule::PointsLost));
    }

    #[test]
    fn test_points_may_restart_with_a_new_phase() {
        let a = animator();
        let mut audit = PlaybackAudit::new(&a);

        // Each transit phase maps its own sweep
        let end_of_climb = a.update(8.9, None);
        let next_transit = a.update(9.1, Some(&end_of_climb));
        assert!(next_transit.telemetry.lidar.points < end_of_climb.telemetry.lidar.points);
        audit.record(&end_of_climb);
        audit.record(&next_transit);
        assert!(audit.report().is_clean());

        let mut lost = a.update(9.2, Some(&next_transit));
        lost.telemetry.lidar.points = 0;
        audit.record(&lost);
        let rules: Vec<AuditRule> = audit.report().violations.iter().map(|v| v.rule).collect();
        assert_eq!(rules, vec![AuditRule::PointsLost]);
    }

    #[test]
    fn test_completion_outside_final_phase_is_flagged() {
        let a = animator();
        let mut audit = PlaybackAudit::new(&a);

        // Landing Approach is a landing profile but not the final phase
        let mut approach = a.update(49.9, None);
        assert_eq!(approach.cursor.phase_index, 8);
        approach.telemetry.mission_complete = true;
        audit.record(&approach);

        let report = audit.report();
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].rule, AuditRule::PrematureCompletion);
    }

    #[test]
    fn test_new_segment_allows_restart() {
        let a = animator();
        let mut audit = PlaybackAudit::new(&a);
        audit.record(&a.update(30.0, None));
        audit.begin_segment();
        audit.record(&a.initial_frame());
        audit.record(&a.update(1.0, None));

        let report = audit.report();
        assert!(report.is_clean());
        assert_eq!(report.segments, 2);
    }

    #[test]
    fn test_detects_tampered_frames() {
        let a = animator();
        let mut audit = PlaybackAudit::new(&a);

        let mut early = a.update(20.0, None);
        early.telemetry.mission_complete = true;
        audit.record(&early);

        let honest = a.update(20.0, None);
        audit.record(&honest);

        let mut drained = a.update(21.0, None);
        drained.telemetry.battery_percent = 2.0;
        audit.record(&drained);

        let rules: Vec<AuditRule> = audit.report().violations.iter().map(|v| v.rule).collect();
        assert_eq!(
            rules,
            vec![
                AuditRule::PrematureCompletion,
                AuditRule::NonDeterministic,
                AuditRule::BatteryBelowFloor,
            ]
        );
    }

    #[test]
    fn test_detects_lock_release() {
        let a = animator();
        let mut audit = PlaybackAudit::new(&a);
        audit.record(&a.update(52.0, None));
        let mut released = a.update(52.5, None);
        released.telemetry.landing_locked = false;
        audit.record(&released);

        let report = audit.report();
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].rule, AuditRule::LockReleased);
        assert!(report.violations[0].to_string().contains("landing lock released"));
    }
}
