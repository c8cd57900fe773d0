//! Playback scenarios for deterministic testing.
//!
//! Command timings are written against the 54 s reference sortie and scaled
//! proportionally when a custom mission is loaded.

use crate::script::{CommandScript, ScriptedCommand};
use missionview_env::PlaybackCommand;

/// Length of the reference sortie the scenario timings are written for.
pub const REFERENCE_TOTAL_SECS: f64 = 54.0;

/// Extra virtual time the overrun scenario keeps ticking after completion.
pub const OVERRUN_SECS: f64 = 10.0;

/// Frame interval bounds for the jitter scenario, in milliseconds.
pub const JITTER_MIN_MS: u64 = 5;
pub const JITTER_MAX_MS: u64 = 100;

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenarioId {
    /// PB-001: Play to completion at a fixed frame rate
    Nominal,

    /// PB-002: Pause mid-transit, resume five seconds later
    PauseResume,

    /// PB-003: Reset mid-flight, replay from zero
    ResetMidflight,

    /// PB-004: Keep ticking well past completion
    Overrun,

    /// PB-005: Seeded irregular frame intervals
    FrameJitter,

    /// PB-006: Viewport resizes must not touch telemetry
    ResizeStorm,
}

/// Everything the runner needs to drive one scenario.
#[derive(Debug, Clone)]
pub struct ScenarioPlan {
    pub script: CommandScript,

    /// Virtual time to keep ticking after the mission should have ended
    pub run_secs: f64,

    /// `Some((min_ms, max_ms))` for jittered frame intervals
    pub jitter_ms: Option<(u64, u64)>,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::Nominal,
            ScenarioId::PauseResume,
            ScenarioId::ResetMidflight,
            ScenarioId::Overrun,
            ScenarioId::FrameJitter,
            ScenarioId::ResizeStorm,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::Nominal => "nominal",
            ScenarioId::PauseResume => "pause_resume",
            ScenarioId::ResetMidflight => "reset_midflight",
            ScenarioId::Overrun => "overrun",
            ScenarioId::FrameJitter => "frame_jitter",
            ScenarioId::ResizeStorm => "resize_storm",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::Nominal => "Play the full sortie at a fixed frame rate",
            ScenarioId::PauseResume => "Pause at 12s, resume at 17s, elapsed must hold while paused",
            ScenarioId::ResetMidflight => "Reset at 20s, replay at 22s, second run starts from zero",
            ScenarioId::Overrun => "Tick 10s past completion, frames clamp to the final state",
            ScenarioId::FrameJitter => "Seeded 5-100ms frame intervals, invariants still hold",
            ScenarioId::ResizeStorm => "Resize mid-flight, telemetry identical to nominal",
        }
    }

    /// Builds the command script and timing for a mission of `total_secs`.
    pub fn plan(&self, total_secs: f64) -> ScenarioPlan {
        let scale = if total_secs > 0.0 { total_secs / REFERENCE_TOTAL_SECS } else { 1.0 };
        let at = |secs: f64| secs * scale;
        let play = ScriptedCommand::new(0.0, PlaybackCommand::Play);

        match self {
            ScenarioId::Nominal => ScenarioPlan {
                script: CommandScript::play_at_start(),
                run_secs: total_secs,
                jitter_ms: None,
            },
            ScenarioId::PauseResume => ScenarioPlan {
                script: CommandScript::new(vec![
                    play,
                    ScriptedCommand::new(at(12.0), PlaybackCommand::Pause),
                    ScriptedCommand::new(at(17.0), PlaybackCommand::Play),
                ]),
                run_secs: total_secs + at(5.0),
                jitter_ms: None,
            },
            ScenarioId::ResetMidflight => ScenarioPlan {
                script: CommandScript::new(vec![
                    play,
                    ScriptedCommand::new(at(20.0), PlaybackCommand::Reset),
                    ScriptedCommand::new(at(22.0), PlaybackCommand::Play),
                ]),
                run_secs: at(22.0) + total_secs,
                jitter_ms: None,
            },
            ScenarioId::Overrun => ScenarioPlan {
                script: CommandScript::play_at_start(),
                run_secs: total_secs + OVERRUN_SECS,
                jitter_ms: None,
            },
            ScenarioId::FrameJitter => ScenarioPlan {
                script: CommandScript::play_at_start(),
                run_secs: total_secs,
                jitter_ms: Some((JITTER_MIN_MS, JITTER_MAX_MS)),
            },
            ScenarioId::ResizeStorm => {
                let mut entries = vec![play];
                let sizes = [(1920, 1080), (640, 480), (0, 720), (1280, 720), (3840, 2160)];
                for (i, (width, height)) in sizes.into_iter().enumerate() {
                    entries.push(ScriptedCommand::new(
                        at(4.0 + 9.0 * i as f64),
                        PlaybackCommand::Resize { width, height },
                    ));
                }
                ScenarioPlan {
                    script: CommandScript::new(entries),
                    run_secs: total_secs,
                    jitter_ms: None,
                }
            }
        }
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nominal" | "pb-001" => Ok(ScenarioId::Nominal),
            "pause_resume" | "pauseresume" | "pb-002" => Ok(ScenarioId::PauseResume),
            "reset_midflight" | "resetmidflight" | "pb-003" => Ok(ScenarioId::ResetMidflight),
            "overrun" | "pb-004" => Ok(ScenarioId::Overrun),
            "frame_jitter" | "framejitter" | "jitter" | "pb-005" => Ok(ScenarioId::FrameJitter),
            "resize_storm" | "resizestorm" | "pb-006" => Ok(ScenarioId::ResizeStorm),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for id in ScenarioId::all() {
            assert_eq!(id.name().parse::<ScenarioId>(), Ok(id));
            assert_eq!(id.to_string(), id.name());
        }
        assert_eq!("PB-005".parse::<ScenarioId>(), Ok(ScenarioId::FrameJitter));
        assert!("split_brain".parse::<ScenarioId>().is_err());
    }

    #[test]
    fn test_reference_timings_are_unscaled() {
        let plan = ScenarioId::PauseResume.plan(REFERENCE_TOTAL_SECS);
        assert_eq!(plan.script.remaining(), 3);
        assert_eq!(plan.script.last_due(), Some(std::time::Duration::from_secs(17)));
        assert_eq!(plan.run_secs, 59.0);
        assert!(plan.jitter_ms.is_none());
    }

    #[test]
    fn test_timings_scale_with_mission_length() {
        let plan = ScenarioId::ResetMidflight.plan(27.0);
        assert_eq!(plan.script.last_due(), Some(std::time::Duration::from_secs(11)));
        assert_eq!(plan.run_secs, 38.0);

        let jitter = ScenarioId::FrameJitter.plan(27.0);
        assert_eq!(jitter.jitter_ms, Some((5, 100)));
    }
}
