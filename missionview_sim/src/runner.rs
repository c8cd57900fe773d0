//! Scenario runner - executes playback scenarios and judges them.

use crate::scenarios::{ScenarioId, ScenarioPlan};
use crate::script::CommandScript;
use crate::world::{SimConfig, SimWorld, TickOutcome};

use missionview_core::{AuditReport, MissionConfig, PlaybackState, SessionEvent, TelemetrySnapshot};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Virtual time to keep ticking past a scenario's nominal end so the final
/// frame lands on the clamped mission total.
const SETTLE_SECS: f64 = 0.5;

const EPSILON: f64 = 1e-9;

/// Results from running a scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    /// Scenario that was run
    #[serde(with = "scenario_name")]
    pub scenario: ScenarioId,

    /// Seed used
    pub seed: u64,

    /// Whether scenario passed all assertions
    pub passed: bool,

    /// Total frames computed
    pub total_frames: u64,

    /// Mission elapsed time on the last frame
    pub final_elapsed_secs: f64,

    /// Phase index on the last frame
    pub final_phase: usize,

    /// Failure message if any
    pub failure_reason: Option<String>,

    /// Invariant audit over every frame
    pub audit: AuditReport,
}

mod scenario_name {
    use super::ScenarioId;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(id: &ScenarioId, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(id.name())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<ScenarioId, D::Error> {
        let name = String::deserialize(d)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// Facts gathered while a scenario runs.
#[derive(Debug, Default)]
struct Observations {
    pause_anchor: Option<f64>,
    pause_drift: f64,
    ignored_resizes: usize,
    frames_after_completion: usize,
    moved_after_completion: usize,
    completion_elapsed: Option<f64>,
    telemetry: Vec<TelemetrySnapshot>,
}

impl Observations {
    fn observe(&mut self, world: &SimWorld, outcome: &TickOutcome, keep_telemetry: bool) {
        for (command, event) in &outcome.events {
            if *event == SessionEvent::Ignored && command.name() == "resize" {
                self.ignored_resizes += 1;
            }
        }

        if world.session().clock().state() == PlaybackState::Paused {
            let anchor = *self.pause_anchor.get_or_insert(outcome.frame.elapsed_secs);
            self.pause_drift = self.pause_drift.max((outcome.frame.elapsed_secs - anchor).abs());
        } else {
            self.pause_anchor = None;
        }

        if outcome.frame.telemetry.mission_complete && world.session().clock().is_complete() {
            match self.completion_elapsed {
                Some(done) => {
                    self.frames_after_completion += 1;
                    if outcome.frame.elapsed_secs != done {
                        self.moved_after_completion += 1;
                    }
                }
                None => self.completion_elapsed = Some(outcome.frame.elapsed_secs),
            }
        }

        if keep_telemetry {
            self.telemetry.push(outcome.frame.telemetry.clone());
        }
    }
}

/// Runs playback scenarios.
pub struct ScenarioRunner {
    /// Configuration seed
    seed: u64,

    /// Frame rate in Hz
    frame_rate_hz: u32,

    /// Mission to play
    mission: MissionConfig,
}

impl ScenarioRunner {
    /// Creates a new scenario runner for the default sortie.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            frame_rate_hz: 30,
            mission: MissionConfig::default(),
        }
    }

    /// Sets the frame rate.
    pub fn with_frame_rate(mut self, hz: u32) -> Self {
        self.frame_rate_hz = hz.max(1);
        self
    }

    /// Sets the mission configuration.
    pub fn with_mission(mut self, mission: MissionConfig) -> Self {
        self.mission = mission;
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn total_secs(&self) -> f64 {
        self.mission.phases.total_duration()
    }

    fn world(&self, plan: &ScenarioPlan) -> SimWorld {
        let config = SimConfig {
            seed: self.seed,
            frame_rate_hz: self.frame_rate_hz,
            jitter_ms: plan.jitter_ms,
        };
        SimWorld::new(config, self.mission.clone(), plan.script.clone())
    }

    /// Runs a scenario and returns the result.
    pub fn run(&self, scenario: ScenarioId) -> ScenarioResult {
        self.run_observed(scenario, |_, _| {})
    }

    /// Runs a scenario, handing every tick to `observer` as it happens.
    pub fn run_observed<F>(&self, scenario: ScenarioId, mut observer: F) -> ScenarioResult
    where
        F: FnMut(&SimWorld, &TickOutcome),
    {
        info!("Starting scenario: {} (seed={})", scenario.name(), self.seed);
        debug!("  {}", scenario.description());

        let total = self.total_secs();
        let plan = scenario.plan(total);
        let mut world = self.world(&plan);
        let keep_telemetry = scenario == ScenarioId::ResizeStorm;

        let mut obs = Observations::default();
        let mut last = None;
        while world.time() <= plan.run_secs + SETTLE_SECS {
            let outcome = world.tick();
            obs.observe(&world, &outcome, keep_telemetry);
            observer(&world, &outcome);
            last = Some(outcome);
        }

        let audit = world.audit_report();
        let (final_elapsed_secs, final_phase, final_complete) = match &last {
            Some(outcome) => (
                outcome.frame.elapsed_secs,
                outcome.frame.phase_index(),
                outcome.frame.telemetry.mission_complete,
            ),
            None => (0.0, 0, false),
        };

        let mut failures: Vec<String> = Vec::new();
        if let Some(v) = audit.first_violation() {
            failures.push(format!("{} violation(s), first: {}", audit.violations.len(), v));
        }
        if !final_complete {
            failures.push("mission did not complete".to_string());
        }
        if (final_elapsed_secs - total).abs() > EPSILON {
            failures.push(format!("final elapsed {:.3}s != total {:.3}s", final_elapsed_secs, total));
        }
        if final_phase != self.mission.phases.last_index() {
            failures.push(format!("ended in phase {}", final_phase));
        }
        if obs.pause_drift > EPSILON {
            failures.push(format!("elapsed drifted {:.6}s while paused", obs.pause_drift));
        }
        if obs.moved_after_completion > 0 {
            failures.push(format!("{} frame(s) moved after completion", obs.moved_after_completion));
        }

        self.judge(scenario, &plan, &world, &audit, &obs, &mut failures);

        let passed = failures.is_empty();
        let result = ScenarioResult {
            scenario,
            seed: self.seed,
            passed,
            total_frames: world.tick_count(),
            final_elapsed_secs,
            final_phase,
            failure_reason: if passed { None } else { Some(failures.join("; ")) },
            audit,
        };

        if passed {
            info!(
                "  {} frames, {} segment(s), completed at virtual {:.2}s",
                result.total_frames,
                result.audit.segments,
                world.completed_at().map(|d| d.as_secs_f64()).unwrap_or(f64::NAN)
            );
        } else {
            warn!("  {}", result.failure_reason.as_deref().unwrap_or("unknown"));
        }

        result
    }

    /// Scenario-specific assertions.
    fn judge(
        &self,
        scenario: ScenarioId,
        plan: &ScenarioPlan,
        world: &SimWorld,
        audit: &AuditReport,
        obs: &Observations,
        failures: &mut Vec<String>,
    ) {
        let total = self.total_secs();
        let scale = total / crate::scenarios::REFERENCE_TOTAL_SECS;
        let frame = 1.0 / self.frame_rate_hz as f64;
        let completed_at = world.completed_at().map(|d| d.as_secs_f64());

        match scenario {
            ScenarioId::Nominal | ScenarioId::FrameJitter => {
                if audit.segments != 1 {
                    failures.push(format!("expected 1 segment, got {}", audit.segments));
                }
            }
            ScenarioId::PauseResume => {
                let earliest = total + 5.0 * scale - frame;
                if completed_at.map_or(true, |t| t < earliest) {
                    failures.push(format!(
                        "completed at {:?}, expected no earlier than {:.2}s",
                        completed_at, earliest
                    ));
                }
            }
            ScenarioId::ResetMidflight => {
                if audit.segments != 3 {
                    failures.push(format!("expected 3 segments, got {}", audit.segments));
                }
                let earliest = 22.0 * scale + total - frame;
                if completed_at.map_or(true, |t| t < earliest) {
                    failures.push(format!(
                        "replay completed at {:?}, expected no earlier than {:.2}s",
                        completed_at, earliest
                    ));
                }
            }
            ScenarioId::Overrun => {
                if world.time() < plan.run_secs {
                    failures.push(format!("stopped at {:.2}s before overrun window", world.time()));
                }
                if obs.frames_after_completion == 0 {
                    failures.push("no frames after completion".to_string());
                }
            }
            ScenarioId::ResizeStorm => {
                if obs.ignored_resizes != 1 {
                    failures.push(format!("expected 1 ignored resize, got {}", obs.ignored_resizes));
                }
                let projection = world.session().projection();
                if (projection.width, projection.height) != (3840, 2160) {
                    failures.push(format!(
                        "projection is {}x{}, expected 3840x2160",
                        projection.width, projection.height
                    ));
                }

                let baseline = self.nominal_telemetry(plan.run_secs);
                if baseline.len() != obs.telemetry.len() {
                    failures.push(format!(
                        "frame count {} differs from nominal {}",
                        obs.telemetry.len(),
                        baseline.len()
                    ));
                } else if let Some(i) = baseline.iter().zip(&obs.telemetry).position(|(a, b)| a != b) {
                    failures.push(format!("telemetry diverged from nominal at frame {}", i));
                }
            }
        }
    }

    /// Telemetry of a plain play-through over the same virtual window.
    fn nominal_telemetry(&self, run_secs: f64) -> Vec<TelemetrySnapshot> {
        let config = SimConfig {
            seed: self.seed,
            frame_rate_hz: self.frame_rate_hz,
            jitter_ms: None,
        };
        let mut world = SimWorld::new(config, self.mission.clone(), CommandScript::play_at_start());
        let mut telemetry = Vec::new();
        while world.time() <= run_secs + SETTLE_SECS {
            telemetry.push(world.tick().frame.telemetry);
        }
        telemetry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use missionview_core::{Phase, PhaseProfile, Rgb};

    #[test]
    fn test_all_scenarios_pass_on_default_sortie() {
        let runner = ScenarioRunner::new(42);
        for scenario in ScenarioId::all() {
            let result = runner.run(scenario);
            assert!(result.passed, "{}: {:?}", scenario, result.failure_reason);
            assert_eq!(result.final_phase, 9);
            assert!(result.audit.completed);
        }
    }

    #[test]
    fn test_pause_resume_delays_completion() {
        let result = ScenarioRunner::new(1).run(ScenarioId::PauseResume);
        assert!(result.passed, "{:?}", result.failure_reason);
        assert_eq!(result.audit.segments, 1);
        assert!(result.total_frames > 59 * 30);
    }

    #[test]
    fn test_frame_jitter_deterministic() {
        // Same seed should give the same frame count and final state
        let a = ScenarioRunner::new(42).run(ScenarioId::FrameJitter);
        let b = ScenarioRunner::new(42).run(ScenarioId::FrameJitter);
        assert_eq!(a.total_frames, b.total_frames);
        assert_eq!(a.audit, b.audit);

        let c = ScenarioRunner::new(43).run(ScenarioId::FrameJitter);
        assert!(c.passed, "{:?}", c.failure_reason);
    }

    #[test]
    fn test_custom_mission_scales_timings() {
        let mission = MissionConfig::default()
            .with_phases(vec![
                Phase::new("Climb", 3.0, Rgb::default(), PhaseProfile::Ascent),
                Phase::new("Cruise", 6.0, Rgb::default(), PhaseProfile::Transit),
                Phase::new("Circle", 9.0, Rgb::default(), PhaseProfile::Orbit),
                Phase::new("Drop", 3.0, Rgb::default(), PhaseProfile::Descent),
                Phase::new("Land", 6.0, Rgb::default(), PhaseProfile::Touchdown),
            ])
            .expect("valid phases");
        let runner = ScenarioRunner::new(5).with_mission(mission).with_frame_rate(60);

        for scenario in ScenarioId::all() {
            let result = runner.run(scenario);
            assert!(result.passed, "{}: {:?}", scenario, result.failure_reason);
            assert_eq!(result.final_phase, 4);
            assert!((result.final_elapsed_secs - 27.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_observer_sees_every_frame() {
        let mut seen = 0u64;
        let result = ScenarioRunner::new(3)
            .with_frame_rate(10)
            .run_observed(ScenarioId::Nominal, |_, _| seen += 1);
        assert_eq!(seen, result.total_frames);
    }

    #[test]
    fn test_result_serializes_scenario_name() {
        let result = ScenarioRunner::new(9).with_frame_rate(5).run(ScenarioId::Overrun);
        let json = serde_json::to_value(&result).expect("serializable");
        assert_eq!(json["scenario"], "overrun");
        assert_eq!(json["passed"], true);
    }
}
