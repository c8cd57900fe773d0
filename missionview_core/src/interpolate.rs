//! The Flight Plan - per-profile interpolators driven by phase-local progress
//!
//! Every phase is sampled by its profile's interpolator at the cursor's
//! phase-local progress. The plan is built once from the phase table: each
//! phase records the pose, odometer and point count the previous phase ended
//! with, which the landing profiles start from and the parking orbit holds.
//! Sampling a frame is then a pure function of elapsed time with no carried
//! accumulators.
//!
//! The landing flags belong to the final phase alone, whatever its profile:
//! `landing_locked` and `mission_complete` are raised by its local progress
//! against [`LandingThresholds`] and are false everywhere else.

use crate::phase::{PhaseProfile, PhaseTable};
use crate::telemetry::{
    CameraReading, GnssReading, ImuReading, ImuStatus, LidarReading, LidarStatus, MotorReading,
    ProcessorReading,
};
use crate::timeline::PhaseCursor;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

// =============================================================================
// WAYPOINTS
// =============================================================================

/// Fixed scene geometry for the Earth-to-Mars sortie.
pub mod waypoints {
    use nalgebra::Vector3;

    /// Launch pad on Earth.
    pub fn base_station() -> Vector3<f64> {
        Vector3::new(-100.0, 0.0, -80.0)
    }

    /// Ascent ceiling; transit starts here above the base station.
    pub const CRUISE_ALTITUDE: f64 = 30.0;

    pub fn transit_start() -> Vector3<f64> {
        Vector3::new(-100.0, CRUISE_ALTITUDE, -80.0)
    }

    pub fn transit_end() -> Vector3<f64> {
        Vector3::new(60.0, 180.0, 180.0)
    }

    /// Orbit center in the horizontal plane (x, z).
    pub const ORBIT_CENTER_XZ: (f64, f64) = (60.0, 180.0);
    pub const ORBIT_RADIUS: f64 = 50.0;
    pub const ORBIT_BASE_Y: f64 = 95.0;
    pub const ORBIT_WOBBLE: f64 = 30.0;
    pub const ORBIT_WOBBLE_RATE: f64 = 0.7;
    pub const ORBIT_ALTITUDE: f64 = 85.0;

    /// End of a descent phase.
    pub fn approach() -> Vector3<f64> {
        Vector3::new(60.0, 40.0, 180.0)
    }

    /// Where a touchdown phase ends (skid height above the pad).
    pub fn touchdown() -> Vector3<f64> {
        Vector3::new(60.0, 9.0, 180.0)
    }

    /// Pad surface height used for surface distance.
    pub const PAD_HEIGHT: f64 = 8.0;

    /// Straight-line transit distance reported by the odometer.
    pub const TRANSIT_DISTANCE: f64 = 320.0;

    /// Points captured per mapping or survey phase.
    pub const SURVEY_POINTS: f64 = 80_000.0;

    /// Satellites in view at the end of the climb, held through transit.
    pub const CRUISE_SATELLITES: u32 = 15;
}

// =============================================================================
// TYPES
// =============================================================================

/// Progress thresholds within the final phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandingThresholds {
    /// `landing_locked` once progress exceeds this
    pub lock: f64,
    /// `mission_complete` once progress exceeds this
    pub touchdown: f64,
}

impl Default for LandingThresholds {
    fn default() -> Self {
        Self {
            lock: 0.3,
            touchdown: 0.85,
        }
    }
}

impl LandingThresholds {
    /// Raise the landing flags on a final-phase sample at local progress `p`.
    ///
    /// Past the touchdown threshold the motors spool down to idle and the
    /// IMU reports the terminal landed state.
    pub fn apply(&self, p: f64, sample: &mut PhaseSample) {
        let landed = p > self.touchdown;
        sample.spatial.landing_locked = p > self.lock;
        sample.spatial.mission_complete = landed;

        if landed {
            sample.components.motor = MotorReading::new((1.0 - p) * 1500.0, 42.0, 3.0);
            sample.components.imu.status = ImuStatus::Landed;
        }
    }
}

/// Kinematic state of the drone for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpatialState {
    pub position: Vector3<f64>,
    pub altitude: f64,
    pub speed: f64,
    pub distance_traveled: f64,
    pub surface_distance: f64,
    pub landing_locked: bool,
    pub mission_complete: bool,
}

impl SpatialState {
    /// Parked at `position` with every counter at zero.
    pub fn at_rest(position: Vector3<f64>) -> Self {
        Self {
            position,
            altitude: 0.0,
            speed: 0.0,
            distance_traveled: 0.0,
            surface_distance: 0.0,
            landing_locked: false,
            mission_complete: false,
        }
    }
}

/// Component readings produced by one interpolator. All four motors share
/// the same reading.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentReadings {
    pub motor: MotorReading,
    pub imu: ImuReading,
    pub gnss: GnssReading,
    pub camera: CameraReading,
    pub lidar: LidarReading,
    pub processor: ProcessorReading,
}

/// Interpolator output.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseSample {
    pub spatial: SpatialState,
    pub components: ComponentReadings,
}

/// State a phase inherits from the end of the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseContext {
    pub start_pose: Vector3<f64>,
    pub distance_before: f64,
    pub lidar_before: u64,
}

impl PhaseContext {
    pub fn launch() -> Self {
        Self {
            start_pose: waypoints::base_station(),
            distance_before: 0.0,
            lidar_before: 0,
        }
    }

    /// Context for the phase following one that ended in `end`.
    pub fn after(end: &PhaseSample) -> Self {
        Self {
            start_pose: end.spatial.position,
            distance_before: end.spatial.distance_traveled,
            lidar_before: end.components.lidar.points,
        }
    }
}

/// One fully resolved instant of the plan.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanSample {
    pub elapsed_secs: f64,
    pub cursor: PhaseCursor,
    pub sample: PhaseSample,
}

// =============================================================================
// FLIGHT PLAN
// =============================================================================

/// Phase table with the precomputed start context of every phase.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightPlan {
    table: PhaseTable,
    landing: LandingThresholds,
    contexts: Vec<PhaseContext>,
}

impl FlightPlan {
    pub fn new(table: PhaseTable, landing: LandingThresholds) -> Self {
        let mut contexts = Vec::with_capacity(table.len());
        let mut carry = PhaseContext::launch();

        // Each phase starts where the previous one ended at progress 1.0.
        for phase in table.phases() {
            contexts.push(carry);
            carry = PhaseContext::after(&interpolate(phase.profile, 1.0, &carry));
        }

        Self {
            table,
            landing,
            contexts,
        }
    }

    pub fn table(&self) -> &PhaseTable {
        &self.table
    }

    pub fn landing(&self) -> &LandingThresholds {
        &self.landing
    }

    /// Start context of every phase, in table order.
    pub fn contexts(&self) -> &[PhaseContext] {
        &self.contexts
    }

    /// Start context of `phase_index`. Out-of-range indices map to the last phase.
    pub fn context(&self, phase_index: usize) -> &PhaseContext {
        let index = phase_index.min(self.contexts.len().saturating_sub(1));
        &self.contexts[index]
    }

    /// Resolve everything the animator needs at `elapsed_secs`.
    pub fn sample(&self, elapsed_secs: f64) -> PlanSample {
        let t = self.table.clamp_elapsed(elapsed_secs);
        let cursor = self.table.resolve(t);
        let profile = self.table.phases()[cursor.phase_index].profile;

        let mut sample = interpolate(profile, cursor.local_progress, self.context(cursor.phase_index));
        if cursor.phase_index == self.table.last_index() {
            self.landing.apply(cursor.local_progress, &mut sample);
        }

        PlanSample {
            elapsed_secs: t,
            cursor,
            sample,
        }
    }
}

// =============================================================================
// INTERPOLATORS
// =============================================================================

/// Evaluate `profile` at phase-local progress `p`.
///
/// Pure: the same inputs always give the same sample. `p` is clamped to
/// `[0, 1]` (NaN reads as 0). The landing flags are left false; only the
/// final phase raises them, see [`LandingThresholds::apply`].
pub fn interpolate(profile: PhaseProfile, p: f64, ctx: &PhaseContext) -> PhaseSample {
    let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };

    let mut sample = match profile {
        PhaseProfile::Ascent => ascent(p, ctx),
        PhaseProfile::Transit => transit(p, ctx),
        PhaseProfile::Orbit => orbit(p, ctx, false),
        PhaseProfile::Survey => orbit(p, ctx, true),
        PhaseProfile::Descent => descent(p, ctx),
        PhaseProfile::Touchdown => touchdown(p, ctx),
    };

    let spatial = &mut sample.spatial;
    spatial.altitude = spatial.altitude.max(0.0);
    spatial.speed = spatial.speed.max(0.0);
    spatial.surface_distance = spatial.surface_distance.max(0.0);
    sample
}

fn calibrated_imu() -> ImuReading {
    ImuReading {
        roll_pitch_deg: 0.0,
        yaw_deg: 0.0,
        status: ImuStatus::Calibrated,
    }
}

fn survey_points(p: f64) -> u64 {
    (waypoints::SURVEY_POINTS * p).floor() as u64
}

/// Readings held from orbit insertion until landing.
fn orbital_components(ctx: &PhaseContext) -> ComponentReadings {
    ComponentReadings {
        motor: MotorReading::new(6500.0, 60.0, 20.0),
        imu: calibrated_imu(),
        gnss: GnssReading::DENIED,
        camera: CameraReading::uhd(false),
        lidar: LidarReading {
            points: ctx.lidar_before,
            range_m: 200.0,
            status: LidarStatus::Scanning,
        },
        processor: ProcessorReading {
            cpu_percent: 85.0,
            memory_percent: 80.0,
            temp_c: 68.0,
        },
    }
}

fn ascent(p: f64, ctx: &PhaseContext) -> PhaseSample {
    let altitude = waypoints::CRUISE_ALTITUDE * p;
    let position = waypoints::base_station() + Vector3::new(0.0, altitude, 0.0);

    PhaseSample {
        spatial: SpatialState {
            position,
            altitude,
            speed: 25.0 * p,
            distance_traveled: ctx.distance_before,
            surface_distance: 0.0,
            landing_locked: false,
            mission_complete: false,
        },
        components: ComponentReadings {
            motor: MotorReading::new(6000.0 * p, 35.0 + 25.0 * p, 18.0 * p),
            imu: calibrated_imu(),
            gnss: GnssReading {
                locked: true,
                satellites: (14 + (2.0 * p).floor() as u32).min(waypoints::CRUISE_SATELLITES),
                accuracy_m: 1.2,
            },
            camera: CameraReading::uhd(true),
            lidar: LidarReading {
                points: ctx.lidar_before,
                range_m: 0.0,
                status: LidarStatus::Idle,
            },
            processor: ProcessorReading {
                cpu_percent: 30.0 + 30.0 * p,
                memory_percent: 20.0,
                temp_c: 38.0,
            },
        },
    }
}

fn transit(p: f64, _ctx: &PhaseContext) -> PhaseSample {
    let position = waypoints::transit_start().lerp(&waypoints::transit_end(), p);

    PhaseSample {
        spatial: SpatialState {
            position,
            altitude: position.y,
            speed: 50.0,
            distance_traveled: waypoints::TRANSIT_DISTANCE * p,
            surface_distance: 0.0,
            landing_locked: false,
            mission_complete: false,
        },
        components: ComponentReadings {
            motor: MotorReading::new(6000.0 + 2500.0 * p, 55.0 + 15.0 * p, 22.0),
            imu: calibrated_imu(),
            gnss: GnssReading {
                locked: true,
                satellites: waypoints::CRUISE_SATELLITES,
                accuracy_m: 1.2,
            },
            camera: CameraReading::uhd(true),
            lidar: LidarReading {
                points: survey_points(p),
                range_m: 250.0 * p,
                status: LidarStatus::Mapping,
            },
            processor: ProcessorReading {
                cpu_percent: 65.0 + 25.0 * p,
                memory_percent: 50.0,
                temp_c: 62.0,
            },
        },
    }
}

fn orbit(p: f64, ctx: &PhaseContext, survey: bool) -> PhaseSample {
    let angle = 2.0 * PI * p;
    let (cx, cz) = waypoints::ORBIT_CENTER_XZ;
    let position = Vector3::new(
        cx + angle.cos() * waypoints::ORBIT_RADIUS,
        waypoints::ORBIT_BASE_Y + (angle * waypoints::ORBIT_WOBBLE_RATE).sin() * waypoints::ORBIT_WOBBLE,
        cz + angle.sin() * waypoints::ORBIT_RADIUS,
    );

    let mut components = orbital_components(ctx);
    if survey {
        components.camera.recording = true;
        components.lidar.points = ctx.lidar_before + survey_points(p);
        components.lidar.status = LidarStatus::Recording;
    }

    PhaseSample {
        spatial: SpatialState {
            position,
            altitude: waypoints::ORBIT_ALTITUDE,
            speed: 30.0,
            distance_traveled: waypoints::TRANSIT_DISTANCE + waypoints::ORBIT_RADIUS * PI * p,
            surface_distance: waypoints::ORBIT_ALTITUDE,
            landing_locked: false,
            mission_complete: false,
        },
        components,
    }
}

fn descent(p: f64, ctx: &PhaseContext) -> PhaseSample {
    let target = waypoints::approach();
    let position = ctx.start_pose.lerp(&target, p);
    let path = (target - ctx.start_pose).norm();

    PhaseSample {
        spatial: SpatialState {
            position,
            altitude: position.y,
            speed: 50.0 - 40.0 * p,
            distance_traveled: ctx.distance_before + path * p,
            surface_distance: position.y - waypoints::PAD_HEIGHT,
            landing_locked: false,
            mission_complete: false,
        },
        components: orbital_components(ctx),
    }
}

fn touchdown(p: f64, ctx: &PhaseContext) -> PhaseSample {
    let target = waypoints::touchdown();
    let position = ctx.start_pose.lerp(&target, p);
    let path = (target - ctx.start_pose).norm();

    PhaseSample {
        spatial: SpatialState {
            position,
            altitude: position.y,
            speed: 10.0 * (1.0 - p),
            distance_traveled: ctx.distance_before + path * p,
            surface_distance: position.y - waypoints::PAD_HEIGHT,
            landing_locked: false,
            mission_complete: false,
        },
        components: orbital_components(ctx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::{Phase, Rgb};
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn plan() -> FlightPlan {
        FlightPlan::new(PhaseTable::mars_sortie(), LandingThresholds::default())
    }

    fn table(phases: &[(f64, PhaseProfile)]) -> PhaseTable {
        PhaseTable::new(
            phases
                .iter()
                .enumerate()
                .map(|(i, (d, profile))| Phase::new(format!("P{}", i), *d, Rgb::new(0, 0, 0), *profile))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_phase_start_is_previous_phase_end() {
        let plan = plan();
        let phases = plan.table().phases();
        assert_eq!(plan.contexts().len(), phases.len());
        assert_eq!(plan.contexts()[0], PhaseContext::launch());

        for i in 1..phases.len() {
            let end = interpolate(phases[i - 1].profile, 1.0, plan.context(i - 1));
            assert_eq!(plan.context(i), &PhaseContext::after(&end));
        }
        assert_eq!(plan.context(99), plan.context(9));
    }

    #[test]
    fn test_takeoff_restarts_from_the_pad() {
        // "Takeoff" starts at t=2 with local progress 0
        let s = plan().sample(2.0);
        assert_eq!(s.cursor.phase_index, 1);
        assert_relative_eq!(s.cursor.local_progress, 0.0);
        assert_relative_eq!(s.sample.spatial.altitude, 0.0);
        assert_relative_eq!(s.sample.spatial.speed, 0.0);
        assert_relative_eq!(s.sample.components.motor.rpm, 0.0);
        assert_relative_eq!(s.sample.spatial.position, waypoints::base_station());
    }

    #[test]
    fn test_transit_phase_starts_at_transit_start() {
        // "Transit to Mars" starts at t=9 with local progress 0
        let s = plan().sample(9.0);
        assert_eq!(s.cursor.phase_index, 3);
        assert_relative_eq!(s.cursor.local_progress, 0.0);
        assert_relative_eq!(s.sample.spatial.position, waypoints::transit_start());
        assert_relative_eq!(s.sample.spatial.altitude, 30.0);
        assert_relative_eq!(s.sample.spatial.distance_traveled, 0.0);
        assert_relative_eq!(s.sample.components.motor.rpm, 6000.0);
        assert_eq!(s.sample.components.lidar.points, 0);
    }

    #[test]
    fn test_ascent_values() {
        let s = interpolate(PhaseProfile::Ascent, 0.5, &PhaseContext::launch());
        assert_relative_eq!(s.spatial.altitude, 15.0);
        assert_relative_eq!(s.spatial.speed, 12.5);
        assert_relative_eq!(s.spatial.position, Vector3::new(-100.0, 15.0, -80.0));
        assert_relative_eq!(s.components.motor.rpm, 3000.0);
        assert_relative_eq!(s.components.motor.current_a, 9.0);
        assert_relative_eq!(s.components.motor.temp_c, 47.5);
        assert_eq!(s.components.gnss.satellites, 15);
        assert!(s.components.camera.recording);
    }

    #[test]
    fn test_transit_endpoints() {
        let ctx = PhaseContext::launch();
        let start = interpolate(PhaseProfile::Transit, 0.0, &ctx);
        let end = interpolate(PhaseProfile::Transit, 1.0, &ctx);

        assert_relative_eq!(start.spatial.position, Vector3::new(-100.0, 30.0, -80.0));
        assert_relative_eq!(end.spatial.position, Vector3::new(60.0, 180.0, 180.0));
        assert_relative_eq!(end.spatial.altitude, 180.0);
        assert_relative_eq!(end.spatial.distance_traveled, 320.0);
        assert_relative_eq!(end.components.motor.rpm, 8500.0);
        assert_eq!(end.components.lidar.points, 80_000);
        assert_eq!(end.components.lidar.status, LidarStatus::Mapping);
    }

    #[test]
    fn test_transit_keeps_last_climb_fix() {
        let plan = plan();
        let climb = plan.sample(8.99).sample.components.gnss;
        assert_eq!(climb.satellites, 15);

        for t in [9.0, 14.0, 23.9] {
            let gnss = plan.sample(t).sample.components.gnss;
            assert!(gnss.locked);
            assert_eq!(gnss.satellites, 15);
            assert_relative_eq!(gnss.accuracy_m, 1.2);
        }
    }

    #[test]
    fn test_orbit_denies_gnss_and_holds_points() {
        let ctx = PhaseContext {
            start_pose: Vector3::new(60.0, 180.0, 180.0),
            distance_before: 320.0,
            lidar_before: 80_000,
        };

        let orbit = interpolate(PhaseProfile::Orbit, 0.25, &ctx);
        assert!(!orbit.components.gnss.locked);
        assert_eq!(orbit.components.lidar.points, 80_000);
        assert_eq!(orbit.components.lidar.status, LidarStatus::Scanning);
        assert!(!orbit.components.camera.recording);
        assert_relative_eq!(orbit.spatial.position.x, 60.0, epsilon = 1e-9);
        assert_relative_eq!(orbit.spatial.position.z, 230.0, epsilon = 1e-9);
        assert_relative_eq!(orbit.spatial.altitude, 85.0);

        let survey = interpolate(PhaseProfile::Survey, 0.5, &ctx);
        assert_eq!(survey.components.lidar.points, 120_000);
        assert_eq!(survey.components.lidar.status, LidarStatus::Recording);
        assert!(survey.components.camera.recording);
        assert_relative_eq!(survey.spatial.distance_traveled, 320.0 + 25.0 * PI, epsilon = 1e-9);
    }

    #[test]
    fn test_descent_reaches_approach() {
        let ctx = PhaseContext {
            start_pose: Vector3::new(60.0, 95.0, 180.0),
            distance_before: 100.0,
            lidar_before: 0,
        };
        let s = interpolate(PhaseProfile::Descent, 1.0, &ctx);
        assert_relative_eq!(s.spatial.position, waypoints::approach());
        assert_relative_eq!(s.spatial.surface_distance, 32.0);
        assert_relative_eq!(s.spatial.speed, 10.0);
        assert_relative_eq!(s.spatial.distance_traveled, 155.0);
    }

    #[test]
    fn test_interpolators_leave_landing_flags_down() {
        let ctx = PhaseContext::launch();
        let s = interpolate(PhaseProfile::Touchdown, 1.0, &ctx);
        assert!(!s.spatial.landing_locked);
        assert!(!s.spatial.mission_complete);
        assert_relative_eq!(s.components.motor.rpm, 6500.0);
    }

    #[test]
    fn test_landing_thresholds_and_idle_override() {
        let ctx = PhaseContext {
            start_pose: waypoints::approach(),
            distance_before: 0.0,
            lidar_before: 160_000,
        };
        let landing = LandingThresholds::default();
        let at = |p: f64| {
            let mut s = interpolate(PhaseProfile::Touchdown, p, &ctx);
            landing.apply(p, &mut s);
            s
        };

        assert!(!at(0.3).spatial.landing_locked);

        let locked = at(0.31);
        assert!(locked.spatial.landing_locked);
        assert!(!locked.spatial.mission_complete);
        assert_relative_eq!(locked.components.motor.rpm, 6500.0);

        assert!(!at(0.85).spatial.mission_complete);

        let landed = at(0.9);
        assert!(landed.spatial.mission_complete);
        assert_relative_eq!(landed.components.motor.rpm, 150.0, epsilon = 1e-9);
        assert_relative_eq!(landed.components.motor.temp_c, 42.0);
        assert_eq!(landed.components.imu.status, ImuStatus::Landed);

        let end = at(1.0);
        assert_relative_eq!(end.spatial.position, waypoints::touchdown());
        assert_relative_eq!(end.spatial.altitude, 9.0);
        assert_relative_eq!(end.spatial.surface_distance, 1.0);
        assert_relative_eq!(end.spatial.speed, 0.0);
    }

    #[test]
    fn test_custom_thresholds() {
        let landing = LandingThresholds { lock: 0.1, touchdown: 0.5 };
        let mut s = interpolate(PhaseProfile::Touchdown, 0.6, &PhaseContext::launch());
        landing.apply(0.6, &mut s);
        assert!(s.spatial.landing_locked);
        assert!(s.spatial.mission_complete);
    }

    #[test]
    fn test_earlier_touchdown_phase_never_completes() {
        let plan = FlightPlan::new(
            table(&[
                (2.0, PhaseProfile::Ascent),
                (10.0, PhaseProfile::Touchdown),
                (1.0, PhaseProfile::Touchdown),
            ]),
            LandingThresholds::default(),
        );

        let mid = plan.sample(11.5);
        assert_eq!(mid.cursor.phase_index, 1);
        assert!(mid.cursor.local_progress > 0.85);
        assert!(!mid.sample.spatial.landing_locked);
        assert!(!mid.sample.spatial.mission_complete);

        let end = plan.sample(13.0);
        assert_eq!(end.cursor.phase_index, 2);
        assert!(end.sample.spatial.landing_locked);
        assert!(end.sample.spatial.mission_complete);
    }

    #[test]
    fn test_final_phase_completes_whatever_its_profile() {
        let plan = FlightPlan::new(
            table(&[
                (2.0, PhaseProfile::Ascent),
                (2.0, PhaseProfile::Touchdown),
                (3.0, PhaseProfile::Orbit),
            ]),
            LandingThresholds::default(),
        );

        assert!(!plan.sample(3.9).sample.spatial.mission_complete);
        assert!(!plan.sample(6.5).sample.spatial.mission_complete);
        assert!(plan.sample(6.7).sample.spatial.mission_complete);

        let end = plan.sample(7.0);
        assert_eq!(end.cursor.phase_index, 2);
        assert!(end.sample.spatial.landing_locked);
        assert!(end.sample.spatial.mission_complete);
        assert_eq!(end.sample.components.imu.status, ImuStatus::Landed);
    }

    #[test]
    fn test_zero_duration_phase_chains_its_end() {
        let plan = FlightPlan::new(
            table(&[
                (2.0, PhaseProfile::Ascent),
                (0.0, PhaseProfile::Transit),
                (2.0, PhaseProfile::Touchdown),
            ]),
            LandingThresholds::default(),
        );

        assert_eq!(plan.context(2).start_pose, waypoints::transit_end());

        let s = plan.sample(2.0);
        assert_eq!(s.cursor.phase_index, 2);
        assert_relative_eq!(s.cursor.local_progress, 0.0);
        assert_relative_eq!(s.sample.spatial.position, waypoints::transit_end());
    }

    #[test]
    fn test_sample_pins_at_total() {
        let plan = plan();
        let end = plan.sample(54.0);
        assert_eq!(end.cursor.phase_index, plan.table().last_index());
        assert_relative_eq!(end.cursor.local_progress, 1.0);
        assert!(end.sample.spatial.mission_complete);
        assert_eq!(plan.sample(60.0), end);
    }

    proptest! {
        #[test]
        fn prop_counters_monotonic_within_a_phase(
            index in 0usize..10,
            a in 0.0f64..=1.0,
            b in 0.0f64..=1.0,
        ) {
            let plan = plan();
            let profile = plan.table().phases()[index].profile;
            let ctx = plan.context(index);
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let s_lo = interpolate(profile, lo, ctx);
            let s_hi = interpolate(profile, hi, ctx);
            prop_assert!(s_hi.spatial.distance_traveled + 1e-9 >= s_lo.spatial.distance_traveled);
            prop_assert!(s_hi.components.lidar.points >= s_lo.components.lidar.points);
        }

        #[test]
        fn prop_landing_flags_only_in_final_phase(t in 0.0f64..=54.0) {
            let plan = plan();
            let s = plan.sample(t);
            let last = s.cursor.phase_index == plan.table().last_index();
            let p = s.cursor.local_progress;
            prop_assert_eq!(s.sample.spatial.landing_locked, last && p > 0.3);
            prop_assert_eq!(s.sample.spatial.mission_complete, last && p > 0.85);
        }
    }
}
