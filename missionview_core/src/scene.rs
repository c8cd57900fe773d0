//! Camera and scene transform derivation
//!
//! Purely cosmetic. The camera orbits the drone on two periodic functions of
//! elapsed time and never reads telemetry. Viewport changes only touch the
//! [`Projection`].

use crate::phase::Rgb;
use nalgebra::{Matrix4, Perspective3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Cinematic trailing camera parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraRig {
    /// Mean trailing distance
    pub base_distance: f64,
    pub distance_swing: f64,
    pub distance_rate: f64,

    /// Mean height above the drone
    pub base_height: f64,
    pub height_swing: f64,
    pub height_rate: f64,

    /// Angular rate of the orbit around the drone (rad/s)
    pub orbit_rate: f64,

    /// Aim point above the drone
    pub look_offset: f64,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            base_distance: 45.0,
            distance_swing: 15.0,
            distance_rate: 0.25,
            base_height: 30.0,
            height_swing: 8.0,
            height_rate: 0.15,
            orbit_rate: 0.25,
            look_offset: 5.0,
        }
    }
}

impl CameraRig {
    /// Camera placement for a drone at `drone` at time `t`.
    pub fn pose(&self, drone: &Vector3<f64>, t: f64) -> CameraPose {
        let distance = self.base_distance + (t * self.distance_rate).sin() * self.distance_swing;
        let height = self.base_height + (t * self.height_rate).cos() * self.height_swing;
        let theta = t * self.orbit_rate;

        CameraPose {
            position: drone + Vector3::new(theta.sin() * distance, height, theta.cos() * distance),
            target: drone + Vector3::new(0.0, self.look_offset, 0.0),
        }
    }
}

/// Where the camera sits and what it looks at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub position: Vector3<f64>,
    pub target: Vector3<f64>,
}

impl CameraPose {
    /// Establishing shot shown before playback.
    pub fn establishing() -> Self {
        Self {
            position: Vector3::new(40.0, 50.0, 70.0),
            target: Vector3::new(0.0, 10.0, 50.0),
        }
    }
}

/// Drone model transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vector3<f64>,
    /// Heading about +Y, radians
    pub yaw_rad: f64,
}

impl Pose {
    pub fn orientation(&self) -> UnitQuaternion<f64> {
        UnitQuaternion::from_axis_angle(&Vector3::y_axis(), self.yaw_rad)
    }

    /// Heading toward `next`, holding `self.yaw_rad` when the move is negligible.
    pub fn heading_to(&self, next: &Vector3<f64>) -> f64 {
        let delta = next - self.position;
        let planar = (delta.x * delta.x + delta.z * delta.z).sqrt();
        if planar < 1e-9 {
            self.yaw_rad
        } else {
            delta.x.atan2(delta.z)
        }
    }
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneTransform {
    pub drone: Pose,
    pub camera: CameraPose,
    pub propeller_angle_rad: f64,
    pub tint: Rgb,
}

impl SceneTransform {
    pub fn initial(drone_position: Vector3<f64>, tint: Rgb) -> Self {
        Self {
            drone: Pose {
                position: drone_position,
                yaw_rad: 0.0,
            },
            camera: CameraPose::establishing(),
            propeller_angle_rad: 0.0,
            tint,
        }
    }

    /// Derive the next scene from the previous one.
    ///
    /// `dt` is the elapsed-time step since `previous`; negative steps are
    /// treated as zero.
    pub fn advance(
        previous: &SceneTransform,
        rig: &CameraRig,
        position: Vector3<f64>,
        elapsed_secs: f64,
        dt: f64,
        rpm: f64,
        tint: Rgb,
    ) -> Self {
        let spin = dt.max(0.0) * rpm / 1000.0 * 2.0;
        Self {
            drone: Pose {
                position,
                yaw_rad: previous.drone.heading_to(&position),
            },
            camera: rig.pose(&position, elapsed_secs),
            propeller_angle_rad: (previous.propeller_angle_rad + spin).rem_euclid(TAU),
            tint,
        }
    }
}

// =============================================================================
// PROJECTION
// =============================================================================

/// Perspective projection of the 3D view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub fov_deg: f64,
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
    pub width: u32,
    pub height: u32,
}

impl Default for Projection {
    fn default() -> Self {
        Self::for_viewport(1280, 720)
    }
}

impl Projection {
    pub fn for_viewport(width: u32, height: u32) -> Self {
        let mut projection = Self {
            fov_deg: 70.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 4000.0,
            width: 1280,
            height: 720,
        };
        projection.resize(width, height);
        projection
    }

    /// Apply a viewport change. A zero dimension is ignored.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if height == 0 || width == 0 {
            return false;
        }
        self.width = width;
        self.height = height;
        self.aspect = width as f64 / height as f64;
        true
    }

    pub fn matrix(&self) -> Matrix4<f64> {
        Perspective3::new(self.aspect, self.fov_deg.to_radians(), self.near, self.far).to_homogeneous()
    }
}
