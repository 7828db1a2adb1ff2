//! Plain-data snapshot types shared by the guidance and aero crates.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Position, velocity, and acceleration of a body at one instant (world frame).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct KinematicState {
    pub position: DVec3,
    pub velocity: DVec3,
    pub acceleration: DVec3,
}

impl KinematicState {
    pub fn new(position: DVec3, velocity: DVec3, acceleration: DVec3) -> Self {
        Self {
            position,
            velocity,
            acceleration,
        }
    }

    /// Snapshot of a body moving at constant velocity.
    pub fn coasting(position: DVec3, velocity: DVec3) -> Self {
        Self::new(position, velocity, DVec3::ZERO)
    }

    /// Speed (m/s).
    pub fn speed(&self) -> f64 {
        self.velocity.length()
    }

    /// Unit velocity direction; zero when at rest.
    pub fn velocity_dir(&self) -> DVec3 {
        self.velocity.normalize_or_zero()
    }
}

/// A guidance beam: a ray from an illuminating sensor toward the target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Beam {
    pub origin: DVec3,
    /// Unit direction along the beam.
    pub direction: DVec3,
}

impl Beam {
    pub fn new(origin: DVec3, direction: DVec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Point on the beam `distance` meters from the origin.
    pub fn point_at(&self, distance: f64) -> DVec3 {
        self.origin + self.direction * distance
    }
}

/// Result of one guidance-law evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuidanceSolution {
    /// World-frame point the airframe should steer toward.
    pub aim_point: DVec3,
    /// Lateral acceleration demand in gees. Zero means the law makes no
    /// demand and the airframe limit applies unchanged.
    pub g_limit: f64,
    /// Estimated time to intercept, when the law computes one.
    pub time_to_go: Option<f64>,
}

impl GuidanceSolution {
    /// A solution that only steers, with no g demand or intercept estimate.
    pub fn steer_to(aim_point: DVec3) -> Self {
        Self {
            aim_point,
            g_limit: 0.0,
            time_to_go: None,
        }
    }
}

/// Mass, propulsion, and airstream numbers the aero-aware laws need.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AirframeSnapshot {
    /// Total mass (kg).
    pub mass: f64,
    /// Current engine thrust (N).
    pub thrust: f64,
    /// Airspeed (m/s).
    pub speed: f64,
    /// Local atmospheric density (kg/m³).
    pub air_density: f64,
    /// Lift reference area times lift multiplier (m²).
    pub lift_area: f64,
    /// Drag reference area times drag multiplier (m²).
    pub drag_area: f64,
}

impl AirframeSnapshot {
    /// Dynamic pressure q = ½ρv² (Pa).
    pub fn dynamic_pressure(&self) -> f64 {
        0.5 * self.air_density * self.speed * self.speed
    }
}
