//! World-shape abstraction: up vectors, altitude, and gravity.

use glam::DVec3;

use crate::constants::STANDARD_GRAVITY;

/// Environment queries the guidance laws need from the host world.
pub trait Geodesy {
    /// Local up unit vector at a world position.
    fn up_at(&self, position: DVec3) -> DVec3;

    /// Altitude (m) above the reference surface.
    fn altitude_at(&self, position: DVec3) -> f64;

    /// Gravitational acceleration magnitude (m/s²).
    fn gravity_at(&self, position: DVec3) -> f64;

    /// Gravity vector; points along local down.
    fn gravity_vector_at(&self, position: DVec3) -> DVec3 {
        -self.up_at(position) * self.gravity_at(position)
    }

    /// Body radius (m) for over-the-horizon curvature compensation.
    /// Zero on a flat world, where the compensation vanishes anyway.
    fn body_radius(&self) -> f64;
}

/// Flat world: +Z up, constant gravity. Reference implementation for tests
/// and for hosts without a curved planet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatWorld {
    pub gravity: f64,
}

impl Default for FlatWorld {
    fn default() -> Self {
        Self {
            gravity: STANDARD_GRAVITY,
        }
    }
}

impl Geodesy for FlatWorld {
    fn up_at(&self, _position: DVec3) -> DVec3 {
        DVec3::Z
    }

    fn altitude_at(&self, position: DVec3) -> f64 {
        position.z
    }

    fn gravity_at(&self, _position: DVec3) -> f64 {
        self.gravity
    }

    fn body_radius(&self) -> f64 {
        0.0
    }
}
