//! Per-missile guidance session records.
//!
//! These are the only pieces of mutable state the guidance laws carry
//! between ticks. Everything else is recomputed from snapshots each call.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Weave-law state. Created inactive; the law latches its activation record
/// on the first tick it runs with a valid closing geometry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeaveSession {
    pub activation: Option<WeaveActivation>,
}

impl WeaveSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.activation.is_some()
    }
}

/// Values latched when the weave law first engages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeaveActivation {
    /// Weave epoch offset ω·tgo₀ (radians) so the weave starts at zero
    /// displacement and ends on the target.
    pub phase_offset: f64,
    /// Missile position at activation; anchors the down-range weave axis.
    pub start_position: DVec3,
    /// Altitude at activation; caps the descent-profile altitude clamp.
    pub start_altitude: f64,
    /// Vertical weave amplitude (gees) after one-shot jitter.
    pub g_vertical: f64,
    /// Horizontal weave amplitude (gees) after jitter; sign randomized.
    pub g_horizontal: f64,
}

/// Which breakpoint intervals of the torque tables can contain the
/// torque-limit root, given the drag-to-lift area ratio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TorqueBounds {
    /// No local maximum exists; every interval must be searched.
    #[default]
    FullRange,
    /// Aero torque never recovers past its local max; the root lies in the
    /// intervals left of `right`.
    LowOnly { right: usize },
    /// A local max followed by a second rise toward 90°. `pivot` splits the
    /// low-AoA and high-AoA searches.
    Split { pivot: usize },
}

/// Cached torque-envelope search hints for one airframe.
///
/// Depends only on the lift and drag reference areas, so it is recomputed
/// only when those change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TorqueBoundCache {
    /// `(lift_area, drag_area)` the cached values were computed for.
    pub computed_for: Option<(f64, f64)>,
    pub bounds: TorqueBounds,
    /// AoA (degrees) of the local aero-torque maximum.
    pub local_max_aoa: f64,
    /// Non-dimensional torque at the local maximum.
    pub local_max_torque: f64,
}

impl TorqueBoundCache {
    pub fn is_current(&self, lift_area: f64, drag_area: f64) -> bool {
        self.computed_for == Some((lift_area, drag_area))
    }
}
