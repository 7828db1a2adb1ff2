//! Flight-phase and mode enums.

use serde::{Deserialize, Serialize};

/// Trajectory phase of a lofted missile.
///
/// Ordered: a missile only ever moves forward through these, never back.
/// Use [`LoftPhase::advance_to`] so the invariant holds at every call site.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum LoftPhase {
    /// Climbing on the loft pitch program.
    #[default]
    Boost,
    /// Shaped midcourse flight toward the predicted intercept point.
    Midcourse,
    /// Terminal homing on the target itself.
    Terminal,
}

impl LoftPhase {
    /// Advance to `next` if it is further along; phases never regress.
    pub fn advance_to(&mut self, next: LoftPhase) {
        if next > *self {
            *self = next;
        }
    }
}

/// Homing law a lofted missile hands over to at terminal range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminalHomingLaw {
    /// Proportional navigation.
    #[default]
    ProNav,
    /// PN augmented with a target-acceleration bias.
    AugmentedProNav,
    /// Steer straight at the target's current position.
    PurePursuit,
    /// Steer at the constant-acceleration predicted target position.
    PureLead,
}

/// Flight environment of the missile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlightMedium {
    /// Dense-enough atmosphere for aerodynamic control.
    #[default]
    Atmosphere,
    /// Vacuum or near-vacuum; aerodynamic g-limiting does not apply.
    Vacuum,
}

impl FlightMedium {
    pub fn is_vacuum(self) -> bool {
        self == FlightMedium::Vacuum
    }
}
