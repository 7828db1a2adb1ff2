//! Guidance laws: homing, command guidance, trajectory shaping, and
//! fire-control lead solutions.
//!
//! Every law is a pure function over kinematic snapshots (plus, for the
//! stateful laws, a small per-missile session record from `gnc-core`) and
//! returns a [`gnc_core::types::GuidanceSolution`]. Nothing here integrates
//! motion or touches the airframe; hosts feed the aim point and g demand to
//! their own autopilot.

pub mod clos;
pub mod kappa;
pub mod loft;
pub mod pronav;
pub mod solution;
pub mod surface;
pub mod weave;

#[cfg(test)]
mod tests;
