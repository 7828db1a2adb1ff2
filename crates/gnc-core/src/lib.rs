//! Shared vocabulary for the GNC workspace.
//!
//! This crate defines the types every guidance and control law speaks in:
//! kinematic snapshots, gain/config structs, per-missile session records,
//! the world-shape abstraction, and the kinematic predictors. It has no
//! dependency on any host engine or runtime framework.

pub mod constants;
pub mod enums;
pub mod gains;
pub mod geodesy;
pub mod kinematics;
pub mod session;
pub mod types;
