//! Aerodynamic envelope solvers and the aero force/torque controller.
//!
//! The lift and drag coefficient curves are piecewise cubic Hermite splines;
//! the envelope solvers work on a fixed linearization of those curves
//! (breakpoints every few degrees of AoA) so that inverting "what AoA gives
//! this load" costs a handful of comparisons and one division instead of an
//! iterative root find.

pub mod forces;
pub mod limits;
pub mod tables;
pub mod torque_limit;
