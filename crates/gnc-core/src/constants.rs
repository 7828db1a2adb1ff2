//! Physical constants and guidance tuning floors.

/// Standard gravity (m/s²), used to express lateral accelerations in gees.
pub const STANDARD_GRAVITY: f64 = 9.80665;

/// Reciprocal of standard gravity.
pub const INV_STANDARD_GRAVITY: f64 = 1.0 / STANDARD_GRAVITY;

/// Minimum airspeed (m/s) the guidance laws assume when computing lead and
/// beam-correction budgets. Below this the geometry degenerates (e.g. a
/// missile still on the rail), so commands are computed as if the missile
/// were already at this speed.
pub const MIN_GUIDANCE_SPEED: f64 = 200.0;

/// Lead-time horizon for most laws (seconds).
pub const LEAD_HORIZON: f64 = 8.0;

/// Longer lead horizon used by the loft and kappa midcourse laws (seconds).
pub const LOFT_LEAD_HORIZON: f64 = 16.0;

/// Upper bound handed to closest-point-of-approach searches (seconds).
pub const CPA_HORIZON: f64 = 120.0;

/// Cap on estimated time-to-go in the kappa law (seconds).
pub const KAPPA_TTGO_CAP: f64 = 60.0;

/// Aim-point extrapolation horizon for the weave law (seconds).
pub const WEAVE_AIM_HORIZON: f64 = 4.0;

/// Aim-point extrapolation horizon for the kappa law (seconds).
pub const KAPPA_AIM_HORIZON: f64 = 3.0;

/// Range (m) below which line-of-sight geometry is considered degenerate.
pub const RANGE_FLOOR: f64 = 1.0;

/// Generic floor for near-zero denominators and degenerate directions.
pub const EPSILON: f64 = 1e-9;
