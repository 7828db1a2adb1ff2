//! AoA required for a commanded load factor.
//!
//! Normal force is `CL(α)·q·S + T·sin(α)`. The solver inverts this on the
//! linearized lift table: the breakpoint interval containing the root is
//! found by a short bisection (the calibration curves narrow the bounds
//! first), then the segment is inverted in closed form.

use std::f64::consts::PI;

use gnc_core::constants::{EPSILON, STANDARD_GRAVITY};
use gnc_core::enums::FlightMedium;
use gnc_core::types::AirframeSnapshot;
use tracing::trace;

use crate::tables::*;

const DEG2RAD: f64 = PI / 180.0;

fn limited(aoa: f64, max_aoa: f64) -> f64 {
    // NaN from an unreachable demand falls through to the configured limit.
    if aoa < max_aoa {
        aoa
    } else {
        max_aoa
    }
}

/// Invert `force = (slope·α + intc)·qS + T·α·deg2rad` — the small-angle
/// approximation of sin, valid below 15°.
pub fn aoa_for_load_linear(q_sk: f64, force: f64, cl_slope: f64, cl_intc: f64, thrust: f64) -> f64 {
    (force - cl_intc * q_sk) / (cl_slope * q_sk + thrust * DEG2RAD)
}

/// Invert the normal force using a second-order expansion of sin about 90°.
pub fn aoa_for_load_second_order(
    q_sk: f64,
    force: f64,
    cl_slope: f64,
    cl_intc: f64,
    thrust: f64,
) -> f64 {
    if thrust < EPSILON {
        return aoa_for_load_linear(q_sk, force, cl_slope, cl_intc, thrust);
    }
    let cl_alpha = cl_slope * q_sk;
    let td = thrust * DEG2RAD;
    (2.0 * cl_alpha + PI * td
        - 2.0
            * (cl_alpha * cl_alpha
                + PI * td * cl_alpha
                + 2.0 * td * DEG2RAD * (cl_intc * q_sk + thrust - force))
                .sqrt())
        / (2.0 * td * DEG2RAD)
}

/// AoA (degrees) that produces `g_limit` gees of normal acceleration, capped
/// at `max_aoa`.
///
/// `margin` (m/s² of extra demand tolerated at the local load maximum) keeps
/// the solver from commanding the high-drag post-stall angles when the local
/// maximum only just misses the demand. In vacuum the answer is always 180°:
/// load limiting there is a throttle problem, not an attitude one.
pub fn aoa_for_load(
    airframe: &AirframeSnapshot,
    medium: FlightMedium,
    g_limit: f64,
    margin: f64,
    max_aoa: f64,
) -> f64 {
    if medium.is_vacuum() {
        return 180.0;
    }

    // Demand as a force, and lift per unit CL.
    let force = g_limit * airframe.mass * STANDARD_GRAVITY;
    let q_sk = airframe.dynamic_pressure() * airframe.lift_area;
    let thrust = airframe.thrust;

    if thrust <= 0.0 {
        // Unpowered: only the lift curve up to its 30° maximum is usable.
        if force > 1.5 * q_sk {
            return limited(30.0, max_aoa);
        }
        let interval = if LIN_CL[2] * q_sk < force {
            2
        } else if LIN_CL[1] * q_sk > force {
            0
        } else {
            1
        };
        let aoa = aoa_for_load_linear(q_sk, force, LIN_SLOPE[interval], LIN_INTC[interval], 0.0);
        return limited(aoa, max_aoa);
    }

    let thrust_ratio = thrust / (1.5 * q_sk);
    let mut lhs = 0usize;
    let mut rhs = 7usize;

    if thrust_ratio < THRUST_RATIO_INFLEC2 {
        let local_max = q_sk * MAX_LOAD.evaluate(thrust_ratio);

        if thrust_ratio > THRUST_RATIO_INFLEC1 {
            // The 30°-ish maximum is only local; thrust makes the normal
            // force climb again toward 90°.
            let margin_force = margin.max(0.0) * airframe.mass;

            if local_max + margin_force < force {
                // Demand clearly exceeds the local maximum: the root, if it
                // exists, sits in the post-stall section.
                let absolute_max = 0.7 * q_sk + thrust;
                if absolute_max < force {
                    // Unreachable even at 90°; hold the local max to
                    // preserve energy.
                    trace!(thrust_ratio, "load demand exceeds 90 deg force");
                    return limited(AOA_OF_LOCAL_MAX.evaluate(thrust_ratio), max_aoa);
                }
                let aoa_eq = AOA_EQUAL_LOAD.evaluate(thrust_ratio);
                if aoa_eq > BREAKPOINTS_DEG[6] {
                    let aoa =
                        aoa_for_load_second_order(q_sk, force, LIN_SLOPE[6], LIN_INTC[6], thrust);
                    return limited(aoa, max_aoa);
                } else if aoa_eq > BREAKPOINTS_DEG[5] {
                    lhs = 5;
                } else {
                    lhs = 4;
                }
            } else if local_max > force {
                // Solvable below the local maximum; narrow the right bound
                // from the AoA where that maximum occurs.
                let aoa_max = AOA_OF_LOCAL_MAX.evaluate(thrust_ratio);
                rhs = if aoa_max > BREAKPOINTS_DEG[4] {
                    5
                } else if aoa_max > BREAKPOINTS_DEG[3] {
                    4
                } else {
                    3
                };
            } else {
                // Within the margin of the local maximum: settle for it
                // rather than pay post-stall drag.
                return limited(AOA_OF_LOCAL_MAX.evaluate(thrust_ratio), max_aoa);
            }
        } else if force < local_max {
            let aoa_max = AOA_OF_LOCAL_MAX.evaluate(thrust_ratio);
            rhs = if aoa_max > BREAKPOINTS_DEG[3] { 4 } else { 3 };
        } else {
            return max_aoa;
        }
    } else {
        // Past the second inflection the force is monotone in AoA over the
        // whole range; only the 90° endpoint bounds it.
        if 0.7 * q_sk + thrust < force {
            return max_aoa;
        }
    }

    if LIN_CL[rhs] * q_sk + thrust * LIN_SIN[rhs] < force {
        return max_aoa;
    }

    while rhs - lhs > 1 {
        let interval = (rhs + lhs) / 2;
        if LIN_CL[interval] * q_sk + thrust * LIN_SIN[interval] < force {
            lhs = interval;
        } else {
            rhs = interval;
        }
    }

    let aoa = if lhs == 0 {
        aoa_for_load_linear(q_sk, force, LIN_SLOPE[0], LIN_INTC[0], thrust)
    } else {
        aoa_for_load_second_order(q_sk, force, LIN_SLOPE[lhs], LIN_INTC[lhs], thrust)
    };
    limited(aoa, max_aoa)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn airframe(thrust: f64) -> AirframeSnapshot {
        AirframeSnapshot {
            mass: 100.0,
            thrust,
            speed: 300.0,
            air_density: 1.225,
            lift_area: 0.5,
            drag_area: 0.1,
        }
    }

    #[test]
    fn vacuum_never_aoa_limits() {
        assert_eq!(
            aoa_for_load(&airframe(5_000.0), FlightMedium::Vacuum, 30.0, 0.0, 35.0),
            180.0
        );
    }

    #[test]
    fn unpowered_solve_lands_in_first_interval() {
        let af = airframe(0.0);
        let q_sk = af.dynamic_pressure() * af.lift_area;
        let force = 10.0 * af.mass * STANDARD_GRAVITY;

        let aoa = aoa_for_load(&af, FlightMedium::Atmosphere, 10.0, 0.0, 35.0);
        assert_relative_eq!(aoa, force / (LIN_SLOPE[0] * q_sk), epsilon = 1e-9);
        assert!(aoa > 5.0 && aoa < 10.0);
    }

    #[test]
    fn unpowered_unreachable_demand_goes_to_stall_aoa() {
        // 60 g is beyond max lift; the answer is the 30° CL peak, capped by
        // the configured AoA limit.
        assert_eq!(
            aoa_for_load(&airframe(0.0), FlightMedium::Atmosphere, 60.0, 0.0, 25.0),
            25.0
        );
        assert_eq!(
            aoa_for_load(&airframe(0.0), FlightMedium::Atmosphere, 60.0, 0.0, 40.0),
            30.0
        );
    }

    #[test]
    fn powered_solve_is_monotone_in_demand() {
        let af = airframe(5_000.0);
        let low = aoa_for_load(&af, FlightMedium::Atmosphere, 10.0, 0.0, 60.0);
        let high = aoa_for_load(&af, FlightMedium::Atmosphere, 20.0, 0.0, 60.0);
        assert!(low > 5.0 && low < 10.0, "low-demand AoA {low}");
        assert!(high > 10.0 && high < 24.0, "high-demand AoA {high}");
        assert!(low < high);
    }

    #[test]
    fn powered_unreachable_demand_returns_max_aoa() {
        assert_eq!(
            aoa_for_load(&airframe(5_000.0), FlightMedium::Atmosphere, 1_000.0, 0.0, 40.0),
            40.0
        );
    }

    #[test]
    fn solved_aoa_reproduces_the_demand_on_the_linear_table() {
        let af = airframe(5_000.0);
        let q_sk = af.dynamic_pressure() * af.lift_area;
        let force = 20.0 * af.mass * STANDARD_GRAVITY;
        let aoa = aoa_for_load(&af, FlightMedium::Atmosphere, 20.0, 0.0, 60.0);

        // Between 10° and 24° the second-order sin model applies.
        let sin_approx = 1.0 - (aoa.to_radians() - PI / 2.0).powi(2) * 0.5;
        let model = (LIN_SLOPE[1] * aoa + LIN_INTC[1]) * q_sk + af.thrust * sin_approx;
        assert_relative_eq!(model, force, max_relative = 1e-9);
    }
}
