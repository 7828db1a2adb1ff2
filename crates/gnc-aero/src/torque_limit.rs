//! AoA at which the control torque budget can no longer hold the airframe.
//!
//! The destabilizing aero torque about the center of mass scales with
//! `cos(α)·CL·S_lift + sin(α)·CD·S_drag`. Inverting "what AoA saturates the
//! budget" uses the same linearized-table bisection as the load solver; the
//! interval hints depend only on the drag-to-lift area ratio, so they are
//! cached per airframe and recomputed only when the areas change.

use gnc_core::constants::EPSILON;
use gnc_core::session::{TorqueBoundCache, TorqueBounds};
use gnc_core::types::AirframeSnapshot;
use tracing::debug;

use crate::tables::*;

/// Moment arm (m) from the center of mass to the aero center.
pub const AERO_CENTER_DIST: f64 = 1.0;
/// Fraction of the torque budget the solver is allowed to spend.
const TORQUE_HEADROOM: f64 = 0.8;

/// Recompute the bisection hints for the given reference areas.
pub fn compute_torque_bounds(cache: &mut TorqueBoundCache, lift_area: f64, drag_area: f64) {
    let drag_lift = drag_area / lift_area;
    // Fractional drag contribution to the combined torque scale.
    let drag_share = drag_lift / (drag_lift + 1.0);

    cache.bounds = TorqueBounds::FullRange;
    if drag_lift < DRAG_LIFT_INFLEC2 {
        if drag_lift < DRAG_LIFT_INFLEC1 {
            // Torque never recovers past its ~28° maximum.
            cache.bounds = TorqueBounds::LowOnly { right: 3 };
        } else {
            let aoa_return = TORQUE_AOA_RETURN.evaluate(drag_lift);
            let pivot = if aoa_return > BREAKPOINTS_DEG[6] {
                6
            } else if aoa_return > BREAKPOINTS_DEG[5] {
                5
            } else {
                4
            };
            cache.bounds = TorqueBounds::Split { pivot };
        }
        // Both happen to be linear in the area ratios.
        cache.local_max_aoa = 0.0307482 * drag_lift + 28.49333;
        cache.local_max_torque = -1.30417 * drag_share + 1.30879;
    }
    cache.computed_for = Some((lift_area, drag_area));
    debug!(
        drag_lift,
        bounds = ?cache.bounds,
        "torque bounds recomputed"
    );
}

/// AoA (degrees) at which the aero torque consumes `max_torque` (N·m), or
/// 180° when the budget exceeds anything the airstream can produce.
///
/// Only 80% of the budget is spent, leaving authority for disturbances.
pub fn aoa_for_torque(
    airframe: &AirframeSnapshot,
    cache: &mut TorqueBoundCache,
    max_torque: f64,
) -> f64 {
    let lift_sk = airframe.lift_area;
    let drag_sk = airframe.drag_area;
    if !cache.is_current(lift_sk, drag_sk) {
        compute_torque_bounds(cache, lift_sk, drag_sk);
    }

    let q = airframe.dynamic_pressure();
    if q < EPSILON {
        return 180.0;
    }
    // Normalize the budget the way the tables are normalized.
    let budget = max_torque / (q * AERO_CENTER_DIST) * TORQUE_HEADROOM;

    let mut lhs = 0usize;
    let mut rhs = 7usize;

    match cache.bounds {
        TorqueBounds::Split { pivot } => {
            if budget > cache.local_max_torque * (drag_sk + lift_sk) {
                // Past the local max the torque climbs again; check whether
                // the budget also clears the 90° endpoint.
                if budget > lift_sk * LIN_LIFT_TORQUE[7] + drag_sk * LIN_DRAG_TORQUE[7] {
                    return 180.0;
                }
                lhs = pivot;
            } else {
                rhs = pivot;
            }
        }
        TorqueBounds::LowOnly { right } => {
            if budget > cache.local_max_torque * (drag_sk + lift_sk) {
                // Torque only decays past the local max, so clearing it
                // means the budget is never saturated.
                return 180.0;
            }
            rhs = right;
        }
        TorqueBounds::FullRange => {
            if budget > lift_sk * LIN_LIFT_TORQUE[7] + drag_sk * LIN_DRAG_TORQUE[7] {
                return 180.0;
            }
        }
    }

    while rhs - lhs > 1 {
        let interval = (rhs + lhs) / 2;
        let torque = lift_sk * LIN_LIFT_TORQUE[interval] + drag_sk * LIN_DRAG_TORQUE[interval];
        if torque < budget {
            lhs = interval;
        } else {
            rhs = interval;
        }
    }

    (budget - (LIN_LIFT_TORQUE_INTC[lhs] * lift_sk + LIN_DRAG_TORQUE_INTC[lhs] * drag_sk))
        / (LIN_LIFT_TORQUE_SLOPE[lhs] * lift_sk + LIN_DRAG_TORQUE_SLOPE[lhs] * drag_sk)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn airframe(lift_area: f64, drag_area: f64) -> AirframeSnapshot {
        AirframeSnapshot {
            mass: 100.0,
            thrust: 0.0,
            speed: 300.0,
            air_density: 1.225,
            lift_area,
            drag_area,
        }
    }

    #[test]
    fn bounds_reflect_drag_to_lift_ratio() {
        let mut cache = TorqueBoundCache::default();

        compute_torque_bounds(&mut cache, 1.0, 1.0);
        assert_eq!(cache.bounds, TorqueBounds::LowOnly { right: 3 });
        assert_relative_eq!(cache.local_max_aoa, 28.5240782, epsilon = 1e-6);
        assert_relative_eq!(cache.local_max_torque, 0.656705, epsilon = 1e-6);

        compute_torque_bounds(&mut cache, 1.0, 3.8);
        assert_eq!(cache.bounds, TorqueBounds::Split { pivot: 4 });

        compute_torque_bounds(&mut cache, 1.0, 4.5);
        assert_eq!(cache.bounds, TorqueBounds::FullRange);
    }

    #[test]
    fn cache_tracks_the_areas_it_was_built_for() {
        let mut cache = TorqueBoundCache::default();
        assert!(!cache.is_current(1.0, 1.0));
        compute_torque_bounds(&mut cache, 1.0, 1.0);
        assert!(cache.is_current(1.0, 1.0));
        assert!(!cache.is_current(1.0, 2.0));
    }

    #[test]
    fn oversized_budget_means_no_limit() {
        let af = airframe(1.0, 1.0);
        let mut cache = TorqueBoundCache::default();
        assert_eq!(aoa_for_torque(&af, &mut cache, 1.0e6), 180.0);
    }

    #[test]
    fn small_budget_limits_to_low_aoa() {
        let af = airframe(1.0, 1.0);
        let mut cache = TorqueBoundCache::default();
        let aoa = aoa_for_torque(&af, &mut cache, 20_000.0);
        assert!(aoa > 5.0 && aoa < 8.0, "limit AoA {aoa}");

        // The solved AoA reproduces the normalized budget on the table.
        let budget = 20_000.0 / af.dynamic_pressure() * 0.8;
        let model = (LIN_LIFT_TORQUE_SLOPE[0] + LIN_DRAG_TORQUE_SLOPE[0]) * aoa;
        assert_relative_eq!(model, budget, max_relative = 1e-9);
    }

    #[test]
    fn zero_airspeed_means_no_limit() {
        let mut af = airframe(1.0, 1.0);
        af.speed = 0.0;
        let mut cache = TorqueBoundCache::default();
        assert_eq!(aoa_for_torque(&af, &mut cache, 10.0), 180.0);
    }

    #[test]
    fn limit_aoa_grows_with_budget() {
        let af = airframe(1.0, 1.0);
        let mut cache = TorqueBoundCache::default();
        let small = aoa_for_torque(&af, &mut cache, 10_000.0);
        let large = aoa_for_torque(&af, &mut cache, 30_000.0);
        assert!(small < large);
    }
}
