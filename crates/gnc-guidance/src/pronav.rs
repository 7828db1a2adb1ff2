//! Proportional-navigation homing laws.

use glam::DVec3;

use gnc_core::constants::*;
use gnc_core::kinematics::{mag_norm, time_to_cpa};
use gnc_core::types::{GuidanceSolution, KinematicState};

/// PN lateral acceleration command (world frame, m/s²):
/// `a = −N·|v_rel|·(v̂ × Ω)` with LOS rate `Ω = (R × v_rel)/|R|²`.
///
/// Returns zero inside the degenerate-range floor.
pub fn pn_accel(
    missile: &KinematicState,
    target_pos: DVec3,
    target_vel: DVec3,
    nav_gain: f64,
) -> DVec3 {
    let rel_velocity = target_vel - missile.velocity;
    let rel_range = target_pos - missile.position;
    let range_sqr = rel_range.length_squared();
    if range_sqr < RANGE_FLOOR * RANGE_FLOOR {
        return DVec3::ZERO;
    }
    let los_rate = rel_range.cross(rel_velocity) / range_sqr;
    -nav_gain * rel_velocity.length() * missile.velocity_dir().cross(los_rate)
}

/// Proportional navigation.
pub fn pn_target(
    missile: &KinematicState,
    target_pos: DVec3,
    target_vel: DVec3,
    nav_gain: f64,
) -> GuidanceSolution {
    let accel = pn_accel(missile, target_pos, target_vel, nav_gain);
    solution_from_accel(missile, target_pos, target_vel, accel)
}

/// Augmented PN: PN plus the target-acceleration bias
/// `−½N·(v̂ × (r̂ × a_T))`.
pub fn apn_target(
    missile: &KinematicState,
    target_pos: DVec3,
    target_vel: DVec3,
    target_accel: DVec3,
    nav_gain: f64,
) -> GuidanceSolution {
    let mut accel = pn_accel(missile, target_pos, target_vel, nav_gain);
    let (range, los_dir) = mag_norm(target_pos - missile.position);
    if range >= RANGE_FLOOR {
        accel += -0.5
            * nav_gain
            * missile
                .velocity_dir()
                .cross(los_dir.cross(target_accel));
    }
    solution_from_accel(missile, target_pos, target_vel, accel)
}

/// Magnitude of the line-of-sight angular rate, in degrees per second.
pub fn los_rate_deg_s(missile: &KinematicState, target_pos: DVec3, target_vel: DVec3) -> f64 {
    let rel_velocity = target_vel - missile.velocity;
    let rel_range = target_pos - missile.position;
    let range_sqr = rel_range.length_squared();
    if range_sqr < RANGE_FLOOR * RANGE_FLOOR {
        return 0.0;
    }
    (rel_range.cross(rel_velocity) / range_sqr)
        .length()
        .to_degrees()
}

/// Extrapolate the aim point along the current velocity plus the command,
/// over the estimated time-to-go.
fn solution_from_accel(
    missile: &KinematicState,
    target_pos: DVec3,
    target_vel: DVec3,
    accel: DVec3,
) -> GuidanceSolution {
    let time_to_go = time_to_cpa(
        target_pos - missile.position,
        target_vel - missile.velocity,
        DVec3::ZERO,
        CPA_HORIZON,
    );
    GuidanceSolution {
        aim_point: missile.position
            + missile.velocity * time_to_go
            + accel * time_to_go * time_to_go,
        g_limit: accel.length() * INV_STANDARD_GRAVITY,
        time_to_go: Some(time_to_go),
    }
}
