//! Surface-attack steering: ballistic arcs and shallow-dive profiles.

use glam::DVec3;

use gnc_core::constants::*;
use gnc_core::geodesy::Geodesy;
use gnc_core::types::KinematicState;

/// Launch direction for a ballistic arc onto `target_pos` at the given
/// airspeed, or `None` when the target is out of ballistic range.
///
/// `direct` picks the low (flat) arc; otherwise the high, lofted arc.
/// The returned point is a short ray along the launch elevation, meant to be
/// steered at rather than flown to.
pub fn ballistic_arc_target<G: Geodesy>(
    target_pos: DVec3,
    missile_pos: DVec3,
    speed: f64,
    direct: bool,
    geo: &G,
) -> Option<DVec3> {
    let up = geo.up_at(missile_pos);
    let forward = (target_pos - missile_pos).reject_from_normalized(up);
    let range = forward.length();
    if range < RANGE_FLOOR {
        return None;
    }

    let sqr_speed = speed * speed;
    let g = geo.gravity_at(missile_pos);
    let height = geo.altitude_at(target_pos) - geo.altitude_at(missile_pos);

    let det = sqr_speed * sqr_speed - g * (g * range * range + 2.0 * height * sqr_speed);
    if det < 0.0 {
        return None;
    }

    let plus_or_minus = if direct { -1.0 } else { 1.0 };
    let theta = ((sqr_speed + plus_or_minus * det.sqrt()) / (g * range)).atan();

    let forward_dir = forward / range;
    let launch_dir = forward_dir * theta.cos() + up * theta.sin();
    Some(missile_pos + 100.0 * launch_dir)
}

/// Shallow-dive aim point for an air-to-ground run.
///
/// Leads the target by up to [`LEAD_HORIZON`] seconds, then holds altitude
/// proportional to the remaining ground distance so the missile descends
/// late instead of diving straight at the target. `descent_ratio` scales how
/// early the descent starts.
pub fn air_to_ground_target<G: Geodesy>(
    target_pos: DVec3,
    target_vel: DVec3,
    missile: &KinematicState,
    descent_ratio: f64,
    min_speed: f64,
    geo: &G,
) -> DVec3 {
    let up = geo.up_at(missile.position);
    let speed = missile.speed();

    let curr_vel = speed.max(min_speed) * missile.velocity_dir();
    let target_distance = (target_pos - missile.position).length();
    let lead_time = (target_distance / (target_vel - curr_vel).length().max(EPSILON))
        .clamp(0.0, LEAD_HORIZON);
    let target_pos = target_pos + target_vel * lead_time;

    // Climb out first when released with no airspeed to spend.
    if speed < 75.0 && missile.velocity.dot(up) < 10.0 {
        let climb_dir = if speed > EPSILON {
            missile.velocity_dir()
        } else {
            up
        };
        return missile.position + 5.0 * climb_dir + up;
    }

    let surface_pos = missile.position + (target_pos - missile.position).project_onto_normalized(up);
    let distance_to_target = (surface_pos - target_pos).length();

    let altitude_clamp = ((distance_to_target - speed * descent_ratio) * 0.22)
        .clamp(0.0, geo.altitude_at(missile.position));

    target_pos + altitude_clamp * up
}
