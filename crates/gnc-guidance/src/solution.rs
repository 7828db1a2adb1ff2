//! Launch-time fire solutions: where to point before the motor lights.

use glam::DVec3;

use gnc_core::constants::*;
use gnc_core::enums::FlightMedium;
use gnc_core::geodesy::Geodesy;
use gnc_core::kinematics::{predict_position, rotate_towards, time_to_cpa};
use gnc_core::types::KinematicState;

/// Launch platform state and the missile's propulsion figures, as fire
/// control sees them before release.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaunchPlatform {
    pub position: DVec3,
    pub velocity: DVec3,
    /// Launch direction (unit).
    pub forward: DVec3,
    /// Missile boost acceleration, thrust over mass (m/s²).
    pub accel: f64,
    /// Boost burn time (s).
    pub boost_time: f64,
    /// Airspeed (m/s) the missile cruises at after boost.
    pub optimum_airspeed: f64,
}

/// Predicted aim position and lead time for a launch right now.
///
/// The accelerating boost leg and the constant-speed cruise leg are chained:
/// if the closest approach lands at the end of the first leg, positions are
/// advanced to burnout and a second CPA run covers the cruise.
pub fn fire_solution(
    platform: &LaunchPlatform,
    target: &KinematicState,
    medium: FlightMedium,
) -> (DVec3, f64) {
    let mut target_position = target.position;
    let target_distance = (target_position - platform.position).length();
    let lead_time;

    match medium {
        FlightMedium::Vacuum => {
            let mut rel_pos = target.position - platform.position;
            let mut rel_vel = target.velocity - platform.velocity;
            let mut rel_accel = target.acceleration - platform.forward * platform.accel;

            let boost_time = platform.boost_time.max(EPSILON);
            let time_to_impact = time_to_cpa(rel_pos, rel_vel, rel_accel, boost_time);
            if time_to_impact == boost_time {
                // Burnout before CPA: coast from the burnout states.
                rel_pos = predict_position(
                    target.position,
                    target.velocity,
                    target.acceleration,
                    boost_time,
                ) - predict_position(
                    platform.position,
                    platform.velocity,
                    platform.forward * platform.accel,
                    boost_time,
                );
                rel_vel += rel_accel * time_to_impact;
                rel_accel = target.acceleration;
                lead_time = boost_time + time_to_cpa(rel_pos, rel_vel, rel_accel, 60.0);
            } else {
                lead_time = time_to_impact;
            }
            target_position += lead_time * (target.velocity - platform.velocity)
                + 0.5 * lead_time * lead_time * target.acceleration;
        }
        FlightMedium::Atmosphere => {
            let vel_opt = platform.forward * platform.optimum_airspeed;
            let delta_vel = target.velocity - platform.velocity;
            let delta_opt_vel = target.velocity - vel_opt;
            // Time to reach cruise airspeed.
            let accel_time = ((vel_opt - platform.velocity)
                .project_onto_normalized(platform.forward)
                .length()
                / platform.accel.max(EPSILON))
            .clamp(0.0, LEAD_HORIZON);

            let mut rel_position = target_position - platform.position;
            let mut rel_acceleration =
                target.acceleration - platform.forward * platform.accel;
            let mut lead = time_to_cpa(rel_position, delta_vel, rel_acceleration, accel_time);
            if accel_time < LEAD_HORIZON && lead == accel_time {
                // Cruising leg: advance both bodies to burnout and rerun.
                rel_position = predict_position(
                    target_position,
                    target.velocity,
                    target.acceleration,
                    accel_time,
                ) - predict_position(
                    platform.position,
                    platform.velocity,
                    platform.forward * platform.accel,
                    accel_time,
                );
                rel_acceleration = target.acceleration;
                lead = time_to_cpa(
                    rel_position,
                    delta_opt_vel,
                    rel_acceleration,
                    LEAD_HORIZON - accel_time,
                ) + accel_time;
            }

            target_position += lead * target.velocity;
            if target_distance < 800.0 {
                target_position += target.acceleration * 0.05 * lead * lead;
            }
            lead_time = lead;
        }
    }

    (target_position, lead_time)
}

/// Iterative lead solution for aiming a trainable launcher.
///
/// Fixed-point iteration on the lead time (at most 5 rounds, 1 ms
/// tolerance): each round splits the flight into an accelerating leg and a
/// cruise leg along the current lead direction. With `loft_factor` set (and
/// not in vacuum) the aim is elevated along the projectile-motion launch
/// angle for the de-rated cruise speed, falling back to the max-range angle
/// when the target is beyond reach.
pub fn turret_lead_solution<G: Geodesy>(
    platform: &LaunchPlatform,
    target_pos: DVec3,
    target_vel: DVec3,
    medium: FlightMedium,
    loft_factor: Option<f64>,
    geo: &G,
) -> DVec3 {
    let in_space = medium.is_vacuum();
    let max_sim_time = LEAD_HORIZON;
    let mut lead_position = target_pos;
    let mut lead_time = 0.0;
    let accel = platform.accel.max(EPSILON);

    let mut count = 0;
    loop {
        let lead_offset = lead_position - platform.position;
        let target_distance = lead_offset.length();
        let lead_direction = lead_offset.normalize_or_zero();

        let vel_opt = if in_space {
            (2.0 * accel * target_distance).sqrt() * lead_direction + platform.velocity
        } else {
            platform.optimum_airspeed * lead_direction
        };
        let delta_vel = (target_vel - platform.velocity).dot(lead_direction);
        let delta_vel_opt = (target_vel - vel_opt).dot(lead_direction);
        let accel_time = ((vel_opt - platform.velocity).length() / accel).clamp(0.0, max_sim_time);
        // Relative distance closed while accelerating to cruise speed.
        let accel_dist = -delta_vel * accel_time + 0.5 * accel * accel_time * accel_time;

        let mut error = -lead_time;
        lead_time = if target_distance > accel_dist {
            (target_distance - accel_dist) / (-delta_vel_opt).max(EPSILON) + accel_time
        } else {
            (delta_vel + (delta_vel * delta_vel + 2.0 * accel * target_distance).sqrt()) / accel
        };
        lead_time = lead_time.clamp(0.0, max_sim_time);
        error += lead_time;

        lead_position = predict_position(
            target_pos,
            target_vel - if in_space { platform.velocity } else { DVec3::ZERO },
            DVec3::ZERO,
            lead_time,
        );

        count += 1;
        if count >= 5 || error.abs() <= 1e-3 {
            break;
        }
    }

    if let (Some(loft_factor), false) = (loft_factor, in_space) {
        let up = geo.up_at(platform.position);
        let rel_pos = lead_position - platform.position;
        let vert_dist = rel_pos.dot(up);
        let horz_dist = (rel_pos - vert_dist * up).length();
        let g = geo.gravity_at(platform.position);

        let v = platform.optimum_airspeed * loft_factor;
        let v_sqr = v * v;

        let det = v_sqr * v_sqr - g * (g * horz_dist * horz_dist + 2.0 * vert_dist * v_sqr);
        let theta = if det > 0.0 {
            // Projectile-motion launch angle.
            ((v_sqr - det.sqrt()) / (g * horz_dist).max(EPSILON)).atan()
        } else {
            // Angle reaching the furthest target at this elevation.
            (v / (v_sqr - 2.0 * g * vert_dist).max(EPSILON).sqrt()).atan()
        };

        let elevation = std::f64::consts::FRAC_PI_2 - rel_pos.angle_between(up);
        if theta > elevation {
            lead_position =
                platform.position + rotate_towards(rel_pos, up * rel_pos.length(), theta - elevation);
        }
    }

    lead_position
}
