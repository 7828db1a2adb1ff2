//! Air-to-air loft guidance: energy-preserving climb, ballistic midcourse,
//! and a quadratic blend into the terminal homing law.

use glam::DVec3;
use tracing::debug;

use gnc_core::constants::*;
use gnc_core::enums::{LoftPhase, TerminalHomingLaw};
use gnc_core::gains::LoftConfig;
use gnc_core::geodesy::Geodesy;
use gnc_core::kinematics::{predict_position, time_to_cpa};
use gnc_core::types::{GuidanceSolution, KinematicState};

use crate::pronav::{apn_target, pn_target};

/// Dispatch to the configured terminal homing law.
pub fn terminal_homing(
    law: TerminalHomingLaw,
    missile: &KinematicState,
    target: &KinematicState,
    nav_gain: f64,
    lead_time: f64,
    dt: f64,
) -> GuidanceSolution {
    match law {
        TerminalHomingLaw::ProNav => {
            pn_target(missile, target.position, target.velocity, nav_gain)
        }
        TerminalHomingLaw::AugmentedProNav => apn_target(
            missile,
            target.position,
            target.velocity,
            target.acceleration,
            nav_gain,
        ),
        TerminalHomingLaw::PurePursuit => GuidanceSolution::steer_to(target.position),
        TerminalHomingLaw::PureLead => GuidanceSolution::steer_to(predict_position(
            target.position,
            target.velocity,
            target.acceleration,
            lead_time + dt,
        )),
    }
}

/// One tick of loft guidance.
///
/// Boost climbs toward a turn-lead-corrected ballistic solution; midcourse
/// flies the solved elevation; inside three times the terminal distance the
/// aim point blends quadratically into the terminal law, with a g allowance
/// that relaxes as the blend completes. `phase` only ever advances.
#[allow(clippy::too_many_arguments)]
pub fn loft_target<G: Geodesy>(
    missile: &KinematicState,
    target: &KinematicState,
    cfg: &LoftConfig,
    nav_gain: f64,
    terminal_law: TerminalHomingLaw,
    phase: &mut LoftPhase,
    geo: &G,
    dt: f64,
) -> GuidanceSolution {
    let mut vel_direction = missile.velocity_dir();
    let target_distance = (target.position - missile.position).length();
    let speed = missile.speed();

    // While boosting (or still accelerating) plan with the cruise airspeed
    // so early lead is not undersized.
    let curr_speed = if *phase == LoftPhase::Boost
        || missile.acceleration.dot(vel_direction) > 0.0
    {
        speed.max(cfg.optimum_airspeed)
    } else {
        speed
    };
    let mut curr_vel = curr_speed * vel_direction;

    let closing_speed = (target.velocity - curr_vel).length().max(EPSILON);
    let time_to_impact = target_distance / closing_speed;
    let lead_time = time_to_impact.clamp(0.0, LOFT_LEAD_HORIZON);

    if *phase < LoftPhase::Terminal && target_distance > cfg.terminal_distance {
        let up = geo.up_at(missile.position);
        let mut fire_position = missile.position;
        let mut rel_position = target.position - fire_position;
        let mut time_to_cpa_est = time_to_impact;
        let mut target_predicted =
            predict_position(target.position, target.velocity, DVec3::ZERO, time_to_cpa_est);

        // Velocity compensation: overshoot the lead against receding or
        // climbing targets, fading out as terminal distance approaches.
        let comp_mult =
            (0.5 * (target_distance - cfg.terminal_distance) / cfg.terminal_distance)
                .clamp(0.0, 1.0);
        let vel_dir_hor = vel_direction.reject_from_normalized(up).normalize_or_zero();
        let target_hor_vel = target.velocity.reject_from_normalized(up);
        let target_along_vel =
            (target_hor_vel.dot(vel_dir_hor) * cfg.vel_comp.signum() * comp_mult).max(0.0);
        let target_vert_vel =
            (cfg.vert_vel_comp.signum() * comp_mult * target.velocity.dot(up)).max(0.0);
        let target_comp_vel = target.velocity
            + cfg.vel_comp * target_along_vel * vel_dir_hor
            + cfg.vert_vel_comp * target_vert_vel * up;

        let planar_dir = (predict_position(
            target.position,
            target.velocity,
            DVec3::ZERO,
            lead_time + dt,
        ) - missile.position)
            .reject_from_normalized(up)
            .normalize_or_zero();

        if *phase == LoftPhase::Boost {
            let pull_down_cos = vel_direction.dot(up);
            // The turn-lead assumes a pull-down; while still climbing the
            // termination trigger is expected to cover the turn time.
            if pull_down_cos > 0.0 {
                if cfg.loft_angle_deg.to_radians().cos() * target_distance
                    > rel_position.dot(up)
                {
                    let pull_down_sin =
                        (1.0 - pull_down_cos * pull_down_cos).max(0.0).sqrt();
                    // Planning speed padded for accelerating missiles.
                    let temp_speed = (curr_speed * 1.1).max(cfg.optimum_airspeed);
                    let curvature_comp =
                        (1.0 - up.dot(geo.up_at(target.position))) * geo.body_radius();
                    let turn_radius = temp_speed * temp_speed * INV_STANDARD_GRAVITY
                        / cfg.maneuver_g_limit;

                    let turn_lead = (turn_radius
                        * (pull_down_cos + cfg.termination_angle_deg.to_radians().sin()))
                        * planar_dir
                        + (turn_radius * (1.0 - pull_down_sin) - curvature_comp) * up;
                    fire_position += turn_lead;
                } else {
                    phase.advance_to(LoftPhase::Midcourse);
                }
            }
        }

        // Iterative drag-free ballistic solve for the launch elevation.
        let mut count = 0;
        loop {
            let last_vel_direction = vel_direction;
            curr_vel = curr_speed * vel_direction;
            let gravity =
                geo.gravity_vector_at((fire_position + target_predicted) * 0.5);
            rel_position = target.position - fire_position;
            let rel_velocity = target.velocity - curr_vel;
            let rel_acceleration = target.acceleration - gravity;
            time_to_cpa_est = time_to_cpa(
                rel_position,
                rel_velocity,
                rel_acceleration,
                time_to_impact * 3.0,
            );
            target_predicted = predict_position(
                target.position,
                target_comp_vel,
                DVec3::ZERO,
                time_to_cpa_est.min(LOFT_LEAD_HORIZON),
            );
            let drop_offset = -0.5 * gravity * time_to_cpa_est * time_to_cpa_est;
            let ballistic_target = target_predicted + drop_offset;
            vel_direction = (ballistic_target - fire_position).normalize_or_zero();
            count += 1;
            // 1° margin of error is sufficient.
            if count >= 10
                || last_vel_direction.angle_between(vel_direction) <= 1f64.to_radians()
            {
                break;
            }
        }

        let vel_up = vel_direction.dot(up);
        let vel_forwards = (vel_direction - up * vel_up).length();
        let elevation = vel_up.atan2(vel_forwards);

        debug!(
            elevation_deg = elevation.to_degrees(),
            iterations = count,
            "loft ballistic solve"
        );

        if *phase < LoftPhase::Midcourse && elevation > -cfg.termination_angle_deg.to_radians()
        {
            // Keep climbing: altitude clamp cannot go below the target.
            let altitude_clamp = (cfg.target_altitude
                + cfg.range_factor * (target.position - missile.position).dot(planar_dir))
            .clamp(
                cfg.target_altitude,
                cfg.max_altitude.max(cfg.target_altitude),
            );

            // Climb angle scaled by turn factor; negative above the clamp.
            let turn_factor = ((altitude_clamp - geo.altitude_at(missile.position))
                / (4.0 * speed.max(EPSILON)))
            .clamp(-1.0, 1.0);
            let climb_angle = (cfg.loft_angle_deg * turn_factor).to_radians();

            return GuidanceSolution {
                aim_point: missile.position
                    + speed * (climb_angle.cos() * planar_dir + climb_angle.sin() * up),
                g_limit: cfg.maneuver_g_limit,
                time_to_go: Some(time_to_impact),
            };
        }

        phase.advance_to(LoftPhase::Midcourse);

        let final_target_pos = if vel_up > 0.0 {
            // Told to go up: hold altitude or climb to the loft altitude.
            missile.position
                + speed * planar_dir
                + (cfg.target_altitude - geo.altitude_at(missile.position)).max(0.0) * up
        } else {
            missile.position
                + 0.25 * lead_time * speed * vel_up * up
                + 0.25 * lead_time * speed * vel_forwards * planar_dir
        };

        if target_distance < 3.0 * cfg.terminal_distance {
            let mut blend = (target_distance - cfg.terminal_distance) / cfg.terminal_distance;
            blend *= 0.25 * blend;

            let terminal =
                terminal_homing(terminal_law, missile, target, nav_gain, lead_time, dt);
            let aim_point =
                (1.0 - blend) * terminal.aim_point + blend * final_target_pos;
            return match terminal_law {
                TerminalHomingLaw::PurePursuit | TerminalHomingLaw::PureLead => GuidanceSolution {
                    aim_point,
                    g_limit: 0.0,
                    time_to_go: Some(time_to_impact),
                },
                _ => GuidanceSolution {
                    aim_point,
                    g_limit: terminal.g_limit + 10.0 * blend,
                    time_to_go: terminal.time_to_go,
                },
            };
        }

        GuidanceSolution {
            aim_point: final_target_pos,
            g_limit: 0.0,
            time_to_go: Some(time_to_impact),
        }
    } else {
        // Terminal: straight at the lead point, blended with the homing law.
        phase.advance_to(LoftPhase::Terminal);

        if target_distance < 3.0 * cfg.terminal_distance {
            let mut blend = 0.0;
            let mut blend_target = DVec3::ZERO;
            if target_distance > cfg.terminal_distance
                && terminal_law != TerminalHomingLaw::PureLead
                && terminal_law != TerminalHomingLaw::PurePursuit
            {
                blend = (target_distance - cfg.terminal_distance) / cfg.terminal_distance;
                blend *= 0.25 * blend;
                blend_target = predict_position(
                    target.position,
                    target.velocity,
                    DVec3::ZERO,
                    lead_time + dt,
                );
            }

            let terminal =
                terminal_homing(terminal_law, missile, target, nav_gain, lead_time, dt);
            match terminal_law {
                TerminalHomingLaw::PurePursuit | TerminalHomingLaw::PureLead => GuidanceSolution {
                    aim_point: terminal.aim_point,
                    g_limit: 0.0,
                    time_to_go: Some(time_to_impact),
                },
                _ => GuidanceSolution {
                    aim_point: (1.0 - blend) * terminal.aim_point + blend * blend_target,
                    g_limit: terminal.g_limit + 10.0 * blend,
                    time_to_go: terminal.time_to_go,
                },
            }
        } else {
            GuidanceSolution {
                aim_point: predict_position(
                    target.position,
                    target.velocity,
                    DVec3::ZERO,
                    lead_time + dt,
                ),
                g_limit: 0.0,
                time_to_go: Some(time_to_impact),
            }
        }
    }
}
