//! Terminal weave guidance: biased PN plus a sinusoidal weave kernel.
//!
//! The weave is phased so displacement is zero at activation and again at
//! impact. Sea-skimming attacks additionally follow a descent altitude
//! profile with a hard pull-up override when the missile would fly into the
//! surface before levelling out.

use glam::{DQuat, DVec3};
use rand::Rng;
use tracing::debug;

use gnc_core::constants::*;
use gnc_core::gains::WeaveConfig;
use gnc_core::geodesy::Geodesy;
use gnc_core::kinematics::mag_norm;
use gnc_core::session::{WeaveActivation, WeaveSession};
use gnc_core::types::{GuidanceSolution, KinematicState};

use crate::pronav::{pn_accel, pn_target};

const TAU: f64 = std::f64::consts::TAU;

/// One tick of weave guidance.
///
/// `session` is latched on the first call with a closing geometry; the
/// amplitude jitter and horizontal weave sign are drawn from `rng` once, at
/// that activation, so replays with the same seed are deterministic. Falls
/// back to plain PN when the closing rate says the target has been missed.
#[allow(clippy::too_many_arguments)]
pub fn weave_target<G: Geodesy, R: Rng + ?Sized>(
    missile: &KinematicState,
    target_pos: DVec3,
    target_vel: DVec3,
    cfg: &WeaveConfig,
    session: &mut WeaveSession,
    geo: &G,
    rng: &mut R,
) -> GuidanceSolution {
    let missile_vel = missile.velocity;
    let speed = missile.speed();

    // Time to go from the instantaneous range rate.
    let mut rdir = target_pos - missile.position;
    let closing = (target_vel - missile_vel).dot(rdir);
    let ttgo = if closing.abs() < EPSILON {
        f64::INFINITY
    } else {
        -rdir.length_squared() / closing
    };

    if !(ttgo > 0.0) {
        // Missed the target; PN as backup.
        return pn_target(missile, target_pos, target_vel, 3.0);
    }

    let up = geo.up_at(missile.position);

    // High-pass filter: only lead targets that are actually moving.
    if target_vel.length_squared() > 100.0 {
        rdir += target_vel * ttgo;
    }

    let planar_dir = rdir.reject_from_normalized(up).normalize_or_zero();
    let mut right = planar_dir.cross(up);

    let vel_dir = missile_vel.normalize_or_zero();
    let pull_up_cos = vel_dir.dot(up);

    let vertical_angle = pull_up_cos.signum()
        * missile_vel
            .reject_from_normalized(right)
            .angle_between(planar_dir);
    let horizontal_angle = missile_vel.dot(right).signum()
        * missile_vel
            .reject_from_normalized(up)
            .angle_between(planar_dir);

    let weave_dist;
    let ttgo_weave;
    let activation = match session.activation {
        None => {
            let mut g_vertical = cfg.g_vertical;
            let mut g_horizontal = cfg.g_horizontal;
            if rng.gen::<f64>() < 0.5 {
                g_horizontal = -g_horizontal;
            }
            if g_vertical != 0.0 {
                g_vertical += cfg.amplitude_jitter[1] * (2.0 * rng.gen::<f64>() - 1.0);
            }
            if g_horizontal != 0.0 {
                g_horizontal += cfg.amplitude_jitter[0] * (2.0 * rng.gen::<f64>() - 1.0);
            }
            let activation = WeaveActivation {
                phase_offset: TAU * cfg.frequency * ttgo,
                start_position: missile.position,
                start_altitude: geo.altitude_at(missile.position),
                g_vertical,
                g_horizontal,
            };
            debug!(
                phase_offset = activation.phase_offset,
                g_vertical, g_horizontal, ttgo, "weave activated"
            );
            weave_dist = rdir.dot(planar_dir);
            ttgo_weave = ttgo;
            *session.activation.insert(activation)
        }
        Some(activation) => {
            // Down-range axis anchored at the activation point so the weave
            // phase does not drift with the missile's own weaving.
            let weave_dir = (target_pos - activation.start_position)
                .reject_from_normalized(up)
                .normalize_or_zero();
            weave_dist = rdir.dot(weave_dir);
            ttgo_weave = cfg.weave_factor * 1.5 * weave_dist / speed.max(EPSILON);
            right = weave_dir.cross(up);
            activation
        }
    };
    let ttgo_weave = ttgo_weave.max(1e-6);

    let omega_beta = TAU * cfg.frequency * ttgo_weave;
    let (sin_ob, cos_ob) = omega_beta.sin_cos();
    let (sin_off, cos_off) = (omega_beta - activation.phase_offset).sin_cos();

    let ka = 2.0 * omega_beta * sin_ob + 6.0 * cos_ob - 6.0;
    let kj = -2.0 * omega_beta * cos_ob + 6.0 * sin_ob - 4.0 * omega_beta;

    let ttgo_weave_inv = 1.0 / ttgo_weave;
    let omega_beta_inv = 1.0 / (omega_beta * omega_beta).max(1e-6);

    let mut g_vertical = activation.g_vertical;
    let g_horizontal = activation.g_horizontal;
    let mut ttgo_weave_inv_vert = ttgo_weave_inv;
    let mut terminal_angle = cfg.terminal_angle_deg;
    let mut use_biased_pn = terminal_angle > 0.0;

    let vert_guidance_angle;
    if cfg.use_descent_profile {
        let current_alt = geo.altitude_at(missile.position);

        let altitude_clamp = ((weave_dist - speed * cfg.descent_ratio) * 0.22)
            .clamp(0.0, activation.start_altitude.max(0.0));
        let curvature_comp =
            (1.0 - up.dot(geo.up_at(target_pos))) * geo.body_radius();
        rdir += (altitude_clamp + curvature_comp) * up;

        let (rdir_mag, rdir_dir) = mag_norm(rdir);
        let mut angle = if rdir_mag > 0.0 {
            (up.dot(rdir_dir)).clamp(-1.0, 1.0).asin()
        } else {
            0.0
        };

        let alt_diff = current_alt - altitude_clamp;
        if pull_up_cos < 0.0 || alt_diff < 0.0 {
            let pull_up_sin = (1.0 - pull_up_cos * pull_up_cos).max(0.0).sqrt();
            let pull_up_g = if g_vertical > 0.0 {
                g_vertical * 0.8
            } else if g_horizontal > 0.0 {
                (g_horizontal * 0.8).min(6.0)
            } else {
                6.0
            };
            let inv_g = INV_STANDARD_GRAVITY / pull_up_g;
            let pull_up_dist = (speed * speed * inv_g) * (1.0 - pull_up_sin);

            if alt_diff < 0.0 {
                // Below the commanded profile: aim the pull-up through the
                // remaining turn arc.
                g_vertical = 0.0;
                let remaining_sin =
                    (pull_up_sin + alt_diff / (speed * speed * inv_g)).clamp(-1.0, 1.0);
                let remaining_cos = (1.0 - remaining_sin * remaining_sin).max(0.0).sqrt();
                let remaining_angle = remaining_sin.asin();

                let turn_lead = (speed * speed * inv_g * -0.8)
                    * ((pull_up_cos + remaining_cos) * planar_dir)
                    - alt_diff * up;
                let (lead_mag, lead_dir) = mag_norm(turn_lead);
                if lead_mag > 0.0 {
                    angle = up.dot(lead_dir).clamp(-1.0, 1.0).asin();
                }
                ttgo_weave_inv_vert = 1.0
                    / ((-vertical_angle + remaining_angle).max(1e-5) * speed * inv_g * 0.8);
            } else if alt_diff < pull_up_dist {
                // Descending with too little altitude margin for the turn.
                g_vertical = 0.0;
                let turn_lead =
                    (speed * speed * inv_g * -0.8) * (pull_up_cos * planar_dir) - alt_diff * up;
                let (lead_mag, lead_dir) = mag_norm(turn_lead);
                if lead_mag > 0.0 {
                    angle = up.dot(lead_dir).clamp(-1.0, 1.0).asin();
                }
                ttgo_weave_inv_vert =
                    1.0 / ((-vertical_angle).max(1e-5) * speed * inv_g * 0.8);
                terminal_angle = 0.0;
                use_biased_pn = true;
            }
        }
        vert_guidance_angle = angle;
    } else {
        let (rdir_mag, rdir_dir) = mag_norm(rdir);
        vert_guidance_angle = if rdir_mag > 0.0 {
            up.dot(rdir_dir).clamp(-1.0, 1.0).asin()
        } else {
            0.0
        };
    }

    let g = STANDARD_GRAVITY;
    let a_vert = if use_biased_pn {
        speed
            * (6.0 * vert_guidance_angle - 4.0 * vertical_angle
                + 2.0 * terminal_angle.to_radians())
            * ttgo_weave_inv_vert
    } else {
        0.0
    } + if g_vertical != 0.0 {
        g_vertical * g * ((ka + omega_beta * omega_beta) * sin_off + kj * cos_off) * omega_beta_inv
    } else {
        0.0
    };
    let a_hor = if use_biased_pn {
        -6.0 * speed * horizontal_angle * ttgo_weave_inv
    } else {
        0.0
    } + if g_horizontal != 0.0 {
        g_horizontal
            * g
            * ((ka + omega_beta * omega_beta) * cos_off + kj * sin_off)
            * omega_beta_inv
    } else {
        0.0
    };

    let rotation_pitch = if right.length_squared() > EPSILON {
        DQuat::from_axis_angle(right.normalize(), vertical_angle)
    } else {
        DQuat::IDENTITY
    };
    let rotation_yaw = DQuat::from_axis_angle(up, horizontal_angle);

    let mut accel =
        a_vert * (rotation_pitch * (rotation_yaw * up)) + a_hor * (rotation_yaw * right);
    let g_limit;
    if use_biased_pn {
        g_limit = (a_vert * a_vert + a_hor * a_hor).sqrt() * INV_STANDARD_GRAVITY;
    } else {
        accel += pn_accel(missile, target_pos, target_vel, 3.0);
        g_limit = accel.length() * INV_STANDARD_GRAVITY;
    }

    let lead_time = ttgo_weave.min(WEAVE_AIM_HORIZON);
    GuidanceSolution {
        aim_point: missile.position
            + lead_time * missile_vel
            + accel * (0.5 * lead_time * lead_time),
        g_limit,
        time_to_go: Some(ttgo),
    }
}
