//! Kappa (trajectory-curvature optimal) midcourse guidance.
//!
//! Boost phase flies a loft pitch program toward a turn-lead point; once the
//! predicted dive geometry allows, guidance switches to the kappa gains K1
//! (velocity error) and K2 (position error), derived from a linearized aero
//! model of the airframe. Inside terminal range the gains collapse to the
//! drag-free optimum K1 = −2, K2 = 6.

use glam::DVec3;
use tracing::debug;

use gnc_core::constants::*;
use gnc_core::enums::{FlightMedium, LoftPhase};
use gnc_core::gains::KappaConfig;
use gnc_core::geodesy::Geodesy;
use gnc_core::kinematics::predict_position;
use gnc_core::types::{AirframeSnapshot, GuidanceSolution, KinematicState};

/// One tick of kappa guidance.
///
/// `airframe_g_limit` is the achievable lateral g used for the boost-phase
/// turn-radius estimate (values ≤ 0 fall back to 20 g); `maneuver_g_limit`
/// is the g demand reported while climbing. `phase` only ever advances.
#[allow(clippy::too_many_arguments)]
pub fn kappa_target<G: Geodesy>(
    missile: &KinematicState,
    target_pos: DVec3,
    target_vel: DVec3,
    airframe: &AirframeSnapshot,
    cfg: &KappaConfig,
    airframe_g_limit: f64,
    maneuver_g_limit: f64,
    medium: FlightMedium,
    phase: &mut LoftPhase,
    geo: &G,
    dt: f64,
) -> GuidanceSolution {
    let vel_direction = missile.velocity_dir();
    // Kappa needs the true speed; no minimum-speed floor here.
    let curr_speed = missile.speed();
    let curr_vel = curr_speed * vel_direction;

    let rdir = target_pos - missile.position;
    let range = rdir.length();

    // Time to go from the instantaneous range rate.
    let closing = (target_vel - curr_vel).dot(rdir);
    let mut ttgo = if closing.abs() < EPSILON {
        KAPPA_TTGO_CAP
    } else {
        -range * range / closing
    };
    if !(ttgo > 0.0) || ttgo > KAPPA_TTGO_CAP {
        ttgo = KAPPA_TTGO_CAP;
    }
    let ttgo_inv = 1.0 / ttgo;
    let lead_time = ttgo.clamp(0.0, LOFT_LEAD_HORIZON);

    let up = geo.up_at(missile.position);
    let predicted_impact =
        predict_position(target_pos, target_vel, DVec3::ZERO, lead_time + dt);

    let mut boost_guidance = *phase < LoftPhase::Midcourse;
    let mut planar_dir = DVec3::ZERO;

    if boost_guidance {
        planar_dir = (predicted_impact - missile.position)
            .reject_from_normalized(up)
            .normalize_or_zero();

        // Turn-lead: where the pull-down arc will put us, given the
        // achievable turn radius.
        let pull_down_cos = vel_direction.dot(up);
        let pull_down_sin = (1.0 - pull_down_cos * pull_down_cos).max(0.0).sqrt();
        let inv_g = INV_STANDARD_GRAVITY
            / if airframe_g_limit > 0.0 {
                airframe_g_limit
            } else {
                20.0
            };
        let turn_lead = (curr_speed * curr_speed * inv_g)
            * (pull_down_cos * planar_dir + (1.0 - pull_down_sin) * up);

        let curvature_comp =
            (1.0 - up.dot(geo.up_at(predicted_impact))) * geo.body_radius();

        let sin_target = (predicted_impact - missile.position - turn_lead
            - curvature_comp * up)
            .normalize_or_zero()
            .dot(-up);

        boost_guidance = cfg.midcourse_range > 0.0
            && range > cfg.midcourse_range
            && sin_target < cfg.termination_angle_deg.to_radians().sin()
            && -sin_target < cfg.loft_angle_deg.to_radians().sin();
    }

    if boost_guidance {
        let range_term = (target_pos - missile.position).dot(planar_dir).max(0.0);
        let altitude_clamp = (cfg.target_altitude
            + 10.0 * cfg.range_factor * range_term.powf(cfg.vert_vel_comp.abs()))
        .clamp(cfg.target_altitude, cfg.max_altitude.max(cfg.target_altitude));

        // Climb angle scaled by turn factor; goes negative above the
        // commanded altitude.
        let turn_factor = ((altitude_clamp - geo.altitude_at(missile.position))
            / (4.0 * curr_speed.max(EPSILON)))
        .clamp(-1.0, 1.0);

        let climb_angle = (cfg.loft_angle_deg * turn_factor).to_radians();
        return GuidanceSolution {
            aim_point: missile.position
                + curr_speed * (climb_angle.cos() * planar_dir + climb_angle.sin() * up),
            g_limit: maneuver_g_limit,
            time_to_go: Some(ttgo),
        };
    }

    // Shape the final velocity into a dive without touching the horizontal
    // components.
    let mut v_final = if cfg.shaping_angle_deg == 0.0 {
        curr_vel
    } else {
        let horizontal = vel_direction
            .reject_from_normalized(up)
            .normalize_or_zero();
        let shaping = cfg.shaping_angle_deg.to_radians();
        curr_speed * (shaping.cos() * horizontal - shaping.sin() * up)
    };

    let k1;
    let k2;
    if *phase < LoftPhase::Terminal
        && range > cfg.terminal_homing_range
        && !medium.is_vacuum()
    {
        phase.advance_to(LoftPhase::Midcourse);

        if cfg.shaping_angle_deg != 0.0 {
            // Closer in, positional error dominates over velocity shaping.
            let factor =
                (0.5 * (range - cfg.terminal_homing_range) / cfg.terminal_homing_range).min(1.0);
            v_final = factor * v_final + (1.0 - factor) * curr_vel;
        }

        let q = 0.5 * airframe.air_density * curr_speed * curr_speed;
        let lift_alpha = cfg.aero.lift_slope * q * airframe.lift_area;
        let drag_zero = cfg.aero.zero_aoa_drag * q * airframe.drag_area;
        // D = D0 + η·Lα·AoA², quadratic drag approximation at small angles.
        let eta = cfg.aero.induced_drag_factor * airframe.drag_area / airframe.lift_area;

        let thrust_lift = airframe.thrust / lift_alpha.max(EPSILON);

        // Characteristic aerodynamic rate F of the thrusting airframe.
        let v_sqr = curr_speed * curr_speed;
        let f_sqr = drag_zero * lift_alpha * (thrust_lift + 1.0) * (thrust_lift + 1.0)
            / (airframe.mass * airframe.mass * v_sqr * v_sqr * (2.0 * eta + thrust_lift));
        let f = f_sqr.max(0.0).sqrt();

        let fr = f * range;
        if fr < 1e-4 {
            // F·R → 0 limit of the gains below.
            k1 = -2.0;
            k2 = 6.0;
        } else {
            let e_fr = fr.exp();
            let en_fr = (-fr).exp();
            let denom = e_fr * (fr - 2.0) - en_fr * (fr + 2.0) + 4.0;
            k1 = (2.0 * f_sqr * range * range - fr * (e_fr - en_fr)) / denom;
            k2 = (f_sqr * range * range * (e_fr + en_fr - 2.0)) / denom;
        }
    } else {
        phase.advance_to(LoftPhase::Terminal);
        // Optimal gains neglecting aerodynamics; valid in the terminal phase.
        k1 = -2.0;
        k2 = 6.0;
        // Equivalent to setting K1 = 0.
        v_final = curr_vel;
    }

    let mut accel = (k1 * ttgo_inv) * (v_final - curr_vel)
        + (k2 * ttgo_inv * ttgo_inv) * (predicted_impact - missile.position - curr_vel * ttgo);
    // Only the component normal to the velocity can actually be flown.
    accel = accel.reject_from_normalized(vel_direction);
    let g_limit = accel.length() * INV_STANDARD_GRAVITY;

    debug!(k1, k2, g_limit, ttgo, "kappa guidance");

    GuidanceSolution {
        aim_point: missile.position
            + curr_vel * lead_time.min(KAPPA_AIM_HORIZON)
            + accel * (lead_time * lead_time).min(KAPPA_AIM_HORIZON * KAPPA_AIM_HORIZON),
        g_limit,
        time_to_go: Some(ttgo),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gnc_core::geodesy::FlatWorld;

    fn test_airframe(speed: f64) -> AirframeSnapshot {
        AirframeSnapshot {
            mass: 700.0,
            thrust: 30_000.0,
            speed,
            air_density: 1.0,
            lift_area: 0.6,
            drag_area: 0.05,
        }
    }

    #[test]
    fn boost_phase_climbs() {
        let world = FlatWorld::default();
        let cfg = KappaConfig::default();
        let missile = KinematicState::coasting(
            DVec3::new(0.0, 0.0, 1_000.0),
            DVec3::new(400.0, 0.0, 0.0),
        );
        let mut phase = LoftPhase::Boost;
        let solution = kappa_target(
            &missile,
            DVec3::new(40_000.0, 0.0, 800.0),
            DVec3::new(-200.0, 0.0, 0.0),
            &test_airframe(400.0),
            &cfg,
            0.0,
            25.0,
            FlightMedium::Atmosphere,
            &mut phase,
            &world,
            0.02,
        );
        // Below the commanded altitude the aim point is above the missile.
        assert!(solution.aim_point.z > missile.position.z);
        assert_eq!(solution.g_limit, 25.0);
        assert_eq!(phase, LoftPhase::Boost);
    }

    #[test]
    fn midcourse_gains_take_over_past_loft() {
        let world = FlatWorld::default();
        let cfg = KappaConfig {
            midcourse_range: 0.0, // lofting disabled
            ..KappaConfig::default()
        };
        let missile = KinematicState::coasting(
            DVec3::new(0.0, 0.0, 8_000.0),
            DVec3::new(700.0, 0.0, 0.0),
        );
        let mut phase = LoftPhase::Boost;
        let solution = kappa_target(
            &missile,
            DVec3::new(30_000.0, 2_000.0, 200.0),
            DVec3::new(-250.0, 0.0, 0.0),
            &test_airframe(700.0),
            &cfg,
            25.0,
            25.0,
            FlightMedium::Atmosphere,
            &mut phase,
            &world,
            0.02,
        );
        assert_eq!(phase, LoftPhase::Midcourse);
        assert!(solution.g_limit.is_finite());
        assert!(solution.time_to_go.unwrap() <= KAPPA_TTGO_CAP);
    }

    #[test]
    fn terminal_range_collapses_gains_and_never_regresses() {
        let world = FlatWorld::default();
        let cfg = KappaConfig {
            midcourse_range: 0.0,
            ..KappaConfig::default()
        };
        let missile = KinematicState::coasting(
            DVec3::new(0.0, 0.0, 2_000.0),
            DVec3::new(700.0, 0.0, -50.0),
        );
        let mut phase = LoftPhase::Midcourse;
        // Inside terminal homing range.
        kappa_target(
            &missile,
            DVec3::new(2_000.0, 0.0, 1_800.0),
            DVec3::new(-250.0, 0.0, 0.0),
            &test_airframe(700.0),
            &cfg,
            25.0,
            25.0,
            FlightMedium::Atmosphere,
            &mut phase,
            &world,
            0.02,
        );
        assert_eq!(phase, LoftPhase::Terminal);

        // Back at long range the phase must not regress.
        kappa_target(
            &missile,
            DVec3::new(50_000.0, 0.0, 1_800.0),
            DVec3::new(-250.0, 0.0, 0.0),
            &test_airframe(700.0),
            &cfg,
            25.0,
            25.0,
            FlightMedium::Atmosphere,
            &mut phase,
            &world,
            0.02,
        );
        assert_eq!(phase, LoftPhase::Terminal);
    }

    #[test]
    fn vacuum_uses_terminal_gains() {
        let world = FlatWorld::default();
        let cfg = KappaConfig {
            midcourse_range: 0.0,
            ..KappaConfig::default()
        };
        let missile = KinematicState::coasting(
            DVec3::new(0.0, 0.0, 60_000.0),
            DVec3::new(1_500.0, 0.0, 0.0),
        );
        let mut phase = LoftPhase::Boost;
        let solution = kappa_target(
            &missile,
            DVec3::new(80_000.0, 0.0, 60_000.0),
            DVec3::new(-500.0, 0.0, 0.0),
            &test_airframe(1_500.0),
            &cfg,
            25.0,
            25.0,
            FlightMedium::Vacuum,
            &mut phase,
            &world,
            0.02,
        );
        // Aero gains are meaningless in vacuum; drops straight to terminal.
        assert_eq!(phase, LoftPhase::Terminal);
        assert!(solution.aim_point.is_finite());
    }
}
