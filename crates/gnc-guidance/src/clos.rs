//! Command-to-line-of-sight guidance and beam riding.
//!
//! The CLOS family keeps the missile on the sensor-target line instead of
//! homing on the target directly: the core law cancels the beam-normal
//! position error, matches the beam's own translation and rotation, and puts
//! whatever speed remains into motion along the beam.

use glam::{DQuat, DVec3};

use gnc_core::constants::*;
use gnc_core::types::{Beam, GuidanceSolution};

/// Core CLOS acceleration command (world frame, m/s²).
///
/// `beam_ang_vel` is the angular velocity of the sensor-target line;
/// `sensor_vel` translates the whole beam. The commanded velocity is turned
/// into a lateral acceleration by `N·v·(cmd − (cmd·v̂)·v̂)`, the same
/// proportional form as PN.
pub fn clos_accel(
    sensor_pos: DVec3,
    sensor_vel: DVec3,
    missile_pos: DVec3,
    missile_vel: DVec3,
    target_pos: DVec3,
    beam_ang_vel: DVec3,
    correction_factor: f64,
    nav_gain: f64,
) -> DVec3 {
    let beam_dir = (target_pos - sensor_pos).normalize_or_zero();
    let on_beam_distance = (missile_pos - sensor_pos).dot(beam_dir);
    let on_beam_pos = sensor_pos + beam_dir * on_beam_distance;

    let beam_velocity = beam_ang_vel.cross(beam_dir * on_beam_distance);

    let beam_error_vec = missile_pos - on_beam_pos;
    let beam_error = beam_error_vec.length();
    let beam_error_dir = beam_error_vec.normalize_or_zero();

    let vel_dir = missile_vel.normalize_or_zero();
    let speed = missile_vel.length().max(MIN_GUIDANCE_SPEED);

    // Velocity command normal to the beam: cancel the error, ride the beam.
    let mut vel_command = -correction_factor * beam_error * beam_error_dir
        + beam_velocity
        + sensor_vel;

    // Whatever speed budget remains after the normal command goes into
    // motion along the beam.
    let remainder = 1.0 - vel_command.length_squared() / (speed * speed);
    if remainder < 0.0 {
        vel_command = vel_command.normalize_or_zero();
    } else {
        vel_command = vel_command / speed + remainder.sqrt() * beam_dir;
    }

    nav_gain * speed * (vel_command - vel_command.dot(vel_dir) * vel_dir)
}

/// CLOS from a stationary sensor.
pub fn clos_target(
    sensor_pos: DVec3,
    missile_pos: DVec3,
    missile_vel: DVec3,
    target_pos: DVec3,
    target_vel: DVec3,
    correction_factor: f64,
    nav_gain: f64,
    dt: f64,
) -> GuidanceSolution {
    let target_pos = target_pos + target_vel * dt;
    let accel = clos_accel(
        sensor_pos,
        DVec3::ZERO,
        missile_pos,
        missile_vel,
        target_pos,
        DVec3::ZERO,
        correction_factor,
        nav_gain,
    );
    clos_solution(missile_pos, missile_vel, accel)
}

/// Three-point guidance: CLOS from a moving sensor, with the Coriolis term
/// `−2·v×Ω` of the rotating beam frame.
pub fn three_point_target(
    sensor_pos: DVec3,
    sensor_vel: DVec3,
    missile_pos: DVec3,
    missile_vel: DVec3,
    target_pos: DVec3,
    target_vel: DVec3,
    correction_factor: f64,
    nav_gain: f64,
) -> GuidanceSolution {
    let rel_velocity = target_vel - sensor_vel;
    let rel_range = target_pos - sensor_pos;
    let range_sqr = rel_range.length_squared().max(RANGE_FLOOR * RANGE_FLOOR);
    let ang_vel = rel_range.cross(rel_velocity) / range_sqr;

    let mut accel = clos_accel(
        sensor_pos,
        sensor_vel,
        missile_pos,
        missile_vel,
        target_pos,
        ang_vel,
        correction_factor,
        nav_gain,
    );
    accel -= 2.0 * missile_vel.cross(ang_vel);
    clos_solution(missile_pos, missile_vel, accel)
}

/// Lead-biased CLOS: rotates the sensor-target line ahead by a fraction of
/// the lead angle, leaving `(1 − beam_lead_factor)` of the beam rotation to
/// be tracked as residual angular velocity.
pub fn clos_lead_target(
    sensor_pos: DVec3,
    sensor_vel: DVec3,
    missile_pos: DVec3,
    missile_vel: DVec3,
    target_pos: DVec3,
    target_vel: DVec3,
    correction_factor: f64,
    nav_gain: f64,
    beam_lead_factor: f64,
) -> GuidanceSolution {
    let rel_velocity = target_vel - sensor_vel;
    let rel_range = target_pos - sensor_pos;
    let range_sqr = rel_range.length_squared().max(RANGE_FLOOR * RANGE_FLOOR);

    let speed = missile_vel.length();
    let missile_vel = if speed > EPSILON && speed < MIN_GUIDANCE_SPEED {
        missile_vel * (MIN_GUIDANCE_SPEED / speed)
    } else {
        missile_vel
    };

    let range_m = (missile_pos - sensor_pos).length();
    let range_t_vec = target_pos - sensor_pos;
    let range_t = range_t_vec.length();
    let dir_t = range_t_vec.normalize_or_zero();

    let closing = speed.max(MIN_GUIDANCE_SPEED) - target_vel.dot(dir_t);
    let lead_time = if closing.abs() < EPSILON {
        LEAD_HORIZON
    } else {
        ((range_t - range_m) / closing).clamp(0.0, LEAD_HORIZON)
    };

    let delta_los =
        (beam_lead_factor.clamp(0.0, 1.0) * lead_time / range_sqr) * rel_range.cross(rel_velocity);
    let corrected_rel_range = if delta_los.length_squared() > EPSILON * EPSILON {
        DQuat::from_axis_angle(delta_los.normalize(), delta_los.length()) * rel_range
    } else {
        rel_range
    };

    let mut ang_vel = rel_range.cross(rel_velocity) / range_sqr;
    // Below the max lead time the beam converges on the target at the
    // residual rate left over from the fractional lead.
    if lead_time < LEAD_HORIZON {
        ang_vel *= 1.0 - beam_lead_factor;
    }

    let accel = clos_accel(
        sensor_pos,
        sensor_vel,
        missile_pos,
        missile_vel,
        sensor_pos + corrected_rel_range,
        ang_vel,
        correction_factor,
        nav_gain,
    );
    clos_solution(missile_pos, missile_vel, accel)
}

/// Beam riding against an explicit beam ray, with the beam velocity taken by
/// finite difference against the previous tick's beam.
pub fn beam_ride_target(
    beam: &Beam,
    previous_beam: &Beam,
    missile_pos: DVec3,
    missile_vel: DVec3,
    correction_factor: f64,
    correction_damping: f64,
    dt: f64,
) -> DVec3 {
    let on_beam_distance = (missile_pos - beam.origin).dot(beam.direction);
    let on_beam_pos = beam.point_at(on_beam_distance);
    let previous_beam_pos = previous_beam.point_at(on_beam_distance);
    let beam_vel = if dt > EPSILON {
        (on_beam_pos - previous_beam_pos) / dt
    } else {
        DVec3::ZERO
    };

    let mut target = on_beam_pos + 500.0 * beam.direction;
    let mut offset = on_beam_pos - missile_pos;
    offset += beam_vel * 0.5;
    target += correction_factor * offset;

    let vel_damp =
        correction_damping * (missile_vel - beam_vel).reject_from_normalized(beam.direction);
    target - vel_damp
}

/// CLOS aim points are extrapolated along the current velocity plus the
/// command over a fixed horizon; the laws carry no intercept-time estimate.
fn clos_solution(missile_pos: DVec3, missile_vel: DVec3, accel: DVec3) -> GuidanceSolution {
    GuidanceSolution {
        aim_point: missile_pos + 4.0 * missile_vel + 16.0 * accel,
        g_limit: accel.length() * INV_STANDARD_GRAVITY,
        time_to_go: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn clos_accel_zero_when_on_beam_and_aligned() {
        // Missile sitting on the beam, flying along it, stationary sensor.
        let accel = clos_accel(
            DVec3::ZERO,
            DVec3::ZERO,
            DVec3::new(2_000.0, 0.0, 0.0),
            DVec3::new(600.0, 0.0, 0.0),
            DVec3::new(10_000.0, 0.0, 0.0),
            DVec3::ZERO,
            0.25,
            3.0,
        );
        assert_relative_eq!(accel.length(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn clos_accel_pulls_back_toward_beam() {
        // Missile displaced +y off the beam: the command must have a -y
        // component to bring it back.
        let accel = clos_accel(
            DVec3::ZERO,
            DVec3::ZERO,
            DVec3::new(2_000.0, 300.0, 0.0),
            DVec3::new(600.0, 0.0, 0.0),
            DVec3::new(10_000.0, 0.0, 0.0),
            DVec3::ZERO,
            0.25,
            3.0,
        );
        assert!(accel.y < 0.0, "expected pull toward the beam, got {accel}");
    }

    #[test]
    fn clos_accel_speed_budget_saturates() {
        // An error large enough that the normal command exceeds the speed
        // budget: the command collapses to the normalized direction and the
        // along-beam term disappears, but the output stays finite.
        let accel = clos_accel(
            DVec3::ZERO,
            DVec3::ZERO,
            DVec3::new(2_000.0, 5_000.0, 0.0),
            DVec3::new(250.0, 0.0, 0.0),
            DVec3::new(10_000.0, 0.0, 0.0),
            DVec3::ZERO,
            1.0,
            3.0,
        );
        assert!(accel.is_finite());
        assert!(accel.y < 0.0);
    }

    #[test]
    fn three_point_matches_clos_for_stationary_sensor() {
        // With a stationary sensor and a stationary target the beam does not
        // rotate, so the Coriolis term vanishes and the two laws agree.
        let missile_pos = DVec3::new(3_000.0, 150.0, 0.0);
        let missile_vel = DVec3::new(500.0, 0.0, 0.0);
        let target_pos = DVec3::new(12_000.0, 0.0, 0.0);
        let a = clos_target(
            DVec3::ZERO,
            missile_pos,
            missile_vel,
            target_pos,
            DVec3::ZERO,
            0.25,
            3.0,
            0.0,
        );
        let b = three_point_target(
            DVec3::ZERO,
            DVec3::ZERO,
            missile_pos,
            missile_vel,
            target_pos,
            DVec3::ZERO,
            0.25,
            3.0,
        );
        assert_relative_eq!(a.g_limit, b.g_limit, epsilon = 1e-9);
        assert!((a.aim_point - b.aim_point).length() < 1e-6);
    }

    #[test]
    fn clos_lead_full_factor_drops_residual_rotation() {
        // With beam_lead_factor = 1 the residual angular velocity is zero;
        // the solution must stay finite and demand a sane g.
        let solution = clos_lead_target(
            DVec3::ZERO,
            DVec3::ZERO,
            DVec3::new(3_000.0, 100.0, 0.0),
            DVec3::new(500.0, 0.0, 0.0),
            DVec3::new(12_000.0, 0.0, 500.0),
            DVec3::new(0.0, 200.0, 0.0),
            0.25,
            3.0,
            1.0,
        );
        assert!(solution.aim_point.is_finite());
        assert!(solution.g_limit.is_finite());
        assert!(solution.time_to_go.is_none());
    }

    #[test]
    fn beam_ride_leads_down_the_beam() {
        let beam = Beam::new(DVec3::ZERO, DVec3::X);
        // Missile on the beam, matching velocity: aim is straight ahead.
        let target = beam_ride_target(
            &beam,
            &beam,
            DVec3::new(2_000.0, 0.0, 0.0),
            DVec3::new(600.0, 0.0, 0.0),
            0.5,
            0.15,
            0.02,
        );
        assert!((target - DVec3::new(2_500.0, 0.0, 0.0)).length() < 1e-9);
    }

    #[test]
    fn beam_ride_corrects_off_beam_error() {
        let beam = Beam::new(DVec3::ZERO, DVec3::X);
        let target = beam_ride_target(
            &beam,
            &beam,
            DVec3::new(2_000.0, 40.0, 0.0),
            DVec3::new(600.0, 0.0, 0.0),
            0.5,
            0.15,
            0.02,
        );
        // Aim pulled to the far side of the beam to cancel the offset.
        assert!(target.y < 0.0);
    }

    #[test]
    fn beam_ride_damps_lateral_velocity() {
        let beam = Beam::new(DVec3::ZERO, DVec3::X);
        let drifting = beam_ride_target(
            &beam,
            &beam,
            DVec3::new(2_000.0, 0.0, 0.0),
            DVec3::new(600.0, 80.0, 0.0),
            0.5,
            0.15,
            0.02,
        );
        assert!(drifting.y < 0.0, "lateral drift should be damped");
    }
}
