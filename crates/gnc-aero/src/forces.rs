//! Aero force application and the steering torque controller.
//!
//! Body convention: +Z is the airframe's forward axis, so the roll component
//! of any body-frame torque is the Z component. The aero center sits one
//! moment arm behind the center of mass, which makes the airstream torque
//! restoring (it weathervanes the nose toward the velocity vector); the
//! controller treats that torque as a disturbance and budgets its own
//! command against it.

use glam::{DQuat, DVec3};

use gnc_core::constants::EPSILON;
use gnc_core::kinematics::slerp_direction;
use gnc_core::session::TorqueBoundCache;
use gnc_core::types::{AirframeSnapshot, KinematicState};

use crate::tables::HermiteCurve;
use crate::torque_limit::{aoa_for_torque, AERO_CENTER_DIST};

/// Steering controller settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AeroControlConfig {
    /// Gain from turning angle (degrees) to commanded torque.
    pub steer_mult: f64,
    /// Fixed control torque budget (N·m).
    pub max_torque: f64,
    /// Additional budget per unit dynamic pressure (aero control surfaces).
    pub max_torque_aero: f64,
    /// Commanded-AoA ceiling (degrees) before the torque envelope applies.
    pub max_aoa: f64,
    /// Whether reaction controls allow steering with no airstream while the
    /// motor burns.
    pub vacuum_steerable: bool,
}

impl Default for AeroControlConfig {
    fn default() -> Self {
        Self {
            steer_mult: 0.5,
            max_torque: 90.0,
            max_torque_aero: 0.0,
            max_aoa: 35.0,
            vacuum_steerable: false,
        }
    }
}

/// Forces and the body-frame control torque for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AeroCommand {
    /// Lift (world frame, N), normal to the airstream.
    pub lift_force: DVec3,
    /// Drag (world frame, N), along the reversed airstream.
    pub drag_force: DVec3,
    /// World point where both forces act.
    pub force_position: DVec3,
    /// Control torque (body frame, N·m); roll component is always zero.
    pub torque: DVec3,
}

/// Evaluate aero forces and the steering torque toward `target_position`.
///
/// The command torque is proportional to the angle between the nose and the
/// (AoA-clamped) desired heading, softened quadratically below 1°, and is
/// clipped so the combined command-plus-airstream torque never exceeds the
/// budget: the clip is the positive root of the line-sphere intersection in
/// torque space. With a saturating airstream torque the command is only kept
/// where it opposes the disturbance; otherwise the disturbance itself is
/// scaled down to the budget. Below 1 m/s of airspeed (and without reaction
/// steering) the previous torque just decays.
#[allow(clippy::too_many_arguments)]
pub fn aero_forces_and_torque(
    missile: &KinematicState,
    orientation: DQuat,
    airframe: &AirframeSnapshot,
    target_position: DVec3,
    previous_torque: DVec3,
    cfg: &AeroControlConfig,
    cache: &mut TorqueBoundCache,
    lift_curve: &HermiteCurve,
    drag_curve: &HermiteCurve,
) -> AeroCommand {
    let forward = orientation * DVec3::Z;
    let vel_norm = {
        let dir = missile.velocity_dir();
        if dir.length_squared() < EPSILON {
            forward
        } else {
            dir
        }
    };

    let q = airframe.dynamic_pressure();
    let max_torque = cfg.max_torque + q * cfg.max_torque_aero;

    let aoa = forward
        .angle_between(vel_norm)
        .to_degrees()
        .clamp(0.0, 90.0);
    let force_position = missile.position + orientation * DVec3::new(0.0, 0.0, -AERO_CENTER_DIST);
    let force_direction = (-missile.velocity.reject_from_normalized(forward)).normalize_or_zero();

    let lift_force = if aoa > 0.0 {
        q * airframe.lift_area * lift_curve.evaluate(aoa).max(0.0) * force_direction
    } else {
        DVec3::ZERO
    };
    let drag_force = if airframe.speed > 0.0 {
        -q * airframe.drag_area * drag_curve.evaluate(aoa).max(0.0) * vel_norm
    } else {
        DVec3::ZERO
    };

    if airframe.speed <= 1.0 && !(cfg.vacuum_steerable && airframe.thrust > 0.0) {
        // No control authority; bleed off whatever torque was applied.
        let mut torque = previous_torque.lerp(DVec3::ZERO, 0.25);
        torque.z = 0.0;
        return AeroCommand {
            lift_force,
            drag_force,
            force_position,
            torque,
        };
    }

    // Torque the airstream exerts about the center of mass, sign flipped so
    // it reads as the disturbance the controller must budget against.
    let mut aero_torque = (lift_force + drag_force).cross(force_position - missile.position);

    let aoa_lim = (cfg.max_aoa + (0.1 * cfg.max_aoa).min(2.0))
        .min(aoa_for_torque(airframe, cache, max_torque));

    let mut target_direction = (target_position - missile.position).normalize_or_zero();
    let target_angle = vel_norm.angle_between(target_direction).to_degrees();
    if target_angle > aoa_lim {
        target_direction = slerp_direction(vel_norm, target_direction, aoa_lim / target_angle);
    }
    let turning_angle = forward.angle_between(target_direction).to_degrees();

    let final_torque;
    if turning_angle.to_radians() > 0.005 {
        let torque_direction =
            forward.cross(target_direction) / turning_angle.to_radians().sin();

        let softened = if turning_angle < 1.0 {
            turning_angle * turning_angle
        } else {
            turning_angle
        };
        let mut torque = (softened.min(aoa_lim) * 4.0 * cfg.steer_mult).clamp(0.0, max_torque);

        let aero_sqr = aero_torque.length_squared();
        let budget_sqr = max_torque * max_torque;
        let along = aero_torque.dot(torque_direction);

        if aero_sqr < budget_sqr {
            // Unsaturated: clip the command at the sphere boundary. A line
            // starting inside the sphere always intersects it, so the
            // discriminant needs no check.
            if (aero_torque + torque_direction * torque).length_squared() > budget_sqr {
                torque = (along * along - (aero_sqr - budget_sqr)).sqrt() - along;
            }
            if along < 0.0 {
                torque *= 0.5;
            }
        } else {
            // The disturbance alone exceeds the budget. If the command
            // opposes it and the line reaches back into the sphere, keep
            // whatever slice of the command fits.
            let det = along * along - (aero_sqr - budget_sqr);
            if along < 0.0 && det > 0.0 {
                let root = det.sqrt();
                let lower = -root - along;
                let upper = root - along;
                if torque < lower {
                    torque = 0.0;
                    aero_torque *= max_torque / aero_torque.length();
                } else if torque > upper {
                    torque = upper;
                }
            } else {
                torque = 0.0;
                aero_torque *= max_torque / aero_torque.length();
            }
        }

        final_torque = if torque > 0.0 {
            torque * torque_direction + aero_torque
        } else {
            aero_torque
        };
    } else {
        let aero_sqr = aero_torque.length_squared();
        if aero_sqr > max_torque * max_torque {
            aero_torque *= max_torque / aero_sqr.sqrt();
        }
        final_torque = aero_torque;
    }

    let mut torque = orientation.inverse() * final_torque;
    torque.z = 0.0;
    AeroCommand {
        lift_force,
        drag_force,
        force_position,
        torque,
    }
}
