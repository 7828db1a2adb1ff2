//! Point-mass prediction and closest-point-of-approach timing.

use glam::{DQuat, DVec3};

use crate::constants::EPSILON;

/// Extrapolate a position under constant acceleration.
pub fn predict_position(position: DVec3, velocity: DVec3, acceleration: DVec3, dt: f64) -> DVec3 {
    position + velocity * dt + 0.5 * acceleration * dt * dt
}

/// Split a vector into magnitude and unit direction (zero for a zero vector).
pub fn mag_norm(v: DVec3) -> (f64, DVec3) {
    let mag = v.length();
    if mag < EPSILON {
        (0.0, DVec3::ZERO)
    } else {
        (mag, v / mag)
    }
}

/// Time of closest approach between two bodies, clamped to `[0, max_t]`.
///
/// Inputs are the relative position, velocity, and acceleration of the
/// target with respect to the missile. With negligible relative acceleration
/// the closed form `-(P·V)/|V|²` applies. Otherwise the range rate is
/// sampled across the horizon and the first approach-to-recede crossing is
/// refined by bisection; when nothing brackets (the pair never stops
/// closing, or never starts) the horizon itself is returned.
pub fn time_to_cpa(rel_pos: DVec3, rel_vel: DVec3, rel_accel: DVec3, max_t: f64) -> f64 {
    if max_t <= 0.0 {
        return 0.0;
    }
    if rel_accel.length_squared() < EPSILON {
        let v_sqr = rel_vel.length_squared();
        if v_sqr < EPSILON {
            return 0.0;
        }
        return (-rel_pos.dot(rel_vel) / v_sqr).clamp(0.0, max_t);
    }

    // Range rate: d/dt ½|P + Vt + ½At²|² = (V + At)·(P + Vt + ½At²).
    let range_rate = |t: f64| {
        let p = rel_pos + rel_vel * t + 0.5 * rel_accel * t * t;
        let v = rel_vel + rel_accel * t;
        v.dot(p)
    };

    const SAMPLES: usize = 64;
    const REFINE_STEPS: usize = 32;
    let step = max_t / SAMPLES as f64;
    let mut prev_t = 0.0;
    let mut prev_rate = range_rate(0.0);
    for i in 1..=SAMPLES {
        let t = step * i as f64;
        let rate = range_rate(t);
        if prev_rate < 0.0 && rate >= 0.0 {
            let (mut lo, mut hi) = (prev_t, t);
            for _ in 0..REFINE_STEPS {
                let mid = 0.5 * (lo + hi);
                if range_rate(mid) < 0.0 {
                    lo = mid;
                } else {
                    hi = mid;
                }
            }
            return 0.5 * (lo + hi);
        }
        prev_t = t;
        prev_rate = rate;
    }
    max_t
}

/// Rotate `from` toward `to` by fraction `t` of the angle between them.
/// Both inputs should be unit vectors; the result stays unit length.
pub fn slerp_direction(from: DVec3, to: DVec3, t: f64) -> DVec3 {
    let angle = from.angle_between(to);
    if !angle.is_finite() || angle < EPSILON {
        return from;
    }
    let axis = from.cross(to);
    if axis.length_squared() < EPSILON {
        // Antiparallel: no unique rotation plane.
        return from;
    }
    DQuat::from_axis_angle(axis.normalize(), angle * t) * from
}

/// Rotate `dir` toward `target` by at most `max_angle` radians.
pub fn rotate_towards(dir: DVec3, target: DVec3, max_angle: f64) -> DVec3 {
    let angle = dir.angle_between(target);
    if !angle.is_finite() || angle < EPSILON || max_angle <= 0.0 {
        return dir;
    }
    slerp_direction(dir, target, (max_angle / angle).min(1.0))
}
