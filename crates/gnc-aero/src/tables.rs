//! Coefficient curves and their fixed linearization.
//!
//! The calibration curves (AoA of the local load maximum, the equal-load
//! return AoA, the maximum normalized load, and the torque-return AoA) are
//! fitted to the default lift/drag curve pair. If the coefficient curves are
//! replaced, these must be re-fitted as a set.

/// One keyframe of a cubic Hermite spline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HermiteKey {
    pub time: f64,
    pub value: f64,
    pub in_tangent: f64,
    pub out_tangent: f64,
}

impl HermiteKey {
    pub const fn new(time: f64, value: f64, in_tangent: f64, out_tangent: f64) -> Self {
        Self {
            time,
            value,
            in_tangent,
            out_tangent,
        }
    }

    /// Key with flat tangents.
    pub const fn flat(time: f64, value: f64) -> Self {
        Self::new(time, value, 0.0, 0.0)
    }
}

/// Piecewise cubic Hermite curve over a borrowed, time-sorted key slice.
///
/// Each segment interpolates using the left key's out-tangent and the right
/// key's in-tangent; evaluation clamps to the end values outside the key
/// range.
#[derive(Debug, Clone, Copy)]
pub struct HermiteCurve<'a> {
    keys: &'a [HermiteKey],
}

impl<'a> HermiteCurve<'a> {
    /// `keys` must be non-empty and sorted by time.
    pub const fn new(keys: &'a [HermiteKey]) -> Self {
        Self { keys }
    }

    pub fn evaluate(&self, t: f64) -> f64 {
        let first = self.keys[0];
        if t <= first.time {
            return first.value;
        }
        let last = self.keys[self.keys.len() - 1];
        if t >= last.time {
            return last.value;
        }

        let right_idx = self.keys.partition_point(|k| k.time <= t);
        let k0 = self.keys[right_idx - 1];
        let k1 = self.keys[right_idx];

        let dt = k1.time - k0.time;
        let s = (t - k0.time) / dt;
        let s2 = s * s;
        let s3 = s2 * s;
        let m0 = k0.out_tangent * dt;
        let m1 = k1.in_tangent * dt;

        (2.0 * s3 - 3.0 * s2 + 1.0) * k0.value
            + (s3 - 2.0 * s2 + s) * m0
            + (-2.0 * s3 + 3.0 * s2) * k1.value
            + (s3 - s2) * m1
    }
}

/// Lift coefficient vs AoA (degrees) for the reference airframe.
pub static DEFAULT_LIFT_CURVE: HermiteCurve<'static> = HermiteCurve::new(&[
    HermiteKey::new(0.0, 0.0, 0.04375, 0.04375),
    HermiteKey::new(8.0, 0.35, 0.04801136, 0.04801136),
    HermiteKey::flat(30.0, 1.5),
    HermiteKey::flat(65.0, 0.6),
    HermiteKey::flat(90.0, 0.7),
]);

/// Drag coefficient vs AoA (degrees) for the reference airframe.
pub static DEFAULT_DRAG_CURVE: HermiteCurve<'static> = HermiteCurve::new(&[
    HermiteKey::new(0.0, 0.00215, 0.0, 0.0),
    HermiteKey::new(5.0, 0.00285, 0.0002775, 0.0002775),
    HermiteKey::new(30.0, 0.01, 0.0002142857, 0.01115385),
    HermiteKey::new(55.0, 0.3, 0.008434067, 0.008434067),
    HermiteKey::new(90.0, 0.5, 0.005714285, 0.005714285),
]);

/// AoA breakpoints (degrees) of the linearized coefficient tables.
pub const BREAKPOINTS_DEG: [f64; 8] = [0.0, 10.0, 24.0, 30.0, 38.0, 57.0, 65.0, 90.0];

/// Lift coefficient at each breakpoint.
pub const LIN_CL: [f64; 8] = [
    0.0,
    0.454444597111092,
    1.34596044049850,
    1.5,
    1.38043381924198,
    0.719566180758018,
    0.6,
    0.7,
];

/// sin(AoA) at each breakpoint.
pub const LIN_SIN: [f64; 8] = [
    0.0,
    0.173648177666930,
    0.406736643075800,
    0.5,
    0.615661475325658,
    0.838670567945424,
    0.906307787036650,
    1.0,
];

/// Per-interval slope of the linearized lift coefficient.
pub const LIN_SLOPE: [f64; 7] = [
    0.0454444597111092,
    0.0636797030991005,
    0.0256732599169169,
    -0.0149457725947522,
    -0.0347825072886297,
    -0.0149457725947522,
    0.004,
];

/// Per-interval intercept of the linearized lift coefficient.
pub const LIN_INTC: [f64; 7] = [
    0.0,
    -0.182352433879912,
    0.729802202492494,
    1.94837317784257,
    2.70216909620991,
    1.57147521865889,
    0.34,
];

/// cos(AoA)·CL at each breakpoint (lift contribution to aero torque).
pub const LIN_LIFT_TORQUE: [f64; 8] = [
    0.0,
    0.449212170675488687,
    1.23071251302548967,
    1.29903810567665712,
    1.08779669420507852,
    0.391903830317496704,
    0.253570957044423284,
    0.0,
];

/// sin(AoA)·CD at each breakpoint (drag contribution to aero torque).
pub const LIN_DRAG_TORQUE: [f64; 8] = [
    0.0,
    0.000748453415988048856,
    0.00346671023416293559,
    0.00499999999999927499,
    0.0656669812489726473,
    0.26524150275361541,
    0.336257675049945692,
    0.5,
];

/// Per-interval slope of cos(AoA)·CL.
pub const LIN_LIFT_TORQUE_SLOPE: [f64; 7] = [
    0.0449212178074,
    0.0558214214286,
    0.0113876666667,
    -0.026405125,
    -0.0366259562991,
    -0.0172916091591,
    -0.0101428382818,
];

/// Per-interval intercept of cos(AoA)·CL.
pub const LIN_LIFT_TORQUE_INTC: [f64; 7] = [
    0.0,
    -0.109002114286,
    0.957408,
    2.09119175,
    2.47958333937,
    1.37752555239,
    0.91285544536,
];

/// Per-interval slope of sin(AoA)·CD. The first three intervals share a
/// single coarse line since drag torque is negligible below 30°.
pub const LIN_DRAG_TORQUE_SLOPE: [f64; 7] = [
    0.000166666666667,
    0.000166666666667,
    0.000166666666667,
    0.00691309375,
    0.0107346842105,
    0.009046,
    0.00653472,
];

/// Per-interval intercept of sin(AoA)·CD.
pub const LIN_DRAG_TORQUE_INTC: [f64; 7] = [
    0.0,
    0.0,
    0.0,
    -0.2023928125,
    -0.347613,
    -0.251358,
    -0.0881248,
];

/// Thrust-to-max-lift ratio above which the load maximum moves past 65° AoA.
pub const THRUST_RATIO_INFLEC1: f64 = 1.181181181181181;
/// Thrust-to-max-lift ratio above which no local load maximum exists and the
/// load is monotone in AoA over the whole range.
pub const THRUST_RATIO_INFLEC2: f64 = 2.242242242242242;

/// Drag-to-lift area ratio above which aero torque regains its local-max
/// value before 90° AoA.
pub const DRAG_LIFT_INFLEC1: f64 = 2.63636363636363624;
/// Drag-to-lift area ratio above which aero torque has no local maximum.
pub const DRAG_LIFT_INFLEC2: f64 = 3.92610837438423754;

/// AoA (degrees) of the local load maximum, as a function of the
/// thrust-to-max-lift ratio. Valid up to [`THRUST_RATIO_INFLEC2`].
pub static AOA_OF_LOCAL_MAX: HermiteCurve<'static> = HermiteCurve::new(&[
    HermiteKey::new(0.0, 30.0, 5.577463, 5.577463),
    HermiteKey::new(0.7107107107, 33.9639639640, 6.24605, 6.24605),
    HermiteKey::new(1.5315315315, 39.6396396396, 8.396343, 8.396343),
    HermiteKey::new(1.9419419419, 43.6936936937, 12.36403, 12.36403),
    HermiteKey::new(2.1421421421, 46.6666666667, 19.63926, 19.63926),
    HermiteKey::new(2.2122122122, 48.3783783784, 34.71423, 34.71423),
    HermiteKey::new(2.2422422422, 49.7297297297, 44.99994, 44.99994),
]);

/// AoA (degrees) past which the load climbs back above the local maximum.
/// Only meaningful between the two thrust-ratio inflection points.
pub static AOA_EQUAL_LOAD: HermiteCurve<'static> = HermiteCurve::new(&[
    HermiteKey::new(1.1911911912, 89.6396396396, -53.40001, -53.40001),
    HermiteKey::new(1.3413413413, 81.6216216216, -49.69999, -49.69999),
    HermiteKey::new(1.5215215215, 73.3333333333, -37.62499, -37.62499),
    HermiteKey::new(1.7217217217, 67.4774774775, -24.31731, -24.31731),
    HermiteKey::new(1.9819819820, 62.4324324324, -24.09232, -24.09232),
    HermiteKey::new(2.1821821822, 56.6666666667, -48.1499, -48.1499),
    HermiteKey::new(2.2422422422, 52.6126126126, -67.49978, -67.49978),
]);

/// Maximum force normalized by `q·S` as a function of the thrust-to-max-lift
/// ratio; a local maximum above [`THRUST_RATIO_INFLEC1`].
pub static MAX_LOAD: HermiteCurve<'static> = HermiteCurve::new(&[
    HermiteKey::new(0.0, 1.5, 0.8248255, 0.8248255),
    HermiteKey::new(1.2012012012, 2.4907813293, 0.8942869, 0.8942869),
    HermiteKey::new(1.9119119119, 3.1757276995, 1.019205, 1.019205),
    HermiteKey::new(2.2422422422, 3.5307206802, 1.074661, 1.074661),
]);

/// AoA (degrees) at which aero torque climbs back past its local maximum, as
/// a function of the drag-to-lift ratio.
pub static TORQUE_AOA_RETURN: HermiteCurve<'static> = HermiteCurve::new(&[
    HermiteKey::new(2.6496350364963499, 88.7129999999999939, -106.9758, -106.9758),
    HermiteKey::new(2.73134328358208922, 79.9722000000000008, -70.59726, -70.59726),
    HermiteKey::new(3.14937759336099621, 65.6675999999999931, -28.9337, -28.9337),
    HermiteKey::new(3.52488687782805465, 56.7873000000000019, -31.87921, -31.87921),
    HermiteKey::new(3.69483568075117441, 49.9707000000000008, -61.73428, -61.73428),
    HermiteKey::new(3.76190476190476275, 44.3798999999999992, -83.35883, -18.59649),
    HermiteKey::new(3.83091787439613629, 43.0964999999999989, -23.74979, -23.74979),
    HermiteKey::new(3.92610837438423754, 40.3451999999999984, -28.9031, -28.9031),
]);

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn lift_curve_passes_through_keys() {
        assert_relative_eq!(DEFAULT_LIFT_CURVE.evaluate(0.0), 0.0);
        assert_relative_eq!(DEFAULT_LIFT_CURVE.evaluate(8.0), 0.35);
        assert_relative_eq!(DEFAULT_LIFT_CURVE.evaluate(30.0), 1.5);
        assert_relative_eq!(DEFAULT_LIFT_CURVE.evaluate(90.0), 0.7);
    }

    #[test]
    fn curve_clamps_outside_key_range() {
        assert_relative_eq!(DEFAULT_LIFT_CURVE.evaluate(-5.0), 0.0);
        assert_relative_eq!(DEFAULT_LIFT_CURVE.evaluate(120.0), 0.7);
        assert_relative_eq!(DEFAULT_DRAG_CURVE.evaluate(120.0), 0.5);
    }

    #[test]
    fn curve_is_continuous_across_keys() {
        let below = DEFAULT_DRAG_CURVE.evaluate(30.0 - 1e-9);
        let above = DEFAULT_DRAG_CURVE.evaluate(30.0 + 1e-9);
        assert_relative_eq!(below, above, epsilon = 1e-6);
    }

    #[test]
    fn lift_table_slopes_match_breakpoints() {
        for i in 0..7 {
            let slope = (LIN_CL[i + 1] - LIN_CL[i]) / (BREAKPOINTS_DEG[i + 1] - BREAKPOINTS_DEG[i]);
            assert_relative_eq!(slope, LIN_SLOPE[i], epsilon = 1e-9);
            let intc = LIN_CL[i] - LIN_SLOPE[i] * BREAKPOINTS_DEG[i];
            assert_relative_eq!(intc, LIN_INTC[i], epsilon = 1e-9);
        }
    }

    #[test]
    fn breakpoint_sines_are_exact() {
        for i in 0..8 {
            assert_relative_eq!(
                LIN_SIN[i],
                BREAKPOINTS_DEG[i].to_radians().sin(),
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn local_max_aoa_curve_starts_at_thrustless_peak() {
        // Without thrust the load peaks at the 30° CL maximum.
        assert_relative_eq!(AOA_OF_LOCAL_MAX.evaluate(0.0), 30.0);
        assert_relative_eq!(MAX_LOAD.evaluate(0.0), 1.5);
    }
}
