//! Closed-loop engagement scenarios across guidance laws.

use glam::DVec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use gnc_core::constants::STANDARD_GRAVITY;
use gnc_core::enums::{LoftPhase, TerminalHomingLaw};
use gnc_core::gains::{LoftConfig, WeaveConfig};
use gnc_core::geodesy::FlatWorld;
use gnc_core::kinematics::rotate_towards;
use gnc_core::session::WeaveSession;
use gnc_core::types::{GuidanceSolution, KinematicState};

use crate::clos::clos_target;
use crate::loft::loft_target;
use crate::pronav::{apn_target, pn_target};
use crate::weave::weave_target;

/// Turn the velocity vector toward the aim point, limited by the commanded
/// g load, then integrate one step. Speed is held constant.
fn steer_and_step(missile: &mut KinematicState, solution: &GuidanceSolution, g_cap: f64, dt: f64) {
    let speed = missile.speed();
    let g = if solution.g_limit > 0.0 {
        solution.g_limit.min(g_cap)
    } else {
        g_cap
    };
    let max_turn = g * STANDARD_GRAVITY * dt / speed.max(1.0);
    let desired = solution.aim_point - missile.position;
    missile.velocity = rotate_towards(missile.velocity, desired, max_turn)
        .normalize_or_zero()
        * speed;
    missile.position += missile.velocity * dt;
}

#[test]
fn pn_intercepts_crossing_target() {
    let dt = 0.02;
    let mut missile =
        KinematicState::coasting(DVec3::new(0.0, 0.0, 8_000.0), DVec3::new(600.0, 0.0, 0.0));
    let mut target_pos = DVec3::new(8_000.0, 2_000.0, 8_000.0);
    let target_vel = DVec3::new(-250.0, 0.0, 0.0);

    let mut min_range = f64::INFINITY;
    for _ in 0..3_000 {
        let solution = pn_target(&missile, target_pos, target_vel, 3.0);
        steer_and_step(&mut missile, &solution, 30.0, dt);
        target_pos += target_vel * dt;
        min_range = min_range.min((target_pos - missile.position).length());
    }
    assert!(min_range < 25.0, "PN miss distance {min_range}");
}

#[test]
fn apn_tracks_turning_target() {
    let dt = 0.02;
    let mut missile =
        KinematicState::coasting(DVec3::new(0.0, 0.0, 8_000.0), DVec3::new(700.0, 0.0, 0.0));
    let mut target = KinematicState::coasting(
        DVec3::new(9_000.0, 1_000.0, 8_000.0),
        DVec3::new(-250.0, 0.0, 0.0),
    );
    // Sustained 3 g level turn.
    let turn_accel = 3.0 * STANDARD_GRAVITY;

    let mut min_range = f64::INFINITY;
    for _ in 0..3_000 {
        let turn_dir = DVec3::Z.cross(target.velocity_dir());
        target.acceleration = turn_accel * turn_dir;
        let solution = apn_target(
            &missile,
            target.position,
            target.velocity,
            target.acceleration,
            3.0,
        );
        steer_and_step(&mut missile, &solution, 30.0, dt);
        target.velocity += target.acceleration * dt;
        target.velocity = target.velocity.normalize() * 250.0;
        target.position += target.velocity * dt;
        min_range = min_range.min((target.position - missile.position).length());
    }
    assert!(min_range < 60.0, "APN miss distance {min_range}");
}

#[test]
fn clos_converges_onto_the_beam() {
    let dt = 0.02;
    let sensor_pos = DVec3::ZERO;
    let mut target_pos = DVec3::new(6_000.0, 0.0, 3_000.0);
    let target_vel = DVec3::new(0.0, 100.0, 0.0);

    let beam_dir = (target_pos - sensor_pos).normalize();
    let beam_perp = DVec3::new(-beam_dir.z, 0.0, beam_dir.x);
    let mut missile = KinematicState::coasting(
        500.0 * beam_dir + 300.0 * beam_perp,
        400.0 * beam_dir,
    );

    let mut min_offset = f64::INFINITY;
    for _ in 0..1_000 {
        let solution = clos_target(
            sensor_pos,
            missile.position,
            missile.velocity,
            target_pos,
            target_vel,
            0.25,
            3.0,
            dt,
        );
        steer_and_step(&mut missile, &solution, solution.g_limit.max(10.0), dt);
        target_pos += target_vel * dt;

        let beam_dir = (target_pos - sensor_pos).normalize();
        let along = (missile.position - sensor_pos).dot(beam_dir);
        let offset = (missile.position - sensor_pos - along * beam_dir).length();
        min_offset = min_offset.min(offset);
    }
    assert!(min_offset < 150.0, "beam offset never fell below {min_offset}");
}

#[test]
fn loft_engagement_runs_boost_to_terminal() {
    let dt = 0.05;
    let world = FlatWorld::default();
    let cfg = LoftConfig::default();
    let mut phase = LoftPhase::Boost;

    let mut missile =
        KinematicState::coasting(DVec3::new(0.0, 0.0, 2_000.0), DVec3::new(400.0, 0.0, 0.0));
    let mut target = KinematicState::coasting(
        DVec3::new(30_000.0, 0.0, 1_000.0),
        DVec3::new(-200.0, 0.0, 0.0),
    );

    let mut min_range = f64::INFINITY;
    let mut last_phase = phase;
    for _ in 0..1_200 {
        let solution = loft_target(
            &missile,
            &target,
            &cfg,
            3.0,
            TerminalHomingLaw::ProNav,
            &mut phase,
            &world,
            dt,
        );
        assert!(phase >= last_phase, "loft phase regressed");
        last_phase = phase;

        // Motor pushes toward cruise speed while guidance steers.
        let speed = (missile.speed() + 50.0 * dt).min(cfg.optimum_airspeed);
        missile.velocity = missile.velocity_dir() * speed;
        steer_and_step(&mut missile, &solution, 30.0, dt);
        target.position += target.velocity * dt;
        min_range = min_range.min((target.position - missile.position).length());
    }

    assert_eq!(phase, LoftPhase::Terminal);
    assert!(min_range < 300.0, "loft miss distance {min_range}");
}

#[test]
fn weave_run_in_activates_and_closes() {
    let dt = 0.05;
    let world = FlatWorld::default();
    let cfg = WeaveConfig::default();
    let mut session = WeaveSession::default();
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    let mut missile =
        KinematicState::coasting(DVec3::new(0.0, 0.0, 4_000.0), DVec3::new(600.0, 0.0, -50.0));
    let target_pos = DVec3::new(15_000.0, 0.0, 500.0);

    let mut min_range = f64::INFINITY;
    for _ in 0..600 {
        let solution = weave_target(
            &missile,
            target_pos,
            DVec3::ZERO,
            &cfg,
            &mut session,
            &world,
            &mut rng,
        );
        steer_and_step(&mut missile, &solution, 30.0, dt);
        min_range = min_range.min((target_pos - missile.position).length());
    }

    assert!(session.activation.is_some());
    assert!(min_range < 500.0, "weave miss distance {min_range}");
}
