//! Guidance gain and shaping configuration.
//!
//! Everything here is immutable per missile: set at launch, read every tick.
//! Defaults are the tuning fitted for a mid-size tactical missile; hosts with
//! different airframes override per field.

use serde::{Deserialize, Serialize};

/// Gains shared by the PN and command-guidance families.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuidanceGains {
    /// Proportional-navigation constant N.
    pub nav_gain: f64,
    /// Beam-error correction factor for the CLOS family.
    pub correction_factor: f64,
    /// Velocity-damping factor for the beam rider.
    pub correction_damping: f64,
    /// Fraction of the full lead rotation applied by lead-biased CLOS, in
    /// [0, 1]. 0 is pure three-point, 1 is full lead.
    pub beam_lead_factor: f64,
}

impl Default for GuidanceGains {
    fn default() -> Self {
        Self {
            nav_gain: 3.0,
            correction_factor: 0.25,
            correction_damping: 0.15,
            beam_lead_factor: 1.0,
        }
    }
}

/// Tuning for the terminal weave law.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeaveConfig {
    /// Vertical weave amplitude (gees). Zero disables the vertical weave.
    pub g_vertical: f64,
    /// Horizontal weave amplitude (gees). Zero disables the horizontal weave.
    pub g_horizontal: f64,
    /// One-shot uniform jitter applied to the amplitudes at activation:
    /// `[horizontal, vertical]` half-ranges in gees.
    pub amplitude_jitter: [f64; 2],
    /// Weave frequency (Hz).
    pub frequency: f64,
    /// Desired terminal impact angle (degrees) for the biased-PN channel.
    /// Zero-or-negative disables the bias once the descent profile takes over.
    pub terminal_angle_deg: f64,
    /// Scales the down-range weave time constant once active.
    pub weave_factor: f64,
    /// Follow a sea-skimming/descent altitude profile instead of a straight
    /// dive (anti-ship style attacks).
    pub use_descent_profile: bool,
    /// Descent ratio: horizontal distance flown per unit altitude lost.
    pub descent_ratio: f64,
}

impl Default for WeaveConfig {
    fn default() -> Self {
        Self {
            g_vertical: 0.0,
            g_horizontal: 6.0,
            amplitude_jitter: [0.0, 0.0],
            frequency: 0.2,
            terminal_angle_deg: 0.0,
            weave_factor: 1.0,
            use_descent_profile: false,
            descent_ratio: 1.45,
        }
    }
}

/// Linearized aero terms feeding the kappa gain computation.
///
/// Fitted to the default lift/drag coefficient curves; refit when a host
/// supplies different curves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KappaAeroTerms {
    /// Lift-curve slope (per radian) about trim.
    pub lift_slope: f64,
    /// Zero-AoA drag coefficient.
    pub zero_aoa_drag: f64,
    /// Induced-drag factor η.
    pub induced_drag_factor: f64,
}

impl Default for KappaAeroTerms {
    fn default() -> Self {
        Self {
            lift_slope: 2.864_788_975_654_117,
            zero_aoa_drag: 0.002_15,
            induced_drag_factor: 0.025,
        }
    }
}

/// Tuning for kappa midcourse guidance and its loft pitch program.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KappaConfig {
    /// Desired dive angle (degrees) shaping the final velocity direction.
    /// Zero disables trajectory shaping.
    pub shaping_angle_deg: f64,
    /// Loft climb angle (degrees).
    pub loft_angle_deg: f64,
    /// Dive angle (degrees) at which the loft climb terminates.
    pub termination_angle_deg: f64,
    /// Range (m) below which the loft climb is abandoned. Zero-or-negative
    /// disables lofting entirely.
    pub midcourse_range: f64,
    /// Range (m) below which guidance collapses to the terminal gains.
    pub terminal_homing_range: f64,
    /// Base cruise altitude (m) of the loft profile.
    pub target_altitude: f64,
    /// Ceiling (m) of the loft profile.
    pub max_altitude: f64,
    /// Scales how fast the commanded altitude grows with down-range distance.
    pub range_factor: f64,
    /// Exponent shaping the range term of the altitude profile.
    pub vert_vel_comp: f64,
    pub aero: KappaAeroTerms,
}

impl Default for KappaConfig {
    fn default() -> Self {
        Self {
            shaping_angle_deg: 0.0,
            loft_angle_deg: 20.0,
            termination_angle_deg: 20.0,
            midcourse_range: 10_000.0,
            terminal_homing_range: 3_000.0,
            target_altitude: 500.0,
            max_altitude: 16_000.0,
            range_factor: 0.5,
            vert_vel_comp: 1.0,
            aero: KappaAeroTerms::default(),
        }
    }
}

/// Tuning for the air-to-air loft blender.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoftConfig {
    /// Altitude (m) above the target the loft climbs toward.
    pub target_altitude: f64,
    /// Ceiling (m) of the loft profile.
    pub max_altitude: f64,
    /// Scales commanded altitude with down-range distance.
    pub range_factor: f64,
    /// Along-track target-velocity compensation gain.
    pub vel_comp: f64,
    /// Vertical target-velocity compensation gain.
    pub vert_vel_comp: f64,
    /// Loft climb angle (degrees).
    pub loft_angle_deg: f64,
    /// Ballistic-path elevation (degrees) below which the climb ends.
    pub termination_angle_deg: f64,
    /// Range (m) at which terminal homing fully takes over.
    pub terminal_distance: f64,
    /// Sustained-maneuver g limit used for turn-radius estimates and as the
    /// g demand while climbing.
    pub maneuver_g_limit: f64,
    /// Airspeed (m/s) the airframe is expected to sustain in cruise.
    pub optimum_airspeed: f64,
}

impl Default for LoftConfig {
    fn default() -> Self {
        Self {
            target_altitude: 10_000.0,
            max_altitude: 25_000.0,
            range_factor: 0.5,
            vel_comp: 1.0,
            vert_vel_comp: 1.0,
            loft_angle_deg: 45.0,
            termination_angle_deg: 20.0,
            terminal_distance: 10_000.0,
            maneuver_g_limit: 25.0,
            optimum_airspeed: 800.0,
        }
    }
}
