//! Compile-time tuning for the supervisor, acquisition and landing ramp.
//!
//! Altitudes and duties are percent of full scale, yaw is degrees.

/// Supervisor period in milliseconds.
pub const SUPERVISOR_PERIOD_MS: u64 = 200;

/// Landing ramp timer period in milliseconds. One ramp step per period at most.
pub const LANDING_TIMER_PERIOD_MS: u64 = 1000;

/// Button and switch polling period in milliseconds.
pub const INPUT_POLL_MS: u64 = 25;

/// Display refresh period in milliseconds.
pub const DISPLAY_PERIOD_MS: u64 = 200;

/// Encoder slot transitions per full revolution.
pub const SLOTS_PER_REV: i16 = 448;

/// Encoder slot transitions per half revolution.
pub const SLOTS_PER_HALF_REV: i16 = SLOTS_PER_REV / 2;

/// Touchdown criteria checked on every landing invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchdownLimits {
    /// Ramp target must be strictly below this.
    pub target_below: i16,
    /// Measured altitude must be at or below this.
    pub max_altitude: i16,
    /// Absolute measured yaw must be at or below this.
    pub max_yaw: i16,
}

/// Supervisor configuration.
///
/// Customize this at compile-time by creating your own const.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorConfig {
    /// Altitude setpoint published once the yaw reference is found.
    pub takeoff_altitude: i16,
    /// Largest |yaw| accepted as "on heading" for TakeOff -> Flying.
    pub yaw_tolerance: i16,
    /// Largest |altitude - takeoff_altitude| accepted for TakeOff -> Flying.
    pub altitude_tolerance: i16,
    /// Open-loop main rotor duty while spinning for the reference edge.
    pub spin_duty: u8,
    /// Minimum safe rotor duty.
    pub min_duty: u8,
    /// Altitude drop per landing ramp period.
    pub landing_step: i16,
    pub touchdown: TouchdownLimits,
    /// Give up acquisition after this many supervisor periods.
    /// `None` spins until the edge arrives.
    pub acquire_timeout_ticks: Option<u32>,
    /// Re-zero the yaw reference on every Idle -> TakeOff.
    pub rehome_on_takeoff: bool,
}

/// Default configuration: hover at 20 %, spin at 50 %, land in 15 % steps.
pub const DEFAULT_CONFIG: SupervisorConfig = SupervisorConfig {
    takeoff_altitude: 20,
    yaw_tolerance: 5,
    altitude_tolerance: 5,
    spin_duty: 50,
    min_duty: 2,
    landing_step: 15,
    touchdown: TouchdownLimits {
        target_below: 2,
        max_altitude: 1,
        max_yaw: 2,
    },
    acquire_timeout_ticks: None,
    rehome_on_takeoff: false,
};

impl Default for SupervisorConfig {
    fn default() -> Self {
        DEFAULT_CONFIG
    }
}
