//! Rotor PWM output.
//!
//! Both rotors share PWM slice 0: main rotor on channel A, tail rotor on
//! channel B, 200 Hz.

use defmt::Format;
use embassy_rp::pwm::{Config, Pwm};
use fixed::traits::ToFixed;
use heli_supervisor::SharedState;

/// PWM counter wrap: 125 MHz / 125 / 5000 = 200 Hz.
pub const PWM_TOP: u16 = 4999;

/// System clock divider for the PWM slice.
pub const PWM_DIVIDER: u8 = 125;

/// Duty pair for both rotors, percent.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Format)]
pub struct RotorDuty {
    pub main: u8,
    pub tail: u8,
}

impl RotorDuty {
    /// Read the duty cells. Never-written cells read as zero.
    #[must_use]
    pub fn from_shared(shared: &SharedState) -> Self {
        Self {
            main: shared.main_duty.peek_or(0),
            tail: shared.tail_duty.peek_or(0),
        }
    }

    /// Compare value for `percent` of the period, clamped to 100 %.
    #[must_use]
    pub const fn compare(percent: u8) -> u16 {
        let percent = if percent > 100 { 100 } else { percent };
        ((PWM_TOP as u32 + 1) * percent as u32 / 100) as u16
    }
}

/// Initial slice configuration with both outputs low.
#[must_use]
pub fn rotor_pwm_config() -> Config {
    let mut config = Config::default();
    config.top = PWM_TOP;
    config.divider = PWM_DIVIDER.to_fixed();
    config.compare_a = 0;
    config.compare_b = 0;
    config
}

/// Owns the rotor PWM slice and applies duty changes.
pub struct RotorOutput<'d> {
    pwm: Pwm<'d>,
    config: Config,
    applied: Option<RotorDuty>,
}

impl<'d> RotorOutput<'d> {
    pub fn new(pwm: Pwm<'d>, config: Config) -> Self {
        Self {
            pwm,
            config,
            applied: None,
        }
    }

    /// Write `duty` to the slice if it differs from what is already applied.
    pub fn apply(&mut self, duty: RotorDuty) {
        if self.applied == Some(duty) {
            return;
        }
        self.config.compare_a = RotorDuty::compare(duty.main);
        self.config.compare_b = RotorDuty::compare(duty.tail);
        self.pwm.set_config(&self.config);
        self.applied = Some(duty);
        defmt::trace!("rotor duty {}", duty);
    }

    #[must_use]
    pub fn applied(&self) -> Option<RotorDuty> {
        self.applied
    }
}
