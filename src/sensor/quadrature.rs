//! Quadrature yaw decoder.
//!
//! Runs in interrupt context on either edge of either phase pin. Each call
//! combines the previous 2-bit phase reading with the new one into a 4-bit
//! transition code, steps the slot count, and republishes slot count and
//! degrees together in one store.

use crate::config::{SLOTS_PER_HALF_REV, SLOTS_PER_REV};
use crate::shared::SharedState;
use crate::types::YawReading;

/// Direction decoded from one transition code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Step {
    Forward,
    Backward,
    /// Same reading twice.
    Idle,
    /// Both phases flipped at once; an edge was missed.
    Skipped,
}

impl Step {
    #[inline]
    #[must_use]
    pub const fn delta(self) -> i16 {
        match self {
            Step::Forward => 1,
            Step::Backward => -1,
            Step::Idle | Step::Skipped => 0,
        }
    }
}

/// Decode a 4-bit `(previous << 2) | current` transition code.
#[must_use]
pub const fn decode(code: u8) -> Step {
    match code & 0b1111 {
        0b0001 | 0b0111 | 0b1110 | 0b1000 => Step::Forward,
        0b0010 | 0b0100 | 0b1101 | 0b1011 => Step::Backward,
        0b0011 | 0b0110 | 0b1001 | 0b1100 => Step::Skipped,
        _ => Step::Idle,
    }
}

/// Wrap a slot count into `[-SLOTS_PER_HALF_REV, SLOTS_PER_HALF_REV)`.
#[inline]
#[must_use]
pub const fn wrap_slots(slots: i16) -> i16 {
    let half = SLOTS_PER_HALF_REV as i32;
    ((slots as i32 + half).rem_euclid(SLOTS_PER_REV as i32) - half) as i16
}

/// Degrees for a wrapped slot count, rounded toward negative infinity.
///
/// Maps `[-224, 224)` onto `[-180, 179]`.
#[inline]
#[must_use]
pub const fn slots_to_degrees(slots: i16) -> i16 {
    (slots as i32 * 360).div_euclid(SLOTS_PER_REV as i32) as i16
}

/// Decoder state retained between interrupts.
#[derive(Debug, Default)]
pub struct QuadratureDecoder {
    previous: u8,
}

impl QuadratureDecoder {
    #[must_use]
    pub const fn new() -> Self {
        Self { previous: 0 }
    }

    /// Start from a known phase reading, e.g. the pin levels sampled at boot.
    #[must_use]
    pub const fn with_reading(reading: u8) -> Self {
        Self {
            previous: reading & 0b11,
        }
    }

    #[must_use]
    pub const fn previous(&self) -> u8 {
        self.previous
    }

    /// Handle one phase edge. `reading` is `(A << 1) | B`.
    pub fn on_edge(&mut self, reading: u8, shared: &SharedState) -> Step {
        let reading = reading & 0b11;
        let code = (self.previous << 2) | reading;
        self.previous = reading;
        Self::apply_code(code, shared)
    }

    /// Apply a transition code to the published yaw.
    pub fn apply_code(code: u8, shared: &SharedState) -> Step {
        let step = decode(code);
        match step {
            Step::Forward | Step::Backward => {
                let current = shared.yaw.read();
                let slots = wrap_slots(current.slots.wrapping_add(step.delta()));
                shared.yaw.store(YawReading {
                    slots,
                    degrees: slots_to_degrees(slots),
                });
            }
            Step::Skipped => shared.encoder_faults.increment(),
            Step::Idle => {}
        }
        step
    }
}

/// Split a two-pin reading into the `(A << 1) | B` form.
#[inline]
#[must_use]
pub const fn phase_reading(a_high: bool, b_high: bool) -> u8 {
    ((a_high as u8) << 1) | (b_high as u8)
}
