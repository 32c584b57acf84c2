//! Pilot inputs: setpoint buttons and the mode switch.
//!
//! Both are gated by the supervisor. A command that arrives while its gate
//! is closed is dropped and reported as [`PilotError::Gated`].

use crate::shared::SharedState;
use crate::types::{SwitchPosition, TaskSet};

/// Altitude change per button press, percent.
pub const ALTITUDE_STEP: i16 = 10;

/// Yaw change per button press, degrees.
pub const YAW_STEP: i16 = 15;

/// Consecutive polls a raw level must hold before it is accepted.
pub const DEBOUNCE_POLLS: u8 = 3;

/// Setpoint adjustment requested by a button press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PilotCommand {
    AltitudeUp,
    AltitudeDown,
    /// Rotate anticlockwise.
    YawCcw,
    /// Rotate clockwise.
    YawCw,
}

/// Error type for pilot input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PilotError {
    /// The input's task gate is disabled.
    Gated,
}

/// Wrap degrees into `[-180, 179]`.
#[inline]
#[must_use]
pub const fn wrap_degrees(degrees: i16) -> i16 {
    ((degrees as i32 + 180).rem_euclid(360) - 180) as i16
}

/// Apply a button press to the setpoint cells.
///
/// Altitude is clamped to `[0, 100]`; yaw wraps within `[-180, 179]`.
pub fn apply_pilot_command(shared: &SharedState, command: PilotCommand) -> Result<(), PilotError> {
    if !shared.gates.is_enabled(TaskSet::BUTTONS) {
        return Err(PilotError::Gated);
    }

    match command {
        PilotCommand::AltitudeUp | PilotCommand::AltitudeDown => {
            let delta = if command == PilotCommand::AltitudeUp {
                ALTITUDE_STEP
            } else {
                -ALTITUDE_STEP
            };
            let current = shared.altitude_setpoint.peek_or(0);
            let target = current.saturating_add(delta).clamp(0, 100);
            shared.altitude_setpoint.overwrite(target);
            debug!("altitude setpoint {}", target);
        }
        PilotCommand::YawCcw | PilotCommand::YawCw => {
            let delta = if command == PilotCommand::YawCcw {
                YAW_STEP
            } else {
                -YAW_STEP
            };
            let current = shared.yaw_setpoint.peek_or(0);
            let target = wrap_degrees(current.saturating_add(delta));
            shared.yaw_setpoint.overwrite(target);
            debug!("yaw setpoint {}", target);
        }
    }
    Ok(())
}

/// Publish the mode switch position for the supervisor.
pub fn publish_switch(shared: &SharedState, position: SwitchPosition) -> Result<(), PilotError> {
    if !shared.gates.is_enabled(TaskSet::SWITCHES) {
        return Err(PilotError::Gated);
    }
    shared.switch.overwrite(position);
    Ok(())
}

/// Counter debouncer for one polled input.
///
/// A new level is accepted after [`DEBOUNCE_POLLS`] consecutive polls read
/// it; `poll` then reports the accepted level once.
#[derive(Debug, Clone, Copy)]
pub struct Debouncer {
    state: bool,
    count: u8,
}

impl Debouncer {
    #[must_use]
    pub const fn new(initial: bool) -> Self {
        Self {
            state: initial,
            count: 0,
        }
    }

    #[must_use]
    pub const fn state(&self) -> bool {
        self.state
    }

    /// Feed one raw reading. Returns the new level when it changes.
    pub fn poll(&mut self, raw: bool) -> Option<bool> {
        if raw == self.state {
            self.count = 0;
            return None;
        }
        self.count += 1;
        if self.count < DEBOUNCE_POLLS {
            return None;
        }
        self.state = raw;
        self.count = 0;
        Some(raw)
    }
}
