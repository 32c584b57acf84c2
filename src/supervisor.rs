//! Flight phase supervisor.
//!
//! One [`FlightSupervisor::step`] per supervisor period: read the mode, run
//! that phase's behavior, publish gates and setpoints, and move to the next
//! mode when the phase's exit condition holds. The mode cell is re-read on
//! every step and never cached.

use crate::config::SupervisorConfig;
use crate::landing::{LandingRamp, LandingTimer, RampStatus};
use crate::sensor::reference::{AcquireError, Acquisition};
use crate::shared::SharedState;
use crate::types::{FlightMode, SwitchPosition, TaskSet, UnknownMode};

/// A mode change performed by one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transition {
    pub from: FlightMode,
    pub to: FlightMode,
}

/// Error type for supervisor steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SupervisorError {
    /// The mode cell held a byte that is not a flight mode. Nothing was changed.
    UnknownMode(UnknownMode),
    /// A phase asked for a mode change the state machine does not allow.
    IllegalTransition { from: FlightMode, to: FlightMode },
}

impl From<UnknownMode> for SupervisorError {
    fn from(e: UnknownMode) -> Self {
        SupervisorError::UnknownMode(e)
    }
}

/// The flight mode state machine.
///
/// Owns the acquisition and landing ramp state; everything else lives in
/// [`SharedState`].
pub struct FlightSupervisor<T> {
    config: SupervisorConfig,
    timer: T,
    acquisition: Acquisition,
    ramp: LandingRamp,
    last_switch: Option<SwitchPosition>,
}

impl<T: LandingTimer> FlightSupervisor<T> {
    pub fn new(config: SupervisorConfig, timer: T) -> Self {
        Self {
            acquisition: Acquisition::new(config.acquire_timeout_ticks),
            ramp: LandingRamp::new(),
            last_switch: None,
            config,
            timer,
        }
    }

    /// Run one supervisor period.
    ///
    /// Returns the transition taken, if any. An unknown mode byte is logged
    /// and reported; the caller keeps calling `step` on its period.
    pub fn step(&mut self, shared: &SharedState) -> Result<Option<Transition>, SupervisorError> {
        let mode = match shared.mode.read() {
            Ok(mode) => mode,
            Err(e) => {
                error!("FSM fault: unknown mode {}", e.0);
                return Err(e.into());
            }
        };

        let edge = self.switch_edge(shared);

        let next = match mode {
            FlightMode::Idle => self.idle(shared, edge),
            FlightMode::TakeOff => self.take_off(shared, edge),
            FlightMode::Flying => self.flying(shared, edge),
            FlightMode::Landing => self.landing(shared),
        };

        match next {
            Some(to) => self.transition(shared, mode, to).map(Some),
            None => Ok(None),
        }
    }

    fn idle(&mut self, shared: &SharedState, edge: Option<SwitchPosition>) -> Option<FlightMode> {
        shared.gates.disable(TaskSet::CONTROL | TaskSet::BUTTONS);
        shared.gates.enable(TaskSet::SWITCHES);
        shared.main_duty.overwrite(self.config.min_duty);
        shared.tail_duty.overwrite(self.config.min_duty);

        if edge != Some(SwitchPosition::Up) {
            return None;
        }
        if self.config.rehome_on_takeoff {
            self.acquisition.rehome(shared);
        }
        Some(FlightMode::TakeOff)
    }

    fn take_off(&mut self, shared: &SharedState, edge: Option<SwitchPosition>) -> Option<FlightMode> {
        match self.acquisition.poll(shared, &self.config) {
            Ok(status) if status.is_homed() => {}
            Ok(_) => return None,
            Err(AcquireError::TimedOut) => {
                // Parked: only the switch is live. Flipping it down retries.
                shared.gates.enable(TaskSet::SWITCHES);
                if edge == Some(SwitchPosition::Down) {
                    info!("retrying yaw reference");
                    self.acquisition.rehome(shared);
                }
                return None;
            }
        }

        let target = self.config.takeoff_altitude;
        shared.altitude_setpoint.overwrite(target);
        shared.yaw_setpoint.overwrite(0);
        shared.gates.disable(TaskSet::INPUTS);
        shared.gates.enable(TaskSet::CONTROL);

        let yaw = shared.yaw.degrees();
        let on_heading = yaw.unsigned_abs() <= self.config.yaw_tolerance.unsigned_abs();
        let at_height = shared.altitude.peek().is_some_and(|alt| {
            (alt as i32 - target as i32).unsigned_abs()
                <= self.config.altitude_tolerance.unsigned_abs() as u32
        });

        (on_heading && at_height).then_some(FlightMode::Flying)
    }

    fn flying(&mut self, shared: &SharedState, edge: Option<SwitchPosition>) -> Option<FlightMode> {
        shared.gates.enable(TaskSet::ALL);
        if edge == Some(SwitchPosition::Down) {
            self.ramp.reset();
            return Some(FlightMode::Landing);
        }
        None
    }

    fn landing(&mut self, shared: &SharedState) -> Option<FlightMode> {
        shared.gates.disable(TaskSet::INPUTS);
        shared.gates.enable(TaskSet::CONTROL);
        shared.yaw_setpoint.overwrite(0);

        match self.ramp.step(shared, &self.timer, &self.config) {
            RampStatus::Touchdown => Some(FlightMode::Idle),
            RampStatus::Descending(_) => None,
        }
    }

    /// Latest switch position compared with the one seen last step. The
    /// first position seen only sets the baseline.
    fn switch_edge(&mut self, shared: &SharedState) -> Option<SwitchPosition> {
        let current = shared.switch.peek()?;
        let previous = self.last_switch.replace(current)?;
        (previous != current).then_some(current)
    }

    fn transition(
        &mut self,
        shared: &SharedState,
        from: FlightMode,
        to: FlightMode,
    ) -> Result<Transition, SupervisorError> {
        if !from.can_transition_to(to) {
            error!("illegal transition {} -> {}", from, to);
            return Err(SupervisorError::IllegalTransition { from, to });
        }
        shared.mode.publish(to);
        info!("mode {} -> {}", from, to);
        Ok(Transition { from, to })
    }

    pub fn config(&self) -> &SupervisorConfig {
        &self.config
    }

    pub fn acquisition(&self) -> &Acquisition {
        &self.acquisition
    }

    pub fn ramp(&self) -> &LandingRamp {
        &self.ramp
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }
}
