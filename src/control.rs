//! Rotor control loops behind their task gates.
//!
//! The control law itself lives behind [`RotorControl`]. [`ControlLoop`]
//! owns one law and one duty cell and only writes that cell while the
//! supervisor has its gate enabled, so open-loop writers (acquisition spin,
//! Idle minimum duty) are never overwritten.

use crate::pilot::wrap_degrees;
use crate::shared::SharedState;
use crate::types::TaskSet;

/// A rotor control law: error in, duty percent out.
pub trait RotorControl {
    /// Compute the next duty from a setpoint and a measurement.
    fn update(&mut self, setpoint: i16, measurement: i16) -> u8;

    /// Drop any accumulated state. Called when the loop's gate closes.
    fn reset(&mut self) {}
}

impl<C: RotorControl + ?Sized> RotorControl for &mut C {
    fn update(&mut self, setpoint: i16, measurement: i16) -> u8 {
        (**self).update(setpoint, measurement)
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

/// Proportional law with a hover bias, clamped to a duty window.
///
/// Placeholder until the tuned PID gains are ported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Proportional {
    /// Duty at zero error.
    pub bias: u8,
    /// Gain in duty percent per 100 units of error.
    pub gain: i16,
    pub min: u8,
    pub max: u8,
    /// Treat the error as an angle and wrap it into `[-180, 179]`.
    pub wrap: bool,
}

impl Proportional {
    /// Main rotor: altitude percent in, hover around 40 % duty.
    pub const MAIN: Self = Self {
        bias: 40,
        gain: 100,
        min: 2,
        max: 80,
        wrap: false,
    };

    /// Tail rotor: yaw degrees in, shortest way round.
    pub const TAIL: Self = Self {
        bias: 30,
        gain: 50,
        min: 2,
        max: 70,
        wrap: true,
    };
}

impl RotorControl for Proportional {
    fn update(&mut self, setpoint: i16, measurement: i16) -> u8 {
        let mut error = setpoint as i32 - measurement as i32;
        if self.wrap {
            error = wrap_degrees(error.clamp(i16::MIN as i32, i16::MAX as i32) as i16) as i32;
        }
        let duty = self.bias as i32 + error * self.gain as i32 / 100;
        duty.clamp(self.min as i32, self.max as i32) as u8
    }
}

/// Which rotor a [`ControlLoop`] drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rotor {
    /// Altitude setpoint and measurement, `main_duty` output.
    Main,
    /// Yaw setpoint and measurement, `tail_duty` output.
    Tail,
}

impl Rotor {
    #[must_use]
    pub const fn gate(self) -> TaskSet {
        match self {
            Rotor::Main => TaskSet::MAIN_ROTOR,
            Rotor::Tail => TaskSet::TAIL_ROTOR,
        }
    }
}

/// One gated control loop.
pub struct ControlLoop<C> {
    rotor: Rotor,
    law: C,
    active: bool,
}

impl<C: RotorControl> ControlLoop<C> {
    pub const fn new(rotor: Rotor, law: C) -> Self {
        Self {
            rotor,
            law,
            active: false,
        }
    }

    /// Run one control period.
    ///
    /// Returns the duty written, or `None` when the gate is closed or the
    /// setpoint or measurement has not been published yet.
    pub fn run(&mut self, shared: &SharedState) -> Option<u8> {
        if !shared.gates.is_enabled(self.rotor.gate()) {
            if self.active {
                self.law.reset();
                self.active = false;
                trace!("{} loop gated off", self.rotor);
            }
            return None;
        }
        self.active = true;

        let (setpoint, measurement, duty_cell) = match self.rotor {
            Rotor::Main => (
                shared.altitude_setpoint.peek()?,
                shared.altitude.peek()?,
                &shared.main_duty,
            ),
            Rotor::Tail => (
                shared.yaw_setpoint.peek()?,
                shared.yaw.degrees(),
                &shared.tail_duty,
            ),
        };

        let duty = self.law.update(setpoint, measurement);
        duty_cell.overwrite(duty);
        Some(duty)
    }

    #[must_use]
    pub fn rotor(&self) -> Rotor {
        self.rotor
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::YawReading;

    struct Fixed {
        duty: u8,
        resets: u32,
    }

    impl RotorControl for Fixed {
        fn update(&mut self, _setpoint: i16, _measurement: i16) -> u8 {
            self.duty
        }

        fn reset(&mut self) {
            self.resets += 1;
        }
    }

    #[test]
    fn test_closed_gate_leaves_duty_alone() {
        let shared = SharedState::new();
        shared.altitude_setpoint.overwrite(20);
        shared.altitude.overwrite(10);
        shared.main_duty.overwrite(50);
        let mut main = ControlLoop::new(Rotor::Main, Proportional::MAIN);

        assert_eq!(main.run(&shared), None);
        assert_eq!(shared.main_duty.peek(), Some(50));

        shared.gates.enable(TaskSet::MAIN_ROTOR);
        assert_eq!(main.run(&shared), Some(50));
        assert_eq!(shared.main_duty.peek(), Some(50));
        shared.altitude.overwrite(20);
        assert_eq!(main.run(&shared), Some(40));

        shared.gates.disable(TaskSet::CONTROL);
        shared.main_duty.overwrite(2);
        assert_eq!(main.run(&shared), None);
        assert_eq!(shared.main_duty.peek(), Some(2));
    }

    #[test]
    fn test_gates_are_per_rotor() {
        let shared = SharedState::new();
        shared.altitude_setpoint.overwrite(20);
        shared.altitude.overwrite(20);
        shared.yaw_setpoint.overwrite(0);
        shared.gates.enable(TaskSet::TAIL_ROTOR);
        let mut main = ControlLoop::new(Rotor::Main, Proportional::MAIN);
        let mut tail = ControlLoop::new(Rotor::Tail, Proportional::TAIL);

        assert_eq!(main.run(&shared), None);
        assert_eq!(tail.run(&shared), Some(30));
        assert_eq!(shared.main_duty.peek(), None);
        assert_eq!(shared.tail_duty.peek(), Some(30));
    }

    #[test]
    fn test_missing_measurement_skips_write() {
        let shared = SharedState::new();
        shared.gates.enable(TaskSet::CONTROL);
        shared.altitude_setpoint.overwrite(20);
        let mut main = ControlLoop::new(Rotor::Main, Proportional::MAIN);
        assert_eq!(main.run(&shared), None);
        assert_eq!(shared.main_duty.peek(), None);
    }

    #[test]
    fn test_gate_close_resets_law() {
        let shared = SharedState::new();
        shared.yaw_setpoint.overwrite(0);
        let mut law = Fixed { duty: 33, resets: 0 };
        {
            let mut tail = ControlLoop::new(Rotor::Tail, &mut law);
            tail.run(&shared);
            shared.gates.enable(TaskSet::TAIL_ROTOR);
            assert_eq!(tail.run(&shared), Some(33));
            assert!(tail.is_active());
            shared.gates.disable(TaskSet::TAIL_ROTOR);
            tail.run(&shared);
            tail.run(&shared);
            assert!(!tail.is_active());
        }
        assert_eq!(law.resets, 1);
    }

    #[test]
    fn test_tail_error_takes_shortest_way() {
        let mut tail = Proportional::TAIL;
        // 170 -> -170 is 20 degrees clockwise, not 340 back.
        assert_eq!(tail.update(-170, 170), 40);
        assert_eq!(tail.update(170, -170), 20);
        assert_eq!(tail.update(0, 0), 30);

        let shared = SharedState::new();
        shared.gates.enable(TaskSet::TAIL_ROTOR);
        shared.yaw_setpoint.overwrite(-170);
        shared.yaw.store(YawReading { slots: 212, degrees: 170 });
        let mut tail = ControlLoop::new(Rotor::Tail, Proportional::TAIL);
        assert_eq!(tail.run(&shared), Some(40));
    }

    #[test]
    fn test_main_duty_is_clamped() {
        let mut main = Proportional::MAIN;
        assert_eq!(main.update(100, 0), 80);
        assert_eq!(main.update(0, 100), 2);
    }
}
