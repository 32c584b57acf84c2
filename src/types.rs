//! Core flight types: FlightMode, SwitchPosition, TaskSet, YawReading.

use core::ops::{BitAnd, BitOr, BitOrAssign, Not};

/// Discrete flight behavior currently active.
///
/// Stored in the mode cell as its `u8` discriminant. Only the supervisor
/// writes it, and only along the edges accepted by [`FlightMode::can_transition_to`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum FlightMode {
    /// Landed, rotors at minimum drive.
    Idle = 0,
    /// Acquiring the yaw reference, then climbing to the hover point.
    TakeOff = 1,
    /// Full pilot control.
    Flying = 2,
    /// Descending along the landing ramp.
    Landing = 3,
}

impl FlightMode {
    /// Whether the supervisor may move from `self` to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: FlightMode) -> bool {
        matches!(
            (self, next),
            (FlightMode::Idle, FlightMode::TakeOff)
                | (FlightMode::TakeOff, FlightMode::Flying)
                | (FlightMode::Flying, FlightMode::Landing)
                | (FlightMode::Landing, FlightMode::Idle)
        )
    }

    /// Short label used on the display.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            FlightMode::Idle => "Landed",
            FlightMode::TakeOff => "Take Off",
            FlightMode::Flying => "Flying",
            FlightMode::Landing => "Landing",
        }
    }
}

/// A mode byte that does not name any [`FlightMode`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnknownMode(pub u8);

impl TryFrom<u8> for FlightMode {
    type Error = UnknownMode;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(FlightMode::Idle),
            1 => Ok(FlightMode::TakeOff),
            2 => Ok(FlightMode::Flying),
            3 => Ok(FlightMode::Landing),
            other => Err(UnknownMode(other)),
        }
    }
}

/// Position of the pilot's mode switch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SwitchPosition {
    Down,
    Up,
}

/// Set of gated collaborator tasks, as a bitfield.
///
/// The supervisor publishes which of these may produce effects; each task
/// checks its own bit at the top of every period.
///
/// # Example
///
/// ```
/// use heli_supervisor::TaskSet;
///
/// let set = TaskSet::MAIN_ROTOR | TaskSet::TAIL_ROTOR;
/// assert_eq!(set, TaskSet::CONTROL);
/// assert!(!set.contains(TaskSet::BUTTONS));
/// ```
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TaskSet(pub u8);

impl TaskSet {
    /// Main rotor (altitude) control loop.
    pub const MAIN_ROTOR: Self = Self(1 << 0);
    /// Tail rotor (yaw) control loop.
    pub const TAIL_ROTOR: Self = Self(1 << 1);
    /// Setpoint buttons.
    pub const BUTTONS: Self = Self(1 << 2);
    /// Mode switch.
    pub const SWITCHES: Self = Self(1 << 3);

    pub const NONE: Self = Self(0);
    pub const CONTROL: Self = Self(Self::MAIN_ROTOR.0 | Self::TAIL_ROTOR.0);
    pub const INPUTS: Self = Self(Self::BUTTONS.0 | Self::SWITCHES.0);
    pub const ALL: Self = Self(Self::CONTROL.0 | Self::INPUTS.0);

    /// Check if every task in `other` is in this set.
    #[inline]
    #[must_use]
    pub const fn contains(self, other: TaskSet) -> bool {
        (self.0 & other.0) == other.0
    }

    #[inline]
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for TaskSet {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for TaskSet {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for TaskSet {
    type Output = Self;

    #[inline]
    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}

impl Not for TaskSet {
    type Output = Self;

    #[inline]
    fn not(self) -> Self::Output {
        Self(!self.0 & Self::ALL.0)
    }
}

/// Encoder position: accumulated slot transitions and the derived angle.
///
/// The two fields always travel together through [`crate::cell::YawCell`],
/// so a reader never sees a slot count from one update paired with degrees
/// from another.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct YawReading {
    pub slots: i16,
    pub degrees: i16,
}

impl YawReading {
    pub const ZERO: Self = Self {
        slots: 0,
        degrees: 0,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_transitions() {
        use FlightMode::*;
        let modes = [Idle, TakeOff, Flying, Landing];
        let allowed = [
            (Idle, TakeOff),
            (TakeOff, Flying),
            (Flying, Landing),
            (Landing, Idle),
        ];
        for from in modes {
            for to in modes {
                assert_eq!(
                    from.can_transition_to(to),
                    allowed.contains(&(from, to)),
                    "{:?} -> {:?}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn test_mode_decode() {
        assert_eq!(FlightMode::try_from(2), Ok(FlightMode::Flying));
        assert_eq!(FlightMode::try_from(7), Err(UnknownMode(7)));
        assert_eq!(FlightMode::try_from(FlightMode::Landing as u8), Ok(FlightMode::Landing));
    }

    #[test]
    fn test_task_set_ops() {
        let set = TaskSet::CONTROL | TaskSet::SWITCHES;
        assert!(set.contains(TaskSet::MAIN_ROTOR));
        assert!(set.contains(TaskSet::SWITCHES));
        assert!(!set.contains(TaskSet::BUTTONS));
        assert_eq!(!TaskSet::CONTROL, TaskSet::INPUTS);
        assert_eq!(set & TaskSet::INPUTS, TaskSet::SWITCHES);
        assert!(TaskSet::NONE.is_empty());
    }
}
