//! The shared state every component reads and writes.

use crate::cell::{Counter, Flag, Gates, Latest, ModeCell, YawCell};
use crate::types::{FlightMode, SwitchPosition};

/// All cross-component cells, in one place.
///
/// Each cell has exactly one writer role:
///
/// | Cell | Writer |
/// |---|---|
/// | `mode`, `gates`, `yaw_setpoint` | supervisor (pilot commands while gated in) |
/// | `altitude_setpoint` | supervisor, landing ramp while landing, pilot commands |
/// | `yaw`, `encoder_faults` | quadrature decoder, reference edge reset |
/// | `reference_found` | reference edge handler (set), acquisition (clear) |
/// | `reference_armed` | acquisition (set), reference edge handler (clear) |
/// | `altitude` | altitude sampling task |
/// | `main_duty`, `tail_duty` | supervisor/acquisition open loop, control loops otherwise |
/// | `switch` | switch polling task |
///
/// No ordering is implied between different cells.
pub struct SharedState {
    pub mode: ModeCell,
    pub reference_found: Flag,
    pub reference_armed: Flag,
    pub yaw: YawCell,
    pub yaw_setpoint: Latest<i16>,
    pub altitude_setpoint: Latest<i16>,
    pub altitude: Latest<i16>,
    pub main_duty: Latest<u8>,
    pub tail_duty: Latest<u8>,
    pub switch: Latest<SwitchPosition>,
    pub gates: Gates,
    pub encoder_faults: Counter,
}

impl SharedState {
    /// Power-on state: Idle, nothing measured, every task gated off.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mode: ModeCell::new(FlightMode::Idle),
            reference_found: Flag::new(),
            reference_armed: Flag::new(),
            yaw: YawCell::new(),
            yaw_setpoint: Latest::new(),
            altitude_setpoint: Latest::new(),
            altitude: Latest::new(),
            main_duty: Latest::new(),
            tail_duty: Latest::new(),
            switch: Latest::new(),
            gates: Gates::new(),
            encoder_faults: Counter::new(),
        }
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TaskSet, YawReading};

    #[test]
    fn test_power_on_state() {
        let shared = SharedState::new();
        assert_eq!(shared.mode.read(), Ok(FlightMode::Idle));
        assert!(!shared.reference_found.is_set());
        assert_eq!(shared.yaw.read(), YawReading::ZERO);
        assert_eq!(shared.altitude.peek(), None);
        assert_eq!(shared.altitude_setpoint.peek(), None);
        assert_eq!(shared.gates.enabled(), TaskSet::NONE);
        assert_eq!(shared.encoder_faults.get(), 0);
    }
}
