//! Yaw reference acquisition.
//!
//! The rig has no absolute heading sensor, only one index pulse per
//! revolution. Acquisition spins the main rotor open-loop so the body yaws
//! past the index; the edge handler zeroes the decoder and raises
//! `reference_found`; the next supervisor period consumes the flag.

use crate::config::SupervisorConfig;
use crate::shared::SharedState;
use crate::types::TaskSet;

/// Reference edge handler. Interrupt context: bounded, lock-free.
///
/// Only acts while acquisition is armed, so the flag rises at most once per
/// attempt and edges seen in flight leave the yaw alone. Returns whether the
/// edge was accepted.
pub fn on_reference_edge(shared: &SharedState) -> bool {
    if !shared.reference_armed.take() {
        return false;
    }
    // Zero first: a reader that sees the flag (acquire) also sees the reset.
    shared.yaw.reset();
    shared.reference_found.set();
    true
}

/// Error type for acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AcquireError {
    /// The configured timeout elapsed without a reference edge.
    TimedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AcquirePhase {
    /// No reference yet and not spinning.
    Unreferenced,
    /// Spinning open-loop for this many supervisor periods.
    Spinning { ticks: u32 },
    /// Reference found and consumed; yaw is zeroed to the index.
    Homed,
    /// Timed out; parked until [`Acquisition::rehome`].
    GaveUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AcquireStatus {
    /// Still waiting for the edge.
    Spinning,
    /// The edge was consumed during this call.
    Found,
    /// Already homed on an earlier call.
    Homed,
}

impl AcquireStatus {
    #[inline]
    #[must_use]
    pub const fn is_homed(self) -> bool {
        matches!(self, AcquireStatus::Found | AcquireStatus::Homed)
    }
}

/// Acquisition state owned by the supervisor.
#[derive(Debug)]
pub struct Acquisition {
    phase: AcquirePhase,
    timeout_ticks: Option<u32>,
}

impl Acquisition {
    #[must_use]
    pub const fn new(timeout_ticks: Option<u32>) -> Self {
        Self {
            phase: AcquirePhase::Unreferenced,
            timeout_ticks,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> AcquirePhase {
        self.phase
    }

    #[must_use]
    pub const fn is_homed(&self) -> bool {
        matches!(self.phase, AcquirePhase::Homed)
    }

    /// Run one supervisor period of acquisition.
    pub fn poll(
        &mut self,
        shared: &SharedState,
        config: &SupervisorConfig,
    ) -> Result<AcquireStatus, AcquireError> {
        match self.phase {
            AcquirePhase::Homed => return Ok(AcquireStatus::Homed),
            AcquirePhase::GaveUp => return Err(AcquireError::TimedOut),
            AcquirePhase::Unreferenced | AcquirePhase::Spinning { .. } => {}
        }

        if shared.reference_found.take() {
            shared.reference_armed.clear();
            shared.gates.enable(TaskSet::ALL);
            shared.yaw_setpoint.overwrite(0);
            self.phase = AcquirePhase::Homed;
            info!("yaw reference found");
            return Ok(AcquireStatus::Found);
        }

        let ticks = match self.phase {
            AcquirePhase::Spinning { ticks } => ticks.saturating_add(1),
            _ => {
                info!("finding yaw reference");
                1
            }
        };

        if let Some(limit) = self.timeout_ticks {
            if ticks > limit {
                shared.reference_armed.clear();
                shared.main_duty.overwrite(config.min_duty);
                self.phase = AcquirePhase::GaveUp;
                warn!("yaw reference not found after {} periods", limit);
                return Err(AcquireError::TimedOut);
            }
        }

        shared.gates.disable(TaskSet::ALL);
        shared.reference_armed.set();
        shared.main_duty.overwrite(config.spin_duty);
        self.phase = AcquirePhase::Spinning { ticks };
        Ok(AcquireStatus::Spinning)
    }

    /// Forget the current reference so the next poll spins for a fresh edge.
    ///
    /// If an edge was already latched, it is consumed here together with a
    /// second zeroing of the yaw, so a stale flag cannot skip the spin.
    pub fn rehome(&mut self, shared: &SharedState) {
        if shared.reference_found.take() {
            shared.yaw.reset();
        }
        shared.reference_armed.clear();
        self.phase = AcquirePhase::Unreferenced;
        debug!("yaw reference cleared");
    }
}

impl Default for Acquisition {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_CONFIG;
    use crate::types::YawReading;

    #[test]
    fn test_edge_ignored_while_disarmed() {
        let shared = SharedState::new();
        shared.yaw.store(YawReading {
            slots: 40,
            degrees: 32,
        });
        assert!(!on_reference_edge(&shared));
        assert!(!shared.reference_found.is_set());
        assert_eq!(shared.yaw.read().slots, 40);
    }

    #[test]
    fn test_edge_zeroes_yaw_and_sets_flag_once() {
        let shared = SharedState::new();
        shared.reference_armed.set();
        shared.yaw.store(YawReading {
            slots: -17,
            degrees: -14,
        });
        assert!(on_reference_edge(&shared));
        assert!(shared.reference_found.is_set());
        assert_eq!(shared.yaw.read(), YawReading::ZERO);

        // A second index pulse in the same attempt is ignored.
        shared.yaw.store(YawReading { slots: 5, degrees: 4 });
        assert!(!on_reference_edge(&shared));
        assert_eq!(shared.yaw.read().slots, 5);
    }

    #[test]
    fn test_spin_disables_tasks_and_drives_main_rotor() {
        let shared = SharedState::new();
        shared.gates.enable(TaskSet::ALL);
        let mut acq = Acquisition::new(None);

        assert_eq!(acq.poll(&shared, &DEFAULT_CONFIG), Ok(AcquireStatus::Spinning));
        assert_eq!(shared.gates.enabled(), TaskSet::NONE);
        assert_eq!(shared.main_duty.peek(), Some(50));
        assert!(shared.reference_armed.is_set());
        assert_eq!(acq.phase(), AcquirePhase::Spinning { ticks: 1 });
    }

    #[test]
    fn test_found_reenables_tasks_and_consumes_flag() {
        let shared = SharedState::new();
        let mut acq = Acquisition::new(None);
        acq.poll(&shared, &DEFAULT_CONFIG).unwrap();

        on_reference_edge(&shared);
        assert_eq!(acq.poll(&shared, &DEFAULT_CONFIG), Ok(AcquireStatus::Found));
        assert!(!shared.reference_found.is_set());
        assert_eq!(shared.gates.enabled(), TaskSet::ALL);
        assert_eq!(shared.yaw_setpoint.peek(), Some(0));
        assert_eq!(acq.poll(&shared, &DEFAULT_CONFIG), Ok(AcquireStatus::Homed));
    }

    #[test]
    fn test_unbounded_by_default() {
        let shared = SharedState::new();
        let mut acq = Acquisition::default();
        for _ in 0..10_000 {
            assert_eq!(acq.poll(&shared, &DEFAULT_CONFIG), Ok(AcquireStatus::Spinning));
        }
    }

    #[test]
    fn test_timeout_parks_rotor() {
        let shared = SharedState::new();
        let mut acq = Acquisition::new(Some(3));
        for _ in 0..3 {
            assert_eq!(acq.poll(&shared, &DEFAULT_CONFIG), Ok(AcquireStatus::Spinning));
        }
        assert_eq!(acq.poll(&shared, &DEFAULT_CONFIG), Err(AcquireError::TimedOut));
        assert_eq!(acq.phase(), AcquirePhase::GaveUp);
        assert_eq!(shared.main_duty.peek(), Some(DEFAULT_CONFIG.min_duty));
        assert!(!on_reference_edge(&shared));

        acq.rehome(&shared);
        assert_eq!(acq.poll(&shared, &DEFAULT_CONFIG), Ok(AcquireStatus::Spinning));
    }

    #[test]
    fn test_rehome_consumes_latched_flag() {
        let shared = SharedState::new();
        let mut acq = Acquisition::new(None);
        shared.reference_found.set();
        shared.yaw.store(YawReading { slots: 9, degrees: 7 });

        acq.rehome(&shared);
        assert!(!shared.reference_found.is_set());
        assert_eq!(shared.yaw.read(), YawReading::ZERO);
        assert_eq!(acq.poll(&shared, &DEFAULT_CONFIG), Ok(AcquireStatus::Spinning));
    }
}
