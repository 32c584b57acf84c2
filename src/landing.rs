//! Landing descent ramp.
//!
//! The supervisor calls [`LandingRamp::step`] every period while landing, but
//! the ramp only moves once per landing timer period. A tick id from the
//! timer tells the two rates apart: the ramp remembers the id it last saw
//! and only steps when it changes.

use portable_atomic::{AtomicBool, AtomicU32, Ordering};

use crate::config::SupervisorConfig;
use crate::shared::SharedState;

/// Periodic timer driving the ramp.
///
/// `tick_id` is zero while stopped and changes once per elapsed period
/// while running.
pub trait LandingTimer {
    fn start(&self);
    fn stop(&self);
    fn tick_id(&self) -> u32;
}

impl<T: LandingTimer + ?Sized> LandingTimer for &T {
    fn start(&self) {
        (**self).start()
    }

    fn stop(&self) {
        (**self).stop()
    }

    fn tick_id(&self) -> u32 {
        (**self).tick_id()
    }
}

/// Timer state shared with a task that calls [`PeriodicTimer::tick`] once
/// per period. Lives in a `static`.
pub struct PeriodicTimer {
    running: AtomicBool,
    id: AtomicU32,
}

impl PeriodicTimer {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            running: AtomicBool::new(false),
            id: AtomicU32::new(0),
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Advance the tick id if running. Never yields zero while running.
    pub fn tick(&self) {
        if !self.is_running() {
            return;
        }
        let _ = self
            .id
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |id| {
                Some(id.wrapping_add(1).max(1))
            });
    }
}

impl Default for PeriodicTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl LandingTimer for PeriodicTimer {
    fn start(&self) {
        self.id.store(1, Ordering::Release);
        self.running.store(true, Ordering::Release);
    }

    fn stop(&self) {
        self.running.store(false, Ordering::Release);
        self.id.store(0, Ordering::Release);
    }

    fn tick_id(&self) -> u32 {
        self.id.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RampStatus {
    /// Still descending toward this target.
    Descending(i16),
    /// Touchdown criteria met; the timer has been stopped.
    Touchdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum RampPhase {
    Armed,
    Descending,
}

/// Ramp state: current target and the last tick id observed.
#[derive(Debug)]
pub struct LandingRamp {
    phase: RampPhase,
    target: i16,
    prev_tick: u32,
}

impl LandingRamp {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: RampPhase::Armed,
            target: 0,
            prev_tick: 0,
        }
    }

    #[must_use]
    pub const fn target(&self) -> i16 {
        self.target
    }

    #[must_use]
    pub const fn is_armed(&self) -> bool {
        matches!(self.phase, RampPhase::Armed)
    }

    /// Return to `Armed`; the next step recaptures the start altitude.
    pub fn reset(&mut self) {
        self.phase = RampPhase::Armed;
        self.prev_tick = 0;
    }

    /// Run one landing invocation.
    pub fn step<T: LandingTimer>(
        &mut self,
        shared: &SharedState,
        timer: &T,
        config: &SupervisorConfig,
    ) -> RampStatus {
        let measured = shared.altitude.peek_or(0);
        let yaw = shared.yaw.degrees();

        match self.phase {
            RampPhase::Armed => {
                self.target = measured;
                timer.start();
                self.phase = RampPhase::Descending;
                info!("landing from {}%", measured);
            }
            RampPhase::Descending => {
                let tick = timer.tick_id();
                if tick != self.prev_tick && measured <= self.target {
                    self.target = self.target.saturating_sub(config.landing_step).max(0);
                    debug!("landing target {}%", self.target);
                }
            }
        }
        self.prev_tick = timer.tick_id();

        let limits = config.touchdown;
        let touchdown = self.target < limits.target_below
            && measured <= limits.max_altitude
            && yaw.unsigned_abs() <= limits.max_yaw.unsigned_abs();

        shared.altitude_setpoint.overwrite(self.target);

        if touchdown {
            timer.stop();
            self.reset();
            info!("touchdown");
            return RampStatus::Touchdown;
        }
        RampStatus::Descending(self.target)
    }
}

impl Default for LandingRamp {
    fn default() -> Self {
        Self::new()
    }
}
