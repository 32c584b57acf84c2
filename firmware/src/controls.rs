//! Pilot buttons and mode switch, polled and debounced.

use embedded_hal::digital::InputPin;
use heli_supervisor::{
    apply_pilot_command, publish_switch, Debouncer, PilotCommand, PilotError, SharedState,
    SwitchPosition,
};

/// One polled input and the level that means "pressed" (or switch up).
pub struct PolledInput<P> {
    pin: P,
    active_high: bool,
    debounce: Debouncer,
}

impl<P: InputPin> PolledInput<P> {
    pub fn new(pin: P, active_high: bool) -> Self {
        Self {
            pin,
            active_high,
            debounce: Debouncer::new(false),
        }
    }

    /// Sample the pin once. Returns the new debounced state when it changes.
    /// A read error counts as "released".
    pub fn poll(&mut self) -> Option<bool> {
        let active = match self.pin.is_high() {
            Ok(high) => high == self.active_high,
            Err(_) => false,
        };
        self.debounce.poll(active)
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.debounce.state()
    }
}

/// The four setpoint buttons and the mode switch.
pub struct Controls<P> {
    up: PolledInput<P>,
    down: PolledInput<P>,
    ccw: PolledInput<P>,
    cw: PolledInput<P>,
    switch: PolledInput<P>,
}

impl<P: InputPin> Controls<P> {
    pub fn new(
        up: PolledInput<P>,
        down: PolledInput<P>,
        ccw: PolledInput<P>,
        cw: PolledInput<P>,
        switch: PolledInput<P>,
    ) -> Self {
        Self {
            up,
            down,
            ccw,
            cw,
            switch,
        }
    }

    /// Poll every input once and forward presses and the switch position.
    pub fn poll(&mut self, shared: &SharedState) {
        let buttons = [
            (&mut self.up, PilotCommand::AltitudeUp),
            (&mut self.down, PilotCommand::AltitudeDown),
            (&mut self.ccw, PilotCommand::YawCcw),
            (&mut self.cw, PilotCommand::YawCw),
        ];
        for (input, command) in buttons {
            if input.poll() != Some(true) {
                continue;
            }
            match apply_pilot_command(shared, command) {
                Ok(()) => defmt::debug!("{}", command),
                Err(PilotError::Gated) => defmt::trace!("{} ignored: buttons gated", command),
            }
        }

        self.switch.poll();
        let position = if self.switch.is_active() {
            SwitchPosition::Up
        } else {
            SwitchPosition::Down
        };
        // Gated while taking off or landing; the supervisor only looks for
        // edges while idle or flying.
        let _ = publish_switch(shared, position);
    }
}
