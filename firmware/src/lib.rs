//! RP2040 firmware for the tethered rotor rig.
//!
//! Wires the platform-agnostic supervisor core to embassy-rp peripherals:
//! PWM rotor output, polled pilot controls and the defmt status display.
//! Edge-driven yaw decoding and the task layout live in the binary.

#![no_std]

// Re-export core types for convenience
pub use heli_supervisor::{
    on_reference_edge, FlightMode, FlightSupervisor, PeriodicTimer, QuadratureDecoder,
    SharedState, SupervisorConfig, Telemetry, DEFAULT_CONFIG,
};

pub mod controls;
pub mod display;
pub mod rotor;

pub use controls::{Controls, PolledInput};
pub use display::DefmtDisplay;
pub use rotor::{rotor_pwm_config, RotorDuty, RotorOutput};
