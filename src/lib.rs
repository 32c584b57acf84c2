//! Flight-mode supervisor for a tethered rotor rig.
//!
//! This crate holds everything that does not touch hardware: the shared
//! latest-value cells, the quadrature yaw decoder, yaw reference acquisition,
//! the landing descent ramp and the flight mode state machine. It runs in
//! `no_std` firmware and on the host for testing.
//!
//! # Overview
//!
//! - [`cell`]: lock-free single-slot cells ([`Latest`], [`ModeCell`], [`YawCell`], [`Gates`])
//! - [`shared`]: [`SharedState`], every cell in one `static`-friendly struct
//! - [`sensor`]: [`QuadratureDecoder`], [`Acquisition`], [`AltitudeFilter`]
//! - [`landing`]: [`LandingRamp`] and the [`LandingTimer`] it is ticked by
//! - [`control`]: gated [`ControlLoop`]s around a [`RotorControl`] law
//! - [`supervisor`]: [`FlightSupervisor`], the periodic mode evaluation
//! - [`pilot`]: gated button and switch input
//! - [`output`]: [`Telemetry`] snapshot and display rows
//!
//! # Concurrency
//!
//! Interrupt handlers ([`QuadratureDecoder::on_edge`], [`on_reference_edge`])
//! only perform single atomic stores or read-modify-writes on
//! [`SharedState`]. Tasks read cells without locking and without consuming
//! them. Each cell has a single writer role.
//!
//! # Example
//!
//! ```rust
//! use heli_supervisor::{
//!     on_reference_edge, FlightMode, FlightSupervisor, PeriodicTimer, SharedState,
//!     SwitchPosition, DEFAULT_CONFIG,
//! };
//!
//! static SHARED: SharedState = SharedState::new();
//! static TIMER: PeriodicTimer = PeriodicTimer::new();
//!
//! let mut supervisor = FlightSupervisor::new(DEFAULT_CONFIG, &TIMER);
//! SHARED.gates.enable(heli_supervisor::TaskSet::SWITCHES);
//! heli_supervisor::publish_switch(&SHARED, SwitchPosition::Down).unwrap();
//! supervisor.step(&SHARED).unwrap();
//! heli_supervisor::publish_switch(&SHARED, SwitchPosition::Up).unwrap();
//! supervisor.step(&SHARED).unwrap();
//! assert_eq!(SHARED.mode.read(), Ok(FlightMode::TakeOff));
//!
//! // Spin for the index pulse, then zero on it.
//! supervisor.step(&SHARED).unwrap();
//! assert!(on_reference_edge(&SHARED));
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting and log output (for embedded builds)

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

#[macro_use]
mod fmt;

pub mod cell;
pub mod config;
pub mod control;
pub mod landing;
pub mod output;
pub mod pilot;
pub mod sensor;
pub mod shared;
pub mod supervisor;
pub mod types;

// Re-export main types at crate root
pub use cell::{Counter, Flag, Gates, Latest, ModeCell, Word, YawCell};
pub use config::{SupervisorConfig, TouchdownLimits, DEFAULT_CONFIG};
pub use control::{ControlLoop, Proportional, Rotor, RotorControl};
pub use landing::{LandingRamp, LandingTimer, PeriodicTimer, RampStatus};
pub use output::{Telemetry, TelemetryError, TelemetrySink};
pub use pilot::{apply_pilot_command, publish_switch, Debouncer, PilotCommand, PilotError};
pub use sensor::{
    on_reference_edge, AcquireError, AcquireStatus, Acquisition, AltitudeFilter,
    QuadratureDecoder, Step,
};
pub use shared::SharedState;
pub use supervisor::{FlightSupervisor, SupervisorError, Transition};
pub use types::{FlightMode, SwitchPosition, TaskSet, UnknownMode, YawReading};
