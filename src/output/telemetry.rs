//! Read-only telemetry snapshot and the four-line status display.

use core::fmt::Write;
use core::future::Future;

use heapless::String;

use crate::shared::SharedState;
use crate::types::FlightMode;

/// Display width in characters.
pub const DISPLAY_COLUMNS: usize = 16;

/// One rendered display row.
pub type DisplayLine = String<DISPLAY_COLUMNS>;

/// Point-in-time copy of the values shown to the pilot.
///
/// Cells that were never written read as zero. Values are captured one cell
/// at a time, so two fields may come from different supervisor periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Telemetry {
    /// `None` when the mode cell holds an unknown byte.
    pub mode: Option<FlightMode>,
    pub altitude_setpoint: i16,
    pub altitude: i16,
    pub yaw_setpoint: i16,
    pub yaw: i16,
    pub main_duty: u8,
    pub tail_duty: u8,
    pub encoder_faults: u32,
}

impl Telemetry {
    /// Read every displayed cell. Has no effect on the shared state.
    #[must_use]
    pub fn capture(shared: &SharedState) -> Self {
        Self {
            mode: shared.mode.read().ok(),
            altitude_setpoint: shared.altitude_setpoint.peek_or(0),
            altitude: shared.altitude.peek_or(0),
            yaw_setpoint: shared.yaw_setpoint.peek_or(0),
            yaw: shared.yaw.degrees(),
            main_duty: shared.main_duty.peek_or(0),
            tail_duty: shared.tail_duty.peek_or(0),
            encoder_faults: shared.encoder_faults.get(),
        }
    }

    /// Render the four display rows: altitude, yaw, rotor duty, mode.
    pub fn lines(&self) -> Result<[DisplayLine; 4], TelemetryError> {
        let mut lines: [DisplayLine; 4] = Default::default();
        write!(
            lines[0],
            "Alt(%) {:>3}|{:>3}",
            self.altitude_setpoint, self.altitude
        )
        .map_err(|_| TelemetryError::Overflow)?;
        write!(lines[1], "Yaw   {:>4}|{:>3}", self.yaw_setpoint, self.yaw)
            .map_err(|_| TelemetryError::Overflow)?;
        write!(lines[2], "PWM(%) {:>3}|{:>3}", self.main_duty, self.tail_duty)
            .map_err(|_| TelemetryError::Overflow)?;
        let label = self.mode.map_or("FSM fault", FlightMode::label);
        lines[3]
            .push_str(label)
            .map_err(|_| TelemetryError::Overflow)?;
        Ok(lines)
    }
}

/// Error type for telemetry output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TelemetryError {
    /// A value did not fit in its display row.
    Overflow,
    /// Display or link I/O error.
    Io,
}

/// Destination for periodic telemetry (display, log, radio link).
pub trait TelemetrySink {
    fn publish(&mut self, telemetry: &Telemetry)
        -> impl Future<Output = Result<(), TelemetryError>>;
}

/// Capture the shared state and hand it to `sink`.
pub async fn report<S: TelemetrySink>(
    shared: &SharedState,
    sink: &mut S,
) -> Result<Telemetry, TelemetryError> {
    let telemetry = Telemetry::capture(shared);
    sink.publish(&telemetry).await?;
    Ok(telemetry)
}
