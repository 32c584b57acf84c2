//! Status display over defmt.
//!
//! The rig's panel mirrors these four rows; the RTT log carries the same
//! text plus the encoder fault count.

use heli_supervisor::{Telemetry, TelemetryError, TelemetrySink};

/// Logs each telemetry snapshot as the four display rows.
#[derive(Default)]
pub struct DefmtDisplay {
    last_faults: u32,
}

impl DefmtDisplay {
    #[must_use]
    pub const fn new() -> Self {
        Self { last_faults: 0 }
    }
}

impl TelemetrySink for DefmtDisplay {
    async fn publish(&mut self, telemetry: &Telemetry) -> Result<(), TelemetryError> {
        let lines = telemetry.lines()?;
        defmt::info!(
            "{=str} | {=str} | {=str} | {=str}",
            lines[0].as_str(),
            lines[1].as_str(),
            lines[2].as_str(),
            lines[3].as_str()
        );
        if telemetry.encoder_faults != self.last_faults {
            defmt::warn!(
                "encoder skipped {} transitions",
                telemetry.encoder_faults.wrapping_sub(self.last_faults)
            );
            self.last_faults = telemetry.encoder_faults;
        }
        Ok(())
    }
}
