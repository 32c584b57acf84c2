//! Outputs consumed by the display and telemetry link.

pub mod telemetry;

pub use telemetry::{report, DisplayLine, Telemetry, TelemetryError, TelemetrySink, DISPLAY_COLUMNS};
