//! Sensor-side components: yaw decoding, reference acquisition, altitude.

pub mod altitude;
pub mod quadrature;
pub mod reference;

pub use altitude::{AltitudeFilter, ALTITUDE_SPAN_COUNTS, ALTITUDE_WINDOW};
pub use quadrature::{decode, phase_reading, QuadratureDecoder, Step};
pub use reference::{on_reference_edge, AcquireError, AcquirePhase, AcquireStatus, Acquisition};
