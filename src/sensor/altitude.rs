//! Altitude sensor averaging.
//!
//! The height sensor output voltage falls as the rig climbs. Raw ADC samples
//! go through a fixed window average; the first full window is taken as the
//! ground reference and later means are reported as percent of the span.

use crate::shared::SharedState;

/// ADC counts between ground and full height (0.8 V on a 12-bit, 3.3 V ADC).
pub const ALTITUDE_SPAN_COUNTS: u16 = 993;

/// Samples per averaging window.
pub const ALTITUDE_WINDOW: usize = 10;

/// Circular sample window with a latched ground reference.
#[derive(Debug)]
pub struct AltitudeFilter<const N: usize = ALTITUDE_WINDOW> {
    samples: [u16; N],
    next: usize,
    filled: usize,
    ground: Option<u16>,
    span: u16,
}

impl<const N: usize> AltitudeFilter<N> {
    #[must_use]
    pub const fn new(span: u16) -> Self {
        Self {
            samples: [0; N],
            next: 0,
            filled: 0,
            ground: None,
            span,
        }
    }

    #[must_use]
    pub const fn ground(&self) -> Option<u16> {
        self.ground
    }

    /// Mean of the window, once it has been filled.
    #[must_use]
    pub fn mean(&self) -> Option<u16> {
        if N == 0 || self.filled < N {
            return None;
        }
        let sum: u32 = self.samples.iter().map(|&s| s as u32).sum();
        Some((sum / N as u32) as u16)
    }

    /// Add a raw sample. Returns the altitude in percent once a ground
    /// reference exists.
    pub fn push(&mut self, sample: u16) -> Option<i16> {
        if N == 0 {
            return None;
        }
        self.samples[self.next] = sample;
        self.next = (self.next + 1) % N;
        if self.filled < N {
            self.filled += 1;
        }

        let mean = self.mean()?;
        let ground = *self.ground.get_or_insert(mean);
        Some(self.percent(ground, mean))
    }

    fn percent(&self, ground: u16, mean: u16) -> i16 {
        if self.span == 0 {
            return 0;
        }
        let pct = (ground as i32 - mean as i32) * 100 / self.span as i32;
        pct.clamp(i16::MIN as i32, i16::MAX as i32) as i16
    }

    /// Drop the ground reference; the next full window becomes the new one.
    pub fn recalibrate(&mut self) {
        self.ground = None;
        self.filled = 0;
        self.next = 0;
    }

    /// Push a sample and publish the result to the altitude cell.
    pub fn publish(&mut self, sample: u16, shared: &SharedState) -> Option<i16> {
        let altitude = self.push(sample)?;
        shared.altitude.overwrite(altitude);
        Some(altitude)
    }
}

impl Default for AltitudeFilter {
    fn default() -> Self {
        Self::new(ALTITUDE_SPAN_COUNTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nothing_until_window_full() {
        let mut filter: AltitudeFilter<4> = AltitudeFilter::new(1000);
        assert_eq!(filter.push(2000), None);
        assert_eq!(filter.push(2000), None);
        assert_eq!(filter.push(2000), None);
        assert_eq!(filter.push(2000), Some(0));
        assert_eq!(filter.ground(), Some(2000));
    }

    #[test]
    fn test_climb_reports_percent_of_span() {
        let shared = SharedState::new();
        let mut filter: AltitudeFilter<2> = AltitudeFilter::new(1000);
        filter.publish(3000, &shared);
        filter.publish(3000, &shared);
        assert_eq!(shared.altitude.peek(), Some(0));

        filter.publish(2800, &shared);
        assert_eq!(shared.altitude.peek(), Some(10));
        filter.publish(2800, &shared);
        assert_eq!(shared.altitude.peek(), Some(20));
    }

    #[test]
    fn test_recalibrate_takes_new_ground() {
        let mut filter: AltitudeFilter<2> = AltitudeFilter::new(500);
        filter.push(1000);
        filter.push(1000);
        filter.recalibrate();
        assert_eq!(filter.push(900), None);
        assert_eq!(filter.push(900), Some(0));
        assert_eq!(filter.push(800), Some(10));
    }
}
