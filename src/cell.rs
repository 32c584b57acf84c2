//! Latest-value cells shared between interrupt handlers and tasks.
//!
//! Every cell is a single slot: a write replaces whatever was there, a read
//! never blocks and never consumes. All operations are single atomic
//! loads/stores (or one read-modify-write), so they are safe to call from
//! interrupt context.

use core::marker::PhantomData;

use portable_atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

use crate::types::{FlightMode, TaskSet, UnknownMode, YawReading};

/// Bit pattern reserved for "nothing written yet".
const EMPTY: u32 = u32::MAX;

/// A value that fits in one atomic word without using the [`EMPTY`] pattern.
pub trait Word: Copy {
    fn to_bits(self) -> u32;
    fn from_bits(bits: u32) -> Option<Self>;
}

impl Word for i16 {
    #[inline]
    fn to_bits(self) -> u32 {
        self as u16 as u32
    }

    #[inline]
    fn from_bits(bits: u32) -> Option<Self> {
        Some(bits as u16 as i16)
    }
}

impl Word for u8 {
    #[inline]
    fn to_bits(self) -> u32 {
        self as u32
    }

    #[inline]
    fn from_bits(bits: u32) -> Option<Self> {
        Some(bits as u8)
    }
}

impl Word for crate::types::SwitchPosition {
    #[inline]
    fn to_bits(self) -> u32 {
        match self {
            Self::Down => 0,
            Self::Up => 1,
        }
    }

    #[inline]
    fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            0 => Some(Self::Down),
            1 => Some(Self::Up),
            _ => None,
        }
    }
}

/// Single-slot overwrite cell with an explicit "no value yet" state.
///
/// # Example
///
/// ```
/// use heli_supervisor::Latest;
///
/// let cell: Latest<i16> = Latest::new();
/// assert_eq!(cell.peek(), None);
/// cell.overwrite(20);
/// cell.overwrite(25);
/// assert_eq!(cell.peek(), Some(25));
/// assert_eq!(cell.peek(), Some(25)); // peeking never drains
/// ```
pub struct Latest<T> {
    bits: AtomicU32,
    _value: PhantomData<T>,
}

impl<T: Word> Latest<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bits: AtomicU32::new(EMPTY),
            _value: PhantomData,
        }
    }

    /// Replace the current value. Never blocks; callable from interrupts.
    #[inline]
    pub fn overwrite(&self, value: T) {
        self.bits.store(value.to_bits(), Ordering::Release);
    }

    /// Most recent completed write, or `None` if nothing was written yet.
    #[inline]
    #[must_use]
    pub fn peek(&self) -> Option<T> {
        match self.bits.load(Ordering::Acquire) {
            EMPTY => None,
            bits => T::from_bits(bits),
        }
    }

    /// Most recent value, or `default` if nothing was written yet.
    #[inline]
    #[must_use]
    pub fn peek_or(&self, default: T) -> T {
        self.peek().unwrap_or(default)
    }
}

impl<T: Word> Default for Latest<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The flight mode, kept as its raw byte.
///
/// Decoding happens on read so a corrupted byte surfaces as [`UnknownMode`]
/// instead of being silently coerced.
pub struct ModeCell {
    raw: AtomicU8,
}

impl ModeCell {
    #[must_use]
    pub const fn new(mode: FlightMode) -> Self {
        Self {
            raw: AtomicU8::new(mode as u8),
        }
    }

    #[inline]
    pub fn read(&self) -> Result<FlightMode, UnknownMode> {
        FlightMode::try_from(self.raw.load(Ordering::Acquire))
    }

    #[inline]
    pub fn publish(&self, mode: FlightMode) {
        self.raw.store(mode as u8, Ordering::Release);
    }

    /// Store a byte without validation. Test and fault-injection hook for the
    /// unknown-mode path.
    #[inline]
    pub fn store_raw(&self, raw: u8) {
        self.raw.store(raw, Ordering::Release);
    }

    #[inline]
    #[must_use]
    pub fn raw(&self) -> u8 {
        self.raw.load(Ordering::Acquire)
    }
}

/// Boolean event flag.
pub struct Flag(AtomicBool);

impl Flag {
    #[must_use]
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    #[inline]
    pub fn set(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[inline]
    pub fn clear(&self) {
        self.0.store(false, Ordering::Release);
    }

    #[inline]
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Clear the flag, returning whether it was set. Exactly one caller
    /// observes `true` per set.
    #[inline]
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }
}

impl Default for Flag {
    fn default() -> Self {
        Self::new()
    }
}

/// Encoder slot count and yaw degrees packed into one atomic word.
pub struct YawCell(AtomicU32);

impl YawCell {
    #[must_use]
    pub const fn new() -> Self {
        Self(AtomicU32::new(0))
    }

    #[inline]
    const fn pack(reading: YawReading) -> u32 {
        ((reading.slots as u16 as u32) << 16) | (reading.degrees as u16 as u32)
    }

    #[inline]
    const fn unpack(bits: u32) -> YawReading {
        YawReading {
            slots: (bits >> 16) as u16 as i16,
            degrees: bits as u16 as i16,
        }
    }

    #[inline]
    #[must_use]
    pub fn read(&self) -> YawReading {
        Self::unpack(self.0.load(Ordering::Acquire))
    }

    #[inline]
    #[must_use]
    pub fn degrees(&self) -> i16 {
        self.read().degrees
    }

    #[inline]
    pub fn store(&self, reading: YawReading) {
        self.0.store(Self::pack(reading), Ordering::Release);
    }

    /// Zero both slot count and degrees in a single store.
    #[inline]
    pub fn reset(&self) {
        self.store(YawReading::ZERO);
    }
}

impl Default for YawCell {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-task enabled flags. Only the supervisor writes them.
pub struct Gates(AtomicU8);

impl Gates {
    #[must_use]
    pub const fn new() -> Self {
        Self(AtomicU8::new(TaskSet::NONE.0))
    }

    #[inline]
    pub fn enable(&self, tasks: TaskSet) {
        self.0.fetch_or(tasks.raw(), Ordering::AcqRel);
    }

    #[inline]
    pub fn disable(&self, tasks: TaskSet) {
        self.0.fetch_and(!tasks.raw(), Ordering::AcqRel);
    }

    #[inline]
    #[must_use]
    pub fn enabled(&self) -> TaskSet {
        TaskSet(self.0.load(Ordering::Acquire))
    }

    #[inline]
    #[must_use]
    pub fn is_enabled(&self, tasks: TaskSet) -> bool {
        self.enabled().contains(tasks)
    }
}

impl Default for Gates {
    fn default() -> Self {
        Self::new()
    }
}

/// Monotonic event counter (wrapping).
pub struct Counter(AtomicU32);

impl Counter {
    #[must_use]
    pub const fn new() -> Self {
        Self(AtomicU32::new(0))
    }

    #[inline]
    pub fn increment(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    #[must_use]
    pub fn get(&self) -> u32 {
        self.0.load(Ordering::Relaxed)
    }
}

impl Default for Counter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SwitchPosition;

    #[test]
    fn test_latest_starts_empty_and_overwrites() {
        let cell: Latest<i16> = Latest::new();
        assert_eq!(cell.peek(), None);
        assert_eq!(cell.peek_or(-3), -3);
        cell.overwrite(-1);
        assert_eq!(cell.peek(), Some(-1));
        cell.overwrite(i16::MIN);
        assert_eq!(cell.peek(), Some(i16::MIN));
    }

    #[test]
    fn test_latest_switch_position() {
        let cell: Latest<SwitchPosition> = Latest::new();
        cell.overwrite(SwitchPosition::Up);
        assert_eq!(cell.peek(), Some(SwitchPosition::Up));
    }

    #[test]
    fn test_mode_cell_reports_unknown_byte() {
        let cell = ModeCell::new(FlightMode::Idle);
        assert_eq!(cell.read(), Ok(FlightMode::Idle));
        cell.store_raw(9);
        assert_eq!(cell.read(), Err(UnknownMode(9)));
        cell.publish(FlightMode::Landing);
        assert_eq!(cell.read(), Ok(FlightMode::Landing));
    }

    #[test]
    fn test_flag_take_is_single_shot() {
        let flag = Flag::new();
        assert!(!flag.take());
        flag.set();
        assert!(flag.is_set());
        assert!(flag.take());
        assert!(!flag.take());
    }

    #[test]
    fn test_yaw_cell_round_trips_negative_values() {
        let cell = YawCell::new();
        let reading = YawReading {
            slots: -224,
            degrees: -180,
        };
        cell.store(reading);
        assert_eq!(cell.read(), reading);
        cell.reset();
        assert_eq!(cell.read(), YawReading::ZERO);
    }

    #[test]
    fn test_gates_enable_disable() {
        let gates = Gates::new();
        gates.enable(TaskSet::ALL);
        gates.disable(TaskSet::BUTTONS);
        assert!(gates.is_enabled(TaskSet::CONTROL | TaskSet::SWITCHES));
        assert!(!gates.is_enabled(TaskSet::BUTTONS));
    }
}
