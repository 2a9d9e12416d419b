//! Pulse-width measurement abstraction for the sensor's output line.

/// Logic level of a pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    Low,
    High,
}

/// Trait for measuring pulse widths on the sensor's OUT line.
///
/// Implement this on top of your HAL's input capture, timer or busy-wait
/// loop.
pub trait PulseInput {
    /// Measures the duration of the next pulse at `level`, in microseconds.
    ///
    /// Returns 0 if no complete pulse was seen within `timeout_us`. This
    /// method cannot fail; handle hardware errors internally.
    fn pulse_width_us(&mut self, level: Level, timeout_us: u32) -> u32;
}

impl<T: PulseInput + ?Sized> PulseInput for &mut T {
    fn pulse_width_us(&mut self, level: Level, timeout_us: u32) -> u32 {
        (**self).pulse_width_us(level, timeout_us)
    }
}
