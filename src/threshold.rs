//! Threshold watches evaluated by [`ColorSensor::poll`](crate::ColorSensor::poll).

use palette::Srgb;

/// Receives notifications from an armed threshold watch.
///
/// Any `FnMut()` closure is an observer, so watches can carry context
/// without globals:
///
/// ```
/// use core::cell::Cell;
/// use tcs3200::ThresholdObserver;
///
/// let hits = Cell::new(0);
/// let mut on_bright = || hits.set(hits.get() + 1);
/// on_bright.notify();
/// assert_eq!(hits.get(), 1);
/// ```
pub trait ThresholdObserver {
    /// Called once per poll while the watch condition holds.
    fn notify(&mut self);
}

impl<F: FnMut()> ThresholdObserver for F {
    fn notify(&mut self) {
        self()
    }
}

/// Which side of the threshold a watch fires on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bound {
    /// Fires when every RGB channel is strictly above the threshold.
    Upper,
    /// Fires when every RGB channel is strictly below the threshold.
    Lower,
}

impl Bound {
    /// Returns true if `sample` satisfies this bound against `threshold`.
    pub fn is_met(self, sample: Srgb<u8>, threshold: Srgb<u8>) -> bool {
        match self {
            Bound::Upper => {
                sample.red > threshold.red
                    && sample.green > threshold.green
                    && sample.blue > threshold.blue
            }
            Bound::Lower => {
                sample.red < threshold.red
                    && sample.green < threshold.green
                    && sample.blue < threshold.blue
            }
        }
    }
}

/// An armed watch: a threshold color plus the observer to notify.
pub struct ThresholdWatch<'a> {
    threshold: Srgb<u8>,
    observer: &'a mut dyn ThresholdObserver,
}

impl<'a> ThresholdWatch<'a> {
    /// Creates a watch that notifies `observer` when a sample crosses
    /// `threshold`.
    pub fn new(threshold: Srgb<u8>, observer: &'a mut dyn ThresholdObserver) -> Self {
        Self {
            threshold,
            observer,
        }
    }

    /// Returns the threshold color.
    pub fn threshold(&self) -> Srgb<u8> {
        self.threshold
    }

    /// Notifies the observer if `sample` meets `bound`. Returns whether it fired.
    pub(crate) fn evaluate(&mut self, bound: Bound, sample: Srgb<u8>) -> bool {
        if bound.is_met(sample, self.threshold) {
            self.observer.notify();
            true
        } else {
            false
        }
    }
}

impl core::fmt::Debug for ThresholdWatch<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ThresholdWatch")
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}

/// Result of a single [`ColorSensor::poll`](crate::ColorSensor::poll).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollOutcome {
    /// The sample taken, or `None` when no watch was armed.
    pub sample: Option<Srgb<u8>>,
    /// The upper-bound observer was notified.
    pub upper_fired: bool,
    /// The lower-bound observer was notified.
    pub lower_fired: bool,
}

#[cfg(feature = "defmt")]
impl defmt::Format for PollOutcome {
    fn format(&self, f: defmt::Formatter) {
        let sample = self.sample.map(|s| (s.red, s.green, s.blue));
        defmt::write!(
            f,
            "PollOutcome {{ sample: {}, upper_fired: {}, lower_fired: {} }}",
            sample,
            self.upper_fired,
            self.lower_fired
        )
    }
}

impl PollOutcome {
    /// Outcome of a poll with no watch armed.
    pub const IDLE: Self = Self {
        sample: None,
        upper_fired: false,
        lower_fired: false,
    };

    /// Returns true if any observer was notified.
    pub fn fired(&self) -> bool {
        self.upper_fired || self.lower_fired
    }
}
