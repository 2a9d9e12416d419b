//! Calibration bounds and raw pulse-width remapping.
//!
//! Pulse widths are inversely proportional to light intensity: a short LOW
//! pulse means a bright channel. The light pass therefore produces the `min_*`
//! bounds and the dark pass the `max_*` bounds.

use crate::types::Filter;

/// Number of samples averaged by each calibration pass.
pub const CALIBRATION_SAMPLES: u32 = 10;

/// Source range used for channel reads while the sensor is uncalibrated.
pub const UNCALIBRATED_RANGE: (u32, u32) = (0, 255);

/// Per-channel raw pulse-width bounds measured by the calibration passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationBounds {
    /// Red pulse width under the light reference.
    pub min_red: u32,
    /// Green pulse width under the light reference.
    pub min_green: u32,
    /// Blue pulse width under the light reference.
    pub min_blue: u32,
    /// Red pulse width under the dark reference.
    pub max_red: u32,
    /// Green pulse width under the dark reference.
    pub max_green: u32,
    /// Blue pulse width under the dark reference.
    pub max_blue: u32,
    /// Clear pulse width under the dark reference.
    ///
    /// Informational only: the clear channel is never remapped, so no read
    /// uses this value.
    pub clear_dark: u32,
}

impl CalibrationBounds {
    /// Returns the `(min, max)` source range for an RGB channel.
    ///
    /// The clear channel is never remapped; it yields the fixed
    /// uncalibrated range.
    pub fn range(&self, channel: Filter) -> (u32, u32) {
        match channel {
            Filter::Red => (self.min_red, self.max_red),
            Filter::Green => (self.min_green, self.max_green),
            Filter::Blue => (self.min_blue, self.max_blue),
            Filter::Clear => UNCALIBRATED_RANGE,
        }
    }
}

/// Linearly maps `value` from `[in_min, in_max]` to `[out_min, out_max]`.
///
/// Integer arithmetic truncating toward zero. Values outside the source range
/// are extrapolated, not clamped. Returns `None` when the source range is
/// empty (`in_min == in_max`).
pub fn remap(value: i64, in_min: i64, in_max: i64, out_min: i64, out_max: i64) -> Option<i64> {
    let span = in_max - in_min;
    if span == 0 {
        return None;
    }

    Some((value - in_min) * (out_max - out_min) / span + out_min)
}

/// Maps a raw pulse width to an 8-bit intensity, brighter meaning higher.
///
/// `range` is the `(light, dark)` pulse-width pair; light maps to 255 and
/// dark to 0. The extrapolated result saturates at the 8-bit limits.
pub fn pulse_to_intensity(pulse: u32, range: (u32, u32)) -> Option<u8> {
    let (light, dark) = range;
    remap(pulse as i64, light as i64, dark as i64, 255, 0).map(saturate_u8)
}

/// Maps a raw pulse width over [`UNCALIBRATED_RANGE`].
///
/// The fixed range is never empty, so unlike [`pulse_to_intensity`] this
/// always yields a value.
pub fn uncalibrated_intensity(pulse: u32) -> u8 {
    pulse_to_intensity(pulse, UNCALIBRATED_RANGE).unwrap_or(u8::MIN)
}

pub(crate) fn saturate_u8(value: i64) -> u8 {
    value.clamp(0, u8::MAX as i64) as u8
}

/// Running per-channel sum for a calibration pass.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct PassAccumulator {
    red: u64,
    green: u64,
    blue: u64,
    clear: u64,
    samples: u32,
}

impl PassAccumulator {
    pub(crate) fn add(&mut self, red: u32, green: u32, blue: u32, clear: u32) {
        self.red += red as u64;
        self.green += green as u64;
        self.blue += blue as u64;
        self.clear += clear as u64;
        self.samples += 1;
    }

    /// Returns the `(red, green, blue, clear)` averages.
    pub(crate) fn averages(&self) -> (u32, u32, u32, u32) {
        if self.samples == 0 {
            return (0, 0, 0, 0);
        }

        let n = self.samples as u64;
        (
            (self.red / n) as u32,
            (self.green / n) as u32,
            (self.blue / n) as u32,
            (self.clear / n) as u32,
        )
    }
}
