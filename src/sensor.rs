//! TCS3200 color sensor driver.
//!
//! Provides [`ColorSensor`], which owns the four mode-select lines, the pulse
//! input and a delay provider, and keeps all device state: integration time,
//! frequency scaling, calibration bounds, white balance and threshold watches.
//!
//! Every hardware operation blocks. Each channel read selects a filter and
//! waits for one output pulse; multi-channel reads are sequential, not atomic.

use crate::calibration::{
    CALIBRATION_SAMPLES, CalibrationBounds, PassAccumulator, UNCALIBRATED_RANGE,
    pulse_to_intensity, uncalibrated_intensity,
};
use crate::colors::{self, Cmyk};
use crate::pulse::{Level, PulseInput};
use crate::table::ColorTable;
use crate::threshold::{Bound, PollOutcome, ThresholdObserver, ThresholdWatch};
use crate::types::{Filter, FrequencyScaling, SensorConfig};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{OutputPin, PinState};
use palette::{Hsv, Srgb, Xyz};

/// Errors that can occur during sensor operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError<E> {
    /// Driving a select line failed.
    Pin(E),

    /// A channel's calibration bounds are equal, so readings cannot be mapped.
    ///
    /// Usually means only one calibration pass ran, or both saw the same light.
    EmptyCalibrationRange {
        /// The channel being read
        channel: Filter,
    },
}

impl<E: core::fmt::Debug> core::fmt::Display for SensorError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SensorError::Pin(e) => write!(f, "select line error: {:?}", e),
            SensorError::EmptyCalibrationRange { channel } => {
                write!(f, "empty calibration range for {:?} channel", channel)
            }
        }
    }
}

#[cfg(feature = "std")]
impl<E: core::fmt::Debug> std::error::Error for SensorError<E> {}

/// An RGB sample plus the raw clear-channel pulse width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RgbcReading {
    /// Mapped RGB intensities.
    pub rgb: Srgb<u8>,
    /// Raw clear-channel pulse width in microseconds.
    pub clear: u32,
}

#[cfg(feature = "defmt")]
impl defmt::Format for RgbcReading {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "RgbcReading {{ rgb: ({}, {}, {}), clear: {} }}",
            self.rgb.red,
            self.rgb.green,
            self.rgb.blue,
            self.clear
        )
    }
}

/// Driver for a TCS3200-class color sensor.
///
/// # Type Parameters
/// * `'a` - Lifetime of the threshold observers
/// * `O` - Select line type (S0-S3)
/// * `P` - Pulse input on the OUT line
/// * `D` - Delay provider used to pace calibration
pub struct ColorSensor<'a, O: OutputPin, P: PulseInput, D: DelayNs> {
    s0: O,
    s1: O,
    s2: O,
    s3: O,
    out: P,
    delay: D,
    integration_time_us: u32,
    frequency_scaling: FrequencyScaling,
    pulse_timeout_us: u32,
    calibrated: bool,
    bounds: CalibrationBounds,
    white_balance: Srgb<u8>,
    upper: Option<ThresholdWatch<'a>>,
    lower: Option<ThresholdWatch<'a>>,
}

impl<'a, O: OutputPin, P: PulseInput, D: DelayNs> ColorSensor<'a, O, P, D> {
    /// Creates a sensor with default configuration.
    ///
    /// No line is driven until [`begin`](Self::begin) or another operation is
    /// called.
    pub fn new(s0: O, s1: O, s2: O, s3: O, out: P, delay: D) -> Self {
        let config = SensorConfig::default();

        Self {
            s0,
            s1,
            s2,
            s3,
            out,
            delay,
            integration_time_us: config.integration_time_us,
            frequency_scaling: config.frequency_scaling,
            pulse_timeout_us: config.pulse_timeout_us,
            calibrated: false,
            bounds: CalibrationBounds::default(),
            white_balance: Srgb::new(0, 0, 0),
            upper: None,
            lower: None,
        }
    }

    /// Resets configuration and calibration to defaults and drives the
    /// default frequency scaling.
    pub fn begin(&mut self) -> Result<(), SensorError<O::Error>> {
        self.begin_with(SensorConfig::default())
    }

    /// Applies `config`, clears calibration and drives the scaling lines.
    ///
    /// White balance and threshold watches are kept.
    pub fn begin_with(&mut self, config: SensorConfig) -> Result<(), SensorError<O::Error>> {
        self.integration_time_us = config.integration_time_us;
        self.pulse_timeout_us = config.pulse_timeout_us;
        self.reset_calibration();
        self.set_frequency_scaling(config.frequency_scaling)
    }

    /// Returns the current configuration.
    pub fn config(&self) -> SensorConfig {
        SensorConfig {
            integration_time_us: self.integration_time_us,
            frequency_scaling: self.frequency_scaling,
            pulse_timeout_us: self.pulse_timeout_us,
        }
    }

    /// Returns the integration time in microseconds.
    pub fn integration_time(&self) -> u32 {
        self.integration_time_us
    }

    /// Sets the integration time in microseconds.
    pub fn set_integration_time(&mut self, time_us: u32) {
        self.integration_time_us = time_us;
    }

    /// Returns the pulse measurement timeout in microseconds.
    pub fn pulse_timeout(&self) -> u32 {
        self.pulse_timeout_us
    }

    /// Sets the pulse measurement timeout in microseconds.
    pub fn set_pulse_timeout(&mut self, timeout_us: u32) {
        self.pulse_timeout_us = timeout_us;
    }

    /// Returns the current frequency scaling.
    pub fn frequency_scaling(&self) -> FrequencyScaling {
        self.frequency_scaling
    }

    /// Sets the frequency scaling and drives S0/S1 accordingly.
    pub fn set_frequency_scaling(
        &mut self,
        scaling: FrequencyScaling,
    ) -> Result<(), SensorError<O::Error>> {
        self.frequency_scaling = scaling;

        let (s0, s1) = scaling.select_levels();
        drive(&mut self.s0, s0)?;
        drive(&mut self.s1, s1)?;

        debug!("frequency scaling set to {}", scaling);
        Ok(())
    }

    /// Sets the frequency scaling from a raw code.
    ///
    /// Unknown codes leave the lines and the recorded mode unchanged, so
    /// [`frequency_scaling`](Self::frequency_scaling) always names the mode
    /// actually driven on S0/S1. The code is not stored even though no line
    /// moves.
    pub fn set_frequency_scaling_code(&mut self, code: u8) -> Result<(), SensorError<O::Error>> {
        match FrequencyScaling::from_code(code) {
            Some(scaling) => self.set_frequency_scaling(scaling),
            None => {
                warn!("ignoring unknown frequency scaling code {}", code);
                Ok(())
            }
        }
    }

    /// Routes `filter`'s photodiodes to the output by driving S2/S3.
    ///
    /// Does not take a reading.
    pub fn select_filter(&mut self, filter: Filter) -> Result<(), SensorError<O::Error>> {
        let (s2, s3) = filter.select_levels();
        drive(&mut self.s2, s2)?;
        drive(&mut self.s3, s3)
    }

    /// Selects a filter from a raw code.
    ///
    /// Unknown codes leave the lines untouched, so the previously selected
    /// filter stays active.
    pub fn select_filter_code(&mut self, code: u8) -> Result<(), SensorError<O::Error>> {
        match Filter::from_code(code) {
            Some(filter) => self.select_filter(filter),
            None => {
                warn!("ignoring unknown filter code {}", code);
                Ok(())
            }
        }
    }

    /// Selects `filter` and measures one LOW pulse, in microseconds.
    ///
    /// Returns 0 on timeout; "no light" and "no sensor" look the same.
    pub fn read_raw(&mut self, filter: Filter) -> Result<u32, SensorError<O::Error>> {
        self.select_filter(filter)?;
        let width = self.out.pulse_width_us(Level::Low, self.pulse_timeout_us);
        trace!("{} pulse {} us", filter, width);
        Ok(width)
    }

    fn read_intensity(&mut self, channel: Filter) -> Result<u8, SensorError<O::Error>> {
        let pulse = self.read_raw(channel)?;
        let range = if self.calibrated {
            self.bounds.range(channel)
        } else {
            UNCALIBRATED_RANGE
        };

        pulse_to_intensity(pulse, range).ok_or(SensorError::EmptyCalibrationRange { channel })
    }

    /// Reads the red intensity (0-255, brighter is higher).
    pub fn read_red(&mut self) -> Result<u8, SensorError<O::Error>> {
        self.read_intensity(Filter::Red)
    }

    /// Reads the green intensity (0-255, brighter is higher).
    pub fn read_green(&mut self) -> Result<u8, SensorError<O::Error>> {
        self.read_intensity(Filter::Green)
    }

    /// Reads the blue intensity (0-255, brighter is higher).
    pub fn read_blue(&mut self) -> Result<u8, SensorError<O::Error>> {
        self.read_intensity(Filter::Blue)
    }

    /// Reads the raw clear-channel pulse width, unmapped.
    pub fn read_clear(&mut self) -> Result<u32, SensorError<O::Error>> {
        self.read_raw(Filter::Clear)
    }

    /// Reads red, green and blue in sequence.
    pub fn read_rgb_color(&mut self) -> Result<Srgb<u8>, SensorError<O::Error>> {
        let red = self.read_red()?;
        let green = self.read_green()?;
        let blue = self.read_blue()?;
        Ok(Srgb::new(red, green, blue))
    }

    /// Reads red, green, blue and the raw clear channel in sequence.
    pub fn read_rgbc(&mut self) -> Result<RgbcReading, SensorError<O::Error>> {
        let rgb = self.read_rgb_color()?;
        let clear = self.read_clear()?;
        Ok(RgbcReading { rgb, clear })
    }

    /// Marks the sensor as calibrated.
    ///
    /// Bounds from [`calibrate_light`](Self::calibrate_light) and
    /// [`calibrate_dark`](Self::calibrate_dark) apply to reads from now on.
    /// Skipped passes are not detected.
    pub fn calibrate(&mut self) {
        self.calibrated = true;
        debug!("calibration committed: {}", self.bounds);
    }

    /// Averages raw R/G/B pulses under a white reference.
    ///
    /// Stores the averages as the lower (`min_*`) bounds. Their intensities
    /// over the fixed uncalibrated range become the white-balance reference.
    /// Blocks for about 1.5x the integration time.
    pub fn calibrate_light(&mut self) -> Result<(), SensorError<O::Error>> {
        let (red, green, blue, _) = self.run_pass(false)?;

        self.bounds.min_red = red;
        self.bounds.min_green = green;
        self.bounds.min_blue = blue;
        self.white_balance = Srgb::new(
            uncalibrated_intensity(red),
            uncalibrated_intensity(green),
            uncalibrated_intensity(blue),
        );

        debug!("light calibration: r={} g={} b={}", red, green, blue);
        Ok(())
    }

    /// Averages raw R/G/B/clear pulses under minimal light.
    ///
    /// Stores the averages as the upper (`max_*`) bounds. Blocks for about
    /// 1.5x the integration time.
    pub fn calibrate_dark(&mut self) -> Result<(), SensorError<O::Error>> {
        let (red, green, blue, clear) = self.run_pass(true)?;

        self.bounds.max_red = red;
        self.bounds.max_green = green;
        self.bounds.max_blue = blue;
        self.bounds.clear_dark = clear;

        debug!("dark calibration: r={} g={} b={} c={}", red, green, blue, clear);
        Ok(())
    }

    fn run_pass(&mut self, with_clear: bool) -> Result<(u32, u32, u32, u32), SensorError<O::Error>> {
        let mut acc = PassAccumulator::default();

        self.delay.delay_us(self.integration_time_us / 2);
        for _ in 0..CALIBRATION_SAMPLES {
            let red = self.read_raw(Filter::Red)?;
            let green = self.read_raw(Filter::Green)?;
            let blue = self.read_raw(Filter::Blue)?;
            let clear = if with_clear {
                self.read_raw(Filter::Clear)?
            } else {
                0
            };
            acc.add(red, green, blue, clear);

            self.delay.delay_us(self.integration_time_us / CALIBRATION_SAMPLES);
        }

        Ok(acc.averages())
    }

    /// Returns true once [`calibrate`](Self::calibrate) has been called.
    pub fn is_calibrated(&self) -> bool {
        self.calibrated
    }

    /// Returns the measured calibration bounds.
    pub fn calibration_bounds(&self) -> CalibrationBounds {
        self.bounds
    }

    /// Installs previously measured bounds and marks the sensor calibrated.
    pub fn set_calibration_bounds(&mut self, bounds: CalibrationBounds) {
        self.bounds = bounds;
        self.calibrated = true;
    }

    /// Clears bounds and the calibrated flag.
    pub fn reset_calibration(&mut self) {
        self.bounds = CalibrationBounds::default();
        self.calibrated = false;
    }

    /// Returns the white-balance reference. Zero channels are unset.
    pub fn white_balance(&self) -> Srgb<u8> {
        self.white_balance
    }

    /// Sets the white-balance reference. Zero channels are unset.
    pub fn set_white_balance(&mut self, white_balance: Srgb<u8>) {
        self.white_balance = white_balance;
    }

    /// Takes a fresh sample and converts it to HSV.
    pub fn read_hsv(&mut self) -> Result<Hsv, SensorError<O::Error>> {
        let rgb = self.read_rgb_color()?;
        Ok(colors::to_hsv(rgb, self.white_balance))
    }

    /// Takes a fresh sample and converts it to CMYK.
    ///
    /// A black sample yields a degenerate result; see [`Cmyk::is_degenerate`].
    pub fn read_cmyk(&mut self) -> Result<Cmyk, SensorError<O::Error>> {
        let rgb = self.read_rgb_color()?;
        Ok(colors::to_cmyk(rgb))
    }

    /// Takes a fresh sample and converts it to CIE 1931 XYZ.
    pub fn read_cie1931(&mut self) -> Result<Xyz, SensorError<O::Error>> {
        let rgb = self.read_rgb_color()?;
        Ok(colors::to_cie1931(rgb, self.white_balance))
    }

    /// Takes a fresh sample and returns its chroma.
    pub fn read_chroma(&mut self) -> Result<f32, SensorError<O::Error>> {
        let xyz = self.read_cie1931()?;
        Ok(colors::chroma(xyz))
    }

    /// Takes a fresh sample and returns its strongest RGB channel.
    pub fn read_dominant_channel(&mut self) -> Result<Filter, SensorError<O::Error>> {
        let rgb = self.read_rgb_color()?;
        Ok(colors::dominant_channel(rgb))
    }

    /// Takes a fresh sample and returns the label of the nearest reference.
    ///
    /// `labels` and `references` are parallel slices. Returns `Ok(None)` when
    /// they are empty.
    pub fn nearest_color<'l, L>(
        &mut self,
        labels: &'l [L],
        references: &[Srgb<u8>],
    ) -> Result<Option<&'l L>, SensorError<O::Error>> {
        let rgb = self.read_rgb_color()?;
        Ok(colors::nearest_color(rgb, labels, references))
    }

    /// Takes a fresh sample and classifies it against `table`.
    pub fn classify<'t, L, const N: usize>(
        &mut self,
        table: &'t ColorTable<L, N>,
    ) -> Result<Option<&'t L>, SensorError<O::Error>> {
        let rgb = self.read_rgb_color()?;
        Ok(table.nearest(rgb))
    }

    /// Arms the upper-bound watch, replacing any previous one.
    ///
    /// `observer` is notified on every [`poll`](Self::poll) where all three
    /// channels are strictly above `threshold`.
    pub fn set_upper_bound_watch(
        &mut self,
        threshold: Srgb<u8>,
        observer: &'a mut dyn ThresholdObserver,
    ) {
        self.upper = Some(ThresholdWatch::new(threshold, observer));
    }

    /// Arms the lower-bound watch, replacing any previous one.
    ///
    /// `observer` is notified on every [`poll`](Self::poll) where all three
    /// channels are strictly below `threshold`.
    pub fn set_lower_bound_watch(
        &mut self,
        threshold: Srgb<u8>,
        observer: &'a mut dyn ThresholdObserver,
    ) {
        self.lower = Some(ThresholdWatch::new(threshold, observer));
    }

    /// Disarms the upper-bound watch.
    pub fn clear_upper_bound_watch(&mut self) {
        self.upper = None;
    }

    /// Disarms the lower-bound watch.
    pub fn clear_lower_bound_watch(&mut self) {
        self.lower = None;
    }

    /// Returns the upper-bound threshold, if armed.
    pub fn upper_bound_threshold(&self) -> Option<Srgb<u8>> {
        self.upper.as_ref().map(ThresholdWatch::threshold)
    }

    /// Returns the lower-bound threshold, if armed.
    pub fn lower_bound_threshold(&self) -> Option<Srgb<u8>> {
        self.lower.as_ref().map(ThresholdWatch::threshold)
    }

    /// Evaluates the armed watches against one fresh sample.
    ///
    /// Call this from your main loop. With no watch armed nothing is sampled.
    /// Observers fire on every poll while their condition holds.
    pub fn poll(&mut self) -> Result<PollOutcome, SensorError<O::Error>> {
        if self.upper.is_none() && self.lower.is_none() {
            return Ok(PollOutcome::IDLE);
        }

        let sample = self.read_rgb_color()?;

        let upper_fired = self
            .upper
            .as_mut()
            .is_some_and(|watch| watch.evaluate(Bound::Upper, sample));
        let lower_fired = self
            .lower
            .as_mut()
            .is_some_and(|watch| watch.evaluate(Bound::Lower, sample));

        if upper_fired || lower_fired {
            debug!("threshold watch fired: upper={} lower={}", upper_fired, lower_fired);
        }

        Ok(PollOutcome {
            sample: Some(sample),
            upper_fired,
            lower_fired,
        })
    }

    /// Consumes the driver and returns `(s0, s1, s2, s3, out, delay)`.
    pub fn release(self) -> (O, O, O, O, P, D) {
        (self.s0, self.s1, self.s2, self.s3, self.out, self.delay)
    }
}

fn drive<O: OutputPin>(pin: &mut O, high: bool) -> Result<(), SensorError<O::Error>> {
    pin.set_state(PinState::from(high)).map_err(SensorError::Pin)
}
