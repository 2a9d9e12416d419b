//! Core sensor types: filters, output scaling and configuration.

/// Photodiode group routed to the output stage.
///
/// Also used to name a single RGB channel, e.g. the result of
/// [`dominant_channel`](crate::colors::dominant_channel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Filter {
    /// Red-filtered photodiodes.
    Red,
    /// Green-filtered photodiodes.
    Green,
    /// Blue-filtered photodiodes.
    Blue,
    /// Unfiltered (clear/ambient) photodiodes.
    Clear,
}

impl Filter {
    /// Decodes a raw filter code (0 red, 1 green, 2 blue, 3 clear).
    ///
    /// Any other code yields `None`.
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Filter::Red),
            1 => Some(Filter::Green),
            2 => Some(Filter::Blue),
            3 => Some(Filter::Clear),
            _ => None,
        }
    }

    /// Returns the raw code for this filter.
    pub const fn code(self) -> u8 {
        match self {
            Filter::Red => 0,
            Filter::Green => 1,
            Filter::Blue => 2,
            Filter::Clear => 3,
        }
    }

    /// Line levels `(S2, S3)` selecting this filter, `true` meaning high.
    pub const fn select_levels(self) -> (bool, bool) {
        match self {
            Filter::Red => (false, false),
            Filter::Green => (true, true),
            Filter::Blue => (false, true),
            Filter::Clear => (true, false),
        }
    }
}

/// Output frequency scaling (also the sensor's power mode).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrequencyScaling {
    /// Sensor powered down, no output.
    PowerDown,
    /// 2% of full-scale output frequency.
    #[default]
    Percent2,
    /// 20% of full-scale output frequency.
    Percent20,
    /// 100% of full-scale output frequency.
    Percent100,
}

impl FrequencyScaling {
    /// Decodes a raw scaling code (0 power-down, 1 2%, 2 20%, 3 100%).
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(FrequencyScaling::PowerDown),
            1 => Some(FrequencyScaling::Percent2),
            2 => Some(FrequencyScaling::Percent20),
            3 => Some(FrequencyScaling::Percent100),
            _ => None,
        }
    }

    /// Returns the raw code for this mode.
    pub const fn code(self) -> u8 {
        match self {
            FrequencyScaling::PowerDown => 0,
            FrequencyScaling::Percent2 => 1,
            FrequencyScaling::Percent20 => 2,
            FrequencyScaling::Percent100 => 3,
        }
    }

    /// Line levels `(S0, S1)` selecting this mode, `true` meaning high.
    pub const fn select_levels(self) -> (bool, bool) {
        match self {
            FrequencyScaling::PowerDown => (false, false),
            FrequencyScaling::Percent2 => (false, true),
            FrequencyScaling::Percent20 => (true, false),
            FrequencyScaling::Percent100 => (true, true),
        }
    }
}

/// Default integration time in microseconds.
pub const DEFAULT_INTEGRATION_TIME_US: u32 = 2000;

/// Default pulse measurement timeout in microseconds.
pub const DEFAULT_PULSE_TIMEOUT_US: u32 = 1_000_000;

/// Runtime configuration applied by [`ColorSensor::begin_with`](crate::ColorSensor::begin_with).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorConfig {
    /// Integration time in microseconds. Paces the calibration passes.
    pub integration_time_us: u32,

    /// Output frequency scaling.
    pub frequency_scaling: FrequencyScaling,

    /// Timeout handed to every pulse measurement.
    pub pulse_timeout_us: u32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            integration_time_us: DEFAULT_INTEGRATION_TIME_US,
            frequency_scaling: FrequencyScaling::default(),
            pulse_timeout_us: DEFAULT_PULSE_TIMEOUT_US,
        }
    }
}
