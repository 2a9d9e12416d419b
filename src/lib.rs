#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![doc = include_str!("../README.md")]

//! # Core Concepts
//!
//! - **`ColorSensor`**: Owns the select lines, pulse input and all device state
//! - **`PulseInput`**: Trait to implement for measuring pulses on the OUT line
//! - **`Filter`** / **`FrequencyScaling`**: Line encodings for S2/S3 and S0/S1
//! - **`CalibrationBounds`**: Light (`min_*`) and dark (`max_*`) raw pulse widths
//! - **`colors`**: HSV, CMYK, CIE 1931, chroma, dominant channel and nearest color
//! - **`ThresholdObserver`**: Notified by `ColorSensor::poll` when a watch fires
//! - **`ColorTable`**: Fixed-capacity labelled references for classification
//!
//! RGB samples are `Srgb<u8>` (0-255, brighter is higher). Select lines use
//! `embedded_hal::digital::OutputPin` and calibration pacing uses
//! `embedded_hal::delay::DelayNs`.

#[macro_use]
mod fmt;

// Re-export palette color types for user convenience
pub use palette::{Hsv, Srgb, Xyz};

pub mod calibration;
pub mod colors;
pub mod pulse;
pub mod sensor;
pub mod table;
pub mod threshold;
pub mod types;

pub use calibration::{CalibrationBounds, remap};
pub use colors::{Cmyk, ColorError};
pub use pulse::{Level, PulseInput};
pub use sensor::{ColorSensor, RgbcReading, SensorError};
pub use table::{ColorTable, ColorTableBuilder, TableError};
pub use threshold::{Bound, PollOutcome, ThresholdObserver, ThresholdWatch};
pub use types::{
    DEFAULT_INTEGRATION_TIME_US, DEFAULT_PULSE_TIMEOUT_US, Filter, FrequencyScaling, SensorConfig,
};

pub const RED: Srgb<u8> = Srgb::new(255, 0, 0);
pub const GREEN: Srgb<u8> = Srgb::new(0, 255, 0);
pub const BLUE: Srgb<u8> = Srgb::new(0, 0, 255);
pub const WHITE: Srgb<u8> = Srgb::new(255, 255, 255);
pub const BLACK: Srgb<u8> = Srgb::new(0, 0, 0);
