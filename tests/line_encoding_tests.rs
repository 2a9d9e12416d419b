//! Bit-exact select line tests using embedded-hal-mock pins

use embedded_hal::digital::{ErrorType, OutputPin};
use embedded_hal_mock::eh1::delay::NoopDelay;
use embedded_hal_mock::eh1::digital::{
    Mock as PinMock, State as PinState, Transaction as PinTransaction,
};
use tcs3200::{ColorSensor, Filter, FrequencyScaling, Level, PulseInput, SensorError};

struct FixedPulse(u32);

impl PulseInput for FixedPulse {
    fn pulse_width_us(&mut self, _level: Level, _timeout_us: u32) -> u32 {
        self.0
    }
}

fn low() -> PinTransaction {
    PinTransaction::set(PinState::Low)
}

fn high() -> PinTransaction {
    PinTransaction::set(PinState::High)
}

#[test]
fn filter_selection_drives_s2_s3_only() {
    let s0 = PinMock::new(&[]);
    let s1 = PinMock::new(&[]);
    // red, green, blue, clear
    let s2 = PinMock::new(&[low(), high(), low(), high()]);
    let s3 = PinMock::new(&[low(), high(), high(), low()]);

    let mut sensor = ColorSensor::new(s0, s1, s2, s3, FixedPulse(0), NoopDelay::new());
    sensor.select_filter(Filter::Red).unwrap();
    sensor.select_filter(Filter::Green).unwrap();
    sensor.select_filter(Filter::Blue).unwrap();
    sensor.select_filter(Filter::Clear).unwrap();

    let (mut s0, mut s1, mut s2, mut s3, _out, _delay) = sensor.release();
    s0.done();
    s1.done();
    s2.done();
    s3.done();
}

#[test]
fn frequency_scaling_drives_s0_s1_only() {
    // power-down, 2%, 20%, 100%
    let s0 = PinMock::new(&[low(), low(), high(), high()]);
    let s1 = PinMock::new(&[low(), high(), low(), high()]);
    let s2 = PinMock::new(&[]);
    let s3 = PinMock::new(&[]);

    let mut sensor = ColorSensor::new(s0, s1, s2, s3, FixedPulse(0), NoopDelay::new());
    sensor.set_frequency_scaling(FrequencyScaling::PowerDown).unwrap();
    sensor.set_frequency_scaling(FrequencyScaling::Percent2).unwrap();
    sensor.set_frequency_scaling(FrequencyScaling::Percent20).unwrap();
    sensor.set_frequency_scaling(FrequencyScaling::Percent100).unwrap();

    let (mut s0, mut s1, mut s2, mut s3, _out, _delay) = sensor.release();
    s0.done();
    s1.done();
    s2.done();
    s3.done();
}

#[test]
fn channel_read_selects_then_measures() {
    let s0 = PinMock::new(&[]);
    let s1 = PinMock::new(&[]);
    let s2 = PinMock::new(&[low()]);
    let s3 = PinMock::new(&[high()]);

    let mut sensor = ColorSensor::new(s0, s1, s2, s3, FixedPulse(55), NoopDelay::new());
    assert_eq!(sensor.read_blue().unwrap(), 200);

    let (mut s0, mut s1, mut s2, mut s3, _out, _delay) = sensor.release();
    s0.done();
    s1.done();
    s2.done();
    s3.done();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LineFault;

struct FaultyLine;

impl ErrorType for FaultyLine {
    type Error = LineFault;
}

impl embedded_hal::digital::Error for LineFault {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}

impl OutputPin for FaultyLine {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Err(LineFault)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Err(LineFault)
    }
}

#[test]
fn line_errors_are_propagated() {
    let mut sensor = ColorSensor::new(
        FaultyLine,
        FaultyLine,
        FaultyLine,
        FaultyLine,
        FixedPulse(10),
        NoopDelay::new(),
    );

    assert_eq!(sensor.select_filter(Filter::Green), Err(SensorError::Pin(LineFault)));
    assert_eq!(sensor.read_red(), Err(SensorError::Pin(LineFault)));
    assert_eq!(sensor.begin(), Err(SensorError::Pin(LineFault)));
    assert!(sensor.calibrate_light().is_err());
}
