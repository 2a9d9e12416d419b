//! Shared test infrastructure for tcs3200 integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};
use tcs3200::{ColorSensor, Filter, Level, PulseInput};

// ============================================================================
// Simulated sensor bus
// ============================================================================

/// Line indices into [`Bus::lines`].
pub const S0: usize = 0;
pub const S1: usize = 1;
pub const S2: usize = 2;
pub const S3: usize = 3;

/// State shared between the mock lines, pulse input and delay.
#[derive(Debug, Default)]
pub struct Bus {
    /// Current level of S0-S3, `true` meaning high.
    pub lines: [bool; 4],
    /// Pulse width returned for each filter, indexed by filter code.
    pub pulses: [u32; 4],
    /// Number of pulse measurements taken.
    pub samples: u32,
    /// Every line write as `(line, level)`.
    pub writes: Vec<(usize, bool)>,
    /// Total delay requested, in nanoseconds.
    pub delay_ns: u64,
    /// Last timeout handed to the pulse input.
    pub last_timeout_us: u32,
    /// Filter active at each measurement.
    pub measured: Vec<Filter>,
}

impl Bus {
    /// Filter currently routed by S2/S3.
    pub fn selected_filter(&self) -> Filter {
        match (self.lines[S2], self.lines[S3]) {
            (false, false) => Filter::Red,
            (true, true) => Filter::Green,
            (false, true) => Filter::Blue,
            (true, false) => Filter::Clear,
        }
    }
}

/// Handle to the simulated bus.
#[derive(Debug, Clone, Default)]
pub struct SharedBus(Rc<RefCell<Bus>>);

impl SharedBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the pulse width seen under each filter.
    pub fn set_pulses(&self, red: u32, green: u32, blue: u32, clear: u32) {
        self.0.borrow_mut().pulses = [red, green, blue, clear];
    }

    /// Sets pulses so an uncalibrated read yields `(red, green, blue)`.
    pub fn set_uncalibrated_rgb(&self, red: u8, green: u8, blue: u8) {
        self.set_pulses(
            255 - red as u32,
            255 - green as u32,
            255 - blue as u32,
            0,
        );
    }

    pub fn samples(&self) -> u32 {
        self.0.borrow().samples
    }

    pub fn lines(&self) -> [bool; 4] {
        self.0.borrow().lines
    }

    pub fn writes(&self) -> Vec<(usize, bool)> {
        self.0.borrow().writes.clone()
    }

    pub fn delay_us(&self) -> u64 {
        self.0.borrow().delay_ns / 1_000
    }

    pub fn last_timeout_us(&self) -> u32 {
        self.0.borrow().last_timeout_us
    }

    pub fn selected_filter(&self) -> Filter {
        self.0.borrow().selected_filter()
    }

    pub fn measured(&self) -> Vec<Filter> {
        self.0.borrow().measured.clone()
    }

    /// Forgets recorded writes, samples and delays.
    pub fn reset_log(&self) {
        let mut bus = self.0.borrow_mut();
        bus.writes.clear();
        bus.measured.clear();
        bus.samples = 0;
        bus.delay_ns = 0;
    }

    pub fn line(&self, index: usize) -> MockLine {
        MockLine {
            bus: self.clone(),
            index,
        }
    }

    pub fn out(&self) -> MockOut {
        MockOut { bus: self.clone() }
    }

    pub fn delay(&self) -> MockDelay {
        MockDelay { bus: self.clone() }
    }
}

// ============================================================================
// Mock hardware
// ============================================================================

/// Mock select line that writes into the shared bus.
pub struct MockLine {
    bus: SharedBus,
    index: usize,
}

impl MockLine {
    fn set(&mut self, level: bool) {
        let mut bus = self.bus.0.borrow_mut();
        bus.lines[self.index] = level;
        bus.writes.push((self.index, level));
    }
}

impl ErrorType for MockLine {
    type Error = Infallible;
}

impl OutputPin for MockLine {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set(true);
        Ok(())
    }
}

/// Mock OUT line returning the pulse configured for the selected filter.
pub struct MockOut {
    bus: SharedBus,
}

impl PulseInput for MockOut {
    fn pulse_width_us(&mut self, level: Level, timeout_us: u32) -> u32 {
        assert_eq!(level, Level::Low, "intensity is carried by the LOW phase");

        let mut bus = self.bus.0.borrow_mut();
        let filter = bus.selected_filter();
        bus.samples += 1;
        bus.last_timeout_us = timeout_us;
        bus.measured.push(filter);
        bus.pulses[filter.code() as usize]
    }
}

/// Mock delay accumulating requested time instead of sleeping.
pub struct MockDelay {
    bus: SharedBus,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.bus.0.borrow_mut().delay_ns += ns as u64;
    }

    fn delay_us(&mut self, us: u32) {
        self.bus.0.borrow_mut().delay_ns += us as u64 * 1_000;
    }

    fn delay_ms(&mut self, ms: u32) {
        self.bus.0.borrow_mut().delay_ns += ms as u64 * 1_000_000;
    }
}

pub type TestSensor<'a> = ColorSensor<'a, MockLine, MockOut, MockDelay>;

/// Builds a sensor wired to `bus`, without calling `begin`.
pub fn new_sensor<'a>(bus: &SharedBus) -> TestSensor<'a> {
    ColorSensor::new(
        bus.line(S0),
        bus.line(S1),
        bus.line(S2),
        bus.line(S3),
        bus.out(),
        bus.delay(),
    )
}

// ============================================================================
// Test Helper Functions
// ============================================================================

/// Compare two floats with tolerance
pub fn approx_eq(a: f32, b: f32, epsilon: f32) -> bool {
    (a - b).abs() < epsilon
}
