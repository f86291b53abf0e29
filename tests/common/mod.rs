//! Shared test infrastructure for dcc-led-effects integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use core::cell::Cell;
use dcc_led_effects::{Channel, LedOutput, Millis, RandomSource, TimeSource};

// ============================================================================
// Mock Output
// ============================================================================

/// Mock output that records every duty written
pub struct MockLed {
    duty: u8,
    history: heapless::Vec<u8, 256>,
}

impl MockLed {
    pub fn new() -> Self {
        Self {
            duty: 0,
            history: heapless::Vec::new(),
        }
    }

    pub fn last_duty(&self) -> u8 {
        self.duty
    }

    pub fn history(&self) -> &[u8] {
        &self.history
    }
}

impl LedOutput for MockLed {
    fn set_duty(&mut self, duty: u8) {
        self.duty = duty;
        let _ = self.history.push(duty);
    }
}

// ============================================================================
// Mock Time Source
// ============================================================================

/// Mock time source with controllable time advancement
pub struct MockTimeSource {
    current_time: Cell<Millis>,
}

impl MockTimeSource {
    pub fn new() -> Self {
        Self {
            current_time: Cell::new(Millis(0)),
        }
    }

    /// Advance time by the given number of milliseconds
    pub fn advance(&self, millis: u32) {
        self.current_time
            .set(self.current_time.get().wrapping_add(millis));
    }

    pub fn set_time(&self, millis: u32) {
        self.current_time.set(Millis(millis));
    }

    pub fn millis(&self) -> u32 {
        self.current_time.get().as_millis()
    }
}

impl TimeSource for MockTimeSource {
    fn now(&self) -> Millis {
        self.current_time.get()
    }
}

// ============================================================================
// Mock Random Source
// ============================================================================

/// Random source that replays a fixed script, then repeats its last value
pub struct ScriptedRng {
    values: heapless::Vec<u32, 32>,
    next: usize,
}

impl ScriptedRng {
    pub fn new(values: &[u32]) -> Self {
        let mut script = heapless::Vec::new();
        for &value in values {
            let _ = script.push(value);
        }
        Self {
            values: script,
            next: 0,
        }
    }

    /// Always returns the lower bound
    pub fn low() -> Self {
        Self::new(&[0])
    }
}

impl RandomSource for ScriptedRng {
    fn random_range(&mut self, lo: u32, hi: u32) -> u32 {
        let index = self.next.min(self.values.len().saturating_sub(1));
        self.next += 1;
        let value = self.values.get(index).copied().unwrap_or(lo);
        value.clamp(lo, hi.saturating_sub(1).max(lo))
    }
}

// ============================================================================
// Test Helper Functions
// ============================================================================

pub type TestChannel<'t> = Channel<'t, MockLed, MockTimeSource, ScriptedRng>;

/// Brightness behind an active-low duty
pub fn brightness(duty: u8) -> u8 {
    255 - duty
}

/// Builds an active-low channel with the given calibration bytes
pub fn channel_with<'t>(
    timer: &'t MockTimeSource,
    rng: ScriptedRng,
    config1: u8,
    config2: u8,
) -> TestChannel<'t> {
    let mut channel = Channel::new(MockLed::new(), timer, rng);
    channel.set_calibration(config1, config2);
    channel
}
