//! Calibration bytes and the parameters derived from them.
//!
//! Each output is tuned by six configuration bytes. Two of them are packed:
//! `config1` carries the bright level (low nibble) and dim level (high nibble),
//! `config2` the fade rate (low nibble) and flash rate (high nibble). The
//! level nibbles go through [`LEVEL_TABLE`], a perceptual curve that spends
//! more of its sixteen entries on the dim end.

use core::f32::consts::TAU;

/// Perceptual brightness curve indexed by a 4-bit nibble.
pub const LEVEL_TABLE: [u8; 16] = [
    0, 2, 4, 8, 16, 24, 32, 56, 72, 88, 104, 120, 136, 168, 200, 255,
];

/// Brightness moved per fade overlay step.
pub const FADE_STEP: u8 = 2;

/// Scale from a rate nibble to a rate byte (`0x0f * 17 == 255`).
const RATE_SCALE: u8 = 17;

/// Beacon angle advanced per tick at the slowest flash rate, before scaling.
const BEACON_STEP_FACTOR: f32 = TAU * 0.008;

/// Looks up the brightness for a 4-bit nibble. Upper bits are ignored.
#[inline]
pub const fn level_from_nibble(nibble: u8) -> u8 {
    LEVEL_TABLE[(nibble & 0x0f) as usize]
}

#[inline]
const fn rate_from_nibble(nibble: u8) -> u8 {
    (nibble & 0x0f) * RATE_SCALE
}

/// Raw configuration bytes for one output, as stored in the decoder's CVs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Settings {
    /// Bright level (low nibble) and dim level (high nibble).
    pub config1: u8,

    /// Fade rate (low nibble) and flash rate (high nibble).
    pub config2: u8,

    /// Switching probability for the random effect, compared against draws in 0..100.
    pub probability: u8,

    /// Random effect sampling interval in seconds.
    pub sample_time: u8,

    /// Speed below which the random effect holds the light on.
    pub speed_threshold: u8,

    /// Crossing holdover in seconds.
    pub holdover_time: u8,
}

/// Parameters derived from [`Settings`], in the units the effects consume.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibration {
    bright: u8,
    dim: u8,
    fade_rate: u8,
    flash_rate: u8,
    fade_time_ms: u32,
    beacon_step: f32,
    probability: u8,
    sample_time_ms: u32,
    speed_threshold: u8,
    holdover_ms: u32,
}

impl Default for Calibration {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl Calibration {
    /// Derives every parameter from a full set of configuration bytes.
    pub fn from_settings(settings: &Settings) -> Self {
        let mut calibration = Self {
            bright: 0,
            dim: 0,
            fade_rate: 0,
            flash_rate: 0,
            fade_time_ms: 0,
            beacon_step: 0.0,
            probability: 0,
            sample_time_ms: 0,
            speed_threshold: 0,
            holdover_ms: 0,
        };
        calibration.set_calibration(settings.config1, settings.config2);
        calibration.set_probability(settings.probability);
        calibration.set_sample_time(settings.sample_time);
        calibration.set_speed_threshold(settings.speed_threshold);
        calibration.set_holdover_time(settings.holdover_time);
        calibration
    }

    /// Applies both packed calibration bytes.
    pub fn set_calibration(&mut self, config1: u8, config2: u8) {
        self.set_config1(config1);
        self.set_config2(config2);
    }

    /// Applies the bright/dim level byte.
    pub fn set_config1(&mut self, value: u8) {
        self.bright = level_from_nibble(value);
        self.dim = level_from_nibble(value >> 4);
        self.update_fade_time();
    }

    /// Applies the fade/flash rate byte.
    pub fn set_config2(&mut self, value: u8) {
        self.fade_rate = rate_from_nibble(value);
        self.flash_rate = rate_from_nibble(value >> 4);
        self.beacon_step = BEACON_STEP_FACTOR * (f32::from(self.flash_rate) * 0.002 + 0.74);
        self.update_fade_time();
    }

    pub fn set_probability(&mut self, value: u8) {
        self.probability = value;
    }

    /// Sets the random sampling interval, in seconds.
    pub fn set_sample_time(&mut self, value: u8) {
        self.sample_time_ms = u32::from(value) * 1000;
    }

    pub fn set_speed_threshold(&mut self, value: u8) {
        self.speed_threshold = value;
    }

    /// Sets the crossing holdover, in seconds.
    pub fn set_holdover_time(&mut self, value: u8) {
        self.holdover_ms = u32::from(value) * 1000;
    }

    // A full ramp takes bright / FADE_STEP steps; spreading 100 ms per rate
    // unit across them keeps the total ramp time proportional to the rate.
    fn update_fade_time(&mut self) {
        let steps = u32::from(self.bright / FADE_STEP);
        self.fade_time_ms = if steps == 0 {
            0
        } else {
            100 * u32::from(self.fade_rate) / steps
        };
    }

    /// Full brightness level.
    #[inline]
    pub fn bright(&self) -> u8 {
        self.bright
    }

    /// Reduced brightness level.
    #[inline]
    pub fn dim(&self) -> u8 {
        self.dim
    }

    /// Fade rate, 0 (instant) to 255.
    #[inline]
    pub fn fade_rate(&self) -> u8 {
        self.fade_rate
    }

    /// Flash rate, 0 (slowest) to 255.
    #[inline]
    pub fn flash_rate(&self) -> u8 {
        self.flash_rate
    }

    /// Delay between fade overlay steps.
    #[inline]
    pub fn fade_time_ms(&self) -> u32 {
        self.fade_time_ms
    }

    /// Beacon angle advance per 8 ms tick, in radians.
    #[inline]
    pub fn beacon_step(&self) -> f32 {
        self.beacon_step
    }

    #[inline]
    pub fn probability(&self) -> u8 {
        self.probability
    }

    #[inline]
    pub fn sample_time_ms(&self) -> u32 {
        self.sample_time_ms
    }

    #[inline]
    pub fn speed_threshold(&self) -> u8 {
        self.speed_threshold
    }

    #[inline]
    pub fn holdover_ms(&self) -> u32 {
        self.holdover_ms
    }
}
