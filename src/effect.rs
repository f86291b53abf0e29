//! Per-effect transition rules and their transient state.
//!
//! Only the active effect carries state: [`EffectState`] holds one payload per
//! effect and is rebuilt whenever the effect changes, so an inactive effect
//! never advances. Each rule inspects the tick and returns a [`Drive`] telling
//! the channel what to do with its output.

use crate::config::Calibration;
use crate::fade::FadeDirection;
use crate::random::{RandomSource, draw};
use crate::time::{Millis, elapsed_or_max};
use crate::types::{Effect, Motion, Power};
use core::f32::consts::PI;

/// Strobe repetition period at flash rate zero.
pub const STROBE_PERIOD_MS: u32 = 1128;

/// Length of a strobe flash and of the Mars full-brightness hold.
pub const FLASH_DURATION_MS: u32 = 50;

/// Interval between beacon angle advances.
pub const BEACON_TICK_MS: u32 = 8;

/// Beacon sweep start angle, at the bottom of the sine.
pub const BEACON_START_ANGLE: f32 = PI * 1.5;

/// Beacon sweep end angle; one full turn after the start.
pub const BEACON_MAX_ANGLE: f32 = PI * 3.5;

/// Mars ramp step interval at flash rate zero.
pub const MARS_BASE_INTERVAL_MS: u32 = 44;

/// Ramp turns between Mars full-brightness flashes.
pub const MARS_TURNS: u8 = 3;

/// Level written when the Mars ramp restarts after a flash.
pub const MARS_RESTART_LEVEL: u8 = 5;

/// Upper bound of the flicker interval.
pub const FLICKER_BASE_INTERVAL_MS: u32 = 255;

/// Ditch light alternation interval at flash rate zero.
pub const DITCH_BASE_INTERVAL_MS: u32 = 1400;

/// Exclusive bound of the random effect's draws; probability is compared against them.
const RANDOM_DRAW_BOUND: u32 = 100;

/// What a rule wants done with the output this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Drive {
    /// Leave the output alone.
    Hold,
    /// Write a brightness directly, bypassing the fade overlay.
    Set(u8),
    /// Write a brightness and move the fade overlay there too.
    Snap(u8),
    /// Arm the fade overlay; write the bound directly when already there.
    Fade(FadeDirection),
}

/// Inputs a rule sees on one tick.
pub(crate) struct Tick<'a> {
    pub now: Millis,
    pub power: Power,
    pub motion: Motion,
    pub calibration: &'a Calibration,
}

/// Which half of a ditch light pair a channel is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DitchSide {
    A,
    B,
}

/// Alternation phase shared by both halves of a ditch light pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    A,
    B,
}

impl Phase {
    fn flip(self) -> Self {
        match self {
            Phase::A => Phase::B,
            Phase::B => Phase::A,
        }
    }
}

impl DitchSide {
    /// Phase in which this side shows full brightness.
    fn lit_phase(self) -> Phase {
        match self {
            DitchSide::A => Phase::A,
            DitchSide::B => Phase::B,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct StrobeState {
    last_flash: Option<Millis>,
    lit: bool,
}

impl StrobeState {
    fn step(&mut self, tick: &Tick<'_>) -> Drive {
        let cal = tick.calibration;
        let period = STROBE_PERIOD_MS - 2 * u32::from(cal.flash_rate());
        let elapsed = elapsed_or_max(tick.now, self.last_flash);

        if !self.lit && elapsed >= period {
            self.last_flash = Some(tick.now);
            self.lit = true;
        } else if self.lit && elapsed >= FLASH_DURATION_MS {
            self.lit = false;
        }

        Drive::Set(if self.lit { cal.bright() } else { 0 })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct RandomState {
    last_sample: Option<Millis>,
    lit: bool,
    draw: u32,
}

impl RandomState {
    fn step<R: RandomSource>(&mut self, tick: &Tick<'_>, rng: &mut R) -> Drive {
        let cal = tick.calibration;
        let threshold = cal.speed_threshold();

        if threshold != 0 && (tick.motion.speed < threshold || tick.motion.is_reverse()) {
            self.lit = true;
            self.last_sample = Some(tick.now);
            return Drive::Fade(FadeDirection::Rising);
        }

        if elapsed_or_max(tick.now, self.last_sample) < cal.sample_time_ms() {
            return Drive::Hold;
        }

        // The draw being compared was taken on the previous sample.
        let mut drive = Drive::Hold;
        if u32::from(cal.probability()) >= self.draw {
            self.lit = !self.lit;
            drive = Drive::Fade(if self.lit {
                FadeDirection::Rising
            } else {
                FadeDirection::Falling
            });
        }
        self.draw = draw(rng, 0, RANDOM_DRAW_BOUND);
        self.last_sample = Some(tick.now);
        drive
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct BeaconState {
    last_advance: Option<Millis>,
    angle: f32,
}

impl Default for BeaconState {
    fn default() -> Self {
        Self {
            last_advance: None,
            angle: BEACON_START_ANGLE,
        }
    }
}

impl BeaconState {
    fn step(&mut self, tick: &Tick<'_>) -> Drive {
        let cal = tick.calibration;

        if elapsed_or_max(tick.now, self.last_advance) >= BEACON_TICK_MS {
            self.last_advance = Some(tick.now);
            self.angle += cal.beacon_step();
        }
        if self.angle >= BEACON_MAX_ANGLE {
            self.angle = BEACON_START_ANGLE;
        }

        Drive::Set(beacon_level(self.angle, cal.bright()))
    }
}

/// Sine sweep between zero and `bright`, bottoming out at the start angle.
pub fn beacon_level(angle: f32, bright: u8) -> u8 {
    let half = f32::from(bright >> 1);
    let value = half + half * libm::sinf(angle);
    // Float to int casts saturate, so a tiny negative rounds to zero.
    (value as u8).min(bright)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct MarsState {
    last_step: Option<Millis>,
    level: u8,
    turns: u8,
    rising: bool,
    ramping: bool,
}

impl Default for MarsState {
    fn default() -> Self {
        Self {
            last_step: None,
            level: 0,
            turns: 0,
            rising: true,
            ramping: true,
        }
    }
}

impl MarsState {
    fn step(&mut self, tick: &Tick<'_>) -> Drive {
        let cal = tick.calibration;
        let ceiling = cal.bright() >> 3;
        let interval = MARS_BASE_INTERVAL_MS - u32::from(cal.flash_rate() >> 3);
        let elapsed = elapsed_or_max(tick.now, self.last_step);

        if self.ramping && elapsed >= interval {
            self.last_step = Some(tick.now);

            if self.rising {
                self.level = self.level.saturating_add(1);
            }
            if self.level > ceiling {
                self.level = ceiling;
                self.rising = false;
                self.turns = self.turns.saturating_add(1);
                if self.turns >= MARS_TURNS {
                    self.turns = 0;
                    self.ramping = false;
                }
            }
            if !self.rising {
                self.level = self.level.saturating_sub(1);
            }
            if self.level == 0 {
                self.rising = true;
                self.turns = self.turns.saturating_add(1);
            }

            if self.ramping {
                Drive::Set(self.level)
            } else {
                Drive::Set(cal.bright())
            }
        } else if !self.ramping && elapsed >= FLASH_DURATION_MS {
            self.ramping = true;
            Drive::Set(MARS_RESTART_LEVEL.min(cal.bright()))
        } else {
            Drive::Hold
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct FlickerState {
    last_change: Option<Millis>,
    interval: u32,
}

impl FlickerState {
    fn step<R: RandomSource>(&mut self, tick: &Tick<'_>, rng: &mut R) -> Drive {
        let cal = tick.calibration;

        if elapsed_or_max(tick.now, self.last_change) < self.interval {
            return Drive::Hold;
        }
        self.last_change = Some(tick.now);

        let level = draw(rng, u32::from(cal.dim()), u32::from(cal.bright()));
        let jitter = draw(rng, 0, u32::from(cal.flash_rate()));
        self.interval = FLICKER_BASE_INTERVAL_MS.saturating_sub(jitter);

        Drive::Set(u8::try_from(level).unwrap_or(u8::MAX))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct DitchState {
    side: DitchSide,
    phase: Phase,
    crossing: Option<Millis>,
    last_flash: Option<Millis>,
}

impl DitchState {
    fn new(side: DitchSide) -> Self {
        Self {
            side,
            phase: Phase::A,
            crossing: None,
            last_flash: None,
        }
    }

    fn activate(&mut self, now: Millis) {
        if self.crossing.is_none() {
            self.phase = Phase::A;
            self.last_flash = None;
        }
        self.crossing = Some(now);
    }

    fn expire(&mut self, now: Millis, holdover_ms: u32) -> bool {
        match self.crossing {
            Some(seen) if now.elapsed_since(seen) > holdover_ms => {
                self.crossing = None;
                true
            }
            _ => false,
        }
    }

    fn step(&mut self, tick: &Tick<'_>) -> Drive {
        let cal = tick.calibration;

        if self.crossing.is_none() {
            return Drive::Set(cal.bright());
        }

        let interval = DITCH_BASE_INTERVAL_MS - 4 * u32::from(cal.flash_rate());
        if elapsed_or_max(tick.now, self.last_flash) < interval {
            return Drive::Hold;
        }
        self.last_flash = Some(tick.now);

        let lit = self.phase == self.side.lit_phase();
        self.phase = self.phase.flip();
        Drive::Set(if lit { cal.bright() } else { cal.dim() })
    }
}

/// Transient state of whichever effect is active.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum EffectState {
    Normal,
    AutoDim,
    Random(RandomState),
    Strobe(StrobeState),
    Beacon(BeaconState),
    Mars(MarsState),
    Flicker(FlickerState),
    Ditch(DitchState),
}

impl EffectState {
    /// Fresh state for `effect`.
    pub(crate) fn new(effect: Effect) -> Self {
        match effect {
            Effect::Normal => EffectState::Normal,
            Effect::AutoDim => EffectState::AutoDim,
            Effect::Random => EffectState::Random(RandomState::default()),
            Effect::Strobe => EffectState::Strobe(StrobeState::default()),
            Effect::Beacon => EffectState::Beacon(BeaconState::default()),
            Effect::Mars => EffectState::Mars(MarsState::default()),
            Effect::Flicker => EffectState::Flicker(FlickerState::default()),
            Effect::DitchA => EffectState::Ditch(DitchState::new(DitchSide::A)),
            Effect::DitchB => EffectState::Ditch(DitchState::new(DitchSide::B)),
        }
    }

    pub(crate) fn effect(&self) -> Effect {
        match self {
            EffectState::Normal => Effect::Normal,
            EffectState::AutoDim => Effect::AutoDim,
            EffectState::Random(_) => Effect::Random,
            EffectState::Strobe(_) => Effect::Strobe,
            EffectState::Beacon(_) => Effect::Beacon,
            EffectState::Mars(_) => Effect::Mars,
            EffectState::Flicker(_) => Effect::Flicker,
            EffectState::Ditch(ditch) => match ditch.side {
                DitchSide::A => Effect::DitchA,
                DitchSide::B => Effect::DitchB,
            },
        }
    }

    /// Resets the transient state touched by an on/off transition.
    pub(crate) fn power_changed<R: RandomSource>(&mut self, power: Power, rng: &mut R) {
        match (self, power) {
            (EffectState::Random(random), Power::On) => {
                random.draw = draw(rng, 0, RANDOM_DRAW_BOUND);
            }
            (EffectState::Random(random), Power::Off) => {
                random.lit = false;
                random.last_sample = None;
            }
            (EffectState::Strobe(strobe), Power::Off) => {
                strobe.lit = false;
                strobe.last_flash = None;
            }
            (EffectState::Beacon(beacon), Power::Off) => {
                beacon.last_advance = None;
            }
            (EffectState::Mars(mars), Power::On) => {
                *mars = MarsState::default();
            }
            (EffectState::Flicker(flicker), Power::Off) => {
                *flicker = FlickerState::default();
            }
            (EffectState::Ditch(ditch), Power::Off) => {
                ditch.crossing = None;
                ditch.last_flash = None;
            }
            _ => {}
        }
    }

    /// Arms or refreshes the crossing. Returns true on first activation.
    ///
    /// Ignored by every effect except the ditch lights.
    pub(crate) fn activate_crossing(&mut self, now: Millis) -> bool {
        match self {
            EffectState::Ditch(ditch) => {
                let first = ditch.crossing.is_none();
                ditch.activate(now);
                first
            }
            _ => false,
        }
    }

    /// Clears the crossing once more than the holdover has passed since the last
    /// activation. Returns true when it did.
    pub(crate) fn expire_crossing(&mut self, now: Millis, holdover_ms: u32) -> bool {
        match self {
            EffectState::Ditch(ditch) => ditch.expire(now, holdover_ms),
            _ => false,
        }
    }

    pub(crate) fn is_crossing_active(&self) -> bool {
        matches!(self, EffectState::Ditch(DitchState { crossing: Some(_), .. }))
    }

    /// Evaluates the active rule for one tick.
    pub(crate) fn step<R: RandomSource>(&mut self, tick: &Tick<'_>, rng: &mut R) -> Drive {
        let cal = tick.calibration;
        let on = tick.power.is_on();

        match self {
            EffectState::Normal => {
                let (target, direction) = if on {
                    (cal.bright(), FadeDirection::Rising)
                } else {
                    (0, FadeDirection::Falling)
                };
                if cal.fade_rate() > 0 {
                    Drive::Fade(direction)
                } else {
                    Drive::Snap(target)
                }
            }
            EffectState::Random(random) => {
                if on {
                    random.step(tick, rng)
                } else {
                    random.lit = false;
                    Drive::Fade(FadeDirection::Falling)
                }
            }
            _ if !on => Drive::Set(0),
            EffectState::AutoDim => {
                if tick.motion.is_reverse() {
                    Drive::Set(cal.dim())
                } else {
                    Drive::Set(cal.bright())
                }
            }
            EffectState::Strobe(strobe) => strobe.step(tick),
            EffectState::Beacon(beacon) => beacon.step(tick),
            EffectState::Mars(mars) => mars.step(tick),
            EffectState::Flicker(flicker) => flicker.step(tick, rng),
            EffectState::Ditch(ditch) => ditch.step(tick),
        }
    }
}
