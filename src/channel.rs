//! Lighting channel with effect selection, fade overlay and output control.
//!
//! Provides [`Channel`] which drives a single decoder output through one of the
//! [`Effect`]s, and the [`LedOutput`] trait for hardware abstraction.

use crate::command::ChannelAction;
use crate::config::{Calibration, Settings};
use crate::effect::{Drive, EffectState, Tick};
use crate::fade::{FadeDirection, FadeOverlay};
use crate::random::RandomSource;
use crate::time::TimeSource;
use crate::types::{Effect, Motion, Polarity, Power};

/// Trait for abstracting the PWM output behind a decoder function.
///
/// Implement this for your hardware (timer PWM channel, LED driver, etc.) to
/// allow the channel to control it.
pub trait LedOutput {
    /// Writes a PWM duty cycle.
    ///
    /// The duty already accounts for the channel's [`Polarity`]; with the
    /// default active-low wiring 0 is full brightness and 255 is off. Handle
    /// any hardware errors internally - this method cannot fail.
    fn set_duty(&mut self, duty: u8);
}

/// Drives a single decoder output through a lighting effect.
///
/// Each channel owns its output and random source and reads a shared time
/// source. [`heartbeat`](Channel::heartbeat) must be called once per scheduler
/// cycle; it never blocks and is the only operation that writes the output
/// after construction.
///
/// # Type Parameters
/// * `'t` - Lifetime of the time source reference
/// * `L` - Output implementation type
/// * `T` - Time source implementation type
/// * `R` - Random source implementation type
pub struct Channel<'t, L: LedOutput, T: TimeSource, R: RandomSource> {
    led: L,
    time_source: &'t T,
    rng: R,
    polarity: Polarity,
    power: Power,
    state: EffectState,
    calibration: Calibration,
    fade: FadeOverlay,
    duty: u8,
}

impl<'t, L: LedOutput, T: TimeSource, R: RandomSource> Channel<'t, L, T, R> {
    /// Creates an active-low channel running [`Effect::Normal`], with the output off.
    pub fn new(led: L, time_source: &'t T, rng: R) -> Self {
        Self::with_polarity(led, time_source, rng, Polarity::ActiveLow)
    }

    /// Creates a channel for the given output wiring, with the output off.
    pub fn with_polarity(mut led: L, time_source: &'t T, rng: R, polarity: Polarity) -> Self {
        let duty = polarity.duty(0);
        led.set_duty(duty);

        Self {
            led,
            time_source,
            rng,
            polarity,
            power: Power::Off,
            state: EffectState::new(Effect::Normal),
            calibration: Calibration::default(),
            fade: FadeOverlay::new(),
            duty,
        }
    }

    /// Handles a channel action by dispatching to the appropriate method.
    pub fn handle_action(&mut self, action: ChannelAction) {
        match action {
            ChannelAction::SetState(power) => self.set_state(power),
            ChannelAction::SetEffect(effect) => self.set_effect(effect),
            ChannelAction::SetCalibration { config1, config2 } => {
                self.set_calibration(config1, config2)
            }
            ChannelAction::SetProbability(value) => self.set_probability(value),
            ChannelAction::SetSampleTime(value) => self.set_sample_time(value),
            ChannelAction::SetSpeedThreshold(value) => self.set_speed_threshold(value),
            ChannelAction::SetHoldoverTime(value) => self.set_holdover_time(value),
            ChannelAction::ActivateCrossing => self.activate_crossing(),
        }
    }

    /// Sets the logical on/off command.
    ///
    /// No-op when unchanged. Turning on drops any pending fade so the active
    /// effect decides afresh on the next tick; turning off clears the effect's
    /// timers, latches and crossing.
    pub fn set_state(&mut self, power: Power) {
        if self.power == power {
            return;
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("channel {} -> {}", self.state.effect(), power);

        if power.is_on() {
            self.fade.cancel();
        }
        self.state.power_changed(power, &mut self.rng);
        self.power = power;
    }

    /// Switches to another effect, forcing the channel off.
    ///
    /// Transient state of the previous effect is discarded along with any
    /// in-flight fade; the output settles to off on the next tick.
    pub fn set_effect(&mut self, effect: Effect) {
        #[cfg(feature = "defmt")]
        defmt::debug!("effect {} -> {}", self.state.effect(), effect);

        self.power = Power::Off;
        self.state = EffectState::new(effect);
        self.fade.reset();
    }

    /// Applies both packed calibration bytes.
    pub fn set_calibration(&mut self, config1: u8, config2: u8) {
        self.calibration.set_calibration(config1, config2);
        self.fade.clamp_to(self.calibration.bright());
    }

    /// Applies the bright/dim level byte.
    pub fn set_config1(&mut self, value: u8) {
        self.calibration.set_config1(value);
        self.fade.clamp_to(self.calibration.bright());
    }

    /// Applies the fade/flash rate byte.
    pub fn set_config2(&mut self, value: u8) {
        self.calibration.set_config2(value);
    }

    /// Sets the random effect's switching probability (compared against 0..100).
    pub fn set_probability(&mut self, value: u8) {
        self.calibration.set_probability(value);
    }

    /// Sets the random effect's sampling interval, in seconds.
    pub fn set_sample_time(&mut self, value: u8) {
        self.calibration.set_sample_time(value);
    }

    /// Sets the speed below which the random effect holds the light on. Zero disables.
    pub fn set_speed_threshold(&mut self, value: u8) {
        self.calibration.set_speed_threshold(value);
    }

    /// Sets how long a crossing stays active after its last activation, in seconds.
    pub fn set_holdover_time(&mut self, value: u8) {
        self.calibration.set_holdover_time(value);
    }

    /// Applies a full set of configuration bytes.
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.calibration = Calibration::from_settings(settings);
        self.fade.clamp_to(self.calibration.bright());
    }

    /// Arms or refreshes the grade crossing for ditch light effects.
    ///
    /// Other effects ignore the call.
    pub fn activate_crossing(&mut self) {
        let now = self.time_source.now();
        if self.state.activate_crossing(now) {
            #[cfg(feature = "defmt")]
            defmt::debug!("crossing armed at {}", now.as_millis());
        }
    }

    /// Advances the active effect and the fade overlay by one tick.
    ///
    /// `motion` is the locomotive's current direction and speed.
    pub fn heartbeat(&mut self, motion: Motion) {
        let now = self.time_source.now();

        if self.state.expire_crossing(now, self.calibration.holdover_ms()) {
            #[cfg(feature = "defmt")]
            defmt::debug!("crossing cleared at {}", now.as_millis());
        }

        let tick = Tick {
            now,
            power: self.power,
            motion,
            calibration: &self.calibration,
        };
        let bright = self.calibration.bright();

        match self.state.step(&tick, &mut self.rng) {
            Drive::Hold => {}
            Drive::Set(level) => self.write(level),
            Drive::Snap(level) => {
                self.fade.snap(level);
                self.write(level);
            }
            Drive::Fade(FadeDirection::Rising) => {
                if !self.fade.request_rise(bright) {
                    self.write(self.fade.level());
                }
            }
            Drive::Fade(FadeDirection::Falling) => {
                if !self.fade.request_fall() {
                    self.write(0);
                }
            }
        }

        if let Some(level) = self.fade.advance(now, self.calibration.fade_time_ms(), bright) {
            #[cfg(feature = "defmt")]
            defmt::trace!("fade level {}", level);
            self.write(level);
        }
    }

    // Update the output only if the duty changed
    fn write(&mut self, brightness: u8) {
        let duty = self.polarity.duty(brightness);
        if duty != self.duty {
            self.led.set_duty(duty);
            self.duty = duty;
        }
    }

    /// Returns the logical on/off command.
    pub fn state(&self) -> Power {
        self.power
    }

    /// Returns the active effect.
    pub fn effect(&self) -> Effect {
        self.state.effect()
    }

    /// Returns the duty last written to the output.
    pub fn output(&self) -> u8 {
        self.duty
    }

    /// Returns the brightness last written, independent of polarity.
    pub fn brightness(&self) -> u8 {
        self.polarity.duty(self.duty)
    }

    /// Returns the fade overlay's current level.
    pub fn fade_level(&self) -> u8 {
        self.fade.level()
    }

    /// Returns the pending fade direction, if any.
    pub fn fade_request(&self) -> Option<FadeDirection> {
        self.fade.request()
    }

    /// Returns true while a grade crossing keeps ditch lights alternating.
    pub fn is_crossing_active(&self) -> bool {
        self.state.is_crossing_active()
    }

    /// Returns the parameters derived from the configuration bytes.
    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// Returns the output's wiring polarity.
    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Returns a reference to the output.
    pub fn led(&self) -> &L {
        &self.led
    }
}
