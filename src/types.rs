//! Core types shared by channels, effects and the bank.

/// Logical on/off command from the decoder's function mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Power {
    /// Output commanded off.
    #[default]
    Off,
    /// Output commanded on.
    On,
}

impl Power {
    /// Returns true for [`Power::On`].
    #[inline]
    pub fn is_on(self) -> bool {
        self == Power::On
    }
}

impl From<bool> for Power {
    fn from(on: bool) -> Self {
        if on { Power::On } else { Power::Off }
    }
}

/// Direction of travel as reported by the protocol layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}

/// Locomotive motion sampled once per tick.
///
/// Read-only input; channels never modify it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Motion {
    /// Current direction of travel.
    pub direction: Direction,

    /// Current speed step.
    pub speed: u8,
}

impl Motion {
    /// Creates a motion sample.
    #[inline]
    pub const fn new(direction: Direction, speed: u8) -> Self {
        Self { direction, speed }
    }

    /// Stationary, facing forward.
    pub const STOPPED: Motion = Motion::new(Direction::Forward, 0);

    /// Returns true when running in reverse.
    #[inline]
    pub fn is_reverse(&self) -> bool {
        self.direction == Direction::Reverse
    }
}

/// Lighting effect assigned to an output.
///
/// Discriminants match the effect numbers stored in the decoder's
/// configuration variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Effect {
    /// Steady light with optional fade in and out.
    #[default]
    Normal = 0,

    /// Headlight that dims when running in reverse.
    AutoDim = 1,

    /// Randomly switching light (cab or coach lighting), fading between states.
    Random = 2,

    /// Short flash once per period.
    Strobe = 3,

    /// Rotating beacon following a sine sweep.
    Beacon = 4,

    /// Oscillating Mars light.
    Mars = 5,

    /// Firebox or lantern flicker.
    Flicker = 6,

    /// Ditch light, first of an alternating pair.
    DitchA = 7,

    /// Ditch light, second of an alternating pair.
    DitchB = 8,
}

impl Effect {
    /// Every effect in configuration-variable order.
    pub const ALL: [Effect; 9] = [
        Effect::Normal,
        Effect::AutoDim,
        Effect::Random,
        Effect::Strobe,
        Effect::Beacon,
        Effect::Mars,
        Effect::Flicker,
        Effect::DitchA,
        Effect::DitchB,
    ];
}

impl From<Effect> for u8 {
    fn from(effect: Effect) -> Self {
        effect as u8
    }
}

impl TryFrom<u8> for Effect {
    type Error = EffectError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Effect::ALL
            .get(usize::from(value))
            .copied()
            .ok_or(EffectError::Unknown(value))
    }
}

/// Effect decoding errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EffectError {
    /// The configuration value does not name an effect.
    Unknown(u8),
}

impl core::fmt::Display for EffectError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            EffectError::Unknown(value) => {
                write!(f, "unknown effect number {}", value)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EffectError {}

/// Output polarity at the PWM pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// Low duty is bright: 0 = full brightness, 255 = off.
    #[default]
    ActiveLow,

    /// High duty is bright: 255 = full brightness, 0 = off.
    ActiveHigh,
}

impl Polarity {
    /// Converts a brightness (0 = off) into the duty written to the pin.
    #[inline]
    pub const fn duty(self, brightness: u8) -> u8 {
        match self {
            Polarity::ActiveLow => 255 - brightness,
            Polarity::ActiveHigh => brightness,
        }
    }
}
