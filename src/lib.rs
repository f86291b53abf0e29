#![cfg_attr(not(feature = "std"), no_std)]
#![doc = include_str!("../README.md")]

//! # Core Concepts
//!
//! - **`Channel`**: Drives a single decoder output through one lighting effect
//! - **`Effect`**: The nine selectable effects (Normal, AutoDim, Random, Strobe, Beacon, Mars, Flicker, DitchA, DitchB)
//! - **`Power`**: The logical on/off command from the function mapping
//! - **`Motion`**: Direction and speed sampled from the protocol layer each tick
//! - **`Calibration`**: Levels, rates and timings derived from the configuration bytes
//! - **`Settings`**: The raw configuration bytes for one output
//! - **`LedOutput`**: Trait to implement for your PWM hardware
//! - **`TimeSource`**: Trait to implement for your millisecond clock
//! - **`RandomSource`**: Trait to implement for your random number generator
//! - **`ChannelBank`**: Fixed-capacity set of channels for a multi-output decoder
//! - **`ChannelAction`**: Commands that can be sent to control channels
//!
//! Effects compute brightness with 0 as off and 255 as full. The output's
//! [`Polarity`] converts that into the duty written to [`LedOutput`]; the
//! default active-low wiring inverts it, so 0 is full brightness at the pin.

pub mod time;
pub mod types;
pub mod random;
pub mod config;
pub mod fade;
pub mod effect;
pub mod channel;
pub mod command;
pub mod bank;

pub use bank::{BankError, ChannelBank, OutputId};
pub use channel::{Channel, LedOutput};
pub use command::{ChannelAction, ChannelCommand};
pub use config::{Calibration, LEVEL_TABLE, Settings};
pub use fade::FadeDirection;
pub use random::RandomSource;
#[cfg(feature = "rand")]
pub use random::RngSource;
pub use time::{Millis, TimeSource};
pub use types::{Direction, Effect, EffectError, Motion, Polarity, Power};
