//! Command-based control for channels.

use crate::bank::OutputId;
use crate::types::{Effect, Power};

/// Actions for controlling channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelAction {
    /// Set the on/off command.
    SetState(Power),
    /// Switch effect (forces off).
    SetEffect(Effect),
    /// Apply both packed calibration bytes.
    SetCalibration { config1: u8, config2: u8 },
    /// Set random switching probability.
    SetProbability(u8),
    /// Set random sampling interval, in seconds.
    SetSampleTime(u8),
    /// Set the random effect's speed threshold.
    SetSpeedThreshold(u8),
    /// Set crossing holdover, in seconds.
    SetHoldoverTime(u8),
    /// Arm or refresh the grade crossing.
    ActivateCrossing,
}

/// Command targeting a specific output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelCommand {
    pub output_id: OutputId,
    pub action: ChannelAction,
}

impl ChannelCommand {
    /// Creates command.
    pub fn new(output_id: OutputId, action: ChannelAction) -> Self {
        Self { output_id, action }
    }
}
