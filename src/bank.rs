use crate::channel::{Channel, LedOutput};
use crate::command::{ChannelAction, ChannelCommand};
use crate::random::RandomSource;
use crate::time::TimeSource;
use crate::types::Motion;
use heapless::Vec;

/// An identifier for a function output within a channel bank.
///
/// Users pick output IDs when adding channels, typically the decoder's
/// function output number, and use them to target commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutputId(pub u8);

impl From<u8> for OutputId {
    fn from(id: u8) -> Self {
        OutputId(id)
    }
}

impl From<OutputId> for u8 {
    fn from(id: OutputId) -> Self {
        id.0
    }
}

/// Errors that can occur during bank operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BankError {
    /// The specified output ID does not exist in the bank.
    UnknownOutputId(OutputId),

    /// Attempted to add a channel with an ID that already exists.
    DuplicateOutputId(OutputId),

    /// The bank is full and cannot accept more channels.
    BankFull,
}

impl core::fmt::Display for BankError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BankError::UnknownOutputId(id) => {
                write!(f, "output {} does not exist in bank", id.0)
            }
            BankError::DuplicateOutputId(id) => {
                write!(f, "output {} already exists in bank", id.0)
            }
            BankError::BankFull => {
                write!(f, "bank is full, cannot add more channels")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BankError {}

/// Manages the lighting channels of a multi-output decoder.
///
/// Routes commands to individual channels, heartbeats all of them in one call
/// and broadcasts grade crossing activation, so paired ditch lights on two
/// outputs start their alternation on the same tick.
///
/// # Type Parameters
/// * `'t` - Lifetime of the time source reference
/// * `L` - Output implementation type (must be same for all outputs in the bank)
/// * `T` - Time source implementation type
/// * `R` - Random source implementation type
/// * `MAX_OUTPUTS` - Maximum number of channels this bank can hold
pub struct ChannelBank<'t, L: LedOutput, T: TimeSource, R: RandomSource, const MAX_OUTPUTS: usize> {
    channels: Vec<(OutputId, Channel<'t, L, T, R>), MAX_OUTPUTS>,
    time_source: &'t T,
}

impl<'t, L, T, R, const MAX_OUTPUTS: usize> ChannelBank<'t, L, T, R, MAX_OUTPUTS>
where
    L: LedOutput,
    T: TimeSource,
    R: RandomSource,
{
    /// Creates a new empty bank.
    ///
    /// # Arguments
    /// * `time_source` - Reference to the time source used by all channels
    pub fn new(time_source: &'t T) -> Self {
        Self {
            channels: Vec::new(),
            time_source,
        }
    }

    /// Adds a channel for the given output. The output is forced off.
    ///
    /// # Errors
    /// * `DuplicateOutputId` - A channel with this ID already exists
    /// * `BankFull` - The bank already holds `MAX_OUTPUTS` channels
    pub fn add_channel(&mut self, id: OutputId, led: L, rng: R) -> Result<(), BankError> {
        if self.contains(id) {
            return Err(BankError::DuplicateOutputId(id));
        }

        let channel = Channel::new(led, self.time_source, rng);
        self.channels
            .push((id, channel))
            .map_err(|_| BankError::BankFull)?;

        #[cfg(feature = "defmt")]
        defmt::debug!("output {} added to bank", id.0);

        Ok(())
    }

    /// Routes a command to the addressed channel.
    ///
    /// # Errors
    /// Returns `UnknownOutputId` if the output does not exist in the bank.
    pub fn handle_command(&mut self, command: ChannelCommand) -> Result<(), BankError> {
        let channel = self.get_mut(command.output_id)?;
        channel.handle_action(command.action);
        Ok(())
    }

    /// Advances every channel by one tick.
    pub fn heartbeat_all(&mut self, motion: Motion) {
        for (_, channel) in self.channels.iter_mut() {
            channel.heartbeat(motion);
        }
    }

    /// Arms or refreshes the grade crossing on every channel.
    ///
    /// Channels not running a ditch light effect ignore it.
    pub fn activate_crossing(&mut self) {
        for (_, channel) in self.channels.iter_mut() {
            channel.handle_action(ChannelAction::ActivateCrossing);
        }
    }

    /// Returns the channel for the given output.
    ///
    /// # Errors
    /// Returns `UnknownOutputId` if the output does not exist in the bank.
    pub fn get(&self, id: OutputId) -> Result<&Channel<'t, L, T, R>, BankError> {
        self.channels
            .iter()
            .find(|(output, _)| *output == id)
            .map(|(_, channel)| channel)
            .ok_or(BankError::UnknownOutputId(id))
    }

    /// Returns the channel for the given output, mutably.
    ///
    /// # Errors
    /// Returns `UnknownOutputId` if the output does not exist in the bank.
    pub fn get_mut(&mut self, id: OutputId) -> Result<&mut Channel<'t, L, T, R>, BankError> {
        self.channels
            .iter_mut()
            .find(|(output, _)| *output == id)
            .map(|(_, channel)| channel)
            .ok_or(BankError::UnknownOutputId(id))
    }

    /// Returns the number of channels currently in the bank.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Returns true if the bank contains no channels.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Returns the maximum number of channels.
    pub fn capacity(&self) -> usize {
        MAX_OUTPUTS
    }

    /// Returns true if the bank contains a channel for the given output.
    pub fn contains(&self, id: OutputId) -> bool {
        self.channels.iter().any(|(output, _)| *output == id)
    }
}
