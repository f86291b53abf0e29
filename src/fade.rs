//! Brightness ramp shared by the fading effects.
//!
//! Effects request a direction; the overlay moves its level by
//! [`FADE_STEP`](crate::config::FADE_STEP) every `fade_time_ms` until the
//! bound is reached, then drops the request.

use crate::config::FADE_STEP;
use crate::time::{Millis, elapsed_or_max};

/// Direction of a pending ramp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FadeDirection {
    /// Ramping towards the bright level.
    Rising,
    /// Ramping towards zero.
    Falling,
}

/// Ramp state for one channel.
///
/// Level is always within `[0, ceiling]` where the ceiling is the bright
/// level of the owning channel. At most one direction is pending at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FadeOverlay {
    level: u8,
    request: Option<FadeDirection>,
    last_step: Option<Millis>,
}

impl FadeOverlay {
    /// Creates a resting overlay at level zero.
    pub const fn new() -> Self {
        Self {
            level: 0,
            request: None,
            last_step: None,
        }
    }

    /// Current ramp position.
    #[inline]
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Pending ramp direction, if any.
    #[inline]
    pub fn request(&self) -> Option<FadeDirection> {
        self.request
    }

    /// Returns true while a rising ramp is pending.
    #[inline]
    pub fn is_rising(&self) -> bool {
        self.request == Some(FadeDirection::Rising)
    }

    /// Returns true while a falling ramp is pending.
    #[inline]
    pub fn is_falling(&self) -> bool {
        self.request == Some(FadeDirection::Falling)
    }

    /// Requests a ramp up unless the level already sits at `ceiling`.
    ///
    /// Returns true when the request is armed.
    pub fn request_rise(&mut self, ceiling: u8) -> bool {
        if self.level < ceiling {
            self.request = Some(FadeDirection::Rising);
            true
        } else {
            false
        }
    }

    /// Requests a ramp down unless the level is already zero.
    ///
    /// Returns true when the request is armed.
    pub fn request_fall(&mut self) -> bool {
        if self.level > 0 {
            self.request = Some(FadeDirection::Falling);
            true
        } else {
            false
        }
    }

    /// Jumps straight to `level`, dropping any pending ramp.
    pub fn snap(&mut self, level: u8) {
        self.level = level;
        self.request = None;
    }

    /// Drops any pending ramp without moving the level.
    pub fn cancel(&mut self) {
        self.request = None;
    }

    /// Returns to level zero with nothing pending.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Pulls the level down after the ceiling shrank.
    pub fn clamp_to(&mut self, ceiling: u8) {
        self.level = self.level.min(ceiling);
    }

    /// Advances a pending ramp by one step if `fade_time_ms` has elapsed.
    ///
    /// Returns the new level when a step was taken, so the caller can write it.
    pub fn advance(&mut self, now: Millis, fade_time_ms: u32, ceiling: u8) -> Option<u8> {
        let direction = self.request?;

        if elapsed_or_max(now, self.last_step) < fade_time_ms {
            return None;
        }
        self.last_step = Some(now);

        match direction {
            FadeDirection::Rising => {
                self.level = self.level.saturating_add(FADE_STEP).min(ceiling);
                if self.level >= ceiling {
                    self.request = None;
                }
            }
            FadeDirection::Falling => {
                self.level = self.level.saturating_sub(FADE_STEP).min(ceiling);
                if self.level == 0 {
                    self.request = None;
                }
            }
        }

        Some(self.level)
    }
}
