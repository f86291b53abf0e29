//! Time abstraction for platform-agnostic timing.
//!
//! Decoders usually expose a free-running 32-bit millisecond counter that wraps
//! after roughly 49 days. All elapsed-time math in this crate goes through
//! [`Millis::elapsed_since`], which tolerates that wraparound.

/// A point on a wrapping millisecond clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Millis(pub u32);

impl Millis {
    /// Creates an instant from a raw millisecond count.
    #[inline]
    pub const fn new(millis: u32) -> Self {
        Millis(millis)
    }

    /// Returns the raw millisecond count.
    #[inline]
    pub const fn as_millis(self) -> u32 {
        self.0
    }

    /// Milliseconds elapsed since `earlier`, wrapping-safe.
    #[inline]
    pub const fn elapsed_since(self, earlier: Millis) -> u32 {
        self.0.wrapping_sub(earlier.0)
    }

    /// Returns the instant `millis` after this one, wrapping on overflow.
    #[inline]
    pub const fn wrapping_add(self, millis: u32) -> Self {
        Millis(self.0.wrapping_add(millis))
    }
}

impl From<u32> for Millis {
    fn from(millis: u32) -> Self {
        Millis(millis)
    }
}

/// Trait for abstracting time sources.
pub trait TimeSource {
    /// Returns the current time instant.
    fn now(&self) -> Millis;
}

/// Milliseconds elapsed since an optional mark.
///
/// An unset mark counts as "long ago", so timers that were cleared fire on the
/// next tick.
#[inline]
pub(crate) fn elapsed_or_max(now: Millis, mark: Option<Millis>) -> u32 {
    match mark {
        Some(mark) => now.elapsed_since(mark),
        None => u32::MAX,
    }
}
