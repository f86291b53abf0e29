//! Uniform random source abstraction.

/// Trait for abstracting the uniform random number generator.
///
/// Implement this for whatever entropy the target offers (hardware RNG, a
/// seeded PRNG, or a scripted sequence in tests).
pub trait RandomSource {
    /// Returns a uniformly distributed value in `[lo, hi)`.
    ///
    /// Callers only invoke this with `lo < hi`.
    fn random_range(&mut self, lo: u32, hi: u32) -> u32;
}

/// Draws from `rng`, returning `lo` when the range `[lo, hi)` is empty.
#[inline]
pub(crate) fn draw<R: RandomSource>(rng: &mut R, lo: u32, hi: u32) -> u32 {
    if hi <= lo {
        lo
    } else {
        rng.random_range(lo, hi).clamp(lo, hi - 1)
    }
}

/// Adapter that lets any [`rand::RngCore`] generator drive effects.
///
/// ```
/// use dcc_led_effects::RngSource;
/// use rand::SeedableRng;
/// use rand::rngs::SmallRng;
///
/// let rng = RngSource(SmallRng::seed_from_u64(7));
/// # let _ = rng;
/// ```
#[cfg(feature = "rand")]
#[derive(Debug, Clone)]
pub struct RngSource<R>(pub R);

#[cfg(feature = "rand")]
impl<R: rand::RngCore> RandomSource for RngSource<R> {
    fn random_range(&mut self, lo: u32, hi: u32) -> u32 {
        use rand::Rng;
        self.0.gen_range(lo..hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(u32);

    impl RandomSource for Fixed {
        fn random_range(&mut self, _lo: u32, _hi: u32) -> u32 {
            self.0
        }
    }

    #[test]
    fn empty_range_yields_lower_bound() {
        let mut rng = Fixed(99);
        assert_eq!(draw(&mut rng, 40, 40), 40);
        assert_eq!(draw(&mut rng, 40, 10), 40);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let mut rng = Fixed(500);
        assert_eq!(draw(&mut rng, 0, 100), 99);
    }

    #[cfg(feature = "rand")]
    #[test]
    fn rng_source_stays_in_range() {
        use rand::SeedableRng;
        let mut rng = RngSource(rand::rngs::SmallRng::seed_from_u64(3));
        for _ in 0..200 {
            let value = rng.random_range(10, 20);
            assert!((10..20).contains(&value));
        }
    }
}
