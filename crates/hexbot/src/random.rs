use rand::{Rng, SeedableRng, rng, rngs::StdRng};

/// A source of uniform randomness consumed by the synthesizer.
///
/// This abstraction allows you to plug in a real random source or a
/// deterministic one in tests. Every worker owns its own instance, so
/// implementations need to be [`Send`] but never [`Sync`].
///
/// # Example
/// ```
/// use hexbot::RandSource;
///
/// struct Fixed;
/// impl RandSource for Fixed {
///     fn rand_below(&mut self, _upper: u32) -> u32 {
///         0
///     }
///     fn rand_unit(&mut self) -> f64 {
///         0.5
///     }
/// }
///
/// let mut rng = Fixed;
/// assert_eq!(rng.rand_below(10), 0);
/// assert_eq!(rng.rand_range(-30.0, 30.0), 0.0);
/// ```
pub trait RandSource {
    /// Returns an integer drawn uniformly from `[0, upper)`.
    ///
    /// `upper` is always non-zero when called by this crate.
    fn rand_below(&mut self, upper: u32) -> u32;

    /// Returns a float drawn uniformly from `[0, 1)`.
    fn rand_unit(&mut self) -> f64;

    /// Returns a float drawn uniformly from `[low, high)`.
    fn rand_range(&mut self, low: f64, high: f64) -> f64 {
        low + self.rand_unit() * (high - low)
    }
}

impl<R: RandSource + ?Sized> RandSource for &mut R {
    fn rand_below(&mut self, upper: u32) -> u32 {
        (**self).rand_below(upper)
    }

    fn rand_unit(&mut self) -> f64 {
        (**self).rand_unit()
    }
}

/// A `RandSource` that uses the thread-local RNG (`rand::rng()`).
///
/// Each OS thread has its own RNG instance, so workers running on different
/// threads never contend. This type does **not** store the RNG itself; it
/// accesses the thread-local generator on each call, which makes it freely
/// movable into worker tasks.
#[derive(Default, Clone, Copy, Debug)]
pub struct ThreadRandom;

impl RandSource for ThreadRandom {
    fn rand_below(&mut self, upper: u32) -> u32 {
        rng().random_range(0..upper)
    }

    fn rand_unit(&mut self) -> f64 {
        rng().random()
    }
}

/// A reproducible `RandSource` backed by a seeded [`StdRng`].
///
/// Two instances built from the same seed yield the same sequence on the same
/// platform and `rand` version.
#[derive(Clone, Debug)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandSource for SeededRandom {
    fn rand_below(&mut self, upper: u32) -> u32 {
        self.rng.random_range(0..upper)
    }

    fn rand_unit(&mut self) -> f64 {
        self.rng.random()
    }
}
