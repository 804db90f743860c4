//! Random number generation.
//!
//! Every simulation in `coalseq` draws from an explicit
//! random number stream passed in by the caller.
//! There is no process-wide generator, so independent
//! replicates may run concurrently and each replicate
//! is reproducible from its seed.
//!
//! * [`Rng`] is a seeded stream.
//! * [`CoalescentRng`] is the set of draws a simulation needs.
//!   It is implemented for every [`rand::Rng`].
//! * [`SeedSequence`] derives one seed per replicate
//!   from a single master seed.

use rand::rngs::StdRng;
use rand::{Rng as _, RngCore, SeedableRng};
use rand_distr::Exp;

/// A random number generator.
///
/// This is a newtype wrapper around
/// [`rand::rngs::StdRng`].  The stream is fully
/// determined by the seed passed to [`Rng::new`].
///
/// # Example
///
/// ```
/// use coalseq_rng::CoalescentRng;
///
/// let mut a = coalseq_rng::Rng::new(42);
/// let mut b = coalseq_rng::Rng::new(42);
/// assert_eq!(a.exponential(1.0), b.exponential(1.0));
/// ```
#[derive(Clone, Debug)]
#[repr(transparent)]
pub struct Rng(StdRng);

impl Rng {
    /// Create a new [`Rng`] with a seed.
    pub fn new(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

/// Provide access to the underlying rng type
/// wrapped by [`Rng`].
pub trait UnderlyingRngAccess {
    /// The wrapped type
    type UnderlyingRng;
    /// Get a reference to the underlying rng
    fn as_underlying_ref(&self) -> &Self::UnderlyingRng;
    /// Get a mutable reference to the underlying rng
    fn as_underlying_mut_ref(&mut self) -> &mut Self::UnderlyingRng;
}

impl UnderlyingRngAccess for Rng {
    type UnderlyingRng = StdRng;
    fn as_underlying_ref(&self) -> &Self::UnderlyingRng {
        &self.0
    }
    fn as_underlying_mut_ref(&mut self) -> &mut Self::UnderlyingRng {
        &mut self.0
    }
}

impl RngCore for Rng {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }

    #[inline]
    fn fill_bytes(&mut self, dst: &mut [u8]) {
        self.0.fill_bytes(dst)
    }
}

/// The random draws needed by the coalescent generators.
pub trait CoalescentRng {
    /// A uniform integer in `[0, upper)`.
    ///
    /// # Panics
    ///
    /// If `upper == 0`.
    fn uniform_index(&mut self, upper: usize) -> usize;

    /// A uniform deviate in `[0, 1)`.
    fn uniform(&mut self) -> f64;

    /// An exponential waiting time with the given `rate`.
    ///
    /// A `rate` that is not strictly positive describes an
    /// event that never happens: the return value is
    /// [`f64::INFINITY`] and no randomness is consumed.
    fn exponential(&mut self, rate: f64) -> f64;
}

impl<R: rand::Rng + ?Sized> CoalescentRng for R {
    #[inline]
    fn uniform_index(&mut self, upper: usize) -> usize {
        self.random_range(0..upper)
    }

    #[inline]
    fn uniform(&mut self) -> f64 {
        self.random::<f64>()
    }

    fn exponential(&mut self, rate: f64) -> f64 {
        // NaN fails this comparison, too
        if !(rate > 0.0) {
            return f64::INFINITY;
        }
        match Exp::new(rate) {
            Ok(dist) => self.sample(dist),
            Err(_) => f64::INFINITY,
        }
    }
}

/// An endless stream of seeds derived from a master seed.
///
/// Use one seed per replicate so that replicates are
/// independent of each other and of the order
/// in which they are run.
///
/// # Example
///
/// ```
/// let seeds = coalseq_rng::SeedSequence::new(101)
///     .take(3)
///     .collect::<Vec<_>>();
/// let again = coalseq_rng::SeedSequence::new(101)
///     .take(3)
///     .collect::<Vec<_>>();
/// assert_eq!(seeds, again);
/// ```
#[derive(Clone, Debug)]
pub struct SeedSequence {
    rng: StdRng,
}

impl SeedSequence {
    /// Create a new sequence from a master seed.
    pub fn new(master_seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(master_seed),
        }
    }

    /// Return a fresh [`Rng`] seeded with the next seed.
    pub fn next_rng(&mut self) -> Rng {
        Rng::new(self.rng.random())
    }
}

impl Iterator for SeedSequence {
    type Item = u64;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.rng.random())
    }
}
