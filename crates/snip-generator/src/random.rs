use crate::Generator;
use parking_lot::Mutex;
use rand::distr::{Alphanumeric, Distribution};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use snip_core::shortcode::CODE_LENGTH;
use snip_core::ShortCode;

/// The 62 characters a short code is drawn from.
pub const ALPHABET: &[u8; 62] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Draws one candidate code from `rng`.
///
/// Each of the [`CODE_LENGTH`] characters is sampled uniformly from
/// [`ALPHABET`], giving 62^6 possible codes.
pub fn candidate<R: Rng + ?Sized>(rng: &mut R) -> ShortCode {
    let code: String = (0..CODE_LENGTH)
        .map(|_| char::from(Alphanumeric.sample(rng)))
        .collect();
    ShortCode::new_unchecked(code)
}

/// A random short code generator over an injectable RNG.
///
/// The default RNG is [`StdRng`] seeded from the operating system, which is
/// a CSPRNG, so codes are not predictable from earlier ones. Tests can pass
/// a seeded RNG to get a reproducible sequence.
#[derive(Debug)]
pub struct RandomGenerator<R = StdRng> {
    rng: Mutex<R>,
}

impl RandomGenerator<StdRng> {
    /// Creates a generator seeded from the operating system.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }
}

impl Default for RandomGenerator<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> RandomGenerator<R> {
    /// Creates a generator drawing from the given RNG.
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }
}

impl<R: Rng + Send + 'static> Generator for RandomGenerator<R> {
    type Output = ShortCode;

    fn generate(&self) -> Self::Output {
        candidate(&mut *self.rng.lock())
    }
}
