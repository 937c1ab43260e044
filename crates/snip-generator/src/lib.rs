pub mod random;

pub use random::{candidate, RandomGenerator, ALPHABET};
pub use snip_core::shortcode::CODE_LENGTH;

use snip_core::ShortCode;

/// Trait for generating candidate short codes.
///
/// Implementations are pure generators that don't interact with storage.
/// A generated code is only a candidate: whoever persists it must still
/// handle the case where storage already holds the same code.
pub trait Generator: Send + Sync + 'static {
    type Output: Into<ShortCode>;

    /// Draws the next candidate.
    fn generate(&self) -> Self::Output;
}
