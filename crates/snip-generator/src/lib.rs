pub mod random;
pub mod seq;

use snip_core::ShortCode;

pub use random::RandomGenerator;
pub use seq::SeqGenerator;

/// Trait for generating short codes.
///
/// Implementations are pure generators that don't interact with storage.
/// The mapping service owns the uniqueness check and asks for a new code on
/// every collision.
pub trait Generator: Send + Sync + 'static {
    type Output: Into<ShortCode>;

    /// Generates a candidate short code.
    fn generate(&self) -> Self::Output;
}
