use crate::Generator;
use rand::distr::{Alphanumeric, SampleString};
use snip_core::ShortCode;

/// Length of generated codes unless configured otherwise.
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Draws codes uniformly from the 62-symbol `[A-Za-z0-9]` alphabet.
///
/// The generator knows nothing about codes already in use, so collisions
/// are possible and must be handled by the caller.
#[derive(Debug, Clone)]
pub struct RandomGenerator {
    length: usize,
}

impl RandomGenerator {
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl Default for RandomGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_CODE_LENGTH)
    }
}

impl Generator for RandomGenerator {
    type Output = ShortCode;

    fn generate(&self) -> Self::Output {
        let code = Alphanumeric.sample_string(&mut rand::rng(), self.length);
        ShortCode::new_unchecked(code)
    }
}
