use crate::Generator;
use snip_core::ShortCode;
use std::sync::atomic::{AtomicU64, Ordering};

const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Walks the code space in order: `000000`, `000001`, ..., `00000z`, `000010`.
///
/// Uses the same alphabet as [`RandomGenerator`](crate::RandomGenerator), so
/// its output is indistinguishable in shape from random codes, just
/// predictable. Counters past `62^width` grow wider instead of wrapping.
#[derive(Debug)]
pub struct SeqGenerator {
    next: AtomicU64,
    width: usize,
}

impl SeqGenerator {
    pub fn new(width: usize) -> Self {
        Self::starting_at(width, 0)
    }

    pub fn starting_at(width: usize, start: u64) -> Self {
        Self {
            next: AtomicU64::new(start),
            width,
        }
    }
}

fn encode(mut n: u64, width: usize) -> String {
    let mut digits = Vec::with_capacity(width.max(1));
    loop {
        digits.push(ALPHABET[(n % 62) as usize]);
        n /= 62;
        if n == 0 {
            break;
        }
    }
    while digits.len() < width {
        digits.push(b'0');
    }
    digits.reverse();
    digits.into_iter().map(char::from).collect()
}

impl Generator for SeqGenerator {
    type Output = ShortCode;

    fn generate(&self) -> Self::Output {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        ShortCode::new_unchecked(encode(n, self.width))
    }
}
