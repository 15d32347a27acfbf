//! Polynomial string fingerprints.
//!
//! `h0 = 0; hi = h(i-1) * 43 + byte_i`, wrapping, with no finalization step.
//! The same function keys both vocabulary segments and whole canonical
//! descriptions. It is weak on purpose: distinct inputs can collide and
//! colliding inputs are treated as the same thing.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Multiplier of the rolling hash.
pub const MULTIPLIER: u64 = 43;

/// Fingerprint of a segment or of a canonical description.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fingerprint(pub u64);

impl Fingerprint {
    /// Fingerprint a string. Usable in `const` items, which is how the
    /// vocabulary table is built.
    pub const fn of(text: &str) -> Self {
        Self::of_bytes(text.as_bytes())
    }

    /// Fingerprint raw bytes.
    pub const fn of_bytes(bytes: &[u8]) -> Self {
        let mut state = 0u64;
        let mut i = 0;
        while i < bytes.len() {
            state = state.wrapping_mul(MULTIPLIER).wrapping_add(bytes[i] as u64);
            i += 1;
        }
        Self(state)
    }

    /// Raw value.
    pub const fn value(self) -> u64 {
        self.0
    }

}

/// Zero-padded hex, e.g. `0x000000042728a7ad`.
impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

impl From<u64> for Fingerprint {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Incremental form of [`Fingerprint::of`], fed one byte at a time while
/// tokenizing.
#[derive(Debug, Clone, Copy, Default)]
pub struct FingerprintHasher {
    state: u64,
}

impl FingerprintHasher {
    /// Start from zero.
    pub const fn new() -> Self {
        Self { state: 0 }
    }

    /// Mix one byte.
    #[inline]
    pub fn push(&mut self, byte: u8) {
        self.state = self.state.wrapping_mul(MULTIPLIER).wrapping_add(u64::from(byte));
    }

    /// Mix a run of bytes.
    pub fn update(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.push(byte);
        }
    }

    /// Current fingerprint. The hasher can keep going afterwards.
    pub fn finish(&self) -> Fingerprint {
        Fingerprint(self.state)
    }
}
