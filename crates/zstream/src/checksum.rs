//! Adler-32 accumulator used to identify preset dictionaries.
//!
//! zlib streams that were compressed with a preset dictionary carry the
//! Adler-32 of that dictionary in their header. When a decompressor reaches
//! it, the step reports [`Status::NeedDictionary`] with that value so callers
//! can look up the matching dictionary, which they identify with
//! [`dictionary_hash`].
//!
//! # Examples
//!
//! ```
//! use zstream::{DictionaryHash, dictionary_hash};
//!
//! let whole = dictionary_hash(DictionaryHash::INITIAL, b"common prefix");
//! let folded = [&b"common "[..], &b"prefix"[..]]
//!     .into_iter()
//!     .fold(DictionaryHash::INITIAL, dictionary_hash);
//! assert_eq!(whole, folded);
//! ```
//!
//! [`Status::NeedDictionary`]: crate::Status::NeedDictionary

use core::fmt;

use crate::engine;

/// A running Adler-32 value.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DictionaryHash(u32);

impl DictionaryHash {
    /// The accumulator before any bytes are folded in. Adler-32 starts at 1,
    /// which is also what the engine compares dictionary identifiers against.
    pub const INITIAL: Self = Self(1);

    /// Wraps a value reported by the engine or stored by the caller.
    #[must_use]
    pub const fn from_raw(value: u32) -> Self {
        Self(value)
    }

    /// Returns the 32-bit checksum.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Hashes a complete dictionary.
    #[must_use]
    pub fn of(dictionary: &[u8]) -> Self {
        dictionary_hash(Self::INITIAL, dictionary)
    }

    /// Folds `bytes` into the accumulator.
    #[must_use]
    pub fn update(self, bytes: &[u8]) -> Self {
        dictionary_hash(self, bytes)
    }
}

impl Default for DictionaryHash {
    fn default() -> Self {
        Self::INITIAL
    }
}

impl fmt::Display for DictionaryHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

/// Folds `bytes` into `acc` and returns the new accumulator.
///
/// Folding successive chunks left to right yields the same value as hashing
/// their concatenation in one call.
#[must_use]
pub fn dictionary_hash(acc: DictionaryHash, bytes: &[u8]) -> DictionaryHash {
    DictionaryHash(engine::adler32(acc.0, bytes))
}
