//! ## Fingerprint sources
//! The sketch consumes 32-bit digests which are expected to be uniformly distributed. This module
//! provides keyed hashers producing such digests:
//! - `Fnv1a32` - 32-bit FNV-1a with the offset basis XOR-ed with a seed.
//! - `SeededWyHash` - WyHash with a seed, folded down to 32 bits.
//!
//! Both plug into `std::hash` via `Hasher`/`BuildHasher`, so any `Hash` value can be fingerprinted.

use std::hash::{BuildHasher, Hasher};

use wyhash::WyHash;

/// FNV-1a 32-bit offset basis
const FNV_OFFSET_BASIS: u32 = 2_166_136_261;
/// FNV-1a 32-bit prime
const FNV_PRIME: u32 = 16_777_619;

/// Keyed 32-bit FNV-1a hasher.
#[derive(Clone, Copy, Debug)]
pub struct Fnv1a32 {
    state: u32,
}

impl Fnv1a32 {
    /// Creates new hasher keyed with `seed`
    #[inline]
    pub fn with_seed(seed: u32) -> Self {
        Self {
            state: FNV_OFFSET_BASIS ^ seed,
        }
    }
}

impl Default for Fnv1a32 {
    fn default() -> Self {
        Self::with_seed(0)
    }
}

impl Hasher for Fnv1a32 {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state ^= u32::from(b);
            self.state = self.state.wrapping_mul(FNV_PRIME);
        }
    }

    #[inline]
    fn finish(&self) -> u64 {
        u64::from(self.state)
    }
}

/// Fingerprint raw `bytes` with keyed FNV-1a.
#[inline]
pub fn fnv1a32(seed: u32, bytes: &[u8]) -> u32 {
    let mut hasher = Fnv1a32::with_seed(seed);
    hasher.write(bytes);
    hasher.state
}

/// `BuildHasher` producing `Fnv1a32` hashers with a fixed seed.
#[derive(Clone, Copy, Debug, Default)]
pub struct SeededFnv1a32(pub u32);

impl BuildHasher for SeededFnv1a32 {
    type Hasher = Fnv1a32;

    #[inline]
    fn build_hasher(&self) -> Fnv1a32 {
        Fnv1a32::with_seed(self.0)
    }
}

/// `BuildHasher` producing `WyHash` hashers with a fixed seed.
#[derive(Clone, Copy, Debug, Default)]
pub struct SeededWyHash(pub u64);

impl BuildHasher for SeededWyHash {
    type Hasher = WyHash;

    #[inline]
    fn build_hasher(&self) -> WyHash {
        WyHash::with_seed(self.0)
    }
}

/// Fold 64-bit hash into 32-bit digest by XOR-ing its halves.
///
/// Hashers producing 32-bit values (e.g. `Fnv1a32`) are left unchanged.
#[inline]
pub fn fold_digest(hash: u64) -> u32 {
    (hash ^ (hash >> 32)) as u32
}
