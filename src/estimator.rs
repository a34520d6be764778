//! Cardinality estimator allows to estimate number of distinct elements
//! in the stream or dataset of any `Hash` values.
//!
//! Each inserted item is hashed with a hasher built from `S` (by default `WyHash`),
//! folded into a 32-bit digest and added into the underlying [`Sketch`].
//!
//! - Expected error for precision `P`: `1.04 / sqrt(2^P)`
//!   - P = 4: 26.00%
//!   - P = 10: 3.25%
//!   - P = 12: 1.62%
//!   - P = 16: 0.41%

use std::fmt::{Debug, Formatter};
use std::hash::{BuildHasher, BuildHasherDefault, Hash};
use std::marker::PhantomData;
use std::mem::size_of;

use wyhash::WyHash;

use crate::fingerprint::fold_digest;
use crate::sketch::{Sketch, DEFAULT_PRECISION};

/// Estimator of the number of distinct `T` items, backed by a [`Sketch`].
pub struct CardinalityEstimator<T, S = BuildHasherDefault<WyHash>>
where
    T: Hash + ?Sized,
    S: BuildHasher,
{
    /// Register storage
    sketch: Sketch,
    /// Builds one hasher per inserted item
    build_hasher: S,
    _phantom_data: PhantomData<fn(&T)>,
}

impl<T, S> CardinalityEstimator<T, S>
where
    T: Hash + ?Sized,
    S: BuildHasher + Default,
{
    /// Creates new instance of `CardinalityEstimator` with default precision
    #[inline]
    pub fn new() -> Self {
        Self::with_precision(DEFAULT_PRECISION)
    }

    /// Creates new instance of `CardinalityEstimator` with `2^precision` registers
    #[inline]
    pub fn with_precision(precision: u8) -> Self {
        Self::with_hasher(precision, S::default())
    }
}

impl<T, S> CardinalityEstimator<T, S>
where
    T: Hash + ?Sized,
    S: BuildHasher,
{
    /// Creates new instance of `CardinalityEstimator` hashing items with `build_hasher`
    #[inline]
    pub fn with_hasher(precision: u8, build_hasher: S) -> Self {
        Self {
            sketch: Sketch::new(precision),
            build_hasher,
            _phantom_data: PhantomData,
        }
    }

    /// Insert a hashable item into `CardinalityEstimator`
    #[inline]
    pub fn insert(&mut self, item: &T) {
        let digest = fold_digest(self.build_hasher.hash_one(item));
        self.sketch.add(digest);
    }

    /// Insert already computed 32-bit digest into `CardinalityEstimator`
    #[inline]
    pub fn insert_digest(&mut self, digest: u32) {
        self.sketch.add(digest);
    }

    /// Return cardinality estimate
    #[inline]
    pub fn estimate(&self) -> f64 {
        self.sketch.estimate()
    }

    /// Return underlying sketch
    #[inline]
    pub fn sketch(&self) -> &Sketch {
        &self.sketch
    }

    /// Return memory size of `CardinalityEstimator`
    pub fn size_of(&self) -> usize {
        size_of::<Self>() - size_of::<Sketch>() + self.sketch.size_of()
    }
}

impl<T, S> Default for CardinalityEstimator<T, S>
where
    T: Hash + ?Sized,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, S> Clone for CardinalityEstimator<T, S>
where
    T: Hash + ?Sized,
    S: BuildHasher + Clone,
{
    fn clone(&self) -> Self {
        Self {
            sketch: self.sketch.clone(),
            build_hasher: self.build_hasher.clone(),
            _phantom_data: PhantomData,
        }
    }
}

impl<'a, T, S> Extend<&'a T> for CardinalityEstimator<T, S>
where
    T: Hash + ?Sized + 'a,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        iter.into_iter().for_each(|item| self.insert(item));
    }
}

impl<T, S> Debug for CardinalityEstimator<T, S>
where
    T: Hash + ?Sized,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.sketch.fmt(f)
    }
}
