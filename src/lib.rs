//! `cardinality-sketch` estimates the number of distinct elements in a stream using a fixed amount of memory.
//!
//! The core is a HyperLogLog [`Sketch`] with `2^p` byte-sized registers fed with 32-bit digests.
//! [`CardinalityEstimator`] hashes arbitrary `Hash` values into digests, and [`AtomicSketch`]
//! accepts digests from many threads at once.
//!
//! ```
//! use cardinality_sketch::Sketch;
//!
//! let mut sketch = Sketch::new(10);
//! for i in 0..1000u32 {
//!     sketch.add(i.wrapping_mul(0x9e37_79b9));
//! }
//! assert!(sketch.estimate() > 0.0);
//! ```
pub mod atomic;
mod bits;
mod correction;
pub mod error;
pub mod estimator;
#[cfg(feature = "harness")]
pub mod experiment;
pub mod fingerprint;
#[cfg(feature = "with_serde")]
mod serde;
pub mod sketch;
#[cfg(feature = "harness")]
pub mod stream;

pub use atomic::AtomicSketch;
pub use bits::leading_zero_count;
pub use error::SketchError;
pub use estimator::CardinalityEstimator;
pub use sketch::{Sketch, DEFAULT_PRECISION, MAX_PRECISION, MIN_PRECISION};
