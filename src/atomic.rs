//! ## Concurrent sketch
//! `AtomicSketch` accepts digests from many threads through a shared reference. Each register is
//! an `AtomicU8` updated with `fetch_max`, so concurrent adds to the same bucket never lose the
//! larger rank and the final registers do not depend on interleaving.
//!
//! `estimate` reads registers one by one and may observe some adds but not others while
//! ingestion is still running. Use `snapshot` after producers are done to get a stable copy.

use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicU8, Ordering};

use crate::correction;
use crate::sketch::{clamp_precision, decode_digest, Sketch, DEFAULT_PRECISION};

/// HyperLogLog sketch with atomic registers.
pub struct AtomicSketch {
    precision: u8,
    registers: Box<[AtomicU8]>,
}

impl AtomicSketch {
    /// Creates new `AtomicSketch` with `2^precision` registers, clamping `precision` the same
    /// way as `Sketch::new`.
    pub fn new(precision: u8) -> Self {
        let precision = clamp_precision(precision);
        Self {
            precision,
            registers: (0..1usize << precision).map(|_| AtomicU8::new(0)).collect(),
        }
    }

    /// Insert digest into `AtomicSketch`
    #[inline]
    pub fn add(&self, digest: u32) {
        let (idx, rank) = decode_digest(self.precision, digest);
        self.registers[idx].fetch_max(rank, Ordering::Relaxed);
    }

    /// Return cardinality estimate
    #[inline]
    pub fn estimate(&self) -> f64 {
        let (sum, zeros) = correction::harmonic_sum(self.iter());
        correction::estimate(self.registers.len(), sum, zeros)
    }

    /// Copy current register values into a plain `Sketch`
    pub fn snapshot(&self) -> Sketch {
        Sketch::from_parts(self.precision, self.iter().collect())
    }

    /// Return effective precision after clamping
    #[inline]
    pub fn precision(&self) -> u8 {
        self.precision
    }

    /// Return number of registers
    #[inline]
    pub fn registers_count(&self) -> usize {
        self.registers.len()
    }

    fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.registers.iter().map(|r| r.load(Ordering::Relaxed))
    }
}

impl Default for AtomicSketch {
    fn default() -> Self {
        Self::new(DEFAULT_PRECISION)
    }
}

impl From<Sketch> for AtomicSketch {
    fn from(sketch: Sketch) -> Self {
        Self {
            precision: sketch.precision(),
            registers: sketch.registers().iter().map(|&r| AtomicU8::new(r)).collect(),
        }
    }
}

impl Debug for AtomicSketch {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{ precision: {}, estimate: {:.2} }}",
            self.precision,
            self.estimate()
        )
    }
}
