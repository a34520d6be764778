//! ## Dense HyperLogLog sketch
//! Estimates the number of distinct 32-bit digests using `M = 2^P` registers of 8 bits each.
//!
//! Digest layout for precision `P`:
//! - top `P` bits          - index of the register (bucket) the digest is routed to.
//! - remaining `32 - P`    - bits inspected for the rank, i.e. 1 + number of leading zeros.
//!
//! The rank is capped at `32 - P + 1`, which is reached when all inspected bits are zero.
//! Each register keeps the maximum rank observed for its bucket, so re-adding a digest never
//! changes the sketch.

use std::fmt::{Debug, Formatter};
use std::mem::{size_of, size_of_val};

use snafu::ensure;
use tracing::debug;

use crate::bits::leading_zero_count;
use crate::correction;
use crate::error::{
    InvalidPrecisionSnafu, RegisterCountMismatchSnafu, RegisterOutOfRangeSnafu, SketchError,
};

/// Smallest supported precision (16 registers).
pub const MIN_PRECISION: u8 = 4;
/// Largest supported precision (65536 registers).
pub const MAX_PRECISION: u8 = 16;
/// Precision used by `Sketch::default`, giving ~3.25% standard error.
pub const DEFAULT_PRECISION: u8 = 10;

/// HyperLogLog sketch over 32-bit digests.
#[derive(Clone, PartialEq, Eq)]
pub struct Sketch {
    /// Number of digest bits used for register index, always in `[MIN_PRECISION..MAX_PRECISION]`
    precision: u8,
    /// Register ranks, `2^precision` of them
    registers: Box<[u8]>,
}

impl Sketch {
    /// Creates new `Sketch` with `2^precision` registers.
    ///
    /// `precision` is clamped into `[MIN_PRECISION..MAX_PRECISION]` instead of being rejected.
    pub fn new(precision: u8) -> Self {
        let precision = clamp_precision(precision);
        Self {
            precision,
            registers: vec![0; 1 << precision].into_boxed_slice(),
        }
    }

    /// Creates new instance of `Sketch` from already validated parts
    #[inline]
    pub(crate) fn from_parts(precision: u8, registers: Box<[u8]>) -> Self {
        debug_assert_eq!(registers.len(), 1 << precision);
        Self {
            precision,
            registers,
        }
    }

    /// Restores `Sketch` from previously captured register contents.
    ///
    /// Unlike `new`, the precision is not clamped: it has to match the number of registers.
    pub fn from_registers(precision: u8, registers: Vec<u8>) -> Result<Self, SketchError> {
        ensure!(
            (MIN_PRECISION..=MAX_PRECISION).contains(&precision),
            InvalidPrecisionSnafu { precision }
        );

        let expected = 1usize << precision;
        ensure!(
            registers.len() == expected,
            RegisterCountMismatchSnafu {
                expected,
                actual: registers.len(),
            }
        );

        let max_rank = max_rank(precision);
        if let Some((index, &value)) = registers.iter().enumerate().find(|&(_, &r)| r > max_rank) {
            return RegisterOutOfRangeSnafu {
                index,
                value,
                max_rank,
            }
            .fail();
        }

        Ok(Self::from_parts(precision, registers.into_boxed_slice()))
    }

    /// Insert digest into `Sketch`
    #[inline]
    pub fn add(&mut self, digest: u32) {
        let (idx, rank) = decode_digest(self.precision, digest);
        let register = &mut self.registers[idx];
        if rank > *register {
            *register = rank;
        }
    }

    /// Return cardinality estimate
    #[inline]
    pub fn estimate(&self) -> f64 {
        let (sum, zeros) = correction::harmonic_sum(self.registers.iter().copied());
        correction::estimate(self.registers.len(), sum, zeros)
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

    /// Return register ranks
    #[inline]
    pub fn registers(&self) -> &[u8] {
        &self.registers
    }

    /// Return the largest rank a register can hold at this precision
    #[inline]
    pub fn max_rank(&self) -> u8 {
        max_rank(self.precision)
    }

    /// Return memory size of `Sketch`
    pub fn size_of(&self) -> usize {
        size_of::<Self>() + size_of_val(&*self.registers)
    }
}

impl Default for Sketch {
    fn default() -> Self {
        Self::new(DEFAULT_PRECISION)
    }
}

impl Debug for Sketch {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{ precision: {}, estimate: {:.2}, size: {} }}",
            self.precision,
            self.estimate(),
            self.size_of()
        )
    }
}

/// Clamp requested precision into `[MIN_PRECISION..MAX_PRECISION]`
pub(crate) fn clamp_precision(precision: u8) -> u8 {
    let clamped = precision.clamp(MIN_PRECISION, MAX_PRECISION);
    if clamped != precision {
        debug!(
            requested = precision,
            precision = clamped,
            "Clamped sketch precision into supported range."
        );
    }
    clamped
}

/// Largest rank for precision `p`: all `32 - p` inspected bits are zero.
#[inline]
pub(crate) fn max_rank(precision: u8) -> u8 {
    32 - precision + 1
}

/// Return register index and rank of `digest` for given precision
#[inline]
pub(crate) fn decode_digest(precision: u8, digest: u32) -> (usize, u8) {
    let p = u32::from(precision);
    let idx = (digest >> (32 - p)) as usize;
    let rank = (leading_zero_count(digest << p) + 1).min(u32::from(max_rank(precision)));
    (idx, rank as u8)
}
