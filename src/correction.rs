//! ## Estimation and bias correction
//! Turns register contents into a cardinality estimate using the three-regime HyperLogLog
//! algorithm:
//! - raw harmonic-mean estimate `alpha(m) * m^2 / Z`, where `Z = Σ 2^-register`;
//! - small-range correction with linear counting while registers are still empty;
//! - large-range correction when the estimate approaches the size of the 32-bit digest space.
//!
//! [Original HyperLogLog paper](https://algo.inria.fr/flajolet/Publications/FlFuGaMe07.pdf)

/// Size of the 32-bit digest space.
const TWO_32: f64 = 4_294_967_296.0;
/// Estimates above this threshold get the large-range correction.
const LARGE_RANGE_THRESHOLD: f64 = TWO_32 / 30.0;
/// Estimates up to `SMALL_RANGE_FACTOR * m` are candidates for linear counting.
const SMALL_RANGE_FACTOR: f64 = 2.5;

/// Parameter for bias correction
#[inline]
pub(crate) fn alpha(m: usize) -> f64 {
    match m {
        16 => 0.673,
        32 => 0.697,
        64 => 0.709,
        _ => 0.7213 / (1.0 + 1.079 / (m as f64)),
    }
}

/// Harmonic sum of registers together with the number of registers still set to 0.
#[inline]
pub(crate) fn harmonic_sum<I: IntoIterator<Item = u8>>(registers: I) -> (f64, usize) {
    registers
        .into_iter()
        .fold((0.0, 0), |(sum, zeros), rank| {
            (sum + 1.0 / ((1u64 << rank) as f64), zeros + usize::from(rank == 0))
        })
}

/// Linear counting estimate for `m` registers of which `zeros` are empty.
#[inline]
pub(crate) fn linear_counting(m: usize, zeros: usize) -> f64 {
    let m = m as f64;
    m * (m / zeros as f64).ln()
}

/// Correct estimates close to the 32-bit saturation point.
///
/// Returns `estimate` unchanged once `1 - estimate / 2^32` is no longer positive.
#[inline]
pub(crate) fn large_range_correction(estimate: f64) -> f64 {
    let x = 1.0 - estimate / TWO_32;
    if x > 0.0 {
        -TWO_32 * x.ln()
    } else {
        estimate
    }
}

/// Compute cardinality estimate from register harmonic `sum` and number of `zeros` registers.
#[inline]
pub(crate) fn estimate(m: usize, sum: f64, zeros: usize) -> f64 {
    let md = m as f64;
    let mut estimate = alpha(m) * md * md / sum;

    if estimate <= SMALL_RANGE_FACTOR * md && zeros > 0 {
        estimate = linear_counting(m, zeros);
    }

    if estimate > LARGE_RANGE_THRESHOLD {
        estimate = large_range_correction(estimate);
    }

    estimate
}
