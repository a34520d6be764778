//! ## Random stream generator
//! Produces reproducible streams of short random strings used to validate the sketch against an
//! exact distinct count. Strings are 1 to 30 characters long, drawn from `[a-zA-Z0-9-]`, so a
//! long stream contains a mix of repeated and distinct values.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Characters strings are built from
const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789-";
/// Shortest generated string
const MIN_ITEM_LEN: usize = 1;
/// Longest generated string
const MAX_ITEM_LEN: usize = 30;
/// Checkpoint step used when requested step is not positive
const DEFAULT_STEP_PERCENT: i32 = 10;

/// Seeded stream of random strings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RandomStream {
    items: Vec<String>,
}

impl RandomStream {
    /// Generate `len` random strings from `seed`
    pub fn generate(len: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let items = (0..len)
            .map(|_| {
                let item_len = rng.gen_range(MIN_ITEM_LEN..=MAX_ITEM_LEN);
                (0..item_len)
                    .map(|_| char::from(ALPHABET[rng.gen_range(0..ALPHABET.len())]))
                    .collect::<String>()
            })
            .collect();
        Self { items }
    }

    /// Return stream items in order
    #[inline]
    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Return number of items in the stream
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Return whether the stream is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Return stream prefix lengths at every `step_percent` of the stream
    pub fn checkpoints_by_percent(&self, step_percent: i32) -> Vec<usize> {
        checkpoints_by_percent(self.len(), step_percent)
    }
}

/// Return prefix lengths `n * k / 100` for `k = step, 2 * step, ... <= 100`.
///
/// Non-positive steps fall back to 10%, steps above 100% are lowered to 100%. The last
/// checkpoint is always `n`.
pub fn checkpoints_by_percent(n: usize, step_percent: i32) -> Vec<usize> {
    let step = match step_percent {
        s if s <= 0 => DEFAULT_STEP_PERCENT,
        s => s.min(100),
    };

    let mut checkpoints: Vec<usize> = (1..)
        .map(|k| k * step)
        .take_while(|&percent| percent <= 100)
        .map(|percent| (n * percent as usize / 100).min(n))
        .collect();

    if checkpoints.last() != Some(&n) {
        checkpoints.push(n);
    }

    checkpoints
}
