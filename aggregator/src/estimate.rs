//! Bloom-filter sizing and the cardinality estimates a consumer derives from a
//! decrypted aggregate (the number of slots set in every queried epoch).

use std::f64::consts::LN_2;

/// Shape of a bloom filter: `size` bits set by `hash_count` hashes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BloomGeometry {
    pub size: usize,
    pub hash_count: usize,
}

impl BloomGeometry {
    /// Geometry for `capacity` expected items at false-positive rate `fp_rate`.
    pub fn for_capacity(capacity: usize, fp_rate: f64) -> Self {
        let size: usize = optimal_filter_size(capacity, fp_rate);
        Self {
            size,
            hash_count: optimal_hash_count(size, capacity),
        }
    }

    pub fn cardinality(&self, set_bits: u64) -> Option<u64> {
        cardinality(self.size, self.hash_count, set_bits)
    }

    pub fn intersection(&self, set_both: u64, set_first: u64, set_second: u64) -> Option<u64> {
        intersection(self.size, self.hash_count, set_both, set_first, set_second)
    }
}

/// m = -n ln(p) / ln(2)^2, truncated.
pub fn optimal_filter_size(capacity: usize, fp_rate: f64) -> usize {
    (-(capacity as f64) * fp_rate.ln() / (LN_2 * LN_2)) as usize
}

/// k = (m/n) ln(2), truncated, at least one.
pub fn optimal_hash_count(size: usize, capacity: usize) -> usize {
    if capacity == 0 {
        return 1;
    }
    ((size as f64 / capacity as f64 * LN_2) as usize).max(1)
}

/// Estimated number of distinct items behind `set_bits` ones in a filter of
/// `size` bits: ceil(-(m/k) ln(1 - X/m)). Returns `None` for a saturated filter.
pub fn cardinality(size: usize, hash_count: usize, set_bits: u64) -> Option<u64> {
    let m: f64 = size as f64;
    let x: f64 = set_bits as f64;
    if size == 0 || hash_count == 0 || x >= m {
        return None;
    }
    Some(clamp_ceil(-m / hash_count as f64 * (1.0 - x / m).ln()))
}

/// Estimated size of the intersection of two sets from the ones in their
/// slot-wise product (`set_both`) and in each filter.
pub fn intersection(
    size: usize,
    hash_count: usize,
    set_both: u64,
    set_first: u64,
    set_second: u64,
) -> Option<u64> {
    let m: f64 = size as f64;
    let (t, t1, t2) = (set_both as f64, set_first as f64, set_second as f64);
    if size < 2 || hash_count == 0 {
        return None;
    }
    let denom: f64 = m - t1 - t2 + t;
    if denom <= 0.0 {
        return None;
    }
    let inner: f64 = m - (t * m - t1 * t2) / denom;
    if inner <= 0.0 {
        return None;
    }
    Some(clamp_ceil(
        (inner.ln() - m.ln()) / (hash_count as f64 * (1.0 - 1.0 / m).ln()),
    ))
}

fn clamp_ceil(x: f64) -> u64 {
    if x.is_finite() && x > 0.0 {
        x.ceil() as u64
    } else {
        0
    }
}
