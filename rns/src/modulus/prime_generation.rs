use crate::modulus::prime::is_prime;

/// Enumerates primes q = 1 mod nth_root of exactly `bit_size` bits, from
/// the largest down.
pub struct NTTFriendlyPrimesGenerator {
    size: u32,
    next_prime: u64,
    min: u64,
    nth_root: u64,
}

impl NTTFriendlyPrimesGenerator {
    pub fn new(bit_size: u32, nth_root: u64) -> Self {
        assert!(
            nth_root.is_power_of_two(),
            "invalid nth_root: {} is not a power of two",
            nth_root
        );
        assert!(
            (2..=62).contains(&bit_size),
            "invalid bit_size: {} not in [2, 62]",
            bit_size
        );
        let max: u64 = 1 << bit_size;
        let min: u64 = 1 << (bit_size - 1);
        let next_prime: u64 = if nth_root < max { max - nth_root + 1 } else { 0 };
        Self {
            size: bit_size,
            next_prime,
            min,
            nth_root,
        }
    }

    pub fn bit_size(&self) -> u32 {
        self.size
    }

    /// Returns the next prime below the previously returned one, or None
    /// once the bit range is exhausted.
    pub fn next_downstream_prime(&mut self) -> Option<u64> {
        while self.next_prime > self.min {
            let candidate: u64 = self.next_prime;
            self.next_prime = self.next_prime.saturating_sub(self.nth_root);
            if is_prime(candidate) {
                return Some(candidate);
            }
        }
        None
    }

    pub fn next_downstream_primes(&mut self, k: usize) -> Option<Vec<u64>> {
        let mut primes: Vec<u64> = Vec::with_capacity(k);
        for _ in 0..k {
            primes.push(self.next_downstream_prime()?);
        }
        Some(primes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downstream_primes_are_ntt_friendly() {
        let mut generator: NTTFriendlyPrimesGenerator = NTTFriendlyPrimesGenerator::new(36, 8192);
        let primes: Vec<u64> = generator.next_downstream_primes(3).unwrap();
        for window in primes.windows(2) {
            assert!(window[0] > window[1]);
        }
        for q in primes {
            assert!(is_prime(q));
            assert_eq!(q % 8192, 1);
            assert_eq!(64 - q.leading_zeros(), 36);
        }
    }

    #[test]
    fn batching_plain_modulus() {
        let mut generator: NTTFriendlyPrimesGenerator = NTTFriendlyPrimesGenerator::new(20, 8192);
        assert_eq!(generator.next_downstream_prime(), Some(1032193));
    }

    #[test]
    fn exhausted_range() {
        let mut generator: NTTFriendlyPrimesGenerator = NTTFriendlyPrimesGenerator::new(12, 8192);
        assert_eq!(generator.next_downstream_prime(), None);
    }
}
