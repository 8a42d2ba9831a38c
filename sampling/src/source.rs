use rand_chacha::ChaCha20Rng;
use rand_chacha::rand_core::SeedableRng;
use rand_core::{CryptoRng, RngCore};

/// Seedable ChaCha stream used for every random draw of the scheme.
pub struct Source {
    source: ChaCha20Rng,
}

/// Returns a fresh 32-byte seed drawn from the operating system.
pub fn new_seed() -> [u8; 32] {
    let mut seed = [0u8; 32];
    rand::rng().fill_bytes(&mut seed);
    seed
}

impl Source {
    pub fn new(seed: [u8; 32]) -> Source {
        Source {
            source: ChaCha20Rng::from_seed(seed),
        }
    }

    /// Returns a source seeded from the operating system.
    pub fn from_entropy() -> Source {
        Source::new(new_seed())
    }

    pub fn new_seed(&mut self) -> [u8; 32] {
        let mut seed: [u8; 32] = [0u8; 32];
        self.source.fill_bytes(&mut seed);
        seed
    }

    /// Returns an independent source seeded from this one.
    pub fn branch(&mut self) -> Self {
        Source::new(self.new_seed())
    }

    /// Returns a uniform value in [0, max) by rejection on the masked word.
    #[inline(always)]
    pub fn next_u64n(&mut self, max: u64, mask: u64) -> u64 {
        let mut x: u64 = self.next_u64() & mask;
        while x >= max {
            x = self.next_u64() & mask;
        }
        x
    }
}

impl RngCore for Source {
    #[inline(always)]
    fn next_u32(&mut self) -> u32 {
        self.source.next_u32()
    }

    #[inline(always)]
    fn next_u64(&mut self) -> u64 {
        self.source.next_u64()
    }

    #[inline(always)]
    fn fill_bytes(&mut self, bytes: &mut [u8]) {
        self.source.fill_bytes(bytes)
    }
}

impl CryptoRng for Source {}

#[cfg(test)]
mod tests {
    use super::Source;

    #[test]
    fn same_seed_same_stream() {
        let mut a: Source = Source::new([7u8; 32]);
        let mut b: Source = Source::new([7u8; 32]);
        (0..16).for_each(|_| assert_eq!(a.next_u64n(97, 127), b.next_u64n(97, 127)));
    }

    #[test]
    fn next_u64n_is_bounded() {
        let mut source: Source = Source::new([1u8; 32]);
        (0..1024).for_each(|_| assert!(source.next_u64n(1000, 1023) < 1000));
    }

    #[test]
    fn branches_diverge() {
        let mut source: Source = Source::new([0u8; 32]);
        let mut a: Source = source.branch();
        let mut b: Source = source.branch();
        assert_ne!(a.new_seed(), b.new_seed());
    }
}
