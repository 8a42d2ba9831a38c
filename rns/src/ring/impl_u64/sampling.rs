use crate::modulus::WordOps;
use crate::poly::{Poly, PolyRNS};
use crate::ring::{Ring, RingRNS};
use sampling::distributions::{TruncatedGaussian, ternary};
use sampling::source::Source;

impl Ring<u64> {
    pub fn fill_uniform(&self, source: &mut Source, a: &mut Poly<u64>) {
        let max: u64 = self.modulus.q;
        let mask: u64 = max.mask();
        a.0.iter_mut()
            .for_each(|a| *a = source.next_u64n(max, mask));
    }
}

impl RingRNS<u64> {
    pub fn fill_uniform(&self, source: &mut Source, a: &mut PolyRNS<u64>) {
        self.rings
            .iter()
            .enumerate()
            .for_each(|(i, r)| r.fill_uniform(source, a.at_mut(i)));
    }

    /// Fills a with a ternary polynomial and returns its signed coefficients.
    pub fn fill_ternary(&self, source: &mut Source, a: &mut PolyRNS<u64>) -> Vec<i64> {
        let values: Vec<i64> = (0..self.n()).map(|_| ternary(source)).collect();
        self.from_i64(&values, a);
        values
    }

    /// Fills a with a truncated discrete Gaussian polynomial and returns its signed coefficients.
    pub fn fill_gaussian(
        &self,
        gaussian: &TruncatedGaussian,
        source: &mut Source,
        a: &mut PolyRNS<u64>,
    ) -> Vec<i64> {
        let values: Vec<i64> = (0..self.n()).map(|_| gaussian.sample_i64(source)).collect();
        self.from_i64(&values, a);
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_is_reduced() {
        let ring: RingRNS<u64> = RingRNS::new(64, &[65537, 786433]);
        let mut source: Source = Source::new([7u8; 32]);
        let mut a: PolyRNS<u64> = ring.new_polyrns();
        ring.fill_uniform(&mut source, &mut a);
        for (r, p) in ring.rings.iter().zip(a.0.iter()) {
            assert!(p.0.iter().all(|&x| x < r.modulus.q));
        }
    }

    #[test]
    fn ternary_is_consistent_across_limbs() {
        let ring: RingRNS<u64> = RingRNS::new(64, &[65537, 786433]);
        let mut source: Source = Source::new([9u8; 32]);
        let mut a: PolyRNS<u64> = ring.new_polyrns();
        let values: Vec<i64> = ring.fill_ternary(&mut source, &mut a);
        let lifted = ring.to_bigint(&a);
        for (v, l) in values.iter().zip(lifted.iter()) {
            assert_eq!(num_bigint::BigInt::from(*v), *l);
        }
    }
}
