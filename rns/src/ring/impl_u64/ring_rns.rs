use crate::crt::CrtBasis;
use crate::poly::PolyRNS;
use crate::ring::{Ring, RingRNS};
use itertools::izip;
use num_bigint::BigInt;
use std::sync::Arc;

impl RingRNS<u64> {
    /// Panics if the moduli are not distinct primes equal to 1 mod 2n.
    pub fn new(n: usize, moduli: &[u64]) -> Self {
        assert!(!moduli.is_empty(), "moduli cannot be empty");
        let rings: Vec<Arc<Ring<u64>>> = moduli
            .iter()
            .map(|&q| Arc::new(Ring::new(n, q)))
            .collect();
        Self {
            rings,
            crt: CrtBasis::new(moduli),
        }
    }

    fn check_level(&self, a: &PolyRNS<u64>) {
        debug_assert!(
            a.level() == self.level(),
            "invalid a.level()={} != self.level()={}",
            a.level(),
            self.level()
        );
    }

    pub fn from_i64(&self, values: &[i64], a: &mut PolyRNS<u64>) {
        self.check_level(a);
        izip!(self.rings.iter(), a.0.iter_mut()).for_each(|(ring, a)| ring.from_i64(values, a));
    }

    pub fn from_u64(&self, values: &[u64], a: &mut PolyRNS<u64>) {
        self.check_level(a);
        izip!(self.rings.iter(), a.0.iter_mut()).for_each(|(ring, a)| ring.from_u64(values, a));
    }

    /// Reduces every coefficient of `coeffs` into the basis.
    pub fn from_bigint(&self, coeffs: &[BigInt], a: &mut PolyRNS<u64>) {
        self.check_level(a);
        assert!(
            coeffs.len() == self.n(),
            "invalid coeffs.len()={} != n={}",
            coeffs.len(),
            self.n()
        );
        let mut residues: Vec<u64> = vec![0; self.level() + 1];
        coeffs.iter().enumerate().for_each(|(j, coeff)| {
            self.crt.reduce(coeff, &mut residues);
            izip!(a.0.iter_mut(), residues.iter()).for_each(|(a, r)| a.0[j] = *r);
        });
    }

    /// Returns the centered lift in (-Q/2, Q/2] of every coefficient of `a`.
    pub fn to_bigint(&self, a: &PolyRNS<u64>) -> Vec<BigInt> {
        self.check_level(a);
        let mut residues: Vec<u64> = vec![0; self.level() + 1];
        (0..self.n())
            .map(|j| {
                izip!(residues.iter_mut(), a.0.iter()).for_each(|(r, a)| *r = a.0[j]);
                self.crt.reconstruct_centered(&residues)
            })
            .collect()
    }
}

impl RingRNS<u64> {
    pub fn ntt_inplace(&self, a: &mut PolyRNS<u64>) {
        self.check_level(a);
        izip!(self.rings.iter(), a.0.iter_mut()).for_each(|(ring, a)| ring.ntt_inplace(a));
    }

    pub fn intt_inplace(&self, a: &mut PolyRNS<u64>) {
        self.check_level(a);
        izip!(self.rings.iter(), a.0.iter_mut()).for_each(|(ring, a)| ring.intt_inplace(a));
    }

    /// b <- a + b
    pub fn add_inplace(&self, a: &PolyRNS<u64>, b: &mut PolyRNS<u64>) {
        self.check_level(a);
        self.check_level(b);
        izip!(self.rings.iter(), a.0.iter(), b.0.iter_mut())
            .for_each(|(ring, a, b)| ring.add_inplace(a, b));
    }

    /// c <- a + b
    pub fn add(&self, a: &PolyRNS<u64>, b: &PolyRNS<u64>, c: &mut PolyRNS<u64>) {
        self.check_level(a);
        self.check_level(b);
        self.check_level(c);
        izip!(self.rings.iter(), a.0.iter(), b.0.iter(), c.0.iter_mut())
            .for_each(|(ring, a, b, c)| ring.add(a, b, c));
    }

    /// b <- b - a
    pub fn sub_inplace(&self, a: &PolyRNS<u64>, b: &mut PolyRNS<u64>) {
        self.check_level(a);
        self.check_level(b);
        izip!(self.rings.iter(), a.0.iter(), b.0.iter_mut())
            .for_each(|(ring, a, b)| ring.sub_inplace(a, b));
    }

    /// c <- a - b
    pub fn sub(&self, a: &PolyRNS<u64>, b: &PolyRNS<u64>, c: &mut PolyRNS<u64>) {
        self.check_level(a);
        self.check_level(b);
        self.check_level(c);
        izip!(self.rings.iter(), a.0.iter(), b.0.iter(), c.0.iter_mut())
            .for_each(|(ring, a, b, c)| ring.sub(a, b, c));
    }

    pub fn neg_inplace(&self, a: &mut PolyRNS<u64>) {
        self.check_level(a);
        izip!(self.rings.iter(), a.0.iter_mut()).for_each(|(ring, a)| ring.neg_inplace(a));
    }

    /// a <- a * scalar, with scalar given by its residues mod each q_i.
    pub fn mul_scalar_rns_inplace(&self, scalar: &[u64], a: &mut PolyRNS<u64>) {
        self.check_level(a);
        izip!(self.rings.iter(), scalar.iter(), a.0.iter_mut())
            .for_each(|(ring, s, a)| ring.mul_scalar_inplace(*s, a));
    }

    /// c <- a * b, both in the NTT domain.
    pub fn mul_ntt(&self, a: &PolyRNS<u64>, b: &PolyRNS<u64>, c: &mut PolyRNS<u64>) {
        self.check_level(a);
        self.check_level(b);
        self.check_level(c);
        izip!(self.rings.iter(), a.0.iter(), b.0.iter(), c.0.iter_mut())
            .for_each(|(ring, a, b, c)| ring.mul_ntt(a, b, c));
    }

    /// c <- c + a * b, all in the NTT domain.
    pub fn mul_ntt_add_inplace(&self, a: &PolyRNS<u64>, b: &PolyRNS<u64>, c: &mut PolyRNS<u64>) {
        self.check_level(a);
        self.check_level(b);
        self.check_level(c);
        izip!(self.rings.iter(), a.0.iter(), b.0.iter(), c.0.iter_mut())
            .for_each(|(ring, a, b, c)| ring.mul_ntt_add_inplace(a, b, c));
    }
}
