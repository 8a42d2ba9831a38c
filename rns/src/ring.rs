pub mod impl_u64;

use crate::crt::CrtBasis;
use crate::dft::DFT;
use crate::modulus::WordOps;
use crate::modulus::prime::Prime;
use crate::poly::{Poly, PolyRNS};
use std::sync::Arc;

/// Generator of the rotation subgroup of (Z/2nZ)*.
pub const GALOIS_GENERATOR: usize = 3;

pub struct Ring<O> {
    pub n: usize,
    pub modulus: Prime<O>,
    pub dft: Box<dyn DFT<O>>,
}

impl<O> Ring<O> {
    pub fn log_n(&self) -> usize {
        self.n().log2()
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn cyclotomic_order(&self) -> usize {
        self.n << 1
    }

    /// Returns GALOIS_GENERATOR^step mod 2n, or its negation if `conjugate` is set.
    /// Negative steps are taken modulo the order n/2 of the generator.
    pub fn galois_element(&self, step: i64, conjugate: bool) -> usize {
        galois_element(self.n, step, conjugate)
    }
}

pub fn galois_element(n: usize, step: i64, conjugate: bool) -> usize {
    let cyclotomic_order: usize = n << 1;
    let mask: usize = cyclotomic_order - 1;
    let mut gal_el: usize = 1;
    if n > 2 {
        let order: i64 = (n >> 1) as i64;
        let mut e: i64 = step.rem_euclid(order);
        let mut base: usize = GALOIS_GENERATOR;
        while e > 0 {
            if e & 1 == 1 {
                gal_el = (gal_el * base) & mask;
            }
            base = (base * base) & mask;
            e >>= 1;
        }
    }
    if conjugate {
        cyclotomic_order - gal_el
    } else {
        gal_el
    }
}

impl Ring<u64> {
    pub fn new_poly(&self) -> Poly<u64> {
        Poly::<u64>::new(self.n())
    }
}

/// Product of rings sharing the same degree, one per RNS modulus.
pub struct RingRNS<O> {
    pub rings: Vec<Arc<Ring<O>>>,
    pub crt: CrtBasis,
}

impl<O> RingRNS<O> {
    pub fn log_n(&self) -> usize {
        self.n().log2()
    }

    pub fn n(&self) -> usize {
        self.rings[0].n()
    }

    pub fn level(&self) -> usize {
        self.rings.len() - 1
    }

    pub fn at(&self, level: usize) -> &Ring<O> {
        &self.rings[level]
    }

    pub fn crt(&self) -> &CrtBasis {
        &self.crt
    }
}

impl RingRNS<u64> {
    pub fn new_polyrns(&self) -> PolyRNS<u64> {
        PolyRNS::<u64>::new(self.n(), self.level())
    }
}
