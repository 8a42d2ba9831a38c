use crate::modulus::WordOps;
use crate::ring::Ring;
use utils::map::Map;

/// Precomputed automorphism permutations, keyed by Galois element.
#[derive(Default)]
pub struct AutoPermMap(Map<usize, AutoPerm>);

impl AutoPermMap {
    pub fn new() -> Self {
        Self(Map::<usize, AutoPerm>::new())
    }

    pub fn insert(&mut self, perm: AutoPerm) {
        self.0.insert(perm.gal_el, perm);
    }

    pub fn generate<O, const NTT: bool>(&mut self, ring: &Ring<O>, gal_el: usize) {
        if !self.0.contains_key(&gal_el) {
            self.insert(AutoPerm::new::<O, NTT>(ring, gal_el))
        }
    }

    pub fn get(&self, gal_el: &usize) -> Option<&AutoPerm> {
        self.0.get(gal_el)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct AutoPerm {
    pub gal_el: usize,
    pub ntt: bool,
    pub permutation: Vec<usize>,
}

impl AutoPerm {
    /// Returns a lookup table for the automorphism X^{i} -> X^{i * gal_el mod 2n}.
    ///
    /// In the coefficient domain, entry i holds the destination index of
    /// coefficient i, with the top bit set when the coefficient changes sign.
    /// In the NTT domain, entry i holds the source index of evaluation i.
    ///
    /// Panics if gal_el is even.
    pub fn new<O, const NTT: bool>(ring: &Ring<O>, gal_el: usize) -> Self {
        let n: usize = ring.n();
        let cyclotomic_order: usize = ring.cyclotomic_order();

        assert!(
            gal_el & 1 == 1,
            "invalid gal_el={}: not coprime with nth_root={}",
            gal_el,
            cyclotomic_order
        );

        let mut permutation: Vec<usize> = Vec::with_capacity(n);

        if NTT {
            let mask: usize = cyclotomic_order - 1;
            let log_n: u32 = n.log2() as u32;
            for i in 0..n {
                let i_rev: usize = 2 * i.reverse_bits_msb(log_n) + 1;
                let gal_el_i: usize = ((gal_el * i_rev) & mask) >> 1;
                permutation.push(gal_el_i.reverse_bits_msb(log_n));
            }
        } else {
            let log_n: usize = n.log2();
            let mask: usize = n - 1;
            for i in 0..n {
                let gal_el_i: usize = i * gal_el;
                let sign: usize = (gal_el_i >> log_n) & 1;
                let i_out: usize = (gal_el_i & mask) | (sign << (usize::BITS - 1));
                permutation.push(i_out)
            }
        }

        Self {
            gal_el,
            ntt: NTT,
            permutation,
        }
    }
}
