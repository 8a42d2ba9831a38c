use crate::automorphism::AutoPerm;
use crate::modulus::ReduceOnce;
use crate::poly::{Poly, PolyRNS};
use crate::ring::{Ring, RingRNS};
use itertools::izip;

impl Ring<u64> {
    /// b <- a(X^gal_el), following a precomputed permutation.
    pub fn automorphism_from_perm(&self, a: &Poly<u64>, auto_perm: &AutoPerm, b: &mut Poly<u64>) {
        debug_assert!(
            a.n() == b.n(),
            "invalid inputs: a.n() = {} != b.n() = {}",
            a.n(),
            b.n()
        );
        debug_assert!(
            auto_perm.permutation.len() == a.n(),
            "invalid auto_perm: permutation.len()={} != a.n()={}",
            auto_perm.permutation.len(),
            a.n()
        );

        let b_vec: &mut Vec<u64> = &mut b.0;
        let a_vec: &Vec<u64> = &a.0;

        if auto_perm.ntt {
            izip!(b_vec.iter_mut(), auto_perm.permutation.iter())
                .for_each(|(bi, &src)| *bi = a_vec[src]);
        } else {
            let q: u64 = self.modulus.q;
            let mask: usize = self.n() - 1;
            let sign_shift: u32 = usize::BITS - 1;
            izip!(a_vec.iter(), auto_perm.permutation.iter()).for_each(|(&ai, &dst)| {
                let sign: usize = dst >> sign_shift;
                b_vec[dst & mask] = if sign == 1 { (q - ai).reduce_once(q) } else { ai };
            });
        }
    }
}

impl RingRNS<u64> {
    pub fn automorphism_from_perm(
        &self,
        a: &PolyRNS<u64>,
        auto_perm: &AutoPerm,
        b: &mut PolyRNS<u64>,
    ) {
        izip!(self.rings.iter(), a.0.iter(), b.0.iter_mut())
            .for_each(|(ring, a, b)| ring.automorphism_from_perm(a, auto_perm, b));
    }
}
