use crate::dft::DFT;
use crate::modulus::barrett::Barrett;
use crate::modulus::prime::Prime;
use crate::modulus::{ONCE, ReduceOnce, WordOps};

/// Negacyclic NTT over Z_q[X]/(X^n+1).
///
/// After a forward transform, index k holds the evaluation of the input at
/// psi^(2*brv(k)+1), where psi is a primitive 2n-th root of unity and brv is
/// the log(n)-bit reversal.
pub struct Table<O> {
    prime: Prime<O>,
    psi: O,
    psi_forward_rev: Vec<Barrett<O>>,
    psi_backward_rev: Vec<Barrett<O>>,
    n_inv: Barrett<O>,
}

impl Table<u64> {
    pub fn new(prime: Prime<u64>, nth_root: u64) -> Self {
        assert!(
            nth_root.is_power_of_two() && nth_root >= 2,
            "invalid nth_root: {} is not a power of two >= 2",
            nth_root
        );

        let n: usize = (nth_root >> 1) as usize;
        let log_n: u32 = n.trailing_zeros();

        let psi: u64 = prime.primitive_nth_root(nth_root);
        let psi_inv: u64 = prime.inv(psi);

        let mut psi_forward_rev: Vec<Barrett<u64>> = vec![Barrett(0, 0); n];
        let mut psi_backward_rev: Vec<Barrett<u64>> = vec![Barrett(0, 0); n];

        let mut powers_forward: u64 = 1u64;
        let mut powers_backward: u64 = 1u64;

        for i in 0..n {
            let i_rev: usize = if log_n == 0 {
                0
            } else {
                i.reverse_bits_msb(log_n)
            };

            psi_forward_rev[i_rev] = prime.prepare(powers_forward);
            psi_backward_rev[i_rev] = prime.prepare(powers_backward);

            powers_forward = prime.mul(powers_forward, psi);
            powers_backward = prime.mul(powers_backward, psi_inv);
        }

        let n_inv: Barrett<u64> = prime.prepare(prime.inv(n as u64));

        Self {
            prime,
            psi,
            psi_forward_rev,
            psi_backward_rev,
            n_inv,
        }
    }

    pub fn psi(&self) -> u64 {
        self.psi
    }

    pub fn n(&self) -> usize {
        self.psi_forward_rev.len()
    }

    /// Cooley-Tukey butterflies, natural order in, bit-reversed order out.
    pub fn forward_inplace(&self, a: &mut [u64]) {
        let n: usize = self.n();
        assert!(a.len() == n, "invalid a.len()={} != n={}", a.len(), n);
        let q: u64 = self.prime.q;
        let mut t: usize = n;
        let mut m: usize = 1;
        while m < n {
            t >>= 1;
            for i in 0..m {
                let j1: usize = 2 * i * t;
                let psi: &Barrett<u64> = &self.psi_forward_rev[m + i];
                for j in j1..j1 + t {
                    let u: u64 = a[j];
                    let v: u64 = self.prime.barrett.mul_external::<ONCE>(psi, &a[j + t]);
                    a[j] = (u + v).reduce_once(q);
                    a[j + t] = (u + q - v).reduce_once(q);
                }
            }
            m <<= 1;
        }
    }

    /// Gentleman-Sande butterflies, bit-reversed order in, natural order out.
    pub fn backward_inplace(&self, a: &mut [u64]) {
        let n: usize = self.n();
        assert!(a.len() == n, "invalid a.len()={} != n={}", a.len(), n);
        let q: u64 = self.prime.q;
        let mut t: usize = 1;
        let mut m: usize = n;
        while m > 1 {
            let h: usize = m >> 1;
            let mut j1: usize = 0;
            for i in 0..h {
                let psi: &Barrett<u64> = &self.psi_backward_rev[h + i];
                for j in j1..j1 + t {
                    let u: u64 = a[j];
                    let v: u64 = a[j + t];
                    a[j] = (u + v).reduce_once(q);
                    a[j + t] = self.prime.barrett.mul_external::<ONCE>(psi, &(u + q - v));
                }
                j1 += 2 * t;
            }
            t <<= 1;
            m = h;
        }
        a.iter_mut()
            .for_each(|x| self.prime.barrett.mul_external_assign::<ONCE>(&self.n_inv, x));
    }
}

impl DFT<u64> for Table<u64> {
    fn forward_inplace(&self, a: &mut [u64]) {
        Table::forward_inplace(self, a)
    }

    fn backward_inplace(&self, a: &mut [u64]) {
        Table::backward_inplace(self, a)
    }
}
