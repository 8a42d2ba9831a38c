use crate::dft::ntt::Table;
use crate::modulus::prime::Prime;
use crate::modulus::ReduceOnce;
use crate::poly::Poly;
use crate::ring::Ring;
use itertools::izip;

impl Ring<u64> {
    /// Panics if n is not a power of two or q is not a prime equal to 1 mod 2n.
    pub fn new(n: usize, q: u64) -> Self {
        assert!(
            n.is_power_of_two() && n >= 2,
            "invalid n={}: not a power-of-two >= 2",
            n
        );
        let prime: Prime<u64> = Prime::<u64>::new(q);
        assert!(
            (q - 1) % (2 * n as u64) == 0,
            "invalid q={}: q-1 not divisible by 2n={}",
            q,
            2 * n
        );
        Self {
            n,
            modulus: prime,
            dft: Box::new(Table::<u64>::new(prime, (2 * n) as u64)),
        }
    }

    /// Sets a to the small signed integers `values` mod q.
    pub fn from_i64(&self, values: &[i64], a: &mut Poly<u64>) {
        debug_assert!(values.len() == a.n(), "values.len()={} != a.n()={}", values.len(), a.n());
        let q: u64 = self.modulus.q;
        izip!(a.0.iter_mut(), values.iter()).for_each(|(a, &v)| {
            *a = v.rem_euclid(q as i64) as u64;
        });
    }

    /// Sets a to `values` mod q.
    pub fn from_u64(&self, values: &[u64], a: &mut Poly<u64>) {
        debug_assert!(values.len() <= a.n(), "values.len()={} > a.n()={}", values.len(), a.n());
        let q: u64 = self.modulus.q;
        a.zero();
        izip!(a.0.iter_mut(), values.iter()).for_each(|(a, &v)| *a = v % q);
    }
}

impl Ring<u64> {
    pub fn ntt_inplace(&self, poly: &mut Poly<u64>) {
        self.dft.forward_inplace(&mut poly.0)
    }

    pub fn intt_inplace(&self, poly: &mut Poly<u64>) {
        self.dft.backward_inplace(&mut poly.0)
    }

    pub fn ntt(&self, poly_in: &Poly<u64>, poly_out: &mut Poly<u64>) {
        poly_out.0.copy_from_slice(&poly_in.0);
        self.dft.forward_inplace(&mut poly_out.0)
    }

    pub fn intt(&self, poly_in: &Poly<u64>, poly_out: &mut Poly<u64>) {
        poly_out.0.copy_from_slice(&poly_in.0);
        self.dft.backward_inplace(&mut poly_out.0)
    }
}

impl Ring<u64> {
    /// b <- a + b
    #[inline(always)]
    pub fn add_inplace(&self, a: &Poly<u64>, b: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        let q: u64 = self.modulus.q;
        izip!(a.0.iter(), b.0.iter_mut()).for_each(|(a, b)| *b = (*a + *b).reduce_once(q));
    }

    /// c <- a + b
    #[inline(always)]
    pub fn add(&self, a: &Poly<u64>, b: &Poly<u64>, c: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        debug_assert!(c.n() == self.n(), "c.n()={} != n={}", c.n(), self.n());
        let q: u64 = self.modulus.q;
        izip!(a.0.iter(), b.0.iter(), c.0.iter_mut())
            .for_each(|(a, b, c)| *c = (*a + *b).reduce_once(q));
    }

    /// b <- b - a
    #[inline(always)]
    pub fn sub_inplace(&self, a: &Poly<u64>, b: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        let q: u64 = self.modulus.q;
        izip!(a.0.iter(), b.0.iter_mut()).for_each(|(a, b)| *b = (*b + q - *a).reduce_once(q));
    }

    /// c <- a - b
    #[inline(always)]
    pub fn sub(&self, a: &Poly<u64>, b: &Poly<u64>, c: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        debug_assert!(c.n() == self.n(), "c.n()={} != n={}", c.n(), self.n());
        let q: u64 = self.modulus.q;
        izip!(a.0.iter(), b.0.iter(), c.0.iter_mut())
            .for_each(|(a, b, c)| *c = (*a + q - *b).reduce_once(q));
    }

    /// a <- -a
    #[inline(always)]
    pub fn neg_inplace(&self, a: &mut Poly<u64>) {
        let q: u64 = self.modulus.q;
        a.0.iter_mut().for_each(|a| *a = (q - *a).reduce_once(q));
    }

    /// a <- a * scalar
    #[inline(always)]
    pub fn mul_scalar_inplace(&self, scalar: u64, a: &mut Poly<u64>) {
        let prepared = self.modulus.prepare(scalar % self.modulus.q);
        a.0.iter_mut()
            .for_each(|a| *a = self.modulus.mul_prepared(&prepared, *a));
    }

    /// c <- a * b, both in the NTT domain.
    #[inline(always)]
    pub fn mul_ntt(&self, a: &Poly<u64>, b: &Poly<u64>, c: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        debug_assert!(c.n() == self.n(), "c.n()={} != n={}", c.n(), self.n());
        izip!(a.0.iter(), b.0.iter(), c.0.iter_mut())
            .for_each(|(a, b, c)| *c = self.modulus.mul(*a, *b));
    }

    /// c <- c + a * b, all in the NTT domain.
    #[inline(always)]
    pub fn mul_ntt_add_inplace(&self, a: &Poly<u64>, b: &Poly<u64>, c: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        debug_assert!(c.n() == self.n(), "c.n()={} != n={}", c.n(), self.n());
        let q: u64 = self.modulus.q;
        izip!(a.0.iter(), b.0.iter(), c.0.iter_mut())
            .for_each(|(a, b, c)| *c = (*c + self.modulus.mul(*a, *b)).reduce_once(q));
    }
}
