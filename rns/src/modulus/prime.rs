use crate::modulus::barrett::{Barrett, BarrettPrecomp};
use crate::modulus::{ONCE, ReduceOnce};

const MILLER_RABIN_WITNESSES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

#[derive(Clone, Copy, Debug)]
pub struct Prime<O> {
    /// Modulus.
    pub q: O,
    /// q-1.
    pub phi: O,
    pub barrett: BarrettPrecomp<O>,
}

impl Prime<u64> {
    /// Returns a new instance of Prime<u64>.
    /// Panics if q is not prime or q >= 2^62.
    pub fn new(q: u64) -> Self {
        assert!(is_prime(q), "invalid modulus: q={} is not prime", q);
        Self {
            q,
            phi: q - 1,
            barrett: BarrettPrecomp::new(q),
        }
    }

    #[inline(always)]
    pub fn q(&self) -> u64 {
        self.q
    }

    #[inline(always)]
    pub fn reduce(&self, x: u64) -> u64 {
        x % self.q
    }

    #[inline(always)]
    pub fn add(&self, a: u64, b: u64) -> u64 {
        (a + b).reduce_once(self.q)
    }

    #[inline(always)]
    pub fn sub(&self, a: u64, b: u64) -> u64 {
        (a + self.q - b).reduce_once(self.q)
    }

    #[inline(always)]
    pub fn neg(&self, a: u64) -> u64 {
        (self.q - a).reduce_once(self.q)
    }

    #[inline(always)]
    pub fn mul(&self, a: u64, b: u64) -> u64 {
        self.barrett.reduce_u128(a as u128 * b as u128)
    }

    #[inline(always)]
    pub fn prepare(&self, v: u64) -> Barrett<u64> {
        self.barrett.prepare(v)
    }

    #[inline(always)]
    pub fn mul_prepared(&self, a: &Barrett<u64>, b: u64) -> u64 {
        self.barrett.mul_external::<ONCE>(a, &b)
    }

    /// Returns x^exponent mod q.
    pub fn pow(&self, x: u64, exponent: u64) -> u64 {
        let mut y: u64 = 1;
        let mut x_pow: u64 = x % self.q;
        let mut e: u64 = exponent;
        while e > 0 {
            if e & 1 == 1 {
                y = self.mul(y, x_pow);
            }
            x_pow = self.mul(x_pow, x_pow);
            e >>= 1;
        }
        y
    }

    /// Returns x^-1 mod q. Panics if x = 0 mod q.
    pub fn inv(&self, x: u64) -> u64 {
        assert!(x % self.q != 0, "x = 0 mod q has no inverse");
        self.pow(x, self.phi - 1)
    }

    /// Returns the smallest-candidate primitive nth_root-th root of unity, with nth_root
    /// a power of two dividing q-1.
    ///
    /// Candidates are scanned in increasing order so that every process derives
    /// the same root for the same (q, nth_root).
    pub fn primitive_nth_root(&self, nth_root: u64) -> u64 {
        assert!(
            nth_root.is_power_of_two(),
            "invalid nth_root: {} is not a power of two",
            nth_root
        );
        assert!(
            self.phi % nth_root == 0,
            "invalid nth_root: q-1={} is not divisible by {}",
            self.phi,
            nth_root
        );
        let exponent: u64 = self.phi / nth_root;
        let half: u64 = nth_root >> 1;
        let mut candidate: u64 = 2;
        loop {
            let root: u64 = self.pow(candidate, exponent);
            // root has order nth_root iff root^(nth_root/2) = -1
            if self.pow(root, half) == self.q - 1 {
                return root;
            }
            candidate += 1;
        }
    }
}

#[inline(always)]
fn mul_mod(a: u64, b: u64, m: u64) -> u64 {
    ((a as u128 * b as u128) % m as u128) as u64
}

fn pow_mod(mut x: u64, mut e: u64, m: u64) -> u64 {
    let mut y: u64 = 1;
    x %= m;
    while e > 0 {
        if e & 1 == 1 {
            y = mul_mod(y, x, m);
        }
        x = mul_mod(x, x, m);
        e >>= 1;
    }
    y
}

/// Deterministic Miller-Rabin, exact for all 64-bit inputs.
pub fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    for p in MILLER_RABIN_WITNESSES {
        if n % p == 0 {
            return n == p;
        }
    }
    let s: u32 = (n - 1).trailing_zeros();
    let d: u64 = (n - 1) >> s;
    'witness: for a in MILLER_RABIN_WITNESSES {
        let mut x: u64 = pow_mod(a, d, n);
        if x == 1 || x == n - 1 {
            continue;
        }
        for _ in 1..s {
            x = mul_mod(x, x, n);
            if x == n - 1 {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primality() {
        assert!(!is_prime(0));
        assert!(!is_prime(1));
        assert!(is_prime(2));
        assert!(is_prime(37));
        assert!(!is_prime(561));
        assert!(is_prime(1032193));
        assert!(is_prime(0x1fffffffffe00001));
        assert!(!is_prime(3215031751));
    }

    #[test]
    fn inverse_and_root() {
        let prime: Prime<u64> = Prime::new(1032193);
        let x: u64 = 123456;
        assert_eq!(prime.mul(x, prime.inv(x)), 1);
        let psi: u64 = prime.primitive_nth_root(8192);
        assert_eq!(prime.pow(psi, 8192), 1);
        assert_eq!(prime.pow(psi, 4096), prime.q - 1);
        assert_eq!(psi, prime.primitive_nth_root(8192));
    }
}
