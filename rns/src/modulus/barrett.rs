use crate::modulus::{NONE, ONCE, REDUCEMOD, ReduceOnce};

/// A constant prepared for repeated multiplication: (value, floor(value * 2^64 / q)).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Barrett<O>(pub O, pub O);

impl<O> Barrett<O> {
    #[inline(always)]
    pub fn value(&self) -> &O {
        &self.0
    }

    #[inline(always)]
    pub fn quotient(&self) -> &O {
        &self.1
    }
}

#[derive(Clone, Copy, Debug)]
pub struct BarrettPrecomp<O> {
    pub q: O,
    pub two_q: O,
    one: Barrett<O>,
}

impl BarrettPrecomp<u64> {
    pub fn new(q: u64) -> BarrettPrecomp<u64> {
        assert!(q < 1 << 62, "invalid modulus: q={} >= 2^62", q);
        let mut precomp: BarrettPrecomp<u64> = Self {
            q,
            two_q: q << 1,
            one: Barrett(0, 0),
        };
        precomp.one = precomp.prepare(1);
        precomp
    }

    #[inline(always)]
    pub fn one(&self) -> Barrett<u64> {
        self.one
    }

    #[inline(always)]
    pub fn prepare(&self, v: u64) -> Barrett<u64> {
        debug_assert!(v < self.q);
        let quotient: u64 = (((v as u128) << 64) / self.q as u128) as _;
        Barrett(v, quotient)
    }

    /// Reduces a double-word value modulo q.
    #[inline(always)]
    pub fn reduce_u128(&self, x: u128) -> u64 {
        (x % self.q as u128) as u64
    }

    #[inline(always)]
    pub fn mul_external<const REDUCE: REDUCEMOD>(&self, lhs: &Barrett<u64>, rhs: &u64) -> u64 {
        let mut r: u64 = *rhs;
        self.mul_external_assign::<REDUCE>(lhs, &mut r);
        r
    }

    /// Assigns lhs * rhs to rhs, with the output in [0, 2q) for NONE and [0, q) for ONCE.
    #[inline(always)]
    pub fn mul_external_assign<const REDUCE: REDUCEMOD>(&self, lhs: &Barrett<u64>, rhs: &mut u64) {
        let t: u64 = ((*lhs.quotient() as u128 * *rhs as u128) >> 64) as _;
        *rhs = (rhs.wrapping_mul(*lhs.value())).wrapping_sub(self.q.wrapping_mul(t));
        match REDUCE {
            NONE => {}
            ONCE => rhs.reduce_once_assign(self.q),
            _ => unreachable!("invalid REDUCE argument"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mul_external_matches_u128() {
        let q: u64 = 0x1fffffffffe00001u64;
        let precomp: BarrettPrecomp<u64> = BarrettPrecomp::new(q);
        let x: u64 = 0x1234567890abcdefu64 % q;
        let y: Barrett<u64> = precomp.prepare(0x0fedcba987654321u64 % q);
        let want: u64 = ((x as u128 * *y.value() as u128) % q as u128) as u64;
        assert_eq!(precomp.mul_external::<ONCE>(&y, &x), want);
        assert_eq!(precomp.mul_external::<ONCE>(&precomp.one(), &x), x);
    }
}
