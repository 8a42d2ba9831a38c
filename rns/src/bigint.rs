use num_bigint::BigInt;
use num_bigint::Sign;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

pub trait Div {
    fn div_floor(&self, other: &Self) -> Self;
    fn div_round(&self, other: &Self) -> Self;
}

impl Div for BigInt {
    /// Division rounded toward negative infinity. `other` must be positive.
    fn div_floor(&self, other: &Self) -> Self {
        let (quo, rem) = self.div_rem(other);
        if rem.sign() == Sign::Minus {
            quo - BigInt::one()
        } else {
            quo
        }
    }

    /// Division rounded to the nearest integer, ties away from zero. `other` must be positive.
    fn div_round(&self, other: &Self) -> Self {
        let (quo, mut rem) = self.div_rem(other);
        rem <<= 1;
        if !rem.is_zero() && &rem.abs() >= other {
            if rem.sign() == Sign::Minus {
                quo - BigInt::one()
            } else {
                quo + BigInt::one()
            }
        } else {
            quo
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bi(x: i64) -> BigInt {
        BigInt::from(x)
    }

    #[test]
    fn div_floor() {
        assert_eq!(Div::div_floor(&bi(7), &bi(2)), bi(3));
        assert_eq!(Div::div_floor(&bi(-7), &bi(2)), bi(-4));
        assert_eq!(Div::div_floor(&bi(-8), &bi(2)), bi(-4));
        // Integer::div_floor agrees for positive divisors.
        assert_eq!(Integer::div_floor(&bi(-7), &bi(2)), bi(-4));
    }

    #[test]
    fn div_round() {
        assert_eq!(bi(7).div_round(&bi(3)), bi(2));
        assert_eq!(bi(8).div_round(&bi(3)), bi(3));
        assert_eq!(bi(-8).div_round(&bi(3)), bi(-3));
        assert_eq!(bi(5).div_round(&bi(2)), bi(3));
        assert_eq!(bi(-5).div_round(&bi(2)), bi(-3));
        assert_eq!(bi(0).div_round(&bi(5)), bi(0));
    }
}
