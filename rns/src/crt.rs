use crate::modulus::prime::Prime;
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{ToPrimitive, Zero};

/// Chinese remainder reconstruction for a basis of pairwise distinct primes.
#[derive(Clone, Debug)]
pub struct CrtBasis {
    primes: Vec<Prime<u64>>,
    product: BigUint,
    half_product: BigUint,
    /// Q / q_i.
    q_hat: Vec<BigUint>,
    /// (Q / q_i)^-1 mod q_i.
    q_hat_inv: Vec<u64>,
}

impl CrtBasis {
    pub fn new(moduli: &[u64]) -> Self {
        assert!(!moduli.is_empty(), "invalid moduli: empty basis");
        let primes: Vec<Prime<u64>> = moduli.iter().map(|&q| Prime::new(q)).collect();
        let product: BigUint = moduli
            .iter()
            .fold(BigUint::from(1u64), |acc, &q| acc * BigUint::from(q));
        let half_product: BigUint = &product >> 1;
        let q_hat: Vec<BigUint> = moduli.iter().map(|&q| &product / q).collect();
        let q_hat_inv: Vec<u64> = primes
            .iter()
            .zip(q_hat.iter())
            .map(|(prime, q_hat_i)| {
                let residue: u64 = (q_hat_i % prime.q).to_u64().unwrap_or_default();
                prime.inv(residue)
            })
            .collect();
        Self {
            primes,
            product,
            half_product,
            q_hat,
            q_hat_inv,
        }
    }

    pub fn len(&self) -> usize {
        self.primes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primes.is_empty()
    }

    pub fn product(&self) -> &BigUint {
        &self.product
    }

    /// Bit size of the product of the moduli.
    pub fn bits(&self) -> u64 {
        self.product.bits()
    }

    /// Returns the unique x in [0, Q) with x = residues[i] mod q_i.
    pub fn reconstruct(&self, residues: &[u64]) -> BigUint {
        assert!(
            residues.len() == self.primes.len(),
            "invalid residues.len()={} != basis size {}",
            residues.len(),
            self.primes.len()
        );
        let mut acc: BigUint = BigUint::zero();
        for (i, prime) in self.primes.iter().enumerate() {
            let scaled: u64 = prime.mul(residues[i], self.q_hat_inv[i]);
            acc += &self.q_hat[i] * scaled;
        }
        acc % &self.product
    }

    /// Returns the unique x in (-Q/2, Q/2] with x = residues[i] mod q_i.
    pub fn reconstruct_centered(&self, residues: &[u64]) -> BigInt {
        let x: BigUint = self.reconstruct(residues);
        if x > self.half_product {
            BigInt::from(x) - BigInt::from(self.product.clone())
        } else {
            BigInt::from(x)
        }
    }

    /// Writes x mod q_i into out[i].
    pub fn reduce(&self, x: &BigInt, out: &mut [u64]) {
        assert!(
            out.len() == self.primes.len(),
            "invalid out.len()={} != basis size {}",
            out.len(),
            self.primes.len()
        );
        let (sign, magnitude) = (x.sign(), x.magnitude());
        for (prime, o) in self.primes.iter().zip(out.iter_mut()) {
            let r: u64 = (magnitude % prime.q).to_u64().unwrap_or_default();
            *o = if sign == Sign::Minus { prime.neg(r) } else { r };
        }
    }
}
