//! Heuristic worst-case tracking of ciphertext noise.
//!
//! Every ciphertext carries an upper estimate of the infinity norm of its
//! noise, in bits. The evaluator updates it on each operation and refuses to
//! produce a ciphertext whose estimate crosses [NoiseModel::limit_bits],
//! the point past which decryption could round to the wrong message.

use crate::error::{BfvError, Result};

/// Safety margin kept below log2(delta/2), in bits.
pub const SAFETY_MARGIN_BITS: f64 = 1.0;

#[derive(Clone, Debug)]
pub struct NoiseModel {
    /// Expansion factor of a ring product, heuristic sqrt(n).
    expansion: f64,
    plain_modulus: f64,
    /// Bound on a fresh error coefficient.
    error_bound: f64,
    /// Bound on the quotient of c0 + c1*s by q.
    quotient_bound: f64,
    key_switch: f64,
    fresh: f64,
    limit_bits: f64,
}

impl NoiseModel {
    pub fn new(
        n: usize,
        plain_modulus: u64,
        coeff_moduli: &[u64],
        error_bound: f64,
        log_delta: f64,
    ) -> Self {
        let expansion: f64 = (n as f64).sqrt();
        let q_max: f64 = coeff_moduli.iter().copied().max().unwrap_or(1) as f64;
        let digits: f64 = coeff_moduli.len() as f64;
        Self {
            expansion,
            plain_modulus: plain_modulus as f64,
            error_bound,
            quotient_bound: 1.0 + 1.5 * expansion,
            key_switch: digits * error_bound * q_max * expansion,
            fresh: error_bound * (2.0 * expansion + 1.0),
            limit_bits: log_delta - 1.0 - SAFETY_MARGIN_BITS,
        }
    }

    /// Largest admissible noise, in bits.
    pub fn limit_bits(&self) -> f64 {
        self.limit_bits
    }

    pub fn fresh(&self) -> f64 {
        self.fresh
    }

    pub fn error_bound(&self) -> f64 {
        self.error_bound
    }

    pub fn key_switch(&self) -> f64 {
        self.key_switch
    }

    pub fn add(&self, a: f64, b: f64) -> f64 {
        a + b
    }

    /// Noise of the tensor product of two ciphertexts, before relinearization.
    pub fn multiply(&self, a: f64, b: f64) -> f64 {
        let t: f64 = self.plain_modulus;
        let delta: f64 = self.expansion;
        t * delta * ((a + b) * (self.quotient_bound + 0.5) + t * self.quotient_bound)
            + delta * delta
    }

    pub fn relinearize(&self, a: f64) -> f64 {
        a + self.key_switch
    }

    /// Automorphisms permute coefficients, so only key switching adds noise.
    pub fn rotate(&self, a: f64) -> f64 {
        a + self.key_switch
    }

    /// Noise after summing all slots with `steps` rotate-and-add rounds.
    pub fn sum_elements(&self, a: f64, steps: usize) -> f64 {
        (0..steps).fold(a, |acc, _| self.add(acc, self.rotate(acc)))
    }

    /// Noise of the aggregate of `inputs` fresh ciphertexts.
    pub fn aggregate(&self, inputs: usize, sum_steps: usize) -> f64 {
        let mut noise: f64 = self.fresh;
        for _ in 1..inputs {
            noise = self.relinearize(self.multiply(noise, self.fresh));
        }
        self.sum_elements(noise, sum_steps)
    }

    /// Fails with [BfvError::NoiseBudgetExhausted] when `noise` exceeds the limit.
    pub fn check(&self, noise: f64) -> Result<f64> {
        let noise_bits: f64 = bits(noise);
        if !noise_bits.is_finite() || noise_bits > self.limit_bits {
            return Err(BfvError::NoiseBudgetExhausted {
                noise_bits,
                limit_bits: self.limit_bits,
            });
        }
        Ok(noise)
    }
}

/// log2 of a noise bound, with noise below 1 reported as 0 bits.
pub fn bits(noise: f64) -> f64 {
    if noise <= 1.0 { 0.0 } else { noise.log2() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_model() -> NoiseModel {
        let moduli: [u64; 3] = [68719230977, 68719403009, 137438822401];
        let log_q: f64 = moduli.iter().map(|&q| (q as f64).log2()).sum();
        let t: u64 = 1032193;
        NoiseModel::new(4096, t, &moduli, 19.0, log_q - (t as f64).log2())
    }

    #[test]
    fn fresh_is_small() {
        let model: NoiseModel = default_model();
        assert!(bits(model.fresh()) < 12.0);
        assert!(model.limit_bits() > 86.0 && model.limit_bits() < 88.0);
    }

    #[test]
    fn aggregation_depth() {
        let model: NoiseModel = default_model();
        assert!(model.check(model.aggregate(1, 12)).is_ok());
        assert!(model.check(model.aggregate(2, 12)).is_ok());
        assert!(matches!(
            model.check(model.aggregate(3, 12)),
            Err(BfvError::NoiseBudgetExhausted { .. })
        ));
    }

    #[test]
    fn growth_is_monotone() {
        let model: NoiseModel = default_model();
        let fresh: f64 = model.fresh();
        assert!(model.multiply(fresh, fresh) > fresh);
        assert!(model.relinearize(fresh) > fresh);
        assert!(model.sum_elements(fresh, 3) > model.sum_elements(fresh, 2));
    }
}
