use crate::error::{BfvError, Result};
use crate::noise::NoiseModel;
use crate::parameters::{Parameters, ParametersLiteral};
use num_bigint::{BigInt, BigUint};
use num_traits::ToPrimitive;
use rns::automorphism::{AutoPerm, AutoPermMap};
use rns::modulus::WordOps;
use rns::modulus::prime_generation::NTTFriendlyPrimesGenerator;
use rns::ring::{Ring, RingRNS, galois_element};
use sampling::distributions::{DEFAULT_BOUND_FACTOR, DEFAULT_SIGMA, TruncatedGaussian};
use std::borrow::Cow;

/// Bit size of the primes of the auxiliary basis used for exact tensoring.
pub const AUX_MODULUS_BITS: u32 = 60;

/// Largest number of inputs checked by [Context::max_aggregation_inputs].
const MAX_PROBED_INPUTS: usize = 64;

/// Immutable scheme state shared by every operation on one parameter set.
pub struct Context {
    params: Parameters,
    /// Z_q[X]/(X^n+1), one limb per coefficient prime.
    pub(crate) ring_q: RingRNS<u64>,
    /// Basis wide enough to hold the integer tensor product of two ciphertexts.
    pub(crate) ring_aux: RingRNS<u64>,
    /// Z_t[X]/(X^n+1), used by the batch encoder.
    pub(crate) ring_t: Ring<u64>,
    /// Slot index -> NTT index in ring_t.
    pub(crate) slot_index: Vec<usize>,
    pub(crate) q: BigInt,
    pub(crate) t: BigInt,
    pub(crate) delta: BigInt,
    /// floor(q/t) mod q_i.
    pub(crate) delta_rns: Vec<u64>,
    pub(crate) log_delta: f64,
    /// Coefficient-domain permutations for every rotation used by the slot sum.
    pub(crate) auto_perms: AutoPermMap,
    pub(crate) sum_galois_elements: Vec<usize>,
    pub(crate) gaussian: TruncatedGaussian,
    pub(crate) noise: NoiseModel,
}

impl Context {
    pub fn new(literal: &ParametersLiteral) -> Result<Self> {
        Self::from_parameters(Parameters::new(literal)?)
    }

    pub fn from_parameters(params: Parameters) -> Result<Self> {
        let n: usize = params.n();
        let t_u64: u64 = params.plain_modulus();

        let ring_q: RingRNS<u64> = RingRNS::new(n, params.coeff_moduli());
        let ring_t: Ring<u64> = Ring::new(n, t_u64);

        let q: BigInt = BigInt::from(ring_q.crt().product().clone());
        let t: BigInt = BigInt::from(t_u64);
        let delta: BigInt = &q / &t;

        let delta_rns: Vec<u64> = params
            .coeff_moduli()
            .iter()
            .map(|&qi| (&delta % qi).to_u64().unwrap_or_default())
            .collect();

        let log_delta: f64 = log2_bigint(&delta);

        // |tensor| < 2n(q/2)^2, and the centered lift needs one more bit.
        let aux_bits: u64 = 2 * ring_q.crt().bits() + n.log2() as u64 + 2;
        let aux_count: usize = aux_bits.div_ceil((AUX_MODULUS_BITS - 1) as u64) as usize;
        let aux_moduli: Vec<u64> = NTTFriendlyPrimesGenerator::new(AUX_MODULUS_BITS, 2 * n as u64)
            .next_downstream_primes(aux_count)
            .ok_or_else(|| {
                BfvError::InvalidParameters(format!(
                    "not enough {}-bit primes for the multiplication basis",
                    AUX_MODULUS_BITS
                ))
            })?;
        let ring_aux: RingRNS<u64> = RingRNS::new(n, &aux_moduli);

        let slot_index: Vec<usize> = slot_index(n);

        let mut sum_galois_elements: Vec<usize> = Vec::new();
        let mut step: usize = 1;
        while step < n >> 1 {
            sum_galois_elements.push(galois_element(n, step as i64, false));
            step <<= 1;
        }
        sum_galois_elements.push(galois_element(n, 0, true));

        let mut auto_perms: AutoPermMap = AutoPermMap::new();
        sum_galois_elements
            .iter()
            .for_each(|&gal_el| auto_perms.generate::<u64, false>(ring_q.at(0), gal_el));

        let gaussian: TruncatedGaussian = TruncatedGaussian::new(DEFAULT_SIGMA, DEFAULT_BOUND_FACTOR)
            .map_err(|err| BfvError::InvalidParameters(format!("error distribution: {}", err)))?;

        let noise: NoiseModel = NoiseModel::new(
            n,
            t_u64,
            params.coeff_moduli(),
            gaussian.bound(),
            log_delta,
        );

        Ok(Self {
            params,
            ring_q,
            ring_aux,
            ring_t,
            slot_index,
            q,
            t,
            delta,
            delta_rns,
            log_delta,
            auto_perms,
            sum_galois_elements,
            gaussian,
            noise,
        })
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn n(&self) -> usize {
        self.params.n()
    }

    pub fn slots(&self) -> usize {
        self.params.slots()
    }

    pub fn plain_modulus(&self) -> u64 {
        self.params.plain_modulus()
    }

    pub fn coeff_moduli(&self) -> &[u64] {
        self.params.coeff_moduli()
    }

    pub fn fingerprint(&self) -> [u8; 8] {
        self.params.fingerprint()
    }

    /// Total bit size of the coefficient modulus.
    pub fn log_q(&self) -> f64 {
        log2_bigint(&self.q)
    }

    pub fn noise_model(&self) -> &NoiseModel {
        &self.noise
    }

    /// Galois elements of the rotations performed by a full slot sum, row
    /// rotations first and the column swap last.
    pub fn sum_galois_elements(&self) -> &[usize] {
        &self.sum_galois_elements
    }

    /// Number of rotate-and-add rounds in a full slot sum, log2(slots).
    pub fn sum_steps(&self) -> usize {
        self.sum_galois_elements.len()
    }

    /// Largest number of fresh ciphertexts whose aggregate stays within the
    /// noise limit, or 0 if not even a single slot sum fits.
    pub fn max_aggregation_inputs(&self) -> usize {
        (1..=MAX_PROBED_INPUTS)
            .take_while(|&inputs| {
                self.noise
                    .check(self.noise.aggregate(inputs, self.sum_steps()))
                    .is_ok()
            })
            .last()
            .unwrap_or(0)
    }

    /// Coefficient-domain permutation of X -> X^gal_el.
    pub(crate) fn auto_perm(&self, gal_el: usize) -> Cow<'_, AutoPerm> {
        match self.auto_perms.get(&gal_el) {
            Some(perm) => Cow::Borrowed(perm),
            None => Cow::Owned(AutoPerm::new::<u64, false>(self.ring_q.at(0), gal_el)),
        }
    }
}

/// Slot s < n/2 sits at the evaluation point psi^(3^s), slot n/2 + s at
/// psi^(-3^s). Returns the NTT index of each slot.
fn slot_index(n: usize) -> Vec<usize> {
    let cyclotomic_order: usize = n << 1;
    let mask: usize = cyclotomic_order - 1;
    let log_n: u32 = n.log2() as u32;
    let half: usize = n >> 1;
    let mut index: Vec<usize> = vec![0; n];
    let mut pow: usize = 1;
    for s in 0..half {
        let conjugate: usize = cyclotomic_order - pow;
        index[s] = ((pow - 1) >> 1).reverse_bits_msb(log_n);
        index[s + half] = ((conjugate - 1) >> 1).reverse_bits_msb(log_n);
        pow = (pow * rns::ring::GALOIS_GENERATOR) & mask;
    }
    index
}

pub(crate) fn log2_bigint(x: &BigInt) -> f64 {
    let magnitude: &BigUint = x.magnitude();
    let bits: u64 = magnitude.bits();
    if bits <= 64 {
        return magnitude.to_f64().unwrap_or(0.0).log2();
    }
    let shift: u64 = bits - 64;
    let top: f64 = (magnitude >> shift).to_f64().unwrap_or(0.0);
    top.log2() + shift as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_index_is_a_permutation() {
        let index: Vec<usize> = slot_index(64);
        let mut sorted: Vec<usize> = index.clone();
        sorted.sort();
        assert_eq!(sorted, (0..64).collect::<Vec<usize>>());
    }

    #[test]
    fn default_context() {
        let context: Context = Context::new(&ParametersLiteral::default()).unwrap();
        assert_eq!(context.slots(), 4096);
        assert_eq!(context.sum_steps(), 12);
        assert_eq!(*context.sum_galois_elements().last().unwrap(), 2 * 4096 - 1);
        assert!(context.log_q() > 108.0 && context.log_q() <= 109.0);
        assert_eq!(context.max_aggregation_inputs(), 2);
        assert!(context.ring_aux.crt().bits() > 2 * context.ring_q.crt().bits() + 12 + 1);
        let want_delta: BigInt = &context.q / &context.t;
        assert_eq!(context.delta, want_delta);
    }

    #[test]
    fn log2_of_large_integers() {
        let x: BigInt = BigInt::from(1u64) << 100;
        assert!((log2_bigint(&x) - 100.0).abs() < 1e-9);
        assert!((log2_bigint(&BigInt::from(1024)) - 10.0).abs() < 1e-9);
    }
}
