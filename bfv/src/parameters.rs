use crate::error::{BfvError, Result};
use rns::modulus::prime_generation::NTTFriendlyPrimesGenerator;
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Largest prime bit size accepted in the coefficient modulus.
pub const MAX_COEFF_MODULUS_BITS: u32 = 61;

/// Classical security targets of the homomorphic encryption standard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SecurityLevel {
    TC128,
    TC192,
    TC256,
}

impl SecurityLevel {
    /// Largest total coefficient-modulus bit count for a ternary secret at degree n.
    pub fn max_log_q(&self, n: usize) -> Option<u32> {
        let table: [(usize, [u32; 3]); 6] = [
            (1024, [27, 19, 14]),
            (2048, [54, 37, 29]),
            (4096, [109, 75, 58]),
            (8192, [218, 152, 118]),
            (16384, [438, 305, 237]),
            (32768, [881, 611, 476]),
        ];
        let column: usize = match self {
            SecurityLevel::TC128 => 0,
            SecurityLevel::TC192 => 1,
            SecurityLevel::TC256 => 2,
        };
        table
            .iter()
            .find(|(degree, _)| *degree == n)
            .map(|(_, bounds)| bounds[column])
    }

    pub fn bits(&self) -> u32 {
        match self {
            SecurityLevel::TC128 => 128,
            SecurityLevel::TC192 => 192,
            SecurityLevel::TC256 => 256,
        }
    }

    pub(crate) fn to_byte(self) -> u8 {
        match self {
            SecurityLevel::TC128 => 0,
            SecurityLevel::TC192 => 1,
            SecurityLevel::TC256 => 2,
        }
    }
}

impl fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tc{}", self.bits())
    }
}

impl FromStr for SecurityLevel {
    type Err = BfvError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "tc128" | "128" => Ok(SecurityLevel::TC128),
            "tc192" | "192" => Ok(SecurityLevel::TC192),
            "tc256" | "256" => Ok(SecurityLevel::TC256),
            other => Err(BfvError::InvalidParameters(format!(
                "unknown security level {:?}",
                other
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParametersLiteral {
    pub poly_modulus_degree: usize,
    pub coeff_modulus_bits: Vec<u32>,
    pub plain_modulus_bits: u32,
    pub security_level: SecurityLevel,
}

impl Default for ParametersLiteral {
    fn default() -> Self {
        Self {
            poly_modulus_degree: 4096,
            coeff_modulus_bits: vec![36, 36, 37],
            plain_modulus_bits: 20,
            security_level: SecurityLevel::TC128,
        }
    }
}

/// Validated parameter set with its concrete moduli.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parameters {
    n: usize,
    coeff_moduli: Vec<u64>,
    plain_modulus: u64,
    security_level: SecurityLevel,
    fingerprint: [u8; 8],
}

impl Parameters {
    pub fn new(p: &ParametersLiteral) -> Result<Self> {
        let n: usize = p.poly_modulus_degree;
        let security_level: SecurityLevel = p.security_level;

        let max_log_q: u32 = security_level.max_log_q(n).ok_or_else(|| {
            BfvError::InvalidParameters(format!(
                "poly_modulus_degree={} is not a supported power of two in [1024, 32768]",
                n
            ))
        })?;

        if p.coeff_modulus_bits.is_empty() {
            return Err(BfvError::InvalidParameters(
                "coeff_modulus_bits is empty".to_string(),
            ));
        }

        let nth_root: u64 = 2 * n as u64;
        let min_bits: u32 = nth_root.trailing_zeros() + 2;

        for &bits in p.coeff_modulus_bits.iter() {
            if !(min_bits..=MAX_COEFF_MODULUS_BITS).contains(&bits) {
                return Err(BfvError::InvalidParameters(format!(
                    "coefficient modulus size {} not in [{}, {}]",
                    bits, min_bits, MAX_COEFF_MODULUS_BITS
                )));
            }
        }

        let log_q: u32 = p.coeff_modulus_bits.iter().sum();
        if log_q > max_log_q {
            return Err(BfvError::InvalidParameters(format!(
                "coefficient modulus of {} bits exceeds the {} bound of {} bits at n={}",
                log_q, security_level, max_log_q, n
            )));
        }

        let coeff_moduli: Vec<u64> = coeff_moduli_from_bits(&p.coeff_modulus_bits, nth_root)?;

        if !(min_bits..=MAX_COEFF_MODULUS_BITS).contains(&p.plain_modulus_bits) {
            return Err(BfvError::InvalidParameters(format!(
                "plain modulus size {} not in [{}, {}]",
                p.plain_modulus_bits, min_bits, MAX_COEFF_MODULUS_BITS
            )));
        }

        let plain_modulus: u64 = NTTFriendlyPrimesGenerator::new(p.plain_modulus_bits, nth_root)
            .next_downstream_prime()
            .ok_or_else(|| {
                BfvError::InvalidParameters(format!(
                    "no batching prime of {} bits for n={}",
                    p.plain_modulus_bits, n
                ))
            })?;

        if coeff_moduli.contains(&plain_modulus) {
            return Err(BfvError::InvalidParameters(format!(
                "plain modulus {} collides with a coefficient modulus prime",
                plain_modulus
            )));
        }

        if p.plain_modulus_bits + 1 >= log_q {
            return Err(BfvError::InvalidParameters(format!(
                "plain modulus of {} bits leaves no room in a {}-bit coefficient modulus",
                p.plain_modulus_bits, log_q
            )));
        }

        let fingerprint: [u8; 8] = fingerprint(n, &coeff_moduli, plain_modulus, security_level);

        Ok(Self {
            n,
            coeff_moduli,
            plain_modulus,
            security_level,
            fingerprint,
        })
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn log_n(&self) -> usize {
        self.n.trailing_zeros() as usize
    }

    pub fn coeff_moduli(&self) -> &[u64] {
        &self.coeff_moduli
    }

    pub fn plain_modulus(&self) -> u64 {
        self.plain_modulus
    }

    pub fn security_level(&self) -> SecurityLevel {
        self.security_level
    }

    /// Number of batching slots.
    pub fn slots(&self) -> usize {
        self.n
    }

    /// First 8 bytes of the SHA-256 of the canonical parameter encoding.
    pub fn fingerprint(&self) -> [u8; 8] {
        self.fingerprint
    }
}

/// Distinct NTT-friendly primes, one per requested size. Primes of equal
/// size are taken in decreasing order.
fn coeff_moduli_from_bits(bits: &[u32], nth_root: u64) -> Result<Vec<u64>> {
    let mut generators: Vec<NTTFriendlyPrimesGenerator> = Vec::new();
    let mut moduli: Vec<u64> = Vec::with_capacity(bits.len());
    for &size in bits {
        let position: usize = match generators.iter().position(|g| g.bit_size() == size) {
            Some(position) => position,
            None => {
                generators.push(NTTFriendlyPrimesGenerator::new(size, nth_root));
                generators.len() - 1
            }
        };
        let q: u64 = generators[position].next_downstream_prime().ok_or_else(|| {
            BfvError::InvalidParameters(format!(
                "not enough {}-bit primes equal to 1 mod {}",
                size, nth_root
            ))
        })?;
        moduli.push(q);
    }
    Ok(moduli)
}

fn fingerprint(n: usize, coeff_moduli: &[u64], plain_modulus: u64, level: SecurityLevel) -> [u8; 8] {
    let mut hasher: Sha256 = Sha256::new();
    hasher.update(b"bfv-params");
    hasher.update((n as u64).to_le_bytes());
    hasher.update((coeff_moduli.len() as u64).to_le_bytes());
    coeff_moduli.iter().for_each(|q| hasher.update(q.to_le_bytes()));
    hasher.update(plain_modulus.to_le_bytes());
    hasher.update([level.to_byte()]);
    let digest = hasher.finalize();
    let mut out: [u8; 8] = [0u8; 8];
    out.copy_from_slice(&digest[..8]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_parameters() {
        let params: Parameters = Parameters::new(&ParametersLiteral::default()).unwrap();
        assert_eq!(params.n(), 4096);
        assert_eq!(params.slots(), 4096);
        assert_eq!(params.plain_modulus(), 1032193);
        assert_eq!(params.coeff_moduli().len(), 3);
        let mut sorted: Vec<u64> = params.coeff_moduli().to_vec();
        sorted.dedup();
        assert_eq!(sorted.len(), 3);
        for (&q, bits) in params.coeff_moduli().iter().zip([36, 36, 37]) {
            assert_eq!(64 - q.leading_zeros(), bits);
            assert_eq!(q % 8192, 1);
        }
    }

    #[test]
    fn rejects_inconsistent_parameters() {
        let base: ParametersLiteral = ParametersLiteral::default();

        let mut p: ParametersLiteral = base.clone();
        p.poly_modulus_degree = 3000;
        assert!(matches!(Parameters::new(&p), Err(BfvError::InvalidParameters(_))));

        let mut p: ParametersLiteral = base.clone();
        p.coeff_modulus_bits = vec![];
        assert!(matches!(Parameters::new(&p), Err(BfvError::InvalidParameters(_))));

        let mut p: ParametersLiteral = base.clone();
        p.coeff_modulus_bits = vec![40, 40, 40];
        assert!(matches!(Parameters::new(&p), Err(BfvError::InvalidParameters(_))));

        let mut p: ParametersLiteral = base.clone();
        p.coeff_modulus_bits = vec![60, 10];
        assert!(matches!(Parameters::new(&p), Err(BfvError::InvalidParameters(_))));

        let mut p: ParametersLiteral = base.clone();
        p.plain_modulus_bits = 13;
        assert!(matches!(Parameters::new(&p), Err(BfvError::InvalidParameters(_))));

        let mut p: ParametersLiteral = base;
        p.security_level = SecurityLevel::TC192;
        assert!(matches!(Parameters::new(&p), Err(BfvError::InvalidParameters(_))));
    }

    #[test]
    fn fingerprint_depends_on_every_parameter() {
        let a: Parameters = Parameters::new(&ParametersLiteral::default()).unwrap();
        let mut literal: ParametersLiteral = ParametersLiteral::default();
        literal.plain_modulus_bits = 21;
        let b: Parameters = Parameters::new(&literal).unwrap();
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint(), Parameters::new(&ParametersLiteral::default()).unwrap().fingerprint());
    }

    #[test]
    fn security_level_from_str() {
        assert_eq!("tc128".parse::<SecurityLevel>().unwrap(), SecurityLevel::TC128);
        assert_eq!("TC256".parse::<SecurityLevel>().unwrap(), SecurityLevel::TC256);
        assert!("tc512".parse::<SecurityLevel>().is_err());
        assert_eq!(SecurityLevel::TC192.to_string(), "tc192");
    }
}
