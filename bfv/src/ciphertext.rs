use crate::keys::KeyId;
use crate::noise;
use rns::poly::PolyRNS;

/// BFV ciphertext (c0, c1[, c2]) in the coefficient domain, decrypting to
/// c0 + c1*s + c2*s^2.
#[derive(Clone, Debug, PartialEq)]
pub struct Ciphertext {
    pub(crate) parts: Vec<PolyRNS<u64>>,
    /// Upper estimate of the noise infinity norm.
    pub(crate) noise: f64,
    pub(crate) key_id: KeyId,
}

impl Ciphertext {
    pub fn size(&self) -> usize {
        self.parts.len()
    }

    pub fn parts(&self) -> &[PolyRNS<u64>] {
        &self.parts
    }

    pub fn key_id(&self) -> KeyId {
        self.key_id
    }

    pub fn noise_estimate(&self) -> f64 {
        self.noise
    }

    pub fn noise_estimate_bits(&self) -> f64 {
        noise::bits(self.noise)
    }
}
