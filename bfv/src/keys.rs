use crate::context::Context;
use rns::poly::PolyRNS;
use sampling::source::Source;
use sha2::{Digest, Sha256};
use std::fmt;
use utils::map::Map;

/// Short identifier of a consumer public key, shared by every artifact
/// derived from it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct KeyId(pub [u8; 8]);

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|b| write!(f, "{:02x}", b))
    }
}

impl KeyId {
    pub(crate) fn derive(context: &Context, seed: &[u8; 32], p0: &PolyRNS<u64>) -> Self {
        let mut hasher: Sha256 = Sha256::new();
        hasher.update(b"bfv-key-id");
        hasher.update(context.fingerprint());
        hasher.update(seed);
        p0.0.iter()
            .flat_map(|poly| poly.0.iter())
            .for_each(|x| hasher.update(x.to_le_bytes()));
        let digest = hasher.finalize();
        let mut id: [u8; 8] = [0u8; 8];
        id.copy_from_slice(&digest[..8]);
        KeyId(id)
    }
}

/// Ternary secret s.
#[derive(Clone, Debug)]
pub struct SecretKey {
    pub(crate) key_id: KeyId,
    pub(crate) values: Vec<i64>,
    pub(crate) s_ntt: PolyRNS<u64>,
}

impl SecretKey {
    pub(crate) fn from_values(context: &Context, key_id: KeyId, values: Vec<i64>) -> Self {
        let mut s_ntt: PolyRNS<u64> = context.ring_q.new_polyrns();
        context.ring_q.from_i64(&values, &mut s_ntt);
        context.ring_q.ntt_inplace(&mut s_ntt);
        Self {
            key_id,
            values,
            s_ntt,
        }
    }

    pub fn key_id(&self) -> KeyId {
        self.key_id
    }
}

/// (p0, p1) = (-(a*s + e), a) in the NTT domain, with a expanded from a seed.
#[derive(Clone, Debug, PartialEq)]
pub struct PublicKey {
    pub(crate) key_id: KeyId,
    pub(crate) seed: [u8; 32],
    pub(crate) p0: PolyRNS<u64>,
    pub(crate) p1: PolyRNS<u64>,
}

impl PublicKey {
    pub fn key_id(&self) -> KeyId {
        self.key_id
    }
}

/// Key switching material from a source secret w to s, one digit per RNS
/// limb: b_i + a_i*s = w*g_i - e_i, with g_i = 1 mod q_i and 0 mod q_j for j != i.
#[derive(Clone, Debug, PartialEq)]
pub struct KeySwitchKey {
    pub(crate) seeds: Vec<[u8; 32]>,
    pub(crate) b: Vec<PolyRNS<u64>>,
    pub(crate) a: Vec<PolyRNS<u64>>,
}

impl KeySwitchKey {
    pub fn digits(&self) -> usize {
        self.b.len()
    }
}

/// Switches s^2 to s.
#[derive(Clone, Debug, PartialEq)]
pub struct RelinearizationKey {
    pub(crate) key_id: KeyId,
    pub(crate) key: KeySwitchKey,
}

impl RelinearizationKey {
    pub fn key_id(&self) -> KeyId {
        self.key_id
    }
}

/// Switches s(X^g) to s, keyed by Galois element g.
#[derive(Clone, Debug)]
pub struct GaloisKeys {
    pub(crate) key_id: KeyId,
    pub(crate) keys: Map<usize, KeySwitchKey>,
}

impl GaloisKeys {
    pub fn key_id(&self) -> KeyId {
        self.key_id
    }

    pub fn get(&self, gal_el: usize) -> Option<&KeySwitchKey> {
        self.keys.get(&gal_el)
    }

    pub fn contains(&self, gal_el: usize) -> bool {
        self.keys.contains_key(&gal_el)
    }

    /// Galois elements in increasing order.
    pub fn galois_elements(&self) -> Vec<usize> {
        let mut elements: Vec<usize> = self.keys.keys().copied().collect();
        elements.sort_unstable();
        elements
    }
}

/// Uniform polynomial mod q, read as an NTT-domain value, expanded from a seed.
pub(crate) fn expand_seed(context: &Context, seed: [u8; 32]) -> PolyRNS<u64> {
    let mut source: Source = Source::new(seed);
    let mut a: PolyRNS<u64> = context.ring_q.new_polyrns();
    context.ring_q.fill_uniform(&mut source, &mut a);
    a
}
