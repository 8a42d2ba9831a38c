use crate::context::Context;
use crate::keys::{
    GaloisKeys, KeyId, KeySwitchKey, PublicKey, RelinearizationKey, SecretKey, expand_seed,
};
use rns::automorphism::AutoPerm;
use rns::poly::PolyRNS;
use rns::ring::RingRNS;
use sampling::source::Source;
use utils::map::Map;

/// Consumer-side generation of a key pair and its evaluation keys.
pub struct KeyGenerator<'a> {
    context: &'a Context,
    source: Source,
    sk: SecretKey,
    pk: PublicKey,
}

impl<'a> KeyGenerator<'a> {
    pub fn new(context: &'a Context) -> Self {
        Self::from_source(context, Source::from_entropy())
    }

    /// Deterministic key generation from a 32-byte seed.
    pub fn from_seed(context: &'a Context, seed: [u8; 32]) -> Self {
        Self::from_source(context, Source::new(seed))
    }

    fn from_source(context: &'a Context, mut source: Source) -> Self {
        let ring: &RingRNS<u64> = &context.ring_q;

        let mut s: PolyRNS<u64> = ring.new_polyrns();
        let values: Vec<i64> = ring.fill_ternary(&mut source, &mut s);
        ring.ntt_inplace(&mut s);

        let seed: [u8; 32] = source.new_seed();
        let p1: PolyRNS<u64> = expand_seed(context, seed);

        let mut e: PolyRNS<u64> = ring.new_polyrns();
        ring.fill_gaussian(&context.gaussian, &mut source, &mut e);
        ring.ntt_inplace(&mut e);

        // p0 = -(a*s + e)
        let mut p0: PolyRNS<u64> = ring.new_polyrns();
        ring.mul_ntt(&p1, &s, &mut p0);
        ring.add_inplace(&e, &mut p0);
        ring.neg_inplace(&mut p0);

        let key_id: KeyId = KeyId::derive(context, &seed, &p0);

        Self {
            context,
            source,
            sk: SecretKey::from_values(context, key_id, values),
            pk: PublicKey {
                key_id,
                seed,
                p0,
                p1,
            },
        }
    }

    pub fn key_id(&self) -> KeyId {
        self.pk.key_id
    }

    pub fn secret_key(&self) -> &SecretKey {
        &self.sk
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.pk
    }

    pub fn relinearization_key(&mut self) -> RelinearizationKey {
        let context: &'a Context = self.context;
        let ring: &RingRNS<u64> = &context.ring_q;
        let mut s2: PolyRNS<u64> = ring.new_polyrns();
        ring.mul_ntt(&self.sk.s_ntt, &self.sk.s_ntt, &mut s2);
        RelinearizationKey {
            key_id: self.pk.key_id,
            key: self.key_switch_key(&s2),
        }
    }

    /// Keys for every rotation used by the slot sum.
    pub fn galois_keys(&mut self) -> GaloisKeys {
        let elements: Vec<usize> = self.context.sum_galois_elements().to_vec();
        self.galois_keys_for(&elements)
    }

    pub fn galois_keys_for(&mut self, galois_elements: &[usize]) -> GaloisKeys {
        let context: &'a Context = self.context;
        let ring: &RingRNS<u64> = &context.ring_q;
        let mut keys: Map<usize, KeySwitchKey> = Map::new();
        let mut s_auto: PolyRNS<u64> = ring.new_polyrns();
        for &gal_el in galois_elements {
            if keys.contains_key(&gal_el) {
                continue;
            }
            let perm: AutoPerm = AutoPerm::new::<u64, true>(ring.at(0), gal_el);
            ring.automorphism_from_perm(&self.sk.s_ntt, &perm, &mut s_auto);
            let key: KeySwitchKey = self.key_switch_key(&s_auto);
            keys.insert(gal_el, key);
        }
        GaloisKeys {
            key_id: self.pk.key_id,
            keys,
        }
    }

    /// Key switching key from w (NTT domain) to s.
    fn key_switch_key(&mut self, w: &PolyRNS<u64>) -> KeySwitchKey {
        let context: &'a Context = self.context;
        let ring: &RingRNS<u64> = &context.ring_q;
        let digits: usize = ring.level() + 1;

        let mut seeds: Vec<[u8; 32]> = Vec::with_capacity(digits);
        let mut b: Vec<PolyRNS<u64>> = Vec::with_capacity(digits);
        let mut a: Vec<PolyRNS<u64>> = Vec::with_capacity(digits);

        let mut e: PolyRNS<u64> = ring.new_polyrns();

        for i in 0..digits {
            let seed: [u8; 32] = self.source.new_seed();
            let a_i: PolyRNS<u64> = expand_seed(context, seed);

            ring.fill_gaussian(&context.gaussian, &mut self.source, &mut e);
            ring.ntt_inplace(&mut e);

            // b_i = -(a_i*s + e_i) + w*g_i
            let mut b_i: PolyRNS<u64> = ring.new_polyrns();
            ring.mul_ntt(&a_i, &self.sk.s_ntt, &mut b_i);
            ring.add_inplace(&e, &mut b_i);
            ring.neg_inplace(&mut b_i);
            ring.at(i).add_inplace(w.at(i), b_i.at_mut(i));

            seeds.push(seed);
            b.push(b_i);
            a.push(a_i);
        }

        KeySwitchKey { seeds, b, a }
    }
}
