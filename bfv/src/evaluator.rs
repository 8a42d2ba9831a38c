use crate::ciphertext::Ciphertext;
use crate::context::Context;
use crate::error::{BfvError, Result};
use crate::key_switching::key_switch;
use crate::keys::{GaloisKeys, KeyId, KeySwitchKey, RelinearizationKey};
use num_bigint::BigInt;
use rns::automorphism::AutoPerm;
use rns::bigint::Div;
use rns::poly::PolyRNS;
use rns::ring::RingRNS;
use std::borrow::Cow;

/// Homomorphic operations over ciphertexts of one key pair.
///
/// Every operation first computes the noise estimate of its result and
/// fails with [BfvError::NoiseBudgetExhausted] before doing any work when
/// that estimate is past the decryption limit.
pub struct Evaluator<'a> {
    context: &'a Context,
}

impl<'a> Evaluator<'a> {
    pub fn new(context: &'a Context) -> Self {
        Self { context }
    }

    pub fn add(&self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
        check_key(a.key_id, b.key_id)?;
        if a.size() != b.size() {
            return Err(BfvError::InvalidCiphertext(format!(
                "cannot add ciphertexts of sizes {} and {}",
                a.size(),
                b.size()
            )));
        }
        let noise: f64 = self.context.noise.check(self.context.noise.add(a.noise, b.noise))?;
        let ring: &RingRNS<u64> = &self.context.ring_q;
        let parts: Vec<PolyRNS<u64>> = a
            .parts
            .iter()
            .zip(b.parts.iter())
            .map(|(a, b)| {
                let mut c: PolyRNS<u64> = ring.new_polyrns();
                ring.add(a, b, &mut c);
                c
            })
            .collect();
        Ok(Ciphertext {
            parts,
            noise,
            key_id: a.key_id,
        })
    }

    /// Tensor product of two size-2 ciphertexts, scaled by t/q and rounded.
    /// The result has size 3 and decrypts under (1, s, s^2).
    pub fn multiply(&self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
        check_key(a.key_id, b.key_id)?;
        check_size(a, 2)?;
        check_size(b, 2)?;

        let context: &Context = self.context;
        let noise: f64 = context.noise.check(context.noise.multiply(a.noise, b.noise))?;

        let aux: &RingRNS<u64> = &context.ring_aux;
        let lift = |part: &PolyRNS<u64>| -> PolyRNS<u64> {
            let mut lifted: PolyRNS<u64> = aux.new_polyrns();
            aux.from_bigint(&context.ring_q.to_bigint(part), &mut lifted);
            aux.ntt_inplace(&mut lifted);
            lifted
        };

        let (a0, a1) = (lift(&a.parts[0]), lift(&a.parts[1]));
        let (b0, b1) = (lift(&b.parts[0]), lift(&b.parts[1]));

        let mut d0: PolyRNS<u64> = aux.new_polyrns();
        let mut d1: PolyRNS<u64> = aux.new_polyrns();
        let mut d2: PolyRNS<u64> = aux.new_polyrns();
        aux.mul_ntt(&a0, &b0, &mut d0);
        aux.mul_ntt(&a0, &b1, &mut d1);
        aux.mul_ntt_add_inplace(&a1, &b0, &mut d1);
        aux.mul_ntt(&a1, &b1, &mut d2);

        let parts: Vec<PolyRNS<u64>> = [d0, d1, d2]
            .into_iter()
            .map(|mut d| {
                aux.intt_inplace(&mut d);
                self.scale_down(&aux.to_bigint(&d))
            })
            .collect();

        Ok(Ciphertext {
            parts,
            noise,
            key_id: a.key_id,
        })
    }

    /// Brings a size-3 ciphertext back to size 2.
    pub fn relinearize(&self, a: &Ciphertext, rlk: &RelinearizationKey) -> Result<Ciphertext> {
        check_key(a.key_id, rlk.key_id)?;
        check_size(a, 3)?;

        let context: &Context = self.context;
        let noise: f64 = context.noise.check(context.noise.relinearize(a.noise))?;
        let ring: &RingRNS<u64> = &context.ring_q;

        let (k0, k1) = key_switch(context, &a.parts[2], &rlk.key);
        let mut c0: PolyRNS<u64> = ring.new_polyrns();
        let mut c1: PolyRNS<u64> = ring.new_polyrns();
        ring.add(&a.parts[0], &k0, &mut c0);
        ring.add(&a.parts[1], &k1, &mut c1);

        Ok(Ciphertext {
            parts: vec![c0, c1],
            noise,
            key_id: a.key_id,
        })
    }

    pub fn multiply_relinearize(
        &self,
        a: &Ciphertext,
        b: &Ciphertext,
        rlk: &RelinearizationKey,
    ) -> Result<Ciphertext> {
        check_key(a.key_id, rlk.key_id)?;
        let context: &Context = self.context;
        context
            .noise
            .check(context.noise.relinearize(context.noise.multiply(a.noise, b.noise)))?;
        let product: Ciphertext = self.multiply(a, b)?;
        self.relinearize(&product, rlk)
    }

    /// Rotates both rows of slots left by `steps` (negative steps rotate right).
    pub fn rotate_rows(&self, a: &Ciphertext, steps: i64, gk: &GaloisKeys) -> Result<Ciphertext> {
        let gal_el: usize = self.context.ring_q.at(0).galois_element(steps, false);
        self.apply_galois(a, gal_el, gk)
    }

    /// Swaps the two rows of slots.
    pub fn rotate_columns(&self, a: &Ciphertext, gk: &GaloisKeys) -> Result<Ciphertext> {
        let gal_el: usize = self.context.ring_q.at(0).galois_element(0, true);
        self.apply_galois(a, gal_el, gk)
    }

    /// Sets every slot to the sum of all slots, with log2(slots) rotate-and-add rounds.
    pub fn sum_elements(&self, a: &Ciphertext, gk: &GaloisKeys) -> Result<Ciphertext> {
        check_key(a.key_id, gk.key_id)?;
        check_size(a, 2)?;
        let context: &Context = self.context;
        context
            .noise
            .check(context.noise.sum_elements(a.noise, context.sum_steps()))?;

        let mut acc: Cow<'_, Ciphertext> = Cow::Borrowed(a);
        for &gal_el in context.sum_galois_elements() {
            let rotated: Ciphertext = self.apply_galois(&acc, gal_el, gk)?;
            acc = Cow::Owned(self.add(&acc, &rotated)?);
        }
        Ok(acc.into_owned())
    }

    /// (c0(X^g), c1(X^g)) key switched from s(X^g) back to s.
    fn apply_galois(&self, a: &Ciphertext, gal_el: usize, gk: &GaloisKeys) -> Result<Ciphertext> {
        check_key(a.key_id, gk.key_id)?;
        check_size(a, 2)?;

        let context: &Context = self.context;
        let ksk: &KeySwitchKey = gk.get(gal_el).ok_or(BfvError::MissingGaloisKey(gal_el))?;
        let noise: f64 = context.noise.check(context.noise.rotate(a.noise))?;

        let ring: &RingRNS<u64> = &context.ring_q;
        let perm: Cow<'_, AutoPerm> = context.auto_perm(gal_el);

        let mut c0: PolyRNS<u64> = ring.new_polyrns();
        let mut c1: PolyRNS<u64> = ring.new_polyrns();
        ring.automorphism_from_perm(&a.parts[0], &perm, &mut c0);
        ring.automorphism_from_perm(&a.parts[1], &perm, &mut c1);

        let (k0, k1) = key_switch(context, &c1, ksk);
        ring.add_inplace(&k0, &mut c0);

        Ok(Ciphertext {
            parts: vec![c0, k1],
            noise,
            key_id: a.key_id,
        })
    }

    /// round(t * d / q) mod q_i for each exact tensor coefficient d.
    fn scale_down(&self, d: &[BigInt]) -> PolyRNS<u64> {
        let context: &Context = self.context;
        let scaled: Vec<BigInt> = d
            .iter()
            .map(|x| (x * &context.t).div_round(&context.q))
            .collect();
        let mut out: PolyRNS<u64> = context.ring_q.new_polyrns();
        context.ring_q.from_bigint(&scaled, &mut out);
        out
    }
}

fn check_key(expected: KeyId, found: KeyId) -> Result<()> {
    if expected != found {
        return Err(BfvError::KeyMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        });
    }
    Ok(())
}

fn check_size(a: &Ciphertext, size: usize) -> Result<()> {
    if a.size() != size {
        return Err(BfvError::InvalidCiphertext(format!(
            "expected a ciphertext of size {}, found size {}",
            size,
            a.size()
        )));
    }
    Ok(())
}
