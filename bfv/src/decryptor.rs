use crate::ciphertext::Ciphertext;
use crate::context::{Context, log2_bigint};
use crate::error::{BfvError, Result};
use crate::keys::SecretKey;
use crate::plaintext::Plaintext;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Signed, ToPrimitive, Zero};
use rns::bigint::Div;
use rns::poly::PolyRNS;
use rns::ring::RingRNS;

/// Consumer-side decryption with the secret key.
pub struct Decryptor<'a> {
    context: &'a Context,
    sk: &'a SecretKey,
}

impl<'a> Decryptor<'a> {
    pub fn new(context: &'a Context, sk: &'a SecretKey) -> Self {
        Self { context, sk }
    }

    /// m = round(t * [c0 + c1*s + ...]_q / q) mod t.
    pub fn decrypt(&self, ct: &Ciphertext) -> Result<Plaintext> {
        let phase: Vec<BigInt> = self.phase(ct)?;
        let mut pt: Plaintext = Plaintext::new(self.context.n());
        phase
            .iter()
            .zip(pt.0.0.iter_mut())
            .for_each(|(x, m)| *m = self.round_to_plain(x));
        Ok(pt)
    }

    /// Bits of the infinity norm of c0 + c1*s + ... - delta*m, centered mod q.
    pub fn measured_noise_bits(&self, ct: &Ciphertext) -> Result<f64> {
        let context: &Context = self.context;
        let phase: Vec<BigInt> = self.phase(ct)?;
        let q_half: BigInt = &context.q >> 1;
        let max: BigInt = phase
            .iter()
            .map(|x| {
                let m: BigInt = BigInt::from(self.round_to_plain(x));
                let mut v: BigInt = (x - &context.delta * m).mod_floor(&context.q);
                if v > q_half {
                    v -= &context.q;
                }
                v.abs()
            })
            .max()
            .unwrap_or_else(BigInt::zero);
        if max <= BigInt::from(1) {
            return Ok(0.0);
        }
        Ok(log2_bigint(&max))
    }

    /// Remaining headroom before decryption fails, in bits.
    pub fn invariant_noise_budget(&self, ct: &Ciphertext) -> Result<f64> {
        let noise_bits: f64 = self.measured_noise_bits(ct)?;
        Ok((self.context.log_delta - 1.0 - noise_bits).max(0.0))
    }

    fn round_to_plain(&self, x: &BigInt) -> u64 {
        let context: &Context = self.context;
        (x * &context.t)
            .div_round(&context.q)
            .mod_floor(&context.t)
            .to_u64()
            .unwrap_or_default()
    }

    /// Centered lift of c0 + c1*s + c2*s^2 + ...
    fn phase(&self, ct: &Ciphertext) -> Result<Vec<BigInt>> {
        if ct.key_id != self.sk.key_id {
            return Err(BfvError::KeyMismatch {
                expected: self.sk.key_id.to_string(),
                found: ct.key_id.to_string(),
            });
        }
        let ring: &RingRNS<u64> = &self.context.ring_q;

        let mut acc: PolyRNS<u64> = ct.parts[0].clone();
        let mut s_pow: PolyRNS<u64> = self.sk.s_ntt.clone();
        let mut tmp: PolyRNS<u64> = ring.new_polyrns();
        let mut s_next: PolyRNS<u64> = ring.new_polyrns();

        for (k, part) in ct.parts.iter().enumerate().skip(1) {
            tmp.copy_from(part);
            ring.ntt_inplace(&mut tmp);
            ring.mul_ntt(&tmp, &s_pow, &mut s_next);
            ring.intt_inplace(&mut s_next);
            ring.add_inplace(&s_next, &mut acc);
            if k + 1 < ct.parts.len() {
                ring.mul_ntt(&s_pow, &self.sk.s_ntt, &mut s_next);
                s_pow.copy_from(&s_next);
            }
        }

        Ok(ring.to_bigint(&acc))
    }
}
