use crate::ciphertext::Ciphertext;
use crate::context::Context;
use crate::keys::PublicKey;
use crate::plaintext::Plaintext;
use rns::poly::PolyRNS;
use rns::ring::RingRNS;
use sampling::source::Source;

pub struct Encryptor<'a> {
    context: &'a Context,
    pk: &'a PublicKey,
}

impl<'a> Encryptor<'a> {
    pub fn new(context: &'a Context, pk: &'a PublicKey) -> Self {
        Self { context, pk }
    }

    /// c0 = p0*u + e1 + delta*m, c1 = p1*u + e2, with u ternary and e1, e2
    /// Gaussian. Fresh randomness is drawn from `source` on every call.
    pub fn encrypt(&self, pt: &Plaintext, source: &mut Source) -> Ciphertext {
        let context: &Context = self.context;
        let ring: &RingRNS<u64> = &context.ring_q;

        let mut u: PolyRNS<u64> = ring.new_polyrns();
        ring.fill_ternary(source, &mut u);
        ring.ntt_inplace(&mut u);

        let mut c0: PolyRNS<u64> = ring.new_polyrns();
        let mut c1: PolyRNS<u64> = ring.new_polyrns();
        ring.mul_ntt(&self.pk.p0, &u, &mut c0);
        ring.mul_ntt(&self.pk.p1, &u, &mut c1);
        ring.intt_inplace(&mut c0);
        ring.intt_inplace(&mut c1);

        let mut e: PolyRNS<u64> = ring.new_polyrns();
        ring.fill_gaussian(&context.gaussian, source, &mut e);
        ring.add_inplace(&e, &mut c0);
        ring.fill_gaussian(&context.gaussian, source, &mut e);
        ring.add_inplace(&e, &mut c1);

        let mut scaled: PolyRNS<u64> = ring.new_polyrns();
        ring.from_u64(pt.0.as_slice(), &mut scaled);
        ring.mul_scalar_rns_inplace(&context.delta_rns, &mut scaled);
        ring.add_inplace(&scaled, &mut c0);

        Ciphertext {
            parts: vec![c0, c1],
            noise: context.noise.fresh(),
            key_id: self.pk.key_id,
        }
    }
}
