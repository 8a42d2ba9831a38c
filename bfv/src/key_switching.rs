use crate::context::Context;
use crate::keys::KeySwitchKey;
use itertools::izip;
use rns::poly::PolyRNS;
use rns::ring::RingRNS;

/// Returns (k0, k1), in the coefficient domain, such that
/// k0 + k1*s = c*w + small, for c in the coefficient domain and `ksk`
/// switching from w to s.
///
/// c is decomposed into its RNS limbs [c]_{q_i}; each limb, read as an
/// integer below q_i, multiplies the i-th digit of the key.
pub(crate) fn key_switch(
    context: &Context,
    c: &PolyRNS<u64>,
    ksk: &KeySwitchKey,
) -> (PolyRNS<u64>, PolyRNS<u64>) {
    let ring: &RingRNS<u64> = &context.ring_q;
    debug_assert!(
        ksk.digits() == ring.level() + 1,
        "invalid ksk.digits()={} != {}",
        ksk.digits(),
        ring.level() + 1
    );

    let mut k0: PolyRNS<u64> = ring.new_polyrns();
    let mut k1: PolyRNS<u64> = ring.new_polyrns();
    let mut digit: PolyRNS<u64> = ring.new_polyrns();

    for (i, b_i, a_i) in izip!(0.., ksk.b.iter(), ksk.a.iter()) {
        let limb: &[u64] = c.at(i).as_slice();
        izip!(ring.rings.iter(), digit.0.iter_mut()).for_each(|(r, d)| r.from_u64(limb, d));
        ring.ntt_inplace(&mut digit);
        ring.mul_ntt_add_inplace(&digit, b_i, &mut k0);
        ring.mul_ntt_add_inplace(&digit, a_i, &mut k1);
    }

    ring.intt_inplace(&mut k0);
    ring.intt_inplace(&mut k1);
    (k0, k1)
}
