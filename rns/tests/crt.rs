use num_bigint::BigInt;
use rns::bigint::Div;
use rns::modulus::prime_generation::NTTFriendlyPrimesGenerator;
use rns::poly::PolyRNS;
use rns::ring::RingRNS;

#[test]
fn crt_u64() {
    let n: usize = 1 << 5;
    let mut generator: NTTFriendlyPrimesGenerator = NTTFriendlyPrimesGenerator::new(36, 2 * n as u64);
    let moduli: Vec<u64> = generator.next_downstream_primes(3).unwrap();
    let ring: RingRNS<u64> = RingRNS::new(n, &moduli);

    sub_test("test_product_of_polynomials_through_ntt", || {
        test_product_of_polynomials_through_ntt(&ring)
    });
    sub_test("test_scaled_rounding", || test_scaled_rounding(&ring));
}

fn sub_test<F: FnOnce()>(name: &str, f: F) {
    println!("Running {}", name);
    f();
}

fn test_product_of_polynomials_through_ntt(ring: &RingRNS<u64>) {
    let n: usize = ring.n();
    let a_values: Vec<i64> = (0..n as i64).map(|i| i * 1_000_003 - 5_000_000).collect();
    let b_values: Vec<i64> = (0..n as i64).map(|i| 17 - 3 * i).collect();

    let mut want: Vec<BigInt> = vec![BigInt::from(0); n];
    for i in 0..n {
        for j in 0..n {
            let p: BigInt = BigInt::from(a_values[i]) * BigInt::from(b_values[j]);
            if i + j < n {
                want[i + j] += p;
            } else {
                want[i + j - n] -= p;
            }
        }
    }

    let mut a: PolyRNS<u64> = ring.new_polyrns();
    let mut b: PolyRNS<u64> = ring.new_polyrns();
    ring.from_i64(&a_values, &mut a);
    ring.from_i64(&b_values, &mut b);
    ring.ntt_inplace(&mut a);
    ring.ntt_inplace(&mut b);
    let mut c: PolyRNS<u64> = ring.new_polyrns();
    ring.mul_ntt(&a, &b, &mut c);
    ring.intt_inplace(&mut c);

    assert_eq!(ring.to_bigint(&c), want);
}

fn test_scaled_rounding(ring: &RingRNS<u64>) {
    let q: BigInt = BigInt::from(ring.crt().product().clone());
    let t: BigInt = BigInt::from(1032193u64);
    let delta: BigInt = q.div_floor(&t);
    for m in [0i64, 1, 2, 1032192] {
        for e in [-1000i64, 0, 999] {
            let x: BigInt = &delta * m + e;
            let decoded: BigInt = (&x * &t).div_round(&q);
            assert_eq!(decoded, BigInt::from(m));
        }
    }
}
