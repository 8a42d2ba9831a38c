use bfv::ciphertext::Ciphertext;
use bfv::context::Context;
use bfv::decryptor::Decryptor;
use bfv::encoder::BatchEncoder;
use bfv::encryptor::Encryptor;
use bfv::error::BfvError;
use bfv::evaluator::Evaluator;
use bfv::key_generator::KeyGenerator;
use bfv::keys::{GaloisKeys, PublicKey, RelinearizationKey, SecretKey};
use bfv::parameters::ParametersLiteral;
use sampling::source::Source;

struct Consumer {
    sk: SecretKey,
    pk: PublicKey,
    rlk: RelinearizationKey,
    gk: GaloisKeys,
}

impl Consumer {
    fn new(context: &Context, seed: u8) -> Self {
        let mut keygen: KeyGenerator = KeyGenerator::from_seed(context, [seed; 32]);
        let rlk: RelinearizationKey = keygen.relinearization_key();
        let gk: GaloisKeys = keygen.galois_keys();
        Self {
            sk: keygen.secret_key().clone(),
            pk: keygen.public_key().clone(),
            rlk,
            gk,
        }
    }

    fn encrypt(&self, context: &Context, values: &[u64], source: &mut Source) -> Ciphertext {
        let pt = BatchEncoder::new(context).encode(values).unwrap();
        Encryptor::new(context, &self.pk).encrypt(&pt, source)
    }

    fn decrypt(&self, context: &Context, ct: &Ciphertext) -> Vec<u64> {
        let pt = Decryptor::new(context, &self.sk).decrypt(ct).unwrap();
        BatchEncoder::new(context).decode(&pt)
    }
}

fn aggregate(
    context: &Context,
    cts: &[Ciphertext],
    rlk: &RelinearizationKey,
    gk: &GaloisKeys,
) -> Result<Ciphertext, BfvError> {
    let evaluator: Evaluator = Evaluator::new(context);
    let mut acc: Ciphertext = cts[0].clone();
    for ct in &cts[1..] {
        acc = evaluator.multiply_relinearize(&acc, ct, rlk)?;
    }
    evaluator.sum_elements(&acc, gk)
}

#[test]
fn bfv_u64() {
    let context: Context = Context::new(&ParametersLiteral::default()).unwrap();
    let consumer: Consumer = Consumer::new(&context, 1);
    let mut source: Source = Source::new([42u8; 32]);

    sub_test("test_encrypt_decrypt", || {
        test_encrypt_decrypt(&context, &consumer, &mut source)
    });
    sub_test("test_multiply_counts_common_bits", || {
        test_multiply_counts_common_bits(&context, &consumer, &mut source)
    });
    sub_test("test_single_input_sums_slots", || {
        test_single_input_sums_slots(&context, &consumer, &mut source)
    });
    sub_test("test_input_order_does_not_matter", || {
        test_input_order_does_not_matter(&context, &consumer, &mut source)
    });
    sub_test("test_too_many_inputs_exhaust_noise_budget", || {
        test_too_many_inputs_exhaust_noise_budget(&context, &consumer, &mut source)
    });
    sub_test("test_rotations", || test_rotations(&context, &consumer, &mut source));
    sub_test("test_noise_estimate_bounds_measured_noise", || {
        test_noise_estimate_bounds_measured_noise(&context, &consumer, &mut source)
    });
    sub_test("test_foreign_keys_are_rejected", || {
        test_foreign_keys_are_rejected(&context, &consumer, &mut source)
    });
    sub_test("test_blobs_round_trip", || {
        test_blobs_round_trip(&context, &consumer, &mut source)
    });
    sub_test("test_corrupted_blobs_are_rejected", || {
        test_corrupted_blobs_are_rejected(&context, &consumer, &mut source)
    });
    sub_test("test_forged_noise_estimate_is_floored", || {
        test_forged_noise_estimate_is_floored(&context, &consumer, &mut source)
    });
}

fn sub_test<F: FnOnce()>(name: &str, f: F) {
    println!("Running {}", name);
    f();
}

fn test_encrypt_decrypt(context: &Context, consumer: &Consumer, source: &mut Source) {
    let t: u64 = context.plain_modulus();
    let values: Vec<u64> = (0..context.slots() as u64).map(|i| (i * i + 1) % t).collect();
    let ct: Ciphertext = consumer.encrypt(context, &values, source);
    assert_eq!(consumer.decrypt(context, &ct), values);

    let other: Ciphertext = consumer.encrypt(context, &values, source);
    assert_ne!(ct.parts(), other.parts());
    assert_eq!(consumer.decrypt(context, &other), values);
}

fn test_multiply_counts_common_bits(context: &Context, consumer: &Consumer, source: &mut Source) {
    let v1: [u64; 10] = [1, 0, 0, 1, 1, 1, 0, 1, 0, 0];
    let v2: [u64; 10] = [1, 0, 0, 1, 1, 1, 0, 1, 0, 0];
    let cts: Vec<Ciphertext> = vec![
        consumer.encrypt(context, &v1, source),
        consumer.encrypt(context, &v2, source),
    ];
    let product: Ciphertext = aggregate(context, &cts, &consumer.rlk, &consumer.gk).unwrap();
    let decoded: Vec<u64> = consumer.decrypt(context, &product);
    assert_eq!(decoded[0], 5);
    assert!(decoded.iter().all(|&x| x == 5));

    let v3: [u64; 6] = [1, 1, 0, 1, 0, 1];
    let v4: [u64; 6] = [0, 1, 1, 1, 0, 1];
    let cts: Vec<Ciphertext> = vec![
        consumer.encrypt(context, &v3, source),
        consumer.encrypt(context, &v4, source),
    ];
    let product: Ciphertext = aggregate(context, &cts, &consumer.rlk, &consumer.gk).unwrap();
    assert_eq!(consumer.decrypt(context, &product)[0], 3);
}

fn test_single_input_sums_slots(context: &Context, consumer: &Consumer, source: &mut Source) {
    let values: Vec<u64> = (0..context.slots() as u64).map(|i| i % 3).collect();
    let want: u64 = values.iter().sum::<u64>() % context.plain_modulus();
    let cts: Vec<Ciphertext> = vec![consumer.encrypt(context, &values, source)];
    let product: Ciphertext = aggregate(context, &cts, &consumer.rlk, &consumer.gk).unwrap();
    assert_eq!(consumer.decrypt(context, &product)[0], want);
}

fn test_input_order_does_not_matter(context: &Context, consumer: &Consumer, source: &mut Source) {
    let v1: [u64; 8] = [1, 1, 1, 0, 0, 1, 1, 0];
    let v2: [u64; 8] = [1, 0, 1, 1, 0, 1, 0, 0];
    let c1: Ciphertext = consumer.encrypt(context, &v1, source);
    let c2: Ciphertext = consumer.encrypt(context, &v2, source);
    let forward: Ciphertext =
        aggregate(context, &[c1.clone(), c2.clone()], &consumer.rlk, &consumer.gk).unwrap();
    let backward: Ciphertext = aggregate(context, &[c2, c1], &consumer.rlk, &consumer.gk).unwrap();
    assert_eq!(consumer.decrypt(context, &forward)[0], 3);
    assert_eq!(consumer.decrypt(context, &backward)[0], 3);
}

fn test_too_many_inputs_exhaust_noise_budget(
    context: &Context,
    consumer: &Consumer,
    source: &mut Source,
) {
    let max: usize = context.max_aggregation_inputs();
    let cts: Vec<Ciphertext> = (0..max + 1)
        .map(|_| consumer.encrypt(context, &[1, 1, 0, 1], source))
        .collect();
    assert!(matches!(
        aggregate(context, &cts, &consumer.rlk, &consumer.gk),
        Err(BfvError::NoiseBudgetExhausted { .. })
    ));
}

fn test_rotations(context: &Context, consumer: &Consumer, source: &mut Source) {
    let half: usize = context.slots() / 2;
    let values: Vec<u64> = (0..context.slots() as u64).collect();
    let ct: Ciphertext = consumer.encrypt(context, &values, source);
    let evaluator: Evaluator = Evaluator::new(context);

    let rotated: Ciphertext = evaluator.rotate_rows(&ct, 1, &consumer.gk).unwrap();
    let decoded: Vec<u64> = consumer.decrypt(context, &rotated);
    for i in 0..half {
        assert_eq!(decoded[i], values[(i + 1) % half]);
        assert_eq!(decoded[half + i], values[half + (i + 1) % half]);
    }

    let swapped: Ciphertext = evaluator.rotate_columns(&ct, &consumer.gk).unwrap();
    let decoded: Vec<u64> = consumer.decrypt(context, &swapped);
    for i in 0..half {
        assert_eq!(decoded[i], values[half + i]);
        assert_eq!(decoded[half + i], values[i]);
    }

    assert!(matches!(
        evaluator.rotate_rows(&ct, 3, &consumer.gk),
        Err(BfvError::MissingGaloisKey(_))
    ));
}

fn test_noise_estimate_bounds_measured_noise(
    context: &Context,
    consumer: &Consumer,
    source: &mut Source,
) {
    let decryptor: Decryptor = Decryptor::new(context, &consumer.sk);
    let evaluator: Evaluator = Evaluator::new(context);
    let c1: Ciphertext = consumer.encrypt(context, &[1, 0, 1], source);
    let c2: Ciphertext = consumer.encrypt(context, &[1, 1, 1], source);

    let fresh_bits: f64 = decryptor.measured_noise_bits(&c1).unwrap();
    assert!(c1.noise_estimate_bits() >= fresh_bits);

    let product: Ciphertext = evaluator.multiply_relinearize(&c1, &c2, &consumer.rlk).unwrap();
    assert!(product.noise_estimate_bits() >= decryptor.measured_noise_bits(&product).unwrap());

    let sum: Ciphertext = evaluator.sum_elements(&product, &consumer.gk).unwrap();
    assert!(sum.noise_estimate_bits() >= decryptor.measured_noise_bits(&sum).unwrap());
    assert!(decryptor.invariant_noise_budget(&sum).unwrap() > 0.0);
    assert!(
        decryptor.invariant_noise_budget(&c1).unwrap()
            > decryptor.invariant_noise_budget(&sum).unwrap()
    );
}

fn test_foreign_keys_are_rejected(context: &Context, consumer: &Consumer, source: &mut Source) {
    let stranger: Consumer = Consumer::new(context, 2);
    assert_ne!(stranger.pk.key_id(), consumer.pk.key_id());

    let mine: Ciphertext = consumer.encrypt(context, &[1, 1], source);
    let theirs: Ciphertext = stranger.encrypt(context, &[1, 1], source);
    let evaluator: Evaluator = Evaluator::new(context);

    assert!(matches!(
        evaluator.multiply(&mine, &theirs),
        Err(BfvError::KeyMismatch { .. })
    ));
    assert!(matches!(
        evaluator.multiply_relinearize(&mine, &mine, &stranger.rlk),
        Err(BfvError::KeyMismatch { .. })
    ));
    assert!(matches!(
        evaluator.sum_elements(&mine, &stranger.gk),
        Err(BfvError::KeyMismatch { .. })
    ));
    assert!(matches!(
        Decryptor::new(context, &stranger.sk).decrypt(&mine),
        Err(BfvError::KeyMismatch { .. })
    ));
}

fn test_blobs_round_trip(context: &Context, consumer: &Consumer, source: &mut Source) {
    let pk_bytes: Vec<u8> = consumer.pk.to_bytes(context);
    let pk: PublicKey = PublicKey::from_bytes(context, &pk_bytes).unwrap();
    assert_eq!(pk, consumer.pk);
    assert_eq!(pk.to_bytes(context), pk_bytes);

    let sk_bytes: Vec<u8> = consumer.sk.to_bytes(context);
    let sk: SecretKey = SecretKey::from_bytes(context, &sk_bytes).unwrap();
    assert_eq!(sk.to_bytes(context), sk_bytes);

    let rlk_bytes: Vec<u8> = consumer.rlk.to_bytes(context);
    let rlk: RelinearizationKey = RelinearizationKey::from_bytes(context, &rlk_bytes).unwrap();
    assert_eq!(rlk, consumer.rlk);

    let gk_bytes: Vec<u8> = consumer.gk.to_bytes(context);
    let gk: GaloisKeys = GaloisKeys::from_bytes(context, &gk_bytes).unwrap();
    assert_eq!(gk.galois_elements(), consumer.gk.galois_elements());
    assert_eq!(gk.to_bytes(context), gk_bytes);

    let ct: Ciphertext = consumer.encrypt(context, &[3, 2, 1], source);
    let ct_bytes: Vec<u8> = ct.to_bytes(context);
    let decoded: Ciphertext = Ciphertext::from_bytes(context, &ct_bytes).unwrap();
    assert_eq!(decoded, ct);
    assert_eq!(decoded.to_bytes(context), ct_bytes);

    let decrypted: Vec<u64> = {
        let pt = Decryptor::new(context, &sk).decrypt(&decoded).unwrap();
        BatchEncoder::new(context).decode(&pt)
    };
    assert_eq!(&decrypted[..3], &[3, 2, 1]);
}

fn test_corrupted_blobs_are_rejected(context: &Context, consumer: &Consumer, source: &mut Source) {
    let pk_bytes: Vec<u8> = consumer.pk.to_bytes(context);

    let truncated: &[u8] = &pk_bytes[..pk_bytes.len() - 1];
    assert!(matches!(
        PublicKey::from_bytes(context, truncated),
        Err(BfvError::KeyDeserialization(_))
    ));

    let mut bad_magic: Vec<u8> = pk_bytes.clone();
    bad_magic[0] ^= 0xff;
    assert!(matches!(
        PublicKey::from_bytes(context, &bad_magic),
        Err(BfvError::KeyDeserialization(_))
    ));

    let mut out_of_range: Vec<u8> = pk_bytes.clone();
    let last: usize = out_of_range.len();
    out_of_range[last - 8..].copy_from_slice(&u64::MAX.to_le_bytes());
    assert!(matches!(
        PublicKey::from_bytes(context, &out_of_range),
        Err(BfvError::KeyDeserialization(_))
    ));

    let mut tampered: Vec<u8> = pk_bytes.clone();
    tampered[last - 8] ^= 1;
    let tampered_result = PublicKey::from_bytes(context, &tampered);
    assert!(matches!(tampered_result, Err(BfvError::KeyDeserialization(_))));

    let ct_bytes: Vec<u8> = consumer.encrypt(context, &[1], source).to_bytes(context);
    assert!(matches!(
        PublicKey::from_bytes(context, &ct_bytes),
        Err(BfvError::KeyDeserialization(_))
    ));
    assert!(matches!(
        Ciphertext::from_bytes(context, &pk_bytes),
        Err(BfvError::CiphertextDeserialization(_))
    ));
    assert!(matches!(
        Ciphertext::from_bytes(context, &ct_bytes[..40]),
        Err(BfvError::CiphertextDeserialization(_))
    ));
    let mut padded: Vec<u8> = ct_bytes.clone();
    padded.push(0);
    assert!(matches!(
        Ciphertext::from_bytes(context, &padded),
        Err(BfvError::CiphertextDeserialization(_))
    ));
}

#[test]
fn keys_from_another_context_are_rejected() {
    let context: Context = Context::new(&ParametersLiteral::default()).unwrap();
    let mut literal: ParametersLiteral = ParametersLiteral::default();
    literal.plain_modulus_bits = 21;
    let other: Context = Context::new(&literal).unwrap();

    let keygen: KeyGenerator = KeyGenerator::from_seed(&other, [3u8; 32]);
    let pk_bytes: Vec<u8> = keygen.public_key().to_bytes(&other);
    assert!(PublicKey::from_bytes(&other, &pk_bytes).is_ok());
    assert!(matches!(
        PublicKey::from_bytes(&context, &pk_bytes),
        Err(BfvError::KeyDeserialization(_))
    ));
}

fn test_forged_noise_estimate_is_floored(
    context: &Context,
    consumer: &Consumer,
    source: &mut Source,
) {
    // magic, version, kind, parameter fingerprint, key id
    let noise_at: usize = 4 + 1 + 1 + 8 + 8;
    let forge = |ct: &Ciphertext| -> Ciphertext {
        let mut bytes: Vec<u8> = ct.to_bytes(context);
        bytes[noise_at..noise_at + 8].copy_from_slice(&0f64.to_le_bytes());
        Ciphertext::from_bytes(context, &bytes).unwrap()
    };

    let fresh: Ciphertext = consumer.encrypt(context, &[1, 1], source);
    assert_eq!(forge(&fresh).noise_estimate(), fresh.noise_estimate());

    let evaluator: Evaluator = Evaluator::new(context);
    let product: Ciphertext = evaluator.multiply(&fresh, &fresh).unwrap();
    assert_eq!(forge(&product).noise_estimate(), product.noise_estimate());

    let cts: Vec<Ciphertext> = (0..context.max_aggregation_inputs() + 1)
        .map(|_| forge(&consumer.encrypt(context, &[1, 1], source)))
        .collect();
    assert!(matches!(
        aggregate(context, &cts, &consumer.rlk, &consumer.gk),
        Err(BfvError::NoiseBudgetExhausted { .. })
    ));
}
