use bfv::ciphertext::Ciphertext;
use bfv::context::Context;
use bfv::encoder::BatchEncoder;
use bfv::encryptor::Encryptor;
use bfv::evaluator::Evaluator;
use bfv::key_generator::KeyGenerator;
use bfv::keys::{GaloisKeys, RelinearizationKey};
use bfv::parameters::ParametersLiteral;
use bfv::plaintext::Plaintext;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use sampling::source::Source;

fn evaluator(c: &mut Criterion) {
    let context: Context = Context::new(&ParametersLiteral::default()).unwrap();
    let mut keygen: KeyGenerator = KeyGenerator::from_seed(&context, [0u8; 32]);
    let rlk: RelinearizationKey = keygen.relinearization_key();
    let gk: GaloisKeys = keygen.galois_keys();
    let encryptor: Encryptor = Encryptor::new(&context, keygen.public_key());
    let evaluator: Evaluator = Evaluator::new(&context);
    let mut source: Source = Source::new([1u8; 32]);

    let pt: Plaintext = BatchEncoder::new(&context)
        .encode(&[1, 0, 0, 1, 1, 1, 0, 1, 0, 0])
        .unwrap();
    let a: Ciphertext = encryptor.encrypt(&pt, &mut source);
    let b: Ciphertext = encryptor.encrypt(&pt, &mut source);
    let product: Ciphertext = evaluator.multiply_relinearize(&a, &b, &rlk).unwrap();

    let mut group: criterion::BenchmarkGroup<'_, criterion::measurement::WallTime> =
        c.benchmark_group("bfv");
    let n: String = format!("n={}", context.n());

    group.bench_with_input(BenchmarkId::new("encrypt", &n), &(), |bench, _| {
        bench.iter(|| encryptor.encrypt(&pt, &mut source))
    });
    group.bench_with_input(BenchmarkId::new("multiply_relinearize", &n), &(), |bench, _| {
        bench.iter(|| evaluator.multiply_relinearize(&a, &b, &rlk).unwrap())
    });
    group.bench_with_input(BenchmarkId::new("sum_elements", &n), &(), |bench, _| {
        bench.iter(|| evaluator.sum_elements(&product, &gk).unwrap())
    });
    group.finish();
}

criterion_group!(benches, evaluator);
criterion_main!(benches);
