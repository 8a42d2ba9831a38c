use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rns::modulus::WordOps;
use rns::poly::Poly;
use rns::ring::Ring;

fn ntt(c: &mut Criterion) {
    fn runner<'a, const FORWARD: bool>(ring: &'a Ring<u64>) -> Box<dyn FnMut() + 'a> {
        let mut a: Poly<u64> = ring.new_poly();
        for i in 0..a.n() {
            a.0[i] = i as u64;
        }
        if FORWARD {
            Box::new(move || ring.ntt_inplace(&mut a))
        } else {
            Box::new(move || ring.intt_inplace(&mut a))
        }
    }

    let q: u64 = 0x1fffffffffe00001u64;

    let mut b: criterion::BenchmarkGroup<'_, criterion::measurement::WallTime> =
        c.benchmark_group("ntt");

    for log_n in 10..16 {
        let ring: Ring<u64> = Ring::new(1 << log_n, q);

        let runners: [(String, Box<dyn FnMut()>); 2] = [
            (format!("forward/q={}", q.log2()), runner::<true>(&ring)),
            (format!("backward/q={}", q.log2()), runner::<false>(&ring)),
        ];

        for (name, mut runner) in runners {
            let id: BenchmarkId = BenchmarkId::new(name, format!("n={}", 1 << log_n));
            b.bench_with_input(id, &(), |b: &mut criterion::Bencher<'_>, _| {
                b.iter(&mut runner)
            });
        }
    }
}

criterion_group!(benches, ntt);
criterion_main!(benches);
