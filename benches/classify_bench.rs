use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use laminar::equipped::{s_1_1, s_1_2};

fn bench_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply");
    let surface = s_1_2().expect("fixture");
    let probe = surface.lamination('b').expect("curve b").clone();

    for &len in &[4usize, 16usize] {
        let word: String = "abC".chars().cycle().take(len).collect();
        let h = surface.mapping_class(&word).expect("word");
        group.bench_with_input(BenchmarkId::new("s_1_2", len), &len, |b, _| {
            b.iter(|| {
                let out = h.apply(&probe).expect("apply");
                black_box(out);
            });
        });
    }
    group.finish();
}

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");
    group.sample_size(10);
    let surface = s_1_1().expect("fixture");

    for word in ["ab", "aB", "aaB"] {
        group.bench_with_input(BenchmarkId::new("s_1_1", word), &word, |b, word| {
            b.iter(|| {
                // Fresh encodings so the memoised answers are not reused.
                let h = surface.mapping_class(word).expect("word");
                black_box(h.nielsen_thurston_type().expect("classify"));
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_apply, bench_classify);
criterion_main!(benches);
