use apsieve::primality;
use apsieve::progress::Silent;
use apsieve::report::Collected;
use apsieve::steps::StepTable;
use apsieve::tables::{MaskTables, OkTables};
use apsieve::{KProgress, KSearch};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_step_table(c: &mut Criterion) {
    c.bench_function("StepTable::new(11840885)", |b| {
        b.iter(|| StepTable::new(black_box(11_840_885)));
    });
}

fn bench_ok_tables(c: &mut Criterion) {
    let steps = StepTable::new(11_840_885);
    c.bench_function("OkTables::build", |b| {
        b.iter(|| OkTables::build(black_box(steps.step)));
    });
}

fn bench_mask_rebuild(c: &mut Criterion) {
    let steps = StepTable::new(11_840_885);
    let ok = OkTables::build(steps.step);
    c.bench_function("MaskTables::build(shift=640)", |b| {
        b.iter(|| MaskTables::build(black_box(&ok), black_box(640)));
    });
}

fn bench_single_seed_window(c: &mut Criterion) {
    fn reject(_: u64) -> bool {
        false
    }
    let search = KSearch::new(743).unwrap().with_prp(reject);
    let sink = Collected::new();
    c.bench_function("kernel: one seed, one window", |b| {
        b.iter(|| {
            search
                .run_window_over(
                    black_box(0),
                    0,
                    0..1,
                    1,
                    1,
                    KProgress::default(),
                    &sink,
                    &Silent,
                )
                .unwrap()
        });
    });
}

fn bench_base2_prp(c: &mut Criterion) {
    c.bench_function("is_prime_2(26-term record first)", |b| {
        b.iter(|| primality::is_prime_2(black_box(43_142_746_595_714_191)));
    });
}

criterion_group!(
    benches,
    bench_step_table,
    bench_ok_tables,
    bench_mask_rebuild,
    bench_single_seed_window,
    bench_base2_prp,
);
criterion_main!(benches);
