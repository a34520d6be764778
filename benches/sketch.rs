#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::hash::BuildHasherDefault;

use cardinality_sketch::{AtomicSketch, CardinalityEstimator, Sketch};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use hyperloglogplus::HyperLogLog as _;
use pprof::criterion::{Output, PProfProfiler};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tabled::settings::{Settings, Style};
use tabled::{Table, Tabled};
use wyhash::WyHash;

/// Digest counts used for `add` benchmarks and the accuracy report
const CARDINALITIES: [usize; 6] = [0, 16, 256, 4096, 65536, 1 << 20];
/// Precisions benchmarked for the dense sketch
const PRECISIONS: [u8; 4] = [4, 10, 12, 16];
/// Precision used when comparing against other HyperLogLog crates (~1.6% error)
const COMPARISON_PRECISION: u8 = 12;
/// Number of random streams averaged for the relative error report
const ERROR_TRIALS: usize = 50;

criterion_group! {
    name = benches;
    config = Criterion::default().with_profiler(PProfProfiler::new(100, Output::Protobuf));
    targets = bench_add, bench_estimate, bench_insert_comparison, write_reports
}
criterion_main!(benches);

fn random_digests(n: usize) -> Vec<u32> {
    let mut rng = StdRng::seed_from_u64(12345);
    (0..n).map(|_| rng.gen()).collect()
}

fn bench_add(c: &mut Criterion) {
    let digests = random_digests(65536);
    let mut group = c.benchmark_group("add");
    group.throughput(Throughput::Elements(digests.len() as u64));
    for precision in PRECISIONS {
        group.bench_with_input(BenchmarkId::new("sketch", precision), &precision, |b, &p| {
            b.iter(|| {
                let mut sketch = Sketch::new(p);
                digests.iter().for_each(|&d| sketch.add(black_box(d)));
                sketch
            });
        });
        group.bench_with_input(BenchmarkId::new("atomic", precision), &precision, |b, &p| {
            b.iter(|| {
                let sketch = AtomicSketch::new(p);
                digests.iter().for_each(|&d| sketch.add(black_box(d)));
                sketch
            });
        });
    }
    group.finish();
}

fn bench_estimate(c: &mut Criterion) {
    let digests = random_digests(65536);
    let mut group = c.benchmark_group("estimate");
    group.throughput(Throughput::Elements(1));
    for precision in PRECISIONS {
        let mut sketch = Sketch::new(precision);
        digests.iter().for_each(|&d| sketch.add(d));
        group.bench_function(BenchmarkId::new("sketch", precision), |b| {
            b.iter(|| black_box(&sketch).estimate());
        });
    }
    group.finish();
}

/// Common operations of the estimators compared in `insert` benchmarks and reports.
trait Estimator {
    const NAME: &'static str;
    fn new() -> Self;
    fn insert(&mut self, item: &u64);
    fn estimate(&mut self) -> f64;
}

struct Ours(CardinalityEstimator<u64>);

impl Estimator for Ours {
    const NAME: &'static str = "cardinality-sketch";

    fn new() -> Self {
        Self(CardinalityEstimator::with_precision(COMPARISON_PRECISION))
    }

    fn insert(&mut self, item: &u64) {
        self.0.insert(item);
    }

    fn estimate(&mut self) -> f64 {
        self.0.estimate()
    }
}

struct Amadeus(amadeus_streaming::HyperLogLog<u64>);

impl Estimator for Amadeus {
    const NAME: &'static str = "amadeus-streaming";

    fn new() -> Self {
        Self(amadeus_streaming::HyperLogLog::new(0.01625))
    }

    fn insert(&mut self, item: &u64) {
        self.0.push(item);
    }

    fn estimate(&mut self) -> f64 {
        self.0.len()
    }
}

struct Probabilistic(probabilistic_collections::hyperloglog::HyperLogLog<u64>);

impl Estimator for Probabilistic {
    const NAME: &'static str = "probabilistic-collections";

    fn new() -> Self {
        Self(probabilistic_collections::hyperloglog::HyperLogLog::new(0.01625))
    }

    fn insert(&mut self, item: &u64) {
        self.0.insert(item);
    }

    fn estimate(&mut self) -> f64 {
        self.0.len()
    }
}

struct Hll(hyperloglog::HyperLogLog);

impl Estimator for Hll {
    const NAME: &'static str = "hyperloglog";

    fn new() -> Self {
        Self(hyperloglog::HyperLogLog::new(0.01625))
    }

    fn insert(&mut self, item: &u64) {
        self.0.insert(item);
    }

    fn estimate(&mut self) -> f64 {
        self.0.len()
    }
}

struct HllPlus(hyperloglogplus::HyperLogLogPlus<u64, BuildHasherDefault<WyHash>>);

impl Estimator for HllPlus {
    const NAME: &'static str = "hyperloglogplus";

    fn new() -> Self {
        Self(
            hyperloglogplus::HyperLogLogPlus::new(
                COMPARISON_PRECISION,
                BuildHasherDefault::<WyHash>::default(),
            )
            .unwrap(),
        )
    }

    fn insert(&mut self, item: &u64) {
        self.0.insert(item);
    }

    fn estimate(&mut self) -> f64 {
        self.0.count()
    }
}

fn bench_insert<E: Estimator>(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    for &cardinality in &CARDINALITIES[..5] {
        group.throughput(Throughput::Elements(cardinality.max(1) as u64));
        group.bench_with_input(BenchmarkId::new(E::NAME, cardinality), &cardinality, |b, &n| {
            b.iter(|| {
                let mut estimator = E::new();
                for i in 0..black_box(n as u64) {
                    estimator.insert(black_box(&i));
                }
                estimator.estimate()
            });
        });
    }
    group.finish();
}

fn bench_insert_comparison(c: &mut Criterion) {
    bench_insert::<Ours>(c);
    bench_insert::<Amadeus>(c);
    bench_insert::<Probabilistic>(c);
    bench_insert::<Hll>(c);
    bench_insert::<HllPlus>(c);
}

/// Heap bytes and blocks allocated while inserting `cardinality` items
fn measure_allocations<E: Estimator>(cardinality: usize) -> String {
    let _profiler = dhat::Profiler::builder().testing().build();
    let mut estimator = E::new();
    for i in 0..cardinality as u64 {
        estimator.insert(&i);
    }
    let stats = dhat::HeapStats::get();
    format!("{} / {}", stats.total_bytes, stats.total_blocks)
}

/// Mean relative error over `ERROR_TRIALS` random streams of `cardinality` distinct items
fn measure_error<E: Estimator>(cardinality: usize) -> String {
    if cardinality == 0 {
        return "0.0000".to_string();
    }
    let mut rng = StdRng::seed_from_u64(12345);
    let total: f64 = (0..ERROR_TRIALS)
        .map(|_| {
            let mut estimator = E::new();
            let offset: u64 = rng.gen();
            for i in 0..cardinality as u64 {
                estimator.insert(&offset.wrapping_add(i));
            }
            (estimator.estimate() - cardinality as f64).abs() / cardinality as f64
        })
        .sum();
    format!("{:.4}", total / ERROR_TRIALS as f64)
}

#[derive(Tabled)]
struct Report {
    cardinality: usize,
    cardinality_sketch: String,
    amadeus_streaming: String,
    probabilistic_collections: String,
    hyperloglog: String,
    hyperloglogplus: String,
}

fn report(measure: fn(usize) -> [String; 5]) -> String {
    let rows: Vec<Report> = CARDINALITIES
        .iter()
        .map(|&cardinality| {
            let [ours, amadeus, probabilistic, hll, hll_plus] = measure(cardinality);
            Report {
                cardinality,
                cardinality_sketch: ours,
                amadeus_streaming: amadeus,
                probabilistic_collections: probabilistic,
                hyperloglog: hll,
                hyperloglogplus: hll_plus,
            }
        })
        .collect();
    Table::new(rows)
        .with(Settings::default().with(Style::markdown()))
        .to_string()
}

fn write_reports(_: &mut Criterion) {
    let dir = std::env::var("BENCH_RESULTS_PATH")
        .unwrap_or_else(|_| format!("{}/target", env!("CARGO_MANIFEST_DIR")));

    let memory = report(|n| {
        [
            measure_allocations::<Ours>(n),
            measure_allocations::<Amadeus>(n),
            measure_allocations::<Probabilistic>(n),
            measure_allocations::<Hll>(n),
            measure_allocations::<HllPlus>(n),
        ]
    });
    std::fs::write(format!("{}/memory_usage.md", dir), memory).unwrap();

    let error = report(|n| {
        [
            measure_error::<Ours>(n),
            measure_error::<Amadeus>(n),
            measure_error::<Probabilistic>(n),
            measure_error::<Hll>(n),
            measure_error::<HllPlus>(n),
        ]
    });
    std::fs::write(format!("{}/relative_error.md", dir), error).unwrap();
}
