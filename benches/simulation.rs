//! Performance benchmarks for evogrid

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use evogrid::genetics::Genome;
use evogrid::neural::{NeuralNet, Scratch};
use evogrid::{Config, Simulation};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn benchmark_simulation_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulation_step");

    for population in [100, 1000, 4000].iter() {
        let mut config = Config::default();
        config.population.starting_population = *population;
        config.population.max_population = *population;

        let mut sim = match Simulation::new_with_seed(config, 42) {
            Ok(sim) => sim,
            Err(e) => panic!("benchmark config rejected: {}", e),
        };

        // Warm up
        for _ in 0..10 {
            sim.step();
        }

        group.bench_with_input(
            BenchmarkId::new("population", population),
            population,
            |b, _| {
                b.iter(|| {
                    sim.step();
                });
            },
        );
    }

    group.finish();
}

fn random_genomes(length: usize, count: usize) -> Vec<Genome> {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut config = Config::default().genome;
    config.initial_length_min = length;
    config.initial_length_max = length;
    config.max_length = length;
    config.max_neurons = 16;
    (0..count).map(|_| Genome::random(&mut rng, &config)).collect()
}

fn benchmark_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");

    for length in [24, 128].iter() {
        let genomes = random_genomes(*length, 64);
        group.bench_with_input(BenchmarkId::new("genes", length), length, |b, _| {
            b.iter(|| {
                for g in &genomes {
                    black_box(NeuralNet::from_genome(black_box(g)));
                }
            });
        });
    }

    group.finish();
}

fn benchmark_feed_forward(c: &mut Criterion) {
    let genomes = random_genomes(128, 64);
    let nets: Vec<NeuralNet> = genomes.iter().map(NeuralNet::from_genome).collect();
    let mut scratch: Vec<Scratch> = nets.iter().map(Scratch::for_net).collect();

    c.bench_function("feed_forward_128_genes", |b| {
        b.iter(|| {
            for (net, buf) in nets.iter().zip(scratch.iter_mut()) {
                black_box(net.feed_forward(buf, |s| s as f32 * 0.05));
            }
        });
    });
}

criterion_group!(
    benches,
    benchmark_simulation_step,
    benchmark_compile,
    benchmark_feed_forward
);
criterion_main!(benches);
