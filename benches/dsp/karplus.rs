//! Benchmarks for Karplus-Strong note synthesis.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use rand::{rngs::StdRng, SeedableRng};
use strum_dsp::dsp::karplus::{resonate, string_damping, NoteBuffer};
use strum_dsp::fretboard::Tuning;

pub fn bench_karplus(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/karplus");
    let tuning = Tuning::standard();
    let mut rng = StdRng::seed_from_u64(1);

    // Full pluck (excite + resonate) for the note lengths people actually use
    for &duration in &[0.5, 1.0, 3.0] {
        for string in [0, 5] {
            let freq = tuning.frequency(string, 0).unwrap_or(110.0);
            let id = format!("{}s_string{}", duration, string);
            group.bench_with_input(BenchmarkId::new("pluck", id), &duration, |b, &duration| {
                b.iter(|| {
                    NoteBuffer::pluck(
                        black_box(freq),
                        string,
                        48_000.0,
                        black_box(duration),
                        &mut rng,
                    )
                })
            });
        }
    }

    // Resonator alone over one second, short and long periods
    let mut buffer = vec![0.0f32; 48_000];
    for &period in &[109, 582] {
        group.bench_with_input(BenchmarkId::new("resonate", period), &period, |b, &period| {
            b.iter(|| {
                buffer[..period].fill(0.5);
                resonate(black_box(&mut buffer), period, string_damping(2));
            })
        });
    }

    group.finish();
}
