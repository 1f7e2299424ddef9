//! Benchmarks for the pluck envelope.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use strum_dsp::dsp::envelope::PluckEnvelope;

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f32 = 48_000.0;

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![1.0f32; size];

        // Attack phase (linear ramp). Reset every block to stay in it.
        let mut env = PluckEnvelope::new(SAMPLE_RATE, 0.4, 0.01, 2.9, 0.001);
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| {
                env.reset();
                env.render(black_box(&mut buffer));
            })
        });

        // Exponential fade, which is where a note spends nearly all its time
        let mut env = PluckEnvelope::new(SAMPLE_RATE, 0.4, 0.01, 1_000.0, 0.001);
        let mut skip = vec![0.0f32; 4_800];
        env.render(&mut skip);
        group.bench_with_input(BenchmarkId::new("fade", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
