//! Benchmarks for gain and channel mixing helpers.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use pulse_synth::dsp::amplify;

use crate::BLOCK_SIZES;

pub fn bench_amplify(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/amplify");

    for &size in BLOCK_SIZES {
        let signal: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        let mut signal_copy = signal.clone();
        group.bench_with_input(BenchmarkId::new("apply_gain", size), &size, |b, _| {
            b.iter(|| {
                signal_copy.copy_from_slice(&signal);
                amplify::apply_gain(black_box(&mut signal_copy), black_box(0.5))
            })
        });

        // Mono voice fanned out to a stereo pair, as the engine does
        let mut stereo = vec![vec![0.0f32; size]; 2];
        group.bench_with_input(BenchmarkId::new("mix_mono_into", size), &size, |b, _| {
            b.iter(|| amplify::mix_mono_into(black_box(&mut stereo), 0, black_box(&signal)))
        });
    }

    group.bench_function("db_to_gain", |b| {
        b.iter(|| amplify::db_to_gain(black_box(-12.0)))
    });

    group.finish();
}
