//! Benchmarks for the Butterworth smoothing filter.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use pulse_synth::dsp::filter::SmoothingFilter;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        let mut filter = SmoothingFilter::new();
        filter.set_control(SAMPLE_RATE, 0.5);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("lowpass", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer));
            })
        });
    }

    // Cost of a coefficient rebuild, paid whenever the control moves
    group.bench_function("set_control", |b| {
        let mut filter = SmoothingFilter::new();
        let mut control = 0.0f32;
        b.iter(|| {
            control = (control + 0.01) % 1.0;
            filter.set_control(black_box(SAMPLE_RATE), black_box(control));
        })
    });

    group.finish();
}
