//! Benchmarks for the feedback-FM saw and the pulse built from two of them.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use pulse_synth::dsp::oscillator::{PulseOscillator, SawOscillator};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // One sin() per sample
        let mut saw = SawOscillator::new();
        saw.set_frequency(440.0, SAMPLE_RATE);
        group.bench_with_input(BenchmarkId::new("saw", size), &size, |b, _| {
            b.iter(|| {
                for sample in buffer.iter_mut() {
                    *sample = saw.next_sample();
                }
                black_box(&buffer);
            })
        });

        // Two saws per sample
        let mut pulse = PulseOscillator::new();
        pulse.set_frequency(440.0, SAMPLE_RATE);
        pulse.set_pulse_width(0.5);
        group.bench_with_input(BenchmarkId::new("pulse", size), &size, |b, _| {
            b.iter(|| pulse.render(black_box(&mut buffer)))
        });

        // Near the top of the band the bandwidth index is tiny
        let mut high = PulseOscillator::new();
        high.set_frequency(12_000.0, SAMPLE_RATE);
        high.set_pulse_width(0.2);
        group.bench_with_input(BenchmarkId::new("pulse_12k", size), &size, |b, _| {
            b.iter(|| high.render(black_box(&mut buffer)))
        });
    }

    group.bench_function("set_frequency", |b| {
        let mut pulse = PulseOscillator::new();
        b.iter(|| pulse.set_frequency(black_box(261.63), black_box(SAMPLE_RATE)))
    });

    group.finish();
}
