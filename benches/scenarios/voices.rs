//! Benchmarks for voice rendering and full-polyphony engine blocks.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use pulse_synth::{
    synth::{message::NoMessages, params::ParamSnapshot, voice::Voice},
    PolySynth, NUM_VOICES,
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");
    let params = ParamSnapshot::default();

    for &size in BLOCK_SIZES {
        let mut stereo = vec![vec![0.0f32; size]; 2];

        // === SINGLE VOICE ===
        // Baseline: pulse → filter → gain into two channels
        let mut voice = Voice::new();
        voice.set_sample_rate(SAMPLE_RATE);
        voice.start(45, 0.8, 0, &params);
        group.bench_with_input(BenchmarkId::new("voice", size), &size, |b, _| {
            b.iter(|| voice.render(black_box(&mut stereo), 0, size, black_box(&params)))
        });

        // === FULL POOL ===
        // Every voice sounding a chord across the keyboard
        let mut synth = PolySynth::new();
        synth.prepare(SAMPLE_RATE, size);
        for i in 0..NUM_VOICES as u8 {
            synth.note_on(40 + i * 5, 0.8);
        }
        group.bench_with_input(BenchmarkId::new("poly_full", size), &size, |b, _| {
            b.iter(|| synth.process_block(black_box(&mut stereo), &mut NoMessages))
        });

        // === FILTER SWEEP ===
        // Control moves every block, forcing coefficient rebuilds in each voice
        let mut sweep = PolySynth::new();
        sweep.prepare(SAMPLE_RATE, size);
        for i in 0..NUM_VOICES as u8 {
            sweep.note_on(48 + i * 3, 0.8);
        }
        let mut control = 0.0f32;
        group.bench_with_input(BenchmarkId::new("poly_filter_sweep", size), &size, |b, _| {
            b.iter(|| {
                control = (control + 0.05) % 1.0;
                sweep.set_parameter(pulse_synth::ParamId::FilterAmount, control);
                sweep.process_block(black_box(&mut stereo), &mut NoMessages);
            })
        });
    }

    group.finish();
}
