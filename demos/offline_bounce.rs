//! Render one second of an A minor chord offline and report its levels.
//!
//! Run with: RUST_LOG=info cargo run --example offline_bounce

use pulse_synth::{io::AudioOutput, synth::message::NoMessages, ParamId, PolySynth};

const SAMPLE_RATE: f64 = 44_100.0;
const BLOCK_SIZE: usize = 512;

fn main() {
    env_logger::init();

    let mut synth = PolySynth::new();
    synth.prepare(SAMPLE_RATE, BLOCK_SIZE);
    synth.set_parameter(ParamId::Gain, -18.0);
    synth.set_parameter(ParamId::PulseWidth, 0.3);

    for note in [57u8, 60, 64] {
        synth.note_on(note, 0.8);
    }

    let mut output = AudioOutput::new(2, BLOCK_SIZE);
    let mut bounce = Vec::with_capacity(SAMPLE_RATE as usize);

    while bounce.len() < SAMPLE_RATE as usize {
        // Sweep the filter closed over the bounce
        let progress = bounce.len() as f32 / SAMPLE_RATE as f32;
        synth.set_parameter(ParamId::FilterAmount, progress);

        synth.process_block(output.channels_mut(), &mut NoMessages);
        bounce.extend_from_slice(output.channel(0).unwrap_or_default());
    }

    let peak = bounce.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
    let rms = (bounce.iter().map(|x| x * x).sum::<f32>() / bounce.len() as f32).sqrt();

    println!("Rendered {} samples", bounce.len());
    println!("  Peak: {peak:.3}");
    println!("  RMS:  {rms:.3}");
}
