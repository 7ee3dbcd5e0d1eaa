/// Demonstrates polyphonic synthesis without real-time audio
/// Shows voice allocation, retriggering and voice stealing

use rtrb::RingBuffer;
use pulse_synth::{
    synth::{message::SynthMessage, poly::PolySynth},
    NUM_VOICES,
};

fn peak(buffer: &[Vec<f32>]) -> f32 {
    buffer[0].iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
}

fn sounding(poly: &PolySynth) -> Vec<u8> {
    let mut notes: Vec<u8> = poly.active_notes().collect();
    notes.sort_unstable();
    notes
}

fn main() {
    env_logger::init();
    println!("=== Polyphony Demo (Offline) ===\n");

    let sample_rate = 48_000.0;
    let block_size = 256;

    // Control thread side of the message queue
    let (mut tx, mut rx) = RingBuffer::<SynthMessage>::new(64);

    let mut poly = PolySynth::new();
    poly.prepare(sample_rate, block_size);
    println!("Created PolySynth with {} voices\n", NUM_VOICES);

    let mut buffer = vec![vec![0.0f32; block_size]; 2];

    // C major seventh, spread over two octaves
    println!("Playing Cmaj7:");
    for note in [48u8, 55, 60, 64, 67, 71] {
        println!("  Note On: {note}");
        let _ = tx.push(SynthMessage::NoteOn {
            note,
            velocity: 0.8,
        });
    }
    poly.process_block(&mut buffer, &mut rx);
    println!("  Active voices: {}", poly.active_voice_count());
    println!("  Peak amplitude: {:.3}", peak(&buffer));

    // Retrigger a sounding note: it moves to a fresh voice, no doubling
    println!("\nRetriggering E4 (64)");
    let _ = tx.push(SynthMessage::NoteOn {
        note: 64,
        velocity: 1.0,
    });
    poly.process_block(&mut buffer, &mut rx);
    println!("  Active voices: {}", poly.active_voice_count());

    // Fill the pool, then go one past it
    println!("\nAdding D5 (74), F5 (77) and A5 (81) - the last one steals");
    for note in [74u8, 77, 81] {
        let _ = tx.push(SynthMessage::NoteOn {
            note,
            velocity: 0.8,
        });
    }
    poly.process_block(&mut buffer, &mut rx);
    println!("  Sounding: {:?}", sounding(&poly));
    println!("  Lowest (48) and highest (77) were protected; the oldest inner note (55) went");
    println!("  Peak amplitude: {:.3}", peak(&buffer));

    // Release everything
    println!("\nAll notes off");
    let _ = tx.push(SynthMessage::AllNotesOff);
    poly.process_block(&mut buffer, &mut rx);
    println!("  Active voices: {}", poly.active_voice_count());
    println!("  Peak amplitude: {:.3}", peak(&buffer));
}
