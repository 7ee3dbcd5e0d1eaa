use crate::{io::midi::MidiEvent, synth::message::SynthMessage};

/// Translate a MIDI event into an engine message.
///
/// Only note events on `channel_filter` pass. A note-on with velocity 0 is a
/// note-off by MIDI convention.
pub fn midi_to_synth(midi: MidiEvent, channel_filter: u8) -> Option<SynthMessage> {
    match midi {
        MidiEvent::NoteOn {
            channel,
            key,
            velocity: 0,
        } if channel == channel_filter => Some(SynthMessage::NoteOff { note: key }),
        MidiEvent::NoteOn {
            channel,
            key,
            velocity,
        } if channel == channel_filter => Some(SynthMessage::NoteOn {
            note: key,
            velocity: velocity_to_unit(velocity),
        }),
        MidiEvent::NoteOff { channel, key, .. } if channel == channel_filter => {
            Some(SynthMessage::NoteOff { note: key })
        }
        MidiEvent::ControlChange {
            channel,
            controller: 123,
            ..
        } if channel == channel_filter => Some(SynthMessage::AllNotesOff),
        _ => None,
    }
}

/// Convert MIDI note number to frequency in Hz.
/// A4 = 440 Hz = MIDI note 69
#[inline]
pub fn midi_note_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}

/// Map a 7-bit MIDI velocity onto 0.0 - 1.0.
#[inline]
pub fn velocity_to_unit(velocity: u8) -> f32 {
    velocity.min(127) as f32 / 127.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_to_freq_reference_pitches() {
        assert_eq!(midi_note_to_freq(69), 440.0);
        assert!((midi_note_to_freq(60) - 261.626).abs() < 0.01);
        assert!((midi_note_to_freq(81) - 880.0).abs() < 0.01);
        assert!((midi_note_to_freq(0) - 8.176).abs() < 0.01);
    }

    #[test]
    fn test_velocity_scaling() {
        assert_eq!(velocity_to_unit(0), 0.0);
        assert_eq!(velocity_to_unit(127), 1.0);
        assert_eq!(velocity_to_unit(200), 1.0);
    }

    #[test]
    fn test_channel_filter() {
        let on = MidiEvent::NoteOn {
            channel: 2,
            key: 64,
            velocity: 127,
        };
        assert_eq!(
            midi_to_synth(on, 2),
            Some(SynthMessage::NoteOn {
                note: 64,
                velocity: 1.0
            })
        );
        assert_eq!(midi_to_synth(on, 0), None);
    }

    #[test]
    fn test_zero_velocity_note_on_is_note_off() {
        let event = MidiEvent::NoteOn {
            channel: 0,
            key: 60,
            velocity: 0,
        };
        assert_eq!(midi_to_synth(event, 0), Some(SynthMessage::NoteOff { note: 60 }));
    }

    #[test]
    fn test_all_notes_off_controller() {
        let event = MidiEvent::ControlChange {
            channel: 0,
            controller: 123,
            value: 0,
        };
        assert_eq!(midi_to_synth(event, 0), Some(SynthMessage::AllNotesOff));
    }
}
