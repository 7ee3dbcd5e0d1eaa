use std::sync::Arc;

use log::info;

use crate::{
    dsp::amplify::clear_channels,
    io::{converter::midi_to_synth, midi::MidiEvent},
    synth::{
        message::{MessageReceiver, SynthMessage},
        params::{ParamId, ParamSnapshot, SharedParams},
        sound::{AllNotes, SoundFilter},
        voice::Voice,
    },
    MAX_BLOCK_SIZE, NUM_VOICES,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Size of the voice pool, fixed for the engine's lifetime.
    pub voices: usize,
    /// Longest run rendered from a single parameter snapshot.
    pub max_block_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            voices: NUM_VOICES,
            max_block_size: MAX_BLOCK_SIZE,
        }
    }
}

/// Polyphonic pulse synth: a fixed voice pool plus the allocator that feeds it.
///
/// All voices are created up front. Nothing on the note or render path
/// allocates, locks or logs.
pub struct PolySynth<S: SoundFilter = AllNotes> {
    voices: Vec<Voice>,
    sound: S,
    params: Arc<SharedParams>,
    config: EngineConfig,
    sample_rate: f64,
    block_size: usize,
    note_counter: u64,
}

impl PolySynth<AllNotes> {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self::with_params(config, Arc::new(SharedParams::new()))
    }

    /// Build an engine reading from parameters owned elsewhere (e.g. a UI).
    pub fn with_params(config: EngineConfig, params: Arc<SharedParams>) -> Self {
        Self::with_sound(config, params, AllNotes)
    }
}

impl Default for PolySynth<AllNotes> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: SoundFilter> PolySynth<S> {
    pub fn with_sound(config: EngineConfig, params: Arc<SharedParams>, sound: S) -> Self {
        let config = EngineConfig {
            voices: config.voices.max(1),
            max_block_size: config.max_block_size.max(1),
        };
        let voices = (0..config.voices).map(|_| Voice::new()).collect();

        Self {
            voices,
            sound,
            params,
            config,
            sample_rate: 0.0,
            block_size: 0,
            note_counter: 0,
        }
    }

    /// Set the sample rate for every voice and silence them.
    ///
    /// Must be called before rendering produces any sound.
    pub fn prepare(&mut self, sample_rate: f64, block_size: usize) {
        self.sample_rate = sample_rate;
        self.block_size = block_size;
        for voice in &mut self.voices {
            voice.set_sample_rate(sample_rate);
        }
        self.all_notes_off();

        info!(
            "prepared {} voices at {sample_rate} Hz, block size {block_size}",
            self.voices.len()
        );
    }

    /// Stop everything. The engine stays prepared.
    pub fn release(&mut self) {
        self.all_notes_off();
        info!("released all voices");
    }

    pub fn is_prepared(&self) -> bool {
        self.sample_rate > 0.0
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    pub fn params(&self) -> &Arc<SharedParams> {
        &self.params
    }

    pub fn set_parameter(&self, id: ParamId, value: f32) {
        self.params.set(id, value);
    }

    pub fn parameter(&self, id: ParamId) -> f32 {
        self.params.get(id)
    }

    /// Start a note. Velocity is 0.0 - 1.0; zero velocity releases the note.
    pub fn note_on(&mut self, note: u8, velocity: f32) {
        if note > 127 || !self.sound.applies_to_note(note) {
            return;
        }
        if velocity <= 0.0 {
            self.note_off(note);
            return;
        }

        // Retrigger: a note that is still sounding restarts on a fresh voice.
        for voice in &mut self.voices {
            if voice.is_active() && voice.note() == note {
                voice.stop();
            }
        }

        let index = match self.voices.iter().position(Voice::is_idle) {
            Some(index) => index,
            None => self.steal_index(note),
        };

        let snapshot = self.params.snapshot();
        let age = self.note_counter;
        self.note_counter += 1;

        if let Some(voice) = self.voices.get_mut(index) {
            voice.stop();
            voice.start(note, velocity, age, &snapshot);
        }
    }

    /// Stop every voice sounding `note`.
    pub fn note_off(&mut self, note: u8) {
        for voice in &mut self.voices {
            if voice.is_active() && voice.note() == note {
                voice.stop();
            }
        }
    }

    pub fn all_notes_off(&mut self) {
        for voice in &mut self.voices {
            voice.stop();
        }
    }

    /// Pick a voice to take over when none is idle.
    ///
    /// A voice already on `note` is the ideal victim. Otherwise the lowest and
    /// highest sounding notes are protected and the oldest of the rest goes.
    /// With only protected voices left, the top note is given up so the bass
    /// survives.
    fn steal_index(&self, note: u8) -> usize {
        let active = || self.voices.iter().enumerate().filter(|(_, v)| v.is_active());

        if let Some((index, _)) = active()
            .filter(|(_, v)| v.note() == note)
            .min_by_key(|(_, v)| v.age())
        {
            return index;
        }

        let low = active().min_by_key(|(_, v)| v.note()).map(|(i, _)| i);
        let top = active().max_by_key(|(_, v)| v.note()).map(|(i, _)| i);

        active()
            .filter(|(i, _)| Some(*i) != low && Some(*i) != top)
            .min_by_key(|(_, v)| v.age())
            .map(|(i, _)| i)
            .or(top)
            .or(low)
            .unwrap_or(0)
    }

    pub fn handle_message(&mut self, message: SynthMessage) {
        match message {
            SynthMessage::NoteOn { note, velocity } => self.note_on(note, velocity),
            SynthMessage::NoteOff { note } => self.note_off(note),
            SynthMessage::AllNotesOff => self.all_notes_off(),
            SynthMessage::SetParam { id, value } => self.set_parameter(id, value),
        }
    }

    /// Apply a decoded MIDI event. Channels and notes outside the sound's
    /// scope are ignored, as are pitch bend and program changes.
    pub fn handle_midi(&mut self, event: MidiEvent) {
        let channel = event.channel();
        if !self.sound.applies_to_channel(channel) {
            return;
        }
        if let Some(message) = midi_to_synth(event, channel) {
            self.handle_message(message);
        }
    }

    /// Apply every pending message. Call at block start.
    pub fn drain<R: MessageReceiver + ?Sized>(&mut self, rx: &mut R) {
        while let Some(message) = rx.pop() {
            self.handle_message(message);
        }
    }

    /// Add `num_samples` of output into every channel.
    ///
    /// Purely additive: the caller clears the buffer. Silent until
    /// [`PolySynth::prepare`] has been called with a positive rate.
    pub fn render_block<C: AsMut<[f32]>>(&mut self, channels: &mut [C], num_samples: usize) {
        if !self.is_prepared() {
            return;
        }

        let available = channels
            .iter_mut()
            .map(|c| c.as_mut().len())
            .min()
            .unwrap_or(0);
        let total = num_samples.min(available);

        let mut start = 0;
        while start < total {
            let len = (total - start).min(self.config.max_block_size);
            let snapshot = self.params.snapshot();
            for voice in &mut self.voices {
                voice.render(channels, start, len, &snapshot);
            }
            start += len;
        }
    }

    /// Host-style entry point: clear, apply pending messages, render.
    pub fn process_block<C, R>(&mut self, channels: &mut [C], rx: &mut R)
    where
        C: AsMut<[f32]>,
        R: MessageReceiver + ?Sized,
    {
        clear_channels(channels);
        if !self.is_prepared() {
            return;
        }

        self.drain(rx);
        let num_samples = channels
            .iter_mut()
            .map(|c| c.as_mut().len())
            .min()
            .unwrap_or(0);
        self.render_block(channels, num_samples);
    }

    pub fn snapshot(&self) -> ParamSnapshot {
        self.params.snapshot()
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn active_voice_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    /// Notes currently sounding, in voice order.
    pub fn active_notes(&self) -> impl Iterator<Item = u8> + '_ {
        self.voices.iter().filter(|v| v.is_active()).map(Voice::note)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::message::NoMessages;

    const SAMPLE_RATE: f64 = 44_100.0;

    fn prepared() -> PolySynth {
        let mut synth = PolySynth::new();
        synth.prepare(SAMPLE_RATE, 512);
        synth
    }

    fn render(synth: &mut PolySynth, len: usize) -> Vec<Vec<f32>> {
        let mut channels = vec![vec![0.0f32; len]; 2];
        synth.render_block(&mut channels, len);
        channels
    }

    fn notes(synth: &PolySynth) -> Vec<u8> {
        let mut notes: Vec<u8> = synth.active_notes().collect();
        notes.sort_unstable();
        notes
    }

    #[test]
    fn test_unprepared_engine_is_silent() {
        let mut synth = PolySynth::new();
        synth.note_on(60, 1.0);
        assert_eq!(synth.active_voice_count(), 0);

        let out = render(&mut synth, 256);
        assert!(out.iter().flatten().all(|&s| s == 0.0));
    }

    #[test]
    fn test_tiny_sample_rate_renders_finite_output() {
        let mut synth = PolySynth::new();
        synth.prepare(1.5, 64);
        synth.note_on(60, 1.0);
        assert_eq!(synth.active_voice_count(), 1);

        let out = render(&mut synth, 64);
        assert!(out.iter().flatten().all(|s| s.is_finite()));
    }

    #[test]
    fn test_nan_sample_rate_leaves_engine_silent() {
        let mut synth = PolySynth::new();
        synth.prepare(f64::NAN, 64);
        assert!(!synth.is_prepared());

        synth.note_on(60, 1.0);
        assert_eq!(synth.active_voice_count(), 0);
        let out = render(&mut synth, 64);
        assert!(out.iter().flatten().all(|&s| s == 0.0));
    }

    #[test]
    fn test_note_on_and_off() {
        let mut synth = prepared();
        synth.note_on(60, 1.0);
        synth.note_on(64, 1.0);
        assert_eq!(notes(&synth), vec![60, 64]);

        synth.note_off(60);
        assert_eq!(notes(&synth), vec![64]);
    }

    #[test]
    fn test_zero_velocity_releases() {
        let mut synth = prepared();
        synth.note_on(60, 1.0);
        synth.note_on(60, 0.0);
        assert_eq!(synth.active_voice_count(), 0);
    }

    #[test]
    fn test_retrigger_uses_single_voice() {
        let mut synth = prepared();
        synth.note_on(60, 0.5);
        synth.note_on(60, 1.0);

        assert_eq!(synth.active_voice_count(), 1);
        let voice = synth.voices().iter().find(|v| v.is_active()).expect("one voice sounding");
        assert!((voice.level() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_ninth_note_steals_oldest_unprotected_voice() {
        let mut synth = prepared();
        // Oldest first: 60 is neither lowest nor highest.
        for &note in &[60u8, 48, 72, 62, 64, 65, 67, 69] {
            synth.note_on(note, 1.0);
        }
        assert_eq!(synth.active_voice_count(), NUM_VOICES);

        synth.note_on(71, 1.0);

        assert_eq!(synth.active_voice_count(), NUM_VOICES);
        assert_eq!(notes(&synth), vec![48, 62, 64, 65, 67, 69, 71, 72]);
    }

    #[test]
    fn test_lowest_and_highest_notes_are_protected() {
        let mut synth = prepared();
        // The two oldest are the bass and the top note.
        for &note in &[36u8, 96, 60, 61, 62, 63, 64, 65] {
            synth.note_on(note, 1.0);
        }

        synth.note_on(70, 1.0);
        assert_eq!(notes(&synth), vec![36, 61, 62, 63, 64, 65, 70, 96]);
    }

    #[test]
    fn test_two_voice_pool_gives_up_top_note() {
        let mut synth = PolySynth::with_config(EngineConfig {
            voices: 2,
            ..EngineConfig::default()
        });
        synth.prepare(SAMPLE_RATE, 64);
        synth.note_on(40, 1.0);
        synth.note_on(80, 1.0);
        synth.note_on(60, 1.0);

        assert_eq!(notes(&synth), vec![40, 60]);
    }

    #[test]
    fn test_many_notes_never_exceed_pool() {
        let mut synth = prepared();
        for note in 20..120u8 {
            synth.note_on(note, 0.9);
            assert!(synth.active_voice_count() <= NUM_VOICES);
            let out = render(&mut synth, 32);
            assert!(out.iter().flatten().all(|s| s.is_finite()));
        }
    }

    #[test]
    fn test_prepare_and_release_silence_all_voices() {
        let mut synth = prepared();
        synth.note_on(60, 1.0);
        synth.note_on(67, 1.0);

        synth.release();
        assert_eq!(synth.active_voice_count(), 0);

        synth.note_on(60, 1.0);
        synth.prepare(48_000.0, 256);
        assert_eq!(synth.active_voice_count(), 0);
        assert!(synth.voices().iter().all(|v| v.sample_rate() == 48_000.0));
    }

    #[test]
    fn test_start_then_stop_in_same_block_is_silent() {
        let mut synth = prepared();
        synth.note_on(69, 1.0);
        synth.note_off(69);

        let out = render(&mut synth, 512);
        assert!(out.iter().flatten().all(|&s| s == 0.0));
    }

    #[test]
    fn test_voices_mix_additively() {
        let mut a = prepared();
        a.note_on(60, 1.0);
        let only_a = render(&mut a, 256);

        let mut b = prepared();
        b.note_on(67, 1.0);
        let only_b = render(&mut b, 256);

        let mut both = prepared();
        both.note_on(60, 1.0);
        both.note_on(67, 1.0);
        let mixed = render(&mut both, 256);

        for i in 0..256 {
            assert!((only_a[0][i] + only_b[0][i] - mixed[0][i]).abs() < 1e-6);
        }
    }

    #[test]
    fn test_render_clips_to_shortest_channel() {
        let mut synth = prepared();
        synth.note_on(60, 1.0);

        let mut channels = vec![vec![0.0f32; 64], vec![0.0f32; 32]];
        synth.render_block(&mut channels, 64);
        assert!(channels[0][32..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_long_blocks_render_in_chunks() {
        let mut chunked = PolySynth::with_config(EngineConfig {
            max_block_size: 100,
            ..EngineConfig::default()
        });
        chunked.prepare(SAMPLE_RATE, 1_000);
        chunked.note_on(55, 1.0);
        let chunked_out = render(&mut chunked, 1_000);

        let mut whole = prepared();
        whole.note_on(55, 1.0);
        let whole_out = render(&mut whole, 1_000);

        assert_eq!(chunked_out, whole_out);
    }

    #[test]
    fn test_messages_and_midi() {
        let mut synth = prepared();
        let events = [
            SynthMessage::SetParam {
                id: ParamId::Gain,
                value: -6.0,
            },
            SynthMessage::NoteOn {
                note: 60,
                velocity: 1.0,
            },
            SynthMessage::NoteOn {
                note: 64,
                velocity: 1.0,
            },
            SynthMessage::NoteOff { note: 60 },
        ];
        synth.drain(&mut events.iter());
        assert_eq!(notes(&synth), vec![64]);
        assert!((synth.parameter(ParamId::Gain) - -6.0).abs() < 1e-4);

        synth.handle_midi(MidiEvent::NoteOn {
            channel: 5,
            key: 48,
            velocity: 100,
        });
        assert_eq!(notes(&synth), vec![48, 64]);

        synth.handle_midi(MidiEvent::ControlChange {
            channel: 0,
            controller: 123,
            value: 0,
        });
        assert_eq!(synth.active_voice_count(), 0);
    }

    #[test]
    fn test_process_block_clears_first() {
        let mut synth = prepared();
        let mut channels = vec![vec![0.75f32; 128]; 2];
        synth.process_block(&mut channels, &mut NoMessages);
        assert!(channels.iter().flatten().all(|&s| s == 0.0));
    }
}
