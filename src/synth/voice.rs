use crate::dsp::amplify::{add_to_channels, db_to_gain};
use crate::dsp::filter::{SmoothingFilter, CUTOFF_HYSTERESIS};
use crate::dsp::oscillator::PulseOscillator;
use crate::io::converter::midi_note_to_freq;
use crate::synth::params::ParamSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Idle,   // Available for allocation
    Active, // Sounding a note
}

/// One pulse oscillator through one smoothing filter.
///
/// There is no envelope: a voice is either sounding at `level` or silent.
/// Stopping wipes the oscillator, so a stolen voice never carries phase or
/// feedback from its previous note.
pub struct Voice {
    state: VoiceState,
    note: u8,
    age: u64,
    level: f32,
    frequency: f32,
    sample_rate: f64,
    osc: PulseOscillator,
    filter: SmoothingFilter,
    /// Filter control the coefficients were last built from.
    last_filter_amount: f32,
}

impl Default for Voice {
    fn default() -> Self {
        Self::new()
    }
}

impl Voice {
    pub fn new() -> Self {
        Self {
            state: VoiceState::Idle,
            note: 0,
            age: 0,
            level: 0.0,
            frequency: 0.0,
            sample_rate: 0.0,
            osc: PulseOscillator::new(),
            filter: SmoothingFilter::new(),
            last_filter_amount: -1.0,
        }
    }

    /// Set the rate used by the oscillator and filter math.
    ///
    /// The voice stays silent until this is positive.
    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Start sounding `note` at `velocity` (0.0 - 1.0).
    ///
    /// Without a valid sample rate the voice is left idle.
    pub fn start(&mut self, note: u8, velocity: f32, age: u64, params: &ParamSnapshot) {
        if !(self.sample_rate > 0.0) {
            self.clear();
            return;
        }

        self.note = note;
        self.age = age;
        self.level = velocity.clamp(0.0, 1.0);
        self.frequency = midi_note_to_freq(note);

        self.osc.reset();
        self.osc.set_pulse_width(params.pulse_width);
        self.osc.set_frequency(self.frequency, self.sample_rate);

        self.rebuild_filter(params.filter_amount);
        self.filter.reset();

        self.state = VoiceState::Active;
    }

    /// Stop immediately. No tail.
    pub fn stop(&mut self) {
        self.osc.reset();
        self.clear();
    }

    fn clear(&mut self) {
        self.state = VoiceState::Idle;
        self.level = 0.0;
    }

    fn rebuild_filter(&mut self, filter_amount: f32) {
        if !(self.sample_rate > 0.0) {
            return;
        }
        self.last_filter_amount = filter_amount;
        self.filter.set_control(self.sample_rate, filter_amount);
    }

    /// Add `num_samples` of output into every channel, starting at `start`.
    pub fn render<C: AsMut<[f32]>>(
        &mut self,
        channels: &mut [C],
        start: usize,
        num_samples: usize,
        params: &ParamSnapshot,
    ) {
        if self.state != VoiceState::Active || !(self.sample_rate > 0.0) {
            return;
        }

        // Re-applied every block in case the host rate moved.
        self.osc.set_frequency(self.frequency, self.sample_rate);
        self.osc.set_pulse_width(params.pulse_width);

        if (params.filter_amount - self.last_filter_amount).abs() > CUTOFF_HYSTERESIS {
            self.rebuild_filter(params.filter_amount);
        }

        let scale = self.level * db_to_gain(params.gain_db);

        for i in start..start + num_samples {
            let raw = self.osc.next_sample() * scale;
            let value = self.filter.process_sample(raw);
            add_to_channels(channels, i, value);
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == VoiceState::Active
    }

    pub fn is_idle(&self) -> bool {
        self.state == VoiceState::Idle
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    pub fn note(&self) -> u8 {
        self.note
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn cutoff_hz(&self) -> f32 {
        self.filter.cutoff_hz()
    }
}
