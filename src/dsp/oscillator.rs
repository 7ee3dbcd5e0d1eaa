use std::f32::consts::TAU;

/*
Band-Limited Saw and Pulse
==========================

A naive sawtooth (`2 * phase - 1`) jumps from +1 to -1 in a single sample.
That jump contains energy at every frequency, and everything above Nyquist
folds back into the audible band as inharmonic "aliasing" whine. The higher
the note, the worse it gets.

This module avoids the jump instead of filtering it out afterwards.

Vocabulary
----------

  w             Normalized frequency, `freq / sample_rate`. One cycle takes
                `1 / w` samples. Clamped to [0, 0.49] so the recurrence never
                sees a frequency at or past Nyquist.

  beta          Feedback amount. Large at low frequencies (a sharp, bright
                saw), shrinking towards zero as w approaches Nyquist (the wave
                relaxes towards a sine, which is all that fits).

  feedback FM   Feeding the oscillator's own output back into its phase. A
                sine with positive phase feedback leans forward and turns into
                a ramp, with a rounded (band-limited) reset instead of a
                discontinuity.


The Saw Recurrence
------------------

Per sample:

    input    = sin(2π · (phase + osc · beta))
    osc      = 0.5 · (osc + input)             one-pole smoothing of feedback
    filtered = 2.5 · osc - 1.5 · osc_prev       lift the HF rolloff
    out      = (filtered - dc) / norm

with

    beta = 13 · (0.5 - w)⁴
    dc   = 0.376 - 0.752 · w
    norm = max(0.001, 1 - 2w)

`dc` and `norm` are closed-form fits that remove the offset and level drift
the feedback introduces, so the wave stays centred and roughly unit-scaled
over the usable range without measuring anything at runtime.

Near Nyquist the normalization divides by a small number, so the raw saw
grows roughly as 1 / norm there. It stays bounded; it is just not unit level.


Pulse From Two Saws
-------------------

Subtracting a saw from a copy of itself delayed by a fraction `pw` of the
cycle cancels the ramps and leaves only the two resets, one pointing up and
one pointing down:

    leading  :  /|/|/|/|
    trailing :  |/|/|/|/      (same wave, phase + pw)
    leading - trailing  =  ‾‾|__|‾‾|__

Both edges are band-limited because both saws are. The distance between the
edges is the pulse width: 0.5 gives a square wave, small or large values give
thin pulses.

The trailing saw is not free-running. Every sample its phase base is taken
from the leading saw (before the leading saw advances) plus `pw`, so the two
edges can never drift apart. It keeps its own feedback and history state,
because those depend on its own output.
*/

/// HF compensation tap applied to the current smoothed sample.
pub const HF_COMP_A0: f32 = 2.5;
/// HF compensation tap applied to the previous smoothed sample.
pub const HF_COMP_A1: f32 = -1.5;
/// Floor for the normalization divisor.
pub const MIN_NORM: f32 = 0.001;
/// Highest normalized frequency the recurrence accepts.
pub const MAX_NORMALIZED_FREQ: f32 = 0.49;
/// Narrowest pulse width the pulse oscillator will render.
pub const MIN_PULSE_WIDTH: f32 = 0.01;
/// Widest pulse width the pulse oscillator will render.
pub const MAX_PULSE_WIDTH: f32 = 0.99;

#[inline]
fn wrap_phase(mut phase: f32) -> f32 {
    while phase >= 1.0 {
        phase -= 1.0;
    }
    phase
}

/// Anti-aliased sawtooth built on a feedback-FM sine recurrence.
#[derive(Debug, Clone, Copy, Default)]
pub struct SawOscillator {
    phase: f32,
    osc: f32,
    previous: f32,
    w: f32,
    beta: f32,
}

impl SawOscillator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retune the oscillator. Ignored when `sample_rate` is not positive.
    pub fn set_frequency(&mut self, frequency: f32, sample_rate: f64) {
        if !(sample_rate > 0.0) {
            return;
        }

        let normalized = frequency / sample_rate as f32;
        self.w = normalized.clamp(0.0, MAX_NORMALIZED_FREQ);
        let diff = 0.5 - self.w;
        self.beta = 13.0 * diff * diff * diff * diff;
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        self.step_from(self.phase)
    }

    /// Run one step of the recurrence using `base` as the phase.
    ///
    /// Afterwards the oscillator's phase is `base + w`, wrapped.
    #[inline]
    pub(crate) fn step_from(&mut self, base: f32) -> f32 {
        let feedback_phase = base + self.osc * self.beta;
        let input = (TAU * feedback_phase).sin();
        self.osc = 0.5 * (self.osc + input);

        let filtered = HF_COMP_A0 * self.osc + HF_COMP_A1 * self.previous;
        self.previous = self.osc;

        let dc = 0.376 - 0.752 * self.w;
        let norm = (1.0 - 2.0 * self.w).max(MIN_NORM);
        let sample = (filtered - dc) / norm;

        self.phase = base + self.w;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }

        sample
    }

    /// Zero phase and feedback history. Frequency is kept.
    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.osc = 0.0;
        self.previous = 0.0;
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn normalized_frequency(&self) -> f32 {
        self.w
    }

    pub fn beta(&self) -> f32 {
        self.beta
    }
}

/// Band-limited pulse made by subtracting two phase-offset saws.
#[derive(Debug, Clone, Copy)]
pub struct PulseOscillator {
    leading: SawOscillator,
    trailing: SawOscillator,
    pulse_width: f32,
}

impl Default for PulseOscillator {
    fn default() -> Self {
        Self::new()
    }
}

impl PulseOscillator {
    pub fn new() -> Self {
        Self {
            leading: SawOscillator::new(),
            trailing: SawOscillator::new(),
            pulse_width: 0.5,
        }
    }

    pub fn set_frequency(&mut self, frequency: f32, sample_rate: f64) {
        self.leading.set_frequency(frequency, sample_rate);
        self.trailing.set_frequency(frequency, sample_rate);
    }

    /// Clamped to [0.01, 0.99]; 0 or 1 would collapse the pulse.
    pub fn set_pulse_width(&mut self, pulse_width: f32) {
        self.pulse_width = pulse_width.clamp(MIN_PULSE_WIDTH, MAX_PULSE_WIDTH);
    }

    pub fn pulse_width(&self) -> f32 {
        self.pulse_width
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let base = self.leading.phase;
        let leading = self.leading.next_sample();

        let shifted = wrap_phase(base + self.pulse_width);
        let trailing = self.trailing.step_from(shifted);

        (leading - trailing).clamp(-1.0, 1.0)
    }

    /// Fill `out` with consecutive samples.
    pub fn render(&mut self, out: &mut [f32]) {
        for sample in out.iter_mut() {
            *sample = self.next_sample();
        }
    }

    pub fn reset(&mut self) {
        self.leading.reset();
        self.trailing.reset();
    }

    pub fn leading(&self) -> &SawOscillator {
        &self.leading
    }

    pub fn trailing(&self) -> &SawOscillator {
        &self.trailing
    }
}
