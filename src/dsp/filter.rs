use std::f64::consts::PI;

/*
Smoothing Filter
================

Each voice runs its pulse through a gentle low-pass. It trims what little
energy the oscillator leaves near Nyquist and doubles as the "Virtual Filter"
tone control.

Design
------

Second-order Butterworth low-pass (Q = 1/√2) via the bilinear transform:

    n   = 1 / tan(π · fc / fs)
    c1  = 1 / (1 + n/Q + n²)

    b0 = c1      b1 = 2·c1      b2 = c1
    a1 = 2·c1·(1 - n²)
    a2 = c1·(1 - n/Q + n²)

Coefficients are computed in f64 and stored as f32. The filter runs in
transposed direct form II, which needs only two state variables:

    y  = b0·x + z1
    z1 = b1·x - a1·y + z2
    z2 = b2·x - a2·y

The bilinear transform puts a zero at Nyquist, so the oscillator's top-octave
ripple is always removed no matter where the cutoff sits.

Control Mapping
---------------

The UI control runs the "wrong" way on purpose:

    control 0.0  →  cutoff = 0.45 · fs     (open, brightest)
    control 1.0  →  cutoff = 200 Hz        (closed, most filtered)

with linear interpolation in between. Rebuilding coefficients costs a `tan`
and a handful of divides, so the voice only does it when the control has moved
by more than `CUTOFF_HYSTERESIS` since the last rebuild.
*/

/// Lowest cutoff the control can reach (control = 1).
pub const MIN_CUTOFF_HZ: f32 = 200.0;
/// Highest cutoff as a fraction of the sample rate (control = 0).
pub const MAX_CUTOFF_RATIO: f64 = 0.45;
/// Control movement below this is ignored.
pub const CUTOFF_HYSTERESIS: f32 = 1.0e-3;

const BUTTERWORTH_Q: f64 = std::f64::consts::FRAC_1_SQRT_2;

/// Map the filter control onto a cutoff frequency in Hz.
///
/// Returns 0.0 when `sample_rate` is not positive.
pub fn control_to_cutoff(control: f32, sample_rate: f64) -> f32 {
    if !(sample_rate > 0.0) {
        return 0.0;
    }

    let control = control.clamp(0.0, 1.0);
    let max_cutoff = (sample_rate * MAX_CUTOFF_RATIO) as f32;
    max_cutoff + (MIN_CUTOFF_HZ - max_cutoff) * control
}

/// Normalized biquad coefficients (a0 = 1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LowPassCoefficients {
    pub b0: f32,
    pub b1: f32,
    pub b2: f32,
    pub a1: f32,
    pub a2: f32,
}

impl LowPassCoefficients {
    /// Identity response, used until the first cutoff is set.
    pub const PASSTHROUGH: Self = Self {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    pub fn butterworth(sample_rate: f64, cutoff_hz: f32) -> Self {
        let n = 1.0 / (PI * cutoff_hz as f64 / sample_rate).tan();
        let n_squared = n * n;
        let c1 = 1.0 / (1.0 + n / BUTTERWORTH_Q + n_squared);

        Self {
            b0: c1 as f32,
            b1: (c1 * 2.0) as f32,
            b2: c1 as f32,
            a1: (c1 * 2.0 * (1.0 - n_squared)) as f32,
            a2: (c1 * (1.0 - n / BUTTERWORTH_Q + n_squared)) as f32,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SmoothingFilter {
    coefficients: LowPassCoefficients,
    z1: f32,
    z2: f32,
    cutoff_hz: f32,
}

impl Default for SmoothingFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl SmoothingFilter {
    pub fn new() -> Self {
        Self {
            coefficients: LowPassCoefficients::PASSTHROUGH,
            z1: 0.0,
            z2: 0.0,
            cutoff_hz: 0.0,
        }
    }

    /// Rebuild coefficients for `cutoff_hz`.
    ///
    /// Ignored unless the sample rate is positive. The cutoff is kept strictly
    /// inside (0, Nyquist) so `tan` stays finite, even for tiny rates.
    pub fn set_cutoff(&mut self, sample_rate: f64, cutoff_hz: f32) {
        if !(sample_rate > 0.0) {
            return;
        }

        let upper = ((sample_rate * 0.5) as f32 * 0.999).max(f32::MIN_POSITIVE);
        let cutoff = if cutoff_hz.is_nan() {
            upper
        } else {
            cutoff_hz.clamp(upper.min(1.0), upper)
        };
        self.coefficients = LowPassCoefficients::butterworth(sample_rate, cutoff);
        self.cutoff_hz = cutoff;
    }

    /// Rebuild coefficients from the UI control value (0 = open, 1 = closed).
    pub fn set_control(&mut self, sample_rate: f64, control: f32) {
        if !(sample_rate > 0.0) {
            return;
        }
        self.set_cutoff(sample_rate, control_to_cutoff(control, sample_rate));
    }

    #[inline]
    pub fn process_sample(&mut self, x: f32) -> f32 {
        let c = &self.coefficients;
        let y = c.b0 * x + self.z1;
        self.z1 = c.b1 * x - c.a1 * y + self.z2;
        self.z2 = c.b2 * x - c.a2 * y;
        y
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }

    pub fn reset(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
    }

    pub fn cutoff_hz(&self) -> f32 {
        self.cutoff_hz
    }

    pub fn coefficients(&self) -> LowPassCoefficients {
        self.coefficients
    }
}
