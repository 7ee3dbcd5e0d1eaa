//! Live parameters shared between the control thread and the audio thread.
//!
//! Each parameter is a single `AtomicU32` holding the bits of an `f32`, so the
//! control side can write at any time and the audio side reads with one
//! lock-free load. The three values are independent: a block may see a new
//! gain and an old pulse width, which is fine for continuous controls.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};

/// The three user-facing controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamId {
    /// Output level in decibels.
    Gain,
    /// Pulse width as a fraction of the cycle.
    PulseWidth,
    /// Smoothing filter control, 0 = open, 1 = closed.
    FilterAmount,
}

/// Range, step and default for one parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub id: ParamId,
    pub key: &'static str,
    pub name: &'static str,
    pub min: f32,
    pub max: f32,
    pub step: f32,
    pub default: f32,
}

pub const GAIN: ParamSpec = ParamSpec {
    id: ParamId::Gain,
    key: "gain",
    name: "Gain",
    min: -60.0,
    max: 0.0,
    step: 0.1,
    default: -12.0,
};

pub const PULSE_WIDTH: ParamSpec = ParamSpec {
    id: ParamId::PulseWidth,
    key: "pulseWidth",
    name: "Pulse Width",
    min: 0.05,
    max: 0.95,
    step: 0.001,
    default: 0.5,
};

pub const FILTER_AMOUNT: ParamSpec = ParamSpec {
    id: ParamId::FilterAmount,
    key: "filterCutoff",
    name: "Virtual Filter",
    min: 0.0,
    max: 1.0,
    step: 0.001,
    default: 0.5,
};

impl ParamId {
    pub const ALL: [ParamId; 3] = [ParamId::Gain, ParamId::PulseWidth, ParamId::FilterAmount];

    pub fn spec(self) -> &'static ParamSpec {
        match self {
            ParamId::Gain => &GAIN,
            ParamId::PulseWidth => &PULSE_WIDTH,
            ParamId::FilterAmount => &FILTER_AMOUNT,
        }
    }
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spec().key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseParamError(String);

impl fmt::Display for ParseParamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown parameter id `{}`", self.0)
    }
}

impl std::error::Error for ParseParamError {}

impl FromStr for ParamId {
    type Err = ParseParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParamId::ALL
            .into_iter()
            .find(|id| id.spec().key == s)
            .ok_or_else(|| ParseParamError(s.to_owned()))
    }
}

impl ParamSpec {
    /// Clamp into range and snap to the nearest step.
    pub fn constrain(&self, value: f32) -> f32 {
        if !value.is_finite() {
            return self.default;
        }

        let clamped = value.clamp(self.min, self.max);
        if self.step <= 0.0 {
            return clamped;
        }

        let steps = ((clamped - self.min) / self.step).round();
        (self.min + steps * self.step).clamp(self.min, self.max)
    }

    /// Position of `value` within the range, 0.0 to 1.0.
    pub fn normalize(&self, value: f32) -> f32 {
        ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }

    /// Inverse of [`ParamSpec::normalize`], constrained.
    pub fn denormalize(&self, position: f32) -> f32 {
        self.constrain(self.min + position.clamp(0.0, 1.0) * (self.max - self.min))
    }
}

/// Plain copy of the three parameter values, taken once per block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSnapshot {
    pub gain_db: f32,
    pub pulse_width: f32,
    pub filter_amount: f32,
}

impl Default for ParamSnapshot {
    fn default() -> Self {
        Self {
            gain_db: GAIN.default,
            pulse_width: PULSE_WIDTH.default,
            filter_amount: FILTER_AMOUNT.default,
        }
    }
}

impl ParamSnapshot {
    pub fn get(&self, id: ParamId) -> f32 {
        match id {
            ParamId::Gain => self.gain_db,
            ParamId::PulseWidth => self.pulse_width,
            ParamId::FilterAmount => self.filter_amount,
        }
    }
}

#[derive(Debug)]
struct AtomicF32(AtomicU32);

impl AtomicF32 {
    fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    #[inline]
    fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// Atomic parameter storage, usually wrapped in an `Arc`.
#[derive(Debug)]
pub struct SharedParams {
    gain_db: AtomicF32,
    pulse_width: AtomicF32,
    filter_amount: AtomicF32,
}

impl Default for SharedParams {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedParams {
    pub fn new() -> Self {
        Self::from_snapshot(ParamSnapshot::default())
    }

    pub fn from_snapshot(snapshot: ParamSnapshot) -> Self {
        let params = Self {
            gain_db: AtomicF32::new(GAIN.default),
            pulse_width: AtomicF32::new(PULSE_WIDTH.default),
            filter_amount: AtomicF32::new(FILTER_AMOUNT.default),
        };
        params.apply(snapshot);
        params
    }

    fn slot(&self, id: ParamId) -> &AtomicF32 {
        match id {
            ParamId::Gain => &self.gain_db,
            ParamId::PulseWidth => &self.pulse_width,
            ParamId::FilterAmount => &self.filter_amount,
        }
    }

    /// Store a new value, constrained to the parameter's range and step.
    pub fn set(&self, id: ParamId, value: f32) {
        self.slot(id).store(id.spec().constrain(value));
    }

    pub fn get(&self, id: ParamId) -> f32 {
        self.slot(id).load()
    }

    /// Read all three values. Each read is atomic on its own.
    #[inline]
    pub fn snapshot(&self) -> ParamSnapshot {
        ParamSnapshot {
            gain_db: self.gain_db.load(),
            pulse_width: self.pulse_width.load(),
            filter_amount: self.filter_amount.load(),
        }
    }

    /// Store every value from `snapshot`.
    pub fn apply(&self, snapshot: ParamSnapshot) {
        for id in ParamId::ALL {
            self.set(id, snapshot.get(id));
        }
    }

    pub fn reset_to_defaults(&self) {
        self.apply(ParamSnapshot::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_defaults_match_layout() {
        let params = SharedParams::new();
        let snap = params.snapshot();
        assert!((snap.gain_db - -12.0).abs() < 1e-5);
        assert!((snap.pulse_width - 0.5).abs() < 1e-6);
        assert!((snap.filter_amount - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_set_clamps_to_exposed_range() {
        let params = SharedParams::new();

        params.set(ParamId::Gain, 12.0);
        assert_eq!(params.get(ParamId::Gain), 0.0);
        params.set(ParamId::Gain, -90.0);
        assert_eq!(params.get(ParamId::Gain), -60.0);

        params.set(ParamId::PulseWidth, 0.0);
        assert!((params.get(ParamId::PulseWidth) - 0.05).abs() < 1e-6);
        params.set(ParamId::PulseWidth, 1.0);
        assert!((params.get(ParamId::PulseWidth) - 0.95).abs() < 1e-6);

        params.set(ParamId::FilterAmount, 2.0);
        assert_eq!(params.get(ParamId::FilterAmount), 1.0);
    }

    #[test]
    fn test_set_snaps_to_step() {
        let params = SharedParams::new();
        params.set(ParamId::Gain, -12.34);
        assert!((params.get(ParamId::Gain) - -12.3).abs() < 1e-4);

        params.set(ParamId::FilterAmount, 0.12345);
        assert!((params.get(ParamId::FilterAmount) - 0.123).abs() < 1e-5);
    }

    #[test]
    fn test_non_finite_falls_back_to_default() {
        assert_eq!(GAIN.constrain(f32::NAN), GAIN.default);
        assert_eq!(PULSE_WIDTH.constrain(f32::INFINITY), PULSE_WIDTH.default);
    }

    #[test]
    fn test_normalize_round_trips_through_denormalize() {
        for spec in [GAIN, PULSE_WIDTH, FILTER_AMOUNT] {
            assert_eq!(spec.normalize(spec.min), 0.0);
            assert_eq!(spec.normalize(spec.max), 1.0);
            let mid = spec.denormalize(0.5);
            assert!((spec.normalize(mid) - 0.5).abs() < 0.01, "{}", spec.name);
        }
    }

    #[test]
    fn test_param_id_parses_from_key() {
        assert_eq!("gain".parse::<ParamId>(), Ok(ParamId::Gain));
        assert_eq!("pulseWidth".parse::<ParamId>(), Ok(ParamId::PulseWidth));
        assert_eq!("filterCutoff".parse::<ParamId>(), Ok(ParamId::FilterAmount));
        assert!("cutoff".parse::<ParamId>().is_err());
        assert_eq!(ParamId::PulseWidth.to_string(), "pulseWidth");
    }

    #[test]
    fn test_concurrent_writes_never_tear() {
        let params = Arc::new(SharedParams::new());
        let writer = {
            let params = Arc::clone(&params);
            thread::spawn(move || {
                for i in 0..10_000 {
                    let value = if i % 2 == 0 { 0.0 } else { 1.0 };
                    params.set(ParamId::FilterAmount, value);
                }
            })
        };

        for _ in 0..10_000 {
            let value = params.snapshot().filter_amount;
            let known = [0.0, 1.0, FILTER_AMOUNT.constrain(0.5)];
            assert!(known.contains(&value), "torn read: {value}");
        }

        writer.join().expect("writer thread panicked");
    }
}
