//! Low-level DSP primitives used by the voices.
//!
//! These components are allocation-free and realtime-safe, making them safe to
//! embed directly inside voice structs. They stay focused on the
//! signal-processing math; note lifecycle and parameter handling live in
//! [`crate::synth`].

/// Decibel conversion and additive channel mixing.
pub mod amplify;
/// Second-order low-pass used as the per-voice smoothing filter.
pub mod filter;
/// Feedback-FM saw and the two-edge pulse built from it.
pub mod oscillator;

pub use filter::SmoothingFilter;
pub use oscillator::{PulseOscillator, SawOscillator};
