pub mod dsp;
pub mod io;
#[cfg(feature = "serde")]
pub mod patch; // Persisted parameter state
pub mod synth; // Voice management and polyphony

pub use synth::params::{ParamId, ParamSnapshot, SharedParams};
pub use synth::poly::{EngineConfig, PolySynth};

pub const MAX_BLOCK_SIZE: usize = 2048;
/// Size of the fixed voice pool.
pub const NUM_VOICES: usize = 8;
