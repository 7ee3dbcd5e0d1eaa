// Purpose: voice pool, allocation and the control surface around it.
// Voices own the DSP; the engine decides which voice plays what.

pub mod message;
pub mod params;
pub mod poly;
pub mod sound;
pub mod voice;
