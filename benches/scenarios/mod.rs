//! Scenario benchmarks: single voices and the whole engine under load.

mod voices;

pub use voices::bench_voices;
