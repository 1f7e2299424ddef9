//! Real-world scenario benchmarks.
//!
//! Strums stack up to six voices per chord, and fast playing piles chords on
//! top of chords still ringing.

mod mix;

pub use mix::bench_mix;
