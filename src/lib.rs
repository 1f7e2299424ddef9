pub mod dsp; // Karplus-Strong core, envelope, panning, analysis
pub mod fretboard; // Tunings, pitch resolution, chord shapes
pub mod guitar; // Application root: tuning + synthesizer + output
pub mod io; // Output sinks: realtime device and offline renderer
pub mod synth; // Voices, mixing, per-note synthesis

pub use guitar::Guitar;

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f64 = 1.0 / 48_000.0;
