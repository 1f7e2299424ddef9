//! Benchmarks for low-level DSP primitives.

mod envelope;
mod karplus;

pub use envelope::bench_envelope;
pub use karplus::bench_karplus;
