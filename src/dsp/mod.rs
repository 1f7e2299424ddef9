//! Low-level DSP for plucked strings.
//!
//! Pure signal math with no knowledge of devices or threads: the
//! Karplus-Strong string model, the playback gain contour, stereo placement,
//! and a few measurement helpers for checking rendered audio.

/// Level and pitch measurements on rendered buffers.
pub mod analysis;
/// Click-free attack/fade gain contour.
pub mod envelope;
/// Karplus-Strong string synthesis.
pub mod karplus;
/// Fixed per-string stereo placement.
pub mod pan;

pub use envelope::PluckEnvelope;
pub use karplus::NoteBuffer;
pub use pan::StereoGains;
