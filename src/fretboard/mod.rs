//! The guitar's neck: string tunings, fret-to-pitch resolution, chord shapes.
//!
//! Everything here is plain data and pure arithmetic. Nothing in this module
//! touches audio buffers; it only answers "what frequency does this string
//! sound at this fret?" and "which strings does this chord play?".

/// Chord shapes as fret arrays with a muted sentinel.
pub mod chord;
/// Six-string tunings and the equal-temperament pitch resolver.
pub mod tuning;

pub use chord::{ChordShape, NoteRequest, MUTED};
pub use tuning::{StringTuning, Tuning, TuningError, BASE_FREQ, STRING_COUNT};
