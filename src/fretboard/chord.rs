#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::tuning::STRING_COUNT;

/// Fret value marking a string that is not played in a chord shape.
pub const MUTED: i8 = -1;

/// A single note to pluck: which string, held at which fret.
///
/// Muted strings never become a `NoteRequest`; the sentinel lives only in
/// [`ChordShape`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteRequest {
    pub string: usize,
    pub fret: u32,
}

impl NoteRequest {
    pub fn new(string: usize, fret: u32) -> Self {
        Self { string, fret }
    }
}

/// A chord as one fret per string, low to high. Negative frets are muted.
///
/// Shapes are data: they come from configuration, not from this crate.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChordShape {
    pub name: String,
    pub frets: [i8; STRING_COUNT],
}

impl ChordShape {
    pub fn new(name: impl Into<String>, frets: [i8; STRING_COUNT]) -> Self {
        Self {
            name: name.into(),
            frets,
        }
    }

    /// Fret held on `string`, or `None` if the string is muted or out of range.
    pub fn fret(&self, string: usize) -> Option<u32> {
        self.frets
            .get(string)
            .and_then(|&fret| u32::try_from(fret).ok())
    }

    pub fn is_muted(&self, string: usize) -> bool {
        self.fret(string).is_none()
    }

    /// Playable notes of the shape, low string first. Muted strings are skipped.
    pub fn notes(&self) -> impl Iterator<Item = NoteRequest> + '_ {
        (0..STRING_COUNT).filter_map(|string| self.fret(string).map(|fret| NoteRequest::new(string, fret)))
    }
}
