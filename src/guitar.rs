//! The instrument as the input layer sees it.
//!
//! A `Guitar` owns its tuning, its synthesizer, and the output it plays on.
//! Input handlers call [`Guitar::trigger_note`] and forget about it: the
//! output is opened or resumed on demand, the note is synthesized on the
//! spot, and the voice is handed off. Nothing comes back.

use tracing::{debug, trace, warn};

use crate::{
    fretboard::{ChordShape, NoteRequest, Tuning},
    io::NoteSink,
    synth::{StringSynthesizer, SynthParams},
};

pub struct Guitar<S> {
    tuning: Tuning,
    synth: StringSynthesizer,
    output: S,
}

impl<S: NoteSink> Guitar<S> {
    pub fn new(tuning: Tuning, synth: StringSynthesizer, output: S) -> Self {
        Self {
            tuning,
            synth,
            output,
        }
    }

    /// Standard tuning, default synth parameters.
    pub fn standard(output: S) -> Self {
        Self::new(
            Tuning::standard(),
            StringSynthesizer::new(SynthParams::default()),
            output,
        )
    }

    /// Pluck `string` (0 = low E) held at `fret` (0 = open).
    ///
    /// Muted strings must be filtered out by the caller. An out-of-range
    /// string is logged and ignored; an unavailable output makes this a no-op.
    pub fn trigger_note(&mut self, string: usize, fret: u32) {
        let Some(frequency) = self.tuning.frequency(string, fret) else {
            warn!(string, fret, "no such string, ignoring note");
            return;
        };

        let Some(sample_rate) = self.output.activate() else {
            trace!(string, fret, "output unavailable, note skipped");
            return;
        };

        let voice = self.synth.voice(frequency, string, sample_rate);
        debug!(string, fret, frequency, sample_rate, "note triggered");
        self.output.submit(voice);
    }

    pub fn play(&mut self, note: NoteRequest) {
        self.trigger_note(note.string, note.fret);
    }

    /// Pluck every unmuted string of a chord shape at once, low to high.
    pub fn play_chord(&mut self, chord: &ChordShape) {
        for note in chord.notes() {
            self.play(note);
        }
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn output(&self) -> &S {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut S {
        &mut self.output
    }

    pub fn into_output(self) -> S {
        self.output
    }
}
