use rand::{rngs::StdRng, SeedableRng};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::{
    envelope::PluckEnvelope,
    karplus::NoteBuffer,
    pan::StereoGains,
};
use crate::synth::voice::PlaybackVoice;

/// Per-note shaping parameters.
///
/// Defaults: 3 s notes, master gain 0.4, 10 ms attack, fade reaching 0.001
/// 100 ms before the buffer ends.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct SynthParams {
    /// Length of every note buffer in seconds
    pub duration: f64,
    /// Gain reached at the end of the attack
    pub master_gain: f32,
    /// Attack ramp in seconds
    pub attack: f64,
    /// How long before the buffer end the fade bottoms out, in seconds
    pub tail: f64,
    /// Gain the fade settles at
    pub floor: f32,
}

impl Default for SynthParams {
    fn default() -> Self {
        Self {
            duration: 3.0,
            master_gain: 0.4,
            attack: 0.01,
            tail: 0.1,
            floor: 0.001,
        }
    }
}

/// Turns (frequency, string) into ready-to-play voices.
///
/// The only state is the noise generator. Seed it for reproducible renders.
pub struct StringSynthesizer {
    params: SynthParams,
    rng: StdRng,
}

impl StringSynthesizer {
    pub fn new(params: SynthParams) -> Self {
        Self {
            params,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(params: SynthParams, seed: u64) -> Self {
        Self {
            params,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn params(&self) -> &SynthParams {
        &self.params
    }

    /// Render the raw string buffer (no envelope, no pan).
    pub fn synthesize(&mut self, frequency: f64, string: usize, sample_rate: f32) -> NoteBuffer {
        NoteBuffer::pluck(frequency, string, sample_rate, self.params.duration, &mut self.rng)
    }

    /// Gain contour for a note at `sample_rate`.
    pub fn envelope(&self, sample_rate: f32) -> PluckEnvelope {
        PluckEnvelope::new(
            sample_rate,
            self.params.master_gain,
            self.params.attack,
            self.params.duration - self.params.tail,
            self.params.floor,
        )
    }

    /// Synthesize a note and wrap it with its envelope and stereo position.
    pub fn voice(&mut self, frequency: f64, string: usize, sample_rate: f32) -> PlaybackVoice {
        let buffer = self.synthesize(frequency, string, sample_rate);
        let envelope = self.envelope(sample_rate);
        PlaybackVoice::new(buffer, envelope, StereoGains::for_string(string), string)
    }
}

impl Default for StringSynthesizer {
    fn default() -> Self {
        Self::new(SynthParams::default())
    }
}
