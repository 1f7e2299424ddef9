// Purpose: per-note synthesis and the voices it produces
// This layer sits above the dsp primitives and below the outputs

pub mod mixer;
pub mod string;
pub mod voice;

pub use mixer::{voice_mixer, VoiceMixer, VoiceSender, DEFAULT_QUEUE_CAPACITY, DEFAULT_VOICE_RESERVE};
pub use string::{StringSynthesizer, SynthParams};
pub use voice::PlaybackVoice;
