// Purpose - where synthesized voices go: a sound card or a render buffer

pub mod device;
pub mod offline;

pub use device::{
    AudioOutput, CpalOpener, OutputOptions, OutputState, OutputStream, StreamInfo, StreamOpener,
};
pub use offline::OfflineOutput;

use crate::synth::PlaybackVoice;

/// Destination for finished voices.
///
/// Submission is fire-and-forget: no handle comes back and nothing reports
/// whether the note was heard.
pub trait NoteSink {
    /// Get ready to play (opening or resuming as needed) and report the
    /// sample rate notes must be rendered at. `None` means nothing can play
    /// right now and the note should be skipped.
    fn activate(&mut self) -> Option<f32>;

    /// Hand a voice over for playback. Must not block.
    fn submit(&mut self, voice: PlaybackVoice);
}
