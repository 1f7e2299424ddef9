//! Render notes to memory (and WAV) instead of a sound card.
//!
//! Uses the same mixer as the realtime output, just driven by the caller
//! instead of an audio callback. Time only moves when you call
//! [`OfflineOutput::advance`] or [`OfflineOutput::finish`], so notes submitted
//! between two advances all start on the same frame. Nothing races the mixer
//! here, so voices go straight in: there is no queue to overflow and no note
//! is ever dropped.

use std::path::Path;

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use tracing::info;

use crate::{
    io::{device::OutputOptions, NoteSink},
    synth::{voice_mixer, PlaybackVoice, VoiceMixer, VoiceSender},
    MAX_BLOCK_SIZE,
};

pub struct OfflineOutput {
    sample_rate: f32,
    /// Only used to free spent voices
    sender: VoiceSender,
    mixer: VoiceMixer,
    /// Interleaved stereo
    rendered: Vec<f32>,
}

impl OfflineOutput {
    pub fn new(sample_rate: f32, options: &OutputOptions) -> Self {
        let (sender, mixer) = voice_mixer(options.queue_capacity, options.max_voices);
        Self {
            sample_rate,
            sender,
            mixer,
            rendered: Vec::new(),
        }
    }

    /// Render `seconds` of audio past the current end.
    pub fn advance(&mut self, seconds: f64) {
        let frames = (seconds * f64::from(self.sample_rate)).round().max(0.0) as usize;
        self.advance_frames(frames);
    }

    pub fn advance_frames(&mut self, frames: usize) {
        let start = self.rendered.len();
        self.rendered.resize(start + frames * 2, 0.0);

        for block in self.rendered[start..].chunks_mut(MAX_BLOCK_SIZE * 2) {
            self.mixer.render_stereo(block);
            self.sender.reclaim();
        }
    }

    /// Render until every submitted voice has played out.
    pub fn finish(&mut self) {
        let frames = self.mixer.longest_remaining();
        self.advance_frames(frames);
    }

    /// Interleaved stereo samples rendered so far.
    pub fn samples(&self) -> &[f32] {
        &self.rendered
    }

    /// One channel (0 = left, 1 = right) of the render.
    pub fn channel(&self, channel: usize) -> Vec<f32> {
        self.rendered
            .chunks_exact(2)
            .map(|frame| frame[channel.min(1)])
            .collect()
    }

    pub fn frames(&self) -> usize {
        self.rendered.len() / 2
    }

    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / f64::from(self.sample_rate)
    }

    pub fn active_voices(&self) -> usize {
        self.mixer.active_voices()
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Write the render as a 32-bit float stereo WAV.
    pub fn write_wav(&self, path: impl AsRef<Path>) -> EyreResult<()> {
        let path = path.as_ref();
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: self.sample_rate.round() as u32,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };

        let mut writer = hound::WavWriter::create(path, spec)
            .wrap_err_with(|| format!("failed to create {}", path.display()))?;
        for &sample in &self.rendered {
            writer.write_sample(sample)?;
        }
        writer
            .finalize()
            .wrap_err_with(|| format!("failed to finalize {}", path.display()))?;

        info!(
            path = %path.display(),
            frames = self.frames(),
            seconds = self.duration_secs(),
            "wrote render"
        );
        Ok(())
    }
}

impl NoteSink for OfflineOutput {
    fn activate(&mut self) -> Option<f32> {
        Some(self.sample_rate)
    }

    fn submit(&mut self, voice: PlaybackVoice) {
        self.mixer.admit(voice);
    }
}
