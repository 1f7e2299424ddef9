use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use rtrb::{Consumer, Producer, PushError, RingBuffer};

use crate::{synth::voice::PlaybackVoice, MAX_BLOCK_SIZE};

/// Pending voices a queue holds by default before submissions are dropped.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Voices the mixer makes room for up front when polyphony is uncapped.
pub const DEFAULT_VOICE_RESERVE: usize = 128;

/// Create both ends of a mixer: the control-side sender and the realtime mixer.
///
/// Voices travel to the mixer on one queue and come back on another once
/// they finish or are stolen, so their buffers are freed by whoever owns the
/// sender and never on the audio thread.
pub fn voice_mixer(queue_capacity: usize, max_voices: Option<usize>) -> (VoiceSender, VoiceMixer) {
    let queue_capacity = queue_capacity.max(1);
    let max_voices = max_voices.map(|cap| cap.max(1));

    // Room for every voice that can be alive at once, plus a full queue
    let capacity = max_voices.unwrap_or(DEFAULT_VOICE_RESERVE) + queue_capacity;

    let (tx, rx) = RingBuffer::<PlaybackVoice>::new(queue_capacity);
    let (retired_tx, retired_rx) = RingBuffer::<PlaybackVoice>::new(capacity);

    let sender = VoiceSender {
        tx,
        retired: retired_rx,
    };
    let mixer = VoiceMixer {
        voices: Vec::with_capacity(capacity),
        rx,
        retired: retired_tx,
        max_voices,
        stereo_buffer: vec![0.0; MAX_BLOCK_SIZE * 2],
        frame_counter: 0,
        active: Arc::new(AtomicUsize::new(0)),
    };

    (sender, mixer)
}

/// Control side of a mixer: submits new voices and frees spent ones.
pub struct VoiceSender {
    tx: Producer<PlaybackVoice>,
    retired: Consumer<PlaybackVoice>,
}

impl VoiceSender {
    /// Queue a voice without blocking. A full queue hands the voice back.
    pub fn send(&mut self, voice: PlaybackVoice) -> Result<(), PlaybackVoice> {
        self.tx.push(voice).map_err(|PushError::Full(voice)| voice)
    }

    /// Drop every voice the mixer has finished with. Returns how many.
    pub fn reclaim(&mut self) -> usize {
        let mut count = 0;
        while self.retired.pop().is_ok() {
            count += 1;
        }
        count
    }
}

/// Realtime side of an output: sums every live voice into the output block.
///
/// Runs on the audio thread and never allocates or frees there. New voices
/// arrive through the queue; spent ones leave through the return queue.
/// Polyphony is unbounded unless a cap is set, in which case the oldest voice
/// is stolen to make room.
pub struct VoiceMixer {
    voices: Vec<PlaybackVoice>,
    rx: Consumer<PlaybackVoice>,
    retired: Producer<PlaybackVoice>,
    max_voices: Option<usize>,
    stereo_buffer: Vec<f32>,
    frame_counter: u64,
    active: Arc<AtomicUsize>,
}

impl VoiceMixer {
    /// Shared count of sounding voices, readable from other threads.
    pub fn active_counter(&self) -> Arc<AtomicUsize> {
        self.active.clone()
    }

    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| !v.is_finished()).count()
    }

    /// Render interleaved stereo frames into `out`, overwriting it.
    pub fn render_stereo(&mut self, out: &mut [f32]) {
        self.admit_pending();

        out.fill(0.0);
        for voice in &mut self.voices {
            voice.render_add(out);
        }

        self.retire_finished();
        self.active.store(self.active_voices(), Ordering::Relaxed);
        self.frame_counter += (out.len() / 2) as u64;
    }

    /// Render interleaved frames for a device with `channels` channels.
    ///
    /// Mono devices get the average of left and right; devices with more than
    /// two channels get left/right on the first two and silence elsewhere.
    pub fn render(&mut self, out: &mut [f32], channels: usize) {
        if channels == 0 {
            return;
        }
        if channels == 2 {
            self.render_stereo(out);
            return;
        }

        let total_frames = out.len() / channels;
        let mut frames_written = 0;

        while frames_written < total_frames {
            let frames = (total_frames - frames_written).min(MAX_BLOCK_SIZE);

            // Temporarily take the scratch buffer so render_stereo can borrow self
            let mut block = std::mem::take(&mut self.stereo_buffer);
            self.render_stereo(&mut block[..frames * 2]);

            let dest = &mut out[frames_written * channels..(frames_written + frames) * channels];
            for (frame, lr) in dest.chunks_exact_mut(channels).zip(block.chunks_exact(2)) {
                if channels == 1 {
                    frame[0] = 0.5 * (lr[0] + lr[1]);
                } else {
                    frame[0] = lr[0];
                    frame[1] = lr[1];
                    frame[2..].fill(0.0);
                }
            }

            self.stereo_buffer = block;
            frames_written += frames;
        }
    }

    /// Frames until the longest-running voice finishes.
    pub fn longest_remaining(&self) -> usize {
        self.voices
            .iter()
            .map(|v| v.remaining_frames())
            .max()
            .unwrap_or(0)
    }

    /// Move newly submitted voices from the queue into the mix.
    fn admit_pending(&mut self) {
        while let Ok(voice) = self.rx.pop() {
            self.admit(voice);
        }
    }

    /// Add a voice to the mix directly, bypassing the queue.
    pub(crate) fn admit(&mut self, mut voice: PlaybackVoice) {
        if let Some(cap) = self.max_voices {
            if self.voices.len() >= cap && self.retired.slots() > 0 {
                // Steal the oldest voice
                let oldest = self
                    .voices
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, v)| v.age())
                    .map(|(idx, _)| idx);
                if let Some(idx) = oldest {
                    let stolen = self.voices.remove(idx);
                    self.retire(stolen);
                }
            }
        }

        voice.set_age(self.frame_counter);
        self.voices.push(voice);
    }

    /// Hand finished voices back to the control side.
    ///
    /// A voice stays put (silent) while the return queue is full and goes
    /// back on a later block.
    fn retire_finished(&mut self) {
        let mut idx = self.voices.len();
        while idx > 0 {
            idx -= 1;
            if self.voices[idx].is_finished() && self.retired.slots() > 0 {
                let voice = self.voices.swap_remove(idx);
                self.retire(voice);
            }
        }
    }

    /// Caller checks for a free slot first.
    fn retire(&mut self, voice: PlaybackVoice) {
        if let Err(PushError::Full(voice)) = self.retired.push(voice) {
            self.voices.push(voice);
        }
    }
}
