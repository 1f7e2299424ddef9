use crate::dsp::{envelope::PluckEnvelope, karplus::NoteBuffer, pan::StereoGains};

/// One sounding note: its own buffer, gain contour, and stereo position.
///
/// Voices are built on the caller's thread, handed to an output, and from
/// then on belong to the mixer until they run out of samples. Nothing else
/// holds a reference; there is no way to stop one early.
#[derive(Debug, Clone)]
pub struct PlaybackVoice {
    samples: Vec<f32>,
    sample_rate: f32,
    envelope: PluckEnvelope,
    gains: StereoGains,
    string: usize,
    position: usize,
    age: u64,
}

impl PlaybackVoice {
    pub fn new(buffer: NoteBuffer, envelope: PluckEnvelope, gains: StereoGains, string: usize) -> Self {
        let sample_rate = buffer.sample_rate();
        Self {
            samples: buffer.into_samples(),
            sample_rate,
            envelope,
            gains,
            string,
            position: 0,
            age: 0,
        }
    }

    /// Mix the next frames into `out` (interleaved stereo, added in place).
    ///
    /// Returns the number of frames actually written; fewer than requested
    /// means the voice ran out.
    pub fn render_add(&mut self, out: &mut [f32]) -> usize {
        let remaining = self.samples.len() - self.position;
        let frames = (out.len() / 2).min(remaining);

        let source = &self.samples[self.position..self.position + frames];
        for (frame, &sample) in out.chunks_exact_mut(2).zip(source) {
            let shaped = sample * self.envelope.next_gain();
            frame[0] += shaped * self.gains.left;
            frame[1] += shaped * self.gains.right;
        }

        self.position += frames;
        frames
    }

    pub fn is_finished(&self) -> bool {
        self.position >= self.samples.len()
    }

    pub fn remaining_frames(&self) -> usize {
        self.samples.len() - self.position
    }

    /// Seconds of audio this voice still has to play.
    pub fn remaining_secs(&self) -> f64 {
        self.remaining_frames() as f64 / f64::from(self.sample_rate)
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn string(&self) -> usize {
        self.string
    }

    pub fn gains(&self) -> StereoGains {
        self.gains
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    pub(crate) fn set_age(&mut self, age: u64) {
        self.age = age;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn voice(string: usize) -> PlaybackVoice {
        let mut rng = StdRng::seed_from_u64(5);
        let buffer = NoteBuffer::pluck(220.0, string, 1_000.0, 1.0, &mut rng);
        let envelope = PluckEnvelope::new(1_000.0, 0.4, 0.01, 0.9, 0.001);
        PlaybackVoice::new(buffer, envelope, StereoGains::for_string(string), string)
    }

    #[test]
    fn first_frame_is_silent() {
        let mut v = voice(2);
        let mut out = [0.0f32; 2];
        v.render_add(&mut out);
        assert_eq!(out, [0.0, 0.0]);
    }

    #[test]
    fn plays_to_the_end_then_stops() {
        let mut v = voice(0);
        let mut out = vec![0.0f32; 2 * 600];

        assert_eq!(v.render_add(&mut out), 600);
        assert!(!v.is_finished());

        out.fill(0.0);
        assert_eq!(v.render_add(&mut out), 400);
        assert!(v.is_finished());
        assert!(out[800..].iter().all(|&s| s == 0.0), "nothing past the end");
    }

    #[test]
    fn adds_rather_than_overwrites() {
        let mut a = voice(1);
        let mut b = a.clone();

        let mut once = vec![0.0f32; 200];
        a.render_add(&mut once);

        let mut twice = vec![0.0f32; 200];
        b.render_add(&mut twice);
        let mut b2 = voice(1);
        b2.render_add(&mut twice);

        for (x, y) in once.iter().zip(&twice) {
            assert!((2.0 * x - y).abs() < 1e-6);
        }
    }

    #[test]
    fn low_string_is_louder_on_the_left() {
        let mut v = voice(0);
        let mut out = vec![0.0f32; 2 * 500];
        v.render_add(&mut out);

        let left: f32 = out.iter().step_by(2).map(|s| s.abs()).sum();
        let right: f32 = out.iter().skip(1).step_by(2).map(|s| s.abs()).sum();
        assert!(left > right);
    }
}
