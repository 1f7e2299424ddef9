use crate::MIN_TIME;

/*
Pluck Gain Envelope
===================

The string buffer already decays on its own (see `karplus`). This envelope
is a second, independent gain contour applied on PLAYBACK. Its job is not
to shape the tone but to kill two clicks:

  onset   The noise burst starts at full amplitude on sample 0. Jumping
          from silence straight into it is an audible click.

  offset  The buffer is finite. If the string is still ringing when the
          buffer runs out, the sudden stop is another click.


The Shape
---------

  gain
   peak ┐  ╱╲
        │ ╱  ╲
        │╱    ╲__
        │        ╲___
        │            ╲______
  floor └────────────────────╲▁▁▁▁▁▁▁→ time
        0  attack          fade_end   end

  0 .. attack         linear ramp 0 → peak           (10 ms)
  attack .. fade_end  exponential ramp peak → floor
  fade_end .. end     hold at floor                   (last 100 ms)

Why exponential for the fade? Loudness is perceived logarithmically, so an
exponential curve sounds like a steady fade. A linear fade would sound like
it hangs around and then drops off a cliff at the end.


The Math
--------

Linear segment (t in seconds):

    gain(t) = peak * t / attack

Exponential segment, with u = (t - attack) / (fade_end - attack) in [0, 1]:

    gain(t) = peak * (floor / peak) ^ u

At u = 0 this is peak, at u = 1 it is floor, and in between the gain drops
by the same ratio every millisecond. These are the same curves a browser's
`linearRampToValueAtTime` / `exponentialRampToValueAtTime` produce, so a
note sounds the same here as in a web player.

With the defaults (peak 0.4, floor 0.001) the fade covers 52 dB.
*/

/// Click-free gain contour for one plucked note.
#[derive(Debug, Clone)]
pub struct PluckEnvelope {
    sample_rate: f64,
    peak: f64,
    attack: f64,
    fade_end: f64,
    floor: f64,
    elapsed_samples: u64,
}

impl PluckEnvelope {
    /// * `peak` - gain reached at the end of the attack (master level)
    /// * `attack` - seconds to ramp from silence to `peak`
    /// * `fade_end` - time in seconds at which the fade reaches `floor`
    /// * `floor` - residual gain held after the fade (must be > 0 for the
    ///   exponential curve; clamped to a tiny positive value otherwise)
    pub fn new(sample_rate: f32, peak: f32, attack: f64, fade_end: f64, floor: f32) -> Self {
        Self {
            sample_rate: f64::from(sample_rate),
            peak: f64::from(peak.max(0.0)),
            attack: attack.max(MIN_TIME),
            fade_end,
            floor: f64::from(floor).max(f64::MIN_POSITIVE),
            elapsed_samples: 0,
        }
    }

    /// Gain at `t` seconds after the note starts.
    pub fn gain_at(&self, t: f64) -> f32 {
        if t <= 0.0 || self.peak <= 0.0 {
            return 0.0;
        }

        if t < self.attack {
            return (self.peak * t / self.attack) as f32;
        }

        let span = self.fade_end - self.attack;
        if span <= 0.0 || t >= self.fade_end {
            return self.floor as f32;
        }

        let u = (t - self.attack) / span;
        (self.peak * (self.floor / self.peak).powf(u)) as f32
    }

    /// Gain for the next sample, then advance by one sample.
    #[inline]
    pub fn next_gain(&mut self) -> f32 {
        let t = self.elapsed_samples as f64 / self.sample_rate;
        self.elapsed_samples += 1;
        self.gain_at(t)
    }

    /// Render a block of gain values into the buffer.
    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_gain();
        }
    }

    /// Seconds of playback elapsed so far.
    pub fn elapsed(&self) -> f64 {
        self.elapsed_samples as f64 / self.sample_rate
    }

    pub fn reset(&mut self) {
        self.elapsed_samples = 0;
    }

    pub fn peak(&self) -> f32 {
        self.peak as f32
    }
}
