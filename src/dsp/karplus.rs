//! Karplus-Strong plucked-string synthesis.

use rand::Rng;
use tracing::debug;

/*
Karplus-Strong
==============

A plucked string is a delay line that feeds back into itself through a
gentle lowpass filter. Karplus and Strong noticed that if you fill a short
buffer with noise and keep recirculating it while averaging neighbouring
samples, you get something that sounds remarkably like a guitar string.

Vocabulary
----------

  period (P)    Length of the delay line in samples. One trip around the
                loop takes P samples, so the loop "rings" at
                sample_rate / P Hz - that is the pitch we hear.

  excitation    The initial contents of the delay line. Random noise in
                [-1, 1] contains every frequency at once, like the chaotic
                first instant of a pick striking the string.

  damping       A gain slightly below 1.0 applied on every trip around the
                loop. Sets how fast the note dies away.


The Loop
--------

    buffer[0..P)  = noise                                  (the pluck)
    buffer[i]     = 0.5 * (buffer[i-P] + previous) * damping
    previous      = buffer[i-P]          <- the OLD value, read before writing

    ┌──────────────── P samples ────────────────┐
    │                                           │
    └──→ [ average with previous ] → [ × damping ] ──→ out

The two-point average is a one-pole-ish lowpass: high harmonics lose more
energy per trip than low ones. So the note does two things at once:

  - gets quieter (damping, plus the filter's loss)
  - gets darker (upper harmonics die first)

which is exactly the signature of a real plucked string.

Order matters: `previous` must hold buffer[i-P] as it was BEFORE this
iteration. Swapping the update order changes the filter's impulse response
and the timbre with it.


Pitch Quantization
------------------

P is an integer: floor(sample_rate / frequency). The loop can only ring at
sample_rate / P, so pitch snaps to the nearest achievable value below the
target. At 48 kHz an open low E (82.41 Hz) gets P = 582 → 82.47 Hz, a
barely audible 1.3 cents sharp. High frets on the high string drift further
(P shrinks, so each step of P is a bigger jump). There is no fractional
delay interpolation here; that is intentional.

At absurd frequencies P would collapse to zero. We clamp P to at least one
sample, and to at most the buffer length.


Per-string Damping
------------------

    damping = 0.990 + string_index * 0.002

    string 0 (low E)   0.990   darker, shorter
    string 5 (high e)  1.000   only the averaging filter removes energy

This is a fixed linear schedule, not a physical model of string mass. The
coefficients are kept exactly so renders stay comparable.
*/

/// Damping applied on the lowest string.
pub const DAMPING_BASE: f64 = 0.990;
/// Damping added per string index, low to high.
pub const DAMPING_STEP: f64 = 0.002;

/// Loop damping for a string: `0.990 + string_index * 0.002`.
#[inline]
pub fn string_damping(string_index: usize) -> f64 {
    DAMPING_BASE + string_index as f64 * DAMPING_STEP
}

/// Delay-line length in samples, `max(1, floor(sample_rate / frequency))`.
#[inline]
pub fn period(sample_rate: f32, frequency: f64) -> usize {
    let raw = (f64::from(sample_rate) / frequency).floor();
    // Also catches NaN from a zero/zero division.
    if raw >= 1.0 {
        raw as usize
    } else {
        1
    }
}

/// Number of samples in a note of `duration` seconds.
#[inline]
pub fn buffer_len(sample_rate: f32, duration: f64) -> usize {
    (f64::from(sample_rate) * duration).round().max(0.0) as usize
}

/// Fill `buffer` with uniform white noise in [-1, 1).
pub fn excite<R: Rng + ?Sized>(buffer: &mut [f32], rng: &mut R) {
    for sample in buffer.iter_mut() {
        *sample = (rng.gen::<f64>() * 2.0 - 1.0) as f32;
    }
}

/// Run the feedback loop over `buffer[period..]`.
///
/// `buffer[..period]` must already hold the excitation.
pub fn resonate(buffer: &mut [f32], period: usize, damping: f64) {
    debug_assert!(period >= 1);

    let mut previous = 0.0f64;
    for i in period..buffer.len() {
        let delayed = f64::from(buffer[i - period]);
        buffer[i] = (0.5 * (delayed + previous) * damping) as f32;
        previous = delayed;
    }
}

/// One plucked note, rendered in full.
///
/// Generated fresh for every trigger and owned by whoever plays it.
#[derive(Debug, Clone)]
pub struct NoteBuffer {
    samples: Vec<f32>,
    sample_rate: f32,
    period: usize,
}

impl NoteBuffer {
    /// Synthesize a plucked string at `frequency` Hz.
    ///
    /// `string_index` selects the damping. The noise comes from `rng`, so a
    /// seeded generator gives a reproducible note.
    pub fn pluck<R: Rng + ?Sized>(
        frequency: f64,
        string_index: usize,
        sample_rate: f32,
        duration: f64,
        rng: &mut R,
    ) -> Self {
        let len = buffer_len(sample_rate, duration);
        let mut samples = vec![0.0f32; len];

        let mut p = period(sample_rate, frequency);
        if p > len {
            p = len.max(1);
        }
        if p == 1 {
            debug!(frequency, sample_rate, "delay line clamped to a single sample");
        }

        let excitation = p.min(len);
        excite(&mut samples[..excitation], rng);
        resonate(&mut samples, p, string_damping(string_index));

        Self {
            samples,
            sample_rate,
            period: p,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Delay-line length used for this note.
    pub fn period(&self) -> usize {
        self.period
    }

    /// Pitch the loop actually rings at, after period quantization.
    pub fn effective_frequency(&self) -> f64 {
        f64::from(self.sample_rate) / self.period as f64
    }
}
