//! Measurements on rendered audio: level and pitch.
//!
//! Not used on the realtime path. The renderer reports these after a bounce,
//! and tests use them to check that notes decay and sound at the right pitch.

use rustfft::{num_complex::Complex, FftPlanner};

/// Root-mean-square level of a buffer. Empty buffers are silent.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = samples.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
    (sum / samples.len() as f64).sqrt() as f32
}

/// RMS over `length` seconds starting at `start` seconds.
///
/// The window is clipped to the buffer, so asking past the end measures
/// whatever is left (or silence).
pub fn window_rms(samples: &[f32], sample_rate: f32, start: f64, length: f64) -> f32 {
    let sr = f64::from(sample_rate);
    let begin = ((start * sr).round().max(0.0) as usize).min(samples.len());
    let end = (((start + length) * sr).round().max(0.0) as usize).min(samples.len());
    rms(&samples[begin..end])
}

/// Largest absolute sample value.
pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
}

/*
Pitch Detection by Autocorrelation
==================================

A periodic signal looks like a shifted copy of itself. The autocorrelation

    r[lag] = Σ x[n] · x[n + lag]

is large when `lag` is a whole number of periods. So the pitch is
sample_rate / (lag of the biggest peak), searched only over lags that map
to plausible frequencies.

Why not just take the biggest FFT bin? A freshly plucked string has many
harmonics of nearly equal strength (it started as white noise), and which
one happens to be loudest is down to chance. Every harmonic lines up again
after one full period though, so the autocorrelation peak is stable.

Computing r directly is O(n²). Instead we use the Wiener-Khinchin trick:
the autocorrelation is the inverse FFT of the power spectrum.

    X = FFT(x, zero-padded to ≥ 2n)   (padding avoids circular wrap-around)
    r = IFFT(|X|²)

Parabolic interpolation between the peak and its neighbours refines the lag
to a fraction of a sample.
*/

/// Estimate the fundamental frequency of `samples` in Hz.
///
/// Only periods corresponding to `min_freq..=max_freq` are considered.
/// Returns `None` for silent or too-short input.
pub fn detect_pitch(samples: &[f32], sample_rate: f32, min_freq: f64, max_freq: f64) -> Option<f64> {
    let n = samples.len();
    if n < 4 || min_freq <= 0.0 || max_freq <= min_freq {
        return None;
    }

    let sr = f64::from(sample_rate);
    let min_lag = ((sr / max_freq).floor() as usize).max(1);
    let max_lag = ((sr / min_freq).ceil() as usize).min(n - 2);
    if min_lag >= max_lag {
        return None;
    }

    // Remove DC so a constant offset doesn't masquerade as correlation.
    let mean = samples.iter().map(|&s| f64::from(s)).sum::<f64>() / n as f64;

    let size = (2 * n).next_power_of_two();
    let mut buffer: Vec<Complex<f64>> = samples
        .iter()
        .map(|&s| Complex::new(f64::from(s) - mean, 0.0))
        .chain(std::iter::repeat(Complex::new(0.0, 0.0)))
        .take(size)
        .collect();

    let mut planner = FftPlanner::<f64>::new();
    planner.plan_fft_forward(size).process(&mut buffer);
    for bin in buffer.iter_mut() {
        *bin = Complex::new(bin.norm_sqr(), 0.0);
    }
    planner.plan_fft_inverse(size).process(&mut buffer);

    let energy = buffer[0].re;
    if energy <= f64::EPSILON {
        return None;
    }

    let (best_lag, best) = (min_lag..=max_lag)
        .map(|lag| (lag, buffer[lag].re))
        .fold((min_lag, f64::MIN), |acc, cur| if cur.1 > acc.1 { cur } else { acc });

    if best <= 0.0 {
        return None;
    }

    // Parabolic refinement around the peak
    let a = buffer[best_lag - 1].re;
    let b = best;
    let c = buffer[best_lag + 1].re;
    let denom = a - 2.0 * b + c;
    let offset = if denom.abs() > f64::EPSILON {
        (0.5 * (a - c) / denom).clamp(-0.5, 0.5)
    } else {
        0.0
    };

    Some(sr / (best_lag as f64 + offset))
}
