//! Offline rendering - the same guitar, written to a WAV file instead of a device

use std::path::Path;

use color_eyre::eyre::{bail, eyre, Result as EyreResult};
use strum_dsp::{
    dsp::analysis::{detect_pitch, peak, rms},
    io::OfflineOutput,
    synth::StringSynthesizer,
    Guitar,
};

use crate::config::StrumConfig;

/// Lowest and highest pitch the summary looks for
const PITCH_RANGE: (f64, f64) = (60.0, 1_500.0);

pub struct RenderOptions<'a> {
    pub out: &'a Path,
    pub sample_rate: u32,
    pub seed: Option<u64>,
}

fn guitar(config: &StrumConfig, options: &RenderOptions) -> EyreResult<Guitar<OfflineOutput>> {
    let tuning = config.tuning()?;
    let synth = match options.seed {
        Some(seed) => StringSynthesizer::with_seed(config.synth.clone(), seed),
        None => StringSynthesizer::new(config.synth.clone()),
    };
    let output = OfflineOutput::new(options.sample_rate as f32, &config.output);
    Ok(Guitar::new(tuning, synth, output))
}

/// Pluck one string and write the result.
pub fn note(config: &StrumConfig, string: usize, fret: u32, options: &RenderOptions) -> EyreResult<()> {
    let mut guitar = guitar(config, options)?;
    let Some(expected) = guitar.tuning().frequency(string, fret) else {
        bail!("string must be 0..={}, got {}", guitar.tuning().len() - 1, string);
    };

    guitar.trigger_note(string, fret);
    let mut output = guitar.into_output();
    output.finish();
    output.write_wav(options.out)?;

    println!("=== strum render ===");
    println!("String {} fret {} ({:.2} Hz)", string, fret, expected);
    summarize(&output);
    Ok(())
}

/// Strum a configured chord low to high, `gap_ms` apart, and write the result.
pub fn chord(config: &StrumConfig, name: &str, gap_ms: u64, options: &RenderOptions) -> EyreResult<()> {
    let shape = config.chord(name).cloned().ok_or_else(|| {
        let known: Vec<&str> = config.chords.iter().map(|c| c.name.as_str()).collect();
        eyre!("unknown chord {:?} (configured: {})", name, known.join(", "))
    })?;

    let mut guitar = guitar(config, options)?;
    let gap = gap_ms as f64 / 1000.0;
    for note in shape.notes() {
        guitar.play(note);
        guitar.output_mut().advance(gap);
    }

    let mut output = guitar.into_output();
    output.finish();
    output.write_wav(options.out)?;

    println!("=== strum render ===");
    println!("Chord {} {:?}", shape.name, shape.frets);
    summarize(&output);
    Ok(())
}

fn summarize(output: &OfflineOutput) {
    let left = output.channel(0);
    let right = output.channel(1);
    let sample_rate = output.sample_rate();

    println!("Sample rate: {} Hz", sample_rate);
    println!("Duration: {:.3} s ({} frames)", output.duration_secs(), output.frames());
    println!("Peak: L {:.3}  R {:.3}", peak(&left), peak(&right));
    println!("RMS:  L {:.3}  R {:.3}", rms(&left), rms(&right));

    let mono: Vec<f32> = left.iter().zip(&right).map(|(l, r)| 0.5 * (l + r)).collect();
    match detect_pitch(&mono, sample_rate, PITCH_RANGE.0, PITCH_RANGE.1) {
        Some(freq) => println!("Detected pitch: {:.2} Hz", freq),
        None => println!("Detected pitch: none"),
    }
}
