//! Benchmarks for mixing overlapping voices on the audio thread.

use std::hint::black_box;

use criterion::{BatchSize, BenchmarkId, Criterion};
use strum_dsp::fretboard::Tuning;
use strum_dsp::synth::{voice_mixer, PlaybackVoice, StringSynthesizer, SynthParams, VoiceMixer};

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f32 = 48_000.0;

/// `count` voices cycling across the six open strings
fn make_voices(count: usize) -> Vec<PlaybackVoice> {
    let tuning = Tuning::standard();
    let params = SynthParams {
        duration: 0.5,
        ..SynthParams::default()
    };
    let mut synth = StringSynthesizer::with_seed(params, 11);

    (0..count)
        .map(|i| {
            let string = i % tuning.len();
            let freq = tuning.frequency(string, (i / tuning.len()) as u32).unwrap_or(110.0);
            synth.voice(freq, string, SAMPLE_RATE)
        })
        .collect()
}

fn loaded_mixer(voices: &[PlaybackVoice]) -> VoiceMixer {
    let (mut tx, mixer) = voice_mixer(voices.len(), None);
    for voice in voices {
        let _ = tx.send(voice.clone());
    }
    mixer
}

pub fn bench_mix(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/mix");

    // One note, one strummed chord, four chords piled up
    for &count in &[1usize, 6, 24] {
        let voices = make_voices(count);

        for &size in BLOCK_SIZES {
            let mut stereo = vec![0.0f32; size * 2];
            let id = format!("{}_voices", count);

            // Fresh voices per batch so the mixer never runs dry
            group.bench_with_input(BenchmarkId::new(id.as_str(), size), &size, |b, _| {
                b.iter_batched(
                    || loaded_mixer(&voices),
                    |mut mixer| {
                        mixer.render_stereo(black_box(&mut stereo));
                        mixer
                    },
                    BatchSize::LargeInput,
                )
            });
        }

        // Mono device path through the downmix
        let mut mono = vec![0.0f32; 256];
        group.bench_with_input(
            BenchmarkId::new(format!("{}_voices_mono", count), 256),
            &256,
            |b, _| {
                b.iter_batched(
                    || loaded_mixer(&voices),
                    |mut mixer| {
                        mixer.render(black_box(&mut mono), 1);
                        mixer
                    },
                    BatchSize::LargeInput,
                )
            },
        );
    }

    group.finish();
}
