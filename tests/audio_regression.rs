use strum_dsp::{
    dsp::analysis::{detect_pitch, peak, rms, window_rms},
    fretboard::{ChordShape, Tuning},
    io::{OfflineOutput, OutputOptions},
    synth::{StringSynthesizer, SynthParams},
    Guitar,
};

const SAMPLE_RATE: f32 = 48_000.0;

fn offline_guitar(seed: u64) -> Guitar<OfflineOutput> {
    Guitar::new(
        Tuning::standard(),
        StringSynthesizer::with_seed(SynthParams::default(), seed),
        OfflineOutput::new(SAMPLE_RATE, &OutputOptions::default()),
    )
}

fn render_note(string: usize, fret: u32, seed: u64) -> OfflineOutput {
    let mut guitar = offline_guitar(seed);
    guitar.trigger_note(string, fret);
    let mut output = guitar.into_output();
    output.finish();
    output
}

fn semitones(a: f64, b: f64) -> f64 {
    12.0 * (a / b).log2()
}

#[test]
fn single_note_lasts_exactly_the_note_duration() {
    let output = render_note(2, 0, 1);
    assert_eq!(output.frames(), 144_000);
    assert_eq!(output.samples().len(), 2 * 144_000);
}

#[test]
fn single_note_is_audible_and_bounded() {
    let output = render_note(0, 0, 2);
    let samples = output.samples();

    assert!(samples.iter().all(|s| s.is_finite()));
    assert!(peak(samples) <= 0.4 + 1e-6);
    assert!(rms(samples) > 1e-3);
}

#[test]
fn open_a_string_sounds_at_110_hz() {
    let output = render_note(1, 0, 3);
    let left = output.channel(0);

    // Skip the attack, analyse one second of the body
    let body = &left[4_800..52_800];
    let detected = detect_pitch(body, SAMPLE_RATE, 60.0, 1_000.0).expect("pitched output");
    assert!(
        semitones(detected, 110.0).abs() < 1.0,
        "detected {detected} Hz"
    );
}

#[test]
fn fretted_notes_rise_by_semitones() {
    let open = render_note(3, 0, 4).channel(0);
    let fifth = render_note(3, 5, 4).channel(0);

    let f_open = detect_pitch(&open[4_800..52_800], SAMPLE_RATE, 60.0, 1_500.0).expect("open D");
    let f_fifth = detect_pitch(&fifth[4_800..52_800], SAMPLE_RATE, 60.0, 1_500.0).expect("fretted D");

    assert!((semitones(f_fifth, f_open) - 5.0).abs() < 0.5);
}

#[test]
fn notes_decay_to_near_silence() {
    let output = render_note(4, 0, 5);
    let left = output.channel(0);

    let early = window_rms(&left, SAMPLE_RATE, 0.05, 0.2);
    let late = window_rms(&left, SAMPLE_RATE, 2.5, 0.2);
    assert!(late < early * 0.5, "early {early}, late {late}");

    // Last 100 ms sit on the envelope floor
    let tail = &output.samples()[2 * 139_200..];
    assert!(peak(tail) <= 0.0011);
}

#[test]
fn low_strings_lean_left_high_strings_lean_right() {
    let low = render_note(0, 0, 6);
    let high = render_note(5, 0, 6);

    assert!(rms(&low.channel(0)) > rms(&low.channel(1)));
    assert!(rms(&high.channel(1)) > rms(&high.channel(0)));
}

#[test]
fn same_seed_renders_identical_audio() {
    let a = render_note(2, 2, 42);
    let b = render_note(2, 2, 42);
    let c = render_note(2, 2, 43);

    assert_eq!(a.samples(), b.samples());
    assert_ne!(a.samples(), c.samples());
}

#[test]
fn strummed_chord_overlaps_every_string() {
    let mut guitar = offline_guitar(7);
    let em = ChordShape::new("Em", [0, 2, 2, 0, 0, 0]);

    for note in em.notes() {
        guitar.play(note);
        guitar.output_mut().advance(0.03);
    }
    let mut output = guitar.into_output();
    output.finish();

    // Five 30 ms gaps then a full note for the last string
    assert_eq!(output.frames(), 5 * 1_440 + 144_000);
    assert_eq!(output.active_voices(), 0);

    let samples = output.samples();
    assert!(samples.iter().all(|s| s.is_finite()));
    assert!(peak(samples) <= 6.0 * 0.4);
    assert!(rms(samples) > rms(render_note(0, 0, 7).samples()));
}

#[test]
fn muted_strings_are_not_played() {
    let mut guitar = offline_guitar(8);
    guitar.play_chord(&ChordShape::new("Dm", [-1, -1, 0, 2, 3, 1]));
    let output = guitar.output_mut();
    output.advance_frames(16);
    assert_eq!(output.active_voices(), 4);
}

#[test]
fn renders_to_wav() {
    let output = render_note(1, 3, 9);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("c.wav");
    output.write_wav(&path).unwrap();

    let mut reader = hound::WavReader::open(&path).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 2);
    assert_eq!(spec.sample_rate, 48_000);

    let read: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
    assert_eq!(read, output.samples());
}
