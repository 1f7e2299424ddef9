//! Realtime audio output on the default cpal device.
//!
//! The handle is created by the application and passed to whoever triggers
//! notes. Nothing is opened until the first note asks for it, which matters on
//! platforms that only allow audio after a user gesture.
//!
//! ```text
//!   Uninitialized ──activate()──→ Running ←──activate()── Suspended
//!                                    │                        ↑
//!                                    └────────suspend()───────┘
//! ```
//!
//! A missing or broken device never becomes an error for the caller: the
//! first failure is logged as a warning, later ones only at debug level, and
//! notes are quietly dropped.
//!
//! Device access goes through [`StreamOpener`]; [`CpalOpener`] is the real
//! one. Voices the audio thread is done with come back through the mixer's
//! return queue and are freed here, on the control side.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::{
    io::NoteSink,
    synth::{voice_mixer, PlaybackVoice, VoiceMixer, VoiceSender, DEFAULT_QUEUE_CAPACITY},
    MAX_BLOCK_SIZE,
};

/// Output tuning knobs.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputOptions {
    /// Voices that can wait for the audio thread before new ones are dropped
    pub queue_capacity: usize,
    /// Optional polyphony cap; `None` lets voices pile up freely
    pub max_voices: Option<usize>,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            max_voices: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputState {
    /// No device opened yet
    Uninitialized,
    /// Device open, stream paused
    Suspended,
    /// Device open and playing
    Running,
}

/// Format of an opened stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamInfo {
    pub sample_rate: f32,
    pub channels: usize,
}

/// A stream that has been built but may not be playing yet.
pub trait OutputStream {
    fn play(&mut self) -> EyreResult<()>;
    fn pause(&mut self) -> EyreResult<()>;
}

/// Opens a device stream that drives `mixer` from its callback.
pub trait StreamOpener {
    type Stream: OutputStream;

    fn open(&mut self, mixer: VoiceMixer) -> EyreResult<(Self::Stream, StreamInfo)>;
}

/// The default cpal output device.
#[derive(Debug, Default, Clone, Copy)]
pub struct CpalOpener;

impl StreamOpener for CpalOpener {
    type Stream = cpal::Stream;

    fn open(&mut self, mixer: VoiceMixer) -> EyreResult<(cpal::Stream, StreamInfo)> {
        open_cpal_stream(mixer)
    }
}

impl OutputStream for cpal::Stream {
    fn play(&mut self) -> EyreResult<()> {
        StreamTrait::play(self).wrap_err("failed to start audio stream")
    }

    fn pause(&mut self) -> EyreResult<()> {
        StreamTrait::pause(self).wrap_err("failed to pause audio stream")
    }
}

struct OpenStream<T> {
    stream: T,
    sender: VoiceSender,
    info: StreamInfo,
    active: Arc<AtomicUsize>,
    playing: bool,
}

/// Handle to the process's audio device.
pub struct AudioOutput<O: StreamOpener = CpalOpener> {
    options: OutputOptions,
    opener: O,
    stream: Option<OpenStream<O::Stream>>,
    warned: bool,
    dropped: u64,
}

impl AudioOutput {
    pub fn new(options: OutputOptions) -> Self {
        Self::with_opener(options, CpalOpener)
    }
}

impl<O: StreamOpener> AudioOutput<O> {
    pub fn with_opener(options: OutputOptions, opener: O) -> Self {
        Self {
            options,
            opener,
            stream: None,
            warned: false,
            dropped: 0,
        }
    }

    pub fn state(&self) -> OutputState {
        match &self.stream {
            None => OutputState::Uninitialized,
            Some(open) if open.playing => OutputState::Running,
            Some(_) => OutputState::Suspended,
        }
    }

    /// Open the device if needed and make sure it is playing.
    ///
    /// Returns the device sample rate, or `None` if there is nothing to play on.
    pub fn activate(&mut self) -> Option<f32> {
        if self.stream.is_none() {
            let (sender, mixer) = voice_mixer(self.options.queue_capacity, self.options.max_voices);
            let active = mixer.active_counter();

            match self.opener.open(mixer) {
                Ok((stream, info)) => {
                    self.stream = Some(OpenStream {
                        stream,
                        sender,
                        info,
                        active,
                        playing: false,
                    })
                }
                Err(err) => {
                    if self.warned {
                        debug!("audio output still unavailable: {:#}", err);
                    } else {
                        warn!("audio output unavailable, notes will be silent: {:#}", err);
                        self.warned = true;
                    }
                    return None;
                }
            }
        }

        let open = self.stream.as_mut()?;
        open.sender.reclaim();
        if !open.playing {
            if let Err(err) = open.stream.play() {
                warn!("{:#}", err);
                return None;
            }
            open.playing = true;
            debug!("audio output running");
        }

        Some(open.info.sample_rate)
    }

    /// Pause the stream. The next `activate` resumes it.
    pub fn suspend(&mut self) {
        if let Some(open) = self.stream.as_mut().filter(|open| open.playing) {
            match open.stream.pause() {
                Ok(()) => {
                    open.playing = false;
                    debug!("audio output suspended");
                }
                Err(err) => warn!("{:#}", err),
            }
        }
    }

    /// Free voices the audio thread has finished with. Returns how many.
    ///
    /// `activate` and `submit` already do this; call it when idle to give
    /// memory back between notes.
    pub fn reclaim(&mut self) -> usize {
        self.stream.as_mut().map_or(0, |open| open.sender.reclaim())
    }

    /// Voices currently being mixed on the audio thread.
    pub fn active_voices(&self) -> usize {
        self.stream
            .as_ref()
            .map_or(0, |open| open.active.load(Ordering::Relaxed))
    }

    /// Notes dropped because the queue to the audio thread was full.
    pub fn dropped_notes(&self) -> u64 {
        self.dropped
    }

    pub fn sample_rate(&self) -> Option<f32> {
        self.stream.as_ref().map(|open| open.info.sample_rate)
    }

    pub fn channels(&self) -> Option<usize> {
        self.stream.as_ref().map(|open| open.info.channels)
    }
}

impl Default for AudioOutput {
    fn default() -> Self {
        Self::new(OutputOptions::default())
    }
}

impl<O: StreamOpener> NoteSink for AudioOutput<O> {
    fn activate(&mut self) -> Option<f32> {
        AudioOutput::<O>::activate(self)
    }

    fn submit(&mut self, voice: PlaybackVoice) {
        let Some(open) = self.stream.as_mut() else {
            debug!("no audio stream open, dropping note");
            return;
        };

        open.sender.reclaim();
        if open.sender.send(voice).is_err() {
            self.dropped += 1;
            warn!(dropped = self.dropped, "voice queue full, dropping note");
        }
    }
}

fn open_cpal_stream(mixer: VoiceMixer) -> EyreResult<(cpal::Stream, StreamInfo)> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let info = StreamInfo {
        sample_rate: config.sample_rate().0 as f32,
        channels: config.channels() as usize,
    };
    let sample_format = config.sample_format();
    let stream_config: cpal::StreamConfig = config.into();

    let stream = match sample_format {
        cpal::SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, mixer, info.channels),
        cpal::SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, mixer, info.channels),
        cpal::SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, mixer, info.channels),
        other => Err(eyre!("unsupported sample format {:?}", other)),
    }?;

    info!(
        host = ?host.id(),
        device = %device.name().unwrap_or_else(|_| "unknown".to_string()),
        sample_rate = info.sample_rate,
        channels = info.channels,
        "audio output opened"
    );

    Ok((stream, info))
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut mixer: VoiceMixer,
    channels: usize,
) -> EyreResult<cpal::Stream>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    let block_len = MAX_BLOCK_SIZE * channels.max(1);
    // Sized once here; the callback works through the device buffer in blocks
    let mut mix_buffer = vec![0.0f32; block_len];

    let stream = device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                for chunk in data.chunks_mut(block_len) {
                    let block = &mut mix_buffer[..chunk.len()];
                    mixer.render(block, channels);

                    for (out, &sample) in chunk.iter_mut().zip(block.iter()) {
                        *out = T::from_sample(sample);
                    }
                }
            },
            |err| error!("audio stream error: {}", err),
            None,
        )
        .wrap_err("failed to build output stream")?;

    Ok(stream)
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::synth::{StringSynthesizer, SynthParams};

    /// Shared knobs and observations for a fake device.
    #[derive(Default)]
    struct FakeDevice {
        failed_opens_left: usize,
        fail_play: bool,
        opens: usize,
        plays: usize,
        pauses: usize,
        /// The mixer the "callback" would drive
        mixer: Option<VoiceMixer>,
    }

    struct FakeOpener(Rc<RefCell<FakeDevice>>);

    struct FakeStream(Rc<RefCell<FakeDevice>>);

    impl StreamOpener for FakeOpener {
        type Stream = FakeStream;

        fn open(&mut self, mixer: VoiceMixer) -> EyreResult<(FakeStream, StreamInfo)> {
            let mut device = self.0.borrow_mut();
            device.opens += 1;
            if device.failed_opens_left > 0 {
                device.failed_opens_left -= 1;
                return Err(eyre!("no device"));
            }
            device.mixer = Some(mixer);
            let info = StreamInfo {
                sample_rate: 8_000.0,
                channels: 2,
            };
            Ok((FakeStream(self.0.clone()), info))
        }
    }

    impl OutputStream for FakeStream {
        fn play(&mut self) -> EyreResult<()> {
            let mut device = self.0.borrow_mut();
            if device.fail_play {
                return Err(eyre!("play refused"));
            }
            device.plays += 1;
            Ok(())
        }

        fn pause(&mut self) -> EyreResult<()> {
            self.0.borrow_mut().pauses += 1;
            Ok(())
        }
    }

    fn fake_output(device: FakeDevice) -> (AudioOutput<FakeOpener>, Rc<RefCell<FakeDevice>>) {
        let device = Rc::new(RefCell::new(device));
        let output = AudioOutput::with_opener(OutputOptions::default(), FakeOpener(device.clone()));
        (output, device)
    }

    fn short_voice(synth: &mut StringSynthesizer) -> PlaybackVoice {
        synth.voice(110.0, 1, 8_000.0)
    }

    #[test]
    fn starts_uninitialized() {
        let output = AudioOutput::default();
        assert_eq!(output.state(), OutputState::Uninitialized);
        assert_eq!(output.active_voices(), 0);
        assert_eq!(output.sample_rate(), None);
    }

    #[test]
    fn submit_before_activation_is_a_no_op() {
        let (mut output, device) = fake_output(FakeDevice::default());
        let mut synth = StringSynthesizer::with_seed(SynthParams::default(), 1);
        output.submit(short_voice(&mut synth));
        assert_eq!(output.dropped_notes(), 0);
        assert_eq!(output.state(), OutputState::Uninitialized);
        assert_eq!(device.borrow().opens, 0);
    }

    #[test]
    fn first_activate_opens_and_runs() {
        let (mut output, device) = fake_output(FakeDevice::default());

        assert_eq!(output.activate(), Some(8_000.0));
        assert_eq!(output.state(), OutputState::Running);
        assert_eq!(output.channels(), Some(2));

        // Already running: no reopen, no second play
        assert_eq!(output.activate(), Some(8_000.0));
        assert_eq!(device.borrow().opens, 1);
        assert_eq!(device.borrow().plays, 1);
    }

    #[test]
    fn suspend_then_activate_resumes_the_same_stream() {
        let (mut output, device) = fake_output(FakeDevice::default());
        output.activate();

        output.suspend();
        assert_eq!(output.state(), OutputState::Suspended);
        assert_eq!(device.borrow().pauses, 1);

        // Suspending twice pauses once
        output.suspend();
        assert_eq!(device.borrow().pauses, 1);

        assert_eq!(output.activate(), Some(8_000.0));
        assert_eq!(output.state(), OutputState::Running);
        assert_eq!(device.borrow().opens, 1);
        assert_eq!(device.borrow().plays, 2);
    }

    #[test]
    fn refused_play_leaves_the_stream_suspended() {
        let (mut output, device) = fake_output(FakeDevice {
            fail_play: true,
            ..Default::default()
        });

        assert_eq!(output.activate(), None);
        assert_eq!(output.state(), OutputState::Suspended);

        device.borrow_mut().fail_play = false;
        assert_eq!(output.activate(), Some(8_000.0));
        assert_eq!(output.state(), OutputState::Running);
        assert_eq!(device.borrow().opens, 1);
    }

    #[test]
    fn failed_open_is_retried_and_warned_once() {
        let (mut output, device) = fake_output(FakeDevice {
            failed_opens_left: 2,
            ..Default::default()
        });

        assert_eq!(output.activate(), None);
        assert!(output.warned);
        assert_eq!(output.state(), OutputState::Uninitialized);

        assert_eq!(output.activate(), None);
        assert!(output.warned);

        assert_eq!(output.activate(), Some(8_000.0));
        assert_eq!(output.state(), OutputState::Running);
        assert_eq!(device.borrow().opens, 3);
    }

    #[test]
    fn voices_reach_the_mixer_and_come_back_to_be_freed() {
        let (mut output, device) = fake_output(FakeDevice::default());
        let params = SynthParams {
            duration: 0.1,
            tail: 0.01,
            ..SynthParams::default()
        };
        let mut synth = StringSynthesizer::with_seed(params, 3);

        output.activate();
        output.submit(short_voice(&mut synth));
        output.submit(short_voice(&mut synth));

        // 0.1 s at 8 kHz = 800 frames; render well past that
        let mut block = vec![0.0f32; 2 * 1_000];
        {
            let mut device = device.borrow_mut();
            let mixer = device.mixer.as_mut().unwrap();
            mixer.render_stereo(&mut block);
            assert_eq!(mixer.active_voices(), 0);
        }
        assert!(block.iter().any(|&s| s != 0.0));
        assert_eq!(output.reclaim(), 2);
        assert_eq!(output.reclaim(), 0);
    }

    #[test]
    fn full_queue_drops_and_counts() {
        let device = Rc::new(RefCell::new(FakeDevice::default()));
        let options = OutputOptions {
            queue_capacity: 2,
            max_voices: None,
        };
        let mut output = AudioOutput::with_opener(options, FakeOpener(device.clone()));
        let mut synth = StringSynthesizer::with_seed(SynthParams::default(), 1);

        output.activate();
        for _ in 0..3 {
            output.submit(short_voice(&mut synth));
        }
        assert_eq!(output.dropped_notes(), 1);
    }

    #[test]
    fn suspend_without_device_does_nothing() {
        let mut output = AudioOutput::default();
        output.suspend();
        assert_eq!(output.state(), OutputState::Uninitialized);
    }

    #[test]
    fn default_options_leave_polyphony_unbounded() {
        let options = OutputOptions::default();
        assert_eq!(options.max_voices, None);
        assert_eq!(options.queue_capacity, DEFAULT_QUEUE_CAPACITY);
    }
}
