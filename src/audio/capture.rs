//! Microphone capture via `cpal`.
//!
//! [`AudioCapture`] wraps the cpal host/device/stream lifecycle.  A
//! [`RecordingSession`] owns one open input stream plus the samples it has
//! delivered so far; [`ActiveRecording::finish`] closes the stream and
//! flushes everything into a [`RecordingArtifact`].  Dropping a session
//! without finishing it also closes the stream, so the device is never held
//! past the session that opened it.

use std::sync::mpsc;
use std::time::Instant;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use thiserror::Error;

use crate::audio::artifact::RecordingArtifact;
use crate::audio::resample::{resample, stereo_to_mono};
use crate::config::AudioConfig;
use crate::error::PracticeError;

// ---------------------------------------------------------------------------
// AudioChunk
// ---------------------------------------------------------------------------

/// A single buffer of raw audio as delivered by the cpal callback.
#[derive(Debug, Clone)]
pub struct AudioChunk {
    /// Interleaved PCM samples in `[-1.0, 1.0]`.
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

/// What the cpal callbacks push to the session.
#[derive(Debug)]
enum StreamMessage {
    Chunk(AudioChunk),
    Error(String),
}

// ---------------------------------------------------------------------------
// RecorderEvent
// ---------------------------------------------------------------------------

/// Typed events a live recording reports while it runs.
#[derive(Debug, Clone, PartialEq)]
pub enum RecorderEvent {
    /// `samples` mono frames were added to the recording.
    Data { samples: usize },
    /// The stream failed; the recording should be abandoned.
    Failed(PracticeError),
}

// ---------------------------------------------------------------------------
// Microphone / ActiveRecording traits
// ---------------------------------------------------------------------------

/// Something that can open a recording.
pub trait Microphone {
    /// Acquire the input device and start recording.
    fn start(&self) -> Result<Box<dyn ActiveRecording>, PracticeError>;
}

/// A recording in progress.
pub trait ActiveRecording {
    /// Drain whatever the device delivered since the last call.
    fn poll(&mut self) -> Vec<RecorderEvent>;

    /// Seconds of audio captured so far.
    fn elapsed_secs(&self) -> f32;

    /// Release the device and encode everything captured.  An empty
    /// recording still produces an artifact.
    fn finish(self: Box<Self>) -> Result<RecordingArtifact, PracticeError>;
}

// ---------------------------------------------------------------------------
// StreamHandle
// ---------------------------------------------------------------------------

/// RAII guard that keeps the cpal stream alive.
///
/// Dropping this value stops the underlying hardware stream.
pub struct StreamHandle {
    _stream: cpal::Stream,
}

// ---------------------------------------------------------------------------
// CaptureError
// ---------------------------------------------------------------------------

/// Errors that can occur while setting up the audio capture.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no input device found on the default audio host")]
    NoDevice,

    #[error("failed to query default input config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
}

impl From<CaptureError> for PracticeError {
    fn from(e: CaptureError) -> Self {
        let detail = e.to_string();
        match e {
            CaptureError::NoDevice => PracticeError::DeviceUnavailable(detail),
            _ => classify_device_failure(detail),
        }
    }
}

/// Backends report refused access only as text.
fn classify_device_failure(detail: String) -> PracticeError {
    let lower = detail.to_lowercase();
    if lower.contains("permission") || lower.contains("denied") || lower.contains("not authorized")
    {
        PracticeError::PermissionDenied(detail)
    } else {
        PracticeError::DeviceUnavailable(detail)
    }
}

// ---------------------------------------------------------------------------
// AudioCapture
// ---------------------------------------------------------------------------

/// Input device wrapper built on top of `cpal`.
pub struct AudioCapture {
    device: cpal::Device,
    config: cpal::StreamConfig,
    sample_rate: u32,
    channels: u16,
}

impl AudioCapture {
    /// Open the system default input device with its preferred configuration.
    pub fn new() -> Result<Self, CaptureError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(CaptureError::NoDevice)?;

        let supported = device.default_input_config()?;

        let channels = supported.channels();
        let sample_rate = supported.sample_rate().0;
        let config: cpal::StreamConfig = supported.into();

        Ok(Self {
            device,
            config,
            sample_rate,
            channels,
        })
    }

    /// Start the stream, forwarding chunks and stream errors to `tx`.
    fn start(&self, tx: mpsc::Sender<StreamMessage>) -> Result<StreamHandle, CaptureError> {
        let sample_rate = self.sample_rate;
        let channels = self.channels;
        let err_tx = tx.clone();

        let stream = self.device.build_input_stream(
            &self.config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                let chunk = AudioChunk {
                    samples: data.to_vec(),
                    sample_rate,
                    channels,
                };
                // The session may already be gone.
                let _ = tx.send(StreamMessage::Chunk(chunk));
            },
            move |err: cpal::StreamError| {
                log::error!("cpal stream error: {err}");
                let _ = err_tx.send(StreamMessage::Error(err.to_string()));
            },
            None,
        )?;

        stream.play()?;
        Ok(StreamHandle { _stream: stream })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }
}

// ---------------------------------------------------------------------------
// CpalMicrophone
// ---------------------------------------------------------------------------

/// [`Microphone`] backed by the default cpal input device.
///
/// The device is opened anew for every recording.
#[derive(Debug, Clone)]
pub struct CpalMicrophone {
    config: AudioConfig,
}

impl CpalMicrophone {
    pub fn new(config: AudioConfig) -> Self {
        Self { config }
    }
}

impl Microphone for CpalMicrophone {
    fn start(&self) -> Result<Box<dyn ActiveRecording>, PracticeError> {
        let capture = AudioCapture::new()?;
        let (tx, rx) = mpsc::channel();
        let handle = capture.start(tx)?;
        log::info!(
            "recording started ({} Hz, {} ch)",
            capture.sample_rate(),
            capture.channels()
        );

        let buffer = CaptureBuffer::new(
            capture.sample_rate(),
            self.config.target_sample_rate,
            self.config.max_recording_secs,
        );

        Ok(Box::new(RecordingSession {
            stream: Some(handle),
            rx,
            buffer,
            started: Instant::now(),
        }))
    }
}

// ---------------------------------------------------------------------------
// CaptureBuffer
// ---------------------------------------------------------------------------

/// Mono samples at the device rate, capped at a maximum duration.
#[derive(Debug, Clone)]
pub struct CaptureBuffer {
    samples: Vec<f32>,
    source_rate: u32,
    target_rate: u32,
    max_samples: usize,
}

impl CaptureBuffer {
    pub fn new(source_rate: u32, target_rate: u32, max_secs: f32) -> Self {
        let max_samples = (source_rate as f32 * max_secs.max(0.0)) as usize;
        Self {
            samples: Vec::new(),
            source_rate,
            target_rate,
            max_samples,
        }
    }

    /// Append one interleaved chunk; returns the number of mono frames kept.
    pub fn push(&mut self, chunk: &AudioChunk) -> usize {
        let mono = stereo_to_mono(&chunk.samples, chunk.channels);
        let room = self.max_samples.saturating_sub(self.samples.len());
        let kept = mono.len().min(room);
        self.samples.extend_from_slice(&mono[..kept]);
        kept
    }

    pub fn secs(&self) -> f32 {
        if self.source_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.source_rate as f32
    }

    pub fn is_full(&self) -> bool {
        self.samples.len() >= self.max_samples
    }

    /// Resample to the target rate and encode as WAV.
    pub fn encode(&self) -> Result<RecordingArtifact, PracticeError> {
        let resampled = resample(&self.samples, self.source_rate, self.target_rate);
        RecordingArtifact::from_samples(&resampled, self.target_rate)
            .map_err(|e| PracticeError::DeviceUnavailable(format!("failed to encode recording: {e}")))
    }
}

// ---------------------------------------------------------------------------
// RecordingSession
// ---------------------------------------------------------------------------

/// One live cpal recording.
pub struct RecordingSession {
    stream: Option<StreamHandle>,
    rx: mpsc::Receiver<StreamMessage>,
    buffer: CaptureBuffer,
    started: Instant,
}

impl ActiveRecording for RecordingSession {
    fn poll(&mut self) -> Vec<RecorderEvent> {
        let mut events = Vec::new();
        while let Ok(message) = self.rx.try_recv() {
            match message {
                StreamMessage::Chunk(chunk) => {
                    if self.buffer.is_full() {
                        continue;
                    }
                    let samples = self.buffer.push(&chunk);
                    if self.buffer.is_full() {
                        log::info!("recording reached its maximum length");
                    }
                    events.push(RecorderEvent::Data { samples });
                }
                StreamMessage::Error(detail) => {
                    events.push(RecorderEvent::Failed(classify_device_failure(detail)));
                }
            }
        }
        events
    }

    fn elapsed_secs(&self) -> f32 {
        self.buffer.secs()
    }

    fn finish(mut self: Box<Self>) -> Result<RecordingArtifact, PracticeError> {
        // Close the device before draining so no chunk arrives after encoding.
        drop(self.stream.take());
        for event in self.poll() {
            if let RecorderEvent::Failed(e) = event {
                log::warn!("recording: stream error while stopping: {e}");
            }
        }
        let artifact = self.buffer.encode()?;
        log::info!(
            "recording stopped after {:.1}s ({:.1}s captured, {} bytes)",
            self.started.elapsed().as_secs_f32(),
            self.buffer.secs(),
            artifact.bytes.len()
        );
        Ok(artifact)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
