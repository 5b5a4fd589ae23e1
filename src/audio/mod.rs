//! Audio capture adapter: microphone → mono → resample → WAV artifact.
//!
//! # Pipeline
//!
//! ```text
//! Microphone → cpal callback → AudioChunk (mpsc) → stereo_to_mono
//!           → CaptureBuffer (capped) → resample → hound WAV → RecordingArtifact
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use speakeasy::audio::{CpalMicrophone, Microphone};
//! use speakeasy::config::AudioConfig;
//!
//! let mic = CpalMicrophone::new(AudioConfig::default());
//! let recording = mic.start().unwrap();
//! // ... speak ...
//! let artifact = recording.finish().unwrap(); // releases the device
//! println!("{}", &artifact.to_data_uri()[..32]);
//! ```

pub mod artifact;
pub mod capture;
pub mod resample;

pub use artifact::{parse_data_uri, RecordingArtifact, WAV_MIME};
pub use capture::{
    ActiveRecording, AudioCapture, AudioChunk, CaptureBuffer, CaptureError, CpalMicrophone,
    Microphone, RecorderEvent, RecordingSession, StreamHandle,
};
pub use resample::{resample, stereo_to_mono};
