//! Finished recordings and their data-URI transport form.
//!
//! A [`RecordingArtifact`] is the encoded audio of one attempt at one
//! sentence.  Scoring requests carry it as `data:<mime>;base64,<payload>`.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use hound::{SampleFormat, WavSpec, WavWriter};

/// MIME type of artifacts produced by [`RecordingArtifact::from_samples`].
pub const WAV_MIME: &str = "audio/wav";

// ---------------------------------------------------------------------------
// RecordingArtifact
// ---------------------------------------------------------------------------

/// Encoded audio plus its MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingArtifact {
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl RecordingArtifact {
    pub fn new(bytes: Vec<u8>, mime: impl Into<String>) -> Self {
        Self {
            bytes,
            mime: mime.into(),
        }
    }

    /// Encode mono `f32` samples as 16-bit PCM WAV.
    pub fn from_samples(samples: &[f32], sample_rate: u32) -> Result<Self, hound::Error> {
        let bytes = encode_wav(samples, sample_rate)?;
        Ok(Self::new(bytes, WAV_MIME))
    }

    /// `data:<mime>;base64,<payload>`
    ///
    /// ```rust
    /// use speakeasy::audio::RecordingArtifact;
    ///
    /// let artifact = RecordingArtifact::new(b"hi".to_vec(), "audio/wav");
    /// assert_eq!(artifact.to_data_uri(), "data:audio/wav;base64,aGk=");
    /// ```
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, BASE64_STANDARD.encode(&self.bytes))
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Split a base64 data URI into `(mime, payload)`.
///
/// Returns `None` for anything that is not `data:<mime>[;params];base64,...`
/// or that has an empty MIME type.  Parameters such as `codecs=opus` are kept
/// in the returned MIME string.
pub fn parse_data_uri(uri: &str) -> Option<(&str, &str)> {
    let rest = uri.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mime = header.strip_suffix(";base64")?;
    if mime.trim().is_empty() {
        return None;
    }
    Some((mime, payload))
}

fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>, hound::Error> {
    let mut cursor = Cursor::new(Vec::new());
    {
        let spec = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        for &sample in samples {
            let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            writer.write_sample(value)?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
