//! Channel mixing and sample-rate conversion for captured audio.
//!
//! Recordings are stored as mono at [`AudioConfig::target_sample_rate`]
//! (16 kHz by default), small enough to ship inline as a data URI and the
//! rate speech models expect.
//!
//! 1. [`stereo_to_mono`] downmixes any number of interleaved channels.
//! 2. [`resample`] converts between rates by linear interpolation.
//!
//! [`AudioConfig::target_sample_rate`]: crate::config::AudioConfig::target_sample_rate

// ---------------------------------------------------------------------------
// stereo_to_mono
// ---------------------------------------------------------------------------

/// Mix interleaved multi-channel audio down to mono by averaging all channels.
///
/// The output length is `samples.len() / channels`; a trailing partial frame
/// is dropped.  `channels == 0` yields an empty vector.
///
/// # Example
///
/// ```rust
/// use speakeasy::audio::stereo_to_mono;
///
/// let stereo = vec![0.5_f32, -0.5, 0.2, 0.4]; // L R L R
/// let mono = stereo_to_mono(&stereo, 2);
/// assert_eq!(mono.len(), 2);
/// assert!((mono[1] - 0.3).abs() < 1e-6);
/// ```
pub fn stereo_to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => samples.to_vec(),
        n => {
            let n = n as usize;
            samples
                .chunks_exact(n)
                .map(|frame| frame.iter().sum::<f32>() / n as f32)
                .collect()
        }
    }
}

// ---------------------------------------------------------------------------
// resample
// ---------------------------------------------------------------------------

/// Resample mono `samples` from `source_rate` to `target_rate` Hz.
///
/// Equal rates return a copy.  A zero rate on either side yields an empty
/// vector.  The output length is `ceil(len * target_rate / source_rate)`.
///
/// ```rust
/// use speakeasy::audio::resample;
///
/// let hi = vec![0.5_f32; 480];
/// assert_eq!(resample(&hi, 48_000, 16_000).len(), 160);
/// ```
pub fn resample(samples: &[f32], source_rate: u32, target_rate: u32) -> Vec<f32> {
    if source_rate == target_rate {
        return samples.to_vec();
    }
    if samples.is_empty() || source_rate == 0 || target_rate == 0 {
        return Vec::new();
    }

    let ratio = target_rate as f64 / source_rate as f64;
    let output_len = (samples.len() as f64 * ratio).ceil() as usize;
    let mut output = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let src_pos = i as f64 / ratio;
        let idx = src_pos as usize;
        let frac = (src_pos - idx as f64) as f32;

        let sample = match (samples.get(idx), samples.get(idx + 1)) {
            (Some(a), Some(b)) => a * (1.0 - frac) + b * frac,
            (Some(a), None) => *a,
            _ => 0.0,
        };
        output.push(sample);
    }

    output
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ---- stereo_to_mono ----------------------------------------------------

    #[test]
    fn mono_is_passed_through() {
        let input = vec![0.1_f32, 0.2, 0.3];
        assert_eq!(stereo_to_mono(&input, 1), input);
    }

    #[test]
    fn two_channels_are_averaged() {
        let out = stereo_to_mono(&[1.0_f32, -1.0, 0.5, 0.5], 2);
        assert_eq!(out.len(), 2);
        assert!(out[0].abs() < 1e-6);
        assert!((out[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn partial_frame_is_dropped() {
        let out = stereo_to_mono(&[0.2_f32, 0.2, 0.9], 2);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn zero_channels_is_empty() {
        assert!(stereo_to_mono(&[1.0_f32, 2.0], 0).is_empty());
    }

    // ---- resample ----------------------------------------------------------

    #[test]
    fn same_rate_is_noop() {
        let input: Vec<f32> = (0..160).map(|i| i as f32 / 160.0).collect();
        assert_eq!(resample(&input, 16_000, 16_000), input);
    }

    #[test]
    fn empty_input() {
        assert!(resample(&[], 48_000, 16_000).is_empty());
    }

    #[test]
    fn zero_rate_is_empty() {
        assert!(resample(&[0.1, 0.2], 0, 16_000).is_empty());
    }

    #[test]
    fn downsample_44100_to_16k_length() {
        let out = resample(&vec![0.0_f32; 44_100], 44_100, 16_000);
        assert!(out.len().abs_diff(16_000) <= 1, "got {}", out.len());
    }

    #[test]
    fn upsample_doubles_length() {
        assert_eq!(resample(&vec![0.0_f32; 80], 8_000, 16_000).len(), 160);
    }

    #[test]
    fn constant_signal_keeps_amplitude() {
        for s in resample(&vec![0.5_f32; 480], 48_000, 16_000) {
            assert!((s - 0.5).abs() < 1e-5, "amplitude drift: {s}");
        }
    }
}
