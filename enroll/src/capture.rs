//! Audio capture and decode collaborator boundaries.
//!
//! The core never talks to a microphone or codec directly. It consumes a
//! start/stop capture primitive yielding a finite encoded blob, and a decode
//! primitive turning that blob into mono PCM samples. Any codec works as
//! long as decode is lossless enough not to corrupt pitch/energy estimates.

use crate::error::{CaptureError, DecodeError};
use async_trait::async_trait;

/// A finite encoded audio recording.
#[derive(Debug, Clone)]
pub struct AudioBlob {
    pub data: Vec<u8>,
    /// Container/codec hint, e.g. `audio/pcm;rate=16000`.
    pub mime: String,
}

/// Decoded mono PCM audio.
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// Samples in `[-1, 1]`.
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

/// Microphone capture collaborator.
#[async_trait]
pub trait AudioCapture: Send + Sync {
    /// Acquires the capture device and begins recording.
    ///
    /// The returned stream exclusively owns the device until stopped or
    /// aborted. Permission and device failures map to distinct
    /// [`CaptureError`] variants so callers can present actionable messages.
    async fn start(&self) -> Result<Box<dyn CaptureStream>, CaptureError>;
}

/// An in-progress recording. Exactly one may exist per capture device.
#[async_trait]
pub trait CaptureStream: Send {
    /// Stops recording and yields everything captured so far.
    /// The device is released whether or not this returns an error.
    async fn stop(self: Box<Self>) -> Result<AudioBlob, CaptureError>;

    /// Stops recording and discards the captured audio. Used on
    /// cancellation; must release the device.
    async fn abort(self: Box<Self>);
}

/// Audio decode collaborator.
pub trait AudioDecoder: Send + Sync {
    fn decode(&self, blob: &AudioBlob) -> Result<DecodedAudio, DecodeError>;
}

/// Decoder for raw PCM16 signed little-endian mono blobs.
///
/// This is the default wire form used by the capture fixtures and the demo;
/// real deployments plug in their platform codec behind [`AudioDecoder`].
#[derive(Debug, Clone)]
pub struct RawPcmDecoder {
    pub sample_rate: u32,
}

impl Default for RawPcmDecoder {
    fn default() -> Self {
        Self { sample_rate: 16000 }
    }
}

impl AudioDecoder for RawPcmDecoder {
    fn decode(&self, blob: &AudioBlob) -> Result<DecodedAudio, DecodeError> {
        if blob.data.is_empty() {
            return Err(DecodeError::EmptyAudio);
        }
        if blob.data.len() % 2 != 0 {
            return Err(DecodeError::Malformed(format!(
                "odd PCM16 byte length {}",
                blob.data.len()
            )));
        }

        let n = blob.data.len() / 2;
        let mut samples = Vec::with_capacity(n);
        for i in 0..n {
            let lo = blob.data[2 * i];
            let hi = blob.data[2 * i + 1];
            let s = (lo as i16) | ((hi as i16) << 8);
            samples.push(s as f32 / 32768.0);
        }
        Ok(DecodedAudio {
            samples,
            sample_rate: self.sample_rate,
        })
    }
}
