//! Voice fingerprint extraction for speaker enrollment and verification.
//!
//! # Architecture
//!
//! The pipeline turns decoded audio into a fixed-shape fingerprint:
//!
//! 1. [`extract_features`]: mono PCM samples in `[-1, 1]` -> [`VoiceFeatures`]
//! 2. [`quality_score`]: [`VoiceFeatures`] + duration -> score in `[0, 1]`
//!
//! # Fingerprint Layout
//!
//! A [`VoiceFeatures`] record holds:
//!
//! - 13 band-energy coefficients (cheap MFCC surrogate, no FFT)
//! - spectral centroid and rolloff estimates
//! - zero-crossing rate and RMS energy
//! - autocorrelation pitch mean/std in Hz (0 when no pitch is found)
//! - speaking rate in syllables per second
//!
//! Extraction is a pure function of its inputs: the same samples and sample
//! rate always produce the same fingerprint, so it can run on a worker task
//! or inline with identical results.

mod extract;
mod features;
mod pitch;
mod quality;

pub use extract::extract_features;
pub use features::{VoiceFeatures, MFCC_BANDS};
pub use quality::quality_score;
