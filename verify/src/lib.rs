//! Speaker verification scoring and voice profile management.
//!
//! # Architecture
//!
//! Verification compares two [`VoiceFeatures`](voicegate_features::VoiceFeatures)
//! fingerprints through four component similarities, each in `[0, 1]`:
//!
//! - coefficient vector closeness (cosine)
//! - pitch mean/std ratios
//! - RMS energy ratio
//! - spectral shape (centroid, rolloff, zero-crossing closeness)
//!
//! A fixed-weight blend produces the match score; the acceptance decision
//! compares it against a per-profile sensitivity threshold. [`aggregate`]
//! folds N enrollment fingerprints into a single reference by element-wise
//! mean.
//!
//! The weights are product-tuning constants, not derived quantities. They
//! can be retuned, but the four-component structure and threshold-relative
//! confidence shape are part of the behavioral contract.

mod aggregate;
mod error;
mod profile;
mod similarity;

pub use aggregate::aggregate;
pub use error::VerifyError;
pub use profile::{EnrollmentLevel, VoiceProfile, MAX_NOISE_THRESHOLD, MIN_NOISE_THRESHOLD};
pub use similarity::{verify, SimilarityBreakdown, VerificationResult};
