use serde::{Deserialize, Serialize};
use voicegate_features::VoiceFeatures;

/// One recorded phrase collected during enrollment.
///
/// Samples are owned by the in-progress session and handed to the profile
/// store on completion for optional audit/retraining persistence.
/// Verification never reads them; only the aggregated reference fingerprint
/// matters at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentSample {
    /// 0-based position in the phrase list.
    pub phrase_index: usize,

    /// The phrase the user was asked to read.
    pub phrase_text: String,

    /// Fingerprint extracted from the recording.
    #[serde(rename = "audioFeatures")]
    pub features: VoiceFeatures,

    /// Recording length in milliseconds.
    pub duration_ms: u64,

    /// Decode sample rate in Hz.
    pub sample_rate: u32,

    /// Usability score in `[0, 1]` from
    /// [`quality_score`](voicegate_features::quality_score).
    pub quality_score: f64,
}
