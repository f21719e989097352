use crate::features::VoiceFeatures;

// Quality penalties are independent and multiplicative. The multipliers are
// product-tuned for 16kHz utterances between 1 and 15 seconds.
const SHORT_MS: u64 = 1000;
const SHORT_PENALTY: f64 = 0.5;
const BRIEF_MS: u64 = 2000;
const BRIEF_PENALTY: f64 = 0.8;
const QUIET_RMS: f64 = 0.01;
const QUIET_PENALTY: f64 = 0.6;
const NO_PITCH_PENALTY: f64 = 0.5;
const NOISY_ZCR: f64 = 0.3;
const NOISY_PENALTY: f64 = 0.7;

/// Scores how usable a single recording is for enrollment, in `[0, 1]`.
///
/// Starts at 1.0 and applies a penalty for each defect found: a short or
/// very short recording, near-silence, an undetectable pitch, and excessive
/// noisiness. A clean multi-second recording scores 1.0.
pub fn quality_score(features: &VoiceFeatures, duration_ms: u64) -> f64 {
    let mut score = 1.0f64;

    if duration_ms < SHORT_MS {
        score *= SHORT_PENALTY;
    } else if duration_ms < BRIEF_MS {
        score *= BRIEF_PENALTY;
    }

    if features.rms_energy < QUIET_RMS {
        score *= QUIET_PENALTY;
    }

    if features.pitch_mean == 0.0 {
        score *= NO_PITCH_PENALTY;
    }

    if features.zero_crossing_rate > NOISY_ZCR {
        score *= NOISY_PENALTY;
    }

    score.clamp(0.0, 1.0)
}
