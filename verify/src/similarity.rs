use serde::{Deserialize, Serialize};
use voicegate_features::VoiceFeatures;

// Component blend weights. Product-tuned; must sum to 1.
const MFCC_WEIGHT: f64 = 0.50;
const PITCH_WEIGHT: f64 = 0.25;
const ENERGY_WEIGHT: f64 = 0.10;
const SPECTRAL_WEIGHT: f64 = 0.15;

// Inner blends within the pitch and spectral components.
const PITCH_MEAN_WEIGHT: f64 = 0.7;
const PITCH_STD_WEIGHT: f64 = 0.3;
const CENTROID_WEIGHT: f64 = 0.4;
const ROLLOFF_WEIGHT: f64 = 0.3;
const ZCR_WEIGHT: f64 = 0.3;

/// Slope of the zero-crossing-rate closeness ramp: a ZCR delta of 0.2
/// already counts as completely different.
const ZCR_SLOPE: f64 = 5.0;

/// Per-component similarity breakdown, each value in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityBreakdown {
    pub mfcc: f64,
    pub pitch: f64,
    pub energy: f64,
    pub spectral: f64,
}

/// Outcome of a single verification call. Ephemeral: consumed by the caller
/// and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    /// True when the match score reached the threshold.
    pub is_match: bool,
    /// How sure the decision is, in `[0, 1]`. 0.5 means "right at the
    /// threshold"; it rises toward 1.0 as the score moves away from the
    /// threshold in either direction.
    pub confidence: f64,
    /// Blended similarity score in `[0, 1]`.
    pub match_score: f64,
    /// The threshold the score was compared against.
    pub threshold: f64,
    /// Component similarities that produced the score.
    pub details: SimilarityBreakdown,
}

/// Scores `input` against `reference` and decides a match at `threshold`.
pub fn verify(input: &VoiceFeatures, reference: &VoiceFeatures, threshold: f64) -> VerificationResult {
    let details = SimilarityBreakdown {
        mfcc: mfcc_similarity(&input.mfcc, &reference.mfcc),
        pitch: pitch_similarity(input, reference),
        energy: energy_similarity(input, reference),
        spectral: spectral_similarity(input, reference),
    };

    let match_score = (MFCC_WEIGHT * details.mfcc
        + PITCH_WEIGHT * details.pitch
        + ENERGY_WEIGHT * details.energy
        + SPECTRAL_WEIGHT * details.spectral)
        .clamp(0.0, 1.0);

    let is_match = match_score >= threshold;

    VerificationResult {
        is_match,
        confidence: confidence(match_score, threshold, is_match),
        match_score,
        threshold,
        details,
    }
}

/// Cosine similarity of the coefficient vectors, remapped from `[-1, 1]`
/// to `[0, 1]`. Zero if either vector has no magnitude.
fn mfcc_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let cos = (dot / (norm_a * norm_b)).clamp(-1.0, 1.0);
    (cos + 1.0) / 2.0
}

fn pitch_similarity(a: &VoiceFeatures, b: &VoiceFeatures) -> f64 {
    PITCH_MEAN_WEIGHT * ratio_similarity(a.pitch_mean, b.pitch_mean)
        + PITCH_STD_WEIGHT * ratio_similarity(a.pitch_std, b.pitch_std)
}

/// Softened loudness comparison: the square root flattens the ratio so a
/// 4x louder recording still scores 0.5 rather than 0.25.
fn energy_similarity(a: &VoiceFeatures, b: &VoiceFeatures) -> f64 {
    ratio_similarity(a.rms_energy, b.rms_energy).sqrt()
}

fn spectral_similarity(a: &VoiceFeatures, b: &VoiceFeatures) -> f64 {
    let zcr_closeness = (1.0 - ZCR_SLOPE * (a.zero_crossing_rate - b.zero_crossing_rate).abs()).max(0.0);
    CENTROID_WEIGHT * ratio_similarity(a.spectral_centroid, b.spectral_centroid)
        + ROLLOFF_WEIGHT * ratio_similarity(a.spectral_rolloff, b.spectral_rolloff)
        + ZCR_WEIGHT * zcr_closeness
}

/// `min/max` ratio of two non-negative scalars.
///
/// Both zero means the statistic agrees exactly (1.0, keeps verification of
/// a fingerprint against itself reflexive). Exactly one zero means the
/// statistic is unavailable on one side, which is treated as neutral (0.5)
/// rather than a mismatch.
fn ratio_similarity(a: f64, b: f64) -> f64 {
    if a <= 0.0 && b <= 0.0 {
        1.0
    } else if a <= 0.0 || b <= 0.0 {
        0.5
    } else if a < b {
        a / b
    } else {
        b / a
    }
}

/// Piecewise-linear confidence relative to the threshold.
///
/// At the threshold confidence is 0.5. Above, it rises toward 1.0 as the
/// score approaches 1; below, confidence in the rejection rises toward 1.0
/// as the score approaches 0.
fn confidence(score: f64, threshold: f64, is_match: bool) -> f64 {
    let c = if is_match {
        if threshold >= 1.0 {
            1.0
        } else {
            0.5 + (score - threshold) / (1.0 - threshold) * 0.5
        }
    } else if threshold <= 0.0 {
        0.5
    } else {
        0.5 - (threshold - score) / threshold * 0.5
    };
    c.clamp(0.0, 1.0)
}
