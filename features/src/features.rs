use serde::{Deserialize, Serialize};

/// Number of band coefficients in a fingerprint.
pub const MFCC_BANDS: usize = 13;

/// A fixed-shape voice fingerprint.
///
/// This is the serialization contract at the persistence boundary: every
/// numeric field is a double, and `mfcc` is an ordered array of exactly
/// [`MFCC_BANDS`] doubles. Records must round-trip exactly.
///
/// All fields are non-negative. `pitch_mean`/`pitch_std` use 0 as the
/// "no pitch detected" sentinel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceFeatures {
    /// Band-energy coefficients, one per contiguous slice of the buffer.
    /// Band order is significant: band `i` always covers the same region,
    /// otherwise aggregation and comparison would mix unrelated bands.
    pub mfcc: [f64; MFCC_BANDS],

    /// Estimated spectral brightness in Hz.
    pub spectral_centroid: f64,

    /// Hz position at which cumulative squared energy reaches 85% of total.
    pub spectral_rolloff: f64,

    /// Fraction of adjacent-sample sign changes, in `[0, 1]`. Noisiness proxy.
    pub zero_crossing_rate: f64,

    /// Root-mean-square of all samples. Loudness proxy.
    pub rms_energy: f64,

    /// Mean fundamental frequency in Hz across voiced frames, 0 if none.
    pub pitch_mean: f64,

    /// Standard deviation of the fundamental in Hz, 0 if none.
    pub pitch_std: f64,

    /// Estimated syllables per second.
    pub speaking_rate: f64,
}

impl Default for VoiceFeatures {
    /// The neutral fingerprint produced for empty or silent input.
    fn default() -> Self {
        Self {
            mfcc: [0.0; MFCC_BANDS],
            spectral_centroid: 0.0,
            spectral_rolloff: 0.0,
            zero_crossing_rate: 0.0,
            rms_energy: 0.0,
            pitch_mean: 0.0,
            pitch_std: 0.0,
            speaking_rate: 0.0,
        }
    }
}

impl VoiceFeatures {
    /// Returns true if this fingerprint carries no signal at all.
    pub fn is_silent(&self) -> bool {
        self.rms_energy == 0.0 && self.mfcc.iter().all(|&c| c == 0.0)
    }
}
