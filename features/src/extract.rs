use crate::features::{VoiceFeatures, MFCC_BANDS};
use crate::pitch::pitch_stats;

// Band coefficient blend. Product-tuned for 16kHz speech in the 1-15s
// range; no derivation beyond listening tests on the original deployment.
const BAND_MEAN_WEIGHT: f64 = 0.4;
const BAND_STD_WEIGHT: f64 = 0.4;
const BAND_PEAK_WEIGHT: f64 = 0.2;

/// Fraction of total squared energy at which spectral rolloff is read.
const ROLLOFF_ENERGY_FRACTION: f64 = 0.85;

/// Speaking-rate framing: 25ms analysis windows with a 15ms hop.
const RATE_WINDOW_MS: usize = 25;
const RATE_HOP_MS: usize = 15;
const RATE_MAX_FRAMES: usize = 200;

/// Energy threshold for a voiced frame, relative to the loudest frame.
const RATE_VOICED_RATIO: f64 = 0.3;

/// Extracts a [`VoiceFeatures`] fingerprint from mono PCM samples.
///
/// `samples` are expected in `[-1, 1]`; `sample_rate` is the decode rate in
/// Hz. The function is pure: it never mutates its input and the same input
/// always yields the same fingerprint. Empty input (or a zero sample rate)
/// returns the neutral [`VoiceFeatures::default`] rather than an error --
/// rejecting unusable audio is the caller's concern.
pub fn extract_features(samples: &[f32], sample_rate: u32) -> VoiceFeatures {
    if samples.is_empty() || sample_rate == 0 {
        return VoiceFeatures::default();
    }

    let zcr = zero_crossing_rate(samples);
    let (pitch_mean, pitch_std) = pitch_stats(samples, sample_rate);

    VoiceFeatures {
        mfcc: band_coefficients(samples),
        spectral_centroid: zcr * sample_rate as f64 * 0.5,
        spectral_rolloff: spectral_rolloff(samples, sample_rate),
        zero_crossing_rate: zcr,
        rms_energy: rms_energy(samples),
        pitch_mean,
        pitch_std,
        speaking_rate: speaking_rate(samples, sample_rate),
    }
}

/// Splits the buffer into [`MFCC_BANDS`] contiguous equal slices and blends
/// mean, std, and peak absolute amplitude per slice.
///
/// This is a deliberately cheap MFCC surrogate: no FFT or DCT, but band `i`
/// always maps to the same region of the buffer so fingerprints stay
/// comparable across recordings.
fn band_coefficients(samples: &[f32]) -> [f64; MFCC_BANDS] {
    let mut coeffs = [0.0; MFCC_BANDS];
    let n = samples.len();

    for (i, coeff) in coeffs.iter_mut().enumerate() {
        let start = i * n / MFCC_BANDS;
        let end = (i + 1) * n / MFCC_BANDS;
        if end <= start {
            continue;
        }
        let band = &samples[start..end];
        let len = band.len() as f64;

        let mut sum = 0.0f64;
        let mut peak = 0.0f64;
        for &s in band {
            let a = (s as f64).abs();
            sum += a;
            if a > peak {
                peak = a;
            }
        }
        let mean = sum / len;

        let mut var_sum = 0.0f64;
        for &s in band {
            let d = (s as f64).abs() - mean;
            var_sum += d * d;
        }
        let std = (var_sum / len).sqrt();

        *coeff = BAND_MEAN_WEIGHT * mean + BAND_STD_WEIGHT * std + BAND_PEAK_WEIGHT * peak;
    }
    coeffs
}

/// Fraction of adjacent sample pairs whose sign differs.
fn zero_crossing_rate(samples: &[f32]) -> f64 {
    if samples.len() < 2 {
        return 0.0;
    }
    let mut crossings = 0usize;
    for w in samples.windows(2) {
        if (w[0] >= 0.0) != (w[1] >= 0.0) {
            crossings += 1;
        }
    }
    crossings as f64 / samples.len() as f64
}

fn rms_energy(samples: &[f32]) -> f64 {
    let sum_sq: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum_sq / samples.len() as f64).sqrt()
}

/// Time-domain rolloff estimate: the buffer position (scaled to Hz against
/// Nyquist) at which cumulative squared energy reaches 85% of the total.
fn spectral_rolloff(samples: &[f32], sample_rate: u32) -> f64 {
    let total: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    if total <= 0.0 {
        return 0.0;
    }
    let target = total * ROLLOFF_ENERGY_FRACTION;
    let nyquist = sample_rate as f64 / 2.0;

    let mut cumulative = 0.0f64;
    for (i, &s) in samples.iter().enumerate() {
        cumulative += (s as f64) * (s as f64);
        if cumulative >= target {
            return i as f64 / samples.len() as f64 * nyquist;
        }
    }
    nyquist
}

/// Counts silence-to-voiced transitions across short energy frames as a
/// syllable proxy and scales by total duration.
fn speaking_rate(samples: &[f32], sample_rate: u32) -> f64 {
    let window = sample_rate as usize * RATE_WINDOW_MS / 1000;
    let hop = sample_rate as usize * RATE_HOP_MS / 1000;
    if window == 0 || hop == 0 || samples.len() < window {
        return 0.0;
    }

    let mut energies = Vec::with_capacity(RATE_MAX_FRAMES);
    let mut offset = 0usize;
    while energies.len() < RATE_MAX_FRAMES && offset + window <= samples.len() {
        let frame = &samples[offset..offset + window];
        let sum_sq: f64 = frame.iter().map(|&s| (s as f64) * (s as f64)).sum();
        energies.push((sum_sq / window as f64).sqrt());
        offset += hop;
    }

    let max_energy = energies.iter().cloned().fold(0.0f64, f64::max);
    if max_energy <= 0.0 {
        return 0.0;
    }
    let threshold = max_energy * RATE_VOICED_RATIO;

    let mut syllables = 0usize;
    let mut voiced = false;
    for &e in &energies {
        let now_voiced = e > threshold;
        if now_voiced && !voiced {
            syllables += 1;
        }
        voiced = now_voiced;
    }

    let duration_secs = samples.len() as f64 / sample_rate as f64;
    syllables as f64 / duration_secs
}
