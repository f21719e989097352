use crate::VerifyError;
use voicegate_features::{VoiceFeatures, MFCC_BANDS};

/// Folds enrollment fingerprints into a single reference fingerprint.
///
/// A single sample is returned unchanged; multiple samples are combined by
/// element-wise arithmetic mean (coefficient vector component-wise, scalars
/// directly), so the result is independent of sample order.
///
/// Errors on an empty slice: the enrollment flow must guarantee at least
/// one collected sample before completing.
pub fn aggregate(samples: &[VoiceFeatures]) -> Result<VoiceFeatures, VerifyError> {
    match samples {
        [] => Err(VerifyError::EmptyAggregate),
        [single] => Ok(single.clone()),
        _ => {
            let n = samples.len() as f64;
            let mut mfcc = [0.0f64; MFCC_BANDS];
            let mut out = VoiceFeatures::default();

            for s in samples {
                for (acc, &c) in mfcc.iter_mut().zip(s.mfcc.iter()) {
                    *acc += c;
                }
                out.spectral_centroid += s.spectral_centroid;
                out.spectral_rolloff += s.spectral_rolloff;
                out.zero_crossing_rate += s.zero_crossing_rate;
                out.rms_energy += s.rms_energy;
                out.pitch_mean += s.pitch_mean;
                out.pitch_std += s.pitch_std;
                out.speaking_rate += s.speaking_rate;
            }

            for c in &mut mfcc {
                *c /= n;
            }
            out.mfcc = mfcc;
            out.spectral_centroid /= n;
            out.spectral_rolloff /= n;
            out.zero_crossing_rate /= n;
            out.rms_energy /= n;
            out.pitch_mean /= n;
            out.pitch_std /= n;
            out.speaking_rate /= n;
            Ok(out)
        }
    }
}
