//! Autocorrelation pitch estimation.
//!
//! Runs a coarse autocorrelation over a handful of frames at the start of
//! the buffer. Accuracy is traded for speed: the search skips every other
//! lag and caps the correlation window, which is enough to separate speakers
//! by fundamental frequency without a full pitch tracker.

/// Analysis frame length in samples.
const FRAME_LEN: usize = 1024;
/// Hop between analysis frames in samples.
const FRAME_HOP: usize = 512;
/// Maximum number of frames examined, counted from the buffer start.
const MAX_FRAMES: usize = 20;
/// Correlation window cap per lag.
const CORR_WINDOW: usize = 256;
/// Step between candidate lags.
const LAG_STEP: usize = 2;

/// Plausible human fundamental range in Hz. Frames outside are discarded.
const PITCH_MIN_HZ: f64 = 50.0;
const PITCH_MAX_HZ: f64 = 500.0;

/// Returns `(mean, std)` of the fundamental frequency in Hz across voiced
/// frames, or `(0.0, 0.0)` when no frame yields a pitch in range.
pub(crate) fn pitch_stats(samples: &[f32], sample_rate: u32) -> (f64, f64) {
    let sr = sample_rate as f64;
    let min_lag = ((sr / PITCH_MAX_HZ) as usize).max(1);
    let max_lag = ((sr / PITCH_MIN_HZ) as usize).min(FRAME_LEN - 1);

    let mut pitches: Vec<f64> = Vec::with_capacity(MAX_FRAMES);
    let mut offset = 0usize;
    let mut frames = 0usize;

    while frames < MAX_FRAMES && offset + FRAME_LEN <= samples.len() {
        let frame = &samples[offset..offset + FRAME_LEN];
        if let Some(lag) = best_lag(frame, min_lag, max_lag) {
            let hz = sr / lag as f64;
            if (PITCH_MIN_HZ..=PITCH_MAX_HZ).contains(&hz) {
                pitches.push(hz);
            }
        }
        offset += FRAME_HOP;
        frames += 1;
    }

    if pitches.is_empty() {
        return (0.0, 0.0);
    }

    let n = pitches.len() as f64;
    let mean = pitches.iter().sum::<f64>() / n;
    let var = pitches.iter().map(|p| (p - mean) * (p - mean)).sum::<f64>() / n;
    (mean, var.sqrt())
}

/// Scans candidate lags and returns the one with maximum correlation, or
/// `None` when no lag produced positive correlation (e.g. silence).
fn best_lag(frame: &[f32], min_lag: usize, max_lag: usize) -> Option<usize> {
    let mut best: Option<usize> = None;
    let mut best_corr = 0.0f64;

    let mut lag = min_lag;
    while lag <= max_lag {
        let span = CORR_WINDOW.min(frame.len() - lag);
        let mut corr = 0.0f64;
        for j in 0..span {
            corr += frame[j] as f64 * frame[j + lag] as f64;
        }
        if corr > best_corr {
            best_corr = corr;
            best = Some(lag);
        }
        lag += LAG_STEP;
    }
    best
}
