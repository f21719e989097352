//! End-to-end enrollment and verification tests over synthetic voices.

use crate::*;
use async_trait::async_trait;
use std::f64::consts::PI;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use voicegate_verify::EnrollmentLevel;

const SAMPLE_RATE: u32 = 16000;
/// Synthetic recordings are 3 seconds of audio regardless of capture time.
const TONE_SECONDS: f64 = 3.0;

/// A synthetic voice: a sine fundamental with optional deterministic noise.
#[derive(Clone, Copy)]
struct Tone {
    freq_hz: f64,
    amplitude: f64,
    noise: f64,
}

fn voice(freq_hz: f64) -> Tone {
    Tone {
        freq_hz,
        amplitude: 0.5,
        noise: 0.02,
    }
}

/// PCM16LE tone generator with a NumPy-style LCG for repeatable noise.
fn tone_pcm(tone: Tone, seed: u64) -> Vec<u8> {
    let n = (TONE_SECONDS * SAMPLE_RATE as f64) as usize;
    let mut state = seed
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    let mut data = Vec::with_capacity(n * 2);
    for i in 0..n {
        let t = i as f64 / SAMPLE_RATE as f64;
        let mut v = tone.amplitude * (tone.freq_hz * 2.0 * PI * t).sin();
        if tone.noise > 0.0 {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let r = (state >> 33) as f64 / (1u64 << 30) as f64 - 1.0;
            v += tone.noise * r;
        }
        let s = (v.clamp(-1.0, 1.0) * 32767.0) as i16;
        data.push(s as u8);
        data.push((s >> 8) as u8);
    }
    data
}

/// Capture fixture that "records" the next tone from its plan on each start.
struct ToneCapture {
    plan: Vec<Tone>,
    next: AtomicUsize,
}

impl ToneCapture {
    fn new(plan: Vec<Tone>) -> Self {
        Self {
            plan,
            next: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl AudioCapture for ToneCapture {
    async fn start(&self) -> Result<Box<dyn CaptureStream>, CaptureError> {
        let i = self.next.fetch_add(1, Ordering::SeqCst);
        let tone = self.plan[i % self.plan.len()];
        Ok(Box::new(ToneStream {
            blob: AudioBlob {
                data: tone_pcm(tone, i as u64 + 1),
                mime: "audio/pcm;rate=16000".into(),
            },
        }))
    }
}

struct ToneStream {
    blob: AudioBlob,
}

#[async_trait]
impl CaptureStream for ToneStream {
    async fn stop(self: Box<Self>) -> Result<AudioBlob, CaptureError> {
        Ok(self.blob)
    }

    async fn abort(self: Box<Self>) {}
}

/// Capture fixture whose microphone is always denied.
struct DeniedCapture;

#[async_trait]
impl AudioCapture for DeniedCapture {
    async fn start(&self) -> Result<Box<dyn CaptureStream>, CaptureError> {
        Err(CaptureError::PermissionDenied)
    }
}

/// Capture fixture that records nothing at all.
struct EmptyCapture;

#[async_trait]
impl AudioCapture for EmptyCapture {
    async fn start(&self) -> Result<Box<dyn CaptureStream>, CaptureError> {
        Ok(Box::new(ToneStream {
            blob: AudioBlob {
                data: vec![],
                mime: "audio/pcm;rate=16000".into(),
            },
        }))
    }
}

fn tone_session(plan: Vec<Tone>) -> EnrollmentSession {
    EnrollmentSession::new(
        "user-1",
        Arc::new(ToneCapture::new(plan)),
        Arc::new(RawPcmDecoder::default()),
        Extractor::sync(),
    )
}

/// Records the current phrase, stopping the capture after `secs` of
/// (virtual) time.
async fn record_stopped_after(session: &mut EnrollmentSession, secs: u64) -> Result<(), EnrollError> {
    let handle = session.stop_handle();
    let (res, _) = tokio::join!(session.record_phrase(), async move {
        tokio::time::sleep(Duration::from_secs(secs)).await;
        handle.stop();
    });
    res.map(|_| ())
}

#[tokio::test]
async fn phrase_count_contract() {
    let mut session = tone_session(vec![voice(150.0)]);
    session.start_enrollment(EnrollmentLevel::Standard, "en").unwrap();
    assert_eq!(session.phrases().len(), 6);
    session.cancel_enrollment();

    session.start_enrollment(EnrollmentLevel::Advanced, "en").unwrap();
    assert_eq!(session.phrases().len(), 12);
    assert_eq!(session.phrase_index(), 0);
    assert!(session.current_phrase().is_some());
}

#[tokio::test]
async fn record_before_start_is_invalid() {
    let mut session = tone_session(vec![voice(150.0)]);
    assert!(matches!(
        session.record_phrase().await,
        Err(EnrollError::InvalidState { .. })
    ));
    assert_eq!(session.state(), SessionState::Idle);
}

#[tokio::test(start_paused = true)]
async fn auto_stop_completes_the_recording() {
    let mut session = tone_session(vec![voice(150.0)]);
    session.start_enrollment(EnrollmentLevel::Standard, "en").unwrap();

    // Never call stop: the recording must end on its own at the cap.
    let sample = session.record_phrase().await.unwrap();
    assert_eq!(sample.duration_ms, 15_000);
    assert_eq!(sample.phrase_index, 0);
    assert_eq!(session.state(), SessionState::Enrolling);
    assert_eq!(session.samples().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn manual_stop_ends_the_recording_early() {
    let mut session = tone_session(vec![voice(150.0)]);
    session.start_enrollment(EnrollmentLevel::Standard, "en").unwrap();

    record_stopped_after(&mut session, 2).await.unwrap();
    let sample = &session.samples()[0];
    assert!(
        (2000..2100).contains(&sample.duration_ms),
        "duration {} should be ~2000ms",
        sample.duration_ms
    );
    // 3s of clean voiced audio at full duration: no quality penalties.
    assert_eq!(sample.quality_score, 1.0);
}

#[tokio::test(start_paused = true)]
async fn retry_clears_exactly_one_sample() {
    let mut session = tone_session(vec![voice(150.0)]);
    session.start_enrollment(EnrollmentLevel::Standard, "en").unwrap();

    record_stopped_after(&mut session, 3).await.unwrap();
    session.skip_phrase().unwrap();
    record_stopped_after(&mut session, 3).await.unwrap();
    assert_eq!(session.samples().len(), 2);

    session.retry_phrase().unwrap();
    assert_eq!(session.samples().len(), 1);
    assert_eq!(session.samples()[0].phrase_index, 0, "phrase 0 untouched");
    assert_eq!(session.phrase_index(), 1, "cursor does not move");
    assert_eq!(session.state(), SessionState::Enrolling);
}

#[tokio::test]
async fn skip_stops_at_the_last_phrase() {
    let mut session = tone_session(vec![voice(150.0)]);
    session.start_enrollment(EnrollmentLevel::Standard, "en").unwrap();

    for _ in 0..5 {
        session.skip_phrase().unwrap();
    }
    assert_eq!(session.phrase_index(), 5);
    assert!(matches!(session.skip_phrase(), Err(EnrollError::LastPhrase)));
    assert_eq!(session.phrase_index(), 5);
}

#[tokio::test]
async fn complete_without_samples_keeps_enrolling() {
    let mut session = tone_session(vec![voice(150.0)]);
    session.start_enrollment(EnrollmentLevel::Standard, "en").unwrap();

    assert!(matches!(
        session.complete_enrollment(),
        Err(EnrollError::NoSamples)
    ));
    assert_eq!(session.state(), SessionState::Enrolling);
}

#[tokio::test(start_paused = true)]
async fn complete_builds_an_enabled_profile() {
    let mut session = tone_session(vec![voice(150.0), voice(220.0)]);
    session.start_enrollment(EnrollmentLevel::Standard, "en").unwrap();

    record_stopped_after(&mut session, 3).await.unwrap();
    session.skip_phrase().unwrap();
    record_stopped_after(&mut session, 3).await.unwrap();

    let outcome = session.complete_enrollment().unwrap();
    assert!(outcome.profile.is_enabled);
    assert!(outcome.profile.voice_features.is_some());
    assert!(outcome.profile.enrolled_at.is_some());
    assert_eq!(outcome.profile.enrollment_phrases_count, 2);
    assert_eq!(outcome.samples.len(), 2);
    assert_eq!(session.state(), SessionState::Idle);
    assert!(session.samples().is_empty(), "samples transfer to the outcome");
}

#[tokio::test(start_paused = true)]
async fn cancel_mid_recording_appends_nothing() {
    let mut session = tone_session(vec![voice(150.0)]);
    session.start_enrollment(EnrollmentLevel::Standard, "en").unwrap();

    let cancel = session.cancel_handle();
    let (res, _) = tokio::join!(session.record_phrase(), async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        cancel.cancel();
    });
    assert!(matches!(res, Err(EnrollError::Cancelled)));
    assert_eq!(session.state(), SessionState::Idle);
    assert!(session.samples().is_empty());
}

#[tokio::test]
async fn permission_denied_keeps_the_session_open() {
    let mut session = EnrollmentSession::new(
        "user-1",
        Arc::new(DeniedCapture),
        Arc::new(RawPcmDecoder::default()),
        Extractor::sync(),
    );
    session.start_enrollment(EnrollmentLevel::Standard, "en").unwrap();

    for _ in 0..2 {
        let err = session.record_phrase().await.unwrap_err();
        assert!(matches!(
            err,
            EnrollError::Capture(CaptureError::PermissionDenied)
        ));
        assert_eq!(session.state(), SessionState::Enrolling, "retryable, not lost");
    }
}

#[tokio::test(start_paused = true)]
async fn decode_failure_discards_only_this_sample() {
    let mut session = EnrollmentSession::new(
        "user-1",
        Arc::new(EmptyCapture),
        Arc::new(RawPcmDecoder::default()),
        Extractor::sync(),
    );
    session.start_enrollment(EnrollmentLevel::Standard, "en").unwrap();

    let err = session.record_phrase().await.unwrap_err();
    assert!(matches!(err, EnrollError::Decode(DecodeError::EmptyAudio)));
    assert_eq!(session.state(), SessionState::Enrolling);
    assert!(session.samples().is_empty());
}

#[tokio::test(start_paused = true)]
async fn background_extractor_records_identically() {
    let plan = vec![voice(150.0)];
    let mut inline = tone_session(plan.clone());
    inline.start_enrollment(EnrollmentLevel::Standard, "en").unwrap();
    record_stopped_after(&mut inline, 3).await.unwrap();

    let mut background = EnrollmentSession::new(
        "user-1",
        Arc::new(ToneCapture::new(plan)),
        Arc::new(RawPcmDecoder::default()),
        Extractor::spawn(),
    );
    background.start_enrollment(EnrollmentLevel::Standard, "en").unwrap();
    record_stopped_after(&mut background, 3).await.unwrap();

    assert_eq!(
        inline.samples()[0].features,
        background.samples()[0].features,
        "worker and in-process extraction must agree"
    );
}

#[tokio::test(start_paused = true)]
async fn end_to_end_enroll_then_verify() {
    let store = Arc::new(MemoryProfileStore::new());
    // Six enrollment recordings alternating two fundamentals of the same
    // synthetic speaker, then 150Hz probes for every later verification.
    let plan = vec![
        voice(150.0),
        voice(220.0),
        voice(150.0),
        voice(220.0),
        voice(150.0),
        voice(220.0),
        voice(150.0),
    ];
    let gate = VoiceGate::new(
        store.clone(),
        Arc::new(ToneCapture::new(plan)),
        Arc::new(RawPcmDecoder::default()),
        Extractor::sync(),
    );

    let mut session = gate
        .begin_enrollment("user-1", EnrollmentLevel::Standard, "en")
        .unwrap();
    assert_eq!(session.state(), SessionState::Enrolling);
    for i in 0..6 {
        record_stopped_after(&mut session, 3).await.unwrap();
        if i < 5 {
            session.skip_phrase().unwrap();
        }
    }
    let profile = gate.finish_enrollment(&mut session).await.unwrap();
    assert_eq!(profile.enrollment_phrases_count, 6);
    assert!(profile.is_verifiable());
    assert_eq!(profile.noise_threshold, 0.65);
    assert_eq!(store.samples("user-1").await.len(), 6);

    let genuine = gate
        .verify_user("user-1", Duration::from_secs(2))
        .await
        .unwrap()
        .expect("gating active");
    assert!(
        genuine.is_match,
        "same synthetic voice should pass at 0.65, got {genuine:?}"
    );

    // A markedly different synthetic voice: higher fundamental, quieter,
    // and much noisier spectral shape.
    let impostor_gate = VoiceGate::new(
        store.clone(),
        Arc::new(ToneCapture::new(vec![Tone {
            freq_hz: 280.0,
            amplitude: 0.12,
            noise: 0.1,
        }])),
        Arc::new(RawPcmDecoder::default()),
        Extractor::sync(),
    );
    let impostor = impostor_gate
        .verify_user("user-1", Duration::from_secs(2))
        .await
        .unwrap()
        .expect("gating active");
    assert!(
        impostor.match_score + 0.05 < genuine.match_score,
        "impostor {:.3} should score materially below genuine {:.3}",
        impostor.match_score,
        genuine.match_score
    );
}

#[tokio::test(start_paused = true)]
async fn gating_is_inactive_without_a_usable_profile() {
    let store = Arc::new(MemoryProfileStore::new());
    let gate = VoiceGate::new(
        store.clone(),
        Arc::new(ToneCapture::new(vec![voice(150.0)])),
        Arc::new(RawPcmDecoder::default()),
        Extractor::sync(),
    );

    // No profile at all.
    assert!(gate
        .verify_user("user-1", Duration::from_secs(2))
        .await
        .unwrap()
        .is_none());

    // Enroll, then disable: verification must not be attempted.
    let mut session = gate
        .begin_enrollment("user-1", EnrollmentLevel::Standard, "en")
        .unwrap();
    record_stopped_after(&mut session, 3).await.unwrap();
    gate.finish_enrollment(&mut session).await.unwrap();
    gate.set_enabled("user-1", false).await.unwrap();
    assert!(gate
        .verify_user("user-1", Duration::from_secs(2))
        .await
        .unwrap()
        .is_none());

    // Deleted: inactive again.
    gate.set_enabled("user-1", true).await.unwrap();
    gate.delete_profile("user-1").await.unwrap();
    assert!(gate
        .verify_user("user-1", Duration::from_secs(2))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test(start_paused = true)]
async fn gate_session_config_reaches_the_recording_loop() {
    let store = Arc::new(MemoryProfileStore::new());
    let gate = VoiceGate::new(
        store,
        Arc::new(ToneCapture::new(vec![voice(150.0)])),
        Arc::new(RawPcmDecoder::default()),
        Extractor::sync(),
    );

    let config = SessionConfig {
        auto_stop: Duration::from_secs(5),
        ..SessionConfig::default()
    };
    let mut session = gate
        .begin_enrollment_with_config("user-1", EnrollmentLevel::Standard, "en", config)
        .unwrap();

    // Never call stop: the shortened cap must end the recording.
    let sample = session.record_phrase().await.unwrap();
    assert_eq!(sample.duration_ms, 5_000);
}

#[tokio::test(start_paused = true)]
async fn threshold_updates_clamp_and_survive_reenrollment() {
    let store = Arc::new(MemoryProfileStore::new());
    let gate = VoiceGate::new(
        store.clone(),
        Arc::new(ToneCapture::new(vec![voice(150.0)])),
        Arc::new(RawPcmDecoder::default()),
        Extractor::sync(),
    );

    let mut session = gate
        .begin_enrollment("user-1", EnrollmentLevel::Standard, "en")
        .unwrap();
    record_stopped_after(&mut session, 3).await.unwrap();
    let first = gate.finish_enrollment(&mut session).await.unwrap();

    let updated = gate.set_noise_threshold("user-1", 0.95).await.unwrap();
    assert_eq!(updated.noise_threshold, 0.9, "clamped to the allowed band");

    // Re-enroll: reference fingerprint replaced, tuned threshold kept.
    let mut session = gate
        .begin_enrollment("user-1", EnrollmentLevel::Standard, "en")
        .unwrap();
    record_stopped_after(&mut session, 3).await.unwrap();
    let second = gate.finish_enrollment(&mut session).await.unwrap();
    assert_eq!(second.noise_threshold, 0.9);
    assert!(second.enrolled_at >= first.enrolled_at);

    assert!(matches!(
        gate.set_noise_threshold("ghost", 0.7).await,
        Err(EnrollError::NoProfile(_))
    ));
}
