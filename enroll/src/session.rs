use crate::capture::{AudioCapture, AudioDecoder};
use crate::error::EnrollError;
use crate::extractor::Extractor;
use crate::phrases::phrases_for;
use crate::sample::EnrollmentSample;
use crate::state::SessionState;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use voicegate_features::quality_score;
use voicegate_verify::{aggregate, EnrollmentLevel, VoiceProfile};

/// Tunables for an enrollment session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Hard recording cap. A recording that is never stopped explicitly
    /// ends on its own at this limit. Default: 15s.
    pub auto_stop: Duration,
    /// Fraction of the configured phrase count below which completion logs
    /// a warning. Policy, not a hard gate. Default: 0.7.
    pub completion_warn_ratio: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            auto_stop: Duration::from_secs(15),
            completion_warn_ratio: 0.7,
        }
    }
}

/// What a successful enrollment produces: the finished profile and the
/// samples that were aggregated into it (for optional audit persistence).
#[derive(Debug)]
pub struct EnrollmentOutcome {
    pub profile: VoiceProfile,
    pub samples: Vec<EnrollmentSample>,
}

/// Stops the recording that is currently in flight, if any.
///
/// Obtained from [`EnrollmentSession::stop_handle`] before awaiting
/// [`EnrollmentSession::record_phrase`]; a stop sent while no recording is
/// active is ignored.
#[derive(Clone)]
pub struct StopHandle {
    tx: Arc<watch::Sender<()>>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.tx.send_replace(());
    }
}

/// Cancels the whole session from another task, even mid-recording.
#[derive(Clone)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.token.cancel();
    }
}

/// Drives one user's voice enrollment: record N phrases, score each, allow
/// retry/skip, and finalize into a [`VoiceProfile`].
///
/// The session owns every mutable resource it uses (capture stream while
/// recording, stop/cancel channels, worker handle); there is no ambient
/// state. Call [`close`](Self::close) to tear everything down explicitly.
pub struct EnrollmentSession {
    user_id: String,
    state: SessionState,
    level: EnrollmentLevel,
    language: String,
    phrases: Vec<String>,
    phrase_index: usize,
    samples: Vec<EnrollmentSample>,
    capture: Arc<dyn AudioCapture>,
    decoder: Arc<dyn AudioDecoder>,
    extractor: Extractor,
    stop_tx: Arc<watch::Sender<()>>,
    cancel: CancellationToken,
    config: SessionConfig,
}

impl EnrollmentSession {
    pub fn new(
        user_id: impl Into<String>,
        capture: Arc<dyn AudioCapture>,
        decoder: Arc<dyn AudioDecoder>,
        extractor: Extractor,
    ) -> Self {
        Self::with_config(user_id, capture, decoder, extractor, SessionConfig::default())
    }

    pub fn with_config(
        user_id: impl Into<String>,
        capture: Arc<dyn AudioCapture>,
        decoder: Arc<dyn AudioDecoder>,
        extractor: Extractor,
        config: SessionConfig,
    ) -> Self {
        let (stop_tx, _) = watch::channel(());
        Self {
            user_id: user_id.into(),
            state: SessionState::Idle,
            level: EnrollmentLevel::Standard,
            language: String::new(),
            phrases: Vec::new(),
            phrase_index: 0,
            samples: Vec::new(),
            capture,
            decoder,
            extractor,
            stop_tx: Arc::new(stop_tx),
            cancel: CancellationToken::new(),
            config,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn level(&self) -> EnrollmentLevel {
        self.level
    }

    /// Phrase list selected by [`start_enrollment`](Self::start_enrollment).
    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    pub fn phrase_index(&self) -> usize {
        self.phrase_index
    }

    /// The phrase the user is currently asked to read.
    pub fn current_phrase(&self) -> Option<&str> {
        self.phrases.get(self.phrase_index).map(String::as_str)
    }

    pub fn samples(&self) -> &[EnrollmentSample] {
        &self.samples
    }

    /// `(collected, required)` sample counts.
    pub fn progress(&self) -> (usize, usize) {
        (self.samples.len(), self.phrases.len())
    }

    /// Handle that stops an in-flight recording from another task.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            tx: self.stop_tx.clone(),
        }
    }

    /// Handle that cancels the session from another task.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            token: self.cancel.clone(),
        }
    }

    /// Begins a fresh enrollment: resets the phrase cursor and collected
    /// samples and selects the phrase list for `level` and `language`.
    pub fn start_enrollment(
        &mut self,
        level: EnrollmentLevel,
        language: &str,
    ) -> Result<(), EnrollError> {
        if self.state != SessionState::Idle {
            return Err(EnrollError::InvalidState {
                expected: SessionState::Idle.as_str(),
                got: self.state.as_str(),
            });
        }
        self.level = level;
        self.language = language.to_string();
        self.phrases = phrases_for(level, language);
        self.phrase_index = 0;
        self.samples.clear();
        self.cancel = CancellationToken::new();
        self.state = SessionState::Enrolling;
        info!(user = %self.user_id, level = %level, language, phrases = self.phrases.len(), "enrollment started");
        Ok(())
    }

    /// Records one phrase: acquires the microphone, captures until an
    /// explicit stop, the auto-stop cap, or cancellation, then decodes,
    /// extracts, and scores the sample for the current phrase index.
    ///
    /// The capture stream is released on every exit path. Capture and
    /// decode failures return the session to `enrolling` with the phrase
    /// still pending; only a successful pass appends a sample.
    pub async fn record_phrase(&mut self) -> Result<&EnrollmentSample, EnrollError> {
        if self.state.is_busy() {
            return Err(EnrollError::AlreadyRecording);
        }
        if !self.state.can_record() {
            return Err(EnrollError::InvalidState {
                expected: SessionState::Enrolling.as_str(),
                got: self.state.as_str(),
            });
        }

        // Subscribe before flipping state so only stops sent while this
        // recording is live are observed.
        let mut stop_rx = self.stop_tx.subscribe();
        let auto_stop = self.config.auto_stop;
        self.state = SessionState::Recording;

        let stream = match self.capture.start().await {
            Ok(s) => s,
            Err(e) => {
                self.state = SessionState::Enrolling;
                return Err(e.into());
            }
        };
        info!(user = %self.user_id, phrase = self.phrase_index, "recording started");
        let started = tokio::time::Instant::now();

        let cancelled = tokio::select! {
            _ = stop_rx.changed() => false,
            _ = tokio::time::sleep(auto_stop) => {
                info!(limit_ms = auto_stop.as_millis() as u64, "recording reached auto-stop limit");
                false
            }
            _ = self.cancel.cancelled() => true,
        };

        if cancelled {
            stream.abort().await;
            self.reset_to_idle();
            return Err(EnrollError::Cancelled);
        }

        let blob = match stream.stop().await {
            Ok(b) => b,
            Err(e) => {
                self.state = SessionState::Enrolling;
                return Err(e.into());
            }
        };
        let duration_ms = started.elapsed().as_millis() as u64;

        self.state = SessionState::Processing;
        let decoded = match self.decoder.decode(&blob) {
            Ok(d) => d,
            Err(e) => {
                self.state = SessionState::Enrolling;
                return Err(e.into());
            }
        };
        let features = self.extractor.extract(&decoded.samples, decoded.sample_rate).await;

        // A cancel that raced the extraction must not append a sample.
        if self.cancel.is_cancelled() {
            self.reset_to_idle();
            return Err(EnrollError::Cancelled);
        }

        let sample = EnrollmentSample {
            phrase_index: self.phrase_index,
            phrase_text: self.current_phrase().unwrap_or_default().to_string(),
            quality_score: quality_score(&features, duration_ms),
            features,
            duration_ms,
            sample_rate: decoded.sample_rate,
        };
        info!(
            user = %self.user_id,
            phrase = sample.phrase_index,
            duration_ms,
            quality = sample.quality_score,
            "sample collected"
        );
        self.samples.push(sample);
        self.state = SessionState::Enrolling;
        Ok(self.samples.last().expect("sample just pushed"))
    }

    /// Discards the sample recorded for the current phrase so it can be
    /// re-recorded. Samples at other indices are untouched; the cursor and
    /// session state do not change.
    pub fn retry_phrase(&mut self) -> Result<(), EnrollError> {
        if !self.state.can_record() {
            return Err(EnrollError::InvalidState {
                expected: SessionState::Enrolling.as_str(),
                got: self.state.as_str(),
            });
        }
        let index = self.phrase_index;
        self.samples.retain(|s| s.phrase_index != index);
        Ok(())
    }

    /// Advances to the next phrase without requiring a sample for the
    /// current one. Errors at the last phrase.
    pub fn skip_phrase(&mut self) -> Result<(), EnrollError> {
        if !self.state.can_record() {
            return Err(EnrollError::InvalidState {
                expected: SessionState::Enrolling.as_str(),
                got: self.state.as_str(),
            });
        }
        if self.phrase_index + 1 >= self.phrases.len() {
            return Err(EnrollError::LastPhrase);
        }
        self.phrase_index += 1;
        Ok(())
    }

    /// Aggregates the collected samples into a reference fingerprint and
    /// finishes the session.
    ///
    /// Requires at least one sample; failing that the session stays in
    /// `enrolling`. Completing with fewer samples than the recommended
    /// share of the phrase list logs a warning but proceeds. On success the
    /// session returns to `Idle` with its samples transferred into the
    /// outcome.
    pub fn complete_enrollment(&mut self) -> Result<EnrollmentOutcome, EnrollError> {
        if !self.state.can_record() {
            return Err(EnrollError::InvalidState {
                expected: SessionState::Enrolling.as_str(),
                got: self.state.as_str(),
            });
        }
        if self.samples.is_empty() {
            return Err(EnrollError::NoSamples);
        }
        self.state = SessionState::Completing;

        let required = self.phrases.len();
        let recommended = (required as f64 * self.config.completion_warn_ratio).ceil() as usize;
        if self.samples.len() < recommended {
            warn!(
                user = %self.user_id,
                collected = self.samples.len(),
                required,
                "completing enrollment below the recommended sample count"
            );
        }

        let fingerprints: Vec<_> = self.samples.iter().map(|s| s.features.clone()).collect();
        let reference = match aggregate(&fingerprints) {
            Ok(r) => r,
            Err(e) => {
                self.state = SessionState::Enrolling;
                return Err(e.into());
            }
        };

        let mut profile = VoiceProfile::new(self.user_id.clone(), self.level);
        profile.voice_features = Some(reference);
        profile.enrollment_phrases_count = self.samples.len();
        profile.enrolled_at = Some(Utc::now());
        profile.is_enabled = true;

        let samples = std::mem::take(&mut self.samples);
        self.phrase_index = 0;
        self.state = SessionState::Idle;
        info!(user = %self.user_id, samples = samples.len(), "enrollment completed");
        Ok(EnrollmentOutcome { profile, samples })
    }

    /// Abandons the session from any state, discarding all collected
    /// samples. An in-flight recording (driven by a concurrently awaited
    /// `record_phrase`) is stopped and discarded via the cancel token.
    pub fn cancel_enrollment(&mut self) {
        self.cancel.cancel();
        self.reset_to_idle();
        info!(user = %self.user_id, "enrollment cancelled");
    }

    /// Explicit teardown: cancels any in-flight work and detaches from the
    /// extraction worker.
    pub fn close(&mut self) {
        self.cancel.cancel();
        self.extractor.close();
        self.reset_to_idle();
    }

    fn reset_to_idle(&mut self) {
        self.samples.clear();
        self.phrase_index = 0;
        self.state = SessionState::Idle;
    }
}
