use crate::capture::{AudioCapture, AudioDecoder};
use crate::error::EnrollError;
use crate::extractor::Extractor;
use crate::session::{EnrollmentSession, SessionConfig};
use crate::store::ProfileStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use voicegate_verify::{verify, EnrollmentLevel, VerificationResult, VoiceProfile};

/// Front door for voice-gated command input: enrollment, live verification,
/// and profile maintenance for the single profile each user owns.
pub struct VoiceGate {
    store: Arc<dyn ProfileStore>,
    capture: Arc<dyn AudioCapture>,
    decoder: Arc<dyn AudioDecoder>,
    extractor: Extractor,
}

impl VoiceGate {
    pub fn new(
        store: Arc<dyn ProfileStore>,
        capture: Arc<dyn AudioCapture>,
        decoder: Arc<dyn AudioDecoder>,
        extractor: Extractor,
    ) -> Self {
        Self {
            store,
            capture,
            decoder,
            extractor,
        }
    }

    /// Creates an enrollment session for `user_id`, already in the
    /// `enrolling` state. One logical session per user at a time is the
    /// caller's contract.
    pub fn begin_enrollment(
        &self,
        user_id: &str,
        level: EnrollmentLevel,
        language: &str,
    ) -> Result<EnrollmentSession, EnrollError> {
        self.begin_enrollment_with_config(user_id, level, language, SessionConfig::default())
    }

    /// [`begin_enrollment`](Self::begin_enrollment) with explicit session
    /// tunables (auto-stop cap, completion warning ratio).
    pub fn begin_enrollment_with_config(
        &self,
        user_id: &str,
        level: EnrollmentLevel,
        language: &str,
        config: SessionConfig,
    ) -> Result<EnrollmentSession, EnrollError> {
        let mut session = EnrollmentSession::with_config(
            user_id,
            self.capture.clone(),
            self.decoder.clone(),
            self.extractor.clone(),
            config,
        );
        session.start_enrollment(level, language)?;
        Ok(session)
    }

    /// Completes a session and persists the resulting profile and samples.
    ///
    /// Re-enrollment keeps the user's tuned sensitivity threshold; the
    /// reference fingerprint and sample set are replaced atomically.
    pub async fn finish_enrollment(
        &self,
        session: &mut EnrollmentSession,
    ) -> Result<VoiceProfile, EnrollError> {
        let outcome = session.complete_enrollment()?;
        let mut profile = outcome.profile;

        if let Some(existing) = self.store.fetch(&profile.user_id).await? {
            profile.noise_threshold = existing.noise_threshold;
        }
        self.store.upsert(&profile).await?;
        self.store
            .replace_samples(&profile.user_id, &outcome.samples)
            .await?;
        Ok(profile)
    }

    /// Captures a short utterance and verifies it against the user's
    /// enrolled profile at the profile's sensitivity threshold.
    ///
    /// Returns `Ok(None)` when voice gating is inactive for this user --
    /// no profile, profile disabled, or enrollment never completed -- so
    /// the caller falls through to its alternate authorization path.
    pub async fn verify_user(
        &self,
        user_id: &str,
        max_capture: Duration,
    ) -> Result<Option<VerificationResult>, EnrollError> {
        let Some(profile) = self.store.fetch(user_id).await? else {
            debug!(user = user_id, "no voice profile, gating inactive");
            return Ok(None);
        };
        if !profile.is_verifiable() {
            debug!(user = user_id, "profile disabled or not enrolled, gating inactive");
            return Ok(None);
        }
        let Some(reference) = profile.voice_features.as_ref() else {
            return Ok(None);
        };

        let stream = self.capture.start().await?;
        tokio::time::sleep(max_capture).await;
        let blob = stream.stop().await?;

        let decoded = self.decoder.decode(&blob)?;
        let features = self
            .extractor
            .extract(&decoded.samples, decoded.sample_rate)
            .await;

        let result = verify(&features, reference, profile.noise_threshold);
        info!(
            user = user_id,
            is_match = result.is_match,
            score = result.match_score,
            threshold = result.threshold,
            "verification decided"
        );
        Ok(Some(result))
    }

    /// Updates the match-acceptance sensitivity, clamped to `[0.4, 0.9]`.
    pub async fn set_noise_threshold(
        &self,
        user_id: &str,
        threshold: f64,
    ) -> Result<VoiceProfile, EnrollError> {
        let mut profile = self.require_profile(user_id).await?;
        profile.set_noise_threshold(threshold);
        self.store.upsert(&profile).await?;
        Ok(profile)
    }

    /// Enables or disables voice gating without touching the enrollment.
    pub async fn set_enabled(
        &self,
        user_id: &str,
        enabled: bool,
    ) -> Result<VoiceProfile, EnrollError> {
        let mut profile = self.require_profile(user_id).await?;
        profile.is_enabled = enabled;
        self.store.upsert(&profile).await?;
        Ok(profile)
    }

    /// Removes the user's profile and stored samples.
    pub async fn delete_profile(&self, user_id: &str) -> Result<(), EnrollError> {
        self.store.delete(user_id).await?;
        info!(user = user_id, "voice profile deleted");
        Ok(())
    }

    async fn require_profile(&self, user_id: &str) -> Result<VoiceProfile, EnrollError> {
        self.store
            .fetch(user_id)
            .await?
            .ok_or_else(|| EnrollError::NoProfile(user_id.to_string()))
    }
}
