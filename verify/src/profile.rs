use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use voicegate_features::VoiceFeatures;

/// Bounds for the match-acceptance sensitivity. Values outside are clamped.
pub const MIN_NOISE_THRESHOLD: f64 = 0.4;
pub const MAX_NOISE_THRESHOLD: f64 = 0.9;

const DEFAULT_NOISE_THRESHOLD: f64 = 0.65;

/// How many phrases an enrollment requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EnrollmentLevel {
    #[default]
    Standard,
    Advanced,
}

impl EnrollmentLevel {
    /// Number of phrases the level requires.
    pub fn phrase_count(&self) -> usize {
        match self {
            EnrollmentLevel::Standard => 6,
            EnrollmentLevel::Advanced => 12,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentLevel::Standard => "standard",
            EnrollmentLevel::Advanced => "advanced",
        }
    }

    /// Parses a level from its persisted string form. Unknown values fall
    /// back to `Standard`.
    pub fn from_str(s: &str) -> Self {
        match s {
            "advanced" => EnrollmentLevel::Advanced,
            _ => EnrollmentLevel::Standard,
        }
    }
}

impl fmt::Display for EnrollmentLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for EnrollmentLevel {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EnrollmentLevel {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(EnrollmentLevel::from_str(&s))
    }
}

/// The enrolled speaker reference, owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceProfile {
    /// Opaque owner id supplied by the authentication collaborator.
    pub user_id: String,

    /// Enrollment depth the profile was built with.
    pub enrollment_level: EnrollmentLevel,

    /// Number of samples actually aggregated into the reference.
    pub enrollment_phrases_count: usize,

    /// Aggregated reference fingerprint. `None` until enrollment completes.
    pub voice_features: Option<VoiceFeatures>,

    /// Match-acceptance sensitivity in `[0.4, 0.9]`.
    pub noise_threshold: f64,

    /// Gates whether verification is consulted at all.
    pub is_enabled: bool,

    /// When enrollment completed, `None` for a never-completed profile.
    pub enrolled_at: Option<DateTime<Utc>>,
}

impl VoiceProfile {
    /// A fresh, un-enrolled profile for `user_id`.
    pub fn new(user_id: impl Into<String>, level: EnrollmentLevel) -> Self {
        Self {
            user_id: user_id.into(),
            enrollment_level: level,
            enrollment_phrases_count: 0,
            voice_features: None,
            noise_threshold: DEFAULT_NOISE_THRESHOLD,
            is_enabled: false,
            enrolled_at: None,
        }
    }

    /// Sets the sensitivity threshold, clamped to the allowed band.
    pub fn set_noise_threshold(&mut self, threshold: f64) {
        self.noise_threshold = threshold.clamp(MIN_NOISE_THRESHOLD, MAX_NOISE_THRESHOLD);
    }

    /// True when verification may be attempted against this profile.
    /// Callers must fall through to an alternate authorization path when
    /// this is false; the verifier itself is never invoked on an
    /// unverifiable profile.
    pub fn is_verifiable(&self) -> bool {
        self.is_enabled && self.voice_features.is_some()
    }
}
