use thiserror::Error;
use voicegate_verify::VerifyError;

/// Errors from the audio capture collaborator.
///
/// All of these are user-actionable: the enrollment session stays open and
/// returns to the `enrolling` state so the phrase can be retried.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("microphone permission denied")]
    PermissionDenied,

    #[error("audio capture device unavailable")]
    DeviceUnavailable,

    #[error("recording aborted by platform: {0}")]
    Aborted(String),
}

/// Errors from decoding a captured audio blob.
///
/// Decode failures discard the affected sample only; they never substitute
/// a zeroed fingerprint into the profile.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("audio blob is empty")]
    EmptyAudio,

    #[error("malformed audio blob: {0}")]
    Malformed(String),
}

/// Errors from the persistence collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("profile store backend: {0}")]
    Backend(String),
}

/// Errors surfaced by enrollment and verification operations.
///
/// None of these are fatal: every failure path leaves the session in a
/// well-defined, continuable state.
#[derive(Debug, Error)]
pub enum EnrollError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Verify(#[from] VerifyError),

    #[error("invalid session state: expected {expected}, got {got}")]
    InvalidState {
        expected: &'static str,
        got: &'static str,
    },

    #[error("a recording is already in progress")]
    AlreadyRecording,

    #[error("no samples collected")]
    NoSamples,

    #[error("already at the last phrase")]
    LastPhrase,

    #[error("enrollment cancelled")]
    Cancelled,

    #[error("no voice profile for user {0}")]
    NoProfile(String),
}
