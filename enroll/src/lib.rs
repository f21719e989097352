//! Voice enrollment session state machine and live verification service.
//!
//! # Architecture
//!
//! ```text
//! microphone -> AudioCapture -> AudioBlob -> AudioDecoder -> PCM samples
//!            -> Extractor (worker task or in-process) -> VoiceFeatures
//!            -> EnrollmentSession (collects N scored samples)
//!            -> aggregate -> VoiceProfile -> ProfileStore
//! ```
//!
//! At runtime, [`VoiceGate::verify_user`] captures a short utterance,
//! extracts its fingerprint, and compares it against the stored reference
//! at the profile's sensitivity threshold. A missing, disabled, or
//! un-enrolled profile means voice gating is inactive and the caller falls
//! through to its alternate authorization path.
//!
//! # Collaborators
//!
//! The microphone, codec, and database are trait boundaries
//! ([`AudioCapture`], [`AudioDecoder`], [`ProfileStore`]); the core never
//! touches a device or a wire format directly. [`RawPcmDecoder`] and
//! [`MemoryProfileStore`] are provided for tests and the demo binary.

mod capture;
mod error;
mod extractor;
mod gate;
mod phrases;
mod sample;
mod session;
mod state;
mod store;

pub use capture::{AudioBlob, AudioCapture, AudioDecoder, CaptureStream, DecodedAudio, RawPcmDecoder};
pub use error::{CaptureError, DecodeError, EnrollError, StoreError};
pub use extractor::Extractor;
pub use gate::VoiceGate;
pub use phrases::phrases_for;
pub use sample::EnrollmentSample;
pub use session::{CancelHandle, EnrollmentOutcome, EnrollmentSession, SessionConfig, StopHandle};
pub use state::SessionState;
pub use store::{MemoryProfileStore, ProfileStore};

#[cfg(test)]
mod tests;
