use crate::error::StoreError;
use crate::sample::EnrollmentSample;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use voicegate_verify::VoiceProfile;

/// Persistence collaborator: one [`VoiceProfile`] per user, plus an
/// optional per-profile sample collection for audit/retraining.
///
/// Profile writes replace the stored record wholesale, so readers never
/// observe a partially updated reference fingerprint.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetches the profile owned by `user_id`, if any.
    async fn fetch(&self, user_id: &str) -> Result<Option<VoiceProfile>, StoreError>;

    /// Creates or atomically replaces the profile for its `user_id`.
    async fn upsert(&self, profile: &VoiceProfile) -> Result<(), StoreError>;

    /// Deletes the profile and its samples. Deleting a missing profile is
    /// not an error.
    async fn delete(&self, user_id: &str) -> Result<(), StoreError>;

    /// Replaces the stored enrollment samples for `user_id`.
    async fn replace_samples(
        &self,
        user_id: &str,
        samples: &[EnrollmentSample],
    ) -> Result<(), StoreError>;
}

/// In-memory [`ProfileStore`] for tests and the demo binary.
#[derive(Default)]
pub struct MemoryProfileStore {
    inner: RwLock<HashMap<String, (VoiceProfile, Vec<EnrollmentSample>)>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored samples for a user. Test helper.
    pub async fn samples(&self, user_id: &str) -> Vec<EnrollmentSample> {
        self.inner
            .read()
            .await
            .get(user_id)
            .map(|(_, s)| s.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn fetch(&self, user_id: &str) -> Result<Option<VoiceProfile>, StoreError> {
        Ok(self.inner.read().await.get(user_id).map(|(p, _)| p.clone()))
    }

    async fn upsert(&self, profile: &VoiceProfile) -> Result<(), StoreError> {
        let mut map = self.inner.write().await;
        match map.get_mut(&profile.user_id) {
            Some(entry) => entry.0 = profile.clone(),
            None => {
                map.insert(profile.user_id.clone(), (profile.clone(), Vec::new()));
            }
        }
        Ok(())
    }

    async fn delete(&self, user_id: &str) -> Result<(), StoreError> {
        self.inner.write().await.remove(user_id);
        Ok(())
    }

    async fn replace_samples(
        &self,
        user_id: &str,
        samples: &[EnrollmentSample],
    ) -> Result<(), StoreError> {
        let mut map = self.inner.write().await;
        match map.get_mut(user_id) {
            Some(entry) => {
                entry.1 = samples.to_vec();
                Ok(())
            }
            None => Err(StoreError::Backend(format!(
                "no profile for user {user_id}"
            ))),
        }
    }
}
