//! In-memory identity store.

use std::sync::Mutex;

use crate::domain::{AnonymousId, IdentityError, IdentityStore};

/// Forgets everything when the process exits.
#[derive(Debug, Default)]
pub struct InMemoryIdentityStore {
    id: Mutex<Option<AnonymousId>>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identity(id: AnonymousId) -> Self {
        Self {
            id: Mutex::new(Some(id)),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<AnonymousId>> {
        // a panic while holding the lock cannot leave a half-written id
        self.id.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl IdentityStore for InMemoryIdentityStore {
    fn load(&self) -> Result<Option<AnonymousId>, IdentityError> {
        Ok(self.slot().clone())
    }

    fn save(&self, id: &AnonymousId) -> Result<(), IdentityError> {
        *self.slot() = Some(id.clone());
        Ok(())
    }

    fn forget(&self) -> Result<(), IdentityError> {
        *self.slot() = None;
        Ok(())
    }
}
