//! Port for the locally persisted anonymous identity.

use super::{error::IdentityError, value_object::AnonymousId};

/// Identity store trait
///
/// Holds exactly one anonymous identifier that survives restarts.
pub trait IdentityStore: Send + Sync {
    /// Read the stored identity, if any.
    fn load(&self) -> Result<Option<AnonymousId>, IdentityError>;

    /// Persist `id`, replacing any previous identity.
    fn save(&self, id: &AnonymousId) -> Result<(), IdentityError>;

    /// Discard the stored identity. Not an error when nothing is stored.
    fn forget(&self) -> Result<(), IdentityError>;

    /// Return the stored identity, generating and saving one on first use.
    fn load_or_create(&self) -> Result<AnonymousId, IdentityError> {
        if let Some(id) = self.load()? {
            return Ok(id);
        }
        let id = AnonymousId::generate();
        self.save(&id)?;
        tracing::info!("Generated new anonymous identity {}", id.as_str());
        Ok(id)
    }
}
