//! Recovery keys, at most one per identity

use crate::errors::Result;
use crate::identities::IdentityStore;
use crate::types::*;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct RecoveryKeyStore {
    keys: HashMap<IdentityId, RecoveryKey>,
}

impl RecoveryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or replace the recovery key of `id`.
    pub fn set(
        &mut self,
        identities: &IdentityStore,
        id: IdentityId,
        recovery_key: String,
        caller: &Principal,
    ) -> Result<()> {
        identities.authorize(id, caller)?;
        validate_recovery_key(&recovery_key)?;
        self.keys.insert(id, RecoveryKey { recovery_key });
        Ok(())
    }

    pub fn get(&self, id: IdentityId) -> Option<&RecoveryKey> {
        self.keys.get(&id)
    }

    /// All keys, ordered by identity id.
    pub fn sorted(&self) -> Vec<(IdentityId, RecoveryKey)> {
        let mut keys: Vec<_> = self
            .keys
            .iter()
            .map(|(id, key)| (*id, key.clone()))
            .collect();
        keys.sort_unstable_by_key(|(id, _)| *id);
        keys
    }
}
