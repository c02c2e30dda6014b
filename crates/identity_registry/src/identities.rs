//! Identity store: canonical records indexed by id, pseudonym and creator.

use crate::errors::{RegistryError, Result};
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Registration payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIdentity {
    pub pseudonym: String,
    pub public_key: String,
    #[serde(default)]
    pub metadata: String,
}

impl NewIdentity {
    pub fn new(
        pseudonym: impl Into<String>,
        public_key: impl Into<String>,
        metadata: impl Into<String>,
    ) -> Self {
        Self {
            pseudonym: pseudonym.into(),
            public_key: public_key.into(),
            metadata: metadata.into(),
        }
    }
}

/// Identity records.
///
/// Ids are dense and assigned in order, so the record for id `n` lives at
/// position `n` and the next id is always `records.len()`.
#[derive(Debug, Clone, Default)]
pub struct IdentityStore {
    records: Vec<Identity>,
    by_pseudonym: HashMap<String, IdentityId>,
    by_creator: HashMap<Principal, Vec<IdentityId>>,
}

impl IdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> IdentityId {
        self.records.len() as IdentityId
    }

    /// Total ever registered, deactivated identities included.
    pub fn count(&self) -> u64 {
        self.next_id()
    }

    /// Format checks followed by the pseudonym uniqueness check.
    pub fn validate_new(&self, new: &NewIdentity) -> Result<()> {
        validate_pseudonym(&new.pseudonym)?;
        validate_public_key(&new.public_key)?;
        validate_metadata(&new.metadata)?;
        if self.by_pseudonym.contains_key(&new.pseudonym) {
            return Err(RegistryError::IdentityAlreadyExists {
                pseudonym: new.pseudonym.clone(),
            });
        }
        Ok(())
    }

    /// Commit a registration already accepted by `validate_new`.
    pub(crate) fn insert(&mut self, new: NewIdentity, creator: Principal, now: u64) -> IdentityId {
        let id = self.next_id();
        self.by_pseudonym.insert(new.pseudonym.clone(), id);
        self.by_creator.entry(creator.clone()).or_default().push(id);
        self.records.push(Identity {
            id,
            pseudonym: new.pseudonym,
            public_key: new.public_key,
            created_at: now,
            status: true,
            metadata: new.metadata,
            creator,
        });
        id
    }

    /// Look up `id` and check that `caller` created it.
    pub fn authorize(&self, id: IdentityId, caller: &Principal) -> Result<&Identity> {
        let identity = self
            .get(id)
            .ok_or(RegistryError::IdentityNotFound { id })?;
        if &identity.creator != caller {
            return Err(RegistryError::not_authorized(format!(
                "{caller} is not the creator of identity {id}"
            )));
        }
        Ok(identity)
    }

    /// Rename and replace metadata in one step.
    pub fn update(
        &mut self,
        id: IdentityId,
        new_pseudonym: String,
        new_metadata: String,
        caller: &Principal,
    ) -> Result<()> {
        self.authorize(id, caller)?;
        validate_pseudonym(&new_pseudonym)?;
        validate_metadata(&new_metadata)?;
        if let Some(&owner) = self.by_pseudonym.get(&new_pseudonym) {
            if owner != id {
                return Err(RegistryError::IdentityAlreadyExists {
                    pseudonym: new_pseudonym,
                });
            }
        }

        let record = &mut self.records[id as usize];
        self.by_pseudonym.remove(&record.pseudonym);
        self.by_pseudonym.insert(new_pseudonym.clone(), id);
        record.pseudonym = new_pseudonym;
        record.metadata = new_metadata;
        Ok(())
    }

    /// Deactivation is terminal; repeating it succeeds without effect.
    pub fn deactivate(&mut self, id: IdentityId, caller: &Principal) -> Result<()> {
        self.authorize(id, caller)?;
        self.records[id as usize].status = false;
        Ok(())
    }

    pub fn get(&self, id: IdentityId) -> Option<&Identity> {
        usize::try_from(id).ok().and_then(|idx| self.records.get(idx))
    }

    pub fn get_by_pseudonym(&self, pseudonym: &str) -> Option<&Identity> {
        self.by_pseudonym
            .get(pseudonym)
            .and_then(|&id| self.get(id))
    }

    pub fn is_registered(&self, pseudonym: &str) -> bool {
        self.by_pseudonym.contains_key(pseudonym)
    }

    /// Ids registered by `creator`, ascending.
    pub fn ids_by_creator(&self, creator: &Principal) -> Vec<IdentityId> {
        self.by_creator.get(creator).cloned().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Identity> {
        self.records.iter()
    }
}

#[cfg(test)]
impl IdentityStore {
    /// Validate and insert in one call. Capacity belongs to `AuthorityGate`.
    pub(crate) fn register(
        &mut self,
        new: NewIdentity,
        creator: Principal,
        now: u64,
    ) -> Result<IdentityId> {
        self.validate_new(&new)?;
        Ok(self.insert(new, creator, now))
    }
}
