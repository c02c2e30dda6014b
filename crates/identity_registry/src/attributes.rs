//! Per-identity key/value attributes

use crate::errors::Result;
use crate::identities::IdentityStore;
use crate::types::*;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct AttributeStore {
    attributes: BTreeMap<AttributeKey, Attribute>,
}

impl AttributeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write (or overwrite) an attribute. Only the identity's creator may write.
    pub fn set(
        &mut self,
        identities: &IdentityStore,
        id: IdentityId,
        key: &str,
        value: String,
        caller: &Principal,
        now: u64,
    ) -> Result<()> {
        identities.authorize(id, caller)?;
        validate_attribute_key(key)?;
        self.attributes.insert(
            AttributeKey::new(id, key),
            Attribute {
                value,
                updated_at: now,
            },
        );
        Ok(())
    }

    pub fn get(&self, id: IdentityId, key: &str) -> Option<&Attribute> {
        self.attributes.get(&AttributeKey::new(id, key))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AttributeKey, &Attribute)> {
        self.attributes.iter()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}
