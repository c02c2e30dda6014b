//! Types for the identity registry

use crate::errors::{RegistryError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sequential identity number, starting at 0.
pub type IdentityId = u64;

/// Maximum pseudonym length in characters.
pub const MAX_PSEUDONYM_LEN: usize = 50;
/// Maximum public key length in characters.
pub const MAX_PUBLIC_KEY_LEN: usize = 256;
/// Maximum metadata length in characters.
pub const MAX_METADATA_LEN: usize = 200;
/// Maximum attribute key length in characters.
pub const MAX_ATTRIBUTE_KEY_LEN: usize = 50;
/// Maximum recovery key length in characters.
pub const MAX_RECOVERY_KEY_LEN: usize = 256;

/// Calling principal, supplied already authenticated by the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(pub String);

impl Principal {
    /// Reserved null address that can never hold the authority role.
    pub const BURN_ADDRESS: &'static str = "SP000000000000000000002Q6VF78";

    pub fn new(principal: impl Into<String>) -> Self {
        Self(principal.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_burn_address(&self) -> bool {
        self.0 == Self::BURN_ADDRESS
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Principal {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Canonical identity record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: IdentityId,
    pub pseudonym: String,
    pub public_key: String,
    /// Logical height at registration
    pub created_at: u64,
    /// `true` while active; deactivation is one-way
    pub status: bool,
    pub metadata: String,
    pub creator: Principal,
}

impl Identity {
    pub fn is_active(&self) -> bool {
        self.status
    }
}

/// Composite attribute key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttributeKey {
    pub identity_id: IdentityId,
    pub key: String,
}

impl AttributeKey {
    pub fn new(identity_id: IdentityId, key: impl Into<String>) -> Self {
        Self {
            identity_id,
            key: key.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub value: String,
    pub updated_at: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryKey {
    pub recovery_key: String,
}

fn char_len(value: &str) -> usize {
    value.chars().count()
}

fn within(value: &str, max: usize) -> bool {
    let len = char_len(value);
    len > 0 && len <= max
}

pub fn validate_pseudonym(pseudonym: &str) -> Result<()> {
    if !within(pseudonym, MAX_PSEUDONYM_LEN) {
        return Err(RegistryError::InvalidPseudonym {
            pseudonym: pseudonym.to_string(),
        });
    }
    Ok(())
}

pub fn validate_public_key(public_key: &str) -> Result<()> {
    if !within(public_key, MAX_PUBLIC_KEY_LEN) {
        return Err(RegistryError::InvalidPublicKey {
            len: char_len(public_key),
        });
    }
    Ok(())
}

/// Metadata may be empty.
pub fn validate_metadata(metadata: &str) -> Result<()> {
    let len = char_len(metadata);
    if len > MAX_METADATA_LEN {
        return Err(RegistryError::InvalidMetadata { len });
    }
    Ok(())
}

pub fn validate_attribute_key(key: &str) -> Result<()> {
    if !within(key, MAX_ATTRIBUTE_KEY_LEN) {
        return Err(RegistryError::InvalidAttribute {
            key: key.to_string(),
        });
    }
    Ok(())
}

pub fn validate_recovery_key(recovery_key: &str) -> Result<()> {
    if !within(recovery_key, MAX_RECOVERY_KEY_LEN) {
        return Err(RegistryError::InvalidRecoveryKey {
            len: char_len(recovery_key),
        });
    }
    Ok(())
}
