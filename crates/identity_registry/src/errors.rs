//! Error types for the identity registry

use crate::types::IdentityId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Not authorized: {reason}")]
    NotAuthorized { reason: String },

    #[error("Invalid pseudonym: {pseudonym:?}")]
    InvalidPseudonym { pseudonym: String },

    #[error("Invalid public key (length {len})")]
    InvalidPublicKey { len: usize },

    #[error("Invalid timestamp: height {height} is behind last observed height {last}")]
    InvalidTimestamp { height: u64, last: u64 },

    #[error("Identity already exists: {pseudonym}")]
    IdentityAlreadyExists { pseudonym: String },

    #[error("Identity not found: {id}")]
    IdentityNotFound { id: IdentityId },

    #[error("Invalid max identities: {value}")]
    InvalidMaxIdentities { value: u64 },

    #[error("Max identities exceeded: limit {max}")]
    MaxIdentitiesExceeded { max: u64 },

    #[error("Invalid metadata (length {len})")]
    InvalidMetadata { len: usize },

    #[error("Authority not verified")]
    AuthorityNotVerified,

    #[error("Invalid attribute key: {key:?}")]
    InvalidAttribute { key: String },

    #[error("Invalid recovery key (length {len})")]
    InvalidRecoveryKey { len: usize },

    #[error("Fee transfer failed: {0}")]
    FeeTransfer(#[source] anyhow::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl RegistryError {
    /// Stable numeric code of the error kind.
    ///
    /// Collaborator failures (`FeeTransfer`, `Config`) have no registry code.
    pub fn code(&self) -> Option<u32> {
        let code = match self {
            Self::NotAuthorized { .. } => 100,
            Self::InvalidPseudonym { .. } => 101,
            Self::InvalidPublicKey { .. } => 102,
            Self::InvalidTimestamp { .. } => 103,
            Self::IdentityAlreadyExists { .. } => 104,
            Self::IdentityNotFound { .. } => 105,
            Self::InvalidMaxIdentities { .. } => 106,
            Self::MaxIdentitiesExceeded { .. } => 107,
            Self::InvalidMetadata { .. } => 109,
            Self::AuthorityNotVerified => 110,
            Self::InvalidAttribute { .. } => 111,
            Self::InvalidRecoveryKey { .. } => 112,
            Self::FeeTransfer(_) | Self::Config(_) => return None,
        };
        Some(code)
    }

    pub(crate) fn not_authorized(reason: impl Into<String>) -> Self {
        Self::NotAuthorized {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;
