//! Command dispatch for replaying registry operations from a log or script.

use crate::errors::Result;
use crate::identities::NewIdentity;
use crate::registry::RegistryService;
use crate::types::{IdentityId, Principal};
use serde::{Deserialize, Serialize};

/// Every mutating registry operation, as data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RegistryCommand {
    SetAuthority {
        principal: Principal,
    },
    SetMaxIdentities {
        max_identities: u64,
    },
    SetCreationFee {
        fee: u64,
    },
    RegisterIdentity {
        pseudonym: String,
        public_key: String,
        #[serde(default)]
        metadata: String,
    },
    UpdateIdentity {
        id: IdentityId,
        pseudonym: String,
        #[serde(default)]
        metadata: String,
    },
    SetAttribute {
        id: IdentityId,
        key: String,
        value: String,
    },
    SetRecoveryKey {
        id: IdentityId,
        recovery_key: String,
    },
    DeactivateIdentity {
        id: IdentityId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommandOutcome {
    Registered { id: IdentityId },
    Applied,
}

impl RegistryService {
    /// Apply one command on behalf of `caller`.
    pub fn execute(&self, caller: &Principal, command: RegistryCommand) -> Result<CommandOutcome> {
        match command {
            RegistryCommand::SetAuthority { principal } => self.set_authority(principal)?,
            RegistryCommand::SetMaxIdentities { max_identities } => {
                self.set_max_identities(caller, max_identities)?
            }
            RegistryCommand::SetCreationFee { fee } => self.set_creation_fee(caller, fee)?,
            RegistryCommand::RegisterIdentity {
                pseudonym,
                public_key,
                metadata,
            } => {
                let identity = NewIdentity::new(pseudonym, public_key, metadata);
                let id = self.register_identity(caller, identity)?;
                return Ok(CommandOutcome::Registered { id });
            }
            RegistryCommand::UpdateIdentity {
                id,
                pseudonym,
                metadata,
            } => self.update_identity(caller, id, pseudonym, metadata)?,
            RegistryCommand::SetAttribute { id, key, value } => {
                self.set_attribute(caller, id, &key, value)?
            }
            RegistryCommand::SetRecoveryKey { id, recovery_key } => {
                self.set_recovery_key(caller, id, recovery_key)?
            }
            RegistryCommand::DeactivateIdentity { id } => self.deactivate_identity(caller, id)?,
        }
        Ok(CommandOutcome::Applied)
    }
}
