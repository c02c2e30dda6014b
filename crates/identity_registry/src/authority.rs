//! Authority gate: the one-shot authority principal and the policy it controls.

use crate::config::RegistryConfig;
use crate::errors::{RegistryError, Result};
use crate::types::Principal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Default identity capacity
pub const DEFAULT_MAX_IDENTITIES: u64 = 10_000;
/// Default registration fee
pub const DEFAULT_CREATION_FEE: u64 = 500;

/// Holds the authority reference and the policy parameters it governs.
///
/// The authority can move from unset to set exactly once. Policy changes
/// require an established authority and must be requested by it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorityGate {
    authority: Option<Principal>,
    max_identities: u64,
    creation_fee: u64,
}

impl AuthorityGate {
    pub fn new() -> Self {
        Self {
            authority: None,
            max_identities: DEFAULT_MAX_IDENTITIES,
            creation_fee: DEFAULT_CREATION_FEE,
        }
    }

    /// Seed the policy parameters from configuration. The authority stays unset.
    pub fn from_config(config: &RegistryConfig) -> Self {
        Self {
            authority: None,
            max_identities: config.max_identities,
            creation_fee: config.creation_fee,
        }
    }

    pub fn authority(&self) -> Option<&Principal> {
        self.authority.as_ref()
    }

    pub fn max_identities(&self) -> u64 {
        self.max_identities
    }

    pub fn creation_fee(&self) -> u64 {
        self.creation_fee
    }

    /// Fix the authority. Fails if one is already set or `principal` is the
    /// burn address.
    pub fn set_authority(&mut self, principal: Principal) -> Result<()> {
        if principal.is_burn_address() {
            warn!(principal = %principal, "rejected burn address as authority");
            return Err(RegistryError::not_authorized(
                "burn address cannot be the authority",
            ));
        }
        if let Some(existing) = &self.authority {
            warn!(existing = %existing, requested = %principal, "authority already set");
            return Err(RegistryError::not_authorized("authority already set"));
        }
        info!(authority = %principal, "registry authority set");
        self.authority = Some(principal);
        Ok(())
    }

    /// Fails with `AuthorityNotVerified` when no authority is configured.
    pub fn require_authority(&self) -> Result<&Principal> {
        self.authority
            .as_ref()
            .ok_or(RegistryError::AuthorityNotVerified)
    }

    fn require_authority_caller(&self, caller: &Principal) -> Result<()> {
        let authority = self.require_authority()?;
        if authority != caller {
            warn!(caller = %caller, "policy change requested by non-authority");
            return Err(RegistryError::not_authorized(format!(
                "{caller} is not the registry authority"
            )));
        }
        Ok(())
    }

    pub fn set_max_identities(&mut self, caller: &Principal, max: u64) -> Result<()> {
        if max == 0 {
            return Err(RegistryError::InvalidMaxIdentities { value: max });
        }
        self.require_authority_caller(caller)?;
        info!(old = self.max_identities, new = max, "max identities updated");
        self.max_identities = max;
        Ok(())
    }

    pub fn set_creation_fee(&mut self, caller: &Principal, fee: u64) -> Result<()> {
        self.require_authority_caller(caller)?;
        info!(old = self.creation_fee, new = fee, "creation fee updated");
        self.creation_fee = fee;
        Ok(())
    }

    /// Fails with `MaxIdentitiesExceeded` once `next_id` reaches the cap.
    pub fn check_capacity(&self, next_id: u64) -> Result<()> {
        if next_id >= self.max_identities {
            return Err(RegistryError::MaxIdentitiesExceeded {
                max: self.max_identities,
            });
        }
        Ok(())
    }
}

impl Default for AuthorityGate {
    fn default() -> Self {
        Self::new()
    }
}
