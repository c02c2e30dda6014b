//! Identity registry service
//!
//! Every mutation runs validation, then authorization, then the state change,
//! then (for registration) the fee transfer, all under one write lock so each
//! public operation is a single serializable step. Reads take the read lock
//! and never require authorization.

use crate::attributes::AttributeStore;
use crate::authority::AuthorityGate;
use crate::clock::LogicalClock;
use crate::config::RegistryConfig;
use crate::errors::*;
use crate::identities::{IdentityStore, NewIdentity};
use crate::ledger::FeeLedger;
use crate::recovery::RecoveryKeyStore;
use crate::types::*;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// All mutable registry state.
#[derive(Debug, Clone, Default)]
pub struct RegistryState {
    pub policy: AuthorityGate,
    pub identities: IdentityStore,
    pub attributes: AttributeStore,
    pub recovery_keys: RecoveryKeyStore,
    /// Highest clock height accepted so far
    pub last_height: u64,
}

impl RegistryState {
    pub fn new(config: &RegistryConfig) -> Self {
        Self {
            policy: AuthorityGate::from_config(config),
            ..Default::default()
        }
    }
}

/// Serializable view of the registry for inspection and export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub authority: Option<Principal>,
    pub max_identities: u64,
    pub creation_fee: u64,
    pub identity_count: u64,
    pub attribute_count: usize,
    pub last_height: u64,
    pub identities: Vec<Identity>,
    /// Attributes in `(id, key)` order
    pub attributes: Vec<(AttributeKey, Attribute)>,
    /// Recovery keys in id order
    pub recovery_keys: Vec<(IdentityId, RecoveryKey)>,
}

/// Identity registry
///
/// Clones share the same underlying state.
#[derive(Clone)]
pub struct RegistryService {
    state: Arc<RwLock<RegistryState>>,
    ledger: Arc<dyn FeeLedger>,
    clock: Arc<dyn LogicalClock>,
}

impl std::fmt::Debug for RegistryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryService")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl RegistryService {
    pub fn new(
        config: &RegistryConfig,
        ledger: Arc<dyn FeeLedger>,
        clock: Arc<dyn LogicalClock>,
    ) -> Self {
        Self {
            state: Arc::new(RwLock::new(RegistryState::new(config))),
            ledger,
            clock,
        }
    }

    /// Height for this operation; rejects a clock that moved backwards.
    fn read_height(&self, state: &RegistryState) -> Result<u64> {
        let height = self.clock.current_height();
        if height < state.last_height {
            return Err(RegistryError::InvalidTimestamp {
                height,
                last: state.last_height,
            });
        }
        Ok(height)
    }

    // -------------------------------------------------------------------------
    // Authority and policy
    // -------------------------------------------------------------------------

    pub fn set_authority(&self, principal: Principal) -> Result<()> {
        self.state.write().policy.set_authority(principal)
    }

    pub fn set_max_identities(&self, caller: &Principal, max: u64) -> Result<()> {
        self.state.write().policy.set_max_identities(caller, max)
    }

    pub fn set_creation_fee(&self, caller: &Principal, fee: u64) -> Result<()> {
        self.state.write().policy.set_creation_fee(caller, fee)
    }

    // -------------------------------------------------------------------------
    // Identity mutations
    // -------------------------------------------------------------------------

    /// Register a new identity owned by `caller` and charge the creation fee.
    ///
    /// Checks run in a fixed order and the first failure wins: capacity,
    /// pseudonym, public key, metadata, pseudonym uniqueness, authority.
    /// A failed fee transfer aborts the registration with no state change.
    pub fn register_identity(&self, caller: &Principal, new: NewIdentity) -> Result<IdentityId> {
        let mut state = self.state.write();
        let now = self.read_height(&state)?;

        state.policy.check_capacity(state.identities.next_id())?;
        state.identities.validate_new(&new)?;
        let authority = state.policy.require_authority()?.clone();
        let fee = state.policy.creation_fee();

        self.ledger
            .transfer(fee, caller, &authority)
            .map_err(RegistryError::FeeTransfer)?;

        let pseudonym = new.pseudonym.clone();
        let id = state.identities.insert(new, caller.clone(), now);
        state.last_height = now;
        info!(id, pseudonym = %pseudonym, creator = %caller, fee, height = now, "identity registered");
        Ok(id)
    }

    pub fn update_identity(
        &self,
        caller: &Principal,
        id: IdentityId,
        new_pseudonym: impl Into<String>,
        new_metadata: impl Into<String>,
    ) -> Result<()> {
        let mut state = self.state.write();
        let new_pseudonym = new_pseudonym.into();
        state
            .identities
            .update(id, new_pseudonym.clone(), new_metadata.into(), caller)
            .inspect_err(|e| log_rejection("update_identity", id, caller, e))?;
        info!(id, pseudonym = %new_pseudonym, "identity updated");
        Ok(())
    }

    pub fn deactivate_identity(&self, caller: &Principal, id: IdentityId) -> Result<()> {
        let mut state = self.state.write();
        state
            .identities
            .deactivate(id, caller)
            .inspect_err(|e| log_rejection("deactivate_identity", id, caller, e))?;
        info!(id, "identity deactivated");
        Ok(())
    }

    pub fn set_attribute(
        &self,
        caller: &Principal,
        id: IdentityId,
        key: &str,
        value: impl Into<String>,
    ) -> Result<()> {
        let mut guard = self.state.write();
        let now = self.read_height(&guard)?;
        let state = &mut *guard;
        state
            .attributes
            .set(&state.identities, id, key, value.into(), caller, now)
            .inspect_err(|e| log_rejection("set_attribute", id, caller, e))?;
        state.last_height = now;
        debug!(id, key, height = now, "attribute set");
        Ok(())
    }

    pub fn set_recovery_key(
        &self,
        caller: &Principal,
        id: IdentityId,
        recovery_key: impl Into<String>,
    ) -> Result<()> {
        let mut guard = self.state.write();
        let state = &mut *guard;
        state
            .recovery_keys
            .set(&state.identities, id, recovery_key.into(), caller)
            .inspect_err(|e| log_rejection("set_recovery_key", id, caller, e))?;
        debug!(id, "recovery key set");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn get_identity(&self, id: IdentityId) -> Option<Identity> {
        self.state.read().identities.get(id).cloned()
    }

    pub fn get_identity_by_pseudonym(&self, pseudonym: &str) -> Option<Identity> {
        self.state
            .read()
            .identities
            .get_by_pseudonym(pseudonym)
            .cloned()
    }

    pub fn get_attribute(&self, id: IdentityId, key: &str) -> Option<Attribute> {
        self.state.read().attributes.get(id, key).cloned()
    }

    pub fn get_recovery_key(&self, id: IdentityId) -> Option<RecoveryKey> {
        self.state.read().recovery_keys.get(id).cloned()
    }

    pub fn get_identity_count(&self) -> u64 {
        self.state.read().identities.count()
    }

    pub fn is_identity_registered(&self, pseudonym: &str) -> bool {
        self.state.read().identities.is_registered(pseudonym)
    }

    pub fn list_identities_by_creator(&self, creator: &Principal) -> Vec<IdentityId> {
        self.state.read().identities.ids_by_creator(creator)
    }

    pub fn authority(&self) -> Option<Principal> {
        self.state.read().policy.authority().cloned()
    }

    pub fn max_identities(&self) -> u64 {
        self.state.read().policy.max_identities()
    }

    pub fn creation_fee(&self) -> u64 {
        self.state.read().policy.creation_fee()
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        let state = self.state.read();
        RegistrySnapshot {
            authority: state.policy.authority().cloned(),
            max_identities: state.policy.max_identities(),
            creation_fee: state.policy.creation_fee(),
            identity_count: state.identities.count(),
            attribute_count: state.attributes.len(),
            last_height: state.last_height,
            identities: state.identities.iter().cloned().collect(),
            attributes: state
                .attributes
                .iter()
                .map(|(key, attr)| (key.clone(), attr.clone()))
                .collect(),
            recovery_keys: state.recovery_keys.sorted(),
        }
    }
}

fn log_rejection(op: &str, id: IdentityId, caller: &Principal, err: &RegistryError) {
    match err {
        RegistryError::NotAuthorized { .. } => {
            warn!(op, id, caller = %caller, "rejected: caller is not the creator")
        }
        other => debug!(op, id, error = %other, "rejected"),
    }
}
