//! Fee ledger collaborator
//!
//! The registry asks the ledger to move the creation fee from the registrant
//! to the authority. How the transfer settles is the ledger's business; the
//! registry only reacts to success or failure.

use crate::types::Principal;
use anyhow::Result;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Interface to the external value-transfer mechanism.
pub trait FeeLedger: Send + Sync {
    /// Move `amount` units from `from` to `to`.
    fn transfer(&self, amount: u64, from: &Principal, to: &Principal) -> Result<()>;
}

/// A transfer request as seen by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeTransfer {
    pub amount: u64,
    pub from: Principal,
    pub to: Principal,
}

// -----------------------------------------------------------------------------
// Recording ledger (always accepts; for hosts that settle fees elsewhere)
// -----------------------------------------------------------------------------
#[derive(Debug, Default)]
pub struct RecordingLedger {
    transfers: Mutex<Vec<FeeTransfer>>,
}

impl RecordingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transfers(&self) -> Vec<FeeTransfer> {
        self.transfers.lock().clone()
    }

    pub fn clear(&self) {
        self.transfers.lock().clear();
    }
}

impl FeeLedger for RecordingLedger {
    fn transfer(&self, amount: u64, from: &Principal, to: &Principal) -> Result<()> {
        self.transfers.lock().push(FeeTransfer {
            amount,
            from: from.clone(),
            to: to.clone(),
        });
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// In-memory balance ledger
// -----------------------------------------------------------------------------
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    balances: Mutex<HashMap<Principal, u64>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn credit(&self, account: &Principal, amount: u64) {
        let mut balances = self.balances.lock();
        let balance = balances.entry(account.clone()).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    pub fn balance(&self, account: &Principal) -> u64 {
        self.balances.lock().get(account).copied().unwrap_or(0)
    }
}

impl FeeLedger for InMemoryLedger {
    fn transfer(&self, amount: u64, from: &Principal, to: &Principal) -> Result<()> {
        let mut balances = self.balances.lock();
        let available = balances.get(from).copied().unwrap_or(0);
        if available < amount {
            return Err(anyhow::anyhow!(
                "Insufficient balance: {from} has {available}, needs {amount}"
            ));
        }
        balances.insert(from.clone(), available - amount);
        let credited = balances.entry(to.clone()).or_insert(0);
        *credited = credited.saturating_add(amount);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_ledger_records_in_order() {
        let ledger = RecordingLedger::new();
        let a = Principal::new("A");
        let b = Principal::new("B");
        ledger.transfer(500, &a, &b).unwrap();
        ledger.transfer(0, &b, &a).unwrap();
        let transfers = ledger.transfers();
        assert_eq!(transfers.len(), 2);
        assert_eq!(
            transfers[0],
            FeeTransfer {
                amount: 500,
                from: a.clone(),
                to: b.clone()
            }
        );
        ledger.clear();
        assert!(ledger.transfers().is_empty());
    }

    #[test]
    fn test_in_memory_ledger_moves_balance() {
        let ledger = InMemoryLedger::new();
        let payer = Principal::new("payer");
        let payee = Principal::new("payee");
        ledger.credit(&payer, 1_000);
        ledger.transfer(300, &payer, &payee).unwrap();
        assert_eq!(ledger.balance(&payer), 700);
        assert_eq!(ledger.balance(&payee), 300);
    }

    #[test]
    fn test_in_memory_ledger_insufficient_balance() {
        let ledger = InMemoryLedger::new();
        let payer = Principal::new("payer");
        ledger.credit(&payer, 10);
        let err = ledger
            .transfer(11, &payer, &Principal::new("payee"))
            .unwrap_err();
        assert!(err.to_string().contains("Insufficient balance"));
        assert_eq!(ledger.balance(&payer), 10);
    }
}
