//! Identity Registry
//!
//! Issues and maintains canonical records binding a unique pseudonym to a
//! public key and free-form metadata. A single authority, fixed once, receives
//! registration fees and controls capacity and fee policy. Only the creator of
//! an identity may update it, attach attributes or a recovery key, or
//! deactivate it.

pub mod attributes;
pub mod authority;
pub mod clock;
pub mod commands;
pub mod config;
pub mod errors;
pub mod identities;
pub mod ledger;
pub mod recovery;
pub mod registry;
pub mod types;

pub use attributes::AttributeStore;
pub use authority::AuthorityGate;
pub use clock::{LogicalClock, ManualClock};
pub use commands::{CommandOutcome, RegistryCommand};
pub use config::RegistryConfig;
pub use errors::*;
pub use identities::{IdentityStore, NewIdentity};
pub use ledger::{FeeLedger, FeeTransfer, InMemoryLedger, RecordingLedger};
pub use recovery::RecoveryKeyStore;
pub use registry::{RegistryService, RegistrySnapshot, RegistryState};
pub use types::*;
