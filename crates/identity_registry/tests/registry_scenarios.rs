//! End-to-end registry scenarios

use ippan_identity_registry::*;
use std::sync::Arc;
use std::thread;

fn setup() -> (RegistryService, Arc<RecordingLedger>, Arc<ManualClock>) {
    let ledger = Arc::new(RecordingLedger::new());
    let clock = Arc::new(ManualClock::new(0));
    let registry = RegistryService::new(&RegistryConfig::default(), ledger.clone(), clock.clone());
    (registry, ledger, clock)
}

fn caller() -> Principal {
    Principal::new("ST1TEST")
}

#[test]
fn test_registration_requires_authority() {
    let (registry, ledger, _) = setup();
    let err = registry
        .register_identity(
            &caller(),
            NewIdentity::new("Creator1", "pubkey123", "Artist Profile"),
        )
        .unwrap_err();
    assert_eq!(err.code(), Some(110));
    assert!(ledger.transfers().is_empty());
}

#[test]
fn test_registration_flow_and_duplicate() {
    let (registry, ledger, _) = setup();
    registry.set_authority(Principal::new("A")).unwrap();

    let id = registry
        .register_identity(
            &Principal::new("C"),
            NewIdentity::new("Creator1", "pubkey123", "Artist Profile"),
        )
        .unwrap();
    assert_eq!(id, 0);
    assert_eq!(
        ledger.transfers(),
        vec![FeeTransfer {
            amount: 500,
            from: Principal::new("C"),
            to: Principal::new("A"),
        }]
    );

    let err = registry
        .register_identity(
            &Principal::new("C"),
            NewIdentity::new("Creator1", "pubkey456", "Other"),
        )
        .unwrap_err();
    assert!(matches!(err, RegistryError::IdentityAlreadyExists { .. }));
    assert_eq!(err.code(), Some(104));
    assert_eq!(registry.get_identity_count(), 1);
    assert_eq!(ledger.transfers().len(), 1);
    assert_eq!(registry.get_identity(0).unwrap().public_key, "pubkey123");
}

#[test]
fn test_metadata_length_boundary() {
    let (registry, _, _) = setup();
    registry.set_authority(Principal::new("A")).unwrap();

    let err = registry
        .register_identity(&caller(), NewIdentity::new("Creator1", "pk", "a".repeat(201)))
        .unwrap_err();
    assert_eq!(err.code(), Some(109));

    registry
        .register_identity(&caller(), NewIdentity::new("Creator1", "pk", "a".repeat(200)))
        .unwrap();
}

#[test]
fn test_invalid_inputs_report_expected_kind() {
    let (registry, _, _) = setup();
    registry.set_authority(Principal::new("A")).unwrap();

    let cases = [
        (NewIdentity::new("", "pubkey123", "Artist Profile"), 101),
        (NewIdentity::new("Creator1", "", "Artist Profile"), 102),
        (NewIdentity::new("p".repeat(51), "pubkey123", ""), 101),
        (NewIdentity::new("Creator1", "k".repeat(257), ""), 102),
    ];
    for (input, code) in cases {
        let err = registry.register_identity(&caller(), input).unwrap_err();
        assert_eq!(err.code(), Some(code), "{err}");
    }
    assert_eq!(registry.get_identity_count(), 0);
}

#[test]
fn test_identity_existence_and_count() {
    let (registry, _, _) = setup();
    registry.set_authority(Principal::new("ST2TEST")).unwrap();
    registry
        .register_identity(&caller(), NewIdentity::new("Creator1", "pubkey123", "Artist Profile"))
        .unwrap();
    registry
        .register_identity(&caller(), NewIdentity::new("Creator2", "pubkey456", "Designer Profile"))
        .unwrap();

    assert!(registry.is_identity_registered("Creator1"));
    assert!(!registry.is_identity_registered("Creator3"));
    assert_eq!(registry.get_identity_count(), 2);
}

#[test]
fn test_deactivated_identity_still_counts_and_holds_pseudonym() {
    let (registry, _, _) = setup();
    registry.set_authority(Principal::new("A")).unwrap();
    registry
        .register_identity(&caller(), NewIdentity::new("retired", "pk", ""))
        .unwrap();
    registry.deactivate_identity(&caller(), 0).unwrap();

    let err = registry
        .register_identity(&caller(), NewIdentity::new("retired", "pk2", ""))
        .unwrap_err();
    assert!(matches!(err, RegistryError::IdentityAlreadyExists { .. }));
    assert_eq!(registry.get_identity_count(), 1);
    let identity = registry.get_identity_by_pseudonym("retired").unwrap();
    assert!(!identity.status);
}

#[test]
fn test_capacity_limit() {
    let (registry, _, _) = setup();
    let authority = Principal::new("A");
    registry.set_authority(authority.clone()).unwrap();
    registry.set_max_identities(&authority, 2).unwrap();

    for name in ["one", "two"] {
        registry
            .register_identity(&caller(), NewIdentity::new(name, "pk", ""))
            .unwrap();
    }
    let err = registry
        .register_identity(&caller(), NewIdentity::new("three", "pk", ""))
        .unwrap_err();
    assert_eq!(err.code(), Some(107));

    registry.set_max_identities(&authority, 3).unwrap();
    assert_eq!(
        registry
            .register_identity(&caller(), NewIdentity::new("three", "pk", ""))
            .unwrap(),
        2
    );
}

#[test]
fn test_timestamps_follow_clock() {
    let (registry, _, clock) = setup();
    registry.set_authority(Principal::new("A")).unwrap();

    clock.set(100);
    registry
        .register_identity(&caller(), NewIdentity::new("timed", "pk", ""))
        .unwrap();
    clock.advance(5);
    registry.set_attribute(&caller(), 0, "status", "online").unwrap();

    assert_eq!(registry.get_identity(0).unwrap().created_at, 100);
    assert_eq!(registry.get_attribute(0, "status").unwrap().updated_at, 105);
}

#[test]
fn test_snapshot_serializes() {
    let (registry, _, _) = setup();
    registry.set_authority(Principal::new("A")).unwrap();
    registry
        .register_identity(&caller(), NewIdentity::new("Creator1", "pubkey123", "Artist Profile"))
        .unwrap();

    let snapshot = registry.snapshot();
    assert_eq!(snapshot.identity_count, 1);
    assert_eq!(snapshot.authority, Some(Principal::new("A")));

    let json = serde_json::to_string(&snapshot).unwrap();
    let decoded: RegistrySnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, snapshot);
}

#[test]
fn test_concurrent_registrations_keep_ids_dense() {
    let (registry, ledger, _) = setup();
    registry.set_authority(Principal::new("A")).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let registry = registry.clone();
            thread::spawn(move || {
                let me = Principal::new(format!("worker{worker}"));
                let mut ids = Vec::new();
                for n in 0..25 {
                    // every worker also races for one shared pseudonym
                    let _ = registry.register_identity(&me, NewIdentity::new("contested", "pk", ""));
                    let id = registry
                        .register_identity(&me, NewIdentity::new(format!("w{worker}-{n}"), "pk", ""))
                        .unwrap();
                    ids.push(id);
                }
                ids
            })
        })
        .collect();

    let mut all: Vec<u64> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    all.sort_unstable();

    // 200 unique registrations plus exactly one winner of "contested"
    let count = registry.get_identity_count();
    assert_eq!(count, 201);
    assert_eq!(ledger.transfers().len(), 201);
    let contested = registry.get_identity_by_pseudonym("contested").unwrap();
    assert!(!all.contains(&contested.id));
    all.push(contested.id);
    all.sort_unstable();
    assert_eq!(all, (0..count).collect::<Vec<_>>());
}
