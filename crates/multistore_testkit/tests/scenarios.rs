//! End-to-end scenarios across both store flavors.

use multistore_core::{HashMultiIndexStore, IdentityMultiIndexStore, StoreError};
use multistore_testkit::prelude::*;
use parking_lot::RwLock;
use std::sync::Arc;

#[test]
fn lookups_over_standard_indices() {
    init_tracing();
    let fixture = UserStore::new();
    fixture.insert(john_doe()).unwrap();
    fixture.insert(jane_doe()).unwrap();
    fixture.insert(robert_smith()).unwrap();

    assert_eq!(fixture.by_last_name("Doe").len(), 2);
    assert_eq!(
        fixture.find_unique(&fixture.id, &3).unwrap(),
        Some(robert_smith())
    );
    assert_eq!(
        fixture
            .find_by(&fixture.first_name, &"Jane".to_string())
            .unwrap()
            .into_vec(),
        vec![jane_doe()]
    );
    fixture.verify_integrity().unwrap();
}

#[test]
fn equal_copy_is_not_inserted_twice() {
    let fixture = UserStore::new();
    assert!(fixture.insert(john_doe()).unwrap());
    assert!(!fixture.insert(john_doe_copy()).unwrap());
    assert_eq!(fixture.len(), 1);
}

#[test]
fn identity_store_keeps_equal_copies() {
    let fixture = SharedUserStore::new();
    let john = shared(john_doe());
    let copy = shared(john_doe_copy());
    fixture.insert(Arc::clone(&john)).unwrap();
    fixture.insert(Arc::clone(&copy)).unwrap();

    let does = fixture
        .find_by(&fixture.last_name, &"Doe".to_string())
        .unwrap();
    assert_eq!(does.len(), 2);

    fixture.remove(&john);
    assert!(fixture.contains(&copy));
    assert!(!fixture.contains(&john));
}

#[test]
fn user_without_last_name_is_only_in_other_indices() {
    let fixture = UserStore::new();
    fixture.insert(peter()).unwrap();

    assert!(fixture.contains(&peter()));
    assert!(fixture.key_set(&fixture.last_name).unwrap().is_empty());
    assert_eq!(fixture.find_unique(&fixture.id, &10).unwrap(), Some(peter()));
}

#[test]
fn index_from_another_store_is_rejected() {
    let fixture = UserStore::new();
    let other = UserStore::new();

    let err = fixture.find_unique(&other.id, &1).unwrap_err();
    assert!(matches!(err, StoreError::UnknownIndex { .. }));
}

#[test]
fn stores_of_different_flavors_have_distinct_ids() {
    let a = HashMultiIndexStore::<User>::new();
    let b = IdentityMultiIndexStore::<RwLock<User>>::new();
    assert_ne!(a.id(), b.id());
}

#[test]
fn stats_track_operations() {
    let fixture = UserStore::new();
    fixture.insert(john_doe()).unwrap();
    fixture.insert(User::new(1, "Johnny", "Doe")).unwrap();
    fixture.remove(&jane_doe());
    fixture.by_last_name("Doe");

    let stats = fixture.stats();
    assert_eq!(stats.indexes_created, 3);
    assert_eq!(stats.inserts, 2);
    assert_eq!(stats.evictions, 1);
    assert_eq!(stats.removes, 0);
    assert_eq!(stats.lookups, 1);
}

#[test]
fn concurrent_insert_find_remove_stays_consistent() {
    init_tracing();
    let config = StressConfig {
        operations: 200,
        threads: 4,
    };
    let result = stress_insert_find_remove(&config);
    result.log_summary("insert/find/remove");
    assert_eq!(result.failed_ops, 0);
}

#[test]
fn readers_see_updates_atomically() {
    init_tracing();
    let config = StressConfig {
        operations: 500,
        threads: 3,
    };
    let result = stress_update_vs_readers(&config);
    result.log_summary("update vs readers");
    assert_eq!(result.failed_ops, 0);
    assert!(result.successful_ops >= config.operations);
}
