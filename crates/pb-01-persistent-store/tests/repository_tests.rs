//! Repository behaviour over the file-backed store.

use pb_01_persistent_store::{BridgeRepository, FileBackedStore, PersistentStore};
use proptest::prelude::*;
use serde_json::{json, Value};
use shared_types::{ExchangeRateSnapshot, SnapshotPayload};
use std::sync::Arc;

fn file_repo(dir: &tempfile::TempDir) -> BridgeRepository {
    let store = FileBackedStore::open(dir.path().join("bridge.json")).unwrap();
    BridgeRepository::new(Arc::new(store))
}

#[test]
fn test_state_survives_restart() {
    let dir = tempfile::tempdir().unwrap();

    {
        let repo = file_repo(&dir);
        repo.set_api_key("KEY").unwrap();
        repo.set_favorites(&vec![json!(730), json!(570)]).unwrap();
        repo.set_friend_codes(&vec![json!("76561198000000000")]).unwrap();
        let rates = json!({"USD": 0.14, "EUR": 0.13});
        let Value::Object(rates) = rates else { unreachable!() };
        repo.replace_exchange_rates(&ExchangeRateSnapshot::new(rates, 42))
            .unwrap();
    }

    let repo = file_repo(&dir);
    let payload = SnapshotPayload::from(repo.stored_config());

    assert!(payload.has_api_key);
    assert_eq!(payload.config.favorites, vec![json!(730), json!(570)]);
    assert_eq!(payload.config.friend_codes.len(), 1);
    assert_eq!(payload.config.exchange_rates.unwrap().fetched_at, 42);
}

#[test]
fn test_keys_are_compatible_with_existing_data() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("bridge.json"),
        r#"{"steam_api_key":"OLD","favorites":["1","2"],"exchange_rates_ts":5}"#,
    )
    .unwrap();

    let repo = file_repo(&dir);
    assert_eq!(repo.api_key().as_deref(), Some("OLD"));
    assert_eq!(repo.favorites(), vec![json!("1"), json!("2")]);
    // Timestamp without a table is no snapshot.
    assert!(repo.exchange_rates().is_none());
    assert_eq!(repo.store().keys().len(), 3);
}

fn entry() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<u32>().prop_map(Value::from),
        "[0-9a-z]{1,12}".prop_map(Value::from),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn favorites_read_back_in_order(list in prop::collection::vec(entry(), 0..20)) {
        let dir = tempfile::tempdir().unwrap();
        let repo = file_repo(&dir);

        repo.set_favorites(&list).unwrap();
        prop_assert_eq!(repo.favorites(), list.clone());

        let reopened = file_repo(&dir);
        prop_assert_eq!(reopened.favorites(), list);
    }
}
