use historia_core::keys;
use historia_core::models::chat_history::ChatHistory;
use historia_core::models::intake::ApplicationState;
use historia_core::models::screen::Screen;
use historia_core::models::snapshot::PersistedSnapshot;
use historia_storage::error::StorageError;
use historia_storage::snapshot::{clear_snapshot, load_snapshot, restore_or_discard, save_snapshot};
use historia_storage::store::{FileStore, KeyValueStore, MemoryStore};

fn sample_snapshot() -> PersistedSnapshot {
    let mut state = ApplicationState::default();
    state.preliminary.name = "Asha".to_string();
    state.preliminary.age = "34".to_string();
    state.preliminary.sex = "Female".to_string();
    state.chief_complaint.symptom = "headache".to_string();
    state.chief_complaint.duration = "3 days".to_string();
    state.record_exchange("Where is the pain?", "Forehead");

    let mut chat_history = ChatHistory::default();
    chat_history.push_user("Start of consultation.");
    chat_history.push_assistant("Where is the pain?");
    chat_history.push_user("Forehead");

    PersistedSnapshot {
        state,
        chat_history,
        active_screen: Screen::HpiChat,
    }
}

#[test]
fn file_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path()).unwrap();
    let snapshot = sample_snapshot();

    save_snapshot(&store, &snapshot).unwrap();
    let loaded = load_snapshot(&store).unwrap().unwrap();
    assert_eq!(loaded, snapshot);
}

#[test]
fn saving_twice_restores_identically() {
    let store = MemoryStore::new();
    let snapshot = sample_snapshot();

    save_snapshot(&store, &snapshot).unwrap();
    let first = store.get(keys::STATE).unwrap();
    save_snapshot(&store, &snapshot).unwrap();
    let second = store.get(keys::STATE).unwrap();

    assert_eq!(first, second);
    assert_eq!(load_snapshot(&store).unwrap().unwrap(), snapshot);
}

#[test]
fn empty_store_has_no_session() {
    let store = MemoryStore::new();
    assert!(load_snapshot(&store).unwrap().is_none());
}

#[test]
fn any_missing_key_means_no_session() {
    for missing in keys::SNAPSHOT_KEYS {
        let store = MemoryStore::new();
        save_snapshot(&store, &sample_snapshot()).unwrap();
        store.delete(missing).unwrap();
        assert!(load_snapshot(&store).unwrap().is_none(), "missing {missing}");
    }
}

#[test]
fn corrupt_state_is_reported() {
    let store = MemoryStore::new();
    save_snapshot(&store, &sample_snapshot()).unwrap();
    store.put(keys::STATE, b"{not json").unwrap();

    let err = load_snapshot(&store).unwrap_err();
    assert!(matches!(err, StorageError::Corrupt { key, .. } if key == keys::STATE));
}

#[test]
fn unknown_screen_is_corrupt() {
    let store = MemoryStore::new();
    save_snapshot(&store, &sample_snapshot()).unwrap();
    store.put(keys::CURRENT_SCREEN, b"billing-screen").unwrap();

    let err = load_snapshot(&store).unwrap_err();
    assert!(matches!(err, StorageError::Corrupt { key, .. } if key == keys::CURRENT_SCREEN));
}

#[test]
fn restore_discards_corrupt_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path()).unwrap();
    save_snapshot(&store, &sample_snapshot()).unwrap();
    store.put(keys::CHAT_HISTORY, b"[[[").unwrap();

    assert!(restore_or_discard(&store).unwrap().is_none());
    for key in keys::SNAPSHOT_KEYS {
        assert!(store.get(key).unwrap().is_none(), "{key} should be deleted");
    }
}

#[test]
fn clear_removes_every_key() {
    let store = MemoryStore::new();
    save_snapshot(&store, &sample_snapshot()).unwrap();
    clear_snapshot(&store).unwrap();
    assert!(load_snapshot(&store).unwrap().is_none());
    // Clearing an empty store is fine too.
    clear_snapshot(&store).unwrap();
}

#[test]
fn file_store_rejects_path_like_keys() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path()).unwrap();
    let err = store.put("../escape", b"x").unwrap_err();
    assert!(matches!(err, StorageError::InvalidKey(_)));
}

#[test]
fn file_store_leaves_no_temp_files() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path()).unwrap();
    save_snapshot(&store, &sample_snapshot()).unwrap();

    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}
