use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{info, warn};

use historia_core::keys;
use historia_core::models::chat_history::ChatHistory;
use historia_core::models::intake::ApplicationState;
use historia_core::models::screen::Screen;
use historia_core::models::snapshot::PersistedSnapshot;

use crate::error::StorageError;
use crate::store::KeyValueStore;

/// Write a snapshot to its three keys, overwriting any previous one.
///
/// Writing the same snapshot twice leaves the store in the same state.
pub fn save_snapshot(
    store: &dyn KeyValueStore,
    snapshot: &PersistedSnapshot,
) -> Result<(), StorageError> {
    save_json(store, keys::STATE, &snapshot.state)?;
    save_json(store, keys::CHAT_HISTORY, &snapshot.chat_history)?;
    store.put(keys::CURRENT_SCREEN, snapshot.active_screen.id().as_bytes())?;
    Ok(())
}

/// Load the saved snapshot.
///
/// Returns `Ok(None)` when any of the three keys is missing, and
/// `StorageError::Corrupt` when a value cannot be decoded.
pub fn load_snapshot(store: &dyn KeyValueStore) -> Result<Option<PersistedSnapshot>, StorageError> {
    let Some(state) = load_json::<ApplicationState>(store, keys::STATE)? else {
        return Ok(None);
    };
    let Some(chat_history) = load_json::<ChatHistory>(store, keys::CHAT_HISTORY)? else {
        return Ok(None);
    };
    let Some(screen_bytes) = store.get(keys::CURRENT_SCREEN)? else {
        return Ok(None);
    };

    let screen_id = String::from_utf8(screen_bytes).map_err(|e| StorageError::Corrupt {
        key: keys::CURRENT_SCREEN.to_string(),
        reason: e.to_string(),
    })?;
    let active_screen = screen_id
        .trim()
        .parse::<Screen>()
        .map_err(|e| StorageError::Corrupt {
            key: keys::CURRENT_SCREEN.to_string(),
            reason: e.to_string(),
        })?;

    Ok(Some(PersistedSnapshot {
        state,
        chat_history,
        active_screen,
    }))
}

/// Delete all snapshot keys.
pub fn clear_snapshot(store: &dyn KeyValueStore) -> Result<(), StorageError> {
    for key in keys::SNAPSHOT_KEYS {
        store.delete(key)?;
    }
    info!("saved session cleared");
    Ok(())
}

/// Load the saved snapshot, discarding it if it is corrupt.
///
/// A corrupt snapshot is logged and deleted so the caller falls back to a
/// fresh session. Other storage errors are returned.
pub fn restore_or_discard(
    store: &dyn KeyValueStore,
) -> Result<Option<PersistedSnapshot>, StorageError> {
    match load_snapshot(store) {
        Ok(snapshot) => Ok(snapshot),
        Err(StorageError::Corrupt { key, reason }) => {
            warn!(key = %key, reason = %reason, "discarding corrupt saved session");
            clear_snapshot(store)?;
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn save_json<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let body = serde_json::to_vec_pretty(value)?;
    store.put(key, &body)
}

fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    let Some(bytes) = store.get(key)? else {
        return Ok(None);
    };
    let value = serde_json::from_slice(&bytes).map_err(|e| StorageError::Corrupt {
        key: key.to_string(),
        reason: e.to_string(),
    })?;
    Ok(Some(value))
}
