use web_sys::Storage;

use crate::session::{KeyValueStore, Navigator, StorageError};

/// `window.localStorage`.
pub struct BrowserStore;

fn local_storage() -> Result<Storage, StorageError> {
    web_sys::window()
        .ok_or(StorageError::Unavailable)?
        .local_storage()
        .map_err(|_| StorageError::Unavailable)?
        .ok_or(StorageError::Unavailable)
}

impl KeyValueStore for BrowserStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        local_storage()?
            .get_item(key)
            .map_err(|_| StorageError::Read(key.to_string()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        local_storage()?
            .set_item(key, value)
            .map_err(|_| StorageError::Write(key.to_string()))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        local_storage()?
            .remove_item(key)
            .map_err(|_| StorageError::Remove(key.to_string()))
    }
}

pub struct BrowserNavigator;

impl Navigator for BrowserNavigator {
    fn navigate(&self, path: &str) {
        let Some(window) = web_sys::window() else {
            log::warn!("window is unavailable, cannot navigate to {path}");
            return;
        };
        if window.location().set_href(path).is_err() {
            log::warn!("failed to navigate to {path}");
        }
    }

    fn current_path(&self) -> Option<String> {
        web_sys::window()?.location().pathname().ok()
    }
}
