use gloo_storage::errors::StorageError;
use gloo_storage::{LocalStorage, Storage};
use log::warn;

const NAME_KEY: &str = "userName";
const SELECTION_KEY: &str = "selectedMovies";

pub fn load_visitor_name() -> Option<String> {
    match LocalStorage::get::<String>(NAME_KEY) {
        Ok(name) => Some(name),
        Err(StorageError::KeyNotFound(_)) => None,
        Err(err) => {
            warn!("Discarding stored visitor name: {}", err);
            None
        }
    }
}

pub fn save_visitor_name(name: &str) {
    if let Err(err) = LocalStorage::set(NAME_KEY, name) {
        warn!("Failed to persist visitor name: {}", err);
    }
}

pub fn load_selection() -> Vec<String> {
    match LocalStorage::get::<Vec<String>>(SELECTION_KEY) {
        Ok(ids) => ids,
        Err(StorageError::KeyNotFound(_)) => Vec::new(),
        Err(err) => {
            warn!("Discarding stored selection: {}", err);
            Vec::new()
        }
    }
}

pub fn save_selection(ids: &[String]) {
    if let Err(err) = LocalStorage::set(SELECTION_KEY, ids) {
        warn!("Failed to persist selection: {}", err);
    }
}

pub fn clear_visitor() {
    LocalStorage::delete(NAME_KEY);
    LocalStorage::delete(SELECTION_KEY);
}
