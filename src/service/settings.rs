use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::db::Storage;
use crate::error::TrackletError;

/// Process wide memo of setting lookups. Missing settings are cached too.
#[derive(Debug, Default)]
pub struct SettingsCache {
    values: RwLock<HashMap<String, Option<String>>>,
}

impl SettingsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, storage: &Storage, key: &str) -> Result<Option<String>, TrackletError> {
        if let Some(hit) = self.cached(key) {
            return Ok(hit);
        }
        let value = storage.setting(key).await?;
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.clone());
        Ok(value)
    }

    pub fn cached(&self, key: &str) -> Option<Option<String>> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}
