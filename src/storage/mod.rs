// Keyed preference storage, scoped by source instance

use std::{collections::HashMap, sync::Mutex};

use uuid::Uuid;

mod db;

pub use db::DbSettingsStore;

pub const SERVER_URL_KEY: &str = "server_url";
pub const API_KEY_KEY: &str = "api_key";
pub const USER_ID_KEY: &str = "user_id";

#[async_trait::async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get(&self, source_id: Uuid, key: &str) -> anyhow::Result<Option<String>>;
    async fn set(&self, source_id: Uuid, key: &str, value: &str) -> anyhow::Result<()>;
    async fn remove(&self, source_id: Uuid, key: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    values: Mutex<HashMap<(Uuid, String), String>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> anyhow::Result<std::sync::MutexGuard<'_, HashMap<(Uuid, String), String>>> {
        self.values
            .lock()
            .map_err(|_| anyhow::anyhow!("settings lock poisoned"))
    }
}

#[async_trait::async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn get(&self, source_id: Uuid, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.lock()?.get(&(source_id, key.to_string())).cloned())
    }

    async fn set(&self, source_id: Uuid, key: &str, value: &str) -> anyhow::Result<()> {
        self.lock()?
            .insert((source_id, key.to_string()), value.to_string());
        Ok(())
    }

    async fn remove(&self, source_id: Uuid, key: &str) -> anyhow::Result<()> {
        self.lock()?.remove(&(source_id, key.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_is_scoped_by_source() {
        let store = MemorySettingsStore::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        store.set(a, API_KEY_KEY, "one").await.unwrap();
        store.set(b, API_KEY_KEY, "two").await.unwrap();
        assert_eq!(store.get(a, API_KEY_KEY).await.unwrap().as_deref(), Some("one"));
        assert_eq!(store.get(b, API_KEY_KEY).await.unwrap().as_deref(), Some("two"));
        store.remove(a, API_KEY_KEY).await.unwrap();
        assert_eq!(store.get(a, API_KEY_KEY).await.unwrap(), None);
        assert_eq!(store.get(b, API_KEY_KEY).await.unwrap().as_deref(), Some("two"));
    }
}
