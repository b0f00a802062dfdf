use anyhow::Context;
use entities::source_setting;
use sea_orm::{ActiveValue::Set, DatabaseConnection, EntityTrait, sea_query::OnConflict};
use uuid::Uuid;

use super::SettingsStore;

/// Settings persisted in the `source_settings` table.
#[derive(Clone, Debug)]
pub struct DbSettingsStore {
    db: DatabaseConnection,
}

impl DbSettingsStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl SettingsStore for DbSettingsStore {
    #[tracing::instrument(level = "debug", skip(self))]
    async fn get(&self, source_id: Uuid, key: &str) -> anyhow::Result<Option<String>> {
        let row = source_setting::Entity::find_by_id((source_id, key.to_string()))
            .one(&self.db)
            .await
            .with_context(|| format!("Failed to read setting {key}"))?;
        Ok(row.map(|m| m.value))
    }

    #[tracing::instrument(level = "debug", skip(self, value))]
    async fn set(&self, source_id: Uuid, key: &str, value: &str) -> anyhow::Result<()> {
        let row = source_setting::ActiveModel {
            source_id: Set(source_id),
            key: Set(key.to_string()),
            value: Set(value.to_string()),
            updated_at: Set(chrono::Utc::now()),
        };
        source_setting::Entity::insert(row)
            .on_conflict(
                OnConflict::columns([source_setting::Column::SourceId, source_setting::Column::Key])
                    .update_columns([source_setting::Column::Value, source_setting::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .with_context(|| format!("Failed to write setting {key}"))?;
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn remove(&self, source_id: Uuid, key: &str) -> anyhow::Result<()> {
        source_setting::Entity::delete_by_id((source_id, key.to_string()))
            .exec(&self.db)
            .await
            .with_context(|| format!("Failed to delete setting {key}"))?;
        Ok(())
    }
}
