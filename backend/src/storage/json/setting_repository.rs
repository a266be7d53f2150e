use anyhow::Result;
use async_trait::async_trait;
use log::info;

use super::connection::JsonConnection;
use crate::domain::models::next_timestamp;
use crate::domain::models::setting::Setting;
use crate::storage::traits::SettingStorage;

#[derive(Clone)]
pub struct SettingRepository {
    connection: JsonConnection,
}

impl SettingRepository {
    pub fn new(connection: JsonConnection) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl SettingStorage for SettingRepository {
    async fn get_setting(&self, key: &str) -> Result<Option<Setting>> {
        Ok(self
            .connection
            .read(|document| document.settings.iter().find(|s| s.key == key).cloned())
            .await)
    }

    async fn list_settings(&self) -> Result<Vec<Setting>> {
        Ok(self.connection.read(|document| document.settings.clone()).await)
    }

    async fn update_setting(
        &self,
        key: &str,
        value: &str,
        description: Option<String>,
    ) -> Result<Option<Setting>> {
        let updated = self
            .connection
            .mutate(|document| {
                let Some(setting) = document.settings.iter_mut().find(|s| s.key == key) else {
                    return Ok(None);
                };
                setting.value = value.to_string();
                if let Some(description) = description {
                    setting.description = Some(description);
                }
                setting.updated_at = next_timestamp(setting.updated_at);
                Ok(Some(setting.clone()))
            })
            .await?;

        if updated.is_some() {
            info!("Setting {} changed to {}", key, value);
        }
        Ok(updated)
    }
}
