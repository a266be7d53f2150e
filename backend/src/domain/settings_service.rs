//! Typed access to the administrator settings (interest rates, credit limits).

use anyhow::Result;
use log::{info, warn};
use std::sync::Arc;

use crate::domain::errors::DomainError;
use crate::domain::member_service::MemberService;
use crate::domain::models::setting::{
    Setting, CREDIT_LIMIT_MEMBERS, CREDIT_LIMIT_NON_MEMBERS, INTEREST_RATE_MEMBERS,
    INTEREST_RATE_NON_MEMBERS,
};
use crate::storage::{Connection, SettingStorage};

#[derive(Clone)]
pub struct SettingsService<C: Connection> {
    setting_repository: C::SettingRepository,
    member_service: MemberService<C>,
}

impl<C: Connection> SettingsService<C> {
    pub fn new(connection: Arc<C>, member_service: MemberService<C>) -> Self {
        let setting_repository = connection.create_setting_repository();
        Self {
            setting_repository,
            member_service,
        }
    }

    /// Numeric value of a setting, falling back to the seeded default when the
    /// row is missing or unreadable.
    async fn numeric(&self, key: &str) -> Result<f64> {
        if let Some(setting) = self.setting_repository.get_setting(key).await? {
            match setting.numeric_value() {
                Some(value) => return Ok(value),
                None => warn!("Setting {} has non-numeric value {:?}, using default", key, setting.value),
            }
        }
        Setting::default_value(key)
            .and_then(|value| value.parse::<f64>().ok())
            .ok_or_else(|| anyhow::anyhow!("No value for setting {}", key))
    }

    pub async fn member_rate(&self) -> Result<f64> {
        self.numeric(INTEREST_RATE_MEMBERS).await
    }

    pub async fn non_member_rate(&self) -> Result<f64> {
        self.numeric(INTEREST_RATE_NON_MEMBERS).await
    }

    pub async fn interest_rate(&self, is_member: bool) -> Result<f64> {
        if is_member {
            self.member_rate().await
        } else {
            self.non_member_rate().await
        }
    }

    pub async fn credit_limit(&self, is_member: bool) -> Result<f64> {
        if is_member {
            self.numeric(CREDIT_LIMIT_MEMBERS).await
        } else {
            self.numeric(CREDIT_LIMIT_NON_MEMBERS).await
        }
    }

    pub async fn list_settings(&self) -> Result<Vec<Setting>> {
        self.setting_repository.list_settings().await
    }

    /// Change a setting. Rates must lie in [0, 1] and limits in
    /// [0, MAX_CREDIT_LIMIT].
    pub async fn update_setting(
        &self,
        admin_id: &str,
        key: &str,
        value: &str,
        description: Option<String>,
    ) -> Result<Setting> {
        self.member_service.require_admin(admin_id).await?;

        let value = value.trim();
        let range = Setting::allowed_range(key);
        match value.parse::<f64>() {
            Ok(number) if range.contains(&number) => {}
            _ => {
                return Err(DomainError::validation(format!(
                    "Setting {} must be a number between {} and {}",
                    key,
                    range.start(),
                    range.end()
                )))
            }
        }

        let setting = self
            .setting_repository
            .update_setting(key, value, description)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Setting not found: {}", key)))?;
        info!("Admin {} changed {} to {}", admin_id, key, setting.value);
        Ok(setting)
    }
}
