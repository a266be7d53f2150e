use shared::{Setting as SharedSetting, SettingListResponse, SettingResponse};

use super::timestamp;
use crate::domain::models::setting::Setting as DomainSetting;

pub struct SettingMapper;

impl SettingMapper {
    pub fn to_dto(domain: DomainSetting) -> SharedSetting {
        SharedSetting {
            id: domain.id,
            key: domain.key,
            value: domain.value,
            description: domain.description,
            updated_at: timestamp(domain.updated_at),
        }
    }

    pub fn to_setting_list_dto(settings: Vec<DomainSetting>) -> SettingListResponse {
        SettingListResponse {
            settings: settings.into_iter().map(Self::to_dto).collect(),
        }
    }

    pub fn to_setting_response_dto(domain: DomainSetting, message: &str) -> SettingResponse {
        SettingResponse {
            setting: Self::to_dto(domain),
            success_message: message.to_string(),
        }
    }
}
