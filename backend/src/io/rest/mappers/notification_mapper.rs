use shared::{Notification as SharedNotification, NotificationListResponse};

use super::{optional_timestamp, timestamp};
use crate::domain::models::notification::Notification as DomainNotification;

pub struct NotificationMapper;

impl NotificationMapper {
    pub fn to_dto(domain: DomainNotification) -> SharedNotification {
        SharedNotification {
            id: domain.id,
            member_id: domain.member_id,
            kind: domain.kind,
            description: domain.description,
            outcome: domain.outcome,
            response: domain.response,
            created_at: timestamp(domain.created_at),
            responded_at: optional_timestamp(domain.responded_at),
        }
    }

    pub fn to_notification_list_dto(notifications: Vec<DomainNotification>) -> NotificationListResponse {
        NotificationListResponse {
            notifications: notifications.into_iter().map(Self::to_dto).collect(),
        }
    }
}
