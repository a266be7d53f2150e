use anyhow::Result;
use async_trait::async_trait;
use log::debug;

use super::connection::JsonConnection;
use crate::domain::models::notification::Notification;
use crate::storage::traits::NotificationStorage;

#[derive(Clone)]
pub struct NotificationRepository {
    connection: JsonConnection,
}

impl NotificationRepository {
    pub fn new(connection: JsonConnection) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl NotificationStorage for NotificationRepository {
    async fn store_notification(&self, notification: &Notification) -> Result<()> {
        self.connection
            .mutate(|document| {
                document.notifications.push(notification.clone());
                Ok(())
            })
            .await?;
        debug!(
            "Stored {} notification for member {}",
            notification.kind, notification.member_id
        );
        Ok(())
    }

    async fn list_notifications_for_member(&self, member_id: &str) -> Result<Vec<Notification>> {
        let mut notifications: Vec<Notification> = self
            .connection
            .read(|document| {
                document
                    .notifications
                    .iter()
                    .rev()
                    .filter(|n| n.member_id == member_id)
                    .cloned()
                    .collect()
            })
            .await;
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notifications)
    }

    async fn list_notifications(&self) -> Result<Vec<Notification>> {
        Ok(self
            .connection
            .read(|document| document.notifications.clone())
            .await)
    }
}
