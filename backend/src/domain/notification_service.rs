use anyhow::Result;
use log::{info, warn};
use std::sync::Arc;

use crate::domain::member_service::MemberService;
use crate::domain::models::notification::Notification;
use crate::storage::{Connection, NotificationStorage};

/// Records and lists the messages attached to workflow events.
#[derive(Clone)]
pub struct NotificationService<C: Connection> {
    notification_repository: C::NotificationRepository,
    member_service: MemberService<C>,
}

impl<C: Connection> NotificationService<C> {
    pub fn new(connection: Arc<C>, member_service: MemberService<C>) -> Self {
        let notification_repository = connection.create_notification_repository();
        Self {
            notification_repository,
            member_service,
        }
    }

    pub async fn record(&self, notification: Notification) -> Result<Notification> {
        self.notification_repository.store_notification(&notification).await?;
        Ok(notification)
    }

    /// Record a notification whose failure must not undo the caller's work.
    ///
    /// Used after a workflow step has already been saved; the notification is
    /// a separate write and losing it is logged rather than reported.
    pub async fn record_after(&self, notification: Notification) {
        let kind = notification.kind.clone();
        if let Err(e) = self.notification_repository.store_notification(&notification).await {
            warn!("Failed to record {} notification: {}", kind, e);
        }
    }

    /// A member's notifications, newest first.
    pub async fn list_for_member(&self, member_id: &str) -> Result<Vec<Notification>> {
        self.member_service.require_member(member_id).await?;
        let notifications = self
            .notification_repository
            .list_notifications_for_member(member_id)
            .await?;
        info!("Found {} notifications for {}", notifications.len(), member_id);
        Ok(notifications)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::DomainError;
    use crate::domain::models::notification::CREDIT_REQUESTED;
    use crate::storage::json::test_utils::TestEnvironment;

    #[tokio::test]
    async fn test_record_and_list() {
        let env = TestEnvironment::new().await.unwrap();
        let connection = Arc::new(env.connection.clone());
        let service = NotificationService::new(connection.clone(), MemberService::new(connection));
        let admin_id = env.admin_id().await;

        service
            .record(Notification::pending(&admin_id, CREDIT_REQUESTED, "First".to_string()))
            .await
            .unwrap();
        service
            .record_after(Notification::pending(&admin_id, CREDIT_REQUESTED, "Second".to_string()))
            .await;

        let listed = service.list_for_member(&admin_id).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].description, "Second");

        let err = service.list_for_member("member::missing").await.unwrap_err();
        assert!(matches!(DomainError::find(&err), Some(DomainError::NotFound(_))));
    }
}
