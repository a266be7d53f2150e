//! # Storage Traits
//!
//! This module defines the storage abstraction traits that allow different
//! storage backends to be used interchangeably in the domain layer.

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::models::credit::{Credit, CreditPatch};
use crate::domain::models::member::{Member, MemberPatch};
use crate::domain::models::notification::Notification;
use crate::domain::models::payment::{Payment, PaymentPatch};
use crate::domain::models::setting::Setting;

/// Trait defining the interface for member storage operations
///
/// Uniqueness of consumer code (among active members), email and document is
/// checked by the store inside the same write that inserts the record.
#[async_trait]
pub trait MemberStorage: Send + Sync {
    /// Store a new member; fails with a conflict when a unique key is taken
    async fn store_member(&self, member: &Member) -> Result<()>;

    /// Retrieve a member by record ID, active or not
    async fn get_member(&self, member_id: &str) -> Result<Option<Member>>;

    /// Find an active member by consumer code
    async fn find_by_consumer_code(&self, consumer_code: &str) -> Result<Option<Member>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Member>>;

    async fn find_by_document(&self, document: &str) -> Result<Option<Member>>;

    /// List members in insertion order, optionally only the active ones
    async fn list_members(&self, active_only: bool) -> Result<Vec<Member>>;

    /// Merge a patch into a member and touch `updated_at`
    /// Returns None when the ID is unknown
    async fn update_member(&self, member_id: &str, patch: MemberPatch) -> Result<Option<Member>>;
}

/// Trait defining the interface for credit storage operations
#[async_trait]
pub trait CreditStorage: Send + Sync {
    async fn store_credit(&self, credit: &Credit) -> Result<()>;

    async fn get_credit(&self, credit_id: &str) -> Result<Option<Credit>>;

    /// List a member's credits, oldest request first
    async fn list_credits_for_member(&self, member_id: &str) -> Result<Vec<Credit>>;

    /// List all credits, oldest request first
    async fn list_credits(&self) -> Result<Vec<Credit>>;

    /// Apply a patch; a status guard that no longer holds is a conflict
    /// Returns None when the ID is unknown
    async fn update_credit(&self, credit_id: &str, patch: CreditPatch) -> Result<Option<Credit>>;
}

/// Trait defining the interface for payment storage operations
#[async_trait]
pub trait PaymentStorage: Send + Sync {
    async fn store_payment(&self, payment: &Payment) -> Result<()>;

    async fn get_payment(&self, payment_id: &str) -> Result<Option<Payment>>;

    /// List a member's payments, most recent first
    async fn list_payments_for_member(&self, member_id: &str) -> Result<Vec<Payment>>;

    /// List the payments made against one credit, oldest first
    async fn list_payments_for_credit(&self, credit_id: &str) -> Result<Vec<Payment>>;

    async fn list_payments(&self) -> Result<Vec<Payment>>;

    async fn update_payment(&self, payment_id: &str, patch: PaymentPatch) -> Result<Option<Payment>>;
}

/// Trait defining the interface for notification storage operations
#[async_trait]
pub trait NotificationStorage: Send + Sync {
    async fn store_notification(&self, notification: &Notification) -> Result<()>;

    /// List a member's notifications, newest first
    async fn list_notifications_for_member(&self, member_id: &str) -> Result<Vec<Notification>>;

    async fn list_notifications(&self) -> Result<Vec<Notification>>;
}

/// Trait defining the interface for admin settings storage operations
#[async_trait]
pub trait SettingStorage: Send + Sync {
    async fn get_setting(&self, key: &str) -> Result<Option<Setting>>;

    async fn list_settings(&self) -> Result<Vec<Setting>>;

    /// Replace the value of an existing key
    /// Returns None when the key does not exist
    async fn update_setting(
        &self,
        key: &str,
        value: &str,
        description: Option<String>,
    ) -> Result<Option<Setting>>;
}

/// Trait defining the interface for storage connections
///
/// This trait abstracts away the specific connection type and provides
/// factory methods for creating repositories. This allows the domain layer to
/// work with any storage backend without knowing the implementation details.
pub trait Connection: Send + Sync + Clone {
    type MemberRepository: MemberStorage + Clone;
    type CreditRepository: CreditStorage + Clone;
    type PaymentRepository: PaymentStorage + Clone;
    type NotificationRepository: NotificationStorage + Clone;
    type SettingRepository: SettingStorage + Clone;

    fn create_member_repository(&self) -> Self::MemberRepository;

    fn create_credit_repository(&self) -> Self::CreditRepository;

    fn create_payment_repository(&self) -> Self::PaymentRepository;

    fn create_notification_repository(&self) -> Self::NotificationRepository;

    fn create_setting_repository(&self) -> Self::SettingRepository;
}
