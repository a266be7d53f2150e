use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::NotificationOutcome;
use uuid::Uuid;

pub const CREDIT_REQUESTED: &str = "credit_requested";
pub const CREDIT_CREATED: &str = "credit_created";
pub const CREDIT_APPROVED: &str = "credit_approved";
pub const CREDIT_REJECTED: &str = "credit_rejected";
pub const PAYMENT_CONFIRMED: &str = "payment_confirmed";
pub const PAYMENT_FAILED: &str = "payment_failed";
pub const MONTHLY_PAYMENT: &str = "monthly_payment";
pub const MONTHLY_PAYMENT_REGISTERED: &str = "monthly_payment_registered";

/// Message tied to a member, recorded alongside workflow events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: String,
    pub member_id: String,
    pub kind: String,
    pub description: String,
    pub outcome: NotificationOutcome,
    #[serde(default)]
    pub response: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub responded_at: Option<DateTime<Utc>>,
}

impl Notification {
    pub fn generate_id() -> String {
        format!("notification::{}", Uuid::new_v4())
    }

    /// A notification for an event that has already been resolved.
    pub fn resolved(
        member_id: &str,
        kind: &str,
        description: String,
        outcome: NotificationOutcome,
        response: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Self::generate_id(),
            member_id: member_id.to_string(),
            kind: kind.to_string(),
            description,
            outcome,
            response,
            created_at: now,
            responded_at: Some(now),
        }
    }

    /// A notification still waiting for an administrator's answer.
    pub fn pending(member_id: &str, kind: &str, description: String) -> Self {
        Self {
            id: Self::generate_id(),
            member_id: member_id.to_string(),
            kind: kind.to_string(),
            description,
            outcome: NotificationOutcome::Pending,
            response: None,
            created_at: Utc::now(),
            responded_at: None,
        }
    }
}
