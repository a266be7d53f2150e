use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use shared::CreditStatus;
use uuid::Uuid;

/// Days between approval and the due date
pub const CREDIT_TERM_DAYS: i64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Credit {
    pub id: String,
    pub member_id: String,
    pub amount: f64,
    pub interest_rate: f64,
    pub interest: f64,
    /// amount + interest, fixed when the credit is created
    pub total: f64,
    pub status: CreditStatus,
    #[serde(default)]
    pub description: Option<String>,
    pub requested_at: DateTime<Utc>,
    #[serde(default)]
    pub decided_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Credit {
    pub fn generate_id() -> String {
        format!("credit::{}", Uuid::new_v4())
    }

    /// Interest and total owed for a principal at the given rate.
    pub fn price(amount: f64, interest_rate: f64) -> (f64, f64) {
        let interest = amount * interest_rate;
        (interest, amount + interest)
    }

    pub fn due_date_from(start: DateTime<Utc>) -> DateTime<Utc> {
        start + Duration::days(CREDIT_TERM_DAYS)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.status, CreditStatus::Rejected | CreditStatus::Paid)
    }
}

/// Status transition or field update for a credit.
///
/// When `expected_status` is set, the update only applies if the stored
/// credit is still in that status; otherwise the store reports a conflict.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreditPatch {
    pub expected_status: Option<CreditStatus>,
    pub status: Option<CreditStatus>,
    pub decided_at: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub description: Option<String>,
}

impl CreditPatch {
    pub fn apply(self, credit: &mut Credit) {
        if let Some(status) = self.status {
            credit.status = status;
        }
        if let Some(decided_at) = self.decided_at {
            credit.decided_at = Some(decided_at);
        }
        if let Some(due_date) = self.due_date {
            credit.due_date = Some(due_date);
        }
        if let Some(description) = self.description {
            credit.description = Some(description);
        }
    }
}
