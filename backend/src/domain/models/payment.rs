use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{PaymentMethod, PaymentStatus};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Payment {
    pub id: String,
    pub member_id: String,
    pub credit_id: String,
    pub amount: f64,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    #[serde(default)]
    pub description: Option<String>,
    pub paid_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn generate_id() -> String {
        format!("payment::{}", Uuid::new_v4())
    }
}

/// Status change for a payment, guarded like [`super::credit::CreditPatch`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentPatch {
    pub expected_status: Option<PaymentStatus>,
    pub status: Option<PaymentStatus>,
    pub description: Option<String>,
}

impl PaymentPatch {
    pub fn apply(self, payment: &mut Payment) {
        if let Some(status) = self.status {
            payment.status = status;
        }
        if let Some(description) = self.description {
            payment.description = Some(description);
        }
    }
}
