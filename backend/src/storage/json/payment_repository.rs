use anyhow::Result;
use async_trait::async_trait;
use log::{debug, info};
use shared::PaymentStatus;

use super::connection::JsonConnection;
use crate::domain::errors::DomainError;
use crate::domain::models::next_timestamp;
use crate::domain::models::payment::{Payment, PaymentPatch};
use crate::storage::traits::PaymentStorage;

/// Payment records of a JSON store
#[derive(Clone)]
pub struct PaymentRepository {
    connection: JsonConnection,
}

impl PaymentRepository {
    pub fn new(connection: JsonConnection) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl PaymentStorage for PaymentRepository {
    async fn store_payment(&self, payment: &Payment) -> Result<()> {
        self.connection
            .mutate(|document| {
                if document.payments.iter().any(|p| p.id == payment.id) {
                    return Err(DomainError::conflict(format!(
                        "Payment ID already exists: {}",
                        payment.id
                    )));
                }
                document.payments.push(payment.clone());
                Ok(())
            })
            .await?;

        info!(
            "Stored payment {} of {:.2} against credit {}",
            payment.id, payment.amount, payment.credit_id
        );
        Ok(())
    }

    async fn get_payment(&self, payment_id: &str) -> Result<Option<Payment>> {
        Ok(self
            .connection
            .read(|document| document.payments.iter().find(|p| p.id == payment_id).cloned())
            .await)
    }

    async fn list_payments_for_member(&self, member_id: &str) -> Result<Vec<Payment>> {
        let mut payments: Vec<Payment> = self
            .connection
            .read(|document| {
                document
                    .payments
                    .iter()
                    .rev()
                    .filter(|p| p.member_id == member_id)
                    .cloned()
                    .collect()
            })
            .await;
        payments.sort_by(|a, b| b.paid_at.cmp(&a.paid_at));
        Ok(payments)
    }

    async fn list_payments_for_credit(&self, credit_id: &str) -> Result<Vec<Payment>> {
        let mut payments: Vec<Payment> = self
            .connection
            .read(|document| {
                document
                    .payments
                    .iter()
                    .filter(|p| p.credit_id == credit_id)
                    .cloned()
                    .collect()
            })
            .await;
        payments.sort_by(|a, b| a.paid_at.cmp(&b.paid_at));
        Ok(payments)
    }

    async fn list_payments(&self) -> Result<Vec<Payment>> {
        Ok(self.connection.read(|document| document.payments.clone()).await)
    }

    async fn update_payment(&self, payment_id: &str, patch: PaymentPatch) -> Result<Option<Payment>> {
        let updated = self
            .connection
            .mutate(|document| {
                let Some(payment) = document.payments.iter_mut().find(|p| p.id == payment_id) else {
                    return Ok(None);
                };

                if let Some(expected) = patch.expected_status {
                    if payment.status != expected {
                        return Err(DomainError::conflict(format!(
                            "Payment {} is no longer {}",
                            payment_id,
                            status_label(expected)
                        )));
                    }
                }

                patch.apply(payment);
                payment.updated_at = next_timestamp(payment.updated_at);
                Ok(Some(payment.clone()))
            })
            .await?;

        if let Some(payment) = &updated {
            debug!("Updated payment {} ({:?})", payment.id, payment.status);
        }
        Ok(updated)
    }
}

fn status_label(status: PaymentStatus) -> &'static str {
    match status {
        PaymentStatus::Pending => "pending",
        PaymentStatus::Confirmed => "confirmed",
        PaymentStatus::Failed => "failed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::json::test_utils::{sample_payment, TestEnvironment};
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_store_and_list() {
        let env = TestEnvironment::new().await.unwrap();
        let repo = env.payment_repository();
        let mut older = sample_payment("member::a", "credit::1", 100.0, PaymentStatus::Confirmed);
        older.paid_at = Utc::now() - Duration::days(3);
        let newer = sample_payment("member::a", "credit::1", 50.0, PaymentStatus::Pending);
        let other = sample_payment("member::b", "credit::2", 10.0, PaymentStatus::Pending);

        for payment in [&older, &newer, &other] {
            repo.store_payment(payment).await.unwrap();
        }

        assert_eq!(repo.get_payment(&older.id).await.unwrap(), Some(older.clone()));
        assert_eq!(
            repo.list_payments_for_member("member::a").await.unwrap(),
            vec![newer.clone(), older.clone()]
        );
        assert_eq!(
            repo.list_payments_for_credit("credit::1").await.unwrap(),
            vec![older, newer]
        );
        assert_eq!(repo.list_payments().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_guarded_status_change() {
        let env = TestEnvironment::new().await.unwrap();
        let repo = env.payment_repository();
        let payment = sample_payment("member::a", "credit::1", 100.0, PaymentStatus::Pending);
        repo.store_payment(&payment).await.unwrap();

        let confirm = PaymentPatch {
            expected_status: Some(PaymentStatus::Pending),
            status: Some(PaymentStatus::Confirmed),
            ..Default::default()
        };
        let confirmed = repo.update_payment(&payment.id, confirm.clone()).await.unwrap().unwrap();
        assert_eq!(confirmed.status, PaymentStatus::Confirmed);

        let err = repo.update_payment(&payment.id, confirm).await.unwrap_err();
        assert!(matches!(DomainError::find(&err), Some(DomainError::Conflict(_))));
    }
}
