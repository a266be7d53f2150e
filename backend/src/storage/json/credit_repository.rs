use anyhow::Result;
use async_trait::async_trait;
use log::{debug, info};

use super::connection::JsonConnection;
use crate::domain::errors::DomainError;
use crate::domain::models::credit::{Credit, CreditPatch};
use crate::domain::models::next_timestamp;
use crate::storage::traits::CreditStorage;

/// Credit records of a JSON store
#[derive(Clone)]
pub struct CreditRepository {
    connection: JsonConnection,
}

impl CreditRepository {
    pub fn new(connection: JsonConnection) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl CreditStorage for CreditRepository {
    async fn store_credit(&self, credit: &Credit) -> Result<()> {
        self.connection
            .mutate(|document| {
                if document.credits.iter().any(|c| c.id == credit.id) {
                    return Err(DomainError::conflict(format!(
                        "Credit ID already exists: {}",
                        credit.id
                    )));
                }
                document.credits.push(credit.clone());
                Ok(())
            })
            .await?;

        info!(
            "Stored credit {} for member {} ({:.2}, {})",
            credit.id, credit.member_id, credit.amount, credit.status
        );
        Ok(())
    }

    async fn get_credit(&self, credit_id: &str) -> Result<Option<Credit>> {
        Ok(self
            .connection
            .read(|document| document.credits.iter().find(|c| c.id == credit_id).cloned())
            .await)
    }

    async fn list_credits_for_member(&self, member_id: &str) -> Result<Vec<Credit>> {
        let mut credits: Vec<Credit> = self
            .connection
            .read(|document| {
                document
                    .credits
                    .iter()
                    .filter(|c| c.member_id == member_id)
                    .cloned()
                    .collect()
            })
            .await;
        credits.sort_by(|a, b| a.requested_at.cmp(&b.requested_at));
        Ok(credits)
    }

    async fn list_credits(&self) -> Result<Vec<Credit>> {
        let mut credits = self.connection.read(|document| document.credits.clone()).await;
        credits.sort_by(|a, b| a.requested_at.cmp(&b.requested_at));
        Ok(credits)
    }

    async fn update_credit(&self, credit_id: &str, patch: CreditPatch) -> Result<Option<Credit>> {
        let updated = self
            .connection
            .mutate(|document| {
                let Some(credit) = document.credits.iter_mut().find(|c| c.id == credit_id) else {
                    return Ok(None);
                };

                if let Some(expected) = patch.expected_status {
                    if credit.status != expected {
                        return Err(DomainError::conflict(format!(
                            "Credit {} has already been processed (status: {})",
                            credit_id, credit.status
                        )));
                    }
                }

                patch.apply(credit);
                credit.updated_at = next_timestamp(credit.updated_at);
                Ok(Some(credit.clone()))
            })
            .await?;

        if let Some(credit) = &updated {
            debug!("Updated credit {} (status: {})", credit.id, credit.status);
        }
        Ok(updated)
    }
}
