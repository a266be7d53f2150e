use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use shared::{CreditStatus, PaymentStatus, StoreStats};

use crate::domain::errors::DomainError;
use crate::domain::models::credit::Credit;
use crate::domain::models::member::{Member, SEEDED_ADMIN_CODE};
use crate::domain::models::notification::Notification;
use crate::domain::models::payment::Payment;
use crate::domain::models::setting::Setting;
use crate::domain::password;

/// The whole persisted store: one array per entity type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Database {
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub credits: Vec<Credit>,
    #[serde(default)]
    pub payments: Vec<Payment>,
    #[serde(default)]
    pub notifications: Vec<Notification>,
    #[serde(default)]
    pub settings: Vec<Setting>,
}

impl Database {
    /// Document written when the store file does not exist yet: the
    /// administrator account plus the default settings.
    pub fn seeded(admin_password: &str) -> Result<Self> {
        let mut database = Database::default();
        database.ensure_seeded(admin_password)?;
        Ok(database)
    }

    /// Adds the administrator and any default setting that is missing.
    ///
    /// Fails when an administrator is needed but an active non-admin member
    /// already holds the administrator's consumer code.
    pub fn ensure_seeded(&mut self, admin_password: &str) -> Result<()> {
        let now = Utc::now();
        let has_admin = self.members.iter().any(|m| m.is_admin && m.is_active);
        if !has_admin {
            let code_taken = self
                .members
                .iter()
                .any(|m| m.is_active && m.consumer_code == SEEDED_ADMIN_CODE);
            if code_taken {
                return Err(DomainError::conflict(format!(
                    "Consumer code {} is held by a non-admin member; cannot seed the administrator",
                    SEEDED_ADMIN_CODE
                )));
            }
            self.members.push(Member {
                id: Member::generate_id(),
                consumer_code: SEEDED_ADMIN_CODE.to_string(),
                name: "Administrator".to_string(),
                email: None,
                password_hash: password::hash_password(admin_password)?,
                phone: None,
                document: None,
                address: None,
                city: None,
                state: None,
                zip_code: None,
                birth_date: None,
                is_member: true,
                is_admin: true,
                is_active: true,
                created_at: now,
                updated_at: now,
            });
        }

        for default in Setting::defaults(now) {
            if !self.settings.iter().any(|s| s.key == default.key) {
                self.settings.push(default);
            }
        }
        Ok(())
    }

    pub fn stats(&self) -> StoreStats {
        let count_credits = |status: CreditStatus| {
            self.credits.iter().filter(|c| c.status == status).count()
        };
        StoreStats {
            total_members: self.members.len(),
            active_members: self.members.iter().filter(|m| m.is_active).count(),
            members_with_membership: self.members.iter().filter(|m| m.is_member).count(),
            admins: self.members.iter().filter(|m| m.is_admin).count(),
            total_credits: self.credits.len(),
            requested_credits: count_credits(CreditStatus::Requested),
            approved_credits: count_credits(CreditStatus::Approved),
            rejected_credits: count_credits(CreditStatus::Rejected),
            paid_credits: count_credits(CreditStatus::Paid),
            total_credit_amount: self.credits.iter().map(|c| c.amount).sum(),
            total_payments: self.payments.len(),
            confirmed_payments: self
                .payments
                .iter()
                .filter(|p| p.status == PaymentStatus::Confirmed)
                .count(),
            total_notifications: self.notifications.len(),
            total_settings: self.settings.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::password::PasswordCheck;

    #[test]
    fn test_seeded_document() {
        let database = Database::seeded("admin123").unwrap();

        assert_eq!(database.members.len(), 1);
        let admin = &database.members[0];
        assert_eq!(admin.consumer_code, "ADMIN001");
        assert!(admin.is_admin && admin.is_member && admin.is_active);
        assert_eq!(
            password::verify_password("admin123", &admin.password_hash),
            PasswordCheck::Valid
        );

        let keys: Vec<&str> = database.settings.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "interest_rate_members",
                "interest_rate_non_members",
                "credit_limit_members",
                "credit_limit_non_members"
            ]
        );
        assert!(database.credits.is_empty() && database.payments.is_empty());
    }

    #[test]
    fn test_ensure_seeded_keeps_existing_values() {
        let mut database = Database::seeded("admin123").unwrap();
        database.settings[0].value = "0.10".to_string();

        database.ensure_seeded("other").unwrap();

        assert_eq!(database.members.len(), 1);
        assert_eq!(database.settings.len(), 4);
        assert_eq!(database.settings[0].value, "0.10");
    }

    #[test]
    fn test_seeding_refuses_taken_admin_code() {
        let mut database = Database::seeded("admin123").unwrap();
        database.members[0].is_admin = false;

        let err = database.ensure_seeded("admin123").unwrap_err();
        assert!(matches!(DomainError::find(&err), Some(DomainError::Conflict(_))));
        assert_eq!(database.members.len(), 1);

        // An inactive holder does not block seeding
        database.members[0].is_active = false;
        database.ensure_seeded("admin123").unwrap();
        assert_eq!(database.members.len(), 2);
        assert!(database.members[1].is_admin);
    }

    #[test]
    fn test_missing_collections_default_to_empty() {
        let database: Database = serde_json::from_str(r#"{"members": []}"#).unwrap();
        assert_eq!(database, Database::default());
    }
}
