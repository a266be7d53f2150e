//! Test utilities module for automatic cleanup and consistent test infrastructure
//!
//! The store lives in a temporary directory that is removed when the
//! environment is dropped, even if the test panics.

use anyhow::Result;
use chrono::Utc;
use shared::{CreditStatus, PaymentMethod, PaymentStatus};
use std::path::PathBuf;
use tempfile::TempDir;

use super::connection::JsonConnection;
use super::{
    CreditRepository, MemberRepository, NotificationRepository, PaymentRepository,
    SettingRepository,
};
use crate::domain::models::credit::Credit;
use crate::domain::models::member::Member;
use crate::domain::models::payment::Payment;
use crate::storage::traits::Connection;

/// Password of the administrator seeded into every test store
pub const TEST_ADMIN_PASSWORD: &str = "admin123";

/// Test environment that provides a temporary directory and a store opened
/// inside it.
pub struct TestEnvironment {
    pub connection: JsonConnection,
    /// Directory holding the store, for backups and exports
    pub base_path: PathBuf,
    pub store_path: PathBuf,
    _temp_dir: TempDir, // Keep alive to prevent cleanup
}

impl TestEnvironment {
    pub async fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let store_path = temp_dir.path().join("ledger.json");
        let connection = JsonConnection::open(&store_path, TEST_ADMIN_PASSWORD).await?;
        Ok(Self {
            connection,
            base_path: temp_dir.path().to_path_buf(),
            store_path,
            _temp_dir: temp_dir,
        })
    }

    pub fn member_repository(&self) -> MemberRepository {
        self.connection.create_member_repository()
    }

    pub fn credit_repository(&self) -> CreditRepository {
        self.connection.create_credit_repository()
    }

    pub fn payment_repository(&self) -> PaymentRepository {
        self.connection.create_payment_repository()
    }

    pub fn notification_repository(&self) -> NotificationRepository {
        self.connection.create_notification_repository()
    }

    pub fn setting_repository(&self) -> SettingRepository {
        self.connection.create_setting_repository()
    }

    /// ID of the seeded administrator
    pub async fn admin_id(&self) -> String {
        self.connection
            .read(|document| {
                document
                    .members
                    .iter()
                    .find(|m| m.is_admin)
                    .map(|m| m.id.clone())
                    .unwrap_or_default()
            })
            .await
    }
}

/// An active non-member with a placeholder password hash
pub fn sample_member(consumer_code: &str) -> Member {
    let now = Utc::now();
    Member {
        id: Member::generate_id(),
        consumer_code: consumer_code.to_string(),
        name: format!("Member {}", consumer_code),
        email: None,
        password_hash: "$argon2id$placeholder".to_string(),
        phone: Some("+244 900 000 001".to_string()),
        document: None,
        address: None,
        city: Some("Luanda".to_string()),
        state: None,
        zip_code: None,
        birth_date: None,
        is_member: false,
        is_admin: false,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

pub fn sample_credit(member_id: &str, amount: f64, status: CreditStatus) -> Credit {
    let now = Utc::now();
    let (interest, total) = Credit::price(amount, 0.15);
    Credit {
        id: Credit::generate_id(),
        member_id: member_id.to_string(),
        amount,
        interest_rate: 0.15,
        interest,
        total,
        status,
        description: Some("Test credit".to_string()),
        requested_at: now,
        decided_at: None,
        due_date: Some(Credit::due_date_from(now)),
        updated_at: now,
    }
}

pub fn sample_payment(member_id: &str, credit_id: &str, amount: f64, status: PaymentStatus) -> Payment {
    let now = Utc::now();
    Payment {
        id: Payment::generate_id(),
        member_id: member_id.to_string(),
        credit_id: credit_id.to_string(),
        amount,
        method: PaymentMethod::Transfer,
        status,
        description: None,
        paid_at: now,
        updated_at: now,
    }
}
