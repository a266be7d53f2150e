//! # Credit Workflow
//!
//! Request, decision and settlement of credits.
//!
//! ## State Machine
//!
//! ```text
//! requested ──approve──▶ approved ──confirmed payments ≥ total──▶ paid
//!     │
//!     └──reject──▶ rejected
//! ```
//!
//! `rejected` and `paid` are terminal. Interest and total are fixed when the
//! credit is created and never recomputed. Decisions are a compare-and-set
//! against `requested` inside the store's write lock, so of two concurrent
//! decisions exactly one wins and the other sees a conflict.

use anyhow::Result;
use chrono::Utc;
use log::{info, warn};
use shared::{CreditStatus, NotificationOutcome, PaymentStatus};
use std::sync::Arc;

use crate::domain::commands::credits::{AdminCreditCommand, DecideCreditCommand, RequestCreditCommand};
use crate::domain::errors::DomainError;
use crate::domain::member_service::MemberService;
use crate::domain::models::credit::{Credit, CreditPatch};
use crate::domain::models::member::Member;
use crate::domain::models::notification::{self, Notification};
use crate::domain::notification_service::NotificationService;
use crate::domain::settings_service::SettingsService;
use crate::storage::{Connection, CreditStorage, PaymentStorage};

/// Tolerance when comparing summed payments against a credit total
const AMOUNT_EPSILON: f64 = 1e-6;

#[derive(Clone)]
pub struct CreditService<C: Connection> {
    credit_repository: C::CreditRepository,
    payment_repository: C::PaymentRepository,
    member_service: MemberService<C>,
    settings_service: SettingsService<C>,
    notification_service: NotificationService<C>,
}

impl<C: Connection> CreditService<C> {
    pub fn new(
        connection: Arc<C>,
        member_service: MemberService<C>,
        settings_service: SettingsService<C>,
        notification_service: NotificationService<C>,
    ) -> Self {
        let credit_repository = connection.create_credit_repository();
        let payment_repository = connection.create_payment_repository();
        Self {
            credit_repository,
            payment_repository,
            member_service,
            settings_service,
            notification_service,
        }
    }

    /// Price a credit for a member: checks the amount against the member's
    /// limit and returns (rate, interest, total).
    async fn price_for(&self, member: &Member, amount: f64) -> Result<(f64, f64, f64)> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(DomainError::validation("Amount must be greater than zero"));
        }
        let limit = self.settings_service.credit_limit(member.is_member).await?;
        if amount > limit {
            return Err(DomainError::validation(format!(
                "Amount exceeds the credit limit of {:.2}",
                limit
            )));
        }
        let rate = self.settings_service.interest_rate(member.is_member).await?;
        let (interest, total) = Credit::price(amount, rate);
        if !interest.is_finite() || !total.is_finite() {
            warn!("Pricing {:.2} at rate {} is not representable", amount, rate);
            return Err(DomainError::validation(
                "Credit total is out of range, check the interest rate settings",
            ));
        }
        Ok((rate, interest, total))
    }

    async fn require_active_member(&self, member_id: &str) -> Result<Member> {
        let member = self.member_service.require_member(member_id).await?;
        if !member.is_active {
            return Err(DomainError::forbidden("Member account is inactive"));
        }
        Ok(member)
    }

    /// A member asks for credit. The credit starts `requested` with a
    /// provisional due date 30 days out.
    pub async fn request_credit(&self, command: RequestCreditCommand) -> Result<Credit> {
        info!(
            "Credit request: member={}, amount={:.2}",
            command.member_id, command.amount
        );

        let member = self.require_active_member(&command.member_id).await?;
        let (interest_rate, interest, total) = self.price_for(&member, command.amount).await?;

        let now = Utc::now();
        let credit = Credit {
            id: Credit::generate_id(),
            member_id: member.id.clone(),
            amount: command.amount,
            interest_rate,
            interest,
            total,
            status: CreditStatus::Requested,
            description: command.description,
            requested_at: now,
            decided_at: None,
            due_date: Some(Credit::due_date_from(now)),
            updated_at: now,
        };
        self.credit_repository.store_credit(&credit).await?;

        self.notification_service
            .record_after(Notification::pending(
                &member.id,
                notification::CREDIT_REQUESTED,
                format!("Credit request of {:.2} awaiting review", credit.amount),
            ))
            .await;

        info!(
            "Created credit {} (rate {:.2}, interest {:.2}, total {:.2})",
            credit.id, interest_rate, interest, total
        );
        Ok(credit)
    }

    /// An administrator grants credit directly; it starts `approved`.
    pub async fn create_approved_credit(&self, command: AdminCreditCommand) -> Result<Credit> {
        let admin = self.member_service.require_admin(&command.admin_id).await?;
        let member = self.require_active_member(&command.member_id).await?;
        let (interest_rate, interest, total) = self.price_for(&member, command.amount).await?;

        let now = Utc::now();
        let credit = Credit {
            id: Credit::generate_id(),
            member_id: member.id.clone(),
            amount: command.amount,
            interest_rate,
            interest,
            total,
            status: CreditStatus::Approved,
            description: command.description,
            requested_at: now,
            decided_at: Some(now),
            due_date: Some(Credit::due_date_from(now)),
            updated_at: now,
        };
        self.credit_repository.store_credit(&credit).await?;

        self.notification_service
            .record_after(Notification::resolved(
                &member.id,
                notification::CREDIT_CREATED,
                format!("Credit of {:.2} granted", credit.amount),
                NotificationOutcome::Approved,
                Some(format!("Total due {:.2}", credit.total)),
            ))
            .await;

        info!(
            "Admin {} granted credit {} to {}",
            admin.consumer_code, credit.id, member.consumer_code
        );
        Ok(credit)
    }

    /// Approve or reject a requested credit.
    pub async fn decide_credit(&self, command: DecideCreditCommand) -> Result<Credit> {
        info!(
            "Deciding credit {}: approve={}",
            command.credit_id, command.approve
        );
        let admin = self.member_service.require_admin(&command.admin_id).await?;

        let existing = self
            .credit_repository
            .get_credit(&command.credit_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Credit not found: {}", command.credit_id)))?;
        if existing.status != CreditStatus::Requested {
            warn!(
                "Credit {} already processed (status: {})",
                existing.id, existing.status
            );
            return Err(DomainError::conflict(format!(
                "Credit has already been processed (status: {})",
                existing.status
            )));
        }

        let decided_at = Utc::now();
        let patch = if command.approve {
            CreditPatch {
                expected_status: Some(CreditStatus::Requested),
                status: Some(CreditStatus::Approved),
                decided_at: Some(decided_at),
                due_date: Some(Credit::due_date_from(decided_at)),
                ..Default::default()
            }
        } else {
            CreditPatch {
                expected_status: Some(CreditStatus::Requested),
                status: Some(CreditStatus::Rejected),
                decided_at: Some(decided_at),
                ..Default::default()
            }
        };
        let credit = self
            .credit_repository
            .update_credit(&command.credit_id, patch)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Credit not found: {}", command.credit_id)))?;

        let notice = if command.approve {
            Notification::resolved(
                &credit.member_id,
                notification::CREDIT_APPROVED,
                format!("Credit request of {:.2}", credit.amount),
                NotificationOutcome::Approved,
                Some(format!("Approved. Total due {:.2}", credit.total)),
            )
        } else {
            Notification::resolved(
                &credit.member_id,
                notification::CREDIT_REJECTED,
                format!("Credit request of {:.2}", credit.amount),
                NotificationOutcome::Rejected,
                Some("Rejected".to_string()),
            )
        };
        self.notification_service.record_after(notice).await;

        info!(
            "Admin {} set credit {} to {}",
            admin.consumer_code, credit.id, credit.status
        );
        Ok(credit)
    }

    pub async fn get_credit(&self, credit_id: &str) -> Result<Option<Credit>> {
        self.credit_repository.get_credit(credit_id).await
    }

    pub async fn require_credit(&self, credit_id: &str) -> Result<Credit> {
        self.credit_repository
            .get_credit(credit_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Credit not found: {}", credit_id)))
    }

    pub async fn list_member_credits(&self, member_id: &str) -> Result<Vec<Credit>> {
        self.member_service.require_member(member_id).await?;
        self.credit_repository.list_credits_for_member(member_id).await
    }

    pub async fn list_all_credits(&self, admin_id: &str) -> Result<Vec<Credit>> {
        self.member_service.require_admin(admin_id).await?;
        self.credit_repository.list_credits().await
    }

    /// Sum of confirmed payments made against a credit.
    pub async fn confirmed_total(&self, credit_id: &str) -> Result<f64> {
        let payments = self.payment_repository.list_payments_for_credit(credit_id).await?;
        Ok(payments
            .iter()
            .filter(|p| p.status == PaymentStatus::Confirmed)
            .map(|p| p.amount)
            .sum())
    }

    /// Outstanding amount of a credit (never negative).
    pub async fn outstanding(&self, credit: &Credit) -> Result<f64> {
        let paid = self.confirmed_total(&credit.id).await?;
        Ok((credit.total - paid).max(0.0))
    }

    /// Mark an approved credit `paid` once confirmed payments cover its total.
    ///
    /// Returns the credit as it stands afterwards.
    pub async fn settle_credit(&self, credit_id: &str) -> Result<Credit> {
        let credit = self.require_credit(credit_id).await?;
        if credit.status != CreditStatus::Approved {
            return Ok(credit);
        }

        let paid = self.confirmed_total(credit_id).await?;
        if paid + AMOUNT_EPSILON < credit.total {
            return Ok(credit);
        }

        let patch = CreditPatch {
            expected_status: Some(CreditStatus::Approved),
            status: Some(CreditStatus::Paid),
            ..Default::default()
        };
        match self.credit_repository.update_credit(credit_id, patch).await {
            Ok(Some(settled)) => {
                info!("Credit {} fully paid ({:.2} of {:.2})", credit_id, paid, settled.total);
                Ok(settled)
            }
            Ok(None) => Err(DomainError::not_found(format!("Credit not found: {}", credit_id))),
            // Settled concurrently by another confirmation
            Err(e) if matches!(DomainError::find(&e), Some(DomainError::Conflict(_))) => {
                self.require_credit(credit_id).await
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::members::{RegisterMemberCommand, SetMembershipCommand};
    use crate::storage::json::test_utils::{sample_payment, TestEnvironment, TEST_ADMIN_PASSWORD};
    use crate::storage::{JsonConnection, NotificationStorage, SettingStorage};
    use chrono::Duration;

    struct Fixture {
        env: TestEnvironment,
        members: MemberService<JsonConnection>,
        credits: CreditService<JsonConnection>,
        admin_id: String,
    }

    async fn setup_test() -> Fixture {
        let env = TestEnvironment::new().await.expect("Failed to create test store");
        let connection = Arc::new(env.connection.clone());
        let members = MemberService::new(connection.clone());
        let settings = SettingsService::new(connection.clone(), members.clone());
        let notifications = NotificationService::new(connection.clone(), members.clone());
        let credits = CreditService::new(connection, members.clone(), settings, notifications);
        let admin_id = env.admin_id().await;
        Fixture {
            env,
            members,
            credits,
            admin_id,
        }
    }

    async fn register(fixture: &Fixture, name: &str, is_member: bool) -> Member {
        let member = fixture
            .members
            .register(RegisterMemberCommand {
                name: name.to_string(),
                password: "secret123".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        if !is_member {
            return member;
        }
        fixture
            .members
            .set_membership(SetMembershipCommand {
                admin_id: fixture.admin_id.clone(),
                member_id: member.id,
                is_member: Some(true),
                is_admin: None,
            })
            .await
            .unwrap()
    }

    fn request(member_id: &str, amount: f64) -> RequestCreditCommand {
        RequestCreditCommand {
            member_id: member_id.to_string(),
            amount,
            description: Some("Working capital".to_string()),
        }
    }

    fn decide(fixture: &Fixture, credit_id: &str, approve: bool) -> DecideCreditCommand {
        DecideCreditCommand {
            credit_id: credit_id.to_string(),
            admin_id: fixture.admin_id.clone(),
            approve,
        }
    }

    #[tokio::test]
    async fn test_request_prices_by_membership() {
        let fixture = setup_test().await;
        let member = register(&fixture, "Member Ana", true).await;
        let outsider = register(&fixture, "Outsider Rui", false).await;

        let member_credit = fixture.credits.request_credit(request(&member.id, 1000.0)).await.unwrap();
        let outsider_credit = fixture.credits.request_credit(request(&outsider.id, 1000.0)).await.unwrap();

        assert_eq!(member_credit.interest_rate, 0.15);
        assert_eq!(member_credit.interest, 150.0);
        assert_eq!(member_credit.total, 1150.0);
        assert_eq!(member_credit.status, CreditStatus::Requested);
        assert_eq!(outsider_credit.interest, 250.0);
        assert_eq!(outsider_credit.total, 1250.0);

        let notifications = fixture
            .env
            .notification_repository()
            .list_notifications_for_member(&member.id)
            .await
            .unwrap();
        assert_eq!(notifications[0].kind, notification::CREDIT_REQUESTED);
    }

    #[tokio::test]
    async fn test_request_validation() {
        let fixture = setup_test().await;
        let outsider = register(&fixture, "Outsider Rui", false).await;

        for amount in [0.0, -5.0, 20000.01] {
            let err = fixture
                .credits
                .request_credit(request(&outsider.id, amount))
                .await
                .unwrap_err();
            assert!(matches!(DomainError::find(&err), Some(DomainError::Validation(_))));
        }

        let err = fixture
            .credits
            .request_credit(request("member::missing", 100.0))
            .await
            .unwrap_err();
        assert!(matches!(DomainError::find(&err), Some(DomainError::NotFound(_))));

        // Limit is inclusive
        fixture.credits.request_credit(request(&outsider.id, 20000.0)).await.unwrap();
    }

    #[tokio::test]
    async fn test_unrepresentable_total_is_rejected_and_store_stays_loadable() {
        let fixture = setup_test().await;
        let member = register(&fixture, "Member Ana", true).await;
        fixture
            .env
            .setting_repository()
            .update_setting("interest_rate_members", "1e308", None)
            .await
            .unwrap();

        let err = fixture
            .credits
            .request_credit(request(&member.id, 1000.0))
            .await
            .unwrap_err();
        assert!(matches!(DomainError::find(&err), Some(DomainError::Validation(_))));
        assert!(fixture.credits.list_member_credits(&member.id).await.unwrap().is_empty());

        JsonConnection::open(&fixture.env.store_path, TEST_ADMIN_PASSWORD)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_approve_sets_due_date_from_decision() {
        let fixture = setup_test().await;
        let member = register(&fixture, "Member Ana", true).await;
        let credit = fixture.credits.request_credit(request(&member.id, 1000.0)).await.unwrap();

        let approved = fixture.credits.decide_credit(decide(&fixture, &credit.id, true)).await.unwrap();

        assert_eq!(approved.status, CreditStatus::Approved);
        let decided_at = approved.decided_at.unwrap();
        assert_eq!(approved.due_date, Some(decided_at + Duration::days(30)));
        assert_eq!(approved.interest, credit.interest);
        assert_eq!(approved.total, credit.total);
    }

    #[tokio::test]
    async fn test_rejected_credit_cannot_be_approved() {
        let fixture = setup_test().await;
        let member = register(&fixture, "Member Ana", true).await;
        let credit = fixture.credits.request_credit(request(&member.id, 500.0)).await.unwrap();

        let rejected = fixture.credits.decide_credit(decide(&fixture, &credit.id, false)).await.unwrap();
        assert_eq!(rejected.status, CreditStatus::Rejected);

        let err = fixture
            .credits
            .decide_credit(decide(&fixture, &credit.id, true))
            .await
            .unwrap_err();
        assert!(matches!(DomainError::find(&err), Some(DomainError::Conflict(_))));
        assert_eq!(fixture.credits.get_credit(&credit.id).await.unwrap(), Some(rejected));
    }

    #[tokio::test]
    async fn test_decide_requires_admin_and_existing_credit() {
        let fixture = setup_test().await;
        let member = register(&fixture, "Member Ana", true).await;
        let credit = fixture.credits.request_credit(request(&member.id, 500.0)).await.unwrap();

        let err = fixture
            .credits
            .decide_credit(DecideCreditCommand {
                credit_id: credit.id.clone(),
                admin_id: member.id.clone(),
                approve: true,
            })
            .await
            .unwrap_err();
        assert!(matches!(DomainError::find(&err), Some(DomainError::Forbidden(_))));

        let err = fixture
            .credits
            .decide_credit(decide(&fixture, "credit::missing", true))
            .await
            .unwrap_err();
        assert!(matches!(DomainError::find(&err), Some(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_concurrent_decisions_have_one_winner() {
        let fixture = setup_test().await;
        let member = register(&fixture, "Member Ana", true).await;
        let credit = fixture.credits.request_credit(request(&member.id, 500.0)).await.unwrap();

        let approve = fixture.credits.decide_credit(decide(&fixture, &credit.id, true));
        let reject = fixture.credits.decide_credit(decide(&fixture, &credit.id, false));
        let (approved, rejected) = tokio::join!(approve, reject);

        assert_eq!(approved.is_ok() as u8 + rejected.is_ok() as u8, 1);
    }

    #[tokio::test]
    async fn test_admin_created_credit_is_approved() {
        let fixture = setup_test().await;
        let member = register(&fixture, "Member Ana", true).await;

        let credit = fixture
            .credits
            .create_approved_credit(AdminCreditCommand {
                admin_id: fixture.admin_id.clone(),
                member_id: member.id.clone(),
                amount: 2000.0,
                description: None,
            })
            .await
            .unwrap();

        assert_eq!(credit.status, CreditStatus::Approved);
        assert_eq!(credit.total, 2300.0);
        assert!(credit.decided_at.is_some());

        let err = fixture
            .credits
            .create_approved_credit(AdminCreditCommand {
                admin_id: member.id.clone(),
                member_id: member.id.clone(),
                amount: 100.0,
                description: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(DomainError::find(&err), Some(DomainError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_settle_marks_paid_only_when_covered() {
        let fixture = setup_test().await;
        let member = register(&fixture, "Member Ana", true).await;
        let credit = fixture.credits.request_credit(request(&member.id, 1000.0)).await.unwrap();
        fixture.credits.decide_credit(decide(&fixture, &credit.id, true)).await.unwrap();
        let payments = fixture.env.payment_repository();

        payments
            .store_payment(&sample_payment(&member.id, &credit.id, 1000.0, PaymentStatus::Confirmed))
            .await
            .unwrap();
        payments
            .store_payment(&sample_payment(&member.id, &credit.id, 500.0, PaymentStatus::Pending))
            .await
            .unwrap();
        let partial = fixture.credits.settle_credit(&credit.id).await.unwrap();
        assert_eq!(partial.status, CreditStatus::Approved);
        assert_eq!(fixture.credits.outstanding(&partial).await.unwrap(), 150.0);

        payments
            .store_payment(&sample_payment(&member.id, &credit.id, 150.0, PaymentStatus::Confirmed))
            .await
            .unwrap();
        let settled = fixture.credits.settle_credit(&credit.id).await.unwrap();
        assert_eq!(settled.status, CreditStatus::Paid);

        // Paid never reverts
        let again = fixture.credits.settle_credit(&credit.id).await.unwrap();
        assert_eq!(again.status, CreditStatus::Paid);
        let err = fixture
            .credits
            .decide_credit(decide(&fixture, &credit.id, false))
            .await
            .unwrap_err();
        assert!(matches!(DomainError::find(&err), Some(DomainError::Conflict(_))));
    }
}
