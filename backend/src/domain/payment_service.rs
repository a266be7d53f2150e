//! # Payments
//!
//! Payments move money against approved credits. A payment starts `pending`
//! and an administrator confirms or fails it; monthly fees registered for
//! members are created already confirmed. Every confirmation re-checks the
//! credit so it becomes `paid` once confirmed payments cover its total.
//!
//! ## Key Responsibilities
//! - Record, confirm and fail payments
//! - Register monthly fees across approved credits with debt, oldest first
//! - Build the per-member statement and the administrator overview

use anyhow::Result;
use chrono::Utc;
use log::{info, warn};
use shared::{CreditStatus, NotificationOutcome, PaymentMethod, PaymentStatus};
use std::sync::Arc;

use crate::domain::commands::payments::{
    CreditBalance, MemberDebtSummary, MemberStatement, MonthlyOverview, MonthlyPaymentCommand,
    MonthlyPaymentResult, RecordPaymentCommand,
};
use crate::domain::credit_service::CreditService;
use crate::domain::errors::DomainError;
use crate::domain::member_service::MemberService;
use crate::domain::models::credit::Credit;
use crate::domain::models::member::Member;
use crate::domain::models::notification::{self, Notification};
use crate::domain::models::payment::{Payment, PaymentPatch};
use crate::domain::notification_service::NotificationService;
use crate::storage::{Connection, PaymentStorage};

/// Debt below this is treated as settled
const DEBT_EPSILON: f64 = 1e-6;

#[derive(Clone)]
pub struct PaymentService<C: Connection> {
    payment_repository: C::PaymentRepository,
    member_service: MemberService<C>,
    credit_service: CreditService<C>,
    notification_service: NotificationService<C>,
}

impl<C: Connection> PaymentService<C> {
    pub fn new(
        connection: Arc<C>,
        member_service: MemberService<C>,
        credit_service: CreditService<C>,
        notification_service: NotificationService<C>,
    ) -> Self {
        let payment_repository = connection.create_payment_repository();
        Self {
            payment_repository,
            member_service,
            credit_service,
            notification_service,
        }
    }

    /// A member pays (part of) an approved credit. The payment waits for an
    /// administrator's confirmation.
    pub async fn record_payment(&self, command: RecordPaymentCommand) -> Result<Payment> {
        info!(
            "Recording payment: member={}, credit={}, amount={:.2}",
            command.member_id, command.credit_id, command.amount
        );

        if !command.amount.is_finite() || command.amount <= 0.0 {
            return Err(DomainError::validation("Amount must be greater than zero"));
        }
        self.member_service.require_member(&command.member_id).await?;

        let credit = self.credit_service.require_credit(&command.credit_id).await?;
        if credit.member_id != command.member_id {
            return Err(DomainError::forbidden("Credit belongs to another member"));
        }
        if credit.status != CreditStatus::Approved {
            return Err(DomainError::validation(format!(
                "Payments can only be made on approved credits (status: {})",
                credit.status
            )));
        }

        let now = Utc::now();
        let payment = Payment {
            id: Payment::generate_id(),
            member_id: command.member_id,
            credit_id: command.credit_id,
            amount: command.amount,
            method: command.method.unwrap_or(PaymentMethod::Transfer),
            status: PaymentStatus::Pending,
            description: command.description,
            paid_at: now,
            updated_at: now,
        };
        self.payment_repository.store_payment(&payment).await?;

        info!("Created pending payment {}", payment.id);
        Ok(payment)
    }

    async fn transition(&self, payment_id: &str, admin_id: &str, to: PaymentStatus) -> Result<Payment> {
        self.member_service.require_admin(admin_id).await?;

        let existing = self
            .payment_repository
            .get_payment(payment_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Payment not found: {}", payment_id)))?;
        if existing.status != PaymentStatus::Pending {
            return Err(DomainError::conflict(format!(
                "Payment has already been processed (status: {:?})",
                existing.status
            )));
        }

        let patch = PaymentPatch {
            expected_status: Some(PaymentStatus::Pending),
            status: Some(to),
            ..Default::default()
        };
        self.payment_repository
            .update_payment(payment_id, patch)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Payment not found: {}", payment_id)))
    }

    /// Confirm a pending payment and settle its credit when fully covered.
    pub async fn confirm_payment(&self, payment_id: &str, admin_id: &str) -> Result<Payment> {
        info!("Confirming payment {}", payment_id);
        let payment = self.transition(payment_id, admin_id, PaymentStatus::Confirmed).await?;

        let credit = self.credit_service.settle_credit(&payment.credit_id).await?;

        self.notification_service
            .record_after(Notification::resolved(
                &payment.member_id,
                notification::PAYMENT_CONFIRMED,
                format!("Payment of {:.2}", payment.amount),
                NotificationOutcome::Approved,
                Some(if credit.status == CreditStatus::Paid {
                    "Confirmed. Credit fully paid".to_string()
                } else {
                    "Confirmed".to_string()
                }),
            ))
            .await;

        Ok(payment)
    }

    pub async fn fail_payment(&self, payment_id: &str, admin_id: &str) -> Result<Payment> {
        info!("Failing payment {}", payment_id);
        let payment = self.transition(payment_id, admin_id, PaymentStatus::Failed).await?;

        self.notification_service
            .record_after(Notification::resolved(
                &payment.member_id,
                notification::PAYMENT_FAILED,
                format!("Payment of {:.2}", payment.amount),
                NotificationOutcome::Rejected,
                Some("Payment could not be confirmed".to_string()),
            ))
            .await;

        Ok(payment)
    }

    /// A member's payments, most recent first.
    pub async fn list_member_payments(&self, member_id: &str) -> Result<Vec<Payment>> {
        self.member_service.require_member(member_id).await?;
        self.payment_repository.list_payments_for_member(member_id).await
    }

    /// Approved credits of a member with their balances, oldest first.
    async fn approved_balances(&self, member_id: &str) -> Result<Vec<(Credit, CreditBalance)>> {
        let credits = self.credit_service.list_member_credits(member_id).await?;
        let mut balances = Vec::new();
        for credit in credits.into_iter().filter(|c| c.status == CreditStatus::Approved) {
            let total_paid = self.credit_service.confirmed_total(&credit.id).await?;
            let balance = CreditBalance {
                credit_id: credit.id.clone(),
                amount: credit.amount,
                interest: credit.interest,
                total: credit.total,
                total_paid,
                outstanding: (credit.total - total_paid).max(0.0),
                due_date: credit.due_date,
            };
            balances.push((credit, balance));
        }
        Ok(balances)
    }

    fn require_association_member(member: &Member) -> Result<()> {
        if !member.is_member {
            return Err(DomainError::forbidden("Only members can make monthly payments"));
        }
        Ok(())
    }

    /// Register a monthly fee for a member.
    ///
    /// The amount is split across the approved credits with debt, oldest
    /// first, as one confirmed payment per credit. It may not exceed the
    /// member's total outstanding debt.
    pub async fn register_monthly_payment(&self, command: MonthlyPaymentCommand) -> Result<MonthlyPaymentResult> {
        info!(
            "Monthly payment: member={}, amount={:.2}",
            command.member_id, command.amount
        );

        if !command.amount.is_finite() || command.amount <= 0.0 {
            return Err(DomainError::validation("Amount must be greater than zero"));
        }
        let admin = match &command.admin_id {
            Some(admin_id) => Some(self.member_service.require_admin(admin_id).await?),
            None => None,
        };

        let member = self.member_service.require_member(&command.member_id).await?;
        Self::require_association_member(&member)?;

        let balances = self.approved_balances(&member.id).await?;
        if balances.is_empty() {
            return Err(DomainError::validation("Member has no approved credits to pay"));
        }
        let previous_debt: f64 = balances.iter().map(|(_, b)| b.outstanding).sum();
        if previous_debt <= DEBT_EPSILON {
            return Err(DomainError::validation("Member has no outstanding debt"));
        }
        if command.amount > previous_debt + DEBT_EPSILON {
            warn!(
                "Rejected monthly payment of {:.2} from {}: debt is {:.2}",
                command.amount, member.consumer_code, previous_debt
            );
            return Err(DomainError::validation(format!(
                "Amount exceeds the outstanding debt of {:.2}",
                previous_debt
            )));
        }

        let description = command
            .description
            .unwrap_or_else(|| "Monthly membership payment".to_string());
        let mut remaining = command.amount;
        let mut payments = Vec::new();
        for (credit, balance) in &balances {
            if remaining <= DEBT_EPSILON {
                break;
            }
            if balance.outstanding <= DEBT_EPSILON {
                continue;
            }
            // The last share takes whatever is left so the parts sum exactly.
            let share = if remaining <= balance.outstanding + DEBT_EPSILON {
                remaining
            } else {
                balance.outstanding
            };
            let now = Utc::now();
            let payment = Payment {
                id: Payment::generate_id(),
                member_id: member.id.clone(),
                credit_id: credit.id.clone(),
                amount: share,
                method: PaymentMethod::MonthlyFee,
                status: PaymentStatus::Confirmed,
                description: Some(description.clone()),
                paid_at: now,
                updated_at: now,
            };
            self.payment_repository.store_payment(&payment).await?;
            self.credit_service.settle_credit(&credit.id).await?;
            remaining -= share;
            payments.push(payment);
        }

        self.notification_service
            .record_after(Notification::resolved(
                &member.id,
                notification::MONTHLY_PAYMENT,
                format!("Monthly payment of {:.2} received", command.amount),
                NotificationOutcome::Approved,
                Some(format!("Your monthly payment of {:.2} was confirmed", command.amount)),
            ))
            .await;
        if let Some(admin) = &admin {
            self.notification_service
                .record_after(Notification::resolved(
                    &admin.id,
                    notification::MONTHLY_PAYMENT_REGISTERED,
                    format!("Monthly payment registered for {}", member.name),
                    NotificationOutcome::Approved,
                    Some(format!(
                        "Payment of {:.2} registered for {}",
                        command.amount, member.name
                    )),
                ))
                .await;
        }

        let new_balance: f64 = self
            .approved_balances(&member.id)
            .await?
            .iter()
            .map(|(_, b)| b.outstanding)
            .sum();
        info!(
            "Monthly payment from {} split over {} credit(s): debt {:.2} -> {:.2}",
            member.consumer_code,
            payments.len(),
            previous_debt,
            new_balance
        );

        Ok(MonthlyPaymentResult {
            payments,
            previous_debt,
            new_balance,
        })
    }

    /// Debt, payments and next due date of one member.
    pub async fn member_statement(&self, member_id: &str) -> Result<MemberStatement> {
        let member = self.member_service.require_member(member_id).await?;
        if !member.is_member {
            return Err(DomainError::forbidden("Only members have monthly payment statements"));
        }

        let balances = self.approved_balances(member_id).await?;
        let now = Utc::now();
        let next_due_date = balances
            .iter()
            .filter_map(|(_, b)| b.due_date)
            .filter(|due| *due > now)
            .min();
        let credits: Vec<CreditBalance> = balances.into_iter().map(|(_, b)| b).collect();

        Ok(MemberStatement {
            total_outstanding: credits.iter().map(|b| b.outstanding).sum(),
            total_paid: credits.iter().map(|b| b.total_paid).sum(),
            next_due_date,
            credits,
            member,
        })
    }

    /// Debt summary across every association member.
    pub async fn monthly_overview(&self, admin_id: &str) -> Result<MonthlyOverview> {
        self.member_service.require_admin(admin_id).await?;

        let members: Vec<Member> = self
            .member_service
            .active_members()
            .await?
            .into_iter()
            .filter(|m| m.is_member)
            .collect();

        let mut summaries = Vec::with_capacity(members.len());
        for member in members {
            let balances = self.approved_balances(&member.id).await?;
            let approved: Vec<&str> = balances.iter().map(|(c, _)| c.id.as_str()).collect();
            let monthly: Vec<Payment> = self
                .payment_repository
                .list_payments_for_member(&member.id)
                .await?
                .into_iter()
                .filter(|p| p.method == PaymentMethod::MonthlyFee)
                .collect();

            summaries.push(MemberDebtSummary {
                member_id: member.id.clone(),
                consumer_code: member.consumer_code.clone(),
                name: member.name.clone(),
                approved_credits: balances.len(),
                total_outstanding: balances.iter().map(|(_, b)| b.outstanding).sum(),
                total_paid: balances.iter().map(|(_, b)| b.total_paid).sum(),
                monthly_payments: monthly
                    .iter()
                    .filter(|p| approved.contains(&p.credit_id.as_str()))
                    .count(),
                last_monthly_payment: monthly.iter().map(|p| p.paid_at).max(),
            });
        }

        Ok(MonthlyOverview {
            members_in_debt: summaries
                .iter()
                .filter(|s| s.total_outstanding > DEBT_EPSILON)
                .count(),
            total_outstanding: summaries.iter().map(|s| s.total_outstanding).sum(),
            total_paid: summaries.iter().map(|s| s.total_paid).sum(),
            total_monthly_payments: summaries.iter().map(|s| s.monthly_payments).sum(),
            members: summaries,
        })
    }
}
