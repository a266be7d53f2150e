use shared::{
    CreditBalance as SharedCreditBalance, MemberDebtSummary as SharedMemberDebtSummary,
    MemberStatement as SharedMemberStatement, MonthlyOverview as SharedMonthlyOverview,
    MonthlyPaymentRequest, MonthlyPaymentResponse, Payment as SharedPayment, PaymentListResponse,
    PaymentResponse, RecordPaymentRequest,
};

use super::member_mapper::MemberMapper;
use super::{optional_timestamp, timestamp};
use crate::domain::commands::payments::{
    CreditBalance, MemberDebtSummary, MemberStatement, MonthlyOverview, MonthlyPaymentCommand,
    MonthlyPaymentResult, RecordPaymentCommand,
};
use crate::domain::models::payment::Payment as DomainPayment;

pub struct PaymentMapper;

impl PaymentMapper {
    pub fn to_dto(domain: DomainPayment) -> SharedPayment {
        SharedPayment {
            id: domain.id,
            member_id: domain.member_id,
            credit_id: domain.credit_id,
            amount: domain.amount,
            method: domain.method,
            status: domain.status,
            description: domain.description,
            paid_at: timestamp(domain.paid_at),
            updated_at: timestamp(domain.updated_at),
        }
    }

    pub fn to_record_command(request: RecordPaymentRequest) -> RecordPaymentCommand {
        RecordPaymentCommand {
            member_id: request.member_id,
            credit_id: request.credit_id,
            amount: request.amount,
            method: request.method,
            description: request.description,
        }
    }

    pub fn to_monthly_command(request: MonthlyPaymentRequest) -> MonthlyPaymentCommand {
        MonthlyPaymentCommand {
            member_id: request.member_id,
            amount: request.amount,
            description: request.description,
            admin_id: request.admin_id,
        }
    }

    pub fn to_payment_response_dto(domain: DomainPayment, message: &str) -> PaymentResponse {
        PaymentResponse {
            payment: Self::to_dto(domain),
            success_message: message.to_string(),
        }
    }

    pub fn to_payment_list_dto(payments: Vec<DomainPayment>) -> PaymentListResponse {
        PaymentListResponse {
            payments: payments.into_iter().map(Self::to_dto).collect(),
        }
    }

    pub fn to_monthly_response_dto(result: MonthlyPaymentResult) -> MonthlyPaymentResponse {
        MonthlyPaymentResponse {
            payments: result.payments.into_iter().map(Self::to_dto).collect(),
            previous_debt: result.previous_debt,
            new_balance: result.new_balance,
            success_message: "Monthly payment registered successfully".to_string(),
        }
    }

    fn to_balance_dto(balance: CreditBalance) -> SharedCreditBalance {
        SharedCreditBalance {
            credit_id: balance.credit_id,
            amount: balance.amount,
            interest: balance.interest,
            total: balance.total,
            total_paid: balance.total_paid,
            outstanding: balance.outstanding,
            due_date: optional_timestamp(balance.due_date),
        }
    }

    pub fn to_statement_dto(statement: MemberStatement) -> SharedMemberStatement {
        SharedMemberStatement {
            member: MemberMapper::to_dto(statement.member),
            total_outstanding: statement.total_outstanding,
            total_paid: statement.total_paid,
            credits: statement.credits.into_iter().map(Self::to_balance_dto).collect(),
            next_due_date: optional_timestamp(statement.next_due_date),
        }
    }

    fn to_summary_dto(summary: MemberDebtSummary) -> SharedMemberDebtSummary {
        SharedMemberDebtSummary {
            member_id: summary.member_id,
            consumer_code: summary.consumer_code,
            name: summary.name,
            approved_credits: summary.approved_credits,
            total_outstanding: summary.total_outstanding,
            total_paid: summary.total_paid,
            monthly_payments: summary.monthly_payments,
            last_monthly_payment: optional_timestamp(summary.last_monthly_payment),
        }
    }

    pub fn to_overview_dto(overview: MonthlyOverview) -> SharedMonthlyOverview {
        SharedMonthlyOverview {
            total_members: overview.members.len(),
            members: overview.members.into_iter().map(Self::to_summary_dto).collect(),
            members_in_debt: overview.members_in_debt,
            total_outstanding: overview.total_outstanding,
            total_paid: overview.total_paid,
            total_monthly_payments: overview.total_monthly_payments,
        }
    }
}
