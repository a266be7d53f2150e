use shared::{
    AdminCreditRequest, Credit as SharedCredit, CreditApplicationRequest, CreditListResponse,
    CreditResponse, DecideCreditRequest,
};

use super::{optional_timestamp, timestamp};
use crate::domain::commands::credits::{AdminCreditCommand, DecideCreditCommand, RequestCreditCommand};
use crate::domain::models::credit::Credit as DomainCredit;

pub struct CreditMapper;

impl CreditMapper {
    pub fn to_dto(domain: DomainCredit) -> SharedCredit {
        SharedCredit {
            id: domain.id,
            member_id: domain.member_id,
            amount: domain.amount,
            interest_rate: domain.interest_rate,
            interest: domain.interest,
            total: domain.total,
            status: domain.status,
            description: domain.description,
            requested_at: timestamp(domain.requested_at),
            decided_at: optional_timestamp(domain.decided_at),
            due_date: optional_timestamp(domain.due_date),
            updated_at: timestamp(domain.updated_at),
        }
    }

    pub fn to_request_command(request: CreditApplicationRequest) -> RequestCreditCommand {
        RequestCreditCommand {
            member_id: request.member_id,
            amount: request.amount,
            description: request.description,
        }
    }

    pub fn to_admin_command(request: AdminCreditRequest) -> AdminCreditCommand {
        AdminCreditCommand {
            admin_id: request.admin_id,
            member_id: request.member_id,
            amount: request.amount,
            description: request.description,
        }
    }

    pub fn to_decide_command(request: DecideCreditRequest) -> DecideCreditCommand {
        DecideCreditCommand {
            credit_id: request.credit_id,
            admin_id: request.admin_id,
            approve: request.approved,
        }
    }

    pub fn to_credit_response_dto(domain: DomainCredit, message: &str) -> CreditResponse {
        CreditResponse {
            credit: Self::to_dto(domain),
            success_message: message.to_string(),
        }
    }

    pub fn to_credit_list_dto(credits: Vec<DomainCredit>) -> CreditListResponse {
        CreditListResponse {
            credits: credits.into_iter().map(Self::to_dto).collect(),
        }
    }
}
