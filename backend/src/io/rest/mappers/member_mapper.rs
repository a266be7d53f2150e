use anyhow::Result;
use chrono::NaiveDate;
use shared::{
    LoginResponse, Member as SharedMember, MemberListResponse, MemberResponse,
    RegisterMemberRequest, SetMembershipRequest, UpdateMemberRequest,
};

use super::timestamp;
use crate::domain::commands::members::{
    AuthenticationResult, RegisterMemberCommand, SetMembershipCommand, UpdateProfileCommand,
};
use crate::domain::errors::DomainError;
use crate::domain::models::member::Member as DomainMember;

/// Mapper between member DTOs and the domain member model.
pub struct MemberMapper;

impl MemberMapper {
    /// Public view of a member; the password hash is dropped.
    pub fn to_dto(domain: DomainMember) -> SharedMember {
        SharedMember {
            id: domain.id,
            consumer_code: domain.consumer_code,
            name: domain.name,
            email: domain.email,
            phone: domain.phone,
            document: domain.document,
            address: domain.address,
            city: domain.city,
            state: domain.state,
            zip_code: domain.zip_code,
            birth_date: domain.birth_date.map(|d| d.format("%Y-%m-%d").to_string()),
            is_member: domain.is_member,
            is_admin: domain.is_admin,
            is_active: domain.is_active,
            created_at: timestamp(domain.created_at),
            updated_at: timestamp(domain.updated_at),
        }
    }

    pub fn to_register_command(request: RegisterMemberRequest) -> Result<RegisterMemberCommand> {
        let birth_date = match request.birth_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(value) => Some(NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
                DomainError::validation(format!("Invalid birth date {:?}, expected YYYY-MM-DD", value))
            })?),
        };

        Ok(RegisterMemberCommand {
            name: request.name,
            password: request.password,
            consumer_code: request.consumer_code,
            email: request.email,
            phone: request.phone,
            document: request.document,
            address: request.address,
            city: request.city,
            state: request.state,
            zip_code: request.zip_code,
            birth_date,
        })
    }

    pub fn to_update_command(request: UpdateMemberRequest) -> UpdateProfileCommand {
        UpdateProfileCommand {
            name: request.name,
            email: request.email,
            phone: request.phone,
            address: request.address,
            city: request.city,
            state: request.state,
            zip_code: request.zip_code,
        }
    }

    pub fn to_membership_command(member_id: String, request: SetMembershipRequest) -> SetMembershipCommand {
        SetMembershipCommand {
            admin_id: request.admin_id,
            member_id,
            is_member: request.is_member,
            is_admin: request.is_admin,
        }
    }

    pub fn to_member_response_dto(domain: DomainMember, message: &str) -> MemberResponse {
        MemberResponse {
            member: Self::to_dto(domain),
            success_message: message.to_string(),
        }
    }

    pub fn to_member_list_dto(members: Vec<DomainMember>) -> MemberListResponse {
        MemberListResponse {
            members: members.into_iter().map(Self::to_dto).collect(),
        }
    }

    pub fn to_login_response_dto(result: AuthenticationResult) -> LoginResponse {
        LoginResponse {
            success_message: format!("Welcome, {}", result.member.name),
            member: Self::to_dto(result.member),
            is_admin: result.is_admin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::json::test_utils::sample_member;

    #[test]
    fn test_to_dto_formats_dates() {
        let mut member = sample_member("PPDTEST1");
        member.birth_date = NaiveDate::from_ymd_opt(1990, 4, 12);

        let dto = MemberMapper::to_dto(member.clone());

        assert_eq!(dto.birth_date.as_deref(), Some("1990-04-12"));
        assert_eq!(dto.created_at, member.created_at.to_rfc3339());
        assert_eq!(dto.consumer_code, "PPDTEST1");
    }

    #[test]
    fn test_register_command_rejects_bad_birth_date() {
        let request = RegisterMemberRequest {
            name: "Joana Matos".to_string(),
            password: "secret123".to_string(),
            consumer_code: None,
            email: None,
            phone: None,
            document: None,
            address: None,
            city: None,
            state: None,
            zip_code: None,
            birth_date: Some("12/04/1990".to_string()),
        };

        let err = MemberMapper::to_register_command(request.clone()).unwrap_err();
        assert!(matches!(DomainError::find(&err), Some(DomainError::Validation(_))));

        let command = MemberMapper::to_register_command(RegisterMemberRequest {
            birth_date: Some("1990-04-12".to_string()),
            ..request
        })
        .unwrap();
        assert_eq!(command.birth_date, NaiveDate::from_ymd_opt(1990, 4, 12));
    }
}
