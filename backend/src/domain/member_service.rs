//! Member registration, authentication and administration.

use anyhow::Result;
use chrono::Utc;
use log::{info, warn};
use std::sync::Arc;

use crate::domain::commands::members::{
    AuthenticationResult, RegisterMemberCommand, SetMembershipCommand, UpdateProfileCommand,
};
use crate::domain::errors::DomainError;
use crate::domain::models::member::{Member, MemberPatch};
use crate::domain::password::{self, PasswordCheck};
use crate::storage::{Connection, MemberStorage};

const MIN_NAME_LENGTH: usize = 3;
const MAX_NAME_LENGTH: usize = 100;
const MIN_PASSWORD_LENGTH: usize = 6;
const MIN_DOCUMENT_LENGTH: usize = 6;
const CONSUMER_CODE_ATTEMPTS: usize = 10;

#[derive(Clone)]
pub struct MemberService<C: Connection> {
    member_repository: C::MemberRepository,
}

impl<C: Connection> MemberService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        let member_repository = connection.create_member_repository();
        Self { member_repository }
    }

    /// Register a new person as an active non-member.
    pub async fn register(&self, command: RegisterMemberCommand) -> Result<Member> {
        info!("Registering member: name={}", command.name.trim());

        let name = validate_name(&command.name)?;
        if command.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(DomainError::validation(format!(
                "Password must have at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }
        let email = normalize(command.email);
        if let Some(email) = &email {
            validate_email(email)?;
            if self.member_repository.find_by_email(email).await?.is_some() {
                return Err(DomainError::conflict("Email already registered"));
            }
        }
        let document = normalize(command.document);
        if let Some(document) = &document {
            if document.chars().count() < MIN_DOCUMENT_LENGTH {
                return Err(DomainError::validation(format!(
                    "Document must have at least {} characters",
                    MIN_DOCUMENT_LENGTH
                )));
            }
            if self.member_repository.find_by_document(document).await?.is_some() {
                return Err(DomainError::conflict("Document already registered"));
            }
        }

        let consumer_code = match normalize(command.consumer_code) {
            Some(code) => {
                let code = code.to_uppercase();
                if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
                    return Err(DomainError::validation(
                        "Consumer code may only contain letters and digits",
                    ));
                }
                if self.member_repository.find_by_consumer_code(&code).await?.is_some() {
                    return Err(DomainError::conflict(format!(
                        "Consumer code already in use: {}",
                        code
                    )));
                }
                code
            }
            None => self.generate_unique_consumer_code().await?,
        };

        let now = Utc::now();
        let member = Member {
            id: Member::generate_id(),
            consumer_code,
            name,
            email,
            password_hash: password::hash_password(&command.password)?,
            phone: normalize(command.phone),
            document,
            address: normalize(command.address),
            city: normalize(command.city),
            state: normalize(command.state),
            zip_code: normalize(command.zip_code),
            birth_date: command.birth_date,
            is_member: false,
            is_admin: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.member_repository.store_member(&member).await?;

        info!("Registered member {} with ID: {}", member.consumer_code, member.id);
        Ok(member)
    }

    async fn generate_unique_consumer_code(&self) -> Result<String> {
        for _ in 0..CONSUMER_CODE_ATTEMPTS {
            let code = Member::generate_consumer_code(Utc::now().timestamp_millis() as u64);
            if self.member_repository.find_by_consumer_code(&code).await?.is_none() {
                return Ok(code);
            }
        }
        Err(anyhow::anyhow!(
            "Could not generate a unique consumer code after {} attempts",
            CONSUMER_CODE_ATTEMPTS
        ))
    }

    /// Log in by consumer code and password.
    pub async fn authenticate(&self, consumer_code: &str, password: &str) -> Result<AuthenticationResult> {
        let member = self
            .member_repository
            .find_by_consumer_code(consumer_code)
            .await?
            .ok_or_else(|| DomainError::unauthorized("Invalid consumer code or password"))?;

        match password::verify_password(password, &member.password_hash) {
            PasswordCheck::Valid => {
                info!("Member {} authenticated", member.consumer_code);
                Ok(AuthenticationResult {
                    is_admin: member.is_admin,
                    member,
                })
            }
            PasswordCheck::Invalid => {
                warn!("Failed login for {}", member.consumer_code);
                Err(DomainError::unauthorized("Invalid consumer code or password"))
            }
            PasswordCheck::UnsupportedScheme => {
                warn!(
                    "Member {} has a legacy password hash; a password reset is required",
                    member.consumer_code
                );
                Err(DomainError::unauthorized("Invalid consumer code or password"))
            }
        }
    }

    /// Log in and require the administrator flag.
    pub async fn authenticate_admin(&self, consumer_code: &str, password: &str) -> Result<AuthenticationResult> {
        let result = self.authenticate(consumer_code, password).await?;
        if !result.is_admin {
            warn!("Non-admin {} attempted admin login", result.member.consumer_code);
            return Err(DomainError::forbidden("Administrator access required"));
        }
        Ok(result)
    }

    pub async fn get_member(&self, member_id: &str) -> Result<Option<Member>> {
        self.member_repository.get_member(member_id).await
    }

    /// Like [`Self::get_member`] but a missing record is a not-found error.
    pub async fn require_member(&self, member_id: &str) -> Result<Member> {
        self.member_repository
            .get_member(member_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Member not found: {}", member_id)))
    }

    /// The caller must be an active administrator.
    pub async fn require_admin(&self, admin_id: &str) -> Result<Member> {
        match self.member_repository.get_member(admin_id).await? {
            Some(admin) if admin.is_admin && admin.is_active => Ok(admin),
            _ => {
                warn!("Rejected admin operation for {}", admin_id);
                Err(DomainError::forbidden("Administrator access required"))
            }
        }
    }

    pub async fn find_by_consumer_code(&self, consumer_code: &str) -> Result<Option<Member>> {
        self.member_repository.find_by_consumer_code(consumer_code).await
    }

    pub async fn list_members(&self, admin_id: &str, include_inactive: bool) -> Result<Vec<Member>> {
        self.require_admin(admin_id).await?;
        let members = self.member_repository.list_members(!include_inactive).await?;
        info!("Found {} members", members.len());
        Ok(members)
    }

    /// All active members, for internal aggregation.
    pub async fn active_members(&self) -> Result<Vec<Member>> {
        self.member_repository.list_members(true).await
    }

    pub async fn update_profile(&self, member_id: &str, command: UpdateProfileCommand) -> Result<Member> {
        info!("Updating profile of member {}", member_id);

        let name = match &command.name {
            Some(name) => Some(validate_name(name)?),
            None => None,
        };
        let email = normalize(command.email);
        if let Some(email) = &email {
            validate_email(email)?;
        }

        let patch = MemberPatch {
            name,
            email,
            phone: normalize(command.phone),
            address: normalize(command.address),
            city: normalize(command.city),
            state: normalize(command.state),
            zip_code: normalize(command.zip_code),
            ..Default::default()
        };
        self.member_repository
            .update_member(member_id, patch)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Member not found: {}", member_id)))
    }

    pub async fn set_membership(&self, command: SetMembershipCommand) -> Result<Member> {
        self.require_admin(&command.admin_id).await?;
        if command.is_member.is_none() && command.is_admin.is_none() {
            return Err(DomainError::validation("Nothing to change: set is_member or is_admin"));
        }

        let patch = MemberPatch {
            is_member: command.is_member,
            is_admin: command.is_admin,
            ..Default::default()
        };
        let member = self
            .member_repository
            .update_member(&command.member_id, patch)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Member not found: {}", command.member_id)))?;

        info!(
            "Member {} flags set: is_member={}, is_admin={}",
            member.consumer_code, member.is_member, member.is_admin
        );
        Ok(member)
    }

    /// Members are never deleted, only deactivated.
    pub async fn deactivate(&self, admin_id: &str, member_id: &str) -> Result<Member> {
        self.require_admin(admin_id).await?;
        if admin_id == member_id {
            return Err(DomainError::validation("Administrators cannot deactivate themselves"));
        }

        let patch = MemberPatch {
            is_active: Some(false),
            ..Default::default()
        };
        let member = self
            .member_repository
            .update_member(member_id, patch)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Member not found: {}", member_id)))?;

        info!("Deactivated member {}", member.consumer_code);
        Ok(member)
    }
}

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    let length = name.chars().count();
    if length < MIN_NAME_LENGTH {
        return Err(DomainError::validation(format!(
            "Name must have at least {} characters",
            MIN_NAME_LENGTH
        )));
    }
    if length > MAX_NAME_LENGTH {
        return Err(DomainError::validation(format!(
            "Name cannot exceed {} characters",
            MAX_NAME_LENGTH
        )));
    }
    Ok(name.to_string())
}

fn validate_email(email: &str) -> Result<()> {
    let valid = email
        .split_once('@')
        .map(|(local, domain)| !local.is_empty() && !domain.is_empty())
        .unwrap_or(false);
    if !valid {
        return Err(DomainError::validation("Invalid email address"));
    }
    Ok(())
}
