use anyhow::Result;
use async_trait::async_trait;
use log::{debug, info};

use super::connection::JsonConnection;
use crate::domain::errors::DomainError;
use crate::domain::models::member::{Member, MemberPatch};
use crate::domain::models::next_timestamp;
use crate::storage::traits::MemberStorage;

/// Member records of a JSON store
#[derive(Clone)]
pub struct MemberRepository {
    connection: JsonConnection,
}

impl MemberRepository {
    pub fn new(connection: JsonConnection) -> Self {
        Self { connection }
    }
}

fn same_text(stored: &Option<String>, candidate: &str) -> bool {
    stored
        .as_deref()
        .map(|value| value.eq_ignore_ascii_case(candidate))
        .unwrap_or(false)
}

#[async_trait]
impl MemberStorage for MemberRepository {
    async fn store_member(&self, member: &Member) -> Result<()> {
        self.connection
            .mutate(|document| {
                for existing in &document.members {
                    if existing.id == member.id {
                        return Err(DomainError::conflict(format!(
                            "Member ID already exists: {}",
                            member.id
                        )));
                    }
                    if existing.is_active && existing.consumer_code == member.consumer_code {
                        return Err(DomainError::conflict(format!(
                            "Consumer code already in use: {}",
                            member.consumer_code
                        )));
                    }
                    if let Some(email) = member.email.as_deref() {
                        if same_text(&existing.email, email) {
                            return Err(DomainError::conflict("Email already registered"));
                        }
                    }
                    if let Some(doc) = member.document.as_deref() {
                        if existing.document.as_deref() == Some(doc) {
                            return Err(DomainError::conflict("Document already registered"));
                        }
                    }
                }
                document.members.push(member.clone());
                Ok(())
            })
            .await?;

        info!("Stored member {} ({})", member.consumer_code, member.id);
        Ok(())
    }

    async fn get_member(&self, member_id: &str) -> Result<Option<Member>> {
        Ok(self
            .connection
            .read(|document| document.members.iter().find(|m| m.id == member_id).cloned())
            .await)
    }

    async fn find_by_consumer_code(&self, consumer_code: &str) -> Result<Option<Member>> {
        let code = consumer_code.trim().to_uppercase();
        Ok(self
            .connection
            .read(|document| {
                document
                    .members
                    .iter()
                    .find(|m| m.is_active && m.consumer_code == code)
                    .cloned()
            })
            .await)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Member>> {
        Ok(self
            .connection
            .read(|document| {
                document
                    .members
                    .iter()
                    .find(|m| same_text(&m.email, email.trim()))
                    .cloned()
            })
            .await)
    }

    async fn find_by_document(&self, doc: &str) -> Result<Option<Member>> {
        Ok(self
            .connection
            .read(|document| {
                document
                    .members
                    .iter()
                    .find(|m| m.document.as_deref() == Some(doc.trim()))
                    .cloned()
            })
            .await)
    }

    async fn list_members(&self, active_only: bool) -> Result<Vec<Member>> {
        Ok(self
            .connection
            .read(|document| {
                document
                    .members
                    .iter()
                    .filter(|m| !active_only || m.is_active)
                    .cloned()
                    .collect()
            })
            .await)
    }

    async fn update_member(&self, member_id: &str, patch: MemberPatch) -> Result<Option<Member>> {
        let updated = self
            .connection
            .mutate(|document| {
                let Some(index) = document.members.iter().position(|m| m.id == member_id) else {
                    return Ok(None);
                };

                let mut candidate = document.members[index].clone();
                patch.apply(&mut candidate);

                let taken = document.members.iter().enumerate().any(|(i, other)| {
                    i != index
                        && ((candidate.is_active
                            && other.is_active
                            && other.consumer_code == candidate.consumer_code)
                            || candidate
                                .email
                                .as_deref()
                                .map(|email| same_text(&other.email, email))
                                .unwrap_or(false))
                });
                if taken {
                    return Err(DomainError::conflict("Email or consumer code already in use"));
                }

                candidate.updated_at = next_timestamp(candidate.updated_at);
                document.members[index] = candidate.clone();
                Ok(Some(candidate))
            })
            .await?;

        if updated.is_some() {
            debug!("Updated member {}", member_id);
        }
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::json::test_utils::{sample_member, TestEnvironment};

    #[tokio::test]
    async fn test_store_and_find_round_trip() {
        let env = TestEnvironment::new().await.unwrap();
        let repo = env.member_repository();
        let mut member = sample_member("PPDROUND0001");
        member.email = Some("ana@example.com".to_string());
        member.document = Some("MEC123456".to_string());
        member.birth_date = chrono::NaiveDate::from_ymd_opt(1990, 4, 12);

        repo.store_member(&member).await.unwrap();

        assert_eq!(repo.get_member(&member.id).await.unwrap(), Some(member.clone()));
        assert_eq!(
            repo.find_by_consumer_code("ppdround0001").await.unwrap(),
            Some(member.clone())
        );
        assert_eq!(
            repo.find_by_email("ANA@example.com").await.unwrap(),
            Some(member.clone())
        );
        assert_eq!(repo.find_by_document("MEC123456").await.unwrap(), Some(member));
    }

    #[tokio::test]
    async fn test_unknown_lookups_return_none() {
        let env = TestEnvironment::new().await.unwrap();
        let repo = env.member_repository();

        assert!(repo.get_member("member::missing").await.unwrap().is_none());
        assert!(repo.find_by_consumer_code("PPDNOPE").await.unwrap().is_none());
        assert!(repo
            .update_member("member::missing", MemberPatch::default())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_duplicate_consumer_code_is_conflict() {
        let env = TestEnvironment::new().await.unwrap();
        let repo = env.member_repository();
        repo.store_member(&sample_member("PPDDUP000001")).await.unwrap();

        let err = repo.store_member(&sample_member("PPDDUP000001")).await.unwrap_err();

        assert!(matches!(DomainError::find(&err), Some(DomainError::Conflict(_))));
        assert_eq!(repo.list_members(false).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_inactive_member_frees_consumer_code() {
        let env = TestEnvironment::new().await.unwrap();
        let repo = env.member_repository();
        let first = sample_member("PPDREUSE0001");
        repo.store_member(&first).await.unwrap();
        repo.update_member(
            &first.id,
            MemberPatch {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let second = sample_member("PPDREUSE0001");
        repo.store_member(&second).await.unwrap();

        let found = repo.find_by_consumer_code("PPDREUSE0001").await.unwrap().unwrap();
        assert_eq!(found.id, second.id);
        assert_eq!(repo.list_members(true).await.unwrap().len(), 2);
        assert_eq!(repo.list_members(false).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let env = TestEnvironment::new().await.unwrap();
        let repo = env.member_repository();
        let mut first = sample_member("PPDMAIL00001");
        first.email = Some("joao@example.com".to_string());
        repo.store_member(&first).await.unwrap();

        let mut second = sample_member("PPDMAIL00002");
        second.email = Some("Joao@Example.com".to_string());
        let err = repo.store_member(&second).await.unwrap_err();

        assert!(matches!(DomainError::find(&err), Some(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_update_merges_patch_and_touches_timestamp() {
        let env = TestEnvironment::new().await.unwrap();
        let repo = env.member_repository();
        let member = sample_member("PPDUPD000001");
        repo.store_member(&member).await.unwrap();

        let first = repo
            .update_member(
                &member.id,
                MemberPatch {
                    city: Some("Benguela".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        let second = repo
            .update_member(
                &member.id,
                MemberPatch {
                    is_member: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(first.city.as_deref(), Some("Benguela"));
        assert!(first.updated_at > member.updated_at);
        assert!(second.updated_at > first.updated_at);

        let fetched = repo.get_member(&member.id).await.unwrap().unwrap();
        assert!(fetched.is_member);
        assert_eq!(fetched.city.as_deref(), Some("Benguela"));
        assert_eq!(fetched.name, member.name);
        assert_eq!(fetched.created_at, member.created_at);
    }
}
